//! Snowflake result type codes.
//!
//! Codes are the ones the Snowflake connectors report in result metadata;
//! wire names are the ones `SHOW COLUMNS` puts in its `data_type` JSON.

use crate::models::{TypeEntry, TypeTable};

const SNOWFLAKE_TYPE_ENTRIES: &[TypeEntry] = &[
    TypeEntry {
        code: 0,
        wire_name: "FIXED",
        label: "NUMBER",
    },
    TypeEntry {
        code: 1,
        wire_name: "REAL",
        label: "FLOAT",
    },
    TypeEntry {
        code: 2,
        wire_name: "TEXT",
        label: "VARCHAR",
    },
    TypeEntry {
        code: 3,
        wire_name: "DATE",
        label: "DATE",
    },
    TypeEntry {
        code: 4,
        wire_name: "TIMESTAMP",
        label: "TIMESTAMP",
    },
    TypeEntry {
        code: 5,
        wire_name: "VARIANT",
        label: "VARIANT",
    },
    TypeEntry {
        code: 6,
        wire_name: "TIMESTAMP_LTZ",
        label: "TIMESTAMP_LTZ",
    },
    TypeEntry {
        code: 7,
        wire_name: "TIMESTAMP_TZ",
        label: "TIMESTAMP_TZ",
    },
    TypeEntry {
        code: 8,
        wire_name: "TIMESTAMP_NTZ",
        label: "TIMESTAMP_NTZ",
    },
    TypeEntry {
        code: 9,
        wire_name: "OBJECT",
        label: "OBJECT",
    },
    TypeEntry {
        code: 10,
        wire_name: "ARRAY",
        label: "ARRAY",
    },
    TypeEntry {
        code: 11,
        wire_name: "BINARY",
        label: "BINARY",
    },
    TypeEntry {
        code: 12,
        wire_name: "TIME",
        label: "TIME",
    },
    TypeEntry {
        code: 13,
        wire_name: "BOOLEAN",
        label: "BOOLEAN",
    },
    TypeEntry {
        code: 14,
        wire_name: "GEOGRAPHY",
        label: "GEOGRAPHY",
    },
    TypeEntry {
        code: 15,
        wire_name: "GEOMETRY",
        label: "GEOMETRY",
    },
    TypeEntry {
        code: 16,
        wire_name: "VECTOR",
        label: "VECTOR",
    },
];

/// Lookup table for Snowflake result type codes.
pub static SNOWFLAKE_TYPES: TypeTable = TypeTable::new(SNOWFLAKE_TYPE_ENTRIES);

/// Type label for one row of `SHOW COLUMNS`.
///
/// `data_type` is a JSON document such as
/// `{"type":"FIXED","precision":38,"scale":0,"nullable":true}`. Unknown wire
/// names are shown as-is; text that is not JSON is returned unchanged.
pub fn column_type_label(data_type: &str) -> String {
    let wire_name = serde_json::from_str::<serde_json::Value>(data_type)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));

    match wire_name {
        Some(name) => SNOWFLAKE_TYPES
            .label_for_name(&name)
            .map_or(name, str::to_string),
        None => data_type.trim().to_string(),
    }
}
