//! SQLite type affinity.
//!
//! SQLite determines type affinity from declared type names:
//! 1. Contains "INT" -> INTEGER affinity
//! 2. Contains "CHAR", "CLOB", or "TEXT" -> TEXT affinity
//! 3. Contains "BLOB" or no type specified -> BLOB affinity
//! 4. Contains "REAL", "FLOA", or "DOUB" -> REAL affinity
//! 5. Otherwise -> NUMERIC affinity
//!
//! Expression columns without a declared type are reported as `NULL`.

use crate::models::{TypeEntry, TypeTable};

/// Codes assigned to each affinity.
pub mod codes {
    /// INTEGER affinity
    pub const INTEGER: i32 = 1;
    /// REAL affinity
    pub const REAL: i32 = 2;
    /// TEXT affinity
    pub const TEXT: i32 = 3;
    /// BLOB affinity
    pub const BLOB: i32 = 4;
    /// NUMERIC affinity
    pub const NUMERIC: i32 = 5;
    /// Expression column with no declared type
    pub const NULL: i32 = 6;
}

const SQLITE_TYPE_ENTRIES: &[TypeEntry] = &[
    TypeEntry {
        code: codes::INTEGER,
        wire_name: "INTEGER",
        label: "INTEGER",
    },
    TypeEntry {
        code: codes::REAL,
        wire_name: "REAL",
        label: "REAL",
    },
    TypeEntry {
        code: codes::TEXT,
        wire_name: "TEXT",
        label: "TEXT",
    },
    TypeEntry {
        code: codes::BLOB,
        wire_name: "BLOB",
        label: "BLOB",
    },
    TypeEntry {
        code: codes::NUMERIC,
        wire_name: "NUMERIC",
        label: "NUMERIC",
    },
    TypeEntry {
        code: codes::NULL,
        wire_name: "NULL",
        label: "NULL",
    },
];

/// Lookup table for SQLite affinity codes.
pub static SQLITE_TYPES: TypeTable = TypeTable::new(SQLITE_TYPE_ENTRIES);

/// Affinity code for a declared (or driver-reported) type name.
///
/// # Example
/// ```rust
/// use snowcat_core::sqlite::type_mapping::{affinity_code, codes};
///
/// assert_eq!(affinity_code("VARCHAR(255)"), codes::TEXT);
/// assert_eq!(affinity_code("BIGINT"), codes::INTEGER);
/// assert_eq!(affinity_code("DECIMAL(10,2)"), codes::NUMERIC);
/// ```
pub fn affinity_code(declared_type: &str) -> i32 {
    let type_upper = declared_type.trim().to_uppercase();

    if type_upper == "NULL" {
        return codes::NULL;
    }
    if type_upper.contains("INT") {
        return codes::INTEGER;
    }
    if type_upper.contains("CHAR") || type_upper.contains("CLOB") || type_upper.contains("TEXT") {
        return codes::TEXT;
    }
    if type_upper.is_empty() || type_upper.contains("BLOB") {
        return codes::BLOB;
    }
    if type_upper.contains("REAL") || type_upper.contains("FLOA") || type_upper.contains("DOUB") {
        return codes::REAL;
    }

    codes::NUMERIC
}

/// Affinity label for a declared type name.
pub fn affinity_label(declared_type: &str) -> &'static str {
    SQLITE_TYPES.label(affinity_code(declared_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_rules() {
        let test_cases = [
            ("INTEGER", "INTEGER"),
            ("tinyint", "INTEGER"),
            ("UNSIGNED BIG INT", "INTEGER"),
            ("VARCHAR(255)", "TEXT"),
            ("NCHAR(55)", "TEXT"),
            ("CLOB", "TEXT"),
            ("BLOB", "BLOB"),
            ("", "BLOB"),
            ("DOUBLE PRECISION", "REAL"),
            ("FLOAT", "REAL"),
            ("NUMERIC", "NUMERIC"),
            ("BOOLEAN", "NUMERIC"),
            ("DATETIME", "NUMERIC"),
            ("NULL", "NULL"),
        ];

        for (declared, expected) in test_cases {
            assert_eq!(affinity_label(declared), expected, "declared type {:?}", declared);
        }
    }

    #[test]
    fn test_int_rule_precedes_char_rule() {
        // "CHARINT" contains both; INT wins
        assert_eq!(affinity_code("CHARINT"), codes::INTEGER);
        // "POINT" contains INT as well
        assert_eq!(affinity_code("POINT"), codes::INTEGER);
    }
}
