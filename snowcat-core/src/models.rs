//! Data shapes exchanged with the host application.
//!
//! These types are backend-neutral: every adapter converts its driver's
//! native result and metadata shapes into them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Name and human-readable type of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Output name; not necessarily unique within a result
    pub name: String,
    /// Human-readable type name
    pub type_label: String,
}

impl ColumnDescriptor {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, type_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_label: type_label.into(),
        }
    }
}

/// A result set stored column by column.
///
/// Column names are positional: duplicate names are legal and kept, since a
/// query may alias several expressions to the same output name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnarBatch {
    names: Vec<String>,
    columns: Vec<Vec<JsonValue>>,
}

impl ColumnarBatch {
    /// Creates a batch from column names and column vectors.
    ///
    /// Returns `None` when the number of names and columns differ or the
    /// columns have unequal lengths.
    pub fn new(names: Vec<String>, columns: Vec<Vec<JsonValue>>) -> Option<Self> {
        if names.len() != columns.len() {
            return None;
        }
        if let Some(first) = columns.first()
            && columns.iter().any(|c| c.len() != first.len())
        {
            return None;
        }
        Some(Self { names, columns })
    }

    /// Creates a batch with the given columns and no rows.
    pub fn empty(names: Vec<String>) -> Self {
        let columns = vec![Vec::new(); names.len()];
        Self { names, columns }
    }

    /// Transposes row-major values into a batch.
    ///
    /// Short rows are padded with nulls and extra values are dropped, so the
    /// result always has exactly `names.len()` columns.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<JsonValue>>) -> Self {
        let mut columns: Vec<Vec<JsonValue>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for row in rows {
            let mut values = row.into_iter();
            for column in &mut columns {
                column.push(values.next().unwrap_or(JsonValue::Null));
            }
        }

        Self { names, columns }
    }

    /// Column names in declared order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.names.len()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// True when the batch holds no rows.
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Values of the column at `index`.
    pub fn column(&self, index: usize) -> Option<&[JsonValue]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Index of the first column whose name matches, ignoring ASCII case.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Values of the first column whose name matches, ignoring ASCII case.
    pub fn column_by_name(&self, name: &str) -> Option<&[JsonValue]> {
        self.position(name).and_then(|i| self.column(i))
    }

    /// Cell at `row` of the named column rendered as text.
    ///
    /// Strings are returned as-is, nulls as `None`, anything else through
    /// its JSON representation.
    pub fn text(&self, row: usize, name: &str) -> Option<String> {
        match self.column_by_name(name)?.get(row)? {
            JsonValue::Null => None,
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Values of one row in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&JsonValue>> {
        if index >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().filter_map(|c| c.get(index)).collect())
    }

    /// Keeps at most `limit` rows.
    pub fn truncate(&mut self, limit: usize) {
        for column in &mut self.columns {
            column.truncate(limit);
        }
    }

    /// Consumes the batch and returns its columns.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<JsonValue>>) {
        (self.names, self.columns)
    }
}

/// One autocomplete entry offered to the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Text shown in the completion list
    pub label: String,
    /// Short kind marker such as `kw` or `fn`
    pub type_label: String,
    /// Text inserted when the completion is accepted
    pub value: String,
    /// Higher sorts first
    pub priority: i32,
    /// Optional qualifier, e.g. the table a column belongs to
    pub context: Option<String>,
}

impl Completion {
    /// Creates a completion whose inserted value equals its label.
    pub fn keyword(label: &str, type_label: &str, priority: i32) -> Self {
        Self {
            label: label.to_string(),
            type_label: type_label.to_string(),
            value: label.to_string(),
            priority,
            context: None,
        }
    }
}

/// What a catalog node represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Top-level database
    Database,
    /// Schema within a database
    Schema,
    /// Base table
    Table,
    /// View
    View,
    /// Materialized view
    MaterializedView,
    /// Table over external storage
    ExternalTable,
    /// Column of a relation
    Column,
    /// Any other object kind, by its lower-cased source name
    Other(String),
}

impl NodeKind {
    /// Short label shown next to the node in a tree widget.
    pub fn label(&self) -> &str {
        match self {
            Self::Database => "db",
            Self::Schema => "s",
            Self::Table => "t",
            Self::View => "v",
            Self::MaterializedView => "mv",
            Self::ExternalTable => "et",
            Self::Column => "col",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Schema => write!(f, "schema"),
            Self::Table => write!(f, "table"),
            Self::View => write!(f, "view"),
            Self::MaterializedView => write!(f, "materialized view"),
            Self::ExternalTable => write!(f, "external table"),
            Self::Column => write!(f, "column"),
            Self::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Label returned for type codes missing from a [`TypeTable`].
pub const UNKNOWN_TYPE_LABEL: &str = "UNKNOWN";

/// One row of a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeEntry {
    /// Numeric code reported by the driver
    pub code: i32,
    /// Name the driver uses in metadata results
    pub wire_name: &'static str,
    /// Label shown to users
    pub label: &'static str,
}

/// Static mapping from driver type codes to human-readable names.
#[derive(Debug, Clone, Copy)]
pub struct TypeTable {
    entries: &'static [TypeEntry],
}

impl TypeTable {
    /// Wraps a static list of entries.
    pub const fn new(entries: &'static [TypeEntry]) -> Self {
        Self { entries }
    }

    /// Label for a driver type code.
    pub fn label(&self, code: i32) -> &'static str {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map_or(UNKNOWN_TYPE_LABEL, |e| e.label)
    }

    /// Label for a wire type name (case-insensitive), if known.
    pub fn label_for_name(&self, wire_name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.wire_name.eq_ignore_ascii_case(wire_name))
            .map(|e| e.label)
    }

    /// Code for a wire type name (case-insensitive), if known.
    pub fn code_for_name(&self, wire_name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|e| e.wire_name.eq_ignore_ascii_case(wire_name))
            .map(|e| e.code)
    }
}
