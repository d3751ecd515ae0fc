//! Snowflake metadata statements.

pub use crate::sql::{qualify, quote_identifier};

/// Lists every database visible to the session's role.
pub const SHOW_DATABASES: &str = "SHOW DATABASES";

/// Lists the schemas of one database.
pub fn show_schemas(database: &str) -> String {
    format!("SHOW SCHEMAS IN DATABASE {}", quote_identifier(database))
}

/// Lists tables, views, and other relations of one schema.
pub fn show_objects(database: &str, schema: &str) -> String {
    format!("SHOW TERSE OBJECTS IN SCHEMA {}", qualify(&[database, schema]))
}

/// Lists the columns of one relation (tables and views alike).
pub fn show_columns(database: &str, schema: &str, relation: &str) -> String {
    format!(
        "SHOW COLUMNS IN TABLE {}",
        qualify(&[database, schema, relation])
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_statements() {
        assert_eq!(show_schemas("SALES"), "SHOW SCHEMAS IN DATABASE \"SALES\"");
        assert_eq!(
            show_objects("SALES", "PUBLIC"),
            "SHOW TERSE OBJECTS IN SCHEMA \"SALES\".\"PUBLIC\""
        );
        assert_eq!(
            show_columns("SALES", "PUBLIC", "orders"),
            "SHOW COLUMNS IN TABLE \"SALES\".\"PUBLIC\".\"orders\""
        );
    }
}
