//! Identifier quoting shared by the adapters.
//!
//! Snowflake and SQLite both use ANSI double-quoted identifiers.

/// Double-quotes an identifier, doubling embedded quotes.
///
/// Quoted identifiers keep their case, which is what the catalog needs:
/// names come back from metadata queries in their stored case.
///
/// # Example
/// ```rust
/// use snowcat_core::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("SALES"), "\"SALES\"");
/// assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Joins quoted parts with dots, e.g. `"DB"."SCHEMA"."TABLE"`.
pub fn qualify(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| quote_identifier(part))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("my \"db\""), "\"my \"\"db\"\"\"");
        assert_eq!(quote_identifier(""), "\"\"");
    }

    #[test]
    fn test_qualify_joins_quoted_parts() {
        assert_eq!(qualify(&["main", "orders"]), "\"main\".\"orders\"");
        assert_eq!(qualify(&[]), "");
    }
}
