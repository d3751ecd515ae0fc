//! Snowflake-specific editor completions.
//!
//! Hosts already complete ANSI keywords; these are the words and functions
//! that only Snowflake understands.

use crate::models::Completion;

const KEYWORD_PRIORITY: i32 = 1000;
const FUNCTION_PRIORITY: i32 = 1000;

const SNOWFLAKE_KEYWORDS: &[&str] = &[
    "alter warehouse",
    "ilike",
    "qualify",
    "sample",
    "tablesample",
    "lateral flatten",
    "match_recognize",
    "pivot",
    "unpivot",
    "at",
    "before",
    "changes",
    "undrop",
    "clone",
    "copy into",
    "put",
    "get",
    "list",
    "remove",
    "stage",
    "file format",
    "pipe",
    "stream",
    "task",
    "warehouse",
    "resource monitor",
    "masking policy",
    "row access policy",
    "share",
    "secure",
    "transient",
    "dynamic table",
    "target_lag",
    "iceberg",
    "cluster by",
    "data_retention_time_in_days",
    "show",
    "describe",
    "use role",
    "use warehouse",
    "use database",
    "use schema",
    "execute immediate",
    "call",
];

const SNOWFLAKE_FUNCTIONS: &[&str] = &[
    "array_agg",
    "array_construct",
    "array_contains",
    "array_size",
    "arrays_overlap",
    "as_varchar",
    "boolor_agg",
    "convert_timezone",
    "current_account",
    "current_database",
    "current_region",
    "current_role",
    "current_schema",
    "current_session",
    "current_warehouse",
    "dateadd",
    "datediff",
    "date_trunc",
    "div0",
    "equal_null",
    "flatten",
    "generator",
    "get_ddl",
    "get_path",
    "hash_agg",
    "iff",
    "ifnull",
    "is_null_value",
    "last_query_id",
    "listagg",
    "median",
    "nvl2",
    "object_agg",
    "object_construct",
    "object_keys",
    "parse_json",
    "parse_xml",
    "ratio_to_report",
    "regexp_substr",
    "result_scan",
    "seq4",
    "seq8",
    "split_part",
    "split_to_table",
    "strtok_to_array",
    "system$clustering_information",
    "system$typeof",
    "time_slice",
    "to_array",
    "to_variant",
    "try_cast",
    "try_parse_json",
    "try_to_date",
    "try_to_number",
    "try_to_timestamp",
    "typeof",
    "uniform",
    "uuid_string",
    "zeroifnull",
];

/// Keyword (`kw`) and function (`fn`) completions for Snowflake SQL.
pub fn snowflake_completions() -> Vec<Completion> {
    SNOWFLAKE_KEYWORDS
        .iter()
        .map(|kw| Completion::keyword(kw, "kw", KEYWORD_PRIORITY))
        .chain(
            SNOWFLAKE_FUNCTIONS
                .iter()
                .map(|f| Completion::keyword(f, "fn", FUNCTION_PRIORITY)),
        )
        .collect()
}
