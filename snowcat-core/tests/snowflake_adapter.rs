//! Snowflake adapter behavior against a scripted driver session.
//!
//! These tests cover the full adapter surface: option handling at connect,
//! error translation, row limits, and the lazy, memoized catalog.

mod common;

use common::{Response, ScriptedConnector, ScriptedSession};
use serde_json::json;
use snowcat_core::driver::{DriverColumn, DriverError};
use snowcat_core::snowflake::{self, PASSWORD_ENV_VAR, SnowflakeAdapter, sql};
use snowcat_core::{
    Adapter, AdapterError, AdapterOptions, ChildState, Connection, NodeKind, PluginRegistry,
};
use std::sync::Arc;

const SCHEMAS_IN_SALES: &str = "SHOW SCHEMAS IN DATABASE \"SALES\"";
const SCHEMAS_IN_MARKETING: &str = "SHOW SCHEMAS IN DATABASE \"MARKETING\"";
const OBJECTS_IN_PUBLIC: &str = "SHOW TERSE OBJECTS IN SCHEMA \"SALES\".\"PUBLIC\"";
const COLUMNS_IN_ORDERS: &str = "SHOW COLUMNS IN TABLE \"SALES\".\"PUBLIC\".\"ORDERS\"";

fn login_options() -> AdapterOptions {
    AdapterOptions::from_pairs([
        ("username", "analyst"),
        ("account", "myorg-myaccount"),
        ("password", "hunter2"),
    ])
}

/// A warehouse with two regular databases, one application, and one
/// fully scripted path down to the columns of SALES.PUBLIC.ORDERS.
fn warehouse() -> Arc<ScriptedSession> {
    let session = ScriptedSession::new();

    session.respond(
        sql::SHOW_DATABASES,
        Response::text_rows(
            &["created_on", "name", "kind"],
            vec![
                vec![json!("2024-01-01"), json!("SALES"), json!("STANDARD")],
                vec![json!("2024-01-02"), json!("SNOWFLAKE_APP"), json!("APPLICATION")],
                vec![json!("2024-01-03"), json!("MARKETING"), json!("STANDARD")],
                vec![json!("2024-01-04"), json!("PKG"), json!("APPLICATION PACKAGE")],
            ],
        ),
    );
    session.respond(
        SCHEMAS_IN_SALES,
        Response::text_rows(
            &["name", "database_name"],
            vec![
                vec![json!("INFORMATION_SCHEMA"), json!("SALES")],
                vec![json!("PUBLIC"), json!("SALES")],
            ],
        ),
    );
    session.respond(
        SCHEMAS_IN_MARKETING,
        Response::text_rows(&["name"], vec![vec![json!("CAMPAIGNS")]]),
    );
    session.respond(
        OBJECTS_IN_PUBLIC,
        Response::text_rows(
            &["name", "kind", "database_name", "schema_name"],
            vec![
                vec![json!("ORDERS"), json!("TABLE"), json!("SALES"), json!("PUBLIC")],
                vec![json!("DAILY_TOTALS"), json!("VIEW"), json!("SALES"), json!("PUBLIC")],
                vec![
                    json!("ORDER_ROLLUP"),
                    json!("MATERIALIZED_VIEW"),
                    json!("SALES"),
                    json!("PUBLIC"),
                ],
            ],
        ),
    );
    session.respond(
        COLUMNS_IN_ORDERS,
        Response::text_rows(
            &["table_name", "schema_name", "column_name", "data_type"],
            vec![
                vec![
                    json!("ORDERS"),
                    json!("PUBLIC"),
                    json!("ID"),
                    json!(r#"{"type":"FIXED","precision":38,"scale":0,"nullable":false}"#),
                ],
                vec![
                    json!("ORDERS"),
                    json!("PUBLIC"),
                    json!("placed at"),
                    json!(r#"{"type":"TIMESTAMP_NTZ","precision":0,"scale":9,"nullable":true}"#),
                ],
            ],
        ),
    );
    session.respond(
        "select 1 as a, 2 as a, 3 as a",
        Response::Rows {
            columns: vec![
                DriverColumn::new("A", 0),
                DriverColumn::new("A", 0),
                DriverColumn::new("A", 0),
            ],
            rows: vec![vec![json!(1), json!(2), json!(3)]],
        },
    );
    session.respond(
        "select n from numbers",
        Response::Rows {
            columns: vec![DriverColumn::new("N", 0)],
            rows: vec![vec![json!(1)], vec![json!(2)], vec![json!(3)]],
        },
    );
    session.respond("create table foo (a int)", Response::NoResult);

    session
}

async fn connect(session: &Arc<ScriptedSession>) -> Box<dyn Connection> {
    let connector = ScriptedConnector::new(Arc::clone(session));
    SnowflakeAdapter::new(Vec::new(), login_options(), connector)
        .connect()
        .await
        .unwrap()
}

fn expect_err<T>(result: snowcat_core::Result<T>) -> AdapterError {
    match result {
        Err(e) => e,
        Ok(_) => panic!("expected an error"),
    }
}

// =============================================================================
// Connecting
// =============================================================================

#[tokio::test]
async fn test_missing_username_fails_at_connect() {
    let connector = ScriptedConnector::new(warehouse());
    let adapter = SnowflakeAdapter::new(
        Vec::new(),
        AdapterOptions::from_pairs([("account", "myorg-myaccount")]),
        Arc::clone(&connector) as Arc<dyn snowflake::SnowflakeConnector>,
    );

    let error = expect_err(adapter.connect().await);
    assert!(error.is_connection());
    assert!(error.message().contains("username"));
    assert_eq!(connector.connects(), 0);
}

#[tokio::test]
async fn test_malformed_account_fails_at_connect_not_first_query() {
    let connector = ScriptedConnector::new(warehouse());
    let adapter = SnowflakeAdapter::new(
        Vec::new(),
        AdapterOptions::from_pairs([("username", "analyst"), ("account", "not an account!")]),
        Arc::clone(&connector) as Arc<dyn snowflake::SnowflakeConnector>,
    );

    let error = expect_err(adapter.connect().await);
    assert!(error.is_connection());
    assert_eq!(connector.connects(), 0);
}

#[tokio::test]
async fn test_rejected_login_is_connection_error() {
    let connector = ScriptedConnector::new(warehouse());
    connector.reject_logins(
        DriverError::new("Incorrect username or password was specified.").with_code(390100),
    );
    let adapter = SnowflakeAdapter::new(
        Vec::new(),
        login_options(),
        Arc::clone(&connector) as Arc<dyn snowflake::SnowflakeConnector>,
    );

    let error = expect_err(adapter.connect().await);
    assert!(error.is_connection());
    assert_eq!(error.title(), snowcat_core::error::CONNECTION_ERROR_TITLE);
    assert!(error.message().contains("Incorrect username or password"));
    assert!(!error.to_string().contains("hunter2"));
}

#[tokio::test]
async fn test_session_params_passed_to_connector() {
    let connector = ScriptedConnector::new(warehouse());
    let mut options = login_options();
    options.database = Some("sales".to_string());
    options.warehouse = Some("COMPUTE_WH".to_string());
    let adapter = SnowflakeAdapter::new(
        Vec::new(),
        options,
        Arc::clone(&connector) as Arc<dyn snowflake::SnowflakeConnector>,
    );

    adapter.connect().await.unwrap();

    let params = connector.last_params().unwrap();
    assert_eq!(params.user, "analyst");
    assert_eq!(params.database.as_deref(), Some("SALES"));
    assert_eq!(params.warehouse.as_deref(), Some("COMPUTE_WH"));
    assert_eq!(params.password(), Some("hunter2"));
    assert_eq!(params.host, "https://myorg-myaccount.snowflakecomputing.com");
}

#[test]
fn test_password_from_environment_reaches_connector() {
    temp_env::with_var(PASSWORD_ENV_VAR, Some("env-secret"), || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let connector = ScriptedConnector::new(warehouse());
            let adapter = SnowflakeAdapter::new(
                Vec::new(),
                AdapterOptions::from_pairs([("username", "analyst"), ("account", "xy12345")]),
                Arc::clone(&connector) as Arc<dyn snowflake::SnowflakeConnector>,
            );

            adapter.connect().await.unwrap();
            assert_eq!(
                connector.last_params().unwrap().password(),
                Some("env-secret")
            );
        });
    });
}

// =============================================================================
// Executing
// =============================================================================

#[tokio::test]
async fn test_duplicate_column_names_are_preserved() {
    let session = warehouse();
    let connection = connect(&session).await;

    let mut cursor = connection
        .execute("select 1 as a, 2 as a, 3 as a")
        .await
        .unwrap()
        .unwrap();

    let columns = cursor.columns();
    assert_eq!(columns.len(), 3);
    assert!(columns.iter().all(|c| c.name == "A" && c.type_label == "NUMBER"));

    let batch = cursor.fetch_all().await.unwrap();
    assert_eq!(batch.num_columns(), 3);
    assert_eq!(batch.row(0), Some(vec![&json!(1), &json!(2), &json!(3)]));
}

#[tokio::test]
async fn test_set_limit_two_of_three_rows() {
    let session = warehouse();
    let connection = connect(&session).await;

    let mut cursor = connection
        .execute("select n from numbers")
        .await
        .unwrap()
        .unwrap();
    let batch = cursor.set_limit(2).fetch_all().await.unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.column(0), Some(&[json!(1), json!(2)][..]));
}

#[tokio::test]
async fn test_syntax_error_is_query_error() {
    let session = warehouse();
    let connection = connect(&session).await;

    let error = expect_err(connection.execute("selec;").await);
    assert!(error.is_query());
    assert!(error.message().contains("syntax error"));
    assert!(std::error::Error::source(&error).is_some());
}

#[tokio::test]
async fn test_ddl_returns_no_cursor() {
    let session = warehouse();
    let connection = connect(&session).await;

    assert!(
        connection
            .execute("create table foo (a int)")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_completions_are_snowflake_specific() {
    let session = warehouse();
    let connection = connect(&session).await;

    let completions = connection.completions().await.unwrap();
    assert!(completions.iter().any(|c| c.type_label == "kw"));
    assert!(completions.iter().any(|c| c.type_label == "fn"));
    assert!(completions.iter().all(|c| c.priority == 1000));
    assert_eq!(session.total_calls(), 0);
}

#[tokio::test]
async fn test_close_closes_session() {
    let session = warehouse();
    let connection = connect(&session).await;

    connection.close().await;
    assert_eq!(session.close_calls(), 1);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_filters_application_databases() {
    let session = warehouse();
    let connection = connect(&session).await;

    let catalog = connection.catalog().await.unwrap();
    let names: Vec<&str> = catalog.roots().iter().map(|n| n.display_name()).collect();

    assert_eq!(names, vec!["SALES", "MARKETING"]);
    assert!(catalog.roots().iter().all(|n| n.type_label() == "db"));
    assert_eq!(catalog.roots()[0].identifier(), "\"SALES\"");
}

#[tokio::test]
async fn test_catalog_build_runs_one_round_trip() {
    let session = warehouse();
    let connection = connect(&session).await;

    let catalog = connection.catalog().await.unwrap();

    assert_eq!(session.total_calls(), 1);
    assert_eq!(session.calls(sql::SHOW_DATABASES), 1);
    for root in catalog.roots() {
        assert!(matches!(root.child_state().await, ChildState::Unfetched));
    }
}

#[tokio::test]
async fn test_expansion_is_memoized() {
    let session = warehouse();
    let connection = connect(&session).await;
    let catalog = connection.catalog().await.unwrap();
    let sales = &catalog.roots()[0];

    let first = sales.children().await.unwrap();
    let second = sales.children().await.unwrap();

    assert_eq!(session.calls(SCHEMAS_IN_SALES), 1);
    assert_eq!(first.len(), 2);
    assert!(Arc::ptr_eq(&first[1], &second[1]));
    assert_eq!(first[1].identifier(), "\"SALES\".\"PUBLIC\"");
    assert_eq!(session.calls(SCHEMAS_IN_MARKETING), 0);
}

#[tokio::test]
async fn test_failed_expansion_can_be_retried() {
    let session = warehouse();
    session.respond(SCHEMAS_IN_SALES, Response::fail("Database 'SALES' does not exist"));
    let connection = connect(&session).await;
    let catalog = connection.catalog().await.unwrap();
    let sales = &catalog.roots()[0];

    let error = expect_err(sales.children().await);
    assert!(error.is_query());
    assert!(error.message().contains("\"SALES\""));
    assert!(matches!(sales.child_state().await, ChildState::Unfetched));

    session.respond(
        SCHEMAS_IN_SALES,
        Response::text_rows(&["name"], vec![vec![json!("PUBLIC")]]),
    );
    let children = sales.children().await.unwrap();

    assert_eq!(children.len(), 1);
    assert_eq!(session.calls(SCHEMAS_IN_SALES), 2);
}

#[tokio::test]
async fn test_failed_sibling_does_not_affect_resolved_subtree() {
    let session = warehouse();
    session.respond(SCHEMAS_IN_MARKETING, Response::fail("Insufficient privileges"));
    let connection = connect(&session).await;
    let catalog = connection.catalog().await.unwrap();

    let sales_schemas = catalog.roots()[0].children().await.unwrap();
    assert!(catalog.roots()[1].children().await.is_err());

    // SALES stays resolved and keeps expanding
    let again = catalog.roots()[0].children().await.unwrap();
    assert_eq!(again.len(), sales_schemas.len());
    let relations = again[1].children().await.unwrap();
    assert_eq!(relations.len(), 3);
    assert_eq!(session.calls(SCHEMAS_IN_SALES), 1);
}

#[tokio::test]
async fn test_relations_and_columns() {
    let session = warehouse();
    let connection = connect(&session).await;
    let catalog = connection.catalog().await.unwrap();

    let schemas = catalog.roots()[0].children().await.unwrap();
    let relations = schemas[1].children().await.unwrap();

    let kinds: Vec<(&str, &NodeKind)> = relations
        .iter()
        .map(|r| (r.display_name(), r.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("ORDERS", &NodeKind::Table),
            ("DAILY_TOTALS", &NodeKind::View),
            ("ORDER_ROLLUP", &NodeKind::MaterializedView),
        ]
    );

    let columns = relations[0].children().await.unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].type_label(), "NUMBER");
    assert_eq!(columns[1].type_label(), "TIMESTAMP_NTZ");
    assert_eq!(columns[1].query_name(), "\"placed at\"");
    assert_eq!(
        columns[1].identifier(),
        "\"SALES\".\"PUBLIC\".\"ORDERS\".\"placed at\""
    );
    assert!(!columns[0].is_expandable());
    assert!(matches!(columns[0].child_state().await, ChildState::Empty));

    // Only the expanded path was fetched
    assert_eq!(session.calls(COLUMNS_IN_ORDERS), 1);
    assert_eq!(session.total_calls(), 4);
}

#[tokio::test]
async fn test_root_failure_is_catalog_unavailable() {
    let session = warehouse();
    session.respond(
        sql::SHOW_DATABASES,
        Response::fail("Insufficient privileges to operate on account"),
    );
    let connection = connect(&session).await;

    let error = expect_err(connection.catalog().await);
    assert!(matches!(error, AdapterError::CatalogUnavailable { .. }));
}

#[tokio::test]
async fn test_snapshot_reports_failing_subtree_in_place() {
    let session = warehouse();
    session.respond(SCHEMAS_IN_MARKETING, Response::fail("Insufficient privileges"));
    let connection = connect(&session).await;
    let catalog = connection.catalog().await.unwrap();

    let snapshot = catalog.snapshot(1).await;

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].children.len(), 2);
    assert!(snapshot[1].error.is_some());
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_registry_creates_snowflake_adapter() {
    let session = warehouse();
    let mut registry = PluginRegistry::new();
    snowflake::register(&mut registry, ScriptedConnector::new(Arc::clone(&session))).unwrap();

    assert!(registry.contains(snowflake::PLUGIN_NAME));
    let options = registry.options_for(snowflake::PLUGIN_NAME).unwrap();
    assert_eq!(options.len(), 8);
    assert!(options.iter().any(|o| o.name == "account" && o.short == Some('A')));

    let adapter = registry
        .create(snowflake::PLUGIN_NAME, Vec::new(), login_options())
        .unwrap();
    let connection = adapter.connect().await.unwrap();
    assert!(connection.execute("create table foo (a int)").await.unwrap().is_none());

    let error = snowflake::register(&mut registry, ScriptedConnector::new(session)).unwrap_err();
    assert!(matches!(error, AdapterError::Configuration { .. }));
}
