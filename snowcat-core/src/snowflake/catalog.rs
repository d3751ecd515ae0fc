//! Lazy Snowflake catalog.
//!
//! Every level below the databases is deferred to a [`ChildFetcher`] bound
//! to its parent's coordinates. `SHOW` results are read by column name, so
//! extra or reordered columns in newer server versions are harmless.

use super::sql::{self, qualify, quote_identifier};
use super::types::column_type_label;
use crate::catalog::{CatalogBuilder, NamespaceNode, fetch_listing, make_fetcher};
use crate::driver::{DriverSession, query_batch};
use crate::models::{ColumnarBatch, NodeKind, UNKNOWN_TYPE_LABEL};
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Database kinds that cannot be queried and are hidden from the catalog.
pub const NON_QUERYABLE_DATABASE_KINDS: &[&str] = &["APPLICATION", "APPLICATION PACKAGE"];

/// Builds the database level of a Snowflake catalog.
pub struct SnowflakeCatalogBuilder {
    session: Arc<dyn DriverSession>,
}

impl SnowflakeCatalogBuilder {
    /// Creates a builder that runs its queries on `session`.
    pub fn new(session: Arc<dyn DriverSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CatalogBuilder for SnowflakeCatalogBuilder {
    async fn build_root(&self) -> Result<Vec<NamespaceNode>> {
        let batch = query_batch(self.session.as_ref(), sql::SHOW_DATABASES)
            .await
            .map_err(AdapterError::query_failed)?;

        let mut nodes = Vec::new();
        for row in 0..batch.num_rows() {
            let Some(name) = batch.text(row, "name") else {
                continue;
            };

            let kind = batch.text(row, "kind").unwrap_or_default();
            if is_non_queryable(&kind) {
                tracing::debug!("Skipping {} database {}", kind, name);
                continue;
            }

            nodes.push(database_node(&name, Arc::clone(&self.session)));
        }

        Ok(nodes)
    }
}

fn is_non_queryable(kind: &str) -> bool {
    NON_QUERYABLE_DATABASE_KINDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(kind.trim()))
}

#[derive(Debug, Clone)]
struct SchemaCoordinate {
    database: String,
    schema: String,
}

#[derive(Debug, Clone)]
struct RelationCoordinate {
    database: String,
    schema: String,
    relation: String,
}

fn database_node(name: &str, session: Arc<dyn DriverSession>) -> NamespaceNode {
    let identifier = quote_identifier(name);
    NamespaceNode::branch(
        identifier,
        name,
        NodeKind::Database,
        make_fetcher(name.to_string(), session, fetch_schemas),
    )
}

async fn fetch_schemas(database: String, session: Arc<dyn DriverSession>) -> Result<Vec<NamespaceNode>> {
    let identifier = quote_identifier(&database);
    let batch = fetch_listing(session.as_ref(), &sql::show_schemas(&database), &identifier).await?;

    Ok(names(&batch)
        .into_iter()
        .map(|schema| {
            let coordinate = SchemaCoordinate {
                database: database.clone(),
                schema: schema.clone(),
            };
            NamespaceNode::branch(
                qualify(&[database.as_str(), schema.as_str()]),
                schema,
                NodeKind::Schema,
                make_fetcher(coordinate, Arc::clone(&session), fetch_relations),
            )
        })
        .collect())
}

async fn fetch_relations(
    coordinate: SchemaCoordinate,
    session: Arc<dyn DriverSession>,
) -> Result<Vec<NamespaceNode>> {
    let SchemaCoordinate { database, schema } = coordinate;
    let identifier = qualify(&[database.as_str(), schema.as_str()]);
    let batch = fetch_listing(
        session.as_ref(),
        &sql::show_objects(&database, &schema),
        &identifier,
    )
    .await?;

    let mut nodes = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let Some(relation) = batch.text(row, "name") else {
            continue;
        };
        let kind = relation_kind(batch.text(row, "kind").as_deref().unwrap_or_default());

        let coordinate = RelationCoordinate {
            database: database.clone(),
            schema: schema.clone(),
            relation: relation.clone(),
        };
        nodes.push(NamespaceNode::branch(
            qualify(&[database.as_str(), schema.as_str(), relation.as_str()]),
            relation,
            kind,
            make_fetcher(coordinate, Arc::clone(&session), fetch_columns),
        ));
    }

    Ok(nodes)
}

async fn fetch_columns(
    coordinate: RelationCoordinate,
    session: Arc<dyn DriverSession>,
) -> Result<Vec<NamespaceNode>> {
    let RelationCoordinate {
        database,
        schema,
        relation,
    } = coordinate;
    let identifier = qualify(&[database.as_str(), schema.as_str(), relation.as_str()]);
    let batch = fetch_listing(
        session.as_ref(),
        &sql::show_columns(&database, &schema, &relation),
        &identifier,
    )
    .await?;

    let mut nodes = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let Some(column) = batch.text(row, "column_name") else {
            continue;
        };
        let type_label = batch
            .text(row, "data_type")
            .map_or_else(|| UNKNOWN_TYPE_LABEL.to_string(), |t| column_type_label(&t));

        nodes.push(
            NamespaceNode::leaf(
                qualify(&[database.as_str(), schema.as_str(), relation.as_str(), column.as_str()]),
                column.clone(),
                NodeKind::Column,
            )
            .with_query_name(quote_identifier(&column))
            .with_type_label(type_label),
        );
    }

    Ok(nodes)
}

/// Maps the `kind` column of `SHOW OBJECTS` to a node kind.
fn relation_kind(kind: &str) -> NodeKind {
    match kind.trim().to_uppercase().replace('_', " ").as_str() {
        "TABLE" => NodeKind::Table,
        "VIEW" => NodeKind::View,
        "MATERIALIZED VIEW" => NodeKind::MaterializedView,
        "EXTERNAL TABLE" => NodeKind::ExternalTable,
        "" => NodeKind::Other("?".to_string()),
        other => NodeKind::Other(other.to_lowercase()),
    }
}

fn names(batch: &ColumnarBatch) -> Vec<String> {
    (0..batch.num_rows())
        .filter_map(|row| batch.text(row, "name"))
        .collect()
}
