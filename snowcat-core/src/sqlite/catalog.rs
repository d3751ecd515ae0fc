//! Lazy SQLite catalog: databases, then relations, then columns.
//!
//! SQLite has no schema level. Every attached database (and `main`) is a
//! root; the `temp` database only holds session scratch tables and is left
//! out.

use super::type_mapping::affinity_label;
use crate::catalog::{CatalogBuilder, NamespaceNode, fetch_listing, make_fetcher};
use crate::driver::{DriverSession, query_batch};
use crate::models::NodeKind;
use crate::sql::{qualify, quote_identifier};
use crate::{AdapterError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const DATABASE_LIST: &str = "PRAGMA database_list";
const HIDDEN_DATABASES: &[&str] = &["temp"];

fn list_relations(database: &str) -> String {
    format!(
        "SELECT name, type FROM {}.sqlite_master \
         WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
        quote_identifier(database)
    )
}

fn list_columns(database: &str, relation: &str) -> String {
    format!(
        "PRAGMA {}.table_info({})",
        quote_identifier(database),
        quote_identifier(relation)
    )
}

/// Builds the database level of a SQLite catalog.
pub struct SqliteCatalogBuilder {
    session: Arc<dyn DriverSession>,
}

impl SqliteCatalogBuilder {
    /// Creates a builder that runs its queries on `session`.
    pub fn new(session: Arc<dyn DriverSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CatalogBuilder for SqliteCatalogBuilder {
    async fn build_root(&self) -> Result<Vec<NamespaceNode>> {
        let batch = query_batch(self.session.as_ref(), DATABASE_LIST)
            .await
            .map_err(AdapterError::query_failed)?;

        Ok((0..batch.num_rows())
            .filter_map(|row| batch.text(row, "name"))
            .filter(|name| !HIDDEN_DATABASES.contains(&name.as_str()))
            .map(|database| {
                NamespaceNode::branch(
                    quote_identifier(&database),
                    database.clone(),
                    NodeKind::Database,
                    make_fetcher(database, Arc::clone(&self.session), fetch_relations),
                )
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
struct RelationCoordinate {
    database: String,
    relation: String,
}

async fn fetch_relations(
    database: String,
    session: Arc<dyn DriverSession>,
) -> Result<Vec<NamespaceNode>> {
    let identifier = quote_identifier(&database);
    let batch = fetch_listing(session.as_ref(), &list_relations(&database), &identifier).await?;

    let mut nodes = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let Some(relation) = batch.text(row, "name") else {
            continue;
        };
        let kind = match batch.text(row, "type").as_deref() {
            Some("view") => NodeKind::View,
            _ => NodeKind::Table,
        };

        let coordinate = RelationCoordinate {
            database: database.clone(),
            relation: relation.clone(),
        };
        nodes.push(NamespaceNode::branch(
            qualify(&[database.as_str(), relation.as_str()]),
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
    let RelationCoordinate { database, relation } = coordinate;
    let identifier = qualify(&[database.as_str(), relation.as_str()]);
    let batch = fetch_listing(
        session.as_ref(),
        &list_columns(&database, &relation),
        &identifier,
    )
    .await?;

    let mut nodes = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let Some(column) = batch.text(row, "name") else {
            continue;
        };
        let declared = batch.text(row, "type").unwrap_or_default();

        nodes.push(
            NamespaceNode::leaf(
                qualify(&[database.as_str(), relation.as_str(), column.as_str()]),
                column.clone(),
                NodeKind::Column,
            )
            .with_query_name(quote_identifier(&column))
            .with_type_label(affinity_label(&declared)),
        );
    }

    Ok(nodes)
}
