//! Source database catalog access
//!
//! The `Catalog` trait is the seam between the export pipeline and the
//! source database: table enumeration, column introspection and row
//! materialization. The orchestrator receives a catalog by injection, so
//! tests can substitute an in-memory implementation.

mod postgres;

pub use postgres::PgCatalog;

use crate::error::Result;
use crate::mapping::MappedField;
use crate::types::{ColumnDescriptor, RowSet, TableRef};
use async_trait::async_trait;

/// Read-only access to the source database
#[async_trait]
pub trait Catalog: Send + Sync {
    /// List the base tables of a schema, in catalog order
    ///
    /// Fails with a catalog error if the query cannot be executed; no retry.
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableRef>>;

    /// The ordered column set of a table, exactly as declared
    ///
    /// Declaration order is significant: row tuples and schema fields must
    /// align positionally all the way to the columnar writer.
    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>>;

    /// Materialize all rows of a table via a single unrestricted scan
    ///
    /// Row order is whatever the engine returns; there is no ORDER BY, so it
    /// is not deterministic across runs. The whole table is held in memory,
    /// which bounds this pipeline to small and medium tables. A streaming
    /// row source would slot in behind this method.
    async fn fetch_rows(&self, table: &TableRef, fields: &[MappedField]) -> Result<RowSet>;
}

/// Drop excluded tables from an enumeration result
///
/// Matching is exact string comparison on `schema.table`; no wildcards.
pub fn filter_excluded(tables: Vec<TableRef>, exclusions: &[String]) -> Vec<TableRef> {
    tables
        .into_iter()
        .filter(|t| !exclusions.iter().any(|e| e == &t.to_string()))
        .collect()
}
