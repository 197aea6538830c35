//! Core data model for the export pipeline
//!
//! Shared types that flow between the catalog, writer, uploader and
//! orchestrator stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-qualified table reference
///
/// Identity is the (schema, name) pair. Produced by table enumeration and
/// treated as read-only by all downstream stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema the table lives in
    pub schema: String,
    /// Table name within the schema
    pub name: String,
}

impl TableRef {
    /// Create a new table reference
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A column as declared in the catalog
///
/// One ordered set per table, fetched fresh on every export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Source type tag as reported by the catalog (e.g. "int8", "timestamptz")
    pub source_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, source_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            nullable,
        }
    }
}

/// All rows of one table, each row an object keyed by column name
///
/// Owned by the current table's pipeline iteration and dropped once the
/// Parquet artifact has been written.
pub type RowSet = Vec<serde_json::Value>;

/// Outcome of exporting a single table
#[derive(Debug, Clone)]
pub enum TableOutcome {
    /// The table was written and uploaded
    Succeeded {
        /// The table that was exported
        table: TableRef,
        /// Number of rows written
        rows: usize,
        /// Resolved location in the object store
        location: String,
    },
    /// A pipeline stage failed for this table
    Failed {
        /// The table that failed
        table: TableRef,
        /// Why it failed
        reason: String,
    },
}

impl TableOutcome {
    /// Whether this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// The table this outcome belongs to
    pub fn table(&self) -> &TableRef {
        match self {
            Self::Succeeded { table, .. } | Self::Failed { table, .. } => table,
        }
    }
}

/// Aggregated result of one export run
///
/// Created when orchestration starts, finalized once every table has been
/// attempted, never mutated afterward.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per-table outcomes in processing order
    pub outcomes: Vec<TableOutcome>,
}

impl RunSummary {
    /// Number of tables attempted
    pub fn total_tables(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of tables exported successfully
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of tables that failed
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Caller-facing run result
///
/// The caller sees only this aggregate signal; per-table failures are
/// observable via logs and `RunSummary`, not via the return value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    /// "ok" when the run completed, "error" when it failed outright
    pub status: String,
    /// Human-readable detail
    pub detail: String,
}

impl RunStatus {
    /// Build the status for a completed run
    pub fn ok(summary: &RunSummary) -> Self {
        Self {
            status: "ok".to_string(),
            detail: format!(
                "exported {} of {} tables ({} failed)",
                summary.succeeded(),
                summary.total_tables(),
                summary.failed()
            ),
        }
    }

    /// Build the status for a run that failed before completing
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            detail: detail.into(),
        }
    }
}
