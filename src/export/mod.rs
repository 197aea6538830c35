//! Export orchestration
//!
//! Sequences the per-table pipeline (introspect, map, extract, encode,
//! upload), isolates per-table failures according to the configured policy,
//! and aggregates a run summary. Tables are processed strictly one at a
//! time; nothing runs in the background after `run` returns.

use crate::catalog::{filter_excluded, Catalog};
use crate::config::{ExportConfig, FailurePolicy};
use crate::error::Result;
use crate::mapping::map_columns;
use crate::output::{backup_prefix, table_key, write_table_to_parquet, Destination};
use crate::types::{RunSummary, TableOutcome, TableRef};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Orchestrates one export run
///
/// Catalog and destination are constructor-injected: create the exporter at
/// run start, drop it at run end. No shared process-wide state.
pub struct Exporter {
    catalog: Arc<dyn Catalog>,
    destination: Destination,
    config: ExportConfig,
    scratch_dir: PathBuf,
}

impl Exporter {
    /// Create an exporter over an injected catalog and destination
    pub fn new(catalog: Arc<dyn Catalog>, destination: Destination, config: ExportConfig) -> Self {
        Self {
            catalog,
            destination,
            config,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Override where scratch artifacts are written
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Run the export with the current wall-clock time
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(Utc::now()).await
    }

    /// Run the export with an explicit clock
    ///
    /// The date partition is computed once here and shared by every table in
    /// the run, even when the run spans a UTC midnight boundary.
    ///
    /// Enumeration failure is fatal and propagates. Per-table failures are
    /// handled according to `on_table_error`: the default records the
    /// failure and moves on, so the run still completes (and reports
    /// completion) even if every table failed.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let schema = self.config.schema();

        let all_tables = self.catalog.list_tables(schema).await?;
        tracing::info!("Found {} tables in schema '{schema}'", all_tables.len());

        let tables = filter_excluded(all_tables, &self.config.exclude_tables);
        tracing::info!("Exporting {} tables", tables.len());

        let prefix = backup_prefix(&self.config.root_path, now);

        let mut summary = RunSummary::default();
        for table in tables {
            match self.export_table(&table, &prefix).await {
                Ok((rows, location)) => {
                    tracing::info!("Saved table {table} to {location} ({rows} rows)");
                    summary.outcomes.push(TableOutcome::Succeeded {
                        table,
                        rows,
                        location,
                    });
                }
                Err(e) => {
                    if self.config.on_table_error == FailurePolicy::FailFast {
                        return Err(e);
                    }
                    tracing::error!("Error exporting table {table}: {e}");
                    summary.outcomes.push(TableOutcome::Failed {
                        table,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Export run complete: {}/{} tables succeeded",
            summary.succeeded(),
            summary.total_tables()
        );
        Ok(summary)
    }

    /// Run the full pipeline for one table
    async fn export_table(&self, table: &TableRef, prefix: &str) -> Result<(usize, String)> {
        let columns = self.catalog.columns(table).await?;
        let fields = map_columns(&columns);
        let rows = self.catalog.fetch_rows(table, &fields).await?;

        // Artifact name is keyed by table name, so sequential tables never
        // collide on scratch storage.
        let scratch = self.scratch_dir.join(format!("{}.parquet", table.name));

        let written = match write_table_to_parquet(&scratch, &table.to_string(), &fields, &rows) {
            Ok(written) => written,
            Err(e) => {
                let _ = std::fs::remove_file(&scratch);
                return Err(e);
            }
        };

        let key = table_key(prefix, &table.name);
        let location = self.destination.upload_file(&scratch, &key).await?;

        Ok((written, location))
    }
}

#[cfg(test)]
mod tests;
