//! Tests for export orchestration

use super::*;
use crate::catalog::Catalog;
use crate::error::Error;
use crate::mapping::MappedField;
use crate::types::{ColumnDescriptor, RowSet};
use async_trait::async_trait;
use chrono::TimeZone;
use serde_json::json;
use std::collections::HashMap;

/// In-memory catalog for orchestration tests
#[derive(Default)]
struct FakeCatalog {
    tables: Vec<TableRef>,
    columns: HashMap<String, Vec<ColumnDescriptor>>,
    rows: HashMap<String, RowSet>,
    fail_enumeration: bool,
    fail_fetch_for: Option<String>,
}

impl FakeCatalog {
    fn with_table(mut self, schema: &str, name: &str, rows: RowSet) -> Self {
        let table = TableRef::new(schema, name);
        self.columns.insert(
            table.to_string(),
            vec![
                ColumnDescriptor::new("id", "int8", false),
                ColumnDescriptor::new("label", "text", true),
            ],
        );
        self.rows.insert(table.to_string(), rows);
        self.tables.push(table);
        self
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_tables(&self, _schema: &str) -> crate::error::Result<Vec<TableRef>> {
        if self.fail_enumeration {
            return Err(Error::catalog("catalog unavailable"));
        }
        Ok(self.tables.clone())
    }

    async fn columns(&self, table: &TableRef) -> crate::error::Result<Vec<ColumnDescriptor>> {
        self.columns
            .get(&table.to_string())
            .cloned()
            .ok_or_else(|| Error::catalog(format!("unknown table {table}")))
    }

    async fn fetch_rows(
        &self,
        table: &TableRef,
        _fields: &[MappedField],
    ) -> crate::error::Result<RowSet> {
        if self.fail_fetch_for.as_deref() == Some(table.to_string().as_str()) {
            return Err(Error::catalog(format!("scan failed for {table}")));
        }
        self.rows
            .get(&table.to_string())
            .cloned()
            .ok_or_else(|| Error::catalog(format!("unknown table {table}")))
    }
}

fn sample_rows() -> RowSet {
    vec![
        json!({"id": 1, "label": "a"}),
        json!({"id": 2, "label": null}),
    ]
}

fn test_config() -> ExportConfig {
    serde_json::from_value(json!({
        "db_user": "u", "db_host": "h", "db_database": "d",
        "db_schema": "core", "db_password": "p",
        "root_path": "backups"
    }))
    .unwrap()
}

fn exporter(catalog: FakeCatalog, config: ExportConfig, dir: &std::path::Path) -> Exporter {
    let dest = Destination::local(dir.join("store")).unwrap();
    Exporter::new(Arc::new(catalog), dest, config).with_scratch_dir(dir.join("scratch"))
}

fn setup_dirs(dir: &std::path::Path) {
    std::fs::create_dir_all(dir.join("scratch")).unwrap();
}

#[tokio::test]
async fn test_failure_isolation() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let mut catalog = FakeCatalog::default()
        .with_table("core", "one", sample_rows())
        .with_table("core", "two", sample_rows())
        .with_table("core", "three", sample_rows());
    catalog.fail_fetch_for = Some("core.two".to_string());

    let exporter = exporter(catalog, test_config(), dir.path());
    let summary = exporter
        .run_at(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap())
        .await
        .unwrap();

    // Tables 1 and 3 are still attempted and succeed
    assert_eq!(summary.total_tables(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);

    let failed: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.table().to_string())
        .collect();
    assert_eq!(failed, vec!["core.two"]);
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let mut catalog = FakeCatalog::default().with_table("core", "one", sample_rows());
    catalog.fail_enumeration = true;

    let exporter = exporter(catalog, test_config(), dir.path());
    let err = exporter.run().await.unwrap_err();
    assert!(matches!(err, Error::Catalog { .. }));

    // No per-table processing happened
    assert!(std::fs::read_dir(dir.path().join("scratch"))
        .unwrap()
        .next()
        .is_none());
}

#[tokio::test]
async fn test_fail_fast_policy() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let mut catalog = FakeCatalog::default()
        .with_table("core", "one", sample_rows())
        .with_table("core", "two", sample_rows())
        .with_table("core", "three", sample_rows());
    catalog.fail_fetch_for = Some("core.two".to_string());

    let mut config = test_config();
    config.on_table_error = FailurePolicy::FailFast;

    let exporter = exporter(catalog, config, dir.path());
    let err = exporter.run().await.unwrap_err();
    assert!(err.to_string().contains("core.two"));
}

#[tokio::test]
async fn test_all_tables_failed_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let mut catalog = FakeCatalog::default().with_table("core", "one", sample_rows());
    catalog.fail_fetch_for = Some("core.one".to_string());

    let exporter = exporter(catalog, test_config(), dir.path());
    let summary = exporter.run().await.unwrap();
    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.failed(), 1);

    // Aggregate status still reports ok; failures live in the summary
    let status = crate::types::RunStatus::ok(&summary);
    assert_eq!(status.status, "ok");
}

#[tokio::test]
async fn test_exclusions_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let catalog = FakeCatalog::default()
        .with_table("core", "keep", sample_rows())
        .with_table("core", "skip", sample_rows());

    let mut config = test_config();
    config.exclude_tables = vec!["core.skip".to_string()];

    let exporter = exporter(catalog, config, dir.path());
    let summary = exporter.run().await.unwrap();
    assert_eq!(summary.total_tables(), 1);
    assert_eq!(summary.outcomes[0].table().to_string(), "core.keep");
}

#[tokio::test]
async fn test_single_date_partition_per_run() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let catalog = FakeCatalog::default()
        .with_table("core", "one", sample_rows())
        .with_table("core", "two", sample_rows());

    let exporter = exporter(catalog, test_config(), dir.path());
    let summary = exporter
        .run_at(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap())
        .await
        .unwrap();

    for outcome in &summary.outcomes {
        match outcome {
            TableOutcome::Succeeded { location, .. } => {
                assert!(
                    location.contains("backups/2024/12/31/"),
                    "unexpected location {location}"
                );
            }
            TableOutcome::Failed { .. } => panic!("expected success"),
        }
    }
}

#[tokio::test]
async fn test_scratch_artifacts_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    let catalog = FakeCatalog::default()
        .with_table("core", "one", sample_rows())
        .with_table("core", "two", sample_rows());

    let exporter = exporter(catalog, test_config(), dir.path());
    exporter.run().await.unwrap();

    assert!(std::fs::read_dir(dir.path().join("scratch"))
        .unwrap()
        .next()
        .is_none());
}

#[tokio::test]
async fn test_encoding_failure_isolated_and_cleaned() {
    let dir = tempfile::tempdir().unwrap();
    setup_dirs(dir.path());

    // "id" is non-nullable int8 in the fake catalog; a string cell cannot
    // be encoded
    let catalog = FakeCatalog::default()
        .with_table("core", "bad", vec![json!({"id": "oops", "label": "x"})])
        .with_table("core", "good", sample_rows());

    let exporter = exporter(catalog, test_config(), dir.path());
    let summary = exporter.run().await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(std::fs::read_dir(dir.path().join("scratch"))
        .unwrap()
        .next()
        .is_none());
}
