//! PostgreSQL catalog implementation
//!
//! Connects with `tokio-postgres`, queries `information_schema` for
//! discovery and introspection, and materializes table rows with a plain
//! `SELECT *`. All queries are read-only; nothing is ever written to the
//! source database.

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::mapping::{LogicalType, MappedField};
use crate::types::{ColumnDescriptor, RowSet, TableRef};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

/// Catalog backed by a live PostgreSQL connection
pub struct PgCatalog {
    client: Client,
}

impl PgCatalog {
    /// Connect to the source database described by the config
    ///
    /// The connection driver runs on a spawned task for the lifetime of the
    /// client. The configured connect timeout applies; queries themselves
    /// carry no extra timeout.
    pub async fn connect(config: &ExportConfig) -> Result<Self> {
        let mut pg = tokio_postgres::Config::new();
        pg.user(config.db_user.as_deref().unwrap_or_default())
            .password(config.db_password.as_deref().unwrap_or_default())
            .host(config.db_host.as_deref().unwrap_or_default())
            .port(config.db_port)
            .dbname(config.db_database.as_deref().unwrap_or_default())
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds));

        let (client, connection) = pg.connect(NoTls).await.map_err(|e| {
            Error::catalog(format!(
                "Failed to connect to {}: {e}",
                config.connection_info()
            ))
        })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {e}");
            }
        });

        Ok(Self { client })
    }

    /// Lightweight connectivity probe
    pub async fn check(&self) -> Result<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| Error::catalog(format!("Connection check failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl super::Catalog for PgCatalog {
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableRef>> {
        let rows = self
            .client
            .query(
                "SELECT table_schema, table_name
                 FROM information_schema.tables
                 WHERE table_type = 'BASE TABLE'
                 AND table_schema = $1",
                &[&schema],
            )
            .await
            .map_err(|e| Error::catalog(format!("Failed to list tables in '{schema}': {e}")))?;

        Ok(rows
            .iter()
            .map(|row| TableRef::new(row.get::<_, String>(0), row.get::<_, String>(1)))
            .collect())
    }

    async fn columns(&self, table: &TableRef) -> Result<Vec<ColumnDescriptor>> {
        let rows = self
            .client
            .query(
                "SELECT column_name, data_type, is_nullable
                 FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
                &[&table.schema, &table.name],
            )
            .await
            .map_err(|e| Error::catalog(format!("Failed to introspect '{table}': {e}")))?;

        Ok(rows
            .iter()
            .map(|row| {
                ColumnDescriptor::new(
                    row.get::<_, String>(0),
                    row.get::<_, String>(1),
                    row.get::<_, String>(2) == "YES",
                )
            })
            .collect())
    }

    async fn fetch_rows(&self, table: &TableRef, fields: &[MappedField]) -> Result<RowSet> {
        let query = format!(
            "SELECT * FROM \"{}\".\"{}\"",
            table.schema.replace('"', "\"\""),
            table.name.replace('"', "\"\"")
        );

        let rows = self
            .client
            .query(&query, &[])
            .await
            .map_err(|e| Error::catalog(format!("Failed to scan '{table}': {e}")))?;

        Ok(rows.iter().map(|row| row_to_json(row, fields)).collect())
    }
}

/// Convert one database row to a JSON object keyed by column name
fn row_to_json(row: &Row, fields: &[MappedField]) -> Value {
    let mut map = serde_json::Map::new();
    for field in fields {
        map.insert(field.name.clone(), cell_value(row, field));
    }
    Value::Object(map)
}

/// Decode a single cell, driven by the mapped logical type
///
/// Falls back through progressively wider accessors so that a cell whose
/// wire type disagrees with the mapping still comes out as text rather
/// than panicking mid-scan.
fn cell_value(row: &Row, field: &MappedField) -> Value {
    let name = field.name.as_str();
    match field.logical_type {
        LogicalType::Int64 => {
            if let Ok(v) = row.try_get::<_, Option<i64>>(name) {
                return json_number_i64(v);
            }
            if let Ok(v) = row.try_get::<_, Option<i32>>(name) {
                return json_number_i64(v.map(i64::from));
            }
            if let Ok(v) = row.try_get::<_, Option<i16>>(name) {
                return json_number_i64(v.map(i64::from));
            }
            text_fallback(row, name)
        }
        LogicalType::Double => {
            if let Ok(v) = row.try_get::<_, Option<f64>>(name) {
                return json_number_f64(v);
            }
            if let Ok(v) = row.try_get::<_, Option<f32>>(name) {
                return json_number_f64(v.map(f64::from));
            }
            text_fallback(row, name)
        }
        LogicalType::Boolean => {
            if let Ok(v) = row.try_get::<_, Option<bool>>(name) {
                return v.map_or(Value::Null, Value::Bool);
            }
            text_fallback(row, name)
        }
        LogicalType::TimestampMillis => {
            if let Ok(v) = row.try_get::<_, Option<DateTime<Utc>>>(name) {
                return json_number_i64(v.map(|dt| dt.timestamp_millis()));
            }
            if let Ok(v) = row.try_get::<_, Option<NaiveDateTime>>(name) {
                return json_number_i64(v.map(|dt| dt.and_utc().timestamp_millis()));
            }
            if let Ok(v) = row.try_get::<_, Option<NaiveDate>>(name) {
                return json_number_i64(
                    v.and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc().timestamp_millis()),
                );
            }
            text_fallback(row, name)
        }
        LogicalType::Utf8 => text_fallback(row, name),
    }
}

/// Best-effort text decoding for UTF8 columns and mismatched cells
fn text_fallback(row: &Row, name: &str) -> Value {
    if let Ok(v) = row.try_get::<_, Option<String>>(name) {
        return v.map_or(Value::Null, Value::String);
    }
    if let Ok(v) = row.try_get::<_, Option<Uuid>>(name) {
        return v.map_or(Value::Null, |u| Value::String(u.to_string()));
    }
    if let Ok(v) = row.try_get::<_, Option<i64>>(name) {
        return json_number_i64(v);
    }
    if let Ok(v) = row.try_get::<_, Option<f64>>(name) {
        return json_number_f64(v);
    }
    if let Ok(v) = row.try_get::<_, Option<bool>>(name) {
        return v.map_or(Value::Null, Value::Bool);
    }
    Value::Null
}

fn json_number_i64(v: Option<i64>) -> Value {
    v.map_or(Value::Null, |n| Value::Number(n.into()))
}

fn json_number_f64(v: Option<f64>) -> Value {
    v.and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}
