//! Parquet encoding of row sets
//!
//! Builds a file-level Arrow schema from the mapped column sequence and
//! serializes the row set into a local scratch file, which is fully
//! finalized before the uploader touches it. Field order and row order are
//! preserved exactly as received.

use crate::error::{Error, Result};
use crate::mapping::{LogicalType, MappedField};
use crate::types::RowSet;
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Encode a row set and write it to a Parquet file
///
/// Returns the number of rows written. The file is closed before returning,
/// so it is fully readable by the time the caller uploads it. Encoding
/// failures abort only the current table.
pub fn write_table_to_parquet(
    path: impl AsRef<Path>,
    table: &str,
    fields: &[MappedField],
    rows: &RowSet,
) -> Result<usize> {
    let batch = rows_to_batch(table, fields, rows)?;

    let file = File::create(path.as_ref())?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(batch.num_rows())
}

/// Convert a row set into a RecordBatch matching the mapped fields
///
/// Columns are built in field declaration order; rows keep their input
/// order within each column.
pub fn rows_to_batch(table: &str, fields: &[MappedField], rows: &RowSet) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(
        fields.iter().map(MappedField::to_arrow).collect::<Vec<_>>(),
    ));

    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    for field in fields {
        columns.push(build_column(table, field, rows)?);
    }

    RecordBatch::try_new(schema, columns)
        .map_err(|e| Error::encoding(table, format!("Failed to assemble batch: {e}")))
}

/// Build one typed column from the row set
fn build_column(table: &str, field: &MappedField, rows: &RowSet) -> Result<ArrayRef> {
    let cells = rows.iter().map(|row| cell(row, &field.name));

    match field.logical_type {
        LogicalType::Int64 => {
            let values = collect_cells(table, field, cells, Value::as_i64)?;
            Ok(Arc::new(Int64Array::from(values)))
        }
        LogicalType::Double => {
            let values = collect_cells(table, field, cells, Value::as_f64)?;
            Ok(Arc::new(Float64Array::from(values)))
        }
        LogicalType::Boolean => {
            let values = collect_cells(table, field, cells, Value::as_bool)?;
            Ok(Arc::new(BooleanArray::from(values)))
        }
        LogicalType::TimestampMillis => {
            let values = collect_cells(table, field, cells, Value::as_i64)?;
            Ok(Arc::new(TimestampMillisecondArray::from(values)))
        }
        LogicalType::Utf8 => {
            // UTF8 is the lossy-but-total target: any non-null cell is
            // stringified rather than rejected.
            let mut values: Vec<Option<String>> = Vec::with_capacity(rows.len());
            for value in cells {
                match value {
                    None => {
                        require_optional(table, field)?;
                        values.push(None);
                    }
                    Some(Value::String(s)) => values.push(Some(s.clone())),
                    Some(other) => values.push(Some(other.to_string())),
                }
            }
            Ok(Arc::new(StringArray::from(values)))
        }
    }
}

/// Pull a cell out of a row object, treating missing and null alike
fn cell<'a>(row: &'a Value, name: &str) -> Option<&'a Value> {
    row.as_object()
        .and_then(|obj| obj.get(name))
        .filter(|v| !v.is_null())
}

/// Collect typed cells, rejecting nulls in required fields and values that
/// do not match the field's logical type
fn collect_cells<'a, T>(
    table: &str,
    field: &MappedField,
    cells: impl Iterator<Item = Option<&'a Value>>,
    extract: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    let mut values = Vec::new();
    for value in cells {
        match value {
            None => {
                require_optional(table, field)?;
                values.push(None);
            }
            Some(v) => match extract(v) {
                Some(typed) => values.push(Some(typed)),
                None => {
                    return Err(Error::encoding(
                        table,
                        format!(
                            "value {v} in column '{}' is incompatible with {:?}",
                            field.name, field.logical_type
                        ),
                    ))
                }
            },
        }
    }
    Ok(values)
}

fn require_optional(table: &str, field: &MappedField) -> Result<()> {
    if field.optional {
        Ok(())
    } else {
        Err(Error::encoding(
            table,
            format!("null value in non-nullable column '{}'", field.name),
        ))
    }
}
