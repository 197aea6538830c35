//! PostgreSQL to Parquet type mapping
//!
//! Pure, total translation from catalog type tags to the logical types the
//! columnar writer understands. Unknown types never fail: they fall back to
//! UTF8, trading fidelity for totality.

use crate::types::ColumnDescriptor;
use arrow::datatypes::{DataType, Field, TimeUnit};

/// Parquet logical types supported by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Double,
    /// Boolean
    Boolean,
    /// Milliseconds since the Unix epoch
    TimestampMillis,
    /// UTF-8 string
    Utf8,
}

impl LogicalType {
    /// The Arrow data type this logical type is encoded as
    pub fn arrow_type(self) -> DataType {
        match self {
            Self::Int64 => DataType::Int64,
            Self::Double => DataType::Float64,
            Self::Boolean => DataType::Boolean,
            Self::TimestampMillis => DataType::Timestamp(TimeUnit::Millisecond, None),
            Self::Utf8 => DataType::Utf8,
        }
    }
}

/// Map a catalog type tag to a logical type
///
/// Matches on the lowercase-normalized tag. Anything unrecognized maps to
/// UTF8 rather than erroring.
pub fn map_source_type(source_type: &str) -> LogicalType {
    match source_type.to_lowercase().as_str() {
        "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" => LogicalType::Int64,
        "float4" | "float8" | "real" | "double precision" => LogicalType::Double,
        "bool" | "boolean" => LogicalType::Boolean,
        "timestamp" | "timestamptz" | "date" | "timestamp without time zone"
        | "timestamp with time zone" => LogicalType::TimestampMillis,
        "text" | "varchar" | "char" | "uuid" | "character" | "character varying" => {
            LogicalType::Utf8
        }
        _ => LogicalType::Utf8,
    }
}

/// A column after type mapping, ready for the columnar writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    /// Column name
    pub name: String,
    /// Target logical type
    pub logical_type: LogicalType,
    /// Whether the field accepts nulls
    pub optional: bool,
}

impl MappedField {
    /// Derive a mapped field from a catalog column descriptor
    pub fn from_column(column: &ColumnDescriptor) -> Self {
        Self {
            name: column.name.clone(),
            logical_type: map_source_type(&column.source_type),
            optional: column.nullable,
        }
    }

    /// Convert to an Arrow field
    pub fn to_arrow(&self) -> Field {
        Field::new(&self.name, self.logical_type.arrow_type(), self.optional)
    }
}

/// Map an ordered column set, preserving declaration order
pub fn map_columns(columns: &[ColumnDescriptor]) -> Vec<MappedField> {
    columns.iter().map(MappedField::from_column).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("int2", LogicalType::Int64; "int2")]
    #[test_case("int4", LogicalType::Int64; "int4")]
    #[test_case("int8", LogicalType::Int64; "int8")]
    #[test_case("smallint", LogicalType::Int64; "smallint")]
    #[test_case("integer", LogicalType::Int64; "integer")]
    #[test_case("bigint", LogicalType::Int64; "bigint")]
    #[test_case("float4", LogicalType::Double; "float4")]
    #[test_case("float8", LogicalType::Double; "float8")]
    #[test_case("double precision", LogicalType::Double; "double precision")]
    #[test_case("bool", LogicalType::Boolean; "bool")]
    #[test_case("boolean", LogicalType::Boolean; "boolean")]
    #[test_case("timestamp", LogicalType::TimestampMillis; "timestamp")]
    #[test_case("timestamptz", LogicalType::TimestampMillis; "timestamptz")]
    #[test_case("date", LogicalType::TimestampMillis; "date")]
    #[test_case("timestamp without time zone", LogicalType::TimestampMillis; "ts without tz")]
    #[test_case("timestamp with time zone", LogicalType::TimestampMillis; "ts with tz")]
    #[test_case("text", LogicalType::Utf8; "text")]
    #[test_case("varchar", LogicalType::Utf8; "varchar")]
    #[test_case("char", LogicalType::Utf8; "char")]
    #[test_case("uuid", LogicalType::Utf8; "uuid")]
    #[test_case("character varying", LogicalType::Utf8; "character varying")]
    #[test_case("jsonb", LogicalType::Utf8; "unknown jsonb falls back to utf8")]
    #[test_case("geometry", LogicalType::Utf8; "unknown geometry falls back to utf8")]
    #[test_case("", LogicalType::Utf8; "empty falls back to utf8")]
    fn test_map_source_type(input: &str, expected: LogicalType) {
        assert_eq!(map_source_type(input), expected);
    }

    #[test]
    fn test_map_source_type_case_insensitive() {
        assert_eq!(map_source_type("BIGINT"), LogicalType::Int64);
        assert_eq!(map_source_type("TimestampTZ"), LogicalType::TimestampMillis);
    }

    #[test]
    fn test_optional_follows_nullability() {
        let nullable = ColumnDescriptor::new("email", "text", true);
        let required = ColumnDescriptor::new("id", "int8", false);

        assert!(MappedField::from_column(&nullable).optional);
        assert!(!MappedField::from_column(&required).optional);
    }

    #[test]
    fn test_to_arrow() {
        let field = MappedField {
            name: "created_at".to_string(),
            logical_type: LogicalType::TimestampMillis,
            optional: true,
        };
        let arrow = field.to_arrow();
        assert_eq!(arrow.name(), "created_at");
        assert_eq!(
            arrow.data_type(),
            &DataType::Timestamp(TimeUnit::Millisecond, None)
        );
        assert!(arrow.is_nullable());
    }

    #[test]
    fn test_map_columns_preserves_order() {
        let columns = vec![
            ColumnDescriptor::new("id", "int8", false),
            ColumnDescriptor::new("name", "text", true),
            ColumnDescriptor::new("active", "bool", false),
        ];
        let mapped = map_columns(&columns);
        let names: Vec<_> = mapped.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "active"]);
    }
}
