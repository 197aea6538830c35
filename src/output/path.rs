//! Date-partitioned backup key generation
//!
//! Storage keys follow `<root>/<YYYY>/<MM>/<DD>/<table>.parquet`. The date
//! partition always uses UTC, regardless of the local clock.

use chrono::{DateTime, Utc};

/// File extension for the columnar artifacts
pub const PARQUET_EXTENSION: &str = "parquet";

/// Build the date-partitioned prefix for a run
///
/// Deterministic given its inputs; callers pass the wall-clock time once per
/// run so every table of that run lands under the same partition, even when
/// the run crosses a UTC midnight boundary.
pub fn backup_prefix(root: &str, now: DateTime<Utc>) -> String {
    let day = now.format("%Y/%m/%d");
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        day.to_string()
    } else {
        format!("{root}/{day}")
    }
}

/// Storage key for one table's artifact under a run prefix
pub fn table_key(prefix: &str, table_name: &str) -> String {
    format!("{prefix}/{table_name}.{PARQUET_EXTENSION}")
}
