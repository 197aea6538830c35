//! Columnar output and archival
//!
//! Handles Parquet encoding of row sets, date-partitioned key generation,
//! and upload of finalized artifacts to the destination object store.

mod cloud;
mod path;
mod writer;

pub use cloud::Destination;
pub use path::{backup_prefix, table_key, PARQUET_EXTENSION};
pub use writer::{rows_to_batch, write_table_to_parquet};
