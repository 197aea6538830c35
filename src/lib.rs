//! # pgarchive
//!
//! Export the base tables of a PostgreSQL schema into Parquet files and
//! archive them under date-partitioned keys in cloud object storage.
//!
//! ## Pipeline
//!
//! ```text
//! Catalog ──> Type Mapper ──> Columnar Writer ──> Uploader
//!   (enumerate, introspect,     (Arrow/Parquet,     (object store,
//!    materialize rows)           scratch file)       scratch cleanup)
//!                      Exporter orchestrates per table
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pgarchive::{Destination, Exporter, ExportConfig, PgCatalog, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ExportConfig::from_file("pgarchive.yaml")?;
//!     config.validate()?;
//!
//!     let catalog = Arc::new(PgCatalog::connect(&config).await?);
//!     let destination = Destination::s3(&config)?;
//!
//!     let summary = Exporter::new(catalog, destination, config).run().await?;
//!     println!("{} tables exported", summary.succeeded());
//!     Ok(())
//! }
//! ```
//!
//! Tables are processed strictly sequentially. A failing table is logged
//! and recorded without aborting the run (configurable); a failing table
//! enumeration aborts the run outright.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Core data model
pub mod types;

/// Source database catalog access
pub mod catalog;

/// PostgreSQL to Parquet type mapping
pub mod mapping;

/// Run configuration
pub mod config;

/// Columnar output and archival
pub mod output;

/// Export orchestration
pub mod export;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::{Catalog, PgCatalog};
pub use config::{ExportConfig, FailurePolicy};
pub use error::{Error, Result};
pub use export::Exporter;
pub use output::Destination;
pub use types::{ColumnDescriptor, RowSet, RunStatus, RunSummary, TableOutcome, TableRef};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
