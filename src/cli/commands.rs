//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PostgreSQL to Parquet archiver CLI
#[derive(Parser, Debug)]
#[command(name = "pgarchive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline JSON overrides merged over the config file
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export all tables of the configured schema
    Run {
        /// Destination override (local path or s3://bucket)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the tables that would be exported, after exclusions
    ListTables,

    /// Test connectivity to the source database
    Check,
}
