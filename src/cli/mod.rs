//! Command-line interface
//!
//! Argument parsing and command execution for the `pgarchive` binary.

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
