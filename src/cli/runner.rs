//! CLI runner - executes commands

use crate::catalog::{filter_excluded, Catalog, PgCatalog};
use crate::cli::commands::{Cli, Commands};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::export::Exporter;
use crate::output::Destination;
use crate::types::RunStatus;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run { output } => self.run_export(output.as_deref()).await,
            Commands::ListTables => self.list_tables().await,
            Commands::Check => self.check().await,
        }
    }

    /// Load configuration: file defaults, then inline JSON overrides
    fn load_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ExportConfig::from_file(path)?,
            None => ExportConfig::default(),
        };

        if let Some(json) = &self.cli.config_json {
            let overrides: serde_json::Value = serde_json::from_str(json)?;
            config = config.merge(&overrides)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Execute an export run and print the aggregate status
    ///
    /// Per-table failures are observable in the logs only; the printed
    /// status reflects whether the run itself completed.
    async fn run_export(&self, output: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        tracing::info!("Exporting from {}", config.connection_info());

        let catalog = Arc::new(PgCatalog::connect(&config).await?);
        let destination = match output {
            Some(url) => Destination::parse(url, &config)?,
            None => Destination::s3(&config)?,
        };

        let exporter = Exporter::new(catalog, destination, config);
        match exporter.run().await {
            Ok(summary) => {
                println!("{}", serde_json::to_string(&RunStatus::ok(&summary))?);
                Ok(())
            }
            Err(e) => {
                println!(
                    "{}",
                    serde_json::to_string(&RunStatus::error(e.to_string()))?
                );
                Err(e)
            }
        }
    }

    /// Print the tables an export run would process
    async fn list_tables(&self) -> Result<()> {
        let config = self.load_config()?;
        let catalog = PgCatalog::connect(&config).await?;

        let tables = catalog.list_tables(config.schema()).await?;
        let tables = filter_excluded(tables, &config.exclude_tables);
        for table in tables {
            println!("{table}");
        }
        Ok(())
    }

    /// Probe database connectivity
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let catalog = PgCatalog::connect(&config).await?;
        catalog.check().await?;
        println!("{}", serde_json::json!({ "status": "ok" }));
        Ok(())
    }
}
