//! Export run configuration
//!
//! A fixed configuration struct with named fields and documented defaults,
//! validated at run start. Static defaults come from a config file; run
//! specific overrides are merged on top as JSON before validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when a single table fails mid-run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure, log it, and continue with the next table
    #[default]
    IsolateAndContinue,
    /// Abort the run on the first table failure
    FailFast,
}

/// Configuration for one export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Database user
    #[serde(default)]
    pub db_user: Option<String>,

    /// Database host
    #[serde(default)]
    pub db_host: Option<String>,

    /// Database port
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Database name
    #[serde(default)]
    pub db_database: Option<String>,

    /// Schema whose base tables are exported
    #[serde(default)]
    pub db_schema: Option<String>,

    /// Database password
    #[serde(default)]
    pub db_password: Option<String>,

    /// Maximum time allowed to connect to the database before a timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Storage key prefix under which date partitions are created
    #[serde(default)]
    pub root_path: String,

    /// Destination bucket name
    #[serde(default)]
    pub target_bucket: Option<String>,

    /// Object store region; falls back to the environment when unset
    #[serde(default)]
    pub storage_region: Option<String>,

    /// Storage tier for uploaded objects
    #[serde(default = "default_storage_class")]
    pub storage_class: String,

    /// Fully-qualified `schema.table` identifiers to skip.
    ///
    /// Matching is exact string comparison; no wildcard support. This is
    /// intentional: exclusion lists are fixed and known up front.
    #[serde(default)]
    pub exclude_tables: Vec<String>,

    /// Per-table failure handling
    #[serde(default)]
    pub on_table_error: FailurePolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            db_user: None,
            db_host: None,
            db_port: default_db_port(),
            db_database: None,
            db_schema: None,
            db_password: None,
            connect_timeout_seconds: default_connect_timeout(),
            root_path: String::new(),
            target_bucket: None,
            storage_region: None,
            storage_class: default_storage_class(),
            exclude_tables: Vec::new(),
            on_table_error: FailurePolicy::default(),
        }
    }
}

fn default_db_port() -> u16 {
    5432
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_storage_class() -> String {
    "STANDARD".to_string()
}

impl ExportConfig {
    /// Load configuration from a YAML or JSON file (by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Parse configuration from an inline JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge run-specific overrides on top of this configuration
    ///
    /// Only keys present in `overrides` replace existing values.
    pub fn merge(self, overrides: &serde_json::Value) -> Result<Self> {
        let mut base = serde_json::to_value(&self)?;
        if let (Some(base_map), Some(override_map)) = (base.as_object_mut(), overrides.as_object())
        {
            for (key, value) in override_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    /// Validate that required fields are present
    ///
    /// Fails fast before any connection is attempted.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("db_user", &self.db_user),
            ("db_host", &self.db_host),
            ("db_database", &self.db_database),
            ("db_schema", &self.db_schema),
            ("db_password", &self.db_password),
        ] {
            if value.as_deref().is_none_or(str::is_empty) {
                return Err(Error::missing_field(field));
            }
        }
        Ok(())
    }

    /// The schema to export; call only after `validate`
    pub fn schema(&self) -> &str {
        self.db_schema.as_deref().unwrap_or_default()
    }

    /// Connection info safe for logging (password masked)
    pub fn connection_info(&self) -> String {
        format!(
            "postgresql://{}:****@{}:{}/{}",
            self.db_user.as_deref().unwrap_or_default(),
            self.db_host.as_deref().unwrap_or_default(),
            self.db_port,
            self.db_database.as_deref().unwrap_or_default(),
        )
    }
}
