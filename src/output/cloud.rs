//! Object store destinations
//!
//! Wraps `object_store` so the rest of the pipeline only sees "upload this
//! finalized artifact under this key". S3 is the production target; a local
//! filesystem destination backs tests and dry runs.

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore};
use std::path::Path;
use std::sync::Arc;

/// Where finalized artifacts are uploaded
#[derive(Debug, Clone)]
pub struct Destination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Key prefix inside the bucket or directory
    prefix: String,
    /// URL scheme for resolved locations
    scheme: String,
}

impl Destination {
    /// S3 destination from the export configuration
    ///
    /// Credentials come from the environment via `AmazonS3Builder::from_env`;
    /// region and storage class come from the config. The storage class is
    /// applied as the `x-amz-storage-class` header on every request.
    pub fn s3(config: &ExportConfig) -> Result<Self> {
        let bucket = config
            .target_bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::missing_field("target_bucket"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-amz-storage-class"),
            HeaderValue::from_str(&config.storage_class).map_err(|e| {
                Error::InvalidConfigValue {
                    field: "storage_class".to_string(),
                    message: e.to_string(),
                }
            })?,
        );

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_client_options(ClientOptions::new().with_default_headers(headers));

        if let Some(region) = config.storage_region.as_deref() {
            builder = builder.with_region(region);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "s3".to_string(),
        })
    }

    /// Local filesystem destination (tests, dry runs)
    pub fn local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(|e| {
            Error::config(format!("Failed to create directory {}: {e}", path.display()))
        })?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Parse a destination from a URL or local path
    ///
    /// `s3://bucket[/prefix]` selects S3 (config supplies region and storage
    /// class); anything else is treated as a local directory.
    pub fn parse(url: &str, config: &ExportConfig) -> Result<Self> {
        if let Some(without_scheme) = url.strip_prefix("s3://") {
            let (bucket, prefix) = match without_scheme.find('/') {
                Some(idx) => (
                    &without_scheme[..idx],
                    without_scheme[idx + 1..].to_string(),
                ),
                None => (without_scheme, String::new()),
            };

            let mut overridden = config.clone();
            overridden.target_bucket = Some(bucket.to_string());
            let mut dest = Self::s3(&overridden)?;
            dest.prefix = prefix;
            Ok(dest)
        } else {
            Self::local(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    /// The destination scheme ("s3" or "file")
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Upload a finalized local artifact under the given key
    ///
    /// Returns the resolved location on success. Regardless of outcome the
    /// local scratch file is removed before control returns to the caller;
    /// no retry is attempted on failure.
    pub async fn upload_file(&self, local: &Path, key: &str) -> Result<String> {
        let result = self.transfer(local, key).await;

        if let Err(e) = tokio::fs::remove_file(local).await {
            tracing::warn!(
                "Failed to remove scratch artifact {}: {e}",
                local.display()
            );
        }

        result
    }

    async fn transfer(&self, local: &Path, key: &str) -> Result<String> {
        let data = tokio::fs::read(local).await.map_err(|e| {
            Error::upload(key, format!("Failed to read artifact {}: {e}", local.display()))
        })?;

        let path = if self.prefix.is_empty() {
            ObjectPath::from(key)
        } else {
            ObjectPath::from(format!("{}/{key}", self.prefix.trim_end_matches('/')))
        };

        self.store
            .put(&path, Bytes::from(data).into())
            .await
            .map_err(|e| Error::upload(key, e.to_string()))?;

        Ok(format!("{}://{path}", self.scheme))
    }
}
