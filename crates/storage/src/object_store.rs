//! Reading item assets from object storage (S3, HTTP or local files).

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use climate_common::{ClimateError, ClimateResult};
use object_store::{
    aws::AmazonS3Builder, http::HttpBuilder, local::LocalFileSystem, path::Path, ObjectStore,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Configuration for S3-compatible asset hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStorageConfig {
    /// Custom endpoint (MinIO etc.); AWS when unset
    pub endpoint: Option<String>,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Send unsigned requests (public buckets)
    pub anonymous: bool,
    /// Allow HTTP endpoints
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "us-east-1".to_string(),
            anonymous: true,
            allow_http: false,
        }
    }
}

impl ObjectStorageConfig {
    /// Read `S3_ENDPOINT`, `S3_REGION` and `S3_ANONYMOUS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let endpoint = std::env::var("S3_ENDPOINT").ok().filter(|e| !e.is_empty());
        Self {
            allow_http: endpoint
                .as_deref()
                .map_or(defaults.allow_http, |e| e.starts_with("http://")),
            endpoint,
            region: std::env::var("S3_REGION").unwrap_or(defaults.region),
            anonymous: std::env::var("S3_ANONYMOUS")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(defaults.anonymous),
        }
    }
}

/// Where an asset href points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    S3 { bucket: String, key: String },
    Http { base_url: String, path: String },
    Local(PathBuf),
}

impl AssetLocation {
    /// Parse `s3://bucket/key`, `http(s)://host/path`, `file:///path` or an
    /// absolute filesystem path.
    pub fn parse(href: &str) -> ClimateResult<Self> {
        if let Some(rest) = href.strip_prefix("s3://") {
            let (bucket, key) = rest
                .split_once('/')
                .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
                .ok_or_else(|| {
                    ClimateError::StorageError(format!("Invalid S3 href '{}': expected s3://bucket/key", href))
                })?;
            return Ok(AssetLocation::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        for scheme in ["http://", "https://"] {
            if let Some(rest) = href.strip_prefix(scheme) {
                let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
                if host.is_empty() || path.is_empty() {
                    return Err(ClimateError::StorageError(format!(
                        "Invalid HTTP href '{}': expected a host and a path",
                        href
                    )));
                }
                return Ok(AssetLocation::Http {
                    base_url: format!("{}{}", scheme, host),
                    path: path.to_string(),
                });
            }
        }

        let local = href.strip_prefix("file://").unwrap_or(href);
        if local.starts_with('/') {
            return Ok(AssetLocation::Local(PathBuf::from(local)));
        }

        Err(ClimateError::StorageError(format!(
            "Unsupported asset href '{}'",
            href
        )))
    }
}

/// Fetches whole asset objects by href.
#[derive(Debug, Clone, Default)]
pub struct AssetReader {
    config: ObjectStorageConfig,
}

impl AssetReader {
    pub fn new(config: ObjectStorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ObjectStorageConfig {
        &self.config
    }

    /// Read the full object behind an asset href.
    #[instrument(skip(self))]
    pub async fn read(&self, href: &str) -> ClimateResult<Bytes> {
        let location = AssetLocation::parse(href)?;
        let (store, path) = self.open(&location)?;

        let result = store
            .get(&path)
            .await
            .map_err(|e| ClimateError::StorageError(format!("Failed to read {}: {}", href, e)))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| ClimateError::StorageError(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read asset");
        Ok(bytes)
    }

    fn open(&self, location: &AssetLocation) -> ClimateResult<(Arc<dyn ObjectStore>, Path)> {
        match location {
            AssetLocation::S3 { bucket, key } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_region(&self.config.region)
                    .with_allow_http(self.config.allow_http);

                if let Some(endpoint) = &self.config.endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if self.config.anonymous {
                    builder = builder.with_skip_signature(true);
                }

                let store = builder.build().map_err(|e| {
                    ClimateError::StorageError(format!("Failed to create S3 client: {}", e))
                })?;
                Ok((Arc::new(store), Path::from(key.as_str())))
            }
            AssetLocation::Http { base_url, path } => {
                let store = HttpBuilder::new().with_url(base_url).build().map_err(|e| {
                    ClimateError::StorageError(format!("Failed to create HTTP client: {}", e))
                })?;
                Ok((Arc::new(store), Path::from(path.as_str())))
            }
            AssetLocation::Local(file) => {
                let path = Path::from_absolute_path(file).map_err(|e| {
                    ClimateError::StorageError(format!("Invalid path {}: {}", file.display(), e))
                })?;
                Ok((Arc::new(LocalFileSystem::new()), path))
            }
        }
    }
}
