//! Application state for the STAC API.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use storage::{AssetReader, ItemStore, MemoryItemStore, ObjectStorageConfig, PgItemStore};

use crate::catalog_client::{CatalogClient, HttpCatalogClient, StoreCatalogClient};
use crate::config::ServiceConfig;
use crate::datasets::{DatasetSource, NetCdfDatasets};

/// Shared application state.
pub struct AppState {
    /// Item and collection documents.
    pub store: Arc<dyn ItemStore>,

    /// Catalog searched by the cube endpoint.
    pub catalog: Arc<dyn CatalogClient>,

    /// Asset reader and decoder for cube requests.
    pub datasets: Arc<dyn DatasetSource>,

    pub config: ServiceConfig,

    /// Base URL for building links, without a trailing slash.
    pub base_url: String,

    /// Prometheus recorder handle, when one is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new AppState from environment configuration.
    pub async fn new(config_path: &Path) -> Result<Self> {
        let base_url = std::env::var("STAC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8083".to_string());

        let store: Arc<dyn ItemStore> = match std::env::var("DATABASE_URL") {
            Ok(database_url) => {
                let store = PgItemStore::connect(&database_url).await?;
                store.migrate().await?;
                info!("Using PostgreSQL item store");
                Arc::new(store)
            }
            Err(_) => {
                let store = match std::env::var("STAC_SEED_DIR") {
                    Ok(dir) => MemoryItemStore::from_dir(&PathBuf::from(dir))?,
                    Err(_) => MemoryItemStore::new(),
                };
                info!("DATABASE_URL not set, using in-memory item store");
                Arc::new(store)
            }
        };

        // Cube searches go to a remote catalog when one is configured
        let catalog: Arc<dyn CatalogClient> = match std::env::var("CATALOG_URL") {
            Ok(url) => {
                info!(url = %url, "Cube searches use remote catalog");
                Arc::new(HttpCatalogClient::new(&url))
            }
            Err(_) => Arc::new(StoreCatalogClient::new(Arc::clone(&store))),
        };

        let reader = AssetReader::new(ObjectStorageConfig::from_env());
        let datasets = Arc::new(NetCdfDatasets::new(reader));

        let config = ServiceConfig::load(config_path)?;

        Ok(Self::with_components(store, catalog, datasets, config, base_url))
    }

    /// Assemble state from ready-made parts.
    pub fn with_components(
        store: Arc<dyn ItemStore>,
        catalog: Arc<dyn CatalogClient>,
        datasets: Arc<dyn DatasetSource>,
        config: ServiceConfig,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            datasets,
            config,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
