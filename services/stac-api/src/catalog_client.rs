//! Catalog searches issued by the cube endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use climate_common::{ClimateError, ClimateResult};
use stac_protocol::{Item, ItemCollection, SearchRequest};
use storage::{ItemQuery, ItemStore};
use tracing::{debug, instrument};

/// Runs STAC item searches.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search(&self, search: &SearchRequest) -> ClimateResult<Vec<Item>>;
}

/// Searches a remote STAC API via `POST {base}/search`.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    search_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[instrument(skip(self, search), fields(url = %self.search_url))]
    async fn search(&self, search: &SearchRequest) -> ClimateResult<Vec<Item>> {
        let response = self
            .client
            .post(&self.search_url)
            .json(search)
            .send()
            .await
            .map_err(|e| ClimateError::CatalogError(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClimateError::InvalidQuery(format!(
                "Catalog rejected search ({}): {}",
                status, body
            )));
        }
        if !status.is_success() {
            return Err(ClimateError::CatalogError(format!(
                "Catalog returned {}",
                status
            )));
        }

        let items: ItemCollection = response
            .json()
            .await
            .map_err(|e| ClimateError::CatalogError(format!("Invalid search response: {}", e)))?;

        debug!(count = items.features.len(), "Catalog search returned items");
        Ok(items.features)
    }
}

/// Searches this service's own item store.
pub struct StoreCatalogClient {
    store: Arc<dyn ItemStore>,
}

impl StoreCatalogClient {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogClient for StoreCatalogClient {
    async fn search(&self, search: &SearchRequest) -> ClimateResult<Vec<Item>> {
        let query = ItemQuery::from_search(search)?;
        self.store.search(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryItemStore;
    use test_utils::{bbox, sample_collections, sample_items, time, FORECAST_COLLECTION};

    #[test]
    fn test_search_url() {
        let client = HttpCatalogClient::new("http://127.0.0.1:8083/");
        assert_eq!(client.search_url(), "http://127.0.0.1:8083/search");
    }

    #[tokio::test]
    async fn test_store_client_translates_search() {
        let store = Arc::new(MemoryItemStore::with_documents(
            sample_items(),
            sample_collections(),
        ));
        let client = StoreCatalogClient::new(store);

        let search = SearchRequest::default()
            .with_collections([FORECAST_COLLECTION])
            .with_bbox(bbox::ALPS.to_vec())
            .with_datetime(time::FEBRUARY_2024);
        let ids: Vec<_> = client
            .search(&search)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["ecmwf-202402", "464-202402"]);
    }

    #[tokio::test]
    async fn test_store_client_rejects_instant_datetime() {
        let client = StoreCatalogClient::new(Arc::new(MemoryItemStore::new()));
        let search = SearchRequest::default().with_datetime("2024-02-01T00:00:00Z");
        let err = client.search(&search).await.unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }
}
