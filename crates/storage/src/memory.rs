//! In-process item store for development and tests.

use std::path::Path;

use async_trait::async_trait;
use climate_common::{ClimateError, ClimateResult};
use serde_json::Value;
use stac_protocol::{Collection, Item};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::query::ItemQuery;
use crate::store::ItemStore;

/// Item store held in memory, evaluating filters with [`ItemFilter::matches`].
///
/// [`ItemFilter::matches`]: crate::query::ItemFilter::matches
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<Item>>,
    collections: RwLock<Vec<Collection>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(items: Vec<Item>, collections: Vec<Collection>) -> Self {
        Self {
            items: RwLock::new(items),
            collections: RwLock::new(collections),
        }
    }

    /// Seed from a directory of JSON files.
    ///
    /// Each `*.json` file holds a collection, an item, or a FeatureCollection
    /// of items. Files are read in name order; other documents are skipped.
    pub fn from_dir(dir: &Path) -> ClimateResult<Self> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| ClimateError::StorageError(format!("{}: {}", dir.display(), e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
            .collect();
        paths.sort();

        let mut items = Vec::new();
        let mut collections = Vec::new();

        for path in &paths {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| ClimateError::StorageError(format!("{}: {}", path.display(), e)))?;
            let doc: Value = serde_json::from_str(&raw)
                .map_err(|e| ClimateError::StorageError(format!("{}: {}", path.display(), e)))?;

            let parse_err = |e: serde_json::Error| {
                ClimateError::StorageError(format!("{}: {}", path.display(), e))
            };

            match doc.get("type").and_then(Value::as_str) {
                Some("Collection") => collections.push(serde_json::from_value(doc).map_err(parse_err)?),
                Some("Feature") => items.push(serde_json::from_value(doc).map_err(parse_err)?),
                Some("FeatureCollection") => {
                    let features = doc.get("features").cloned().unwrap_or(Value::Array(Vec::new()));
                    let features: Vec<Item> = serde_json::from_value(features).map_err(parse_err)?;
                    items.extend(features);
                }
                other => warn!(path = %path.display(), doc_type = ?other, "Skipping unrecognised seed document"),
            }
        }

        info!(
            dir = %dir.display(),
            items = items.len(),
            collections = collections.len(),
            "Seeded in-memory item store"
        );

        Ok(Self::with_documents(items, collections))
    }

    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    #[instrument(skip(self, query), fields(limit = query.limit))]
    async fn search(&self, query: &ItemQuery) -> ClimateResult<Vec<Item>> {
        let items = self.items.read().await;
        let mut found = Vec::new();

        for item in items.iter() {
            if found.len() >= query.limit {
                break;
            }
            let document = serde_json::to_value(item)?;
            if query.filter.matches(&document) {
                found.push(item.clone());
            }
        }

        debug!(found = found.len(), "Searched in-memory items");
        Ok(found)
    }

    async fn get_item(&self, collection_id: &str, item_id: &str) -> ClimateResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .find(|i| i.id == item_id && i.collection.as_deref() == Some(collection_id))
            .cloned())
    }

    async fn all_collections(&self) -> ClimateResult<Vec<Collection>> {
        Ok(self.collections.read().await.clone())
    }

    async fn get_collection(&self, collection_id: &str) -> ClimateResult<Option<Collection>> {
        let collections = self.collections.read().await;
        Ok(collections.iter().find(|c| c.id == collection_id).cloned())
    }

    async fn upsert_item(&self, item: &Item) -> ClimateResult<()> {
        let mut items = self.items.write().await;
        match items
            .iter_mut()
            .find(|i| i.id == item.id && i.collection == item.collection)
        {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        Ok(())
    }

    async fn upsert_collection(&self, collection: &Collection) -> ClimateResult<()> {
        let mut collections = self.collections.write().await;
        match collections.iter_mut().find(|c| c.id == collection.id) {
            Some(existing) => *existing = collection.clone(),
            None => collections.push(collection.clone()),
        }
        Ok(())
    }

    async fn ping(&self) -> ClimateResult<()> {
        Ok(())
    }
}
