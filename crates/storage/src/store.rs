//! Item store abstraction over the `stac_item` and `stac_collection` stores.

use async_trait::async_trait;
use climate_common::ClimateResult;
use stac_protocol::{Collection, Item};

use crate::query::ItemQuery;

/// Read/write access to STAC items and collections.
///
/// Search results come back in insertion order and are capped at the
/// query's limit. Absent documents are `Ok(None)`, never errors.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Items matching a translated search.
    async fn search(&self, query: &ItemQuery) -> ClimateResult<Vec<Item>>;

    async fn get_item(&self, collection_id: &str, item_id: &str) -> ClimateResult<Option<Item>>;

    async fn all_collections(&self) -> ClimateResult<Vec<Collection>>;

    async fn get_collection(&self, collection_id: &str) -> ClimateResult<Option<Collection>>;

    /// Insert an item, replacing one with the same collection and id.
    async fn upsert_item(&self, item: &Item) -> ClimateResult<()>;

    /// Insert a collection, replacing one with the same id.
    async fn upsert_collection(&self, collection: &Collection) -> ClimateResult<()>;

    /// Check the backing store is reachable.
    async fn ping(&self) -> ClimateResult<()>;

    /// Items belonging to one collection.
    async fn item_collection(&self, collection_id: &str, limit: usize) -> ClimateResult<Vec<Item>> {
        self.search(&ItemQuery::for_collection(collection_id, limit))
            .await
    }
}
