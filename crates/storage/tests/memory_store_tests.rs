//! In-memory item store tests against the shared sample catalog.

use serde_json::json;
use stac_protocol::{Geometry, SearchRequest};
use storage::{ItemQuery, ItemStore, MemoryItemStore};
use test_utils::{
    bbox, sample_collections, sample_item, sample_items, time, write_seed_dir,
    FORECAST_COLLECTION, REANALYSIS_COLLECTION,
};

fn store() -> MemoryItemStore {
    MemoryItemStore::with_documents(sample_items(), sample_collections())
}

async fn search_ids(store: &MemoryItemStore, search: SearchRequest) -> Vec<String> {
    let query = ItemQuery::from_search(&search).unwrap();
    store
        .search(&query)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect()
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_bbox_and_month() {
    let search = SearchRequest::default()
        .with_collections([FORECAST_COLLECTION])
        .with_bbox(bbox::ALPS.to_vec())
        .with_datetime(time::FEBRUARY_2024);

    assert_eq!(
        search_ids(&store(), search).await,
        vec!["ecmwf-202402", "464-202402"]
    );
}

#[tokio::test]
async fn test_search_two_months() {
    let search = SearchRequest::default()
        .with_collections([FORECAST_COLLECTION])
        .with_bbox(bbox::ALPS.to_vec())
        .with_datetime(time::FEB_MAR_2024);

    assert_eq!(
        search_ids(&store(), search).await,
        vec!["ecmwf-202402", "464-202402", "ecmwf-202403"]
    );
}

#[tokio::test]
async fn test_search_numeric_model() {
    let search = SearchRequest::default().with_query(json!({"model": {"eq": 464}}));
    assert_eq!(search_ids(&store(), search).await, vec!["464-202402"]);

    // The number does not match its string rendering.
    let search = SearchRequest::default().with_query(json!({"model": {"eq": "464"}}));
    assert!(search_ids(&store(), search).await.is_empty());
}

#[tokio::test]
async fn test_search_not_equal_and_in() {
    let search = SearchRequest::default()
        .with_collections([FORECAST_COLLECTION])
        .with_query(json!({"model": {"neq": "ecmwf"}}));
    assert_eq!(search_ids(&store(), search).await, vec!["464-202402"]);

    let search = SearchRequest::default().with_query(json!({"model": {"in": ["era5", 464]}}));
    assert_eq!(
        search_ids(&store(), search).await,
        vec!["464-202402", "era5-202402"]
    );
}

#[tokio::test]
async fn test_search_string_range() {
    let search = SearchRequest::default().with_query(json!({"issue_date": {"gte": "202403"}}));
    assert_eq!(search_ids(&store(), search).await, vec!["ecmwf-202403"]);
}

#[tokio::test]
async fn test_search_intersects_point() {
    let search = SearchRequest {
        intersects: Some(Geometry::point(11.0, 46.0)),
        ..Default::default()
    };
    assert_eq!(
        search_ids(&store(), search).await,
        vec!["ecmwf-202402", "464-202402", "ecmwf-202403", "era5-202402"]
    );
}

#[tokio::test]
async fn test_search_ids() {
    let search = SearchRequest {
        ids: Some(vec!["era5-202402".to_string(), "missing".to_string()]),
        ..Default::default()
    };
    assert_eq!(search_ids(&store(), search).await, vec!["era5-202402"]);
}

#[tokio::test]
async fn test_limit_caps_results() {
    let search = SearchRequest::default().with_limit(2);
    assert_eq!(
        search_ids(&store(), search).await,
        vec!["ecmwf-202402", "464-202402"]
    );

    let search = SearchRequest::default().with_limit(0);
    assert!(search_ids(&store(), search).await.is_empty());
}

#[tokio::test]
async fn test_default_limit() {
    let store = MemoryItemStore::new();
    for i in 0..12 {
        let item = sample_item(
            &format!("item-{:02}", i),
            FORECAST_COLLECTION,
            json!("ecmwf"),
            "202402",
            bbox::ALPS_ITEM,
            "s3://climate-data/x.nc",
        );
        store.upsert_item(&item).await.unwrap();
    }
    assert_eq!(search_ids(&store, SearchRequest::default()).await.len(), 10);
}

// ============================================================================
// Direct lookups
// ============================================================================

#[tokio::test]
async fn test_item_collection() {
    let items = store().item_collection(REANALYSIS_COLLECTION, 10).await.unwrap();
    let ids: Vec<_> = items.into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["era5-202402"]);

    assert!(store().item_collection("unknown", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_item_scoped_to_collection() {
    let store = store();
    let item = store
        .get_item(FORECAST_COLLECTION, "464-202402")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.property_tag("model"), Some("464".to_string()));

    assert!(store
        .get_item(REANALYSIS_COLLECTION, "464-202402")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_collections() {
    let store = store();
    let collections = store.all_collections().await.unwrap();
    assert_eq!(collections.len(), 2);

    let forecasts = store.get_collection(FORECAST_COLLECTION).await.unwrap().unwrap();
    assert_eq!(forecasts.display_title(), "FORECASTS");
    assert!(store.get_collection("unknown").await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_replaces_existing_item() {
    let store = store();
    let mut item = sample_items().remove(0);
    item.properties.insert("issue_date".to_string(), json!("202312"));
    store.upsert_item(&item).await.unwrap();

    assert_eq!(store.item_count().await, 5);
    let stored = store
        .get_item(FORECAST_COLLECTION, &item.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.property("issue_date"), Some(&json!("202312")));
}

// ============================================================================
// Seeding
// ============================================================================

#[tokio::test]
async fn test_seed_from_dir() {
    let dir = write_seed_dir();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    std::fs::write(dir.path().join("other.json"), r#"{"type": "Catalog"}"#).unwrap();

    let store = MemoryItemStore::from_dir(dir.path()).unwrap();
    assert_eq!(store.item_count().await, 5);
    assert_eq!(store.all_collections().await.unwrap().len(), 2);
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_seed_from_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(MemoryItemStore::from_dir(&dir.path().join("missing")).is_err());
}
