//! Common test fixtures for catalog and cube tests.
//!
//! The sample catalog holds forecast items for two models over the Alps in
//! February and March 2024, one item outside the Alps box, and one item in a
//! second collection.

use std::path::Path;

use climate_common::BoundingBox;
use serde_json::{json, Value};
use stac_protocol::{Asset, Collection, Item, ItemCollection};
use tempfile::TempDir;

/// Common bounding box definitions for testing.
pub mod bbox {
    /// Alps search box as STAC bbox numbers
    pub const ALPS: [f64; 4] = [10.0, 45.0, 12.0, 47.0];

    /// Same box in query-string form
    pub const ALPS_QUERY: &str = "10,45,12,47";

    /// Footprint of the sample items inside the Alps box
    pub const ALPS_ITEM: [f64; 4] = [10.5, 45.5, 11.5, 46.5];

    /// Footprint well outside the Alps box
    pub const OUTSIDE_ITEM: [f64; 4] = [20.0, 50.0, 21.0, 51.0];
}

/// Common time values for testing.
pub mod time {
    /// Search range covering February 2024
    pub const FEBRUARY_2024: &str = "2024-02-01T00:00:00Z/2024-02-29T00:00:00Z";

    /// Search range covering February and March 2024
    pub const FEB_MAR_2024: &str = "2024-02-01T00:00:00Z/2024-03-31T00:00:00Z";
}

/// Collection holding the forecast items.
pub const FORECAST_COLLECTION: &str = "forecasts";

/// Second collection, for collection filters.
pub const REANALYSIS_COLLECTION: &str = "reanalysis";

/// Asset key the cube reads.
pub const DATA_ASSET: &str = "data";

pub fn sample_collection(id: &str) -> Collection {
    Collection::new(id, format!("Sample {} collection", id)).with_title(id.to_uppercase())
}

pub fn sample_collections() -> Vec<Collection> {
    vec![
        sample_collection(FORECAST_COLLECTION),
        sample_collection(REANALYSIS_COLLECTION),
    ]
}

/// Item with a `model` property, an `issue_date` bucket and a `data` asset.
pub fn sample_item(
    id: &str,
    collection: &str,
    model: Value,
    issue_date: &str,
    footprint: [f64; 4],
    href: &str,
) -> Item {
    let envelope = BoundingBox::new(footprint[0], footprint[1], footprint[2], footprint[3]);
    Item::new(id)
        .with_collection(collection)
        .with_bbox(envelope)
        .with_property("model", model)
        .with_property("issue_date", issue_date)
        .with_asset(
            DATA_ASSET,
            Asset::new(href)
                .with_type("application/x-netcdf")
                .with_role("data"),
        )
}

pub fn sample_items() -> Vec<Item> {
    vec![
        sample_item(
            "ecmwf-202402",
            FORECAST_COLLECTION,
            json!("ecmwf"),
            "202402",
            bbox::ALPS_ITEM,
            "s3://climate-data/ecmwf/202402.nc",
        ),
        sample_item(
            "464-202402",
            FORECAST_COLLECTION,
            json!(464),
            "202402",
            bbox::ALPS_ITEM,
            "s3://climate-data/464/202402.nc",
        ),
        sample_item(
            "ecmwf-202403",
            FORECAST_COLLECTION,
            json!("ecmwf"),
            "202403",
            bbox::ALPS_ITEM,
            "s3://climate-data/ecmwf/202403.nc",
        ),
        sample_item(
            "ecmwf-outside-202402",
            FORECAST_COLLECTION,
            json!("ecmwf"),
            "202402",
            bbox::OUTSIDE_ITEM,
            "s3://climate-data/ecmwf/outside-202402.nc",
        ),
        sample_item(
            "era5-202402",
            REANALYSIS_COLLECTION,
            json!("era5"),
            "202402",
            bbox::ALPS_ITEM,
            "s3://climate-data/era5/202402.nc",
        ),
    ]
}

/// Write the sample catalog as seed files into a fresh temp directory.
pub fn write_seed_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    write_seed_files(dir.path());
    dir
}

/// Write one file per collection plus a FeatureCollection of all items.
pub fn write_seed_files(dir: &Path) {
    for collection in sample_collections() {
        let path = dir.join(format!("collection-{}.json", collection.id));
        std::fs::write(&path, serde_json::to_vec_pretty(&collection).expect("serialize"))
            .expect("write collection");
    }

    let items = ItemCollection::new(sample_items());
    std::fs::write(
        dir.join("items.json"),
        serde_json::to_vec_pretty(&items).expect("serialize"),
    )
    .expect("write items");
}
