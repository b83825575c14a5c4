//! STAC API data structures.
//!
//! Items and collections are kept close to their stored JSON: fields this
//! crate does not model are preserved through flattened maps, so documents
//! read from the store serialize back unchanged.
//!
//! ```
//! use stac_protocol::SearchRequest;
//!
//! let search: SearchRequest = serde_json::from_str(
//!     r#"{"collections": ["forecasts"], "bbox": [10, 45, 12, 47]}"#,
//! ).unwrap();
//! assert_eq!(search.effective_limit(), 10);
//! ```

pub mod collection;
pub mod geometry;
pub mod item;
pub mod landing;
pub mod search;

pub use collection::{Collection, Collections};
pub use geometry::Geometry;
pub use item::{Asset, Item, ItemCollection};
pub use landing::LandingPage;
pub use search::{GetSearchParams, SearchParamsError, SearchRequest, DEFAULT_LIMIT};

pub use edr_protocol::Link;

/// STAC version written on generated documents.
pub const STAC_VERSION: &str = "1.0.0";

/// STAC API and OGC API - Features conformance class URIs
pub mod conformance {
    pub const CORE: &str = "https://api.stacspec.org/v1.0.0/core";
    pub const ITEM_SEARCH: &str = "https://api.stacspec.org/v1.0.0/item-search";
    pub const QUERY: &str = "https://api.stacspec.org/v1.0.0/item-search#query";
    pub const COLLECTIONS: &str = "https://api.stacspec.org/v1.0.0/collections";
    pub const FEATURES: &str = "https://api.stacspec.org/v1.0.0/ogcapi-features";
    pub const OGC_FEATURES_CORE: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core";
    pub const OGC_FEATURES_GEOJSON: &str =
        "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/geojson";
    pub const OAS30: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/oas30";

    /// Every class the search service implements.
    pub const ALL: &[&str] = &[
        CORE,
        ITEM_SEARCH,
        QUERY,
        COLLECTIONS,
        FEATURES,
        OGC_FEATURES_CORE,
        OGC_FEATURES_GEOJSON,
        OAS30,
    ];
}
