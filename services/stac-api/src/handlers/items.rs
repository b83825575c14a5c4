//! Item handlers scoped to one collection.

use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::Response,
};
use edr_protocol::{media_types, EdrError};
use metrics::counter;
use serde::Deserialize;
use stac_protocol::{ItemCollection, Link, DEFAULT_LIMIT};
use std::sync::Arc;
use tracing::warn;

use super::{climate_error_response, edr_error_response, json_response};
use crate::content_negotiation::check_metadata_accept;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemsQueryParams {
    pub limit: Option<usize>,
}

/// GET /collections/:collection_id/items - the collection's items
///
/// An unknown collection yields an empty FeatureCollection.
pub async fn list_items_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Query(params): Query<ItemsQueryParams>,
    headers: HeaderMap,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "items").increment(1);

    if let Err(response) = check_metadata_accept(&headers) {
        return response;
    }

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let items = match state.store.item_collection(&collection_id, limit).await {
        Ok(items) => items,
        Err(e) => {
            warn!(collection = %collection_id, error = %e, "Failed to list items");
            return climate_error_response(&e);
        }
    };

    let response = ItemCollection::new(items).with_link(
        Link::new(
            format!("{}/collections/{}/items", state.base_url, collection_id),
            "self",
        )
        .with_type(media_types::GEO_JSON),
    );

    json_response(&response, media_types::GEO_JSON, "max-age=60")
}

/// GET /collections/:collection_id/items/:item_id - one item
pub async fn get_item_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((collection_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "item").increment(1);

    if let Err(response) = check_metadata_accept(&headers) {
        return response;
    }

    match state.store.get_item(&collection_id, &item_id).await {
        Ok(Some(item)) => json_response(&item, media_types::GEO_JSON, "max-age=60"),
        Ok(None) => edr_error_response(&EdrError::ItemNotFound(format!(
            "{}/{}",
            collection_id, item_id
        ))),
        Err(e) => {
            warn!(collection = %collection_id, item = %item_id, error = %e, "Failed to load item");
            climate_error_response(&e)
        }
    }
}
