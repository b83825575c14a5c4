//! Collection metadata handlers.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::Response,
};
use edr_protocol::{media_types, EdrError};
use metrics::counter;
use stac_protocol::{Collections, Link};
use std::sync::Arc;
use tracing::warn;

use super::{climate_error_response, edr_error_response, json_response};
use crate::content_negotiation::check_metadata_accept;
use crate::state::AppState;

/// GET /collections - every stored collection
pub async fn list_collections_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "collections").increment(1);

    if let Err(response) = check_metadata_accept(&headers) {
        return response;
    }

    let collections = match state.store.all_collections().await {
        Ok(collections) => collections,
        Err(e) => {
            warn!(error = %e, "Failed to list collections");
            return climate_error_response(&e);
        }
    };

    let response = Collections {
        collections,
        links: vec![
            Link::new(format!("{}/collections", state.base_url), "self")
                .with_type(media_types::JSON),
            Link::new(format!("{}/", state.base_url), "root").with_type(media_types::JSON),
        ],
    };

    json_response(&response, media_types::JSON, "max-age=300")
}

/// GET /collections/:collection_id - one collection
pub async fn get_collection_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "collection").increment(1);

    if let Err(response) = check_metadata_accept(&headers) {
        return response;
    }

    match state.store.get_collection(&collection_id).await {
        Ok(Some(collection)) => json_response(&collection, media_types::JSON, "max-age=300"),
        Ok(None) => edr_error_response(&EdrError::CollectionNotFound(collection_id)),
        Err(e) => {
            warn!(collection = %collection_id, error = %e, "Failed to load collection");
            climate_error_response(&e)
        }
    }
}
