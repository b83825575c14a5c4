//! Climate STAC API Service Library
//!
//! HTTP server for a STAC catalog of climate forecast items, with an
//! OGC API - EDR cube query that merges the matching items' datasets into
//! one CoverageJSON document.

pub mod catalog_client;
pub mod config;
pub mod content_negotiation;
pub mod datasets;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::get,
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Landing page
        .route("/", get(handlers::landing::landing_handler))
        // Conformance
        .route(
            "/conformance",
            get(handlers::conformance::conformance_handler),
        )
        // Collections
        .route(
            "/collections",
            get(handlers::collections::list_collections_handler),
        )
        .route(
            "/collections/:collection_id",
            get(handlers::collections::get_collection_handler),
        )
        // Items
        .route(
            "/collections/:collection_id/items",
            get(handlers::items::list_items_handler),
        )
        .route(
            "/collections/:collection_id/items/:item_id",
            get(handlers::items::get_item_handler),
        )
        // Item search
        .route(
            "/search",
            get(handlers::search::get_search_handler).post(handlers::search::post_search_handler),
        )
        // Cube query
        .route(
            "/collections/:collection_id/cube",
            get(handlers::cube::cube_handler),
        )
        .route(
            "/climate_data",
            get(handlers::climate_data::climate_data_handler),
        )
        // API description
        .route("/api", get(handlers::api::api_handler))
        .route("/api.html", get(handlers::api::api_html_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
