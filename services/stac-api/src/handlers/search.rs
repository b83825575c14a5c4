//! STAC item search handlers.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Response,
    Json,
};
use edr_protocol::{media_types, responses::ExceptionResponse};
use metrics::counter;
use stac_protocol::{GetSearchParams, ItemCollection, Link, SearchRequest};
use std::sync::Arc;
use storage::ItemQuery;
use tracing::{debug, warn};

use super::{climate_error_response, error_response, json_response};
use crate::state::AppState;

/// GET /search - search with query-string parameters
pub async fn get_search_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<GetSearchParams>,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "search").increment(1);

    match SearchRequest::try_from(params) {
        Ok(search) => run_search(&state, &search).await,
        Err(e) => error_response(
            StatusCode::BAD_REQUEST,
            ExceptionResponse::bad_request(e.to_string()),
        ),
    }
}

/// POST /search - search with a JSON body
pub async fn post_search_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(search): Json<SearchRequest>,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "search").increment(1);

    run_search(&state, &search).await
}

async fn run_search(state: &AppState, search: &SearchRequest) -> Response {
    let query = match ItemQuery::from_search(search) {
        Ok(query) => query,
        Err(e) => {
            debug!(error = %e, "Rejected search");
            return error_response(
                StatusCode::BAD_REQUEST,
                ExceptionResponse::bad_request(e.to_string()),
            );
        }
    };

    let items = match state.store.search(&query).await {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Item search failed");
            return climate_error_response(&e);
        }
    };

    let response = ItemCollection::new(items)
        .with_link(
            Link::new(format!("{}/search", state.base_url), "self")
                .with_type(media_types::GEO_JSON),
        )
        .with_link(Link::new(format!("{}/", state.base_url), "root").with_type(media_types::JSON));

    json_response(&response, media_types::GEO_JSON, "no-cache")
}
