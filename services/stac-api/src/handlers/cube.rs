//! Cube query handler.
//!
//! Searches the catalog for the collection's items in the requested bbox and
//! datetime, reads each item's data asset in turn, merges the per-model
//! datasets and answers with one CoverageJSON coverage. Variables are renamed
//! `<name>_<model>` so models never collide.

use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::Response,
};
use dataset::{encode_coverage, merge_datasets, tagged_name, MergeOutcome, TaggedDataset};
use edr_protocol::{CoverageCollection, CoverageDocument, CubeQuery, EdrError};
use metrics::counter;
use serde::Deserialize;
use stac_protocol::SearchRequest;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{edr_error_response, json_response};
use crate::config::CubeSettings;
use crate::content_negotiation::negotiate_format;
use crate::state::AppState;

/// Query parameters for the cube endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CubeQueryParams {
    /// Bounding box as minx,miny,maxx,maxy.
    pub bbox: Option<String>,

    /// Vertical level(s): single, list or range.
    pub z: Option<String>,

    /// Datetime interval, passed to the catalog as given.
    pub datetime: Option<String>,

    /// Comma-separated variable names.
    #[serde(rename = "parameter-name")]
    pub parameter_name: Option<String>,

    /// Output format.
    pub f: Option<String>,
}

/// GET /collections/:collection_id/cube
pub async fn cube_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Query(params): Query<CubeQueryParams>,
    headers: HeaderMap,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "cube").increment(1);

    let format = match negotiate_format(&headers, params.f.as_deref()) {
        Ok(format) => format,
        Err(response) => return response,
    };

    let settings = state.config.cube_settings(&collection_id);

    let query = match CubeQuery::parse(
        params.bbox.as_deref(),
        params.z.as_deref(),
        params.datetime.as_deref(),
        params.parameter_name.as_deref(),
        &settings.variables,
    ) {
        Ok(query) => query,
        Err(e) => return edr_error_response(&EdrError::from(e)),
    };

    if let Some(max_area) = settings.max_area_sq_degrees {
        let area = query.bbox.area_sq_degrees();
        if area > max_area {
            return edr_error_response(&EdrError::ResponseTooLarge(format!(
                "Requested area of {:.1} square degrees exceeds the limit of {:.1}",
                area, max_area
            )));
        }
    }

    match assemble_cube(&state, &collection_id, settings, &query).await {
        Ok(Some(coverage)) => json_response(&coverage, format.content_type(), "no-cache"),
        Ok(None) => {
            info!(collection = %collection_id, "No data found");
            counter!("stac_cube_no_data_total").increment(1);
            json_response(
                &CoverageCollection::empty(),
                format.content_type(),
                "no-cache",
            )
        }
        Err(e) => {
            warn!(collection = %collection_id, error = %e, "Cube query failed");
            edr_error_response(&e)
        }
    }
}

/// Search, read, merge and encode. `None` when the search found nothing.
async fn assemble_cube(
    state: &AppState,
    collection_id: &str,
    settings: &CubeSettings,
    query: &CubeQuery,
) -> Result<Option<CoverageDocument>, EdrError> {
    let mut search = SearchRequest::default()
        .with_collections([collection_id])
        .with_bbox(query.bbox.to_vec())
        .with_limit(settings.max_items);
    if let Some(datetime) = &query.datetime {
        search = search.with_datetime(datetime.clone());
    }

    let items = state.catalog.search(&search).await.map_err(|e| {
        if e.http_status_code() == 400 {
            EdrError::InvalidParameter(e.to_string())
        } else {
            EdrError::CatalogError(e.to_string())
        }
    })?;
    debug!(count = items.len(), "Catalog search returned items");

    let coords = settings.coordinates.to_names();
    let mut tagged = Vec::with_capacity(items.len());
    for item in &items {
        let asset = item.asset(&settings.asset_key).ok_or_else(|| {
            EdrError::DataAccessError(format!(
                "Item {} has no '{}' asset",
                item.id, settings.asset_key
            ))
        })?;

        let dataset = state
            .datasets
            .open(&asset.href, &coords, &query.parameter_names)
            .await
            .map_err(|e| EdrError::DataAccessError(e.to_string()))?;

        let dataset = TaggedDataset::from_property(
            &item.id,
            item.property(&settings.model_property),
            dataset,
        )
        .map_err(|e| EdrError::DataAccessError(e.to_string()))?;
        tagged.push(dataset);
    }
    counter!("stac_cube_items_total").increment(items.len() as u64);

    let models: Vec<String> = tagged.iter().map(|t| t.model.clone()).collect();

    let mut merged = match merge_datasets(tagged, &query.parameter_names)
        .map_err(|e| EdrError::InternalError(e.to_string()))?
    {
        MergeOutcome::Merged(dataset) => dataset,
        MergeOutcome::NoData => return Ok(None),
    };

    if let Some(z) = &query.z {
        merged.select_z(|level| z.matches(level));
    }

    let requested: Vec<String> = models
        .iter()
        .flat_map(|model| {
            query
                .parameter_names
                .iter()
                .map(move |name| tagged_name(name, model))
        })
        .collect();
    merged.retain_variables(&requested);

    Ok(Some(encode_coverage(&merged)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_use_dashed_parameter_name() {
        let params: CubeQueryParams =
            serde_json::from_value(serde_json::json!({"parameter-name": "COUT,TP", "f": "json"}))
                .unwrap();
        assert_eq!(params.parameter_name.as_deref(), Some("COUT,TP"));
        assert_eq!(params.f.as_deref(), Some("json"));
        assert!(params.bbox.is_none());
    }
}
