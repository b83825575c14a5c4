//! Item search requests (`POST /search` bodies and `GET /search` parameters).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::geometry::Geometry;

/// Result cap applied when a search gives no `limit`.
pub const DEFAULT_LIMIT: usize = 10;

/// A STAC item search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// 4 (2D) or 6 (3D) numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersects: Option<Geometry>,

    /// `start/end` range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// Query extension object `{field: {op: value}}`, or the same object
    /// encoded as a JSON string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SearchRequest {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn with_collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_bbox(mut self, bbox: Vec<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Errors converting `GET /search` parameters.
#[derive(Debug, Error, PartialEq)]
pub enum SearchParamsError {
    #[error("Invalid bbox '{0}': expected comma-separated numbers")]
    InvalidBbox(String),

    #[error("Invalid intersects geometry: {0}")]
    InvalidIntersects(String),
}

/// Query-string form of a search. List values are comma-separated and
/// `intersects` is a GeoJSON string.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GetSearchParams {
    pub collections: Option<String>,
    pub ids: Option<String>,
    pub bbox: Option<String>,
    pub intersects: Option<String>,
    pub datetime: Option<String>,
    pub query: Option<String>,
    pub limit: Option<usize>,
    pub token: Option<String>,
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl TryFrom<GetSearchParams> for SearchRequest {
    type Error = SearchParamsError;

    fn try_from(params: GetSearchParams) -> Result<Self, Self::Error> {
        let bbox = params
            .bbox
            .as_deref()
            .map(|raw| {
                split_list(raw)
                    .iter()
                    .map(|v| v.parse::<f64>())
                    .collect::<Result<Vec<f64>, _>>()
                    .map_err(|_| SearchParamsError::InvalidBbox(raw.to_string()))
            })
            .transpose()?;

        let intersects = params
            .intersects
            .as_deref()
            .map(|raw| {
                serde_json::from_str::<Geometry>(raw)
                    .map_err(|e| SearchParamsError::InvalidIntersects(e.to_string()))
            })
            .transpose()?;

        Ok(SearchRequest {
            collections: params.collections.as_deref().map(split_list),
            ids: params.ids.as_deref().map(split_list),
            bbox,
            intersects,
            datetime: params.datetime,
            // Parsed later by the translator, which owns the query error.
            query: params.query.map(Value::String),
            limit: params.limit,
            token: params.token,
        })
    }
}
