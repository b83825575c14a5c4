//! Translation of STAC item searches into document-store filters.
//!
//! A search becomes an [`ItemFilter`]: an insertion-ordered set of clauses
//! keyed by document field path (`collection`, `properties.model`, ...).
//! All clauses must hold. Inserting a clause for a field that already has
//! one replaces it in place, so later parts of a search win over earlier
//! ones for the same field.
//!
//! The filter renders to a Mongo-style expression with
//! [`ItemFilter::to_document`] and can be evaluated directly against an item
//! document with [`ItemFilter::matches`]. The PostgreSQL store compiles it
//! to SQL.

use std::cmp::Ordering;

use climate_common::time::parse_datetime_range;
use climate_common::{BoundingBox, ClimateError};
use serde_json::{json, Map, Value};
use stac_protocol::{Geometry, SearchRequest};
use thiserror::Error;

pub const COLLECTION_FIELD: &str = "collection";
pub const ID_FIELD: &str = "id";
pub const GEOMETRY_FIELD: &str = "geometry";
pub const BBOX_FIELD: &str = "bbox";
pub const ISSUE_DATE_FIELD: &str = "properties.issue_date";

/// Errors translating a search.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Unsupported query operator '{op}' on field '{field}'")]
    UnsupportedOperator { field: String, op: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid bbox: {0}")]
    InvalidBbox(String),
}

impl From<QueryError> for ClimateError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidDatetime(msg) => ClimateError::InvalidTime(msg),
            QueryError::InvalidBbox(msg) => ClimateError::InvalidBbox(msg),
            other => ClimateError::InvalidQuery(other.to_string()),
        }
    }
}

/// Query extension operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl Operator {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(Operator::Eq),
            "neq" => Some(Operator::Neq),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }
}

/// One condition on a document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    Equals(Value),
    NotEquals(Value),
    Range {
        gt: Option<Value>,
        gte: Option<Value>,
        lt: Option<Value>,
        lte: Option<Value>,
    },
    In(Vec<Value>),
    /// Document envelope lies inside the closed polygon ring.
    GeoWithin(Vec<[f64; 2]>),
    /// Document envelope touches the geometry's envelope.
    GeoIntersects(Geometry),
}

impl FilterClause {
    fn empty_range() -> Self {
        FilterClause::Range {
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }

    /// Document-store expression for this clause.
    pub fn to_document(&self) -> Value {
        match self {
            FilterClause::Equals(v) => json!({ "$eq": v }),
            FilterClause::NotEquals(v) => json!({ "$ne": v }),
            FilterClause::Range { gt, gte, lt, lte } => {
                let mut doc = Map::new();
                for (key, bound) in [("$gt", gt), ("$gte", gte), ("$lt", lt), ("$lte", lte)] {
                    if let Some(v) = bound {
                        doc.insert(key.to_string(), v.clone());
                    }
                }
                Value::Object(doc)
            }
            FilterClause::In(values) => json!({ "$in": values }),
            FilterClause::GeoWithin(ring) => json!({
                "$geoWithin": { "$geometry": Geometry::polygon(ring.clone()) }
            }),
            FilterClause::GeoIntersects(geometry) => json!({
                "$geoIntersects": { "$geometry": geometry }
            }),
        }
    }

    /// Evaluate against the value at `field` in `document`.
    pub fn matches(&self, field: &str, document: &Value) -> bool {
        let value = lookup(document, field);
        match self {
            FilterClause::Equals(expected) => value.map_or(false, |v| equals_or_contains(v, expected)),
            FilterClause::NotEquals(expected) => {
                !value.map_or(false, |v| equals_or_contains(v, expected))
            }
            FilterClause::Range { gt, gte, lt, lte } => value.map_or(false, |v| {
                within_bound(v, gt, |o| o == Ordering::Greater)
                    && within_bound(v, gte, |o| o != Ordering::Less)
                    && within_bound(v, lt, |o| o == Ordering::Less)
                    && within_bound(v, lte, |o| o != Ordering::Greater)
            }),
            FilterClause::In(options) => {
                value.map_or(false, |v| options.iter().any(|o| equals_or_contains(v, o)))
            }
            FilterClause::GeoWithin(ring) => {
                match (document_envelope(document), BoundingBox::enclosing(ring)) {
                    (Some(envelope), Some(area)) => area.contains(&envelope),
                    _ => false,
                }
            }
            FilterClause::GeoIntersects(geometry) => {
                match (document_envelope(document), geometry.bounding_box()) {
                    (Some(envelope), Some(area)) => area.intersects(&envelope),
                    _ => false,
                }
            }
        }
    }
}

/// Ordered conjunction of field clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    clauses: Vec<(String, FilterClause)>,
}

impl ItemFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the filter for a search.
    ///
    /// Clause order: collections, ids, intersects, free-form query, bbox,
    /// datetime. The datetime clause therefore overrides any `issue_date`
    /// condition given through the query extension.
    pub fn from_search(search: &SearchRequest) -> Result<Self, QueryError> {
        let mut filter = ItemFilter::new();

        if let Some(collections) = search.collections.as_ref().filter(|c| !c.is_empty()) {
            filter.insert(COLLECTION_FIELD, FilterClause::In(strings(collections)));
        }

        if let Some(ids) = search.ids.as_ref().filter(|ids| !ids.is_empty()) {
            filter.insert(ID_FIELD, FilterClause::In(strings(ids)));
        }

        if let Some(geometry) = &search.intersects {
            filter.insert(GEOMETRY_FIELD, FilterClause::GeoIntersects(geometry.clone()));
        }

        if let Some(query) = &search.query {
            filter.apply_query(query)?;
        }

        if let Some(bbox) = &search.bbox {
            let bbox = BoundingBox::from_slice(bbox).ok_or_else(|| {
                QueryError::InvalidBbox(format!("expected 4 or 6 numbers, got {}", bbox.len()))
            })?;
            filter.insert(BBOX_FIELD, FilterClause::GeoWithin(bbox.to_polygon_ring()));
        }

        if let Some(datetime) = &search.datetime {
            let range = parse_datetime_range(datetime)
                .map_err(|e| QueryError::InvalidDatetime(e.to_string()))?;
            let buckets = range.month_buckets().into_iter().map(Value::String).collect();
            filter.insert(ISSUE_DATE_FIELD, FilterClause::In(buckets));
        }

        Ok(filter)
    }

    /// Filter selecting every item of one collection.
    pub fn for_collection(collection_id: &str) -> Self {
        let mut filter = ItemFilter::new();
        filter.insert(
            COLLECTION_FIELD,
            FilterClause::Equals(Value::String(collection_id.to_string())),
        );
        filter
    }

    /// Add a clause, replacing an existing clause on the same field in place.
    pub fn insert(&mut self, field: impl Into<String>, clause: FilterClause) {
        let field = field.into();
        match self.clauses.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => *existing = clause,
            None => self.clauses.push((field, clause)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FilterClause> {
        self.clauses.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    fn get_mut(&mut self, field: &str) -> Option<&mut FilterClause> {
        self.clauses.iter_mut().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    pub fn clauses(&self) -> &[(String, FilterClause)] {
        &self.clauses
    }

    pub fn fields(&self) -> Vec<&str> {
        self.clauses.iter().map(|(f, _)| f.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Document-store expression, one key per field.
    pub fn to_document(&self) -> Value {
        let doc: Map<String, Value> = self
            .clauses
            .iter()
            .map(|(field, clause)| (field.clone(), clause.to_document()))
            .collect();
        Value::Object(doc)
    }

    /// Whether an item document satisfies every clause.
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, clause)| clause.matches(field, document))
    }

    /// Apply the query extension (`{field: {op: value}}`), given either as an
    /// object or as that object serialized to a string.
    fn apply_query(&mut self, query: &Value) -> Result<(), QueryError> {
        let parsed: Value;
        let fields = match query {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            Value::String(raw) => {
                parsed = serde_json::from_str(raw)
                    .map_err(|e| QueryError::InvalidQuery(e.to_string()))?;
                parsed
                    .as_object()
                    .ok_or_else(|| QueryError::InvalidQuery("expected a JSON object".to_string()))?
            }
            other => {
                return Err(QueryError::InvalidQuery(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        for (field, ops) in fields {
            let ops = ops.as_object().ok_or_else(|| {
                QueryError::InvalidQuery(format!("operators for '{}' must be an object", field))
            })?;
            let path = format!("properties.{}", field);

            for (op, value) in ops {
                let operator = Operator::parse(op).ok_or_else(|| QueryError::UnsupportedOperator {
                    field: field.clone(),
                    op: op.clone(),
                })?;

                match operator {
                    Operator::Eq => self.insert(path.clone(), FilterClause::Equals(value.clone())),
                    Operator::Neq => {
                        self.insert(path.clone(), FilterClause::NotEquals(value.clone()))
                    }
                    Operator::In => {
                        let options = value.as_array().ok_or_else(|| {
                            QueryError::InvalidQuery(format!("'in' on '{}' needs an array", field))
                        })?;
                        self.insert(path.clone(), FilterClause::In(options.clone()));
                    }
                    Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
                        self.set_bound(&path, operator, value.clone())
                    }
                }
            }
        }

        Ok(())
    }

    /// Comparison operators on one field accumulate into a single range.
    fn set_bound(&mut self, path: &str, operator: Operator, value: Value) {
        if !matches!(self.get(path), Some(FilterClause::Range { .. })) {
            self.insert(path, FilterClause::empty_range());
        }

        if let Some(FilterClause::Range { gt, gte, lt, lte }) = self.get_mut(path) {
            let slot = match operator {
                Operator::Gt => gt,
                Operator::Gte => gte,
                Operator::Lt => lt,
                _ => lte,
            };
            *slot = Some(value);
        }
    }
}

/// A translated search: filter plus result cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub limit: usize,
}

impl ItemQuery {
    pub fn new(filter: ItemFilter, limit: usize) -> Self {
        Self { filter, limit }
    }

    pub fn from_search(search: &SearchRequest) -> Result<Self, QueryError> {
        Ok(Self::new(
            ItemFilter::from_search(search)?,
            search.effective_limit(),
        ))
    }

    pub fn for_collection(collection_id: &str, limit: usize) -> Self {
        Self::new(ItemFilter::for_collection(collection_id), limit)
    }
}

// =============================================================================
// Document evaluation helpers
// =============================================================================

fn strings(values: &[String]) -> Vec<Value> {
    values.iter().cloned().map(Value::String).collect()
}

/// Resolve a dotted path such as `properties.model`.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, key| current.get(key))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

/// Array fields match when any element matches.
fn equals_or_contains(value: &Value, expected: &Value) -> bool {
    values_equal(value, expected)
        || value
            .as_array()
            .map_or(false, |items| items.iter().any(|v| values_equal(v, expected)))
}

/// Numbers compare numerically, strings lexically, anything else not at all.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn within_bound(value: &Value, bound: &Option<Value>, accept: impl Fn(Ordering) -> bool) -> bool {
    bound
        .as_ref()
        .map_or(true, |b| compare(value, b).map_or(false, &accept))
}

/// Envelope of an item document: its `bbox`, else its geometry.
fn document_envelope(document: &Value) -> Option<BoundingBox> {
    let from_bbox = document
        .get(BBOX_FIELD)
        .and_then(Value::as_array)
        .and_then(|values| {
            let numbers: Option<Vec<f64>> = values.iter().map(Value::as_f64).collect();
            BoundingBox::from_slice(&numbers?)
        });

    from_bbox.or_else(|| {
        document
            .get(GEOMETRY_FIELD)
            .and_then(|g| serde_json::from_value::<Geometry>(g.clone()).ok())
            .and_then(|g| g.bounding_box())
    })
}
