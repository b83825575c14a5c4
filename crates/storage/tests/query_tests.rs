//! Search translation tests: clause construction, rendering and failures.

use serde_json::json;
use stac_protocol::{Geometry, SearchRequest};
use storage::query::{BBOX_FIELD, COLLECTION_FIELD, GEOMETRY_FIELD, ID_FIELD, ISSUE_DATE_FIELD};
use storage::{FilterClause, ItemFilter, ItemQuery, QueryError};

fn alps_ring() -> Vec<[f64; 2]> {
    vec![
        [10.0, 45.0],
        [12.0, 45.0],
        [12.0, 47.0],
        [10.0, 47.0],
        [10.0, 45.0],
    ]
}

// ============================================================================
// Spatial and temporal clauses
// ============================================================================

#[test]
fn test_bbox_and_february_range() {
    let search = SearchRequest::default()
        .with_bbox(vec![10.0, 45.0, 12.0, 47.0])
        .with_datetime("2024-02-01T00:00:00Z/2024-02-29T00:00:00Z");
    let filter = ItemFilter::from_search(&search).unwrap();

    assert_eq!(
        filter.get(ISSUE_DATE_FIELD),
        Some(&FilterClause::In(vec![json!("202402")]))
    );
    assert_eq!(filter.get(BBOX_FIELD), Some(&FilterClause::GeoWithin(alps_ring())));
}

#[test]
fn test_three_dimensional_bbox_drops_heights() {
    let search = SearchRequest::default().with_bbox(vec![10.0, 45.0, 0.0, 12.0, 47.0, 3000.0]);
    let filter = ItemFilter::from_search(&search).unwrap();
    assert_eq!(filter.get(BBOX_FIELD), Some(&FilterClause::GeoWithin(alps_ring())));
}

#[test]
fn test_bbox_with_wrong_length_rejected() {
    let search = SearchRequest::default().with_bbox(vec![10.0, 45.0, 12.0]);
    assert!(matches!(
        ItemFilter::from_search(&search),
        Err(QueryError::InvalidBbox(_))
    ));
}

#[test]
fn test_short_month_skipped_after_month_end_start() {
    let search = SearchRequest::default().with_datetime("2024-01-31T00:00:00Z/2024-03-31T00:00:00Z");
    let filter = ItemFilter::from_search(&search).unwrap();

    // Jan 31 + 32 days lands in March, so February gets no bucket.
    assert_eq!(
        filter.get(ISSUE_DATE_FIELD),
        Some(&FilterClause::In(vec![json!("202401"), json!("202403")]))
    );
}

#[test]
fn test_datetime_without_separator_rejected() {
    let search = SearchRequest::default().with_datetime("2024-02-01T00:00:00Z");
    assert!(matches!(
        ItemFilter::from_search(&search),
        Err(QueryError::InvalidDatetime(_))
    ));

    let search = SearchRequest::default().with_datetime("2024-02-01/2024-02-29");
    assert!(matches!(
        ItemFilter::from_search(&search),
        Err(QueryError::InvalidDatetime(_))
    ));
}

#[test]
fn test_intersects_clause() {
    let search = SearchRequest {
        intersects: Some(Geometry::point(11.0, 46.0)),
        ..Default::default()
    };
    let filter = ItemFilter::from_search(&search).unwrap();
    assert_eq!(
        filter.get(GEOMETRY_FIELD),
        Some(&FilterClause::GeoIntersects(Geometry::point(11.0, 46.0)))
    );
}

// ============================================================================
// Query extension
// ============================================================================

#[test]
fn test_query_object_and_string_agree() {
    let object = SearchRequest::default().with_query(json!({"model": {"eq": 464}}));
    let string = SearchRequest::default().with_query(json!(r#"{"model": {"eq": 464}}"#));

    let a = ItemFilter::from_search(&object).unwrap();
    let b = ItemFilter::from_search(&string).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.get("properties.model"), Some(&FilterClause::Equals(json!(464))));
}

#[test]
fn test_unparsable_query_string_rejected() {
    let search = SearchRequest::default().with_query(json!("{model: eq}"));
    assert!(matches!(
        ItemFilter::from_search(&search),
        Err(QueryError::InvalidQuery(_))
    ));

    let search = SearchRequest::default().with_query(json!({"model": "ecmwf"}));
    assert!(matches!(
        ItemFilter::from_search(&search),
        Err(QueryError::InvalidQuery(_))
    ));
}

#[test]
fn test_unknown_operator_rejected() {
    let search = SearchRequest::default().with_query(json!({"model": {"like": "ec%"}}));
    assert_eq!(
        ItemFilter::from_search(&search),
        Err(QueryError::UnsupportedOperator {
            field: "model".to_string(),
            op: "like".to_string(),
        })
    );
}

#[test]
fn test_comparisons_on_one_field_form_a_range() {
    let search = SearchRequest::default().with_query(json!({"step": {"gte": 6, "lt": 24}}));
    let filter = ItemFilter::from_search(&search).unwrap();

    assert_eq!(
        filter.get("properties.step"),
        Some(&FilterClause::Range {
            gt: None,
            gte: Some(json!(6)),
            lt: Some(json!(24)),
            lte: None,
        })
    );
    assert_eq!(
        filter.to_document(),
        json!({"properties.step": {"$gte": 6, "$lt": 24}})
    );
}

#[test]
fn test_non_comparison_operator_replaces_field_clause() {
    // Operators are applied in key order: "eq" before "gt" before "neq".
    let search = SearchRequest::default().with_query(json!({"step": {"eq": 6, "gt": 3, "neq": 9}}));
    let filter = ItemFilter::from_search(&search).unwrap();
    assert_eq!(filter.get("properties.step"), Some(&FilterClause::NotEquals(json!(9))));
    assert_eq!(filter.len(), 1);
}

#[test]
fn test_in_operator_needs_array() {
    let search = SearchRequest::default().with_query(json!({"model": {"in": ["ecmwf", 464]}}));
    let filter = ItemFilter::from_search(&search).unwrap();
    assert_eq!(
        filter.get("properties.model"),
        Some(&FilterClause::In(vec![json!("ecmwf"), json!(464)]))
    );

    let search = SearchRequest::default().with_query(json!({"model": {"in": "ecmwf"}}));
    assert!(matches!(
        ItemFilter::from_search(&search),
        Err(QueryError::InvalidQuery(_))
    ));
}

#[test]
fn test_datetime_overrides_query_issue_date() {
    let search = SearchRequest::default()
        .with_query(json!({"issue_date": {"eq": "202312"}}))
        .with_datetime("2024-02-01T00:00:00Z/2024-02-29T00:00:00Z");
    let filter = ItemFilter::from_search(&search).unwrap();

    assert_eq!(
        filter.get(ISSUE_DATE_FIELD),
        Some(&FilterClause::In(vec![json!("202402")]))
    );
    assert_eq!(filter.len(), 1);
}

// ============================================================================
// Clause order and rendering
// ============================================================================

#[test]
fn test_clause_order() {
    let search = SearchRequest {
        collections: Some(vec!["forecasts".to_string()]),
        ids: Some(vec!["a".to_string()]),
        bbox: Some(vec![10.0, 45.0, 12.0, 47.0]),
        intersects: Some(Geometry::point(11.0, 46.0)),
        datetime: Some("2024-02-01T00:00:00Z/2024-02-29T00:00:00Z".to_string()),
        query: Some(json!({"model": {"eq": "ecmwf"}})),
        ..Default::default()
    };
    let filter = ItemFilter::from_search(&search).unwrap();

    assert_eq!(
        filter.fields(),
        vec![
            COLLECTION_FIELD,
            ID_FIELD,
            GEOMETRY_FIELD,
            "properties.model",
            BBOX_FIELD,
            ISSUE_DATE_FIELD,
        ]
    );
}

#[test]
fn test_empty_collection_list_adds_no_clause() {
    let search = SearchRequest::default().with_collections(Vec::<String>::new());
    assert!(ItemFilter::from_search(&search).unwrap().is_empty());
}

#[test]
fn test_document_rendering() {
    let search = SearchRequest::default()
        .with_collections(["forecasts"])
        .with_bbox(vec![10.0, 45.0, 12.0, 47.0])
        .with_datetime("2024-02-01T00:00:00Z/2024-02-29T00:00:00Z")
        .with_query(json!({"model": {"eq": "ecmwf"}}));
    let filter = ItemFilter::from_search(&search).unwrap();

    assert_eq!(
        filter.to_document(),
        json!({
            "collection": {"$in": ["forecasts"]},
            "properties.model": {"$eq": "ecmwf"},
            "bbox": {"$geoWithin": {"$geometry": {
                "type": "Polygon",
                "coordinates": [[[10.0, 45.0], [12.0, 45.0], [12.0, 47.0], [10.0, 47.0], [10.0, 45.0]]]
            }}},
            "properties.issue_date": {"$in": ["202402"]}
        })
    );
}

#[test]
fn test_limit_is_carried_beside_filter() {
    let query = ItemQuery::from_search(&SearchRequest::default()).unwrap();
    assert_eq!(query.limit, 10);
    assert!(query.filter.is_empty());

    let query = ItemQuery::from_search(&SearchRequest::default().with_limit(3)).unwrap();
    assert_eq!(query.limit, 3);
    assert!(query.filter.to_document().as_object().unwrap().is_empty());
}
