//! Router tests: every route driven through the axum service with an
//! in-memory store and a fake dataset source.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use climate_common::{ClimateError, ClimateResult};
use dataset::Dataset;
use netcdf_parser::CoordinateNames;
use serde_json::{json, Value};
use stac_api::catalog_client::{CatalogClient, HttpCatalogClient, StoreCatalogClient};
use stac_api::config::ServiceConfig;
use stac_api::datasets::DatasetSource;
use stac_api::state::AppState;
use storage::{ItemStore, MemoryItemStore};
use test_utils::{
    bbox, create_model_dataset, february_start, sample_collections, sample_items, six_hourly,
    time, FORECAST_COLLECTION, REANALYSIS_COLLECTION,
};
use test_utils::assert_approx_eq;
use tower::ServiceExt;

const BASE_URL: &str = "http://stac.test";

/// Serves prepared datasets by href and records what was asked for.
#[derive(Default)]
struct FakeDatasets {
    datasets: HashMap<String, Dataset>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeDatasets {
    fn with(mut self, href: &str, dataset: Dataset) -> Self {
        self.datasets.insert(href.to_string(), dataset);
        self
    }

    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatasetSource for FakeDatasets {
    async fn open(
        &self,
        href: &str,
        _coords: &CoordinateNames,
        variables: &[String],
    ) -> ClimateResult<Dataset> {
        self.calls
            .lock()
            .unwrap()
            .push((href.to_string(), variables.to_vec()));
        self.datasets
            .get(href)
            .cloned()
            .ok_or_else(|| ClimateError::StorageError(format!("no such object: {}", href)))
    }
}

fn february_datasets() -> FakeDatasets {
    let times = six_hourly(february_start(), 2);
    FakeDatasets::default()
        .with(
            "s3://climate-data/ecmwf/202402.nc",
            create_model_dataset("COUT", 100.0, 10.0, 45.0, (3, 2), times.clone()),
        )
        .with(
            "s3://climate-data/464/202402.nc",
            create_model_dataset("COUT", 500.0, 10.5, 45.0, (3, 2), times),
        )
}

fn sample_store() -> Arc<dyn ItemStore> {
    Arc::new(MemoryItemStore::with_documents(
        sample_items(),
        sample_collections(),
    ))
}

fn app_with(store: Arc<dyn ItemStore>, datasets: Arc<FakeDatasets>, config: ServiceConfig) -> Router {
    let catalog: Arc<dyn CatalogClient> = Arc::new(StoreCatalogClient::new(Arc::clone(&store)));
    let state = AppState::with_components(store, catalog, datasets, config, BASE_URL);
    stac_api::router(Arc::new(state))
}

fn app() -> Router {
    app_with(
        sample_store(),
        Arc::new(february_datasets()),
        ServiceConfig::default(),
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, String, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, String, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, content_type, body)
}

fn feature_ids(body: &Value) -> Vec<String> {
    body["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap().to_string())
        .collect()
}

fn cube_uri(bbox: &str, datetime: &str, extra: &str) -> String {
    format!(
        "/collections/{}/cube?bbox={}&datetime={}{}",
        FORECAST_COLLECTION, bbox, datetime, extra
    )
}

// ============================================================================
// Catalog documents
// ============================================================================

#[tokio::test]
async fn test_landing_page_lists_collections() {
    let (status, content_type, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");

    assert_eq!(body["type"], "Catalog");
    assert_eq!(body["id"], "climate-stac");

    let links = body["links"].as_array().unwrap();
    let children: Vec<_> = links
        .iter()
        .filter(|l| l["rel"] == "child")
        .map(|l| l["href"].as_str().unwrap())
        .collect();
    assert_eq!(
        children,
        vec![
            "http://stac.test/collections/forecasts",
            "http://stac.test/collections/reanalysis"
        ]
    );
    assert!(links
        .iter()
        .any(|l| l["rel"] == "service-desc" && l["href"] == "http://stac.test/api"));
    assert!(links.iter().any(|l| l["rel"] == "search" && l["method"] == "POST"));
}

#[tokio::test]
async fn test_landing_page_rejects_html_accept() {
    let request = Request::get("/")
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_conformance() {
    let (status, _, body) = get(app(), "/conformance").await;
    assert_eq!(status, StatusCode::OK);

    let classes: Vec<_> = body["conformsTo"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert!(classes.contains(&stac_protocol::conformance::ITEM_SEARCH));
    assert!(classes.contains(&stac_protocol::conformance::QUERY));
    assert!(classes.contains(&edr_protocol::conformance::CUBE));
}

#[tokio::test]
async fn test_collections() {
    let (status, _, body) = get(app(), "/collections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"].as_array().unwrap().len(), 2);

    let (status, _, body) = get(app(), "/collections/reanalysis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], REANALYSIS_COLLECTION);
    assert_eq!(body["title"], "REANALYSIS");
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let (status, _, body) = get(app(), "/collections/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["detail"], "Collection not found: unknown");
}

#[tokio::test]
async fn test_collection_items_with_limit() {
    let (status, content_type, body) = get(app(), "/collections/forecasts/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/geo+json");
    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(feature_ids(&body).len(), 4);

    let (_, _, body) = get(app(), "/collections/forecasts/items?limit=1").await;
    assert_eq!(feature_ids(&body), vec!["ecmwf-202402"]);

    let (status, _, body) = get(app(), "/collections/unknown/items").await;
    assert_eq!(status, StatusCode::OK);
    assert!(feature_ids(&body).is_empty());
}

#[tokio::test]
async fn test_single_item() {
    let (status, _, body) = get(app(), "/collections/forecasts/items/464-202402").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"]["model"], 464);
    assert_eq!(body["assets"]["data"]["href"], "s3://climate-data/464/202402.nc");

    let (status, _, body) = get(app(), "/collections/reanalysis/items/464-202402").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["detail"], "Item not found: reanalysis/464-202402");
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_get_search() {
    let uri = format!(
        "/search?collections=forecasts&bbox={}&datetime={}",
        bbox::ALPS_QUERY,
        time::FEBRUARY_2024
    );
    let (status, _, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feature_ids(&body), vec!["ecmwf-202402", "464-202402"]);
    assert_eq!(body["numberReturned"], 2);
}

#[tokio::test]
async fn test_get_search_with_query_string() {
    let uri = "/search?query=%7B%22model%22%3A%7B%22eq%22%3A464%7D%7D";
    let (status, _, body) = get(app(), uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feature_ids(&body), vec!["464-202402"]);
}

#[tokio::test]
async fn test_get_search_bad_bbox() {
    let (status, _, body) = get(app(), "/search?bbox=10,north,12,47").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, _, _) = get(app(), "/search?bbox=10,45,12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_search() {
    let body = json!({
        "collections": [FORECAST_COLLECTION],
        "bbox": bbox::ALPS,
        "datetime": time::FEB_MAR_2024,
        "query": {"model": {"eq": "ecmwf"}},
    });
    let (status, content_type, body) = post_json(app(), "/search", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/geo+json");
    assert_eq!(feature_ids(&body), vec!["ecmwf-202402", "ecmwf-202403"]);
}

#[tokio::test]
async fn test_post_search_limit_and_defaults() {
    let (_, _, body) = post_json(app(), "/search", json!({})).await;
    assert_eq!(feature_ids(&body).len(), 5);

    let (_, _, body) = post_json(app(), "/search", json!({"limit": 0})).await;
    assert!(feature_ids(&body).is_empty());
}

#[tokio::test]
async fn test_post_search_unknown_operator() {
    let body = json!({"query": {"model": {"like": "ec%"}}});
    let (status, _, body) = post_json(app(), "/search", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("like"));
}

#[tokio::test]
async fn test_post_search_instant_datetime_rejected() {
    let body = json!({"datetime": "2024-02-01T00:00:00Z"});
    let (status, _, _) = post_json(app(), "/search", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_search_malformed_body() {
    let request = Request::post("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"bbox\": \"everywhere\""))
        .unwrap();
    let (status, _, _) = send(app(), request).await;
    assert!(status.is_client_error());
}

// ============================================================================
// Cube
// ============================================================================

#[tokio::test]
async fn test_cube_merges_models() {
    let datasets = Arc::new(february_datasets());
    let app = app_with(sample_store(), Arc::clone(&datasets), ServiceConfig::default());

    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "");
    let (status, content_type, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/vnd.cov+json");

    assert_eq!(body["type"], "Coverage");
    assert_eq!(body["domain"]["domainType"], "Grid");
    assert_eq!(
        body["domain"]["axes"]["x"]["values"],
        json!([10.0, 10.5, 11.0, 11.5])
    );
    assert_eq!(body["domain"]["axes"]["y"]["values"], json!([45.0, 45.5]));
    assert_eq!(
        body["domain"]["axes"]["t"]["values"],
        json!(["2024-02-01T00:00:00Z", "2024-02-01T06:00:00Z"])
    );

    let parameters = body["parameters"].as_object().unwrap();
    let mut names: Vec<_> = parameters.keys().cloned().collect();
    names.sort();
    assert_eq!(names, vec!["COUT_464", "COUT_ecmwf"]);

    let ecmwf = parameters["COUT_ecmwf"]["values"].as_array().unwrap();
    assert_eq!(ecmwf.len(), 16);
    assert_approx_eq!(ecmwf[0].as_f64().unwrap(), 100.0, 1e-9);
    assert!(ecmwf[3].is_null());

    let model_464 = parameters["COUT_464"]["values"].as_array().unwrap();
    assert!(model_464[0].is_null());
    assert_eq!(model_464[1], json!(500.0));
    assert_eq!(parameters["COUT_464"]["unit"], "Unknown");

    // One read per item, in search order, for the default variable
    let calls = datasets.calls();
    assert_eq!(
        calls,
        vec![
            (
                "s3://climate-data/ecmwf/202402.nc".to_string(),
                vec!["COUT".to_string()]
            ),
            (
                "s3://climate-data/464/202402.nc".to_string(),
                vec!["COUT".to_string()]
            ),
        ]
    );
}

#[tokio::test]
async fn test_cube_json_format() {
    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "&f=json");
    let (status, content_type, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(body["type"], "Coverage");
}

#[tokio::test]
async fn test_cube_z_selection() {
    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "&z=0");
    let (_, _, body) = get(app(), &uri).await;
    assert_eq!(body["domain"]["axes"]["z"]["values"], json!([0.0]));

    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "&z=850");
    let (status, _, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"]["axes"]["z"]["values"], json!([]));
    assert!(body["parameters"]["COUT_ecmwf"]["values"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_cube_without_items_is_empty_collection() {
    let datasets = Arc::new(february_datasets());
    let app = app_with(sample_store(), Arc::clone(&datasets), ServiceConfig::default());

    let uri = cube_uri(
        bbox::ALPS_QUERY,
        "2023-06-01T00:00:00Z/2023-06-30T00:00:00Z",
        "",
    );
    let (status, _, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "CoverageCollection");
    assert_eq!(body["coverages"], json!([]));
    assert!(datasets.calls().is_empty());
}

#[tokio::test]
async fn test_cube_parameter_errors() {
    let (status, _, body) = get(app(), "/collections/forecasts/cube").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "&f=netcdf");
    let (status, _, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Bad Request");
    assert!(body["detail"].as_str().unwrap().contains("'netcdf'"));

    let uri = cube_uri("10,45,12", time::FEBRUARY_2024, "");
    let (status, _, _) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cube_area_limit() {
    let uri = cube_uri("0,0,20,20", time::FEBRUARY_2024, "");
    let (status, _, body) = get(app(), &uri).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], 413);

    let mut config = ServiceConfig::default();
    config.cube.max_area_sq_degrees = None;
    let app = app_with(sample_store(), Arc::new(february_datasets()), config);
    let (status, _, _) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cube_unreadable_asset_fails_whole_request() {
    let times = six_hourly(february_start(), 2);
    let datasets = FakeDatasets::default().with(
        "s3://climate-data/ecmwf/202402.nc",
        create_model_dataset("COUT", 100.0, 10.0, 45.0, (3, 2), times),
    );
    let app = app_with(sample_store(), Arc::new(datasets), ServiceConfig::default());

    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "");
    let (status, _, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("464/202402.nc"));
}

#[tokio::test]
async fn test_cube_uses_collection_settings() {
    let yaml = r#"
collections:
  forecasts:
    variables: [TP]
"#;
    let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
    let times = six_hourly(february_start(), 1);
    let datasets = Arc::new(
        FakeDatasets::default()
            .with(
                "s3://climate-data/ecmwf/202402.nc",
                create_model_dataset("TP", 1.0, 10.0, 45.0, (2, 2), times.clone()),
            )
            .with(
                "s3://climate-data/464/202402.nc",
                create_model_dataset("TP", 2.0, 10.0, 45.0, (2, 2), times),
            ),
    );
    let app = app_with(sample_store(), Arc::clone(&datasets), config);

    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "");
    let (status, _, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["parameters"].get("TP_ecmwf").is_some());
    assert!(body["parameters"].get("TP_464").is_some());
    assert!(datasets.calls().iter().all(|(_, vars)| vars == &["TP".to_string()]));
}

#[tokio::test]
async fn test_cube_through_remote_catalog() {
    // Serve the catalog over HTTP and point a second instance's cube at it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });

    let store: Arc<dyn ItemStore> = Arc::new(MemoryItemStore::new());
    let catalog = Arc::new(HttpCatalogClient::new(&format!("http://{}", addr)));
    let state = AppState::with_components(
        store,
        catalog,
        Arc::new(february_datasets()),
        ServiceConfig::default(),
        BASE_URL,
    );
    let app = stac_api::router(Arc::new(state));

    let uri = cube_uri(bbox::ALPS_QUERY, time::FEBRUARY_2024, "");
    let (status, _, body) = get(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["parameters"].get("COUT_ecmwf").is_some());
    assert!(body["parameters"].get("COUT_464").is_some());
}

// ============================================================================
// Service endpoints
// ============================================================================

#[tokio::test]
async fn test_climate_data() {
    let (status, _, body) = get(app(), "/climate_data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"temperature": 25, "humidity": 50, "wind_speed": 10, "precipitation": 0.5})
    );
}

#[tokio::test]
async fn test_api_documents() {
    let (status, content_type, body) = get(app(), "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/vnd.oai.openapi+json;version=3.0");
    assert!(body["paths"].get("/search").is_some());

    let response = app()
        .oneshot(Request::get("/api.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_ready() {
    let (status, _, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _, body) = get(app(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let response = app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
