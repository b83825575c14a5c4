//! OGC API - Environmental Data Retrieval types for the cube endpoint.
//!
//! Provides the CoverageJSON document model returned by cube queries, cube
//! query parameter parsing, OGC exception bodies and conformance URIs.
//!
//! # Example
//!
//! ```rust
//! use edr_protocol::coverage_json::{CoverageDocument, Domain};
//!
//! let domain = Domain::grid(
//!     vec![10.0, 11.0],
//!     vec![45.0],
//!     vec![0.0],
//!     vec!["2024-02-01T00:00:00Z".to_string()],
//! );
//! let coverage = CoverageDocument::new(domain);
//! assert!(coverage.parameters.is_empty());
//! ```

pub mod types;
pub mod coverage_json;
pub mod queries;
pub mod responses;
pub mod errors;

// Re-export commonly used types
pub use types::Link;
pub use coverage_json::{
    Axis, AxisValue, CoverageCollection, CoverageDocument, CoverageParameter, Domain, DomainType,
    NdArray, ReferenceSystem,
};
pub use queries::{BboxQuery, CoordinateParseError, CubeQuery, DateTimeQuery, VerticalQuery};
pub use responses::{ConformanceClasses, ExceptionResponse};
pub use errors::EdrError;

/// EDR API conformance class URIs
pub mod conformance {
    /// Core conformance class
    pub const CORE: &str = "http://www.opengis.net/spec/ogcapi-edr-1/1.1/conf/core";
    /// Collections conformance class
    pub const COLLECTIONS: &str = "http://www.opengis.net/spec/ogcapi-edr-1/1.1/conf/collections";
    /// Cube query conformance class
    pub const CUBE: &str = "http://www.opengis.net/spec/ogcapi-edr-1/1.1/conf/cube";
    /// CoverageJSON conformance class
    pub const COVJSON: &str = "http://www.opengis.net/spec/ogcapi-edr-1/1.1/conf/covjson";
}

/// Media types used in responses
pub mod media_types {
    /// CoverageJSON media type
    pub const COVERAGE_JSON: &str = "application/vnd.cov+json";
    /// GeoJSON media type
    pub const GEO_JSON: &str = "application/geo+json";
    /// JSON media type
    pub const JSON: &str = "application/json";
    /// OpenAPI JSON media type
    pub const OPENAPI_JSON: &str = "application/vnd.oai.openapi+json;version=3.0";
    /// HTML media type
    pub const HTML: &str = "text/html";
}
