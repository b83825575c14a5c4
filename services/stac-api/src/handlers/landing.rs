//! Landing page handler.

use axum::{extract::Extension, http::HeaderMap, response::Response};
use edr_protocol::{media_types, ConformanceClasses};
use metrics::counter;
use stac_protocol::LandingPage;
use std::sync::Arc;
use tracing::warn;

use super::{climate_error_response, json_response};
use crate::content_negotiation::check_metadata_accept;
use crate::state::AppState;

/// Conformance classes declared by the service.
pub(crate) fn service_conformance() -> ConformanceClasses {
    ConformanceClasses {
        conforms_to: stac_protocol::conformance::ALL
            .iter()
            .map(|c| c.to_string())
            .collect(),
    }
    .with_classes(ConformanceClasses::current().conforms_to.iter().map(String::as_str))
}

/// GET / - STAC landing page
pub async fn landing_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    counter!("stac_requests_total", "endpoint" => "landing").increment(1);

    if let Err(response) = check_metadata_accept(&headers) {
        return response;
    }

    let collections = match state.store.all_collections().await {
        Ok(collections) => collections,
        Err(e) => {
            warn!(error = %e, "Failed to list collections for landing page");
            return climate_error_response(&e);
        }
    };

    let service = &state.config.service;
    let landing = LandingPage::new(
        &service.id,
        &service.title,
        &service.description,
        &state.base_url,
        service_conformance().conforms_to,
    )
    .with_children(&state.base_url, &collections);

    json_response(&landing, media_types::JSON, "max-age=300")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conformance_covers_stac_and_edr() {
        let conformance = service_conformance();
        assert!(conformance.contains(stac_protocol::conformance::CORE));
        assert!(conformance.contains(stac_protocol::conformance::QUERY));
        assert!(conformance.contains(edr_protocol::conformance::CUBE));
        assert!(conformance.contains(edr_protocol::conformance::COVJSON));

        let mut unique = conformance.conforms_to.clone();
        unique.dedup();
        assert_eq!(unique.len(), conformance.conforms_to.len());
    }
}
