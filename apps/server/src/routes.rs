//! HTTP surface: `/search`, `/geocode`, `/health`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query as UrlQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use subjekt_core::Dispatcher;
use subjekt_shared::{Query, SearchResponse, SubjektError};

use crate::geocode::{GeocodeClient, parse_coordinates};

/// Shared, immutable request-handling state.
#[derive(Clone)]
pub(crate) struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub geocoder: Arc<GeocodeClient>,
}

/// Build the application router.
pub(crate) fn router(state: AppState, cors_allow_any: bool) -> Router {
    let router = Router::new()
        .route("/search", post(search_handler))
        .route("/geocode", get(geocode_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    let router = if cors_allow_any {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE]),
        )
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

// ---------------------------------------------------------------------------
// /search
// ---------------------------------------------------------------------------

/// An empty body is an empty query.
fn parse_query(body: &[u8]) -> Result<Query, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Query::default());
    }
    serde_json::from_slice(body)
}

async fn search_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<SearchResponse>) {
    let query = match parse_query(&body) {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "rejected search body");
            return (
                StatusCode::BAD_REQUEST,
                Json(SearchResponse::advisory(format!("Invalid search request: {e}"))),
            );
        }
    };

    // A panic inside the pipeline surfaces as a JoinError, not a dropped
    // connection.
    let dispatcher = Arc::clone(&state.dispatcher);
    match tokio::spawn(async move { dispatcher.search(&query).await }).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            error!(error = %e, "search task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse::advisory("Search failed")),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// /geocode
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeocodeParams {
    lat: Option<String>,
    lon: Option<String>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn geocode_handler(
    State(state): State<AppState>,
    UrlQuery(params): UrlQuery<GeocodeParams>,
) -> Response {
    let (lat, lon) = match parse_coordinates(params.lat.as_deref(), params.lon.as_deref()) {
        Ok(coords) => coords,
        Err(SubjektError::InvalidRequest { message }) => {
            return error_body(StatusCode::BAD_REQUEST, &message);
        }
        Err(e) => return error_body(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match state.geocoder.reverse(lat, lon).await {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(SubjektError::UpstreamStatus { status, .. }) => {
            warn!(status, "geocoding upstream rejected request");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            error_body(status, "Geocoding upstream returned an error")
        }
        Err(e) => {
            error!(error = %e, "geocoding failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Geocoding failed")
        }
    }
}

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
