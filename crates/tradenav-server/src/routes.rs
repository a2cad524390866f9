//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use tradenav_classifiers::{ChapterRange, CodeValidation, MappingEntry};
use tradenav_core::{ClassificationRequest, ClassificationResult};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    let api_routes = Router::new()
        .route("/hs-codes/suggest", post(suggest_hs_code))
        .route("/hs-codes/validate", post(validate_hs_code))
        .route("/categories", get(list_categories));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(fallback)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Suggest an HS code for a product description
///
/// Always answers with a classification for a well-formed body; remote
/// outages show up as a lower-tier `source` and confidence, not as errors.
async fn suggest_hs_code(
    State(state): State<AppState>,
    payload: Result<Json<ClassificationRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>, AppError> {
    let Json(req) = payload?;
    metrics::counter!("tradenav_requests_total", "endpoint" => "suggest").increment(1);
    debug!(category = %req.category, "Received HS code suggestion request");

    let result = state.classifier.classify_request(&req).await;
    info!(
        "Suggested {} ({}, confidence {:.2}) for category '{}'",
        result.hs_code, result.source, result.confidence, req.category
    );

    Ok(Json(result))
}

/// Body of a validation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest {
    hs_code: String,
    #[serde(default)]
    category: String,
}

/// Check a user-entered code against a category's expected chapters
async fn validate_hs_code(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<CodeValidation>, AppError> {
    let Json(req) = payload?;
    metrics::counter!("tradenav_requests_total", "endpoint" => "validate").increment(1);

    if req.hs_code.trim().is_empty() {
        return Err(AppError::InvalidRequest("hsCode must not be empty".to_string()));
    }

    Ok(Json(state.classifier.validate_code(&req.hs_code, &req.category)))
}

/// A recognized category with its reference data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryInfo<'a> {
    key: &'a str,
    expected_chapters: &'a [ChapterRange],
    suggestions: &'a [MappingEntry],
}

async fn list_categories(State(state): State<AppState>) -> Response {
    let categories: Vec<CategoryInfo<'_>> = state
        .classifier
        .tables()
        .categories()
        .map(|(key, spec)| CategoryInfo {
            key,
            expected_chapters: &spec.chapters,
            suggestions: &spec.mappings,
        })
        .collect();

    Json(json!({ "categories": categories })).into_response()
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    Rejected(StatusCode, String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Rejected(status, msg) => (status, msg),
        };

        debug!("Rejected request ({}): {}", status, message);

        let body = json!({
            "error": {
                "message": message,
                "type": "invalid_request_error",
            }
        });

        (status, Json(body)).into_response()
    }
}
