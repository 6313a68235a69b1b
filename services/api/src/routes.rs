use crate::infra::{deserialize_optional_instant, AppState, CatalogService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use forest_subsidy::batch::{BatchEvaluation, ProjectImporter};
use forest_subsidy::eligibility::eligibility_router;
use forest_subsidy::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchRequest {
    pub(crate) subsidy_id: String,
    pub(crate) projects_csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub(crate) evaluated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchResponse {
    pub(crate) eligible_count: usize,
    pub(crate) total_funding: f64,
    #[serde(flatten)]
    pub(crate) batch: BatchEvaluation,
}

pub(crate) fn with_eligibility_routes(service: Arc<CatalogService>) -> axum::Router {
    eligibility_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/subsidies/batch",
            axum::routing::post(batch_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn batch_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let BatchRequest {
        subsidy_id,
        projects_csv,
        evaluated_at,
    } = payload;

    let subsidy = state.service.subsidy(&subsidy_id)?;
    let projects = ProjectImporter::from_reader(Cursor::new(projects_csv.into_bytes()))?;
    let now = evaluated_at.unwrap_or_else(Utc::now);
    let batch = BatchEvaluation::run(state.service.engine(), &projects, &subsidy, now);

    Ok(Json(BatchResponse {
        eligible_count: batch.eligible_count(),
        total_funding: batch.total_funding(),
        batch,
    }))
}
