use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Project, Subsidy};
use super::service::{EligibilityServiceError, SubsidyEligibilityService};
use crate::catalog::SubsidyCatalog;

/// Body for a single-subsidy eligibility check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub project: Project,
    pub subsidy_id: String,
}

/// Body for matching a project against the whole catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub project: Project,
}

/// Catalogue entry as listed by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidySummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsidy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl From<&Subsidy> for SubsidySummary {
    fn from(subsidy: &Subsidy) -> Self {
        Self {
            id: subsidy.id.clone(),
            title: subsidy.title.clone(),
            organization: subsidy.organization.clone(),
            subsidy_type: subsidy.subsidy_type.clone(),
            deadline: subsidy.deadline.clone(),
        }
    }
}

/// Router builder exposing the catalogue and eligibility endpoints.
pub fn eligibility_router<C>(service: Arc<SubsidyEligibilityService<C>>) -> Router
where
    C: SubsidyCatalog + 'static,
{
    Router::new()
        .route("/api/v1/subsidies", get(list_handler::<C>))
        .route("/api/v1/subsidies/:subsidy_id", get(subsidy_handler::<C>))
        .route(
            "/api/v1/subsidies/eligibility",
            post(eligibility_handler::<C>),
        )
        .route("/api/v1/subsidies/matches", post(matches_handler::<C>))
        .with_state(service)
}

pub(crate) async fn eligibility_handler<C>(
    State(service): State<Arc<SubsidyEligibilityService<C>>>,
    Json(request): Json<EligibilityRequest>,
) -> Response
where
    C: SubsidyCatalog + 'static,
{
    match service.evaluate(&request.project, &request.subsidy_id) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matches_handler<C>(
    State(service): State<Arc<SubsidyEligibilityService<C>>>,
    Json(request): Json<MatchRequest>,
) -> Response
where
    C: SubsidyCatalog + 'static,
{
    match service.matches(&request.project) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<C>(
    State(service): State<Arc<SubsidyEligibilityService<C>>>,
) -> Response
where
    C: SubsidyCatalog + 'static,
{
    match service.subsidies() {
        Ok(subsidies) => {
            let summaries: Vec<SubsidySummary> =
                subsidies.iter().map(SubsidySummary::from).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn subsidy_handler<C>(
    State(service): State<Arc<SubsidyEligibilityService<C>>>,
    Path(subsidy_id): Path<String>,
) -> Response
where
    C: SubsidyCatalog + 'static,
{
    match service.subsidy(&subsidy_id) {
        Ok(subsidy) => (StatusCode::OK, Json(subsidy)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EligibilityServiceError) -> Response {
    let status = match error {
        EligibilityServiceError::UnknownSubsidy(_) => StatusCode::NOT_FOUND,
        EligibilityServiceError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
