use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::eligibility::router::{subsidy_handler, SubsidySummary};
use crate::eligibility::{eligibility_router, SubsidyEligibilityService};

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn eligibility_endpoint_returns_verdict() {
    let app = eligibility_router(Arc::new(build_service()));
    let payload = json!({
        "project": {
            "type": "reforestation",
            "area_ha": 5.2,
            "region": "Provence-Alpes-Côte d'Azur",
            "owner_type": "private",
            "species": ["pinus_pinea"],
            "planting_density": 1200
        },
        "subsidy_id": "paca-reboisement"
    });

    let response = app
        .oneshot(post_json("/api/v1/subsidies/eligibility", payload))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["eligible"], json!(true));
    assert_eq!(body["subsidy_id"], json!("paca-reboisement"));
    assert_eq!(body["funding_details"]["breakdown"]["max_funding"], json!("uncapped"));
    let total = body["funding_details"]["total_amount"]
        .as_f64()
        .expect("numeric total");
    assert_close(total, 4160.0);
    assert_eq!(body["conditions"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn eligibility_endpoint_rejects_unknown_subsidy() {
    let app = eligibility_router(Arc::new(build_service()));
    let payload = json!({ "project": {}, "subsidy_id": "inexistante" });

    let response = app
        .oneshot(post_json("/api/v1/subsidies/eligibility", payload))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("inexistante")));
}

#[tokio::test]
async fn matches_endpoint_ranks_catalogue() {
    let app = eligibility_router(Arc::new(build_service()));
    let payload = json!({ "project": serde_json::to_value(reforestation_project()).expect("project json") });

    let response = app
        .oneshot(post_json("/api/v1/subsidies/matches", payload))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<_> = body
        .as_array()
        .expect("array of results")
        .iter()
        .filter_map(|result| result["subsidy_id"].as_str())
        .collect();
    assert_eq!(ids, ["relance", "paca-reboisement", "feader"]);
}

#[tokio::test]
async fn list_endpoint_summarises_catalogue() {
    let app = eligibility_router(Arc::new(build_service()));

    let response = app
        .oneshot(get("/api/v1/subsidies"))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let summaries: Vec<SubsidySummary> =
        serde_json::from_value(body).expect("summary payload");
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0].id, "feader");
    assert_eq!(summaries[0].subsidy_type.as_deref(), Some("feader"));
}

#[tokio::test]
async fn subsidy_endpoint_returns_full_record_or_not_found() {
    let app = eligibility_router(Arc::new(build_service()));

    let response = app
        .clone()
        .oneshot(get("/api/v1/subsidies/relance"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["min_island_area_ha"], json!(1.0));

    let response = app
        .oneshot(get("/api/v1/subsidies/inconnue"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalogue_outage_returns_internal_error() {
    let service = Arc::new(SubsidyEligibilityService::new(Arc::new(UnavailableCatalog)));

    let response = subsidy_handler(State(service), Path("relance".to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"].is_string());
}
