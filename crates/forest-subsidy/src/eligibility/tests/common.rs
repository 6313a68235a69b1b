use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::catalog::{CatalogError, InMemorySubsidyCatalog, SubsidyCatalog};
use crate::eligibility::domain::{Project, Subsidy};
use crate::eligibility::{SubsidyEligibilityService, FEADER, FRANCE_RELANCE, REGION_STANDARD};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn reforestation_project() -> Project {
    Project {
        name: Some("Parcelle des Maures".to_string()),
        project_type: Some("reforestation".to_string()),
        area_ha: Some(5.2),
        region: Some("Provence-Alpes-Côte d'Azur".to_string()),
        owner_type: Some("private".to_string()),
        species: Some(strings(&["pinus_pinea"])),
        planting_density: Some(1200.0),
        ..Project::default()
    }
}

pub(super) fn regional_subsidy() -> Subsidy {
    Subsidy {
        id: "paca-reboisement".to_string(),
        title: "Aide régionale au reboisement".to_string(),
        eligible_projects: Some(strings(&["reforestation"])),
        regions: Some(strings(&["Provence-Alpes-Côte d'Azur"])),
        min_area_ha: Some(1.0),
        max_area_ha: Some(50.0),
        amount_per_ha: Some(2000.0),
        funding_rate: Some(40.0),
        subsidy_type: Some(REGION_STANDARD.to_string()),
        application_process: strings(&["Déposer le dossier", "Attendre l'instruction"]),
        ..Subsidy::default()
    }
}

pub(super) fn relance_subsidy() -> Subsidy {
    Subsidy {
        id: "relance".to_string(),
        title: "France Relance - Renouvellement".to_string(),
        eligible_projects: Some(strings(&["reforestation"])),
        regions: Some(strings(&["national"])),
        min_area_ha: Some(1.0),
        amount_per_ha: Some(3000.0),
        funding_rate: Some(50.0),
        subsidy_type: Some(FRANCE_RELANCE.to_string()),
        min_island_area_ha: Some(1.0),
        ..Subsidy::default()
    }
}

pub(super) fn feader_subsidy() -> Subsidy {
    Subsidy {
        id: "feader".to_string(),
        title: "FEADER - Boisement".to_string(),
        eligible_projects: Some(strings(&["reforestation"])),
        min_area_ha: Some(4.0),
        amount_per_ha: Some(1500.0),
        funding_rate: Some(80.0),
        subsidy_type: Some(FEADER.to_string()),
        application_process: strings(&["Signer l'engagement"]),
        ..Subsidy::default()
    }
}

pub(super) fn feader_project() -> Project {
    Project {
        has_management_document: Some(true),
        maintenance_commitment_years: Some(10),
        ..reforestation_project()
    }
}

pub(super) fn build_service() -> SubsidyEligibilityService<InMemorySubsidyCatalog> {
    let catalog = InMemorySubsidyCatalog::new(vec![
        regional_subsidy(),
        relance_subsidy(),
        feader_subsidy(),
    ])
    .expect("fixture catalogue is valid");
    SubsidyEligibilityService::new(Arc::new(catalog))
}

pub(super) struct UnavailableCatalog;

impl SubsidyCatalog for UnavailableCatalog {
    fn fetch(&self, _id: &str) -> Result<Option<Subsidy>, CatalogError> {
        Err(CatalogError::Unavailable("catalogue offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Subsidy>, CatalogError> {
        Err(CatalogError::Unavailable("catalogue offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
