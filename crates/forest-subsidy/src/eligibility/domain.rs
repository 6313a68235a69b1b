use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Candidate forestry operation submitted for subsidy evaluation.
///
/// Every field is optional: a field the caller leaves out disables the checks that
/// depend on it instead of failing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_ha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planting_density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_zones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub islands: Option<Vec<Island>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_management_document: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_commitment_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
}

impl Project {
    pub fn area_or_zero(&self) -> f64 {
        self.area_ha.unwrap_or(0.0)
    }

    pub fn planting_density_or_zero(&self) -> f64 {
        self.planting_density.unwrap_or(0.0)
    }

    pub fn slope_or_zero(&self) -> f64 {
        self.slope.unwrap_or(0.0)
    }

    pub fn species(&self) -> &[String] {
        self.species.as_deref().unwrap_or_default()
    }

    pub fn protected_areas(&self) -> &[String] {
        self.protected_areas.as_deref().unwrap_or_default()
    }

    pub fn priority_zones(&self) -> &[String] {
        self.priority_zones.as_deref().unwrap_or_default()
    }

    pub fn certifications(&self) -> &[String] {
        self.certifications.as_deref().unwrap_or_default()
    }

    /// Label used in summaries when the caller did not name the project.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("projet sans nom")
    }
}

/// Contiguous planted parcel ("îlot") inside a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Island {
    #[serde(default)]
    pub area_ha: f64,
}

/// Funding program definition: eligibility bounds plus payout rules.
///
/// Each bound is independent; leaving one out skips the matching check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subsidy {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_projects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_area_ha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_area_ha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_species: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligible_owners: Option<Vec<String>>,
    /// ISO-8601 timestamp or date. Values that do not parse disable the deadline check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_planting_density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_zones: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_per_ha: Option<f64>,
    /// Percentage applied to the per-hectare amount; ignored unless positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_funding: Option<f64>,
    pub bonus: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub bonus_certifications: BTreeMap<String, f64>,

    /// Program tag selecting the rule overlay (`france_relance`, `feader`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsidy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_island_area_ha: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub application_process: Vec<String>,
}

impl Subsidy {
    pub fn amount_per_ha_or_zero(&self) -> f64 {
        self.amount_per_ha.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_reads_type_key_and_keeps_absent_fields_empty() {
        let project: Project = serde_json::from_value(json!({
            "type": "reforestation",
            "area_ha": 5.2,
            "islands": [{ "area_ha": 0.5 }]
        }))
        .expect("project deserializes");

        assert_eq!(project.project_type.as_deref(), Some("reforestation"));
        assert_eq!(project.islands, Some(vec![Island { area_ha: 0.5 }]));
        assert!(project.region.is_none());
        assert!(project.species().is_empty());
        assert_eq!(project.slope_or_zero(), 0.0);

        let value = serde_json::to_value(&project).expect("project serializes");
        assert_eq!(value["type"], "reforestation");
        assert!(value.get("region").is_none());
    }

    #[test]
    fn subsidy_distinguishes_absent_bounds_from_zero() {
        let subsidy: Subsidy = serde_json::from_value(json!({
            "id": "s-1",
            "title": "Aide",
            "min_area_ha": 0.0,
            "bonus_certifications": { "PEFC": 5.0 }
        }))
        .expect("subsidy deserializes");

        assert_eq!(subsidy.min_area_ha, Some(0.0));
        assert!(subsidy.max_area_ha.is_none());
        assert!(!subsidy.bonus);
        assert_eq!(subsidy.bonus_certifications.get("PEFC"), Some(&5.0));
        assert!(subsidy.application_process.is_empty());
    }
}
