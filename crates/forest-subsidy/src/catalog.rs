use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::eligibility::domain::Subsidy;
use crate::eligibility::{FEADER, FRANCE_RELANCE, REGION_STANDARD};

/// Path segments under `/api/v1/subsidies` taken by fixed routes.
pub const RESERVED_IDS: [&str; 3] = ["eligibility", "matches", "batch"];

/// Source of subsidy program definitions.
pub trait SubsidyCatalog: Send + Sync {
    fn fetch(&self, id: &str) -> Result<Option<Subsidy>, CatalogError>;
    fn list(&self) -> Result<Vec<Subsidy>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read subsidy catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid subsidy catalogue JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("subsidy at position {0} has no id")]
    MissingId(usize),
    #[error("duplicate subsidy id `{0}` in catalogue")]
    DuplicateId(String),
    #[error("subsidy id `{0}` collides with an API route")]
    ReservedId(String),
    /// Raised by catalogue backends other than the in-memory one (remote registries,
    /// databases) when the source cannot be reached.
    #[error("subsidy catalogue unavailable: {0}")]
    Unavailable(String),
}

/// Catalogue held in memory, keyed and listed by subsidy id.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubsidyCatalog {
    subsidies: BTreeMap<String, Subsidy>,
}

impl InMemorySubsidyCatalog {
    pub fn new(subsidies: Vec<Subsidy>) -> Result<Self, CatalogError> {
        let mut indexed = BTreeMap::new();
        for (position, subsidy) in subsidies.into_iter().enumerate() {
            if subsidy.id.trim().is_empty() {
                return Err(CatalogError::MissingId(position));
            }
            if RESERVED_IDS.contains(&subsidy.id.as_str()) {
                return Err(CatalogError::ReservedId(subsidy.id));
            }
            if indexed.contains_key(&subsidy.id) {
                return Err(CatalogError::DuplicateId(subsidy.id));
            }
            indexed.insert(subsidy.id.clone(), subsidy);
        }
        Ok(Self {
            subsidies: indexed,
        })
    }

    /// Reads a JSON array of subsidy records.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let subsidies: Vec<Subsidy> = serde_json::from_reader(reader)?;
        Self::new(subsidies)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Built-in programs, one per overlay type.
    pub fn standard() -> Self {
        let subsidies = standard_subsidies()
            .into_iter()
            .map(|subsidy| (subsidy.id.clone(), subsidy))
            .collect();
        Self { subsidies }
    }

    pub fn len(&self) -> usize {
        self.subsidies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subsidies.is_empty()
    }
}

impl SubsidyCatalog for InMemorySubsidyCatalog {
    fn fetch(&self, id: &str) -> Result<Option<Subsidy>, CatalogError> {
        Ok(self.subsidies.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Subsidy>, CatalogError> {
        Ok(self.subsidies.values().cloned().collect())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn standard_subsidies() -> Vec<Subsidy> {
    vec![
        Subsidy {
            id: "paca-reboisement".to_string(),
            title: "Aide régionale au reboisement PACA".to_string(),
            description: Some(
                "Soutien aux plantations de reboisement après incendie ou dépérissement"
                    .to_string(),
            ),
            organization: Some("Région Provence-Alpes-Côte d'Azur".to_string()),
            eligible_projects: Some(strings(&["reforestation"])),
            regions: Some(strings(&["Provence-Alpes-Côte d'Azur"])),
            min_area_ha: Some(1.0),
            max_area_ha: Some(50.0),
            amount_per_ha: Some(2000.0),
            funding_rate: Some(40.0),
            subsidy_type: Some(REGION_STANDARD.to_string()),
            application_process: strings(&[
                "Déposer le dossier sur le portail régional",
                "Joindre le plan de situation et le devis du reboiseur",
                "Attendre l'accusé de réception avant tout démarrage des travaux",
            ]),
            ..Subsidy::default()
        },
        Subsidy {
            id: "france-relance-renouvellement".to_string(),
            title: "France Relance - Renouvellement forestier".to_string(),
            description: Some(
                "Aide au renouvellement des peuplements sinistrés, pauvres ou vulnérables"
                    .to_string(),
            ),
            organization: Some("Ministère de l'Agriculture".to_string()),
            eligible_projects: Some(strings(&["reforestation", "forest_improvement"])),
            regions: Some(strings(&["national"])),
            min_area_ha: Some(1.0),
            eligible_owners: Some(strings(&["all"])),
            min_planting_density: Some(800.0),
            amount_per_ha: Some(3000.0),
            funding_rate: Some(60.0),
            max_funding: Some(200_000.0),
            bonus: true,
            bonus_certifications: BTreeMap::from([
                ("PEFC".to_string(), 5.0),
                ("FSC".to_string(), 5.0),
            ]),
            subsidy_type: Some(FRANCE_RELANCE.to_string()),
            min_island_area_ha: Some(0.5),
            application_process: strings(&[
                "Faire réaliser le diagnostic par un expert forestier agréé",
                "Déposer la demande auprès de la DDT",
            ]),
            ..Subsidy::default()
        },
        Subsidy {
            id: "feader-boisement".to_string(),
            title: "FEADER - Boisement et amélioration des peuplements".to_string(),
            description: Some("Mesure forestière du programme de développement rural".to_string()),
            organization: Some("Union européenne / Région".to_string()),
            eligible_projects: Some(strings(&["reforestation", "afforestation"])),
            min_area_ha: Some(4.0),
            eligible_owners: Some(strings(&["private", "public"])),
            min_planting_density: Some(800.0),
            max_slope: Some(30.0),
            excluded_zones: Some(strings(&["natura2000_core", "reserve_integrale"])),
            amount_per_ha: Some(1500.0),
            funding_rate: Some(80.0),
            max_funding: Some(50_000.0),
            subsidy_type: Some(FEADER.to_string()),
            application_process: strings(&[
                "Vérifier l'agrément du document de gestion durable",
                "Signer l'engagement d'entretien",
                "Déposer la demande auprès du guichet unique régional",
            ]),
            ..Subsidy::default()
        },
    ]
}
