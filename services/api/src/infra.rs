use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use forest_subsidy::catalog::InMemorySubsidyCatalog;
use forest_subsidy::eligibility::SubsidyEligibilityService;
use forest_subsidy::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type CatalogService = SubsidyEligibilityService<InMemorySubsidyCatalog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) service: Arc<CatalogService>,
}

/// Loads the catalogue from a JSON file, or the built-in programs when no path is given.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<InMemorySubsidyCatalog, AppError> {
    let catalog = match path {
        Some(path) => {
            let catalog = InMemorySubsidyCatalog::from_path(path)?;
            info!(path = %path.display(), subsidies = catalog.len(), "subsidy catalogue loaded");
            catalog
        }
        None => {
            let catalog = InMemorySubsidyCatalog::standard();
            info!(subsidies = catalog.len(), "using built-in subsidy catalogue");
            catalog
        }
    };
    Ok(catalog)
}

pub(crate) fn catalog_service(path: Option<&Path>) -> Result<Arc<CatalogService>, AppError> {
    let catalog = load_catalog(path)?;
    Ok(Arc::new(SubsidyEligibilityService::new(Arc::new(catalog))))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 instant or YYYY-MM-DD"))
}

pub(crate) fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_instant(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instants_accept_dates_and_timestamps() {
        let midnight = parse_instant("2026-06-30").expect("date parses");
        assert_eq!(midnight.to_rfc3339(), "2026-06-30T00:00:00+00:00");

        let offset = parse_instant("2026-06-30T12:00:00+02:00").expect("timestamp parses");
        assert_eq!(offset.to_rfc3339(), "2026-06-30T10:00:00+00:00");

        assert!(parse_instant("30/06/2026").is_err());
    }

    #[test]
    fn missing_catalogue_file_is_an_error() {
        let result = load_catalog(Some(Path::new("/nonexistent/subsidies.json")));
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }

    #[test]
    fn default_catalogue_is_the_built_in_one() {
        let catalog = load_catalog(None).expect("built-in catalogue");
        assert_eq!(catalog.len(), 3);
    }
}
