use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::domain::{Project, Subsidy};
use super::engine::EligibilityRuleEngine;
use super::EligibilityResult;
use crate::catalog::{CatalogError, SubsidyCatalog};

/// Service composing the subsidy catalogue and the rule engine.
pub struct SubsidyEligibilityService<C> {
    catalog: Arc<C>,
    engine: Arc<EligibilityRuleEngine>,
}

impl<C> SubsidyEligibilityService<C>
where
    C: SubsidyCatalog + 'static,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self::with_engine(catalog, Arc::new(EligibilityRuleEngine::new()))
    }

    pub fn with_engine(catalog: Arc<C>, engine: Arc<EligibilityRuleEngine>) -> Self {
        Self { catalog, engine }
    }

    pub fn engine(&self) -> &EligibilityRuleEngine {
        &self.engine
    }

    /// Evaluate a project against one catalogue subsidy.
    pub fn evaluate(
        &self,
        project: &Project,
        subsidy_id: &str,
    ) -> Result<EligibilityResult, EligibilityServiceError> {
        self.evaluate_at(project, subsidy_id, Utc::now())
    }

    pub fn evaluate_at(
        &self,
        project: &Project,
        subsidy_id: &str,
        now: DateTime<Utc>,
    ) -> Result<EligibilityResult, EligibilityServiceError> {
        let subsidy = self.subsidy(subsidy_id)?;
        Ok(self.engine.evaluate_at(project, &subsidy, now))
    }

    /// Evaluate a project against every catalogue subsidy: eligible results first,
    /// then by total funding (highest first), then by subsidy id.
    pub fn matches(
        &self,
        project: &Project,
    ) -> Result<Vec<EligibilityResult>, EligibilityServiceError> {
        self.matches_at(project, Utc::now())
    }

    pub fn matches_at(
        &self,
        project: &Project,
        now: DateTime<Utc>,
    ) -> Result<Vec<EligibilityResult>, EligibilityServiceError> {
        let mut results: Vec<EligibilityResult> = self
            .catalog
            .list()?
            .iter()
            .map(|subsidy| self.engine.evaluate_at(project, subsidy, now))
            .collect();

        results.sort_by(|left, right| {
            right
                .eligible
                .cmp(&left.eligible)
                .then_with(|| {
                    right
                        .total_funding()
                        .partial_cmp(&left.total_funding())
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| left.subsidy_id.cmp(&right.subsidy_id))
        });

        Ok(results)
    }

    pub fn subsidies(&self) -> Result<Vec<Subsidy>, EligibilityServiceError> {
        Ok(self.catalog.list()?)
    }

    pub fn subsidy(&self, subsidy_id: &str) -> Result<Subsidy, EligibilityServiceError> {
        match self.catalog.fetch(subsidy_id)? {
            Some(subsidy) => Ok(subsidy),
            None => {
                warn!(subsidy_id, "unknown subsidy requested");
                Err(EligibilityServiceError::UnknownSubsidy(
                    subsidy_id.to_string(),
                ))
            }
        }
    }
}

/// Error raised by the eligibility service.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityServiceError {
    #[error("unknown subsidy `{0}`")]
    UnknownSubsidy(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
