use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::analyzer::EligibilityAnalyzer;
use super::domain::{Project, Subsidy};
use super::overlays::{
    FeaderOverlay, FranceRelanceOverlay, ProgramOverlay, RegionStandardOverlay, FEADER,
    FRANCE_RELANCE, REGION_STANDARD,
};
use super::EligibilityResult;

/// Runs the base analyzer, then the overlay registered for the subsidy's program.
///
/// The overlay table is fixed at construction, so one engine can serve concurrent
/// evaluations.
pub struct EligibilityRuleEngine {
    analyzer: EligibilityAnalyzer,
    overlays: BTreeMap<String, Box<dyn ProgramOverlay>>,
}

impl Default for EligibilityRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EligibilityRuleEngine {
    /// Engine with the built-in France Relance, FEADER and regional overlays.
    pub fn new() -> Self {
        Self::bare(EligibilityAnalyzer::new())
            .with_overlay(FRANCE_RELANCE, FranceRelanceOverlay)
            .with_overlay(FEADER, FeaderOverlay)
            .with_overlay(REGION_STANDARD, RegionStandardOverlay)
    }

    /// Engine without any overlay; every program falls back to the base verdict.
    pub fn bare(analyzer: EligibilityAnalyzer) -> Self {
        Self {
            analyzer,
            overlays: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the overlay for a program tag.
    pub fn with_overlay(
        mut self,
        program: impl Into<String>,
        overlay: impl ProgramOverlay + 'static,
    ) -> Self {
        self.overlays.insert(program.into(), Box::new(overlay));
        self
    }

    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.overlays.keys().map(String::as_str)
    }

    pub fn analyzer(&self) -> &EligibilityAnalyzer {
        &self.analyzer
    }

    pub fn evaluate(&self, project: &Project, subsidy: &Subsidy) -> EligibilityResult {
        self.evaluate_at(project, subsidy, Utc::now())
    }

    pub fn evaluate_at(
        &self,
        project: &Project,
        subsidy: &Subsidy,
        now: DateTime<Utc>,
    ) -> EligibilityResult {
        let base = self.analyzer.analyze_at(project, subsidy, now);
        if !base.eligible {
            debug!(subsidy = %subsidy.id, "base checks failed, skipping program overlay");
            return base;
        }

        let overlay = subsidy
            .subsidy_type
            .as_deref()
            .and_then(|program| self.overlays.get(program).map(|overlay| (program, overlay)));

        let result = match overlay {
            Some((program, overlay)) => {
                debug!(subsidy = %subsidy.id, program, "applying program overlay");
                overlay.apply(project, subsidy, base)
            }
            None => base,
        };

        debug!(
            subsidy = %subsidy.id,
            eligible = result.eligible,
            conditions = result.conditions.len(),
            "eligibility evaluated"
        );
        result
    }
}
