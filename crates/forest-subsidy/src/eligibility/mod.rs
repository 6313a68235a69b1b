//! Subsidy eligibility analysis.
//!
//! [`EligibilityAnalyzer`] runs the base checks shared by every program and computes
//! funding; [`EligibilityRuleEngine`] layers program-specific overlays on top of an
//! eligible base verdict. Both are stateless and safe to share across threads.

mod analyzer;
mod conditions;
pub mod domain;
mod engine;
mod funding;
mod overlays;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use analyzer::EligibilityAnalyzer;
pub use conditions::{
    base_rules, ConditionKind, ConditionRule, EligibilityCondition, RuleContext,
};
pub use domain::{Island, Project, Subsidy};
pub use engine::EligibilityRuleEngine;
pub use funding::{
    calculate_funding, BonusLineItem, FundingBreakdown, FundingCap, FundingDetails,
};
pub use overlays::{
    FeaderOverlay, FranceRelanceOverlay, ProgramAdjustment, ProgramOverlay,
    RegionStandardOverlay, FEADER, FRANCE_RELANCE, REGION_STANDARD,
};
pub use router::eligibility_router;
pub use service::{EligibilityServiceError, SubsidyEligibilityService};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict for one project/subsidy pair.
///
/// `funding_details` is present exactly when `eligible` is true, and `next_steps`
/// only lists the program's application process for eligible projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub subsidy_id: String,
    pub subsidy_title: String,
    pub conditions: Vec<EligibilityCondition>,
    pub next_steps: Vec<String>,
    pub funding_details: Option<FundingDetails>,
    pub timestamp: DateTime<Utc>,
}

impl EligibilityResult {
    pub(crate) fn assemble(
        subsidy: &Subsidy,
        conditions: Vec<EligibilityCondition>,
        eligible: bool,
        funding_details: Option<FundingDetails>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let (next_steps, funding_details) = if eligible {
            (subsidy.application_process.clone(), funding_details)
        } else {
            (Vec::new(), None)
        };

        Self {
            eligible,
            subsidy_id: subsidy.id.clone(),
            subsidy_title: subsidy.title.clone(),
            conditions,
            next_steps,
            funding_details,
            timestamp,
        }
    }

    /// Builds the verdict that follows an overlay: base conditions first, then the
    /// overlay's own, with overlay bonuses folded into the inherited funding.
    pub fn adjusted(self, adjustment: ProgramAdjustment) -> Self {
        let eligible = self.eligible && adjustment.eligible;
        let funding_details = if eligible {
            self.funding_details.map(|funding| {
                adjustment
                    .bonuses
                    .into_iter()
                    .fold(funding, FundingDetails::with_bonus)
            })
        } else {
            None
        };
        let next_steps = if eligible { self.next_steps } else { Vec::new() };

        Self {
            eligible,
            subsidy_id: self.subsidy_id,
            subsidy_title: self.subsidy_title,
            conditions: self
                .conditions
                .into_iter()
                .chain(adjustment.conditions)
                .collect(),
            next_steps,
            funding_details,
            timestamp: self.timestamp,
        }
    }

    pub fn condition(&self, kind: ConditionKind) -> Option<&EligibilityCondition> {
        self.conditions.iter().find(|condition| condition.is(kind))
    }

    /// Unsatisfied conditions that decide eligibility, skipping informational ones.
    pub fn blocking_conditions(&self) -> impl Iterator<Item = &EligibilityCondition> {
        self.conditions
            .iter()
            .filter(|condition| !condition.satisfied && !condition.is_informational())
    }

    pub fn total_funding(&self) -> f64 {
        self.funding_details
            .as_ref()
            .map_or(0.0, |funding| funding.total_amount)
    }

    pub fn summary(&self) -> String {
        if self.eligible {
            format!(
                "éligible à « {} » ({:.2} € au total)",
                self.subsidy_title,
                self.total_funding()
            )
        } else {
            let blocking: Vec<&str> = self
                .blocking_conditions()
                .map(|condition| condition.condition.as_str())
                .collect();
            if blocking.is_empty() {
                format!("non éligible à « {} »", self.subsidy_title)
            } else {
                format!(
                    "non éligible à « {} » : {}",
                    self.subsidy_title,
                    blocking.join(", ")
                )
            }
        }
    }
}
