use chrono::{DateTime, Utc};

use super::conditions::{base_rules, ConditionRule, EligibilityCondition, RuleContext};
use super::domain::{Project, Subsidy};
use super::funding::calculate_funding;
use super::EligibilityResult;

/// Stateless evaluator running the ordered base checks shared by every program.
pub struct EligibilityAnalyzer {
    rules: Vec<Box<dyn ConditionRule>>,
}

impl Default for EligibilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl EligibilityAnalyzer {
    pub fn new() -> Self {
        Self::with_rules(base_rules())
    }

    /// Replaces the base checks. Conditions are produced in the order given.
    pub fn with_rules(rules: Vec<Box<dyn ConditionRule>>) -> Self {
        Self { rules }
    }

    pub fn analyze(&self, project: &Project, subsidy: &Subsidy) -> EligibilityResult {
        self.analyze_at(project, subsidy, Utc::now())
    }

    /// Same as [`analyze`](Self::analyze) with an explicit evaluation instant, used
    /// for the deadline check and the result timestamp.
    pub fn analyze_at(
        &self,
        project: &Project,
        subsidy: &Subsidy,
        now: DateTime<Utc>,
    ) -> EligibilityResult {
        let ctx = RuleContext {
            project,
            subsidy,
            now,
        };

        let conditions: Vec<EligibilityCondition> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(&ctx))
            .collect();
        let eligible = conditions.iter().all(|condition| condition.satisfied);
        let funding = eligible.then(|| calculate_funding(project, subsidy));

        EligibilityResult::assemble(subsidy, conditions, eligible, funding, now)
    }
}
