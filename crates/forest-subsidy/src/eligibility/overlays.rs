use super::conditions::{ConditionKind, EligibilityCondition};
use super::domain::{Project, Subsidy};
use super::funding::BonusLineItem;
use super::EligibilityResult;

/// Program tag for the national relaunch plan.
pub const FRANCE_RELANCE: &str = "france_relance";
/// Program tag for EU rural development funding.
pub const FEADER: &str = "feader";
/// Program tag for regional programs without extra rules.
pub const REGION_STANDARD: &str = "region_standard";

const PRIORITY_ZONE_TAG: &str = "france_relance";
const PRIORITY_ZONE_BONUS_RATE: f64 = 10.0;
const MIN_MAINTENANCE_YEARS: u32 = 5;

/// Program-specific rules applied to an eligible base verdict.
///
/// Implementations return a new result; the base passed in is consumed, never
/// shared.
pub trait ProgramOverlay: Send + Sync {
    fn apply(&self, project: &Project, subsidy: &Subsidy, base: EligibilityResult)
        -> EligibilityResult;
}

/// Conditions and bonuses an overlay contributes, merged into the base verdict by
/// [`EligibilityResult::adjusted`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramAdjustment {
    pub conditions: Vec<EligibilityCondition>,
    pub eligible: bool,
    pub bonuses: Vec<BonusLineItem>,
}

impl Default for ProgramAdjustment {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramAdjustment {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            eligible: true,
            bonuses: Vec::new(),
        }
    }

    /// Adds an eliminating condition.
    pub fn require(mut self, condition: EligibilityCondition) -> Self {
        self.eligible &= condition.satisfied;
        self.conditions.push(condition);
        self
    }

    /// Adds a condition that is reported but does not affect eligibility.
    pub fn inform(mut self, condition: EligibilityCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn bonus(mut self, bonus: BonusLineItem) -> Self {
        self.bonuses.push(bonus);
        self
    }
}

/// National relaunch plan: priority-zone bonus and minimum island size.
#[derive(Debug, Default, Clone, Copy)]
pub struct FranceRelanceOverlay;

impl FranceRelanceOverlay {
    fn adjustment(
        &self,
        project: &Project,
        subsidy: &Subsidy,
        base: &EligibilityResult,
    ) -> ProgramAdjustment {
        let in_priority_zone = project
            .priority_zones()
            .iter()
            .any(|zone| zone == PRIORITY_ZONE_TAG);

        let zone_details = if in_priority_zone {
            format!(
                "Projet en zone prioritaire, bonus de {PRIORITY_ZONE_BONUS_RATE} % (critère non éliminatoire)"
            )
        } else {
            "Projet hors zone prioritaire (critère non éliminatoire)".to_string()
        };

        let mut adjustment = ProgramAdjustment::new().inform(EligibilityCondition::new(
            ConditionKind::PriorityZone,
            in_priority_zone,
            zone_details,
        ));

        if in_priority_zone {
            if let Some(funding) = &base.funding_details {
                adjustment = adjustment.bonus(BonusLineItem::percent_of(
                    ConditionKind::PriorityZone.label(),
                    PRIORITY_ZONE_BONUS_RATE,
                    funding.base_amount,
                ));
            }
        }

        if let Some(minimum) = subsidy.min_island_area_ha.filter(|minimum| *minimum > 0.0) {
            adjustment = adjustment.require(island_condition(project, minimum));
        }

        adjustment
    }
}

fn island_condition(project: &Project, minimum: f64) -> EligibilityCondition {
    let Some(islands) = project.islands.as_deref() else {
        return EligibilityCondition::new(
            ConditionKind::IslandArea,
            true,
            format!("Données sur les îlots non disponibles, minimum de {minimum} ha non vérifié"),
        );
    };

    let undersized: Vec<f64> = islands
        .iter()
        .map(|island| island.area_ha)
        .filter(|area| *area < minimum)
        .collect();

    if undersized.is_empty() {
        return EligibilityCondition::new(
            ConditionKind::IslandArea,
            true,
            format!(
                "{} îlot(s), tous d'au moins {minimum} ha",
                islands.len()
            ),
        );
    }

    let smallest = undersized.iter().copied().fold(f64::INFINITY, f64::min);
    EligibilityCondition::new(
        ConditionKind::IslandArea,
        false,
        format!(
            "{} îlot(s) sous le minimum de {minimum} ha (plus petit : {smallest} ha)",
            undersized.len()
        ),
    )
}

impl ProgramOverlay for FranceRelanceOverlay {
    fn apply(
        &self,
        project: &Project,
        subsidy: &Subsidy,
        base: EligibilityResult,
    ) -> EligibilityResult {
        let adjustment = self.adjustment(project, subsidy, &base);
        base.adjusted(adjustment)
    }
}

/// EU rural development fund: management plan and maintenance commitment.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeaderOverlay;

impl ProgramOverlay for FeaderOverlay {
    fn apply(
        &self,
        project: &Project,
        _subsidy: &Subsidy,
        base: EligibilityResult,
    ) -> EligibilityResult {
        let has_document = project.has_management_document.unwrap_or(false);
        let document = EligibilityCondition::new(
            ConditionKind::ManagementDocument,
            has_document,
            if has_document {
                "Document de gestion durable fourni"
            } else {
                "Document de gestion durable requis mais absent"
            },
        );

        let years = project.maintenance_commitment_years.unwrap_or(0);
        let commitment = EligibilityCondition::new(
            ConditionKind::MaintenanceCommitment,
            years >= MIN_MAINTENANCE_YEARS,
            format!("Engagement de {years} an(s) (minimum : {MIN_MAINTENANCE_YEARS} ans)"),
        );

        base.adjusted(ProgramAdjustment::new().require(document).require(commitment))
    }
}

/// Regional programs currently add nothing to the base checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionStandardOverlay;

impl ProgramOverlay for RegionStandardOverlay {
    fn apply(
        &self,
        _project: &Project,
        _subsidy: &Subsidy,
        base: EligibilityResult,
    ) -> EligibilityResult {
        base
    }
}
