use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Project, Subsidy};

/// One named pass/fail check contributing to a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCondition {
    pub condition: String,
    pub satisfied: bool,
    pub details: String,
}

impl EligibilityCondition {
    pub fn new(kind: ConditionKind, satisfied: bool, details: impl Into<String>) -> Self {
        Self {
            condition: kind.label().to_string(),
            satisfied,
            details: details.into(),
        }
    }

    pub fn is(&self, kind: ConditionKind) -> bool {
        self.condition == kind.label()
    }

    pub fn is_informational(&self) -> bool {
        self.kind().is_some_and(ConditionKind::is_informational)
    }

    /// Maps the label back to its kind; custom overlays may use labels outside the
    /// built-in set.
    pub fn kind(&self) -> Option<ConditionKind> {
        ConditionKind::ALL
            .into_iter()
            .find(|kind| kind.label() == self.condition)
    }
}

/// Every check the analyzer and the program overlays know how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    ProjectType,
    Region,
    Area,
    Species,
    OwnerType,
    Deadline,
    PlantingDensity,
    Slope,
    ProtectedAreas,
    PriorityZone,
    IslandArea,
    ManagementDocument,
    MaintenanceCommitment,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 13] = [
        ConditionKind::ProjectType,
        ConditionKind::Region,
        ConditionKind::Area,
        ConditionKind::Species,
        ConditionKind::OwnerType,
        ConditionKind::Deadline,
        ConditionKind::PlantingDensity,
        ConditionKind::Slope,
        ConditionKind::ProtectedAreas,
        ConditionKind::PriorityZone,
        ConditionKind::IslandArea,
        ConditionKind::ManagementDocument,
        ConditionKind::MaintenanceCommitment,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ConditionKind::ProjectType => "Type de projet éligible",
            ConditionKind::Region => "Région éligible",
            ConditionKind::Area => "Surface éligible",
            ConditionKind::Species => "Essences éligibles",
            ConditionKind::OwnerType => "Type de propriétaire éligible",
            ConditionKind::Deadline => "Date limite respectée",
            ConditionKind::PlantingDensity => "Densité de plantation minimale",
            ConditionKind::Slope => "Pente maximale",
            ConditionKind::ProtectedAreas => "Hors zones exclues",
            ConditionKind::PriorityZone => "Zone prioritaire France Relance",
            ConditionKind::IslandArea => "Surface minimale des îlots",
            ConditionKind::ManagementDocument => "Document de gestion durable",
            ConditionKind::MaintenanceCommitment => "Engagement d'entretien",
        }
    }

    /// Informational checks are reported but never decide eligibility.
    pub const fn is_informational(self) -> bool {
        matches!(self, ConditionKind::PriorityZone)
    }
}

/// Inputs shared by every rule during one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub project: &'a Project,
    pub subsidy: &'a Subsidy,
    pub now: DateTime<Utc>,
}

/// A single base check. Returns `None` when the subsidy does not constrain the
/// criterion, which is distinct from a failed check.
pub trait ConditionRule: Send + Sync {
    fn kind(&self) -> ConditionKind;
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition>;
}

/// Base checks in evaluation order.
pub fn base_rules() -> Vec<Box<dyn ConditionRule>> {
    vec![
        Box::new(ProjectTypeRule),
        Box::new(RegionRule),
        Box::new(AreaRule),
        Box::new(SpeciesRule),
        Box::new(OwnerTypeRule),
        Box::new(DeadlineRule),
        Box::new(PlantingDensityRule),
        Box::new(SlopeRule),
        Box::new(ExcludedZoneRule),
    ]
}

const ALL_WILDCARD: &str = "all";
const NATIONAL_WILDCARD: &str = "national";
const NOT_PROVIDED: &str = "non renseigné";

fn same_text(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Case-insensitive membership where an empty list or the wildcard opens the
/// criterion to every value.
fn open_membership(allowed: &[String], wildcard: &str, value: Option<&str>) -> bool {
    if allowed.is_empty() || allowed.iter().any(|entry| same_text(entry, wildcard)) {
        return true;
    }
    value.is_some_and(|value| allowed.iter().any(|entry| same_text(entry, value)))
}

pub struct ProjectTypeRule;

impl ConditionRule for ProjectTypeRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::ProjectType
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let allowed = ctx.subsidy.eligible_projects.as_deref()?;
        let project_type = ctx.project.project_type.as_deref();
        let satisfied = open_membership(allowed, ALL_WILDCARD, project_type);

        Some(EligibilityCondition::new(
            self.kind(),
            satisfied,
            format!(
                "Type de projet : {} (types éligibles : {})",
                project_type.unwrap_or(NOT_PROVIDED),
                listing(allowed, "tous")
            ),
        ))
    }
}

pub struct RegionRule;

impl ConditionRule for RegionRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::Region
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let allowed = ctx.subsidy.regions.as_deref()?;
        let region = ctx.project.region.as_deref();
        let satisfied = open_membership(allowed, NATIONAL_WILDCARD, region);

        Some(EligibilityCondition::new(
            self.kind(),
            satisfied,
            format!(
                "Région : {} (régions éligibles : {})",
                region.unwrap_or(NOT_PROVIDED),
                listing(allowed, "national")
            ),
        ))
    }
}

pub struct AreaRule;

impl ConditionRule for AreaRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::Area
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let subsidy = ctx.subsidy;
        if subsidy.min_area_ha.is_none() && subsidy.max_area_ha.is_none() {
            return None;
        }

        let area = ctx.project.area_or_zero();
        let min = subsidy.min_area_ha.unwrap_or(0.0);
        let satisfied = area >= min && subsidy.max_area_ha.map_or(true, |max| area <= max);

        let bounds = match subsidy.max_area_ha {
            Some(max) => format!("entre {min} et {max} ha"),
            None => format!("au moins {min} ha"),
        };

        Some(EligibilityCondition::new(
            self.kind(),
            satisfied,
            format!("Surface du projet : {area} ha (requis : {bounds})"),
        ))
    }
}

pub struct SpeciesRule;

impl ConditionRule for SpeciesRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::Species
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let eligible = ctx.subsidy.eligible_species.as_deref()?;
        let species = ctx.project.species();

        let satisfied = eligible.is_empty()
            || eligible.iter().any(|code| same_text(code, ALL_WILDCARD))
            || species.iter().any(|code| eligible.contains(code));

        Some(EligibilityCondition::new(
            self.kind(),
            satisfied,
            format!(
                "Essences du projet : {} (essences éligibles : {})",
                listing(species, NOT_PROVIDED),
                listing(eligible, "toutes")
            ),
        ))
    }
}

pub struct OwnerTypeRule;

impl ConditionRule for OwnerTypeRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::OwnerType
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let allowed = ctx.subsidy.eligible_owners.as_deref()?;
        let owner = ctx.project.owner_type.as_deref();
        let satisfied = open_membership(allowed, ALL_WILDCARD, owner);

        Some(EligibilityCondition::new(
            self.kind(),
            satisfied,
            format!(
                "Propriétaire : {} (propriétaires éligibles : {})",
                owner.unwrap_or(NOT_PROVIDED),
                listing(allowed, "tous")
            ),
        ))
    }
}

pub struct DeadlineRule;

impl ConditionRule for DeadlineRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::Deadline
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let raw = ctx.subsidy.deadline.as_deref()?;
        let deadline = parse_deadline(raw)?;
        let satisfied = ctx.now <= deadline;

        Some(EligibilityCondition::new(
            self.kind(),
            satisfied,
            format!(
                "Date limite : {} (évalué le {})",
                deadline.format("%Y-%m-%d %H:%M UTC"),
                ctx.now.format("%Y-%m-%d %H:%M UTC")
            ),
        ))
    }
}

pub struct PlantingDensityRule;

impl ConditionRule for PlantingDensityRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::PlantingDensity
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let minimum = ctx.subsidy.min_planting_density?;
        let density = ctx.project.planting_density_or_zero();

        Some(EligibilityCondition::new(
            self.kind(),
            density >= minimum,
            format!("Densité : {density} plants/ha (minimum : {minimum} plants/ha)"),
        ))
    }
}

pub struct SlopeRule;

impl ConditionRule for SlopeRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::Slope
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let maximum = ctx.subsidy.max_slope?;
        let slope = ctx.project.slope_or_zero();

        Some(EligibilityCondition::new(
            self.kind(),
            slope <= maximum,
            format!("Pente : {slope} % (maximum : {maximum} %)"),
        ))
    }
}

pub struct ExcludedZoneRule;

impl ConditionRule for ExcludedZoneRule {
    fn kind(&self) -> ConditionKind {
        ConditionKind::ProtectedAreas
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<EligibilityCondition> {
        let excluded = ctx.subsidy.excluded_zones.as_deref()?;
        let overlapping: Vec<String> = ctx
            .project
            .protected_areas()
            .iter()
            .filter(|zone| excluded.contains(zone))
            .cloned()
            .collect();

        let details = if overlapping.is_empty() {
            "Aucune zone exclue concernée".to_string()
        } else {
            format!("Projet situé en zone exclue : {}", overlapping.join(", "))
        };

        Some(EligibilityCondition::new(
            self.kind(),
            overlapping.is_empty(),
            details,
        ))
    }
}

fn listing(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join(", ")
    }
}

/// Accepts RFC 3339, a naive date-time read as UTC, or a bare date read as
/// midnight UTC.
pub(crate) fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deadline_parser_accepts_common_iso_shapes() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(parse_deadline("2026-03-31"), Some(expected));
        assert_eq!(parse_deadline("2026-03-31T00:00:00"), Some(expected));
        assert_eq!(parse_deadline("2026-03-31T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_deadline(" 2026-03-31 00:00:00 "), Some(expected));
    }

    #[test]
    fn deadline_parser_rejects_free_text() {
        assert_eq!(parse_deadline("fin mars"), None);
        assert_eq!(parse_deadline(""), None);
        assert_eq!(parse_deadline("2026-13-01"), None);
    }

    #[test]
    fn open_membership_honours_wildcards_and_case() {
        let allowed = vec!["Reforestation".to_string()];
        assert!(open_membership(&allowed, ALL_WILDCARD, Some("reforestation")));
        assert!(!open_membership(&allowed, ALL_WILDCARD, Some("thinning")));
        assert!(!open_membership(&allowed, ALL_WILDCARD, None));
        assert!(open_membership(&[], ALL_WILDCARD, None));
        assert!(open_membership(
            &["ALL".to_string()],
            ALL_WILDCARD,
            Some("thinning")
        ));
    }

    #[test]
    fn labels_are_distinct_and_round_trip() {
        let labels: std::collections::HashSet<_> =
            ConditionKind::ALL.iter().map(|kind| kind.label()).collect();
        assert_eq!(labels.len(), ConditionKind::ALL.len());

        let condition = EligibilityCondition::new(ConditionKind::PriorityZone, false, "");
        assert_eq!(condition.kind(), Some(ConditionKind::PriorityZone));
        assert!(condition.is_informational());
    }
}
