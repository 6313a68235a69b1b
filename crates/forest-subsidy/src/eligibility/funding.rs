use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::domain::{Project, Subsidy};

/// Funding computed for an eligible project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingDetails {
    pub base_amount: f64,
    pub bonus_amount: f64,
    pub total_amount: f64,
    pub breakdown: FundingBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingBreakdown {
    pub area_ha: f64,
    pub amount_per_ha: f64,
    pub funding_rate: Option<f64>,
    pub max_funding: FundingCap,
    pub bonuses: Vec<BonusLineItem>,
}

/// One bonus applied on top of the base amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusLineItem {
    #[serde(rename = "type")]
    pub bonus_type: String,
    pub rate: f64,
    pub amount: f64,
}

impl BonusLineItem {
    /// Bonus worth `rate` percent of `base_amount`.
    pub fn percent_of(bonus_type: impl Into<String>, rate: f64, base_amount: f64) -> Self {
        Self {
            bonus_type: bonus_type.into(),
            rate,
            amount: base_amount * (rate / 100.0),
        }
    }
}

/// Ceiling applied to the base amount. Serialized as a number or `"uncapped"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FundingCap {
    Capped(f64),
    Uncapped,
}

const UNCAPPED: &str = "uncapped";

impl Serialize for FundingCap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FundingCap::Capped(amount) => serializer.serialize_f64(*amount),
            FundingCap::Uncapped => serializer.serialize_str(UNCAPPED),
        }
    }
}

impl<'de> Deserialize<'de> for FundingCap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Amount(f64),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Amount(amount) => Ok(FundingCap::Capped(amount)),
            Raw::Label(label) if label == UNCAPPED => Ok(FundingCap::Uncapped),
            Raw::Label(other) => Err(serde::de::Error::custom(format!(
                "expected a funding cap amount or \"{UNCAPPED}\", found \"{other}\""
            ))),
        }
    }
}

impl FundingDetails {
    /// Returns a copy carrying one more bonus line item.
    pub fn with_bonus(mut self, bonus: BonusLineItem) -> Self {
        self.bonus_amount += bonus.amount;
        self.total_amount = self.base_amount + self.bonus_amount;
        self.breakdown.bonuses.push(bonus);
        self
    }

    pub fn has_bonuses(&self) -> bool {
        !self.breakdown.bonuses.is_empty()
    }
}

/// Base amount from area, rate and cap, then certification bonuses computed on the
/// capped base. Bonuses themselves are not capped.
pub fn calculate_funding(project: &Project, subsidy: &Subsidy) -> FundingDetails {
    let area_ha = project.area_or_zero();
    let amount_per_ha = subsidy.amount_per_ha_or_zero();

    let mut base_amount = area_ha * amount_per_ha;
    if let Some(rate) = subsidy.funding_rate.filter(|rate| *rate > 0.0) {
        base_amount *= rate / 100.0;
    }

    let max_funding = match subsidy.max_funding {
        Some(cap) => {
            if base_amount > cap {
                base_amount = cap;
            }
            FundingCap::Capped(cap)
        }
        None => FundingCap::Uncapped,
    };

    let details = FundingDetails {
        base_amount,
        bonus_amount: 0.0,
        total_amount: base_amount,
        breakdown: FundingBreakdown {
            area_ha,
            amount_per_ha,
            funding_rate: subsidy.funding_rate,
            max_funding,
            bonuses: Vec::new(),
        },
    };

    if !subsidy.bonus {
        return details;
    }

    project
        .certifications()
        .iter()
        .filter_map(|code| {
            let rate = subsidy.bonus_certifications.get(code)?;
            Some(BonusLineItem::percent_of(
                format!("Certification {code}"),
                *rate,
                base_amount,
            ))
        })
        .fold(details, FundingDetails::with_bonus)
}
