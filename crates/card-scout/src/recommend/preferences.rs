use chrono::{Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{issuer_key, normalize_key, CardType};

/// Wire label plus case-insensitive `FromStr` for the wizard's answer enums.
macro_rules! wire_labels {
    ($ty:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let key = raw.trim();
                $(
                    if key.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unrecognized {} '{}'", stringify!($ty), raw))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    Travel,
    Cashback,
    Bonus,
    Everyday,
}

wire_labels!(Goal {
    Travel => "Travel",
    Cashback => "Cashback",
    Bonus => "Bonus",
    Everyday => "Everyday",
});

/// Ordered from least to most tolerant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeeTolerance {
    #[serde(rename = "None")]
    NoFee,
    Low,
    Medium,
    High,
}

wire_labels!(FeeTolerance {
    NoFee => "None",
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpendComfort {
    #[serde(rename = "None")]
    NoBonus,
    Low,
    Medium,
    High,
}

wire_labels!(SpendComfort {
    NoBonus => "None",
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelFrequency {
    Low,
    Medium,
    High,
}

wire_labels!(TravelFrequency {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelRewardsType {
    /// Flexible bank points ("Bank Rewards" in the wizard).
    General,
    Airline,
    Hotel,
    #[serde(rename = "No Preference", alias = "No preference")]
    NoPreference,
}

wire_labels!(TravelRewardsType {
    General => "General",
    Airline => "Airline",
    Hotel => "Hotel",
    NoPreference => "No Preference",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelTier {
    Premium,
    #[serde(rename = "Mid-tier")]
    MidTier,
    #[serde(rename = "No preference", alias = "No Preference")]
    NoPreference,
}

wire_labels!(TravelTier {
    Premium => "Premium",
    MidTier => "Mid-tier",
    NoPreference => "No preference",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelPerk {
    #[serde(rename = "tsa_ge")]
    TsaGlobalEntry,
    #[serde(rename = "lounge")]
    Lounge,
}

wire_labels!(TravelPerk {
    TsaGlobalEntry => "tsa_ge",
    Lounge => "lounge",
});

/// Issuer application-frequency rules that rule out a bank entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuerRule {
    #[serde(rename = "5_in_24mo")]
    FiveInTwentyFourMonths,
    #[serde(rename = "6_in_24mo")]
    SixInTwentyFourMonths,
    #[serde(rename = "2_in_60_days")]
    TwoInSixtyDays,
    #[serde(rename = "2_in_90_days")]
    TwoInNinetyDays,
}

wire_labels!(IssuerRule {
    FiveInTwentyFourMonths => "5_in_24mo",
    SixInTwentyFourMonths => "6_in_24mo",
    TwoInSixtyDays => "2_in_60_days",
    TwoInNinetyDays => "2_in_90_days",
});

impl IssuerRule {
    /// Issuer keys (see [`issuer_key`]) that decline applicants under this rule.
    pub const fn excluded_issuers(self) -> &'static [&'static str] {
        match self {
            Self::FiveInTwentyFourMonths => &["chase"],
            Self::SixInTwentyFourMonths => &["chase", "barclays"],
            Self::TwoInSixtyDays => &["citi", "amex"],
            Self::TwoInNinetyDays => &["amex"],
        }
    }

    pub fn excludes(self, issuer: &str) -> bool {
        let key = issuer_key(issuer);
        self.excluded_issuers().iter().any(|excluded| *excluded == key)
    }

    /// Active rules given the dates the user opened their existing cards.
    ///
    /// Openings after `today` are ignored. Month windows are calendar months,
    /// day windows count `today` as day one.
    pub fn derive(openings: &[NaiveDate], today: NaiveDate) -> Vec<IssuerRule> {
        let past: Vec<NaiveDate> = openings
            .iter()
            .copied()
            .filter(|opened| *opened <= today)
            .collect();

        let within_months = |months: u32| {
            let cutoff = today.checked_sub_months(Months::new(months));
            past.iter()
                .filter(|opened| cutoff.map_or(true, |cutoff| **opened > cutoff))
                .count()
        };
        let within_days = |days: i64| {
            past.iter()
                .filter(|opened| (today - **opened).num_days() < days)
                .count()
        };

        let last_24_months = within_months(24);
        let mut rules = Vec::new();
        if last_24_months >= 5 {
            rules.push(Self::FiveInTwentyFourMonths);
        }
        if last_24_months >= 6 {
            rules.push(Self::SixInTwentyFourMonths);
        }
        if within_days(60) >= 2 {
            rules.push(Self::TwoInSixtyDays);
        }
        if within_days(90) >= 2 {
            rules.push(Self::TwoInNinetyDays);
        }
        rules
    }
}

/// Primary, secondary and tertiary goals taken positionally from the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalRanks {
    pub primary: Option<Goal>,
    pub secondary: Option<Goal>,
    pub tertiary: Option<Goal>,
}

impl GoalRanks {
    pub fn includes(&self, goal: Goal) -> bool {
        [self.primary, self.secondary, self.tertiary].contains(&Some(goal))
    }
}

/// Travel sub-preferences collected by the refinement questions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelPreferences {
    #[serde(alias = "travel_rewards_type")]
    pub rewards_type: Option<TravelRewardsType>,
    #[serde(alias = "travel_frequency")]
    pub frequency: Option<TravelFrequency>,
    pub preferred_bank: Option<String>,
    pub preferred_airline: Option<String>,
    pub preferred_hotel: Option<String>,
    #[serde(alias = "travel_tier_preference")]
    pub tier: Option<TravelTier>,
    #[serde(alias = "travel_perks")]
    pub perks: Vec<TravelPerk>,
}

impl TravelPreferences {
    /// Bank points are the default travel flavor when none was picked.
    pub fn wants_generic_travel(&self) -> bool {
        matches!(self.rewards_type, None | Some(TravelRewardsType::General))
    }

    pub fn named_bank(&self) -> Option<&str> {
        named(self.preferred_bank.as_deref())
    }

    pub fn named_airline(&self) -> Option<&str> {
        named(self.preferred_airline.as_deref())
    }

    pub fn named_hotel(&self) -> Option<&str> {
        named(self.preferred_hotel.as_deref())
    }

    pub fn wants_perk(&self, perk: TravelPerk) -> bool {
        self.perks.contains(&perk)
    }
}

/// A JSON bool or the wizard's "Yes"/"No" answer; anything else reads as no.
fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Answer {
        Flag(bool),
        Text(String),
    }

    Ok(match Option::<Answer>::deserialize(deserializer)? {
        Some(Answer::Flag(flag)) => flag,
        Some(Answer::Text(text)) => matches!(normalize_key(&text).as_str(), "yes" | "true"),
        None => false,
    })
}

fn named(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| {
        let key = normalize_key(value);
        !key.is_empty() && key != "no preference" && key != "no strong preference"
    })
}

/// Structured wizard answers. Absent answers stay neutral.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(alias = "primary_goal_ranked")]
    pub goals: Vec<Goal>,
    #[serde(alias = "annual_fee_tolerance")]
    pub fee_tolerance: Option<FeeTolerance>,
    pub spend_comfort: Option<SpendComfort>,
    pub card_mode: Option<CardType>,
    #[serde(alias = "needs_0_apr", deserialize_with = "yes_no")]
    pub needs_zero_apr: bool,
    #[serde(deserialize_with = "yes_no")]
    pub exclude_travel_cards: bool,
    #[serde(alias = "issuer_approval_rules")]
    pub issuer_rules: Vec<IssuerRule>,
    pub travel: TravelPreferences,
}

impl Preferences {
    pub fn goal_ranks(&self) -> GoalRanks {
        let mut goals = self.goals.iter().copied();
        GoalRanks {
            primary: goals.next(),
            secondary: goals.next(),
            tertiary: goals.next(),
        }
    }

    /// Anything other than an explicit "no bonus" answer counts as willing.
    pub fn wants_signup_bonus(&self) -> bool {
        self.spend_comfort != Some(SpendComfort::NoBonus)
    }

    pub fn card_mode(&self) -> CardType {
        self.card_mode.unwrap_or(CardType::Personal)
    }

    /// Add the rules implied by the user's card openings to any stated ones.
    pub fn with_derived_rules(mut self, openings: &[NaiveDate], today: NaiveDate) -> Self {
        for rule in IssuerRule::derive(openings, today) {
            if !self.issuer_rules.contains(&rule) {
                self.issuer_rules.push(rule);
            }
        }
        self
    }

    /// First active rule that excludes `issuer`, if any.
    pub fn issuer_rule_excluding(&self, issuer: &str) -> Option<IssuerRule> {
        self.issuer_rules
            .iter()
            .copied()
            .find(|rule| rule.excludes(issuer))
    }
}
