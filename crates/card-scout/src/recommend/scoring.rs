use serde::{Deserialize, Serialize};

use super::matching::{
    is_generic_travel, is_mid_tier_travel, is_premium_tier, is_very_premium_travel, matches_bank,
    matches_brand,
};
use super::preferences::{
    FeeTolerance, Goal, GoalRanks, IssuerRule, Preferences, TravelFrequency, TravelPerk,
    TravelTier,
};
use crate::catalog::{Card, RewardModel};

/// Score assigned to cards that must never be recommended.
pub const EXCLUDED_SCORE: f64 = -9999.0;

/// Why a card was hard-excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Owned,
    IssuerRule(IssuerRule),
    TravelCardsExcluded,
    NoIntroApr,
}

impl ExclusionReason {
    pub fn summary(&self) -> String {
        match self {
            Self::Owned => "card already owned".to_string(),
            Self::IssuerRule(rule) => format!("issuer declined under {} rule", rule.label()),
            Self::TravelCardsExcluded => "travel cards excluded".to_string(),
            Self::NoIntroApr => "no 0% intro APR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalRank {
    Primary,
    Secondary,
    Tertiary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    ZeroApr,
    FeeTolerance,
    PremiumTier,
    Goal(GoalRank),
    TravelRefinement,
    SignupBonus,
    FeeDrag,
}

/// Discrete contribution to a card's score, kept for audits and explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: f64,
    pub notes: String,
}

/// Score for one card plus the trail of adjustments that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEvaluation {
    pub card_name: String,
    pub score: f64,
    pub exclusion: Option<ExclusionReason>,
    pub components: Vec<ScoreComponent>,
}

impl CardEvaluation {
    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }
}

struct TravelWeights {
    matched: f64,
    high: f64,
    medium: f64,
    low: f64,
    missed: f64,
}

struct BonusWeights {
    divisor: f64,
    cap: f64,
    ratio_factor: f64,
    ratio_cap: f64,
    unwilling: f64,
}

struct EverydayWeights {
    rate_factor: f64,
    intro_apr: f64,
}

/// Cashback weights below the primary rank; the primary rank blends instead.
struct CashbackWeights {
    matched: f64,
    ratio_factor: f64,
    ratio_cap: f64,
    rate_factor: f64,
}

struct RankWeights {
    travel: TravelWeights,
    bonus: BonusWeights,
    everyday: EverydayWeights,
    cashback: CashbackWeights,
}

const PRIMARY: RankWeights = RankWeights {
    travel: TravelWeights { matched: 80.0, high: 15.0, medium: 8.0, low: -10.0, missed: -40.0 },
    bonus: BonusWeights { divisor: 25.0, cap: 80.0, ratio_factor: 25.0, ratio_cap: 15.0, unwilling: -20.0 },
    everyday: EverydayWeights { rate_factor: 15.0, intro_apr: 35.0 },
    cashback: CashbackWeights { matched: 50.0, ratio_factor: 0.0, ratio_cap: 0.0, rate_factor: 25.0 },
};

const SECONDARY: RankWeights = RankWeights {
    travel: TravelWeights { matched: 30.0, high: 8.0, medium: 0.0, low: -5.0, missed: -15.0 },
    bonus: BonusWeights { divisor: 80.0, cap: 15.0, ratio_factor: 8.0, ratio_cap: 5.0, unwilling: 0.0 },
    everyday: EverydayWeights { rate_factor: 4.0, intro_apr: 10.0 },
    cashback: CashbackWeights { matched: 15.0, ratio_factor: 5.0, ratio_cap: 4.0, rate_factor: 5.0 },
};

const TERTIARY: RankWeights = RankWeights {
    travel: TravelWeights { matched: 12.0, high: 3.0, medium: 0.0, low: 0.0, missed: -5.0 },
    bonus: BonusWeights { divisor: 150.0, cap: 8.0, ratio_factor: 4.0, ratio_cap: 3.0, unwilling: 0.0 },
    everyday: EverydayWeights { rate_factor: 2.0, intro_apr: 5.0 },
    cashback: CashbackWeights { matched: 8.0, ratio_factor: 3.0, ratio_cap: 2.0, rate_factor: 2.0 },
};

impl GoalRank {
    const fn weights(self) -> &'static RankWeights {
        match self {
            Self::Primary => &PRIMARY,
            Self::Secondary => &SECONDARY,
            Self::Tertiary => &TERTIARY,
        }
    }
}

/// Running total with its audit trail. Zero adjustments are not recorded.
#[derive(Default)]
struct Tally {
    total: f64,
    components: Vec<ScoreComponent>,
}

impl Tally {
    fn add(&mut self, factor: ScoreFactor, points: f64, notes: impl Into<String>) {
        if points == 0.0 {
            return;
        }
        self.total += points;
        self.components.push(ScoreComponent {
            factor,
            points,
            notes: notes.into(),
        });
    }
}

/// Scores cards for one set of preferences and already-owned card names.
pub struct ScoringEngine<'a> {
    preferences: &'a Preferences,
    excluded_names: &'a [String],
    ranks: GoalRanks,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(preferences: &'a Preferences, excluded_names: &'a [String]) -> Self {
        Self {
            preferences,
            excluded_names,
            ranks: preferences.goal_ranks(),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        self.preferences
    }

    pub fn score(&self, card: &Card) -> f64 {
        self.evaluate(card).score
    }

    pub fn evaluate(&self, card: &Card) -> CardEvaluation {
        match self.exclusion(card) {
            Some(reason) => CardEvaluation {
                card_name: card.name.clone(),
                score: EXCLUDED_SCORE,
                exclusion: Some(reason),
                components: Vec::new(),
            },
            None => {
                let tally = self.tally(card);
                CardEvaluation {
                    card_name: card.name.clone(),
                    score: tally.total,
                    exclusion: None,
                    components: tally.components,
                }
            }
        }
    }

    fn zero_apr_mode(&self) -> bool {
        self.preferences.needs_zero_apr && self.ranks.primary != Some(Goal::Travel)
    }

    fn exclusion(&self, card: &Card) -> Option<ExclusionReason> {
        if self.excluded_names.iter().any(|name| *name == card.name) {
            return Some(ExclusionReason::Owned);
        }
        if let Some(rule) = self.preferences.issuer_rule_excluding(&card.issuer) {
            return Some(ExclusionReason::IssuerRule(rule));
        }
        if self.preferences.exclude_travel_cards && card.reward_model.is_travel() {
            return Some(ExclusionReason::TravelCardsExcluded);
        }
        if self.zero_apr_mode() && !card.intro_apr {
            return Some(ExclusionReason::NoIntroApr);
        }
        None
    }

    fn tally(&self, card: &Card) -> Tally {
        let mut tally = Tally::default();
        let fee = f64::from(card.annual_fee);

        if self.zero_apr_mode() {
            tally.add(
                ScoreFactor::ZeroApr,
                card.cashback_rate() * 10.0 - fee / 10.0,
                "intro APR card ranked by rate net of fee",
            );
            return tally;
        }

        self.fee_terms(card, &mut tally);

        let ranked = [
            (GoalRank::Primary, self.ranks.primary),
            (GoalRank::Secondary, self.ranks.secondary),
            (GoalRank::Tertiary, self.ranks.tertiary),
        ];
        for (rank, goal) in ranked {
            if let Some(goal) = goal {
                let points = self.goal_points(card, rank, goal);
                tally.add(ScoreFactor::Goal(rank), points, goal.label());
            }
        }

        if self.ranks.includes(Goal::Travel) {
            let points = self.travel_refinement(card);
            tally.add(ScoreFactor::TravelRefinement, points, "travel preferences");
        }

        let bonus = f64::from(card.bonus_value);
        let ratio = card.bonus_ratio();
        if self.preferences.wants_signup_bonus() {
            let mut points = (bonus / 100.0).min(20.0);
            if ratio > 0.0 {
                points += (ratio * 8.0).min(6.0);
            }
            tally.add(ScoreFactor::SignupBonus, points, format!("${bonus} signup bonus"));
        } else if card.bonus_value > 500 {
            tally.add(ScoreFactor::SignupBonus, -5.0, "large bonus the user will not chase");
        }

        if card.annual_fee > 400 && tally.total < 50.0 {
            tally.add(
                ScoreFactor::FeeDrag,
                -10.0,
                format!("${} fee on a weak match", card.annual_fee),
            );
        }

        tally
    }

    fn fee_terms(&self, card: &Card, tally: &mut Tally) {
        let Some(tolerance) = self.preferences.fee_tolerance else {
            return;
        };

        let ceiling = match tolerance {
            FeeTolerance::NoFee => Some(0),
            FeeTolerance::Low => Some(100),
            FeeTolerance::Medium => Some(400),
            FeeTolerance::High => None,
        };
        if let Some(ceiling) = ceiling.filter(|ceiling| card.annual_fee > *ceiling) {
            let points = if tolerance == FeeTolerance::NoFee { -50.0 } else { -30.0 };
            tally.add(
                ScoreFactor::FeeTolerance,
                points,
                format!("annual fee ${} above ${ceiling} ceiling", card.annual_fee),
            );
        }

        if is_premium_tier(card) {
            let points = match tolerance {
                FeeTolerance::High | FeeTolerance::Medium => 20.0,
                FeeTolerance::NoFee | FeeTolerance::Low => -15.0,
            };
            tally.add(ScoreFactor::PremiumTier, points, "premium tier card");
        }
    }

    fn goal_points(&self, card: &Card, rank: GoalRank, goal: Goal) -> f64 {
        let weights = rank.weights();
        let rate = card.cashback_rate();
        let ratio = card.bonus_ratio();

        match goal {
            Goal::Travel => {
                let travel = &weights.travel;
                if !card.reward_model.is_travel() {
                    return travel.missed;
                }
                travel.matched
                    + match self.preferences.travel.frequency {
                        Some(TravelFrequency::High) => travel.high,
                        Some(TravelFrequency::Medium) => travel.medium,
                        Some(TravelFrequency::Low) => travel.low,
                        None => 0.0,
                    }
            }
            Goal::Cashback => {
                let cashback = &weights.cashback;
                let is_cashback = card.reward_model == RewardModel::Cashback;
                if rank == GoalRank::Primary {
                    if !is_cashback {
                        return rate * cashback.rate_factor;
                    }
                    let spend_ratio = card.bonus_to_spend_ratio.unwrap_or(ratio);
                    return cashback.matched
                        + 0.6 * (rate * 20.0).min(100.0)
                        + 0.4 * (spend_ratio * 100.0).min(100.0);
                }
                let mut points = rate * cashback.rate_factor;
                if is_cashback {
                    points += cashback.matched;
                    if ratio > 0.0 {
                        points += (ratio * cashback.ratio_factor).min(cashback.ratio_cap);
                    }
                }
                points
            }
            Goal::Everyday => {
                let everyday = &weights.everyday;
                let mut points = rate * everyday.rate_factor;
                if card.intro_apr {
                    points += everyday.intro_apr;
                }
                points
            }
            Goal::Bonus => {
                let bonus = &weights.bonus;
                if !self.preferences.wants_signup_bonus() {
                    return bonus.unwilling;
                }
                let mut points = (f64::from(card.bonus_value) / bonus.divisor).min(bonus.cap);
                if ratio > 0.0 {
                    points += (ratio * bonus.ratio_factor).min(bonus.ratio_cap);
                }
                points
            }
        }
    }

    fn travel_refinement(&self, card: &Card) -> f64 {
        let travel = &self.preferences.travel;
        let is_travel = card.reward_model.is_travel();
        let mut points = 0.0;

        if travel.wants_generic_travel() {
            if is_generic_travel(card) {
                points += 30.0;
            }
            if travel.named_bank().is_some_and(|bank| matches_bank(card, bank)) {
                points += 40.0;
            }
        }

        match travel.tier {
            Some(TravelTier::Premium) => {
                if is_very_premium_travel(card) {
                    points += 35.0;
                } else if is_travel && card.annual_fee >= 350 {
                    points += 25.0;
                }
            }
            Some(TravelTier::MidTier) => {
                if is_mid_tier_travel(card) {
                    points += 35.0;
                } else if is_travel && card.annual_fee >= 300 {
                    points -= 35.0;
                }
            }
            Some(TravelTier::NoPreference) | None => {}
        }

        if travel.named_airline().is_some_and(|airline| matches_brand(card, airline)) {
            points += 40.0;
        }
        if travel.named_hotel().is_some_and(|hotel| matches_brand(card, hotel)) {
            points += 40.0;
        }
        if travel.wants_perk(TravelPerk::TsaGlobalEntry) && card.travel_credit {
            points += 25.0;
        }
        if travel.wants_perk(TravelPerk::Lounge) && card.lounge_access {
            points += 25.0;
        }

        points
    }
}

/// Score a single card. Hard exclusions return [`EXCLUDED_SCORE`].
pub fn score_card(card: &Card, preferences: &Preferences, excluded_names: &[String]) -> f64 {
    ScoringEngine::new(preferences, excluded_names).score(card)
}
