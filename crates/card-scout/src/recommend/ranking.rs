use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matching::{matches_bank, matches_brand};
use super::preferences::{Preferences, TravelRewardsType};
use super::scoring::{ScoringEngine, EXCLUDED_SCORE};
use crate::catalog::{Card, CardType, RewardModel};

/// A card with its score, as shown on the results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCard {
    pub card: Card,
    pub score: f64,
}

/// Best matches in the requested card mode plus a shorter list of the other mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedResults {
    pub card_mode: CardType,
    pub primary: Vec<ScoredCard>,
    pub other_type: Vec<ScoredCard>,
}

/// Size caps for one result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLimits {
    /// Hard cap on the list.
    pub total: usize,
    /// Brand matches pinned to the top when a brand is named.
    pub pinned: usize,
    /// Non-brand cards appended after the pinned brand matches.
    pub fill: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingLimits {
    pub primary: ListLimits,
    pub other_type: ListLimits,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            primary: ListLimits {
                total: 9,
                pinned: 2,
                fill: 4,
            },
            other_type: ListLimits {
                total: 3,
                pinned: 2,
                fill: 1,
            },
        }
    }
}

/// Named brand whose cards are pinned to the top of each list.
enum BrandPin<'p> {
    Brand(&'p str),
    Bank(&'p str),
}

impl BrandPin<'_> {
    fn from_preferences(preferences: &Preferences) -> Option<BrandPin<'_>> {
        let travel = &preferences.travel;
        match travel.rewards_type {
            Some(TravelRewardsType::Airline) => travel.named_airline().map(BrandPin::Brand),
            Some(TravelRewardsType::Hotel) => travel.named_hotel().map(BrandPin::Brand),
            Some(TravelRewardsType::General) => travel.named_bank().map(BrandPin::Bank),
            Some(TravelRewardsType::NoPreference) | None => None,
        }
    }

    fn matches(&self, card: &Card) -> bool {
        match self {
            Self::Brand(brand) => matches_brand(card, brand),
            Self::Bank(bank) => matches_bank(card, bank),
        }
    }
}

#[derive(Clone, Copy)]
struct Scored<'c> {
    card: &'c Card,
    score: f64,
}

impl Scored<'_> {
    fn into_scored_card(self) -> ScoredCard {
        ScoredCard {
            card: self.card.clone(),
            score: self.score,
        }
    }
}

/// Keep the highest-scoring card per family; ties keep the earlier card.
/// Families stay in first-seen order.
fn dedupe_by_family<'c>(entries: Vec<Scored<'c>>) -> Vec<Scored<'c>> {
    let mut best: Vec<Scored<'c>> = Vec::with_capacity(entries.len());
    let mut slots: HashMap<&'c str, usize> = HashMap::new();

    for entry in entries {
        let card = entry.card;
        match slots.get(card.family_key()) {
            Some(&slot) => {
                if entry.score > best[slot].score {
                    best[slot] = entry;
                }
            }
            None => {
                slots.insert(card.family_key(), best.len());
                best.push(entry);
            }
        }
    }

    best
}

/// Stable sort, highest score first.
fn sort_by_score(entries: &mut [Scored<'_>]) {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
}

fn rank_card_type<'c>(
    engine: &ScoringEngine<'_>,
    cards: &'c [Card],
    card_type: CardType,
    limits: ListLimits,
) -> Vec<Scored<'c>> {
    let candidates: Vec<Scored<'c>> = cards
        .iter()
        .filter(|card| card.card_type == card_type)
        .map(|card| Scored {
            card,
            score: engine.score(card),
        })
        .filter(|entry| entry.score > EXCLUDED_SCORE)
        .collect();

    let preferences = engine.preferences();
    if let Some(pin) = BrandPin::from_preferences(preferences) {
        let (mut pinned, others): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|entry| pin.matches(entry.card));
        sort_by_score(&mut pinned);
        pinned.truncate(limits.pinned);

        let mut fill = dedupe_by_family(others);
        sort_by_score(&mut fill);
        fill.truncate(limits.fill);

        pinned.extend(fill);
        pinned.truncate(limits.total);
        return pinned;
    }

    let mut ranked = dedupe_by_family(candidates);
    sort_by_score(&mut ranked);

    let preferred_model = match preferences.travel.rewards_type {
        Some(TravelRewardsType::Airline) => Some(RewardModel::Airline),
        Some(TravelRewardsType::Hotel) => Some(RewardModel::Hotel),
        _ => None,
    };
    if let Some(model) = preferred_model {
        let (mut preferred, rest): (Vec<_>, Vec<_>) = ranked
            .into_iter()
            .partition(|entry| entry.card.reward_model == model);
        preferred.extend(rest);
        ranked = preferred;
    }

    ranked.truncate(limits.total);
    ranked
}

/// Rank the catalog for the results page using the default list sizes.
pub fn rank(cards: &[Card], preferences: &Preferences, excluded_names: &[String]) -> RankedResults {
    rank_with_limits(cards, preferences, excluded_names, RankingLimits::default())
}

pub fn rank_with_limits(
    cards: &[Card],
    preferences: &Preferences,
    excluded_names: &[String],
    limits: RankingLimits,
) -> RankedResults {
    let engine = ScoringEngine::new(preferences, excluded_names);
    let card_mode = preferences.card_mode();

    let primary = rank_card_type(&engine, cards, card_mode, limits.primary);
    let other_type = card_mode
        .opposite()
        .map(|other| rank_card_type(&engine, cards, other, limits.other_type))
        .unwrap_or_default();

    debug!(
        card_mode = card_mode.label(),
        catalog = cards.len(),
        primary = primary.len(),
        other_type = other_type.len(),
        "ranked recommendations"
    );

    RankedResults {
        card_mode,
        primary: primary.into_iter().map(Scored::into_scored_card).collect(),
        other_type: other_type.into_iter().map(Scored::into_scored_card).collect(),
    }
}
