//! Spend allocation: choose the signup bonuses worth chasing within a budget.
//!
//! The optimizer is a 0/1 knapsack over minimum-spend requirements with two
//! extra limits: a maximum card count and at most [`ISSUER_CAP`] cards per
//! issuer. It is exact, deterministic, and its total bonus never drops when the
//! card allowance grows.

mod knapsack;
mod pool;

pub use pool::{AllocationFilter, CardTypeFilter, RewardFilter};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{issuer_key, Card};
use knapsack::Item;

/// Most cards a plan may take from one issuer.
pub const ISSUER_CAP: usize = 2;

/// Upper bound applied to the requested card count.
pub const MAX_CARDS_LIMIT: usize = 20;

/// One chosen card with the spend it needs and the bonus it earns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub card: Card,
    pub minimum_spend: u32,
    pub bonus: u32,
}

impl From<&Card> for AllocationEntry {
    fn from(card: &Card) -> Self {
        Self {
            minimum_spend: card.minimum_spend,
            bonus: card.bonus_value,
            card: card.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub entries: Vec<AllocationEntry>,
    pub total_bonus: u64,
    pub total_spend: u64,
}

impl AllocationPlan {
    fn from_entries(entries: Vec<AllocationEntry>) -> Self {
        let total_bonus = entries.iter().map(|entry| u64::from(entry.bonus)).sum();
        let total_spend = entries
            .iter()
            .map(|entry| u64::from(entry.minimum_spend))
            .sum();
        Self {
            entries,
            total_bonus,
            total_spend,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn card_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.card.name.as_str())
            .collect()
    }

    /// Chase first, Amex second, Capital One last; catalog order otherwise.
    pub fn sorted_for_display(mut self) -> Self {
        self.entries
            .sort_by_key(|entry| issuer_display_rank(&entry.card.issuer));
        self
    }
}

fn issuer_display_rank(issuer: &str) -> u8 {
    match issuer_key(issuer).as_str() {
        "chase" => 0,
        "amex" => 1,
        "capital one" => 3,
        _ => 2,
    }
}

/// Whole-dollar budget; negative and NaN budgets allow no spend.
fn whole_dollars(budget: f64) -> u64 {
    budget.max(0.0).floor() as u64
}

/// First card per name, upgraded in place when a later variant carries a
/// strictly larger bonus.
fn dedupe_by_name(cards: &[Card]) -> Vec<&Card> {
    let mut unique: Vec<&Card> = Vec::with_capacity(cards.len());
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for card in cards {
        match slots.get(card.name.as_str()) {
            Some(&slot) => {
                if card.bonus_value > unique[slot].bonus_value {
                    unique[slot] = card;
                }
            }
            None => {
                slots.insert(card.name.as_str(), unique.len());
                unique.push(card);
            }
        }
    }
    unique
}

/// Candidate indices grouped by issuer in first-seen order. Cards without an
/// issuer are not capped together.
fn issuer_groups(candidates: &[&Card]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for (index, card) in candidates.iter().enumerate() {
        let key = issuer_key(&card.issuer);
        if key.is_empty() {
            groups.push(vec![index]);
            continue;
        }
        match slots.get(&key) {
            Some(&slot) => groups[slot].push(index),
            None => {
                slots.insert(key, groups.len());
                groups.push(vec![index]);
            }
        }
    }
    groups
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Pick the cards whose signup bonuses sum highest without exceeding `budget`
/// dollars of combined minimum spend, `max_cards` cards, or [`ISSUER_CAP`]
/// cards per issuer.
///
/// `max_cards` is clamped to `1..=MAX_CARDS_LIMIT`. Entries come back in
/// catalog order; see [`AllocationPlan::sorted_for_display`].
pub fn compute_optimal_plan(cards: &[Card], budget: f64, max_cards: i64) -> AllocationPlan {
    let budget = whole_dollars(budget);
    let max_cards = max_cards.clamp(1, MAX_CARDS_LIMIT as i64) as usize;

    let candidates: Vec<&Card> = dedupe_by_name(cards)
        .into_iter()
        .filter(|card| card.minimum_spend > 0 && card.bonus_value > 0)
        .collect();
    if candidates.is_empty() || budget == 0 {
        return AllocationPlan::default();
    }

    // Spends are typically round hundreds, so the table is indexed in units
    // of their common divisor rather than in dollars.
    let unit = candidates
        .iter()
        .map(|card| u64::from(card.minimum_spend))
        .fold(0, gcd);
    let items: Vec<Item> = candidates
        .iter()
        .map(|card| Item {
            weight: u64::from(card.minimum_spend) / unit,
            value: u64::from(card.bonus_value),
        })
        .collect();

    let mut heaviest: Vec<u64> = items.iter().map(|item| item.weight).collect();
    heaviest.sort_unstable_by(|a, b| b.cmp(a));
    let reachable: u64 = heaviest.iter().take(max_cards).sum();
    let capacity = (budget / unit).min(reachable);

    let groups = issuer_groups(&candidates);
    let selected = knapsack::solve(&items, &groups, capacity, max_cards, ISSUER_CAP);
    let plan = AllocationPlan::from_entries(
        selected
            .into_iter()
            .map(|index| AllocationEntry::from(candidates[index]))
            .collect(),
    );

    debug!(
        candidates = candidates.len(),
        budget,
        max_cards,
        chosen = plan.entries.len(),
        total_bonus = plan.total_bonus,
        total_spend = plan.total_spend,
        "allocation plan computed"
    );
    plan
}

/// Apply `filter` to the catalog, then optimize over what remains.
pub fn plan_for(
    cards: &[Card],
    filter: &AllocationFilter,
    budget: f64,
    max_cards: i64,
) -> AllocationPlan {
    compute_optimal_plan(&filter.apply(cards), budget, max_cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, issuer: &str, minimum_spend: u32, bonus_value: u32) -> Card {
        Card {
            name: name.to_string(),
            issuer: issuer.to_string(),
            minimum_spend,
            bonus_value,
            spend_window_months: 3,
            ..Card::default()
        }
    }

    #[test]
    fn issuer_cap_limits_same_bank_cards() {
        let cards = vec![
            card("X", "Chase", 3000, 900),
            card("Y", "Chase", 4000, 1000),
            card("Z", "Chase", 2000, 600),
        ];

        let plan = compute_optimal_plan(&cards, 9000.0, 3);

        assert_eq!(plan.card_names(), vec!["X", "Y"]);
        assert_eq!(plan.total_bonus, 1900);
        assert_eq!(plan.total_spend, 7000);
    }

    #[test]
    fn empty_issuers_are_not_grouped() {
        let cards = vec![
            card("A", "", 1000, 300),
            card("B", " ", 1000, 300),
            card("C", "", 1000, 300),
        ];
        let plan = compute_optimal_plan(&cards, 3000.0, 3);
        assert_eq!(plan.entries.len(), 3);
    }

    #[test]
    fn amex_aliases_share_a_cap() {
        let cards = vec![
            card("Gold", "Amex", 1000, 500),
            card("Platinum", "American Express", 1000, 500),
            card("Hilton", "amex", 1000, 500),
        ];
        let plan = compute_optimal_plan(&cards, 10_000.0, 5);
        assert_eq!(plan.entries.len(), 2);
    }

    #[test]
    fn duplicate_names_keep_the_richest_variant() {
        let cards = vec![
            card("Dup", "Citi", 1000, 200),
            card("Other", "Chase", 1000, 100),
            card("Dup", "Citi", 1000, 400),
        ];
        let plan = compute_optimal_plan(&cards, 2000.0, 2);
        assert_eq!(plan.card_names(), vec!["Dup", "Other"]);
        assert_eq!(plan.entries[0].bonus, 400);
        assert_eq!(plan.total_bonus, 500);
    }

    #[test]
    fn degenerate_inputs_yield_empty_plans() {
        let cards = vec![card("A", "Chase", 1000, 300), card("Free", "Citi", 0, 200)];
        assert!(compute_optimal_plan(&[], 5000.0, 3).is_empty());
        assert!(compute_optimal_plan(&cards, 0.0, 3).is_empty());
        assert!(compute_optimal_plan(&cards, -100.0, 3).is_empty());
        assert!(compute_optimal_plan(&cards, f64::NAN, 3).is_empty());
        assert!(compute_optimal_plan(&cards, 999.99, 3).is_empty());
        assert!(compute_optimal_plan(&[card("Free", "Citi", 0, 200)], 5000.0, 3).is_empty());
    }

    #[test]
    fn max_cards_is_clamped() {
        let cards: Vec<Card> = (0..30)
            .map(|index| card(&format!("Card {index}"), &format!("Bank {index}"), 100, 10))
            .collect();
        assert_eq!(compute_optimal_plan(&cards, 1_000_000.0, 0).entries.len(), 1);
        assert_eq!(compute_optimal_plan(&cards, 1_000_000.0, 500).entries.len(), MAX_CARDS_LIMIT);
    }

    #[test]
    fn display_order_puts_chase_first_and_capital_one_last() {
        let cards = vec![
            card("Venture", "Capital One", 4000, 750),
            card("Strata", "Citi", 4000, 600),
            card("Gold", "American Express", 6000, 750),
            card("Sapphire", "Chase", 5000, 750),
        ];
        let plan = compute_optimal_plan(&cards, 100_000.0, 4);
        assert_eq!(plan.card_names(), vec!["Venture", "Strata", "Gold", "Sapphire"]);

        let sorted = plan.sorted_for_display();
        assert_eq!(sorted.card_names(), vec!["Sapphire", "Gold", "Strata", "Venture"]);
    }
}
