use std::collections::HashSet;

use super::common::*;
use crate::catalog::{CardType, RewardModel};
use crate::recommend::{
    rank, rank_with_limits, Goal, IssuerRule, ListLimits, Preferences, RankingLimits, ScoredCard,
    TravelRewardsType,
};

fn names(cards: &[ScoredCard]) -> Vec<&str> {
    cards.iter().map(|scored| scored.card.name.as_str()).collect()
}

#[test]
fn higher_bonus_outranks_starter_card() {
    let cards = bonus_scenario_cards();
    let results = rank(&cards, &bonus_seeker(), &[]);

    assert_eq!(results.card_mode, CardType::Personal);
    assert_eq!(names(&results.primary), vec!["Card B", "Card C", "Card A"]);
    assert!(results.other_type.is_empty());
}

#[test]
fn collapses_card_families_and_sorts_by_score() {
    let catalog = catalog();
    let results = rank(catalog.cards(), &preferences(&[Goal::Cashback]), &[]);

    let families: HashSet<&str> = results
        .primary
        .iter()
        .map(|scored| scored.card.family_key())
        .collect();
    assert_eq!(families.len(), results.primary.len());
    assert_eq!(results.primary.len(), 9);
    assert!(results
        .primary
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));

    let freedom: Vec<_> = results
        .primary
        .iter()
        .filter(|scored| scored.card.family == "Freedom")
        .collect();
    assert_eq!(freedom.len(), 1);
    assert_eq!(freedom[0].card.name, "Chase Freedom Flex");
}

#[test]
fn other_card_type_list_is_capped() {
    let catalog = catalog();
    let results = rank(catalog.cards(), &preferences(&[Goal::Bonus]), &[]);

    assert!(results
        .primary
        .iter()
        .all(|scored| scored.card.card_type == CardType::Personal));
    assert!(!results.other_type.is_empty());
    assert!(results.other_type.len() <= 3);
    assert!(results
        .other_type
        .iter()
        .all(|scored| scored.card.card_type == CardType::Business));
}

#[test]
fn business_mode_swaps_the_lists() {
    let catalog = catalog();
    let prefs = Preferences {
        card_mode: Some(CardType::Business),
        ..preferences(&[Goal::Bonus])
    };
    let results = rank(catalog.cards(), &prefs, &[]);

    assert_eq!(results.card_mode, CardType::Business);
    assert!(results
        .primary
        .iter()
        .all(|scored| scored.card.card_type == CardType::Business));
    assert_eq!(results.other_type.len(), 3);
}

#[test]
fn named_airline_is_pinned_to_the_top() {
    let catalog = catalog();
    let mut prefs = preferences(&[Goal::Travel]);
    prefs.travel.rewards_type = Some(TravelRewardsType::Airline);
    prefs.travel.preferred_airline = Some("United".to_string());

    let results = rank(catalog.cards(), &prefs, &[]);

    let mut pinned = names(&results.primary[..2]);
    pinned.sort_unstable();
    assert_eq!(pinned, vec!["United Explorer Card", "United Quest Card"]);
    assert_eq!(results.primary.len(), 6);
    assert!(results.primary[2..]
        .iter()
        .all(|scored| !scored.card.name.contains("United")));
    assert_eq!(results.other_type.len(), 1);
}

#[test]
fn named_bank_pins_its_cards() {
    let catalog = catalog();
    let mut prefs = preferences(&[Goal::Travel]);
    prefs.travel.rewards_type = Some(TravelRewardsType::General);
    prefs.travel.preferred_bank = Some("American Express".to_string());

    let results = rank(catalog.cards(), &prefs, &[]);

    assert!(results.primary[..2]
        .iter()
        .all(|scored| scored.card.issuer == "Amex"));
}

#[test]
fn hotel_rewards_without_a_brand_lists_hotel_cards_first() {
    let catalog = catalog();
    let mut prefs = preferences(&[Goal::Travel]);
    prefs.travel.rewards_type = Some(TravelRewardsType::Hotel);
    prefs.travel.preferred_hotel = Some("No strong preference".to_string());

    let results = rank(catalog.cards(), &prefs, &[]);

    assert!(results.primary[..3]
        .iter()
        .all(|scored| scored.card.reward_model == RewardModel::Hotel));
    assert!(results.primary[3..]
        .iter()
        .all(|scored| scored.card.reward_model != RewardModel::Hotel));
}

#[test]
fn excluded_cards_and_issuers_never_appear() {
    let catalog = catalog();
    let owned = vec![
        "Capital One Venture X Rewards".to_string(),
        "Wells Fargo Active Cash".to_string(),
    ];
    let prefs = Preferences {
        issuer_rules: vec![IssuerRule::FiveInTwentyFourMonths],
        ..preferences(&[Goal::Travel, Goal::Cashback])
    };

    let results = rank(catalog.cards(), &prefs, &owned);

    for scored in results.primary.iter().chain(&results.other_type) {
        assert!(!owned.contains(&scored.card.name));
        assert_ne!(scored.card.issuer, "Chase");
    }
}

#[test]
fn custom_limits_truncate_lists() {
    let catalog = catalog();
    let limits = RankingLimits {
        primary: ListLimits {
            total: 2,
            pinned: 1,
            fill: 1,
        },
        other_type: ListLimits {
            total: 0,
            pinned: 0,
            fill: 0,
        },
    };
    let results = rank_with_limits(catalog.cards(), &preferences(&[Goal::Everyday]), &[], limits);

    assert_eq!(results.primary.len(), 2);
    assert!(results.other_type.is_empty());
}

#[test]
fn ranking_is_deterministic() {
    let catalog = catalog();
    let prefs = bonus_seeker();
    let first = rank(catalog.cards(), &prefs, &[]);
    let second = rank(catalog.cards(), &prefs, &[]);
    assert_eq!(first, second);
}
