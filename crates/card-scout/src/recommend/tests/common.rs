use crate::catalog::{Card, CardCatalog, CardType, RewardModel};
use crate::recommend::{FeeTolerance, Goal, Preferences, SpendComfort};

pub(super) fn catalog() -> CardCatalog {
    CardCatalog::bundled().expect("bundled catalog parses")
}

pub(super) fn card(
    name: &str,
    issuer: &str,
    reward_model: RewardModel,
    annual_fee: u32,
    bonus_value: u32,
    minimum_spend: u32,
) -> Card {
    Card {
        name: name.to_string(),
        issuer: issuer.to_string(),
        card_type: CardType::Personal,
        reward_model,
        annual_fee,
        cashback_rate: Some(1.0),
        bonus_value,
        minimum_spend,
        spend_window_months: if minimum_spend > 0 { 3 } else { 0 },
        family: name.to_string(),
        ..Card::default()
    }
}

/// Cashback starter, mid-fee travel card and a high-fee cashback card.
pub(super) fn bonus_scenario_cards() -> Vec<Card> {
    let mut premium_cashback = card("Card C", "Citi", RewardModel::Cashback, 550, 1000, 6000);
    premium_cashback.spend_window_months = 6;
    vec![
        card("Card A", "Chase", RewardModel::Cashback, 0, 200, 500),
        card("Card B", "Amex", RewardModel::Travel, 95, 800, 4000),
        premium_cashback,
    ]
}

pub(super) fn preferences(goals: &[Goal]) -> Preferences {
    Preferences {
        goals: goals.to_vec(),
        ..Preferences::default()
    }
}

pub(super) fn bonus_seeker() -> Preferences {
    Preferences {
        fee_tolerance: Some(FeeTolerance::Medium),
        spend_comfort: Some(SpendComfort::High),
        ..preferences(&[Goal::Bonus])
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
