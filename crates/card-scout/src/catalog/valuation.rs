//! Points and miles valuations used to express signup bonuses in dollars.
//!
//! Values are cents per point. `1.25` means 1,000 points are worth $12.50.

use super::normalize_key;

const DEFAULT_CENTS_PER_POINT: f64 = 1.0;

/// Program name (as it appears in the catalog's `rewards_type`) to cents per point.
pub const CENTS_PER_POINT: &[(&str, f64)] = &[
    ("Ultimate Rewards (UR)", 1.25),
    ("Membership Rewards (MR)", 1.25),
    ("Thank You Points (TYP)", 1.0),
    ("Bank of America Points", 0.6),
    ("U.S. Bank Points", 1.0),
    ("Wells Fargo Rewards", 1.0),
    ("Capital One Miles", 1.0),
    ("United Miles", 1.2),
    ("Southwest Rapid Rewards", 1.3),
    ("Delta SkyMiles", 1.0),
    ("AAdvantage Miles", 1.0),
    ("Alaska Miles", 1.1),
    ("JetBlue TrueBlue", 1.3),
    ("BreezePoints", 1.0),
    ("Atmos Miles", 1.1),
    ("Airline Miles", 1.1),
    ("Marriott Bonvoy Points", 0.8),
    ("Hilton Honors Points", 0.5),
    ("World of Hyatt Points", 1.5),
    ("IHG One Rewards", 0.6),
    ("Wyndham Rewards", 0.6),
    ("Choice Privileges", 0.6),
    ("Cash", 1.0),
];

pub fn cents_per_point(rewards_type: &str) -> f64 {
    let key = normalize_key(rewards_type);
    if key.is_empty() {
        return DEFAULT_CENTS_PER_POINT;
    }
    CENTS_PER_POINT
        .iter()
        .find(|(program, _)| normalize_key(program) == key)
        .map_or(DEFAULT_CENTS_PER_POINT, |(_, cpp)| *cpp)
}

/// Bonuses paid in dollars rather than points or miles.
pub fn is_cash_bonus(bonus_type: &str) -> bool {
    normalize_key(bonus_type) == "dollars"
}

/// Dollar value of a signup bonus of `amount` units.
///
/// Cash bonuses (`bonus_type` of `dollars`) are worth their face value; points
/// and miles are converted through [`cents_per_point`] and rounded.
pub fn estimated_bonus_value_usd(amount: u32, bonus_type: &str, rewards_type: &str) -> u32 {
    if is_cash_bonus(bonus_type) {
        return amount;
    }
    let cpp = cents_per_point(rewards_type);
    (f64::from(amount) * cpp / 100.0).round() as u32
}
