use crate::catalog::{contains_key, issuer_key, normalize_key, Card, RewardModel};

/// Name fragments that mark a card as premium tier regardless of its fee.
const PREMIUM_NAME_PATTERNS: &[&str] = &[
    "reserve",
    "venture x",
    "platinum",
    "infinite",
    "aspire",
    "brilliant",
    "performance",
    "premier",
    "club infinite",
    "club business",
    "world mastercard",
    "privileges select",
    "one key+",
    "earner plus",
    "executive",
    "signature",
];

const PREMIUM_FEE_FLOOR: u32 = 395;

/// Brands sold under more than one name.
const BRAND_ALIASES: &[(&str, &[&str])] = &[("expedia", &["one key", "hotels.com", "vrbo"])];

pub(crate) fn is_premium_tier(card: &Card) -> bool {
    let name = normalize_key(&card.name);
    PREMIUM_NAME_PATTERNS
        .iter()
        .any(|pattern| name.contains(pattern))
        || card.annual_fee >= PREMIUM_FEE_FLOOR
}

/// Top-of-line bank travel products.
pub(crate) fn is_very_premium_travel(card: &Card) -> bool {
    let name = normalize_key(&card.name);
    let issuer = issuer_key(&card.issuer);
    name.contains("sapphire reserve")
        || name.contains("venture x")
        || (issuer == "amex" && name.contains("platinum") && !name.contains("delta"))
}

/// Mid-tier bank travel products.
pub(crate) fn is_mid_tier_travel(card: &Card) -> bool {
    let name = normalize_key(&card.name);
    let issuer = issuer_key(&card.issuer);
    name.contains("sapphire preferred")
        || (name.contains("venture") && !name.contains("venture x"))
        || (issuer == "amex" && name.contains("gold") && !name.contains("delta"))
}

/// Flexible bank points card, as opposed to a co-branded airline or hotel card.
pub(crate) fn is_generic_travel(card: &Card) -> bool {
    card.reward_model == RewardModel::Travel
}

/// Case-insensitive substring match of a brand against the card's family or name.
pub fn matches_brand(card: &Card, brand: &str) -> bool {
    let key = normalize_key(brand);
    if key.is_empty() {
        return false;
    }

    let direct = contains_key(&card.family, &key) || contains_key(&card.name, &key);
    direct
        || BRAND_ALIASES
            .iter()
            .filter(|(canonical, _)| *canonical == key)
            .flat_map(|(_, aliases)| aliases.iter())
            .any(|alias| contains_key(&card.family, alias) || contains_key(&card.name, alias))
}

pub fn matches_bank(card: &Card, bank: &str) -> bool {
    let key = issuer_key(bank);
    !key.is_empty() && issuer_key(&card.issuer) == key
}
