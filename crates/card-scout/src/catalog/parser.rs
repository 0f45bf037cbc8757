use super::normalizer::{parse_rate, parse_whole_dollars};
use super::valuation::{estimated_bonus_value_usd, is_cash_bonus};
use super::{Card, CardType, RewardModel};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

pub(crate) fn parse_cards<R: Read>(reader: R) -> Result<Vec<Card>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut cards = Vec::new();

    for record in csv_reader.deserialize::<CardRow>() {
        let row = record?;
        let Some(card) = row.into_card() else {
            continue;
        };

        if card.minimum_spend > 0 && card.spend_window_months == 0 {
            warn!(card = %card.name, "minimum spend listed without a spend window");
        }
        cards.push(card);
    }

    Ok(cards)
}

#[derive(Debug, Deserialize)]
struct CardRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    card_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    issuer: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    card_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    annual_fee: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    reward_model: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rewards_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    card_family: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    cashback_rate_effective: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    estimated_bonus_value_usd: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    minimum_spend_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    bonus_to_spend_ratio: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    spend_time_frame: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    intro_apr_purchase: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    signup_bonus: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    signup_bonus_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    lounge: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ge_tsa_precheck: Option<String>,
}

impl CardRow {
    fn into_card(self) -> Option<Card> {
        let name = self.card_name?;
        let text = |value: &Option<String>| value.as_deref().unwrap_or_default().to_string();
        let dollars = |value: &Option<String>| value.as_deref().map_or(0, parse_whole_dollars);

        // The listed USD estimate applies to cash bonuses only.
        let signup_bonus = dollars(&self.signup_bonus);
        let bonus_type = self.signup_bonus_type.as_deref().unwrap_or_default();
        let bonus_value = if is_cash_bonus(bonus_type) {
            match dollars(&self.estimated_bonus_value_usd) {
                0 => signup_bonus,
                listed => listed,
            }
        } else {
            estimated_bonus_value_usd(
                signup_bonus,
                bonus_type,
                self.rewards_type.as_deref().unwrap_or_default(),
            )
        };

        Some(Card {
            issuer: text(&self.issuer),
            card_type: self
                .card_type
                .as_deref()
                .map_or(CardType::Unknown, CardType::parse),
            reward_model: self
                .reward_model
                .as_deref()
                .map_or(RewardModel::Unspecified, RewardModel::parse),
            annual_fee: dollars(&self.annual_fee),
            cashback_rate: self.cashback_rate_effective.as_deref().and_then(parse_rate),
            bonus_value,
            minimum_spend: dollars(&self.minimum_spend_amount),
            spend_window_months: dollars(&self.spend_time_frame),
            bonus_to_spend_ratio: self
                .bonus_to_spend_ratio
                .as_deref()
                .and_then(parse_rate)
                .filter(|ratio| *ratio >= 0.0),
            intro_apr: self
                .intro_apr_purchase
                .as_deref()
                .is_some_and(|apr| apr.trim().starts_with("0%")),
            family: text(&self.card_family),
            lounge_access: self.lounge.is_some(),
            travel_credit: self.ge_tsa_precheck.is_some(),
            name,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
