use serde::{Deserialize, Serialize};

use crate::catalog::{Card, CardType, RewardModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardTypeFilter {
    Personal,
    Business,
    #[default]
    Both,
}

impl CardTypeFilter {
    fn admits(self, card_type: CardType) -> bool {
        match self {
            Self::Personal => card_type == CardType::Personal,
            Self::Business => card_type == CardType::Business,
            Self::Both => true,
        }
    }
}

impl std::str::FromStr for CardTypeFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "personal" => Ok(Self::Personal),
            "business" => Ok(Self::Business),
            "both" => Ok(Self::Both),
            other => Err(format!("unrecognized card type filter '{other}'")),
        }
    }
}

/// Reward family to draw allocation candidates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RewardFilter {
    #[default]
    All,
    /// Bank travel points and cashback cards.
    General,
    Airline,
    Hotel,
}

impl RewardFilter {
    fn admits(self, model: &RewardModel) -> bool {
        match self {
            Self::All => true,
            Self::General => matches!(model, RewardModel::Travel | RewardModel::Cashback),
            Self::Airline => *model == RewardModel::Airline,
            Self::Hotel => *model == RewardModel::Hotel,
        }
    }
}

impl std::str::FromStr for RewardFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "general" => Ok(Self::General),
            "airline" => Ok(Self::Airline),
            "hotel" => Ok(Self::Hotel),
            other => Err(format!("unrecognized reward filter '{other}'")),
        }
    }
}

/// Narrows the catalog to the cards the optimizer may choose from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationFilter {
    pub card_type: CardTypeFilter,
    pub rewards: RewardFilter,
    /// Cards the user already holds or has ruled out, by exact name.
    pub excluded_names: Vec<String>,
}

impl AllocationFilter {
    pub fn admits(&self, card: &Card) -> bool {
        self.card_type.admits(card.card_type)
            && self.rewards.admits(&card.reward_model)
            && !self.excluded_names.iter().any(|name| *name == card.name)
    }

    pub fn apply(&self, cards: &[Card]) -> Vec<Card> {
        cards
            .iter()
            .filter(|card| self.admits(card))
            .cloned()
            .collect()
    }
}
