//! Card catalog: the immutable list of card records both engines consume.

mod normalizer;
mod parser;
pub mod valuation;

pub(crate) use normalizer::{contains_key, issuer_key, normalize_key};
pub use normalizer::{parse_rate, parse_whole_dollars};

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

const BUNDLED_CATALOG: &str = include_str!("../../data/sample_cards.csv");

/// Catalog ingestion failure. The engines themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read card catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid card catalog CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Personal or business product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Personal,
    Business,
    Unknown,
}

impl CardType {
    pub fn parse(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "personal" => Self::Personal,
            "business" => Self::Business,
            _ => Self::Unknown,
        }
    }

    /// The other side of personal/business, used for the secondary result list.
    pub const fn opposite(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Business),
            Self::Business => Some(Self::Personal),
            Self::Unknown => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
            Self::Unknown => "unknown",
        }
    }
}

/// How a card earns rewards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RewardModel {
    Cashback,
    Travel,
    Airline,
    Hotel,
    BalanceTransfer,
    CreditBuilding,
    #[default]
    Unspecified,
    Other(String),
}

impl RewardModel {
    pub fn parse(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "cashback" => Self::Cashback,
            "travel" => Self::Travel,
            "airline" => Self::Airline,
            "hotel" => Self::Hotel,
            "balance_transfer" => Self::BalanceTransfer,
            "credit_building" => Self::CreditBuilding,
            "" => Self::Unspecified,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Cashback => "cashback",
            Self::Travel => "travel",
            Self::Airline => "airline",
            Self::Hotel => "hotel",
            Self::BalanceTransfer => "balance_transfer",
            Self::CreditBuilding => "credit_building",
            Self::Unspecified => "",
            Self::Other(value) => value,
        }
    }

    /// Travel, airline and hotel cards all count as travel-branded.
    pub fn is_travel(&self) -> bool {
        matches!(self, Self::Travel | Self::Airline | Self::Hotel)
    }
}

impl From<String> for RewardModel {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RewardModel> for String {
    fn from(value: RewardModel) -> Self {
        value.as_str().to_string()
    }
}

/// A single catalog record, already normalized. Amounts are whole US dollars.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub issuer: String,
    pub card_type: CardType,
    pub reward_model: RewardModel,
    pub annual_fee: u32,
    /// Effective cashback percentage, e.g. `1.5` for 1.5%.
    pub cashback_rate: Option<f64>,
    pub bonus_value: u32,
    pub minimum_spend: u32,
    pub spend_window_months: u32,
    /// Precomputed bonus / minimum spend, when the catalog carries it.
    pub bonus_to_spend_ratio: Option<f64>,
    pub intro_apr: bool,
    /// Product line used to collapse near-duplicate variants.
    pub family: String,
    pub lounge_access: bool,
    pub travel_credit: bool,
}

impl Card {
    /// Grouping key for family deduplication; falls back to the card name.
    pub fn family_key(&self) -> &str {
        let family = self.family.trim();
        if family.is_empty() {
            &self.name
        } else {
            family
        }
    }

    pub fn cashback_rate(&self) -> f64 {
        self.cashback_rate
            .filter(|rate| rate.is_finite() && *rate >= 0.0)
            .unwrap_or(0.0)
    }

    /// Bonus per dollar of required spend; zero when either side is missing.
    pub fn bonus_ratio(&self) -> f64 {
        if self.minimum_spend == 0 || self.bonus_value == 0 {
            return 0.0;
        }
        f64::from(self.bonus_value) / f64::from(self.minimum_spend)
    }
}

/// Read-only card list loaded once per session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardCatalog {
    cards: Vec<Card>,
}

impl CardCatalog {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let cards = parser::parse_cards(reader)?;
        debug!(cards = cards.len(), "card catalog loaded");
        Ok(Self { cards })
    }

    /// Sample catalog compiled into the library for demos and tests.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_reader(BUNDLED_CATALOG.as_bytes())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.name == name)
    }
}
