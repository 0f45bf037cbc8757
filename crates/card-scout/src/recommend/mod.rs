//! Card recommendations: preference scoring and results-page ranking.
//!
//! Scoring is a pure function of a card, the user's structured answers and the
//! names they already hold. Ranking applies it across the catalog, collapses
//! card families and pins any brand the user named.

mod matching;
mod preferences;
mod ranking;
mod scoring;

#[cfg(test)]
mod tests;

pub use matching::{matches_bank, matches_brand};
pub use preferences::{
    FeeTolerance, Goal, GoalRanks, IssuerRule, Preferences, SpendComfort, TravelFrequency,
    TravelPerk, TravelPreferences, TravelRewardsType, TravelTier,
};
pub use ranking::{rank, rank_with_limits, ListLimits, RankedResults, RankingLimits, ScoredCard};
pub use scoring::{
    score_card, CardEvaluation, ExclusionReason, GoalRank, ScoreComponent, ScoreFactor,
    ScoringEngine, EXCLUDED_SCORE,
};
