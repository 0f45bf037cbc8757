//! Credit card recommendation and signup-bonus planning.
//!
//! The [`recommend`] module scores a catalog against a user's stated
//! preferences and produces brand-balanced ranked lists. The [`allocation`]
//! module picks which cards to apply for so the total signup bonus is maximized
//! under a spend budget. Both are pure functions over an in-memory
//! [`catalog::CardCatalog`].

pub mod allocation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod recommend;
pub mod telemetry;
