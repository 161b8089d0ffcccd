//! Query helpers for elemental matchups
//!
//! Classifies chart multipliers and lists which elements hit a defender
//! hard, poorly, or not at all.

mod matchup;

pub use matchup::{
    // Pairwise classification
    is_immune,
    is_not_very_effective,
    is_super_effective,
    // Element-level queries
    best_attacking_element,
    immunities,
    resistances,
    weaknesses,
};
