//! Combat resolution
//!
//! [`resolve_action`] applies one action from an actor to a target.
//! [`BattleResolver`] implementations decide a whole encounter, either by a
//! quick power comparison or by playing out speed-ordered turns.

mod action;
mod resolver;

pub use action::{resolve_action, tick_encounter, ActionOutcome, CombatAction};
pub use resolver::{
    choose_move, power_rating, BattleOutcome, BattleResolver, BattleVerdict, PowerComparison,
    TurnBasedDuel,
};
