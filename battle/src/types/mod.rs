//! Domain types for creatures and their combat state

mod creature;
mod element;
mod moves;
mod stats;
mod status;

pub use creature::{Condition, Creature, CreatureId};
pub use element::{Element, ELEMENT_CHART};
pub use moves::{status_duration, Move, MoveBlock, MoveTracker};
pub use stats::{effective_stat, Stat, StatStages, STAGE_MULTIPLIERS};
pub use status::{StatusEffect, StatusEffects, StatusKind};
