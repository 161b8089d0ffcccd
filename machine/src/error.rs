use arena_battle::CreatureId;
use arena_protocol::{GameStateId, ParseError};
use thiserror::Error;

/// Failures reported by the game-state service.
///
/// States log these and fall back; none of them abort a transition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Creature {0} not found")]
    UnknownCreature(CreatureId),

    #[error("Creature {0} is already in the roster")]
    DuplicateCreature(CreatureId),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Human-readable reason an item can't be used right now
    #[error("{0}")]
    ItemRejected(String),

    #[error("Not enough {item_id}: requested {requested}, have {available}")]
    OutOfStock {
        item_id: String,
        requested: u32,
        available: u32,
    },

    #[error("No wild creature in the encounter slot")]
    NoEncounter,

    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Driver-level failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MachineError {
    #[error("State {0} is not registered")]
    StateNotRegistered(GameStateId),

    #[error("State machine has not been initialized")]
    NotInitialized,

    #[error(transparent)]
    UnknownState(#[from] ParseError),
}
