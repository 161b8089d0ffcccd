//! In-process transition contract for the arena state machine.
//!
//! States never call each other. A state that wants to hand control to
//! another returns a [`StateTransition`]: the target [`GameStateId`] plus
//! [`StateArgs`] carrying a reason string and an optional typed
//! [`Payload`].

use thiserror::Error;

mod args;
mod payload;
mod state;

pub use args::{parse_transition, reasons, StateArgs, StateTransition};
pub use payload::{
    BattleReport, BattleRewards, BattleSetup, CaptureResult, CapturingRequest, FusionRequest,
    FusionResult, Payload, TrainingRequest, TrainingResult,
};
pub use state::GameStateId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid transition format: {0}")]
    InvalidFormat(String),
}
