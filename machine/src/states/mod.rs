//! Built-in game states.
//!
//! Every state follows the same lifecycle: `enter` once when switched in,
//! `execute` once per tick until it returns a transition, then `exit` once
//! before the next state's `enter`. States that know their outcome on
//! entry stage it and hand it back on the next `execute`.

use arena_protocol::{GameStateId, StateArgs, StateTransition};

use crate::cancel::Cancellation;
use crate::context::GameStateContext;

mod battling;
mod capturing;
mod dialogue;
mod fusion;
mod inventory;
mod outcome;
mod passive;
mod training;

pub use battling::Battling;
pub use capturing::{Capturing, CapturingFailed, CapturingSuccess};
pub use dialogue::Dialogue;
pub use fusion::Fusion;
pub use inventory::Inventory;
pub use outcome::{Defeat, GameOver, Victory};
pub use passive::{Exploring, Idle};
pub use training::Training;

pub trait GameState: Send {
    fn id(&self) -> GameStateId;

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, cancel: &Cancellation);

    /// Returns the transition to apply, or `None` to stay
    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition>;

    fn exit(&mut self, ctx: &mut GameStateContext) {
        let _ = ctx;
    }
}

/// One instance of every built-in state
pub fn default_states() -> Vec<Box<dyn GameState>> {
    vec![
        Box::new(Idle),
        Box::new(Exploring),
        Box::new(Battling::default()),
        Box::new(Capturing::default()),
        Box::new(CapturingSuccess::default()),
        Box::new(CapturingFailed::default()),
        Box::new(Dialogue::default()),
        Box::new(Inventory::default()),
        Box::new(Training::default()),
        Box::new(Fusion::default()),
        Box::new(Victory),
        Box::new(Defeat),
        Box::new(GameOver),
    ]
}

/// Hand back a staged transition unless the tick was cancelled
fn staged(pending: &mut Option<StateTransition>, cancel: &Cancellation) -> Option<StateTransition> {
    if cancel.is_cancelled() {
        return None;
    }
    pending.take()
}
