//! Game progression state machine for the arena.
//!
//! A [`StateMachine`] owns one instance of every [`GameState`] and a
//! [`GameStateContext`] holding the game service, the UI bridge, battle
//! scratch data and the session RNG. Exactly one state is active; each
//! tick runs its `execute`, and a returned transition is applied once.
//!
//! # Overview
//!
//! ```text
//!             ┌──────────── StateMachine ────────────┐
//!  tick() ──► │ current state.execute(ctx)           │
//!             │   └─ Some(StateTransition) ──► exit  │
//!             │                              ──► enter(next, args)
//!             └──────────────────────────────────────┘
//!                        │ ctx
//!                        ▼
//!   GameService (roster, items, encounter)   UiBridge (fire-and-forget)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use arena_battle::{Creature, CreatureId, Element};
//! use arena_machine::{Cancellation, GameSession, MachineConfig, StateMachine, TracingUi};
//!
//! let session = GameSession::new("Ash")
//!     .with_creature(Creature::new(CreatureId(1), "Sparky", Element::Electric, 10));
//! let mut machine = StateMachine::with_default_states(
//!     Box::new(session),
//!     Arc::new(TracingUi),
//!     MachineConfig::default(),
//! );
//! let cancel = Cancellation::new();
//! machine.initialize(&cancel)?;
//! machine.run(&cancel, None).await?;
//! ```

mod cancel;
mod config;
mod context;
mod driver;
mod error;
mod service;
pub mod states;
mod tests;
mod ui;

pub use cancel::Cancellation;
pub use config::{MachineConfig, ResolverKind};
pub use context::{flags, BattleScratch, GameStateContext};
pub use driver::{StateMachine, TransitionRecord};
pub use error::{MachineError, ServiceError};
pub use service::{environment_modifier_for, GameService, GameSession, PlayerProfile};
pub use states::GameState;
pub use ui::{NullUi, RecordingUi, TracingUi, UiBridge, UiEvent};
