//! Combat primitives and resolution engines for the arena game core.
//!
//! This crate holds everything that can be computed without knowing which
//! activity the player is in: creatures, the elemental chart, stat stages,
//! status effects, items, and the combat and capture engines.
//!
//! # Overview
//!
//! `arena-battle` is the bottom of the workspace:
//!
//! ```text
//! arena-battle (creatures + engines) ← THIS CRATE
//!        │
//!        ▼
//! arena-protocol (state ids, transition payloads)
//!        │
//!        ▼
//! arena-machine (driver, states, services)
//! ```
//!
//! # Main Types
//!
//! ## Domain Types
//! - [`Element`] - Elemental affinities with effectiveness chart
//! - [`StatStages`] - Stat stage modifiers (-6 to +6)
//! - [`StatusEffect`], [`StatusEffects`] - Timed effects with refresh-on-reapply
//! - [`Creature`] - Full combatant state
//! - [`Move`], [`MoveTracker`] - Named moves with accuracy, status chance, use limits and combos
//! - [`CaptureDevice`], [`BattleItem`] - Items
//!
//! ## Engines
//! - [`resolve_action`] - One combat action
//! - [`BattleResolver`] - Whole-encounter strategies ([`PowerComparison`], [`TurnBasedDuel`])
//! - [`attempt_capture`] - Capture roll
//!
//! # Example Usage
//!
//! ```ignore
//! use arena_battle::{attempt_capture, CaptureDevice, Creature, CreatureId, Element};
//!
//! let mut wild = Creature::new(CreatureId(1), "Sparkit", Element::Electric, 3);
//! wild.take_damage(80);
//!
//! let mut rng = rand::thread_rng();
//! let roll = attempt_capture(&mut wild, &CaptureDevice::basic_net(), 5, 1.0, None, &mut rng);
//! println!("{} ({:.0}%)", roll.message, roll.chance * 100.0);
//! ```

pub mod capture;
pub mod combat;
pub mod items;
pub mod progression;
pub mod query;
pub mod types;

// Re-export main types at crate root for convenience
pub use capture::{
    attempt_capture, capture_chance, CaptureFactors, CaptureRoll, MAX_CAPTURE_CHANCE,
    MIN_CAPTURE_CHANCE,
};
pub use combat::{
    choose_move, resolve_action, tick_encounter, ActionOutcome, BattleOutcome, BattleResolver,
    BattleVerdict, CombatAction, PowerComparison, TurnBasedDuel,
};
pub use items::{recommended_device, BattleItem, CaptureDevice, DeviceKind, ItemUse};
pub use progression::{TrainingMode, TrainingOutcome};
pub use types::{
    Condition, Creature, CreatureId, Element, Move, MoveTracker, Stat, StatStages, StatusEffect,
    StatusEffects, StatusKind, ELEMENT_CHART,
};
