use std::time::Duration;

use anyhow::{Context, Result};
use arena_battle::{BattleResolver, PowerComparison, TurnBasedDuel};
use arena_protocol::GameStateId;
use serde::{Deserialize, Serialize};

/// Which engine decides an encounter in the Battling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolverKind {
    #[default]
    PowerComparison,
    TurnBased { turn_limit: u32 },
}

impl ResolverKind {
    pub fn build(&self) -> Box<dyn BattleResolver> {
        match *self {
            ResolverKind::PowerComparison => Box::new(PowerComparison),
            ResolverKind::TurnBased { turn_limit } => Box::new(TurnBasedDuel {
                turn_limit: turn_limit.max(1),
            }),
        }
    }
}

/// Session settings. Every field has a default, so a partial JSON
/// document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Delay between ticks of the async run loop
    pub tick_interval_ms: u64,
    /// Ticks Training waits before producing its result
    pub training_delay_ticks: u32,
    /// Ticks Fusion waits before producing its result
    pub fusion_delay_ticks: u32,
    pub resolver: ResolverKind,
    /// Seed for the session RNG
    pub seed: u64,
    /// State entered by `initialize`
    pub start_state: GameStateId,
    /// Add ±10% display jitter to the matchup multiplier Battling shows
    pub matchup_jitter: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            training_delay_ticks: 1,
            fusion_delay_ticks: 1,
            resolver: ResolverKind::PowerComparison,
            seed: 0,
            start_state: GameStateId::Exploring,
            matchup_jitter: false,
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse machine config")
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
