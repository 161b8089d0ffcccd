use std::sync::Arc;

use arena_battle::{BattleOutcome, CreatureId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::MachineConfig;
use crate::service::GameService;
use crate::ui::UiBridge;

/// Scratch data for the encounter in progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleScratch {
    pub enemy: Option<CreatureId>,
    /// A failed capture used up the player's turn
    pub turn_consumed: bool,
    pub last_outcome: Option<BattleOutcome>,
    pub last_log: Vec<String>,
}

impl BattleScratch {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Everything a state may touch during a lifecycle call.
///
/// Owned by the driver and lent to exactly one state at a time. Fields are
/// public so a state can borrow `game` and `rng` at once.
pub struct GameStateContext {
    pub game: Box<dyn GameService>,
    pub ui: Arc<dyn UiBridge>,
    pub battle: BattleScratch,
    pub rng: ChaCha8Rng,
    pub config: MachineConfig,
}

impl GameStateContext {
    pub fn new(game: Box<dyn GameService>, ui: Arc<dyn UiBridge>, config: MachineConfig) -> Self {
        Self {
            game,
            ui,
            battle: BattleScratch::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Clear a session flag, reporting whether it was set to "true"
    pub fn take_flag(&mut self, key: &str) -> bool {
        self.game.clear_flag(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

impl std::fmt::Debug for GameStateContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStateContext")
            .field("battle", &self.battle)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Session flag names shared between the states and the outside world
pub mod flags {
    pub const LAST_BATTLE_OUTCOME: &str = "LastBattleOutcome";
    pub const IN_DIALOGUE: &str = "InDialogue";
    pub const DIALOGUE_COMPLETED: &str = "DialogueCompleted";
    pub const DIALOGUE_REQUESTED_BATTLE: &str = "DialogueRequestedBattle";
    pub const CLOSE_INVENTORY: &str = "CloseInventory";
    pub const CANCEL_TRAINING: &str = "CancelTraining";
    pub const DEFEAT_ACKNOWLEDGED: &str = "DefeatAcknowledged";
}
