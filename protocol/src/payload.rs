//! Typed payloads carried by transitions

use arena_battle::{BattleOutcome, Creature, CreatureId, TrainingMode};
use serde::{Deserialize, Serialize};

/// Who fights whom when entering Battling.
///
/// `player = None` means "the player's active creature"; `enemy = None`
/// means "whatever is in the encounter slot". A supplied enemy replaces
/// the encounter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BattleSetup {
    #[serde(default)]
    pub player: Option<CreatureId>,
    #[serde(default)]
    pub enemy: Option<Creature>,
    #[serde(default)]
    pub player_initiated: bool,
}

/// A request to throw a capture device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturingRequest {
    pub item_id: String,
    #[serde(default)]
    pub target_id: Option<CreatureId>,
    /// Test/debug override for the capture formula, still clamped
    #[serde(default)]
    pub forced_chance: Option<f64>,
}

impl CapturingRequest {
    pub fn new(item_id: impl Into<String>, target_id: Option<CreatureId>) -> Self {
        Self {
            item_id: item_id.into(),
            target_id,
            forced_chance: None,
        }
    }

    pub fn with_forced_chance(mut self, chance: f64) -> Self {
        self.forced_chance = Some(chance);
        self
    }
}

/// Outcome of a capture attempt. Immutable once produced.
///
/// On success `captured` holds the creature itself, moved out of the
/// encounter slot; it is moved again into the roster by CapturingSuccess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub success: bool,
    pub captured: Option<Creature>,
    pub log: Vec<String>,
    pub item_id: String,
    pub target_id: Option<CreatureId>,
    pub chance: f64,
    pub shake_count: u8,
}

impl CaptureResult {
    /// Name of the target, when the result still carries it
    pub fn captured_name(&self) -> Option<&str> {
        self.captured.as_ref().map(|c| c.name.as_str())
    }
}

/// XP and gold earned from a won encounter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BattleRewards {
    pub xp: u32,
    pub gold: u32,
    /// Creature that receives the XP, if any
    pub player_id: Option<CreatureId>,
    pub enemy_id: Option<CreatureId>,
    pub enemy_name: String,
    pub enemy_level: u32,
    /// The encounter ended by capture rather than by knockout
    pub captured: bool,
}

/// Summary shown on the defeat screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub enemy_name: String,
    pub enemy_level: u32,
    pub turns: u32,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub target: CreatureId,
    pub mode: TrainingMode,
    #[serde(default = "default_sessions")]
    pub sessions: u32,
}

fn default_sessions() -> u32 {
    1
}

impl TrainingRequest {
    pub fn new(target: CreatureId, mode: TrainingMode) -> Self {
        Self {
            target,
            mode,
            sessions: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub target: CreatureId,
    pub mode: TrainingMode,
    pub xp_gained: u32,
    pub stat_gain: u32,
    pub levels_gained: u32,
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionRequest {
    pub parent_a: CreatureId,
    pub parent_b: CreatureId,
    #[serde(default = "default_consume_parents")]
    pub consume_parents: bool,
    #[serde(default)]
    pub catalyst_item_id: Option<String>,
}

fn default_consume_parents() -> bool {
    true
}

impl FusionRequest {
    pub fn new(parent_a: CreatureId, parent_b: CreatureId) -> Self {
        Self {
            parent_a,
            parent_b,
            consume_parents: true,
            catalyst_item_id: None,
        }
    }
}

/// The fused creature lives in the roster; the result only names it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionResult {
    pub success: bool,
    pub fused: Option<CreatureId>,
    pub log: Vec<String>,
}

/// Every payload shape a transition can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    BattleSetup(BattleSetup),
    CapturingRequest(CapturingRequest),
    CapturingResult(CaptureResult),
    TrainingRequest(TrainingRequest),
    TrainingResult(TrainingResult),
    FusionRequest(FusionRequest),
    FusionResult(FusionResult),
    Rewards(BattleRewards),
    BattleReport(BattleReport),
    NpcId(String),
}

impl Payload {
    /// Variant name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::BattleSetup(_) => "BattleSetup",
            Payload::CapturingRequest(_) => "CapturingRequest",
            Payload::CapturingResult(_) => "CapturingResult",
            Payload::TrainingRequest(_) => "TrainingRequest",
            Payload::TrainingResult(_) => "TrainingResult",
            Payload::FusionRequest(_) => "FusionRequest",
            Payload::FusionResult(_) => "FusionResult",
            Payload::Rewards(_) => "Rewards",
            Payload::BattleReport(_) => "BattleReport",
            Payload::NpcId(_) => "NpcId",
        }
    }
}
