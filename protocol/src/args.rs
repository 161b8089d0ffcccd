use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::payload::Payload;
use crate::state::GameStateId;

/// Transition reasons used by the built-in states
pub mod reasons {
    pub const INITIALIZE: &str = "Initialize";
    pub const FORCED: &str = "Forced";

    pub const NO_BATTLE_CREATURES: &str = "NoBattleCreatures";
    pub const BATTLE_WON: &str = "BattleWon";
    pub const BATTLE_LOST: &str = "BattleLost";
    pub const BATTLE_DRAW: &str = "BattleDraw";
    pub const NPC_BATTLE: &str = "NpcBattle";

    pub const CAPTURE_NO_REQUEST: &str = "CaptureNoRequest";
    pub const CAPTURE_REJECTED: &str = "CaptureRejected";
    pub const CAPTURE_SUCCEEDED: &str = "CaptureSucceeded";
    pub const CAPTURE_FAILED: &str = "CaptureFailed";
    pub const CAPTURE_VICTORY: &str = "CaptureVictory";
    pub const CAPTURE_FAILED_RETURN: &str = "CaptureFailedReturn";

    pub const DIALOGUE_END: &str = "DialogueEnd";
    pub const PAUSED_BATTLE: &str = "PausedBattle";
    pub const RESUME_BATTLE: &str = "ResumeBattle";
    pub const CLOSE_INVENTORY: &str = "CloseInventory";

    pub const TRAINING_NO_REQUEST: &str = "TrainingNoRequest";
    pub const TRAINING_CANCELLED: &str = "TrainingCancelled";
    pub const TRAINING_COMPLETE: &str = "TrainingComplete";
    pub const FUSION_NO_REQUEST: &str = "FusionNoRequest";
    pub const FUSION_COMPLETE: &str = "FusionComplete";

    pub const VICTORY_RETURN: &str = "VictoryReturn";
    pub const DEFEAT_ACKNOWLEDGED: &str = "DefeatAcknowledged";
    pub const GAME_OVER_RETURN: &str = "GameOverReturn";
}

/// Reason and optional payload handed to the next state's `enter`.
/// Read-only after construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateArgs {
    reason: String,
    #[serde(default)]
    payload: Option<Payload>,
}

impl StateArgs {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            payload: None,
        }
    }

    pub fn with_payload(reason: impl Into<String>, payload: Payload) -> Self {
        Self {
            reason: reason.into(),
            payload: Some(payload),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Take ownership of the payload
    pub fn into_payload(self) -> Option<Payload> {
        self.payload
    }
}

/// Request to move to `next`, consumed once by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub next: GameStateId,
    #[serde(default)]
    pub args: StateArgs,
}

impl StateTransition {
    pub fn new(next: GameStateId, args: StateArgs) -> Self {
        Self { next, args }
    }

    /// Transition without a payload
    pub fn to(next: GameStateId, reason: impl Into<String>) -> Self {
        Self::new(next, StateArgs::new(reason))
    }

    pub fn with_payload(next: GameStateId, reason: impl Into<String>, payload: Payload) -> Self {
        Self::new(next, StateArgs::with_payload(reason, payload))
    }
}

/// Parse an externally scripted transition, e.g.
/// `{"next":"Dialogue","args":{"reason":"TalkToNpc","payload":{"type":"NpcId","data":"mechanic"}}}`
pub fn parse_transition(json: &str) -> Result<StateTransition> {
    let json = json.trim();
    if json.is_empty() {
        return Err(crate::ParseError::MissingField("next".to_string()).into());
    }
    let transition = serde_json::from_str(json)
        .map_err(|e| crate::ParseError::InvalidFormat(e.to_string()))?;
    Ok(transition)
}
