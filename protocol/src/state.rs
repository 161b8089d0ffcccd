use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// The activity the player is currently engaged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStateId {
    Idle,
    Exploring,
    Battling,
    Capturing,
    CapturingSuccess,
    CapturingFailed,
    Dialogue,
    Inventory,
    Training,
    Fusion,
    Victory,
    Defeat,
    GameOver,
}

impl GameStateId {
    pub const ALL: [GameStateId; 13] = [
        GameStateId::Idle,
        GameStateId::Exploring,
        GameStateId::Battling,
        GameStateId::Capturing,
        GameStateId::CapturingSuccess,
        GameStateId::CapturingFailed,
        GameStateId::Dialogue,
        GameStateId::Inventory,
        GameStateId::Training,
        GameStateId::Fusion,
        GameStateId::Victory,
        GameStateId::Defeat,
        GameStateId::GameOver,
    ];

    pub fn all() -> &'static [GameStateId] {
        &Self::ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStateId::Idle => "Idle",
            GameStateId::Exploring => "Exploring",
            GameStateId::Battling => "Battling",
            GameStateId::Capturing => "Capturing",
            GameStateId::CapturingSuccess => "CapturingSuccess",
            GameStateId::CapturingFailed => "CapturingFailed",
            GameStateId::Dialogue => "Dialogue",
            GameStateId::Inventory => "Inventory",
            GameStateId::Training => "Training",
            GameStateId::Fusion => "Fusion",
            GameStateId::Victory => "Victory",
            GameStateId::Defeat => "Defeat",
            GameStateId::GameOver => "GameOver",
        }
    }

    /// Whether this state belongs to an ongoing encounter
    pub fn is_battle_scoped(&self) -> bool {
        matches!(
            self,
            GameStateId::Battling
                | GameStateId::Capturing
                | GameStateId::CapturingSuccess
                | GameStateId::CapturingFailed
        )
    }
}

impl FromStr for GameStateId {
    type Err = ParseError;

    /// Case-insensitive; underscores and dashes are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect::<String>()
            .to_lowercase();
        GameStateId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ParseError::UnknownState(s.to_string()))
    }
}

impl std::fmt::Display for GameStateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
