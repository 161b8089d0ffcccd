use std::sync::Mutex;

use arena_protocol::{BattleReport, BattleRewards};

/// Presentation requests issued by the states.
///
/// Every call is fire-and-forget: the core never waits on the UI and
/// ignores what it does with the request. All methods default to no-ops,
/// so a bridge only implements what it shows.
pub trait UiBridge: Send + Sync {
    fn show_battle_hud(&self) {}

    fn hide_battle_hud(&self) {}

    fn show_victory_screen(&self, rewards: Option<&BattleRewards>) {
        let _ = rewards;
    }

    fn show_defeat_screen(&self, report: Option<&BattleReport>) {
        let _ = report;
    }

    fn show_capture_animation(&self, item_id: &str) {
        let _ = item_id;
    }

    fn show_game_over(&self) {}

    fn set_status(&self, text: &str) {
        let _ = text;
    }

    fn show_toast(&self, text: &str) {
        let _ = text;
    }

    fn show_overworld(&self) {}

    fn show_dialogue(&self, npc_id: &str) {
        let _ = npc_id;
    }

    fn hide_dialogue(&self) {}

    fn show_inventory(&self, in_battle: bool) {
        let _ = in_battle;
    }

    fn hide_inventory(&self) {}

    fn show_training_screen(&self) {}

    fn show_training_progress(&self, done: u32, total: u32) {
        let _ = (done, total);
    }

    fn hide_training_screen(&self) {}
}

/// Bridge that ignores every request
#[derive(Debug, Default)]
pub struct NullUi;

impl UiBridge for NullUi {}

/// Bridge that forwards requests to `tracing` at debug level
#[derive(Debug, Default)]
pub struct TracingUi;

impl UiBridge for TracingUi {
    fn show_battle_hud(&self) {
        tracing::debug!("ui: show battle hud");
    }

    fn hide_battle_hud(&self) {
        tracing::debug!("ui: hide battle hud");
    }

    fn show_victory_screen(&self, rewards: Option<&BattleRewards>) {
        tracing::debug!(
            xp = rewards.map(|r| r.xp),
            gold = rewards.map(|r| r.gold),
            "ui: victory screen"
        );
    }

    fn show_defeat_screen(&self, report: Option<&BattleReport>) {
        tracing::debug!(enemy = report.map(|r| r.enemy_name.as_str()), "ui: defeat screen");
    }

    fn show_capture_animation(&self, item_id: &str) {
        tracing::debug!(item_id, "ui: capture animation");
    }

    fn show_game_over(&self) {
        tracing::debug!("ui: game over");
    }

    fn set_status(&self, text: &str) {
        tracing::debug!(text, "ui: status");
    }

    fn show_toast(&self, text: &str) {
        tracing::debug!(text, "ui: toast");
    }
}

/// One recorded presentation request
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ShowBattleHud,
    HideBattleHud,
    VictoryScreen(Option<BattleRewards>),
    DefeatScreen(Option<BattleReport>),
    CaptureAnimation(String),
    GameOver,
    Status(String),
    Toast(String),
    Overworld,
    ShowDialogue(String),
    HideDialogue,
    ShowInventory { in_battle: bool },
    HideInventory,
    ShowTraining,
    TrainingProgress { done: u32, total: u32 },
    HideTraining,
}

/// Bridge that keeps every request in order, for tests and replays
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: UiEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn toasts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Toast(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, event: &UiEvent) -> bool {
        self.events().contains(event)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl UiBridge for RecordingUi {
    fn show_battle_hud(&self) {
        self.push(UiEvent::ShowBattleHud);
    }

    fn hide_battle_hud(&self) {
        self.push(UiEvent::HideBattleHud);
    }

    fn show_victory_screen(&self, rewards: Option<&BattleRewards>) {
        self.push(UiEvent::VictoryScreen(rewards.cloned()));
    }

    fn show_defeat_screen(&self, report: Option<&BattleReport>) {
        self.push(UiEvent::DefeatScreen(report.cloned()));
    }

    fn show_capture_animation(&self, item_id: &str) {
        self.push(UiEvent::CaptureAnimation(item_id.to_string()));
    }

    fn show_game_over(&self) {
        self.push(UiEvent::GameOver);
    }

    fn set_status(&self, text: &str) {
        self.push(UiEvent::Status(text.to_string()));
    }

    fn show_toast(&self, text: &str) {
        self.push(UiEvent::Toast(text.to_string()));
    }

    fn show_overworld(&self) {
        self.push(UiEvent::Overworld);
    }

    fn show_dialogue(&self, npc_id: &str) {
        self.push(UiEvent::ShowDialogue(npc_id.to_string()));
    }

    fn hide_dialogue(&self) {
        self.push(UiEvent::HideDialogue);
    }

    fn show_inventory(&self, in_battle: bool) {
        self.push(UiEvent::ShowInventory { in_battle });
    }

    fn hide_inventory(&self) {
        self.push(UiEvent::HideInventory);
    }

    fn show_training_screen(&self) {
        self.push(UiEvent::ShowTraining);
    }

    fn show_training_progress(&self, done: u32, total: u32) {
        self.push(UiEvent::TrainingProgress { done, total });
    }

    fn hide_training_screen(&self) {
        self.push(UiEvent::HideTraining);
    }
}
