//! Rewards, training and fusion

use rand::Rng;

use crate::types::{Creature, CreatureId, Stat};

/// Experience for beating an enemy: `max(5, level*10)` plus a bonus of
/// 5 per level the enemy had over the player
pub fn battle_xp(enemy_level: u32, player_level: u32) -> u32 {
    let base = enemy_level.saturating_mul(10).max(5);
    let underdog = enemy_level.saturating_sub(player_level).saturating_mul(5);
    base.saturating_add(underdog)
}

/// Gold for beating an enemy: `max(2, level*5)`
pub fn battle_gold(enemy_level: u32) -> u32 {
    enemy_level.saturating_mul(5).max(2)
}

/// Experience for a successful capture: `max(5, level*5)`
pub fn capture_xp(level: u32) -> u32 {
    level.saturating_mul(5).max(5)
}

/// Experience granted per training session
pub const TRAINING_XP: u32 = 10;

/// Upper bound on sessions in one training run
pub const MAX_TRAINING_SESSIONS: u32 = 20;

/// Which stat a training session works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrainingMode {
    Attack,
    Defense,
    Speed,
}

impl TrainingMode {
    pub const ALL: [TrainingMode; 3] = [TrainingMode::Attack, TrainingMode::Defense, TrainingMode::Speed];

    pub fn stat(&self) -> Stat {
        match self {
            TrainingMode::Attack => Stat::Atk,
            TrainingMode::Defense => Stat::Def,
            TrainingMode::Speed => Stat::Spe,
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "attack" | "strength" => Some(TrainingMode::Attack),
            "defense" => Some(TrainingMode::Defense),
            "speed" | "agility" => Some(TrainingMode::Speed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::Attack => "Attack",
            TrainingMode::Defense => "Defense",
            TrainingMode::Speed => "Speed",
        }
    }
}

impl std::fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a run of training sessions did to a creature
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingOutcome {
    pub stat_gain: u32,
    pub xp_gained: u32,
    pub levels_gained: u32,
    pub logs: Vec<String>,
}

/// Run `sessions` training sessions, clamped to `1..=MAX_TRAINING_SESSIONS`.
/// Each adds 1-3 points to the trained stat and [`TRAINING_XP`] experience.
pub fn train<R: Rng + ?Sized>(
    creature: &mut Creature,
    mode: TrainingMode,
    sessions: u32,
    rng: &mut R,
) -> TrainingOutcome {
    let sessions = sessions.clamp(1, MAX_TRAINING_SESSIONS);
    let mut logs = Vec::new();
    let mut stat_gain: u32 = 0;
    for _ in 0..sessions {
        let pick: f64 = rng.r#gen();
        let gain = 1 + ((pick * 3.0) as u32).min(2);
        let stat = match mode {
            TrainingMode::Attack => &mut creature.attack,
            TrainingMode::Defense => &mut creature.defense,
            TrainingMode::Speed => &mut creature.speed,
        };
        *stat = stat.saturating_add(gain);
        stat_gain = stat_gain.saturating_add(gain);
        logs.push(format!("{} trained {}, gained {} points!", creature.name, mode, gain));
    }
    let xp_gained = TRAINING_XP * sessions;
    let levels_gained = creature.gain_experience(xp_gained);
    if levels_gained > 0 {
        logs.push(format!("{} grew to level {}!", creature.name, creature.level));
    }
    TrainingOutcome {
        stat_gain,
        xp_gained,
        levels_gained,
        logs,
    }
}

/// Combine two distinct creatures into a new one.
///
/// Attack, defense, speed and max health are averaged, the element comes
/// from the higher-level parent (the first on a tie) and the level is one
/// above the higher parent. Returns `None` when both parents are the same
/// creature.
pub fn fuse(a: &Creature, b: &Creature, id: CreatureId) -> Option<Creature> {
    if a.id == b.id {
        return None;
    }
    let element = if b.level > a.level { b.element } else { a.element };
    let level = a.level.max(b.level).saturating_add(1);
    let fused = Creature::new(id, format!("{}-{} Fusion", a.name, b.name), element, level)
        .with_max_health(average(a.max_health(), b.max_health()))
        .with_attack(average(a.attack, b.attack))
        .with_defense(average(a.defense, b.defense))
        .with_speed(average(a.speed, b.speed))
        .with_crit_chance((a.crit_chance + b.crit_chance) / 2.0)
        .with_owned(a.owned || b.owned);
    Some(fused)
}

fn average(a: u32, b: u32) -> u32 {
    ((u64::from(a) + u64::from(b)) / 2) as u32
}
