//! Creature state types

use super::element::Element;
use super::moves::Move;
use super::stats::{Stat, StatStages};
use super::status::{StatusEffect, StatusEffects, StatusKind};

/// Stable identity of a creature across rosters and encounters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureId(pub u64);

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse condition shown next to a creature's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Ready,
    /// Energy ran out; cannot act until energy is restored
    Exhausted,
    /// Health reached zero; cannot act or be healed until revived
    Disabled,
}

/// A combatant, either player-owned or wild.
///
/// Health is stored as damage taken against the maximum so it can never
/// leave `[0, max_health]`, and `max_health` is always at least 1.
/// Deserialized values are normalized into the same bounds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "CreatureRecord")
)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    pub element: Element,
    pub level: u32,
    pub experience: u32,

    // === Base stats ===
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub luck: u32,
    /// Critical-hit chance in percent (0-100)
    pub crit_chance: f64,

    // === Combat state ===
    pub stages: StatStages,
    pub effects: StatusEffects,

    /// Whether the creature belongs to the player
    pub owned: bool,
    /// Named moves; an empty list fights with the basic strike
    pub moves: Vec<Move>,

    max_health: u32,
    damage_taken: u32,
    max_energy: u32,
    energy: u32,
    fainted: bool,
    broken: bool,
}

impl Creature {
    /// Create a creature with default stats
    pub fn new(id: CreatureId, name: impl Into<String>, element: Element, level: u32) -> Self {
        Self {
            id,
            name: name.into(),
            element,
            level: level.max(1),
            experience: 0,
            attack: 10,
            defense: 10,
            speed: 10,
            luck: 5,
            crit_chance: 5.0,
            stages: StatStages::new(),
            effects: StatusEffects::new(),
            owned: false,
            moves: Vec::new(),
            max_health: 100,
            damage_taken: 0,
            max_energy: 100,
            energy: 100,
            fainted: false,
            broken: false,
        }
    }

    pub fn with_max_health(mut self, max_health: u32) -> Self {
        self.set_max_health(max_health);
        self.damage_taken = 0;
        self
    }

    pub fn with_attack(mut self, attack: u32) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_defense(mut self, defense: u32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_crit_chance(mut self, crit_chance: f64) -> Self {
        self.crit_chance = crit_chance.clamp(0.0, 100.0);
        self
    }

    pub fn with_max_energy(mut self, max_energy: u32) -> Self {
        self.max_energy = max_energy;
        self.energy = max_energy;
        self.broken = false;
        self
    }

    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = owned;
        self
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.moves = moves;
        self
    }

    // === Health ===

    pub fn health(&self) -> u32 {
        self.max_health - self.damage_taken
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Change maximum health (minimum 1), keeping damage within the new bound
    pub fn set_max_health(&mut self, max_health: u32) {
        self.max_health = max_health.max(1);
        self.damage_taken = self.damage_taken.min(self.max_health);
    }

    /// Set current health directly, clamped to `[0, max_health]`.
    /// Reaching 0 faints the creature; a positive value revives it.
    pub fn set_health(&mut self, health: u32) {
        let health = health.min(self.max_health);
        self.damage_taken = self.max_health - health;
        self.fainted = health == 0;
    }

    /// Health as a fraction of the maximum in `[0, 1]`
    pub fn health_fraction(&self) -> f64 {
        self.health() as f64 / self.max_health as f64
    }

    /// Get HP as percentage (0-100)
    pub fn hp_percent(&self) -> u32 {
        (u64::from(self.health()) * 100 / u64::from(self.max_health)) as u32
    }

    /// Apply damage, returns the amount actually removed
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.health());
        self.damage_taken += applied;
        if self.health() == 0 {
            self.fainted = true;
        }
        applied
    }

    /// Restore health up to the maximum, returns the amount restored.
    /// A fainted creature cannot be healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.fainted {
            return 0;
        }
        let restored = amount.min(self.damage_taken);
        self.damage_taken -= restored;
        restored
    }

    /// Bring a fainted creature back at half health
    pub fn revive(&mut self) -> bool {
        if !self.fainted {
            return false;
        }
        self.set_health((self.max_health / 2).max(1));
        true
    }

    /// Fix a disabled or exhausted creature: revives a fainted one and
    /// refills half of the energy of a broken one
    pub fn repair(&mut self) -> bool {
        let revived = self.revive();
        let mut restored = false;
        if self.broken {
            self.energy = (self.max_energy / 2).max(1);
            self.broken = false;
            restored = true;
        }
        revived || restored
    }

    // === Energy ===

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    /// Spend energy, floored at 0. Running dry marks the creature broken.
    pub fn use_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_sub(amount);
        if self.energy == 0 {
            self.broken = true;
        }
    }

    /// Restore energy up to the maximum, returns the amount restored
    pub fn restore_energy(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_energy - self.energy);
        self.energy += restored;
        if self.energy > 0 {
            self.broken = false;
        }
        restored
    }

    // === Flags ===

    pub fn is_fainted(&self) -> bool {
        self.fainted
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn is_alive(&self) -> bool {
        !self.fainted
    }

    /// Whether the creature may take an action this turn
    pub fn can_act(&self) -> bool {
        !self.fainted && !self.broken && !self.effects.iter().any(|e| e.kind.prevents_action())
    }

    pub fn condition(&self) -> Condition {
        if self.fainted {
            Condition::Disabled
        } else if self.broken {
            Condition::Exhausted
        } else {
            Condition::Ready
        }
    }

    // === Stages ===

    pub fn effective_attack(&self) -> u32 {
        self.stages.effective(Stat::Atk, self.attack)
    }

    pub fn effective_defense(&self) -> u32 {
        self.stages.effective(Stat::Def, self.defense)
    }

    pub fn effective_speed(&self) -> u32 {
        self.stages.effective(Stat::Spe, self.speed)
    }

    pub fn reset_stages(&mut self) {
        self.stages.clear();
    }

    // === Status effects ===

    pub fn apply_status(&mut self, effect: StatusEffect) {
        self.effects.apply(effect);
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.effects.has(kind)
    }

    pub fn get_status(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.get(kind)
    }

    pub fn tick_status(&mut self) -> Vec<StatusKind> {
        self.effects.tick()
    }

    pub fn cleanse(&mut self) {
        self.effects.cleanse();
    }

    // === Progression ===

    /// Experience needed to go from the current level to the next
    pub fn experience_to_next(&self) -> u32 {
        self.level.saturating_mul(20).saturating_add(100)
    }

    /// Add experience, levelling up as many times as it covers.
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.experience_to_next() {
            self.experience -= self.experience_to_next();
            self.level_up();
            gained += 1;
            if self.level == u32::MAX {
                break;
            }
        }
        gained
    }

    fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
        self.max_health = self.max_health.saturating_add(10);
        self.max_energy = self.max_energy.saturating_add(5);
        self.energy = self.energy.saturating_add(5).min(self.max_energy);
        self.attack = self.attack.saturating_add(2);
        self.defense = self.defense.saturating_add(1);
        self.speed = self.speed.saturating_add(1);
    }

    /// Integer average of max health, attack, defense and speed
    pub fn rarity_score(&self) -> u32 {
        let total = u64::from(self.max_health)
            + u64::from(self.attack)
            + u64::from(self.defense)
            + u64::from(self.speed);
        (total / 4) as u32
    }
}

/// Wire shape of a [`Creature`]; converted with the health and energy
/// bounds re-established
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CreatureRecord {
    id: CreatureId,
    name: String,
    element: Element,
    level: u32,
    #[serde(default)]
    experience: u32,
    attack: u32,
    defense: u32,
    speed: u32,
    luck: u32,
    crit_chance: f64,
    #[serde(default)]
    stages: StatStages,
    #[serde(default)]
    effects: StatusEffects,
    #[serde(default)]
    owned: bool,
    #[serde(default)]
    moves: Vec<Move>,
    max_health: u32,
    #[serde(default)]
    damage_taken: u32,
    max_energy: u32,
    energy: u32,
    #[serde(default)]
    broken: bool,
}

#[cfg(feature = "serde")]
impl From<CreatureRecord> for Creature {
    fn from(record: CreatureRecord) -> Self {
        let max_health = record.max_health.max(1);
        let damage_taken = record.damage_taken.min(max_health);
        let energy = record.energy.min(record.max_energy);
        let crit_chance = if record.crit_chance.is_finite() {
            record.crit_chance.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let mut stages = StatStages::new();
        for stat in Stat::ALL {
            stages.set(stat, record.stages.get(stat));
        }
        Self {
            id: record.id,
            name: record.name,
            element: record.element,
            level: record.level.max(1),
            experience: record.experience,
            attack: record.attack,
            defense: record.defense,
            speed: record.speed,
            luck: record.luck,
            crit_chance,
            stages,
            effects: record.effects,
            owned: record.owned,
            moves: record.moves,
            max_health,
            damage_taken,
            max_energy: record.max_energy,
            energy,
            fainted: damage_taken == max_health,
            broken: energy == 0 && (record.broken || record.max_energy > 0),
        }
    }
}
