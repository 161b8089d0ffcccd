//! Named moves and per-battle move bookkeeping

use std::collections::HashMap;

use super::element::Element;
use super::status::StatusKind;

/// A named attack a creature can use instead of its basic strike.
///
/// `power` is added to the attacker's doubled attack before defense is
/// subtracted. `accuracy` and `status_chance` are percentages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub id: String,
    pub name: String,
    /// Element of the hit; `None` uses the attacker's own element
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Option<Element>,
    pub power: u32,
    pub accuracy: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub energy_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<StatusKind>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_chance: u8,
    /// Limit on uses within one encounter
    #[cfg_attr(feature = "serde", serde(default))]
    pub uses_per_battle: Option<u32>,
    /// Move id that must have been the user's previous move
    #[cfg_attr(feature = "serde", serde(default))]
    pub combo_after: Option<String>,
}

impl Move {
    pub fn new(id: impl Into<String>, name: impl Into<String>, power: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            element: None,
            power,
            accuracy: 100,
            energy_cost: 0,
            status: None,
            status_chance: 0,
            uses_per_battle: None,
            combo_after: None,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_accuracy(mut self, accuracy: u8) -> Self {
        self.accuracy = accuracy.min(100);
        self
    }

    pub fn with_energy_cost(mut self, energy_cost: u32) -> Self {
        self.energy_cost = energy_cost;
        self
    }

    pub fn with_status(mut self, status: StatusKind, chance: u8) -> Self {
        self.status = Some(status);
        self.status_chance = chance.min(100);
        self
    }

    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses_per_battle = Some(uses);
        self
    }

    pub fn with_combo_after(mut self, id: impl Into<String>) -> Self {
        self.combo_after = Some(id.into());
        self
    }

    // === Presets ===

    pub fn jab() -> Self {
        Move::new("jab", "Jab", 6).with_accuracy(90)
    }

    pub fn static_jolt() -> Self {
        Move::new("static_jolt", "Static Jolt", 12)
            .with_element(Element::Electric)
            .with_energy_cost(10)
            .with_status(StatusKind::Paralysis, 30)
    }

    pub fn flame_burst() -> Self {
        Move::new("flame_burst", "Flame Burst", 15)
            .with_element(Element::Fire)
            .with_accuracy(95)
            .with_energy_cost(15)
            .with_status(StatusKind::Burn, 20)
    }

    pub fn toxic_spray() -> Self {
        Move::new("toxic_spray", "Toxic Spray", 4)
            .with_accuracy(85)
            .with_energy_cost(10)
            .with_status(StatusKind::Poison, 60)
    }

    pub fn frost_lock() -> Self {
        Move::new("frost_lock", "Frost Lock", 10)
            .with_element(Element::Ice)
            .with_accuracy(80)
            .with_energy_cost(20)
            .with_status(StatusKind::Freeze, 25)
            .with_uses(2)
    }

    /// Finisher that only follows a Jab
    pub fn overdrive() -> Self {
        Move::new("overdrive", "Overdrive", 30)
            .with_energy_cost(25)
            .with_uses(1)
            .with_combo_after("jab")
    }
}

/// Turns a status inflicted by a move lasts
pub fn status_duration(kind: StatusKind) -> u32 {
    match kind {
        StatusKind::Paralysis => 4,
        StatusKind::Poison | StatusKind::Burn => 3,
        StatusKind::Freeze => 2,
        StatusKind::Stun => 1,
        _ => 2,
    }
}

/// Why a move cannot be used right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveBlock {
    NotEnoughEnergy { needed: u32 },
    OutOfUses,
    ComboNotReady { after: String },
}

impl std::fmt::Display for MoveBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveBlock::NotEnoughEnergy { needed } => write!(f, "needs {needed} energy"),
            MoveBlock::OutOfUses => write!(f, "can't be used again this battle"),
            MoveBlock::ComboNotReady { after } => write!(f, "must follow {after}"),
        }
    }
}

/// Uses and the previous move of one combatant within an encounter
#[derive(Debug, Clone, Default)]
pub struct MoveTracker {
    uses: HashMap<String, u32>,
    last: Option<String>,
}

impl MoveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, mv: &Move, energy: u32) -> Result<(), MoveBlock> {
        if energy < mv.energy_cost {
            return Err(MoveBlock::NotEnoughEnergy { needed: mv.energy_cost });
        }
        if let Some(limit) = mv.uses_per_battle {
            if self.uses(&mv.id) >= limit {
                return Err(MoveBlock::OutOfUses);
            }
        }
        if let Some(after) = &mv.combo_after {
            if self.last.as_deref() != Some(after.as_str()) {
                return Err(MoveBlock::ComboNotReady { after: after.clone() });
            }
        }
        Ok(())
    }

    /// Note that `id` was used; `None` records a basic strike
    pub fn record(&mut self, id: Option<&str>) {
        if let Some(id) = id {
            *self.uses.entry(id.to_string()).or_insert(0) += 1;
        }
        self.last = id.map(str::to_string);
    }

    pub fn uses(&self, id: &str) -> u32 {
        self.uses.get(id).copied().unwrap_or(0)
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}
