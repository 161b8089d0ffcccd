//! Capture devices and battle items

use crate::types::Creature;

/// Device families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceKind {
    Net,
    Emp,
    Stasis,
    Master,
    Cryo,
    Magnetic,
}

/// A capture device. `effectiveness` multiplies the capture chance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureDevice {
    pub id: String,
    pub name: String,
    pub effectiveness: f64,
    pub kind: DeviceKind,
    pub cost: u32,
}

impl CaptureDevice {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        effectiveness: f64,
        kind: DeviceKind,
        cost: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            effectiveness: effectiveness.max(0.0),
            kind,
            cost,
        }
    }

    pub fn basic_net() -> Self {
        Self::new("basic_net", "Basic Net", 1.0, DeviceKind::Net, 50)
    }

    pub fn reinforced_net() -> Self {
        Self::new("reinforced_net", "Reinforced Net", 1.3, DeviceKind::Net, 120)
    }

    pub fn emp_cage() -> Self {
        Self::new("emp_cage", "EMP Cage", 1.5, DeviceKind::Emp, 200)
    }

    pub fn stasis_pod() -> Self {
        Self::new("stasis_pod", "Stasis Pod", 2.0, DeviceKind::Stasis, 500)
    }

    pub fn master_trap() -> Self {
        Self::new("master_trap", "Master Trap", 2.5, DeviceKind::Master, 1000)
    }

    pub fn cryo_trap() -> Self {
        Self::new("cryo_trap", "Cryo Trap", 1.4, DeviceKind::Cryo, 300)
    }

    pub fn magnetic_trap() -> Self {
        Self::new("magnetic_trap", "Magnetic Trap", 1.6, DeviceKind::Magnetic, 350)
    }

    /// Every built-in device
    pub fn presets() -> Vec<Self> {
        vec![
            Self::basic_net(),
            Self::reinforced_net(),
            Self::emp_cage(),
            Self::stasis_pod(),
            Self::master_trap(),
            Self::cryo_trap(),
            Self::magnetic_trap(),
        ]
    }

    /// Look up a built-in device by id
    pub fn preset(id: &str) -> Option<Self> {
        Self::presets().into_iter().find(|d| d.id == id)
    }
}

/// The device with the highest effectiveness
pub fn recommended_device(devices: &[CaptureDevice]) -> Option<&CaptureDevice> {
    devices
        .iter()
        .max_by(|a, b| a.effectiveness.total_cmp(&b.effectiveness))
}

/// Outcome of using an item on a creature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUse {
    pub success: bool,
    pub message: String,
}

impl ItemUse {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// An item that can be used on a creature during or outside battle
pub trait BattleItem {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn use_on(&self, target: &mut Creature) -> ItemUse;
}

/// Restores health. `amount = None` heals a third of max health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthKit {
    pub amount: Option<u32>,
}

impl BattleItem for HealthKit {
    fn id(&self) -> &str {
        "health_kit"
    }

    fn name(&self) -> &str {
        "Health Kit"
    }

    fn use_on(&self, target: &mut Creature) -> ItemUse {
        if target.is_fainted() {
            return ItemUse::failed(format!("{} is disabled and can't be healed.", target.name));
        }
        if target.health() == target.max_health() {
            return ItemUse::failed(format!("{} is already at full health.", target.name));
        }
        let amount = self.amount.unwrap_or(target.max_health() / 3).max(1);
        let restored = target.heal(amount);
        ItemUse::ok(format!("{} recovered {} health.", target.name, restored))
    }
}

/// Restores energy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyCell {
    pub amount: u32,
}

impl Default for EnergyCell {
    fn default() -> Self {
        Self { amount: 50 }
    }
}

impl BattleItem for EnergyCell {
    fn id(&self) -> &str {
        "energy_cell"
    }

    fn name(&self) -> &str {
        "Energy Cell"
    }

    fn use_on(&self, target: &mut Creature) -> ItemUse {
        if target.energy() == target.max_energy() {
            return ItemUse::failed(format!("{} is already fully charged.", target.name));
        }
        let restored = target.restore_energy(self.amount);
        ItemUse::ok(format!("{} restored {} energy.", target.name, restored))
    }
}

/// Fixes a disabled or exhausted creature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairKit;

impl BattleItem for RepairKit {
    fn id(&self) -> &str {
        "repair_kit"
    }

    fn name(&self) -> &str {
        "Repair Kit"
    }

    fn use_on(&self, target: &mut Creature) -> ItemUse {
        if target.repair() {
            ItemUse::ok(format!("{} has been repaired.", target.name))
        } else {
            ItemUse::failed(format!("{} doesn't need repairs.", target.name))
        }
    }
}

/// Removes every status effect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Antidote;

impl BattleItem for Antidote {
    fn id(&self) -> &str {
        "antidote"
    }

    fn name(&self) -> &str {
        "Antidote"
    }

    fn use_on(&self, target: &mut Creature) -> ItemUse {
        if target.effects.is_empty() {
            return ItemUse::failed(format!("{} has no status effects.", target.name));
        }
        target.cleanse();
        ItemUse::ok(format!("{} was cleansed.", target.name))
    }
}

/// Look up a built-in battle item by id
pub fn battle_item(id: &str) -> Option<Box<dyn BattleItem + Send + Sync>> {
    match id {
        "health_kit" => Some(Box::new(HealthKit { amount: None })),
        "energy_cell" => Some(Box::new(EnergyCell::default())),
        "repair_kit" => Some(Box::new(RepairKit)),
        "antidote" => Some(Box::new(Antidote)),
        _ => None,
    }
}
