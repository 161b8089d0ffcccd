//! Game-state service: roster, inventory, encounter slot, profile and flags.
//!
//! States only touch shared game data through [`GameService`]. The
//! in-memory [`GameSession`] is the implementation used by the machine
//! and its tests; persistence lives outside this crate.

use std::collections::{BTreeMap, HashMap};

use arena_battle::items::battle_item;
use arena_battle::{attempt_capture, CaptureDevice, Creature, CreatureId, ItemUse};
use arena_protocol::{CaptureResult, CapturingRequest};
use rand::RngCore;

use crate::error::ServiceError;

/// Capture modifier for a named environment
pub fn environment_modifier_for(name: &str) -> f64 {
    match name {
        "research_lab" => 1.2,
        "wild_zone" => 0.9,
        _ => 1.0,
    }
}

pub trait GameService: Send {
    // === Roster ===

    /// The player's active creature
    fn current_creature(&self) -> Option<&Creature>;
    fn current_creature_mut(&mut self) -> Option<&mut Creature>;
    fn set_current_creature(&mut self, id: CreatureId) -> Result<(), ServiceError>;
    fn creature(&self, id: CreatureId) -> Option<&Creature>;
    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature>;
    fn roster(&self) -> &[Creature];
    fn add_to_roster(&mut self, creature: Creature) -> Result<(), ServiceError>;
    fn remove_from_roster(&mut self, id: CreatureId) -> Result<Creature, ServiceError>;
    /// Allocate an id no roster member or encounter uses
    fn next_creature_id(&mut self) -> CreatureId;
    /// Revive every fainted roster member, returns how many were revived
    fn revive_roster(&mut self) -> usize;

    // === Encounter ===

    fn encounter(&self) -> Option<&Creature>;
    /// Replace the encounter slot, returning the previous occupant
    fn set_encounter(&mut self, creature: Option<Creature>) -> Option<Creature>;
    /// Clear the slot if it still holds `id`
    fn mark_encounter_resolved(&mut self, id: CreatureId) -> bool;

    // === Items ===

    fn item_count(&self, item_id: &str) -> u32;
    /// Capture devices the player holds at least one of
    fn capture_devices(&self) -> Vec<CaptureDevice>;
    /// Device definition for an item id, whether or not any are held
    fn capture_device(&self, item_id: &str) -> Option<CaptureDevice>;
    fn can_use_item(
        &self,
        item_id: &str,
        actor: Option<CreatureId>,
        in_battle: bool,
    ) -> Result<(), ServiceError>;
    fn consume_item(&mut self, item_id: &str, count: u32) -> Result<(), ServiceError>;
    /// Validate, consume and apply a battle item to a roster creature
    fn use_item(&mut self, item_id: &str, target: Option<CreatureId>) -> Result<ItemUse, ServiceError>;

    // === Profile and flags ===

    fn player_level(&self) -> u32;
    fn apply_rewards(&mut self, xp: u32, gold: u32) -> Result<(), ServiceError>;
    fn set_flag(&mut self, key: &str, value: &str);
    fn flag(&self, key: &str) -> Option<&str>;
    fn clear_flag(&mut self, key: &str) -> Option<String>;
    fn current_npc_id(&self) -> Option<&str>;
    fn environment_modifier(&self) -> f64;

    /// Run the capture engine against the encounter. On success the
    /// creature is moved out of the slot into the result.
    fn attempt_capture(
        &mut self,
        request: &CapturingRequest,
        rng: &mut dyn RngCore,
    ) -> Result<CaptureResult, ServiceError>;
}

/// Player profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    pub level: u32,
    pub experience: u32,
    pub gold: u32,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
            experience: 0,
            gold: 0,
        }
    }

    /// Experience needed for the next player level
    pub fn experience_to_next(&self) -> u32 {
        self.level.saturating_mul(100)
    }

    /// Returns the number of levels gained
    pub fn gain_experience(&mut self, xp: u32) -> u32 {
        self.experience = self.experience.saturating_add(xp);
        let mut gained = 0;
        while self.experience >= self.experience_to_next() {
            self.experience -= self.experience_to_next();
            self.level = self.level.saturating_add(1);
            gained += 1;
            if self.level == u32::MAX {
                break;
            }
        }
        gained
    }
}

/// In-memory game session
#[derive(Debug, Clone)]
pub struct GameSession {
    profile: PlayerProfile,
    roster: Vec<Creature>,
    active: Option<CreatureId>,
    encounter: Option<Creature>,
    inventory: BTreeMap<String, u32>,
    devices: HashMap<String, CaptureDevice>,
    flags: HashMap<String, String>,
    current_npc: Option<String>,
    environment_modifier: f64,
    next_id: u64,
}

impl GameSession {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            profile: PlayerProfile::new(player_name),
            roster: Vec::new(),
            active: None,
            encounter: None,
            inventory: BTreeMap::new(),
            devices: CaptureDevice::presets()
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
            flags: HashMap::new(),
            current_npc: None,
            environment_modifier: 1.0,
            next_id: 1,
        }
    }

    /// Add a roster creature; the first one becomes active
    pub fn with_creature(mut self, creature: Creature) -> Self {
        self.insert_creature(creature);
        self
    }

    pub fn with_item(mut self, item_id: impl Into<String>, count: u32) -> Self {
        self.add_item(item_id, count);
        self
    }

    pub fn with_encounter(mut self, creature: Creature) -> Self {
        self.bump_next_id(creature.id);
        self.encounter = Some(creature);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.profile.level = level.max(1);
        self
    }

    pub fn with_environment(mut self, name: &str) -> Self {
        self.environment_modifier = environment_modifier_for(name);
        self
    }

    /// Register a non-preset capture device
    pub fn with_device(mut self, device: CaptureDevice) -> Self {
        self.devices.insert(device.id.clone(), device);
        self
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn add_item(&mut self, item_id: impl Into<String>, count: u32) {
        *self.inventory.entry(item_id.into()).or_insert(0) += count;
    }

    pub fn set_current_npc(&mut self, npc_id: Option<String>) {
        self.current_npc = npc_id;
    }

    pub fn set_environment_modifier(&mut self, modifier: f64) {
        self.environment_modifier = modifier;
    }

    fn insert_creature(&mut self, mut creature: Creature) {
        creature.owned = true;
        self.bump_next_id(creature.id);
        if self.active.is_none() {
            self.active = Some(creature.id);
        }
        self.roster.push(creature);
    }

    fn bump_next_id(&mut self, id: CreatureId) {
        self.next_id = self.next_id.max(id.0.saturating_add(1));
    }

    fn device(&self, item_id: &str) -> Option<&CaptureDevice> {
        self.devices.get(item_id)
    }

    fn reject(reason: impl Into<String>) -> Result<(), ServiceError> {
        Err(ServiceError::ItemRejected(reason.into()))
    }
}

impl GameService for GameSession {
    fn current_creature(&self) -> Option<&Creature> {
        let id = self.active?;
        self.creature(id)
    }

    fn current_creature_mut(&mut self) -> Option<&mut Creature> {
        let id = self.active?;
        self.creature_mut(id)
    }

    fn set_current_creature(&mut self, id: CreatureId) -> Result<(), ServiceError> {
        if self.creature(id).is_none() {
            return Err(ServiceError::UnknownCreature(id));
        }
        self.active = Some(id);
        Ok(())
    }

    fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.roster.iter().find(|c| c.id == id)
    }

    fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.roster.iter_mut().find(|c| c.id == id)
    }

    fn roster(&self) -> &[Creature] {
        &self.roster
    }

    fn add_to_roster(&mut self, creature: Creature) -> Result<(), ServiceError> {
        if self.creature(creature.id).is_some() {
            return Err(ServiceError::DuplicateCreature(creature.id));
        }
        self.insert_creature(creature);
        Ok(())
    }

    fn remove_from_roster(&mut self, id: CreatureId) -> Result<Creature, ServiceError> {
        let index = self
            .roster
            .iter()
            .position(|c| c.id == id)
            .ok_or(ServiceError::UnknownCreature(id))?;
        let removed = self.roster.remove(index);
        if self.active == Some(id) {
            self.active = self.roster.first().map(|c| c.id);
        }
        Ok(removed)
    }

    fn next_creature_id(&mut self) -> CreatureId {
        let id = CreatureId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn revive_roster(&mut self) -> usize {
        self.roster.iter_mut().map(|c| c.revive()).filter(|revived| *revived).count()
    }

    fn encounter(&self) -> Option<&Creature> {
        self.encounter.as_ref()
    }

    fn set_encounter(&mut self, creature: Option<Creature>) -> Option<Creature> {
        if let Some(c) = &creature {
            self.bump_next_id(c.id);
        }
        std::mem::replace(&mut self.encounter, creature)
    }

    fn mark_encounter_resolved(&mut self, id: CreatureId) -> bool {
        match &self.encounter {
            Some(c) if c.id == id => {
                self.encounter = None;
                true
            }
            _ => false,
        }
    }

    fn item_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    fn capture_devices(&self) -> Vec<CaptureDevice> {
        self.inventory
            .iter()
            .filter(|(_, count)| **count > 0)
            .filter_map(|(id, _)| self.device(id).cloned())
            .collect()
    }

    fn capture_device(&self, item_id: &str) -> Option<CaptureDevice> {
        self.device(item_id).cloned()
    }

    fn can_use_item(
        &self,
        item_id: &str,
        actor: Option<CreatureId>,
        in_battle: bool,
    ) -> Result<(), ServiceError> {
        if self.item_count(item_id) == 0 {
            return Self::reject(format!("You don't have any {item_id}."));
        }
        if let Some(id) = actor {
            if self.creature(id).is_none() {
                return Self::reject("Target creature not found in your roster.");
            }
        }

        if self.device(item_id).is_some() {
            if !in_battle {
                return Self::reject("Capture items can only be used during battle.");
            }
            return match &self.encounter {
                None => Self::reject("No wild creature to capture."),
                Some(wild) if wild.owned => Self::reject("You already own this creature."),
                Some(_) => Ok(()),
            };
        }

        let item = battle_item(item_id).ok_or_else(|| ServiceError::UnknownItem(item_id.to_string()))?;
        let target = match actor {
            Some(id) => self.creature(id),
            None => self.current_creature(),
        };
        let Some(target) = target else {
            return Self::reject("No creature to use it on.");
        };
        match item.id() {
            "health_kit" if target.health() == target.max_health() => {
                Self::reject(format!("{} is already at full health.", target.name))
            }
            "health_kit" if target.is_fainted() => {
                Self::reject(format!("{} is disabled and can't be healed.", target.name))
            }
            "energy_cell" if target.energy() == target.max_energy() => {
                Self::reject(format!("{} is already fully charged.", target.name))
            }
            "repair_kit" if !target.is_fainted() && !target.is_broken() => {
                Self::reject(format!("{} doesn't need repairs.", target.name))
            }
            "antidote" if target.effects.is_empty() => {
                Self::reject(format!("{} has no status effects.", target.name))
            }
            _ => Ok(()),
        }
    }

    fn consume_item(&mut self, item_id: &str, count: u32) -> Result<(), ServiceError> {
        let available = self.item_count(item_id);
        if available < count {
            return Err(ServiceError::OutOfStock {
                item_id: item_id.to_string(),
                requested: count,
                available,
            });
        }
        let remaining = available - count;
        if remaining == 0 {
            self.inventory.remove(item_id);
        } else {
            self.inventory.insert(item_id.to_string(), remaining);
        }
        Ok(())
    }

    fn use_item(&mut self, item_id: &str, target: Option<CreatureId>) -> Result<ItemUse, ServiceError> {
        self.can_use_item(item_id, target, false)?;
        let item = battle_item(item_id).ok_or_else(|| ServiceError::UnknownItem(item_id.to_string()))?;
        let id = target
            .or(self.active)
            .ok_or_else(|| ServiceError::ItemRejected("No creature to use it on.".to_string()))?;
        self.consume_item(item_id, 1)?;
        let creature = self.creature_mut(id).ok_or(ServiceError::UnknownCreature(id))?;
        Ok(item.use_on(creature))
    }

    fn player_level(&self) -> u32 {
        self.profile.level
    }

    fn apply_rewards(&mut self, xp: u32, gold: u32) -> Result<(), ServiceError> {
        self.profile.gain_experience(xp);
        self.profile.gold = self.profile.gold.saturating_add(gold);
        Ok(())
    }

    fn set_flag(&mut self, key: &str, value: &str) {
        self.flags.insert(key.to_string(), value.to_string());
    }

    fn flag(&self, key: &str) -> Option<&str> {
        self.flags.get(key).map(String::as_str)
    }

    fn clear_flag(&mut self, key: &str) -> Option<String> {
        self.flags.remove(key)
    }

    fn current_npc_id(&self) -> Option<&str> {
        self.current_npc.as_deref()
    }

    fn environment_modifier(&self) -> f64 {
        self.environment_modifier
    }

    fn attempt_capture(
        &mut self,
        request: &CapturingRequest,
        rng: &mut dyn RngCore,
    ) -> Result<CaptureResult, ServiceError> {
        let device = self
            .device(&request.item_id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownItem(request.item_id.clone()))?;
        let player_level = self.profile.level;
        let environment = self.environment_modifier;

        let wild = self.encounter.as_mut().ok_or(ServiceError::NoEncounter)?;
        if let Some(target) = request.target_id {
            if wild.id != target {
                return Err(ServiceError::UnknownCreature(target));
            }
        }
        let target_id = wild.id;
        let roll = attempt_capture(
            wild,
            &device,
            player_level,
            environment,
            request.forced_chance,
            rng,
        );

        let captured = if roll.success { self.encounter.take() } else { None };
        Ok(CaptureResult {
            success: roll.success,
            captured,
            log: vec![roll.message],
            item_id: request.item_id.clone(),
            target_id: Some(target_id),
            chance: roll.chance,
            shake_count: roll.shake_count,
        })
    }
}
