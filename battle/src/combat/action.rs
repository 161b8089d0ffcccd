//! Single combat actions

use rand::Rng;

use crate::items::BattleItem;
use crate::query::{is_immune, is_not_very_effective, is_super_effective};
use crate::types::{status_duration, Creature, Element, Move, Stat, StatusEffect, StatusKind};

/// Defense stages gained by defending
const DEFEND_STAGES: i8 = 2;

/// Share of max health that Burn, Poison and Regeneration move per turn
const TURN_EFFECT_DIVISOR: u32 = 16;

/// What a creature does on its turn.
///
/// `Attack` hits the target. Every other action applies to the actor.
#[derive(Clone, Copy)]
pub enum CombatAction<'a> {
    Attack {
        /// Apply the elemental chart to the damage
        elemental: bool,
        /// Energy spent by the attacker
        energy_cost: u32,
    },
    /// A named move against the target
    UseMove(&'a Move),
    Defend,
    UseItem(&'a dyn BattleItem),
    Heal(u32),
    Repair,
}

impl CombatAction<'_> {
    /// Free elemental attack
    pub fn basic_attack() -> Self {
        CombatAction::Attack {
            elemental: true,
            energy_cost: 0,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CombatAction::Attack { .. } => "Attack",
            CombatAction::UseMove(mv) => mv.name.as_str(),
            CombatAction::Defend => "Defend",
            CombatAction::UseItem(item) => item.name(),
            CombatAction::Heal(_) => "Heal",
            CombatAction::Repair => "Repair",
        }
    }
}

impl std::fmt::Debug for CombatAction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombatAction::Attack {
                elemental,
                energy_cost,
            } => f
                .debug_struct("Attack")
                .field("elemental", elemental)
                .field("energy_cost", energy_cost)
                .finish(),
            CombatAction::UseMove(mv) => f.debug_tuple("UseMove").field(&mv.id).finish(),
            CombatAction::UseItem(item) => f.debug_tuple("UseItem").field(&item.id()).finish(),
            CombatAction::Heal(amount) => f.debug_tuple("Heal").field(amount).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Structured result of one action
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// Whether the action took effect
    pub success: bool,
    /// The actor could not move and the action was skipped
    pub skipped: bool,
    /// A move failed its accuracy roll
    pub missed: bool,
    pub damage: u32,
    pub healed: u32,
    pub critical: bool,
    /// Elemental multiplier applied to the damage (1.0 when not elemental)
    pub multiplier: f64,
    pub target_fainted: bool,
    pub actor_broken: bool,
    /// Status a move inflicted on the target
    pub status_applied: Option<StatusKind>,
    pub message: String,
}

impl ActionOutcome {
    fn new(message: String) -> Self {
        Self {
            success: true,
            skipped: false,
            missed: false,
            damage: 0,
            healed: 0,
            critical: false,
            multiplier: 1.0,
            target_fainted: false,
            actor_broken: false,
            status_applied: None,
            message,
        }
    }

    fn skipped(message: String) -> Self {
        Self {
            success: false,
            skipped: true,
            ..Self::new(message)
        }
    }
}

/// Resolve one action.
///
/// Damage is `max(1, attack*2 - defense)` on stage-adjusted stats, times the
/// elemental multiplier, doubled on a critical hit and halved against a
/// shielded target. One critical roll is drawn per attack, even when the
/// hit does nothing.
///
/// A move adds its power to the doubled attack, spends its energy up
/// front, then draws for accuracy (below 100), the critical hit and its
/// status chance, in that order.
pub fn resolve_action<R: Rng + ?Sized>(
    actor: &mut Creature,
    target: &mut Creature,
    action: &CombatAction<'_>,
    rng: &mut R,
) -> ActionOutcome {
    match action {
        CombatAction::Attack {
            elemental,
            energy_cost,
        } => attack(actor, target, *elemental, *energy_cost, rng),
        CombatAction::UseMove(mv) => use_move(actor, target, mv, rng),
        CombatAction::Defend => defend(actor),
        CombatAction::UseItem(item) => {
            let used = item.use_on(actor);
            ActionOutcome {
                success: used.success,
                ..ActionOutcome::new(used.message)
            }
        }
        CombatAction::Heal(amount) => {
            if actor.is_fainted() {
                return ActionOutcome {
                    success: false,
                    ..ActionOutcome::new(format!("{} is disabled and can't heal.", actor.name))
                };
            }
            let healed = actor.heal(*amount);
            ActionOutcome {
                healed,
                ..ActionOutcome::new(format!("{} restored {} health.", actor.name, healed))
            }
        }
        CombatAction::Repair => {
            let before = actor.health();
            if actor.repair() {
                ActionOutcome {
                    healed: actor.health() - before,
                    ..ActionOutcome::new(format!("{} has been repaired.", actor.name))
                }
            } else {
                ActionOutcome {
                    success: false,
                    ..ActionOutcome::new(format!("{} doesn't need repairs.", actor.name))
                }
            }
        }
    }
}

fn blocked_message(actor: &Creature) -> String {
    if actor.is_fainted() {
        return format!("{} is disabled and can't act.", actor.name);
    }
    if actor.is_broken() {
        return format!("{} is exhausted and can't act.", actor.name);
    }
    let kind = actor
        .effects
        .iter()
        .find(|e| e.kind.prevents_action())
        .map(|e| e.kind.as_str())
        .unwrap_or("stuck");
    format!("{} is affected by {} and can't move!", actor.name, kind)
}

struct Hit {
    dealt: u32,
    multiplier: f64,
    critical: bool,
}

/// Damage the target. `element` is the element of the hit, `None` for a
/// non-elemental one.
fn land_hit<R: Rng + ?Sized>(
    actor: &Creature,
    target: &mut Creature,
    power: u32,
    element: Option<Element>,
    rng: &mut R,
) -> Hit {
    let attack = i64::from(actor.effective_attack());
    let defense = i64::from(target.effective_defense());
    let base = (attack * 2 + i64::from(power) - defense).max(1) as f64;

    let multiplier = match element {
        Some(element) => element.effectiveness(target.element),
        None => 1.0,
    };

    let crit_roll: f64 = rng.r#gen();
    let critical_roll = crit_roll < actor.crit_chance / 100.0;

    let mut damage = if multiplier <= 0.0 {
        0
    } else {
        ((base * multiplier).floor() as u32).max(1)
    };
    let critical = critical_roll && damage > 0;
    if critical {
        damage = damage.saturating_mul(2);
    }
    if damage > 0 && target.has_status(StatusKind::Shielded) {
        damage = (damage / 2).max(1);
    }

    Hit {
        dealt: target.take_damage(damage),
        multiplier,
        critical,
    }
}

fn describe_hit(message: &mut String, hit: &Hit, attacker: Option<Element>, target: &Creature) {
    if hit.critical {
        message.push_str(" Critical hit!");
    }
    if let Some(attacker) = attacker {
        if is_immune(attacker, target.element) {
            message.push_str(" It had no effect...");
        } else if is_super_effective(attacker, target.element) {
            message.push_str(" It's super effective!");
        } else if is_not_very_effective(attacker, target.element) {
            message.push_str(" It's not very effective...");
        }
    }
}

fn attack<R: Rng + ?Sized>(
    actor: &mut Creature,
    target: &mut Creature,
    elemental: bool,
    energy_cost: u32,
    rng: &mut R,
) -> ActionOutcome {
    if !actor.can_act() {
        return ActionOutcome::skipped(blocked_message(actor));
    }

    let element = elemental.then_some(actor.element);
    let hit = land_hit(actor, target, 0, element, rng);
    if energy_cost > 0 {
        actor.use_energy(energy_cost);
    }

    let mut message = format!(
        "{} attacks {} for {} damage.",
        actor.name, target.name, hit.dealt
    );
    describe_hit(&mut message, &hit, element, target);
    if target.is_fainted() {
        message.push_str(&format!(" {} is disabled!", target.name));
    }

    ActionOutcome {
        damage: hit.dealt,
        critical: hit.critical,
        multiplier: hit.multiplier,
        target_fainted: target.is_fainted(),
        actor_broken: actor.is_broken(),
        ..ActionOutcome::new(message)
    }
}

fn use_move<R: Rng + ?Sized>(
    actor: &mut Creature,
    target: &mut Creature,
    mv: &Move,
    rng: &mut R,
) -> ActionOutcome {
    if !actor.can_act() {
        return ActionOutcome::skipped(blocked_message(actor));
    }
    if actor.energy() < mv.energy_cost {
        return ActionOutcome {
            success: false,
            ..ActionOutcome::new(format!(
                "{} tried to use {}, but didn't have enough energy.",
                actor.name, mv.name
            ))
        };
    }
    if mv.energy_cost > 0 {
        actor.use_energy(mv.energy_cost);
    }

    if mv.accuracy < 100 {
        let roll: f64 = rng.r#gen();
        if roll * 100.0 >= f64::from(mv.accuracy) {
            return ActionOutcome {
                success: false,
                missed: true,
                actor_broken: actor.is_broken(),
                ..ActionOutcome::new(format!("{} used {}, but it missed!", actor.name, mv.name))
            };
        }
    }

    let element = mv.element.unwrap_or(actor.element);
    let hit = land_hit(actor, target, mv.power, Some(element), rng);

    let mut message = format!(
        "{} used {} on {} for {} damage.",
        actor.name, mv.name, target.name, hit.dealt
    );
    describe_hit(&mut message, &hit, Some(element), target);

    let mut status_applied = None;
    if let Some(kind) = mv.status {
        let roll: f64 = rng.r#gen();
        let lands = roll * 100.0 < f64::from(mv.status_chance);
        if lands && hit.multiplier > 0.0 && !target.is_fainted() {
            target.apply_status(StatusEffect::new(kind, status_duration(kind)));
            message.push_str(&format!(" {} is affected by {}!", target.name, kind));
            status_applied = Some(kind);
        }
    }
    if target.is_fainted() {
        message.push_str(&format!(" {} is disabled!", target.name));
    }

    ActionOutcome {
        damage: hit.dealt,
        critical: hit.critical,
        multiplier: hit.multiplier,
        target_fainted: target.is_fainted(),
        actor_broken: actor.is_broken(),
        status_applied,
        ..ActionOutcome::new(message)
    }
}

fn defend(actor: &mut Creature) -> ActionOutcome {
    if !actor.can_act() {
        return ActionOutcome::skipped(blocked_message(actor));
    }
    let change = actor.stages.boost(Stat::Def, DEFEND_STAGES);
    let message = if change > 0 {
        format!("{} braces for impact! Defense rose.", actor.name)
    } else {
        format!("{}'s Defense won't go any higher.", actor.name)
    };
    ActionOutcome {
        success: change > 0,
        ..ActionOutcome::new(message)
    }
}

/// End-of-turn status tick: the creature that acted first, then the other.
///
/// Burn and Poison take a sixteenth of max health (scaled by intensity,
/// at least 1) and Regeneration restores as much, before durations count
/// down. Returns a line for every effect that acted or wore off.
pub fn tick_encounter(first: &mut Creature, second: &mut Creature) -> Vec<String> {
    let mut log = Vec::new();
    for creature in [first, second] {
        if creature.is_fainted() {
            continue;
        }
        turn_effects(creature, &mut log);
        if creature.is_fainted() {
            continue;
        }
        for kind in creature.tick_status() {
            log.push(format!("{} is no longer affected by {}.", creature.name, kind));
        }
    }
    log
}

fn turn_effects(creature: &mut Creature, log: &mut Vec<String>) {
    let active: Vec<StatusEffect> = creature.effects.iter().copied().collect();
    for effect in active {
        let amount = ((creature.max_health() / TURN_EFFECT_DIVISOR) as f64 * effect.intensity)
            .floor()
            .max(1.0) as u32;
        match effect.kind {
            StatusKind::Burn | StatusKind::Poison => {
                let taken = creature.take_damage(amount);
                log.push(format!("{} takes {} damage from {}.", creature.name, taken, effect.kind));
                if creature.is_fainted() {
                    log.push(format!("{} is disabled!", creature.name));
                    return;
                }
            }
            StatusKind::Regeneration => {
                let healed = creature.heal(amount);
                if healed > 0 {
                    log.push(format!("{} regenerates {} health.", creature.name, healed));
                }
            }
            _ => {}
        }
    }
}
