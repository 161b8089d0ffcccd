//! Whole-encounter resolution strategies

use rand::RngCore;

use super::action::{resolve_action, tick_encounter, CombatAction};
use crate::types::{Creature, Move, MoveTracker};

/// How an encounter ended, from the player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Draw,
}

impl BattleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattleOutcome::Victory => "Victory",
            BattleOutcome::Defeat => "Defeat",
            BattleOutcome::Draw => "Draw",
        }
    }

    pub fn is_victory(&self) -> bool {
        matches!(self, BattleOutcome::Victory)
    }
}

impl std::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a resolved encounter plus its narration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleVerdict {
    pub outcome: BattleOutcome,
    pub turns: u32,
    pub log: Vec<String>,
}

/// Decides an encounter between the player's creature and an enemy
pub trait BattleResolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        player: &mut Creature,
        enemy: &mut Creature,
        rng: &mut dyn RngCore,
    ) -> BattleVerdict;
}

/// `level * 10 + attack`
pub fn power_rating(creature: &Creature) -> u64 {
    u64::from(creature.level) * 10 + u64::from(creature.attack)
}

/// Instant resolution: the higher power rating wins, ties go to the enemy.
/// Neither creature is modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerComparison;

impl BattleResolver for PowerComparison {
    fn name(&self) -> &'static str {
        "power-comparison"
    }

    fn resolve(
        &self,
        player: &mut Creature,
        enemy: &mut Creature,
        _rng: &mut dyn RngCore,
    ) -> BattleVerdict {
        let player_power = power_rating(player);
        let enemy_power = power_rating(enemy);
        let outcome = if player_power > enemy_power {
            BattleOutcome::Victory
        } else {
            BattleOutcome::Defeat
        };
        BattleVerdict {
            outcome,
            turns: 1,
            log: vec![format!(
                "{} ({}) vs {} ({}): {}",
                player.name, player_power, enemy.name, enemy_power, outcome
            )],
        }
    }
}

/// Plays out turns in speed order until one side is disabled or the turn
/// limit runs out. Each side uses its strongest move it can afford, has
/// uses left for and whose combo requirement is met, falling back to a
/// basic elemental attack. At the limit the side with the larger remaining
/// health fraction wins; equal fractions are a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnBasedDuel {
    pub turn_limit: u32,
}

impl Default for TurnBasedDuel {
    fn default() -> Self {
        Self { turn_limit: 50 }
    }
}

/// Strongest move `creature` may use right now
pub fn choose_move(creature: &Creature, tracker: &MoveTracker) -> Option<Move> {
    creature
        .moves
        .iter()
        .filter(|mv| tracker.check(mv, creature.energy()).is_ok())
        .max_by_key(|mv| mv.power)
        .cloned()
}

impl TurnBasedDuel {
    fn act(
        actor: &mut Creature,
        target: &mut Creature,
        tracker: &mut MoveTracker,
        rng: &mut dyn RngCore,
        log: &mut Vec<String>,
    ) {
        let chosen = choose_move(actor, tracker);
        let action = match &chosen {
            Some(mv) => CombatAction::UseMove(mv),
            None => CombatAction::basic_attack(),
        };
        let out = resolve_action(actor, target, &action, &mut *rng);
        if !out.skipped {
            tracker.record(chosen.as_ref().map(|mv| mv.id.as_str()));
        }
        log.push(out.message);
    }

    fn play_turn(
        (first, first_moves): (&mut Creature, &mut MoveTracker),
        (second, second_moves): (&mut Creature, &mut MoveTracker),
        rng: &mut dyn RngCore,
        log: &mut Vec<String>,
    ) {
        Self::act(first, second, first_moves, rng, log);
        if !second.is_fainted() {
            Self::act(second, first, second_moves, rng, log);
        }
        if !first.is_fainted() && !second.is_fainted() {
            log.extend(tick_encounter(first, second));
        }
    }
}

impl BattleResolver for TurnBasedDuel {
    fn name(&self) -> &'static str {
        "turn-based"
    }

    fn resolve(
        &self,
        player: &mut Creature,
        enemy: &mut Creature,
        rng: &mut dyn RngCore,
    ) -> BattleVerdict {
        let mut log = Vec::new();
        let mut turns = 0;
        let mut player_moves = MoveTracker::new();
        let mut enemy_moves = MoveTracker::new();

        while turns < self.turn_limit && player.is_alive() && enemy.is_alive() {
            turns += 1;
            log.push(format!("Turn {turns}"));
            let ours = (&mut *player, &mut player_moves);
            let theirs = (&mut *enemy, &mut enemy_moves);
            if ours.0.effective_speed() >= theirs.0.effective_speed() {
                Self::play_turn(ours, theirs, rng, &mut log);
            } else {
                Self::play_turn(theirs, ours, rng, &mut log);
            }
        }

        let outcome = match (player.is_alive(), enemy.is_alive()) {
            (true, false) => BattleOutcome::Victory,
            (false, _) => BattleOutcome::Defeat,
            (true, true) => {
                let ours = player.health_fraction();
                let theirs = enemy.health_fraction();
                if ours > theirs {
                    BattleOutcome::Victory
                } else if ours < theirs {
                    BattleOutcome::Defeat
                } else {
                    BattleOutcome::Draw
                }
            }
        };
        log.push(format!("{} after {} turns.", outcome, turns));

        BattleVerdict {
            outcome,
            turns,
            log,
        }
    }
}
