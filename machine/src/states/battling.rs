use arena_battle::progression::{battle_gold, battle_xp};
use arena_battle::{
    choose_move, resolve_action, BattleOutcome, BattleVerdict, CombatAction, Creature, CreatureId,
    MoveTracker,
};
use arena_protocol::{
    reasons, BattleReport, BattleRewards, BattleSetup, GameStateId, Payload, StateArgs,
    StateTransition,
};

use super::{staged, GameState};
use crate::cancel::Cancellation;
use crate::context::{flags, GameStateContext};

/// Resolves the encounter on entry and stages Victory or Defeat
#[derive(Debug, Default)]
pub struct Battling {
    pending: Option<StateTransition>,
}

/// What Battling needs to know about the player's side once resolution ends
struct PlayerSide {
    id: CreatureId,
    level: u32,
}

impl Battling {
    fn resolve(ctx: &mut GameStateContext) -> StateTransition {
        // Take the enemy out of the slot while both sides are borrowed
        let Some(mut enemy) = ctx.game.set_encounter(None) else {
            tracing::warn!("battle entered without an encounter");
            ctx.ui.show_toast("There is nothing to battle.");
            return StateTransition::to(GameStateId::Exploring, reasons::NO_BATTLE_CREATURES);
        };

        let resolver = ctx.config.resolver.build();
        let mut log = Vec::new();
        let resolved = match ctx.game.current_creature_mut() {
            Some(player) => {
                let multiplier = if ctx.config.matchup_jitter {
                    player.element.effectiveness_with_jitter(enemy.element, &mut ctx.rng)
                } else {
                    player.element.effectiveness(enemy.element)
                };
                ctx.ui.set_status(&format!(
                    "Battle started: {} ({}) vs {} ({}), x{:.2}",
                    player.name, player.element, enemy.name, enemy.element, multiplier
                ));

                if ctx.battle.turn_consumed {
                    ctx.battle.turn_consumed = false;
                    let chosen = choose_move(&enemy, &MoveTracker::new());
                    let action = match &chosen {
                        Some(mv) => CombatAction::UseMove(mv),
                        None => CombatAction::basic_attack(),
                    };
                    let hit = resolve_action(&mut enemy, player, &action, &mut ctx.rng);
                    log.push(hit.message);
                }

                let verdict = if player.is_fainted() {
                    BattleVerdict {
                        outcome: BattleOutcome::Defeat,
                        turns: 0,
                        log: vec![format!("{} can't fight.", player.name)],
                    }
                } else {
                    resolver.resolve(player, &mut enemy, &mut ctx.rng)
                };
                Some((
                    PlayerSide {
                        id: player.id,
                        level: player.level,
                    },
                    verdict,
                ))
            }
            None => None,
        };

        let Some((player, verdict)) = resolved else {
            tracing::warn!(enemy = %enemy.name, "battle entered without an active creature");
            ctx.game.set_encounter(Some(enemy));
            ctx.ui.show_toast("You have no creature ready to fight.");
            return StateTransition::to(GameStateId::Exploring, reasons::NO_BATTLE_CREATURES);
        };

        log.extend(verdict.log);
        tracing::info!(
            enemy = %enemy.name,
            outcome = %verdict.outcome,
            resolver = resolver.name(),
            turns = verdict.turns,
            "battle resolved"
        );
        ctx.game.set_flag(flags::LAST_BATTLE_OUTCOME, verdict.outcome.as_str());
        ctx.battle.enemy = Some(enemy.id);
        ctx.battle.last_outcome = Some(verdict.outcome);
        ctx.battle.last_log = log.clone();

        let transition = match verdict.outcome {
            BattleOutcome::Victory => {
                let rewards = BattleRewards {
                    xp: battle_xp(enemy.level, player.level),
                    gold: battle_gold(enemy.level),
                    player_id: Some(player.id),
                    enemy_id: Some(enemy.id),
                    enemy_name: enemy.name.clone(),
                    enemy_level: enemy.level,
                    captured: false,
                };
                StateTransition::with_payload(GameStateId::Victory, reasons::BATTLE_WON, Payload::Rewards(rewards))
            }
            outcome => {
                let report = report(&enemy, outcome, verdict.turns, log);
                let (next, reason) = if outcome == BattleOutcome::Draw {
                    (GameStateId::Exploring, reasons::BATTLE_DRAW)
                } else {
                    (GameStateId::Defeat, reasons::BATTLE_LOST)
                };
                StateTransition::with_payload(next, reason, Payload::BattleReport(report))
            }
        };

        let enemy_id = enemy.id;
        ctx.game.set_encounter(Some(enemy));
        if verdict.outcome.is_victory() {
            ctx.game.mark_encounter_resolved(enemy_id);
        }
        transition
    }
}

fn report(enemy: &Creature, outcome: BattleOutcome, turns: u32, log: Vec<String>) -> BattleReport {
    BattleReport {
        outcome,
        enemy_name: enemy.name.clone(),
        enemy_level: enemy.level,
        turns,
        log,
    }
}

impl GameState for Battling {
    fn id(&self) -> GameStateId {
        GameStateId::Battling
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        ctx.ui.show_battle_hud();

        let setup = match args.into_payload() {
            Some(Payload::BattleSetup(setup)) => setup,
            _ => BattleSetup::default(),
        };
        if let Some(enemy) = setup.enemy {
            ctx.game.set_encounter(Some(enemy));
        }
        if let Some(id) = setup.player {
            if let Err(e) = ctx.game.set_current_creature(id) {
                tracing::warn!(error = %e, "keeping the active creature");
            }
        }

        self.pending = Some(Self::resolve(ctx));
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        staged(&mut self.pending, cancel)
    }

    fn exit(&mut self, ctx: &mut GameStateContext) {
        self.pending = None;
        ctx.ui.hide_battle_hud();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arena_battle::Element;

    use super::*;
    use crate::config::{MachineConfig, ResolverKind};
    use crate::service::GameSession;
    use crate::ui::{RecordingUi, UiEvent};

    fn context(session: GameSession, config: MachineConfig) -> (GameStateContext, Arc<RecordingUi>) {
        let ui = Arc::new(RecordingUi::new());
        (GameStateContext::new(Box::new(session), ui.clone(), config), ui)
    }

    fn player() -> Creature {
        Creature::new(CreatureId(1), "Sparky", Element::Electric, 10).with_attack(50)
    }

    fn enemy() -> Creature {
        Creature::new(CreatureId(2), "Mudling", Element::Earth, 5).with_attack(10)
    }

    #[test]
    fn test_victory_stages_rewards() {
        let session = GameSession::new("Ash").with_creature(player()).with_encounter(enemy());
        let (mut ctx, ui) = context(session, MachineConfig::default());
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::new("Encounter"), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Victory);
        assert_eq!(transition.args.reason(), reasons::BATTLE_WON);
        let Some(Payload::Rewards(rewards)) = transition.args.payload() else {
            panic!("expected rewards");
        };
        assert_eq!(rewards.xp, 50);
        assert_eq!(rewards.gold, 25);
        assert!(ctx.game.encounter().is_none());
        assert_eq!(ctx.game.flag(flags::LAST_BATTLE_OUTCOME), Some("Victory"));
        assert!(ui.contains(&UiEvent::ShowBattleHud));
        let started: Vec<String> = ui
            .statuses()
            .into_iter()
            .filter(|s| s.contains("Mudling"))
            .collect();
        assert_eq!(started, vec!["Battle started: Sparky (Electric) vs Mudling (Earth), x0.00".to_string()]);
        assert!(state.execute(&mut ctx, &cancel).is_none());
    }

    #[test]
    fn test_defeat_keeps_encounter() {
        let session = GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Pip", Element::Fire, 1))
            .with_encounter(enemy());
        let (mut ctx, _ui) = context(session, MachineConfig::default());
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Defeat);
        assert!(matches!(transition.args.payload(), Some(Payload::BattleReport(_))));
        assert_eq!(ctx.game.encounter().map(|c| c.id), Some(CreatureId(2)));
    }

    #[test]
    fn test_setup_enemy_replaces_encounter() {
        let session = GameSession::new("Ash").with_creature(player()).with_encounter(enemy());
        let (mut ctx, _ui) = context(session, MachineConfig::default());
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        let boss = Creature::new(CreatureId(9), "Titan", Element::Metal, 40).with_attack(90);
        let setup = BattleSetup {
            enemy: Some(boss),
            ..BattleSetup::default()
        };
        state.enter(&mut ctx, StateArgs::with_payload("Npc", Payload::BattleSetup(setup)), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Defeat);
        assert_eq!(ctx.game.encounter().map(|c| c.id), Some(CreatureId(9)));
    }

    #[test]
    fn test_missing_encounter_falls_back() {
        let session = GameSession::new("Ash").with_creature(player());
        let (mut ctx, ui) = context(session, MachineConfig::default());
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Exploring);
        assert_eq!(transition.args.reason(), reasons::NO_BATTLE_CREATURES);
        assert_eq!(ui.toasts().len(), 1);
    }

    #[test]
    fn test_missing_player_restores_encounter() {
        let session = GameSession::new("Ash").with_encounter(enemy());
        let (mut ctx, _ui) = context(session, MachineConfig::default());
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.args.reason(), reasons::NO_BATTLE_CREATURES);
        assert!(ctx.game.encounter().is_some());
    }

    #[test]
    fn test_consumed_turn_gives_enemy_a_hit() {
        let session = GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Sprout", Element::Grass, 10).with_attack(50))
            .with_encounter(Creature::new(CreatureId(2), "Ember", Element::Fire, 5).with_attack(30));
        let (mut ctx, _ui) = context(session, MachineConfig::default());
        ctx.battle.turn_consumed = true;
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);

        assert!(!ctx.battle.turn_consumed);
        let hp = ctx.game.current_creature().map(|c| c.health()).unwrap();
        assert!(hp < 100);
        assert!(ctx.battle.last_log[0].starts_with("Ember attacks Sprout"));
    }

    #[test]
    fn test_cancelled_tick_keeps_pending() {
        let session = GameSession::new("Ash").with_creature(player()).with_encounter(enemy());
        let (mut ctx, _ui) = context(session, MachineConfig::default());
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        cancel.cancel();
        assert!(state.execute(&mut ctx, &cancel).is_none());
        cancel.reset();
        assert!(state.execute(&mut ctx, &cancel).is_some());
    }

    #[test]
    fn test_turn_based_resolver() {
        let session = GameSession::new("Ash").with_creature(player()).with_encounter(enemy());
        let config = MachineConfig {
            resolver: ResolverKind::TurnBased { turn_limit: 30 },
            ..MachineConfig::default()
        };
        let (mut ctx, _ui) = context(session, config);
        let mut state = Battling::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        // Electric can't touch Earth; Mudling's 10 attack barely scratches
        assert_ne!(transition.next, GameStateId::Victory);
    }
}
