use arena_protocol::{reasons, GameStateId, Payload, StateArgs, StateTransition};

use super::GameState;
use crate::cancel::Cancellation;
use crate::context::{flags, GameStateContext};

/// Applies rewards, then returns to Exploring on the next tick
#[derive(Debug, Default)]
pub struct Victory;

impl GameState for Victory {
    fn id(&self) -> GameStateId {
        GameStateId::Victory
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        let rewards = match args.into_payload() {
            Some(Payload::Rewards(rewards)) => Some(rewards),
            _ => None,
        };

        match &rewards {
            Some(r) => {
                if let Err(e) = ctx.game.apply_rewards(r.xp, r.gold) {
                    tracing::warn!(error = %e, "rewards could not be applied");
                }
                let levelled = r
                    .player_id
                    .and_then(|id| ctx.game.creature_mut(id))
                    .and_then(|c| (c.gain_experience(r.xp) > 0).then(|| (c.name.clone(), c.level)));
                if let Some((name, level)) = levelled {
                    ctx.ui.show_toast(&format!("{name} grew to level {level}!"));
                }
                tracing::info!(xp = r.xp, gold = r.gold, enemy = %r.enemy_name, "victory");
                ctx.ui.set_status(&format!("Victory! +{} XP, +{} Gold", r.xp, r.gold));
            }
            None => ctx.ui.set_status("Victory!"),
        }
        ctx.ui.show_victory_screen(rewards.as_ref());
        ctx.battle.clear();
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() {
            return None;
        }
        Some(StateTransition::to(GameStateId::Exploring, reasons::VICTORY_RETURN))
    }
}

/// Waits for the player to acknowledge the loss
#[derive(Debug, Default)]
pub struct Defeat;

impl GameState for Defeat {
    fn id(&self) -> GameStateId {
        GameStateId::Defeat
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        ctx.game.clear_flag(flags::DEFEAT_ACKNOWLEDGED);
        let report = match args.into_payload() {
            Some(Payload::BattleReport(report)) => Some(report),
            _ => None,
        };
        tracing::info!(enemy = report.as_ref().map(|r| r.enemy_name.as_str()), "defeat");
        ctx.ui.set_status("Defeat...");
        ctx.ui.show_defeat_screen(report.as_ref());
    }

    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() || !ctx.take_flag(flags::DEFEAT_ACKNOWLEDGED) {
            return None;
        }
        Some(StateTransition::to(GameStateId::GameOver, reasons::DEFEAT_ACKNOWLEDGED))
    }
}

/// Revives the roster and continues from Exploring
#[derive(Debug, Default)]
pub struct GameOver;

impl GameState for GameOver {
    fn id(&self) -> GameStateId {
        GameStateId::GameOver
    }

    fn enter(&mut self, ctx: &mut GameStateContext, _args: StateArgs, _cancel: &Cancellation) {
        let revived = ctx.game.revive_roster();
        tracing::info!(revived, "game over");
        ctx.battle.clear();
        ctx.ui.show_game_over();
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() {
            return None;
        }
        Some(StateTransition::to(GameStateId::Exploring, reasons::GAME_OVER_RETURN))
    }
}
