use arena_protocol::{GameStateId, Payload, StateArgs, StateTransition};

use super::GameState;
use crate::cancel::Cancellation;
use crate::context::GameStateContext;

/// Nothing is happening; waits for an external trigger
#[derive(Debug, Default)]
pub struct Idle;

impl GameState for Idle {
    fn id(&self) -> GameStateId {
        GameStateId::Idle
    }

    fn enter(&mut self, ctx: &mut GameStateContext, _args: StateArgs, _cancel: &Cancellation) {
        ctx.ui.set_status("Idle");
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, _cancel: &Cancellation) -> Option<StateTransition> {
        None
    }
}

/// Overworld. Surfaces whatever result the previous activity handed back.
#[derive(Debug, Default)]
pub struct Exploring;

impl GameState for Exploring {
    fn id(&self) -> GameStateId {
        GameStateId::Exploring
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        ctx.battle.clear();
        ctx.ui.show_overworld();
        ctx.ui.set_status("Exploring");

        match args.into_payload() {
            Some(Payload::TrainingResult(result)) => {
                let name = ctx
                    .game
                    .creature(result.target)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| result.target.to_string());
                ctx.ui.show_toast(&format!(
                    "{} finished {} training: +{} {}, +{} XP.",
                    name, result.mode, result.stat_gain, result.mode, result.xp_gained
                ));
            }
            Some(Payload::FusionResult(result)) => {
                for line in &result.log {
                    ctx.ui.show_toast(line);
                }
            }
            Some(Payload::BattleReport(report)) => {
                ctx.ui.show_toast(&format!(
                    "The battle against {} ended in a {}.",
                    report.enemy_name,
                    report.outcome.as_str().to_lowercase()
                ));
            }
            _ => {}
        }
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, _cancel: &Cancellation) -> Option<StateTransition> {
        None
    }
}
