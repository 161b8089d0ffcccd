use arena_battle::progression::train;
use arena_protocol::{
    reasons, GameStateId, Payload, StateArgs, StateTransition, TrainingRequest, TrainingResult,
};

use super::GameState;
use crate::cancel::Cancellation;
use crate::context::{flags, GameStateContext};

/// Counts down `training_delay_ticks`, then trains the target and returns
/// to Exploring with the result on the following tick
#[derive(Debug, Default)]
pub struct Training {
    request: Option<TrainingRequest>,
    remaining: u32,
    total: u32,
    pending: Option<StateTransition>,
}

impl Training {
    fn abort(&mut self, ctx: &GameStateContext, message: &str, reason: &str) {
        tracing::warn!(reason, "{message}");
        ctx.ui.show_toast(message);
        self.request = None;
        self.pending = Some(StateTransition::to(GameStateId::Exploring, reason));
    }

    fn finish(ctx: &mut GameStateContext, request: &TrainingRequest) -> Option<TrainingResult> {
        let creature = ctx.game.creature_mut(request.target)?;
        let outcome = train(creature, request.mode, request.sessions, &mut ctx.rng);
        tracing::info!(
            creature = %creature.name,
            mode = %request.mode,
            gain = outcome.stat_gain,
            "training finished"
        );
        Some(TrainingResult {
            target: request.target,
            mode: request.mode,
            xp_gained: outcome.xp_gained,
            stat_gain: outcome.stat_gain,
            levels_gained: outcome.levels_gained,
            logs: outcome.logs,
        })
    }
}

impl GameState for Training {
    fn id(&self) -> GameStateId {
        GameStateId::Training
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        self.pending = None;
        self.request = None;
        ctx.game.clear_flag(flags::CANCEL_TRAINING);

        let Some(Payload::TrainingRequest(request)) = args.into_payload() else {
            self.abort(ctx, "No training request.", reasons::TRAINING_NO_REQUEST);
            return;
        };
        if ctx.game.creature(request.target).is_none() {
            self.abort(ctx, "Target creature not found in your roster.", reasons::TRAINING_NO_REQUEST);
            return;
        }

        self.total = ctx.config.training_delay_ticks;
        self.remaining = self.total;
        self.request = Some(request);
        ctx.ui.show_training_screen();
    }

    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() {
            return None;
        }
        if let Some(transition) = self.pending.take() {
            return Some(transition);
        }
        if ctx.take_flag(flags::CANCEL_TRAINING) {
            ctx.ui.show_toast("Training cancelled.");
            self.request = None;
            return Some(StateTransition::to(GameStateId::Exploring, reasons::TRAINING_CANCELLED));
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            ctx.ui.show_training_progress(self.total - self.remaining, self.total);
            return None;
        }

        let request = self.request.take()?;
        match Self::finish(ctx, &request) {
            Some(result) => {
                self.pending = Some(StateTransition::with_payload(
                    GameStateId::Exploring,
                    reasons::TRAINING_COMPLETE,
                    Payload::TrainingResult(result),
                ));
                None
            }
            None => {
                ctx.ui.show_toast("Target creature not found in your roster.");
                Some(StateTransition::to(GameStateId::Exploring, reasons::TRAINING_NO_REQUEST))
            }
        }
    }

    fn exit(&mut self, ctx: &mut GameStateContext) {
        self.request = None;
        self.pending = None;
        ctx.ui.hide_training_screen();
    }
}
