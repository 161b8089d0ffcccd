use arena_battle::progression::fuse;
use arena_battle::CreatureId;
use arena_protocol::{
    reasons, FusionRequest, FusionResult, GameStateId, Payload, StateArgs, StateTransition,
};

use super::GameState;
use crate::cancel::Cancellation;
use crate::context::GameStateContext;

/// Combines two roster creatures after `fusion_delay_ticks`
#[derive(Debug, Default)]
pub struct Fusion {
    request: Option<FusionRequest>,
    remaining: u32,
    pending: Option<StateTransition>,
}

fn failed(message: impl Into<String>) -> FusionResult {
    FusionResult {
        success: false,
        fused: None,
        log: vec![message.into()],
    }
}

impl Fusion {
    fn validate(ctx: &GameStateContext, request: &FusionRequest) -> Result<(), String> {
        if request.parent_a == request.parent_b {
            return Err("A creature can't fuse with itself.".to_string());
        }
        for id in [request.parent_a, request.parent_b] {
            if ctx.game.creature(id).is_none() {
                return Err(format!("Creature {id} is not in your roster."));
            }
        }
        if let Some(item) = &request.catalyst_item_id {
            if ctx.game.item_count(item) == 0 {
                return Err(format!("You don't have any {item}."));
            }
        }
        Ok(())
    }

    fn fuse(ctx: &mut GameStateContext, request: &FusionRequest) -> FusionResult {
        if let Err(message) = Self::validate(ctx, request) {
            return failed(message);
        }
        let (Some(a), Some(b)) = (
            ctx.game.creature(request.parent_a).cloned(),
            ctx.game.creature(request.parent_b).cloned(),
        ) else {
            return failed("The fusion parents are gone.");
        };
        if let Some(item) = &request.catalyst_item_id {
            if let Err(e) = ctx.game.consume_item(item, 1) {
                return failed(e.to_string());
            }
        }

        let id = ctx.game.next_creature_id();
        let Some(mut fused) = fuse(&a, &b, id) else {
            return failed("A creature can't fuse with itself.");
        };
        fused.owned = true;
        let name = fused.name.clone();

        let active = ctx.game.current_creature().map(|c| c.id);
        if request.consume_parents {
            for parent in [a.id, b.id] {
                if let Err(e) = ctx.game.remove_from_roster(parent) {
                    tracing::warn!(error = %e, "fusion parent could not be released");
                }
            }
        }
        if let Err(e) = ctx.game.add_to_roster(fused) {
            tracing::warn!(error = %e, "fused creature could not join the roster");
            return failed(e.to_string());
        }
        if request.consume_parents && active.is_some_and(|id| id == a.id || id == b.id) {
            repoint(ctx, id);
        }

        tracing::info!(parent_a = %a.name, parent_b = %b.name, fused = %name, "fusion finished");
        FusionResult {
            success: true,
            fused: Some(id),
            log: vec![format!("{} and {} fused into {}!", a.name, b.name, name)],
        }
    }
}

fn repoint(ctx: &mut GameStateContext, id: CreatureId) {
    if let Err(e) = ctx.game.set_current_creature(id) {
        tracing::warn!(error = %e, "active creature left unchanged");
    }
}

impl GameState for Fusion {
    fn id(&self) -> GameStateId {
        GameStateId::Fusion
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        self.pending = None;
        self.request = None;

        let Some(Payload::FusionRequest(request)) = args.into_payload() else {
            tracing::warn!("fusion entered without a request");
            ctx.ui.show_toast("No fusion request.");
            self.pending = Some(StateTransition::to(GameStateId::Exploring, reasons::FUSION_NO_REQUEST));
            return;
        };
        if let Err(message) = Self::validate(ctx, &request) {
            ctx.ui.show_toast(&message);
            self.pending = Some(StateTransition::with_payload(
                GameStateId::Exploring,
                reasons::FUSION_COMPLETE,
                Payload::FusionResult(failed(message)),
            ));
            return;
        }

        self.remaining = ctx.config.fusion_delay_ticks;
        self.request = Some(request);
        ctx.ui.set_status("Fusing...");
    }

    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() {
            return None;
        }
        if let Some(transition) = self.pending.take() {
            return Some(transition);
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }

        let request = self.request.take()?;
        let result = Self::fuse(ctx, &request);
        if result.success {
            ctx.ui.show_toast("Fusion complete.");
        } else if let Some(line) = result.log.first() {
            ctx.ui.show_toast(line);
        }
        self.pending = Some(StateTransition::with_payload(
            GameStateId::Exploring,
            reasons::FUSION_COMPLETE,
            Payload::FusionResult(result),
        ));
        None
    }

    fn exit(&mut self, _ctx: &mut GameStateContext) {
        self.request = None;
        self.pending = None;
    }
}
