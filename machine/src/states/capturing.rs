use arena_battle::capture::{requires_special_capture, special_requirements};
use arena_battle::progression::capture_xp;
use arena_battle::recommended_device;
use arena_protocol::{
    reasons, BattleRewards, CaptureResult, CapturingRequest, GameStateId, Payload, StateArgs,
    StateTransition,
};

use super::{staged, GameState};
use crate::cancel::Cancellation;
use crate::context::GameStateContext;

/// Throws a capture device at the encounter.
///
/// The item is validated and consumed on the first uncancelled tick; the
/// result is routed to CapturingSuccess or CapturingFailed on the tick after.
#[derive(Debug, Default)]
pub struct Capturing {
    request: Option<CapturingRequest>,
    pending: Option<StateTransition>,
}

impl Capturing {
    /// Build a request from the encounter and the best device held
    fn infer_request(ctx: &GameStateContext) -> Option<CapturingRequest> {
        let target = ctx.game.encounter()?.id;
        let devices = ctx.game.capture_devices();
        let device = recommended_device(&devices)?;
        Some(CapturingRequest::new(device.id.clone(), Some(target)))
    }

    fn reject(ctx: &GameStateContext, message: &str) -> Option<StateTransition> {
        tracing::info!(reason = message, "capture rejected");
        ctx.ui.show_toast(message);
        Some(StateTransition::to(GameStateId::Battling, reasons::CAPTURE_REJECTED))
    }

    /// Toast what makes a boss-grade encounter hard to catch
    fn warn_special(ctx: &GameStateContext) {
        let Some(wild) = ctx.game.encounter() else {
            return;
        };
        if !requires_special_capture(wild) {
            return;
        }
        let requirements = special_requirements(wild);
        let message = if requirements.is_empty() {
            format!("{} is hard to catch.", wild.name)
        } else {
            format!("{} is a special target: {}.", wild.name, requirements.join(", "))
        };
        ctx.ui.show_toast(&message);
    }

    fn attempt(&mut self, ctx: &mut GameStateContext, request: CapturingRequest) -> Option<StateTransition> {
        if let (Some(target), Some(wild)) = (request.target_id, ctx.game.encounter()) {
            if wild.id != target {
                return Self::reject(ctx, "That creature isn't here.");
            }
        }
        if let Err(e) = ctx.game.can_use_item(&request.item_id, None, true) {
            return Self::reject(ctx, &e.to_string());
        }
        if ctx.game.capture_device(&request.item_id).is_none() {
            return Self::reject(ctx, &format!("{} can't be used to capture.", request.item_id));
        }
        if let Err(e) = ctx.game.consume_item(&request.item_id, 1) {
            return Self::reject(ctx, &e.to_string());
        }
        Self::warn_special(ctx);
        ctx.ui.show_capture_animation(&request.item_id);

        let result = match ctx.game.attempt_capture(&request, &mut ctx.rng) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, item = %request.item_id, "capture engine failed");
                CaptureResult {
                    success: false,
                    captured: None,
                    log: vec![format!("The capture failed: {e}")],
                    item_id: request.item_id.clone(),
                    target_id: request.target_id,
                    chance: 0.0,
                    shake_count: 0,
                }
            }
        };
        tracing::info!(
            item = %result.item_id,
            chance = result.chance,
            success = result.success,
            "capture attempted"
        );

        let (next, reason) = if result.success {
            (GameStateId::CapturingSuccess, reasons::CAPTURE_SUCCEEDED)
        } else {
            (GameStateId::CapturingFailed, reasons::CAPTURE_FAILED)
        };
        self.pending = Some(StateTransition::with_payload(
            next,
            reason,
            Payload::CapturingResult(result),
        ));
        None
    }
}

impl GameState for Capturing {
    fn id(&self) -> GameStateId {
        GameStateId::Capturing
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        self.pending = None;
        self.request = match args.into_payload() {
            Some(Payload::CapturingRequest(request)) => Some(request),
            _ => Self::infer_request(ctx),
        };
        if self.request.is_none() {
            tracing::warn!("capture entered without a request");
            ctx.ui.show_toast("No capture request.");
            self.pending = Some(StateTransition::to(GameStateId::Battling, reasons::CAPTURE_NO_REQUEST));
        }
    }

    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() {
            return None;
        }
        if let Some(transition) = self.pending.take() {
            return Some(transition);
        }
        let request = self.request.take()?;
        self.attempt(ctx, request)
    }

    fn exit(&mut self, _ctx: &mut GameStateContext) {
        self.request = None;
        self.pending = None;
    }
}

/// Moves the captured creature into the roster and hands out capture XP
#[derive(Debug, Default)]
pub struct CapturingSuccess {
    pending: Option<StateTransition>,
}

impl GameState for CapturingSuccess {
    fn id(&self) -> GameStateId {
        GameStateId::CapturingSuccess
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        let captured = match args.into_payload() {
            Some(Payload::CapturingResult(result)) => result.captured.map(|c| (c, result.log)),
            _ => None,
        };
        let Some((creature, log)) = captured else {
            tracing::warn!("capture success entered without a captured creature");
            self.pending = Some(StateTransition::to(GameStateId::Exploring, reasons::CAPTURE_NO_REQUEST));
            return;
        };

        let rewards = BattleRewards {
            xp: capture_xp(creature.level),
            gold: 0,
            player_id: ctx.game.current_creature().map(|c| c.id),
            enemy_id: Some(creature.id),
            enemy_name: creature.name.clone(),
            enemy_level: creature.level,
            captured: true,
        };
        let message = log
            .into_iter()
            .next()
            .unwrap_or_else(|| format!("{} was captured!", creature.name));

        ctx.game.mark_encounter_resolved(creature.id);
        if let Err(e) = ctx.game.add_to_roster(creature) {
            tracing::warn!(error = %e, "captured creature could not join the roster");
        }
        ctx.battle.enemy = None;
        ctx.ui.show_toast(&message);

        self.pending = Some(StateTransition::with_payload(
            GameStateId::Victory,
            reasons::CAPTURE_VICTORY,
            Payload::Rewards(rewards),
        ));
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        staged(&mut self.pending, cancel)
    }
}

/// The creature broke free: the player's turn is spent and the battle resumes
#[derive(Debug, Default)]
pub struct CapturingFailed {
    pending: Option<StateTransition>,
}

impl GameState for CapturingFailed {
    fn id(&self) -> GameStateId {
        GameStateId::CapturingFailed
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        let message = match args.payload() {
            Some(Payload::CapturingResult(result)) => result.log.first().cloned(),
            _ => None,
        };
        ctx.ui.show_toast(message.as_deref().unwrap_or("The creature broke free!"));
        ctx.battle.turn_consumed = true;
        self.pending = Some(StateTransition::to(GameStateId::Battling, reasons::CAPTURE_FAILED_RETURN));
    }

    fn execute(&mut self, _ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        staged(&mut self.pending, cancel)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arena_battle::{Creature, CreatureId, Element};

    use super::*;
    use crate::config::MachineConfig;
    use crate::service::GameSession;
    use crate::ui::{RecordingUi, UiEvent};

    fn context(session: GameSession) -> (GameStateContext, Arc<RecordingUi>) {
        let ui = Arc::new(RecordingUi::new());
        (
            GameStateContext::new(Box::new(session), ui.clone(), MachineConfig::default()),
            ui,
        )
    }

    fn session() -> GameSession {
        GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Sparky", Element::Electric, 10))
            .with_encounter(Creature::new(CreatureId(2), "Mudling", Element::Earth, 5))
            .with_item("basic_net", 1)
            .with_item("stasis_pod", 1)
    }

    fn forced(chance: f64) -> StateArgs {
        let request = CapturingRequest::new("basic_net", Some(CreatureId(2))).with_forced_chance(chance);
        StateArgs::with_payload("Throw", Payload::CapturingRequest(request))
    }

    #[test]
    fn test_forced_capture_routes_next_tick() {
        let (mut ctx, ui) = context(session());
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, forced(0.95), &cancel);
        assert_eq!(ctx.game.item_count("basic_net"), 1);

        assert!(state.execute(&mut ctx, &cancel).is_none());
        assert_eq!(ctx.game.item_count("basic_net"), 0);
        assert!(ui.contains(&UiEvent::CaptureAnimation("basic_net".to_string())));

        let transition = state.execute(&mut ctx, &cancel).unwrap();
        assert!(matches!(
            transition.next,
            GameStateId::CapturingSuccess | GameStateId::CapturingFailed
        ));
        assert!(matches!(transition.args.payload(), Some(Payload::CapturingResult(_))));
    }

    #[test]
    fn test_infers_best_held_device() {
        let (mut ctx, _ui) = context(session());
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        state.execute(&mut ctx, &cancel);

        assert_eq!(ctx.game.item_count("stasis_pod"), 0);
        assert_eq!(ctx.game.item_count("basic_net"), 1);
    }

    #[test]
    fn test_no_request_falls_back_to_battle() {
        let session = GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Sparky", Element::Electric, 10));
        let (mut ctx, ui) = context(session);
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Battling);
        assert_eq!(transition.args.reason(), reasons::CAPTURE_NO_REQUEST);
        assert_eq!(ui.toasts(), vec!["No capture request.".to_string()]);
    }

    #[test]
    fn test_wrong_target_is_rejected_without_consuming() {
        let (mut ctx, ui) = context(session());
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        let request = CapturingRequest::new("basic_net", Some(CreatureId(77)));
        state.enter(&mut ctx, StateArgs::with_payload("Throw", Payload::CapturingRequest(request)), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.args.reason(), reasons::CAPTURE_REJECTED);
        assert_eq!(ctx.game.item_count("basic_net"), 1);
        assert_eq!(ui.toasts(), vec!["That creature isn't here.".to_string()]);
    }

    #[test]
    fn test_missing_item_is_rejected() {
        let (mut ctx, ui) = context(session());
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        let request = CapturingRequest::new("master_trap", None);
        state.enter(&mut ctx, StateArgs::with_payload("Throw", Payload::CapturingRequest(request)), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Battling);
        assert_eq!(ui.toasts(), vec!["You don't have any master_trap.".to_string()]);
    }

    #[test]
    fn test_non_device_item_is_kept() {
        let mut session = session();
        session.add_item("health_kit", 1);
        let (mut ctx, ui) = context(session);
        if let Some(sparky) = ctx.game.current_creature_mut() {
            sparky.take_damage(30);
        }
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        let request = CapturingRequest::new("health_kit", Some(CreatureId(2)));
        state.enter(&mut ctx, StateArgs::with_payload("Throw", Payload::CapturingRequest(request)), &cancel);
        let transition = state.execute(&mut ctx, &cancel).unwrap();

        assert_eq!(transition.next, GameStateId::Battling);
        assert_eq!(transition.args.reason(), reasons::CAPTURE_REJECTED);
        assert_eq!(ctx.game.item_count("health_kit"), 1);
        assert!(!ctx.battle.turn_consumed);
        assert!(ctx.game.encounter().is_some());
        assert_eq!(ui.toasts(), vec!["health_kit can't be used to capture.".to_string()]);
    }

    #[test]
    fn test_special_target_is_announced() {
        let session = GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Sparky", Element::Electric, 10))
            .with_encounter(Creature::new(CreatureId(5), "Titan", Element::Metal, 40))
            .with_item("basic_net", 1);
        let (mut ctx, ui) = context(session);
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        let request = CapturingRequest::new("basic_net", Some(CreatureId(5))).with_forced_chance(0.01);
        state.enter(&mut ctx, StateArgs::with_payload("Throw", Payload::CapturingRequest(request)), &cancel);
        state.execute(&mut ctx, &cancel);

        assert_eq!(
            ui.toasts().first().map(String::as_str),
            Some("Titan is a special target: Must be weakened to below 25% health.")
        );
        assert_eq!(ctx.game.item_count("basic_net"), 0);
    }

    #[test]
    fn test_cancelled_tick_consumes_nothing() {
        let (mut ctx, _ui) = context(session());
        let mut state = Capturing::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, forced(0.95), &cancel);
        cancel.cancel();
        assert!(state.execute(&mut ctx, &cancel).is_none());
        assert_eq!(ctx.game.item_count("basic_net"), 1);
        assert!(ctx.game.encounter().is_some());
    }

    #[test]
    fn test_success_moves_creature_and_stages_victory() {
        let (mut ctx, ui) = context(session());
        let mut state = CapturingSuccess::default();
        let cancel = Cancellation::new();

        let wild = ctx.game.set_encounter(None).unwrap().with_owned(true);
        let result = CaptureResult {
            success: true,
            captured: Some(wild),
            log: vec!["Success! Mudling has been captured using Basic Net!".to_string()],
            item_id: "basic_net".to_string(),
            target_id: Some(CreatureId(2)),
            chance: 0.95,
            shake_count: 4,
        };
        state.enter(
            &mut ctx,
            StateArgs::with_payload(reasons::CAPTURE_SUCCEEDED, Payload::CapturingResult(result)),
            &cancel,
        );

        assert_eq!(ctx.game.roster().len(), 2);
        assert!(ctx.game.creature(CreatureId(2)).is_some());
        assert_eq!(
            ui.toasts(),
            vec!["Success! Mudling has been captured using Basic Net!".to_string()]
        );

        let transition = state.execute(&mut ctx, &cancel).unwrap();
        assert_eq!(transition.next, GameStateId::Victory);
        let Some(Payload::Rewards(rewards)) = transition.args.payload() else {
            panic!("expected rewards");
        };
        assert_eq!(rewards.xp, 25);
        assert_eq!(rewards.gold, 0);
        assert!(rewards.captured);
    }

    #[test]
    fn test_failed_consumes_turn() {
        let (mut ctx, ui) = context(session());
        let mut state = CapturingFailed::default();
        let cancel = Cancellation::new();

        state.enter(&mut ctx, StateArgs::default(), &cancel);
        assert!(ctx.battle.turn_consumed);
        assert_eq!(ui.toasts(), vec!["The creature broke free!".to_string()]);

        let transition = state.execute(&mut ctx, &cancel).unwrap();
        assert_eq!(transition.next, GameStateId::Battling);
        assert_eq!(transition.args.reason(), reasons::CAPTURE_FAILED_RETURN);
    }
}
