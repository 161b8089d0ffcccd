use arena_protocol::{reasons, BattleSetup, GameStateId, Payload, StateArgs, StateTransition};

use super::GameState;
use crate::cancel::Cancellation;
use crate::context::{flags, GameStateContext};

/// Talking to an NPC until the UI reports the conversation is over or the
/// NPC picks a fight
#[derive(Debug, Default)]
pub struct Dialogue {
    npc_id: Option<String>,
}

impl GameState for Dialogue {
    fn id(&self) -> GameStateId {
        GameStateId::Dialogue
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        self.npc_id = match args.into_payload() {
            Some(Payload::NpcId(npc)) => Some(npc),
            _ => ctx.game.current_npc_id().map(str::to_string),
        };
        ctx.game.clear_flag(flags::DIALOGUE_COMPLETED);
        ctx.game.clear_flag(flags::DIALOGUE_REQUESTED_BATTLE);

        match &self.npc_id {
            Some(npc) => {
                tracing::debug!(npc = %npc, "dialogue started");
                ctx.game.set_flag(flags::IN_DIALOGUE, "true");
                ctx.ui.show_dialogue(npc);
            }
            None => tracing::warn!("dialogue entered without an npc"),
        }
    }

    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() {
            return None;
        }
        let Some(npc) = &self.npc_id else {
            return Some(StateTransition::to(GameStateId::Exploring, reasons::DIALOGUE_END));
        };
        if ctx.take_flag(flags::DIALOGUE_REQUESTED_BATTLE) {
            return Some(StateTransition::with_payload(
                GameStateId::Battling,
                reasons::NPC_BATTLE,
                Payload::BattleSetup(BattleSetup::default()),
            ));
        }
        if ctx.take_flag(flags::DIALOGUE_COMPLETED) {
            return Some(StateTransition::with_payload(
                GameStateId::Exploring,
                reasons::DIALOGUE_END,
                Payload::NpcId(npc.clone()),
            ));
        }
        None
    }

    fn exit(&mut self, ctx: &mut GameStateContext) {
        self.npc_id = None;
        ctx.game.clear_flag(flags::IN_DIALOGUE);
        ctx.ui.hide_dialogue();
    }
}
