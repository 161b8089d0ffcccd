use arena_protocol::{reasons, GameStateId, StateArgs, StateTransition};

use super::GameState;
use crate::cancel::Cancellation;
use crate::context::{flags, GameStateContext};

/// Inventory screen, either standalone or paused over a battle
#[derive(Debug, Default)]
pub struct Inventory {
    from_battle: bool,
}

impl GameState for Inventory {
    fn id(&self) -> GameStateId {
        GameStateId::Inventory
    }

    fn enter(&mut self, ctx: &mut GameStateContext, args: StateArgs, _cancel: &Cancellation) {
        self.from_battle = args.reason() == reasons::PAUSED_BATTLE;
        ctx.game.clear_flag(flags::CLOSE_INVENTORY);
        ctx.ui.show_inventory(self.from_battle);
    }

    fn execute(&mut self, ctx: &mut GameStateContext, cancel: &Cancellation) -> Option<StateTransition> {
        if cancel.is_cancelled() || !ctx.take_flag(flags::CLOSE_INVENTORY) {
            return None;
        }
        let transition = if self.from_battle {
            StateTransition::to(GameStateId::Battling, reasons::RESUME_BATTLE)
        } else {
            StateTransition::to(GameStateId::Exploring, reasons::CLOSE_INVENTORY)
        };
        Some(transition)
    }

    fn exit(&mut self, ctx: &mut GameStateContext) {
        ctx.ui.hide_inventory();
    }
}
