use std::collections::HashMap;
use std::sync::Arc;

use arena_protocol::{reasons, GameStateId, StateTransition};
use tokio::time::MissedTickBehavior;

use crate::cancel::Cancellation;
use crate::config::MachineConfig;
use crate::context::GameStateContext;
use crate::error::MachineError;
use crate::service::GameService;
use crate::states::{default_states, GameState};
use crate::ui::UiBridge;

/// One applied transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub from: Option<GameStateId>,
    pub to: GameStateId,
    pub reason: String,
}

/// Owns the registered states and the context, and switches between them.
///
/// Only one state is active. `tick` runs its `execute` once; a returned
/// transition is applied immediately (`exit`, then the target's `enter`)
/// and never handed to anything else.
pub struct StateMachine {
    states: HashMap<GameStateId, Box<dyn GameState>>,
    current: Option<GameStateId>,
    context: GameStateContext,
    history: Vec<TransitionRecord>,
}

impl StateMachine {
    /// Machine with no states registered
    pub fn new(context: GameStateContext) -> Self {
        Self {
            states: HashMap::new(),
            current: None,
            context,
            history: Vec::new(),
        }
    }

    /// Machine with every built-in state registered
    pub fn with_default_states(
        game: Box<dyn GameService>,
        ui: Arc<dyn UiBridge>,
        config: MachineConfig,
    ) -> Self {
        let mut machine = Self::new(GameStateContext::new(game, ui, config));
        for state in default_states() {
            machine.register(state);
        }
        machine
    }

    /// Register a state, replacing any previous one with the same id
    pub fn register(&mut self, state: Box<dyn GameState>) -> Option<Box<dyn GameState>> {
        self.states.insert(state.id(), state)
    }

    /// Enter the configured start state
    pub fn initialize(&mut self, cancel: &Cancellation) -> Result<(), MachineError> {
        let start = self.context.config.start_state;
        self.transition_to(StateTransition::to(start, reasons::INITIALIZE), cancel)
    }

    /// Run the active state's `execute` once.
    ///
    /// Returns the state switched to, if any. A cancelled tick does nothing.
    pub fn tick(&mut self, cancel: &Cancellation) -> Result<Option<GameStateId>, MachineError> {
        let current = self.current.ok_or(MachineError::NotInitialized)?;
        if cancel.is_cancelled() {
            tracing::debug!(state = %current, "tick skipped: cancelled");
            return Ok(None);
        }

        let state = self
            .states
            .get_mut(&current)
            .ok_or(MachineError::StateNotRegistered(current))?;
        let Some(transition) = state.execute(&mut self.context, cancel) else {
            return Ok(None);
        };
        let next = transition.next;
        self.transition_to(transition, cancel)?;
        Ok(Some(next))
    }

    /// Exit the active state and enter `transition.next`.
    ///
    /// The target must be registered; otherwise nothing changes.
    pub fn transition_to(
        &mut self,
        transition: StateTransition,
        cancel: &Cancellation,
    ) -> Result<(), MachineError> {
        let StateTransition { next, args } = transition;
        if !self.states.contains_key(&next) {
            tracing::warn!(target_state = %next, reason = args.reason(), "transition to unregistered state");
            return Err(MachineError::StateNotRegistered(next));
        }

        let from = self.current;
        if let Some(state) = from.and_then(|id| self.states.get_mut(&id)) {
            tracing::debug!(state = %state.id(), "exit");
            state.exit(&mut self.context);
        }

        tracing::info!(
            from = from.map(|s| s.as_str()).unwrap_or("-"),
            to = %next,
            reason = args.reason(),
            payload = args.payload().map(|p| p.kind()),
            "state transition"
        );
        self.history.push(TransitionRecord {
            from,
            to: next,
            reason: args.reason().to_string(),
        });
        self.current = Some(next);

        let state = self
            .states
            .get_mut(&next)
            .ok_or(MachineError::StateNotRegistered(next))?;
        tracing::debug!(state = %next, "enter");
        state.enter(&mut self.context, args, cancel);
        Ok(())
    }

    /// Jump to a state by name, e.g. from a debug console
    pub fn force_transition(&mut self, name: &str, cancel: &Cancellation) -> Result<(), MachineError> {
        let next: GameStateId = name.parse()?;
        self.transition_to(StateTransition::to(next, reasons::FORCED), cancel)
    }

    pub fn current_state(&self) -> Option<GameStateId> {
        self.current
    }

    pub fn context(&self) -> &GameStateContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut GameStateContext {
        &mut self.context
    }

    /// Every transition applied so far, oldest first
    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    /// Tick on the configured interval until cancelled, or until the
    /// machine lands on `stop_at`
    pub async fn run(&mut self, cancel: &Cancellation, stop_at: Option<GameStateId>) -> anyhow::Result<()> {
        if self.current.is_none() {
            return Err(MachineError::NotInitialized.into());
        }

        let mut interval = tokio::time::interval(self.context.config.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if cancel.is_cancelled() {
                tracing::info!(state = ?self.current, "run loop cancelled");
                return Ok(());
            }
            if let Err(e) = self.tick(cancel) {
                tracing::warn!(error = %e, "tick failed");
                return Err(e.into());
            }
            if stop_at.is_some() && self.current == stop_at {
                return Ok(());
            }
        }
    }
}

impl std::fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("registered", &self.states.len())
            .field("history", &self.history.len())
            .finish()
    }
}
