#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use arena_battle::{
        CaptureDevice, Creature, CreatureId, Element, ItemUse, Stat,
    };
    use arena_protocol::{
        reasons, BattleSetup, CaptureResult, CapturingRequest, GameStateId, ParseError, Payload,
        StateArgs, StateTransition,
    };
    use rand::rngs::mock::StepRng;
    use rand::RngCore;

    use crate::{
        flags, Cancellation, GameService, GameSession, GameState, GameStateContext, MachineConfig,
        MachineError, RecordingUi, ResolverKind, ServiceError, StateMachine, UiEvent,
    };

    /// Session wrapper with scripted capture rolls and a failing profile store
    struct Scripted {
        inner: GameSession,
        rolls: Option<StepRng>,
        fail_rewards: bool,
    }

    impl Scripted {
        fn new(inner: GameSession) -> Self {
            Self {
                inner,
                rolls: None,
                fail_rewards: false,
            }
        }
    }

    impl GameService for Scripted {
        fn current_creature(&self) -> Option<&Creature> {
            self.inner.current_creature()
        }
        fn current_creature_mut(&mut self) -> Option<&mut Creature> {
            self.inner.current_creature_mut()
        }
        fn set_current_creature(&mut self, id: CreatureId) -> Result<(), ServiceError> {
            self.inner.set_current_creature(id)
        }
        fn creature(&self, id: CreatureId) -> Option<&Creature> {
            self.inner.creature(id)
        }
        fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
            self.inner.creature_mut(id)
        }
        fn roster(&self) -> &[Creature] {
            self.inner.roster()
        }
        fn add_to_roster(&mut self, creature: Creature) -> Result<(), ServiceError> {
            self.inner.add_to_roster(creature)
        }
        fn remove_from_roster(&mut self, id: CreatureId) -> Result<Creature, ServiceError> {
            self.inner.remove_from_roster(id)
        }
        fn next_creature_id(&mut self) -> CreatureId {
            self.inner.next_creature_id()
        }
        fn revive_roster(&mut self) -> usize {
            self.inner.revive_roster()
        }
        fn encounter(&self) -> Option<&Creature> {
            self.inner.encounter()
        }
        fn set_encounter(&mut self, creature: Option<Creature>) -> Option<Creature> {
            self.inner.set_encounter(creature)
        }
        fn mark_encounter_resolved(&mut self, id: CreatureId) -> bool {
            self.inner.mark_encounter_resolved(id)
        }
        fn item_count(&self, item_id: &str) -> u32 {
            self.inner.item_count(item_id)
        }
        fn capture_devices(&self) -> Vec<CaptureDevice> {
            self.inner.capture_devices()
        }
        fn capture_device(&self, item_id: &str) -> Option<CaptureDevice> {
            self.inner.capture_device(item_id)
        }
        fn can_use_item(&self, item_id: &str, actor: Option<CreatureId>, in_battle: bool) -> Result<(), ServiceError> {
            self.inner.can_use_item(item_id, actor, in_battle)
        }
        fn consume_item(&mut self, item_id: &str, count: u32) -> Result<(), ServiceError> {
            self.inner.consume_item(item_id, count)
        }
        fn use_item(&mut self, item_id: &str, target: Option<CreatureId>) -> Result<ItemUse, ServiceError> {
            self.inner.use_item(item_id, target)
        }
        fn player_level(&self) -> u32 {
            self.inner.player_level()
        }
        fn apply_rewards(&mut self, xp: u32, gold: u32) -> Result<(), ServiceError> {
            if self.fail_rewards {
                return Err(ServiceError::Storage("profile store offline".to_string()));
            }
            self.inner.apply_rewards(xp, gold)
        }
        fn set_flag(&mut self, key: &str, value: &str) {
            self.inner.set_flag(key, value)
        }
        fn flag(&self, key: &str) -> Option<&str> {
            self.inner.flag(key)
        }
        fn clear_flag(&mut self, key: &str) -> Option<String> {
            self.inner.clear_flag(key)
        }
        fn current_npc_id(&self) -> Option<&str> {
            self.inner.current_npc_id()
        }
        fn environment_modifier(&self) -> f64 {
            self.inner.environment_modifier()
        }
        fn attempt_capture(
            &mut self,
            request: &CapturingRequest,
            rng: &mut dyn RngCore,
        ) -> Result<CaptureResult, ServiceError> {
            match &mut self.rolls {
                Some(rolls) => self.inner.attempt_capture(request, rolls),
                None => self.inner.attempt_capture(request, rng),
            }
        }
    }

    fn machine(game: impl GameService + 'static, config: MachineConfig) -> (StateMachine, Arc<RecordingUi>) {
        let ui = Arc::new(RecordingUi::new());
        let machine = StateMachine::with_default_states(Box::new(game), ui.clone(), config);
        (machine, ui)
    }

    fn sparky() -> Creature {
        Creature::new(CreatureId(1), "Sparky", Element::Electric, 10).with_attack(50)
    }

    fn mudling() -> Creature {
        Creature::new(CreatureId(2), "Mudling", Element::Earth, 5).with_attack(10)
    }

    fn reasons_of(machine: &StateMachine) -> Vec<&str> {
        machine.history().iter().map(|r| r.reason.as_str()).collect()
    }

    #[test]
    fn test_guaranteed_capture_end_to_end() {
        let mut wild = Creature::new(CreatureId(2), "Wisp", Element::Wind, 3).with_max_health(100);
        wild.set_health(1);
        wild.stages.boost(Stat::Atk, 2);
        wild.stages.boost(Stat::Def, -1);

        let session = GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Sparky", Element::Electric, 1))
            .with_encounter(wild)
            .with_item("basic_net", 1);
        let mut game = Scripted::new(session);
        game.rolls = Some(StepRng::new(0, 0));
        let (mut machine, ui) = machine(game, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        let request = CapturingRequest::new("basic_net", Some(CreatureId(2))).with_forced_chance(0.99);
        machine
            .transition_to(
                StateTransition::with_payload(GameStateId::Capturing, "Throw", Payload::CapturingRequest(request)),
                &cancel,
            )
            .unwrap();

        assert_eq!(machine.tick(&cancel).unwrap(), None);
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::CapturingSuccess));
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Victory));
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));

        let game = &machine.context().game;
        assert!(game.encounter().is_none());
        assert_eq!(game.item_count("basic_net"), 0);
        let caught = game.creature(CreatureId(2)).expect("captured creature in roster");
        assert!(caught.owned);
        assert!(caught.stages.is_clear());
        assert!(caught.effects.is_empty());
        assert_eq!(caught.health(), 25);

        assert!(ui.toasts().contains(&"Success! Wisp has been captured using Basic Net!".to_string()));
        assert_eq!(
            reasons_of(&machine),
            vec![
                reasons::INITIALIZE,
                "Throw",
                reasons::CAPTURE_SUCCEEDED,
                reasons::CAPTURE_VICTORY,
                reasons::VICTORY_RETURN,
            ]
        );
    }

    #[test]
    fn test_failed_capture_returns_to_battle() {
        let session = GameSession::new("Ash")
            .with_creature(sparky())
            .with_encounter(mudling())
            .with_item("basic_net", 2);
        let mut game = Scripted::new(session);
        game.rolls = Some(StepRng::new(u64::MAX, 0));
        let (mut machine, ui) = machine(game, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine
            .transition_to(StateTransition::to(GameStateId::Capturing, "Throw"), &cancel)
            .unwrap();
        machine.tick(&cancel).unwrap();
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::CapturingFailed));
        assert_eq!(machine.context().game.item_count("basic_net"), 1);
        assert_eq!(machine.context().game.encounter().map(|c| c.id), Some(CreatureId(2)));

        // Back in battle, the enemy takes its free turn before the verdict
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Battling));
        assert!(!machine.context().battle.turn_consumed);
        assert!(machine.context().battle.last_log[0].starts_with("Mudling attacks Sparky"));
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Victory));
        assert_eq!(ui.toasts().len(), 1);
    }

    #[test]
    fn test_battle_victory_end_to_end() {
        let session = GameSession::new("Ash").with_creature(sparky()).with_encounter(mudling());
        let (mut machine, ui) = machine(session, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine
            .transition_to(
                StateTransition::with_payload(
                    GameStateId::Battling,
                    "Encounter",
                    Payload::BattleSetup(BattleSetup::default()),
                ),
                &cancel,
            )
            .unwrap();

        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Victory));
        let shown = ui.events().into_iter().find_map(|e| match e {
            UiEvent::VictoryScreen(Some(rewards)) => Some(rewards),
            _ => None,
        });
        let rewards = shown.expect("victory screen with rewards");
        assert_eq!(rewards.xp, 50);
        assert_eq!(rewards.gold, 25);
        assert!(!rewards.captured);
        assert!(ui.contains(&UiEvent::HideBattleHud));

        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));
        assert!(machine.context().game.encounter().is_none());
        assert_eq!(machine.context().game.flag(flags::LAST_BATTLE_OUTCOME), Some("Victory"));
    }

    #[test]
    fn test_defeat_game_over_loop() {
        let session = GameSession::new("Ash")
            .with_creature(Creature::new(CreatureId(1), "Pip", Element::Fire, 1))
            .with_encounter(mudling());
        let (mut machine, ui) = machine(session, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine
            .transition_to(StateTransition::to(GameStateId::Battling, "Encounter"), &cancel)
            .unwrap();
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Defeat));
        assert_eq!(machine.tick(&cancel).unwrap(), None);
        assert_eq!(machine.tick(&cancel).unwrap(), None);

        machine.context_mut().game.set_flag(flags::DEFEAT_ACKNOWLEDGED, "true");
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::GameOver));
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));
        assert!(ui.contains(&UiEvent::GameOver));
        assert_eq!(machine.context().game.encounter().map(|c| c.id), Some(CreatureId(2)));
    }

    /// Counts lifecycle calls and asks to leave on its first execute
    struct Counter {
        id: GameStateId,
        next: Option<GameStateId>,
        enters: Arc<AtomicU32>,
        executes: Arc<AtomicU32>,
        exits: Arc<AtomicU32>,
    }

    impl Counter {
        fn new(id: GameStateId, next: Option<GameStateId>) -> Self {
            Self {
                id,
                next,
                enters: Arc::default(),
                executes: Arc::default(),
                exits: Arc::default(),
            }
        }
    }

    impl GameState for Counter {
        fn id(&self) -> GameStateId {
            self.id
        }

        fn enter(&mut self, _ctx: &mut GameStateContext, _args: StateArgs, _cancel: &Cancellation) {
            self.enters.fetch_add(1, Ordering::SeqCst);
        }

        fn execute(&mut self, _ctx: &mut GameStateContext, _cancel: &Cancellation) -> Option<StateTransition> {
            self.executes.fetch_add(1, Ordering::SeqCst);
            self.next.take().map(|next| StateTransition::to(next, "Counter"))
        }

        fn exit(&mut self, _ctx: &mut GameStateContext) {
            self.exits.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bare_machine() -> StateMachine {
        let config = MachineConfig {
            start_state: GameStateId::Idle,
            ..MachineConfig::default()
        };
        let ctx = GameStateContext::new(Box::new(GameSession::new("Ash")), Arc::new(RecordingUi::new()), config);
        StateMachine::new(ctx)
    }

    #[test]
    fn test_transition_consumed_once() {
        let mut machine = bare_machine();
        let first = Counter::new(GameStateId::Idle, Some(GameStateId::Exploring));
        let second = Counter::new(GameStateId::Exploring, None);
        let (first_enters, first_executes, first_exits) =
            (first.enters.clone(), first.executes.clone(), first.exits.clone());
        let (second_enters, second_executes) = (second.enters.clone(), second.executes.clone());
        machine.register(Box::new(first));
        machine.register(Box::new(second));
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));
        assert_eq!(machine.tick(&cancel).unwrap(), None);
        assert_eq!(machine.tick(&cancel).unwrap(), None);

        assert_eq!(first_enters.load(Ordering::SeqCst), 1);
        assert_eq!(first_executes.load(Ordering::SeqCst), 1);
        assert_eq!(first_exits.load(Ordering::SeqCst), 1);
        assert_eq!(second_enters.load(Ordering::SeqCst), 1);
        assert_eq!(second_executes.load(Ordering::SeqCst), 2);
        assert_eq!(machine.history().len(), 2);
    }

    #[test]
    fn test_cancelled_tick_is_noop() {
        let mut machine = bare_machine();
        let counter = Counter::new(GameStateId::Idle, Some(GameStateId::Exploring));
        let executes = counter.executes.clone();
        machine.register(Box::new(counter));
        machine.register(Box::new(Counter::new(GameStateId::Exploring, None)));
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        cancel.cancel();
        assert_eq!(machine.tick(&cancel).unwrap(), None);
        assert_eq!(executes.load(Ordering::SeqCst), 0);
        assert_eq!(machine.current_state(), Some(GameStateId::Idle));

        cancel.reset();
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));
    }

    #[test]
    fn test_unregistered_target_leaves_state() {
        let mut machine = bare_machine();
        machine.register(Box::new(Counter::new(GameStateId::Idle, Some(GameStateId::Battling))));
        let cancel = Cancellation::new();

        assert_eq!(machine.tick(&cancel), Err(MachineError::NotInitialized));
        machine.initialize(&cancel).unwrap();
        assert_eq!(
            machine.tick(&cancel),
            Err(MachineError::StateNotRegistered(GameStateId::Battling))
        );
        assert_eq!(machine.current_state(), Some(GameStateId::Idle));
    }

    #[test]
    fn test_force_transition_by_name() {
        let (mut machine, _ui) = machine(GameSession::new("Ash"), MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine.force_transition("game over", &cancel).unwrap();
        assert_eq!(machine.current_state(), Some(GameStateId::GameOver));
        assert_eq!(machine.history().last().map(|r| r.reason.as_str()), Some(reasons::FORCED));

        let result = machine.force_transition("Racing", &cancel);
        assert_eq!(
            result,
            Err(MachineError::UnknownState(ParseError::UnknownState("Racing".to_string())))
        );
        assert_eq!(machine.current_state(), Some(GameStateId::GameOver));
    }

    #[test]
    fn test_inventory_pause_resumes_battle() {
        let session = GameSession::new("Ash").with_creature(sparky()).with_encounter(mudling());
        let (mut machine, ui) = machine(session, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine
            .transition_to(StateTransition::to(GameStateId::Inventory, reasons::PAUSED_BATTLE), &cancel)
            .unwrap();
        assert_eq!(machine.tick(&cancel).unwrap(), None);

        machine.context_mut().game.set_flag(flags::CLOSE_INVENTORY, "true");
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Battling));
        assert!(ui.contains(&UiEvent::HideInventory));
    }

    #[test]
    fn test_dialogue_starts_npc_battle() {
        let mut session = GameSession::new("Ash").with_creature(sparky());
        session.set_current_npc(Some("rival".to_string()));
        let (mut machine, _ui) = machine(session, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine.force_transition("Dialogue", &cancel).unwrap();
        assert_eq!(machine.context().game.flag(flags::IN_DIALOGUE), Some("true"));

        machine.context_mut().game.set_flag(flags::DIALOGUE_REQUESTED_BATTLE, "true");
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Battling));
        assert!(machine.context().game.flag(flags::IN_DIALOGUE).is_none());

        // Nobody to fight, so Battling falls back
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));
        assert_eq!(
            machine.history().last().map(|r| r.reason.as_str()),
            Some(reasons::NO_BATTLE_CREATURES)
        );
    }

    #[test]
    fn test_reward_storage_failure_does_not_block() {
        let session = GameSession::new("Ash").with_creature(sparky()).with_encounter(mudling());
        let mut game = Scripted::new(session);
        game.fail_rewards = true;
        let (mut machine, _ui) = machine(game, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine
            .transition_to(StateTransition::to(GameStateId::Battling, "Encounter"), &cancel)
            .unwrap();
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Victory));
        assert_eq!(machine.context().game.player_level(), 1);
        assert_eq!(machine.tick(&cancel).unwrap(), Some(GameStateId::Exploring));
    }

    #[test]
    fn test_turn_based_sessions_reproduce() {
        let run = || {
            let session = GameSession::new("Ash")
                .with_creature(Creature::new(CreatureId(1), "Blaze", Element::Fire, 6).with_attack(18))
                .with_encounter(Creature::new(CreatureId(2), "Fern", Element::Grass, 6).with_attack(16));
            let config = MachineConfig {
                seed: 7,
                resolver: ResolverKind::TurnBased { turn_limit: 20 },
                ..MachineConfig::default()
            };
            let (mut machine, _ui) = machine(session, config);
            let cancel = Cancellation::new();
            machine.initialize(&cancel).unwrap();
            machine
                .transition_to(StateTransition::to(GameStateId::Battling, "Encounter"), &cancel)
                .unwrap();
            (machine.context().battle.last_log.clone(), machine.context().battle.last_outcome)
        };

        let (first_log, first_outcome) = run();
        let (second_log, second_outcome) = run();
        assert!(!first_log.is_empty());
        assert_eq!(first_log, second_log);
        assert_eq!(first_outcome, second_outcome);
    }

    #[test]
    fn test_training_round_trip() {
        let session = GameSession::new("Ash").with_creature(sparky());
        let (mut machine, ui) = machine(session, MachineConfig::default());
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        let request = arena_protocol::TrainingRequest::new(CreatureId(1), arena_battle::TrainingMode::Speed);
        machine
            .transition_to(
                StateTransition::with_payload(GameStateId::Training, "Gym", Payload::TrainingRequest(request)),
                &cancel,
            )
            .unwrap();

        let mut landed = None;
        for _ in 0..5 {
            if let Some(next) = machine.tick(&cancel).unwrap() {
                landed = Some(next);
                break;
            }
        }
        assert_eq!(landed, Some(GameStateId::Exploring));
        assert!(ui.toasts().iter().any(|t| t.starts_with("Sparky finished Speed training")));
        assert!(machine.context().game.current_creature().is_some_and(|c| c.speed > 10));
    }

    #[tokio::test]
    async fn test_run_until_stop_state() {
        let session = GameSession::new("Ash").with_creature(sparky()).with_encounter(mudling());
        let config = MachineConfig {
            tick_interval_ms: 1,
            ..MachineConfig::default()
        };
        let (mut machine, _ui) = machine(session, config);
        let cancel = Cancellation::new();

        machine.initialize(&cancel).unwrap();
        machine
            .transition_to(StateTransition::to(GameStateId::Battling, "Encounter"), &cancel)
            .unwrap();
        machine.run(&cancel, Some(GameStateId::Exploring)).await.unwrap();

        assert_eq!(machine.current_state(), Some(GameStateId::Exploring));
        assert_eq!(
            reasons_of(&machine)[2..],
            [reasons::BATTLE_WON, reasons::VICTORY_RETURN]
        );
    }

    #[tokio::test]
    async fn test_run_requires_initialize_and_honours_cancel() {
        let (mut machine, _ui) = machine(GameSession::new("Ash"), MachineConfig::default());
        let cancel = Cancellation::new();
        assert!(machine.run(&cancel, None).await.is_err());

        machine.initialize(&cancel).unwrap();
        cancel.cancel();
        machine.run(&cancel, None).await.unwrap();
        assert_eq!(machine.current_state(), Some(GameStateId::Exploring));
    }
}
