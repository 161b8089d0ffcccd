//! Session Walkthrough
//!
//! Drives a short session through the run loop: a turn-based battle with
//! named moves, a capture, a training run and a fusion. Set `RUST_LOG=arena_machine=debug` to see
//! every UI request.

use std::sync::Arc;

use anyhow::Result;
use arena_battle::{Creature, CreatureId, Element, Move, TrainingMode};
use arena_machine::{Cancellation, GameSession, MachineConfig, StateMachine, TracingUi};
use arena_protocol::{
    CapturingRequest, FusionRequest, GameStateId, Payload, StateTransition, TrainingRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arena_machine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MachineConfig::from_json(
        r#"{"seed": 2024, "tick_interval_ms": 10, "matchup_jitter": true,
            "resolver": {"kind": "turn_based", "turn_limit": 20}}"#,
    )?;
    let session = GameSession::new("Ash")
        .with_creature(
            Creature::new(CreatureId(1), "Sparky", Element::Electric, 8)
                .with_attack(30)
                .with_moves(vec![Move::jab(), Move::static_jolt(), Move::overdrive()]),
        )
        .with_creature(Creature::new(CreatureId(2), "Tidal", Element::Water, 6).with_attack(24))
        .with_encounter(Creature::new(CreatureId(10), "Cinder", Element::Fire, 4))
        .with_item("reinforced_net", 3)
        .with_environment("wild_zone");

    let mut machine = StateMachine::with_default_states(Box::new(session), Arc::new(TracingUi), config);
    let cancel = Cancellation::new();
    machine.initialize(&cancel)?;

    let steps = [
        StateTransition::to(GameStateId::Battling, "Encounter"),
        StateTransition::with_payload(
            GameStateId::Capturing,
            "Throw",
            Payload::CapturingRequest(CapturingRequest::new("reinforced_net", None)),
        ),
        StateTransition::with_payload(
            GameStateId::Training,
            "Gym",
            Payload::TrainingRequest(TrainingRequest::new(CreatureId(1), TrainingMode::Attack)),
        ),
        StateTransition::with_payload(
            GameStateId::Fusion,
            "Lab",
            Payload::FusionRequest(FusionRequest::new(CreatureId(1), CreatureId(2))),
        ),
    ];

    for step in steps {
        println!("--> {}", step.next);
        machine.context_mut().game.set_encounter(Some(
            Creature::new(CreatureId(10), "Cinder", Element::Fire, 4).with_moves(vec![Move::flame_burst()]),
        ));
        machine.transition_to(step, &cancel)?;
        machine.run(&cancel, Some(GameStateId::Exploring)).await?;
    }

    println!("\nTransitions:");
    for record in machine.history() {
        let from = record.from.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        println!("  {:>16} -> {:<16} ({})", from, record.to, record.reason);
    }

    println!("\nRoster:");
    for creature in machine.context().game.roster() {
        println!(
            "  {} {} Lv.{} [{}] ATK {} HP {}/{}",
            creature.id,
            creature.name,
            creature.level,
            creature.element,
            creature.attack,
            creature.health(),
            creature.max_health()
        );
    }

    Ok(())
}
