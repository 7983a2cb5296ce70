//! Shared helpers for encounter integration tests.
#![allow(dead_code)]

use std::sync::Mutex;

use skirmish_combat::domain::aggregates::CombatEncounter;
use skirmish_combat::domain::combatant::Combatant;
use skirmish_combat::domain::initiative::InitiativeRoll;
use skirmish_combat::domain::participant::{Monster, PlayerCharacter};
use skirmish_core::rng::DeterministicRng;
use skirmish_test_support::{FixedClock, SequenceRng};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Installs a test-writer subscriber honouring `RUST_LOG` (default `warn`).
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> FixedClock {
    FixedClock::standard()
}

/// A scripted RNG behind the mutex the handlers expect.
pub fn scripted_rng(values: Vec<u32>) -> Mutex<SequenceRng> {
    Mutex::new(SequenceRng::new(values))
}

/// Reborrows a scripted RNG as the trait object handlers take.
pub fn as_dyn(rng: &Mutex<SequenceRng>) -> &Mutex<dyn DeterministicRng + Send> {
    rng
}

/// A fresh encounter in a random room.
pub fn new_encounter() -> CombatEncounter {
    CombatEncounter::create(
        Uuid::new_v4(),
        Uuid::new_v4(),
        None,
        Uuid::new_v4(),
        &fixed_clock(),
    )
}

/// Player combatant with a fixed initiative score.
pub fn player(initiative: i32) -> Combatant {
    let pc = PlayerCharacter::new(Uuid::new_v4(), "Sigrun", 30, 0).unwrap();
    Combatant::for_player(pc, InitiativeRoll::new(initiative, 0))
}

/// Monster combatant with a fixed initiative score.
pub fn monster(name: &str, hp: i32, initiative: i32, display_number: u32) -> Combatant {
    let m = Monster::new(Uuid::new_v4(), name, hp, 0).unwrap();
    Combatant::for_monster(m, InitiativeRoll::new(initiative, 0), display_number).unwrap()
}
