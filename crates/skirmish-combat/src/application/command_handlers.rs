//! Command handlers for the Tactical Combat context.
//!
//! Each handler loads the encounter's event stream, replays it, runs one
//! domain operation and appends the recorded events with optimistic
//! concurrency.

use std::sync::Mutex;

use skirmish_core::aggregate::AggregateRoot;
use skirmish_core::clock::Clock;
use skirmish_core::command::Command;
use skirmish_core::error::DomainError;
use skirmish_core::repository::{EventRepository, StoredEvent};
use skirmish_core::rng::DeterministicRng;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CombatSettings;
use crate::domain::aggregates::{CombatEncounter, EncounterState};
use crate::domain::combatant::Combatant;
use crate::domain::commands::{
    AddMonster, AddPlayer, AdvanceTurn, ApplyDamage, CheckResolution, CreateEncounter,
    FleeEncounter, HealCombatant, MoveCombatant, MoveTarget, PlaceCombatant, StartEncounter,
};
use crate::domain::events::{CombatEvent, CombatEventKind};
use crate::domain::initiative::InitiativeRoll;
use crate::domain::participant::{Monster, PlayerCharacter};
use crate::domain::position::GridPosition;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct CombatCommandResult<T> {
    /// The encounter affected by the command.
    pub aggregate_id: Uuid,
    /// What the domain operation reported back.
    pub outcome: T,
    /// The stored events produced and persisted; empty when the operation
    /// changed nothing.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `CombatEncounter` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    encounter_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<CombatEncounter, DomainError> {
    let mut encounter = CombatEncounter::new(encounter_id);
    for stored in existing_events {
        let kind: CombatEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DomainError::Infrastructure(format!("event deserialization failed: {e}")))?;
        let event = CombatEvent {
            metadata: stored.metadata(),
            kind,
        };
        encounter.apply(&event);
    }
    Ok(encounter)
}

async fn load(
    command: &dyn Command,
    repo: &dyn EventRepository,
) -> Result<CombatEncounter, DomainError> {
    let encounter_id = command.aggregate_id();
    debug!(
        command = command.command_type(),
        encounter_id = %encounter_id,
        "handling command"
    );
    let existing_events = repo.load_events(encounter_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(encounter_id));
    }
    reconstitute(encounter_id, &existing_events)
}

async fn persist<T>(
    encounter: &mut CombatEncounter,
    outcome: T,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<T>, DomainError> {
    let stored_events: Vec<StoredEvent> = encounter
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_event)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(encounter.id, encounter.version(), &stored_events)
            .await?;
    }
    encounter.clear_uncommitted_events();
    debug!(
        encounter_id = %encounter.id,
        events = stored_events.len(),
        "events persisted"
    );

    Ok(CombatCommandResult {
        aggregate_id: encounter.id,
        outcome,
        stored_events,
    })
}

fn rejected(command: &dyn Command, error: &DomainError) {
    warn!(
        command = command.command_type(),
        encounter_id = %command.aggregate_id(),
        %error,
        "command rejected"
    );
}

fn roll_initiative(
    settings: &CombatSettings,
    modifier: i32,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<InitiativeRoll, DomainError> {
    let mut rng_guard = rng
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
    Ok(InitiativeRoll::roll(
        settings.initiative_pool,
        modifier,
        &mut *rng_guard,
    ))
}

/// Handles the `CreateEncounter` command: opens a new stream, attaching a
/// grid built from `settings` when asked to.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the encounter already exists, and
/// any error from building the grid, loading, or appending.
pub async fn handle_create_encounter(
    command: &CreateEncounter,
    settings: &CombatSettings,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<()>, DomainError> {
    let existing_events = repo.load_events(command.encounter_id).await?;
    if !existing_events.is_empty() {
        let error = DomainError::Validation(format!(
            "encounter {} already exists",
            command.encounter_id
        ));
        rejected(command, &error);
        return Err(error);
    }

    let mut encounter = CombatEncounter::create(
        command.encounter_id,
        command.room_id,
        command.previous_room_id,
        command.correlation_id,
        clock,
    );
    if command.with_grid {
        let grid = settings.build_grid(Some(command.room_id))?;
        encounter.attach_grid(grid, command.correlation_id, clock)?;
    }

    persist(&mut encounter, (), repo).await
}

/// Handles the `AddPlayer` command: rolls initiative and adds the player.
/// The outcome is the initiative score.
///
/// The `Mutex` is locked only around the roll, never across an await.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or appending fails.
pub async fn handle_add_player(
    command: &AddPlayer,
    settings: &CombatSettings,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<i32>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let player = PlayerCharacter::new(
        command.player_id,
        command.name.clone(),
        command.max_hp,
        command.defense,
    )
    .inspect_err(|e| rejected(command, e))?;
    let initiative = roll_initiative(settings, command.initiative_modifier, rng)?;
    let combatant = Combatant::for_player(player, initiative);
    let score = combatant.initiative();

    encounter
        .add_combatant(combatant, command.correlation_id, clock)
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, score, repo).await
}

/// Handles the `AddMonster` command: rolls initiative (with the monster's
/// modifier) and adds it under the requested or next free display number.
/// The outcome is the display number used.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or appending fails.
pub async fn handle_add_monster(
    command: &AddMonster,
    settings: &CombatSettings,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<u32>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let mut monster = Monster::new(
        command.monster_id,
        command.name.clone(),
        command.max_hp,
        command.defense,
    )
    .inspect_err(|e| rejected(command, e))?
    .with_initiative_modifier(command.initiative_modifier);
    if let Some(definition_id) = &command.definition_id {
        monster = monster.with_definition(definition_id.clone());
    }

    let display_number = command
        .display_number
        .unwrap_or_else(|| encounter.next_display_number());
    let initiative = roll_initiative(settings, monster.initiative_modifier(), rng)?;
    Combatant::for_monster(monster, initiative, display_number)
        .and_then(|combatant| encounter.add_combatant(combatant, command.correlation_id, clock))
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, display_number, repo).await
}

/// Handles the `StartEncounter` command. The outcome is the turn order.
///
/// # Errors
///
/// Returns `DomainError` if loading, the lifecycle check, or appending fails.
pub async fn handle_start_encounter(
    command: &StartEncounter,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<Vec<Uuid>>, DomainError> {
    let mut encounter = load(command, repo).await?;

    encounter
        .start(command.correlation_id, clock)
        .inspect_err(|e| rejected(command, e))?;
    let turn_order = encounter.turn_order();

    persist(&mut encounter, turn_order, repo).await
}

/// Handles the `AdvanceTurn` command. The outcome is the id of the combatant
/// now acting.
///
/// # Errors
///
/// Returns `DomainError` if loading, the lifecycle check, or appending fails.
pub async fn handle_advance_turn(
    command: &AdvanceTurn,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<Uuid>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let next = encounter
        .advance_turn(command.correlation_id, clock)
        .map(Combatant::id)
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, next, repo).await
}

/// Handles the `ApplyDamage` command. The outcome is the damage dealt after
/// defense.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or appending fails.
pub async fn handle_apply_damage(
    command: &ApplyDamage,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<i32>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let dealt = encounter
        .apply_damage(command.combatant_id, command.amount, command.correlation_id, clock)
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, dealt, repo).await
}

/// Handles the `HealCombatant` command. The outcome is the hit points
/// actually restored.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or appending fails.
pub async fn handle_heal_combatant(
    command: &HealCombatant,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<i32>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let restored = encounter
        .heal(command.combatant_id, command.amount, command.correlation_id, clock)
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, restored, repo).await
}

/// Handles the `CheckResolution` command. The outcome is the state after
/// the check.
///
/// # Errors
///
/// Returns `DomainError` if loading, the lifecycle check, or appending fails.
pub async fn handle_check_resolution(
    command: &CheckResolution,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<EncounterState>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let state = encounter
        .check_for_resolution(command.correlation_id, clock)
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, state, repo).await
}

/// Handles the `FleeEncounter` command.
///
/// # Errors
///
/// Returns `DomainError` if loading, the lifecycle check, or appending fails.
pub async fn handle_flee_encounter(
    command: &FleeEncounter,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<()>, DomainError> {
    let mut encounter = load(command, repo).await?;

    encounter
        .end_by_flee(command.correlation_id, clock)
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, (), repo).await
}

/// Handles the `PlaceCombatant` command. The outcome is whether the
/// combatant was placed; a refused placement persists nothing.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or appending fails.
pub async fn handle_place_combatant(
    command: &PlaceCombatant,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<bool>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let placed = encounter
        .place_combatant(
            command.combatant_id,
            command.position,
            command.correlation_id,
            clock,
        )
        .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, placed, repo).await
}

/// Handles the `MoveCombatant` command. The outcome is the new position, or
/// `None` when the move was refused.
///
/// # Errors
///
/// Returns `DomainError` if loading, validation, or appending fails.
pub async fn handle_move_combatant(
    command: &MoveCombatant,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CombatCommandResult<Option<GridPosition>>, DomainError> {
    let mut encounter = load(command, repo).await?;

    let moved = match command.target {
        MoveTarget::To(to) => encounter
            .move_combatant(command.combatant_id, to, command.correlation_id, clock)
            .map(|moved| moved.then_some(to)),
        MoveTarget::Step(direction) => encounter.move_combatant_in_direction(
            command.combatant_id,
            direction,
            command.correlation_id,
            clock,
        ),
    }
    .inspect_err(|e| rejected(command, e))?;

    persist(&mut encounter, moved, repo).await
}
