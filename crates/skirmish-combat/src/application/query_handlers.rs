//! Query handlers for the Tactical Combat context.
//!
//! Handlers reconstitute the encounter from stored events and return
//! read-only view DTOs.

use serde::Serialize;
use skirmish_core::error::DomainError;
use skirmish_core::repository::EventRepository;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::CombatEncounter;
use crate::domain::combatant::Combatant;
use crate::domain::grid::{CombatGrid, TerrainType};

/// Read-only view of one combatant.
#[derive(Debug, Serialize)]
pub struct CombatantView {
    /// Combatant identifier.
    pub combatant_id: Uuid,
    /// Name with the display number for monsters.
    pub label: String,
    /// Whether this is the player.
    pub is_player: bool,
    /// 0 for the player.
    pub display_number: u32,
    /// Initiative score.
    pub initiative: i32,
    /// Remaining hit points.
    pub current_hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Whether the combatant still stands.
    pub is_alive: bool,
    /// Grid position, if placed.
    pub position: Option<(i32, i32)>,
}

/// A cell whose terrain is not plain floor.
#[derive(Debug, Serialize)]
pub struct TerrainView {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Terrain name.
    pub terrain: &'static str,
    /// Content definition of the terrain feature.
    pub definition_id: Option<String>,
}

/// Read-only view of the battlefield.
#[derive(Debug, Serialize)]
pub struct GridView {
    /// Grid identifier.
    pub grid_id: Uuid,
    /// Columns.
    pub width: i32,
    /// Rows.
    pub height: i32,
    /// Non-default terrain, in row-major order.
    pub terrain: Vec<TerrainView>,
}

/// Read-only view of an encounter.
#[derive(Debug, Serialize)]
pub struct EncounterView {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Room the fight takes place in.
    pub room_id: Uuid,
    /// Room the player came from.
    pub previous_room_id: Option<Uuid>,
    /// Lifecycle state name.
    pub state: &'static str,
    /// Current round; 0 before the start.
    pub round_number: u32,
    /// Whose turn it is while active.
    pub current_combatant_id: Option<Uuid>,
    /// Whether the player is acting.
    pub is_player_turn: bool,
    /// Combatants in turn order.
    pub combatants: Vec<CombatantView>,
    /// The battlefield, if attached.
    pub grid: Option<GridView>,
    /// Current version (event count).
    pub version: i64,
}

fn combatant_view(combatant: &Combatant, grid: Option<&CombatGrid>) -> CombatantView {
    CombatantView {
        combatant_id: combatant.id(),
        label: combatant.label(),
        is_player: combatant.is_player(),
        display_number: combatant.display_number(),
        initiative: combatant.initiative(),
        current_hp: combatant.current_hp(),
        max_hp: combatant.max_hp(),
        is_alive: combatant.is_alive(),
        position: grid
            .and_then(|g| g.entity_position(combatant.id()))
            .map(|p| (p.x, p.y)),
    }
}

fn grid_view(grid: &CombatGrid) -> GridView {
    GridView {
        grid_id: grid.id(),
        width: grid.width(),
        height: grid.height(),
        terrain: grid
            .cells()
            .filter(|cell| cell.terrain() != TerrainType::Normal)
            .map(|cell| TerrainView {
                x: cell.position().x,
                y: cell.position().y,
                terrain: cell.terrain().as_str(),
                definition_id: cell.terrain_definition_id().map(str::to_owned),
            })
            .collect(),
    }
}

fn encounter_view(encounter: &CombatEncounter) -> EncounterView {
    let grid = encounter.grid();
    EncounterView {
        encounter_id: encounter.id,
        room_id: encounter.room_id(),
        previous_room_id: encounter.previous_room_id(),
        state: encounter.state().as_str(),
        round_number: encounter.round_number(),
        current_combatant_id: encounter.current_combatant().map(Combatant::id),
        is_player_turn: encounter.is_player_turn(),
        combatants: encounter
            .combatants()
            .iter()
            .map(|c| combatant_view(c, grid))
            .collect(),
        grid: grid.map(grid_view),
        version: encounter.version,
    }
}

/// Retrieves an encounter by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_encounter_by_id(
    encounter_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<EncounterView, DomainError> {
    let stored_events = repo.load_events(encounter_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(encounter_id));
    }
    let encounter = command_handlers::reconstitute(encounter_id, &stored_events)?;
    Ok(encounter_view(&encounter))
}

#[cfg(test)]
mod tests {
    use skirmish_core::repository::StoredEvent;
    use skirmish_test_support::{EmptyEventRepository, FixedClock, RecordingEventRepository};

    use super::*;
    use crate::domain::events::{
        COMBATANT_ADDED_EVENT_TYPE, COMBATANT_PLACED_EVENT_TYPE, CombatEventKind, CombatantAdded,
        CombatantPlaced, ENCOUNTER_CREATED_EVENT_TYPE, ENCOUNTER_STARTED_EVENT_TYPE,
        EncounterCreated, EncounterStarted, GRID_ATTACHED_EVENT_TYPE, GridAttached,
    };
    use crate::domain::initiative::InitiativeRoll;
    use crate::domain::participant::{Monster, Participant, PlayerCharacter};
    use crate::domain::position::GridPosition;

    fn stored(encounter_id: Uuid, sequence_number: i64, event_type: &str, kind: CombatEventKind) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: encounter_id,
            event_type: event_type.to_owned(),
            payload: serde_json::to_value(kind).unwrap(),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: FixedClock::standard().0,
        }
    }

    #[tokio::test]
    async fn test_get_encounter_by_id_returns_active_view() {
        // Arrange
        let encounter_id = Uuid::new_v4();
        let room_id = Uuid::new_v4();
        let player = PlayerCharacter::new(Uuid::new_v4(), "Sigrun", 30, 0).unwrap();
        let player_id = player.id();
        let goblin = Monster::new(Uuid::new_v4(), "Goblin", 7, 0).unwrap();
        let goblin_id = goblin.id();
        let mut grid = CombatGrid::create(4, 4, Some(room_id)).unwrap();
        assert!(grid.set_terrain(
            GridPosition::new(3, 0),
            TerrainType::Hazardous,
            Some("hazard:lava".to_owned()),
        ));

        let events = vec![
            stored(
                encounter_id,
                1,
                ENCOUNTER_CREATED_EVENT_TYPE,
                CombatEventKind::EncounterCreated(EncounterCreated {
                    encounter_id,
                    room_id,
                    previous_room_id: None,
                }),
            ),
            stored(
                encounter_id,
                2,
                GRID_ATTACHED_EVENT_TYPE,
                CombatEventKind::GridAttached(GridAttached { encounter_id, grid }),
            ),
            stored(
                encounter_id,
                3,
                COMBATANT_ADDED_EVENT_TYPE,
                CombatEventKind::CombatantAdded(CombatantAdded {
                    encounter_id,
                    combatant: Combatant::for_player(player, InitiativeRoll::new(4, 0)),
                }),
            ),
            stored(
                encounter_id,
                4,
                COMBATANT_ADDED_EVENT_TYPE,
                CombatEventKind::CombatantAdded(CombatantAdded {
                    encounter_id,
                    combatant: Combatant::for_monster(goblin, InitiativeRoll::new(8, 0), 1)
                        .unwrap(),
                }),
            ),
            stored(
                encounter_id,
                5,
                ENCOUNTER_STARTED_EVENT_TYPE,
                CombatEventKind::EncounterStarted(EncounterStarted {
                    encounter_id,
                    turn_order: vec![goblin_id, player_id],
                }),
            ),
            stored(
                encounter_id,
                6,
                COMBATANT_PLACED_EVENT_TYPE,
                CombatEventKind::CombatantPlaced(CombatantPlaced {
                    encounter_id,
                    combatant_id: player_id,
                    position: GridPosition::new(1, 2),
                    is_player: true,
                }),
            ),
        ];
        let repo = RecordingEventRepository::new(Ok(events));

        // Act
        let view = get_encounter_by_id(encounter_id, &repo).await.unwrap();

        // Assert
        assert_eq!(view.encounter_id, encounter_id);
        assert_eq!(view.room_id, room_id);
        assert_eq!(view.state, "active");
        assert_eq!(view.round_number, 1);
        assert_eq!(view.current_combatant_id, Some(goblin_id));
        assert!(!view.is_player_turn);
        assert_eq!(view.version, 6);

        assert_eq!(view.combatants.len(), 2);
        assert_eq!(view.combatants[0].label, "Goblin [1]");
        assert_eq!(view.combatants[0].position, None);
        assert_eq!(view.combatants[1].combatant_id, player_id);
        assert_eq!(view.combatants[1].position, Some((1, 2)));

        let grid = view.grid.unwrap();
        assert_eq!((grid.width, grid.height), (4, 4));
        assert_eq!(grid.terrain.len(), 1);
        assert_eq!(grid.terrain[0].terrain, "hazardous");
        assert_eq!(grid.terrain[0].definition_id.as_deref(), Some("hazard:lava"));
    }

    #[tokio::test]
    async fn test_view_serializes_to_json() {
        let encounter_id = Uuid::new_v4();
        let events = vec![stored(
            encounter_id,
            1,
            ENCOUNTER_CREATED_EVENT_TYPE,
            CombatEventKind::EncounterCreated(EncounterCreated {
                encounter_id,
                room_id: Uuid::new_v4(),
                previous_room_id: None,
            }),
        )];
        let repo = RecordingEventRepository::new(Ok(events));

        let view = get_encounter_by_id(encounter_id, &repo).await.unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["state"], "not_started");
        assert_eq!(json["round_number"], 0);
        assert!(json["grid"].is_null());
        assert!(json["current_combatant_id"].is_null());
    }

    #[tokio::test]
    async fn test_get_encounter_by_id_returns_not_found_for_empty_stream() {
        let encounter_id = Uuid::new_v4();

        let result = get_encounter_by_id(encounter_id, &EmptyEventRepository).await;

        match result.unwrap_err() {
            DomainError::AggregateNotFound(id) => assert_eq!(id, encounter_id),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
    }
}
