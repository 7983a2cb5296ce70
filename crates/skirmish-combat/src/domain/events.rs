//! Domain events for the Tactical Combat context.

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_core::event::{DomainEvent, EventMetadata};
use uuid::Uuid;

use super::combatant::Combatant;
use super::grid::CombatGrid;
use super::position::GridPosition;

/// Event type for [`EncounterCreated`].
pub const ENCOUNTER_CREATED_EVENT_TYPE: &str = "combat.encounter_created";
/// Event type for [`CombatantAdded`].
pub const COMBATANT_ADDED_EVENT_TYPE: &str = "combat.combatant_added";
/// Event type for [`GridAttached`].
pub const GRID_ATTACHED_EVENT_TYPE: &str = "combat.grid_attached";
/// Event type for [`EncounterStarted`].
pub const ENCOUNTER_STARTED_EVENT_TYPE: &str = "combat.encounter_started";
/// Event type for [`TurnAdvanced`].
pub const TURN_ADVANCED_EVENT_TYPE: &str = "combat.turn_advanced";
/// Event type for [`DamageApplied`].
pub const DAMAGE_APPLIED_EVENT_TYPE: &str = "combat.damage_applied";
/// Event type for [`CombatantHealed`].
pub const COMBATANT_HEALED_EVENT_TYPE: &str = "combat.combatant_healed";
/// Event type for [`CombatantPlaced`].
pub const COMBATANT_PLACED_EVENT_TYPE: &str = "combat.combatant_placed";
/// Event type for [`CombatantMoved`].
pub const COMBATANT_MOVED_EVENT_TYPE: &str = "combat.combatant_moved";
/// Event type for [`CombatantRemovedFromGrid`].
pub const COMBATANT_REMOVED_FROM_GRID_EVENT_TYPE: &str = "combat.combatant_removed_from_grid";
/// Event type for [`EncounterEnded`].
pub const ENCOUNTER_ENDED_EVENT_TYPE: &str = "combat.encounter_ended";

/// How a finished encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterOutcome {
    /// Every monster fell.
    Victory,
    /// The player fell.
    Defeat,
    /// The player escaped.
    Fled,
}

impl fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Victory => write!(f, "victory"),
            Self::Defeat => write!(f, "defeat"),
            Self::Fled => write!(f, "fled"),
        }
    }
}

/// Emitted when a room triggers combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterCreated {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Room the fight takes place in.
    pub room_id: Uuid,
    /// Room the player came from, for retreats.
    pub previous_room_id: Option<Uuid>,
}

/// Emitted when a combatant joins the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantAdded {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Snapshot of the combatant as it joined.
    pub combatant: Combatant,
}

/// Emitted when a battlefield is attached to the encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAttached {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Snapshot of the grid, including terrain and any prior placements.
    pub grid: CombatGrid,
}

/// Emitted when initiative has been sorted and round 1 begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterStarted {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Combatant ids in acting order.
    pub turn_order: Vec<Uuid>,
}

/// Emitted when the turn cursor moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnAdvanced {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// New cursor position in the turn order.
    pub turn_index: usize,
    /// Round number after the advance.
    pub round_number: u32,
    /// Whose turn it now is.
    pub combatant_id: Uuid,
}

/// Emitted when a combatant takes damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageApplied {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The damaged combatant.
    pub combatant_id: Uuid,
    /// Damage before defense.
    pub raw_damage: i32,
    /// Damage after defense.
    pub damage_dealt: i32,
    /// Hit points left.
    pub remaining_hp: i32,
}

/// Emitted when a combatant regains hit points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantHealed {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The healed combatant.
    pub combatant_id: Uuid,
    /// Hit points actually restored.
    pub amount_restored: i32,
    /// Hit points after healing.
    pub current_hp: i32,
}

/// Emitted when a combatant is put on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantPlaced {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The placed combatant.
    pub combatant_id: Uuid,
    /// Where it stands.
    pub position: GridPosition,
    /// Whether it is the player.
    pub is_player: bool,
}

/// Emitted when a combatant moves on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantMoved {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The moving combatant.
    pub combatant_id: Uuid,
    /// Cell left.
    pub from: GridPosition,
    /// Cell entered.
    pub to: GridPosition,
}

/// Emitted when a combatant is taken off the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantRemovedFromGrid {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The removed combatant.
    pub combatant_id: Uuid,
    /// Cell it vacated.
    pub position: GridPosition,
}

/// Emitted when the encounter reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterEnded {
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// How it ended.
    pub outcome: EncounterOutcome,
    /// Round in which it ended.
    pub round_number: u32,
}

/// Event payload variants for the Tactical Combat context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEventKind {
    /// An encounter was created.
    EncounterCreated(EncounterCreated),
    /// A combatant joined the roster.
    CombatantAdded(CombatantAdded),
    /// A battlefield was attached.
    GridAttached(GridAttached),
    /// Initiative was sorted and round 1 began.
    EncounterStarted(EncounterStarted),
    /// The turn cursor moved.
    TurnAdvanced(TurnAdvanced),
    /// A combatant took damage.
    DamageApplied(DamageApplied),
    /// A combatant regained hit points.
    CombatantHealed(CombatantHealed),
    /// A combatant was placed on the grid.
    CombatantPlaced(CombatantPlaced),
    /// A combatant moved on the grid.
    CombatantMoved(CombatantMoved),
    /// A combatant was taken off the grid.
    CombatantRemovedFromGrid(CombatantRemovedFromGrid),
    /// The encounter ended.
    EncounterEnded(EncounterEnded),
}

impl CombatEventKind {
    /// The event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::EncounterCreated(_) => ENCOUNTER_CREATED_EVENT_TYPE,
            Self::CombatantAdded(_) => COMBATANT_ADDED_EVENT_TYPE,
            Self::GridAttached(_) => GRID_ATTACHED_EVENT_TYPE,
            Self::EncounterStarted(_) => ENCOUNTER_STARTED_EVENT_TYPE,
            Self::TurnAdvanced(_) => TURN_ADVANCED_EVENT_TYPE,
            Self::DamageApplied(_) => DAMAGE_APPLIED_EVENT_TYPE,
            Self::CombatantHealed(_) => COMBATANT_HEALED_EVENT_TYPE,
            Self::CombatantPlaced(_) => COMBATANT_PLACED_EVENT_TYPE,
            Self::CombatantMoved(_) => COMBATANT_MOVED_EVENT_TYPE,
            Self::CombatantRemovedFromGrid(_) => COMBATANT_REMOVED_FROM_GRID_EVENT_TYPE,
            Self::EncounterEnded(_) => ENCOUNTER_ENDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Tactical Combat context.
#[derive(Debug, Clone)]
pub struct CombatEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: CombatEventKind,
}

impl DomainEvent for CombatEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("CombatEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trips_through_json() {
        let kind = CombatEventKind::EncounterEnded(EncounterEnded {
            encounter_id: Uuid::new_v4(),
            outcome: EncounterOutcome::Victory,
            round_number: 3,
        });

        let value = serde_json::to_value(&kind).unwrap();
        let back: CombatEventKind = serde_json::from_value(value).unwrap();

        assert_eq!(back, kind);
        assert_eq!(back.event_type(), "combat.encounter_ended");
    }

    #[test]
    fn test_outcome_display_is_snake_case() {
        assert_eq!(EncounterOutcome::Victory.to_string(), "victory");
        assert_eq!(EncounterOutcome::Fled.to_string(), "fled");
    }
}
