//! Commands for the Tactical Combat context.

use skirmish_core::command::Command;
use uuid::Uuid;

use super::position::{Direction, GridPosition};

/// Command to open an encounter in a room.
#[derive(Debug, Clone)]
pub struct CreateEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// Room the fight takes place in.
    pub room_id: Uuid,
    /// Room the player came from.
    pub previous_room_id: Option<Uuid>,
    /// Whether to attach a grid built from the configured dimensions.
    pub with_grid: bool,
}

impl Command for CreateEncounter {
    fn command_type(&self) -> &'static str {
        "combat.create_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to add the player to an encounter.
#[derive(Debug, Clone)]
pub struct AddPlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The player character identifier.
    pub player_id: Uuid,
    /// Character name.
    pub name: String,
    /// Maximum (and starting) hit points.
    pub max_hp: i32,
    /// Flat damage reduction.
    pub defense: i32,
    /// Bonus added to the initiative roll.
    pub initiative_modifier: i32,
}

impl Command for AddPlayer {
    fn command_type(&self) -> &'static str {
        "combat.add_player"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to add a monster to an encounter.
#[derive(Debug, Clone)]
pub struct AddMonster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The monster identifier.
    pub monster_id: Uuid,
    /// Monster name.
    pub name: String,
    /// Content definition the monster was spawned from.
    pub definition_id: Option<String>,
    /// Maximum (and starting) hit points.
    pub max_hp: i32,
    /// Flat damage reduction.
    pub defense: i32,
    /// Bonus added to the initiative roll.
    pub initiative_modifier: i32,
    /// Display number; `None` takes the next free one.
    pub display_number: Option<u32>,
}

impl Command for AddMonster {
    fn command_type(&self) -> &'static str {
        "combat.add_monster"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to sort initiative and begin round 1.
#[derive(Debug, Clone)]
pub struct StartEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
}

impl Command for StartEncounter {
    fn command_type(&self) -> &'static str {
        "combat.start_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to pass the turn to the next combatant.
#[derive(Debug, Clone)]
pub struct AdvanceTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
}

impl Command for AdvanceTurn {
    fn command_type(&self) -> &'static str {
        "combat.advance_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to deal damage to a combatant.
#[derive(Debug, Clone)]
pub struct ApplyDamage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The target.
    pub combatant_id: Uuid,
    /// Damage before defense.
    pub amount: i32,
}

impl Command for ApplyDamage {
    fn command_type(&self) -> &'static str {
        "combat.apply_damage"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to restore hit points to a combatant.
#[derive(Debug, Clone)]
pub struct HealCombatant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The target.
    pub combatant_id: Uuid,
    /// Hit points to restore, before the maximum cap.
    pub amount: i32,
}

impl Command for HealCombatant {
    fn command_type(&self) -> &'static str {
        "combat.heal_combatant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to end the encounter if one side has fallen.
#[derive(Debug, Clone)]
pub struct CheckResolution {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
}

impl Command for CheckResolution {
    fn command_type(&self) -> &'static str {
        "combat.check_resolution"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command for the player to escape the fight.
#[derive(Debug, Clone)]
pub struct FleeEncounter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
}

impl Command for FleeEncounter {
    fn command_type(&self) -> &'static str {
        "combat.flee_encounter"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Command to put a combatant on the grid.
#[derive(Debug, Clone)]
pub struct PlaceCombatant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The combatant to place.
    pub combatant_id: Uuid,
    /// Target cell.
    pub position: GridPosition,
}

impl Command for PlaceCombatant {
    fn command_type(&self) -> &'static str {
        "combat.place_combatant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}

/// Where a [`MoveCombatant`] goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// A specific cell.
    To(GridPosition),
    /// One step in a compass direction.
    Step(Direction),
}

/// Command to move a placed combatant.
#[derive(Debug, Clone)]
pub struct MoveCombatant {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The encounter identifier.
    pub encounter_id: Uuid,
    /// The combatant to move.
    pub combatant_id: Uuid,
    /// Destination.
    pub target: MoveTarget,
}

impl Command for MoveCombatant {
    fn command_type(&self) -> &'static str {
        "combat.move_combatant"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn aggregate_id(&self) -> Uuid {
        self.encounter_id
    }
}
