//! Aggregate roots for the Tactical Combat context.

use serde::{Deserialize, Serialize};
use skirmish_core::aggregate::AggregateRoot;
use skirmish_core::clock::Clock;
use skirmish_core::error::DomainError;
use skirmish_core::event::EventMetadata;
use tracing::{debug, info};
use uuid::Uuid;

use super::combatant::Combatant;
use super::events::{
    CombatEvent, CombatEventKind, CombatantAdded, CombatantHealed, CombatantMoved,
    CombatantPlaced, CombatantRemovedFromGrid, DamageApplied, EncounterCreated, EncounterEnded,
    EncounterOutcome, EncounterStarted, GridAttached, TurnAdvanced,
};
use super::grid::CombatGrid;
use super::position::{Direction, GridPosition};

/// Lifecycle of an encounter.
///
/// `NotStarted -> Active -> {Victory | Defeat | Fled}`; the last three are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncounterState {
    /// Roster is being assembled.
    #[default]
    NotStarted,
    /// Turns are being taken.
    Active,
    /// Every monster fell.
    Victory,
    /// The player fell.
    Defeat,
    /// The player escaped.
    Fled,
}

impl EncounterState {
    /// Whether the encounter is over.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat | Self::Fled)
    }

    /// Lowercase name used in views and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Active => "active",
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::Fled => "fled",
        }
    }
}

impl From<EncounterOutcome> for EncounterState {
    fn from(outcome: EncounterOutcome) -> Self {
        match outcome {
            EncounterOutcome::Victory => Self::Victory,
            EncounterOutcome::Defeat => Self::Defeat,
            EncounterOutcome::Fled => Self::Fled,
        }
    }
}

/// The aggregate root for one fight.
///
/// Command methods validate, record an event and fold it into state at once,
/// so callers can read the result immediately. Replayed history goes through
/// [`AggregateRoot::apply`], which also bumps the version.
#[derive(Debug)]
pub struct CombatEncounter {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (persisted event count).
    pub(crate) version: i64,
    room_id: Uuid,
    previous_room_id: Option<Uuid>,
    state: EncounterState,
    round_number: u32,
    /// Roster; in turn order once the encounter has started.
    combatants: Vec<Combatant>,
    current_turn: usize,
    grid: Option<CombatGrid>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<CombatEvent>,
}

impl CombatEncounter {
    /// An empty encounter, ready for replay.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            room_id: Uuid::nil(),
            previous_room_id: None,
            state: EncounterState::NotStarted,
            round_number: 0,
            combatants: Vec::new(),
            current_turn: 0,
            grid: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Creates an encounter in `room_id`, producing an `EncounterCreated` event.
    #[must_use]
    pub fn create(
        id: Uuid,
        room_id: Uuid,
        previous_room_id: Option<Uuid>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let mut encounter = Self::new(id);
        encounter.record(
            CombatEventKind::EncounterCreated(EncounterCreated {
                encounter_id: id,
                room_id,
                previous_room_id,
            }),
            correlation_id,
            clock,
        );
        info!(encounter_id = %id, room_id = %room_id, "encounter created");
        encounter
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: CombatEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = CombatEvent {
            metadata: EventMetadata::record(
                kind.event_type(),
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock,
            ),
            kind,
        };
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, kind: &CombatEventKind) {
        match kind {
            CombatEventKind::EncounterCreated(payload) => {
                self.room_id = payload.room_id;
                self.previous_room_id = payload.previous_room_id;
            }
            CombatEventKind::CombatantAdded(payload) => {
                self.combatants.push(payload.combatant.clone());
            }
            CombatEventKind::GridAttached(payload) => {
                self.grid = Some(payload.grid.clone());
            }
            CombatEventKind::EncounterStarted(payload) => {
                let mut remaining = std::mem::take(&mut self.combatants);
                for id in &payload.turn_order {
                    if let Some(index) = remaining.iter().position(|c| c.id() == *id) {
                        self.combatants.push(remaining.remove(index));
                    }
                }
                self.combatants.extend(remaining);
                self.state = EncounterState::Active;
                self.round_number = 1;
                self.current_turn = 0;
            }
            CombatEventKind::TurnAdvanced(payload) => {
                self.current_turn = payload.turn_index;
                self.round_number = payload.round_number;
            }
            CombatEventKind::DamageApplied(payload) => {
                self.set_hit_points(payload.combatant_id, payload.remaining_hp);
            }
            CombatEventKind::CombatantHealed(payload) => {
                self.set_hit_points(payload.combatant_id, payload.current_hp);
            }
            CombatEventKind::CombatantPlaced(payload) => {
                if let Some(grid) = self.grid.as_mut() {
                    grid.place_entity(payload.combatant_id, payload.position, payload.is_player);
                }
            }
            CombatEventKind::CombatantMoved(payload) => {
                if let Some(grid) = self.grid.as_mut() {
                    grid.move_entity(payload.combatant_id, payload.to);
                }
            }
            CombatEventKind::CombatantRemovedFromGrid(payload) => {
                if let Some(grid) = self.grid.as_mut() {
                    grid.remove_entity(payload.combatant_id);
                }
            }
            CombatEventKind::EncounterEnded(payload) => {
                self.state = payload.outcome.into();
            }
        }
    }

    fn set_hit_points(&mut self, combatant_id: Uuid, value: i32) {
        if let Some(combatant) = self.combatants.iter_mut().find(|c| c.id() == combatant_id) {
            combatant.participant_mut().hit_points_mut().set_current(value);
        }
    }

    fn require_state(&self, expected: EncounterState) -> Result<(), DomainError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DomainError::InvalidState(format!(
                "encounter {} is {}, expected {}",
                self.id,
                self.state.as_str(),
                expected.as_str()
            )))
        }
    }

    fn require_not_ended(&self) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::InvalidState(format!(
                "encounter {} has already ended in {}",
                self.id,
                self.state.as_str()
            )));
        }
        Ok(())
    }

    fn index_of(&self, combatant_id: Uuid) -> Result<usize, DomainError> {
        self.combatants
            .iter()
            .position(|c| c.id() == combatant_id)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "combatant {combatant_id} not found in encounter {}",
                    self.id
                ))
            })
    }

    fn grid_for(&self, combatant_id: Uuid) -> Result<(&CombatGrid, &Combatant), DomainError> {
        self.require_not_ended()?;
        let index = self.index_of(combatant_id)?;
        let grid = self.grid.as_ref().ok_or_else(|| {
            DomainError::InvalidState(format!("encounter {} has no grid attached", self.id))
        })?;
        Ok((grid, &self.combatants[index]))
    }

    // --- roster ---

    /// Adds a combatant to the roster, producing a `CombatantAdded` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` once the encounter has started, and
    /// `DomainError::Validation` for a duplicate id, a second player, or a
    /// monster display number already in use.
    pub fn add_combatant(
        &mut self,
        combatant: Combatant,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_state(EncounterState::NotStarted)?;
        if self.combatant(combatant.id()).is_some() {
            return Err(DomainError::Validation(format!(
                "combatant {} is already in encounter {}",
                combatant.id(),
                self.id
            )));
        }
        if combatant.is_player() && self.player().is_some() {
            return Err(DomainError::Validation(format!(
                "encounter {} already has a player",
                self.id
            )));
        }
        if combatant.is_monster() && self.monster_by_number(combatant.display_number()).is_some() {
            return Err(DomainError::Validation(format!(
                "display number {} is already taken in encounter {}",
                combatant.display_number(),
                self.id
            )));
        }

        debug!(
            encounter_id = %self.id,
            combatant = %combatant.label(),
            initiative = combatant.initiative(),
            "combatant added"
        );
        self.record(
            CombatEventKind::CombatantAdded(CombatantAdded {
                encounter_id: self.id,
                combatant,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Next free monster display number: one past the highest in use.
    #[must_use]
    pub fn next_display_number(&self) -> u32 {
        self.combatants
            .iter()
            .filter(|c| c.is_monster())
            .map(Combatant::display_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    // --- lifecycle ---

    /// Sorts the roster by initiative (highest first, ties keep insertion
    /// order) and begins round 1, producing an `EncounterStarted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the encounter has already
    /// started or has no combatants.
    pub fn start(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_state(EncounterState::NotStarted)?;
        if self.combatants.is_empty() {
            return Err(DomainError::InvalidState(format!(
                "encounter {} has no combatants",
                self.id
            )));
        }

        let mut order: Vec<&Combatant> = self.combatants.iter().collect();
        order.sort_by(|a, b| b.initiative().cmp(&a.initiative()));
        let turn_order: Vec<Uuid> = order.into_iter().map(Combatant::id).collect();

        self.record(
            CombatEventKind::EncounterStarted(EncounterStarted {
                encounter_id: self.id,
                turn_order,
            }),
            correlation_id,
            clock,
        );
        info!(
            encounter_id = %self.id,
            combatants = self.combatants.len(),
            "encounter started"
        );
        Ok(())
    }

    /// Moves the turn cursor to the next combatant, wrapping to a new round
    /// after the last one. Dead combatants are not skipped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` unless the encounter is active.
    pub fn advance_turn(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<&Combatant, DomainError> {
        self.require_state(EncounterState::Active)?;

        let mut turn_index = self.current_turn + 1;
        let mut round_number = self.round_number;
        if turn_index >= self.combatants.len() {
            turn_index = 0;
            round_number += 1;
        }
        let combatant_id = self.combatants[turn_index].id();

        self.record(
            CombatEventKind::TurnAdvanced(TurnAdvanced {
                encounter_id: self.id,
                turn_index,
                round_number,
                combatant_id,
            }),
            correlation_id,
            clock,
        );
        if turn_index == 0 {
            debug!(encounter_id = %self.id, round = round_number, "new round");
        }

        self.current_combatant().ok_or_else(|| {
            DomainError::InvalidState(format!("encounter {} has no current combatant", self.id))
        })
    }

    /// Ends the encounter if one side has fallen, producing an
    /// `EncounterEnded` event. A fallen player means defeat even when every
    /// monster has also fallen.
    ///
    /// Returns the state after the check.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` unless the encounter is active.
    pub fn check_for_resolution(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<EncounterState, DomainError> {
        self.require_state(EncounterState::Active)?;

        let player_down = self.player().is_some_and(|p| !p.is_alive());
        let monsters_down = self
            .combatants
            .iter()
            .filter(|c| c.is_monster())
            .all(|c| !c.is_alive());

        let outcome = if player_down {
            Some(EncounterOutcome::Defeat)
        } else if monsters_down {
            Some(EncounterOutcome::Victory)
        } else {
            None
        };

        if let Some(outcome) = outcome {
            self.end(outcome, correlation_id, clock);
        }
        Ok(self.state)
    }

    /// Ends the encounter with the player escaping.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` unless the encounter is active.
    pub fn end_by_flee(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_state(EncounterState::Active)?;
        self.end(EncounterOutcome::Fled, correlation_id, clock);
        Ok(())
    }

    fn end(&mut self, outcome: EncounterOutcome, correlation_id: Uuid, clock: &dyn Clock) {
        let round_number = self.round_number;
        self.record(
            CombatEventKind::EncounterEnded(EncounterEnded {
                encounter_id: self.id,
                outcome,
                round_number,
            }),
            correlation_id,
            clock,
        );
        info!(encounter_id = %self.id, %outcome, round = round_number, "encounter ended");
    }

    // --- hit points ---

    /// Deals `amount` damage to a combatant, reduced by its defense, and
    /// returns the damage actually dealt.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` unless the encounter is active,
    /// and `DomainError::Validation` for an unknown combatant or negative
    /// damage.
    pub fn apply_damage(
        &mut self,
        combatant_id: Uuid,
        amount: i32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<i32, DomainError> {
        self.require_state(EncounterState::Active)?;
        let mut target = self.combatants[self.index_of(combatant_id)?].clone();
        let damage_dealt = target.participant_mut().take_damage(amount)?;
        let remaining_hp = target.current_hp();

        self.record(
            CombatEventKind::DamageApplied(DamageApplied {
                encounter_id: self.id,
                combatant_id,
                raw_damage: amount,
                damage_dealt,
                remaining_hp,
            }),
            correlation_id,
            clock,
        );
        debug!(
            encounter_id = %self.id,
            target = %target.label(),
            damage_dealt,
            remaining_hp,
            "damage applied"
        );
        Ok(damage_dealt)
    }

    /// Restores up to `amount` hit points and returns how many were restored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` unless the encounter is active,
    /// and `DomainError::Validation` for an unknown combatant or a negative
    /// amount.
    pub fn heal(
        &mut self,
        combatant_id: Uuid,
        amount: i32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<i32, DomainError> {
        self.require_state(EncounterState::Active)?;
        let mut target = self.combatants[self.index_of(combatant_id)?].clone();
        let amount_restored = target.participant_mut().heal(amount)?;

        self.record(
            CombatEventKind::CombatantHealed(CombatantHealed {
                encounter_id: self.id,
                combatant_id,
                amount_restored,
                current_hp: target.current_hp(),
            }),
            correlation_id,
            clock,
        );
        Ok(amount_restored)
    }

    // --- grid ---

    /// Attaches (or replaces) the battlefield, producing a `GridAttached`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` once the encounter has ended.
    pub fn attach_grid(
        &mut self,
        grid: CombatGrid,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_not_ended()?;
        debug!(
            encounter_id = %self.id,
            grid_id = %grid.id(),
            width = grid.width(),
            height = grid.height(),
            "grid attached"
        );
        self.record(
            CombatEventKind::GridAttached(GridAttached {
                encounter_id: self.id,
                grid,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Places a combatant on the grid. Returns `Ok(false)` and records
    /// nothing when the cell is off the grid, occupied, or impassable, or the
    /// combatant is already placed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` with no grid attached or after the
    /// encounter ended, and `DomainError::Validation` for an unknown
    /// combatant.
    pub fn place_combatant(
        &mut self,
        combatant_id: Uuid,
        position: GridPosition,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        let (grid, combatant) = self.grid_for(combatant_id)?;
        if !grid.can_place(combatant_id, position) {
            return Ok(false);
        }
        let is_player = combatant.is_player();

        self.record(
            CombatEventKind::CombatantPlaced(CombatantPlaced {
                encounter_id: self.id,
                combatant_id,
                position,
                is_player,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Moves a placed combatant to `to` in one step. Returns `Ok(false)` and
    /// records nothing when the move is refused.
    ///
    /// # Errors
    ///
    /// Same as [`CombatEncounter::place_combatant`].
    pub fn move_combatant(
        &mut self,
        combatant_id: Uuid,
        to: GridPosition,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        let (grid, _) = self.grid_for(combatant_id)?;
        let Some(from) = grid.move_origin(combatant_id, to) else {
            return Ok(false);
        };

        self.record(
            CombatEventKind::CombatantMoved(CombatantMoved {
                encounter_id: self.id,
                combatant_id,
                from,
                to,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Moves a placed combatant one cell in `direction`, returning the new
    /// position, or `None` if the move was refused.
    ///
    /// # Errors
    ///
    /// Same as [`CombatEncounter::place_combatant`].
    pub fn move_combatant_in_direction(
        &mut self,
        combatant_id: Uuid,
        direction: Direction,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Option<GridPosition>, DomainError> {
        let (grid, _) = self.grid_for(combatant_id)?;
        let Some(from) = grid.entity_position(combatant_id) else {
            return Ok(None);
        };
        let to = from.step(direction);
        let moved = self.move_combatant(combatant_id, to, correlation_id, clock)?;
        Ok(moved.then_some(to))
    }

    /// Takes a combatant off the grid. Returns `Ok(false)` if it was not
    /// placed.
    ///
    /// # Errors
    ///
    /// Same as [`CombatEncounter::place_combatant`].
    pub fn remove_from_grid(
        &mut self,
        combatant_id: Uuid,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        let (grid, _) = self.grid_for(combatant_id)?;
        let Some(position) = grid.entity_position(combatant_id) else {
            return Ok(false);
        };

        self.record(
            CombatEventKind::CombatantRemovedFromGrid(CombatantRemovedFromGrid {
                encounter_id: self.id,
                combatant_id,
                position,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Chebyshev distance between two placed combatants.
    #[must_use]
    pub fn distance_between(&self, a: Uuid, b: Uuid) -> Option<u32> {
        self.grid.as_ref()?.distance_between(a, b)
    }

    /// Whether two placed combatants stand next to each other.
    #[must_use]
    pub fn are_adjacent(&self, a: Uuid, b: Uuid) -> bool {
        self.grid.as_ref().is_some_and(|grid| grid.are_adjacent(a, b))
    }

    // --- queries ---

    /// Room the fight takes place in.
    #[must_use]
    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    /// Room the player came from, if known.
    #[must_use]
    pub fn previous_room_id(&self) -> Option<Uuid> {
        self.previous_room_id
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> EncounterState {
        self.state
    }

    /// Current round; 0 before the encounter starts.
    #[must_use]
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Whether the encounter reached a terminal state.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state.is_terminal()
    }

    /// Every combatant, in turn order once started.
    #[must_use]
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// Ids in acting order. Before the start this is insertion order.
    #[must_use]
    pub fn turn_order(&self) -> Vec<Uuid> {
        self.combatants.iter().map(Combatant::id).collect()
    }

    /// Number of combatants, dead or alive.
    #[must_use]
    pub fn combatant_count(&self) -> usize {
        self.combatants.len()
    }

    /// Looks up a combatant by id.
    #[must_use]
    pub fn combatant(&self, combatant_id: Uuid) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == combatant_id)
    }

    /// The player's combatant, if one has joined.
    #[must_use]
    pub fn player(&self) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.is_player())
    }

    /// Cursor into the turn order while active.
    #[must_use]
    pub fn current_turn_index(&self) -> Option<usize> {
        (self.state == EncounterState::Active).then_some(self.current_turn)
    }

    /// Whose turn it is; `None` unless the encounter is active.
    #[must_use]
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.current_turn_index()
            .and_then(|index| self.combatants.get(index))
    }

    /// Whether the player is the one acting.
    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.current_combatant().is_some_and(Combatant::is_player)
    }

    /// Monsters still standing, in roster order.
    #[must_use]
    pub fn active_monsters(&self) -> Vec<&Combatant> {
        self.combatants
            .iter()
            .filter(|c| c.is_monster() && c.is_alive())
            .collect()
    }

    /// Number of monsters still standing.
    #[must_use]
    pub fn active_monster_count(&self) -> usize {
        self.combatants
            .iter()
            .filter(|c| c.is_monster() && c.is_alive())
            .count()
    }

    /// Monster shown under `display_number`, fallen or not. Numbers are
    /// never reused within an encounter, so this is unambiguous.
    #[must_use]
    pub fn monster_by_number(&self, display_number: u32) -> Option<&Combatant> {
        self.combatants
            .iter()
            .find(|c| c.is_monster() && c.display_number() == display_number)
    }

    /// The battlefield, if one is attached.
    #[must_use]
    pub fn grid(&self) -> Option<&CombatGrid> {
        self.grid.as_ref()
    }
}

impl AggregateRoot for CombatEncounter {
    type Event = CombatEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
