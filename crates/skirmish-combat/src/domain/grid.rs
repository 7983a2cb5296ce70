//! The combat grid: cells, terrain, and the entity position index.
//!
//! Boundary and occupancy failures are ordinary outcomes here. Every query
//! that can miss returns `Option`, every mutation that can be refused
//! returns `bool`, and a refused mutation leaves the grid untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use skirmish_core::error::DomainError;
use uuid::Uuid;

use super::position::{Direction, GridPosition};

/// Smallest permitted grid width or height.
pub const MIN_GRID_DIMENSION: i32 = 3;
/// Largest permitted grid width or height.
pub const MAX_GRID_DIMENSION: i32 = 20;
/// Width and height of [`CombatGrid::create_default`].
pub const DEFAULT_GRID_DIMENSION: i32 = 8;

/// Terrain of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    /// Open ground.
    #[default]
    Normal,
    /// Rubble, mud, undergrowth. Passable.
    Difficult,
    /// Passable but harmful to stand in.
    Hazardous,
    /// Walls, pits, pillars.
    Impassable,
}

impl TerrainType {
    /// Whether an entity may stand on this terrain.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Impassable)
    }

    /// Snake-case name used in read views.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Difficult => "difficult",
            Self::Hazardous => "hazardous",
            Self::Impassable => "impassable",
        }
    }
}

/// One square of the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    position: GridPosition,
    terrain: TerrainType,
    terrain_definition_id: Option<String>,
    occupant: Option<Uuid>,
    occupant_is_player: bool,
}

impl Cell {
    fn empty(position: GridPosition) -> Self {
        Self {
            position,
            terrain: TerrainType::Normal,
            terrain_definition_id: None,
            occupant: None,
            occupant_is_player: false,
        }
    }

    /// The coordinate of this cell.
    #[must_use]
    pub fn position(&self) -> GridPosition {
        self.position
    }

    /// Whether an entity stands here.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// The entity standing here, if any.
    #[must_use]
    pub fn occupant(&self) -> Option<Uuid> {
        self.occupant
    }

    /// Whether the entity standing here is the player.
    #[must_use]
    pub fn is_player_occupied(&self) -> bool {
        self.occupant.is_some() && self.occupant_is_player
    }

    /// The cell's terrain.
    #[must_use]
    pub fn terrain(&self) -> TerrainType {
        self.terrain
    }

    /// Content identifier of the terrain feature (e.g. `"hazard:lava"`).
    #[must_use]
    pub fn terrain_definition_id(&self) -> Option<&str> {
        self.terrain_definition_id.as_deref()
    }

    /// Whether the terrain admits an entity.
    #[must_use]
    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    /// Whether the terrain hurts whoever stands in it.
    #[must_use]
    pub fn is_hazard(&self) -> bool {
        self.terrain == TerrainType::Hazardous
    }

    fn occupy(&mut self, entity_id: Uuid, is_player: bool) {
        self.occupant = Some(entity_id);
        self.occupant_is_player = is_player;
    }

    fn vacate(&mut self) -> bool {
        let was_player = self.occupant_is_player;
        self.occupant = None;
        self.occupant_is_player = false;
        was_player
    }
}

/// A rectangular battlefield with an index of where each entity stands.
///
/// Invariant: `entity_positions` contains `(e, p)` exactly when the cell at
/// `p` names `e` as its occupant. All mutators update both sides together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatGrid {
    id: Uuid,
    width: i32,
    height: i32,
    room_id: Option<Uuid>,
    cells: Vec<Cell>,
    entity_positions: HashMap<Uuid, GridPosition>,
}

impl CombatGrid {
    /// Creates an empty `width` × `height` grid.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutOfRange` if either dimension is outside
    /// `[MIN_GRID_DIMENSION, MAX_GRID_DIMENSION]`.
    pub fn create(width: i32, height: i32, room_id: Option<Uuid>) -> Result<Self, DomainError> {
        Self::with_id(Uuid::new_v4(), width, height, room_id)
    }

    /// Like [`CombatGrid::create`] with a caller-chosen identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutOfRange` for dimensions outside the
    /// permitted range.
    pub fn with_id(
        id: Uuid,
        width: i32,
        height: i32,
        room_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        check_dimension("grid width", width)?;
        check_dimension("grid height", height)?;
        Ok(Self::build(id, width, height, room_id))
    }

    /// An 8×8 grid with no room association.
    #[must_use]
    pub fn create_default() -> Self {
        Self::build(
            Uuid::new_v4(),
            DEFAULT_GRID_DIMENSION,
            DEFAULT_GRID_DIMENSION,
            None,
        )
    }

    fn build(id: Uuid, width: i32, height: i32, room_id: Option<Uuid>) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::empty(GridPosition::new(x, y))))
            .collect();
        Self {
            id,
            width,
            height,
            room_id,
            cells,
            entity_positions: HashMap::new(),
        }
    }

    /// Grid identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The room this battlefield belongs to.
    #[must_use]
    pub fn room_id(&self) -> Option<Uuid> {
        self.room_id
    }

    /// Whether `position` lies on the grid.
    #[must_use]
    pub fn is_in_bounds(&self, position: GridPosition) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    #[allow(clippy::cast_sign_loss)]
    fn index_of(&self, position: GridPosition) -> Option<usize> {
        self.is_in_bounds(position)
            .then(|| (position.y * self.width + position.x) as usize)
    }

    /// The cell at `position`, or `None` off the grid.
    #[must_use]
    pub fn cell(&self, position: GridPosition) -> Option<&Cell> {
        self.index_of(position).map(|index| &self.cells[index])
    }

    /// The cell at `(x, y)`, or `None` off the grid.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cell(GridPosition::new(x, y))
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// In bounds, passable, and unoccupied.
    #[must_use]
    pub fn is_valid_position(&self, position: GridPosition) -> bool {
        self.cell(position)
            .is_some_and(|cell| cell.is_passable() && !cell.is_occupied())
    }

    /// The entity standing at `position`.
    #[must_use]
    pub fn occupant_at(&self, position: GridPosition) -> Option<Uuid> {
        self.cell(position).and_then(Cell::occupant)
    }

    /// Whether [`CombatGrid::place_entity`] would succeed.
    #[must_use]
    pub fn can_place(&self, entity_id: Uuid, position: GridPosition) -> bool {
        !self.contains_entity(entity_id) && self.is_valid_position(position)
    }

    /// Places an entity on a free, passable, in-bounds cell.
    ///
    /// Returns `false` without changing anything when the cell is off the
    /// grid, occupied, or impassable, or when the entity is already placed.
    pub fn place_entity(&mut self, entity_id: Uuid, position: GridPosition, is_player: bool) -> bool {
        if !self.can_place(entity_id, position) {
            return false;
        }
        let Some(index) = self.index_of(position) else {
            return false;
        };

        self.cells[index].occupy(entity_id, is_player);
        self.entity_positions.insert(entity_id, position);
        true
    }

    /// Takes an entity off the grid. Returns `false` if it was not placed.
    pub fn remove_entity(&mut self, entity_id: Uuid) -> bool {
        let Some(position) = self.entity_positions.remove(&entity_id) else {
            return false;
        };
        if let Some(index) = self.index_of(position) {
            self.cells[index].vacate();
        }
        true
    }

    /// Where the entity would move from if [`CombatGrid::move_entity`] to
    /// `new_position` were to succeed, or `None` if it would be refused.
    #[must_use]
    pub fn move_origin(&self, entity_id: Uuid, new_position: GridPosition) -> Option<GridPosition> {
        let old_position = self.entity_position(entity_id)?;
        self.is_valid_position(new_position).then_some(old_position)
    }

    /// Moves an entity to `new_position` as a single step.
    ///
    /// Either both the old cell is freed and the new one occupied, or (when
    /// the entity is absent or the destination is not a valid position)
    /// nothing changes and `false` is returned.
    pub fn move_entity(&mut self, entity_id: Uuid, new_position: GridPosition) -> bool {
        let Some(old_position) = self.move_origin(entity_id, new_position) else {
            return false;
        };
        let (Some(from), Some(to)) = (self.index_of(old_position), self.index_of(new_position))
        else {
            return false;
        };

        let is_player = self.cells[from].vacate();
        self.cells[to].occupy(entity_id, is_player);
        self.entity_positions.insert(entity_id, new_position);
        true
    }

    /// Moves an entity one cell in `direction`, returning where it ended up.
    pub fn move_entity_in_direction(
        &mut self,
        entity_id: Uuid,
        direction: Direction,
    ) -> Option<GridPosition> {
        let destination = self.entity_position(entity_id)?.step(direction);
        self.move_entity(entity_id, destination).then_some(destination)
    }

    /// Where an entity stands.
    #[must_use]
    pub fn entity_position(&self, entity_id: Uuid) -> Option<GridPosition> {
        self.entity_positions.get(&entity_id).copied()
    }

    /// Whether the entity is on the grid.
    #[must_use]
    pub fn contains_entity(&self, entity_id: Uuid) -> bool {
        self.entity_positions.contains_key(&entity_id)
    }

    /// The full entity → position index.
    #[must_use]
    pub fn entity_positions(&self) -> &HashMap<Uuid, GridPosition> {
        &self.entity_positions
    }

    /// Number of placed entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entity_positions.len()
    }

    /// Where the player stands, if placed.
    #[must_use]
    pub fn player_position(&self) -> Option<GridPosition> {
        self.entity_positions
            .values()
            .copied()
            .find(|position| self.cell(*position).is_some_and(Cell::is_player_occupied))
    }

    /// Chebyshev distance between two placed entities.
    #[must_use]
    pub fn distance_between(&self, a: Uuid, b: Uuid) -> Option<u32> {
        let from = self.entity_position(a)?;
        let to = self.entity_position(b)?;
        Some(from.distance_to(to))
    }

    /// Whether two placed entities stand next to each other (distance 1).
    #[must_use]
    pub fn are_adjacent(&self, a: Uuid, b: Uuid) -> bool {
        self.distance_between(a, b) == Some(1)
    }

    /// Entities within `range` of `origin`, nearest first. Ties are ordered
    /// by position so the result is stable.
    #[must_use]
    pub fn entities_in_range(&self, origin: GridPosition, range: u32) -> Vec<Uuid> {
        let mut hits: Vec<(u32, GridPosition, Uuid)> = self
            .entity_positions
            .iter()
            .map(|(&entity_id, &position)| (origin.distance_to(position), position, entity_id))
            .filter(|(distance, _, _)| *distance <= range)
            .collect();
        hits.sort_unstable();
        hits.into_iter().map(|(_, _, entity_id)| entity_id).collect()
    }

    /// The in-bounds neighbours of `position` (3 at a corner, 5 on an edge,
    /// 8 inside).
    #[must_use]
    pub fn adjacent_cells(&self, position: GridPosition) -> Vec<&Cell> {
        position
            .neighbors()
            .into_iter()
            .filter_map(|neighbor| self.cell(neighbor))
            .collect()
    }

    /// Changes a cell's terrain.
    ///
    /// Returns `false` off the grid, or when making an occupied cell
    /// impassable (which would strand its occupant).
    pub fn set_terrain(
        &mut self,
        position: GridPosition,
        terrain: TerrainType,
        definition_id: Option<String>,
    ) -> bool {
        let Some(index) = self.index_of(position) else {
            return false;
        };
        let cell = &mut self.cells[index];
        if cell.is_occupied() && !terrain.is_passable() {
            return false;
        }
        cell.terrain = terrain;
        cell.terrain_definition_id = definition_id;
        true
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let occupied = self.cells.iter().filter(|cell| cell.is_occupied()).count();
        occupied == self.entity_positions.len()
            && self
                .entity_positions
                .iter()
                .all(|(id, position)| self.occupant_at(*position) == Some(*id))
    }
}

pub(crate) fn check_dimension(what: &'static str, value: i32) -> Result<(), DomainError> {
    if (MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::OutOfRange {
            what,
            value: i64::from(value),
            min: i64::from(MIN_GRID_DIMENSION),
            max: i64::from(MAX_GRID_DIMENSION),
        })
    }
}
