//! Engine settings read from the environment.

use skirmish_core::error::DomainError;
use uuid::Uuid;

use crate::domain::grid::{CombatGrid, DEFAULT_GRID_DIMENSION, check_dimension};
use crate::domain::initiative::DicePool;

/// Grid width variable.
pub const GRID_WIDTH_VAR: &str = "SKIRMISH_GRID_WIDTH";
/// Grid height variable.
pub const GRID_HEIGHT_VAR: &str = "SKIRMISH_GRID_HEIGHT";
/// Number of initiative dice.
pub const INITIATIVE_DICE_VAR: &str = "SKIRMISH_INITIATIVE_DICE";
/// Faces per initiative die.
pub const INITIATIVE_SIDES_VAR: &str = "SKIRMISH_INITIATIVE_SIDES";

/// Tunables for new encounters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatSettings {
    /// Width of grids built by [`CombatSettings::build_grid`].
    pub grid_width: i32,
    /// Height of grids built by [`CombatSettings::build_grid`].
    pub grid_height: i32,
    /// Dice rolled for initiative.
    pub initiative_pool: DicePool,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_DIMENSION,
            grid_height: DEFAULT_GRID_DIMENSION,
            initiative_pool: DicePool::d10(),
        }
    }
}

impl CombatSettings {
    /// Reads settings from the process environment, falling back to defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// See [`CombatSettings::from_lookup`].
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for missing
    /// keys.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for values that are not numbers or
    /// an empty dice pool, and `DomainError::OutOfRange` for grid dimensions
    /// outside the supported range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let defaults = Self::default();
        let grid_width = parse_or(&lookup, GRID_WIDTH_VAR, defaults.grid_width)?;
        let grid_height = parse_or(&lookup, GRID_HEIGHT_VAR, defaults.grid_height)?;
        check_dimension("grid width", grid_width)?;
        check_dimension("grid height", grid_height)?;

        let dice = parse_or(&lookup, INITIATIVE_DICE_VAR, defaults.initiative_pool.count())?;
        let sides = parse_or(&lookup, INITIATIVE_SIDES_VAR, defaults.initiative_pool.sides())?;

        Ok(Self {
            grid_width,
            grid_height,
            initiative_pool: DicePool::new(dice, sides)?,
        })
    }

    /// A fresh grid with the configured dimensions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutOfRange` if the dimensions were set outside
    /// the supported range after loading.
    pub fn build_grid(&self, room_id: Option<Uuid>) -> Result<CombatGrid, DomainError> {
        CombatGrid::create(self.grid_width, self.grid_height, room_id)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, DomainError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| DomainError::Validation(format!("{key} must be a number: {e}"))),
    }
}
