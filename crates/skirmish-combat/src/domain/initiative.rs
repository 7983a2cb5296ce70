//! Initiative rolls.

use std::fmt;

use serde::{Deserialize, Serialize};
use skirmish_core::error::DomainError;
use skirmish_core::rng::DeterministicRng;

/// A pool of identical dice, e.g. `1d10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePool {
    count: u32,
    sides: u32,
}

impl DicePool {
    /// `count` dice with `sides` faces each.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when either value is zero.
    pub fn new(count: u32, sides: u32) -> Result<Self, DomainError> {
        if count == 0 || sides == 0 {
            return Err(DomainError::Validation(format!(
                "dice pool needs at least one die with at least one side, got {count}d{sides}"
            )));
        }
        Ok(Self { count, sides })
    }

    /// A single ten-sided die, the default initiative pool.
    #[must_use]
    pub const fn d10() -> Self {
        Self { count: 1, sides: 10 }
    }

    /// Number of dice.
    #[must_use]
    pub fn count(self) -> u32 {
        self.count
    }

    /// Faces per die.
    #[must_use]
    pub fn sides(self) -> u32 {
        self.sides
    }

    /// Rolls every die and returns the sum.
    #[allow(clippy::cast_possible_wrap)]
    pub fn roll(self, rng: &mut dyn DeterministicRng) -> i32 {
        (0..self.count)
            .map(|_| rng.roll_die(self.sides) as i32)
            .sum()
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// A rolled initiative: dice result plus a fixed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeRoll {
    /// Sum of the dice.
    pub roll: i32,
    /// Flat bonus or penalty.
    pub modifier: i32,
}

impl InitiativeRoll {
    /// Wraps an already-rolled result.
    #[must_use]
    pub const fn new(roll: i32, modifier: i32) -> Self {
        Self { roll, modifier }
    }

    /// Rolls `pool` and adds `modifier`.
    pub fn roll(pool: DicePool, modifier: i32, rng: &mut dyn DeterministicRng) -> Self {
        Self {
            roll: pool.roll(rng),
            modifier,
        }
    }

    /// Roll plus modifier; this is the combatant's initiative score.
    #[must_use]
    pub const fn total(self) -> i32 {
        self.roll + self.modifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_test_support::{MockRng, SequenceRng};

    #[test]
    fn test_total_adds_modifier() {
        assert_eq!(InitiativeRoll::new(7, 3).total(), 10);
        assert_eq!(InitiativeRoll::new(2, -4).total(), -2);
    }

    #[test]
    fn test_roll_sums_every_die() {
        let pool = DicePool::new(3, 6).unwrap();
        let mut rng = SequenceRng::new(vec![2, 5, 6]);

        let roll = InitiativeRoll::roll(pool, 1, &mut rng);

        assert_eq!(roll.roll, 13);
        assert_eq!(roll.total(), 14);
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn test_mock_rng_rolls_minimum() {
        assert_eq!(DicePool::d10().roll(&mut MockRng), 1);
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        assert!(DicePool::new(0, 10).is_err());
        assert!(DicePool::new(2, 0).is_err());
    }

    #[test]
    fn test_display_uses_dice_notation() {
        assert_eq!(DicePool::new(2, 10).unwrap().to_string(), "2d10");
    }
}
