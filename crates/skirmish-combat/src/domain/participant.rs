//! Participants: the player character and monsters that combatants wrap.

use serde::{Deserialize, Serialize};
use skirmish_core::error::DomainError;
use uuid::Uuid;

/// Current and maximum hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    current: i32,
    maximum: i32,
}

impl HitPoints {
    /// Full health at `maximum`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `maximum` is not positive.
    pub fn full(maximum: i32) -> Result<Self, DomainError> {
        if maximum <= 0 {
            return Err(DomainError::Validation(format!(
                "maximum hit points must be positive, got {maximum}"
            )));
        }
        Ok(Self {
            current: maximum,
            maximum,
        })
    }

    /// Remaining hit points.
    #[must_use]
    pub fn current(self) -> i32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub fn maximum(self) -> i32 {
        self.maximum
    }

    /// Positive remaining hit points.
    #[must_use]
    pub fn is_alive(self) -> bool {
        self.current > 0
    }

    /// Sets remaining hit points, clamped to `[0, maximum]`.
    pub(crate) fn set_current(&mut self, value: i32) {
        self.current = value.clamp(0, self.maximum);
    }
}

/// What the combat engine needs from anything that fights.
pub trait Participant {
    /// Stable identifier, shared with the combat grid.
    fn id(&self) -> Uuid;

    /// Display name.
    fn name(&self) -> &str;

    /// Hit point pool.
    fn hit_points(&self) -> HitPoints;

    /// Flat damage reduction.
    fn defense(&self) -> i32;

    /// Mutable access to the hit point pool.
    fn hit_points_mut(&mut self) -> &mut HitPoints;

    /// Remaining hit points.
    fn current_hp(&self) -> i32 {
        self.hit_points().current()
    }

    /// Maximum hit points.
    fn max_hp(&self) -> i32 {
        self.hit_points().maximum()
    }

    /// Whether the participant still stands.
    fn is_alive(&self) -> bool {
        self.hit_points().is_alive()
    }

    /// Applies `damage` reduced by defense (never below zero) and returns
    /// the damage actually dealt. Hit points bottom out at zero.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for negative damage.
    fn take_damage(&mut self, damage: i32) -> Result<i32, DomainError> {
        if damage < 0 {
            return Err(DomainError::Validation(format!(
                "damage cannot be negative, got {damage}"
            )));
        }
        let dealt = (damage - self.defense()).max(0);
        let hp = self.hit_points_mut();
        let remaining = hp.current() - dealt;
        hp.set_current(remaining);
        Ok(dealt)
    }

    /// Restores up to `amount` hit points, capped at the maximum, and returns
    /// the amount actually restored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a negative amount.
    fn heal(&mut self, amount: i32) -> Result<i32, DomainError> {
        if amount < 0 {
            return Err(DomainError::Validation(format!(
                "heal amount cannot be negative, got {amount}"
            )));
        }
        let hp = self.hit_points_mut();
        let restored = amount.min(hp.maximum() - hp.current());
        let healed = hp.current() + restored;
        hp.set_current(healed);
        Ok(restored)
    }
}

/// The player's character as seen by the combat engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    id: Uuid,
    name: String,
    hit_points: HitPoints,
    defense: i32,
}

impl PlayerCharacter {
    /// A player at full health.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `max_hp` is not positive.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        max_hp: i32,
        defense: i32,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: name.into(),
            hit_points: HitPoints::full(max_hp)?,
            defense,
        })
    }
}

impl Participant for PlayerCharacter {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn hit_points(&self) -> HitPoints {
        self.hit_points
    }

    fn defense(&self) -> i32 {
        self.defense
    }

    fn hit_points_mut(&mut self) -> &mut HitPoints {
        &mut self.hit_points
    }
}

/// A hostile creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    id: Uuid,
    name: String,
    /// Content definition this monster was spawned from (e.g. `"goblin"`).
    definition_id: Option<String>,
    hit_points: HitPoints,
    defense: i32,
    initiative_modifier: i32,
}

impl Monster {
    /// A monster at full health.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `max_hp` is not positive.
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        max_hp: i32,
        defense: i32,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: name.into(),
            definition_id: None,
            hit_points: HitPoints::full(max_hp)?,
            defense,
            initiative_modifier: 0,
        })
    }

    /// Tags the monster with its content definition.
    #[must_use]
    pub fn with_definition(mut self, definition_id: impl Into<String>) -> Self {
        self.definition_id = Some(definition_id.into());
        self
    }

    /// Sets the bonus this monster adds to its initiative rolls.
    #[must_use]
    pub fn with_initiative_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }

    /// Content definition identifier.
    #[must_use]
    pub fn definition_id(&self) -> Option<&str> {
        self.definition_id.as_deref()
    }

    /// Bonus added to this monster's initiative rolls.
    #[must_use]
    pub fn initiative_modifier(&self) -> i32 {
        self.initiative_modifier
    }
}

impl Participant for Monster {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn hit_points(&self) -> HitPoints {
        self.hit_points
    }

    fn defense(&self) -> i32 {
        self.defense
    }

    fn hit_points_mut(&mut self) -> &mut HitPoints {
        &mut self.hit_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> Monster {
        Monster::new(Uuid::new_v4(), "Goblin", 10, 2).unwrap()
    }

    #[test]
    fn test_new_participant_starts_at_full_health() {
        let player = PlayerCharacter::new(Uuid::new_v4(), "Sigrun", 30, 1).unwrap();

        assert_eq!(player.current_hp(), 30);
        assert_eq!(player.max_hp(), 30);
        assert!(player.is_alive());
    }

    #[test]
    fn test_non_positive_max_hp_is_rejected() {
        let result = Monster::new(Uuid::new_v4(), "Wisp", 0, 0);

        match result.unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "maximum hit points must be positive, got 0");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_take_damage_is_reduced_by_defense() {
        let mut monster = goblin();

        let dealt = monster.take_damage(5).unwrap();

        assert_eq!(dealt, 3);
        assert_eq!(monster.current_hp(), 7);
    }

    #[test]
    fn test_damage_below_defense_deals_nothing() {
        let mut monster = goblin();

        assert_eq!(monster.take_damage(1).unwrap(), 0);
        assert_eq!(monster.current_hp(), 10);
    }

    #[test]
    fn test_hit_points_never_drop_below_zero() {
        let mut monster = goblin();

        monster.take_damage(100).unwrap();

        assert_eq!(monster.current_hp(), 0);
        assert!(!monster.is_alive());
    }

    #[test]
    fn test_negative_damage_is_rejected() {
        let mut monster = goblin();

        assert!(monster.take_damage(-3).is_err());
        assert_eq!(monster.current_hp(), 10);
    }

    #[test]
    fn test_heal_is_capped_at_maximum() {
        let mut monster = goblin();
        monster.take_damage(6).unwrap();

        let restored = monster.heal(50).unwrap();

        assert_eq!(restored, 4);
        assert_eq!(monster.current_hp(), 10);
    }

    #[test]
    fn test_monster_builders() {
        let monster = goblin()
            .with_definition("goblin_skirmisher")
            .with_initiative_modifier(2);

        assert_eq!(monster.definition_id(), Some("goblin_skirmisher"));
        assert_eq!(monster.initiative_modifier(), 2);
        assert_eq!(monster.name(), "Goblin");
    }
}
