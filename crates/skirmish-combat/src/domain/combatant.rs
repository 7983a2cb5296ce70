//! Combatants: participants bound to an initiative score and display number.

use serde::{Deserialize, Serialize};
use skirmish_core::error::DomainError;
use uuid::Uuid;

use super::initiative::InitiativeRoll;
use super::participant::{Monster, Participant, PlayerCharacter};

/// Which side a combatant fights for, and the participant it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatantKind {
    /// The player's character.
    Player(PlayerCharacter),
    /// A hostile creature.
    Monster(Monster),
}

/// One entry in an encounter's turn order.
///
/// Initiative and display number are fixed when the combatant is built;
/// liveness is read from the wrapped participant's hit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    kind: CombatantKind,
    initiative: i32,
    display_number: u32,
}

impl Combatant {
    /// Wraps the player. The player's display number is always 0.
    #[must_use]
    pub fn for_player(player: PlayerCharacter, initiative: InitiativeRoll) -> Self {
        Self {
            kind: CombatantKind::Player(player),
            initiative: initiative.total(),
            display_number: 0,
        }
    }

    /// Wraps a monster under a caller-assigned display number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `display_number` is 0, which is
    /// reserved for the player.
    pub fn for_monster(
        monster: Monster,
        initiative: InitiativeRoll,
        display_number: u32,
    ) -> Result<Self, DomainError> {
        if display_number == 0 {
            return Err(DomainError::Validation(
                "monster display numbers start at 1".to_owned(),
            ));
        }
        Ok(Self {
            kind: CombatantKind::Monster(monster),
            initiative: initiative.total(),
            display_number,
        })
    }

    /// The wrapped participant and its side.
    #[must_use]
    pub fn kind(&self) -> &CombatantKind {
        &self.kind
    }

    /// The wrapped participant.
    #[must_use]
    pub fn participant(&self) -> &dyn Participant {
        match &self.kind {
            CombatantKind::Player(player) => player,
            CombatantKind::Monster(monster) => monster,
        }
    }

    pub(crate) fn participant_mut(&mut self) -> &mut dyn Participant {
        match &mut self.kind {
            CombatantKind::Player(player) => player,
            CombatantKind::Monster(monster) => monster,
        }
    }

    /// Identifier of the wrapped participant.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.participant().id()
    }

    /// Name of the wrapped participant.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.kind {
            CombatantKind::Player(player) => player.name(),
            CombatantKind::Monster(monster) => monster.name(),
        }
    }

    /// Initiative score (roll + modifier).
    #[must_use]
    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    /// 0 for the player; the number players type to target a monster.
    #[must_use]
    pub fn display_number(&self) -> u32 {
        self.display_number
    }

    /// Whether this is a monster.
    #[must_use]
    pub fn is_monster(&self) -> bool {
        matches!(self.kind, CombatantKind::Monster(_))
    }

    /// Whether this is the player.
    #[must_use]
    pub fn is_player(&self) -> bool {
        matches!(self.kind, CombatantKind::Player(_))
    }

    /// Whether the wrapped participant has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.participant().is_alive()
    }

    /// Remaining hit points of the wrapped participant.
    #[must_use]
    pub fn current_hp(&self) -> i32 {
        self.participant().current_hp()
    }

    /// Maximum hit points of the wrapped participant.
    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.participant().max_hp()
    }

    /// Label shown in turn prompts, e.g. `"Goblin [2]"`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_monster() {
            format!("{} [{}]", self.name(), self.display_number)
        } else {
            self.name().to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerCharacter {
        PlayerCharacter::new(Uuid::new_v4(), "Sigrun", 30, 0).unwrap()
    }

    fn monster() -> Monster {
        Monster::new(Uuid::new_v4(), "Goblin", 8, 0).unwrap()
    }

    #[test]
    fn test_for_player_uses_display_number_zero() {
        let combatant = Combatant::for_player(player(), InitiativeRoll::new(12, 3));

        assert!(combatant.is_player());
        assert!(!combatant.is_monster());
        assert_eq!(combatant.display_number(), 0);
        assert_eq!(combatant.initiative(), 15);
    }

    #[test]
    fn test_for_monster_keeps_assigned_number() {
        let combatant = Combatant::for_monster(monster(), InitiativeRoll::new(4, 1), 2).unwrap();

        assert!(combatant.is_monster());
        assert_eq!(combatant.display_number(), 2);
        assert_eq!(combatant.initiative(), 5);
        assert_eq!(combatant.label(), "Goblin [2]");
    }

    #[test]
    fn test_for_monster_rejects_number_zero() {
        let result = Combatant::for_monster(monster(), InitiativeRoll::new(4, 0), 0);

        match result.unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "monster display numbers start at 1"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_liveness_follows_wrapped_hit_points() {
        let mut combatant =
            Combatant::for_monster(monster(), InitiativeRoll::new(4, 0), 1).unwrap();
        assert!(combatant.is_alive());

        combatant.participant_mut().take_damage(8).unwrap();

        assert!(!combatant.is_alive());
        assert_eq!(combatant.current_hp(), 0);
        assert_eq!(combatant.max_hp(), 8);
    }

    #[test]
    fn test_id_matches_participant() {
        let player = player();
        let id = player.id();

        let combatant = Combatant::for_player(player, InitiativeRoll::new(1, 0));

        assert_eq!(combatant.id(), id);
        assert_eq!(combatant.label(), "Sigrun");
    }
}
