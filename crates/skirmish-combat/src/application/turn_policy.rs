//! Turn-taking policies layered on the encounter's advance primitive.

use skirmish_core::clock::Clock;
use skirmish_core::error::DomainError;
use uuid::Uuid;

use crate::domain::aggregates::CombatEncounter;
use crate::domain::combatant::Combatant;

/// Advances until a living combatant is up, trying at most one full round.
///
/// Returns `None` when nobody is left standing; the cursor has then gone
/// once around the order and the round counter has moved on by one.
///
/// # Errors
///
/// Returns `DomainError::InvalidState` unless the encounter is active.
pub fn advance_to_next_living<'a>(
    encounter: &'a mut CombatEncounter,
    correlation_id: Uuid,
    clock: &dyn Clock,
) -> Result<Option<&'a Combatant>, DomainError> {
    for _ in 0..encounter.combatant_count() {
        if encounter.advance_turn(correlation_id, clock)?.is_alive() {
            return Ok(encounter.current_combatant());
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::EncounterState;
    use crate::domain::initiative::InitiativeRoll;
    use crate::domain::participant::{Monster, Participant, PlayerCharacter};
    use skirmish_test_support::FixedClock;

    fn started(monster_hps: &[i32]) -> (CombatEncounter, Vec<Uuid>) {
        let clock = FixedClock::standard();
        let mut enc =
            CombatEncounter::create(Uuid::new_v4(), Uuid::new_v4(), None, Uuid::new_v4(), &clock);
        let player = PlayerCharacter::new(Uuid::new_v4(), "Sigrun", 20, 0).unwrap();
        let mut ids = vec![player.id()];
        enc.add_combatant(
            Combatant::for_player(player, InitiativeRoll::new(20, 0)),
            Uuid::new_v4(),
            &clock,
        )
        .unwrap();
        for (i, hp) in monster_hps.iter().enumerate() {
            let monster = Monster::new(Uuid::new_v4(), "Goblin", *hp, 0).unwrap();
            ids.push(monster.id());
            let number = u32::try_from(i).unwrap() + 1;
            let initiative = InitiativeRoll::new(10 - i32::try_from(i).unwrap(), 0);
            enc.add_combatant(
                Combatant::for_monster(monster, initiative, number).unwrap(),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();
        }
        enc.start(Uuid::new_v4(), &clock).unwrap();
        (enc, ids)
    }

    #[test]
    fn test_skips_fallen_combatants() {
        let clock = FixedClock::standard();
        let (mut enc, ids) = started(&[5, 5, 5]);
        enc.apply_damage(ids[1], 5, Uuid::new_v4(), &clock).unwrap();
        enc.apply_damage(ids[2], 5, Uuid::new_v4(), &clock).unwrap();

        let next = advance_to_next_living(&mut enc, Uuid::new_v4(), &clock)
            .unwrap()
            .unwrap();

        assert_eq!(next.id(), ids[3]);
    }

    #[test]
    fn test_wraps_to_the_player_when_monsters_are_down() {
        let clock = FixedClock::standard();
        let (mut enc, ids) = started(&[5, 5]);
        enc.apply_damage(ids[1], 5, Uuid::new_v4(), &clock).unwrap();
        enc.apply_damage(ids[2], 5, Uuid::new_v4(), &clock).unwrap();

        let next = advance_to_next_living(&mut enc, Uuid::new_v4(), &clock)
            .unwrap()
            .unwrap();

        assert_eq!(next.id(), ids[0]);
        assert_eq!(enc.round_number(), 2);
    }

    #[test]
    fn test_nobody_standing_gives_none_after_one_round() {
        let clock = FixedClock::standard();
        let (mut enc, ids) = started(&[5]);
        for id in &ids {
            enc.apply_damage(*id, 100, Uuid::new_v4(), &clock).unwrap();
        }

        let next = advance_to_next_living(&mut enc, Uuid::new_v4(), &clock).unwrap();

        assert!(next.is_none());
        assert_eq!(enc.round_number(), 2);
        assert_eq!(enc.current_turn_index(), Some(0));
    }

    #[test]
    fn test_requires_active_encounter() {
        let clock = FixedClock::standard();
        let (mut enc, _) = started(&[5]);
        enc.end_by_flee(Uuid::new_v4(), &clock).unwrap();
        assert_eq!(enc.state(), EncounterState::Fled);

        let result = advance_to_next_living(&mut enc, Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::InvalidState(_))));
    }
}
