//! End-to-end encounter scenarios, in memory and through the handlers.

mod common;

use std::sync::Mutex;

use skirmish_combat::application::arena::EncounterArena;
use skirmish_combat::application::command_handlers::{
    handle_add_monster, handle_add_player, handle_advance_turn, handle_apply_damage,
    handle_check_resolution, handle_create_encounter, handle_flee_encounter,
    handle_move_combatant, handle_place_combatant, handle_start_encounter,
};
use skirmish_combat::application::query_handlers::get_encounter_by_id;
use skirmish_combat::application::turn_policy::advance_to_next_living;
use skirmish_combat::config::CombatSettings;
use skirmish_combat::domain::aggregates::EncounterState;
use skirmish_combat::domain::combatant::Combatant;
use skirmish_combat::domain::commands::{
    AddMonster, AddPlayer, AdvanceTurn, ApplyDamage, CheckResolution, CreateEncounter,
    FleeEncounter, MoveCombatant, MoveTarget, PlaceCombatant, StartEncounter,
};
use skirmish_combat::domain::grid::CombatGrid;
use skirmish_combat::domain::position::{Direction, GridPosition};
use skirmish_core::clock::SystemClock;
use skirmish_core::error::DomainError;
use skirmish_core::rng::{DeterministicRng, StdDeterministicRng};
use skirmish_test_support::RecordingEventRepository;
use uuid::Uuid;

#[test]
fn test_turn_order_wraps_into_round_two() {
    common::init_tracing();
    let clock = common::fixed_clock();
    let mut enc = common::new_encounter();
    let hero = common::player(15);
    let ten = common::monster("Orc", 10, 10, 1);
    let five = common::monster("Goblin", 6, 5, 2);
    let (hero_id, ten_id, five_id) = (hero.id(), ten.id(), five.id());
    // Added out of order on purpose.
    for c in [five, hero, ten] {
        enc.add_combatant(c, Uuid::new_v4(), &clock).unwrap();
    }

    enc.start(Uuid::new_v4(), &clock).unwrap();

    assert_eq!(enc.current_combatant().map(Combatant::id), Some(hero_id));
    assert!(enc.is_player_turn());
    assert_eq!(enc.advance_turn(Uuid::new_v4(), &clock).unwrap().id(), ten_id);
    assert_eq!(enc.advance_turn(Uuid::new_v4(), &clock).unwrap().id(), five_id);
    assert_eq!(enc.advance_turn(Uuid::new_v4(), &clock).unwrap().id(), hero_id);
    assert_eq!(enc.round_number(), 2);
}

#[test]
fn test_distance_and_range_on_default_grid() {
    let mut grid = CombatGrid::create_default();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    assert!(grid.place_entity(a, GridPosition::new(0, 0), true));
    assert!(grid.place_entity(b, GridPosition::new(3, 4), false));

    assert_eq!(grid.distance_between(a, b), Some(4));
    assert!(!grid.are_adjacent(a, b));
    let in_range = grid.entities_in_range(GridPosition::ORIGIN, 4);
    assert_eq!(in_range.len(), 2);
    assert!(in_range.contains(&a) && in_range.contains(&b));
}

#[test]
fn test_all_monsters_down_is_victory() {
    let clock = common::fixed_clock();
    let mut enc = common::new_encounter();
    let hero = common::player(8);
    let goblins = [
        common::monster("Goblin", 4, 6, 1),
        common::monster("Goblin", 4, 3, 2),
    ];
    let goblin_ids: Vec<Uuid> = goblins.iter().map(Combatant::id).collect();
    enc.add_combatant(hero, Uuid::new_v4(), &clock).unwrap();
    for g in goblins {
        enc.add_combatant(g, Uuid::new_v4(), &clock).unwrap();
    }
    enc.start(Uuid::new_v4(), &clock).unwrap();

    for id in &goblin_ids {
        enc.apply_damage(*id, 4, Uuid::new_v4(), &clock).unwrap();
    }

    assert_eq!(enc.active_monster_count(), 0);
    assert_eq!(
        enc.check_for_resolution(Uuid::new_v4(), &clock).unwrap(),
        EncounterState::Victory
    );
    assert!(enc.is_ended());
}

#[test]
fn test_arena_keeps_sessions_apart() {
    let clock = common::fixed_clock();
    let mut arena = EncounterArena::new();
    let (s1, s2) = (Uuid::new_v4(), Uuid::new_v4());

    let first = arena.open(s1, common::new_encounter()).unwrap();
    first.add_combatant(common::player(5), Uuid::new_v4(), &clock).unwrap();
    first.start(Uuid::new_v4(), &clock).unwrap();
    arena.open(s2, common::new_encounter()).unwrap();

    assert_eq!(arena.get(s1).unwrap().state(), EncounterState::Active);
    assert_eq!(arena.get(s2).unwrap().state(), EncounterState::NotStarted);

    let enc = arena.get_mut(s1).unwrap();
    let next = advance_to_next_living(enc, Uuid::new_v4(), &clock)
        .unwrap()
        .map(Combatant::id);
    assert_eq!(next, arena.get(s1).unwrap().player().map(Combatant::id));
}

#[tokio::test]
async fn test_full_fight_through_handlers() {
    common::init_tracing();
    let clock = common::fixed_clock();
    let settings = CombatSettings::default();
    let repo = RecordingEventRepository::new(Ok(vec![]));
    // Player rolls 7 (+1), the wolf rolls 4.
    let rng = common::scripted_rng(vec![7, 4]);
    let encounter_id = Uuid::new_v4();
    let player_id = Uuid::new_v4();
    let wolf_id = Uuid::new_v4();

    handle_create_encounter(
        &CreateEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            room_id: Uuid::new_v4(),
            previous_room_id: Some(Uuid::new_v4()),
            with_grid: true,
        },
        &settings,
        &clock,
        &repo,
    )
    .await
    .unwrap();
    handle_add_player(
        &AddPlayer {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            player_id,
            name: "Sigrun".to_owned(),
            max_hp: 25,
            defense: 2,
            initiative_modifier: 1,
        },
        &settings,
        &clock,
        common::as_dyn(&rng),
        &repo,
    )
    .await
    .unwrap();
    let wolf = handle_add_monster(
        &AddMonster {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            monster_id: wolf_id,
            name: "Wolf".to_owned(),
            definition_id: Some("wolf".to_owned()),
            max_hp: 9,
            defense: 1,
            initiative_modifier: 0,
            display_number: None,
        },
        &settings,
        &clock,
        common::as_dyn(&rng),
        &repo,
    )
    .await
    .unwrap();
    assert_eq!(wolf.outcome, 1);

    let order = handle_start_encounter(
        &StartEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await
    .unwrap();
    assert_eq!(order.outcome, vec![player_id, wolf_id]);

    for (id, at) in [(player_id, GridPosition::new(0, 0)), (wolf_id, GridPosition::new(2, 0))] {
        let placed = handle_place_combatant(
            &PlaceCombatant {
                correlation_id: Uuid::new_v4(),
                encounter_id,
                combatant_id: id,
                position: at,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap();
        assert!(placed.outcome);
    }
    let stepped = handle_move_combatant(
        &MoveCombatant {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            combatant_id: player_id,
            target: MoveTarget::Step(Direction::East),
        },
        &clock,
        &repo,
    )
    .await
    .unwrap();
    assert_eq!(stepped.outcome, Some(GridPosition::new(1, 0)));

    // Wolf defense 1: 10 raw damage deals 9 and drops it.
    let hit = handle_apply_damage(
        &ApplyDamage {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            combatant_id: wolf_id,
            amount: 10,
        },
        &clock,
        &repo,
    )
    .await
    .unwrap();
    assert_eq!(hit.outcome, 9);

    let resolution = handle_check_resolution(
        &CheckResolution {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await
    .unwrap();
    assert_eq!(resolution.outcome, EncounterState::Victory);

    let after_end = handle_advance_turn(
        &AdvanceTurn {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await;
    assert!(matches!(after_end, Err(DomainError::InvalidState(_))));

    let view = get_encounter_by_id(encounter_id, &repo).await.unwrap();
    assert_eq!(view.state, "victory");
    assert_eq!(view.round_number, 1);
    assert!(view.current_combatant_id.is_none());
    assert_eq!(view.combatants[0].position, Some((1, 0)));
    assert_eq!(view.combatants[1].current_hp, 0);
    assert_eq!(view.grid.unwrap().width, 8);
    let sequence: Vec<i64> = repo.stream().iter().map(|e| e.sequence_number).collect();
    assert_eq!(sequence, (1..=sequence.len() as i64).collect::<Vec<_>>());
    assert_eq!(view.version, sequence.len() as i64);
}

#[tokio::test]
async fn test_flee_from_fresh_encounter_through_handlers() {
    let clock = common::fixed_clock();
    let settings = CombatSettings::default();
    let repo = RecordingEventRepository::new(Ok(vec![]));
    let rng = common::scripted_rng(vec![5]);
    let encounter_id = Uuid::new_v4();
    let previous_room = Uuid::new_v4();

    handle_create_encounter(
        &CreateEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            room_id: Uuid::new_v4(),
            previous_room_id: Some(previous_room),
            with_grid: false,
        },
        &settings,
        &clock,
        &repo,
    )
    .await
    .unwrap();
    handle_add_player(
        &AddPlayer {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            player_id: Uuid::new_v4(),
            name: "Sigrun".to_owned(),
            max_hp: 25,
            defense: 0,
            initiative_modifier: 0,
        },
        &settings,
        &clock,
        common::as_dyn(&rng),
        &repo,
    )
    .await
    .unwrap();

    let early = handle_flee_encounter(
        &FleeEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await;
    assert!(matches!(early, Err(DomainError::InvalidState(_))));

    handle_start_encounter(
        &StartEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await
    .unwrap();
    handle_flee_encounter(
        &FleeEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await
    .unwrap();

    let view = get_encounter_by_id(encounter_id, &repo).await.unwrap();
    assert_eq!(view.state, "fled");
    assert_eq!(view.previous_room_id, Some(previous_room));
    assert!(view.grid.is_none());
}

async fn seeded_turn_order(seed: u64, ids: &[Uuid]) -> Vec<Uuid> {
    let clock = SystemClock;
    let settings = CombatSettings::default();
    let repo = RecordingEventRepository::new(Ok(vec![]));
    let rng: Mutex<StdDeterministicRng> = Mutex::new(StdDeterministicRng::seeded(seed));
    let rng_ref: &Mutex<dyn DeterministicRng + Send> = &rng;
    let encounter_id = Uuid::new_v4();

    handle_create_encounter(
        &CreateEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
            room_id: Uuid::new_v4(),
            previous_room_id: None,
            with_grid: false,
        },
        &settings,
        &clock,
        &repo,
    )
    .await
    .unwrap();
    for id in ids {
        handle_add_monster(
            &AddMonster {
                correlation_id: Uuid::new_v4(),
                encounter_id,
                monster_id: *id,
                name: "Skeleton".to_owned(),
                definition_id: None,
                max_hp: 6,
                defense: 0,
                initiative_modifier: 0,
                display_number: None,
            },
            &settings,
            &clock,
            rng_ref,
            &repo,
        )
        .await
        .unwrap();
    }
    handle_start_encounter(
        &StartEncounter {
            correlation_id: Uuid::new_v4(),
            encounter_id,
        },
        &clock,
        &repo,
    )
    .await
    .unwrap()
    .outcome
}

#[tokio::test]
async fn test_seeded_rng_reproduces_initiative_order() {
    let ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();

    let first = seeded_turn_order(2026, &ids).await;
    let second = seeded_turn_order(2026, &ids).await;

    assert_eq!(first, second);
    assert_eq!(first.len(), ids.len());
}
