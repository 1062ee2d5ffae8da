use sentinel_core::{
    Command, EnemyId, Event, Tuning, TowerId, TowerTarget, WaveNumber, WorldPoint, TICK,
};
use sentinel_system_tower_targeting::TowerTargeting;
use sentinel_world::{self as world, query, World};

#[test]
fn deterministic_replay_tracks_nearest_enemy_and_game_over() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");

    let spawned: Vec<EnemyId> = first
        .events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(spawned, vec![EnemyId::new(0), EnemyId::new(1)]);

    let after_tower = &first.assignments[3];
    assert!(after_tower.is_empty(), "no enemies yet");

    let after_first_spawn = &first.assignments[4];
    assert_eq!(after_first_spawn.len(), 1);
    assert_eq!(after_first_spawn[0].enemy, EnemyId::new(0));

    let after_second_spawn = &first.assignments[5];
    assert_eq!(after_second_spawn.len(), 1);
    assert_eq!(
        after_second_spawn[0].enemy,
        EnemyId::new(0),
        "co-located enemies resolve to the first spawned"
    );

    let walked = first.assignments.last().expect("assignments recorded");
    assert!(
        walked.is_empty(),
        "enemies walked out of range and breached the core"
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(Tuning {
        path: vec![WorldPoint::new(100.0, 100.0), WorldPoint::new(1100.0, 100.0)],
        core_center: WorldPoint::new(1100.0, 700.0),
        ..Tuning::default()
    })
    .expect("valid tuning");
    let mut targeting = TowerTargeting::new();
    let mut current_targets = Vec::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);
        events.extend(generated);

        targeting.handle(
            query::phase(&world),
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut current_targets,
        );

        assignments.push(current_targets.clone());
    }

    ReplayOutcome {
        events,
        assignments,
    }
}

fn scripted_commands() -> Vec<Command> {
    let spawn = Command::SpawnEnemy {
        wave: WaveNumber::FIRST,
    };
    let mut commands = vec![
        Command::BeginSession,
        Command::CompleteLoading,
        Command::PlaceTower {
            position: WorldPoint::new(130.0, 170.0),
        },
        Command::Tick { dt: TICK },
        spawn.clone(),
        spawn,
    ];
    commands.extend(std::iter::repeat(Command::AdvanceEnemies { dt: TICK }).take(600));
    commands.push(Command::ResolveCoreDamage { dt: TICK });
    commands
}

#[derive(Clone, Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    assignments: Vec<Vec<TowerTarget>>,
}

#[test]
fn tower_identifiers_follow_placement_order() {
    let outcome = replay(scripted_commands());
    let placed: Vec<TowerId> = outcome
        .events
        .iter()
        .filter_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .collect();
    assert_eq!(placed, vec![TowerId::new(0)]);
}
