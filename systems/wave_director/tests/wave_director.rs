use std::time::Duration;

use sentinel_core::{Command, Event, Phase, Tuning, WaveNumber, WaveProgress, WorldPoint, TICK};
use sentinel_system_wave_director::{Config, WaveDirector};
use sentinel_world::{self as world, query, World};

fn playing_world(tuning: Tuning) -> World {
    let mut world = World::new(tuning).expect("valid tuning");
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginSession, &mut events);
    world::apply(&mut world, Command::CompleteLoading, &mut events);
    world
}

fn progress(spawned: u32, cap: u32, live_enemies: usize) -> WaveProgress {
    WaveProgress {
        wave: WaveNumber::FIRST,
        spawned,
        cap,
        live_enemies,
    }
}

/// Drives one fixed step of the world with only the director attached.
fn step(world: &mut World, director: &mut WaveDirector, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: TICK }, &mut events);

    let mut commands = Vec::new();
    director.handle(
        &events,
        query::phase(world),
        query::wave_progress(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::AdvanceEnemies { dt: TICK }, &mut events);
    world::apply(world, Command::ResolveCoreDamage { dt: TICK }, &mut events);
    log.extend(events);
}

#[test]
fn emits_multiple_spawn_commands_for_large_dt() {
    let mut director = WaveDirector::new(Config::new(Duration::from_millis(500)));
    let mut commands = Vec::new();

    director.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(2),
        }],
        Phase::Playing,
        progress(0, 5, 0),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST
            };
            4
        ]
    );
}

#[test]
fn spawn_commands_never_exceed_cap() {
    let mut director = WaveDirector::new(Config::new(Duration::from_millis(500)));
    let mut commands = Vec::new();

    director.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(10),
        }],
        Phase::Playing,
        progress(3, 5, 3),
        &mut commands,
    );

    assert_eq!(commands.len(), 2);
}

#[test]
fn leaving_playing_resets_accumulator() {
    let mut director = WaveDirector::new(Config::new(Duration::from_secs(1)));
    let mut commands = Vec::new();
    let half = [Event::TimeAdvanced {
        dt: Duration::from_millis(500),
    }];

    director.handle(&half, Phase::Playing, progress(0, 5, 0), &mut commands);
    assert!(commands.is_empty(), "no spawn before full interval");

    director.handle(&[], Phase::GameOver, progress(0, 5, 0), &mut commands);
    assert!(commands.is_empty(), "game over should not spawn");

    director.handle(&half, Phase::Playing, progress(0, 5, 0), &mut commands);
    assert!(commands.is_empty(), "accumulator resets outside playing");

    director.handle(&half, Phase::Playing, progress(0, 5, 0), &mut commands);
    assert_eq!(commands.len(), 1, "expected spawn after full interval");
}

#[test]
fn completed_wave_requests_advance_once_per_call() {
    let mut director = WaveDirector::new(Config::new(Duration::from_millis(1500)));
    let mut commands = Vec::new();

    director.handle(&[], Phase::Playing, progress(5, 5, 1), &mut commands);
    assert!(commands.is_empty(), "live enemies keep the wave open");

    director.handle(&[], Phase::Playing, progress(5, 5, 0), &mut commands);
    assert_eq!(commands, vec![Command::AdvanceWave]);
}

#[test]
fn first_wave_spawns_on_fixed_cadence() {
    let mut world = playing_world(Tuning {
        path: vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(5000.0, 0.0)],
        core_center: WorldPoint::new(5000.0, 700.0),
        ..Tuning::default()
    });
    let mut director = WaveDirector::new(Config::new(Duration::from_millis(1500)));
    let mut log = Vec::new();

    for _ in 0..89 {
        step(&mut world, &mut director, &mut log);
    }
    assert_eq!(query::wave_progress(&world).spawned, 0);

    for _ in 0..2 {
        step(&mut world, &mut director, &mut log);
    }
    assert_eq!(query::wave_progress(&world).spawned, 1);

    for _ in 0..(90 * 10) {
        step(&mut world, &mut director, &mut log);
    }
    let progress = query::wave_progress(&world);
    assert_eq!(progress.spawned, 5);
    assert_eq!(progress.cap, 5);
    assert_eq!(progress.live_enemies, 5);
    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::WaveCompleted { .. })));
}

#[test]
fn cleared_wave_advances_exactly_once() {
    let mut world = playing_world(Tuning {
        path: vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(40.0, 0.0)],
        core_center: WorldPoint::new(1000.0, 700.0),
        initial_wave_cap: 2,
        ..Tuning::default()
    });
    let mut director = WaveDirector::new(Config::new(Duration::from_millis(1500)));
    let mut log = Vec::new();

    for _ in 0..(60 * 6) {
        step(&mut world, &mut director, &mut log);
    }

    let completions: Vec<_> = log
        .iter()
        .filter_map(|event| match event {
            Event::WaveCompleted {
                completed, next, ..
            } => Some((*completed, *next)),
            _ => None,
        })
        .collect();
    assert_eq!(completions, vec![(WaveNumber::FIRST, WaveNumber::new(2))]);

    let progress = query::wave_progress(&world);
    assert_eq!(progress.wave, WaveNumber::new(2));
    assert_eq!(progress.cap, 4);
    assert_eq!(progress.spawned, 1);
}
