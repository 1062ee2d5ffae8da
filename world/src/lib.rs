#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Sentinel.
//!
//! The world owns every enemy, tower and projectile together with the
//! economy, core integrity and session phase. It is mutated exclusively
//! through [`apply`] and observed through the [`query`] module.

mod enemies;
mod projectiles;
mod towers;

use std::time::Duration;

use sentinel_core::{
    Bounds, Command, Cycles, EnemyId, Event, Path, Phase, PlacementError, ProjectileId, TowerId,
    Tuning, TuningError, WaveNumber, WorldPoint,
};

use enemies::Enemy;
use projectiles::{Projectile, ProjectileStatus};
use towers::TowerRegistry;

/// Represents the authoritative Sentinel session state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    path: Path,
    core_bounds: Bounds,
    phase: Phase,
    clock: Duration,
    cycles: Cycles,
    integrity: f32,
    score: u32,
    wave: WaveNumber,
    spawned_in_wave: u32,
    wave_cap: u32,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    next_projectile_id: ProjectileId,
}

impl World {
    /// Creates a new world on the start menu using the provided tuning.
    pub fn new(tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        let path = tuning.build_path()?;
        let core_bounds = tuning.core_bounds();
        Ok(Self {
            phase: Phase::StartMenu,
            clock: Duration::ZERO,
            cycles: tuning.starting_cycles(),
            integrity: tuning.max_integrity,
            score: 0,
            wave: WaveNumber::FIRST,
            spawned_in_wave: 0,
            wave_cap: tuning.initial_wave_cap,
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
            path,
            core_bounds,
            tuning,
        })
    }

    fn set_phase(&mut self, to: Phase, out_events: &mut Vec<Event>) {
        let from = self.phase;
        self.phase = to;
        tracing::info!(?from, ?to, "session phase changed");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn reset_session(&mut self) {
        self.clock = Duration::ZERO;
        self.cycles = self.tuning.starting_cycles();
        self.integrity = self.tuning.max_integrity;
        self.score = 0;
        self.wave = WaveNumber::FIRST;
        self.spawned_in_wave = 0;
        self.wave_cap = self.tuning.initial_wave_cap;
        self.enemies.clear();
        self.towers = TowerRegistry::new();
        self.projectiles.clear();
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.binary_search_by_key(&enemy, |e| e.id).ok()
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        id
    }

    fn place_tower(&mut self, position: WorldPoint) -> Result<TowerPlacement, PlacementError> {
        if self.phase != Phase::Playing {
            return Err(PlacementError::InvalidPhase);
        }

        let cost = self.tuning.tower_cost();
        let remaining = self
            .cycles
            .checked_sub(cost)
            .ok_or(PlacementError::InsufficientCycles)?;

        let snapped = position.snap_to_tile(self.tuning.tile_size);
        let footprint = Bounds::square(snapped, self.tuning.tower_footprint);
        if self.towers.overlaps(&footprint) {
            return Err(PlacementError::Overlapping);
        }

        let tower = self.towers.insert(snapped, self.tuning.tower_footprint);
        self.cycles = remaining;
        Ok(TowerPlacement {
            tower,
            position: snapped,
            cost,
        })
    }

    fn fire_projectile(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.clock;
        let cooldown = self.tuning.tower_cooldown();
        let range = self.tuning.tower_range;

        let Some(origin) = self.towers.get(tower).and_then(|state| {
            (state.ready_in(now, cooldown).is_zero()).then_some(state.position)
        }) else {
            return;
        };

        let Some(index) = self.enemy_index(target) else {
            return;
        };
        let enemy = &self.enemies[index];
        if enemy.is_dead() || origin.distance_to(enemy.position()) > range {
            return;
        }

        let projectile = self.allocate_projectile_id();
        self.projectiles.push(Projectile::launch(
            projectile,
            target,
            origin,
            self.tuning.projectile_speed,
            self.tuning.projectile_size,
        ));
        if let Some(state) = self.towers.get_mut(tower) {
            state.last_shot = Some(now);
        }
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let in_flight = std::mem::take(&mut self.projectiles);
        let mut survivors = Vec::with_capacity(in_flight.len());

        for mut projectile in in_flight {
            let target_index = self.enemy_index(projectile.target);
            let target_position = target_index.map(|index| self.enemies[index].position());

            let status = projectile.advance(dt, target_position);
            if status == ProjectileStatus::Fizzled {
                out_events.push(Event::ProjectileFizzled {
                    projectile: projectile.id,
                });
                continue;
            }

            let bounds = projectile.bounds();
            let struck = target_index
                .filter(|&index| {
                    status == ProjectileStatus::Arrived
                        || self.enemies[index].bounds().overlaps(&bounds)
                })
                .or_else(|| {
                    self.enemies
                        .iter()
                        .position(|enemy| enemy.bounds().overlaps(&bounds))
                });

            let Some(index) = struck else {
                survivors.push(projectile);
                continue;
            };

            let enemy = &mut self.enemies[index];
            enemy.apply_hit();
            out_events.push(Event::ProjectileHit {
                projectile: projectile.id,
                enemy: enemy.id,
            });

            if enemy.is_dead() {
                let killed = self.enemies.remove(index);
                let reward = Cycles::new(self.tuning.kill_reward);
                self.cycles = self.cycles.saturating_add(reward);
                self.score = self.score.saturating_add(1);
                tracing::debug!(enemy = killed.id.get(), score = self.score, "enemy killed");
                out_events.push(Event::EnemyKilled {
                    enemy: killed.id,
                    reward,
                });
            }
        }

        self.projectiles = survivors;
    }

    fn resolve_core_damage(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let overlapping = self
            .enemies
            .iter()
            .filter(|enemy| enemy.bounds().overlaps(&self.core_bounds))
            .count();
        let amount = overlapping as f32 * self.tuning.core_drain_per_second * dt.as_secs_f32();
        if amount > 0.0 {
            self.integrity -= amount;
            out_events.push(Event::CoreDrained { amount });
        }

        let penalty = self.tuning.breach_penalty;
        let mut index = 0;
        while index < self.enemies.len() {
            if self.enemies[index].reached_end() {
                let breached = self.enemies.remove(index);
                self.integrity -= penalty;
                tracing::debug!(enemy = breached.id.get(), "enemy breached the core");
                out_events.push(Event::EnemyBreached {
                    enemy: breached.id,
                    penalty,
                });
            } else {
                index += 1;
            }
        }

        self.integrity = self.integrity.max(0.0);
        if self.integrity <= 0.0 {
            tracing::info!(score = self.score, wave = self.wave.get(), "core integrity lost");
            self.set_phase(Phase::GameOver, out_events);
            out_events.push(Event::SessionLost {
                score: self.score,
                wave: self.wave,
            });
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct TowerPlacement {
    tower: TowerId,
    position: WorldPoint,
    cost: Cycles,
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Phase transitions and placement requests are honoured in every phase;
/// all other commands are ignored unless the session is playing.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginSession => {
            if world.phase == Phase::StartMenu {
                world.set_phase(Phase::AiLoading, out_events);
            }
        }
        Command::CompleteLoading => {
            if world.phase == Phase::AiLoading {
                world.set_phase(Phase::Playing, out_events);
            }
        }
        Command::Reset => {
            if world.phase == Phase::GameOver {
                world.reset_session();
                out_events.push(Event::SessionReset);
                world.set_phase(Phase::StartMenu, out_events);
            }
        }
        Command::PlaceTower { position } => match world.place_tower(position) {
            Ok(placement) => {
                tracing::debug!(
                    tower = placement.tower.get(),
                    x = placement.position.x,
                    y = placement.position.y,
                    "tower placed"
                );
                out_events.push(Event::TowerPlaced {
                    tower: placement.tower,
                    position: placement.position,
                    cost: placement.cost,
                });
            }
            Err(reason) => {
                tracing::debug!(?reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { position, reason });
            }
        },
        gated => {
            if world.phase == Phase::Playing {
                apply_playing(world, gated, out_events);
            }
        }
    }
}

fn apply_playing(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { wave } => {
            if wave != world.wave || world.spawned_in_wave >= world.wave_cap {
                return;
            }
            let id = world.allocate_enemy_id();
            world.enemies.push(Enemy::spawn(
                id,
                wave,
                &world.path,
                world.tuning.enemy_hit_points,
            ));
            world.spawned_in_wave += 1;
            tracing::debug!(enemy = id.get(), wave = wave.get(), "enemy spawned");
            out_events.push(Event::EnemySpawned { enemy: id, wave });
        }
        Command::AdvanceWave => {
            if !query::wave_progress(world).is_complete() {
                return;
            }
            let completed = world.wave;
            let bonus = Cycles::new(world.tuning.wave_clear_bonus);
            world.wave = completed.next();
            world.spawned_in_wave = 0;
            world.wave_cap = world
                .wave_cap
                .saturating_add(world.tuning.wave_cap_increment);
            world.cycles = world.cycles.saturating_add(bonus);
            tracing::info!(
                completed = completed.get(),
                next = world.wave.get(),
                cap = world.wave_cap,
                "wave completed"
            );
            out_events.push(Event::WaveCompleted {
                completed,
                next: world.wave,
                bonus,
            });
        }
        Command::AdvanceEnemies { dt } => {
            for enemy in world.enemies.iter_mut() {
                enemy.advance(dt, &world.path);
            }
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::AdvanceProjectiles { dt } => world.advance_projectiles(dt, out_events),
        Command::ResolveCoreDamage { dt } => world.resolve_core_damage(dt, out_events),
        Command::BeginSession
        | Command::CompleteLoading
        | Command::Reset
        | Command::PlaceTower { .. } => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use sentinel_core::{
        Bounds, Cycles, EnemyView, Path, Phase, ProjectileSnapshot, TowerCooldownView, TowerView,
        Tuning, WaveNumber, WaveProgress,
    };

    /// Current session phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Session time accumulated while playing.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Balance constants the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Path every enemy walks along.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Collision box of the defended core.
    #[must_use]
    pub fn core_bounds(world: &World) -> Bounds {
        world.core_bounds
    }

    /// Cycles currently available to the player.
    #[must_use]
    pub fn cycles(world: &World) -> Cycles {
        world.cycles
    }

    /// Remaining core integrity.
    #[must_use]
    pub fn integrity(world: &World) -> f32 {
        world.integrity
    }

    /// Number of enemies destroyed this session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Wave currently in progress.
    #[must_use]
    pub fn wave(world: &World) -> WaveNumber {
        world.wave
    }

    /// Spawn bookkeeping for the wave in progress.
    #[must_use]
    pub fn wave_progress(world: &World) -> WaveProgress {
        WaveProgress {
            wave: world.wave,
            spawned: world.spawned_in_wave,
            cap: world.wave_cap,
            live_enemies: world.enemies.len(),
        }
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots(world.tuning.tower_range))
    }

    /// Number of towers placed this session.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Captures the cooldown of every tower at the current session time.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .cooldowns(world.clock, world.tuning.tower_cooldown()),
        )
    }

    /// Captures every projectile in flight, ordered by identifier.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::TICK;

    fn playing_world(tuning: Tuning) -> World {
        let mut world = World::new(tuning).expect("valid tuning");
        let mut events = Vec::new();
        apply(&mut world, Command::BeginSession, &mut events);
        apply(&mut world, Command::CompleteLoading, &mut events);
        assert_eq!(query::phase(&world), Phase::Playing);
        world
    }

    fn straight_tuning() -> Tuning {
        Tuning {
            path: vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(100.0, 0.0)],
            core_center: WorldPoint::new(1000.0, 700.0),
            ..Tuning::default()
        }
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let tuning = Tuning {
            path: vec![WorldPoint::new(0.0, 0.0)],
            ..Tuning::default()
        };
        assert!(matches!(
            World::new(tuning),
            Err(TuningError::PathTooShort { count: 1 })
        ));
    }

    #[test]
    fn phase_transitions_follow_state_machine() {
        let mut world = World::new(Tuning::default()).expect("valid tuning");
        let mut events = Vec::new();

        apply(&mut world, Command::CompleteLoading, &mut events);
        apply(&mut world, Command::Reset, &mut events);
        assert_eq!(query::phase(&world), Phase::StartMenu);
        assert!(events.is_empty());

        apply(&mut world, Command::BeginSession, &mut events);
        apply(&mut world, Command::BeginSession, &mut events);
        apply(&mut world, Command::CompleteLoading, &mut events);

        assert_eq!(
            events,
            vec![
                Event::PhaseChanged {
                    from: Phase::StartMenu,
                    to: Phase::AiLoading,
                },
                Event::PhaseChanged {
                    from: Phase::AiLoading,
                    to: Phase::Playing,
                },
            ]
        );
    }

    #[test]
    fn simulation_commands_are_ignored_outside_playing() {
        let mut world = World::new(Tuning::default()).expect("valid tuning");
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::clock(&world), Duration::ZERO);
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn placement_outside_playing_is_rejected() {
        let mut world = World::new(Tuning::default()).expect("valid tuning");
        let mut events = Vec::new();
        let position = WorldPoint::new(100.0, 300.0);

        apply(&mut world, Command::PlaceTower { position }, &mut events);

        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                position,
                reason: PlacementError::InvalidPhase,
            }]
        );
        assert_eq!(query::tower_count(&world), 0);
    }

    #[test]
    fn placement_snaps_and_deducts_cost() {
        let mut world = playing_world(Tuning::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(95.0, 41.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TowerPlaced {
                tower: TowerId::new(0),
                position: WorldPoint::new(100.0, 60.0),
                cost: Cycles::new(50),
            }]
        );
        assert_eq!(query::cycles(&world), Cycles::new(50));
    }

    #[test]
    fn insufficient_cycles_never_creates_or_deducts() {
        let mut world = playing_world(Tuning {
            starting_cycles: 40,
            ..Tuning::default()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(500.0, 500.0),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::InsufficientCycles,
                ..
            }]
        ));
        assert_eq!(query::cycles(&world), Cycles::new(40));
        assert_eq!(query::tower_count(&world), 0);
    }

    #[test]
    fn overlapping_placement_is_rejected_without_cost() {
        let mut world = playing_world(Tuning::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(500.0, 500.0),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(510.0, 515.0),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::Overlapping,
                ..
            }]
        ));
        assert_eq!(query::cycles(&world), Cycles::new(50));
        assert_eq!(query::tower_count(&world), 1);
    }

    #[test]
    fn spawning_never_exceeds_wave_cap() {
        let mut world = playing_world(Tuning::default());
        let mut events = Vec::new();

        for _ in 0..10 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    wave: WaveNumber::FIRST,
                },
                &mut events,
            );
        }

        let progress = query::wave_progress(&world);
        assert_eq!(progress.spawned, 5);
        assert_eq!(progress.live_enemies, 5);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn stale_wave_spawn_is_ignored() {
        let mut world = playing_world(Tuning::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::new(3),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn wave_advances_only_when_complete() {
        let mut world = playing_world(Tuning {
            initial_wave_cap: 1,
            ..straight_tuning()
        });
        let mut events = Vec::new();

        apply(&mut world, Command::AdvanceWave, &mut events);
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        apply(&mut world, Command::AdvanceWave, &mut events);
        assert_eq!(query::wave(&world), WaveNumber::FIRST);

        for _ in 0..60 {
            apply(&mut world, Command::AdvanceEnemies { dt: TICK }, &mut events);
        }
        apply(&mut world, Command::ResolveCoreDamage { dt: TICK }, &mut events);
        events.clear();

        apply(&mut world, Command::AdvanceWave, &mut events);
        apply(&mut world, Command::AdvanceWave, &mut events);

        assert_eq!(
            events,
            vec![Event::WaveCompleted {
                completed: WaveNumber::FIRST,
                next: WaveNumber::new(2),
                bonus: Cycles::new(50),
            }]
        );
        let progress = query::wave_progress(&world);
        assert_eq!(progress.cap, 3);
        assert_eq!(progress.spawned, 0);
        assert_eq!(query::cycles(&world), Cycles::new(150));
    }

    #[test]
    fn breach_applies_penalty_once() {
        let mut world = playing_world(straight_tuning());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        for _ in 0..120 {
            apply(&mut world, Command::AdvanceEnemies { dt: TICK }, &mut events);
            apply(&mut world, Command::ResolveCoreDamage { dt: TICK }, &mut events);
        }

        let breaches = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyBreached { .. }))
            .count();
        assert_eq!(breaches, 1);
        assert!((query::integrity(&world) - 90.0).abs() < f32::EPSILON);
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn core_drain_is_proportional_to_overlapping_enemies() {
        let mut world = playing_world(Tuning {
            path: vec![WorldPoint::new(0.0, 0.0), WorldPoint::new(1000.0, 0.0)],
            core_center: WorldPoint::new(0.0, 0.0),
            ..Tuning::default()
        });
        let mut events = Vec::new();

        for _ in 0..2 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    wave: WaveNumber::FIRST,
                },
                &mut events,
            );
        }
        events.clear();
        apply(
            &mut world,
            Command::ResolveCoreDamage {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );

        match events.as_slice() {
            [Event::CoreDrained { amount }] => assert!((amount - 6.0).abs() < 1e-4),
            other => panic!("unexpected events: {other:?}"),
        }
        assert!((query::integrity(&world) - 94.0).abs() < 1e-4);
    }

    #[test]
    fn integrity_clamps_and_game_over_fires_once() {
        let mut world = playing_world(Tuning {
            max_integrity: 5.0,
            ..straight_tuning()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        for _ in 0..120 {
            apply(&mut world, Command::AdvanceEnemies { dt: TICK }, &mut events);
            apply(&mut world, Command::ResolveCoreDamage { dt: TICK }, &mut events);
        }

        assert_eq!(query::phase(&world), Phase::GameOver);
        assert_eq!(query::integrity(&world), 0.0);
        let losses = events
            .iter()
            .filter(|event| matches!(event, Event::SessionLost { .. }))
            .count();
        assert_eq!(losses, 1);
    }

    #[test]
    fn tower_fires_once_per_cooldown() {
        let mut world = playing_world(Tuning {
            path: vec![WorldPoint::new(100.0, 100.0), WorldPoint::new(100.0, 700.0)],
            ..Tuning::default()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(180.0, 100.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        events.clear();

        let fire = Command::FireProjectile {
            tower: TowerId::new(0),
            target: EnemyId::new(0),
        };
        apply(&mut world, fire.clone(), &mut events);
        apply(&mut world, fire.clone(), &mut events);
        assert_eq!(events.len(), 1);

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(800),
            },
            &mut events,
        );
        apply(&mut world, fire, &mut events);
        let fired = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn out_of_range_fire_request_is_ignored() {
        let mut world = playing_world(straight_tuning());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(700.0, 700.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(0),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn simultaneous_hits_award_kill_once() {
        let mut world = playing_world(Tuning {
            enemy_hit_points: 1,
            path: vec![WorldPoint::new(100.0, 100.0), WorldPoint::new(100.0, 700.0)],
            ..Tuning::default()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(140.0, 100.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(60.0, 100.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        for tower in [TowerId::new(0), TowerId::new(1)] {
            apply(
                &mut world,
                Command::FireProjectile {
                    tower,
                    target: EnemyId::new(0),
                },
                &mut events,
            );
        }
        assert_eq!(query::projectiles(&world).len(), 2);
        events.clear();

        for _ in 0..20 {
            apply(
                &mut world,
                Command::AdvanceProjectiles { dt: TICK },
                &mut events,
            );
        }

        let kills = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .count();
        let hits = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileHit { .. }))
            .count();
        let fizzles = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFizzled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(hits, 1);
        assert_eq!(fizzles, 1);
        assert_eq!(query::score(&world), 1);
        assert_eq!(query::cycles(&world), Cycles::new(10));
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn projectile_strikes_overlapping_enemy_in_its_way() {
        let mut world = playing_world(Tuning {
            path: vec![WorldPoint::new(100.0, 100.0), WorldPoint::new(100.0, 700.0)],
            ..Tuning::default()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(100.0, 180.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        for _ in 0..20 {
            apply(&mut world, Command::AdvanceEnemies { dt: TICK }, &mut events);
        }
        let blocker = query::enemy_view(&world)
            .iter()
            .next()
            .cloned()
            .expect("enemy 0 spawned");
        assert!((blocker.position.y - 144.0).abs() < 0.5);

        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(1),
            },
            &mut events,
        );
        assert_eq!(query::projectiles(&world).len(), 1);
        let cycles_before = query::cycles(&world);
        events.clear();

        for _ in 0..15 {
            apply(
                &mut world,
                Command::AdvanceProjectiles { dt: TICK },
                &mut events,
            );
        }

        let hits: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::ProjectileHit { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .collect();
        assert_eq!(hits, vec![EnemyId::new(0)]);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { .. })));

        let healths: Vec<(EnemyId, u32)> = query::enemy_view(&world)
            .iter()
            .map(|enemy| (enemy.id, enemy.health))
            .collect();
        assert_eq!(healths, vec![(EnemyId::new(0), 2), (EnemyId::new(1), 3)]);
        assert!(query::projectiles(&world).is_empty());
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::cycles(&world), cycles_before);
    }

    #[test]
    fn reset_restores_initial_session() {
        let mut world = playing_world(Tuning {
            max_integrity: 5.0,
            initial_wave_cap: 1,
            ..straight_tuning()
        });
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceTower {
                position: WorldPoint::new(500.0, 500.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                wave: WaveNumber::FIRST,
            },
            &mut events,
        );
        for _ in 0..120 {
            apply(&mut world, Command::AdvanceEnemies { dt: TICK }, &mut events);
            apply(&mut world, Command::ResolveCoreDamage { dt: TICK }, &mut events);
        }
        assert_eq!(query::phase(&world), Phase::GameOver);
        events.clear();

        apply(&mut world, Command::Reset, &mut events);

        assert_eq!(
            events,
            vec![
                Event::SessionReset,
                Event::PhaseChanged {
                    from: Phase::GameOver,
                    to: Phase::StartMenu,
                },
            ]
        );
        assert_eq!(query::phase(&world), Phase::StartMenu);
        assert_eq!(query::cycles(&world), Cycles::new(100));
        assert!((query::integrity(&world) - 5.0).abs() < f32::EPSILON);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::wave(&world), WaveNumber::FIRST);
        assert_eq!(query::wave_progress(&world).cap, 1);
        assert_eq!(query::tower_count(&world), 0);
        assert!(query::enemy_view(&world).is_empty());
        assert!(query::projectiles(&world).is_empty());
    }
}
