#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sentinel engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The simulation loop submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

mod geometry;
mod tuning;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use geometry::{Bounds, WorldPoint};
pub use tuning::{Path, Tuning, TuningError};

/// Canonical banner shown on the start menu before any lore arrives.
pub const WELCOME_BANNER: &str = "Press SPACE to initialize Firewall Lore...";

/// Number of simulation updates performed per second of game time.
pub const TICK_RATE_HZ: u32 = 60;

/// Duration of a single fixed simulation step.
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE_HZ as u64);

const ENEMY_BASE_SPEED: f32 = 2.0;
const ENEMY_SPEED_PER_WAVE: f32 = 0.2;
const ENEMY_MAX_SPEED: f32 = 6.0;

/// Expresses an elapsed duration as a fractional count of reference ticks.
///
/// Speeds are tuned in world units per reference tick, so every movement
/// budget is `speed * ticks_in(dt)`.
#[must_use]
pub fn ticks_in(dt: Duration) -> f32 {
    dt.as_secs_f32() * TICK_RATE_HZ as f32
}

/// Session phase driving which inputs and updates are honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Idle menu awaiting the player's start input.
    StartMenu,
    /// Waiting for the opening lore before the first wave begins.
    AiLoading,
    /// Live simulation: enemies spawn, towers fire, integrity drains.
    Playing,
    /// The core has been overrun; awaiting a reboot input.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Leaves the start menu and begins loading the opening lore.
    BeginSession,
    /// Completes the loading phase and starts play.
    CompleteLoading,
    /// Restores the session to its initial state after a game over.
    Reset,
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy of the given wave enter the path.
    SpawnEnemy {
        /// Wave whose difficulty scaling applies to the enemy.
        wave: WaveNumber,
    },
    /// Requests that the current wave be closed and the next one opened.
    AdvanceWave,
    /// Moves every live enemy along the path.
    AdvanceEnemies {
        /// Duration of simulated time covered by the movement.
        dt: Duration,
    },
    /// Requests placement of a tower near the provided world position.
    PlaceTower {
        /// Raw pointer position; the world snaps it to a tile centre.
        position: WorldPoint,
    },
    /// Requests that a tower launch a projectile at an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile homes on.
        target: EnemyId,
    },
    /// Moves projectiles and resolves their collisions with enemies.
    AdvanceProjectiles {
        /// Duration of simulated time covered by the movement.
        dt: Duration,
    },
    /// Applies core drain and breach penalties, then checks for defeat.
    ResolveCoreDamage {
        /// Duration of simulated time the drain is proportional to.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: Phase,
        /// Phase that became active.
        to: Phase,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Wave the enemy belongs to.
        wave: WaveNumber,
    },
    /// Reports that an enemy was destroyed by tower fire.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Cycles awarded for the kill.
        reward: Cycles,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyBreached {
        /// Identifier of the enemy that breached.
        enemy: EnemyId,
        /// Integrity removed by the breach.
        penalty: f32,
    },
    /// Reports continuous damage from enemies sitting on the core.
    CoreDrained {
        /// Integrity removed during the tick.
        amount: f32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Tile-centred position of the tower.
        position: WorldPoint,
        /// Cycles spent on the placement.
        cost: Cycles,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Raw position provided in the placement request.
        position: WorldPoint,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes on.
        target: EnemyId,
    },
    /// Reports that a projectile struck an enemy.
    ProjectileHit {
        /// Projectile that was consumed by the hit.
        projectile: ProjectileId,
        /// Enemy that lost one point of health.
        enemy: EnemyId,
    },
    /// Reports that a projectile vanished because its target no longer exists.
    ProjectileFizzled {
        /// Projectile that was removed.
        projectile: ProjectileId,
    },
    /// Reports that every enemy of a wave has been dealt with.
    WaveCompleted {
        /// Wave that just ended.
        completed: WaveNumber,
        /// Wave that starts next.
        next: WaveNumber,
        /// Cycles awarded as the wave-clear bonus.
        bonus: Cycles,
    },
    /// Reports that the core integrity reached zero.
    SessionLost {
        /// Kill count reached during the session.
        score: u32,
        /// Wave in progress when the core fell.
        wave: WaveNumber,
    },
    /// Confirms that the session state was restored to its initial values.
    SessionReset,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One-based wave counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// First wave of every session.
    pub const FIRST: Self = Self(1);

    /// Creates a wave number, clamping zero to the first wave.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self::FIRST
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric wave index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Movement speed in world units per tick for enemies of this wave.
    ///
    /// Grows by 0.2 per wave from a base of 2 and is capped at 6 so late
    /// waves remain playable.
    #[must_use]
    pub fn enemy_speed(self) -> f32 {
        (ENEMY_BASE_SPEED + self.0 as f32 * ENEMY_SPEED_PER_WAVE).min(ENEMY_MAX_SPEED)
    }

    /// Edge length of an enemy's square body for this wave.
    #[must_use]
    pub fn enemy_size(self) -> f32 {
        (24 + self.0.min(16)) as f32
    }

    /// Body colour for enemies of this wave, growing redder as waves escalate.
    #[must_use]
    pub fn enemy_color(self) -> EnemyColor {
        let red = 100_u32.saturating_add(self.0.saturating_mul(10)).min(255);
        EnemyColor::from_rgb(red as u8, 50, 50)
    }
}

/// In-session currency balance.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cycles(u32);

impl Cycles {
    /// Creates a balance holding the provided amount.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric balance.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Adds the provided amount, saturating at the numeric limit.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts the provided amount when affordable.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

/// Visual appearance applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EnemyColor {
    /// Creates a new enemy color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The session is not in the playing phase, so placement is disabled.
    InvalidPhase,
    /// The player cannot afford the tower.
    InsufficientCycles,
    /// The snapped footprint overlaps an existing tower.
    Overlapping,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Wave the enemy was spawned for.
    pub wave: WaveNumber,
    /// Centre of the enemy's body.
    pub position: WorldPoint,
    /// Collision box centred on the position.
    pub bounds: Bounds,
    /// Remaining hits before the enemy is destroyed.
    pub health: u32,
    /// Hits the enemy could absorb when spawned.
    pub max_health: u32,
    /// Index of the waypoint the enemy is walking toward.
    pub target_waypoint: usize,
    /// Indicates whether the enemy walked past the final waypoint.
    pub reached_end: bool,
    /// Appearance assigned to the enemy.
    pub color: EnemyColor,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Tile-centred position of the tower.
    pub position: WorldPoint,
    /// Footprint occupied by the tower.
    pub bounds: Bounds,
    /// Targeting radius in world units.
    pub range: f32,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower the cooldown belongs to.
    pub tower: TowerId,
    /// Time remaining until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower's cooldown, sorted by tower id.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Current centre of the projectile.
    pub position: WorldPoint,
    /// Collision box centred on the position.
    pub bounds: Bounds,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
}

/// Target assignment computed for a tower during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Euclidean distance between tower and enemy centres.
    pub distance: f32,
}

/// Spawn bookkeeping for the wave in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveProgress {
    /// Wave currently in progress.
    pub wave: WaveNumber,
    /// Enemies spawned so far during this wave.
    pub spawned: u32,
    /// Maximum number of enemies spawned during this wave.
    pub cap: u32,
    /// Enemies currently alive on the path.
    pub live_enemies: usize,
}

impl WaveProgress {
    /// Reports whether the wave may still spawn enemies.
    #[must_use]
    pub const fn has_spawns_remaining(&self) -> bool {
        self.spawned < self.cap
    }

    /// Reports whether every enemy of the wave was spawned and dealt with.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.spawned >= self.cap && self.live_enemies == 0
    }
}
