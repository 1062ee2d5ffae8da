use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Bounds, Cycles, WorldPoint};

/// Errors raised when balance constants or the path are unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    /// The path does not contain enough waypoints to walk along.
    #[error("path requires at least 2 waypoints, found {count}")]
    PathTooShort {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// A waypoint or core coordinate is NaN or infinite.
    #[error("coordinate `{field}` is not a finite number")]
    NonFinite {
        /// Name of the offending setting.
        field: &'static str,
    },
    /// A size, range, or speed is zero or negative.
    #[error("`{field}` must be greater than zero, found {value}")]
    NonPositive {
        /// Name of the offending setting.
        field: &'static str,
        /// Value that was rejected.
        value: f32,
    },
    /// A count or interval that must be non-zero is zero.
    #[error("`{field}` must not be zero")]
    Zero {
        /// Name of the offending setting.
        field: &'static str,
    },
}

/// Ordered waypoints every enemy walks along.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<WorldPoint>,
}

impl Path {
    /// Creates a path, rejecting sequences that are too short or not finite.
    pub fn new(waypoints: Vec<WorldPoint>) -> Result<Self, TuningError> {
        if waypoints.len() < 2 {
            return Err(TuningError::PathTooShort {
                count: waypoints.len(),
            });
        }
        if waypoints.iter().any(|point| !point.is_finite()) {
            return Err(TuningError::NonFinite { field: "path" });
        }
        Ok(Self { waypoints })
    }

    /// Waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    /// Number of waypoints on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false: a constructed path holds at least two waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint where enemies spawn.
    #[must_use]
    pub fn start(&self) -> WorldPoint {
        self.waypoints[0]
    }

    /// Waypoint at the provided index, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<WorldPoint> {
        self.waypoints.get(index).copied()
    }
}

/// Balance constants and map layout for a session.
///
/// Every field has a default, so partial configuration files only need to
/// name the values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Width of the playing field in world units.
    pub world_width: f32,
    /// Height of the playing field in world units.
    pub world_height: f32,
    /// Edge length of a placement tile.
    pub tile_size: f32,
    /// Waypoints enemies walk along.
    pub path: Vec<WorldPoint>,
    /// Centre of the defended core.
    pub core_center: WorldPoint,
    /// Edge length of the defended core.
    pub core_size: f32,
    /// Cycles available when a session starts.
    pub starting_cycles: u32,
    /// Core integrity when a session starts.
    pub max_integrity: f32,
    /// Cycles deducted per tower.
    pub tower_cost: u32,
    /// Targeting radius of every tower.
    pub tower_range: f32,
    /// Minimum time between two shots of the same tower, in milliseconds.
    pub tower_cooldown_ms: u64,
    /// Edge length of a tower footprint.
    pub tower_footprint: f32,
    /// Projectile speed in world units per tick.
    pub projectile_speed: f32,
    /// Edge length of a projectile's collision box.
    pub projectile_size: f32,
    /// Hits an enemy absorbs before it is destroyed.
    pub enemy_hit_points: u32,
    /// Cycles awarded per kill.
    pub kill_reward: u32,
    /// Cycles awarded when a wave is cleared.
    pub wave_clear_bonus: u32,
    /// Integrity removed when an enemy reaches the end of the path.
    pub breach_penalty: f32,
    /// Integrity drained per second by every enemy overlapping the core.
    pub core_drain_per_second: f32,
    /// Time between two spawns, in milliseconds.
    pub spawn_interval_ms: u64,
    /// Enemies spawned during the first wave.
    pub initial_wave_cap: u32,
    /// Additional enemies spawned by each subsequent wave.
    pub wave_cap_increment: u32,
    /// Minimum time between two accepted advice requests, in milliseconds.
    pub advice_cooldown_ms: u64,
    /// Time advice stays visible after it arrives, in milliseconds.
    pub advice_display_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 1200.0,
            world_height: 800.0,
            tile_size: 40.0,
            path: vec![
                WorldPoint::new(0.0, 100.0),
                WorldPoint::new(300.0, 100.0),
                WorldPoint::new(300.0, 600.0),
                WorldPoint::new(900.0, 600.0),
                WorldPoint::new(900.0, 400.0),
                WorldPoint::new(600.0, 400.0),
            ],
            core_center: WorldPoint::new(600.0, 400.0),
            core_size: 40.0,
            starting_cycles: 100,
            max_integrity: 100.0,
            tower_cost: 50,
            tower_range: 150.0,
            tower_cooldown_ms: 800,
            tower_footprint: 30.0,
            projectile_speed: 8.0,
            projectile_size: 8.0,
            enemy_hit_points: 3,
            kill_reward: 10,
            wave_clear_bonus: 50,
            breach_penalty: 10.0,
            core_drain_per_second: 6.0,
            spawn_interval_ms: 1500,
            initial_wave_cap: 5,
            wave_cap_increment: 2,
            advice_cooldown_ms: 15_000,
            advice_display_ms: 5_000,
        }
    }
}

impl Tuning {
    /// Checks every constant, returning the first violation found.
    pub fn validate(&self) -> Result<(), TuningError> {
        let _ = Path::new(self.path.clone())?;

        if !self.core_center.is_finite() {
            return Err(TuningError::NonFinite {
                field: "core_center",
            });
        }

        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("tile_size", self.tile_size),
            ("core_size", self.core_size),
            ("max_integrity", self.max_integrity),
            ("tower_range", self.tower_range),
            ("tower_footprint", self.tower_footprint),
            ("projectile_speed", self.projectile_speed),
            ("projectile_size", self.projectile_size),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(TuningError::NonFinite { field });
            }
            if value <= 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("breach_penalty", self.breach_penalty),
            ("core_drain_per_second", self.core_drain_per_second),
        ] {
            if !value.is_finite() {
                return Err(TuningError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }

        if self.spawn_interval_ms == 0 {
            return Err(TuningError::Zero {
                field: "spawn_interval_ms",
            });
        }
        if self.enemy_hit_points == 0 {
            return Err(TuningError::Zero {
                field: "enemy_hit_points",
            });
        }
        if self.initial_wave_cap == 0 {
            return Err(TuningError::Zero {
                field: "initial_wave_cap",
            });
        }

        Ok(())
    }

    /// Builds the validated path.
    pub fn build_path(&self) -> Result<Path, TuningError> {
        Path::new(self.path.clone())
    }

    /// Collision box of the defended core.
    #[must_use]
    pub fn core_bounds(&self) -> Bounds {
        Bounds::square(self.core_center, self.core_size)
    }

    /// Cycles granted at the start of a session.
    #[must_use]
    pub const fn starting_cycles(&self) -> Cycles {
        Cycles::new(self.starting_cycles)
    }

    /// Cycles deducted per tower.
    #[must_use]
    pub const fn tower_cost(&self) -> Cycles {
        Cycles::new(self.tower_cost)
    }

    /// Minimum time between two shots of the same tower.
    #[must_use]
    pub const fn tower_cooldown(&self) -> Duration {
        Duration::from_millis(self.tower_cooldown_ms)
    }

    /// Time between two spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Minimum time between two accepted advice requests.
    #[must_use]
    pub const fn advice_cooldown(&self) -> Duration {
        Duration::from_millis(self.advice_cooldown_ms)
    }

    /// Time advice stays visible after it arrives.
    #[must_use]
    pub const fn advice_display(&self) -> Duration {
        Duration::from_millis(self.advice_display_ms)
    }
}
