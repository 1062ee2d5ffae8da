//! Enemy state and path-following movement.

use std::time::Duration;

use sentinel_core::{
    ticks_in, Bounds, EnemyColor, EnemyId, EnemySnapshot, Path, WaveNumber, WorldPoint,
};

/// Live enemy walking the path toward the core.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    wave: WaveNumber,
    position: WorldPoint,
    target_waypoint: usize,
    speed: f32,
    size: f32,
    color: EnemyColor,
    health: u32,
    max_health: u32,
    reached_end: bool,
}

impl Enemy {
    /// Places a new enemy on the first waypoint, heading for the second.
    pub(crate) fn spawn(id: EnemyId, wave: WaveNumber, path: &Path, hit_points: u32) -> Self {
        Self {
            id,
            wave,
            position: path.start(),
            target_waypoint: 1,
            speed: wave.enemy_speed(),
            size: wave.enemy_size(),
            color: wave.enemy_color(),
            health: hit_points,
            max_health: hit_points,
            reached_end: false,
        }
    }

    /// Moves toward the current waypoint, snapping onto it when reachable.
    ///
    /// At most one waypoint is consumed per call and leftover movement is
    /// discarded. Once the index passes the final waypoint the enemy is
    /// parked with `reached_end` set.
    pub(crate) fn advance(&mut self, dt: Duration, path: &Path) {
        if self.reached_end || self.is_dead() {
            return;
        }

        let Some(target) = path.get(self.target_waypoint) else {
            self.reached_end = true;
            return;
        };

        let step = self.speed * ticks_in(dt);
        if self.position.distance_to(target) <= step {
            self.position = target;
            self.target_waypoint += 1;
            if self.target_waypoint >= path.len() {
                self.reached_end = true;
            }
        } else {
            self.position = self.position.step_towards(target, step);
        }
    }

    /// Removes one point of health, saturating at zero.
    pub(crate) fn apply_hit(&mut self) {
        self.health = self.health.saturating_sub(1);
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub(crate) fn reached_end(&self) -> bool {
        self.reached_end
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::square(self.position, self.size)
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            wave: self.wave,
            position: self.position,
            bounds: self.bounds(),
            health: self.health,
            max_health: self.max_health,
            target_waypoint: self.target_waypoint,
            reached_end: self.reached_end,
            color: self.color,
        }
    }
}
