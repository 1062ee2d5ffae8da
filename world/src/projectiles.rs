//! Homing projectiles launched by towers.

use std::time::Duration;

use sentinel_core::{ticks_in, Bounds, EnemyId, ProjectileId, ProjectileSnapshot, WorldPoint};

/// Outcome of advancing a projectile by one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProjectileStatus {
    /// Still travelling toward its target.
    InFlight,
    /// Reached the target's centre during this step.
    Arrived,
    /// The target no longer exists; the projectile must be discarded.
    Fizzled,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) target: EnemyId,
    position: WorldPoint,
    speed: f32,
    size: f32,
}

impl Projectile {
    pub(crate) fn launch(
        id: ProjectileId,
        target: EnemyId,
        origin: WorldPoint,
        speed: f32,
        size: f32,
    ) -> Self {
        Self {
            id,
            target,
            position: origin,
            speed,
            size,
        }
    }

    /// Homes on the target's current centre at constant speed.
    pub(crate) fn advance(&mut self, dt: Duration, target: Option<WorldPoint>) -> ProjectileStatus {
        let Some(target) = target else {
            return ProjectileStatus::Fizzled;
        };

        let step = self.speed * ticks_in(dt);
        if self.position.distance_to(target) <= step {
            self.position = target;
            ProjectileStatus::Arrived
        } else {
            self.position = self.position.step_towards(target, step);
            ProjectileStatus::InFlight
        }
    }

    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::square(self.position, self.size)
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            bounds: self.bounds(),
            target: self.target,
        }
    }
}
