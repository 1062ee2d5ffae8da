#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system assigning each tower the closest living enemy in range.

use sentinel_core::{EnemyId, EnemyView, Phase, TowerTarget, TowerView, WorldPoint};

/// Target selection over tower and enemy snapshots.
///
/// Living enemy positions are copied into a reusable buffer once per call so
/// every tower scans the same compact list.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    living: Vec<(EnemyId, WorldPoint)>,
}

impl TowerTargeting {
    /// Creates the system with an empty scan buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `out` with this tick's tower assignments.
    ///
    /// An enemy is eligible when its centre lies within the tower's range.
    /// The nearest eligible enemy wins; on equal distance the enemy spawned
    /// first keeps the assignment. Towers without an eligible enemy are
    /// omitted, as are towers with a non-positive range.
    pub fn handle(
        &mut self,
        phase: Phase,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();
        if phase != Phase::Playing {
            return;
        }

        self.living.clear();
        self.living.extend(
            enemies
                .iter()
                .filter(|enemy| enemy.health > 0)
                .map(|enemy| (enemy.id, enemy.position)),
        );
        if self.living.is_empty() {
            return;
        }

        for tower in towers.iter() {
            if tower.range.is_nan() || tower.range <= 0.0 {
                continue;
            }

            let mut nearest: Option<(EnemyId, f32)> = None;
            for &(enemy, position) in &self.living {
                let distance = tower.position.distance_to(position);
                let closer = nearest.map_or(true, |(_, best)| distance < best);
                if distance <= tower.range && closer {
                    nearest = Some((enemy, distance));
                }
            }

            if let Some((enemy, distance)) = nearest {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy,
                    distance,
                });
            }
        }
    }
}
