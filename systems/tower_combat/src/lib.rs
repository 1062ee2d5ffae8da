#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system turning tower target assignments into fire orders.
//!
//! A tower fires only when it holds a target and its cooldown has fully
//! elapsed. Orders are emitted in ascending tower id so volleys resolve in a
//! stable order regardless of how targeting produced its assignments.

use std::cmp::Ordering;

use sentinel_core::{Command, Phase, TowerCooldownView, TowerTarget};

/// Issues `Command::FireProjectile` for every armed tower with a target.
#[derive(Debug, Default)]
pub struct TowerCombat {
    assignments: Vec<TowerTarget>,
}

impl TowerCombat {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fire order per targeted tower whose cooldown is zero.
    pub fn handle(
        &mut self,
        phase: Phase,
        tower_cooldowns: TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Playing || tower_targets.is_empty() {
            return;
        }

        self.assignments.clear();
        self.assignments.extend_from_slice(tower_targets);
        self.assignments.sort_by_key(|assignment| assignment.tower);
        self.assignments.dedup_by_key(|assignment| assignment.tower);

        let mut armed = tower_cooldowns
            .iter()
            .filter(|snapshot| snapshot.ready_in.is_zero())
            .map(|snapshot| snapshot.tower)
            .peekable();
        let mut assignments = self.assignments.iter().peekable();

        while let (Some(&tower), Some(&&assignment)) = (armed.peek(), assignments.peek()) {
            match tower.cmp(&assignment.tower) {
                Ordering::Less => {
                    let _ = armed.next();
                }
                Ordering::Greater => {
                    let _ = assignments.next();
                }
                Ordering::Equal => {
                    out.push(Command::FireProjectile {
                        tower,
                        target: assignment.enemy,
                    });
                    let _ = armed.next();
                    let _ = assignments.next();
                }
            }
        }
    }
}
