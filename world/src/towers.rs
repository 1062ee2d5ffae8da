//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use sentinel_core::{
    Bounds, TowerCooldownSnapshot, TowerId, TowerSnapshot, WorldPoint,
};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Tile-centred position of the tower.
    pub(crate) position: WorldPoint,
    /// Footprint occupied by the tower.
    pub(crate) bounds: Bounds,
    /// Session time of the most recent shot, if the tower has fired.
    pub(crate) last_shot: Option<Duration>,
}

impl TowerState {
    /// Time remaining until the tower may fire again.
    pub(crate) fn ready_in(&self, now: Duration, cooldown: Duration) -> Duration {
        match self.last_shot {
            Some(shot) => cooldown.saturating_sub(now.saturating_sub(shot)),
            None => Duration::ZERO,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Reports whether the footprint intersects any registered tower.
    pub(crate) fn overlaps(&self, bounds: &Bounds) -> bool {
        self.entries
            .values()
            .any(|tower| tower.bounds.overlaps(bounds))
    }

    /// Stores a new tower, returning its identifier.
    pub(crate) fn insert(&mut self, position: WorldPoint, footprint: f32) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                position,
                bounds: Bounds::square(position, footprint),
                last_shot: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn snapshots(&self, range: f32) -> Vec<TowerSnapshot> {
        self.entries
            .values()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                position: tower.position,
                bounds: tower.bounds,
                range,
            })
            .collect()
    }

    pub(crate) fn cooldowns(&self, now: Duration, cooldown: Duration) -> Vec<TowerCooldownSnapshot> {
        self.entries
            .values()
            .map(|tower| TowerCooldownSnapshot {
                tower: tower.id,
                ready_in: tower.ready_in(now, cooldown),
            })
            .collect()
    }
}
