use serde::{Deserialize, Serialize};

/// Continuous position expressed in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate, growing rightwards.
    pub x: f32,
    /// Vertical coordinate, growing downwards.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Moves toward `target` by at most `max_step` units.
    ///
    /// Returns the target itself when it is reachable within the step, so
    /// repeated calls converge exactly rather than oscillating around it.
    #[must_use]
    pub fn step_towards(self, target: Self, max_step: f32) -> Self {
        let distance = self.distance_to(target);
        if distance <= max_step || distance <= f32::EPSILON {
            return target;
        }

        let scale = max_step / distance;
        Self {
            x: self.x + (target.x - self.x) * scale,
            y: self.y + (target.y - self.y) * scale,
        }
    }

    /// Snaps the point onto the centre of the tile containing it.
    #[must_use]
    pub fn snap_to_tile(self, tile_size: f32) -> Self {
        let half = tile_size / 2.0;
        Self {
            x: (self.x / tile_size).floor() * tile_size + half,
            y: (self.y / tile_size).floor() * tile_size + half,
        }
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box centred on a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    center: WorldPoint,
    half_width: f32,
    half_height: f32,
}

impl Bounds {
    /// Creates a square box of the given edge length centred on `center`.
    #[must_use]
    pub fn square(center: WorldPoint, size: f32) -> Self {
        Self {
            center,
            half_width: size / 2.0,
            half_height: size / 2.0,
        }
    }

    /// Centre of the box.
    #[must_use]
    pub const fn center(&self) -> WorldPoint {
        self.center
    }

    /// Full width of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    /// Full height of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    /// Reports whether two boxes share interior area.
    ///
    /// Boxes that merely touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        (self.center.x - other.center.x).abs() < self.half_width + other.half_width
            && (self.center.y - other.center.y).abs() < self.half_height + other.half_height
    }
}
