//! Arena geometry: locations, angles and action targets
//!
//! All functions are pure. Angles are in radians, distances in km.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::ShipId;

/// Tolerance used when intersecting a segment with an obstacle circle
const INTERSECTION_EPSILON: f64 = 10e-8;

/// Point in the arena
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArenaLocation {
    pub x: f64,
    pub y: f64,
}

impl ArenaLocation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Point in the arena with a facing angle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArenaLocationAngle {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl ArenaLocationAngle {
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self { x, y, angle }
    }

    pub fn location(&self) -> ArenaLocation {
        ArenaLocation::new(self.x, self.y)
    }
}

/// Circle in the arena (obstacle, drone area...)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArenaCircleArea {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl ArenaCircleArea {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// Whether a location is inside the circle (border included)
    pub fn contains(&self, location: ArenaLocation) -> bool {
        arena_distance(location, ArenaLocation::new(self.x, self.y)) <= self.radius
    }
}

/// Angle of the vector going from `from` to `to`
pub fn arena_angle(from: ArenaLocation, to: ArenaLocation) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Signed difference from `angle1` to `angle2`, normalized in `[-PI, PI)`
pub fn angular_difference(angle1: f64, angle2: f64) -> f64 {
    let diff = angle2 - angle1;
    diff - PI * 2.0 * ((diff + PI) / (PI * 2.0)).floor()
}

/// Euclidean distance between two locations
pub fn arena_distance(loc1: ArenaLocation, loc2: ArenaLocation) -> f64 {
    let dx = loc2.x - loc1.x;
    let dy = loc2.y - loc1.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn degrees(angle: f64) -> f64 {
    angle * 180.0 / PI
}

pub fn radians(angle: f64) -> f64 {
    angle * PI / 180.0
}

/// Intersect the line through (x1, y1)-(x2, y2) with a circle centered on
/// the origin, keeping the intersection nearest to (x1, y1)
fn intersect_line_circle(x1: f64, y1: f64, x2: f64, y2: f64, r: f64) -> Option<(f64, f64)> {
    let a = y2 - y1;
    let b = -(x2 - x1);
    let c = -(a * x1 + b * y1);
    let norm = a * a + b * b;
    if norm == 0.0 {
        return None;
    }
    let x0 = -a * c / norm;
    let y0 = -b * c / norm;

    if c * c > r * r * norm + INTERSECTION_EPSILON {
        None
    } else if (c * c - r * r * norm).abs() < INTERSECTION_EPSILON {
        Some((x0, y0))
    } else {
        let d = r * r - c * c / norm;
        let mult = (d / norm).sqrt();
        let first = (x0 + b * mult, y0 - a * mult);
        let second = (x0 - b * mult, y0 + a * mult);
        let dist = |(x, y): (f64, f64)| ((x - x1) * (x - x1) + (y - y1) * (y - y1)).sqrt();
        if dist(second) < dist(first) {
            Some(second)
        } else {
            Some(first)
        }
    }
}

/// Target of an action: a location, optionally bound to a ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    pub ship_id: Option<ShipId>,
}

impl Target {
    pub fn new(x: f64, y: f64, ship_id: Option<ShipId>) -> Self {
        Self { x, y, ship_id }
    }

    /// Target a ship at its current location
    pub fn from_ship(ship_id: ShipId, x: f64, y: f64) -> Self {
        Self::new(x, y, Some(ship_id))
    }

    /// Target a point in space
    pub fn from_location(x: f64, y: f64) -> Self {
        Self::new(x, y, None)
    }

    pub fn location(&self) -> ArenaLocation {
        ArenaLocation::new(self.x, self.y)
    }

    pub fn is_ship(&self) -> bool {
        self.ship_id.is_some()
    }

    pub fn distance_to(&self, other: ArenaLocation) -> f64 {
        arena_distance(self.location(), other)
    }

    pub fn angle_to(&self, other: ArenaLocation) -> f64 {
        arena_angle(self.location(), other)
    }

    /// Whether the target is within `radius` of (x, y)
    pub fn is_in_range(&self, x: f64, y: f64, radius: f64) -> bool {
        self.distance_to(ArenaLocation::new(x, y)) <= radius
    }

    /// Bring the target inside the circle of `radius` around (x, y), along
    /// the line to its center
    ///
    /// A target already in range is returned untouched (keeping its ship).
    pub fn constraint_in_range(&self, x: f64, y: f64, radius: f64) -> Target {
        let dx = self.x - x;
        let dy = self.y - y;
        let length = (dx * dx + dy * dy).sqrt();
        if length <= radius {
            *self
        } else {
            let factor = radius / length;
            Target::from_location(x + dx * factor, y + dy * factor)
        }
    }

    /// Push the target out of a circle, along the line coming from the source
    pub fn move_out_of_circle(&self, circle: ArenaCircleArea, source: ArenaLocation) -> Target {
        let dx = self.x - circle.x;
        let dy = self.y - circle.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length >= circle.radius {
            return *self;
        }
        match intersect_line_circle(
            source.x - circle.x,
            source.y - circle.y,
            dx,
            dy,
            circle.radius,
        ) {
            Some((x, y)) => Target::from_location(x + circle.x, y + circle.y),
            None => *self,
        }
    }

    /// Clip the segment from the source to the target inside a rectangle
    pub fn keep_inside_rectangle(
        &self,
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        source: ArenaLocation,
    ) -> Target {
        let mut length = self.distance_to(source);
        let mut result = *self;

        if result.x < xmin {
            length *= (xmin - source.x) / (result.x - source.x);
            result = result.constraint_in_range(source.x, source.y, length);
        }
        if result.x > xmax {
            length *= (xmax - source.x) / (result.x - source.x);
            result = result.constraint_in_range(source.x, source.y, length);
        }
        if result.y < ymin {
            length *= (ymin - source.y) / (result.y - source.y);
            result = result.constraint_in_range(source.x, source.y, length);
        }
        if result.y > ymax {
            length *= (ymax - source.y) / (result.y - source.y);
            result = result.constraint_in_range(source.x, source.y, length);
        }

        result
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ship_id {
            Some(ship_id) => write!(f, "({:.0},{:.0}) {}", self.x, self.y, ship_id),
            None => write!(f, "({:.0},{:.0})", self.x, self.y),
        }
    }
}
