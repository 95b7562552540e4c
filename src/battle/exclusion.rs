//! Areas a ship cannot enter
//!
//! Three kinds of exclusion:
//! - hard border, keeping ships away from the arena edges
//! - hard obstacle, keeping ships apart from each other
//! - soft obstacle, set by an engine's safety distance

use crate::battle::geometry::{arena_distance, ArenaCircleArea, ArenaLocation, Target};
use crate::battle::ship::Ship;
use crate::battle::state::Battle;
use crate::core::types::ShipId;

#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionAreas {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Disabled for a zero-sized arena
    pub active: bool,
    pub hard_border: f64,
    pub hard_obstacle: f64,
    pub effective_obstacle: f64,
    pub obstacles: Vec<ArenaLocation>,
}

impl ExclusionAreas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            xmin: 0.0,
            xmax: width - 1.0,
            ymin: 0.0,
            ymax: height - 1.0,
            active: width > 0.0 && height > 0.0,
            hard_border: 50.0,
            hard_obstacle: 100.0,
            effective_obstacle: 100.0,
            obstacles: Vec::new(),
        }
    }

    /// Exclusion areas of a battle, with every ship not ignored as an obstacle
    pub fn from_battle(battle: &Battle, ignore: &[ShipId], soft_distance: f64) -> Self {
        let config = &battle.config;
        let mut result = Self::new(config.arena_width, config.arena_height);
        result.hard_border = config.border;
        result.hard_obstacle = config.ship_separation;
        let obstacles = battle
            .ships()
            .filter(|ship| !ignore.contains(&ship.id))
            .map(|ship| ship.position())
            .collect();
        result.configure(obstacles, soft_distance);
        result
    }

    /// Exclusion areas seen by a ship (optionally not colliding with itself)
    pub fn from_ship(battle: &Battle, ship: &Ship, soft_distance: f64, ignore_self: bool) -> Self {
        if ignore_self {
            Self::from_battle(battle, &[ship.id], soft_distance)
        } else {
            Self::from_battle(battle, &[], soft_distance)
        }
    }

    pub fn configure(&mut self, obstacles: Vec<ArenaLocation>, soft_distance: f64) {
        self.obstacles = obstacles;
        self.effective_obstacle = soft_distance.max(self.hard_obstacle);
    }

    /// Furthest location on the segment from `source` to `location` that
    /// lies outside every exclusion area
    pub fn stop_before(&self, location: ArenaLocation, source: ArenaLocation) -> ArenaLocation {
        if !self.active {
            return location;
        }

        let mut target = Target::from_location(location.x, location.y).keep_inside_rectangle(
            self.xmin + self.hard_border,
            self.ymin + self.hard_border,
            self.xmax - self.hard_border,
            self.ymax - self.hard_border,
            source,
        );

        let mut obstacles = self.obstacles.clone();
        obstacles.sort_by(|a, b| {
            arena_distance(*a, source)
                .partial_cmp(&arena_distance(*b, source))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        // Pushing out of one circle may land inside an earlier one
        for _ in 0..=obstacles.len() {
            let before = target;
            for obstacle in &obstacles {
                let circle = ArenaCircleArea::new(obstacle.x, obstacle.y, self.effective_obstacle);
                let moved = target.move_out_of_circle(circle, source);
                if moved != target && arena_distance(*obstacle, source) < self.effective_obstacle {
                    // Source already inside this area, it cannot move that way
                    target = Target::from_location(source.x, source.y);
                } else {
                    target = moved;
                }
            }
            if target == before {
                break;
            }
        }

        target.location()
    }

    /// Whether a location is outside every exclusion area
    pub fn location_is_free(&self, location: ArenaLocation) -> bool {
        if !self.active {
            return true;
        }
        let inside = location.x >= self.xmin + self.hard_border
            && location.x <= self.xmax - self.hard_border
            && location.y >= self.ymin + self.hard_border
            && location.y <= self.ymax - self.hard_border;
        inside
            && self
                .obstacles
                .iter()
                .all(|obstacle| arena_distance(*obstacle, location) >= self.effective_obstacle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas(obstacles: Vec<ArenaLocation>, soft: f64) -> ExclusionAreas {
        let mut result = ExclusionAreas::new(2000.0, 2000.0);
        result.configure(obstacles, soft);
        result
    }

    fn assert_location(actual: ArenaLocation, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-6 && (actual.y - y).abs() < 1e-6,
            "expected ({}, {}), got {:?}",
            x,
            y,
            actual
        );
    }

    #[test]
    fn test_inactive_for_empty_arena() {
        let exclusion = ExclusionAreas::new(0.0, 0.0);
        let location = ArenaLocation::new(-500.0, 12.0);
        assert_eq!(exclusion.stop_before(location, ArenaLocation::default()), location);
        assert!(exclusion.location_is_free(location));
    }

    #[test]
    fn test_stops_before_obstacle() {
        let exclusion = areas(vec![ArenaLocation::new(1000.0, 500.0)], 200.0);
        let source = ArenaLocation::new(500.0, 500.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(700.0, 500.0), source), 700.0, 500.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(800.0, 500.0), source), 800.0, 500.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(900.0, 500.0), source), 800.0, 500.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(1000.0, 500.0), source), 800.0, 500.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(1200.0, 500.0), source), 1200.0, 500.0);
    }

    #[test]
    fn test_two_obstacles() {
        let exclusion = areas(
            vec![ArenaLocation::new(100.0, 800.0), ArenaLocation::new(100.0, 1000.0)],
            150.0,
        );
        let source = ArenaLocation::new(100.0, 100.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(100.0, 1100.0), source), 100.0, 650.0);
    }

    #[test]
    fn test_never_goes_back() {
        let exclusion = areas(
            vec![ArenaLocation::new(100.0, 500.0), ArenaLocation::new(100.0, 800.0)],
            600.0,
        );
        let source = ArenaLocation::new(100.0, 100.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(100.0, 1000.0), source), 100.0, 100.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(100.0, 1400.0), source), 100.0, 1400.0);
    }

    #[test]
    fn test_keeps_inside_borders() {
        let exclusion = areas(vec![], 0.0);
        let source = ArenaLocation::new(1000.0, 1000.0);
        assert_location(exclusion.stop_before(ArenaLocation::new(3000.0, 1000.0), source), 1949.0, 1000.0);
        assert!(!exclusion.location_is_free(ArenaLocation::new(20.0, 1000.0)));
        assert!(exclusion.location_is_free(ArenaLocation::new(60.0, 1000.0)));
    }
}
