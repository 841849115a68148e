//! Great-circle distances in statute miles.

use geo::{Distance, Haversine, Point};

use crate::models::Position;

const METERS_PER_MILE: f64 = 1609.344;

/// Capability: distance between two `[lng, lat]` positions in miles
pub trait Geodesy {
    fn miles_between(&self, from: Position, to: Position) -> f64;
}

/// Haversine distance on the mean Earth radius
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMiles;

impl Geodesy for HaversineMiles {
    fn miles_between(&self, from: Position, to: Position) -> f64 {
        let from = Point::new(from[0], from[1]);
        let to = Point::new(to[0], to[1]);
        Haversine.distance(from, to) / METERS_PER_MILE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = [-80.479192, 25.447817];
        assert_eq!(HaversineMiles.miles_between(p, p), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // ~69.09 miles per degree on the mean radius
        let miles = HaversineMiles.miles_between([0.0, 0.0], [0.0, 1.0]);
        assert!((miles - 69.09).abs() < 0.01, "got {}", miles);
    }

    #[test]
    fn test_miami_to_tampa() {
        let miami = [-80.1918, 25.7617];
        let tampa = [-82.4572, 27.9506];
        let miles = HaversineMiles.miles_between(miami, tampa);
        assert!((200.0..210.0).contains(&miles), "got {}", miles);
    }
}
