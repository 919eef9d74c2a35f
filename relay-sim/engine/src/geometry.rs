// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Relay Chain Simulation Suite - Geometry

use crate::types::Point;

/// Euclidean distance truncated toward zero.
///
/// Range thresholds throughout the engine are calibrated against the
/// truncated value, so it must not be rounded.
pub fn distance(a: Point, b: Point) -> i32 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt() as i32
}

/// Signed ratio of the smaller to the larger coordinate delta from `from` to `to`.
///
/// Returns `1.0` when the larger delta is zero.
pub fn directional_bias(from: Point, to: Point) -> f64 {
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    let hi = dx.max(dy);
    if hi == 0.0 {
        1.0
    } else {
        dx.min(dy) / hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_truncates() {
        assert_eq!(distance(Point::new(0, 0), Point::new(3, 4)), 5);
        // sqrt(5000) = 70.71
        assert_eq!(distance(Point::new(0, 0), Point::new(50, 50)), 70);
        // sqrt(2) = 1.41
        assert_eq!(distance(Point::new(1, 1), Point::new(2, 2)), 1);
        assert_eq!(distance(Point::new(7, 7), Point::new(7, 7)), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Point::new(12, 90);
        let b = Point::new(77, 3);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn bias_diagonal_is_one() {
        assert_eq!(directional_bias(Point::new(0, 0), Point::new(50, 50)), 1.0);
    }

    #[test]
    fn bias_uses_smaller_over_larger() {
        let b = directional_bias(Point::new(12, 0), Point::new(50, 50));
        assert!((b - 38.0 / 50.0).abs() < 1e-12);
    }

    #[test]
    fn bias_degenerate_is_one() {
        assert_eq!(directional_bias(Point::new(5, 5), Point::new(5, 5)), 1.0);
        // larger delta zero, smaller negative
        assert_eq!(directional_bias(Point::new(5, 5), Point::new(5, 1)), 1.0);
    }

    #[test]
    fn bias_is_signed() {
        // dx = 10, dy = -5
        let b = directional_bias(Point::new(0, 10), Point::new(10, 5));
        assert!((b + 0.5).abs() < 1e-12);
    }
}
