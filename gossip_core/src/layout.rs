//! Cosmetic node placement for consumers that draw the network.

use crate::types::Position;
use std::f64::consts::PI;

/// Places `count` points evenly on a circle of `radius` around the origin,
/// starting on the positive x axis and moving counter-clockwise.
pub fn circle_layout(count: usize, radius: f64) -> Vec<Position> {
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            Position::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_circle_layout_points() {
        let points = circle_layout(4, 10.0);
        assert_eq!(points.len(), 4);

        assert_abs_diff_eq!(points[0].x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(points[0].y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(points[1].x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(points[1].y, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(points[2].x, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_layout_radius() {
        for point in circle_layout(7, 3.0) {
            assert_abs_diff_eq!(point.x.hypot(point.y), 3.0, epsilon = 1e-9);
        }
        assert!(circle_layout(0, 3.0).is_empty());
    }
}
