//! Grid snapping: positional quantization for interactive moves.

use kurbo::Point;

/// Default grid size in world units.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Grid snap settings.
#[derive(Debug, Clone, Copy)]
pub struct GridSettings {
    pub enabled: bool,
    pub size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Round a point to the nearest grid intersection. Pure quantization, not a
/// constraint solver.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= f64::EPSILON {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(Point::new(13.0, 27.0), 10.0);
        assert_eq!(snapped, Point::new(10.0, 30.0));
    }

    #[test]
    fn test_snap_exact_multiple_unchanged() {
        let snapped = snap_to_grid(Point::new(40.0, 20.0), 20.0);
        assert_eq!(snapped, Point::new(40.0, 20.0));
    }

    #[test]
    fn test_zero_grid_is_identity() {
        let p = Point::new(13.7, 27.2);
        assert_eq!(snap_to_grid(p, 0.0), p);
    }
}
