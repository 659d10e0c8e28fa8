//! Grid geometry abstraction.
//!
//! The engine never owns a grid; it only needs cell centers to order a
//! well's completions along its track. Simulation front ends provide their
//! real corner-point geometry through [`GridGeometry`]; [`CartesianGrid`] is
//! the regular-spacing implementation used by tests and simple decks.

use nalgebra::Point3;

/// Provider of cell-center coordinates for zero-based (i, j, k) indices.
pub trait GridGeometry {
    fn cell_center(&self, i: i32, j: i32, k: i32) -> Point3<f64>;

    /// Distance between the centers of two cells.
    fn distance(&self, a: (i32, i32, i32), b: (i32, i32, i32)) -> f64 {
        let pa = self.cell_center(a.0, a.1, a.2);
        let pb = self.cell_center(b.0, b.1, b.2);
        (pb - pa).norm()
    }
}

/// A regular axis-aligned grid with uniform cell spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianGrid {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl CartesianGrid {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }
}

impl Default for CartesianGrid {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl GridGeometry for CartesianGrid {
    fn cell_center(&self, i: i32, j: i32, k: i32) -> Point3<f64> {
        Point3::new(
            (f64::from(i) + 0.5) * self.dx,
            (f64::from(j) + 0.5) * self.dy,
            (f64::from(k) + 0.5) * self.dz,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_centers_are_midpoints() {
        let grid = CartesianGrid::new(100.0, 200.0, 10.0);
        let center = grid.cell_center(0, 0, 0);
        assert_eq!(center, Point3::new(50.0, 100.0, 5.0));
    }

    #[test]
    fn test_distance_grows_with_k_in_a_column() {
        let grid = CartesianGrid::default();
        let shallow = grid.distance((4, 4, 0), (4, 4, 1));
        let deep = grid.distance((4, 4, 0), (4, 4, 5));
        assert!(deep > shallow);
    }
}
