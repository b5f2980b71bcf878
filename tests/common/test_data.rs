//! Test data generation utilities.
//!
//! This module provides functions to generate grids, fields, and point sets
//! with known patterns for testing the flowline engine.

use ndarray::{Array1, Array2};

use flowline::{MapplaneGrid, Masked2};

/// Creates an evenly spaced grid covering `[0, x_extent] x [0, y_extent]`.
///
/// # Arguments
///
/// * `x_extent` - Length of the x axis
/// * `nx` - Number of x samples
/// * `y_extent` - Length of the y axis
/// * `ny` - Number of y samples
pub fn evenly_spaced_grid(x_extent: f64, nx: usize, y_extent: f64, ny: usize) -> MapplaneGrid {
    MapplaneGrid::new(
        Array1::linspace(0.0, x_extent, nx),
        Array1::linspace(0.0, y_extent, ny),
    )
    .expect("test grid axes are valid")
}

/// Fills a `(ny, nx)` plane with the linear field `a*x + b*y + c`.
///
/// Bilinear interpolation reproduces such a field exactly at any in-bounds
/// point, which makes mismatches easy to attribute.
pub fn linear_field(grid: &MapplaneGrid, a: f64, b: f64, c: f64) -> Array2<f64> {
    Array2::from_shape_fn((grid.ny(), grid.nx()), |(r, col)| {
        a * grid.x()[col] + b * grid.y()[r] + c
    })
}

/// Like [`linear_field`], wrapped as an unmasked field.
pub fn linear_plane(grid: &MapplaneGrid, a: f64, b: f64, c: f64) -> Masked2 {
    Masked2::unmasked(linear_field(grid, a, b, c))
}

/// Generates `count` deterministic pseudo-random points within the grid
/// extent. The sequence is fixed, so failures are reproducible.
pub fn scattered_points(grid: &MapplaneGrid, count: usize) -> (Vec<f64>, Vec<f64>) {
    let mut state: u64 = 0x853c49e6748fea9b;
    let mut next_unit = move || {
        // 64-bit LCG, top 53 bits mapped to [0, 1)
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let x0 = grid.x()[0];
    let x1 = grid.x()[grid.nx() - 1];
    let y0 = grid.y()[0];
    let y1 = grid.y()[grid.ny() - 1];

    let mut px = Vec::with_capacity(count);
    let mut py = Vec::with_capacity(count);
    for _ in 0..count {
        px.push(x0 + next_unit() * (x1 - x0));
        py.push(y0 + next_unit() * (y1 - y0));
    }
    (px, py)
}

/// Evaluates `a*x + b*y + c` at each point, for comparing against extracted
/// values.
pub fn linear_at_points(px: &[f64], py: &[f64], a: f64, b: f64, c: f64) -> Vec<f64> {
    px.iter()
        .zip(py.iter())
        .map(|(&x, &y)| a * x + b * y + c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scattered_points_stay_in_bounds() {
        let grid = evenly_spaced_grid(10.0, 11, 20.0, 21);
        let (px, py) = scattered_points(&grid, 50);

        assert_eq!(px.len(), 50);
        for (&x, &y) in px.iter().zip(py.iter()) {
            assert!(grid.contains(x, y), "({}, {}) is out of bounds", x, y);
        }
    }

    #[test]
    fn test_scattered_points_are_deterministic() {
        let grid = evenly_spaced_grid(10.0, 11, 20.0, 21);
        let (px1, _) = scattered_points(&grid, 10);
        let (px2, _) = scattered_points(&grid, 10);
        assert_eq!(px1, px2);
    }

    #[test]
    fn test_linear_field_matches_closed_form() {
        let grid = evenly_spaced_grid(4.0, 5, 4.0, 5);
        let field = linear_field(&grid, 2.0, 3.0, 1.0);
        assert_eq!(field[[0, 0]], 1.0);
        assert_eq!(field[[2, 1]], 2.0 + 6.0 + 1.0);
    }
}
