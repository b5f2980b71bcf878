//! Regular mapplane grid definition and coordinate-to-index mapping.
//!
//! A [`MapplaneGrid`] holds the two monotonically increasing coordinate axes
//! of a rectilinear raster. Cell spacing is derived from the first two samples
//! of each axis and assumed constant. Data arrays on the grid are indexed
//! `[row = y, column = x]`.

use ndarray::Array1;

use crate::error::{FlowlineError, Result};

/// A regular rectilinear grid in the horizontal (x, y) plane.
#[derive(Debug, Clone)]
pub struct MapplaneGrid {
    x: Array1<f64>,
    y: Array1<f64>,
    dx: f64,
    dy: f64,
}

impl MapplaneGrid {
    /// Create a grid from its coordinate axes.
    ///
    /// Each axis needs at least two samples, and the spacing derived from the
    /// first two samples must be positive (strictly increasing axes).
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Result<Self> {
        if x.len() < 2 || y.len() < 2 {
            return Err(FlowlineError::Config {
                message: format!(
                    "Grid axes need at least 2 samples each (got x: {}, y: {})",
                    x.len(),
                    y.len()
                ),
            });
        }

        let dx = x[1] - x[0];
        let dy = y[1] - y[0];

        if dx <= 0.0 || dy <= 0.0 {
            return Err(FlowlineError::Config {
                message: format!(
                    "Grid axes must be strictly increasing (dx = {}, dy = {})",
                    dx, dy
                ),
            });
        }

        Ok(Self { x, y, dx, dy })
    }

    /// The x coordinate axis.
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// The y coordinate axis.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Grid spacing along x.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Grid spacing along y.
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Number of columns (x samples).
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    /// Number of rows (y samples).
    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Grid column number corresponding to the coordinate `coord`.
    ///
    /// This is the plain floor mapping `floor((coord - x[0]) / dx)` with no
    /// bounds clamping: out-of-extent coordinates yield out-of-range indices.
    pub fn column_index(&self, coord: f64) -> isize {
        ((coord - self.x[0]) / self.dx).floor() as isize
    }

    /// Grid row number corresponding to the coordinate `coord`.
    pub fn row_index(&self, coord: f64) -> isize {
        ((coord - self.y[0]) / self.dy).floor() as isize
    }

    /// Column of the cell used for bilinear interpolation at `coord`.
    ///
    /// Follows [`column_index`](Self::column_index) but is kept within
    /// `[0, nx - 2]`, so a coordinate exactly on the axis maximum takes the
    /// last real cell (with fractional offset 1) and boundary floating-point
    /// jitter cannot escape the grid. Only meaningful for in-extent
    /// coordinates.
    pub fn cell_column(&self, coord: f64) -> usize {
        self.column_index(coord).clamp(0, self.nx() as isize - 2) as usize
    }

    /// Row of the cell used for bilinear interpolation at `coord`.
    pub fn cell_row(&self, coord: f64) -> usize {
        self.row_index(coord).clamp(0, self.ny() as isize - 2) as usize
    }

    /// Column of the grid node nearest to `coord`.
    ///
    /// Maps against cell centers, `floor((coord - (x[0] - dx/2)) / dx)`, so a
    /// coordinate halfway between two nodes rounds up. Unclamped, like
    /// [`column_index`](Self::column_index).
    pub fn nearest_column(&self, coord: f64) -> isize {
        ((coord - (self.x[0] - self.dx / 2.0)) / self.dx).floor() as isize
    }

    /// Row of the grid node nearest to `coord`.
    pub fn nearest_row(&self, coord: f64) -> isize {
        ((coord - (self.y[0] - self.dy / 2.0)) / self.dy).floor() as isize
    }

    /// Whether the point lies within the grid extent (inclusive on both ends).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x[0]
            && px <= self.x[self.x.len() - 1]
            && py >= self.y[0]
            && py <= self.y[self.y.len() - 1]
    }

    /// Validate a query point set against this grid.
    ///
    /// Checks that `px` and `py` are non-empty, of equal length, and that
    /// every point lies within the grid extent. The error names the first
    /// offending point so out-of-range queries never surface as index faults.
    pub fn validate_points(&self, px: &[f64], py: &[f64]) -> Result<()> {
        if px.len() != py.len() {
            return Err(FlowlineError::InvalidParameter {
                param: "points".to_string(),
                message: format!(
                    "px and py must have the same length (got {} and {})",
                    px.len(),
                    py.len()
                ),
            });
        }
        if px.is_empty() {
            return Err(FlowlineError::InvalidParameter {
                param: "points".to_string(),
                message: "query point set is empty".to_string(),
            });
        }

        for (k, (&x, &y)) in px.iter().zip(py.iter()).enumerate() {
            if !self.contains(x, y) {
                return Err(FlowlineError::InvalidCoordinates {
                    message: format!(
                        "Point {} at ({}, {}) is outside the grid extent ({} to {}, {} to {})",
                        k,
                        x,
                        y,
                        self.x[0],
                        self.x[self.x.len() - 1],
                        self.y[0],
                        self.y[self.y.len() - 1]
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn unit_grid(nx: usize, ny: usize) -> MapplaneGrid {
        let x = Array1::from_iter((0..nx).map(|i| i as f64));
        let y = Array1::from_iter((0..ny).map(|j| j as f64));
        MapplaneGrid::new(x, y).unwrap()
    }

    #[test]
    fn test_grid_construction() {
        let grid = unit_grid(5, 3);
        assert_eq!(grid.nx(), 5);
        assert_eq!(grid.ny(), 3);
        assert_eq!(grid.dx(), 1.0);
        assert_eq!(grid.dy(), 1.0);
    }

    #[test]
    fn test_grid_rejects_short_axes() {
        let result = MapplaneGrid::new(Array1::from(vec![0.0]), Array1::from(vec![0.0, 1.0]));
        assert!(matches!(result, Err(FlowlineError::Config { .. })));
    }

    #[test]
    fn test_grid_rejects_non_increasing_axes() {
        let result = MapplaneGrid::new(
            Array1::from(vec![1.0, 0.0, -1.0]),
            Array1::from(vec![0.0, 1.0]),
        );
        assert!(matches!(result, Err(FlowlineError::Config { .. })));

        let result = MapplaneGrid::new(
            Array1::from(vec![0.0, 1.0]),
            Array1::from(vec![2.0, 2.0]),
        );
        assert!(matches!(result, Err(FlowlineError::Config { .. })));
    }

    #[test]
    fn test_column_index_floor_mapping() {
        let grid = unit_grid(5, 5);
        assert_eq!(grid.column_index(0.0), 0);
        assert_eq!(grid.column_index(0.5), 0);
        assert_eq!(grid.column_index(1.0), 1);
        assert_eq!(grid.column_index(3.9), 3);
        // no clamping
        assert_eq!(grid.column_index(-0.5), -1);
        assert_eq!(grid.column_index(7.2), 7);
    }

    #[test]
    fn test_cell_column_stays_in_grid() {
        let grid = unit_grid(5, 5);
        // exact grid-line hit falls in the cell above the line
        assert_eq!(grid.cell_column(2.0), 2);
        // the axis maximum takes the last real cell
        assert_eq!(grid.cell_column(4.0), 3);
        assert_eq!(grid.cell_row(4.0), 3);
    }

    #[test]
    fn test_nearest_mapping_rounds_to_centers() {
        let grid = unit_grid(5, 5);
        assert_eq!(grid.nearest_column(0.0), 0);
        assert_eq!(grid.nearest_column(0.4), 0);
        // halfway between nodes rounds up
        assert_eq!(grid.nearest_column(0.5), 1);
        assert_eq!(grid.nearest_column(3.9), 4);
        assert_eq!(grid.nearest_row(2.4), 2);
    }

    #[test]
    fn test_validate_points() {
        let grid = unit_grid(4, 4);
        assert!(grid.validate_points(&[0.0, 3.0], &[1.5, 2.5]).is_ok());

        let result = grid.validate_points(&[0.0, 5.0], &[1.0, 1.0]);
        assert!(matches!(
            result,
            Err(FlowlineError::InvalidCoordinates { .. })
        ));

        let result = grid.validate_points(&[0.0], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(FlowlineError::InvalidParameter { .. })
        ));

        let result = grid.validate_points(&[], &[]);
        assert!(matches!(
            result,
            Err(FlowlineError::InvalidParameter { .. })
        ));
    }
}
