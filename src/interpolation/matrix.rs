//! The sparse bilinear interpolation matrix.
//!
//! [`InterpolationMatrix`] maps a flattened rectangular subset of a regular
//! grid (the bounding box of all query points, expanded by one cell for the
//! upper bilinear corner) to the vector of query-point values. It is built
//! once per (grid, query-point-set) pair and reused across every variable,
//! time step, and vertical level sharing that grid and those points.
//!
//! Masked input is handled by deriving an adjusted matrix: weights touching
//! masked cells are dropped and each surviving row is renormalized, so the
//! result stays a convex combination of the unmasked corner values. A point
//! whose four corners are all masked comes back masked itself.

use ndarray::{s, Array1, Array2};
use rsparse::data::{Sprs, Trpl};
use tracing::debug;

use crate::error::{FlowlineError, Result};
use crate::grid::MapplaneGrid;
use crate::interpolation::InterpMethod;
use crate::masked::{Masked, Masked1, Masked2};

/// A sparse operator interpolating a gridded field to scattered points.
///
/// Immutable after construction; mask adjustment returns a new instance.
#[derive(Debug, Clone)]
pub struct InterpolationMatrix {
    grid_ny: usize,
    grid_nx: usize,
    r_min: usize,
    r_max: usize,
    c_min: usize,
    c_max: usize,
    n_rows: usize,
    n_cols: usize,
    n_points: usize,
    // triplet form, kept for mask adjustment and diagnostics
    rows: Vec<usize>,
    cols: Vec<isize>,
    weights: Vec<f64>,
    matrix: Sprs<f64>,
}

impl InterpolationMatrix {
    /// Build the interpolation matrix for a fixed grid and query-point set.
    ///
    /// Only [`InterpMethod::Bilinear`] is supported here; nearest-neighbor
    /// sampling goes through [`crate::interpolation::nearest`] instead. All
    /// points must lie within the grid extent (inclusive).
    pub fn new(
        grid: &MapplaneGrid,
        px: &[f64],
        py: &[f64],
        method: InterpMethod,
    ) -> Result<Self> {
        if method != InterpMethod::Bilinear {
            return Err(FlowlineError::NotImplemented {
                message: format!("interpolation matrix for method '{}'", method),
            });
        }

        grid.validate_points(px, py)?;

        let min_px = px.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_px = px.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_py = py.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_py = py.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let c_min = grid.cell_column(min_px);
        let c_max = grid.cell_column(max_px) + 1;
        let r_min = grid.cell_row(min_py);
        let r_max = grid.cell_row(max_py) + 1;

        // size of the subset needed for interpolation
        let n_rows = r_max - r_min + 1;
        let n_cols = c_max - c_min + 1;
        let n_points = px.len();

        let mut rows = Vec::with_capacity(4 * n_points);
        let mut cols = Vec::with_capacity(4 * n_points);
        let mut weights = Vec::with_capacity(4 * n_points);

        // linear index within the subset
        let column = |r: usize, c: usize| (n_cols * r + c) as isize;

        for k in 0..n_points {
            let x_k = px[k];
            let y_k = py[k];

            let col = grid.cell_column(x_k);
            let row = grid.cell_row(y_k);

            let alpha = (x_k - grid.x()[col]) / grid.dx();
            let beta = (y_k - grid.y()[row]) / grid.dy();

            // indices within the subset
            let c = col - c_min;
            let r = row - r_min;

            rows.extend_from_slice(&[k, k, k, k]);
            cols.extend_from_slice(&[
                column(r, c),
                column(r + 1, c),
                column(r, c + 1),
                column(r + 1, c + 1),
            ]);
            weights.extend_from_slice(&[
                (1.0 - alpha) * (1.0 - beta),
                (1.0 - alpha) * beta,
                alpha * (1.0 - beta),
                alpha * beta,
            ]);
        }

        let (matrix, rows, cols, weights) =
            assemble(n_points, n_rows * n_cols, rows, cols, weights);

        crate::logging::log_matrix_stats(n_points, n_rows, n_cols, weights.len());

        Ok(Self {
            grid_ny: grid.ny(),
            grid_nx: grid.nx(),
            r_min,
            r_max,
            c_min,
            c_max,
            n_rows,
            n_cols,
            n_points,
            rows,
            cols,
            weights,
            matrix,
        })
    }

    /// Number of query points (matrix rows).
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// First grid row of the bounding subset.
    pub fn r_min(&self) -> usize {
        self.r_min
    }

    /// Last grid row of the bounding subset.
    pub fn r_max(&self) -> usize {
        self.r_max
    }

    /// First grid column of the bounding subset.
    pub fn c_min(&self) -> usize {
        self.c_min
    }

    /// Last grid column of the bounding subset.
    pub fn c_max(&self) -> usize {
        self.c_max
    }

    /// Height of the bounding subset.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Width of the bounding subset.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Sum of the stored weights in each row.
    ///
    /// 1.0 (up to rounding) for every row of a freshly built matrix, and for
    /// every row of an adjusted matrix with at least one unmasked corner.
    pub fn row_sums(&self) -> Array1<f64> {
        let mut sums = Array1::zeros(self.n_points);
        for (&row, &w) in self.rows.iter().zip(self.weights.iter()) {
            sums[row] += w;
        }
        sums
    }

    /// Apply the interpolation to a full-grid array.
    ///
    /// Slices the array down to the precomputed bounding subset and delegates
    /// to [`apply_to_subset`](Self::apply_to_subset).
    pub fn apply(&self, values: &Masked2) -> Result<Masked1> {
        let (ny, nx) = values.data.dim();
        if ny != self.grid_ny || nx != self.grid_nx {
            return Err(FlowlineError::DimensionMismatch {
                message: format!(
                    "expected a full-grid array of shape ({}, {}), got ({}, {})",
                    self.grid_ny, self.grid_nx, ny, nx
                ),
            });
        }

        let subset = Masked {
            data: values
                .data
                .slice(s![self.r_min..=self.r_max, self.c_min..=self.c_max])
                .to_owned(),
            mask: values
                .mask
                .slice(s![self.r_min..=self.r_max, self.c_min..=self.c_max])
                .to_owned(),
        };
        self.apply_to_subset(&subset)
    }

    /// Apply the interpolation to the bounding-subset array.
    ///
    /// Unmasked input takes the plain sparse matrix-vector product; masked
    /// input goes through the adjusted matrix and carries the derived output
    /// mask.
    pub fn apply_to_subset(&self, subset: &Masked2) -> Result<Masked1> {
        let (rows, cols) = subset.data.dim();
        if rows != self.n_rows || cols != self.n_cols {
            return Err(FlowlineError::DimensionMismatch {
                message: format!(
                    "expected a subset of shape ({}, {}), got ({}, {})",
                    self.n_rows, self.n_cols, rows, cols
                ),
            });
        }

        if !subset.any_masked() {
            let values = self.multiply_vec(subset.data.iter().cloned().collect());
            return Ok(Masked::unmasked(values));
        }

        let (adjusted, output_mask) = self.adjusted(&subset.mask)?;
        let values = adjusted.multiply_vec(subset.data.iter().cloned().collect());
        Masked::new(values, output_mask)
    }

    /// Derive the interpolation matrix that ignores masked cells.
    ///
    /// Weights pointing at masked cells are dropped and each surviving row is
    /// renormalized to sum 1. Rows whose weight collapses to zero (all four
    /// corners masked) are reported through the returned output mask and
    /// stay empty. Returns a new instance; `self` is untouched.
    pub fn adjusted(&self, mask: &Array2<bool>) -> Result<(InterpolationMatrix, Array1<bool>)> {
        let (rows, cols) = mask.dim();
        if rows != self.n_rows || cols != self.n_cols {
            return Err(FlowlineError::DimensionMismatch {
                message: format!(
                    "expected a subset mask of shape ({}, {}), got ({}, {})",
                    self.n_rows, self.n_cols, rows, cols
                ),
            });
        }

        let cell_masked = |col: isize| {
            let j = col as usize;
            mask[[j / self.n_cols, j % self.n_cols]]
        };

        let mut sums = vec![0.0; self.n_points];
        for ((&row, &col), &w) in self.rows.iter().zip(self.cols.iter()).zip(self.weights.iter())
        {
            if !cell_masked(col) {
                sums[row] += w;
            }
        }

        let mut adj_rows = Vec::with_capacity(self.rows.len());
        let mut adj_cols = Vec::with_capacity(self.cols.len());
        let mut adj_weights = Vec::with_capacity(self.weights.len());

        for ((&row, &col), &w) in self.rows.iter().zip(self.cols.iter()).zip(self.weights.iter())
        {
            if cell_masked(col) || w == 0.0 || sums[row] <= 0.0 {
                continue;
            }
            adj_rows.push(row);
            adj_cols.push(col);
            adj_weights.push(w / sums[row]);
        }

        let output_mask = Array1::from_iter(sums.iter().map(|&s| s <= 0.0));
        let masked_points = output_mask.iter().filter(|&&m| m).count();
        if masked_points > 0 {
            debug!(
                "Mask adjustment left {} of {} points without valid corners",
                masked_points, self.n_points
            );
        }

        let (matrix, adj_rows, adj_cols, adj_weights) = assemble(
            self.n_points,
            self.n_rows * self.n_cols,
            adj_rows,
            adj_cols,
            adj_weights,
        );

        let adjusted = InterpolationMatrix {
            grid_ny: self.grid_ny,
            grid_nx: self.grid_nx,
            r_min: self.r_min,
            r_max: self.r_max,
            c_min: self.c_min,
            c_max: self.c_max,
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            n_points: self.n_points,
            rows: adj_rows,
            cols: adj_cols,
            weights: adj_weights,
            matrix,
        };

        Ok((adjusted, output_mask))
    }

    /// Sparse matrix-vector product with a flattened subset.
    fn multiply_vec(&self, values: Vec<f64>) -> Array1<f64> {
        let mut column = Sprs::new();
        column.from_vec(&vec![values]);
        // transpose to a column vector, then multiply; the dense result
        // concatenates rows
        let column = rsparse::transpose(&column);
        let product = rsparse::multiply(&self.matrix, &column).to_dense();
        Array1::from_iter(product.iter().flatten().cloned())
    }
}

/// Assemble a CSC matrix from triplets, handing the triplet vectors back.
fn assemble(
    m: usize,
    n: usize,
    rows: Vec<usize>,
    cols: Vec<isize>,
    weights: Vec<f64>,
) -> (Sprs<f64>, Vec<usize>, Vec<isize>, Vec<f64>) {
    let trpl = Trpl {
        m,
        n,
        p: cols,
        i: rows,
        x: weights,
    };
    let mut matrix = Sprs::new();
    matrix.from_trpl(&trpl);
    let Trpl { p, i, x, .. } = trpl;
    (matrix, i, p, x)
}
