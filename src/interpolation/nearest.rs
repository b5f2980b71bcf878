//! Nearest-neighbor sampling.
//!
//! The piecewise-constant alternative to the bilinear matrix: each query
//! point takes the value of the nearest grid node, mask included. Used for
//! categorical fields and for quick looks where corner averaging is not
//! wanted.

use ndarray::Array1;

use crate::error::{FlowlineError, Result};
use crate::grid::MapplaneGrid;
use crate::masked::{Masked, Masked1, Masked2};

/// Sample a full-grid plane at the nodes nearest to the query points.
///
/// Points must lie within the grid extent (inclusive); indices are kept in
/// range against boundary floating-point jitter.
pub fn sample_plane(
    grid: &MapplaneGrid,
    values: &Masked2,
    px: &[f64],
    py: &[f64],
) -> Result<Masked1> {
    grid.validate_points(px, py)?;

    let (ny, nx) = values.data.dim();
    if ny != grid.ny() || nx != grid.nx() {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "expected a full-grid array of shape ({}, {}), got ({}, {})",
                grid.ny(),
                grid.nx(),
                ny,
                nx
            ),
        });
    }

    let mut data = Array1::zeros(px.len());
    let mut mask = Array1::from_elem(px.len(), false);

    for (k, (&x, &y)) in px.iter().zip(py.iter()).enumerate() {
        let i = grid.nearest_column(x).clamp(0, nx as isize - 1) as usize;
        let j = grid.nearest_row(y).clamp(0, ny as isize - 1) as usize;
        data[k] = values.data[[j, i]];
        mask[k] = values.mask[[j, i]];
    }

    Masked::new(data, mask)
}
