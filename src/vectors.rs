//! Velocity vector segments for quiver-style rendering of flow fields.

use serde::Serialize;
use tracing::debug;

use crate::config::VectorConfig;
use crate::error::{FlowlineError, Result};
use crate::grid::MapplaneGrid;
use crate::masked::Masked2;

/// A 3-point line segment through a grid cell center, aligned with the local
/// velocity and scaled by its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VelocityVector {
    pub start: (f64, f64),
    pub center: (f64, f64),
    pub end: (f64, f64),
    pub ux: f64,
    pub uy: f64,
    pub speed: f64,
}

/// Build velocity segments from two component fields on `grid`.
///
/// Every `prune_factor`-th cell in each direction is considered; cells where
/// either component is masked, or whose speed does not exceed
/// `options.threshold`, are skipped. Segment endpoints sit at
/// `center ± scale_factor * (ux, uy) / 2`.
pub fn velocity_segments(
    grid: &MapplaneGrid,
    u: &Masked2,
    v: &Masked2,
    options: &VectorConfig,
) -> Result<Vec<VelocityVector>> {
    if u.data.dim() != v.data.dim() {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "velocity components have shapes {:?} and {:?}",
                u.data.dim(),
                v.data.dim()
            ),
        });
    }
    if u.data.dim() != (grid.ny(), grid.nx()) {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "velocity field is {:?} but the grid is {}x{}",
                u.data.dim(),
                grid.ny(),
                grid.nx()
            ),
        });
    }
    if options.prune_factor == 0 {
        return Err(FlowlineError::InvalidParameter {
            param: "prune_factor".to_string(),
            message: "cannot be 0".to_string(),
        });
    }
    if !(options.scale_factor > 0.0 && options.scale_factor.is_finite()) {
        return Err(FlowlineError::InvalidParameter {
            param: "scale_factor".to_string(),
            message: format!("must be positive and finite (got {})", options.scale_factor),
        });
    }

    let mut vectors = Vec::new();
    let mut visited = 0usize;
    for r in (0..grid.ny()).step_by(options.prune_factor) {
        for c in (0..grid.nx()).step_by(options.prune_factor) {
            visited += 1;
            if u.mask[[r, c]] || v.mask[[r, c]] {
                continue;
            }
            let ux = u.data[[r, c]];
            let uy = v.data[[r, c]];
            let speed = (ux * ux + uy * uy).sqrt();
            if speed <= options.threshold {
                continue;
            }

            let cx = grid.x()[c];
            let cy = grid.y()[r];
            let half_x = 0.5 * options.scale_factor * ux;
            let half_y = 0.5 * options.scale_factor * uy;
            vectors.push(VelocityVector {
                start: (cx - half_x, cy - half_y),
                center: (cx, cy),
                end: (cx + half_x, cy + half_y),
                ux,
                uy,
                speed,
            });
        }
    }

    debug!(
        "Built {} velocity segment(s) from {} visited cell(s)",
        vectors.len(),
        visited
    );
    Ok(vectors)
}
