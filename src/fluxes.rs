//! Discharge statistics over mapplane fields.
//!
//! A discharge cell is an unmasked, non-zero entry of the discharge field.
//! For every such cell a [`DischargeSnapshot`] records neighborhood averages
//! of ice thickness, gate depth, and flow speed, plus the gate
//! cross-sectional area. Callers apply the masking policy up front, e.g.
//! with [`Masked::from_predicate`](crate::masked::Masked::from_predicate):
//! mask discharge above the significance cutoff and bed topography at or
//! above sea level.

use ndarray::Array1;
use tracing::debug;

use crate::error::{FlowlineError, Result};
use crate::masked::{Masked1, Masked2};

/// Flow speed `sqrt(u^2 + v^2)` from two congruent component fields. The
/// result is masked wherever either component is.
pub fn speed_magnitude(u: &Masked2, v: &Masked2) -> Result<Masked2> {
    if u.data.dim() != v.data.dim() {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "velocity components have shapes {:?} and {:?}",
                u.data.dim(),
                v.data.dim()
            ),
        });
    }

    let data = ndarray::Zip::from(&u.data)
        .and(&v.data)
        .map_collect(|&a, &b| (a * a + b * b).sqrt());
    let mask = ndarray::Zip::from(&u.mask)
        .and(&v.mask)
        .map_collect(|&a, &b| a || b);
    Masked2::new(data, mask)
}

/// Neighborhood average of `transform(field)` around `(row, col)`, with
/// periodic wraparound at the grid edges. Masked and zero-valued neighbors
/// do not contribute; with no contributors at all the average is masked.
fn stencil_average<F>(
    field: &Masked2,
    row: usize,
    col: usize,
    half: isize,
    transform: F,
) -> (f64, bool)
where
    F: Fn(f64) -> f64,
{
    let (ny, nx) = field.data.dim();
    let mut sum = 0.0;
    let mut count = 0usize;
    for dr in -half..=half {
        for dc in -half..=half {
            let r = (row as isize + dr).rem_euclid(ny as isize) as usize;
            let c = (col as isize + dc).rem_euclid(nx as isize) as usize;
            if field.mask[[r, c]] {
                continue;
            }
            let v = transform(field.data[[r, c]]);
            if v != 0.0 {
                sum += v;
                count += 1;
            }
        }
    }
    if count == 0 {
        (0.0, true)
    } else {
        (sum / count as f64, false)
    }
}

/// Per-cell discharge statistics for one time slice.
#[derive(Debug, Clone)]
pub struct DischargeSnapshot {
    rows: Vec<usize>,
    cols: Vec<usize>,
    discharge: Masked1,
    ice_thickness: Masked1,
    gate_depth: Masked1,
    speed: Masked1,
    area: Masked1,
}

impl DischargeSnapshot {
    /// Locate the discharge cells of one time slice and compute their
    /// neighborhood statistics.
    ///
    /// All four fields must share one shape. `stencil_width` is the odd side
    /// length of the averaging window; `dx` is the grid spacing used for the
    /// gate area (`thickness_avg * dx`). Gate depth is the average of the
    /// absolute bed elevation.
    pub fn compute(
        discharge: &Masked2,
        thickness: &Masked2,
        bed: &Masked2,
        speed: &Masked2,
        dx: f64,
        stencil_width: usize,
    ) -> Result<Self> {
        let shape = discharge.data.dim();
        for (name, field) in [("thickness", thickness), ("bed", bed), ("speed", speed)] {
            if field.data.dim() != shape {
                return Err(FlowlineError::DimensionMismatch {
                    message: format!(
                        "{} has shape {:?} but discharge has {:?}",
                        name,
                        field.data.dim(),
                        shape
                    ),
                });
            }
        }
        if stencil_width % 2 == 0 || stencil_width == 0 {
            return Err(FlowlineError::InvalidParameter {
                param: "stencil_width".to_string(),
                message: format!("must be odd and positive (got {})", stencil_width),
            });
        }
        if dx <= 0.0 {
            return Err(FlowlineError::InvalidParameter {
                param: "dx".to_string(),
                message: format!("grid spacing must be positive (got {})", dx),
            });
        }

        let half = (stencil_width / 2) as isize;
        let (ny, nx) = shape;

        let mut rows = Vec::new();
        let mut cols = Vec::new();
        for r in 0..ny {
            for c in 0..nx {
                if !discharge.mask[[r, c]] && discharge.data[[r, c]] != 0.0 {
                    rows.push(r);
                    cols.push(c);
                }
            }
        }
        debug!("Found {} discharge cell(s) in {}x{} slice", rows.len(), ny, nx);

        let n = rows.len();
        let mut cell_discharge = Array1::zeros(n);
        let mut thk_avg = Array1::zeros(n);
        let mut thk_mask = Array1::from_elem(n, false);
        let mut depth_avg = Array1::zeros(n);
        let mut depth_mask = Array1::from_elem(n, false);
        let mut speed_avg = Array1::zeros(n);
        let mut speed_mask = Array1::from_elem(n, false);
        let mut area = Array1::zeros(n);
        let mut area_mask = Array1::from_elem(n, false);

        for k in 0..n {
            let (r, c) = (rows[k], cols[k]);
            cell_discharge[k] = discharge.data[[r, c]];

            let (v, m) = stencil_average(thickness, r, c, half, |x| x);
            thk_avg[k] = v;
            thk_mask[k] = m;
            area[k] = v * dx;
            area_mask[k] = m;

            let (v, m) = stencil_average(bed, r, c, half, f64::abs);
            depth_avg[k] = v;
            depth_mask[k] = m;

            let (v, m) = stencil_average(speed, r, c, half, |x| x);
            speed_avg[k] = v;
            speed_mask[k] = m;
        }

        Ok(Self {
            rows,
            cols,
            discharge: Masked1::new(cell_discharge, Array1::from_elem(n, false))?,
            ice_thickness: Masked1::new(thk_avg, thk_mask)?,
            gate_depth: Masked1::new(depth_avg, depth_mask)?,
            speed: Masked1::new(speed_avg, speed_mask)?,
            area: Masked1::new(area, area_mask)?,
        })
    }

    /// Number of discharge cells.
    pub fn n_cells(&self) -> usize {
        self.rows.len()
    }

    /// Row indices of the discharge cells.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Column indices of the discharge cells.
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Discharge value at each cell.
    pub fn discharge(&self) -> &Masked1 {
        &self.discharge
    }

    /// Neighborhood-averaged ice thickness at each cell.
    pub fn ice_thickness(&self) -> &Masked1 {
        &self.ice_thickness
    }

    /// Neighborhood-averaged absolute bed elevation at each cell.
    pub fn gate_depth(&self) -> &Masked1 {
        &self.gate_depth
    }

    /// Neighborhood-averaged flow speed at each cell.
    pub fn speed(&self) -> &Masked1 {
        &self.speed
    }

    /// Gate cross-sectional area at each cell.
    pub fn area(&self) -> &Masked1 {
        &self.area
    }

    /// Sum of the unmasked ice thickness averages.
    pub fn ice_thickness_total(&self) -> f64 {
        self.ice_thickness.filled(0.0).sum()
    }

    /// Sum of the unmasked gate areas.
    pub fn area_total(&self) -> f64 {
        self.area.filled(0.0).sum()
    }
}

/// An ordered series of discharge snapshots, one per time slice.
#[derive(Debug, Clone, Default)]
pub struct DischargeAnalysis {
    snapshots: Vec<DischargeSnapshot>,
}

impl DischargeAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the snapshot for the next time slice.
    pub fn push(&mut self, snapshot: DischargeSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn snapshots(&self) -> &[DischargeSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Per-snapshot totals of the ice thickness averages.
    pub fn ice_thickness_totals(&self) -> Array1<f64> {
        self.snapshots
            .iter()
            .map(DischargeSnapshot::ice_thickness_total)
            .collect()
    }

    /// Per-snapshot totals of the gate areas.
    pub fn area_totals(&self) -> Array1<f64> {
        self.snapshots
            .iter()
            .map(DischargeSnapshot::area_total)
            .collect()
    }
}
