//! Multi-axis extraction of profile values from gridded fields.
//!
//! [`ProfileExtractor`] couples a grid, a set of profile points, and an
//! interpolation method. The interpolation matrix is assembled once at
//! construction and reused for every plane of every field, so extracting a
//! full (time, depth, y, x) variable costs one matrix build plus one sparse
//! multiply per plane.

use ndarray::{s, Array2, ArrayD, Axis, IxDyn};
use tracing::debug;

use crate::dims::{self, AxisRole};
use crate::error::{FlowlineError, Result};
use crate::grid::MapplaneGrid;
use crate::interpolation::{nearest, InterpMethod, InterpolationMatrix};
use crate::masked::{Masked1, Masked2, MaskedD};
use crate::profile::Profile;

/// Axis order of an extracted variable: the x and y axes collapse into a
/// single profile axis placed where the first of them stood.
pub fn extracted_order(input_order: &[AxisRole]) -> Result<Vec<AxisRole>> {
    if !input_order.contains(&AxisRole::X) || !input_order.contains(&AxisRole::Y) {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "extraction needs both x and y axes, got {:?}",
                input_order
            ),
        });
    }

    let first_spatial = input_order
        .iter()
        .position(|r| matches!(r, AxisRole::X | AxisRole::Y))
        .ok_or_else(|| FlowlineError::DimensionMismatch {
            message: "no spatial axis in input order".to_string(),
        })?;

    let mut out: Vec<AxisRole> = input_order
        .iter()
        .copied()
        .filter(|r| !matches!(r, AxisRole::X | AxisRole::Y))
        .collect();
    // every axis ahead of the first spatial one survives filtering, so the
    // index carries over unchanged
    out.insert(first_spatial, AxisRole::Profile);
    Ok(out)
}

/// Extracts values along a fixed set of profile points from gridded fields.
pub struct ProfileExtractor {
    grid: MapplaneGrid,
    px: Vec<f64>,
    py: Vec<f64>,
    method: InterpMethod,
    matrix: Option<InterpolationMatrix>,
}

impl ProfileExtractor {
    /// Set up extraction of the given profile's vertices from fields on
    /// `grid`. For the bilinear method this assembles the interpolation
    /// matrix up front.
    pub fn new(grid: &MapplaneGrid, profile: &Profile, method: InterpMethod) -> Result<Self> {
        Self::from_points(grid, profile.x().to_vec(), profile.y().to_vec(), method)
    }

    /// Like [`new`](Self::new), but for an arbitrary point set.
    pub fn from_points(
        grid: &MapplaneGrid,
        px: Vec<f64>,
        py: Vec<f64>,
        method: InterpMethod,
    ) -> Result<Self> {
        let matrix = match method {
            InterpMethod::Bilinear => Some(InterpolationMatrix::new(grid, &px, &py, method)?),
            InterpMethod::Nearest => {
                grid.validate_points(&px, &py)?;
                None
            }
        };

        Ok(Self {
            grid: grid.clone(),
            px,
            py,
            method,
            matrix,
        })
    }

    /// Number of extraction points.
    pub fn n_points(&self) -> usize {
        self.px.len()
    }

    /// Interpolation method in use.
    pub fn method(&self) -> InterpMethod {
        self.method
    }

    /// The prebuilt interpolation matrix, if the method uses one.
    pub fn matrix(&self) -> Option<&InterpolationMatrix> {
        self.matrix.as_ref()
    }

    /// Extract from a single (y, x) plane covering the whole grid.
    pub fn extract_plane(&self, field: &Masked2) -> Result<Masked1> {
        match &self.matrix {
            Some(matrix) => matrix.apply(field),
            None => nearest::sample_plane(&self.grid, field, &self.px, &self.py),
        }
    }

    /// Extract from a field of any rank containing a (y, x) plane.
    ///
    /// `input_order` names the role of each axis of `values`; the result is
    /// arranged per `output_order`, which may be a template naming roles the
    /// input lacks (those are skipped). Every non-spatial axis is carried
    /// through unchanged, with the same plane matrix applied to each slice.
    pub fn extract(
        &self,
        values: &MaskedD,
        input_order: &[AxisRole],
        output_order: &[AxisRole],
    ) -> Result<MaskedD> {
        if input_order.len() != values.data.ndim() {
            return Err(FlowlineError::DimensionMismatch {
                message: format!(
                    "field has {} axes but the input order names {}",
                    values.data.ndim(),
                    input_order.len()
                ),
            });
        }
        if !input_order.contains(&AxisRole::X) || !input_order.contains(&AxisRole::Y) {
            return Err(FlowlineError::DimensionMismatch {
                message: format!(
                    "extraction needs both x and y axes, got {:?}",
                    input_order
                ),
            });
        }

        let mut extras: Vec<AxisRole> = Vec::new();
        let mut extras_shape: Vec<usize> = Vec::new();
        for (axis, role) in input_order.iter().enumerate() {
            if !matches!(role, AxisRole::X | AxisRole::Y) {
                extras.push(*role);
                extras_shape.push(values.data.shape()[axis]);
            }
        }

        let mut canonical = extras.clone();
        canonical.push(AxisRole::Y);
        canonical.push(AxisRole::X);

        let planes = to_planes(
            values.data.clone(),
            input_order,
            &canonical,
            self.grid.ny(),
            self.grid.nx(),
        )?;
        let mask_planes = to_planes(
            values.mask.clone(),
            input_order,
            &canonical,
            self.grid.ny(),
            self.grid.nx(),
        )?;

        let n_planes = planes.len_of(Axis(0));
        let n_points = self.n_points();
        debug!(
            "Extracting {} plane(s) of {}x{} onto {} points",
            n_planes,
            self.grid.ny(),
            self.grid.nx(),
            n_points
        );

        let mut out_data = Array2::zeros((n_planes, n_points));
        let mut out_mask = Array2::from_elem((n_planes, n_points), false);
        for p in 0..n_planes {
            let plane = Masked2::new(
                planes.slice(s![p, .., ..]).to_owned(),
                mask_planes.slice(s![p, .., ..]).to_owned(),
            )?;
            let sampled = self.extract_plane(&plane)?;
            out_data.row_mut(p).assign(&sampled.data);
            out_mask.row_mut(p).assign(&sampled.mask);
        }

        let mut out_shape = extras_shape;
        out_shape.push(n_points);
        let out_data = out_data
            .into_shape(IxDyn(&out_shape))
            .map_err(|e| FlowlineError::DimensionMismatch {
                message: e.to_string(),
            })?;
        let out_mask = out_mask
            .into_shape(IxDyn(&out_shape))
            .map_err(|e| FlowlineError::DimensionMismatch {
                message: e.to_string(),
            })?;

        let mut canonical_out = extras;
        canonical_out.push(AxisRole::Profile);

        let data = dims::permute(out_data, &canonical_out, output_order)?;
        let mask = dims::permute(out_mask, &canonical_out, output_order)?;
        MaskedD::new(data, mask)
    }
}

/// Permute a field into `[extras.., y, x]` order and flatten the extra axes
/// into a single leading plane axis.
fn to_planes<T: Clone>(
    values: ArrayD<T>,
    input_order: &[AxisRole],
    canonical: &[AxisRole],
    ny: usize,
    nx: usize,
) -> Result<ndarray::Array3<T>> {
    let permuted = dims::permute(values, input_order, canonical)?;
    let ndim = permuted.ndim();
    let shape = permuted.shape();
    if shape[ndim - 2] != ny || shape[ndim - 1] != nx {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "field plane is {}x{} but the grid is {}x{}",
                shape[ndim - 2],
                shape[ndim - 1],
                ny,
                nx
            ),
        });
    }
    let n_planes: usize = shape[..ndim - 2].iter().product();

    let standard = permuted.as_standard_layout().into_owned();
    standard
        .into_shape((n_planes, ny, nx))
        .map_err(|e| FlowlineError::DimensionMismatch {
            message: e.to_string(),
        })
}
