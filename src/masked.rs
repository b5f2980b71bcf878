//! Masked arrays: data with a congruent boolean missing-value mask.
//!
//! Gridded model output routinely carries missing cells (ice-free ocean,
//! fill values). A [`Masked`] pairs an `ndarray` array with a boolean mask of
//! identical shape, where `true` marks a cell as missing/invalid.

use ndarray::{Array, Dimension, Ix1, Ix2, IxDyn};

use crate::error::{FlowlineError, Result};

/// An array of `f64` values with a congruent boolean mask.
#[derive(Debug, Clone)]
pub struct Masked<D: Dimension> {
    /// The data values. Entries behind masked cells are unspecified.
    pub data: Array<f64, D>,
    /// The mask: `true` marks a missing/invalid cell.
    pub mask: Array<bool, D>,
}

/// A masked 1-D array (e.g. values along a profile).
pub type Masked1 = Masked<Ix1>;
/// A masked 2-D array (e.g. a mapplane field).
pub type Masked2 = Masked<Ix2>;
/// A masked dynamic-rank array (e.g. a variable with time/level axes).
pub type MaskedD = Masked<IxDyn>;

impl<D: Dimension> Masked<D> {
    /// Pair data with a mask, checking that their shapes agree.
    pub fn new(data: Array<f64, D>, mask: Array<bool, D>) -> Result<Self> {
        if data.shape() != mask.shape() {
            return Err(FlowlineError::DimensionMismatch {
                message: format!(
                    "data shape {:?} does not match mask shape {:?}",
                    data.shape(),
                    mask.shape()
                ),
            });
        }
        Ok(Self { data, mask })
    }

    /// Wrap data with an all-false mask.
    pub fn unmasked(data: Array<f64, D>) -> Self {
        let mask = Array::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// Mask every cell equal to `fill_value`.
    pub fn from_fill_value(data: Array<f64, D>, fill_value: f64) -> Self {
        let mask = data.map(|&v| v == fill_value);
        Self { data, mask }
    }

    /// Mask every cell for which the predicate holds.
    pub fn from_predicate<F>(data: Array<f64, D>, predicate: F) -> Self
    where
        F: Fn(f64) -> bool,
    {
        let mask = data.map(|&v| predicate(v));
        Self { data, mask }
    }

    /// Whether any cell is masked.
    pub fn any_masked(&self) -> bool {
        self.mask.iter().any(|&m| m)
    }

    /// Number of masked cells.
    pub fn masked_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// The data with masked cells replaced by `value`.
    pub fn filled(&self, value: f64) -> Array<f64, D> {
        let mut out = self.data.clone();
        out.zip_mut_with(&self.mask, |v, &m| {
            if m {
                *v = value;
            }
        });
        out
    }

    /// Convert to a dynamic-rank masked array.
    pub fn into_dyn(self) -> MaskedD {
        Masked {
            data: self.data.into_dyn(),
            mask: self.mask.into_dyn(),
        }
    }
}

impl MaskedD {
    /// Convert a dynamic-rank masked array to a fixed rank.
    pub fn into_dimensionality<D2: Dimension>(self) -> Result<Masked<D2>> {
        let shape = self.data.shape().to_vec();
        let data = self.data.into_dimensionality::<D2>().map_err(|_| {
            FlowlineError::DimensionMismatch {
                message: format!("array of shape {:?} has the wrong rank", shape),
            }
        })?;
        let mask = self.mask.into_dimensionality::<D2>().map_err(|_| {
            FlowlineError::DimensionMismatch {
                message: format!("mask of shape {:?} has the wrong rank", shape),
            }
        })?;
        Ok(Masked { data, mask })
    }
}
