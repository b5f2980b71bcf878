//! Interpolation of gridded fields onto scattered points.
//!
//! The workhorse is [`InterpolationMatrix`]: a sparse bilinear operator built
//! once per (grid, query-point-set) pair and applied to any number of data
//! arrays sharing that grid. Nearest-neighbor sampling is the piecewise
//! constant alternative for fields where averaging corners is not meaningful.

pub mod matrix;
pub mod nearest;

use serde::{Deserialize, Serialize};

use crate::error::{FlowlineError, Result};

pub use matrix::InterpolationMatrix;

/// Interpolation method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpMethod {
    /// Piecewise-constant sampling of the nearest grid node
    Nearest,
    /// Piecewise-bilinear interpolation of the four surrounding nodes
    Bilinear,
}

impl std::fmt::Display for InterpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpMethod::Nearest => write!(f, "nearest"),
            InterpMethod::Bilinear => write!(f, "bilinear"),
        }
    }
}

impl std::str::FromStr for InterpMethod {
    type Err = FlowlineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(InterpMethod::Nearest),
            "bilinear" => Ok(InterpMethod::Bilinear),
            _ => Err(FlowlineError::InvalidParameter {
                param: "interpolation".to_string(),
                message: format!("Unknown interpolation method: {}", s),
            }),
        }
    }
}
