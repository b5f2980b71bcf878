//! Axis-role bookkeeping for multi-dimensional variables.
//!
//! Model output variables carry their mapplane axes interleaved with time and
//! vertical-level axes in no fixed order. This module assigns each axis an
//! explicit [`AxisRole`] (detected from the conventional dimension names) and
//! provides a typed permutation that reorders array axes by role.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{FlowlineError, Result};

/// The role an array axis plays in a gridded variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisRole {
    /// Spatial x (columns of a mapplane field)
    X,
    /// Spatial y (rows of a mapplane field)
    Y,
    /// Vertical level
    Vertical,
    /// Time
    Time,
    /// Along-profile sample index (output of profile extraction)
    Profile,
}

impl std::fmt::Display for AxisRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AxisRole::X => "x",
            AxisRole::Y => "y",
            AxisRole::Vertical => "vertical",
            AxisRole::Time => "time",
            AxisRole::Profile => "profile",
        };
        write!(f, "{}", name)
    }
}

/// Detect the role of a dimension from its name.
///
/// Recognizes the conventional names of ice-sheet model output: `x`/`x1`,
/// `y`/`y1`, `z`/`zb`, `t`/`time`, plus `profile` for extracted output.
pub fn detect_role(name: &str) -> Option<AxisRole> {
    match name {
        "x" | "x1" => Some(AxisRole::X),
        "y" | "y1" => Some(AxisRole::Y),
        "z" | "zb" => Some(AxisRole::Vertical),
        "t" | "time" => Some(AxisRole::Time),
        "profile" => Some(AxisRole::Profile),
        _ => None,
    }
}

/// Map a variable's dimension names to axis roles.
///
/// Fails on unknown names and on two dimensions mapping to the same role.
pub fn resolve_roles<S: AsRef<str>>(names: &[S]) -> Result<Vec<AxisRole>> {
    let mut roles = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let role = detect_role(name).ok_or_else(|| FlowlineError::InvalidParameter {
            param: name.to_string(),
            message: "unrecognized dimension name".to_string(),
        })?;
        if roles.contains(&role) {
            return Err(FlowlineError::InvalidParameter {
                param: name.to_string(),
                message: format!("duplicate {} axis", role),
            });
        }
        roles.push(role);
    }
    Ok(roles)
}

/// Reorder array axes from `input_order` to `output_order`.
///
/// Pure relabeling: no data moves. Roles in `output_order` that are absent
/// from `input_order` are filtered out first; after filtering, the output
/// list must name every input axis exactly once. Round-tripping A -> B -> A
/// reproduces the original array for any permutation.
pub fn permute<T>(
    values: ArrayD<T>,
    input_order: &[AxisRole],
    output_order: &[AxisRole],
) -> Result<ArrayD<T>> {
    if input_order.len() != values.ndim() {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "array has {} axes but the input order names {}",
                values.ndim(),
                input_order.len()
            ),
        });
    }

    let filtered: Vec<AxisRole> = output_order
        .iter()
        .copied()
        .filter(|role| input_order.contains(role))
        .collect();

    if filtered.len() != input_order.len() {
        return Err(FlowlineError::DimensionMismatch {
            message: format!(
                "output order {:?} does not cover the input axes {:?}",
                output_order, input_order
            ),
        });
    }

    // the j-th output axis is the input axis carrying the j-th requested role
    let mut axes = Vec::with_capacity(filtered.len());
    for role in &filtered {
        let pos = input_order.iter().position(|r| r == role).ok_or_else(|| {
            FlowlineError::DimensionMismatch {
                message: format!("role {} not present in the input order", role),
            }
        })?;
        if axes.contains(&pos) {
            return Err(FlowlineError::DimensionMismatch {
                message: format!("role {} listed twice in the output order", role),
            });
        }
        axes.push(pos);
    }

    Ok(values.permuted_axes(IxDyn(&axes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    #[test]
    fn test_detect_role_candidates() {
        assert_eq!(detect_role("x"), Some(AxisRole::X));
        assert_eq!(detect_role("x1"), Some(AxisRole::X));
        assert_eq!(detect_role("y1"), Some(AxisRole::Y));
        assert_eq!(detect_role("z"), Some(AxisRole::Vertical));
        assert_eq!(detect_role("zb"), Some(AxisRole::Vertical));
        assert_eq!(detect_role("t"), Some(AxisRole::Time));
        assert_eq!(detect_role("time"), Some(AxisRole::Time));
        assert_eq!(detect_role("station"), None);
    }

    #[test]
    fn test_resolve_roles() {
        let roles = resolve_roles(&["time", "y", "x"]).unwrap();
        assert_eq!(roles, vec![AxisRole::Time, AxisRole::Y, AxisRole::X]);

        assert!(matches!(
            resolve_roles(&["time", "lat", "lon"]),
            Err(FlowlineError::InvalidParameter { .. })
        ));
        assert!(matches!(
            resolve_roles(&["x", "x1"]),
            Err(FlowlineError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_permute_swaps_axes() {
        let values = ArrayD::from_shape_fn(IxDyn(&[2, 3]), |ix| (ix[0] * 10 + ix[1]) as f64);
        let out = permute(
            values,
            &[AxisRole::Y, AxisRole::X],
            &[AxisRole::X, AxisRole::Y],
        )
        .unwrap();
        assert_eq!(out.shape(), &[3, 2]);
        assert_eq!(out[IxDyn(&[2, 1])], 12.0);
    }

    #[test]
    fn test_permute_three_cycle() {
        let values =
            ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |ix| (ix[0] * 100 + ix[1] * 10 + ix[2]) as f64);
        let input = [AxisRole::Time, AxisRole::Vertical, AxisRole::Profile];
        let output = [AxisRole::Vertical, AxisRole::Profile, AxisRole::Time];

        let out = permute(values, &input, &output).unwrap();
        assert_eq!(out.shape(), &[3, 4, 2]);
        // element [t, z, p] of the input must land at [z, p, t]
        assert_eq!(out[IxDyn(&[2, 3, 1])], 123.0);
    }

    #[test]
    fn test_permute_round_trip_is_identity() {
        let values =
            ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |ix| (ix[0] * 100 + ix[1] * 10 + ix[2]) as f64);
        let input = [AxisRole::Time, AxisRole::Vertical, AxisRole::Profile];
        let output = [AxisRole::Profile, AxisRole::Time, AxisRole::Vertical];

        let there = permute(values.clone(), &input, &output).unwrap();
        let back = permute(there, &output, &input).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_permute_filters_absent_roles() {
        let values = ArrayD::from_shape_fn(IxDyn(&[2, 3]), |ix| (ix[0] + ix[1]) as f64);
        // Time in the output order is ignored because the input has no time axis
        let out = permute(
            values,
            &[AxisRole::Y, AxisRole::X],
            &[AxisRole::Time, AxisRole::X, AxisRole::Y],
        )
        .unwrap();
        assert_eq!(out.shape(), &[3, 2]);
    }

    #[test]
    fn test_permute_rejects_missing_input_axis() {
        let values = ArrayD::from_shape_fn(IxDyn(&[2, 3]), |ix| (ix[0] + ix[1]) as f64);
        let result = permute(
            values,
            &[AxisRole::Y, AxisRole::X],
            &[AxisRole::X, AxisRole::Time],
        );
        assert!(matches!(
            result,
            Err(FlowlineError::DimensionMismatch { .. })
        ));
    }
}
