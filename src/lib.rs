//! # flowline
//!
//! An in-memory engine for extracting profiles and fluxes from glaciological
//! model output.
//!
//! This library interpolates gridded mapplane fields onto arbitrary polylines
//! (flowlines, flux gates) using a sparse piecewise-bilinear operator that is
//! assembled once per grid-and-points pairing and reused across variables,
//! vertical levels, and time slices.
//!
//! ## Key Features
//!
//! - **Sparse bilinear extraction**: One matrix build per profile, one sparse
//!   multiply per plane, restricted to the bounding subset of the grid
//! - **Mask-aware renormalization**: Missing cells drop out of the operator
//!   and surviving weights are rescaled, so fill values never bleed into results
//! - **Axis-order independence**: Fields of any rank are accepted with named
//!   axis roles and returned in any requested order
//! - **Profile geometry**: Along-path distances and right-hand unit normals
//!   for flux computations across gates
//!
//! ## Architecture
//!
//! - **Geometry Layer**: Grids, profiles, and their derived quantities
//! - **Operator Layer**: Sparse interpolation matrices and nearest sampling
//! - **Analysis**: Multi-axis extraction, discharge statistics, velocity vectors

pub mod config;
pub mod dims;
pub mod error;
pub mod extract;
pub mod fluxes;
pub mod grid;
pub mod interpolation;
pub mod logging;
pub mod masked;
pub mod profile;
pub mod vectors;

pub use config::{Config, ExtractionConfig, FluxConfig, VectorConfig};
pub use dims::AxisRole;
pub use error::{FlowlineError, Result};
pub use extract::ProfileExtractor;
pub use fluxes::{DischargeAnalysis, DischargeSnapshot};
pub use grid::MapplaneGrid;
pub use interpolation::{InterpMethod, InterpolationMatrix};
pub use logging::{
    init_tracing, log_error, log_matrix_stats, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use masked::{Masked, Masked1, Masked2, MaskedD};
pub use profile::Profile;
pub use vectors::{velocity_segments, VelocityVector};
