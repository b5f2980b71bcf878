//! Error types for the flowline engine.
//!
//! This module defines a single error enum covering every failure mode of the
//! engine, from grid construction through interpolation and profile geometry.

use thiserror::Error;

/// The main error type for flowline operations.
#[derive(Error, Debug)]
pub enum FlowlineError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid coordinate errors
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Array shape or axis-order violations
    #[error("Dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// Requested functionality that is not implemented
    #[error("Not implemented: {message}")]
    NotImplemented { message: String },

    /// Degenerate numeric input (e.g. zero-length chords)
    #[error("Numeric error: {message}")]
    Numeric { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with FlowlineError
pub type Result<T> = std::result::Result<T, FlowlineError>;
