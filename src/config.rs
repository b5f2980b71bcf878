//! Configuration management for flowline.
//!
//! Embedding programs configure the engine with the following precedence:
//! 1. Values set programmatically on the loaded `Config` (highest priority)
//! 2. JSON config file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FlowlineError, Result};
use crate::interpolation::InterpMethod;

/// Profile extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Interpolation method applied to mapplane fields
    #[serde(default = "default_method")]
    pub method: InterpMethod,

    /// Reverse profile vertex order before projecting
    #[serde(default)]
    pub flip: bool,

    /// Fill value marking missing cells in input fields
    #[serde(default = "default_fill_value")]
    pub fill_value: f64,

    /// Variables to extract (empty = caller decides)
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Discharge statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxConfig {
    /// Discharge values at or above this cutoff are insignificant
    #[serde(default = "default_min_discharge")]
    pub min_discharge: f64,

    /// Odd side length of the neighborhood averaging window
    #[serde(default = "default_stencil_width")]
    pub stencil_width: usize,
}

/// Velocity vector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Segment length per unit speed
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Keep every n-th cell in each direction
    #[serde(default = "default_prune_factor")]
    pub prune_factor: usize,

    /// Cells at or below this speed are skipped
    #[serde(default)]
    pub threshold: f64,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Profile extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Discharge statistics configuration
    #[serde(default)]
    pub fluxes: FluxConfig,

    /// Velocity vector configuration
    #[serde(default)]
    pub vectors: VectorConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration, layering an optional JSON file over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = path {
            let json_config = Self::from_file(config_path)?;
            config.merge(json_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        self.extraction = other.extraction;
        self.fluxes = other.fluxes;
        self.vectors = other.vectors;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(FlowlineError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        // Fill-value comparisons need a representable number
        if !self.extraction.fill_value.is_finite() {
            return Err(FlowlineError::Config {
                message: format!(
                    "Fill value must be finite (got {})",
                    self.extraction.fill_value
                ),
            });
        }

        // Validate the averaging stencil
        if self.fluxes.stencil_width == 0 || self.fluxes.stencil_width % 2 == 0 {
            return Err(FlowlineError::Config {
                message: format!(
                    "Stencil width must be odd and positive (got {})",
                    self.fluxes.stencil_width
                ),
            });
        }

        // Validate vector options
        if self.vectors.prune_factor == 0 {
            return Err(FlowlineError::Config {
                message: "Prune factor cannot be 0".to_string(),
            });
        }
        if !(self.vectors.scale_factor > 0.0 && self.vectors.scale_factor.is_finite()) {
            return Err(FlowlineError::Config {
                message: format!(
                    "Scale factor must be positive and finite (got {})",
                    self.vectors.scale_factor
                ),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            fluxes: FluxConfig::default(),
            vectors: VectorConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            flip: false,
            fill_value: default_fill_value(),
            variables: Vec::new(),
        }
    }
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            min_discharge: default_min_discharge(),
            stencil_width: default_stencil_width(),
        }
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            prune_factor: default_prune_factor(),
            threshold: 0.0,
        }
    }
}

// Default value functions for serde
fn default_method() -> InterpMethod {
    InterpMethod::Bilinear
}

fn default_fill_value() -> f64 {
    -2.0e9
}

fn default_min_discharge() -> f64 {
    -1.0
}

fn default_stencil_width() -> usize {
    3
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_prune_factor() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}
