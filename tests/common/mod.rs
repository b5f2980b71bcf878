//! Common test utilities for flowline.
//!
//! This module provides shared utilities for testing the flowline engine.

// Re-export all common test utilities
pub mod assertions;
pub mod test_data;
