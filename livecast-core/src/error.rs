//! Error types for livecast core

use thiserror::Error;

/// Errors raised while building core values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Pixel storage does not match the declared frame layout
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Bytes required by width, height and row stride
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// A rectangle or size that cannot describe pixel content
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the geometry was refused
        reason: String,
    },
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
