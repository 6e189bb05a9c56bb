//! Error types for the livecast facade

use livecast_media::MediaError;
use thiserror::Error;

/// Main error type for livecast operations
#[derive(Error, Debug)]
pub enum LivecastError {
    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Invalid configuration document or builder input
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// A device the builder was asked for is not present
    #[error("Device not found: {device}")]
    DeviceNotFound {
        /// Description of the requested device
        device: String,
    },

    /// Error raised by the capture or presentation pipeline
    #[error(transparent)]
    Media(#[from] MediaError),
}

impl LivecastError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LivecastError::Media(e) => e.is_recoverable(),
            LivecastError::DeviceNotFound { .. } => true,
            LivecastError::Initialization { .. } | LivecastError::Configuration { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_errors_convert() {
        let error: LivecastError = MediaError::rejected("fps", "too fast").into();
        assert!(error.is_recoverable());
        assert_eq!(error.to_string(), "Configuration rejected: fps - too fast");
    }
}
