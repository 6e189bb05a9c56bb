//! Media pipeline error types and handling
//!
//! Errors raised by the capture platform are carried through unchanged: the
//! mixer never retries, rolls back or logs on the caller's behalf.

use livecast_core::CoreError;
use thiserror::Error;

/// Main error type for capture and presentation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    /// Frame or geometry construction failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The platform capture layer refused a setting
    #[error("Configuration rejected: {setting} - {reason}")]
    ConfigurationRejected {
        /// Setting that was refused
        setting: String,
        /// Reason reported by the platform
        reason: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Device could not be opened or added to the session
    #[error("Device unavailable: {device_id} - {reason}")]
    DeviceUnavailable {
        /// Device identifier
        device_id: String,
        /// Failure reason
        reason: String,
    },

    /// Capture session failed to start
    #[error("Session failed to start: {reason}")]
    SessionStartFailed {
        /// Failure reason
        reason: String,
    },

    /// Feature needs a capability the host did not provide
    #[error("Unsupported platform: {feature} is not available")]
    UnsupportedPlatform {
        /// Feature that was requested
        feature: String,
    },

    /// GPU entry point used before the context was prepared
    #[error("GPU context not prepared")]
    ContextNotPrepared,

    /// GPU entry point used off the context's owning thread
    #[error("GPU context used from a thread that does not own it")]
    WrongThread,
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::ConfigurationRejected { .. } => true,
            MediaError::DeviceUnavailable { .. } => true,
            MediaError::SessionStartFailed { .. } => true,
            MediaError::ContextNotPrepared => true,
            MediaError::Core(_) => false,
            MediaError::InvalidConfiguration { .. } => false,
            MediaError::UnsupportedPlatform { .. } => false,
            MediaError::WrongThread => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::Core(_) => ErrorCategory::Data,
            MediaError::ConfigurationRejected { .. } => ErrorCategory::Configuration,
            MediaError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            MediaError::DeviceUnavailable { .. } => ErrorCategory::Device,
            MediaError::SessionStartFailed { .. } => ErrorCategory::Device,
            MediaError::UnsupportedPlatform { .. } => ErrorCategory::Platform,
            MediaError::ContextNotPrepared => ErrorCategory::State,
            MediaError::WrongThread => ErrorCategory::State,
        }
    }

    /// Shorthand for a platform rejection of `setting`
    pub fn rejected(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        MediaError::ConfigurationRejected {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration and parameter errors
    Configuration,
    /// Platform compatibility errors
    Platform,
    /// Data validation errors
    Data,
    /// Device and hardware errors
    Device,
    /// State management errors
    State,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let error = MediaError::rejected("sessionPreset", "hd1920x1080 not supported");
        assert_eq!(error.category(), ErrorCategory::Configuration);
        assert!(error.is_recoverable());

        let error = MediaError::UnsupportedPlatform {
            feature: "orientation sync".to_string(),
        };
        assert_eq!(error.category(), ErrorCategory::Platform);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let error = MediaError::rejected("fps", "device maximum is 30");
        assert_eq!(
            error.to_string(),
            "Configuration rejected: fps - device maximum is 30"
        );
    }

    #[test]
    fn test_error_from_core() {
        let core = CoreError::InvalidFrameData {
            expected: 16,
            actual: 4,
        };
        let error = MediaError::from(core.clone());
        assert_eq!(error, MediaError::Core(core));
        assert_eq!(error.category(), ErrorCategory::Data);
    }
}
