//! Logging initialization

use crate::LivecastError;
use tracing_subscriber::EnvFilter;

/// Install a formatted `tracing` subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails if a global
/// subscriber is already installed.
pub fn init(default_filter: &str) -> Result<(), LivecastError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| LivecastError::Configuration {
            message: format!("Invalid log filter '{}': {}", default_filter, e),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| LivecastError::Initialization {
            reason: format!("Failed to install log subscriber: {}", e),
        })
}
