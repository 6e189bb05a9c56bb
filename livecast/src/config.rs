//! Configuration types and defaults

use crate::LivecastError;
use livecast_media::{MixerSettings, SurfaceConfig};
use serde::{Deserialize, Serialize};

/// Global livecast configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    /// Enable debug logging
    pub debug_logging: bool,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Settings applied to every new stream's mixer
    pub mixer: MixerSettings,
    /// Configuration for surfaces created through [`crate::Livecast::surface`]
    pub surface: SurfaceConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_filter: "info".to_string(),
            mixer: MixerSettings::default(),
            surface: SurfaceConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Parse a JSON configuration document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, LivecastError> {
        let config: GlobalConfig =
            serde_json::from_str(json).map_err(|e| LivecastError::Configuration {
                message: format!("Failed to parse configuration: {}", e),
            })?;
        config.mixer.validate()?;
        Ok(config)
    }

    /// Filter directive for [`crate::logging::init`]
    pub fn log_directive(&self) -> &str {
        if self.debug_logging {
            "debug"
        } else {
            &self.log_filter
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecast_core::VideoGravity;
    use livecast_media::SessionPreset;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert!(!config.debug_logging);
        assert_eq!(config.log_directive(), "info");
        assert!(config.mixer.is_empty());
        assert_eq!(config.surface.gravity, VideoGravity::ResizeAspect);
    }

    #[test]
    fn test_from_json_partial() {
        let config = GlobalConfig::from_json(
            r#"{
                "debugLogging": true,
                "mixer": { "sessionPreset": "hd1280x720", "fps": 60 },
                "surface": { "gravity": "resizeAspectFill" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.log_directive(), "debug");
        assert_eq!(config.mixer.session_preset, Some(SessionPreset::Hd1280x720));
        assert_eq!(config.mixer.fps, Some(60.0));
        assert_eq!(config.surface.gravity, VideoGravity::ResizeAspectFill);
        assert_eq!(config.surface.swap_interval, 1);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(GlobalConfig::from_json("not json").is_err());
        assert!(GlobalConfig::from_json(r#"{ "mixer": { "fps": 0 } }"#).is_err());
    }
}
