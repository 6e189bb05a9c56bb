//! Mixer configuration surface
//!
//! Settings arrive as a JSON object. Recognized keys are listed in
//! [`SUPPORTED_SETTINGS_KEYS`]; anything else is ignored so hosts can pass a
//! larger configuration document through unchanged.

use crate::capture::SessionPreset;
use crate::error::{MediaError, MediaResult};
use crate::orientation::VideoOrientation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys understood by [`MixerSettings`]
pub const SUPPORTED_SETTINGS_KEYS: [&str; 5] = [
    "fps",
    "sessionPreset",
    "orientation",
    "continuousAutofocus",
    "continuousExposure",
];

/// Partial mixer configuration; `None` leaves a property untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_preset: Option<SessionPreset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<VideoOrientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous_autofocus: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous_exposure: Option<bool>,
}

impl MixerSettings {
    /// Parse and validate a settings object
    pub fn from_value(value: &Value) -> MediaResult<Self> {
        if !value.is_object() {
            return Err(MediaError::InvalidConfiguration {
                message: format!("mixer settings must be an object, got {value}"),
            });
        }
        let settings: MixerSettings =
            serde_json::from_value(value.clone()).map_err(|e| MediaError::InvalidConfiguration {
                message: format!("invalid mixer settings: {e}"),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> MediaResult<()> {
        if let Some(fps) = self.fps {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(MediaError::InvalidConfiguration {
                    message: format!("fps must be a positive number, got {fps}"),
                });
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `overrides` on top of these settings
    pub fn merged(&self, overrides: &MixerSettings) -> MixerSettings {
        MixerSettings {
            fps: overrides.fps.or(self.fps),
            session_preset: overrides.session_preset.or(self.session_preset),
            orientation: overrides.orientation.or(self.orientation),
            continuous_autofocus: overrides.continuous_autofocus.or(self.continuous_autofocus),
            continuous_exposure: overrides.continuous_exposure.or(self.continuous_exposure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_recognized_keys() {
        let settings = MixerSettings::from_value(&json!({
            "fps": 60.0,
            "sessionPreset": "hd1280x720",
            "orientation": "landscapeRight",
            "continuousAutofocus": true,
            "bitrate": 2_000_000,
        }))
        .unwrap();

        assert_eq!(settings.fps, Some(60.0));
        assert_eq!(settings.session_preset, Some(SessionPreset::Hd1280x720));
        assert_eq!(settings.orientation, Some(VideoOrientation::LandscapeRight));
        assert_eq!(settings.continuous_autofocus, Some(true));
        assert_eq!(settings.continuous_exposure, None);
    }

    #[test]
    fn test_reject_invalid_values() {
        assert!(MixerSettings::from_value(&json!({ "fps": 0 })).is_err());
        assert!(MixerSettings::from_value(&json!({ "fps": -24.0 })).is_err());
        assert!(MixerSettings::from_value(&json!({ "sessionPreset": "ultra" })).is_err());
        assert!(MixerSettings::from_value(&json!({ "continuousExposure": "yes" })).is_err());
        assert!(MixerSettings::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_merged_prefers_overrides() {
        let base = MixerSettings {
            fps: Some(30.0),
            continuous_exposure: Some(true),
            ..Default::default()
        };
        let merged = base.merged(&MixerSettings {
            fps: Some(60.0),
            ..Default::default()
        });
        assert_eq!(merged.fps, Some(60.0));
        assert_eq!(merged.continuous_exposure, Some(true));
        assert_eq!(merged.orientation, None);
    }

    #[test]
    fn test_empty_object_is_empty_settings() {
        let settings = MixerSettings::from_value(&json!({ "unrelated": 1 })).unwrap();
        assert!(settings.is_empty());
        assert_eq!(serde_json::to_value(settings).unwrap(), json!({}));
    }
}
