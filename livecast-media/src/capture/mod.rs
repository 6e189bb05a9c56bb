//! Capture platform capabilities
//!
//! The mixer never talks to camera hardware directly. A host supplies a
//! [`CapturePlatform`] that enumerates devices and creates sessions; the
//! in-process [`virtual_platform`] implementation backs tests and demos.

pub mod virtual_platform;

use crate::error::{MediaError, MediaResult};
use crate::orientation::VideoOrientation;
use livecast_core::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use virtual_platform::{TestPatternSource, VirtualCapturePlatform, VirtualCaptureSession};

/// Media carried by a capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Physical mounting of a capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DevicePosition {
    Front,
    Back,
    Unspecified,
}

/// Stable platform identifier of a device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capture device information, as enumerated by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub localized_name: String,
    pub media_kind: MediaKind,
    pub position: DevicePosition,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        localized_name: impl Into<String>,
        media_kind: MediaKind,
        position: DevicePosition,
    ) -> Self {
        Self {
            id: DeviceId(id.into()),
            localized_name: localized_name.into(),
            media_kind,
            position,
        }
    }

    pub fn has_media_kind(&self, kind: MediaKind) -> bool {
        self.media_kind == kind
    }
}

/// Session quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPreset {
    #[serde(rename = "photo")]
    Photo,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "cif352x288")]
    Cif352x288,
    #[serde(rename = "vga640x480")]
    Vga640x480,
    #[serde(rename = "hd1280x720")]
    Hd1280x720,
    #[serde(rename = "hd1920x1080")]
    Hd1920x1080,
    #[serde(rename = "iframe960x540")]
    Iframe960x540,
    #[serde(rename = "iframe1280x720")]
    Iframe1280x720,
    #[serde(rename = "inputPriority")]
    InputPriority,
}

impl SessionPreset {
    pub const ALL: [SessionPreset; 11] = [
        SessionPreset::Photo,
        SessionPreset::High,
        SessionPreset::Medium,
        SessionPreset::Low,
        SessionPreset::Cif352x288,
        SessionPreset::Vga640x480,
        SessionPreset::Hd1280x720,
        SessionPreset::Hd1920x1080,
        SessionPreset::Iframe960x540,
        SessionPreset::Iframe1280x720,
        SessionPreset::InputPriority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPreset::Photo => "photo",
            SessionPreset::High => "high",
            SessionPreset::Medium => "medium",
            SessionPreset::Low => "low",
            SessionPreset::Cif352x288 => "cif352x288",
            SessionPreset::Vga640x480 => "vga640x480",
            SessionPreset::Hd1280x720 => "hd1280x720",
            SessionPreset::Hd1920x1080 => "hd1920x1080",
            SessionPreset::Iframe960x540 => "iframe960x540",
            SessionPreset::Iframe1280x720 => "iframe1280x720",
            SessionPreset::InputPriority => "inputPriority",
        }
    }

    /// Output size implied by the preset, `None` when it depends on the device
    pub fn nominal_size(&self) -> Option<Size> {
        match self {
            SessionPreset::Cif352x288 => Some(Size::new(352.0, 288.0)),
            SessionPreset::Vga640x480 => Some(Size::new(640.0, 480.0)),
            SessionPreset::Hd1280x720 | SessionPreset::Iframe1280x720 => {
                Some(Size::new(1280.0, 720.0))
            }
            SessionPreset::Hd1920x1080 => Some(Size::new(1920.0, 1080.0)),
            SessionPreset::Iframe960x540 => Some(Size::new(960.0, 540.0)),
            _ => None,
        }
    }
}

impl Default for SessionPreset {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for SessionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionPreset {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionPreset::ALL
            .iter()
            .copied()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| MediaError::InvalidConfiguration {
                message: format!("unknown session preset '{s}'"),
            })
    }
}

/// A video property pushed down to the session's camera input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoSetting {
    FrameRate(f64),
    Orientation(VideoOrientation),
    ContinuousAutofocus(bool),
    ContinuousExposure(bool),
}

impl VideoSetting {
    /// Settings-surface key for this property
    pub fn key(&self) -> &'static str {
        match self {
            VideoSetting::FrameRate(_) => "fps",
            VideoSetting::Orientation(_) => "orientation",
            VideoSetting::ContinuousAutofocus(_) => "continuousAutofocus",
            VideoSetting::ContinuousExposure(_) => "continuousExposure",
        }
    }
}

/// Platform-managed aggregate of device inputs and outputs
///
/// Implementations make each configuration transaction atomic: nothing
/// between `begin_configuration` and `commit_configuration` is observable by
/// the running pipeline until the commit.
pub trait CaptureSession: Send + Sync {
    fn begin_configuration(&self);
    fn commit_configuration(&self);

    fn session_preset(&self) -> SessionPreset;
    fn set_session_preset(&self, preset: SessionPreset) -> MediaResult<()>;

    fn add_input(&self, device: &Device) -> MediaResult<()>;
    fn remove_input(&self, device: &DeviceId);
    fn inputs(&self) -> Vec<Device>;

    /// Push a property to the attached camera; rejections come back verbatim
    fn apply_video_setting(&self, setting: VideoSetting) -> MediaResult<()>;

    fn start_running(&self) -> MediaResult<()>;
    fn stop_running(&self);
    fn is_running(&self) -> bool;
}

/// Device enumeration and session construction
pub trait CapturePlatform: Send + Sync {
    /// All devices currently known to the platform
    fn devices(&self) -> Vec<Device>;

    /// A fresh session already configured with `preset`
    fn new_session(&self, preset: SessionPreset) -> Arc<dyn CaptureSession>;
}

/// Run `f` inside one begin/commit transaction
///
/// The transaction is committed even when `f` fails, leaving the session in
/// whatever state the platform reached.
pub fn with_configuration<T>(
    session: &dyn CaptureSession,
    f: impl FnOnce(&dyn CaptureSession) -> MediaResult<T>,
) -> MediaResult<T> {
    session.begin_configuration();
    let result = f(session);
    session.commit_configuration();
    result
}

/// First video device mounted at `position`
pub fn device_with_position(devices: &[Device], position: DevicePosition) -> Option<Device> {
    devices
        .iter()
        .find(|device| device.has_media_kind(MediaKind::Video) && device.position == position)
        .cloned()
}

/// First device of `media_kind` whose display name is `localized_name`
pub fn device_with_localized_name(
    devices: &[Device],
    localized_name: &str,
    media_kind: MediaKind,
) -> Option<Device> {
    devices
        .iter()
        .find(|device| device.has_media_kind(media_kind) && device.localized_name == localized_name)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<Device> {
        vec![
            Device::new("mic-0", "Built-in Microphone", MediaKind::Audio, DevicePosition::Front),
            Device::new("cam-1", "Back Camera", MediaKind::Video, DevicePosition::Back),
            Device::new("cam-0", "Front Camera", MediaKind::Video, DevicePosition::Front),
            Device::new("cam-2", "Second Front", MediaKind::Video, DevicePosition::Front),
        ]
    }

    #[test]
    fn test_device_with_position_skips_audio() {
        let found = device_with_position(&devices(), DevicePosition::Front).unwrap();
        assert_eq!(found.id, DeviceId("cam-0".to_string()));

        assert!(device_with_position(&devices(), DevicePosition::Unspecified).is_none());
    }

    #[test]
    fn test_device_with_localized_name() {
        let found =
            device_with_localized_name(&devices(), "Built-in Microphone", MediaKind::Audio);
        assert_eq!(found.map(|d| d.id.0), Some("mic-0".to_string()));

        assert!(
            device_with_localized_name(&devices(), "Built-in Microphone", MediaKind::Video)
                .is_none()
        );
        assert!(device_with_localized_name(&[], "Back Camera", MediaKind::Video).is_none());
    }

    #[test]
    fn test_session_preset_names() {
        for preset in SessionPreset::ALL {
            assert_eq!(preset.as_str().parse::<SessionPreset>().unwrap(), preset);
            assert_eq!(
                serde_json::to_string(&preset).unwrap(),
                format!("\"{}\"", preset.as_str())
            );
        }
        assert_eq!(SessionPreset::default(), SessionPreset::Medium);
        assert!("ultra".parse::<SessionPreset>().is_err());
    }
}
