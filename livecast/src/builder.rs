//! Stream construction

use crate::{Livecast, LivecastError};
use livecast_media::{
    DevicePosition, MediaKind, Mixer, MixerSettings, SessionPreset, Stream, VideoOrientation,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
enum CameraSelection {
    Position(DevicePosition),
    Named(String),
}

/// Fluent builder for a configured stream
#[derive(Debug)]
pub struct StreamBuilder {
    livecast: Livecast,
    camera: Option<CameraSelection>,
    microphone: bool,
    settings: MixerSettings,
    sync_orientation: bool,
}

impl StreamBuilder {
    pub(crate) fn new(livecast: &Livecast) -> Self {
        Self {
            livecast: livecast.clone(),
            camera: None,
            microphone: false,
            settings: MixerSettings::default(),
            sync_orientation: false,
        }
    }

    /// Use the camera mounted at `position`
    pub fn camera(mut self, position: DevicePosition) -> Self {
        self.camera = Some(CameraSelection::Position(position));
        self
    }

    /// Use the camera with this display name
    pub fn camera_named(mut self, name: &str) -> Self {
        self.camera = Some(CameraSelection::Named(name.to_string()));
        self
    }

    /// Attach the first available microphone
    pub fn microphone(mut self) -> Self {
        self.microphone = true;
        self
    }

    /// Set the capture frame rate
    pub fn fps(mut self, fps: f64) -> Self {
        self.settings.fps = Some(fps);
        self
    }

    /// Set the session quality tier
    pub fn session_preset(mut self, preset: SessionPreset) -> Self {
        self.settings.session_preset = Some(preset);
        self
    }

    /// Set a fixed capture orientation
    pub fn orientation(mut self, orientation: VideoOrientation) -> Self {
        self.settings.orientation = Some(orientation);
        self
    }

    /// Layer `settings` over what has been set so far
    pub fn settings(mut self, settings: MixerSettings) -> Self {
        self.settings = self.settings.merged(&settings);
        self
    }

    /// Follow device orientation changes
    pub fn sync_orientation(mut self) -> Self {
        self.sync_orientation = true;
        self
    }

    /// Build the stream without starting capture
    pub fn build(self) -> Result<Arc<Stream>, LivecastError> {
        let platform = self.livecast.platform();
        let mixer = match self.livecast.orientation_source() {
            Some(source) => Mixer::with_orientation_source(platform, source),
            None => Mixer::new(platform),
        };

        let settings = self.livecast.config().mixer.merged(&self.settings);
        mixer.apply(&settings)?;

        if let Some(selection) = &self.camera {
            let camera = match selection {
                CameraSelection::Position(position) => mixer.device_with_position(*position),
                CameraSelection::Named(name) => {
                    mixer.device_with_localized_name(name, MediaKind::Video)
                }
            }
            .ok_or_else(|| LivecastError::DeviceNotFound {
                device: format!("{:?}", selection),
            })?;
            mixer.attach_camera(Some(&camera))?;
        }

        if self.microphone {
            let microphone = mixer
                .devices()
                .into_iter()
                .find(|device| device.has_media_kind(MediaKind::Audio))
                .ok_or_else(|| LivecastError::DeviceNotFound {
                    device: "microphone".to_string(),
                })?;
            mixer.attach_audio(Some(&microphone))?;
        }

        if self.sync_orientation {
            mixer.set_sync_orientation(true)?;
        }

        let stream = Stream::new(mixer);
        info!("Built {}", stream.id());
        Ok(stream)
    }

    /// Build the stream and start capture
    pub fn start(self) -> Result<Arc<Stream>, LivecastError> {
        let stream = self.build()?;
        stream.mixer().start_running()?;
        Ok(stream)
    }
}
