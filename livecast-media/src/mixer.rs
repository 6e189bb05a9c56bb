//! Capture orchestration
//!
//! The [`Mixer`] owns the capture session, the per-media-kind io components
//! and the optional subscription to device orientation changes. It performs
//! no validation of its own: whatever the platform session rejects is
//! returned to the caller unchanged.

use crate::capture::{
    self, with_configuration, CapturePlatform, CaptureSession, Device, DevicePosition, MediaKind,
    SessionPreset,
};
use crate::error::{MediaError, MediaResult};
use crate::io::{AudioIoComponent, VideoIoComponent};
use crate::orientation::{DeviceOrientation, ObserverToken, OrientationSource, VideoOrientation};
use crate::settings::MixerSettings;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, info};

/// Preset used for the lazily created session
pub const DEFAULT_SESSION_PRESET: SessionPreset = SessionPreset::Medium;

/// Capture session orchestrator
pub struct Mixer {
    weak_self: Weak<Mixer>,
    platform: Arc<dyn CapturePlatform>,
    session: OnceLock<Arc<dyn CaptureSession>>,
    session_preset: RwLock<SessionPreset>,
    video_io: VideoIoComponent,
    audio_io: AudioIoComponent,
    orientation_source: Option<Arc<dyn OrientationSource>>,
    orientation_observer: Mutex<Option<ObserverToken>>,
}

impl Mixer {
    /// Mixer without orientation tracking
    pub fn new(platform: Arc<dyn CapturePlatform>) -> Arc<Self> {
        Self::build(platform, None)
    }

    /// Mixer that can follow `source` once orientation sync is enabled
    pub fn with_orientation_source(
        platform: Arc<dyn CapturePlatform>,
        source: Arc<dyn OrientationSource>,
    ) -> Arc<Self> {
        Self::build(platform, Some(source))
    }

    fn build(
        platform: Arc<dyn CapturePlatform>,
        orientation_source: Option<Arc<dyn OrientationSource>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            platform,
            session: OnceLock::new(),
            session_preset: RwLock::new(DEFAULT_SESSION_PRESET),
            video_io: VideoIoComponent::new(),
            audio_io: AudioIoComponent::new(),
            orientation_source,
            orientation_observer: Mutex::new(None),
        })
    }

    /// The capture session, created on first use
    pub fn session(&self) -> Arc<dyn CaptureSession> {
        self.session
            .get_or_init(|| {
                info!(
                    "Creating capture session with preset {}",
                    DEFAULT_SESSION_PRESET
                );
                self.platform.new_session(DEFAULT_SESSION_PRESET)
            })
            .clone()
    }

    pub fn video_io(&self) -> &VideoIoComponent {
        &self.video_io
    }

    pub fn audio_io(&self) -> &AudioIoComponent {
        &self.audio_io
    }

    /// Last requested preset
    ///
    /// Read `session().session_preset()` for what the platform actually
    /// accepted.
    pub fn session_preset(&self) -> SessionPreset {
        *self.session_preset.read()
    }

    /// Change the session preset in one configuration transaction
    ///
    /// Setting the current value is a no-op.
    pub fn set_session_preset(&self, preset: SessionPreset) -> MediaResult<()> {
        {
            let mut current = self.session_preset.write();
            if *current == preset {
                return Ok(());
            }
            *current = preset;
        }
        debug!("Setting session preset to {}", preset);
        let session = self.session();
        with_configuration(session.as_ref(), |session| session.set_session_preset(preset))
    }

    pub fn fps(&self) -> f64 {
        self.video_io.fps()
    }

    pub fn set_fps(&self, fps: f64) -> MediaResult<()> {
        self.video_io.set_fps(self.session().as_ref(), fps)
    }

    pub fn orientation(&self) -> VideoOrientation {
        self.video_io.orientation()
    }

    pub fn set_orientation(&self, orientation: VideoOrientation) -> MediaResult<()> {
        self.video_io
            .set_orientation(self.session().as_ref(), orientation)
    }

    pub fn continuous_autofocus(&self) -> bool {
        self.video_io.continuous_autofocus()
    }

    pub fn set_continuous_autofocus(&self, enabled: bool) -> MediaResult<()> {
        self.video_io
            .set_continuous_autofocus(self.session().as_ref(), enabled)
    }

    pub fn continuous_exposure(&self) -> bool {
        self.video_io.continuous_exposure()
    }

    pub fn set_continuous_exposure(&self, enabled: bool) -> MediaResult<()> {
        self.video_io
            .set_continuous_exposure(self.session().as_ref(), enabled)
    }

    /// Start capture
    ///
    /// With orientation sync enabled the capture orientation is then brought
    /// in line with the device. A rejected orientation is returned but the
    /// session keeps running.
    pub fn start_running(&self) -> MediaResult<()> {
        self.session().start_running()?;
        info!("Capture session started");
        if self.sync_orientation() {
            if let Some(source) = &self.orientation_source {
                let physical = source.current_orientation();
                if let Some(orientation) = physical.video_orientation() {
                    self.set_orientation(orientation)?;
                }
            }
        }
        Ok(())
    }

    /// Stop capture; the last displayed frame stays on screen
    pub fn stop_running(&self) {
        if let Some(session) = self.session.get() {
            session.stop_running();
            info!("Capture session stopped");
        }
    }

    /// Live session state; does not create the session
    pub fn is_running(&self) -> bool {
        self.session
            .get()
            .map_or(false, |session| session.is_running())
    }

    pub fn sync_orientation(&self) -> bool {
        self.orientation_observer.lock().is_some()
    }

    /// Follow device orientation changes
    ///
    /// Needs an orientation source. Setting the current value is a no-op.
    pub fn set_sync_orientation(&self, enabled: bool) -> MediaResult<()> {
        let Some(source) = &self.orientation_source else {
            if enabled {
                return Err(MediaError::UnsupportedPlatform {
                    feature: "orientation sync".to_string(),
                });
            }
            return Ok(());
        };

        let mut token = self.orientation_observer.lock();
        match (enabled, *token) {
            (true, None) => {
                let mixer = self.weak_self.clone();
                *token = Some(source.add_observer(Box::new(move |orientation| {
                    if let Some(mixer) = mixer.upgrade() {
                        mixer.on_orientation_changed(orientation);
                    }
                })));
                info!("Orientation sync enabled");
            }
            (false, Some(registered)) => {
                source.remove_observer(registered);
                *token = None;
                info!("Orientation sync disabled");
            }
            _ => {}
        }
        Ok(())
    }

    /// Map a physical orientation change onto the capture orientation
    ///
    /// Orientations with no capture equivalent keep the current value.
    pub fn on_orientation_changed(&self, orientation: DeviceOrientation) {
        let Some(mapped) = orientation.video_orientation() else {
            debug!("Ignoring device orientation {:?}", orientation);
            return;
        };
        if let Err(e) = self.set_orientation(mapped) {
            debug!("Failed to follow device orientation {:?}: {}", orientation, e);
        }
    }

    /// Devices currently offered by the platform
    pub fn devices(&self) -> Vec<Device> {
        self.platform.devices()
    }

    /// First video device mounted at `position`
    pub fn device_with_position(&self, position: DevicePosition) -> Option<Device> {
        capture::device_with_position(&self.devices(), position)
    }

    /// First device of `media_kind` named `localized_name`
    pub fn device_with_localized_name(
        &self,
        localized_name: &str,
        media_kind: MediaKind,
    ) -> Option<Device> {
        capture::device_with_localized_name(&self.devices(), localized_name, media_kind)
    }

    /// Replace the camera input; `None` removes it
    pub fn attach_camera(&self, device: Option<&Device>) -> MediaResult<()> {
        self.video_io.attach_camera(self.session().as_ref(), device)?;
        if let Some(device) = device {
            info!("Camera {} attached", device.localized_name);
        }
        Ok(())
    }

    /// Replace the microphone input; `None` removes it
    pub fn attach_audio(&self, device: Option<&Device>) -> MediaResult<()> {
        self.audio_io.attach_audio(self.session().as_ref(), device)?;
        if let Some(device) = device {
            info!("Microphone {} attached", device.localized_name);
        }
        Ok(())
    }

    /// Apply a JSON settings object
    ///
    /// The whole object is validated before anything is applied.
    pub fn apply_settings(&self, value: &Value) -> MediaResult<()> {
        let settings = MixerSettings::from_value(value)?;
        self.apply(&settings)
    }

    /// Apply typed settings in a fixed order, stopping at the first failure
    pub fn apply(&self, settings: &MixerSettings) -> MediaResult<()> {
        settings.validate()?;
        if let Some(preset) = settings.session_preset {
            self.set_session_preset(preset)?;
        }
        if let Some(fps) = settings.fps {
            self.set_fps(fps)?;
        }
        if let Some(orientation) = settings.orientation {
            self.set_orientation(orientation)?;
        }
        if let Some(enabled) = settings.continuous_autofocus {
            self.set_continuous_autofocus(enabled)?;
        }
        if let Some(enabled) = settings.continuous_exposure {
            self.set_continuous_exposure(enabled)?;
        }
        Ok(())
    }

    /// Current values of every setting
    pub fn settings(&self) -> MixerSettings {
        let video = self.video_io.properties();
        MixerSettings {
            fps: Some(video.fps),
            session_preset: Some(self.session_preset()),
            orientation: Some(video.orientation),
            continuous_autofocus: Some(video.continuous_autofocus),
            continuous_exposure: Some(video.continuous_exposure),
        }
    }
}

impl Drop for Mixer {
    fn drop(&mut self) {
        if let (Some(source), Some(token)) =
            (&self.orientation_source, self.orientation_observer.get_mut().take())
        {
            source.remove_observer(token);
            debug!("Removed orientation observer on drop");
        }
    }
}
