//! Per-media-kind configuration holders owned by the mixer
//!
//! The video component is also the frame ingress point: the producer thread
//! calls [`VideoIoComponent::append_frame`] and the frame is handed to the
//! attached drawable, if one is still alive.

use crate::capture::{with_configuration, CaptureSession, Device, MediaKind, VideoSetting};
use crate::error::{MediaError, MediaResult};
use crate::orientation::VideoOrientation;
use crate::render::Drawable;
use livecast_core::Frame;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Default capture frame rate
pub const DEFAULT_FPS: f64 = 30.0;

/// Snapshot of the video properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProperties {
    pub fps: f64,
    pub orientation: VideoOrientation,
    pub continuous_autofocus: bool,
    pub continuous_exposure: bool,
}

impl Default for VideoProperties {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            orientation: VideoOrientation::default(),
            continuous_autofocus: false,
            continuous_exposure: false,
        }
    }
}

/// Frame ingress counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressStats {
    /// Frames handed to a live drawable
    pub frames_delivered: u64,
    /// Frames that arrived with no drawable attached
    pub frames_dropped: u64,
}

/// Video configuration, camera input and drawable slot
pub struct VideoIoComponent {
    properties: RwLock<VideoProperties>,
    camera: RwLock<Option<Device>>,
    drawable: RwLock<Option<Weak<dyn Drawable>>>,
    frames_delivered: AtomicU64,
    frames_dropped: AtomicU64,
}

impl VideoIoComponent {
    pub(crate) fn new() -> Self {
        Self {
            properties: RwLock::new(VideoProperties::default()),
            camera: RwLock::new(None),
            drawable: RwLock::new(None),
            frames_delivered: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
        }
    }

    pub fn properties(&self) -> VideoProperties {
        *self.properties.read()
    }

    pub fn fps(&self) -> f64 {
        self.properties.read().fps
    }

    pub fn orientation(&self) -> VideoOrientation {
        self.properties.read().orientation
    }

    pub fn continuous_autofocus(&self) -> bool {
        self.properties.read().continuous_autofocus
    }

    pub fn continuous_exposure(&self) -> bool {
        self.properties.read().continuous_exposure
    }

    pub(crate) fn set_fps(&self, session: &dyn CaptureSession, fps: f64) -> MediaResult<()> {
        session.apply_video_setting(VideoSetting::FrameRate(fps))?;
        self.properties.write().fps = fps;
        Ok(())
    }

    pub(crate) fn set_orientation(
        &self,
        session: &dyn CaptureSession,
        orientation: VideoOrientation,
    ) -> MediaResult<()> {
        session.apply_video_setting(VideoSetting::Orientation(orientation))?;
        self.properties.write().orientation = orientation;
        Ok(())
    }

    pub(crate) fn set_continuous_autofocus(
        &self,
        session: &dyn CaptureSession,
        enabled: bool,
    ) -> MediaResult<()> {
        session.apply_video_setting(VideoSetting::ContinuousAutofocus(enabled))?;
        self.properties.write().continuous_autofocus = enabled;
        Ok(())
    }

    pub(crate) fn set_continuous_exposure(
        &self,
        session: &dyn CaptureSession,
        enabled: bool,
    ) -> MediaResult<()> {
        session.apply_video_setting(VideoSetting::ContinuousExposure(enabled))?;
        self.properties.write().continuous_exposure = enabled;
        Ok(())
    }

    /// Currently attached camera
    pub fn camera(&self) -> Option<Device> {
        self.camera.read().clone()
    }

    /// Replace the camera input; the current properties are pushed to the new
    /// camera inside the same configuration transaction
    pub(crate) fn attach_camera(
        &self,
        session: &dyn CaptureSession,
        device: Option<&Device>,
    ) -> MediaResult<()> {
        let properties = self.properties();
        swap_input(session, &self.camera, device, MediaKind::Video, |session| {
            session.apply_video_setting(VideoSetting::FrameRate(properties.fps))?;
            session.apply_video_setting(VideoSetting::Orientation(properties.orientation))?;
            session.apply_video_setting(VideoSetting::ContinuousAutofocus(
                properties.continuous_autofocus,
            ))?;
            session.apply_video_setting(VideoSetting::ContinuousExposure(
                properties.continuous_exposure,
            ))
        })
    }

    /// Attached drawable, `None` when unset or already destroyed
    pub fn drawable(&self) -> Option<Arc<dyn Drawable>> {
        self.drawable.read().as_ref().and_then(Weak::upgrade)
    }

    /// Store a new drawable and return whatever was there before
    ///
    /// This only swaps the slot. Eviction of the previous drawable is the
    /// stream's job, see `Stream::set_drawable`.
    pub fn replace_drawable(
        &self,
        drawable: Option<Weak<dyn Drawable>>,
    ) -> Option<Weak<dyn Drawable>> {
        std::mem::replace(&mut *self.drawable.write(), drawable)
    }

    /// Hand a captured frame to the attached drawable
    ///
    /// Called on the producer thread. Never blocks on rendering.
    pub fn append_frame(&self, frame: Arc<Frame>) {
        match self.drawable() {
            Some(drawable) => {
                self.frames_delivered.fetch_add(1, Ordering::Relaxed);
                drawable.draw_image(frame);
            }
            None => {
                self.frames_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn ingress_stats(&self) -> IngressStats {
        IngressStats {
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Audio input holder
pub struct AudioIoComponent {
    microphone: RwLock<Option<Device>>,
}

impl AudioIoComponent {
    pub(crate) fn new() -> Self {
        Self {
            microphone: RwLock::new(None),
        }
    }

    /// Currently attached microphone
    pub fn microphone(&self) -> Option<Device> {
        self.microphone.read().clone()
    }

    pub(crate) fn attach_audio(
        &self,
        session: &dyn CaptureSession,
        device: Option<&Device>,
    ) -> MediaResult<()> {
        swap_input(session, &self.microphone, device, MediaKind::Audio, |_| Ok(()))
    }
}

/// Replace the input held in `slot` within one configuration transaction
fn swap_input(
    session: &dyn CaptureSession,
    slot: &RwLock<Option<Device>>,
    device: Option<&Device>,
    kind: MediaKind,
    after_add: impl FnOnce(&dyn CaptureSession) -> MediaResult<()>,
) -> MediaResult<()> {
    if let Some(device) = device {
        if !device.has_media_kind(kind) {
            return Err(MediaError::InvalidConfiguration {
                message: format!("device {} does not provide {:?}", device.id, kind),
            });
        }
    }

    let mut slot = slot.write();
    with_configuration(session, |session| {
        if let Some(previous) = slot.take() {
            debug!("Removing {:?} input {}", kind, previous.id);
            session.remove_input(&previous.id);
        }
        if let Some(device) = device {
            debug!("Adding {:?} input {}", kind, device.id);
            session.add_input(device)?;
            *slot = Some(device.clone());
            after_add(session)?;
        }
        Ok(())
    })
}
