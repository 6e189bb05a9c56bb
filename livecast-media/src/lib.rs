//! # livecast media
//!
//! Capture orchestration and on-screen presentation for livecast.
//! This crate owns the [`Mixer`] that drives a platform capture session, the
//! [`Stream`] that ties a mixer to a drawable, and the [`RenderSurface`] that
//! composites the newest frame into a GPU context.

#![warn(clippy::all)]

pub mod capture;
pub mod error;
pub mod io;
pub mod mixer;
pub mod orientation;
pub mod render;
pub mod settings;
pub mod stream;

// Re-export main types
pub use capture::{
    CapturePlatform, CaptureSession, Device, DeviceId, DevicePosition, MediaKind, SessionPreset,
    TestPatternSource, VideoSetting, VirtualCapturePlatform, VirtualCaptureSession,
};
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use io::{AudioIoComponent, IngressStats, VideoIoComponent, VideoProperties, DEFAULT_FPS};
pub use mixer::{Mixer, DEFAULT_SESSION_PRESET};
pub use orientation::{
    DeviceOrientation, ObserverToken, OrientationCenter, OrientationObserver, OrientationSource,
    VideoOrientation,
};
pub use render::{
    BlendFactor, Capability, ChannelScheduler, DrawCall, Drawable, GpuContext, RedrawScheduler,
    RenderSurface, SoftwareContext, SoftwareState, SurfaceConfig, SurfaceEvent, SurfaceId,
    SurfaceStats,
};
pub use settings::{MixerSettings, SUPPORTED_SETTINGS_KEYS};
pub use stream::{Stream, StreamId};

/// Pixel format frames are delivered in
pub const DEFAULT_PIXEL_FORMAT: livecast_core::PixelFormat = livecast_core::PixelFormat::Bgra32;
