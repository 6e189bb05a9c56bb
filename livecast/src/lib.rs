//! # livecast - Live Capture Presentation
//!
//! livecast connects a camera capture session to an on-screen render target.
//! A [`Stream`] owns a [`Mixer`] that drives the platform capture session;
//! a [`RenderSurface`] attached to the stream receives every captured frame,
//! keeps only the newest one and composites it, fitted by its
//! [`VideoGravity`], whenever the host's UI thread services a redraw.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livecast::{ChannelScheduler, DevicePosition, Livecast, Rect, SoftwareContext};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), livecast::LivecastError> {
//! let livecast = Livecast::init()?;
//!
//! // Open the front camera and start capturing
//! let stream = livecast.stream().camera(DevicePosition::Front).fps(30.0).start()?;
//!
//! // Present it on a surface owned by this thread
//! let (scheduler, mut redraws) = ChannelScheduler::new();
//! let surface = livecast.surface(Rect::new(0.0, 0.0, 640.0, 360.0), Arc::new(scheduler));
//! surface.prepare_context(Box::new(SoftwareContext::new(640, 360)))?;
//! surface.attach_stream(Some(&stream));
//!
//! while redraws.blocking_recv().is_some() {
//!     surface.display();
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use livecast_core::{
    CoreError, FitRects, Frame, PixelBuffer, PixelFormat, Point, Rect, Size, VideoGravity,
};

pub use livecast_media::{
    CapturePlatform, CaptureSession, ChannelScheduler, Device, DeviceOrientation, DevicePosition,
    Drawable, GpuContext, MediaError, MediaKind, Mixer, MixerSettings, OrientationCenter,
    OrientationSource, RedrawScheduler, RenderSurface, SessionPreset, SoftwareContext, Stream,
    StreamId, SurfaceConfig, SurfaceEvent, SurfaceStats, TestPatternSource, VideoOrientation,
    VirtualCapturePlatform,
};

// Public API modules
pub mod builder;
pub mod config;
pub mod error;
pub mod logging;

// Re-export main API types
pub use builder::StreamBuilder;
pub use config::GlobalConfig;
pub use error::LivecastError;

use std::fmt;
use std::sync::Arc;

/// Main entry point for livecast
#[derive(Clone)]
pub struct Livecast {
    inner: Arc<LivecastInner>,
}

struct LivecastInner {
    config: GlobalConfig,
    platform: Arc<dyn CapturePlatform>,
    orientation_source: Option<Arc<dyn OrientationSource>>,
}

impl Livecast {
    /// Initialize with default settings on the in-memory capture platform
    pub fn init() -> Result<Self, LivecastError> {
        Self::init_with(GlobalConfig::default())
    }

    /// Initialize with custom global configuration on the in-memory platform
    pub fn init_with(config: GlobalConfig) -> Result<Self, LivecastError> {
        Self::with_platform(config, Arc::new(VirtualCapturePlatform::new()))
    }

    /// Initialize on a host-provided capture platform
    pub fn with_platform(
        config: GlobalConfig,
        platform: Arc<dyn CapturePlatform>,
    ) -> Result<Self, LivecastError> {
        config.mixer.validate()?;
        if platform.devices().is_empty() {
            tracing::warn!("Capture platform reports no devices");
        }
        Ok(Self {
            inner: Arc::new(LivecastInner {
                config,
                platform,
                orientation_source: None,
            }),
        })
    }

    /// Use `source` for streams built with orientation sync
    pub fn with_orientation_source(self, source: Arc<dyn OrientationSource>) -> Self {
        Self {
            inner: Arc::new(LivecastInner {
                config: self.inner.config.clone(),
                platform: Arc::clone(&self.inner.platform),
                orientation_source: Some(source),
            }),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &GlobalConfig {
        &self.inner.config
    }

    /// Capture platform streams are built on
    pub fn platform(&self) -> Arc<dyn CapturePlatform> {
        Arc::clone(&self.inner.platform)
    }

    /// Orientation source handed to new mixers, if any
    pub fn orientation_source(&self) -> Option<Arc<dyn OrientationSource>> {
        self.inner.orientation_source.clone()
    }

    /// Start building a stream
    pub fn stream(&self) -> StreamBuilder {
        StreamBuilder::new(self)
    }

    /// Create a surface using the configured surface defaults
    pub fn surface(
        &self,
        bounds: Rect,
        scheduler: Arc<dyn RedrawScheduler>,
    ) -> Arc<RenderSurface> {
        RenderSurface::new(bounds, self.inner.config.surface, scheduler)
    }
}

impl fmt::Debug for Livecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Livecast")
            .field("config", &self.inner.config)
            .field("orientation_sync", &self.inner.orientation_source.is_some())
            .finish()
    }
}
