//! Frame presentation
//!
//! A [`Drawable`] is anything a stream can hand frames to. [`RenderSurface`]
//! is the GPU-backed implementation: it keeps the latest frame, asks the host
//! for a redraw through a [`RedrawScheduler`], and composites on the thread
//! that owns its [`GpuContext`].

pub mod context;
pub mod scheduler;
pub mod software;
pub mod surface;

use crate::error::MediaResult;
use crate::stream::StreamId;
use livecast_core::{Frame, PixelBuffer};
use std::sync::Arc;

pub use context::{BlendFactor, Capability, GpuContext};
pub use scheduler::{ChannelScheduler, RedrawScheduler, SurfaceId};
pub use software::{DrawCall, SoftwareContext, SoftwareState};
pub use surface::{RenderSurface, SurfaceConfig, SurfaceEvent, SurfaceStats};

/// Render target capability consumed by streams
pub trait Drawable: Send + Sync {
    /// Accept a new frame for display; must not block the producer thread
    fn draw_image(&self, frame: Arc<Frame>);

    /// Composite `frame` into `buffer` synchronously, off the on-screen path
    fn render(&self, frame: &Frame, buffer: &mut PixelBuffer) -> MediaResult<()>;

    /// `stream` replaced this drawable with another one
    fn stream_detached(&self, stream: StreamId);
}
