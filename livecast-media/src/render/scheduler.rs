//! Redraw scheduling onto the surface's owning thread

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Identifier of a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Host hook that wakes the thread owning a surface
///
/// `request_redraw` is called from producer threads and must return
/// immediately. The host answers by calling `RenderSurface::display` on the
/// owning thread.
pub trait RedrawScheduler: Send + Sync {
    fn request_redraw(&self, surface: SurfaceId);
}

/// Scheduler that posts redraw requests onto an unbounded channel
///
/// The receiving half belongs to the host's UI loop.
#[derive(Debug, Clone)]
pub struct ChannelScheduler {
    tx: mpsc::UnboundedSender<SurfaceId>,
}

impl ChannelScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RedrawScheduler for ChannelScheduler {
    fn request_redraw(&self, surface: SurfaceId) {
        if self.tx.send(surface).is_err() {
            debug!("Redraw request for {} dropped: host loop closed", surface);
        }
    }
}
