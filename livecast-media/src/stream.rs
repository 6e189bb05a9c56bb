//! Live stream: a mixer plus at most one drawable

use crate::mixer::Mixer;
use crate::render::Drawable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

/// Identifier of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(Uuid);

impl StreamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// A live session owning one mixer
///
/// The drawable slot lives in the mixer's video component and is non-owning,
/// so a dropped surface simply stops receiving frames.
pub struct Stream {
    id: StreamId,
    mixer: Arc<Mixer>,
}

impl Stream {
    pub fn new(mixer: Arc<Mixer>) -> Arc<Self> {
        let stream = Arc::new(Self {
            id: StreamId::new(),
            mixer,
        });
        debug!("Created {}", stream.id);
        stream
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn mixer(&self) -> &Arc<Mixer> {
        &self.mixer
    }

    /// Current drawable, if it is still alive
    pub fn drawable(&self) -> Option<Arc<dyn Drawable>> {
        self.mixer.video_io().drawable()
    }

    /// Point the stream at a new drawable
    ///
    /// When another live drawable held the slot it is told, through
    /// [`Drawable::stream_detached`], that it no longer owns this stream.
    /// Clearing the slot with `None` notifies nobody.
    pub fn set_drawable(&self, drawable: Option<Weak<dyn Drawable>>) {
        let replacing = drawable.is_some();
        let previous = self.mixer.video_io().replace_drawable(drawable.clone());
        let Some(previous) = previous else {
            return;
        };

        let unchanged = drawable.map_or(false, |next| same_drawable(&previous, &next));
        if replacing && !unchanged {
            if let Some(previous) = previous.upgrade() {
                debug!("{} switching drawable", self.id);
                previous.stream_detached(self.id);
            }
        }
    }

    /// Whether `drawable` is the one currently attached
    pub fn is_drawable(&self, drawable: &Weak<dyn Drawable>) -> bool {
        let slot = self.mixer.video_io().drawable();
        slot.map_or(false, |current| {
            std::ptr::addr_eq(Arc::as_ptr(&current), drawable.as_ptr())
        })
    }
}

fn same_drawable(a: &Weak<dyn Drawable>, b: &Weak<dyn Drawable>) -> bool {
    std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").field("id", &self.id).finish()
    }
}
