//! Device and capture orientation
//!
//! Physical device orientation is reported by the host; capture orientation is
//! what the camera connection is told. Camera sensors are mounted rotated, so
//! the two landscape values are swapped between the tables.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Orientation applied to the capture connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Default for VideoOrientation {
    fn default() -> Self {
        Self::Portrait
    }
}

/// Physical orientation of the device as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceOrientation {
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

impl DeviceOrientation {
    /// Capture orientation for this physical orientation
    ///
    /// `None` means "leave the current capture orientation alone".
    pub fn video_orientation(self) -> Option<VideoOrientation> {
        match self {
            DeviceOrientation::Portrait => Some(VideoOrientation::Portrait),
            DeviceOrientation::PortraitUpsideDown => Some(VideoOrientation::PortraitUpsideDown),
            DeviceOrientation::LandscapeLeft => Some(VideoOrientation::LandscapeRight),
            DeviceOrientation::LandscapeRight => Some(VideoOrientation::LandscapeLeft),
            DeviceOrientation::Unknown | DeviceOrientation::FaceUp | DeviceOrientation::FaceDown => {
                None
            }
        }
    }
}

/// Handle returned by [`OrientationSource::add_observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

/// Callback invoked with each new physical orientation
pub type OrientationObserver = Box<dyn Fn(DeviceOrientation) + Send + Sync>;

/// Host-provided stream of device orientation changes
pub trait OrientationSource: Send + Sync {
    /// Orientation right now
    fn current_orientation(&self) -> DeviceOrientation;

    /// Register `observer`; it is called for every change until removed
    fn add_observer(&self, observer: OrientationObserver) -> ObserverToken;

    /// Remove a registration; unknown tokens are ignored
    fn remove_observer(&self, token: ObserverToken);
}

/// In-process orientation notification center
///
/// The host posts orientation changes; registered observers are invoked
/// synchronously on the posting thread.
pub struct OrientationCenter {
    current: RwLock<DeviceOrientation>,
    observers: DashMap<ObserverToken, Arc<OrientationObserver>>,
    next_token: AtomicU64,
}

impl OrientationCenter {
    pub fn new() -> Self {
        Self::with_orientation(DeviceOrientation::Unknown)
    }

    pub fn with_orientation(orientation: DeviceOrientation) -> Self {
        Self {
            current: RwLock::new(orientation),
            observers: DashMap::new(),
            next_token: AtomicU64::new(1),
        }
    }

    /// Record a new orientation and notify every observer
    pub fn post(&self, orientation: DeviceOrientation) {
        *self.current.write() = orientation;

        // Snapshot so observers may add or remove registrations while running
        let observers: Vec<Arc<OrientationObserver>> = self
            .observers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        debug!(
            "Posting device orientation {:?} to {} observers",
            orientation,
            observers.len()
        );
        for observer in observers {
            (**observer)(orientation);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Default for OrientationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationSource for OrientationCenter {
    fn current_orientation(&self) -> DeviceOrientation {
        *self.current.read()
    }

    fn add_observer(&self, observer: OrientationObserver) -> ObserverToken {
        let token = ObserverToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.observers.insert(token, Arc::new(observer));
        token
    }

    fn remove_observer(&self, token: ObserverToken) {
        self.observers.remove(&token);
    }
}
