//! # livecast core
//!
//! Leaf types of the livecast frame presentation pipeline: rectangles in
//! surface and source pixel space, the immutable [`Frame`] value delivered by
//! capture, and the gravity fitter that maps a frame's extent onto a viewport.
//! Nothing in this crate performs I/O or blocks.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod frame;
pub mod geometry;
pub mod gravity;

// Re-export main types
pub use error::{CoreError, CoreResult};
pub use frame::{Frame, PixelBuffer, PixelFormat};
pub use geometry::{Point, Rect, Size};
pub use gravity::{FitRects, VideoGravity};
