//! Gravity fitting: mapping a frame's extent onto a viewport
//!
//! The fitter never samples outside the source extent. Aspect-fit shrinks the
//! destination (letterbox), aspect-fill shrinks the source (crop), and stretch
//! leaves both rectangles alone. Drawing the returned `src` stretched into the
//! returned `dst` produces the requested fit.

use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

/// How a frame is fitted into its viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoGravity {
    /// Preserve aspect ratio and fit inside the viewport (letterbox)
    ResizeAspect,
    /// Preserve aspect ratio and fill the viewport (crop)
    ResizeAspectFill,
    /// Stretch to fill the viewport (may distort)
    Resize,
}

impl Default for VideoGravity {
    fn default() -> Self {
        Self::ResizeAspect
    }
}

/// Destination and source rectangles produced by [`VideoGravity::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRects {
    /// Where to draw, in surface coordinates
    pub dst: Rect,
    /// What to sample, in source pixel coordinates
    pub src: Rect,
}

impl VideoGravity {
    /// Compute the fitted rectangles for `dst` (viewport) and `src` (frame extent)
    ///
    /// Zero-area, negative or non-finite inputs are returned unchanged.
    pub fn fit(self, dst: Rect, src: Rect) -> FitRects {
        let unchanged = FitRects { dst, src };
        if dst.is_empty() || src.is_empty() {
            return unchanged;
        }

        let scale_x = dst.width() / src.width();
        let scale_y = dst.height() / src.height();

        match self {
            VideoGravity::ResizeAspect => {
                let scale = scale_x.min(scale_y);
                FitRects {
                    dst: shrink_centered(
                        dst,
                        Size::new(src.width() * scale, src.height() * scale),
                    ),
                    src,
                }
            }
            VideoGravity::ResizeAspectFill => {
                let scale = scale_x.max(scale_y);
                FitRects {
                    dst,
                    src: shrink_centered(
                        src,
                        Size::new(dst.width() / scale, dst.height() / scale),
                    ),
                }
            }
            VideoGravity::Resize => unchanged,
        }
    }
}

/// Resize `rect` to `size` around its own center, splitting the change evenly
fn shrink_centered(rect: Rect, size: Size) -> Rect {
    Rect::new(
        rect.x() + (rect.width() - size.width) / 2.0,
        rect.y() + (rect.height() - size.height) / 2.0,
        size.width,
        size.height,
    )
}
