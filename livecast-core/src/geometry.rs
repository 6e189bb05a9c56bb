//! Rectangles in surface and source pixel space
//!
//! All values are `f64` so that letterbox offsets such as `87.5` survive
//! fitting without rounding. Rectangles are origin + size with a non-negative
//! size; operations that could produce a negative size return [`Rect::ZERO`].

use serde::{Deserialize, Serialize};

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// The origin
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Size {
    /// An empty size
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width divided by height, `None` when the height is not positive
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }

    /// True when both dimensions are finite and strictly positive
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum corner
    pub origin: Point,
    /// Extent from the origin
    pub size: Size,
}

impl Rect {
    /// The null rectangle returned by empty intersections
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a rectangle from origin and size components
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    /// Origin x
    pub fn x(&self) -> f64 {
        self.origin.x
    }

    /// Origin y
    pub fn y(&self) -> f64 {
        self.origin.y
    }

    /// Width
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Height
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Left edge
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    /// Bottom edge
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    /// Right edge
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Top edge
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Center point
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        !self.size.has_area()
    }

    /// Smallest rectangle with integer edges that contains this one
    pub fn integral(&self) -> Self {
        if self.is_empty() {
            return Self::ZERO;
        }
        let min_x = self.min_x().floor();
        let min_y = self.min_y().floor();
        Self::new(
            min_x,
            min_y,
            self.max_x().ceil() - min_x,
            self.max_y().ceil() - min_y,
        )
    }

    /// Move every edge inward by `dx`/`dy`; negative values grow the rectangle
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        let width = self.size.width - 2.0 * dx;
        let height = self.size.height - 2.0 * dy;
        if width < 0.0 || height < 0.0 {
            return Self::ZERO;
        }
        Self::new(self.origin.x + dx, self.origin.y + dy, width, height)
    }

    /// Overlap of two rectangles, [`Rect::ZERO`] when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Self {
        let min_x = self.min_x().max(other.min_x());
        let min_y = self.min_y().max(other.min_y());
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x <= min_x || max_y <= min_y {
            return Self::ZERO;
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// True when `other` lies entirely inside this rectangle, within `epsilon`
    pub fn contains_rect(&self, other: &Rect, epsilon: f64) -> bool {
        other.min_x() >= self.min_x() - epsilon
            && other.min_y() >= self.min_y() - epsilon
            && other.max_x() <= self.max_x() + epsilon
            && other.max_y() <= self.max_y() + epsilon
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        (self.origin.x - other.origin.x).abs() <= epsilon
            && (self.origin.y - other.origin.y).abs() <= epsilon
            && (self.size.width - other.size.width).abs() <= epsilon
            && (self.size.height - other.size.height).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_expands_to_whole_pixels() {
        let rect = Rect::new(0.5, 1.25, 10.0, 10.0);
        assert_eq!(rect.integral(), Rect::new(0.0, 1.0, 11.0, 11.0));
    }

    #[test]
    fn test_negative_inset_grows() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(rect.inset(-1.0, -1.0), Rect::new(9.0, 9.0, 102.0, 52.0));
        assert_eq!(rect.inset(60.0, 0.0), Rect::ZERO);
    }

    #[test]
    fn test_intersection() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let dirty = Rect::new(-1.0, -1.0, 402.0, 302.0);
        assert_eq!(dirty.intersection(&bounds), bounds);

        let outside = Rect::new(500.0, 500.0, 10.0, 10.0);
        assert_eq!(outside.intersection(&bounds), Rect::ZERO);
        assert!(outside.intersection(&bounds).is_empty());
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Size::new(1920.0, 1080.0).aspect_ratio(), Some(1920.0 / 1080.0));
        assert_eq!(Size::new(10.0, 0.0).aspect_ratio(), None);
        assert!(!Size::new(f64::NAN, 1.0).has_area());
    }
}
