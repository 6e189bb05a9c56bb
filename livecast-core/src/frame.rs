//! Frame and pixel buffer types
//!
//! A [`Frame`] is immutable once built and cheap to clone: pixel storage is a
//! shared [`Bytes`] handle, so handing a frame from the producer thread to a
//! surface never copies pixels.

use crate::error::{CoreError, CoreResult};
use crate::geometry::{Rect, Size};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Supported packed pixel layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit blue, green, red, alpha (capture default)
    Bgra32,
    /// 8-bit red, green, blue, alpha
    Rgba32,
}

impl PixelFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Bgra32 | PixelFormat::Rgba32 => 4,
        }
    }

    /// Reorder a pixel from this layout into RGBA channel order
    pub fn to_rgba(&self, px: [u8; 4]) -> [u8; 4] {
        match self {
            PixelFormat::Bgra32 => [px[2], px[1], px[0], px[3]],
            PixelFormat::Rgba32 => px,
        }
    }

    /// Reorder an RGBA pixel into this layout
    pub fn from_rgba(&self, px: [u8; 4]) -> [u8; 4] {
        // BGRA <-> RGBA is its own inverse
        self.to_rgba(px)
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::Bgra32
    }
}

/// An immutable captured image
#[derive(Debug, Clone)]
pub struct Frame {
    sequence: u64,
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: PixelFormat,
    extent: Rect,
    timestamp: Duration,
    data: Bytes,
}

impl Frame {
    /// Build a tightly packed frame whose extent covers the whole storage
    pub fn new(
        sequence: u64,
        width: u32,
        height: u32,
        format: PixelFormat,
        data: impl Into<Bytes>,
    ) -> CoreResult<Self> {
        let bytes_per_row = width as usize * format.bytes_per_pixel();
        Self::with_stride(sequence, width, height, bytes_per_row, format, data)
    }

    /// Build a frame whose rows are `bytes_per_row` apart
    pub fn with_stride(
        sequence: u64,
        width: u32,
        height: u32,
        bytes_per_row: usize,
        format: PixelFormat,
        data: impl Into<Bytes>,
    ) -> CoreResult<Self> {
        let data = data.into();
        let min_stride = width as usize * format.bytes_per_pixel();
        if bytes_per_row < min_stride {
            return Err(CoreError::InvalidGeometry {
                reason: format!("row stride {bytes_per_row} shorter than {min_stride} bytes"),
            });
        }
        let expected = bytes_per_row * height as usize;
        if data.len() < expected {
            return Err(CoreError::InvalidFrameData {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            sequence,
            width,
            height,
            bytes_per_row,
            format,
            extent: Rect::from_size(Size::new(width as f64, height as f64)),
            timestamp: Duration::ZERO,
            data,
        })
    }

    /// A frame filled with one BGRA/RGBA color, mostly useful for test patterns
    pub fn solid(sequence: u64, width: u32, height: u32, format: PixelFormat, px: [u8; 4]) -> Self {
        let data: Vec<u8> = px
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            sequence,
            width,
            height,
            bytes_per_row: width as usize * 4,
            format,
            extent: Rect::from_size(Size::new(width as f64, height as f64)),
            timestamp: Duration::ZERO,
            data: Bytes::from(data),
        }
    }

    /// Restrict the visible content to `extent`, which must lie inside the storage
    pub fn with_extent(mut self, extent: Rect) -> CoreResult<Self> {
        let storage = Rect::from_size(Size::new(self.width as f64, self.height as f64));
        if extent.is_empty() || !storage.contains_rect(&extent, 0.0) {
            return Err(CoreError::InvalidGeometry {
                reason: format!("extent {extent:?} outside {}x{} storage", self.width, self.height),
            });
        }
        self.extent = extent;
        Ok(self)
    }

    /// Attach a presentation timestamp
    pub fn with_timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Producer-assigned sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Storage width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Storage height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distance between rows in bytes
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Visible content rectangle in source pixel space
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Presentation timestamp
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Raw pixel bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Pixel at storage coordinates, in the frame's own layout
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.bytes_per_row + x as usize * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A caller-owned pixel buffer, the target of off-surface rendering
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled (transparent black) buffer
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0; width as usize * height as usize * format.bytes_per_pixel()],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Buffer bounds as a rectangle at the origin
    pub fn bounds(&self) -> Rect {
        Rect::from_size(Size::new(self.width as f64, self.height as f64))
    }

    /// Pixel at `(x, y)` in the buffer's own layout
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Overwrite the pixel at `(x, y)`; out-of-range writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.data[offset..offset + 4].copy_from_slice(&px);
    }

    /// Raw pixel bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_short_data() {
        let result = Frame::new(0, 4, 4, PixelFormat::Bgra32, vec![0u8; 10]);
        assert_eq!(
            result.unwrap_err(),
            CoreError::InvalidFrameData {
                expected: 64,
                actual: 10
            }
        );
    }

    #[test]
    fn test_extent_must_fit_storage() {
        let frame = Frame::solid(1, 1920, 1080, PixelFormat::Bgra32, [0, 0, 255, 255]);
        assert_eq!(frame.extent(), Rect::new(0.0, 0.0, 1920.0, 1080.0));

        let cropped = frame
            .clone()
            .with_extent(Rect::new(420.0, 0.0, 1080.0, 1080.0))
            .unwrap();
        assert_eq!(cropped.extent().x(), 420.0);

        assert!(frame
            .with_extent(Rect::new(1000.0, 0.0, 1000.0, 1080.0))
            .is_err());
    }

    #[test]
    fn test_pixel_access_honours_stride() {
        let mut data = vec![0u8; 2 * 12];
        data[12..16].copy_from_slice(&[1, 2, 3, 4]);
        let frame = Frame::with_stride(7, 2, 2, 12, PixelFormat::Rgba32, data).unwrap();

        assert_eq!(frame.pixel(0, 1), Some([1, 2, 3, 4]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_bgra_channel_order() {
        let bgra = [10, 20, 30, 255];
        assert_eq!(PixelFormat::Bgra32.to_rgba(bgra), [30, 20, 10, 255]);
        assert_eq!(PixelFormat::Bgra32.from_rgba([30, 20, 10, 255]), bgra);
    }

    #[test]
    fn test_pixel_buffer_writes() {
        let mut buffer = PixelBuffer::new(3, 2, PixelFormat::Bgra32);
        buffer.set_pixel(2, 1, [1, 1, 1, 1]);
        buffer.set_pixel(9, 9, [2, 2, 2, 2]);
        assert_eq!(buffer.pixel(2, 1), Some([1, 1, 1, 1]));
        assert_eq!(buffer.as_bytes().len(), 24);
    }
}
