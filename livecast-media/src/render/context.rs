//! GPU context capability
//!
//! A fixed-function subset of a GL-style context plus the two image entry
//! points the surface needs. Every call is thread-affine and treated as
//! infallible once the context has been prepared.

use livecast_core::{Frame, PixelBuffer, Rect};

/// Server-side capabilities toggled by `enable`/`disable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AlphaTest,
    DepthTest,
    ScissorTest,
    Blend,
    Dither,
    CullFace,
}

/// Blend equation factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// A native GPU context with an attached image context
pub trait GpuContext: Send {
    fn make_current(&mut self);

    /// Buffer swaps wait for `interval` vertical refreshes
    fn set_swap_interval(&mut self, interval: i32);

    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);
    fn depth_mask(&mut self, write: bool);
    fn stencil_mask(&mut self, mask: u32);

    fn clear_color(&mut self, rgba: [f32; 4]);
    /// Clear the color buffer to the clear color
    fn clear(&mut self);

    fn scissor(&mut self, rect: Rect);
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    fn viewport(&mut self, rect: Rect);
    /// Replace the projection with `[0, width] x [0, height] x [near, far]`
    /// and reset the model-view matrix
    fn load_orthographic(&mut self, width: f64, height: f64, near: f64, far: f64);

    /// Submit queued commands
    fn flush(&mut self);

    /// Draw the `from_rect` region of `frame` stretched into `in_rect`
    fn draw_image(&mut self, frame: &Frame, in_rect: Rect, from_rect: Rect);

    /// Render `frame`'s extent into `buffer`, starting at the buffer origin
    fn render(&mut self, frame: &Frame, buffer: &mut PixelBuffer);
}
