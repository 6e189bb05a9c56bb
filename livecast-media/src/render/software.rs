//! CPU implementation of [`GpuContext`]
//!
//! Composites into an RGBA framebuffer with nearest-neighbour sampling and
//! source-over blending. The context is a cheap clonable handle, so a host or
//! test can keep one clone for inspection while the surface owns another.
//! Row 0 of the framebuffer is surface `y = 0`.

use super::context::{BlendFactor, Capability, GpuContext};
use livecast_core::{Frame, PixelBuffer, PixelFormat, Rect};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// One composite issued through [`GpuContext::draw_image`]
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub frame_sequence: u64,
    pub in_rect: Rect,
    pub from_rect: Rect,
    pub blended: bool,
}

/// Observable state of a [`SoftwareContext`]
#[derive(Debug, Clone)]
pub struct SoftwareState {
    pub framebuffer: PixelBuffer,
    pub enabled: HashSet<Capability>,
    pub swap_interval: i32,
    pub color_mask: [bool; 4],
    pub depth_write: bool,
    pub stencil_mask: u32,
    pub clear_color: [f32; 4],
    pub scissor: Option<Rect>,
    pub blend: (BlendFactor, BlendFactor),
    pub viewport: Rect,
    pub projection: Option<[f64; 4]>,
    pub is_current: bool,
    pub draws: Vec<DrawCall>,
    pub clears: u64,
    pub flushes: u64,
}

/// Software GPU context
#[derive(Debug, Clone)]
pub struct SoftwareContext {
    state: Arc<Mutex<SoftwareState>>,
}

impl SoftwareContext {
    /// Context with a `width`x`height` framebuffer
    pub fn new(width: u32, height: u32) -> Self {
        let state = SoftwareState {
            framebuffer: PixelBuffer::new(width, height, PixelFormat::Rgba32),
            enabled: HashSet::new(),
            swap_interval: 0,
            color_mask: [true; 4],
            depth_write: true,
            stencil_mask: u32::MAX,
            clear_color: [0.0; 4],
            scissor: None,
            blend: (BlendFactor::One, BlendFactor::Zero),
            viewport: Rect::new(0.0, 0.0, width as f64, height as f64),
            projection: None,
            is_current: false,
            draws: Vec::new(),
            clears: 0,
            flushes: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SoftwareState {
        self.state.lock().clone()
    }

    /// RGBA pixel at framebuffer coordinates
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.state.lock().framebuffer.pixel(x, y)
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.state.lock().enabled.contains(&capability)
    }

    /// Every composite issued so far
    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.lock().draws.clone()
    }
}

impl GpuContext for SoftwareContext {
    fn make_current(&mut self) {
        self.state.lock().is_current = true;
    }

    fn set_swap_interval(&mut self, interval: i32) {
        self.state.lock().swap_interval = interval;
    }

    fn enable(&mut self, capability: Capability) {
        self.state.lock().enabled.insert(capability);
    }

    fn disable(&mut self, capability: Capability) {
        self.state.lock().enabled.remove(&capability);
    }

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.state.lock().color_mask = [red, green, blue, alpha];
    }

    fn depth_mask(&mut self, write: bool) {
        self.state.lock().depth_write = write;
    }

    fn stencil_mask(&mut self, mask: u32) {
        self.state.lock().stencil_mask = mask;
    }

    fn clear_color(&mut self, rgba: [f32; 4]) {
        self.state.lock().clear_color = rgba;
    }

    fn clear(&mut self) {
        let mut state = self.state.lock();
        let color = state.clear_color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let region = clip_region(&state, state.framebuffer.bounds());
        if let Some((x0, y0, x1, y1)) = region {
            for y in y0..y1 {
                for x in x0..x1 {
                    write_masked(&mut state, x, y, color);
                }
            }
        }
        state.clears += 1;
    }

    fn scissor(&mut self, rect: Rect) {
        self.state.lock().scissor = Some(rect);
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.lock().blend = (src, dst);
    }

    fn viewport(&mut self, rect: Rect) {
        let mut state = self.state.lock();
        let (width, height) = (rect.width().max(0.0) as u32, rect.height().max(0.0) as u32);
        if state.framebuffer.width() != width || state.framebuffer.height() != height {
            state.framebuffer = PixelBuffer::new(width, height, PixelFormat::Rgba32);
        }
        state.viewport = rect;
    }

    fn load_orthographic(&mut self, width: f64, height: f64, near: f64, far: f64) {
        self.state.lock().projection = Some([width, height, near, far]);
    }

    fn flush(&mut self) {
        self.state.lock().flushes += 1;
    }

    fn draw_image(&mut self, frame: &Frame, in_rect: Rect, from_rect: Rect) {
        let mut state = self.state.lock();
        let blended = state.enabled.contains(&Capability::Blend);
        state.draws.push(DrawCall {
            frame_sequence: frame.sequence(),
            in_rect,
            from_rect,
            blended,
        });
        if in_rect.is_empty() || from_rect.is_empty() {
            return;
        }

        let Some((x0, y0, x1, y1)) = clip_region(&state, in_rect) else {
            return;
        };
        let extent = frame.extent();
        let blend = state.blend;
        for y in y0..y1 {
            let v = from_rect.y() + ((y as f64 + 0.5 - in_rect.y()) / in_rect.height()) * from_rect.height();
            for x in x0..x1 {
                let u = from_rect.x() + ((x as f64 + 0.5 - in_rect.x()) / in_rect.width()) * from_rect.width();
                let Some(src) = sample(frame, &extent, u, v) else {
                    continue;
                };
                let out = if blended {
                    let dst = state.framebuffer.pixel(x, y).unwrap_or([0; 4]);
                    blend_pixel(src, dst, blend)
                } else {
                    src
                };
                write_masked(&mut state, x, y, out);
            }
        }
    }

    fn render(&mut self, frame: &Frame, buffer: &mut PixelBuffer) {
        let extent = frame.extent();
        let width = (extent.width() as u32).min(buffer.width());
        let height = (extent.height() as u32).min(buffer.height());
        let (ox, oy) = (extent.x() as u32, extent.y() as u32);
        let target = buffer.format();
        for y in 0..height {
            for x in 0..width {
                if let Some(px) = frame.pixel(ox + x, oy + y) {
                    buffer.set_pixel(x, y, target.from_rgba(frame.format().to_rgba(px)));
                }
            }
        }
    }
}

/// Framebuffer pixel range covered by `rect`, further limited by the scissor
/// box when the scissor test is enabled
fn clip_region(state: &SoftwareState, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    let mut rect = rect.intersection(&state.framebuffer.bounds());
    if state.enabled.contains(&Capability::ScissorTest) {
        if let Some(scissor) = state.scissor {
            rect = rect.intersection(&scissor);
        }
    }
    if rect.is_empty() {
        return None;
    }
    Some((
        rect.min_x().floor() as u32,
        rect.min_y().floor() as u32,
        rect.max_x().ceil() as u32,
        rect.max_y().ceil() as u32,
    ))
}

/// Nearest source pixel for extent-relative coordinates, as RGBA
fn sample(frame: &Frame, extent: &Rect, u: f64, v: f64) -> Option<[u8; 4]> {
    let x = u
        .clamp(extent.min_x(), (extent.max_x() - 1.0).max(extent.min_x()))
        .floor() as u32;
    let y = v
        .clamp(extent.min_y(), (extent.max_y() - 1.0).max(extent.min_y()))
        .floor() as u32;
    frame.pixel(x, y).map(|px| frame.format().to_rgba(px))
}

fn factor(factor: BlendFactor, src_alpha: f32) -> f32 {
    match factor {
        BlendFactor::Zero => 0.0,
        BlendFactor::One => 1.0,
        BlendFactor::SrcAlpha => src_alpha,
        BlendFactor::OneMinusSrcAlpha => 1.0 - src_alpha,
    }
}

fn blend_pixel(src: [u8; 4], dst: [u8; 4], (sf, df): (BlendFactor, BlendFactor)) -> [u8; 4] {
    let alpha = src[3] as f32 / 255.0;
    let (s, d) = (factor(sf, alpha), factor(df, alpha));
    let mut out = [0u8; 4];
    for i in 0..4 {
        let value = src[i] as f32 * s + dst[i] as f32 * d;
        out[i] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn write_masked(state: &mut SoftwareState, x: u32, y: u32, px: [u8; 4]) {
    let mask = state.color_mask;
    let Some(mut current) = state.framebuffer.pixel(x, y) else {
        return;
    };
    for i in 0..4 {
        if mask[i] {
            current[i] = px[i];
        }
    }
    state.framebuffer.set_pixel(x, y, current);
}
