//! GPU-backed render surface

use super::context::{BlendFactor, Capability, GpuContext};
use super::scheduler::{RedrawScheduler, SurfaceId};
use super::Drawable;
use crate::error::{MediaError, MediaResult};
use crate::stream::{Stream, StreamId};
use livecast_core::{Frame, PixelBuffer, Rect, Size, VideoGravity};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Surface configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceConfig {
    /// How frames are fitted into the surface
    pub gravity: VideoGravity,
    /// Color behind letterbox bars
    pub clear_color: [f32; 4],
    /// Vertical refreshes per buffer swap
    pub swap_interval: i32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            gravity: VideoGravity::ResizeAspect,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            swap_interval: 1,
        }
    }
}

/// Attachment and presentation events
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The surface became the stream's drawable
    StreamAttached { stream: StreamId },
    /// The surface released the stream itself
    StreamDetached { stream: StreamId },
    /// Another drawable took the stream over
    Evicted { stream: StreamId },
    /// A frame was composited on screen
    FrameDisplayed { sequence: u64 },
}

/// Presentation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub frames_received: u64,
    pub frames_displayed: u64,
    /// Frames replaced before any redraw consumed them
    pub frames_superseded: u64,
}

/// Drawable that composites the latest frame into a [`GpuContext`]
///
/// Producers call [`Drawable::draw_image`] from any thread. The frame is put
/// in a single-slot mailbox and the host is asked to redraw; the host then
/// calls [`RenderSurface::display`] on the thread that ran
/// [`RenderSurface::prepare_context`]. Several frames arriving before that
/// redraw collapse into one composite of the newest.
pub struct RenderSurface {
    id: SurfaceId,
    weak_self: Weak<RenderSurface>,
    config: RwLock<SurfaceConfig>,
    bounds: RwLock<Rect>,
    context: Mutex<Option<Box<dyn GpuContext>>>,
    owner: RwLock<Option<ThreadId>>,
    current_frame: Mutex<Option<Arc<Frame>>>,
    needs_display: AtomicBool,
    current_stream: Mutex<Option<(StreamId, Weak<Stream>)>>,
    scheduler: Arc<dyn RedrawScheduler>,
    event_tx: broadcast::Sender<SurfaceEvent>,
    frames_received: AtomicU64,
    frames_displayed: AtomicU64,
    frames_superseded: AtomicU64,
}

impl RenderSurface {
    /// Create a surface covering `bounds`
    pub fn new(
        bounds: Rect,
        config: SurfaceConfig,
        scheduler: Arc<dyn RedrawScheduler>,
    ) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new_cyclic(|weak_self| Self {
            id: SurfaceId::new(),
            weak_self: weak_self.clone(),
            config: RwLock::new(config),
            bounds: RwLock::new(bounds),
            context: Mutex::new(None),
            owner: RwLock::new(None),
            current_frame: Mutex::new(None),
            needs_display: AtomicBool::new(false),
            current_stream: Mutex::new(None),
            scheduler,
            event_tx,
            frames_received: AtomicU64::new(0),
            frames_displayed: AtomicU64::new(0),
            frames_superseded: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        *self.bounds.read()
    }

    pub fn video_gravity(&self) -> VideoGravity {
        self.config.read().gravity
    }

    /// Takes effect on the next redraw
    pub fn set_video_gravity(&self, gravity: VideoGravity) {
        self.config.write().gravity = gravity;
    }

    pub fn config(&self) -> SurfaceConfig {
        *self.config.read()
    }

    /// Subscribe to attachment and presentation events
    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.event_tx.subscribe()
    }

    pub fn stats(&self) -> SurfaceStats {
        SurfaceStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_displayed: self.frames_displayed.load(Ordering::Relaxed),
            frames_superseded: self.frames_superseded.load(Ordering::Relaxed),
        }
    }

    /// Frame that the next redraw will composite
    pub fn current_frame(&self) -> Option<Arc<Frame>> {
        self.current_frame.lock().clone()
    }

    /// Whether a redraw has been requested and not yet serviced
    pub fn needs_display(&self) -> bool {
        self.needs_display.load(Ordering::Acquire)
    }

    /// Take ownership of the GPU context and put it into its baseline state
    ///
    /// The calling thread becomes the surface's owning thread. Can only be
    /// done once.
    pub fn prepare_context(&self, mut context: Box<dyn GpuContext>) -> MediaResult<()> {
        let mut slot = self.context.lock();
        if slot.is_some() {
            return Err(MediaError::InvalidConfiguration {
                message: format!("{} already has a GPU context", self.id),
            });
        }

        let config = self.config();
        context.make_current();
        context.set_swap_interval(config.swap_interval);
        for capability in [
            Capability::AlphaTest,
            Capability::DepthTest,
            Capability::ScissorTest,
            Capability::Blend,
            Capability::Dither,
            Capability::CullFace,
        ] {
            context.disable(capability);
        }
        context.color_mask(true, true, true, true);
        context.depth_mask(false);
        context.stencil_mask(0);
        context.clear_color(config.clear_color);

        let bounds = self.bounds();
        load_viewport(&mut *context, bounds.size);
        context.clear();
        context.flush();

        *slot = Some(context);
        *self.owner.write() = Some(thread::current().id());
        info!("Prepared GPU context for {} ({}x{})", self.id, bounds.width(), bounds.height());
        Ok(())
    }

    fn check_owner(&self) -> MediaResult<()> {
        match *self.owner.read() {
            None => Err(MediaError::ContextNotPrepared),
            Some(owner) if owner != thread::current().id() => Err(MediaError::WrongThread),
            Some(_) => Ok(()),
        }
    }

    /// Service a pending redraw request over the full bounds
    ///
    /// Returns whether a redraw was pending. Must run on the owning thread.
    pub fn display(&self) -> bool {
        match self.check_owner() {
            Ok(()) => {}
            Err(MediaError::ContextNotPrepared) => return false,
            Err(e) => {
                warn!("Deferring display of {}: {}", self.id, e);
                return false;
            }
        }
        if !self.needs_display.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.draw_rect(self.bounds());
        true
    }

    /// Redraw `dirty` with the current frame
    pub fn draw_rect(&self, dirty: Rect) {
        let Some(frame) = self.current_frame() else {
            return;
        };
        match self.check_owner() {
            Ok(()) => {}
            Err(MediaError::ContextNotPrepared) => return,
            Err(e) => {
                warn!("Skipping redraw of {}: {}", self.id, e);
                return;
            }
        }
        let mut guard = self.context.lock();
        let Some(context) = guard.as_mut() else {
            return;
        };

        let scissor = dirty.integral();
        let dst = scissor.inset(-1.0, -1.0).intersection(&self.bounds());
        let fit = self.video_gravity().fit(dst, frame.extent());

        context.make_current();
        context.clear();
        context.scissor(scissor);
        context.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        context.enable(Capability::Blend);
        if !fit.dst.is_empty() {
            context.draw_image(&frame, fit.dst, fit.src);
        }
        context.disable(Capability::Blend);
        context.flush();
        drop(guard);

        self.frames_displayed.fetch_add(1, Ordering::Relaxed);
        let _ = self.event_tx.send(SurfaceEvent::FrameDisplayed {
            sequence: frame.sequence(),
        });
    }

    /// Resize the surface and reload the projection
    pub fn reshape(&self, size: Size) {
        if self.owner.read().is_none() {
            *self.bounds.write() = Rect::from_size(size);
            return;
        }
        if let Err(e) = self.check_owner() {
            warn!("Ignoring reshape of {}: {}", self.id, e);
            return;
        }
        *self.bounds.write() = Rect::from_size(size);
        if let Some(context) = self.context.lock().as_mut() {
            context.make_current();
            load_viewport(&mut **context, size);
        }
        debug!("Reshaped {} to {}x{}", self.id, size.width, size.height);
    }

    /// Make `stream` the only stream drawing into this surface
    ///
    /// The current stream, if any, loses its drawable first. `None` leaves
    /// the surface unattached. Attaching the stream that is already attached
    /// does nothing.
    pub fn attach_stream(&self, stream: Option<&Arc<Stream>>) {
        let me: Weak<dyn Drawable> = self.weak_self.clone();
        let previous = self
            .current_stream
            .lock()
            .take()
            .and_then(|(_, stream)| stream.upgrade());

        if let (Some(previous), Some(next)) = (&previous, stream) {
            if previous.id() == next.id() && next.is_drawable(&me) {
                *self.current_stream.lock() = Some((next.id(), Arc::downgrade(next)));
                return;
            }
        }

        if let Some(previous) = previous {
            if previous.is_drawable(&me) {
                previous.set_drawable(None);
                info!("Detached {} from {}", previous.id(), self.id);
                let _ = self.event_tx.send(SurfaceEvent::StreamDetached {
                    stream: previous.id(),
                });
            }
        }

        if let Some(next) = stream {
            next.set_drawable(Some(me));
            *self.current_stream.lock() = Some((next.id(), Arc::downgrade(next)));
            info!("Attached {} to {}", next.id(), self.id);
            let _ = self.event_tx.send(SurfaceEvent::StreamAttached { stream: next.id() });
        }
    }

    /// Attached stream, `None` when unattached or the stream is gone
    pub fn current_stream(&self) -> Option<Arc<Stream>> {
        let mut slot = self.current_stream.lock();
        let stream = slot.as_ref().and_then(|(_, stream)| stream.upgrade());
        if stream.is_none() {
            *slot = None;
        }
        stream
    }

    pub fn is_attached(&self) -> bool {
        self.current_stream().is_some()
    }
}

impl Drawable for RenderSurface {
    fn draw_image(&self, frame: Arc<Frame>) {
        *self.current_frame.lock() = Some(frame);
        self.frames_received.fetch_add(1, Ordering::Relaxed);

        if self.needs_display.swap(true, Ordering::AcqRel) {
            self.frames_superseded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.scheduler.request_redraw(self.id);
        }
    }

    fn render(&self, frame: &Frame, buffer: &mut PixelBuffer) -> MediaResult<()> {
        self.check_owner()?;
        let mut guard = self.context.lock();
        let context = guard.as_mut().ok_or(MediaError::ContextNotPrepared)?;
        context.make_current();
        context.render(frame, buffer);
        Ok(())
    }

    fn stream_detached(&self, stream: StreamId) {
        let mut slot = self.current_stream.lock();
        if matches!(*slot, Some((id, _)) if id == stream) {
            *slot = None;
            drop(slot);
            info!("{} evicted from {}", stream, self.id);
            let _ = self.event_tx.send(SurfaceEvent::Evicted { stream });
        }
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        debug!("Dropping {}", self.id);
    }
}

fn load_viewport(context: &mut dyn GpuContext, size: Size) {
    context.viewport(Rect::from_size(size));
    context.load_orthographic(size.width, size.height, -1.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SoftwareContext;
    use livecast_core::PixelFormat;

    struct CountingScheduler(AtomicU64);

    impl RedrawScheduler for CountingScheduler {
        fn request_redraw(&self, _surface: SurfaceId) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn surface() -> (Arc<RenderSurface>, Arc<CountingScheduler>) {
        let scheduler = Arc::new(CountingScheduler(AtomicU64::new(0)));
        let surface = RenderSurface::new(
            Rect::new(0.0, 0.0, 40.0, 40.0),
            SurfaceConfig::default(),
            scheduler.clone(),
        );
        (surface, scheduler)
    }

    #[test]
    fn test_prepare_context_baseline() {
        let (surface, _) = surface();
        let context = SoftwareContext::new(1, 1);
        surface.prepare_context(Box::new(context.clone())).unwrap();

        let state = context.state();
        assert_eq!(state.swap_interval, 1);
        assert!(state.enabled.is_empty());
        assert_eq!(state.color_mask, [true; 4]);
        assert!(!state.depth_write);
        assert_eq!(state.stencil_mask, 0);
        assert_eq!(state.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(state.projection, Some([40.0, 40.0, -1.0, 1.0]));
        assert_eq!(context.pixel(10, 10), Some([0, 0, 0, 255]));

        let again = surface.prepare_context(Box::new(SoftwareContext::new(1, 1)));
        assert!(again.is_err());
    }

    #[test]
    fn test_redraw_requests_are_coalesced() {
        let (surface, scheduler) = surface();
        for seq in 0..5 {
            surface.draw_image(Arc::new(Frame::solid(seq, 4, 4, PixelFormat::Bgra32, [0; 4])));
        }
        assert_eq!(scheduler.0.load(Ordering::SeqCst), 1);
        assert_eq!(surface.stats().frames_received, 5);
        assert_eq!(surface.stats().frames_superseded, 4);
        assert_eq!(surface.current_frame().unwrap().sequence(), 4);
    }

    #[test]
    fn test_draw_rect_without_frame_is_noop() {
        let (surface, _) = surface();
        let context = SoftwareContext::new(1, 1);
        surface.prepare_context(Box::new(context.clone())).unwrap();
        let before = context.state();

        surface.draw_rect(surface.bounds());
        let after = context.state();
        assert_eq!(after.clears, before.clears);
        assert_eq!(after.flushes, before.flushes);
        assert!(after.draws.is_empty());
    }

    #[test]
    fn test_render_requires_context() {
        let (surface, _) = surface();
        let frame = Frame::solid(0, 2, 2, PixelFormat::Bgra32, [0; 4]);
        let mut buffer = PixelBuffer::new(2, 2, PixelFormat::Bgra32);
        assert_eq!(
            surface.render(&frame, &mut buffer),
            Err(MediaError::ContextNotPrepared)
        );
    }

    #[test]
    fn test_reshape_reloads_projection() {
        let (surface, _) = surface();
        let context = SoftwareContext::new(1, 1);
        surface.prepare_context(Box::new(context.clone())).unwrap();

        surface.reshape(Size::new(320.0, 240.0));
        let state = context.state();
        assert_eq!(state.viewport, Rect::new(0.0, 0.0, 320.0, 240.0));
        assert_eq!(state.projection, Some([320.0, 240.0, -1.0, 1.0]));
        assert_eq!(surface.bounds(), Rect::new(0.0, 0.0, 320.0, 240.0));
    }
}
