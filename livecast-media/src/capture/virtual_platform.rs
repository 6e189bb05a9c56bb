//! Virtual capture platform for tests, demos and headless hosts
//!
//! Sessions keep their state in memory, count configuration transactions and
//! can be told to reject specific presets or frame rates, which is how the
//! mixer's failure paths are exercised. [`TestPatternSource`] stands in for a
//! camera driver: it delivers frames from its own producer thread.

use super::{
    CapturePlatform, CaptureSession, Device, DeviceId, DevicePosition, MediaKind, SessionPreset,
    VideoSetting,
};
use crate::error::{MediaError, MediaResult};
use crate::mixer::Mixer;
use crate::DEFAULT_PIXEL_FORMAT;
use livecast_core::{CoreResult, Frame};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Platform whose devices and sessions live entirely in memory
pub struct VirtualCapturePlatform {
    devices: RwLock<Vec<Device>>,
    rejected_presets: RwLock<HashSet<SessionPreset>>,
    max_frame_rate: RwLock<Option<f64>>,
    sessions: Mutex<Vec<Arc<VirtualCaptureSession>>>,
}

impl VirtualCapturePlatform {
    /// Platform with a front camera, a back camera and a microphone
    pub fn new() -> Self {
        Self::with_devices(vec![
            Device::new(
                "virtual-camera-front",
                "Front Camera",
                MediaKind::Video,
                DevicePosition::Front,
            ),
            Device::new(
                "virtual-camera-back",
                "Back Camera",
                MediaKind::Video,
                DevicePosition::Back,
            ),
            Device::new(
                "virtual-microphone",
                "Built-in Microphone",
                MediaKind::Audio,
                DevicePosition::Unspecified,
            ),
        ])
    }

    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(devices),
            rejected_presets: RwLock::new(HashSet::new()),
            max_frame_rate: RwLock::new(None),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Sessions created from now on refuse `preset`
    pub fn reject_preset(&self, preset: SessionPreset) {
        self.rejected_presets.write().insert(preset);
    }

    /// Sessions created from now on refuse frame rates above `fps`
    pub fn limit_frame_rate(&self, fps: f64) {
        *self.max_frame_rate.write() = Some(fps);
    }

    /// Simulate a hot-plugged device
    pub fn connect_device(&self, device: Device) {
        self.devices.write().push(device);
    }

    /// Every session created so far, oldest first
    pub fn sessions(&self) -> Vec<Arc<VirtualCaptureSession>> {
        self.sessions.lock().clone()
    }

    /// Most recently created session
    pub fn last_session(&self) -> Option<Arc<VirtualCaptureSession>> {
        self.sessions.lock().last().cloned()
    }
}

impl Default for VirtualCapturePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl CapturePlatform for VirtualCapturePlatform {
    fn devices(&self) -> Vec<Device> {
        self.devices.read().clone()
    }

    fn new_session(&self, preset: SessionPreset) -> Arc<dyn CaptureSession> {
        let session = Arc::new(VirtualCaptureSession {
            state: Mutex::new(SessionState {
                preset,
                inputs: Vec::new(),
                video_settings: Vec::new(),
                configuration_depth: 0,
            }),
            running: AtomicBool::new(false),
            transactions: AtomicU64::new(0),
            rejected_presets: self.rejected_presets.read().clone(),
            max_frame_rate: *self.max_frame_rate.read(),
        });
        self.sessions.lock().push(Arc::clone(&session));
        session
    }
}

#[derive(Debug)]
struct SessionState {
    preset: SessionPreset,
    inputs: Vec<Device>,
    video_settings: Vec<VideoSetting>,
    configuration_depth: u32,
}

/// In-memory capture session
pub struct VirtualCaptureSession {
    state: Mutex<SessionState>,
    running: AtomicBool,
    transactions: AtomicU64,
    rejected_presets: HashSet<SessionPreset>,
    max_frame_rate: Option<f64>,
}

impl VirtualCaptureSession {
    /// Number of committed configuration transactions
    pub fn transaction_count(&self) -> u64 {
        self.transactions.load(Ordering::SeqCst)
    }

    /// True while a configuration transaction is open
    pub fn is_configuring(&self) -> bool {
        self.state.lock().configuration_depth > 0
    }

    /// Every video setting accepted so far, in order
    pub fn video_settings(&self) -> Vec<VideoSetting> {
        self.state.lock().video_settings.clone()
    }
}

impl CaptureSession for VirtualCaptureSession {
    fn begin_configuration(&self) {
        self.state.lock().configuration_depth += 1;
    }

    fn commit_configuration(&self) {
        let mut state = self.state.lock();
        if state.configuration_depth == 0 {
            return;
        }
        state.configuration_depth -= 1;
        // Nested transactions commit once, with the outermost
        if state.configuration_depth == 0 {
            self.transactions.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session_preset(&self) -> SessionPreset {
        self.state.lock().preset
    }

    fn set_session_preset(&self, preset: SessionPreset) -> MediaResult<()> {
        if self.rejected_presets.contains(&preset) {
            return Err(MediaError::rejected(
                "sessionPreset",
                format!("{preset} is not supported by the attached inputs"),
            ));
        }
        self.state.lock().preset = preset;
        Ok(())
    }

    fn add_input(&self, device: &Device) -> MediaResult<()> {
        let mut state = self.state.lock();
        if state.inputs.iter().any(|input| input.id == device.id) {
            return Err(MediaError::DeviceUnavailable {
                device_id: device.id.to_string(),
                reason: "already attached to this session".to_string(),
            });
        }
        state.inputs.push(device.clone());
        Ok(())
    }

    fn remove_input(&self, device: &DeviceId) {
        self.state.lock().inputs.retain(|input| &input.id != device);
    }

    fn inputs(&self) -> Vec<Device> {
        self.state.lock().inputs.clone()
    }

    fn apply_video_setting(&self, setting: VideoSetting) -> MediaResult<()> {
        if let (VideoSetting::FrameRate(fps), Some(max)) = (setting, self.max_frame_rate) {
            if fps > max {
                return Err(MediaError::rejected(
                    setting.key(),
                    format!("{fps} exceeds the device maximum of {max}"),
                ));
            }
        }
        self.state.lock().video_settings.push(setting);
        Ok(())
    }

    fn start_running(&self) -> MediaResult<()> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_running(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Producer thread delivering generated frames into a mixer
///
/// Frames are only produced while the mixer's session is running, at the
/// mixer's current frame rate. Dropping the handle stops the thread.
pub struct TestPatternSource {
    thread: Option<thread::JoinHandle<()>>,
    running: Arc<AtomicBool>,
    produced: Arc<AtomicU64>,
}

impl TestPatternSource {
    /// Start producing `width`x`height` BGRA frames into `mixer`
    pub fn spawn(mixer: &Arc<Mixer>, width: u32, height: u32) -> MediaResult<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let produced = Arc::new(AtomicU64::new(0));
        let mixer = Arc::downgrade(mixer);

        let thread = {
            let running = Arc::clone(&running);
            let produced = Arc::clone(&produced);
            thread::Builder::new()
                .name("test-pattern".into())
                .spawn(move || Self::produce_loop(mixer, width, height, running, produced))
                .map_err(|e| MediaError::SessionStartFailed {
                    reason: format!("Failed to spawn producer thread: {e}"),
                })?
        };

        info!("Test pattern source started ({}x{})", width, height);
        Ok(Self {
            thread: Some(thread),
            running,
            produced,
        })
    }

    fn produce_loop(
        mixer: Weak<Mixer>,
        width: u32,
        height: u32,
        running: Arc<AtomicBool>,
        produced: Arc<AtomicU64>,
    ) {
        let start = Instant::now();
        let mut sequence = 0u64;

        while running.load(Ordering::SeqCst) {
            let Some(mixer) = mixer.upgrade() else {
                break;
            };
            let fps = mixer.fps();
            let interval = if fps > 0.0 {
                Duration::from_secs_f64(1.0 / fps)
            } else {
                Duration::from_millis(33)
            };

            if mixer.is_running() {
                match test_pattern(sequence, width, height) {
                    Ok(frame) => {
                        let frame = frame.with_timestamp(start.elapsed());
                        mixer.video_io().append_frame(Arc::new(frame));
                        produced.fetch_add(1, Ordering::Relaxed);
                        sequence += 1;
                    }
                    Err(e) => {
                        debug!("Test pattern source stopping: {}", e);
                        break;
                    }
                }
            }
            drop(mixer);

            thread::sleep(interval);
        }
        debug!("Test pattern source exiting after {} frames", sequence);
    }

    /// Frames delivered so far
    pub fn frames_produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Stop the producer thread and wait for it
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TestPatternSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Vertical color bars whose hue shifts with `sequence`
fn test_pattern(sequence: u64, width: u32, height: u32) -> CoreResult<Frame> {
    const BARS: [[u8; 4]; 4] = [
        [255, 255, 255, 255],
        [0, 255, 255, 255],
        [255, 255, 0, 255],
        [0, 255, 0, 255],
    ];
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    let shift = (sequence % BARS.len() as u64) as usize;
    for _ in 0..height {
        for x in 0..width {
            let bar = (x as usize * BARS.len() / width.max(1) as usize + shift) % BARS.len();
            data.extend_from_slice(&BARS[bar]);
        }
    }
    Frame::new(sequence, width, height, DEFAULT_PIXEL_FORMAT, data)
}
