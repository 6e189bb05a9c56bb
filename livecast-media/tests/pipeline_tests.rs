//! End-to-end presentation with a live producer thread
//!
//! A test pattern source delivers frames at 60 Hz while the test body acts as
//! the host UI loop: it waits for redraw requests and services them.

use livecast_core::Rect;
use livecast_media::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_live_frames_reach_surface() {
    let platform = Arc::new(VirtualCapturePlatform::new());
    let mixer = Mixer::new(platform);
    mixer.set_fps(60.0).unwrap();
    let stream = Stream::new(mixer.clone());

    let (scheduler, mut redraws) = ChannelScheduler::new();
    let surface = RenderSurface::new(
        Rect::new(0.0, 0.0, 64.0, 36.0),
        SurfaceConfig::default(),
        Arc::new(scheduler),
    );
    let context = SoftwareContext::new(64, 36);
    surface.prepare_context(Box::new(context.clone())).unwrap();
    surface.attach_stream(Some(&stream));

    let mut source = TestPatternSource::spawn(&mixer, 32, 18).unwrap();
    mixer.start_running().unwrap();

    while surface.stats().frames_displayed < 10 {
        let id = timeout(Duration::from_secs(5), redraws.recv())
            .await
            .expect("producer stalled")
            .expect("scheduler closed");
        assert_eq!(id, surface.id());
        surface.display();
    }

    mixer.stop_running();
    source.stop();

    let stats = surface.stats();
    let ingress = mixer.video_io().ingress_stats();
    assert_eq!(stats.frames_received, ingress.frames_delivered);
    assert!(stats.frames_displayed + stats.frames_superseded <= stats.frames_received);
    assert!(source.frames_produced() >= 10);

    // Composites never go back in time
    let sequences: Vec<u64> = context.draws().iter().map(|d| d.frame_sequence).collect();
    assert!(sequences.windows(2).all(|pair| pair[0] <= pair[1]));

    // The last frame stays current after capture stops
    assert!(surface.current_frame().is_some());
}

#[tokio::test]
async fn test_source_idle_while_session_stopped() {
    let platform = Arc::new(VirtualCapturePlatform::new());
    let mixer = Mixer::new(platform);
    mixer.set_fps(60.0).unwrap();

    let mut source = TestPatternSource::spawn(&mixer, 8, 8).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.frames_produced(), 0);

    mixer.start_running().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    source.stop();

    assert!(source.frames_produced() > 0);
    // No drawable attached: everything is counted as dropped
    let ingress = mixer.video_io().ingress_stats();
    assert_eq!(ingress.frames_delivered, 0);
    assert_eq!(ingress.frames_dropped, source.frames_produced());
}
