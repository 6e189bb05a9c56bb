//! Integration tests for the livecast entry point and stream builder

use livecast::*;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn surface_for(livecast: &Livecast) -> (Arc<RenderSurface>, SoftwareContext) {
    let (scheduler, _rx) = ChannelScheduler::new();
    let surface = livecast.surface(Rect::new(0.0, 0.0, 32.0, 32.0), Arc::new(scheduler));
    let context = SoftwareContext::new(32, 32);
    assert_ok!(surface.prepare_context(Box::new(context.clone())));
    (surface, context)
}

#[tokio::test]
async fn test_builder_applies_settings_and_devices() {
    let livecast = assert_ok!(Livecast::init());
    let stream = assert_ok!(livecast
        .stream()
        .camera(DevicePosition::Back)
        .microphone()
        .session_preset(SessionPreset::Hd1280x720)
        .fps(24.0)
        .build());

    let mixer = stream.mixer();
    assert_eq!(mixer.session_preset(), SessionPreset::Hd1280x720);
    assert_eq!(mixer.fps(), 24.0);
    assert_eq!(
        mixer.video_io().camera().map(|device| device.localized_name),
        Some("Back Camera".to_string())
    );
    assert!(mixer.audio_io().microphone().is_some());
    assert!(!mixer.is_running());
}

#[tokio::test]
async fn test_config_defaults_reach_mixer() {
    let config = assert_ok!(GlobalConfig::from_json(
        r#"{ "mixer": { "fps": 15, "continuousAutofocus": true } }"#
    ));
    let livecast = assert_ok!(Livecast::init_with(config));

    // Builder values override configured defaults
    let stream = assert_ok!(livecast.stream().fps(60.0).start());
    let mixer = stream.mixer();
    assert_eq!(mixer.fps(), 60.0);
    assert!(mixer.continuous_autofocus());
    assert!(mixer.is_running());
}

#[tokio::test]
async fn test_missing_camera_is_reported() {
    let platform = Arc::new(VirtualCapturePlatform::with_devices(Vec::new()));
    let livecast = assert_ok!(Livecast::with_platform(GlobalConfig::default(), platform));

    let error = assert_err!(livecast.stream().camera(DevicePosition::Front).build());
    assert!(matches!(error, LivecastError::DeviceNotFound { .. }));
    assert!(error.is_recoverable());

    let error = assert_err!(livecast.stream().camera_named("Studio").build());
    assert!(matches!(error, LivecastError::DeviceNotFound { .. }));
}

#[tokio::test]
async fn test_platform_rejection_surfaces_as_media_error() {
    let platform = Arc::new(VirtualCapturePlatform::new());
    platform.limit_frame_rate(30.0);
    let livecast = assert_ok!(Livecast::with_platform(GlobalConfig::default(), platform));

    let error = assert_err!(livecast.stream().fps(120.0).build());
    assert!(matches!(
        error,
        LivecastError::Media(MediaError::ConfigurationRejected { .. })
    ));
}

#[tokio::test]
async fn test_orientation_sync_needs_source() {
    let livecast = assert_ok!(Livecast::init());
    let error = assert_err!(livecast.stream().sync_orientation().build());
    assert!(matches!(
        error,
        LivecastError::Media(MediaError::UnsupportedPlatform { .. })
    ));

    let center = Arc::new(OrientationCenter::new());
    let livecast = livecast.with_orientation_source(center.clone());
    let stream = assert_ok!(livecast.stream().sync_orientation().build());
    assert!(stream.mixer().sync_orientation());

    center.post(DeviceOrientation::LandscapeLeft);
    assert_eq!(
        stream.mixer().orientation(),
        VideoOrientation::LandscapeRight
    );
}

#[tokio::test]
async fn test_surface_uses_configured_gravity() {
    let mut config = GlobalConfig::default();
    config.surface.gravity = VideoGravity::Resize;
    let livecast = assert_ok!(Livecast::init_with(config));
    let (surface, context) = surface_for(&livecast);

    let stream = assert_ok!(livecast.stream().build());
    surface.attach_stream(Some(&stream));
    stream.mixer().video_io().append_frame(Arc::new(Frame::solid(
        1,
        16,
        9,
        PixelFormat::Bgra32,
        [0, 255, 0, 255],
    )));
    assert!(surface.display());

    let draws = context.draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].in_rect, Rect::new(0.0, 0.0, 32.0, 32.0));
    assert_eq!(context.pixel(0, 0), Some([0, 255, 0, 255]));
}
