//! Live Preview Demo
//!
//! A virtual camera produces color bars at 60 Hz while this thread acts as the
//! host UI loop: it waits for redraw requests from the surface and services
//! them into a software framebuffer.

use anyhow::Context;
use livecast::{
    logging, ChannelScheduler, DeviceOrientation, DevicePosition, GlobalConfig, Livecast,
    OrientationCenter, Rect, SessionPreset, Size, SoftwareContext, SurfaceEvent,
    TestPatternSource, VideoGravity,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::timeout;

const FRAMES_TO_SHOW: u64 = 120;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = GlobalConfig::default();
    logging::init(config.log_directive())?;

    println!("🎥 livecast Live Preview Demo");
    println!("=============================");

    let orientation = Arc::new(OrientationCenter::with_orientation(
        DeviceOrientation::Portrait,
    ));
    let livecast = Livecast::init_with(config)?.with_orientation_source(orientation.clone());

    // Stream: back camera at 60 fps, following device rotation
    let stream = livecast
        .stream()
        .camera(DevicePosition::Back)
        .session_preset(SessionPreset::Hd1280x720)
        .fps(60.0)
        .sync_orientation()
        .start()?;
    println!("📹 Started {} at {} fps", stream.id(), stream.mixer().fps());

    // Surface owned by this thread
    let (scheduler, mut redraws) = ChannelScheduler::new();
    let surface = livecast.surface(Rect::new(0.0, 0.0, 320.0, 320.0), Arc::new(scheduler));
    let context = SoftwareContext::new(320, 320);
    surface.prepare_context(Box::new(context.clone()))?;
    surface.attach_stream(Some(&stream));
    let mut events = surface.subscribe();

    let mut source = TestPatternSource::spawn(stream.mixer(), 128, 72)?;

    while surface.stats().frames_displayed < FRAMES_TO_SHOW {
        timeout(Duration::from_secs(2), redraws.recv())
            .await
            .context("no redraw request within 2s")?
            .context("redraw scheduler closed")?;
        surface.display();

        match surface.stats().frames_displayed {
            40 => {
                println!("🔄 Rotating device to landscape");
                orientation.post(DeviceOrientation::LandscapeLeft);
                surface.set_video_gravity(VideoGravity::ResizeAspectFill);
            }
            80 => {
                println!("📐 Resizing surface to 480x270");
                surface.reshape(Size::new(480.0, 270.0));
                surface.set_video_gravity(VideoGravity::ResizeAspect);
            }
            _ => {}
        }
    }

    stream.mixer().stop_running();
    source.stop();
    surface.attach_stream(None);

    let mut detached = 0;
    loop {
        match events.try_recv() {
            Ok(SurfaceEvent::StreamDetached { .. }) => detached += 1,
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    let stats = surface.stats();
    println!("\n📊 Presentation stats");
    println!("   • Frames produced:   {}", source.frames_produced());
    println!("   • Frames received:   {}", stats.frames_received);
    println!("   • Frames displayed:  {}", stats.frames_displayed);
    println!("   • Frames superseded: {}", stats.frames_superseded);
    println!("   • Capture orientation: {:?}", stream.mixer().orientation());
    println!("   • Detach events: {}", detached);
    if let Some(px) = context.pixel(240, 135) {
        println!("   • Center pixel: {:?}", px);
    }

    println!("\n✨ Live preview demo completed!");
    Ok(())
}
