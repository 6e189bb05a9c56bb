//! Fit properties across gravity modes
//!
//! These tests sweep a spread of source and viewport shapes and check the
//! containment, aspect and centering guarantees of each gravity mode.

use livecast_core::*;

const EPSILON: f64 = 1e-6;

fn sources() -> Vec<Rect> {
    vec![
        Rect::new(0.0, 0.0, 1920.0, 1080.0),
        Rect::new(0.0, 0.0, 1080.0, 1920.0),
        Rect::new(0.0, 0.0, 640.0, 480.0),
        Rect::new(12.0, 34.0, 352.0, 288.0),
        Rect::new(0.0, 0.0, 1.0, 1.0),
    ]
}

fn viewports() -> Vec<Rect> {
    vec![
        Rect::new(0.0, 0.0, 400.0, 400.0),
        Rect::new(0.0, 0.0, 1280.0, 720.0),
        Rect::new(-1.0, -1.0, 302.0, 802.0),
        Rect::new(50.0, 25.0, 3.0, 1000.0),
    ]
}

fn aspect(rect: &Rect) -> f64 {
    rect.width() / rect.height()
}

fn assert_same_center(a: &Rect, b: &Rect) {
    let (ca, cb) = (a.center(), b.center());
    assert!((ca.x - cb.x).abs() < EPSILON, "{a:?} vs {b:?}");
    assert!((ca.y - cb.y).abs() < EPSILON, "{a:?} vs {b:?}");
}

#[test]
fn test_resize_aspect_properties() {
    for src in sources() {
        for dst in viewports() {
            let fit = VideoGravity::ResizeAspect.fit(dst, src);

            assert_eq!(fit.src, src);
            assert!((aspect(&fit.dst) - aspect(&src)).abs() < EPSILON);
            assert!(dst.contains_rect(&fit.dst, EPSILON));
            assert_same_center(&fit.dst, &dst);
            // One dimension always touches the viewport edges
            assert!(
                (fit.dst.width() - dst.width()).abs() < EPSILON
                    || (fit.dst.height() - dst.height()).abs() < EPSILON
            );
        }
    }
}

#[test]
fn test_resize_aspect_fill_properties() {
    for src in sources() {
        for dst in viewports() {
            let fit = VideoGravity::ResizeAspectFill.fit(dst, src);

            assert_eq!(fit.dst, dst);
            assert!((aspect(&fit.src) - aspect(&dst)).abs() < EPSILON);
            assert!(src.contains_rect(&fit.src, EPSILON));
            assert_same_center(&fit.src, &src);
        }
    }
}

#[test]
fn test_resize_properties() {
    for src in sources() {
        for dst in viewports() {
            let fit = VideoGravity::Resize.fit(dst, src);
            assert_eq!(fit, FitRects { dst, src });
        }
    }
}

#[test]
fn test_full_hd_into_square_scenarios() {
    let src = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    let dst = Rect::new(0.0, 0.0, 400.0, 400.0);

    let letterbox = VideoGravity::ResizeAspect.fit(dst, src);
    assert!(letterbox
        .dst
        .approx_eq(&Rect::new(0.0, 87.5, 400.0, 225.0), EPSILON));
    assert_eq!(letterbox.src, src);

    let crop = VideoGravity::ResizeAspectFill.fit(dst, src);
    assert!(crop
        .src
        .approx_eq(&Rect::new(420.0, 0.0, 1080.0, 1080.0), EPSILON));
    assert_eq!(crop.dst, dst);
}

#[test]
fn test_fit_is_deterministic() {
    let src = Rect::new(0.0, 0.0, 1280.0, 720.0);
    let dst = Rect::new(3.0, 7.0, 333.0, 777.0);
    let first = VideoGravity::ResizeAspectFill.fit(dst, src);
    for _ in 0..10 {
        assert_eq!(VideoGravity::ResizeAspectFill.fit(dst, src), first);
    }
}
