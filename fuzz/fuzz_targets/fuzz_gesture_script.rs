//! Fuzz target for the sheet coordinator's host-facing state machine.
//!
//! # Strategy
//!
//! - Arbitrary interleavings of present/dismiss requests, drag samples,
//!   ticks, cancels, teardowns, taps, and layout changes
//! - Raw `f64` inputs, including NaN, infinities, and huge values
//!
//! # Invariants
//!
//! - Nothing panics
//! - The presentation amount stays in `[0, 1]` after every input
//! - Finishing the current drag and ticking always returns to idle, with
//!   the sheet resting fully presented or fully dismissed

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sheetkit_core::{Duration, EdgeInsets, GestureSample, Point, Rect};
use sheetkit_modal::{HostContext, Phase, ScreenId, SheetConfig, TransitionCoordinator};

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Present,
    Dismiss,
    Began { ty: f64, vy: f64 },
    Changed { ty: f64, vy: f64 },
    Ended { ty: f64, vy: f64 },
    GestureCancelled,
    Tick { ms: u16 },
    RequestCancel,
    TearDown,
    Tap { x: f64, y: f64 },
    Escape,
    Resize { width: f64, height: f64, bottom: f64 },
    ContentHeight(f64),
}

#[derive(Debug, Arbitrary)]
struct Script {
    reduced_motion: bool,
    content_height: u16,
    ops: Vec<Op>,
}

fuzz_target!(|script: Script| {
    let config = SheetConfig::default().reduced_motion(script.reduced_motion);
    let host = HostContext {
        presenting: ScreenId::new(1),
        container: Rect::new(0.0, 0.0, 390.0, 844.0),
        safe_area: EdgeInsets::bottom(34.0),
        content_height: f64::from(script.content_height),
    };
    let Ok(mut sheet) = TransitionCoordinator::new(config, host) else {
        return;
    };

    for op in script.ops {
        match op {
            Op::Present => {
                let _ = sheet.begin_presenting(None);
            }
            Op::Dismiss => {
                let _ = sheet.begin_dismissing(None);
            }
            Op::Began { ty, vy } => {
                let _ = sheet.gesture_began(&GestureSample::vertical_now(ty, vy));
            }
            Op::Changed { ty, vy } => {
                sheet.gesture_changed(&GestureSample::vertical_now(ty, vy));
            }
            Op::Ended { ty, vy } => {
                sheet.gesture_ended(&GestureSample::vertical_now(ty, vy));
            }
            Op::GestureCancelled => {
                sheet.gesture_cancelled();
            }
            Op::Tick { ms } => {
                sheet.tick(Duration::from_millis(u64::from(ms)));
            }
            Op::RequestCancel => {
                sheet.request_cancel();
            }
            Op::TearDown => sheet.presented_screen_torn_down(),
            Op::Tap { x, y } => {
                let _ = sheet.tap(Point::new(x, y));
            }
            Op::Escape => {
                let _ = sheet.accessibility_escape();
            }
            Op::Resize {
                width,
                height,
                bottom,
            } => {
                sheet.container_size_changed(
                    Rect::new(0.0, 0.0, width, height),
                    EdgeInsets::bottom(bottom),
                );
            }
            Op::ContentHeight(height) => {
                sheet.set_preferred_content_height(height);
            }
        }
        let p = sheet.visual_state().presentation;
        assert!((0.0..=1.0).contains(&p), "presentation {p} out of range");
    }

    sheet.gesture_cancelled();
    for _ in 0..1_000 {
        if sheet.phase() == Phase::Idle {
            break;
        }
        sheet.tick(Duration::from_millis(16));
    }
    assert_eq!(sheet.phase(), Phase::Idle, "stuck: {sheet:?}");
    let p = sheet.visual_state().presentation;
    assert!(p == 0.0 || p == 1.0, "resting presentation {p}");
});
