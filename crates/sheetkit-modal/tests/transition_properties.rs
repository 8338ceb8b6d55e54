//! Property tests for the progress mapping, completion rule, and coordinator
//! lifecycle guarantees.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use sheetkit_core::{Duration, EdgeInsets, GestureSample, Rect};
use sheetkit_modal::visual::{backdrop_opacity, content_offset};
use sheetkit_modal::{
    Direction, Easing, GestureDecision, HostContext, Phase, Rejection, ScreenId, SheetConfig,
    TransitionAnimator, TransitionCoordinator, decide,
};

fn host(content_height: f64) -> HostContext {
    HostContext {
        presenting: ScreenId::new(1),
        container: Rect::new(0.0, 0.0, 400.0, 1000.0),
        safe_area: EdgeInsets::bottom(40.0),
        content_height,
    }
}

fn presented() -> TransitionCoordinator {
    let mut sheet = TransitionCoordinator::new(SheetConfig::default(), host(360.0)).unwrap();
    sheet.begin_presenting(None).unwrap();
    while sheet.tick(Duration::from_millis(16)).is_none() {}
    sheet
}

#[test]
fn completion_rule_examples() {
    assert_eq!(decide(0.6, 0.0, 0.5, 1000.0), GestureDecision::Complete);
    assert_eq!(decide(0.3, 2000.0, 0.5, 1000.0), GestureDecision::Complete);
    assert_eq!(decide(0.3, 0.0, 0.5, 1000.0), GestureDecision::Cancel);
    // Boundaries: exactly at the threshold cancels, exactly at the fling
    // velocity completes.
    assert_eq!(decide(0.5, 0.0, 0.5, 1000.0), GestureDecision::Cancel);
    assert_eq!(decide(0.0, 1000.0, 0.5, 1000.0), GestureDecision::Complete);
}

proptest! {
    /// Backdrop opacity rises and content offset falls with presentation.
    #[test]
    fn visual_mapping_is_monotonic(
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
        full in 0.0f64..=1.0,
        distance in 1.0f64..2000.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(backdrop_opacity(lo, full) <= backdrop_opacity(hi, full));
        prop_assert!(content_offset(lo, distance) >= content_offset(hi, distance));
        prop_assert_eq!(backdrop_opacity(0.0, full), 0.0);
        prop_assert_eq!(backdrop_opacity(1.0, full), full);
        prop_assert_eq!(content_offset(0.0, distance), distance);
        prop_assert_eq!(content_offset(1.0, distance), 0.0);
    }

    /// Every easing stays inside [0, 1] and never reverses.
    #[test]
    fn easings_are_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseIn, Easing::EaseInOut] {
            let (y0, y1) = (easing.apply(lo), easing.apply(hi));
            prop_assert!((0.0..=1.0).contains(&y0));
            prop_assert!(y0 <= y1 + 1e-12, "{:?}: {} > {}", easing, y0, y1);
        }
    }

    #[test]
    fn completion_rule_matches_definition(
        progress in 0.0f64..=1.0,
        velocity in -5000.0f64..5000.0,
        threshold in 0.01f64..0.99,
    ) {
        let expected = if progress > threshold || velocity >= 1000.0 {
            GestureDecision::Complete
        } else {
            GestureDecision::Cancel
        };
        prop_assert_eq!(decide(progress, velocity, threshold, 1000.0), expected);
    }

    /// A second gesture begin while tracking changes nothing.
    #[test]
    fn second_begin_is_a_no_op(dy in 0.0f64..400.0, again in -100.0f64..100.0) {
        let mut sheet = presented();
        sheet.gesture_began(&GestureSample::vertical_now(0.0, 0.0)).unwrap();
        sheet.gesture_changed(&GestureSample::vertical_now(dy, 0.0));
        let progress = sheet.tracker().progress();
        let visual = sheet.visual_state();

        prop_assert_eq!(
            sheet.gesture_began(&GestureSample::vertical_now(again, 0.0)),
            Err(Rejection::Busy(Phase::Tracking))
        );
        prop_assert_eq!(sheet.tracker().progress(), progress);
        prop_assert_eq!(sheet.visual_state(), visual);
    }

    /// Finishing twice lands on the same state and fires the callback once.
    #[test]
    fn double_finish_fires_once(elapsed_ms in 0u64..400, presenting in any::<bool>()) {
        let direction = if presenting { Direction::Presenting } else { Direction::Dismissing };
        let fired = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fired);
        let mut animator =
            TransitionAnimator::timed(direction, Duration::from_millis(300), Easing::EaseOut)
                .with_completion(move |_| f.set(f.get() + 1));

        animator.tick(Duration::from_millis(elapsed_ms));
        animator.finish();
        let first = animator.presentation();
        animator.finish();

        prop_assert_eq!(animator.presentation(), first);
        prop_assert_eq!(first, direction.terminal_presentation());
        prop_assert_eq!(fired.get(), 1);
    }

    /// Forced cancellation mid-drag reaches idle on the next tick and
    /// restores the dismissal progress to zero.
    #[test]
    fn forced_cancel_finishes_within_one_tick(
        samples in prop::collection::vec((0.0f64..600.0, -3000.0f64..3000.0), 1..20),
        teardown in any::<bool>(),
    ) {
        let mut sheet = presented();
        sheet.gesture_began(&GestureSample::vertical_now(0.0, 0.0)).unwrap();
        for (dy, vy) in samples {
            sheet.gesture_changed(&GestureSample::vertical_now(dy, vy));
        }
        if teardown {
            sheet.presented_screen_torn_down();
        } else {
            prop_assert!(sheet.request_cancel());
        }

        let outcome = sheet.tick(Duration::ZERO);
        prop_assert!(outcome.is_some_and(|o| !o.completed));
        prop_assert_eq!(sheet.phase(), Phase::Idle);
        prop_assert_eq!(sheet.tracker().progress(), 0.0);
        prop_assert_eq!(sheet.is_presented(), !teardown);
    }

    /// A layout change mid-drag keeps the sheet where it was on screen.
    #[test]
    fn resize_keeps_pixel_offset(dy in 0.0f64..400.0, new_height in 50.0f64..800.0) {
        let mut sheet = presented();
        sheet.gesture_began(&GestureSample::vertical_now(0.0, 0.0)).unwrap();
        sheet.gesture_changed(&GestureSample::vertical_now(dy, 0.0));
        let before = sheet.visual_state().content_offset;

        let outcome = sheet.set_preferred_content_height(new_height);
        let after = sheet.visual_state().content_offset;
        prop_assert!((after - before.min(outcome.new_distance)).abs() < 1e-6);
        prop_assert_eq!(sheet.phase(), Phase::Tracking);
    }

    /// Any sequence of host inputs leaves a path back to idle.
    #[test]
    fn arbitrary_inputs_return_to_idle(ops in prop::collection::vec(0u8..9, 0..40)) {
        let mut sheet = TransitionCoordinator::new(SheetConfig::default(), host(300.0)).unwrap();
        let mut ty = 0.0;
        for op in ops {
            match op {
                0 => { let _ = sheet.begin_presenting(None); }
                1 => { let _ = sheet.begin_dismissing(None); }
                2 => { ty = 0.0; let _ = sheet.gesture_began(&GestureSample::vertical_now(0.0, 0.0)); }
                3 => { ty += 40.0; sheet.gesture_changed(&GestureSample::vertical_now(ty, 200.0)); }
                4 => { sheet.gesture_ended(&GestureSample::vertical_now(ty, 0.0)); }
                5 => { sheet.tick(Duration::from_millis(16)); }
                6 => { sheet.request_cancel(); }
                7 => { let _ = sheet.backdrop_tapped(); }
                _ => { sheet.set_preferred_content_height(200.0 + ty); }
            }
        }
        sheet.gesture_cancelled();
        for _ in 0..200 {
            if sheet.phase() == Phase::Idle {
                break;
            }
            sheet.tick(Duration::from_millis(16));
        }
        prop_assert_eq!(sheet.phase(), Phase::Idle);
        let p = sheet.visual_state().presentation;
        prop_assert!(p == 0.0 || p == 1.0, "resting presentation {}", p);
    }
}
