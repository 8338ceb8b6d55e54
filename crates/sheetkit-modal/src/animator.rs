#![forbid(unsafe_code)]

//! Present/dismiss interpolation.
//!
//! A [`TransitionAnimator`] moves the sheet's presentation amount between
//! fully dismissed (`0`) and fully presented (`1`). It runs in one of two
//! modes:
//!
//! - **Timed**: a fixed-duration, fixed-curve interpolation advanced by
//!   [`tick`](TransitionAnimator::tick).
//! - **Interactive**: no clock; the amount follows whatever progress the
//!   tracker produces, via [`drive`](TransitionAnimator::drive). On release,
//!   [`hand_off`](TransitionAnimator::hand_off) switches to a timed finish
//!   whose duration is scaled by the remaining distance.
//!
//! # Invariants
//!
//! - The presentation amount is always in `[0, 1]`.
//! - Completion is signalled exactly once: the `tick`/`finish` call that
//!   reaches the end returns `Some(AnimationEnd)`, every later call returns
//!   `None`, and the optional completion callback fires once.
//! - A finished animator rests exactly on its target.
//!
//! # Failure Modes
//!
//! - Zero-duration animations finish on the next tick.
//! - Driving a timed or finished animator is ignored.

use std::fmt;

use web_time::Duration;

use crate::episode::{Direction, clamp_unit};
use crate::tracker::GestureDecision;
use crate::visual::Easing;

/// Remaining distance (in presentation amount) treated as already there.
const SETTLE_EPSILON: f64 = 1e-6;

/// Clock source of an animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorMode {
    Timed,
    Interactive,
}

/// Returned once, by the call that finishes the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEnd {
    /// True when the animator reached its direction's terminal value rather
    /// than unwinding to the origin.
    pub completed: bool,
}

/// Timing knobs for the post-release finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishTiming {
    /// Duration of a full-distance finish.
    pub base: Duration,
    /// Floor for any finish that still has distance to cover.
    pub minimum: Duration,
}

impl FinishTiming {
    /// Duration to cover `remaining` presentation amount.
    ///
    /// Starts from `base` scaled by `remaining`. When the release speed
    /// `speed` (points per second, towards the target) would cover the
    /// remaining points faster, that shorter time wins so the hand-off keeps
    /// the finger's speed. The result is floored at `minimum` and never
    /// exceeds `base`.
    pub fn duration_for(&self, remaining: f64, speed: f64, dismiss_distance: f64) -> Duration {
        if remaining <= SETTLE_EPSILON {
            return Duration::ZERO;
        }
        let base = self.base.as_secs_f64();
        let mut secs = base * remaining.min(1.0);
        if speed.is_finite() && speed > 0.0 && dismiss_distance > 0.0 {
            secs = secs.min(remaining * dismiss_distance / speed);
        }
        let secs = secs.max(self.minimum.as_secs_f64()).min(base);
        Duration::try_from_secs_f64(secs).unwrap_or(self.base)
    }
}

/// Performs the visual transition for one episode.
pub struct TransitionAnimator {
    direction: Direction,
    mode: AnimatorMode,
    from: f64,
    to: f64,
    current: f64,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
    /// Whether reaching `to` counts as completing the transition.
    completes: bool,
    finished: bool,
    on_complete: Option<Box<dyn FnOnce(AnimationEnd)>>,
}

impl fmt::Debug for TransitionAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionAnimator")
            .field("direction", &self.direction)
            .field("mode", &self.mode)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("current", &self.current)
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl TransitionAnimator {
    /// A clock-driven animator covering the whole distance in `direction`.
    pub fn timed(direction: Direction, duration: Duration, easing: Easing) -> Self {
        let from = direction.origin_presentation();
        Self {
            direction,
            mode: AnimatorMode::Timed,
            from,
            to: direction.terminal_presentation(),
            current: from,
            elapsed: Duration::ZERO,
            duration,
            easing,
            completes: true,
            finished: false,
            on_complete: None,
        }
    }

    /// A gesture-driven animator starting at presentation `start`.
    pub fn interactive(direction: Direction, start: f64) -> Self {
        let start = clamp_unit(start);
        Self {
            direction,
            mode: AnimatorMode::Interactive,
            from: start,
            to: direction.terminal_presentation(),
            current: start,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            easing: Easing::Linear,
            completes: true,
            finished: false,
            on_complete: None,
        }
    }

    /// Register a callback fired once when the animator finishes.
    pub fn with_completion(mut self, callback: impl FnOnce(AnimationEnd) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> AnimatorMode {
        self.mode
    }

    /// Current presentation amount.
    pub fn presentation(&self) -> f64 {
        self.current
    }

    /// Presentation amount the animator is heading to.
    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Follow a live presentation amount. Ignored unless interactive.
    pub fn drive(&mut self, presentation: f64) {
        if self.finished || self.mode != AnimatorMode::Interactive {
            return;
        }
        self.current = clamp_unit(presentation);
    }

    /// Switch from gesture-driven to a timed finish after release.
    ///
    /// `velocity_y` is the release velocity in points per second (+y moves
    /// the sheet down); only motion towards the target shortens the finish.
    pub fn hand_off(
        &mut self,
        decision: GestureDecision,
        velocity_y: f64,
        dismiss_distance: f64,
        timing: FinishTiming,
    ) {
        if self.finished {
            return;
        }
        let (to, completes) = match decision {
            GestureDecision::Complete => (self.direction.terminal_presentation(), true),
            GestureDecision::Cancel => (self.direction.origin_presentation(), false),
        };
        let remaining = (to - self.current).abs();
        // Downward motion lowers the presentation amount.
        let toward = (to - self.current) * -velocity_y > 0.0;
        let speed = if toward { velocity_y.abs() } else { 0.0 };

        self.mode = AnimatorMode::Timed;
        self.from = self.current;
        self.to = to;
        self.completes = completes;
        self.elapsed = Duration::ZERO;
        self.duration = timing.duration_for(remaining, speed, dismiss_distance);
        self.easing = Easing::EaseOut;
        tracing::debug!(
            from = self.from,
            to = self.to,
            duration_ms = self.duration.as_secs_f64() * 1000.0,
            completes,
            "animator handed off to clock"
        );
    }

    /// Advance a timed animation by `delta`.
    ///
    /// Returns `Some` exactly once, on the tick that reaches the target.
    pub fn tick(&mut self, delta: Duration) -> Option<AnimationEnd> {
        if self.finished || self.mode != AnimatorMode::Timed {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(delta);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
        };
        if t >= 1.0 {
            return self.finish();
        }
        let eased = self.easing.apply(t);
        self.current = clamp_unit(self.from + (self.to - self.from) * eased);
        None
    }

    /// Jump to the target and signal completion. Idempotent.
    pub fn finish(&mut self) -> Option<AnimationEnd> {
        if self.finished {
            return None;
        }
        self.current = self.to;
        self.finished = true;
        let end = AnimationEnd {
            completed: self.completes,
        };
        if let Some(callback) = self.on_complete.take() {
            callback(end);
        }
        Some(end)
    }

    /// Stop where the sheet currently is and count it as completed.
    ///
    /// Used when a drag interrupts a running presentation: the sheet is
    /// already on screen, so the presentation is considered done.
    pub fn settle_at_current(&mut self) -> Option<AnimationEnd> {
        if self.finished {
            return None;
        }
        self.to = self.current;
        self.completes = true;
        self.finish()
    }

    /// Unwind to the origin immediately without completing.
    pub fn abort(&mut self) -> Option<AnimationEnd> {
        if self.finished {
            return None;
        }
        self.to = self.direction.origin_presentation();
        self.completes = false;
        self.finish()
    }

    /// Continue from `presentation` after a layout change.
    ///
    /// A timed animation keeps its target and spends the remaining time on
    /// the rest of the way; an interactive one simply moves there.
    pub fn retarget_from(&mut self, presentation: f64) {
        if self.finished {
            return;
        }
        let presentation = clamp_unit(presentation);
        match self.mode {
            AnimatorMode::Interactive => self.current = presentation,
            AnimatorMode::Timed => {
                self.duration = self.duration.saturating_sub(self.elapsed);
                self.elapsed = Duration::ZERO;
                self.from = presentation;
                self.current = presentation;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn assert_ms(actual: Duration, expected_ms: f64) {
        let got = actual.as_secs_f64() * 1000.0;
        assert!((got - expected_ms).abs() < 1e-3, "{got}ms != {expected_ms}ms");
    }

    const TIMING: FinishTiming = FinishTiming {
        base: Duration::from_millis(300),
        minimum: Duration::from_millis(50),
    };

    #[test]
    fn timed_present_runs_zero_to_one() {
        let mut a = TransitionAnimator::timed(
            Direction::Presenting,
            Duration::from_millis(100),
            Easing::Linear,
        );
        assert_eq!(a.presentation(), 0.0);
        assert_eq!(a.tick(Duration::from_millis(50)), None);
        assert!((a.presentation() - 0.5).abs() < 1e-9);
        assert_eq!(
            a.tick(Duration::from_millis(50)),
            Some(AnimationEnd { completed: true })
        );
        assert_eq!(a.presentation(), 1.0);
        assert_eq!(a.tick(Duration::from_millis(50)), None);
    }

    #[test]
    fn timed_dismiss_runs_one_to_zero() {
        let mut a = TransitionAnimator::timed(
            Direction::Dismissing,
            Duration::from_millis(100),
            Easing::EaseIn,
        );
        assert_eq!(a.presentation(), 1.0);
        a.tick(Duration::from_millis(30));
        assert!(a.presentation() < 1.0 && a.presentation() > 0.0);
        assert!(a.tick(Duration::from_millis(100)).is_some());
        assert_eq!(a.presentation(), 0.0);
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let mut a =
            TransitionAnimator::timed(Direction::Presenting, Duration::ZERO, Easing::EaseOut);
        assert!(a.tick(Duration::ZERO).is_some());
        assert_eq!(a.presentation(), 1.0);
    }

    #[test]
    fn finish_is_idempotent_and_fires_once() {
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        let mut a = TransitionAnimator::timed(
            Direction::Dismissing,
            Duration::from_millis(200),
            Easing::Linear,
        )
        .with_completion(move |_| f.set(f.get() + 1));

        a.tick(Duration::from_millis(20));
        let first = a.finish();
        let state_after_first = a.presentation();
        let second = a.finish();

        assert_eq!(first, Some(AnimationEnd { completed: true }));
        assert_eq!(second, None);
        assert_eq!(a.presentation(), state_after_first);
        assert_eq!(a.presentation(), 0.0);
        assert_eq!(fired.get(), 1);
        assert!(a.abort().is_none());
        assert!(a.settle_at_current().is_none());
    }

    #[test]
    fn interactive_follows_drive_without_clock() {
        let mut a = TransitionAnimator::interactive(Direction::Dismissing, 1.0);
        a.drive(0.7);
        assert_eq!(a.presentation(), 0.7);
        assert_eq!(a.tick(Duration::from_secs(5)), None);
        assert_eq!(a.presentation(), 0.7);
        a.drive(1.4);
        assert_eq!(a.presentation(), 1.0);
    }

    #[test]
    fn hand_off_cancel_returns_to_origin() {
        let mut a = TransitionAnimator::interactive(Direction::Dismissing, 1.0);
        a.drive(0.8);
        a.hand_off(GestureDecision::Cancel, 0.0, 400.0, TIMING);
        assert_eq!(a.mode(), AnimatorMode::Timed);
        assert_eq!(a.target(), 1.0);
        // 0.2 of the distance at base 300ms.
        assert_ms(a.duration(), 60.0);
        let end = a.tick(Duration::from_millis(61));
        assert_eq!(end, Some(AnimationEnd { completed: false }));
        assert_eq!(a.presentation(), 1.0);
    }

    #[test]
    fn hand_off_complete_uses_fling_speed() {
        let mut a = TransitionAnimator::interactive(Direction::Dismissing, 1.0);
        a.drive(0.6);
        // 0.6 remaining of 400pt = 240pt at 2400pt/s = 100ms < 180ms scaled.
        a.hand_off(GestureDecision::Complete, 2400.0, 400.0, TIMING);
        assert_ms(a.duration(), 100.0);
        assert_eq!(a.target(), 0.0);
    }

    #[test]
    fn hand_off_ignores_velocity_away_from_target() {
        let mut a = TransitionAnimator::interactive(Direction::Dismissing, 1.0);
        a.drive(0.6);
        a.hand_off(GestureDecision::Complete, -2400.0, 400.0, TIMING);
        assert_ms(a.duration(), 180.0);
    }

    #[test]
    fn finish_duration_floors_and_zeroes() {
        assert_eq!(TIMING.duration_for(0.0, 0.0, 400.0), Duration::ZERO);
        assert_ms(TIMING.duration_for(0.01, 0.0, 400.0), 50.0);
        assert_ms(TIMING.duration_for(0.5, 1e9, 400.0), 50.0);
        assert_ms(TIMING.duration_for(1.0, 0.0, 400.0), 300.0);
    }

    #[test]
    fn eased_finish_is_continuous_at_hand_off() {
        let mut a = TransitionAnimator::interactive(Direction::Dismissing, 1.0);
        a.drive(0.5);
        a.hand_off(GestureDecision::Complete, 0.0, 400.0, TIMING);
        a.tick(Duration::from_millis(1));
        let p = a.presentation();
        assert!(p < 0.5 && p > 0.45, "{p}");
    }

    #[test]
    fn abort_unwinds_without_completing() {
        let mut a = TransitionAnimator::timed(
            Direction::Presenting,
            Duration::from_millis(200),
            Easing::Linear,
        );
        a.tick(Duration::from_millis(100));
        assert_eq!(a.abort(), Some(AnimationEnd { completed: false }));
        assert_eq!(a.presentation(), 0.0);
    }

    #[test]
    fn settle_keeps_position() {
        let mut a = TransitionAnimator::timed(
            Direction::Presenting,
            Duration::from_millis(200),
            Easing::Linear,
        );
        a.tick(Duration::from_millis(100));
        let p = a.presentation();
        assert_eq!(a.settle_at_current(), Some(AnimationEnd { completed: true }));
        assert_eq!(a.presentation(), p);
    }

    #[test]
    fn retarget_keeps_remaining_time() {
        let mut a = TransitionAnimator::timed(
            Direction::Presenting,
            Duration::from_millis(200),
            Easing::Linear,
        );
        a.tick(Duration::from_millis(50));
        a.retarget_from(0.3);
        assert_eq!(a.presentation(), 0.3);
        assert_eq!(a.duration(), Duration::from_millis(150));
        assert!(a.tick(Duration::from_millis(150)).is_some());
        assert_eq!(a.presentation(), 1.0);
    }
}
