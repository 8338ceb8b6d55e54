#![forbid(unsafe_code)]

//! Drag-to-dismiss interaction tracker.
//!
//! Turns the [`GestureSample`]s of one drag into a dismissal *fraction
//! complete* and decides, on release, whether the dismissal completes.
//!
//! # State machine
//!
//! ```text
//! Idle ─begin─► Tracking ─end─► Completing | Cancelling ─reset─► Idle
//!                  └──force_cancel──► Cancelling
//! ```
//!
//! # Invariants
//!
//! - `progress` is always in `[0, 1]`.
//! - `begin` while not idle is rejected and changes nothing.
//! - The finger and the sheet stay locked: a sample `dy` points further down
//!   moves the sheet `dy` points further down (until clamped), including
//!   after a resize.
//!
//! # Completion rule
//!
//! A released drag completes when `progress > completion_threshold` **or**
//! `velocity.y >= minimum_fling_velocity`. A slow drag past the threshold
//! completes, and so does a fast short flick.

use sheetkit_core::GestureSample;

use crate::config::SheetConfig;
use crate::episode::{Phase, ScreenId, clamp_unit};
use crate::error::Rejection;

/// Outcome of a released drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureDecision {
    /// Finish the dismissal.
    Complete,
    /// Return the sheet to its presented position.
    Cancel,
}

/// Completion rule shared by the tracker and callers that want to preview it.
#[inline]
pub fn decide(
    progress: f64,
    velocity_y: f64,
    completion_threshold: f64,
    minimum_fling_velocity: f64,
) -> GestureDecision {
    if progress > completion_threshold || velocity_y >= minimum_fling_velocity {
        GestureDecision::Complete
    } else {
        GestureDecision::Cancel
    }
}

/// Snapshot emitted for each accepted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerUpdate {
    /// Dismissal fraction complete in `[0, 1]`.
    pub progress: f64,
    /// Vertical velocity in points per second (+y is the dismiss direction).
    pub velocity: f64,
    pub phase: Phase,
}

/// Converts one drag gesture into dismissal progress.
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    presenting: ScreenId,
    completion_threshold: f64,
    minimum_fling_velocity: f64,
    dismiss_distance: f64,
    phase: Phase,
    /// Points added to the sample translation: the pass-through offset a
    /// drag started from, rebased on resize.
    origin: f64,
    last_translation: f64,
    progress: f64,
    velocity: f64,
    samples: u64,
}

impl InteractionTracker {
    pub fn new(presenting: ScreenId, config: &SheetConfig, dismiss_distance: f64) -> Self {
        Self {
            presenting,
            completion_threshold: config.completion_threshold,
            minimum_fling_velocity: config.minimum_fling_velocity,
            dismiss_distance: sanitize_distance(dismiss_distance),
            phase: Phase::Idle,
            origin: 0.0,
            last_translation: 0.0,
            progress: 0.0,
            velocity: 0.0,
            samples: 0,
        }
    }

    /// Handle of the screen that presented the sheet.
    pub fn presenting_screen(&self) -> ScreenId {
        self.presenting
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a live drag drives progress.
    pub fn is_in_progress(&self) -> bool {
        self.phase == Phase::Tracking
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn dismiss_distance(&self) -> f64 {
        self.dismiss_distance
    }

    /// Samples accepted since the last `begin`.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Start tracking a new drag at `start_progress` (0 for a plain dismiss
    /// drag, or the pass-through value of an interrupted animation).
    pub fn begin(
        &mut self,
        sample: &GestureSample,
        start_progress: f64,
    ) -> Result<TrackerUpdate, Rejection> {
        if self.phase != Phase::Idle {
            tracing::debug!(phase = %self.phase, "rejected gesture begin");
            return Err(Rejection::Busy(self.phase));
        }

        let start = clamp_unit(start_progress);
        self.origin = start * self.dismiss_distance;
        self.last_translation = sample.translation_y();
        self.progress = start;
        self.velocity = sample.velocity_y();
        self.samples = 1;
        self.phase = Phase::Tracking;

        tracing::debug!(
            screen = self.presenting.get(),
            start,
            distance = self.dismiss_distance,
            "gesture tracking began"
        );
        Ok(self.snapshot())
    }

    /// Feed one in-flight sample. Ignored unless tracking.
    pub fn update(&mut self, sample: &GestureSample) -> Option<TrackerUpdate> {
        if self.phase != Phase::Tracking {
            tracing::trace!(phase = %self.phase, "ignored gesture sample");
            return None;
        }
        self.apply(sample);
        tracing::trace!(progress = self.progress, velocity = self.velocity, "gesture sample");
        Some(self.snapshot())
    }

    /// Release the drag with its final sample and decide the outcome.
    pub fn end(&mut self, sample: &GestureSample) -> Option<(GestureDecision, TrackerUpdate)> {
        if self.phase != Phase::Tracking {
            tracing::trace!(phase = %self.phase, "ignored gesture end");
            return None;
        }
        self.apply(sample);

        let decision = decide(
            self.progress,
            self.velocity,
            self.completion_threshold,
            self.minimum_fling_velocity,
        );
        self.phase = match decision {
            GestureDecision::Complete => Phase::Completing,
            GestureDecision::Cancel => Phase::Cancelling,
        };
        tracing::debug!(
            progress = self.progress,
            velocity = self.velocity,
            ?decision,
            "gesture released"
        );
        Some((decision, self.snapshot()))
    }

    /// Force the drag into `Cancelling` and return a final snapshot.
    ///
    /// Returns `None` when no drag is being tracked.
    pub fn force_cancel(&mut self) -> Option<TrackerUpdate> {
        if self.phase != Phase::Tracking {
            return None;
        }
        self.phase = Phase::Cancelling;
        tracing::debug!(progress = self.progress, "gesture force-cancelled");
        Some(self.snapshot())
    }

    /// Change the travel distance, keeping the sheet's pixel offset fixed.
    ///
    /// Returns the re-clamped progress. Non-positive or non-finite distances
    /// are ignored.
    pub fn set_dismiss_distance(&mut self, distance: f64) -> f64 {
        if !(distance.is_finite() && distance > 0.0) {
            tracing::debug!(distance, "ignored invalid dismiss distance");
            return self.progress;
        }
        let offset = self.progress * self.dismiss_distance;
        self.dismiss_distance = distance;
        self.progress = clamp_unit(offset / distance);
        // Rebase so the next sample continues from the (possibly clamped)
        // position instead of jumping.
        self.origin = self.progress * distance - self.last_translation;
        self.progress
    }

    /// Return to `Idle` after the owning episode finished.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.origin = 0.0;
        self.last_translation = 0.0;
        self.progress = 0.0;
        self.velocity = 0.0;
        self.samples = 0;
    }

    /// Preview the completion rule at the current state.
    pub fn decision_preview(&self) -> GestureDecision {
        decide(
            self.progress,
            self.velocity,
            self.completion_threshold,
            self.minimum_fling_velocity,
        )
    }

    fn apply(&mut self, sample: &GestureSample) {
        let ty = sample.translation_y();
        self.last_translation = ty;
        self.velocity = sample.velocity_y();
        self.progress = clamp_unit((self.origin + ty) / self.dismiss_distance);
        self.samples += 1;
    }

    fn snapshot(&self) -> TrackerUpdate {
        TrackerUpdate {
            progress: self.progress,
            velocity: self.velocity,
            phase: self.phase,
        }
    }
}

/// Degenerate layouts (zero-height content) still need a finite divisor.
fn sanitize_distance(distance: f64) -> f64 {
    if distance.is_finite() && distance > 0.0 {
        distance
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> InteractionTracker {
        InteractionTracker::new(ScreenId::new(7), &SheetConfig::default(), 400.0)
    }

    fn sample(ty: f64, vy: f64) -> GestureSample {
        GestureSample::vertical_now(ty, vy)
    }

    #[test]
    fn completion_rule_examples() {
        assert_eq!(decide(0.6, 0.0, 0.5, 1000.0), GestureDecision::Complete);
        assert_eq!(decide(0.3, 2000.0, 0.5, 1000.0), GestureDecision::Complete);
        assert_eq!(decide(0.3, 0.0, 0.5, 1000.0), GestureDecision::Cancel);
        // Exactly at the threshold is not past it.
        assert_eq!(decide(0.5, 0.0, 0.5, 1000.0), GestureDecision::Cancel);
        // Exactly at the fling velocity completes.
        assert_eq!(decide(0.1, 1000.0, 0.5, 1000.0), GestureDecision::Complete);
        // Upward flings never complete a short drag.
        assert_eq!(decide(0.3, -5000.0, 0.5, 1000.0), GestureDecision::Cancel);
    }

    #[test]
    fn progress_follows_translation() {
        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        assert_eq!(t.update(&sample(100.0, 50.0)).unwrap().progress, 0.25);
        assert_eq!(t.update(&sample(-40.0, -50.0)).unwrap().progress, 0.0);
        assert_eq!(t.update(&sample(1000.0, 50.0)).unwrap().progress, 1.0);
        assert_eq!(t.sample_count(), 4);
    }

    #[test]
    fn progress_follows_raw_translation() {
        let mut t = tracker();
        // Recognizer slop on the first sample is not subtracted later.
        let first = t.begin(&sample(12.0, 300.0), 0.0).unwrap();
        assert_eq!(first.progress, 0.0);
        let next = t.update(&sample(52.0, 300.0)).unwrap();
        assert!((next.progress - 52.0 / 400.0).abs() < 1e-12);
    }

    #[test]
    fn pass_through_start_value() {
        let mut t = tracker();
        let first = t.begin(&sample(0.0, 0.0), 0.3).unwrap();
        assert_eq!(first.progress, 0.3);
        let next = t.update(&sample(40.0, 0.0)).unwrap();
        assert!((next.progress - 0.4).abs() < 1e-12);
    }

    #[test]
    fn second_begin_is_rejected_without_side_effects() {
        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        t.update(&sample(120.0, 0.0));
        let before = t.progress();
        assert_eq!(
            t.begin(&sample(0.0, 0.0), 0.0),
            Err(Rejection::Busy(Phase::Tracking))
        );
        assert_eq!(t.progress(), before);
        assert_eq!(t.phase(), Phase::Tracking);
    }

    #[test]
    fn end_decides_and_stops_tracking() {
        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        let (decision, update) = t.end(&sample(240.0, 0.0)).unwrap();
        assert_eq!(decision, GestureDecision::Complete);
        assert_eq!(update.phase, Phase::Completing);
        assert!(t.update(&sample(300.0, 0.0)).is_none());
        assert!(t.end(&sample(300.0, 0.0)).is_none());

        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        let (decision, _) = t.end(&sample(120.0, 2000.0)).unwrap();
        assert_eq!(decision, GestureDecision::Complete);

        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        let (decision, update) = t.end(&sample(120.0, 0.0)).unwrap();
        assert_eq!(decision, GestureDecision::Cancel);
        assert_eq!(update.phase, Phase::Cancelling);
    }

    #[test]
    fn force_cancel_only_while_tracking() {
        let mut t = tracker();
        assert!(t.force_cancel().is_none());
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        t.update(&sample(200.0, 0.0));
        let snap = t.force_cancel().unwrap();
        assert_eq!(snap.phase, Phase::Cancelling);
        assert_eq!(snap.progress, 0.5);
        assert!(t.force_cancel().is_none());
        t.reset();
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn resize_keeps_pixel_offset_and_finger_lock() {
        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        t.update(&sample(100.0, 0.0));
        let p = t.set_dismiss_distance(500.0);
        assert!((p * 500.0 - 100.0).abs() < 1e-9);
        // Next 50 points of finger travel move the sheet 50 points.
        let next = t.update(&sample(150.0, 0.0)).unwrap();
        assert!((next.progress * 500.0 - 150.0).abs() < 1e-9);
    }

    #[test]
    fn resize_ignores_degenerate_distance() {
        let mut t = tracker();
        t.begin(&sample(0.0, 0.0), 0.0).unwrap();
        t.update(&sample(100.0, 0.0));
        assert_eq!(t.set_dismiss_distance(0.0), 0.25);
        assert_eq!(t.set_dismiss_distance(f64::NAN), 0.25);
        assert_eq!(t.dismiss_distance(), 400.0);
    }

    #[test]
    fn non_finite_velocity_reads_as_zero() {
        let mut t = tracker();
        t.begin(&sample(0.0, f64::NAN), 0.0).unwrap();
        let (decision, update) = t.end(&sample(40.0, f64::NAN)).unwrap();
        assert_eq!(update.velocity, 0.0);
        assert_eq!(decision, GestureDecision::Cancel);
    }
}
