#![forbid(unsafe_code)]

//! Transition episode model.
//!
//! An *episode* is one attempt to present or dismiss the sheet. Episodes are
//! owned by a [`TransitionCoordinator`](crate::TransitionCoordinator), which
//! keeps at most one alive at a time.
//!
//! # Phases
//!
//! ```text
//! Idle ─► Tracking ─► Completing ─► Finished
//!              └────► Cancelling ─► Finished
//! Idle ─► Animating ─► Finished
//!              └────► Cancelling ─► Finished   (forced cancellation)
//! ```
//!
//! `Finished` is terminal; the coordinator drops the episode and returns to
//! `Idle`.
//!
//! # Progress scales
//!
//! `progress` on an [`Episode`] is the fraction complete in the episode's own
//! direction. The *presentation amount* (how far on screen the sheet is) is
//! derived from it with [`Direction::presentation_amount`].

use std::fmt;

/// Which way an episode moves the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Presenting,
    Dismissing,
}

impl Direction {
    /// Presentation amount for a fraction complete in this direction.
    #[inline]
    pub fn presentation_amount(self, fraction: f64) -> f64 {
        let fraction = clamp_unit(fraction);
        match self {
            Self::Presenting => fraction,
            Self::Dismissing => 1.0 - fraction,
        }
    }

    /// Fraction complete in this direction for a presentation amount.
    ///
    /// Inverse of [`presentation_amount`](Self::presentation_amount); the
    /// mapping is its own inverse for both directions.
    #[inline]
    pub fn fraction_for(self, presentation: f64) -> f64 {
        self.presentation_amount(presentation)
    }

    /// Presentation amount at which an episode in this direction starts.
    #[inline]
    pub fn origin_presentation(self) -> f64 {
        match self {
            Self::Presenting => 0.0,
            Self::Dismissing => 1.0,
        }
    }

    /// Presentation amount at which an episode in this direction completes.
    #[inline]
    pub fn terminal_presentation(self) -> f64 {
        match self {
            Self::Presenting => 1.0,
            Self::Dismissing => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Presenting => "presenting",
            Self::Dismissing => "dismissing",
        })
    }
}

/// Whether an episode is clock-driven or follows a live gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionMode {
    /// Fixed duration, fixed curve.
    Animated,
    /// Driven by drag samples until release, then finished on the clock.
    Interactive,
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Animated => "animated",
            Self::Interactive => "interactive",
        })
    }
}

/// Lifecycle phase of an episode (or of the tracker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// A live gesture drives progress.
    Tracking,
    /// Clock-driven, non-interactive interpolation.
    Animating,
    /// Released gesture is finishing towards the terminal value.
    Completing,
    /// Released or interrupted gesture is unwinding towards the origin.
    Cancelling,
    Finished,
}

impl Phase {
    /// True for phases that hold the coordinator's single episode slot.
    #[inline]
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Idle | Self::Finished)
    }

    /// True while the clock (rather than a gesture) advances progress.
    #[inline]
    pub fn is_clock_driven(self) -> bool {
        matches!(self, Self::Animating | Self::Completing | Self::Cancelling)
    }

    /// Whether `self → next` is an edge of the episode state machine.
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Tracking)
                | (Self::Idle, Self::Animating)
                | (Self::Tracking, Self::Completing)
                | (Self::Tracking, Self::Cancelling)
                | (Self::Animating, Self::Cancelling)
                | (Self::Animating, Self::Finished)
                | (Self::Completing, Self::Finished)
                | (Self::Completing, Self::Cancelling)
                | (Self::Cancelling, Self::Finished)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Tracking => "tracking",
            Self::Animating => "animating",
            Self::Completing => "completing",
            Self::Cancelling => "cancelling",
            Self::Finished => "finished",
        })
    }
}

/// Identifier of an episode, unique within one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeId(u64);

impl EpisodeId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-owning handle to the screen that presented the sheet.
///
/// The engine never owns or calls into host screens; it only carries this
/// handle so the host can look the screen up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(u64);

impl ScreenId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One present-or-dismiss attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    id: EpisodeId,
    direction: Direction,
    mode: TransitionMode,
    progress: f64,
    phase: Phase,
    start_velocity: f64,
}

impl Episode {
    pub(crate) fn new(
        id: EpisodeId,
        direction: Direction,
        mode: TransitionMode,
        progress: f64,
    ) -> Self {
        let phase = match mode {
            TransitionMode::Animated => Phase::Animating,
            TransitionMode::Interactive => Phase::Tracking,
        };
        Self {
            id,
            direction,
            mode,
            progress: clamp_unit(progress),
            phase,
            start_velocity: 0.0,
        }
    }

    pub fn id(&self) -> EpisodeId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Fraction complete in the episode's direction, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// How far on screen the sheet is, in `[0, 1]`.
    pub fn presentation(&self) -> f64 {
        self.direction.presentation_amount(self.progress)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Velocity (points per second, +y downwards) at which the clock-driven
    /// finish started. Zero for purely animated episodes.
    pub fn start_velocity(&self) -> f64 {
        self.start_velocity
    }

    pub(crate) fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_unit(progress);
    }

    pub(crate) fn set_presentation(&mut self, presentation: f64) {
        self.progress = self.direction.fraction_for(presentation);
    }

    pub(crate) fn set_start_velocity(&mut self, velocity: f64) {
        self.start_velocity = velocity;
    }

    /// Move to `next` if it is a legal edge. Returns whether it moved.
    #[must_use]
    pub(crate) fn advance(&mut self, next: Phase) -> bool {
        if self.phase.can_advance_to(next) {
            self.phase = next;
            true
        } else {
            false
        }
    }
}

/// How an episode ended, reported to completion callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeOutcome {
    pub id: EpisodeId,
    pub direction: Direction,
    pub mode: TransitionMode,
    /// True when the episode reached its terminal value (the sheet ended
    /// up presented for a presentation, dismissed for a dismissal).
    pub completed: bool,
}

/// Callback invoked exactly once when an episode finishes.
pub type Completion = Box<dyn FnOnce(EpisodeOutcome)>;

/// Clamp into `[0, 1]`, reading NaN as 0.
#[inline]
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
