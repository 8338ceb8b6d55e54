#![forbid(unsafe_code)]

//! Interactive bottom-sheet transitions.
//!
//! A sheet slides up from the bottom of its container over a dimmed
//! backdrop. It can be presented and dismissed on a timer, or dragged down
//! and released, in which case the release position and velocity decide
//! whether the dismissal completes or springs back.
//!
//! # Components
//!
//! - [`InteractionTracker`]: turns drag samples into dismissal progress and
//!   decides the release outcome.
//! - [`TransitionAnimator`]: interpolates the presentation amount, timed or
//!   gesture-driven, and finishes exactly once.
//! - [`PresentationController`]: owns the backdrop, the content frame and the
//!   tap/escape dismiss affordances.
//! - [`TransitionCoordinator`]: the host-facing owner of all of the above;
//!   enforces one live episode at a time.
//!
//! All components are single-threaded and frame-synchronous. Nothing runs
//! until the host calls in with a gesture sample or a `tick`.
//!
//! # Example
//!
//! ```
//! use sheetkit_core::{Duration, EdgeInsets, GestureSample, Rect};
//! use sheetkit_modal::{HostContext, ScreenId, SheetConfig, TransitionCoordinator};
//!
//! let host = HostContext {
//!     presenting: ScreenId::new(1),
//!     container: Rect::new(0.0, 0.0, 390.0, 844.0),
//!     safe_area: EdgeInsets::bottom(34.0),
//!     content_height: 400.0,
//! };
//! let mut sheet = TransitionCoordinator::new(SheetConfig::default(), host)?;
//!
//! sheet.begin_presenting(None)?;
//! while sheet.tick(Duration::from_millis(16)).is_none() {}
//! assert!(sheet.is_presented());
//!
//! sheet.gesture_began(&GestureSample::vertical_now(0.0, 0.0))?;
//! sheet.gesture_changed(&GestureSample::vertical_now(300.0, 0.0));
//! sheet.gesture_ended(&GestureSample::vertical_now(300.0, 0.0));
//! while sheet.tick(Duration::from_millis(16)).is_none() {}
//! assert!(!sheet.is_presented());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod animator;
pub mod config;
pub mod coordinator;
pub mod episode;
pub mod error;
pub mod presentation;
pub mod progress;
pub mod tracker;
pub mod visual;

pub use animator::{AnimationEnd, AnimatorMode, FinishTiming, TransitionAnimator};
pub use config::{
    BackdropConfig, DEFAULT_COMPLETION_THRESHOLD, DEFAULT_MINIMUM_FLING_VELOCITY,
    DismissAffordances, SheetConfig, SheetSizeConstraints,
};
pub use coordinator::{HostContext, TransitionCoordinator, TransitionDelegate};
pub use episode::{
    Completion, Direction, Episode, EpisodeId, EpisodeOutcome, Phase, ScreenId, TransitionMode,
};
pub use error::{ConfigError, Rejection};
pub use presentation::{
    DismissRequest, DismissTrigger, PresentationController, ResizeOutcome, SheetHit,
};
pub use progress::{ProgressFeed, ProgressUpdate, Subscription};
pub use tracker::{GestureDecision, InteractionTracker, TrackerUpdate, decide};
pub use visual::{Easing, SheetGeometry, VisualState};
