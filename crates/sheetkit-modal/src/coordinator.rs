#![forbid(unsafe_code)]

//! The host-facing transition coordinator.
//!
//! A [`TransitionCoordinator`] owns one sheet's tracker, presentation
//! controller, progress feed and (while an episode is live) its animator.
//! It is the only component the host talks to.
//!
//! # Episode lifecycle
//!
//! ```text
//! idle ─begin_presenting/begin_dismissing─► animating ─tick─► finished ─► idle
//! idle ─gesture_began─► tracking ─gesture_ended─► completing | cancelling
//!                                               ─tick─► finished ─► idle
//! ```
//!
//! # Invariants
//!
//! 1. At most one live episode per coordinator.
//! 2. Every episode's completion callback and the coordinator-level handler
//!    fire exactly once, after which the slot is free again.
//! 3. Progress updates reach the animator, then the presentation controller,
//!    then feed subscribers, in production order.
//! 4. Cancellation is cooperative: a request is recorded and applied at the
//!    start of the next [`tick`](TransitionCoordinator::tick).
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Request while an episode is live | `Err(Rejection::Busy(phase))`, no state change |
//! | Present while presented / dismiss while dismissed | `Err(AlreadyPresented)` / `Err(NotPresented)` |
//! | Presented screen torn down mid-episode | Force-cancelled on the next tick |
//! | Invalid config or layout | `new` returns `Err(ConfigError)` |

use sheetkit_core::{Duration, EdgeInsets, GestureSample, Point, Rect};
use tracing::Span;

use crate::animator::{FinishTiming, TransitionAnimator};
use crate::config::SheetConfig;
use crate::episode::{
    Completion, Direction, Episode, EpisodeId, EpisodeOutcome, Phase, ScreenId, TransitionMode,
};
use crate::error::{ConfigError, Rejection};
use crate::presentation::{DismissRequest, PresentationController, ResizeOutcome};
use crate::progress::{ProgressFeed, ProgressUpdate, Subscription};
use crate::tracker::{GestureDecision, InteractionTracker};
use crate::visual::VisualState;

/// What the host knows about the sheet when it creates the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostContext {
    /// Screen that presents the sheet.
    pub presenting: ScreenId,
    /// Area the sheet is laid out in.
    pub container: Rect,
    pub safe_area: EdgeInsets,
    /// Preferred content height, before size constraints.
    pub content_height: f64,
}

/// Host capability surface: hands out transitions for a direction and the
/// dismissal interactor.
pub trait TransitionDelegate {
    /// Start a non-interactive transition in `direction`.
    fn animation_controller(
        &mut self,
        direction: Direction,
        completion: Option<Completion>,
    ) -> Result<EpisodeId, Rejection>;

    /// The tracker of the current dismissal drag, or `None` when no drag is
    /// being tracked.
    ///
    /// The handle is read-only: it reports the drag's phase and progress.
    /// Live samples are fed through the coordinator's `gesture_*` methods.
    fn interaction_controller_for_dismissal(&self) -> Option<&InteractionTracker>;
}

struct ActiveEpisode {
    episode: Episode,
    animator: TransitionAnimator,
    completion: Option<Completion>,
    span: Span,
}

/// Coordinates present/dismiss episodes for one sheet.
pub struct TransitionCoordinator {
    config: SheetConfig,
    tracker: InteractionTracker,
    presentation: PresentationController,
    feed: ProgressFeed,
    active: Option<ActiveEpisode>,
    presented: bool,
    cancel_requested: bool,
    torn_down: bool,
    next_episode: u64,
    on_complete: Option<Box<dyn FnMut(EpisodeOutcome)>>,
    last_outcome: Option<EpisodeOutcome>,
}

impl std::fmt::Debug for TransitionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionCoordinator")
            .field("phase", &self.phase())
            .field("presented", &self.presented)
            .field("episode", &self.episode())
            .field("cancel_requested", &self.cancel_requested)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl TransitionCoordinator {
    /// Validate `config` and the host layout, then build an idle,
    /// not-presented coordinator.
    pub fn new(config: SheetConfig, host: HostContext) -> Result<Self, ConfigError> {
        config.validate()?;
        let presentation = PresentationController::new(
            &config,
            host.container,
            host.safe_area,
            host.content_height,
        )?;
        let tracker =
            InteractionTracker::new(host.presenting, &config, presentation.dismiss_distance());
        tracing::debug!(
            screen = host.presenting.get(),
            distance = presentation.dismiss_distance(),
            interactable = config.swipe_enabled(),
            "sheet coordinator created"
        );
        Ok(Self {
            config,
            tracker,
            presentation,
            feed: ProgressFeed::new(),
            active: None,
            presented: false,
            cancel_requested: false,
            torn_down: false,
            next_episode: 1,
            on_complete: None,
            last_outcome: None,
        })
    }

    // --- Queries ---

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Phase of the live episode, or `Idle`.
    pub fn phase(&self) -> Phase {
        self.active
            .as_ref()
            .map_or(Phase::Idle, |active| active.episode.phase())
    }

    /// Whether the sheet is (or is becoming) presented.
    pub fn is_presented(&self) -> bool {
        self.presented
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.active.as_ref().map(|active| &active.episode)
    }

    pub fn animator(&self) -> Option<&TransitionAnimator> {
        self.active.as_ref().map(|active| &active.animator)
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    pub fn presentation_controller(&self) -> &PresentationController {
        &self.presentation
    }

    /// Everything a renderer needs for the current frame.
    pub fn visual_state(&self) -> VisualState {
        self.presentation.visual_state()
    }

    /// Outcome of the most recently finished episode.
    pub fn last_outcome(&self) -> Option<EpisodeOutcome> {
        self.last_outcome
    }

    /// True when a cancel will be applied on the next tick.
    pub fn cancel_pending(&self) -> bool {
        self.cancel_requested
    }

    // --- Observation ---

    /// Observe every progress update, in production order.
    pub fn subscribe(&self, callback: impl Fn(&ProgressUpdate) + 'static) -> Subscription {
        self.feed.subscribe(callback)
    }

    /// Called once for every finished episode, after its own completion.
    pub fn set_completion_handler(&mut self, handler: impl FnMut(EpisodeOutcome) + 'static) {
        self.on_complete = Some(Box::new(handler));
    }

    // --- Non-interactive episodes ---

    /// Start presenting the sheet.
    pub fn begin_presenting(
        &mut self,
        completion: Option<Completion>,
    ) -> Result<EpisodeId, Rejection> {
        self.ensure_idle()?;
        if self.presented {
            tracing::debug!("rejected present: already presented");
            return Err(Rejection::AlreadyPresented);
        }
        self.torn_down = false;
        self.presented = true;
        Ok(self.start_animated(Direction::Presenting, completion))
    }

    /// Start dismissing the sheet without a gesture.
    pub fn begin_dismissing(
        &mut self,
        completion: Option<Completion>,
    ) -> Result<EpisodeId, Rejection> {
        self.ensure_idle()?;
        if !self.presented {
            tracing::debug!("rejected dismiss: not presented");
            return Err(Rejection::NotPresented);
        }
        Ok(self.start_animated(Direction::Dismissing, completion))
    }

    fn ensure_idle(&self) -> Result<(), Rejection> {
        match &self.active {
            Some(active) => {
                let phase = active.episode.phase();
                tracing::debug!(%phase, episode = %active.episode.id(), "rejected request: busy");
                Err(Rejection::Busy(phase))
            }
            None => Ok(()),
        }
    }

    fn start_animated(&mut self, direction: Direction, completion: Option<Completion>) -> EpisodeId {
        let id = self.next_id();
        let animator = TransitionAnimator::timed(
            direction,
            self.config.duration_for(direction),
            self.config.easing_for(direction),
        );
        let episode = Episode::new(id, direction, TransitionMode::Animated, 0.0);
        self.install(episode, animator, completion);
        id
    }

    fn next_id(&mut self) -> EpisodeId {
        let id = EpisodeId::new(self.next_episode);
        self.next_episode += 1;
        id
    }

    fn install(
        &mut self,
        episode: Episode,
        animator: TransitionAnimator,
        completion: Option<Completion>,
    ) {
        let span = tracing::debug_span!(
            "sheet_episode",
            episode = %episode.id(),
            direction = %episode.direction(),
            mode = %episode.mode(),
        );
        {
            let _guard = span.enter();
            tracing::debug!(
                phase = %episode.phase(),
                progress = episode.progress(),
                "episode started"
            );
        }
        let update = snapshot(&episode, 0.0);
        self.active = Some(ActiveEpisode {
            episode,
            animator,
            completion,
            span,
        });
        self.dispatch(update);
    }

    // --- Gesture path ---

    /// First sample of a drag on the presented sheet.
    ///
    /// Interrupting a running presentation settles it as completed where it
    /// is, then starts the dismissal from that position.
    pub fn gesture_began(&mut self, sample: &GestureSample) -> Result<EpisodeId, Rejection> {
        if !self.config.swipe_enabled() {
            tracing::debug!("rejected gesture: interaction disabled");
            return Err(Rejection::InteractionDisabled);
        }
        if self.cancel_requested {
            return Err(self.busy());
        }

        let start_progress = match &self.active {
            Some(active)
                if active.episode.direction() == Direction::Presenting
                    && active.episode.phase() == Phase::Animating =>
            {
                let presentation = active.animator.presentation();
                self.settle_presentation();
                Direction::Dismissing.fraction_for(presentation)
            }
            Some(_) => return Err(self.busy()),
            None if !self.presented => {
                tracing::debug!("rejected gesture: not presented");
                return Err(Rejection::NotPresented);
            }
            None => Direction::Dismissing.fraction_for(self.presentation.presentation()),
        };

        let update = self.tracker.begin(sample, start_progress)?;
        let id = self.next_id();
        let episode = Episode::new(
            id,
            Direction::Dismissing,
            TransitionMode::Interactive,
            update.progress,
        );
        let animator =
            TransitionAnimator::interactive(Direction::Dismissing, episode.presentation());
        self.install(episode, animator, None);
        Ok(id)
    }

    /// Follow an in-flight sample. `None` when no drag is being tracked.
    pub fn gesture_changed(&mut self, sample: &GestureSample) -> Option<ProgressUpdate> {
        let active = self.active.as_mut()?;
        if active.episode.phase() != Phase::Tracking {
            tracing::trace!(phase = %active.episode.phase(), "ignored gesture sample");
            return None;
        }
        let tracked = self.tracker.update(sample)?;
        active.episode.set_progress(tracked.progress);
        let update = snapshot(&active.episode, tracked.velocity);
        self.dispatch(update);
        Some(update)
    }

    /// Release the drag and hand the remaining distance to the clock.
    pub fn gesture_ended(&mut self, sample: &GestureSample) -> Option<GestureDecision> {
        let active = self.active.as_mut()?;
        if active.episode.phase() != Phase::Tracking {
            tracing::trace!(phase = %active.episode.phase(), "ignored gesture end");
            return None;
        }
        let (decision, tracked) = self.tracker.end(sample)?;
        let next = match decision {
            GestureDecision::Complete => Phase::Completing,
            GestureDecision::Cancel => Phase::Cancelling,
        };
        active.episode.set_progress(tracked.progress);
        active.episode.set_start_velocity(tracked.velocity);
        let advanced = active.episode.advance(next);
        debug_assert!(advanced, "illegal edge from tracking to {next}");
        self.hand_off(decision, tracked.velocity);
        Some(decision)
    }

    /// The host's recognizer cancelled the drag. Unwinds to presented.
    pub fn gesture_cancelled(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let Some(tracked) = self.tracker.force_cancel() else {
            return false;
        };
        active.episode.set_progress(tracked.progress);
        let advanced = active.episode.advance(Phase::Cancelling);
        debug_assert!(advanced, "illegal edge to cancelling");
        self.hand_off(GestureDecision::Cancel, 0.0);
        true
    }

    fn hand_off(&mut self, decision: GestureDecision, velocity: f64) {
        let timing = self.finish_timing();
        let distance = self.presentation.dismiss_distance();
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let span = active.span.clone();
        let _guard = span.enter();
        active.animator.hand_off(decision, velocity, distance, timing);
        tracing::debug!(phase = %active.episode.phase(), ?decision, "gesture handed off");
        let update = snapshot(&active.episode, velocity);
        self.dispatch(update);
    }

    fn finish_timing(&self) -> FinishTiming {
        if self.config.reduced_motion {
            FinishTiming {
                base: Duration::ZERO,
                minimum: Duration::ZERO,
            }
        } else {
            FinishTiming {
                base: self.config.dismissal_duration,
                minimum: self.config.minimum_finish_duration,
            }
        }
    }

    fn settle_presentation(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.animator.settle_at_current().is_some() {
            active.episode.set_presentation(active.animator.presentation());
            self.finish_episode(true);
        }
    }

    // --- Clock ---

    /// Advance clock-driven work by `delta`, applying any pending cancel
    /// first. Returns the outcome of an episode that finished on this tick.
    pub fn tick(&mut self, delta: Duration) -> Option<EpisodeOutcome> {
        if self.cancel_requested {
            self.cancel_requested = false;
            if let Some(outcome) = self.force_cancel() {
                return Some(outcome);
            }
        }

        let active = self.active.as_mut()?;
        if !active.episode.phase().is_clock_driven() {
            return None;
        }
        let end = active.animator.tick(delta);
        active.episode.set_presentation(active.animator.presentation());
        let span = active.span.clone();
        let _guard = span.enter();
        tracing::trace!(
            presentation = active.animator.presentation(),
            dt_ms = delta.as_secs_f64() * 1000.0,
            "tick"
        );
        match end {
            Some(end) => self.finish_episode(end.completed),
            None => {
                let update = snapshot(&active.episode, 0.0);
                self.dispatch(update);
                None
            }
        }
    }

    /// Ask for the live episode to be cancelled on the next tick.
    pub fn request_cancel(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        tracing::debug!(phase = %self.phase(), "cancel requested");
        self.cancel_requested = true;
        true
    }

    /// The presented screen went away. A live episode is force-cancelled on
    /// the next tick; the sheet is then considered dismissed.
    pub fn presented_screen_torn_down(&mut self) {
        tracing::debug!(phase = %self.phase(), "presented screen torn down");
        if self.active.is_some() {
            self.torn_down = true;
            self.cancel_requested = true;
            return;
        }
        let on_screen = self.presentation.presentation() > 0.0;
        self.mark_gone();
        if let Some(last) = self.last_outcome.filter(|_| on_screen) {
            let update = ProgressUpdate::new(
                last.id,
                last.direction,
                Phase::Finished,
                last.direction.fraction_for(0.0),
                0.0,
            );
            self.presentation.apply(&update);
            self.feed.publish(&update);
        }
    }

    fn force_cancel(&mut self) -> Option<EpisodeOutcome> {
        let active = self.active.as_mut()?;
        let span = active.span.clone();
        let _guard = span.enter();
        if let Some(tracked) = self.tracker.force_cancel() {
            active.episode.set_progress(tracked.progress);
        }
        if active.episode.phase() != Phase::Cancelling {
            let advanced = active.episode.advance(Phase::Cancelling);
            debug_assert!(advanced, "illegal edge to cancelling");
        }
        active.animator.abort();
        active.episode.set_presentation(active.animator.presentation());
        tracing::debug!("episode force-cancelled");
        self.finish_episode(false)
    }

    fn finish_episode(&mut self, completed: bool) -> Option<EpisodeOutcome> {
        let mut active = self.active.take()?;
        let _guard = active.span.enter();

        let advanced = active.episode.advance(Phase::Finished);
        debug_assert!(advanced, "illegal edge to finished");
        self.tracker.reset();
        if self.torn_down {
            active.episode.set_presentation(0.0);
        }

        let update = snapshot(&active.episode, 0.0);
        self.presentation.apply(&update);
        self.feed.publish(&update);

        let direction = active.episode.direction();
        if matches!(
            (direction, completed),
            (Direction::Presenting, false) | (Direction::Dismissing, true)
        ) {
            self.presented = false;
        }
        if self.torn_down {
            self.mark_gone();
        }

        let outcome = EpisodeOutcome {
            id: active.episode.id(),
            direction,
            mode: active.episode.mode(),
            completed,
        };
        tracing::debug!(completed, "episode finished");

        if let Some(completion) = active.completion.take() {
            completion(outcome);
        }
        if let Some(handler) = self.on_complete.as_mut() {
            handler(outcome);
        }
        self.last_outcome = Some(outcome);
        Some(outcome)
    }

    fn mark_gone(&mut self) {
        self.torn_down = false;
        self.presented = false;
        self.presentation.set_presentation(0.0);
    }

    // --- Layout ---

    /// The container or safe area changed. The sheet keeps its on-screen
    /// offset; a live animation continues from there.
    pub fn container_size_changed(&mut self, container: Rect, safe_area: EdgeInsets) -> ResizeOutcome {
        let outcome = self.presentation.container_changed(container, safe_area);
        self.apply_resize(outcome)
    }

    /// The content asked for a new height.
    pub fn set_preferred_content_height(&mut self, height: f64) -> ResizeOutcome {
        let outcome = self.presentation.set_preferred_content_height(height);
        self.apply_resize(outcome)
    }

    fn apply_resize(&mut self, outcome: ResizeOutcome) -> ResizeOutcome {
        if !outcome.changed() {
            return outcome;
        }
        let tracked = self.tracker.is_in_progress();
        let fraction = self.tracker.set_dismiss_distance(outcome.new_distance);
        let presentation = if tracked {
            Direction::Dismissing.presentation_amount(fraction)
        } else {
            outcome.presentation
        };
        self.presentation.set_presentation(presentation);

        if let Some(active) = self.active.as_mut() {
            let span = active.span.clone();
            let _guard = span.enter();
            active.animator.retarget_from(presentation);
            active.episode.set_presentation(presentation);
            tracing::debug!(
                old_distance = outcome.old_distance,
                new_distance = outcome.new_distance,
                presentation,
                "episode relayout"
            );
            let update = snapshot(&active.episode, self.tracker.velocity());
            self.dispatch(update);
        }
        ResizeOutcome {
            presentation,
            ..outcome
        }
    }

    // --- Dismiss affordances ---

    /// The backdrop was tapped.
    pub fn backdrop_tapped(&mut self) -> Result<EpisodeId, Rejection> {
        let request = self.presentation.backdrop_tapped()?;
        self.dismiss_for(request)
    }

    /// A tap at `point`; only backdrop hits dismiss.
    pub fn tap(&mut self, point: Point) -> Result<Option<EpisodeId>, Rejection> {
        match self.presentation.tap(point)? {
            Some(request) => self.dismiss_for(request).map(Some),
            None => Ok(None),
        }
    }

    /// The accessibility escape gesture was performed.
    pub fn accessibility_escape(&mut self) -> Result<EpisodeId, Rejection> {
        let request = self.presentation.accessibility_escape()?;
        self.dismiss_for(request)
    }

    fn dismiss_for(&mut self, request: DismissRequest) -> Result<EpisodeId, Rejection> {
        tracing::debug!(trigger = ?request.trigger, "dismiss requested");
        self.begin_dismissing(None)
    }

    // --- Internals ---

    fn busy(&self) -> Rejection {
        let phase = self.phase();
        tracing::debug!(%phase, "rejected gesture: busy");
        Rejection::Busy(phase)
    }

    fn dispatch(&mut self, update: ProgressUpdate) {
        if let Some(active) = self.active.as_mut() {
            active.animator.drive(update.presentation);
        }
        self.presentation.apply(&update);
        self.feed.publish(&update);
    }
}

impl TransitionDelegate for TransitionCoordinator {
    fn animation_controller(
        &mut self,
        direction: Direction,
        completion: Option<Completion>,
    ) -> Result<EpisodeId, Rejection> {
        match direction {
            Direction::Presenting => self.begin_presenting(completion),
            Direction::Dismissing => self.begin_dismissing(completion),
        }
    }

    fn interaction_controller_for_dismissal(&self) -> Option<&InteractionTracker> {
        self.tracker.is_in_progress().then_some(&self.tracker)
    }
}

fn snapshot(episode: &Episode, velocity: f64) -> ProgressUpdate {
    ProgressUpdate::new(
        episode.id(),
        episode.direction(),
        episode.phase(),
        episode.progress(),
        velocity,
    )
}
