#![forbid(unsafe_code)]

//! Backdrop and content-frame ownership for a presented sheet.
//!
//! The [`PresentationController`] receives the same progress stream as the
//! animator and keeps the sheet's layout: the container, the safe area, the
//! resolved content height, and the current presentation amount. It also
//! owns the non-gesture dismiss affordances (backdrop tap and accessibility
//! escape), which it turns into [`DismissRequest`]s for the coordinator.
//!
//! # Invariants
//!
//! - The resolved content height never exceeds the container's usable height.
//! - A layout change keeps the sheet's downward pixel offset, so nothing
//!   jumps on screen. A fully dismissed sheet stays off-screen.
//! - The controller never starts episodes itself.

use sheetkit_core::{EdgeInsets, Point, Rect};

use crate::config::{BackdropConfig, DismissAffordances, SheetConfig, SheetSizeConstraints};
use crate::episode::clamp_unit;
use crate::error::{ConfigError, Rejection};
use crate::progress::ProgressUpdate;
use crate::visual::{SheetGeometry, VisualState, content_offset, presentation_for_offset};

/// What a point in the container lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetHit {
    /// The dimmed area around the sheet.
    Backdrop,
    /// The sheet itself.
    Content,
}

/// Which affordance asked for a dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    BackdropTap,
    AccessibilityEscape,
}

impl DismissTrigger {
    fn affordance(self) -> DismissAffordances {
        match self {
            Self::BackdropTap => DismissAffordances::BACKDROP_TAP,
            Self::AccessibilityEscape => DismissAffordances::ACCESSIBILITY_ESCAPE,
        }
    }
}

/// A request for a new non-interactive dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissRequest {
    pub trigger: DismissTrigger,
}

/// Result of a layout change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    pub old_distance: f64,
    pub new_distance: f64,
    /// Presentation amount that keeps the previous pixel offset.
    pub presentation: f64,
}

impl ResizeOutcome {
    /// True when the travel distance actually changed.
    pub fn changed(&self) -> bool {
        self.old_distance != self.new_distance
    }
}

/// Owns the backdrop state and the content frame.
#[derive(Debug, Clone)]
pub struct PresentationController {
    backdrop: BackdropConfig,
    corner_radius: f64,
    size: SheetSizeConstraints,
    affordances: DismissAffordances,
    preferred_height: f64,
    geometry: SheetGeometry,
    presentation: f64,
}

impl PresentationController {
    /// Build a controller for a sheet that starts fully dismissed.
    ///
    /// Fails when the container or safe area is not a usable layout.
    pub fn new(
        config: &SheetConfig,
        container: Rect,
        safe_area: EdgeInsets,
        preferred_height: f64,
    ) -> Result<Self, ConfigError> {
        validate_layout(container, safe_area)?;
        let geometry = resolve_geometry(&config.size, container, safe_area, preferred_height);
        Ok(Self {
            backdrop: config.backdrop,
            corner_radius: config.corner_radius,
            size: config.size,
            affordances: config.dismiss_affordances,
            preferred_height,
            geometry,
            presentation: 0.0,
        })
    }

    pub fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }

    /// Full travel from resting to off-screen.
    pub fn dismiss_distance(&self) -> f64 {
        self.geometry.dismiss_distance()
    }

    pub fn presentation(&self) -> f64 {
        self.presentation
    }

    pub fn affordances(&self) -> DismissAffordances {
        self.affordances
    }

    pub fn backdrop(&self) -> &BackdropConfig {
        &self.backdrop
    }

    pub fn corner_radius(&self) -> f64 {
        self.corner_radius
    }

    /// Follow one update of the progress stream.
    pub fn apply(&mut self, update: &ProgressUpdate) {
        self.presentation = clamp_unit(update.presentation);
    }

    pub fn set_presentation(&mut self, presentation: f64) {
        self.presentation = clamp_unit(presentation);
    }

    /// Visual state at the current presentation amount.
    pub fn visual_state(&self) -> VisualState {
        VisualState::resolve(
            self.presentation,
            &self.geometry,
            &self.backdrop,
            self.corner_radius,
        )
    }

    /// Classify a point against the current frame. `None` outside the
    /// container.
    pub fn hit_test(&self, point: Point) -> Option<SheetHit> {
        if !self.geometry.container.contains(point) {
            return None;
        }
        if self.visual_state().content_frame.contains(point) {
            Some(SheetHit::Content)
        } else {
            Some(SheetHit::Backdrop)
        }
    }

    /// The backdrop was tapped.
    pub fn backdrop_tapped(&self) -> Result<DismissRequest, Rejection> {
        self.request(DismissTrigger::BackdropTap)
    }

    /// The accessibility escape gesture was performed.
    pub fn accessibility_escape(&self) -> Result<DismissRequest, Rejection> {
        self.request(DismissTrigger::AccessibilityEscape)
    }

    /// A tap at `point`. Only backdrop hits request a dismissal.
    pub fn tap(&self, point: Point) -> Result<Option<DismissRequest>, Rejection> {
        match self.hit_test(point) {
            Some(SheetHit::Backdrop) => self.backdrop_tapped().map(Some),
            Some(SheetHit::Content) | None => Ok(None),
        }
    }

    /// The container or safe area changed.
    ///
    /// Invalid layouts are ignored and reported as an unchanged outcome.
    pub fn container_changed(&mut self, container: Rect, safe_area: EdgeInsets) -> ResizeOutcome {
        if let Err(err) = validate_layout(container, safe_area) {
            tracing::debug!(%err, "ignored container change");
            return self.unchanged();
        }
        self.relayout(container, safe_area, self.preferred_height)
    }

    /// The content asked for a different height.
    pub fn set_preferred_content_height(&mut self, height: f64) -> ResizeOutcome {
        self.preferred_height = height;
        self.relayout(self.geometry.container, self.geometry.safe_area, height)
    }

    fn relayout(&mut self, container: Rect, safe_area: EdgeInsets, preferred: f64) -> ResizeOutcome {
        let old_distance = self.geometry.dismiss_distance();
        let offset = content_offset(self.presentation, old_distance);
        self.geometry = resolve_geometry(&self.size, container, safe_area, preferred);
        let new_distance = self.geometry.dismiss_distance();

        if self.presentation > 0.0 {
            self.presentation = presentation_for_offset(offset, new_distance);
        }
        tracing::debug!(
            old_distance,
            new_distance,
            presentation = self.presentation,
            "sheet relayout"
        );
        ResizeOutcome {
            old_distance,
            new_distance,
            presentation: self.presentation,
        }
    }

    fn unchanged(&self) -> ResizeOutcome {
        let distance = self.geometry.dismiss_distance();
        ResizeOutcome {
            old_distance: distance,
            new_distance: distance,
            presentation: self.presentation,
        }
    }

    fn request(&self, trigger: DismissTrigger) -> Result<DismissRequest, Rejection> {
        let affordance = trigger.affordance();
        if !self.affordances.contains(affordance) {
            tracing::debug!(?trigger, "dismiss affordance disabled");
            return Err(Rejection::AffordanceDisabled(affordance));
        }
        Ok(DismissRequest { trigger })
    }
}

fn resolve_geometry(
    size: &SheetSizeConstraints,
    container: Rect,
    safe_area: EdgeInsets,
    preferred: f64,
) -> SheetGeometry {
    let available = container.height - safe_area.top - safe_area.bottom;
    let content_height = size.resolve(preferred, available);
    SheetGeometry::new(container, safe_area, content_height)
}

pub(crate) fn validate_layout(container: Rect, safe_area: EdgeInsets) -> Result<(), ConfigError> {
    let finite = [container.x, container.y, container.width, container.height]
        .iter()
        .all(|v| v.is_finite());
    if !finite || container.width < 0.0 || container.height < 0.0 {
        return Err(ConfigError::InvalidLayout(
            "container must have a finite, non-negative size",
        ));
    }
    let insets = [safe_area.top, safe_area.left, safe_area.bottom, safe_area.right];
    if insets.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
        return Err(ConfigError::InvalidLayout(
            "safe-area insets must be finite and non-negative",
        ));
    }
    if safe_area.top + safe_area.bottom > container.height {
        return Err(ConfigError::InvalidLayout(
            "safe-area insets exceed the container height",
        ));
    }
    Ok(())
}
