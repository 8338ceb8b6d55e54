#![forbid(unsafe_code)]

//! Shared progress → visual mapping.
//!
//! Every code path (clock-driven animation, live gesture tracking, resize
//! re-clamping) turns a *presentation amount* into pixels through the
//! functions in this module, so the sheet looks identical at a given amount
//! no matter how it got there.
//!
//! # Invariants
//!
//! - `backdrop_opacity(0) == 0` and `backdrop_opacity(1) == full opacity`.
//! - `content_offset(0) == dismiss_distance` (fully off-screen) and
//!   `content_offset(1) == 0` (resting on-screen position).
//! - Both functions are monotonic in the presentation amount.
//! - Every [`Easing`] is monotonic on `[0, 1]` with fixed endpoints.

use sheetkit_core::{EdgeInsets, Rect, Rgba};

use crate::episode::clamp_unit;

/// Easing curve for clock-driven interpolation.
///
/// Only monotonic curves are offered: an overshooting curve would push the
/// backdrop past its full opacity and break the no-flash guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    /// Decelerating. Used for presentations and for post-release finishes.
    #[default]
    EaseOut,
    /// Accelerating.
    EaseIn,
    EaseInOut,
}

impl Easing {
    /// Apply the curve to `t` (clamped to `[0, 1]`).
    pub fn apply(self, t: f64) -> f64 {
        let t = clamp_unit(t);
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// Where the sheet lives inside its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetGeometry {
    pub container: Rect,
    pub safe_area: EdgeInsets,
    /// Resolved content height (excluding the bottom safe area).
    pub content_height: f64,
}

impl SheetGeometry {
    pub fn new(container: Rect, safe_area: EdgeInsets, content_height: f64) -> Self {
        Self {
            container,
            safe_area,
            content_height: content_height.max(0.0),
        }
    }

    /// Full travel from the resting position to fully off-screen: content
    /// height plus the bottom safe-area allowance.
    #[inline]
    pub fn dismiss_distance(&self) -> f64 {
        self.content_height + self.safe_area.bottom.max(0.0)
    }

    /// Frame of the sheet when fully presented: bottom-anchored, full
    /// container width, extending under the bottom safe area.
    pub fn presented_frame(&self) -> Rect {
        let height = self.dismiss_distance();
        Rect::new(
            self.container.x,
            self.container.max_y() - height,
            self.container.width,
            height,
        )
    }

    /// Frame of the sheet at `presentation`.
    pub fn frame_at(&self, presentation: f64) -> Rect {
        self.presented_frame()
            .offset_y(content_offset(presentation, self.dismiss_distance()))
    }
}

/// Backdrop opacity at `presentation`, scaled to `full`.
#[inline]
pub fn backdrop_opacity(presentation: f64, full: f64) -> f64 {
    clamp_unit(presentation) * clamp_unit(full)
}

/// Downward displacement of the sheet from its resting frame at
/// `presentation`.
#[inline]
pub fn content_offset(presentation: f64, dismiss_distance: f64) -> f64 {
    (1.0 - clamp_unit(presentation)) * dismiss_distance.max(0.0)
}

/// Presentation amount whose offset is `offset` points over
/// `dismiss_distance`. Offsets past the distance clamp to fully dismissed.
pub fn presentation_for_offset(offset: f64, dismiss_distance: f64) -> f64 {
    if !(dismiss_distance > 0.0) {
        return if offset > 0.0 { 0.0 } else { 1.0 };
    }
    1.0 - clamp_unit(offset / dismiss_distance)
}

/// Everything a renderer needs for one frame of the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    /// Presentation amount in `[0, 1]`.
    pub presentation: f64,
    pub backdrop_opacity: f64,
    /// Backdrop color with `backdrop_opacity` folded into its alpha.
    pub backdrop_color: Rgba,
    /// Sheet frame, including the offset.
    pub content_frame: Rect,
    /// Downward displacement from the resting frame.
    pub content_offset: f64,
    pub corner_radius: f64,
}

impl VisualState {
    /// Resolve the visual state at `presentation`.
    pub fn resolve(
        presentation: f64,
        geometry: &SheetGeometry,
        backdrop: &crate::config::BackdropConfig,
        corner_radius: f64,
    ) -> Self {
        let presentation = clamp_unit(presentation);
        let backdrop_opacity = backdrop_opacity(presentation, backdrop.opacity);
        let content_offset = content_offset(presentation, geometry.dismiss_distance());
        Self {
            presentation,
            backdrop_opacity,
            backdrop_color: backdrop.color.with_opacity(backdrop_opacity),
            content_frame: geometry.presented_frame().offset_y(content_offset),
            content_offset,
            corner_radius,
        }
    }

    /// True when the sheet is entirely below the container.
    pub fn is_off_screen(&self, geometry: &SheetGeometry) -> bool {
        self.content_frame.min_y() >= geometry.container.max_y()
    }
}
