#![forbid(unsafe_code)]

//! Drag-gesture input records.
//!
//! A host gesture recognizer produces one [`GestureSample`] per input tick.
//! Translation is cumulative since the gesture began (as reported by pan
//! recognizers), and velocity is in points per second. Positive `y` points
//! towards the bottom edge of the container.

use web_time::Instant;

use crate::geometry::Point;

/// One immutable input tick of an active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    /// Cumulative translation since the gesture began.
    pub translation: Point,
    /// Instantaneous velocity in points per second.
    pub velocity: Point,
    /// When the host observed this sample.
    pub timestamp: Instant,
}

impl GestureSample {
    pub fn new(translation: Point, velocity: Point, timestamp: Instant) -> Self {
        Self {
            translation,
            velocity,
            timestamp,
        }
    }

    /// A purely vertical sample.
    pub fn vertical(translation_y: f64, velocity_y: f64, timestamp: Instant) -> Self {
        Self::new(
            Point::new(0.0, translation_y),
            Point::new(0.0, velocity_y),
            timestamp,
        )
    }

    /// A purely vertical sample stamped with the current time.
    pub fn vertical_now(translation_y: f64, velocity_y: f64) -> Self {
        Self::vertical(translation_y, velocity_y, Instant::now())
    }

    /// Whether every coordinate is finite. Hosts occasionally report NaN
    /// velocities on the first sample; consumers treat those as zero.
    pub fn is_finite(&self) -> bool {
        self.translation.x.is_finite()
            && self.translation.y.is_finite()
            && self.velocity.x.is_finite()
            && self.velocity.y.is_finite()
    }

    /// Vertical translation, with non-finite values read as zero.
    #[inline]
    pub fn translation_y(&self) -> f64 {
        finite_or_zero(self.translation.y)
    }

    /// Vertical velocity, with non-finite values read as zero.
    #[inline]
    pub fn velocity_y(&self) -> f64 {
        finite_or_zero(self.velocity.y)
    }
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
