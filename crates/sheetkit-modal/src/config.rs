#![forbid(unsafe_code)]

//! Sheet configuration.
//!
//! [`SheetConfig`] is built with consuming setters on top of its `Default`
//! and checked once by [`SheetConfig::validate`]. The coordinator refuses to
//! start with an invalid configuration, so thresholds and durations never
//! need re-checking mid-gesture.
//!
//! With the `config-file` feature, a configuration can be loaded from TOML
//! (see [`SheetConfig::from_toml_str`]); durations are given in milliseconds
//! and any omitted key keeps its default.

use bitflags::bitflags;
use sheetkit_core::Rgba;
use web_time::Duration;

use crate::error::ConfigError;
use crate::visual::Easing;

/// Default progress above which a released drag completes the dismissal.
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.5;

/// Default release speed (points per second, downwards) that completes a
/// dismissal regardless of progress.
pub const DEFAULT_MINIMUM_FLING_VELOCITY: f64 = 1000.0;

bitflags! {
    /// Ways the user may dismiss a presented sheet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DismissAffordances: u8 {
        /// Tapping the dimmed backdrop outside the sheet.
        const BACKDROP_TAP = 1 << 0;
        /// The screen-reader escape gesture.
        const ACCESSIBILITY_ESCAPE = 1 << 1;
        /// Dragging the sheet down. Ignored unless `is_interactable`.
        const SWIPE = 1 << 2;
    }
}

impl Default for DismissAffordances {
    fn default() -> Self {
        Self::all()
    }
}

/// Backdrop configuration (color + opacity when fully presented).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackdropConfig {
    /// Backdrop color (alpha will be scaled by `opacity`).
    pub color: Rgba,
    /// Opacity in `[0.0, 1.0]` at full presentation.
    pub opacity: f64,
}

impl BackdropConfig {
    pub fn new(color: Rgba, opacity: f64) -> Self {
        Self { color, opacity }
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            opacity: 0.4,
        }
    }
}

/// Height constraints for the sheet content.
///
/// The preferred content height is clamped to `[min_height, max_height]` and
/// then to `max_fraction` of the available container height. The result never
/// exceeds what is available.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetSizeConstraints {
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    /// Largest share of the available height the sheet may take, in `(0, 1]`.
    pub max_fraction: f64,
}

impl SheetSizeConstraints {
    /// Unconstrained except for the available height.
    pub const fn new() -> Self {
        Self {
            min_height: None,
            max_height: None,
            max_fraction: 1.0,
        }
    }

    pub fn min_height(mut self, value: f64) -> Self {
        self.min_height = Some(value);
        self
    }

    pub fn max_height(mut self, value: f64) -> Self {
        self.max_height = Some(value);
        self
    }

    pub fn max_fraction(mut self, value: f64) -> Self {
        self.max_fraction = value;
        self
    }

    /// Resolve a content height for `preferred` within `available` points.
    pub fn resolve(self, preferred: f64, available: f64) -> f64 {
        let available = if available.is_finite() {
            available.max(0.0)
        } else {
            0.0
        };
        let mut height = if preferred.is_finite() {
            preferred.max(0.0)
        } else {
            available
        };

        if let Some(max) = self.max_height {
            height = height.min(max);
        }
        if let Some(min) = self.min_height {
            height = height.max(min);
        }

        height.min(available * self.max_fraction).min(available)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = |v: Option<f64>| v.is_none_or(|v| v.is_finite() && v >= 0.0);
        if !non_negative(self.min_height) || !non_negative(self.max_height) {
            return Err(ConfigError::InvalidSizeConstraints(
                "heights must be non-negative and finite",
            ));
        }
        if let (Some(min), Some(max)) = (self.min_height, self.max_height)
            && min > max
        {
            return Err(ConfigError::InvalidSizeConstraints(
                "min_height exceeds max_height",
            ));
        }
        if !(self.max_fraction > 0.0 && self.max_fraction <= 1.0) {
            return Err(ConfigError::InvalidSizeConstraints(
                "max_fraction must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for SheetSizeConstraints {
    fn default() -> Self {
        Self::new().max_fraction(0.9)
    }
}

/// Configuration for one sheet coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    /// Enables the drag-to-dismiss path.
    pub is_interactable: bool,
    /// Progress above which a released drag completes, in `(0, 1)`.
    pub completion_threshold: f64,
    /// Downward release speed (points/s) that completes regardless of progress.
    pub minimum_fling_velocity: f64,
    pub presentation_duration: Duration,
    pub dismissal_duration: Duration,
    pub presentation_easing: Easing,
    pub dismissal_easing: Easing,
    /// Floor for the clock-driven finish after a released drag, unless no
    /// distance remains.
    pub minimum_finish_duration: Duration,
    /// Passed through to rendering; no effect on state.
    pub corner_radius: f64,
    /// Passed through to rendering; no effect on state.
    pub backdrop: BackdropConfig,
    pub size: SheetSizeConstraints,
    pub dismiss_affordances: DismissAffordances,
    /// Collapse all timed animations to a single tick.
    pub reduced_motion: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            is_interactable: true,
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            minimum_fling_velocity: DEFAULT_MINIMUM_FLING_VELOCITY,
            presentation_duration: Duration::from_millis(300),
            dismissal_duration: Duration::from_millis(250),
            presentation_easing: Easing::EaseOut,
            dismissal_easing: Easing::EaseIn,
            minimum_finish_duration: Duration::from_millis(80),
            corner_radius: 16.0,
            backdrop: BackdropConfig::default(),
            size: SheetSizeConstraints::default(),
            dismiss_affordances: DismissAffordances::default(),
            reduced_motion: false,
        }
    }
}

impl SheetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interactable(mut self, enabled: bool) -> Self {
        self.is_interactable = enabled;
        self
    }

    pub fn completion_threshold(mut self, threshold: f64) -> Self {
        self.completion_threshold = threshold;
        self
    }

    pub fn minimum_fling_velocity(mut self, velocity: f64) -> Self {
        self.minimum_fling_velocity = velocity;
        self
    }

    pub fn presentation_duration(mut self, duration: Duration) -> Self {
        self.presentation_duration = duration;
        self
    }

    pub fn dismissal_duration(mut self, duration: Duration) -> Self {
        self.dismissal_duration = duration;
        self
    }

    pub fn presentation_easing(mut self, easing: Easing) -> Self {
        self.presentation_easing = easing;
        self
    }

    pub fn dismissal_easing(mut self, easing: Easing) -> Self {
        self.dismissal_easing = easing;
        self
    }

    pub fn minimum_finish_duration(mut self, duration: Duration) -> Self {
        self.minimum_finish_duration = duration;
        self
    }

    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn backdrop(mut self, backdrop: BackdropConfig) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn size(mut self, size: SheetSizeConstraints) -> Self {
        self.size = size;
        self
    }

    pub fn dismiss_affordances(mut self, affordances: DismissAffordances) -> Self {
        self.dismiss_affordances = affordances;
        self
    }

    pub fn reduced_motion(mut self, enabled: bool) -> Self {
        self.reduced_motion = enabled;
        self
    }

    /// Whether a drag may start an interactive dismissal.
    pub fn swipe_enabled(&self) -> bool {
        self.is_interactable && self.dismiss_affordances.contains(DismissAffordances::SWIPE)
    }

    /// Duration of a non-interactive episode in `direction`, honoring
    /// reduced motion.
    pub fn duration_for(&self, direction: crate::Direction) -> Duration {
        if self.reduced_motion {
            return Duration::ZERO;
        }
        match direction {
            crate::Direction::Presenting => self.presentation_duration,
            crate::Direction::Dismissing => self.dismissal_duration,
        }
    }

    pub fn easing_for(&self, direction: crate::Direction) -> Easing {
        match direction {
            crate::Direction::Presenting => self.presentation_easing,
            crate::Direction::Dismissing => self.dismissal_easing,
        }
    }

    /// Check every field, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.completion_threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(ConfigError::ThresholdOutOfRange(t));
        }
        let v = self.minimum_fling_velocity;
        if !(v.is_finite() && v > 0.0) {
            return Err(ConfigError::InvalidFlingVelocity(v));
        }
        let r = self.corner_radius;
        if !(r.is_finite() && r >= 0.0) {
            return Err(ConfigError::InvalidCornerRadius(r));
        }
        let o = self.backdrop.opacity;
        if !(0.0..=1.0).contains(&o) {
            return Err(ConfigError::InvalidBackdropOpacity(o));
        }
        self.size.validate()
    }
}

#[cfg(feature = "config-file")]
mod file {
    use serde::Deserialize;
    use sheetkit_core::Rgba;
    use web_time::Duration;

    use super::{BackdropConfig, DismissAffordances, SheetConfig, SheetSizeConstraints};
    use crate::error::ConfigError;
    use crate::visual::Easing;

    /// On-disk shape of [`SheetConfig`]. Every key is optional.
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct SheetConfigFile {
        is_interactable: Option<bool>,
        completion_threshold: Option<f64>,
        minimum_fling_velocity: Option<f64>,
        presentation_duration_ms: Option<u64>,
        dismissal_duration_ms: Option<u64>,
        minimum_finish_duration_ms: Option<u64>,
        presentation_easing: Option<Easing>,
        dismissal_easing: Option<Easing>,
        corner_radius: Option<f64>,
        backdrop_color: Option<Rgba>,
        backdrop_opacity: Option<f64>,
        size: Option<SheetSizeConstraints>,
        dismiss_on_backdrop_tap: Option<bool>,
        dismiss_on_accessibility_escape: Option<bool>,
        dismiss_on_swipe: Option<bool>,
        reduced_motion: Option<bool>,
    }

    impl SheetConfigFile {
        fn apply(self, mut config: SheetConfig) -> SheetConfig {
            let ms = Duration::from_millis;
            if let Some(v) = self.is_interactable {
                config.is_interactable = v;
            }
            if let Some(v) = self.completion_threshold {
                config.completion_threshold = v;
            }
            if let Some(v) = self.minimum_fling_velocity {
                config.minimum_fling_velocity = v;
            }
            if let Some(v) = self.presentation_duration_ms {
                config.presentation_duration = ms(v);
            }
            if let Some(v) = self.dismissal_duration_ms {
                config.dismissal_duration = ms(v);
            }
            if let Some(v) = self.minimum_finish_duration_ms {
                config.minimum_finish_duration = ms(v);
            }
            if let Some(v) = self.presentation_easing {
                config.presentation_easing = v;
            }
            if let Some(v) = self.dismissal_easing {
                config.dismissal_easing = v;
            }
            if let Some(v) = self.corner_radius {
                config.corner_radius = v;
            }
            let backdrop = config.backdrop;
            config.backdrop = BackdropConfig::new(
                self.backdrop_color.unwrap_or(backdrop.color),
                self.backdrop_opacity.unwrap_or(backdrop.opacity),
            );
            if let Some(v) = self.size {
                config.size = v;
            }
            for (flag, value) in [
                (DismissAffordances::BACKDROP_TAP, self.dismiss_on_backdrop_tap),
                (
                    DismissAffordances::ACCESSIBILITY_ESCAPE,
                    self.dismiss_on_accessibility_escape,
                ),
                (DismissAffordances::SWIPE, self.dismiss_on_swipe),
            ] {
                if let Some(enabled) = value {
                    config.dismiss_affordances.set(flag, enabled);
                }
            }
            if let Some(v) = self.reduced_motion {
                config.reduced_motion = v;
            }
            config
        }
    }

    impl SheetConfig {
        /// Parse and validate a TOML document, starting from defaults.
        pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
            let file: SheetConfigFile =
                toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
            let config = file.apply(SheetConfig::default());
            config.validate()?;
            tracing::debug!(
                threshold = config.completion_threshold,
                fling = config.minimum_fling_velocity,
                interactable = config.is_interactable,
                "loaded sheet configuration"
            );
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SheetConfig::default().validate(), Ok(()));
        assert!(SheetConfig::default().swipe_enabled());
    }

    #[test]
    fn threshold_must_be_open_unit_interval() {
        for bad in [0.0, 1.0, -0.2, 1.3, f64::NAN] {
            let err = SheetConfig::new().completion_threshold(bad).validate();
            assert!(matches!(err, Err(ConfigError::ThresholdOutOfRange(_))), "{bad}");
        }
        assert!(SheetConfig::new().completion_threshold(0.01).validate().is_ok());
        assert!(SheetConfig::new().completion_threshold(0.99).validate().is_ok());
    }

    #[test]
    fn fling_velocity_must_be_positive() {
        for bad in [0.0, -10.0, f64::INFINITY, f64::NAN] {
            let err = SheetConfig::new().minimum_fling_velocity(bad).validate();
            assert!(matches!(err, Err(ConfigError::InvalidFlingVelocity(_))));
        }
    }

    #[test]
    fn chrome_values_are_checked() {
        assert!(matches!(
            SheetConfig::new().corner_radius(-1.0).validate(),
            Err(ConfigError::InvalidCornerRadius(_))
        ));
        assert!(matches!(
            SheetConfig::new()
                .backdrop(BackdropConfig::default().opacity(1.5))
                .validate(),
            Err(ConfigError::InvalidBackdropOpacity(_))
        ));
    }

    #[test]
    fn inverted_size_constraints_fail() {
        let size = SheetSizeConstraints::new().min_height(400.0).max_height(200.0);
        assert!(matches!(
            SheetConfig::new().size(size).validate(),
            Err(ConfigError::InvalidSizeConstraints(_))
        ));
        let size = SheetSizeConstraints::new().max_fraction(0.0);
        assert!(SheetConfig::new().size(size).validate().is_err());
    }

    #[test]
    fn size_resolution_respects_available() {
        let c = SheetSizeConstraints::new().min_height(200.0).max_height(600.0);
        assert_eq!(c.resolve(100.0, 800.0), 200.0);
        assert_eq!(c.resolve(700.0, 800.0), 600.0);
        assert_eq!(c.resolve(300.0, 800.0), 300.0);
        assert_eq!(c.resolve(300.0, 150.0), 150.0);
        let c = SheetSizeConstraints::new().max_fraction(0.5);
        assert_eq!(c.resolve(700.0, 800.0), 400.0);
        assert_eq!(c.resolve(f64::NAN, 800.0), 400.0);
    }

    #[test]
    fn swipe_requires_interaction_and_affordance() {
        assert!(!SheetConfig::new().interactable(false).swipe_enabled());
        let no_swipe = DismissAffordances::all() - DismissAffordances::SWIPE;
        assert!(!SheetConfig::new().dismiss_affordances(no_swipe).swipe_enabled());
    }

    #[test]
    fn reduced_motion_zeroes_durations() {
        let config = SheetConfig::new().reduced_motion(true);
        assert_eq!(config.duration_for(crate::Direction::Presenting), Duration::ZERO);
        assert_eq!(config.duration_for(crate::Direction::Dismissing), Duration::ZERO);
        let config = SheetConfig::new();
        assert_eq!(
            config.duration_for(crate::Direction::Dismissing),
            Duration::from_millis(250)
        );
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_overrides_defaults() {
        let config = SheetConfig::from_toml_str(
            r#"
            completion_threshold = 0.35
            dismissal_duration_ms = 180
            dismiss_on_backdrop_tap = false
            dismissal_easing = "Linear"
            "#,
        )
        .expect("valid config");
        assert_eq!(config.completion_threshold, 0.35);
        assert_eq!(config.dismissal_duration, Duration::from_millis(180));
        assert!(!config
            .dismiss_affordances
            .contains(DismissAffordances::BACKDROP_TAP));
        assert_eq!(config.dismissal_easing, Easing::Linear);
        assert_eq!(config.minimum_fling_velocity, DEFAULT_MINIMUM_FLING_VELOCITY);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_rejects_invalid_values() {
        assert!(matches!(
            SheetConfig::from_toml_str("completion_threshold = 2.0"),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
        assert!(matches!(
            SheetConfig::from_toml_str("unknown_key = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
