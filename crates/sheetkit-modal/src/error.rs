#![forbid(unsafe_code)]

//! Error types.
//!
//! | Kind | Type | Handling |
//! |------|------|----------|
//! | Nonsensical configuration | [`ConfigError`] | Returned from construction; nothing is built |
//! | Request in the wrong state | [`Rejection`] | The request is a no-op; current state is untouched |
//! | Host tears down mid-episode | (none) | Coordinator force-cancels on the next tick |

use thiserror::Error;

use crate::config::DismissAffordances;
use crate::episode::Phase;

/// Invalid configuration, reported before any episode can start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("completion threshold must lie strictly between 0 and 1, got {0}")]
    ThresholdOutOfRange(f64),
    #[error("minimum fling velocity must be positive and finite, got {0}")]
    InvalidFlingVelocity(f64),
    #[error("corner radius must be non-negative and finite, got {0}")]
    InvalidCornerRadius(f64),
    #[error("backdrop opacity must lie in [0, 1], got {0}")]
    InvalidBackdropOpacity(f64),
    #[error("invalid sheet size constraints: {0}")]
    InvalidSizeConstraints(&'static str),
    #[error("invalid layout: {0}")]
    InvalidLayout(&'static str),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// A request refused because of the current state. Refusal never changes
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Another transition holds the episode slot.
    #[error("another transition is already {0}")]
    Busy(Phase),
    #[error("the sheet is already presented")]
    AlreadyPresented,
    #[error("the sheet is not presented")]
    NotPresented,
    /// The gesture path is switched off (`is_interactable = false` or no
    /// swipe affordance).
    #[error("interactive dismissal is disabled")]
    InteractionDisabled,
    #[error("dismiss affordance {0:?} is disabled")]
    AffordanceDisabled(DismissAffordances),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_state() {
        assert_eq!(
            Rejection::Busy(Phase::Tracking).to_string(),
            "another transition is already tracking"
        );
        assert_eq!(
            ConfigError::ThresholdOutOfRange(1.5).to_string(),
            "completion threshold must lie strictly between 0 and 1, got 1.5"
        );
    }
}
