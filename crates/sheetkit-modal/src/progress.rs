#![forbid(unsafe_code)]

//! Ordered progress stream for an episode.
//!
//! The coordinator delivers every [`ProgressUpdate`] to the animator, then to
//! the presentation controller, then to the subscribers of its
//! [`ProgressFeed`], synchronously and in production order.
//!
//! # Architecture
//!
//! `ProgressFeed` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` callbacks and pruned lazily
//! during publication; the returned [`Subscription`] is the only strong
//! reference, so dropping it unsubscribes.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. No update is buffered, coalesced, or reordered.
//! 3. Dropping a [`Subscription`] removes the callback before the next
//!    publication.
//! 4. A callback may subscribe or drop subscriptions while being notified;
//!    changes apply from the next publication.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::episode::{Direction, EpisodeId, Phase};

/// One progress sample of an episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub episode: EpisodeId,
    pub direction: Direction,
    pub phase: Phase,
    /// Fraction complete in `direction`.
    pub fraction: f64,
    /// How far on screen the sheet is.
    pub presentation: f64,
    /// Vertical gesture velocity in points per second (zero when clock-driven).
    pub velocity: f64,
}

impl ProgressUpdate {
    pub fn new(
        episode: EpisodeId,
        direction: Direction,
        phase: Phase,
        fraction: f64,
        velocity: f64,
    ) -> Self {
        Self {
            episode,
            direction,
            phase,
            fraction,
            presentation: direction.presentation_amount(fraction),
            velocity,
        }
    }
}

type Callback = dyn Fn(&ProgressUpdate);

#[derive(Default)]
struct FeedInner {
    subscribers: Vec<Weak<Callback>>,
    published: u64,
}

/// Publisher side of the progress stream.
#[derive(Clone, Default)]
pub struct ProgressFeed {
    inner: Rc<RefCell<FeedInner>>,
}

impl fmt::Debug for ProgressFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ProgressFeed")
            .field("subscribers", &inner.subscribers.len())
            .field("published", &inner.published)
            .finish()
    }
}

/// RAII guard; the callback stays registered while this is alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Rc<Callback>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl ProgressFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every future update.
    pub fn subscribe(&self, callback: impl Fn(&ProgressUpdate) + 'static) -> Subscription {
        let callback: Rc<Callback> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: callback,
        }
    }

    /// Deliver `update` to every live subscriber.
    pub fn publish(&self, update: &ProgressUpdate) {
        // Snapshot before calling out so callbacks may re-enter the feed.
        let live: Vec<Rc<Callback>> = {
            let mut inner = self.inner.borrow_mut();
            inner.published += 1;
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(update);
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Total number of updates published.
    pub fn published(&self) -> u64 {
        self.inner.borrow().published
    }
}
