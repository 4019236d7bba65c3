//! Reduced-motion preference detection.
//!
//! The environment (a browser media query, a test fixture, nothing at all
//! when running headless) is modelled as a [`PreferenceSource`]. Sections
//! never talk to a source directly: they go through a [`MotionOracle`],
//! which turns every failure into the safe default and hands out
//! [`Subscription`] guards that deregister their listener on drop.

mod manual;

use std::fmt;
use std::rc::Rc;

pub use manual::ManualPreference;
use serde::{Deserialize, Serialize};

/// The user's motion preference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    /// No preference expressed; animations run normally.
    #[default]
    NoPreference,
    /// The user asked for non-essential motion to be minimized.
    Reduce,
}

impl MotionPreference {
    /// Map a "prefers reduced motion" flag onto a preference.
    #[must_use]
    pub fn from_reduced(reduced: bool) -> Self {
        if reduced {
            Self::Reduce
        } else {
            Self::NoPreference
        }
    }

    /// Whether reduced motion is requested.
    #[must_use]
    pub fn is_reduced(self) -> bool {
        matches!(self, Self::Reduce)
    }
}

/// Identifies one registered change listener within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Callback invoked with the new preference whenever it changes.
pub type PreferenceListener = Rc<dyn Fn(MotionPreference)>;

/// Failure to read or watch the preference signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    /// The environment has no way to express the preference (no window,
    /// no media query support).
    Unavailable(String),
    /// The change listener could not be registered.
    Listener(String),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => {
                write!(f, "motion preference unavailable: {msg}")
            }
            Self::Listener(msg) => {
                write!(f, "failed to watch motion preference: {msg}")
            }
        }
    }
}

impl std::error::Error for PreferenceError {}

/// An environment signal that can report and announce the reduced-motion
/// preference.
///
/// Implementations are read-only from the caller's side: only the
/// environment changes the value, and every listener is told independently.
pub trait PreferenceSource {
    /// Whether reduced motion is requested right now.
    fn prefers_reduced_motion(&self) -> Result<bool, PreferenceError>;

    /// Register a change listener.
    fn add_listener(
        &self,
        listener: PreferenceListener,
    ) -> Result<ListenerId, PreferenceError>;

    /// Deregister a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Single point of truth for "does the user prefer reduced motion".
///
/// Cloning is cheap; every clone observes the same source.
#[derive(Clone)]
pub struct MotionOracle {
    source: Option<Rc<dyn PreferenceSource>>,
}

impl MotionOracle {
    /// Oracle backed by a live source.
    pub fn new(source: Rc<dyn PreferenceSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Oracle for contexts with no environment at all (headless rendering,
    /// native tests). Always reports [`MotionPreference::NoPreference`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self { source: None }
    }

    /// Current preference. Never fails: an unreadable source yields the
    /// default.
    #[must_use]
    pub fn current(&self) -> MotionPreference {
        let Some(source) = &self.source else {
            return MotionPreference::default();
        };
        match source.prefers_reduced_motion() {
            Ok(reduced) => MotionPreference::from_reduced(reduced),
            Err(e) => {
                log::debug!("{e}; assuming no motion preference");
                MotionPreference::default()
            }
        }
    }

    /// Watch for preference changes until the returned guard is dropped.
    ///
    /// If the source cannot register listeners the guard is inert and the
    /// caller simply keeps the value it read at mount.
    pub fn subscribe(
        &self,
        on_change: impl Fn(MotionPreference) + 'static,
    ) -> Subscription {
        let Some(source) = &self.source else {
            return Subscription::inert();
        };
        match source.add_listener(Rc::new(on_change)) {
            Ok(id) => Subscription {
                source: Some(Rc::clone(source)),
                id: Some(id),
            },
            Err(e) => {
                log::debug!("{e}; preference changes will not be observed");
                Subscription::inert()
            }
        }
    }
}

impl fmt::Debug for MotionOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionOracle")
            .field("available", &self.source.is_some())
            .finish()
    }
}

/// Guard for one registered preference listener.
///
/// The listener is removed exactly once: on [`cancel`](Self::cancel) or on
/// drop, whichever comes first.
#[must_use = "dropping a Subscription deregisters its listener"]
pub struct Subscription {
    source: Option<Rc<dyn PreferenceSource>>,
    id: Option<ListenerId>,
}

impl Subscription {
    fn inert() -> Self {
        Self {
            source: None,
            id: None,
        }
    }

    /// Whether a listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Deregister the listener now.
    pub fn cancel(&mut self) {
        if let (Some(source), Some(id)) = (self.source.take(), self.id.take())
        {
            source.remove_listener(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct BrokenSource;

    impl PreferenceSource for BrokenSource {
        fn prefers_reduced_motion(&self) -> Result<bool, PreferenceError> {
            Err(PreferenceError::Unavailable("no window".to_owned()))
        }

        fn add_listener(
            &self,
            _listener: PreferenceListener,
        ) -> Result<ListenerId, PreferenceError> {
            Err(PreferenceError::Listener("no media query".to_owned()))
        }

        fn remove_listener(&self, _id: ListenerId) {}
    }

    #[test]
    fn unavailable_oracle_defaults_to_no_preference() {
        let oracle = MotionOracle::unavailable();
        assert_eq!(oracle.current(), MotionPreference::NoPreference);
        let sub = oracle.subscribe(|_| {});
        assert!(!sub.is_active());
    }

    #[test]
    fn failing_source_defaults_instead_of_erroring() {
        let oracle = MotionOracle::new(Rc::new(BrokenSource));
        assert_eq!(oracle.current(), MotionPreference::NoPreference);
        assert!(!oracle.subscribe(|_| {}).is_active());
    }

    #[test]
    fn reads_live_source() {
        let source = Rc::new(ManualPreference::new(true));
        let oracle = MotionOracle::new(source.clone());
        assert_eq!(oracle.current(), MotionPreference::Reduce);
        source.set(false);
        assert_eq!(oracle.current(), MotionPreference::NoPreference);
    }

    #[test]
    fn subscription_deregisters_on_drop() {
        let source = Rc::new(ManualPreference::new(false));
        let oracle = MotionOracle::new(source.clone());
        let seen = Rc::new(Cell::new(0));

        let counter = Rc::clone(&seen);
        let sub = oracle.subscribe(move |_| counter.set(counter.get() + 1));
        assert_eq!(source.listener_count(), 1);

        source.set(true);
        assert_eq!(seen.get(), 1);

        drop(sub);
        assert_eq!(source.listener_count(), 0);
        source.set(false);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let source = Rc::new(ManualPreference::new(false));
        let oracle = MotionOracle::new(source.clone());
        let mut sub = oracle.subscribe(|_| {});
        sub.cancel();
        sub.cancel();
        assert!(!sub.is_active());
        assert_eq!(source.listener_count(), 0);
    }
}
