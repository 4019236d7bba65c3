//! In-process preference source.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::{
    ListenerId, MotionPreference, PreferenceError, PreferenceListener,
    PreferenceSource,
};

/// A preference signal held in memory and changed explicitly with
/// [`set`](Self::set).
///
/// Used for headless rendering with a fixed user setting, for hosts that
/// read the preference from their own settings store, and in tests.
#[derive(Default)]
pub struct ManualPreference {
    reduced: Cell<bool>,
    listeners: RefCell<BTreeMap<ListenerId, PreferenceListener>>,
    next_id: Cell<u64>,
}

impl ManualPreference {
    /// Create with an initial value.
    #[must_use]
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced: Cell::new(reduced),
            listeners: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Change the preference, notifying every listener if the value
    /// actually changed.
    pub fn set(&self, reduced: bool) {
        if self.reduced.replace(reduced) == reduced {
            return;
        }
        let preference = MotionPreference::from_reduced(reduced);

        // Listeners may subscribe or unsubscribe while being notified.
        let snapshot: Vec<PreferenceListener> =
            self.listeners.borrow().values().cloned().collect();
        for listener in snapshot {
            listener(preference);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl PreferenceSource for ManualPreference {
    fn prefers_reduced_motion(&self) -> Result<bool, PreferenceError> {
        Ok(self.reduced.get())
    }

    fn add_listener(
        &self,
        listener: PreferenceListener,
    ) -> Result<ListenerId, PreferenceError> {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let _ = self.listeners.borrow_mut().insert(id, listener);
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let _ = self.listeners.borrow_mut().remove(&id);
    }
}

impl std::fmt::Debug for ManualPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualPreference")
            .field("reduced", &self.reduced.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
