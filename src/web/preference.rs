use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MediaQueryList, MediaQueryListEvent};

use super::js_message;
use crate::preference::{
    ListenerId, MotionPreference, PreferenceError, PreferenceListener,
    PreferenceSource,
};

/// Media query matching a reduced-motion request.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

type ChangeClosure = Closure<dyn FnMut(MediaQueryListEvent)>;

/// Preference source backed by `window.matchMedia`.
///
/// A listener may be removed from inside its own `change` callback; its
/// closure then stays alive until the next [`add_listener`] call.
///
/// [`add_listener`]: PreferenceSource::add_listener
pub struct MediaQueryPreference {
    query: MediaQueryList,
    listeners: RefCell<FxHashMap<ListenerId, ChangeClosure>>,
    retired: RefCell<Vec<ChangeClosure>>,
    next_id: Cell<u64>,
}

impl MediaQueryPreference {
    /// Query the current window.
    pub fn new() -> Result<Self, PreferenceError> {
        let window = web_sys::window().ok_or_else(|| {
            PreferenceError::Unavailable("no global window".to_owned())
        })?;
        let query = window
            .match_media(REDUCED_MOTION_QUERY)
            .map_err(|e| PreferenceError::Unavailable(js_message(&e)))?
            .ok_or_else(|| {
                PreferenceError::Unavailable(
                    "matchMedia returned null".to_owned(),
                )
            })?;
        Ok(Self {
            query,
            listeners: RefCell::new(FxHashMap::default()),
            retired: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        })
    }
}

impl PreferenceSource for MediaQueryPreference {
    fn prefers_reduced_motion(&self) -> Result<bool, PreferenceError> {
        Ok(self.query.matches())
    }

    fn add_listener(
        &self,
        listener: PreferenceListener,
    ) -> Result<ListenerId, PreferenceError> {
        self.retired.borrow_mut().clear();
        let closure = ChangeClosure::new(move |evt: MediaQueryListEvent| {
            listener(MotionPreference::from_reduced(evt.matches()));
        });
        self.query
            .add_event_listener_with_callback(
                "change",
                closure.as_ref().unchecked_ref(),
            )
            .map_err(|e| PreferenceError::Listener(js_message(&e)))?;

        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let _ = self.listeners.borrow_mut().insert(id, closure);
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return;
        };
        if let Err(e) = self.query.remove_event_listener_with_callback(
            "change",
            closure.as_ref().unchecked_ref(),
        ) {
            log::debug!("removing preference listener: {}", js_message(&e));
        }
        self.retired.borrow_mut().push(closure);
    }
}

impl std::fmt::Debug for MediaQueryPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaQueryPreference")
            .field("matches", &self.query.matches())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
