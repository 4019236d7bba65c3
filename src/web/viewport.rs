use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use super::{document, js_error};
use crate::engine::{
    EngineError, Intersection, IntersectionCallback, TargetId, TriggerId,
    ViewportObserver,
};

type EntriesClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct Observation {
    observer: IntersectionObserver,
    _callback: EntriesClosure,
}

/// Viewport triggers on top of `IntersectionObserver`.
///
/// A trigger may be unobserved from inside its own callback. The observer
/// is disconnected at once, but its closure is only dropped on the next
/// [`observe`](ViewportObserver::observe) call.
pub struct DomViewport {
    document: Document,
    observations: RefCell<FxHashMap<TriggerId, Observation>>,
    retired: RefCell<Vec<Observation>>,
    next_id: Cell<u64>,
}

impl DomViewport {
    /// Observe elements of the current document.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            document: document()?,
            observations: RefCell::new(FxHashMap::default()),
            retired: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        })
    }
}

impl ViewportObserver for DomViewport {
    fn observe(
        &self,
        target: &TargetId,
        threshold: f32,
        mut callback: IntersectionCallback,
    ) -> Result<TriggerId, EngineError> {
        self.retired.borrow_mut().clear();

        let element = self
            .document
            .get_element_by_id(target.as_str())
            .ok_or_else(|| {
                EngineError::Rejected(format!("no element `{target}`"))
            })?;

        let closure = EntriesClosure::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    callback(Intersection {
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio() as f32,
                    });
                }
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(f64::from(threshold)));
        let observer = IntersectionObserver::new_with_options(
            closure.as_ref().unchecked_ref(),
            &init,
        )
        .map_err(js_error)?;
        observer.observe(&element);

        let id = TriggerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let _ = self.observations.borrow_mut().insert(
            id,
            Observation {
                observer,
                _callback: closure,
            },
        );
        Ok(id)
    }

    fn unobserve(&self, id: TriggerId) {
        let Some(observation) = self.observations.borrow_mut().remove(&id)
        else {
            return;
        };
        observation.observer.disconnect();
        self.retired.borrow_mut().push(observation);
    }
}

impl std::fmt::Debug for DomViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomViewport")
            .field("observations", &self.observations.borrow().len())
            .finish_non_exhaustive()
    }
}
