//! Web Animations API engine.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Object, Reflect};
use rustc_hash::FxHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Animation, Document, Element, HtmlElement};

use super::{document, js_error, js_message};
use crate::engine::{
    AnimationEngine, EngineError, FrameCallback, Repeat, TargetId, TickerSpec,
    TweenId, TweenSpec, VisualState,
};

// Direct global bindings, as in a plain rAF loop; no Window lookup per frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// A progress callback driven by `requestAnimationFrame`.
struct RafTicker {
    spec: TickerSpec,
    on_frame: RefCell<FrameCallback>,
    closure: RefCell<Option<RafClosure>>,
    started_at: Cell<Option<f64>>,
    raf_id: Cell<i32>,
    running: Cell<bool>,
}

impl RafTicker {
    fn start(spec: TickerSpec, on_frame: FrameCallback) -> Rc<Self> {
        let ticker = Rc::new(Self {
            spec,
            on_frame: RefCell::new(on_frame),
            closure: RefCell::new(None),
            started_at: Cell::new(None),
            raf_id: Cell::new(0),
            running: Cell::new(true),
        });
        let weak: Weak<Self> = Rc::downgrade(&ticker);
        let closure = RafClosure::new(move |now_ms: f64| {
            if let Some(ticker) = weak.upgrade() {
                ticker.frame(now_ms);
            }
        });
        *ticker.closure.borrow_mut() = Some(closure);
        ticker.request();
        ticker
    }

    fn request(&self) {
        if let Some(closure) = self.closure.borrow().as_ref() {
            self.raf_id
                .set(request_animation_frame(closure.as_ref().unchecked_ref()));
        }
    }

    fn frame(&self, now_ms: f64) {
        if !self.running.get() {
            return;
        }
        let started = self.started_at.get().unwrap_or(now_ms);
        self.started_at.set(Some(started));

        let elapsed = now_ms - started - self.spec.delay.as_secs_f64() * 1000.0;
        if elapsed < 0.0 {
            self.request();
            return;
        }
        let duration = self.spec.duration.as_secs_f64() * 1000.0;
        let raw = if duration <= 0.0 {
            1.0
        } else {
            (elapsed / duration).min(1.0) as f32
        };
        let eased = if raw >= 1.0 {
            self.running.set(false);
            1.0
        } else {
            self.spec.easing.evaluate(raw)
        };

        if let Ok(mut callback) = self.on_frame.try_borrow_mut() {
            (*callback)(eased);
        }
        if self.running.get() {
            self.request();
        }
    }

    fn stop(&self) {
        if self.running.replace(false) {
            cancel_animation_frame(self.raf_id.get());
        }
    }
}

#[derive(Default)]
struct WebInner {
    next_id: u64,
    animations: FxHashMap<TweenId, Animation>,
    tickers: FxHashMap<TweenId, Rc<RafTicker>>,
    // Killed tickers whose closure may still be on the stack.
    retired: Vec<Rc<RafTicker>>,
}

impl WebInner {
    fn next_id(&mut self) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Engine on top of `Element.animate()` and `requestAnimationFrame`.
///
/// Killing a tween commits its current styles inline before cancelling, so
/// the element keeps whatever state it had reached.
pub struct WebAnimationsEngine {
    document: Document,
    inner: RefCell<WebInner>,
}

impl WebAnimationsEngine {
    /// Animate elements of the current document.
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self {
            document: document()?,
            inner: RefCell::new(WebInner::default()),
        })
    }

    fn element(&self, target: &TargetId) -> Result<Element, EngineError> {
        self.document
            .get_element_by_id(target.as_str())
            .ok_or_else(|| {
                EngineError::Rejected(format!("no element `{target}`"))
            })
    }
}

fn keyframe(state: &VisualState) -> Result<Object, EngineError> {
    let frame = Object::new();
    if let Some(opacity) = state.opacity {
        let _ = Reflect::set(
            &frame,
            &JsValue::from_str("opacity"),
            &JsValue::from_f64(f64::from(opacity)),
        )
        .map_err(js_error)?;
    }
    if let Some(transform) = state.css_transform() {
        let _ = Reflect::set(
            &frame,
            &JsValue::from_str("transform"),
            &JsValue::from_str(&transform),
        )
        .map_err(js_error)?;
    }
    Ok(frame)
}

fn timing(spec: &TweenSpec) -> Result<Object, EngineError> {
    let iterations = match spec.repeat {
        Repeat::Once => 1.0,
        Repeat::Times(n) => f64::from(n.max(1)),
        Repeat::Forever => f64::INFINITY,
    };
    let options = Object::new();
    let fields: [(&str, JsValue); 6] = [
        (
            "duration",
            JsValue::from_f64(spec.duration.as_secs_f64() * 1000.0),
        ),
        ("delay", JsValue::from_f64(spec.delay.as_secs_f64() * 1000.0)),
        ("easing", JsValue::from_str(&spec.easing.css())),
        ("iterations", JsValue::from_f64(iterations)),
        (
            "direction",
            JsValue::from_str(if spec.yoyo { "alternate" } else { "normal" }),
        ),
        ("fill", JsValue::from_str("both")),
    ];
    for (key, value) in fields {
        let _ = Reflect::set(&options, &JsValue::from_str(key), &value)
            .map_err(js_error)?;
    }
    Ok(options)
}

fn call_method(target: &JsValue, name: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into::<Function>()?
        .call0(target)
}

impl AnimationEngine for WebAnimationsEngine {
    fn has_target(&self, target: &TargetId) -> bool {
        self.document.get_element_by_id(target.as_str()).is_some()
    }

    fn set(
        &self,
        target: &TargetId,
        state: &VisualState,
    ) -> Result<(), EngineError> {
        let element: HtmlElement = self
            .element(target)?
            .dyn_into()
            .map_err(|_| EngineError::Unsupported("non-HTML target"))?;
        let style = element.style();
        if let Some(opacity) = state.opacity {
            style
                .set_property("opacity", &opacity.to_string())
                .map_err(js_error)?;
        }
        if let Some(transform) = state.css_transform() {
            style.set_property("transform", &transform).map_err(js_error)?;
        }
        Ok(())
    }

    fn tween(&self, spec: &TweenSpec) -> Result<TweenId, EngineError> {
        let element = self.element(&spec.target)?;
        let keyframes = Array::new();
        if let Some(from) = &spec.from {
            let _ = keyframes.push(&keyframe(from)?.into());
        }
        let _ = keyframes.push(&keyframe(&spec.to)?.into());

        let animate: Function =
            Reflect::get(&element, &JsValue::from_str("animate"))
                .map_err(js_error)?
                .dyn_into()
                .map_err(|_| EngineError::Unsupported("Element.animate"))?;
        let animation: Animation = animate
            .call2(&element, &keyframes, &timing(spec)?.into())
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| EngineError::Unsupported("Element.animate"))?;

        let mut inner = self.inner.borrow_mut();
        inner.retired.clear();
        let id = inner.next_id();
        let _ = inner.animations.insert(id, animation);
        Ok(id)
    }

    fn ticker(
        &self,
        spec: &TickerSpec,
        on_frame: FrameCallback,
    ) -> Result<TweenId, EngineError> {
        let ticker = RafTicker::start(*spec, on_frame);
        let mut inner = self.inner.borrow_mut();
        inner.retired.clear();
        let id = inner.next_id();
        let _ = inner.tickers.insert(id, ticker);
        Ok(id)
    }

    fn kill(&self, id: TweenId) {
        let mut inner = self.inner.borrow_mut();
        if let Some(animation) = inner.animations.remove(&id) {
            // Throws for elements that are no longer rendered.
            if let Err(e) = call_method(&animation, "commitStyles") {
                log::trace!("commitStyles: {}", js_message(&e));
            }
            animation.cancel();
        } else if let Some(ticker) = inner.tickers.remove(&id) {
            ticker.stop();
            inner.retired.push(ticker);
        }
    }

    fn is_active(&self, id: TweenId) -> bool {
        let inner = self.inner.borrow();
        if let Some(ticker) = inner.tickers.get(&id) {
            return ticker.running.get();
        }
        inner.animations.get(&id).is_some_and(|animation| {
            Reflect::get(animation, &JsValue::from_str("playState"))
                .ok()
                .and_then(|s| s.as_string())
                .is_some_and(|s| s != "finished" && s != "idle")
        })
    }
}

impl std::fmt::Debug for WebAnimationsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("WebAnimationsEngine")
            .field("animations", &inner.animations.len())
            .field("tickers", &inner.tickers.len())
            .finish_non_exhaustive()
    }
}
