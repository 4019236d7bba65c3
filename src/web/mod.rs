//! Browser implementations of the engine, viewport and preference seams.
//!
//! - [`MediaQueryPreference`] watches `(prefers-reduced-motion: reduce)`
//! - [`DomViewport`] registers one `IntersectionObserver` per trigger
//! - [`WebAnimationsEngine`] drives `Element.animate()` tweens, inline-style
//!   sets and `requestAnimationFrame` tickers
//!
//! [`page`] wires all three together for the current document.

mod engine;
mod preference;
mod viewport;

use std::rc::Rc;

pub use engine::WebAnimationsEngine;
pub use preference::{MediaQueryPreference, REDUCED_MOTION_QUERY};
pub use viewport::DomViewport;
use wasm_bindgen::JsValue;

use crate::engine::{EngineError, Stage};
use crate::error::FolioError;
use crate::preference::MotionOracle;

/// Install the console logger and panic hook. Safe to call more than once.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(level) {
        log::debug!("console logger already installed: {e}");
    }
}

/// Stage and motion oracle for the current page.
///
/// A browser without `matchMedia` still gets a working page: the oracle
/// just reports no preference.
pub fn page() -> Result<(Stage, MotionOracle), FolioError> {
    let engine = Rc::new(WebAnimationsEngine::new()?);
    let viewport = Rc::new(DomViewport::new()?);
    let oracle = match MediaQueryPreference::new() {
        Ok(source) => MotionOracle::new(Rc::new(source)),
        Err(e) => {
            log::debug!("{e}; motion preference unavailable");
            MotionOracle::unavailable()
        }
    };
    Ok((Stage::new(engine, viewport), oracle))
}

fn window() -> Result<web_sys::Window, EngineError> {
    web_sys::window().ok_or(EngineError::Unsupported("no global window"))
}

fn document() -> Result<web_sys::Document, EngineError> {
    window()?
        .document()
        .ok_or(EngineError::Unsupported("window has no document"))
}

/// Best-effort message out of a thrown JS value.
fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn js_error(value: JsValue) -> EngineError {
    EngineError::Js(js_message(&value))
}
