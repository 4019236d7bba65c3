//! Per-section failure containment.
//!
//! Animation work runs inside [`contain`]. An engine error or a panic is
//! logged as a warning and turned into [`Rendered::Static`], telling the
//! caller to show its final-state markup. Nothing propagates past the
//! section that started the animation.

use std::panic::{self, AssertUnwindSafe};

use crate::engine::EngineError;

/// Which view a section should present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    /// Animations are live.
    Animated(T),
    /// Animations failed; show the static final state.
    Static,
}

impl<T> Rendered<T> {
    /// Whether the live view is in use.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated(_))
    }

    /// The live value, if any.
    pub fn animated(self) -> Option<T> {
        match self {
            Self::Animated(v) => Some(v),
            Self::Static => None,
        }
    }

    /// Pick the live view or build the static fallback.
    pub fn view<V>(
        self,
        live: impl FnOnce(T) -> V,
        fallback: impl FnOnce() -> V,
    ) -> V {
        match self {
            Self::Animated(v) => live(v),
            Self::Static => fallback(),
        }
    }
}

/// Run `work` for `section`, converting any failure into
/// [`Rendered::Static`].
///
/// Panics are caught with [`std::panic::catch_unwind`], so this also guards
/// against engines that panic instead of returning errors (on targets built
/// with `panic = "abort"` only the `Err` path applies).
pub fn contain<T>(
    section: &str,
    work: impl FnOnce() -> Result<T, EngineError>,
) -> Rendered<T> {
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(value)) => Rendered::Animated(value),
        Ok(Err(e)) => {
            log::warn!("{section}: animation failed, showing static content: {e}");
            Rendered::Static
        }
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_owned());
            log::warn!(
                "{section}: animation panicked, showing static content: {msg}"
            );
            Rendered::Static
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_animated() {
        let r = contain("hero", || Ok(7));
        assert_eq!(r, Rendered::Animated(7));
        assert!(r.is_animated());
    }

    #[test]
    fn error_falls_back_to_static() {
        let r: Rendered<()> =
            contain("hero", || Err(EngineError::Rejected("boom".to_owned())));
        assert_eq!(r, Rendered::Static);
    }

    #[test]
    #[allow(clippy::panic)]
    fn panic_falls_back_to_static() {
        let r: Rendered<()> = contain("hero", || panic!("engine exploded"));
        assert_eq!(r, Rendered::Static);
    }

    #[test]
    fn view_selects_fallback() {
        let failed: Rendered<u32> =
            contain("stats", || Err(EngineError::Unsupported("tickers")));
        let text = failed.view(|n| format!("animating {n}"), || "300+".to_owned());
        assert_eq!(text, "300+");
    }

    #[test]
    fn sibling_sections_are_independent() {
        let broken: Rendered<&str> =
            contain("skills", || Err(EngineError::Js("TypeError".to_owned())));
        let fine = contain("timeline", || Ok("live"));
        assert!(!broken.is_animated());
        assert_eq!(fine.animated(), Some("live"));
    }
}
