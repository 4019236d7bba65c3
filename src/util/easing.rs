//! Easing functions for animation interpolation.
//!
//! Every curve maps progress in `[0, 1]` onto eased progress in `[0, 1]` and
//! can be expressed as a CSS timing function for the browser engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-out (fast start, slow end).
    QuadraticOut,
    /// Cubic ease-out, the site's standard entrance curve.
    CubicOut,
    /// Cubic ease-in-out, used by yoyo loops.
    CubicInOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// Value at t = 1/3.
        c1: f32,
        /// Value at t = 2/3.
        c2: f32,
    },
}

impl EasingFunction {
    /// Default easing function: cubic ease-out.
    pub const DEFAULT: EasingFunction = EasingFunction::CubicOut;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    /// Returns the eased value, also in [0.0, 1.0].
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::CubicOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt * omt
            }
            EasingFunction::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let k = -2.0 * t + 2.0;
                    1.0 - k * k * k / 2.0
                }
            }
            EasingFunction::CubicHermite { c1, c2 } => {
                // c0 = 0 and c3 = 1 drop out of the Bernstein form
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }

    /// CSS `<easing-function>` equivalent, for engines that hand timing to
    /// the browser.
    #[must_use]
    pub fn css(&self) -> String {
        match self {
            EasingFunction::Linear => "linear".to_owned(),
            EasingFunction::QuadraticOut => {
                "cubic-bezier(0.5, 1, 0.89, 1)".to_owned()
            }
            EasingFunction::CubicOut => {
                "cubic-bezier(0.33, 1, 0.68, 1)".to_owned()
            }
            EasingFunction::CubicInOut => {
                "cubic-bezier(0.65, 0, 0.35, 1)".to_owned()
            }
            EasingFunction::CubicHermite { c1, c2 } => {
                // Hermite control values sit at t = 1/3 and t = 2/3.
                format!("cubic-bezier(0.333, {c1}, 0.667, {c2})")
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}
