//! Seams to the underlying animation engine and viewport geometry.
//!
//! Controllers never reach for a global animation runtime. They talk to an
//! [`AnimationEngine`] (tweens, instant sets, per-frame tickers) and a
//! [`ViewportObserver`] (intersection triggers) handed to them through a
//! [`Stage`]. The browser implementations live in the `web` module; the
//! [`headless`] implementations serve non-browser execution and tests.
//!
//! All methods take `&self`: engines are shared between every controller
//! of a page and are expected to use interior mutability. Implementations
//! must never invoke a caller-supplied callback synchronously from within
//! the call that registered it.

pub mod headless;

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::util::easing::EasingFunction;

pub use headless::{FaultMode, HeadlessEngine, HeadlessViewport};

/// Identifies a visual element (a DOM element id in the browser).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(String);

impl TargetId {
    /// Wrap an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a process-unique id of the form `"{prefix}-{n}"`.
    #[must_use]
    pub fn unique(prefix: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Self(format!("{prefix}-{n}"))
    }

    /// The raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Animatable properties of a target. `None` leaves a property untouched.
///
/// Translations are in CSS pixels, rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualState {
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f32>,
    /// Horizontal offset.
    pub x: Option<f32>,
    /// Vertical offset.
    pub y: Option<f32>,
    /// Uniform scale.
    pub scale: Option<f32>,
    /// Horizontal-only scale (progress bars).
    pub scale_x: Option<f32>,
    /// Rotation.
    pub rotate: Option<f32>,
}

impl VisualState {
    /// Nothing set.
    pub const EMPTY: Self = Self {
        opacity: None,
        x: None,
        y: None,
        scale: None,
        scale_x: None,
        rotate: None,
    };

    /// Fully visible at its layout position.
    pub const SHOWN: Self = Self {
        opacity: Some(1.0),
        x: Some(0.0),
        y: Some(0.0),
        scale: None,
        scale_x: None,
        rotate: None,
    };

    /// Set opacity.
    #[must_use]
    pub fn opacity(mut self, v: f32) -> Self {
        self.opacity = Some(v);
        self
    }

    /// Set horizontal offset.
    #[must_use]
    pub fn x(mut self, v: f32) -> Self {
        self.x = Some(v);
        self
    }

    /// Set vertical offset.
    #[must_use]
    pub fn y(mut self, v: f32) -> Self {
        self.y = Some(v);
        self
    }

    /// Set uniform scale.
    #[must_use]
    pub fn scale(mut self, v: f32) -> Self {
        self.scale = Some(v);
        self
    }

    /// Set horizontal scale.
    #[must_use]
    pub fn scale_x(mut self, v: f32) -> Self {
        self.scale_x = Some(v);
        self
    }

    /// Set rotation.
    #[must_use]
    pub fn rotate(mut self, v: f32) -> Self {
        self.rotate = Some(v);
        self
    }

    /// Overlay `other` on top of `self`: properties set in `other` win.
    #[must_use]
    pub fn merged(self, other: &Self) -> Self {
        Self {
            opacity: other.opacity.or(self.opacity),
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            scale: other.scale.or(self.scale),
            scale_x: other.scale_x.or(self.scale_x),
            rotate: other.rotate.or(self.rotate),
        }
    }

    /// Copy with every positional property removed, keeping only opacity.
    #[must_use]
    pub fn without_motion(self) -> Self {
        Self {
            opacity: self.opacity,
            ..Self::EMPTY
        }
    }

    /// Whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// CSS `transform` value for the positional properties, if any are set.
    #[must_use]
    pub fn css_transform(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.x.is_some() || self.y.is_some() {
            parts.push(format!(
                "translate({}px, {}px)",
                self.x.unwrap_or(0.0),
                self.y.unwrap_or(0.0)
            ));
        }
        if let Some(s) = self.scale {
            parts.push(format!("scale({s})"));
        }
        if let Some(s) = self.scale_x {
            parts.push(format!("scaleX({s})"));
        }
        if let Some(r) = self.rotate {
            parts.push(format!("rotate({r}deg)"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// How many times a tween plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Play once.
    #[default]
    Once,
    /// Play this many times in total.
    Times(u32),
    /// Loop until killed.
    Forever,
}

/// A single property tween.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSpec {
    /// Element to animate.
    pub target: TargetId,
    /// Starting state; `None` tweens from whatever is currently applied.
    pub from: Option<VisualState>,
    /// End state.
    pub to: VisualState,
    /// Duration of one iteration.
    pub duration: Duration,
    /// Delay before the first iteration.
    pub delay: Duration,
    /// Easing curve.
    pub easing: EasingFunction,
    /// Iteration count.
    pub repeat: Repeat,
    /// Alternate direction on every other iteration.
    pub yoyo: bool,
}

impl TweenSpec {
    /// Tween `target` from `from` to `to`, once, with no delay.
    #[must_use]
    pub fn from_to(
        target: TargetId,
        from: VisualState,
        to: VisualState,
        duration: Duration,
        easing: EasingFunction,
    ) -> Self {
        Self {
            target,
            from: Some(from),
            to,
            duration,
            delay: Duration::ZERO,
            easing,
            repeat: Repeat::Once,
            yoyo: false,
        }
    }

    /// Tween `target` from its current state to `to`.
    #[must_use]
    pub fn to(
        target: TargetId,
        to: VisualState,
        duration: Duration,
        easing: EasingFunction,
    ) -> Self {
        Self {
            target,
            from: None,
            to,
            duration,
            delay: Duration::ZERO,
            easing,
            repeat: Repeat::Once,
            yoyo: false,
        }
    }

    /// Set the start delay.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set repetition and yoyo.
    #[must_use]
    pub fn repeating(mut self, repeat: Repeat, yoyo: bool) -> Self {
        self.repeat = repeat;
        self.yoyo = yoyo;
        self
    }

    /// Time until the tween completes, or `None` if it loops forever.
    #[must_use]
    pub fn total_time(&self) -> Option<Duration> {
        let iterations = match self.repeat {
            Repeat::Once => 1,
            Repeat::Times(n) => n.max(1),
            Repeat::Forever => return None,
        };
        Some(self.delay + self.duration.saturating_mul(iterations))
    }
}

/// Timing for a per-frame ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerSpec {
    /// Total run time.
    pub duration: Duration,
    /// Delay before the first frame.
    pub delay: Duration,
    /// Easing applied to the progress handed to the callback.
    pub easing: EasingFunction,
}

/// Callback receiving eased progress in `[0, 1]` once per frame. The last
/// call always receives exactly `1.0`.
pub type FrameCallback = Box<dyn FnMut(f32)>;

/// Callback receiving viewport intersection changes.
pub type IntersectionCallback = Box<dyn FnMut(Intersection)>;

/// Handle for a running tween or ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// Handle for a registered viewport trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(pub u64);

/// One intersection report for an observed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Whether any part of the target is inside the viewport.
    pub is_intersecting: bool,
    /// Fraction of the target that is visible, `[0, 1]`.
    pub ratio: f32,
}

impl Intersection {
    /// Whether the target counts as "in view" for `threshold`.
    #[must_use]
    pub fn reaches(&self, threshold: f32) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

/// Failure reported by an engine or viewport observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine refused or failed the call.
    Rejected(String),
    /// The engine cannot perform this kind of animation.
    Unsupported(&'static str),
    /// A JavaScript exception escaped the browser API.
    Js(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(msg) => write!(f, "animation rejected: {msg}"),
            Self::Unsupported(what) => {
                write!(f, "animation engine does not support {what}")
            }
            Self::Js(msg) => write!(f, "javascript error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Drives visual changes on targets.
pub trait AnimationEngine {
    /// Whether `target` currently exists.
    fn has_target(&self, target: &TargetId) -> bool;

    /// Apply `state` immediately, cancelling nothing.
    fn set(
        &self,
        target: &TargetId,
        state: &VisualState,
    ) -> Result<(), EngineError>;

    /// Start a tween.
    fn tween(&self, spec: &TweenSpec) -> Result<TweenId, EngineError>;

    /// Start a per-frame ticker.
    fn ticker(
        &self,
        spec: &TickerSpec,
        on_frame: FrameCallback,
    ) -> Result<TweenId, EngineError>;

    /// Stop and discard a tween or ticker. Unknown ids are ignored.
    fn kill(&self, id: TweenId);

    /// Whether a tween or ticker is still running.
    fn is_active(&self, id: TweenId) -> bool;
}

/// Reports when targets enter and leave the viewport.
pub trait ViewportObserver {
    /// Start observing `target`. `threshold` is the visible fraction at
    /// which reports are emitted.
    fn observe(
        &self,
        target: &TargetId,
        threshold: f32,
        callback: IntersectionCallback,
    ) -> Result<TriggerId, EngineError>;

    /// Stop observing. Unknown ids are ignored.
    fn unobserve(&self, id: TriggerId);
}

/// The engine and viewport a page's controllers share.
#[derive(Clone)]
pub struct Stage {
    /// Animation engine.
    pub engine: Rc<dyn AnimationEngine>,
    /// Viewport observer.
    pub viewport: Rc<dyn ViewportObserver>,
}

impl Stage {
    /// Bundle an engine and viewport.
    pub fn new(
        engine: Rc<dyn AnimationEngine>,
        viewport: Rc<dyn ViewportObserver>,
    ) -> Self {
        Self { engine, viewport }
    }

    /// A headless stage, returning the concrete parts for inspection.
    #[must_use]
    pub fn headless() -> (Self, Rc<HeadlessEngine>, Rc<HeadlessViewport>) {
        let engine = Rc::new(HeadlessEngine::new());
        let viewport = Rc::new(HeadlessViewport::new());
        let stage = Self::new(engine.clone(), viewport.clone());
        (stage, engine, viewport)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").finish_non_exhaustive()
    }
}
