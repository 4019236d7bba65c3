//! Per-component animation controllers.
//!
//! Each controller owns one kind of effect for one section and every handle
//! it creates (through its own [`AnimationScope`](crate::animation::AnimationScope)).
//! Entrance, hover and counter controllers are cheap-to-clone handles: the
//! section keeps one copy to drive the lifecycle, the view keeps another to
//! forward pointer events or read counter text. A continuous loop has no
//! view-facing state and is owned by its section outright.

mod continuous;
mod counter;
mod entrance;
mod hover;

pub use continuous::ContinuousController;
pub use counter::{CounterConfig, CounterController, TextSink};
pub use entrance::{Choreography, EntranceConfig, EntranceController};
pub use hover::{HoverController, HoverEffect};

use std::rc::Rc;

use crate::engine::EngineError;
use crate::policy::AnimationPolicy;

/// Told the name of a controller whose effect failed outside any section
/// call (a viewport report, a pointer event). Never invoked while the
/// controller itself is borrowed.
pub type FailureHook = Rc<dyn Fn(&'static str)>;

/// When a one-time effect fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// As soon as the section mounts.
    Mount,
    /// When the anchor's visible fraction first reaches `threshold`.
    Viewport {
        /// Visible fraction that counts as "in view".
        threshold: f32,
        /// Reset on scroll-out and play again on the next entry.
        replay: bool,
    },
}

impl Trigger {
    /// Fire once on first reaching `threshold`.
    #[must_use]
    pub fn once_in_view(threshold: f32) -> Self {
        Self::Viewport {
            threshold,
            replay: false,
        }
    }
}

/// Lifecycle contract between a section and one of its controllers.
///
/// The section calls [`mount`](Self::mount) once with the resolved policy,
/// [`update_policy`](Self::update_policy) whenever the preference changes,
/// and [`release`](Self::release) on unmount. If any controller fails, the
/// section releases and [`settle`](Self::settle)s all of them.
pub trait Controller {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Arm or start the controller's effects.
    fn mount(&mut self, policy: &AnimationPolicy) -> Result<(), EngineError>;

    /// React to a new policy, superseding anything the old one started.
    fn update_policy(
        &mut self,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError>;

    /// Put every target in its static final state. Must not fail.
    fn settle(&mut self);

    /// Release every handle. Idempotent.
    fn release(&mut self);

    /// Whether a failure after mount already forced static content.
    fn is_degraded(&self) -> bool {
        false
    }

    /// Report later failures through `hook`. Controllers whose effects
    /// only start inside section calls can ignore it.
    fn on_failure(&mut self, _hook: FailureHook) {}
}
