//! Section lifecycle.
//!
//! An [`AnimatedSection`] is the unit of mounting, policy and failure
//! containment. It reads the motion preference once at mount, resolves its
//! [`AnimationPolicy`], mounts every controller under [`contain`], and then
//! follows preference changes until it is unmounted. A failure in any
//! controller turns the whole section static while sibling sections keep
//! animating.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::animation::{contain, Rendered};
use crate::controller::{Controller, FailureHook};
use crate::policy::{AnimationPolicy, MotionProfile, PolicyResolver};
use crate::preference::{MotionOracle, MotionPreference, Subscription};

/// Where a section is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionMode {
    /// Not mounted; no handles exist.
    #[default]
    Unmounted,
    /// Mounted with live animations.
    Live,
    /// Mounted, but animations failed and final-state content is shown.
    Static,
}

struct SectionState {
    name: &'static str,
    profile: MotionProfile,
    resolver: PolicyResolver,
    controllers: Vec<Box<dyn Controller>>,
    policy: Option<AnimationPolicy>,
    mode: SectionMode,
    subscription: Option<Subscription>,
    on_mode: Option<Box<dyn Fn(SectionMode)>>,
}

impl SectionState {
    fn set_mode(&mut self, mode: SectionMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if let Some(on_mode) = &self.on_mode {
            on_mode(mode);
        }
    }

    fn degrade(&mut self) {
        for controller in &mut self.controllers {
            controller.release();
            controller.settle();
        }
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.set_mode(SectionMode::Static);
    }

    /// A controller failed outside any section call.
    fn fail(&mut self, controller: &'static str) {
        if self.mode != SectionMode::Live {
            return;
        }
        log::warn!("{}: {controller} failed, showing static content", self.name);
        self.degrade();
    }

    fn mount_all(&mut self, policy: AnimationPolicy) {
        let name = self.name;
        let controllers = &mut self.controllers;
        let outcome = contain(name, || {
            for controller in controllers.iter_mut() {
                log::trace!("{name}: mounting {}", controller.name());
                controller.mount(&policy)?;
            }
            Ok(())
        });
        if outcome.is_animated() {
            self.set_mode(SectionMode::Live);
        } else {
            self.degrade();
        }
    }

    fn apply(&mut self, preference: MotionPreference) {
        if self.mode != SectionMode::Live {
            return;
        }
        let policy = self.resolver.resolve(preference, &self.profile);
        if self.policy == Some(policy) {
            return;
        }
        log::debug!(
            "{}: motion preference now {preference:?}, complex effects {}",
            self.name,
            if policy.complex_effects_enabled { "on" } else { "off" }
        );
        self.policy = Some(policy);

        let name = self.name;
        let controllers = &mut self.controllers;
        let outcome = contain(name, || {
            for controller in controllers.iter_mut() {
                controller.update_policy(&policy)?;
            }
            Ok(())
        });
        if !outcome.is_animated() {
            self.degrade();
        }
    }

    fn is_degraded(&self) -> bool {
        self.mode == SectionMode::Static
            || self.controllers.iter().any(|c| c.is_degraded())
    }
}

/// A group of controllers mounted, updated and torn down together.
///
/// Dropping the section unmounts it.
pub struct AnimatedSection {
    state: Rc<RefCell<SectionState>>,
    oracle: MotionOracle,
}

impl AnimatedSection {
    /// Create an unmounted section. `profile` is the timing the section
    /// would use with no motion restrictions.
    pub fn new(
        name: &'static str,
        oracle: MotionOracle,
        profile: MotionProfile,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(SectionState {
                name,
                profile,
                resolver: PolicyResolver::default(),
                controllers: Vec::new(),
                policy: None,
                mode: SectionMode::Unmounted,
                subscription: None,
                on_mode: None,
            })),
            oracle,
        }
    }

    /// Use `resolver` instead of the default reduced profile.
    #[must_use]
    pub fn with_resolver(self, resolver: PolicyResolver) -> Self {
        self.state.borrow_mut().resolver = resolver;
        self
    }

    /// Be told each time the section turns live or static, including a
    /// failure reported by a controller long after mount.
    pub fn on_mode_change(&mut self, f: impl Fn(SectionMode) + 'static) {
        self.state.borrow_mut().on_mode = Some(Box::new(f));
    }

    /// Add a controller. On a live section it is mounted right away.
    pub fn add(
        &mut self,
        mut controller: impl Controller + 'static,
    ) -> &mut Self {
        let weak = Rc::downgrade(&self.state);
        let hook: FailureHook = Rc::new(move |failed| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Ok(mut state) = state.try_borrow_mut() else {
                log::trace!("section busy, failure of {failed} not reported");
                return;
            };
            state.fail(failed);
        });
        controller.on_failure(hook);

        let mut state = self.state.borrow_mut();
        state.controllers.push(Box::new(controller));
        match (state.mode, state.policy) {
            (SectionMode::Live, Some(policy)) => {
                let name = state.name;
                let outcome = state
                    .controllers
                    .last_mut()
                    .map_or(Rendered::Animated(()), |c| {
                        contain(name, || c.mount(&policy))
                    });
                if !outcome.is_animated() {
                    state.degrade();
                }
            }
            (SectionMode::Static, _) => {
                if let Some(c) = state.controllers.last_mut() {
                    c.settle();
                }
            }
            _ => {}
        }
        drop(state);
        self
    }

    /// Mount: resolve the policy, start every controller and begin
    /// following preference changes. Mounting a mounted section is a no-op.
    pub fn mount(&mut self) -> SectionMode {
        let preference = self.oracle.current();
        {
            let mut state = self.state.borrow_mut();
            if state.mode != SectionMode::Unmounted {
                return state.mode;
            }
            let policy = state.resolver.resolve(preference, &state.profile);
            log::debug!(
                "{}: mounting {} controller(s) with {preference:?}",
                state.name,
                state.controllers.len()
            );
            state.policy = Some(policy);
            state.mount_all(policy);
            if state.mode == SectionMode::Static {
                return state.mode;
            }
        }

        let weak = Rc::downgrade(&self.state);
        let subscription = self.oracle.subscribe(move |preference| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Ok(mut state) = state.try_borrow_mut() else {
                log::trace!("section busy, preference change dropped");
                return;
            };
            state.apply(preference);
        });
        self.state.borrow_mut().subscription = Some(subscription);
        SectionMode::Live
    }

    /// Release every handle and stop following the preference. Safe to call
    /// more than once.
    pub fn unmount(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(mut subscription) = state.subscription.take() {
            subscription.cancel();
        }
        if state.mode == SectionMode::Unmounted {
            return;
        }
        log::debug!("{}: unmounting", state.name);
        for controller in &mut state.controllers {
            controller.release();
        }
        state.policy = None;
        state.mode = SectionMode::Unmounted;
    }

    /// Current lifecycle mode.
    #[must_use]
    pub fn mode(&self) -> SectionMode {
        self.state.borrow().mode
    }

    /// Policy in force, if mounted.
    #[must_use]
    pub fn policy(&self) -> Option<AnimationPolicy> {
        self.state.borrow().policy
    }

    /// Which view to present: the live one with its policy, or the static
    /// final-state fallback.
    #[must_use]
    pub fn rendered(&self) -> Rendered<AnimationPolicy> {
        let state = self.state.borrow();
        match state.policy {
            Some(policy) if !state.is_degraded() => Rendered::Animated(policy),
            _ => Rendered::Static,
        }
    }

    /// Whether preference changes are being followed.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.state
            .borrow()
            .subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }
}

impl Drop for AnimatedSection {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for AnimatedSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AnimatedSection")
            .field("name", &state.name)
            .field("mode", &state.mode)
            .field("controllers", &state.controllers.len())
            .finish_non_exhaustive()
    }
}
