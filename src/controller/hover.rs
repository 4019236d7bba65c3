//! Pointer hover transitions.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Controller, FailureHook};
use crate::animation::{contain, AnimationHandle, AnimationScope};
use crate::engine::{
    EngineError, Stage, TargetId, TweenId, TweenSpec, VisualState,
};
use crate::policy::{AnimationPolicy, EffectKind, FallbackStyle};

/// The two states a hover transition moves between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEffect {
    /// State while the pointer is over the target.
    pub hovered: VisualState,
    /// State otherwise.
    pub idle: VisualState,
}

impl HoverEffect {
    /// Lift and slightly enlarge a card.
    #[must_use]
    pub fn lift() -> Self {
        Self {
            hovered: VisualState::EMPTY.y(-4.0).scale(1.05),
            idle: VisualState::EMPTY.y(0.0).scale(1.0),
        }
    }

    /// Fade a decorative glow in and out.
    #[must_use]
    pub fn glow() -> Self {
        Self {
            hovered: VisualState::EMPTY.opacity(1.0),
            idle: VisualState::EMPTY.opacity(0.0),
        }
    }

    fn state(&self, hovered: bool, reduce: bool) -> VisualState {
        let state = if hovered { self.hovered } else { self.idle };
        if reduce {
            state.without_motion()
        } else {
            state
        }
    }
}

struct HoverState {
    name: &'static str,
    scope: AnimationScope,
    target: TargetId,
    effect: HoverEffect,
    policy: Option<AnimationPolicy>,
    current: Option<TweenId>,
    hovered: bool,
    on_failure: Option<FailureHook>,
}

impl HoverState {
    fn transition(&mut self, hovered: bool) -> Result<(), EngineError> {
        let Some(policy) = self.policy else {
            return Ok(());
        };
        if let Some(id) = self.current.take() {
            self.scope.release(AnimationHandle::Tween(id));
        }
        let reduce = policy.style_for(EffectKind::Hover)
            == Some(FallbackStyle::Reduce);
        let to = self.effect.state(hovered, reduce);
        if to.is_empty() {
            return Ok(());
        }
        let spec =
            TweenSpec::to(self.target.clone(), to, policy.duration, policy.easing);
        self.current = self.scope.tween(&spec)?;
        Ok(())
    }
}

/// Responds to pointer enter/leave on one target.
///
/// Hover is always available, even under reduced motion, but then only
/// opacity changes and the transition uses the reduced duration. Events
/// before mount or after release are ignored. A newer event kills the
/// transition of the previous one.
#[derive(Clone)]
pub struct HoverController {
    inner: Rc<RefCell<HoverState>>,
}

impl HoverController {
    /// Create for `stage`. `name` labels logs.
    pub fn new(
        name: &'static str,
        stage: Stage,
        target: TargetId,
        effect: HoverEffect,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HoverState {
                name,
                scope: AnimationScope::new(name, stage),
                target,
                effect,
                policy: None,
                current: None,
                hovered: false,
                on_failure: None,
            })),
        }
    }

    /// Pointer entered the target.
    pub fn enter(&self) {
        self.set_hovered(true);
    }

    /// Pointer left the target.
    pub fn leave(&self) {
        self.set_hovered(false);
    }

    /// Whether the pointer is over the target.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.inner.borrow().hovered
    }

    fn set_hovered(&self, hovered: bool) {
        let (name, hook) = {
            let Ok(mut state) = self.inner.try_borrow_mut() else {
                return;
            };
            if state.hovered == hovered {
                return;
            }
            state.hovered = hovered;
            let name = state.name;
            if contain(name, || state.transition(hovered)).is_animated() {
                return;
            }
            // Jump straight to the end state instead.
            let target = state.target.clone();
            let end = state.effect.state(hovered, false);
            state.current = None;
            state.scope.release_all();
            if let Err(e) = state.scope.set(&target, &end) {
                log::warn!("{name}: could not apply hover state: {e}");
            }
            (name, state.on_failure.clone())
        };
        if let Some(hook) = hook {
            hook(name);
        }
    }
}

impl Controller for HoverController {
    fn name(&self) -> &'static str {
        self.inner.borrow().name
    }

    fn mount(&mut self, policy: &AnimationPolicy) -> Result<(), EngineError> {
        let mut state = self.inner.borrow_mut();
        state.policy = Some(*policy);
        state.hovered = false;
        Ok(())
    }

    fn update_policy(
        &mut self,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError> {
        let mut state = self.inner.borrow_mut();
        state.policy = Some(*policy);
        Ok(())
    }

    fn settle(&mut self) {
        let mut state = self.inner.borrow_mut();
        let state = &mut *state;
        if let Some(id) = state.current.take() {
            state.scope.release(AnimationHandle::Tween(id));
        }
        let end = state.effect.state(state.hovered, false);
        if let Err(e) = state.scope.set(&state.target, &end) {
            log::warn!("{}: could not apply hover state: {e}", state.name);
        }
    }

    fn release(&mut self) {
        let mut state = self.inner.borrow_mut();
        state.policy = None;
        state.current = None;
        state.scope.release_all();
    }

    fn on_failure(&mut self, hook: FailureHook) {
        self.inner.borrow_mut().on_failure = Some(hook);
    }
}

impl std::fmt::Debug for HoverController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("HoverController")
            .field("name", &state.name)
            .field("target", &state.target)
            .field("hovered", &state.hovered)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::{FaultMode, HeadlessEngine};
    use crate::policy::MotionProfile;
    use crate::preference::MotionPreference;
    use crate::util::easing::EasingFunction;

    fn policy(pref: MotionPreference) -> AnimationPolicy {
        AnimationPolicy::resolve(pref, &MotionProfile::natural())
    }

    fn card() -> (HoverController, Rc<HeadlessEngine>) {
        let (stage, engine, _viewport) = Stage::headless();
        let ctl = HoverController::new(
            "project-card",
            stage,
            TargetId::new("card"),
            HoverEffect::lift(),
        );
        (ctl, engine)
    }

    #[test]
    fn ignored_before_mount() {
        let (ctl, engine) = card();
        ctl.enter();
        assert!(engine.created().is_empty());
    }

    #[test]
    fn full_motion_lifts_with_policy_timing() {
        let (mut ctl, engine) = card();
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        ctl.enter();
        let spec = engine.tween_spec(engine.created()[0]).unwrap();
        assert_eq!(spec.to.y, Some(-4.0));
        assert_eq!(spec.duration, Duration::from_millis(600));
        assert_eq!(spec.easing, EasingFunction::CubicOut);
    }

    #[test]
    fn reduced_motion_keeps_hover_without_transform() {
        let (stage, engine, _viewport) = Stage::headless();
        let mut ctl = HoverController::new(
            "glow",
            stage,
            TargetId::new("glow"),
            HoverEffect::glow(),
        );
        ctl.mount(&policy(MotionPreference::Reduce)).unwrap();
        ctl.enter();
        let spec = engine.tween_spec(engine.created()[0]).unwrap();
        assert_eq!(spec.to, VisualState::EMPTY.opacity(1.0));
        assert_eq!(spec.duration, Duration::from_millis(100));
        assert_eq!(spec.easing, EasingFunction::Linear);
    }

    #[test]
    fn lift_has_nothing_to_animate_under_reduced_motion() {
        let (mut ctl, engine) = card();
        ctl.mount(&policy(MotionPreference::Reduce)).unwrap();
        ctl.enter();
        assert!(engine.created().is_empty());
        assert!(ctl.is_hovered());
    }

    #[test]
    fn new_event_kills_previous_transition() {
        let (mut ctl, engine) = card();
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        ctl.enter();
        ctl.leave();
        let created = engine.created();
        assert_eq!(created.len(), 2);
        assert_eq!(engine.kill_count(created[0]), 1);
        assert_eq!(engine.live_handles(), vec![created[1]]);
    }

    #[test]
    fn engine_failure_jumps_to_end_state() {
        let (mut ctl, engine) = card();
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.set_fault(FaultMode::Panic);
        ctl.enter();
        let state = engine.state_of(&TargetId::new("card")).unwrap();
        assert_eq!(state.y, Some(-4.0));
        assert_eq!(state.scale, Some(1.05));
    }

    #[test]
    fn failed_transition_jumps_to_end_and_reports() {
        let (mut ctl, engine) = card();
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        ctl.on_failure(Rc::new(move |name| sink.borrow_mut().push(name)));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.set_fault(FaultMode::Panic);

        ctl.enter();

        let card = engine.state_of(&TargetId::new("card"));
        assert_eq!(card.and_then(|s| s.y), Some(-4.0));
        assert_eq!(*reports.borrow(), vec!["project-card"]);
    }
}
