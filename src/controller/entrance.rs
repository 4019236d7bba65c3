//! One-time entrance effects, on mount or on first entering the viewport.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use super::{Controller, FailureHook, Trigger};
use crate::animation::{
    contain, AnimationHandle, AnimationScope, EntranceEffect, Timeline,
};
use crate::engine::{
    EngineError, Intersection, Stage, TargetId, TriggerId, TweenId,
};
use crate::policy::{AnimationPolicy, EffectKind, FallbackStyle};

/// What an entrance plays.
#[derive(Debug, Clone, PartialEq)]
pub enum Choreography {
    /// The same effect on every target, offset by the policy's stagger.
    Stagger {
        /// Effect applied to each target.
        effect: EntranceEffect,
        /// Targets in stagger order.
        targets: Vec<TargetId>,
    },
    /// An explicitly sequenced timeline.
    Timeline(Timeline),
}

impl Choreography {
    /// A single target with `effect`.
    #[must_use]
    pub fn single(effect: EntranceEffect, target: TargetId) -> Self {
        Self::Stagger {
            effect,
            targets: vec![target],
        }
    }

    fn hide(&self, scope: &AnimationScope) -> Result<(), EngineError> {
        match self {
            Self::Stagger { effect, targets } => {
                for target in targets {
                    scope.set(target, &effect.hidden())?;
                }
                Ok(())
            }
            Self::Timeline(tl) => tl.hide(scope),
        }
    }

    fn settle(&self, scope: &AnimationScope) -> Result<(), EngineError> {
        match self {
            Self::Stagger { effect, targets } => {
                for target in targets {
                    scope.set(target, &effect.shown())?;
                }
                Ok(())
            }
            Self::Timeline(tl) => tl.settle(scope),
        }
    }

    fn play(
        &self,
        scope: &mut AnimationScope,
        policy: &AnimationPolicy,
    ) -> Result<Vec<TweenId>, EngineError> {
        match self {
            Self::Stagger { effect, targets } => {
                let mut ids = Vec::with_capacity(targets.len());
                for (i, target) in targets.iter().enumerate() {
                    if let Some(id) =
                        scope.tween(&effect.tween(target.clone(), policy, i))?
                    {
                        ids.push(id);
                    }
                }
                Ok(ids)
            }
            Self::Timeline(tl) => tl.play(scope, policy),
        }
    }
}

/// Configuration for an [`EntranceController`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntranceConfig {
    /// Element whose visibility fires a viewport trigger (usually the
    /// section container).
    pub anchor: TargetId,
    /// What to play.
    pub choreography: Choreography,
    /// When to play it.
    pub trigger: Trigger,
}

struct EntranceState {
    name: &'static str,
    scope: AnimationScope,
    config: EntranceConfig,
    policy: Option<AnimationPolicy>,
    trigger: Option<TriggerId>,
    tweens: Vec<TweenId>,
    plays: u32,
    shown: bool,
    degraded: bool,
    on_failure: Option<FailureHook>,
}

impl EntranceState {
    fn play(&mut self, policy: &AnimationPolicy) -> Result<(), EngineError> {
        self.stop_tweens();
        if policy.style_for(EffectKind::Entrance)
            == Some(FallbackStyle::InstantEndState)
        {
            self.config.choreography.settle(&self.scope)?;
        } else {
            self.tweens =
                self.config.choreography.play(&mut self.scope, policy)?;
        }
        self.plays += 1;
        self.shown = true;
        Ok(())
    }

    fn stop_tweens(&mut self) {
        for id in mem::take(&mut self.tweens) {
            self.scope.release(AnimationHandle::Tween(id));
        }
    }

    fn drop_trigger(&mut self) {
        if let Some(id) = self.trigger.take() {
            self.scope.release(AnimationHandle::Trigger(id));
        }
    }

    fn release(&mut self) {
        self.scope.release_all();
        self.tweens.clear();
        self.trigger = None;
    }

    fn settle(&mut self) {
        if let Err(e) = self.config.choreography.settle(&self.scope) {
            log::warn!("{}: could not apply final state: {e}", self.name);
        }
        self.shown = true;
    }

    fn degrade(&mut self) {
        self.release();
        self.settle();
        self.degraded = true;
    }

    /// Returns the hook to notify if the report led to a failure.
    fn on_intersection(&mut self, entry: Intersection) -> Option<FailureHook> {
        let Trigger::Viewport { threshold, replay } = self.config.trigger else {
            return None;
        };
        let policy = self.policy?;
        let name = self.name;

        if entry.reaches(threshold) {
            if self.shown {
                return None;
            }
            if contain(name, || self.play(&policy)).is_animated() {
                if !replay {
                    self.drop_trigger();
                }
                return None;
            }
        } else if replay && self.shown && !entry.is_intersecting {
            self.stop_tweens();
            if contain(name, || self.config.choreography.hide(&self.scope))
                .is_animated()
            {
                self.shown = false;
                return None;
            }
        } else {
            return None;
        }
        self.degrade();
        self.on_failure.clone()
    }
}

/// Plays a [`Choreography`] once per section lifetime.
///
/// With a viewport trigger the targets are hidden at mount and the trigger
/// is released right after the first play. With `replay` the trigger stays
/// registered; leaving the viewport hides the targets again.
///
/// Under reduced motion no trigger is registered at all: every target is
/// put in its final state at mount.
#[derive(Clone)]
pub struct EntranceController {
    inner: Rc<RefCell<EntranceState>>,
}

impl EntranceController {
    /// Create for `stage`. `name` labels logs.
    pub fn new(name: &'static str, stage: Stage, config: EntranceConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EntranceState {
                name,
                scope: AnimationScope::new(name, stage),
                config,
                policy: None,
                trigger: None,
                tweens: Vec::new(),
                plays: 0,
                shown: false,
                degraded: false,
                on_failure: None,
            })),
        }
    }

    /// How many times the entrance has been applied since mount, animated
    /// or instant.
    #[must_use]
    pub fn play_count(&self) -> u32 {
        self.inner.borrow().plays
    }

    /// Whether the targets are (or are becoming) visible.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.inner.borrow().shown
    }

    /// Whether a viewport trigger is waiting.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.borrow().trigger.is_some()
    }

    fn arm(
        &self,
        threshold: f32,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError> {
        let weak: Weak<RefCell<EntranceState>> = Rc::downgrade(&self.inner);
        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;
        state.config.choreography.hide(&state.scope)?;
        let anchor = state.config.anchor.clone();
        let name = state.name;
        state.trigger = state.scope.observe(
            &anchor,
            threshold,
            Box::new(move |entry| {
                let Some(cell) = weak.upgrade() else {
                    return;
                };
                let failed = match cell.try_borrow_mut() {
                    Ok(mut state) => state.on_intersection(entry),
                    Err(_) => {
                        log::trace!("entrance busy, dropping intersection report");
                        return;
                    }
                };
                if let Some(hook) = failed {
                    hook(name);
                }
            }),
        )?;
        if state.trigger.is_none() {
            // Without an anchor nothing would ever reveal the targets.
            log::debug!("{}: anchor `{anchor}` missing, revealing", state.name);
            state.play(policy)?;
        }
        Ok(())
    }
}

impl Controller for EntranceController {
    fn name(&self) -> &'static str {
        self.inner.borrow().name
    }

    fn mount(&mut self, policy: &AnimationPolicy) -> Result<(), EngineError> {
        let trigger = {
            let mut state = self.inner.borrow_mut();
            state.release();
            state.plays = 0;
            state.shown = false;
            state.degraded = false;
            state.policy = Some(*policy);
            if !policy.complex_effects_enabled {
                return state.play(policy);
            }
            state.config.trigger
        };
        match trigger {
            Trigger::Mount => self.inner.borrow_mut().play(policy),
            Trigger::Viewport { threshold, .. } => self.arm(threshold, policy),
        }
    }

    fn update_policy(
        &mut self,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError> {
        let mut state = self.inner.borrow_mut();
        state.policy = Some(*policy);
        if policy.complex_effects_enabled {
            return Ok(());
        }
        // Reduced motion supersedes whatever is pending or in flight.
        state.stop_tweens();
        state.drop_trigger();
        let state = &mut *state;
        state.config.choreography.settle(&state.scope)?;
        state.shown = true;
        Ok(())
    }

    fn settle(&mut self) {
        self.inner.borrow_mut().settle();
    }

    fn release(&mut self) {
        self.inner.borrow_mut().release();
    }

    fn is_degraded(&self) -> bool {
        self.inner.borrow().degraded
    }

    fn on_failure(&mut self, hook: FailureHook) {
        self.inner.borrow_mut().on_failure = Some(hook);
    }
}

impl std::fmt::Debug for EntranceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("EntranceController")
            .field("name", &state.name)
            .field("plays", &state.plays)
            .field("shown", &state.shown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::{FaultMode, HeadlessEngine, HeadlessViewport};
    use crate::policy::MotionProfile;
    use crate::preference::MotionPreference;

    fn policy(pref: MotionPreference) -> AnimationPolicy {
        AnimationPolicy::resolve(pref, &MotionProfile::natural())
    }

    fn cards() -> Vec<TargetId> {
        vec![TargetId::new("card-0"), TargetId::new("card-1")]
    }

    fn controller(
        trigger: Trigger,
    ) -> (EntranceController, Rc<HeadlessEngine>, Rc<HeadlessViewport>) {
        let (stage, engine, viewport) = Stage::headless();
        let config = EntranceConfig {
            anchor: TargetId::new("projects"),
            choreography: Choreography::Stagger {
                effect: EntranceEffect::ScrollReveal,
                targets: cards(),
            },
            trigger,
        };
        (EntranceController::new("projects", stage, config), engine, viewport)
    }

    #[test]
    fn mount_trigger_plays_staggered_tweens() {
        let (mut ctl, engine, _viewport) = controller(Trigger::Mount);
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        let created = engine.created();
        assert_eq!(created.len(), 2);
        assert_eq!(
            engine.tween_spec(created[1]).unwrap().delay,
            Duration::from_millis(100)
        );
        assert_eq!(ctl.play_count(), 1);
    }

    #[test]
    fn viewport_trigger_fires_once() {
        let (mut ctl, engine, viewport) =
            controller(Trigger::once_in_view(0.2));
        let anchor = TargetId::new("projects");
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        assert!(ctl.is_armed());
        assert_eq!(
            engine.state_of(&cards()[0]).unwrap().opacity,
            Some(0.0)
        );

        viewport.report(&anchor, 0.1);
        assert_eq!(ctl.play_count(), 0);

        viewport.scroll_into_view(&anchor);
        viewport.scroll_out_of_view(&anchor);
        viewport.scroll_into_view(&anchor);

        assert_eq!(ctl.play_count(), 1);
        assert!(!ctl.is_armed());
        let trigger = viewport.created()[0];
        assert_eq!(viewport.unobserve_count(trigger), 1);

        ctl.release();
        assert_eq!(viewport.unobserve_count(trigger), 1);
    }

    #[test]
    fn replay_hides_on_exit_and_plays_again() {
        let (mut ctl, engine, viewport) = controller(Trigger::Viewport {
            threshold: 0.2,
            replay: true,
        });
        let anchor = TargetId::new("projects");
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();

        viewport.scroll_into_view(&anchor);
        engine.advance(Duration::from_secs(1));
        assert_eq!(engine.state_of(&cards()[1]).unwrap().opacity, Some(1.0));

        viewport.scroll_out_of_view(&anchor);
        assert!(!ctl.is_shown());
        assert_eq!(engine.state_of(&cards()[1]).unwrap().opacity, Some(0.0));

        viewport.scroll_into_view(&anchor);
        assert_eq!(ctl.play_count(), 2);
        assert!(ctl.is_armed());
    }

    #[test]
    fn reduced_motion_shows_final_state_without_trigger() {
        let (mut ctl, engine, viewport) =
            controller(Trigger::once_in_view(0.2));
        ctl.mount(&policy(MotionPreference::Reduce)).unwrap();

        assert!(viewport.created().is_empty());
        assert!(engine.created().is_empty());
        let card = engine.state_of(&cards()[0]).unwrap();
        assert_eq!(card.opacity, Some(1.0));
        assert_eq!(card.y, Some(0.0));
    }

    #[test]
    fn switching_to_reduced_drops_pending_trigger() {
        let (mut ctl, engine, viewport) =
            controller(Trigger::once_in_view(0.2));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        ctl.update_policy(&policy(MotionPreference::Reduce)).unwrap();

        assert!(!ctl.is_armed());
        assert_eq!(viewport.unobserve_count(viewport.created()[0]), 1);
        assert_eq!(engine.state_of(&cards()[0]).unwrap().opacity, Some(1.0));
    }

    #[test]
    fn missing_anchor_reveals_immediately() {
        let (mut ctl, engine, viewport) =
            controller(Trigger::once_in_view(0.2));
        engine.remove_target(&TargetId::new("projects"));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        assert!(viewport.created().is_empty());
        assert_eq!(ctl.play_count(), 1);
    }

    #[test]
    fn failure_inside_trigger_degrades_to_static() {
        let (mut ctl, engine, viewport) =
            controller(Trigger::once_in_view(0.2));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.set_fault(FaultMode::Panic);

        viewport.scroll_into_view(&TargetId::new("projects"));

        assert!(ctl.is_degraded());
        assert!(!ctl.is_armed());
        assert!(engine.live_handles().is_empty());
    }

    #[test]
    fn failure_inside_trigger_is_reported_once() {
        let (mut ctl, engine, viewport) =
            controller(Trigger::once_in_view(0.2));
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        ctl.on_failure(Rc::new(move |name| sink.borrow_mut().push(name)));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.set_fault(FaultMode::Error);

        viewport.scroll_into_view(&TargetId::new("projects"));
        viewport.scroll_into_view(&TargetId::new("projects"));

        assert_eq!(*reports.borrow(), vec!["projects"]);
    }
}
