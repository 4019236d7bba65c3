//! Idle loops that run for as long as the section is mounted.

use super::Controller;
use crate::animation::{AnimationHandle, AnimationScope, LoopEffect};
use crate::engine::{EngineError, Stage, TargetId, TweenId};
use crate::policy::{AnimationPolicy, EffectKind};

/// Runs one [`LoopEffect`] on one target while complex effects are enabled.
///
/// Under reduced motion the loop is omitted entirely and the target sits at
/// the effect's rest state. A policy change tears down the running loop
/// before anything else happens, so at most one loop handle is alive.
#[derive(Debug)]
pub struct ContinuousController {
    name: &'static str,
    scope: AnimationScope,
    target: TargetId,
    effect: LoopEffect,
    running: Option<TweenId>,
}

impl ContinuousController {
    /// Create for `stage`. `name` labels logs.
    pub fn new(
        name: &'static str,
        stage: Stage,
        target: TargetId,
        effect: LoopEffect,
    ) -> Self {
        Self {
            name,
            scope: AnimationScope::new(name, stage),
            target,
            effect,
            running: None,
        }
    }

    /// Whether a loop handle is currently owned.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn start(&mut self) -> Result<(), EngineError> {
        if self.running.is_some() {
            return Ok(());
        }
        self.running = self.scope.tween(&self.effect.tween(self.target.clone()))?;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(id) = self.running.take() {
            self.scope.release(AnimationHandle::Tween(id));
        }
    }

    fn rest(&self) -> Result<(), EngineError> {
        self.scope.set(&self.target, &self.effect.rest)
    }
}

impl Controller for ContinuousController {
    fn name(&self) -> &'static str {
        self.name
    }

    fn mount(&mut self, policy: &AnimationPolicy) -> Result<(), EngineError> {
        self.stop();
        if policy.animates(EffectKind::Continuous) {
            self.start()
        } else {
            self.rest()
        }
    }

    fn update_policy(
        &mut self,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError> {
        if policy.animates(EffectKind::Continuous) {
            self.start()
        } else {
            self.stop();
            self.rest()
        }
    }

    fn settle(&mut self) {
        self.stop();
        if let Err(e) = self.rest() {
            log::warn!(
                "{}: could not reset `{}` after {}: {e}",
                self.name,
                self.target,
                self.effect.name
            );
        }
    }

    fn release(&mut self) {
        self.running = None;
        self.scope.release_all();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::{FaultMode, HeadlessEngine};
    use crate::policy::MotionProfile;
    use crate::preference::MotionPreference;

    fn policy(pref: MotionPreference) -> AnimationPolicy {
        AnimationPolicy::resolve(pref, &MotionProfile::natural())
    }

    fn bouncing() -> (ContinuousController, std::rc::Rc<HeadlessEngine>) {
        let (stage, engine, _viewport) = Stage::headless();
        let ctl = ContinuousController::new(
            "scroll-hint",
            stage,
            TargetId::new("arrow"),
            LoopEffect::bounce(10.0, Duration::from_millis(1500)),
        );
        (ctl, engine)
    }

    #[test]
    fn loops_under_full_motion() {
        let (mut ctl, engine) = bouncing();
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        assert!(ctl.is_running());
        engine.advance(Duration::from_secs(60));
        assert_eq!(engine.looping_count(), 1);
    }

    #[test]
    fn omitted_under_reduced_motion() {
        let (mut ctl, engine) = bouncing();
        ctl.mount(&policy(MotionPreference::Reduce)).unwrap();
        assert!(!ctl.is_running());
        assert!(engine.created().is_empty());
        assert_eq!(
            engine.state_of(&TargetId::new("arrow")).unwrap().y,
            Some(0.0)
        );
    }

    #[test]
    fn preference_flip_kills_then_restarts() {
        let (mut ctl, engine) = bouncing();
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        let first = engine.created()[0];

        ctl.update_policy(&policy(MotionPreference::Reduce)).unwrap();
        assert_eq!(engine.kill_count(first), 1);
        assert_eq!(engine.looping_count(), 0);
        assert_eq!(engine.created().len(), 1);

        ctl.update_policy(&policy(MotionPreference::NoPreference)).unwrap();
        assert_eq!(engine.created().len(), 2);
        assert_eq!(engine.looping_count(), 1);
    }

    #[test]
    fn release_is_idempotent() {
        let (mut ctl, engine) = bouncing();
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        let id = engine.created()[0];
        ctl.release();
        ctl.release();
        assert_eq!(engine.kill_count(id), 1);
        assert!(!ctl.is_running());
    }

    #[test]
    fn engine_errors_surface_from_mount() {
        let (mut ctl, engine) = bouncing();
        engine.set_fault(FaultMode::Error);
        assert!(ctl.mount(&policy(MotionPreference::NoPreference)).is_err());
        assert!(!ctl.is_running());
    }
}
