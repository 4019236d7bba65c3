//! Sequenced multi-target entrances.

use std::time::Duration;

use super::presets::EntranceEffect;
use super::scope::AnimationScope;
use crate::engine::{EngineError, TargetId, TweenId, TweenSpec, VisualState};
use crate::policy::{AnimationPolicy, EffectKind, FallbackStyle};

/// One tween placed on a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStep {
    /// Element to animate.
    pub target: TargetId,
    /// Start state.
    pub from: VisualState,
    /// End state.
    pub to: VisualState,
    /// Offset from the start of the timeline.
    pub start: Duration,
    /// Step duration.
    pub duration: Duration,
}

/// Ordered list of steps with explicit start offsets.
///
/// ```
/// use std::time::Duration;
/// use folio::animation::{EntranceEffect, Timeline};
/// use folio::engine::TargetId;
///
/// let ms = Duration::from_millis;
/// let hero = Timeline::new()
///     .then(TargetId::new("title"), EntranceEffect::FadeIn, ms(800))
///     .overlap(TargetId::new("subtitle"), EntranceEffect::FadeIn, ms(600), ms(400))
///     .with(TargetId::new("cta"), EntranceEffect::Pop, ms(600));
/// assert_eq!(hero.total(), ms(1000));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
}

impl Timeline {
    /// Empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn end(&self) -> Duration {
        self.steps
            .iter()
            .map(|s| s.start + s.duration)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn push(
        mut self,
        target: TargetId,
        effect: EntranceEffect,
        start: Duration,
        duration: Duration,
    ) -> Self {
        self.steps.push(TimelineStep {
            target,
            from: effect.hidden(),
            to: effect.shown(),
            start,
            duration,
        });
        self
    }

    /// Append a step starting when everything so far has finished.
    #[must_use]
    pub fn then(
        self,
        target: TargetId,
        effect: EntranceEffect,
        duration: Duration,
    ) -> Self {
        let start = self.end();
        self.push(target, effect, start, duration)
    }

    /// Append a step starting `overlap` before everything so far finishes.
    #[must_use]
    pub fn overlap(
        self,
        target: TargetId,
        effect: EntranceEffect,
        duration: Duration,
        overlap: Duration,
    ) -> Self {
        let start = self.end().saturating_sub(overlap);
        self.push(target, effect, start, duration)
    }

    /// Append a step starting together with the previous one.
    #[must_use]
    pub fn with(
        self,
        target: TargetId,
        effect: EntranceEffect,
        duration: Duration,
    ) -> Self {
        let start = self.steps.last().map_or(Duration::ZERO, |s| s.start);
        self.push(target, effect, start, duration)
    }

    /// Append a step at an absolute offset.
    #[must_use]
    pub fn at(
        self,
        start: Duration,
        target: TargetId,
        effect: EntranceEffect,
        duration: Duration,
    ) -> Self {
        self.push(target, effect, start, duration)
    }

    /// Steps in insertion order.
    #[must_use]
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// Time until the last step finishes.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.end()
    }

    /// Apply every step's start state.
    pub fn hide(&self, scope: &AnimationScope) -> Result<(), EngineError> {
        for step in &self.steps {
            scope.set(&step.target, &step.from)?;
        }
        Ok(())
    }

    /// Apply every step's end state.
    pub fn settle(&self, scope: &AnimationScope) -> Result<(), EngineError> {
        for step in &self.steps {
            scope.set(&step.target, &step.to)?;
        }
        Ok(())
    }

    /// Play the timeline into `scope` under `policy`.
    ///
    /// With complex effects disabled every step lands on its end state
    /// immediately and no tween is created.
    pub fn play(
        &self,
        scope: &mut AnimationScope,
        policy: &AnimationPolicy,
    ) -> Result<Vec<TweenId>, EngineError> {
        if policy.style_for(EffectKind::Timeline)
            == Some(FallbackStyle::InstantEndState)
        {
            self.settle(scope)?;
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let spec = TweenSpec::from_to(
                step.target.clone(),
                step.from,
                step.to,
                step.duration,
                policy.easing,
            )
            .delayed(step.start);
            if let Some(id) = scope.tween(&spec)? {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Stage;
    use crate::policy::MotionProfile;
    use crate::preference::MotionPreference;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn hero() -> Timeline {
        Timeline::new()
            .then(TargetId::new("title"), EntranceEffect::FadeIn, ms(800))
            .overlap(
                TargetId::new("subtitle"),
                EntranceEffect::FadeIn,
                ms(600),
                ms(400),
            )
            .then(TargetId::new("cta"), EntranceEffect::Pop, ms(500))
    }

    #[test]
    fn offsets_follow_builder_calls() {
        let tl = hero();
        let starts: Vec<Duration> = tl.steps().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![ms(0), ms(400), ms(1000)]);
        assert_eq!(tl.total(), ms(1500));
    }

    #[test]
    fn with_shares_the_previous_start() {
        let tl = Timeline::new()
            .at(ms(200), TargetId::new("a"), EntranceEffect::FadeIn, ms(300))
            .with(TargetId::new("b"), EntranceEffect::TextReveal, ms(100));
        assert_eq!(tl.steps()[1].start, ms(200));
        assert_eq!(tl.total(), ms(500));
    }

    #[test]
    fn full_motion_creates_delayed_tweens() {
        let (stage, engine, _viewport) = Stage::headless();
        let mut scope = AnimationScope::new("hero", stage);
        let policy = AnimationPolicy::resolve(
            MotionPreference::NoPreference,
            &MotionProfile::natural(),
        );
        let ids = hero().play(&mut scope, &policy).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(engine.tween_spec(ids[2]).unwrap().delay, ms(1000));

        engine.advance(ms(1500));
        let cta = engine.state_of(&TargetId::new("cta")).unwrap();
        assert_eq!(cta.opacity, Some(1.0));
    }

    #[test]
    fn reduced_motion_lands_immediately() {
        let (stage, engine, _viewport) = Stage::headless();
        let mut scope = AnimationScope::new("hero", stage);
        let policy = AnimationPolicy::resolve(
            MotionPreference::Reduce,
            &MotionProfile::natural(),
        );
        let ids = hero().play(&mut scope, &policy).unwrap();
        assert!(ids.is_empty());
        assert!(engine.created().is_empty());
        let title = engine.state_of(&TargetId::new("title")).unwrap();
        assert_eq!(title.opacity, Some(1.0));
        assert_eq!(title.y, Some(0.0));
    }
}
