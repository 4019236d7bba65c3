//! Shared effect presets.
//!
//! Sections used to hand-roll their own fade/slide/stagger sequences with
//! only cosmetic differences. Every entrance and idle loop now comes from
//! here, parameterized by the section's policy.

use std::time::Duration;

use crate::engine::{Repeat, TargetId, TweenSpec, VisualState};
use crate::policy::AnimationPolicy;
use crate::util::easing::EasingFunction;

/// Distance travelled by slide-in entrances, in pixels.
pub const SLIDE_DISTANCE: f32 = 50.0;

/// Side a slide-in entrance comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    /// From the left.
    Left,
    /// From the right.
    Right,
    /// From below.
    #[default]
    Up,
    /// From above.
    Down,
}

/// One-time entrance effects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EntranceEffect {
    /// Fade in while rising 20px.
    #[default]
    FadeIn,
    /// Fade in while sliding [`SLIDE_DISTANCE`] from a side.
    SlideIn(SlideDirection),
    /// Fade in while rising 50px, for scroll-triggered sections.
    ScrollReveal,
    /// Opacity only, for text blocks.
    TextReveal,
    /// Fade in while growing from 90%.
    Pop,
}

impl EntranceEffect {
    /// State before the entrance plays.
    #[must_use]
    pub fn hidden(self) -> VisualState {
        let base = VisualState::EMPTY.opacity(0.0);
        match self {
            Self::FadeIn => base.y(20.0),
            Self::SlideIn(SlideDirection::Left) => base.x(-SLIDE_DISTANCE),
            Self::SlideIn(SlideDirection::Right) => base.x(SLIDE_DISTANCE),
            Self::SlideIn(SlideDirection::Up) => base.y(SLIDE_DISTANCE),
            Self::SlideIn(SlideDirection::Down) => base.y(-SLIDE_DISTANCE),
            Self::ScrollReveal => base.y(50.0),
            Self::TextReveal => base,
            Self::Pop => base.scale(0.9),
        }
    }

    /// Final state once the entrance has played.
    #[must_use]
    pub fn shown(self) -> VisualState {
        match self {
            Self::TextReveal => VisualState::EMPTY.opacity(1.0),
            Self::Pop => VisualState::EMPTY.opacity(1.0).scale(1.0),
            _ => VisualState::SHOWN,
        }
    }

    /// Tween for the `index`-th target of a staggered group.
    #[must_use]
    pub fn tween(
        self,
        target: TargetId,
        policy: &AnimationPolicy,
        index: usize,
    ) -> TweenSpec {
        TweenSpec::from_to(
            target,
            self.hidden(),
            self.shown(),
            policy.duration,
            policy.easing,
        )
        .delayed(policy.stagger_delay(index))
    }
}

/// An idle yoyo loop between a target's rest state and `peak`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopEffect {
    /// Name for logs.
    pub name: &'static str,
    /// Extreme of the loop.
    pub peak: VisualState,
    /// Rest state the loop starts from and is reset to when stopped.
    pub rest: VisualState,
    /// Time for one half-cycle.
    pub period: Duration,
    /// Easing for each half-cycle.
    pub easing: EasingFunction,
}

impl LoopEffect {
    /// Vertical bounce of `amplitude` pixels every `period`.
    #[must_use]
    pub fn bounce(amplitude: f32, period: Duration) -> Self {
        Self {
            name: "bounce",
            peak: VisualState::EMPTY.y(amplitude),
            rest: VisualState::EMPTY.y(0.0),
            period,
            easing: EasingFunction::CubicInOut,
        }
    }

    /// Slow upward drift for decorative shapes.
    #[must_use]
    pub fn float() -> Self {
        Self {
            name: "float",
            peak: VisualState::EMPTY.y(-8.0).rotate(2.0),
            rest: VisualState::EMPTY.y(0.0).rotate(0.0),
            period: Duration::from_secs(3),
            easing: EasingFunction::CubicInOut,
        }
    }

    /// Gentle scale pulse.
    #[must_use]
    pub fn pulse() -> Self {
        Self {
            name: "pulse",
            peak: VisualState::EMPTY.scale(1.05),
            rest: VisualState::EMPTY.scale(1.0),
            period: Duration::from_secs(2),
            easing: EasingFunction::CubicInOut,
        }
    }

    /// Endless yoyo tween on `target`.
    #[must_use]
    pub fn tween(&self, target: TargetId) -> TweenSpec {
        TweenSpec::from_to(target, self.rest, self.peak, self.period, self.easing)
            .repeating(Repeat::Forever, true)
    }
}

impl Default for LoopEffect {
    fn default() -> Self {
        Self::bounce(10.0, Duration::from_millis(1500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MotionProfile;
    use crate::preference::MotionPreference;

    #[test]
    fn slide_directions_offset_the_right_axis() {
        let left = EntranceEffect::SlideIn(SlideDirection::Left).hidden();
        assert_eq!(left.x, Some(-SLIDE_DISTANCE));
        assert_eq!(left.y, None);
        let down = EntranceEffect::SlideIn(SlideDirection::Down).hidden();
        assert_eq!(down.y, Some(-SLIDE_DISTANCE));
    }

    #[test]
    fn every_entrance_ends_fully_opaque() {
        for effect in [
            EntranceEffect::FadeIn,
            EntranceEffect::SlideIn(SlideDirection::Right),
            EntranceEffect::ScrollReveal,
            EntranceEffect::TextReveal,
            EntranceEffect::Pop,
        ] {
            assert_eq!(effect.hidden().opacity, Some(0.0));
            assert_eq!(effect.shown().opacity, Some(1.0));
        }
    }

    #[test]
    fn staggered_tweens_use_policy_timing() {
        let policy = AnimationPolicy::resolve(
            MotionPreference::NoPreference,
            &MotionProfile::natural(),
        );
        let spec = EntranceEffect::FadeIn.tween(TargetId::new("card"), &policy, 2);
        assert_eq!(spec.duration, Duration::from_millis(600));
        assert_eq!(spec.delay, Duration::from_millis(200));
        assert_eq!(spec.easing, EasingFunction::CubicOut);
    }

    #[test]
    fn loops_repeat_forever_with_yoyo() {
        let spec = LoopEffect::default().tween(TargetId::new("arrow"));
        assert_eq!(spec.repeat, Repeat::Forever);
        assert!(spec.yoyo);
        assert_eq!(spec.to.y, Some(10.0));
        assert_eq!(spec.duration, Duration::from_millis(1500));
    }
}
