//! Motion preference → animation policy.
//!
//! A section describes how it *wants* to move with a [`MotionProfile`]. The
//! [`PolicyResolver`] combines that with the user's [`MotionPreference`] into
//! the [`AnimationPolicy`] every controller consults before it animates.
//! Resolution is pure: no caching, no shared state, so each section can
//! recompute its own policy from the latest preference it was told about.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::options::seconds;
use crate::preference::MotionPreference;
use crate::util::easing::EasingFunction;

/// Timing a section would use with no motion restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MotionProfile {
    /// Duration of a single effect, in seconds.
    #[serde(with = "seconds")]
    #[schemars(with = "f64")]
    pub duration: Duration,
    /// Easing curve.
    pub easing: EasingFunction,
    /// Delay between consecutive targets of a staggered effect, in seconds.
    #[serde(with = "seconds")]
    #[schemars(with = "f64")]
    pub stagger: Duration,
}

impl MotionProfile {
    /// Create with explicit values.
    #[must_use]
    pub const fn new(
        duration: Duration,
        easing: EasingFunction,
        stagger: Duration,
    ) -> Self {
        Self {
            duration,
            easing,
            stagger,
        }
    }

    /// Standard section entrance: 600ms cubic ease-out, 100ms stagger.
    #[must_use]
    pub const fn natural() -> Self {
        Self::new(
            Duration::from_millis(600),
            EasingFunction::CubicOut,
            Duration::from_millis(100),
        )
    }

    /// Reduced-motion timing: 100ms, linear, 50ms stagger.
    #[must_use]
    pub const fn reduced() -> Self {
        Self::new(
            Duration::from_millis(100),
            EasingFunction::Linear,
            Duration::from_millis(50),
        )
    }

    /// Count-up timing: 2s cubic ease-out.
    #[must_use]
    pub const fn counter() -> Self {
        Self::new(
            Duration::from_secs(2),
            EasingFunction::CubicOut,
            Duration::ZERO,
        )
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::natural()
    }
}

/// Kinds of effect a controller can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// One-time entrance on mount or first intersection.
    Entrance,
    /// Multi-step sequenced entrance.
    Timeline,
    /// Numeric count-up.
    Counter,
    /// Idle looping decoration.
    Continuous,
    /// Pointer/focus feedback.
    Hover,
}

/// What an effect does when complex effects are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackStyle {
    /// Jump straight to the final visual state.
    InstantEndState,
    /// Don't run the effect at all.
    Omit,
    /// Run a reduced version (non-motion properties, reduced timing).
    Reduce,
}

impl EffectKind {
    /// Reduced-motion fallback for this kind of effect.
    #[must_use]
    pub fn fallback(self) -> FallbackStyle {
        match self {
            Self::Entrance | Self::Timeline | Self::Counter => {
                FallbackStyle::InstantEndState
            }
            Self::Continuous => FallbackStyle::Omit,
            Self::Hover => FallbackStyle::Reduce,
        }
    }
}

/// Resolved animation parameters for one section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPolicy {
    /// Effect duration.
    pub duration: Duration,
    /// Easing curve.
    pub easing: EasingFunction,
    /// Whether complex effects (entrances, loops, count-ups) run at all.
    pub complex_effects_enabled: bool,
    /// Delay between staggered targets.
    pub stagger: Duration,
}

impl AnimationPolicy {
    /// Resolve with the default reduced profile.
    #[must_use]
    pub fn resolve(
        preference: MotionPreference,
        natural: &MotionProfile,
    ) -> Self {
        PolicyResolver::default().resolve(preference, natural)
    }

    /// How `kind` should behave under this policy.
    #[must_use]
    pub fn style_for(&self, kind: EffectKind) -> Option<FallbackStyle> {
        if self.complex_effects_enabled {
            None
        } else {
            Some(kind.fallback())
        }
    }

    /// Whether `kind` should be animated (possibly in reduced form) rather
    /// than applied instantly or skipped.
    #[must_use]
    pub fn animates(&self, kind: EffectKind) -> bool {
        matches!(self.style_for(kind), None | Some(FallbackStyle::Reduce))
    }

    /// Delay for the `index`-th target of a staggered effect.
    #[must_use]
    pub fn stagger_delay(&self, index: usize) -> Duration {
        self.stagger
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// Maps preferences onto policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyResolver {
    reduced: MotionProfile,
}

impl PolicyResolver {
    /// Resolver using a custom reduced profile.
    #[must_use]
    pub const fn new(reduced: MotionProfile) -> Self {
        Self { reduced }
    }

    /// The profile applied under reduced motion.
    #[must_use]
    pub fn reduced_profile(&self) -> &MotionProfile {
        &self.reduced
    }

    /// Resolve the policy for `preference`, given the section's natural
    /// timing. Deterministic and side-effect free.
    #[must_use]
    pub fn resolve(
        &self,
        preference: MotionPreference,
        natural: &MotionProfile,
    ) -> AnimationPolicy {
        match preference {
            MotionPreference::NoPreference => AnimationPolicy {
                duration: natural.duration,
                easing: natural.easing,
                complex_effects_enabled: true,
                stagger: natural.stagger,
            },
            MotionPreference::Reduce => AnimationPolicy {
                // Never slower than the section would be without restrictions.
                duration: self.reduced.duration.min(natural.duration),
                easing: self.reduced.easing,
                complex_effects_enabled: false,
                stagger: self.reduced.stagger.min(natural.stagger),
            },
        }
    }
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::new(MotionProfile::reduced())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_idempotent() {
        let natural = MotionProfile::natural();
        for pref in [MotionPreference::NoPreference, MotionPreference::Reduce] {
            let a = AnimationPolicy::resolve(pref, &natural);
            let b = AnimationPolicy::resolve(pref, &natural);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn reduced_policy_is_fast_linear_and_simple() {
        let policy = AnimationPolicy::resolve(
            MotionPreference::Reduce,
            &MotionProfile::natural(),
        );
        assert_eq!(policy.duration, Duration::from_millis(100));
        assert_eq!(policy.easing, EasingFunction::Linear);
        assert!(!policy.complex_effects_enabled);
        assert_eq!(policy.stagger, Duration::from_millis(50));
    }

    #[test]
    fn natural_policy_keeps_section_timing() {
        let profile = MotionProfile::counter();
        let policy =
            AnimationPolicy::resolve(MotionPreference::NoPreference, &profile);
        assert_eq!(policy.duration, Duration::from_secs(2));
        assert_eq!(policy.easing, EasingFunction::CubicOut);
        assert!(policy.complex_effects_enabled);
    }

    #[test]
    fn reduced_never_exceeds_natural() {
        let quick = MotionProfile::new(
            Duration::from_millis(40),
            EasingFunction::QuadraticOut,
            Duration::ZERO,
        );
        let policy = AnimationPolicy::resolve(MotionPreference::Reduce, &quick);
        assert_eq!(policy.duration, Duration::from_millis(40));
        assert_eq!(policy.stagger, Duration::ZERO);
    }

    #[test]
    fn fallback_styles_per_effect() {
        let reduced = AnimationPolicy::resolve(
            MotionPreference::Reduce,
            &MotionProfile::natural(),
        );
        assert_eq!(
            reduced.style_for(EffectKind::Counter),
            Some(FallbackStyle::InstantEndState)
        );
        assert_eq!(
            reduced.style_for(EffectKind::Continuous),
            Some(FallbackStyle::Omit)
        );
        assert!(reduced.animates(EffectKind::Hover));
        assert!(!reduced.animates(EffectKind::Entrance));

        let full = AnimationPolicy::resolve(
            MotionPreference::NoPreference,
            &MotionProfile::natural(),
        );
        assert_eq!(full.style_for(EffectKind::Continuous), None);
        assert!(full.animates(EffectKind::Continuous));
    }

    #[test]
    fn stagger_delay_scales_with_index() {
        let policy = AnimationPolicy::resolve(
            MotionPreference::NoPreference,
            &MotionProfile::natural(),
        );
        assert_eq!(policy.stagger_delay(0), Duration::ZERO);
        assert_eq!(policy.stagger_delay(3), Duration::from_millis(300));
    }
}
