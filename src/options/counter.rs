use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::seconds;
use crate::policy::MotionProfile;
use crate::util::easing::EasingFunction;
use crate::util::format::CountFormat;

/// Count-up timing and number formatting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Counters", inline)]
#[serde(default)]
pub struct CounterOptions {
    /// Time to count from start to end, in seconds.
    #[serde(with = "seconds")]
    #[schemars(title = "Duration", with = "f64", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub duration: Duration,
    /// Easing of the count.
    #[schemars(title = "Easing")]
    pub easing: EasingFunction,
    /// Group thousands with `,`.
    #[schemars(title = "Group Thousands")]
    pub group_thousands: bool,
}

impl Default for CounterOptions {
    fn default() -> Self {
        let profile = MotionProfile::counter();
        Self {
            duration: profile.duration,
            easing: profile.easing,
            group_thousands: true,
        }
    }
}

impl CounterOptions {
    /// Natural timing for a counter section.
    #[must_use]
    pub fn profile(&self) -> MotionProfile {
        MotionProfile::new(self.duration, self.easing, Duration::ZERO)
    }

    /// Base number format; callers add prefix and suffix.
    #[must_use]
    pub fn format(&self) -> CountFormat {
        CountFormat::plain().with_separator(self.group_thousands.then_some(','))
    }
}
