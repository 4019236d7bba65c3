use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::seconds;
use crate::animation::LoopEffect;

/// Idle loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Idle Loops", inline)]
#[serde(default)]
pub struct ContinuousOptions {
    /// Half-cycle of the scroll hint bounce, in seconds.
    #[serde(with = "seconds")]
    #[schemars(title = "Bounce Period", with = "f64", range(min = 0.2, max = 5.0), extend("step" = 0.1))]
    pub bounce_period: Duration,
    /// Bounce travel in pixels.
    #[schemars(title = "Bounce Amplitude", range(min = 0.0, max = 40.0), extend("step" = 1.0))]
    pub bounce_amplitude: f32,
}

impl Default for ContinuousOptions {
    fn default() -> Self {
        Self {
            bounce_period: Duration::from_millis(1500),
            bounce_amplitude: 10.0,
        }
    }
}

impl ContinuousOptions {
    /// The configured bounce loop.
    #[must_use]
    pub fn bounce(&self) -> LoopEffect {
        LoopEffect::bounce(self.bounce_amplitude, self.bounce_period)
    }
}
