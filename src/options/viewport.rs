use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::controller::Trigger;

/// Scroll-trigger thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Viewport", inline)]
#[serde(default)]
pub struct ViewportOptions {
    /// Visible fraction of a section that starts its entrance.
    #[schemars(title = "Entrance Threshold", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub entrance_threshold: f32,
    /// Visible fraction of a stats block that starts its counters.
    #[schemars(title = "Counter Threshold", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub counter_threshold: f32,
    /// Hide entrances again when their section scrolls out, and replay them
    /// on the way back in.
    #[schemars(title = "Replay Entrances")]
    pub replay: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            entrance_threshold: 0.2,
            counter_threshold: 0.3,
            replay: false,
        }
    }
}

impl ViewportOptions {
    /// Trigger for section entrances.
    #[must_use]
    pub fn entrance_trigger(&self) -> Trigger {
        Trigger::Viewport {
            threshold: self.entrance_threshold,
            replay: self.replay,
        }
    }

    /// Trigger for counters, which never replay.
    #[must_use]
    pub fn counter_trigger(&self) -> Trigger {
        Trigger::once_in_view(self.counter_threshold)
    }
}
