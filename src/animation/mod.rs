//! Building blocks shared by every controller: the handle arena, failure
//! containment, effect presets and timelines.

mod containment;
mod presets;
mod scope;
mod timeline;

pub use containment::{contain, Rendered};
pub use presets::{EntranceEffect, LoopEffect, SlideDirection, SLIDE_DISTANCE};
pub use scope::{AnimationHandle, AnimationScope};
pub use timeline::{Timeline, TimelineStep};
