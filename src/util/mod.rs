//! Shared utilities for the animation layer.
//!
//! Helpers for easing curves, counter text formatting, and frame-rate
//! monitoring.

pub mod easing;
pub mod format;
pub mod frame_timing;
