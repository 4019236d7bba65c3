// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Reduced-motion-aware animation coordination for a portfolio site.
//!
//! Every visual effect on the site (section entrances, idle loops, hover
//! transitions, numeric count-ups) goes through this crate, which decides
//! from the user's motion preference whether and how it runs, owns every
//! handle it creates, and guarantees the underlying content stays visible
//! when the animation engine misbehaves.
//!
//! # Key entry points
//!
//! - [`preference::MotionOracle`] - the single source of truth for the
//!   reduced-motion preference
//! - [`policy::PolicyResolver`] - turns a preference into an
//!   [`policy::AnimationPolicy`]
//! - [`section::AnimatedSection`] - mounts, updates and tears down a group
//!   of controllers
//! - [`controller`] - entrance, continuous, hover and counter controllers
//! - [`options::MotionOptions`] - TOML-configurable timing
//!
//! # Architecture
//!
//! Controllers never call a global animation runtime. They go through an
//! [`engine::Stage`] bundling an [`engine::AnimationEngine`] and an
//! [`engine::ViewportObserver`], each acquisition tracked by an
//! [`animation::AnimationScope`] that releases it exactly once. Browser
//! implementations of the engine, viewport and preference source live in
//! the `web` module (feature `web`); headless ones serve tests and native
//! builds.

pub mod animation;
pub mod controller;
pub mod engine;
pub mod error;
pub mod options;
pub mod policy;
pub mod preference;
pub mod section;
pub mod util;
#[cfg(feature = "web")]
pub mod web;
