//! Glue between Dioxus component lifecycles and folio sections.
//!
//! The page-wide [`Motion`] context is created once in the app root. Each
//! animated component builds its [`AnimatedSection`] in an effect, so the
//! elements its controllers address are already in the DOM, and unmounts
//! it when the component is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use folio::engine::Stage;
use folio::options::MotionOptions;
use folio::preference::MotionOracle;
use folio::section::{AnimatedSection, SectionMode};

const OPTIONS_TOML: &str = include_str!("../motion.toml");

/// Everything a component needs to animate.
#[derive(Clone)]
pub(crate) struct Motion {
    pub(crate) stage: Stage,
    pub(crate) oracle: MotionOracle,
    pub(crate) options: Rc<MotionOptions>,
}

impl Motion {
    /// Wire up the current page. `None` if the browser cannot animate at
    /// all, in which case every component renders its final state.
    pub(crate) fn for_page() -> Option<Self> {
        let options = MotionOptions::from_toml(OPTIONS_TOML).unwrap_or_else(|e| {
            log::warn!("motion options: {e}; using defaults");
            MotionOptions::default()
        });
        match folio::web::page() {
            Ok((stage, oracle)) => Some(Self {
                stage,
                oracle,
                options: Rc::new(options),
            }),
            Err(e) => {
                log::warn!("animations disabled: {e}");
                None
            }
        }
    }
}

/// The page's motion context, if animation is available.
pub(crate) fn use_motion() -> Option<Motion> {
    use_context::<Option<Motion>>()
}

/// Build a section once the calling component has rendered, and unmount it
/// when the component goes away.
///
/// Returns the section's mode, kept current after mount. Once it reads
/// [`SectionMode::Static`] the view should render plain markup: the engine
/// that hid the content may be unable to reveal it again.
pub(crate) fn use_animated_section(
    build: impl FnOnce(&Motion) -> AnimatedSection + 'static,
) -> Signal<SectionMode> {
    let motion = use_motion();
    let slot: Rc<RefCell<Option<AnimatedSection>>> =
        use_hook(|| Rc::new(RefCell::new(None)));
    let mut mode = use_signal(|| SectionMode::Unmounted);

    let mount_slot = Rc::clone(&slot);
    let mut build = Some(build);
    let _ = use_effect(move || {
        let (Some(motion), Some(build)) = (motion.as_ref(), build.take())
        else {
            return;
        };
        let mut section = build(motion);
        section.on_mode_change(move |m| {
            let mut mode = mode;
            mode.set(m);
        });
        mode.set(section.mount());
        *mount_slot.borrow_mut() = Some(section);
    });

    use_drop(move || {
        if let Some(mut section) = slot.borrow_mut().take() {
            section.unmount();
        }
    });
    mode
}
