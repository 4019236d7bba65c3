//! The animated sections of the portfolio page.

use dioxus::prelude::*;
use folio::animation::{EntranceEffect, SlideDirection, Timeline};
use folio::controller::{
    Choreography, ContinuousController, CounterConfig, CounterController,
    EntranceConfig, EntranceController, HoverController, HoverEffect, Trigger,
};
use folio::engine::TargetId;
use folio::section::{AnimatedSection, SectionMode};
use folio::util::format::CountFormat;

use crate::motion::{use_animated_section, use_motion};

/// Title, tagline and call to action, revealed in sequence on load, with a
/// bouncing scroll hint.
// `rsx!` expands event handlers to fully-qualified paths.
#[allow(unused_qualifications)]
#[component]
pub(crate) fn Hero(title: String, tagline: String) -> Element {
    let ids = use_hook(|| {
        [
            TargetId::unique("hero"),
            TargetId::unique("hero-title"),
            TargetId::unique("hero-tagline"),
            TargetId::unique("hero-cta"),
            TargetId::unique("scroll-hint"),
        ]
    });
    let [anchor, title_id, tagline_id, cta_id, hint_id] = ids.clone();

    let motion = use_motion();
    let hover = use_hook(|| {
        motion.as_ref().map(|m| {
            HoverController::new(
                "hero-cta-hover",
                m.stage.clone(),
                cta_id.clone(),
                HoverEffect::lift(),
            )
        })
    });

    let section_hover = hover.clone();
    let mode = use_animated_section(move |m| {
        let step = m.options.natural.duration;
        let timeline = Timeline::new()
            .then(title_id.clone(), EntranceEffect::FadeIn, step)
            .overlap(
                tagline_id.clone(),
                EntranceEffect::SlideIn(SlideDirection::Up),
                step,
                step / 2,
            )
            .then(cta_id.clone(), EntranceEffect::Pop, step);

        let mut section =
            AnimatedSection::new("hero", m.oracle.clone(), m.options.natural)
                .with_resolver(m.options.resolver());
        let _ = section
            .add(EntranceController::new(
                "hero-entrance",
                m.stage.clone(),
                EntranceConfig {
                    anchor: anchor.clone(),
                    choreography: Choreography::Timeline(timeline),
                    trigger: Trigger::Mount,
                },
            ))
            .add(ContinuousController::new(
                "scroll-hint",
                m.stage.clone(),
                hint_id.clone(),
                m.options.continuous.bounce(),
            ));
        if let Some(hover) = section_hover {
            let _ = section.add(hover);
        }
        section
    });

    // Plain nodes: the engine may have left the animated ones hidden.
    if *mode.read() == SectionMode::Static {
        return rsx! {
            header { class: "hero",
                h1 { "{title}" }
                p { class: "tagline", "{tagline}" }
                button { class: "cta", "See my work" }
            }
        };
    }

    let [anchor, title_id, tagline_id, cta_id, hint_id] = ids;
    let enter = hover.clone();
    let leave = hover;
    rsx! {
        header { id: "{anchor}", class: "hero",
            h1 { id: "{title_id}", "{title}" }
            p { id: "{tagline_id}", class: "tagline", "{tagline}" }
            button {
                id: "{cta_id}",
                class: "cta",
                onmouseenter: move |_| {
                    if let Some(hover) = &enter {
                        hover.enter();
                    }
                },
                onmouseleave: move |_| {
                    if let Some(hover) = &leave {
                        hover.leave();
                    }
                },
                "See my work"
            }
            span {
                id: "{hint_id}",
                class: "scroll-hint",
                aria_hidden: "true",
                "↓"
            }
        }
    }
}

/// Project cards that stagger in once the section scrolls into view.
#[component]
pub(crate) fn Projects(projects: Vec<String>) -> Element {
    let anchor = use_hook(|| TargetId::unique("projects"));
    let card_ids: Vec<TargetId> = use_hook(|| {
        projects.iter().map(|_| TargetId::unique("project")).collect()
    });

    let section_anchor = anchor.clone();
    let targets = card_ids.clone();
    let mode = use_animated_section(move |m| {
        let mut section = AnimatedSection::new(
            "projects",
            m.oracle.clone(),
            m.options.natural,
        )
        .with_resolver(m.options.resolver());
        let _ = section.add(EntranceController::new(
            "project-cards",
            m.stage.clone(),
            EntranceConfig {
                anchor: section_anchor,
                choreography: Choreography::Stagger {
                    effect: EntranceEffect::ScrollReveal,
                    targets,
                },
                trigger: m.options.viewport.entrance_trigger(),
            },
        ));
        section
    });

    if *mode.read() == SectionMode::Static {
        return rsx! {
            section { class: "projects",
                h2 { "Projects" }
                ul {
                    for name in projects.iter() {
                        li { key: "{name}", class: "card", "{name}" }
                    }
                }
            }
        };
    }

    rsx! {
        section { id: "{anchor}", class: "projects",
            h2 { "Projects" }
            ul {
                for (id, name) in card_ids.iter().zip(projects.iter()) {
                    li { key: "{id}", id: "{id}", class: "card", "{name}" }
                }
            }
        }
    }
}

/// A count-up statistic. Without animation support it shows the final
/// value straight away.
#[component]
pub(crate) fn AnimatedCounter(
    label: String,
    end: f64,
    suffix: String,
) -> Element {
    let anchor = use_hook(|| TargetId::unique("stat"));
    let motion = use_motion();

    let counter = use_hook(|| {
        motion.as_ref().map(|m| {
            CounterController::new(
                "stat-counter",
                m.stage.clone(),
                CounterConfig {
                    trigger: m.options.viewport.counter_trigger(),
                    ..CounterConfig::to(
                        anchor.clone(),
                        end,
                        m.options.counter.format().with_suffix(suffix.clone()),
                    )
                },
            )
        })
    });
    let mut text = use_signal(|| {
        counter.as_ref().map_or_else(
            || CountFormat::plain().with_suffix(suffix.clone()).format(end),
            CounterController::text,
        )
    });
    let sink = counter.clone();
    use_hook(move || {
        if let Some(counter) = sink {
            counter.on_change(move |value| text.set(value.to_owned()));
        }
    });

    let mode = use_animated_section(move |m| {
        let mut section = AnimatedSection::new(
            "stats",
            m.oracle.clone(),
            m.options.counter.profile(),
        )
        .with_resolver(m.options.resolver());
        if let Some(counter) = counter {
            let _ = section.add(counter);
        }
        section
    });

    if *mode.read() == SectionMode::Static {
        return rsx! {
            div { class: "stat",
                span { class: "stat-value", "{text}" }
                span { class: "stat-label", "{label}" }
            }
        };
    }

    rsx! {
        div { id: "{anchor}", class: "stat",
            span { class: "stat-value", aria_live: "polite", "{text}" }
            span { class: "stat-label", "{label}" }
        }
    }
}

/// A row of statistics.
#[component]
pub(crate) fn Stats() -> Element {
    rsx! {
        section { class: "stats",
            AnimatedCounter { label: "projects shipped", end: 300.0, suffix: "+" }
            AnimatedCounter { label: "lines reviewed", end: 125_000.0, suffix: "" }
            AnimatedCounter { label: "years building", end: 8.0, suffix: "" }
        }
    }
}
