//! Headless preview of a motion configuration.
//!
//! ```text
//! folio [OPTIONS.toml]       simulate the hero and stats sections
//! folio --schema             print the options JSON Schema
//! folio --presets [DIR]      list presets in DIR (default `presets`)
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use folio::animation::{EntranceEffect, Timeline};
use folio::controller::{
    Choreography, ContinuousController, CounterConfig, CounterController,
    EntranceConfig, EntranceController, Trigger,
};
use folio::engine::{Stage, TargetId};
use folio::error::FolioError;
use folio::options::MotionOptions;
use folio::preference::{ManualPreference, MotionOracle};
use folio::section::AnimatedSection;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), FolioError> {
    let mut args = std::env::args().skip(1);
    let mut options = MotionOptions::default();
    let mut out = std::io::stdout().lock();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => {
                let json =
                    serde_json::to_string_pretty(&MotionOptions::json_schema())
                        .map_err(|e| FolioError::OptionsParse(e.to_string()))?;
                writeln!(out, "{json}")?;
                return Ok(());
            }
            "--presets" => {
                let dir = args
                    .next()
                    .map_or_else(|| PathBuf::from("presets"), PathBuf::from);
                for name in MotionOptions::list_presets(&dir) {
                    writeln!(out, "{name}")?;
                }
                return Ok(());
            }
            path => options = MotionOptions::load(Path::new(path))?,
        }
    }

    for reduced in [false, true] {
        preview(&options, reduced);
    }
    Ok(())
}

fn hero_timeline(options: &MotionOptions) -> Timeline {
    let step = options.natural.duration;
    Timeline::new()
        .then(TargetId::new("hero-title"), EntranceEffect::FadeIn, step)
        .overlap(
            TargetId::new("hero-subtitle"),
            EntranceEffect::FadeIn,
            step,
            step / 2,
        )
        .then(TargetId::new("hero-cta"), EntranceEffect::Pop, step)
}

fn preview(options: &MotionOptions, reduced: bool) {
    let label = if reduced { "reduced" } else { "full" };
    let (stage, engine, viewport) = Stage::headless();
    let oracle = MotionOracle::new(Rc::new(ManualPreference::new(reduced)));

    let mut hero =
        AnimatedSection::new("hero", oracle.clone(), options.natural)
            .with_resolver(options.resolver());
    let _ = hero
        .add(EntranceController::new(
            "hero-entrance",
            stage.clone(),
            EntranceConfig {
                anchor: TargetId::new("hero"),
                choreography: Choreography::Timeline(hero_timeline(options)),
                trigger: Trigger::Mount,
            },
        ))
        .add(ContinuousController::new(
            "scroll-hint",
            stage.clone(),
            TargetId::new("scroll-arrow"),
            options.continuous.bounce(),
        ));

    let counter = CounterController::new(
        "projects-count",
        stage,
        CounterConfig {
            trigger: options.viewport.counter_trigger(),
            ..CounterConfig::to(
                TargetId::new("stats"),
                300.0,
                options.counter.format().with_suffix("+"),
            )
        },
    );
    let mut stats =
        AnimatedSection::new("stats", oracle, options.counter.profile())
            .with_resolver(options.resolver());
    let _ = stats.add(counter.clone());

    let _ = hero.mount();
    let _ = stats.mount();
    log::info!("[{label}] hero policy: {:?}", hero.policy());

    viewport.scroll_into_view(&TargetId::new("stats"));
    engine.advance(options.counter.duration / 2);
    log::info!("[{label}] stats halfway: {}", counter.text());
    engine.advance(options.counter.duration + Duration::from_millis(16));
    log::info!(
        "[{label}] stats done: {} ({} frames, {} loop(s) running, {} handle(s) created)",
        counter.text(),
        engine.frames_delivered(),
        engine.looping_count(),
        engine.created().len()
    );

    hero.unmount();
    stats.unmount();
    log::info!(
        "[{label}] after unmount: {} live handle(s)",
        engine.live_handles().len()
    );
}
