//! Numeric count-up displays.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::{Controller, FailureHook, Trigger};
use crate::animation::{contain, AnimationHandle, AnimationScope};
use crate::engine::{
    EngineError, Intersection, Stage, TargetId, TickerSpec, TriggerId, TweenId,
};
use crate::policy::{AnimationPolicy, EffectKind, FallbackStyle};
use crate::util::format::CountFormat;
use crate::util::frame_timing::AnimationPerformance;

/// Receives the counter text every time it changes.
pub type TextSink = Box<dyn FnMut(&str)>;

/// What a counter counts and when.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterConfig {
    /// Element whose visibility starts a viewport-triggered count.
    pub anchor: TargetId,
    /// Value shown before counting.
    pub start: f64,
    /// Value shown once done.
    pub end: f64,
    /// Text formatting.
    pub format: CountFormat,
    /// When counting starts. `replay` is ignored: a counter runs once.
    pub trigger: Trigger,
}

impl CounterConfig {
    /// Count from zero to `end` once the anchor is 30% visible.
    #[must_use]
    pub fn to(anchor: TargetId, end: f64, format: CountFormat) -> Self {
        Self {
            anchor,
            start: 0.0,
            end,
            format,
            trigger: Trigger::once_in_view(0.3),
        }
    }

    fn text_at(&self, progress: f64) -> String {
        self.format
            .format(self.start + (self.end - self.start) * progress)
    }
}

struct CounterState {
    name: &'static str,
    scope: AnimationScope,
    config: CounterConfig,
    policy: Option<AnimationPolicy>,
    trigger: Option<TriggerId>,
    ticker: Option<TweenId>,
    finished: bool,
    degraded: bool,
    perf: AnimationPerformance,
    on_failure: Option<FailureHook>,
}

/// Text plus its optional sink, kept apart from the state so the view can
/// read it while a frame is being processed.
struct CounterText {
    text: RefCell<String>,
    sink: RefCell<Option<TextSink>>,
}

impl CounterText {
    fn write(&self, text: String) {
        if *self.text.borrow() == text {
            return;
        }
        let _ = self.text.replace(text);
        if let Ok(mut sink) = self.sink.try_borrow_mut() {
            if let Some(sink) = sink.as_mut() {
                sink(&self.text.borrow());
            }
        }
    }
}

/// Counts from `start` to `end` over the policy's duration, once.
///
/// Under reduced motion the final text is written at mount with no
/// intermediate frames. A counter that fails to animate, or whose section
/// falls back to static content, also shows the final text.
#[derive(Clone)]
pub struct CounterController {
    state: Rc<RefCell<CounterState>>,
    display: Rc<CounterText>,
}

impl CounterController {
    /// Create for `stage`. `name` labels logs.
    pub fn new(name: &'static str, stage: Stage, config: CounterConfig) -> Self {
        let initial = config.text_at(0.0);
        Self {
            state: Rc::new(RefCell::new(CounterState {
                name,
                scope: AnimationScope::new(name, stage),
                config,
                policy: None,
                trigger: None,
                ticker: None,
                finished: false,
                degraded: false,
                perf: AnimationPerformance::new(),
                on_failure: None,
            })),
            display: Rc::new(CounterText {
                text: RefCell::new(initial),
                sink: RefCell::new(None),
            }),
        }
    }

    /// Forward every text change to `sink`.
    pub fn on_change(&self, sink: impl FnMut(&str) + 'static) {
        *self.display.sink.borrow_mut() = Some(Box::new(sink));
    }

    /// Currently displayed text.
    #[must_use]
    pub fn text(&self) -> String {
        self.display.text.borrow().clone()
    }

    /// Whether the final value has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }

    /// Whether the count is animating right now.
    #[must_use]
    pub fn is_counting(&self) -> bool {
        let state = self.state.borrow();
        !state.finished && state.ticker.is_some()
    }

    fn finish(&self, state: &mut CounterState) {
        state.finished = true;
        self.display.write(state.config.text_at(1.0));
    }

    fn start(
        &self,
        state: &mut CounterState,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError> {
        if state.finished || state.ticker.is_some() {
            return Ok(());
        }
        if policy.style_for(EffectKind::Counter)
            == Some(FallbackStyle::InstantEndState)
        {
            self.finish(state);
            return Ok(());
        }

        let spec = TickerSpec {
            duration: policy.duration,
            delay: Duration::ZERO,
            easing: policy.easing,
        };
        let weak_state = Rc::downgrade(&self.state);
        let weak_display = Rc::downgrade(&self.display);
        state.perf.start_monitoring();
        state.ticker = Some(state.scope.ticker(
            &spec,
            Box::new(move |t| on_frame(&weak_state, &weak_display, t)),
        )?);
        Ok(())
    }

    fn arm(
        &self,
        state: &mut CounterState,
        threshold: f32,
    ) -> Result<(), EngineError> {
        let this = self.downgrade();
        let anchor = state.config.anchor.clone();
        state.trigger = state.scope.observe(
            &anchor,
            threshold,
            Box::new(move |entry| {
                if let Some(ctl) = this.upgrade() {
                    ctl.on_intersection(threshold, entry);
                }
            }),
        )?;
        if state.trigger.is_none() {
            log::debug!("{}: anchor `{anchor}` missing, showing total", state.name);
            self.finish(state);
        }
        Ok(())
    }

    fn on_intersection(&self, threshold: f32, entry: Intersection) {
        if !entry.reaches(threshold) {
            return;
        }
        let failed = {
            let Ok(mut guard) = self.state.try_borrow_mut() else {
                return;
            };
            let state = &mut *guard;
            let Some(policy) = state.policy else {
                return;
            };
            if let Some(id) = state.trigger.take() {
                state.scope.release(AnimationHandle::Trigger(id));
            }
            let name = state.name;
            if contain(name, || self.start(state, &policy)).is_animated() {
                None
            } else {
                state.scope.release_all();
                state.ticker = None;
                state.degraded = true;
                self.finish(state);
                state.on_failure.clone().map(|hook| (hook, name))
            }
        };
        if let Some((hook, name)) = failed {
            hook(name);
        }
    }

    fn downgrade(&self) -> WeakCounter {
        WeakCounter {
            state: Rc::downgrade(&self.state),
            display: Rc::downgrade(&self.display),
        }
    }
}

struct WeakCounter {
    state: Weak<RefCell<CounterState>>,
    display: Weak<CounterText>,
}

impl WeakCounter {
    fn upgrade(&self) -> Option<CounterController> {
        Some(CounterController {
            state: self.state.upgrade()?,
            display: self.display.upgrade()?,
        })
    }
}

fn on_frame(
    state: &Weak<RefCell<CounterState>>,
    display: &Weak<CounterText>,
    t: f32,
) {
    let (Some(state), Some(display)) = (state.upgrade(), display.upgrade())
    else {
        return;
    };
    let Ok(mut state) = state.try_borrow_mut() else {
        return;
    };
    if state.finished {
        return;
    }
    state.perf.record_frame();
    display.write(state.config.text_at(f64::from(t)));
    if t >= 1.0 {
        state.finished = true;
        let metrics = state.perf.metrics();
        log::debug!(
            "{}: counted {} frames in {:?} ({:.1} fps, performant: {})",
            state.name,
            metrics.frame_count,
            metrics.duration,
            metrics.average_fps,
            metrics.is_performant
        );
    }
}

impl Controller for CounterController {
    fn name(&self) -> &'static str {
        self.state.borrow().name
    }

    fn mount(&mut self, policy: &AnimationPolicy) -> Result<(), EngineError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.scope.release_all();
        state.trigger = None;
        state.ticker = None;
        state.finished = false;
        state.degraded = false;
        state.policy = Some(*policy);
        self.display.write(state.config.text_at(0.0));

        if !policy.complex_effects_enabled {
            self.finish(state);
            return Ok(());
        }
        match state.config.trigger {
            Trigger::Mount => self.start(state, policy),
            Trigger::Viewport { threshold, .. } => self.arm(state, threshold),
        }
    }

    fn update_policy(
        &mut self,
        policy: &AnimationPolicy,
    ) -> Result<(), EngineError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.policy = Some(*policy);
        if policy.complex_effects_enabled || state.finished {
            return Ok(());
        }
        // Jump to the total; the pending trigger or running count is moot.
        state.scope.release_all();
        state.trigger = None;
        state.ticker = None;
        self.finish(state);
        Ok(())
    }

    fn settle(&mut self) {
        let mut guard = self.state.borrow_mut();
        self.finish(&mut guard);
    }

    fn release(&mut self) {
        let mut state = self.state.borrow_mut();
        state.scope.release_all();
        state.trigger = None;
        state.ticker = None;
    }

    fn is_degraded(&self) -> bool {
        self.state.borrow().degraded
    }

    fn on_failure(&mut self, hook: FailureHook) {
        self.state.borrow_mut().on_failure = Some(hook);
    }
}

impl std::fmt::Debug for CounterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterController")
            .field("name", &self.state.borrow().name)
            .field("text", &self.display.text.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::engine::{FaultMode, HeadlessEngine, HeadlessViewport};
    use crate::policy::MotionProfile;
    use crate::preference::MotionPreference;

    fn policy(pref: MotionPreference) -> AnimationPolicy {
        AnimationPolicy::resolve(pref, &MotionProfile::counter())
    }

    fn projects(
        trigger: Trigger,
    ) -> (CounterController, Rc<HeadlessEngine>, Rc<HeadlessViewport>) {
        let (stage, engine, viewport) = Stage::headless();
        let config = CounterConfig {
            trigger,
            ..CounterConfig::to(
                TargetId::new("stats"),
                300.0,
                CountFormat::plain().with_suffix("+"),
            )
        };
        (CounterController::new("stats", stage, config), engine, viewport)
    }

    #[test]
    fn reduced_motion_writes_final_text_without_frames() {
        let (mut ctl, engine, viewport) = projects(Trigger::once_in_view(0.3));
        let writes = Rc::new(Cell::new(0));
        let counted = writes.clone();
        ctl.on_change(move |_| counted.set(counted.get() + 1));

        ctl.mount(&policy(MotionPreference::Reduce)).unwrap();

        assert_eq!(ctl.text(), "300+");
        assert_eq!(writes.get(), 1);
        assert!(engine.created().is_empty());
        assert!(viewport.created().is_empty());
        assert_eq!(engine.frames_delivered(), 0);
    }

    #[test]
    fn counts_up_once_in_view() {
        let (mut ctl, engine, viewport) = projects(Trigger::once_in_view(0.3));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        assert_eq!(ctl.text(), "0+");

        viewport.scroll_into_view(&TargetId::new("stats"));
        assert!(ctl.is_counting());
        engine.advance(Duration::from_millis(500));
        let midway = ctl.text();
        assert_ne!(midway, "0+");
        assert_ne!(midway, "300+");

        engine.advance(Duration::from_secs(2));
        assert_eq!(ctl.text(), "300+");
        assert!(ctl.is_finished());
        let frames = engine.frames_delivered();
        engine.advance(Duration::from_secs(1));
        assert_eq!(engine.frames_delivered(), frames);
    }

    #[test]
    fn trigger_fires_only_once() {
        let (mut ctl, engine, viewport) = projects(Trigger::once_in_view(0.3));
        let anchor = TargetId::new("stats");
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        viewport.scroll_into_view(&anchor);
        viewport.scroll_out_of_view(&anchor);
        viewport.scroll_into_view(&anchor);
        assert_eq!(engine.created().len(), 1);
        assert_eq!(viewport.observer_count(&anchor), 0);
    }

    #[test]
    fn settle_mid_count_writes_total() {
        let (mut ctl, engine, _viewport) = projects(Trigger::Mount);
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.advance(Duration::from_millis(300));

        ctl.release();
        ctl.settle();

        assert_eq!(ctl.text(), "300+");
        assert_eq!(engine.kill_count(engine.created()[0]), 1);
        let frames = engine.frames_delivered();
        engine.advance(Duration::from_secs(5));
        assert_eq!(engine.frames_delivered(), frames);
    }

    #[test]
    fn switching_to_reduced_mid_count_jumps_to_total() {
        let (mut ctl, engine, _viewport) = projects(Trigger::Mount);
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.advance(Duration::from_millis(300));
        ctl.update_policy(&policy(MotionPreference::Reduce)).unwrap();
        assert_eq!(ctl.text(), "300+");
        assert!(engine.live_handles().is_empty());
    }

    #[test]
    fn ticker_failure_in_view_shows_total() {
        let (mut ctl, engine, viewport) = projects(Trigger::once_in_view(0.3));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.set_fault(FaultMode::Error);
        viewport.scroll_into_view(&TargetId::new("stats"));
        assert!(ctl.is_degraded());
        assert_eq!(ctl.text(), "300+");
    }

    #[test]
    fn separators_in_intermediate_text() {
        let (stage, engine, _viewport) = Stage::headless();
        let mut ctl = CounterController::new(
            "downloads",
            stage,
            CounterConfig {
                trigger: Trigger::Mount,
                ..CounterConfig::to(
                    TargetId::new("downloads"),
                    1_500_000.0,
                    CountFormat::plain().with_separator(Some(',')),
                )
            },
        );
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.advance(Duration::from_secs(2));
        assert_eq!(ctl.text(), "1,500,000");
    }

    #[test]
    fn panic_on_scroll_shows_total_and_reports() {
        let (mut ctl, engine, viewport) = projects(Trigger::once_in_view(0.3));
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        ctl.on_failure(Rc::new(move |name| sink.borrow_mut().push(name)));
        ctl.mount(&policy(MotionPreference::NoPreference)).unwrap();
        engine.set_fault(FaultMode::Panic);

        viewport.scroll_into_view(&TargetId::new("stats"));
        viewport.scroll_into_view(&TargetId::new("stats"));

        assert_eq!(ctl.text(), "300+");
        assert!(ctl.is_degraded());
        assert_eq!(*reports.borrow(), vec!["stats"]);
    }
}
