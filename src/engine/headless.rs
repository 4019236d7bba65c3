//! Engine and viewport for execution without a browser.
//!
//! [`HeadlessEngine`] keeps a manual clock: nothing moves until
//! [`advance`](HeadlessEngine::advance) is called, at which point tweens
//! progress, tickers receive frames, and finished tweens apply their end
//! state. Every created handle and every teardown call is recorded, and
//! faults can be injected to exercise containment.
//!
//! [`HeadlessViewport`] delivers intersection reports only when told to via
//! [`report`](HeadlessViewport::report).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{
    AnimationEngine, EngineError, FrameCallback, Intersection,
    IntersectionCallback, Repeat, TargetId, TickerSpec, TriggerId, TweenId,
    TweenSpec, ViewportObserver, VisualState,
};

/// How the headless engine responds to new animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMode {
    /// Behave normally.
    #[default]
    None,
    /// Return [`EngineError::Rejected`] from `tween`, `ticker` and `set`.
    Error,
    /// Panic inside `tween` and `ticker`.
    Panic,
}

type SharedFrame = Rc<RefCell<FrameCallback>>;

enum Job {
    Tween(TweenSpec),
    Ticker { spec: TickerSpec, on_frame: SharedFrame },
}

struct Running {
    job: Job,
    elapsed: Duration,
    done: bool,
}

#[derive(Default)]
struct EngineInner {
    next_id: u64,
    fault: FaultMode,
    missing: FxHashSet<TargetId>,
    states: FxHashMap<TargetId, VisualState>,
    running: BTreeMap<TweenId, Running>,
    created: Vec<TweenId>,
    kills: FxHashMap<TweenId, u32>,
    set_calls: usize,
    frames: usize,
}

impl EngineInner {
    fn check_fault(&self, what: &str) -> Result<(), EngineError> {
        match self.fault {
            FaultMode::None => Ok(()),
            FaultMode::Error => {
                Err(EngineError::Rejected(format!("injected fault in {what}")))
            }
            FaultMode::Panic => Ok(()),
        }
    }

    fn apply(&mut self, target: &TargetId, state: &VisualState) {
        let current = self.states.entry(target.clone()).or_default();
        *current = current.merged(state);
    }

    fn register(&mut self, job: Job, done: bool) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.created.push(id);
        let _ = self.running.insert(
            id,
            Running {
                job,
                elapsed: Duration::ZERO,
                done,
            },
        );
        id
    }
}

/// In-memory animation engine with a manual clock.
#[derive(Default)]
pub struct HeadlessEngine {
    inner: RefCell<EngineInner>,
}

impl HeadlessEngine {
    /// Create an engine where every target exists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change how subsequent calls behave.
    pub fn set_fault(&self, fault: FaultMode) {
        self.inner.borrow_mut().fault = fault;
    }

    /// Make `target` missing, as if its element was never attached.
    pub fn remove_target(&self, target: &TargetId) {
        let _ = self.inner.borrow_mut().missing.insert(target.clone());
    }

    /// Progress the clock, delivering frames and completing tweens.
    pub fn advance(&self, dt: Duration) {
        let mut frames: Vec<(SharedFrame, f32)> = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            let mut finished: Vec<(TargetId, VisualState)> = Vec::new();
            for running in inner.running.values_mut() {
                if running.done {
                    continue;
                }
                running.elapsed += dt;
                match &running.job {
                    Job::Tween(spec) => {
                        if let Some(total) = spec.total_time() {
                            if running.elapsed >= total {
                                running.done = true;
                                finished.push((
                                    spec.target.clone(),
                                    end_state(spec),
                                ));
                            }
                        }
                    }
                    Job::Ticker { spec, on_frame } => {
                        if running.elapsed < spec.delay {
                            continue;
                        }
                        let raw = progress(
                            running.elapsed - spec.delay,
                            spec.duration,
                        );
                        let eased = if raw >= 1.0 {
                            running.done = true;
                            1.0
                        } else {
                            spec.easing.evaluate(raw)
                        };
                        frames.push((Rc::clone(on_frame), eased));
                    }
                }
            }
            for (target, state) in finished {
                inner.apply(&target, &state);
            }
            inner.frames += frames.len();
        }

        // Callbacks run with no engine borrow held so they may call back in.
        for (on_frame, t) in frames {
            let mut callback = on_frame.borrow_mut();
            (*callback)(t);
        }
    }

    /// State accumulated on `target` by sets and finished tweens.
    #[must_use]
    pub fn state_of(&self, target: &TargetId) -> Option<VisualState> {
        self.inner.borrow().states.get(target).copied()
    }

    /// Every handle ever created, in creation order.
    #[must_use]
    pub fn created(&self) -> Vec<TweenId> {
        self.inner.borrow().created.clone()
    }

    /// How many times `id` was killed.
    #[must_use]
    pub fn kill_count(&self, id: TweenId) -> u32 {
        self.inner.borrow().kills.get(&id).copied().unwrap_or(0)
    }

    /// Handles created but never killed.
    #[must_use]
    pub fn live_handles(&self) -> Vec<TweenId> {
        self.inner.borrow().running.keys().copied().collect()
    }

    /// Tweens and tickers still in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .running
            .values()
            .filter(|r| !r.done)
            .count()
    }

    /// Running tweens that loop forever.
    #[must_use]
    pub fn looping_count(&self) -> usize {
        self.inner
            .borrow()
            .running
            .values()
            .filter(|r| {
                !r.done
                    && matches!(&r.job, Job::Tween(s) if s.repeat == Repeat::Forever)
            })
            .count()
    }

    /// Number of `set` calls accepted.
    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.inner.borrow().set_calls
    }

    /// Number of ticker frames delivered.
    #[must_use]
    pub fn frames_delivered(&self) -> usize {
        self.inner.borrow().frames
    }

    /// The spec of a tween handle, if it is one.
    #[must_use]
    pub fn tween_spec(&self, id: TweenId) -> Option<TweenSpec> {
        match self.inner.borrow().running.get(&id).map(|r| &r.job) {
            Some(Job::Tween(spec)) => Some(spec.clone()),
            _ => None,
        }
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
    }
}

fn end_state(spec: &TweenSpec) -> VisualState {
    // A yoyo with an even iteration count lands back where it started.
    let reversed =
        spec.yoyo && matches!(spec.repeat, Repeat::Times(n) if n % 2 == 0);
    match (reversed, spec.from) {
        (true, Some(from)) => from,
        _ => spec.to,
    }
}

impl AnimationEngine for HeadlessEngine {
    fn has_target(&self, target: &TargetId) -> bool {
        !self.inner.borrow().missing.contains(target)
    }

    fn set(
        &self,
        target: &TargetId,
        state: &VisualState,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.borrow_mut();
        inner.check_fault("set")?;
        inner.set_calls += 1;
        inner.apply(target, state);
        Ok(())
    }

    #[allow(clippy::panic)]
    fn tween(&self, spec: &TweenSpec) -> Result<TweenId, EngineError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fault == FaultMode::Panic {
            drop(inner);
            panic!("injected engine panic in tween");
        }
        inner.check_fault("tween")?;
        if let Some(from) = &spec.from {
            inner.apply(&spec.target, from);
        }
        // Zero-length one-shot tweens land immediately.
        let instant = spec.total_time() == Some(Duration::ZERO);
        if instant {
            inner.apply(&spec.target, &spec.to);
        }
        Ok(inner.register(Job::Tween(spec.clone()), instant))
    }

    #[allow(clippy::panic)]
    fn ticker(
        &self,
        spec: &TickerSpec,
        on_frame: FrameCallback,
    ) -> Result<TweenId, EngineError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fault == FaultMode::Panic {
            drop(inner);
            panic!("injected engine panic in ticker");
        }
        inner.check_fault("ticker")?;
        let job = Job::Ticker {
            spec: *spec,
            on_frame: Rc::new(RefCell::new(on_frame)),
        };
        Ok(inner.register(job, false))
    }

    fn kill(&self, id: TweenId) {
        let mut inner = self.inner.borrow_mut();
        *inner.kills.entry(id).or_insert(0) += 1;
        let _ = inner.running.remove(&id);
    }

    fn is_active(&self, id: TweenId) -> bool {
        self.inner
            .borrow()
            .running
            .get(&id)
            .is_some_and(|r| !r.done)
    }
}

impl std::fmt::Debug for HeadlessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HeadlessEngine")
            .field("fault", &inner.fault)
            .field("running", &inner.running.len())
            .field("created", &inner.created.len())
            .finish()
    }
}

type SharedIntersection = Rc<RefCell<IntersectionCallback>>;

struct Observation {
    target: TargetId,
    callback: SharedIntersection,
}

#[derive(Default)]
struct ViewportInner {
    next_id: u64,
    fail: bool,
    observations: BTreeMap<TriggerId, Observation>,
    created: Vec<TriggerId>,
    unobserved: FxHashMap<TriggerId, u32>,
}

/// Viewport whose intersections are scripted by the caller.
#[derive(Default)]
pub struct HeadlessViewport {
    inner: RefCell<ViewportInner>,
}

impl HeadlessViewport {
    /// Create with no observations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `observe` calls fail.
    pub fn set_failing(&self, fail: bool) {
        self.inner.borrow_mut().fail = fail;
    }

    /// Report that `ratio` of `target` is visible to every observer of it.
    pub fn report(&self, target: &TargetId, ratio: f32) {
        let entry = Intersection {
            is_intersecting: ratio > 0.0,
            ratio: ratio.clamp(0.0, 1.0),
        };
        let callbacks: Vec<SharedIntersection> = self
            .inner
            .borrow()
            .observations
            .values()
            .filter(|o| &o.target == target)
            .map(|o| Rc::clone(&o.callback))
            .collect();
        for shared in callbacks {
            let mut callback = shared.borrow_mut();
            (*callback)(entry);
        }
    }

    /// Report `target` fully visible.
    pub fn scroll_into_view(&self, target: &TargetId) {
        self.report(target, 1.0);
    }

    /// Report `target` fully outside the viewport.
    pub fn scroll_out_of_view(&self, target: &TargetId) {
        self.report(target, 0.0);
    }

    /// Active observations of `target`.
    #[must_use]
    pub fn observer_count(&self, target: &TargetId) -> usize {
        self.inner
            .borrow()
            .observations
            .values()
            .filter(|o| &o.target == target)
            .count()
    }

    /// Every trigger ever created.
    #[must_use]
    pub fn created(&self) -> Vec<TriggerId> {
        self.inner.borrow().created.clone()
    }

    /// How many times `id` was unobserved.
    #[must_use]
    pub fn unobserve_count(&self, id: TriggerId) -> u32 {
        self.inner.borrow().unobserved.get(&id).copied().unwrap_or(0)
    }
}

impl ViewportObserver for HeadlessViewport {
    fn observe(
        &self,
        target: &TargetId,
        _threshold: f32,
        callback: IntersectionCallback,
    ) -> Result<TriggerId, EngineError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail {
            return Err(EngineError::Rejected(
                "injected fault in observe".to_owned(),
            ));
        }
        let id = TriggerId(inner.next_id);
        inner.next_id += 1;
        inner.created.push(id);
        let _ = inner.observations.insert(
            id,
            Observation {
                target: target.clone(),
                callback: Rc::new(RefCell::new(callback)),
            },
        );
        Ok(id)
    }

    fn unobserve(&self, id: TriggerId) {
        let mut inner = self.inner.borrow_mut();
        *inner.unobserved.entry(id).or_insert(0) += 1;
        let _ = inner.observations.remove(&id);
    }
}

impl std::fmt::Debug for HeadlessViewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessViewport")
            .field("observations", &self.inner.borrow().observations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::util::easing::EasingFunction;

    fn target() -> TargetId {
        TargetId::new("hero")
    }

    #[test]
    fn tween_lands_on_end_state_after_duration() {
        let engine = HeadlessEngine::new();
        let spec = TweenSpec::from_to(
            target(),
            VisualState::EMPTY.opacity(0.0).y(30.0),
            VisualState::SHOWN,
            Duration::from_millis(600),
            EasingFunction::CubicOut,
        );
        let id = engine.tween(&spec).unwrap();
        assert_eq!(engine.state_of(&target()).unwrap().opacity, Some(0.0));
        assert!(engine.is_active(id));

        engine.advance(Duration::from_millis(300));
        assert!(engine.is_active(id));
        engine.advance(Duration::from_millis(300));
        assert!(!engine.is_active(id));
        assert_eq!(engine.state_of(&target()).unwrap().opacity, Some(1.0));
    }

    #[test]
    fn ticker_ends_on_exactly_one() {
        let engine = HeadlessEngine::new();
        let last = Rc::new(Cell::new(-1.0_f32));
        let seen = Rc::clone(&last);
        let spec = TickerSpec {
            duration: Duration::from_millis(100),
            delay: Duration::ZERO,
            easing: EasingFunction::CubicOut,
        };
        let id = engine.ticker(&spec, Box::new(move |t| seen.set(t))).unwrap();
        assert_eq!(last.get(), -1.0);

        engine.advance(Duration::from_millis(50));
        assert!(last.get() > 0.5 && last.get() < 1.0);
        engine.advance(Duration::from_millis(80));
        assert_eq!(last.get(), 1.0);
        assert!(!engine.is_active(id));
        assert_eq!(engine.frames_delivered(), 2);
    }

    #[test]
    fn killed_ticker_stops_receiving_frames() {
        let engine = HeadlessEngine::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let spec = TickerSpec {
            duration: Duration::from_secs(1),
            delay: Duration::ZERO,
            easing: EasingFunction::Linear,
        };
        let id = engine
            .ticker(&spec, Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();
        engine.advance(Duration::from_millis(16));
        engine.kill(id);
        engine.advance(Duration::from_millis(16));
        assert_eq!(hits.get(), 1);
        assert_eq!(engine.kill_count(id), 1);
    }

    #[test]
    fn forever_tweens_never_finish() {
        let engine = HeadlessEngine::new();
        let spec = TweenSpec::to(
            target(),
            VisualState::EMPTY.y(10.0),
            Duration::from_millis(1500),
            EasingFunction::CubicInOut,
        )
        .repeating(Repeat::Forever, true);
        let id = engine.tween(&spec).unwrap();
        engine.advance(Duration::from_secs(60));
        assert!(engine.is_active(id));
        assert_eq!(engine.looping_count(), 1);
    }

    #[test]
    fn error_fault_rejects_calls() {
        let engine = HeadlessEngine::new();
        engine.set_fault(FaultMode::Error);
        assert!(engine.set(&target(), &VisualState::SHOWN).is_err());
        let spec = TweenSpec::to(
            target(),
            VisualState::SHOWN,
            Duration::from_millis(10),
            EasingFunction::Linear,
        );
        assert!(matches!(engine.tween(&spec), Err(EngineError::Rejected(_))));
        assert!(engine.created().is_empty());
    }

    #[test]
    fn removed_targets_are_missing() {
        let engine = HeadlessEngine::new();
        assert!(engine.has_target(&target()));
        engine.remove_target(&target());
        assert!(!engine.has_target(&target()));
    }

    #[test]
    fn viewport_reports_reach_observers_of_the_target() {
        let viewport = HeadlessViewport::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = viewport
            .observe(
                &target(),
                0.3,
                Box::new(move |entry| sink.borrow_mut().push(entry.ratio)),
            )
            .unwrap();

        viewport.report(&TargetId::new("other"), 1.0);
        viewport.report(&target(), 0.5);
        assert_eq!(*seen.borrow(), vec![0.5]);

        viewport.unobserve(id);
        viewport.scroll_into_view(&target());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(viewport.unobserve_count(id), 1);
        assert_eq!(viewport.observer_count(&target()), 0);
    }
}
