//! Handle arena for one controller.

use std::fmt;

use crate::engine::{
    EngineError, FrameCallback, IntersectionCallback, Stage, TargetId,
    TickerSpec, TriggerId, TweenId, TweenSpec, VisualState,
};

/// Anything a scope must release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationHandle {
    /// A tween or ticker.
    Tween(TweenId),
    /// A viewport trigger.
    Trigger(TriggerId),
}

/// Owns every animation handle a controller starts.
///
/// Every acquisition goes through the scope and is recorded. Handles are
/// released individually with [`release`](Self::release), all at once with
/// [`release_all`](Self::release_all), and unconditionally on drop. Each
/// handle is torn down exactly once.
///
/// Targets the engine does not know about are skipped: acquisitions
/// return `Ok(None)` and nothing is recorded.
pub struct AnimationScope {
    label: &'static str,
    stage: Stage,
    handles: Vec<AnimationHandle>,
}

impl AnimationScope {
    /// Create an empty scope on `stage`. `label` names the owner in logs.
    pub fn new(label: &'static str, stage: Stage) -> Self {
        Self {
            label,
            stage,
            handles: Vec::new(),
        }
    }

    /// The stage this scope animates on.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    fn target_missing(&self, target: &TargetId) -> bool {
        if self.stage.engine.has_target(target) {
            return false;
        }
        log::trace!("{}: target `{target}` not attached, skipping", self.label);
        true
    }

    /// Apply `state` to `target` immediately.
    pub fn set(
        &self,
        target: &TargetId,
        state: &VisualState,
    ) -> Result<(), EngineError> {
        if self.target_missing(target) {
            return Ok(());
        }
        self.stage.engine.set(target, state)
    }

    /// Start and track a tween.
    pub fn tween(
        &mut self,
        spec: &TweenSpec,
    ) -> Result<Option<TweenId>, EngineError> {
        if self.target_missing(&spec.target) {
            return Ok(None);
        }
        let id = self.stage.engine.tween(spec)?;
        self.handles.push(AnimationHandle::Tween(id));
        Ok(Some(id))
    }

    /// Start and track a ticker.
    pub fn ticker(
        &mut self,
        spec: &TickerSpec,
        on_frame: FrameCallback,
    ) -> Result<TweenId, EngineError> {
        let id = self.stage.engine.ticker(spec, on_frame)?;
        self.handles.push(AnimationHandle::Tween(id));
        Ok(id)
    }

    /// Register and track a viewport trigger on `target`.
    pub fn observe(
        &mut self,
        target: &TargetId,
        threshold: f32,
        callback: IntersectionCallback,
    ) -> Result<Option<TriggerId>, EngineError> {
        if self.target_missing(target) {
            return Ok(None);
        }
        let id = self.stage.viewport.observe(target, threshold, callback)?;
        self.handles.push(AnimationHandle::Trigger(id));
        Ok(Some(id))
    }

    /// Whether a tracked tween is still running.
    #[must_use]
    pub fn is_running(&self, id: TweenId) -> bool {
        self.handles.contains(&AnimationHandle::Tween(id))
            && self.stage.engine.is_active(id)
    }

    /// Release one handle if this scope still owns it.
    pub fn release(&mut self, handle: AnimationHandle) {
        let before = self.handles.len();
        self.handles.retain(|h| *h != handle);
        if self.handles.len() != before {
            self.teardown(handle);
        }
    }

    /// Release every handle. Safe to call repeatedly.
    pub fn release_all(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        let handles = std::mem::take(&mut self.handles);
        log::debug!("{}: releasing {} handle(s)", self.label, handles.len());
        for handle in handles {
            self.teardown(handle);
        }
    }

    fn teardown(&self, handle: AnimationHandle) {
        match handle {
            AnimationHandle::Tween(id) => self.stage.engine.kill(id),
            AnimationHandle::Trigger(id) => self.stage.viewport.unobserve(id),
        }
    }

    /// Number of handles currently owned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the scope owns nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for AnimationScope {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for AnimationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScope")
            .field("label", &self.label)
            .field("handles", &self.handles)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::util::easing::EasingFunction;

    fn fade(target: &str) -> TweenSpec {
        TweenSpec::from_to(
            TargetId::new(target),
            VisualState::EMPTY.opacity(0.0),
            VisualState::SHOWN,
            Duration::from_millis(300),
            EasingFunction::Linear,
        )
    }

    #[test]
    fn release_all_kills_each_handle_once() {
        let (stage, engine, viewport) = Stage::headless();
        let mut scope = AnimationScope::new("test", stage);
        let a = scope.tween(&fade("a")).unwrap().unwrap();
        let b = scope.tween(&fade("b")).unwrap().unwrap();
        let trigger = scope
            .observe(&TargetId::new("a"), 0.2, Box::new(|_| {}))
            .unwrap()
            .unwrap();
        assert_eq!(scope.len(), 3);

        scope.release_all();
        scope.release_all();
        drop(scope);

        assert_eq!(engine.kill_count(a), 1);
        assert_eq!(engine.kill_count(b), 1);
        assert_eq!(viewport.unobserve_count(trigger), 1);
    }

    #[test]
    fn drop_releases_handles() {
        let (stage, engine, _viewport) = Stage::headless();
        let id = {
            let mut scope = AnimationScope::new("test", stage);
            scope.tween(&fade("a")).unwrap().unwrap()
        };
        assert_eq!(engine.kill_count(id), 1);
        assert!(engine.live_handles().is_empty());
    }

    #[test]
    fn single_release_then_release_all() {
        let (stage, engine, _viewport) = Stage::headless();
        let mut scope = AnimationScope::new("test", stage);
        let id = scope.tween(&fade("a")).unwrap().unwrap();
        scope.release(AnimationHandle::Tween(id));
        scope.release(AnimationHandle::Tween(id));
        scope.release_all();
        assert_eq!(engine.kill_count(id), 1);
        assert!(scope.is_empty());
    }

    #[test]
    fn missing_target_is_a_silent_noop() {
        let (stage, engine, viewport) = Stage::headless();
        let ghost = TargetId::new("ghost");
        engine.remove_target(&ghost);
        let mut scope = AnimationScope::new("test", stage);

        assert_eq!(scope.tween(&fade("ghost")).unwrap(), None);
        assert_eq!(scope.observe(&ghost, 0.2, Box::new(|_| {})).unwrap(), None);
        scope.set(&ghost, &VisualState::SHOWN).unwrap();
        assert!(scope.is_empty());
        assert!(engine.created().is_empty());
        assert!(viewport.created().is_empty());
    }
}
