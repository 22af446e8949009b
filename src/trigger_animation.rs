//! Spring-driven scroll trigger for a single element.

use crate::events::CompletionQueue;
use crate::mapper::{MappingMode, PlayMode, ProgressMapper};
use crate::sampler::{GeometrySampler, SamplerConfig};
use crate::scheduler::SamplingTask;
use crate::spring::{Spring, SpringConfig, StyleSpring};
use crate::style::StyleDictionary;
use crate::trigger::BoundingBox;
use crate::viewport::Viewport;

/// Queued whenever a committed progress change retargets the springs.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressChange {
    pub progress: f64,
    /// Style the springs are now heading to
    pub target: StyleDictionary,
}

/// Ties a sampler, a mapper and springs together for one element.
///
/// `frame` is called from the host's clock with the element's current box.
/// When a tick is due and progress changed, the springs are retargeted and a
/// [`ProgressChange`] is queued. `advance` steps the springs.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{
///     BoundingBox, MappingMode, SamplerConfig, SpringConfig, SpringTrigger, StaticViewport,
///     StyleDictionary,
/// };
///
/// let viewport = StaticViewport::new(1280.0, 1000.0);
/// let mut trigger = SpringTrigger::new(
///     SamplerConfig::default(),
///     MappingMode::Scrub,
///     StyleDictionary::new().with("opacity", 0.0),
///     StyleDictionary::new().with("opacity", 1.0),
///     SpringConfig::DEFAULT,
/// );
///
/// assert!(trigger.frame(0, Some(BoundingBox::new(400.0, 600.0)), &viewport, true));
/// let change = trigger.drain_changes().remove(0);
/// assert_eq!(change.target.to_css(), "opacity: 0.5");
///
/// while !trigger.advance(16.0) {}
/// assert_eq!(trigger.style(), change.target);
/// ```
#[derive(Clone, Debug)]
pub struct SpringTrigger {
    sampler: GeometrySampler,
    task: SamplingTask,
    mapper: ProgressMapper,
    from: StyleDictionary,
    to: StyleDictionary,
    progress: Spring,
    style: StyleSpring,
    changes: CompletionQueue<ProgressChange>,
}

impl SpringTrigger {
    /// Trigger animating from `from` to `to` as the element scrolls.
    pub fn new(
        sampler: SamplerConfig,
        mode: MappingMode,
        from: StyleDictionary,
        to: StyleDictionary,
        spring: SpringConfig,
    ) -> Self {
        let task = SamplingTask::new(sampler.frame_interval_ms);
        Self {
            sampler: GeometrySampler::new(sampler),
            task,
            mapper: ProgressMapper::new(mode),
            style: StyleSpring::new(&from, spring),
            progress: Spring::new(0.0, spring),
            from,
            to,
            changes: CompletionQueue::new(),
        }
    }

    /// Replace the mapper (play mode, stagger, unit range).
    pub fn with_mapper(mut self, mapper: ProgressMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Set the play mode.
    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.mapper = self.mapper.with_play_mode(play_mode);
        self
    }

    /// The geometry sampler.
    #[inline]
    pub fn sampler(&self) -> &GeometrySampler {
        &self.sampler
    }

    /// The sampling task.
    #[inline]
    pub fn task(&self) -> &SamplingTask {
        &self.task
    }

    /// The progress mapper.
    #[inline]
    pub fn mapper(&self) -> &ProgressMapper {
        &self.mapper
    }

    /// Enable or disable sampling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.sampler.set_enabled(enabled);
    }

    /// Run one host frame. Returns true when the springs were retargeted.
    pub fn frame<V: Viewport + ?Sized>(
        &mut self,
        now_ms: u64,
        bbox: Option<BoundingBox>,
        viewport: &V,
        in_view: bool,
    ) -> bool {
        self.task.set_visible(in_view, now_ms);
        if !self.task.poll(now_ms) {
            return false;
        }
        let Some(sample) = self.sampler.sample(now_ms, bbox, viewport, in_view) else {
            return false;
        };
        if !self.mapper.commit(sample.progress) {
            return false;
        }
        self.progress.set_target(sample.progress);

        let Some(target) = self.mapper.element_target(&self.from, &self.to) else {
            return false;
        };
        self.style.set_target(&target, false);
        self.changes.push(ProgressChange {
            progress: sample.progress,
            target,
        });
        true
    }

    /// Step the springs by `dt_ms`. Returns true when everything rests.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        let progress_rest = self.progress.step(dt_ms);
        self.style.step(dt_ms) && progress_rest
    }

    /// Spring-smoothed progress.
    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress.value()
    }

    /// Current animated style.
    pub fn style(&self) -> StyleDictionary {
        self.style.current()
    }

    /// Take the committed changes, oldest first.
    ///
    /// Drain once per frame. Only the most recent
    /// [`DEFAULT_QUEUE_CAPACITY`](crate::events::DEFAULT_QUEUE_CAPACITY)
    /// undrained changes are kept.
    pub fn drain_changes(&mut self) -> Vec<ProgressChange> {
        self.changes.drain()
    }

    /// Stop sampling and drop pending notifications.
    pub fn teardown(&mut self) {
        self.task.cancel();
        self.changes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TaskState;
    use crate::style::StyleValue;
    use crate::viewport::StaticViewport;
    use approx::assert_relative_eq;

    fn opacity_trigger(mode: MappingMode) -> SpringTrigger {
        SpringTrigger::new(
            SamplerConfig::default(),
            mode,
            StyleDictionary::new().with("opacity", 0.0),
            StyleDictionary::new().with("opacity", 1.0),
            SpringConfig::STIFF,
        )
    }

    #[test]
    fn test_scrub_retargets_on_change() {
        let vp = StaticViewport::new(1280.0, 1000.0);
        let mut trigger = opacity_trigger(MappingMode::Scrub);

        assert!(trigger.frame(0, Some(BoundingBox::new(800.0, 1000.0)), &vp, true));
        assert!(!trigger.frame(5, Some(BoundingBox::new(700.0, 900.0)), &vp, true));
        // same geometry, no commit
        assert!(!trigger.frame(10, Some(BoundingBox::new(800.0, 1000.0)), &vp, true));
        assert!(trigger.frame(20, Some(BoundingBox::new(400.0, 600.0)), &vp, true));

        let changes = trigger.drain_changes();
        assert_eq!(changes.len(), 2);
        assert_relative_eq!(changes[0].progress, 1.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(changes[1].progress, 0.5, epsilon = 1e-9);

        while !trigger.advance(16.0) {}
        assert_relative_eq!(trigger.progress(), 0.5, epsilon = 1e-9);
        match trigger.style().get("opacity") {
            Some(StyleValue::Number(n)) => assert_relative_eq!(*n, 0.5, epsilon = 1e-9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_undrained_changes_are_bounded() {
        let vp = StaticViewport::new(1280.0, 1000.0);
        let mut trigger = opacity_trigger(MappingMode::Scrub);
        for i in 0..200u64 {
            let top = 900.0 - i as f64;
            assert!(trigger.frame(i * 10, Some(BoundingBox::new(top, top + 200.0)), &vp, true));
        }

        let changes = trigger.drain_changes();
        assert_eq!(changes.len(), crate::events::DEFAULT_QUEUE_CAPACITY);
        // the newest change survives
        assert_relative_eq!(changes[changes.len() - 1].progress, 299.0 / 1200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_toggle_once_latches() {
        let vp = StaticViewport::new(1280.0, 1000.0);
        let mut trigger = opacity_trigger(MappingMode::Toggle).with_play_mode(PlayMode::Once);

        assert!(trigger.frame(0, Some(BoundingBox::new(-900.0, -700.0)), &vp, true));
        assert_eq!(trigger.drain_changes()[0].target.to_css(), "opacity: 1");
        assert!(trigger.mapper().is_latched());

        assert!(!trigger.frame(20, Some(BoundingBox::new(800.0, 1000.0)), &vp, true));
        assert!(trigger.drain_changes().is_empty());
    }

    #[test]
    fn test_empty_to_does_not_animate() {
        let vp = StaticViewport::new(1280.0, 1000.0);
        let mut trigger = SpringTrigger::new(
            SamplerConfig::default(),
            MappingMode::Scrub,
            StyleDictionary::new().with("opacity", 0.0),
            StyleDictionary::new(),
            SpringConfig::DEFAULT,
        );
        assert!(!trigger.frame(0, Some(BoundingBox::new(500.0, 700.0)), &vp, true));
        assert!(trigger.drain_changes().is_empty());
    }

    #[test]
    fn test_visibility_and_teardown() {
        let vp = StaticViewport::new(1280.0, 1000.0);
        let bbox = Some(BoundingBox::new(500.0, 700.0));
        let mut trigger = opacity_trigger(MappingMode::Scrub);

        assert!(!trigger.frame(0, bbox, &vp, false));
        assert_eq!(trigger.task().state(), TaskState::Idle);

        trigger.teardown();
        assert!(!trigger.frame(10, bbox, &vp, true));
        assert_eq!(trigger.task().state(), TaskState::Cancelled);
    }
}
