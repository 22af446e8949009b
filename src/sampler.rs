//! Geometry sampler: turns element geometry into committed progress samples.

use crate::trigger::{trigger_progress, BoundingBox, TriggerPosition};
use crate::viewport::Viewport;

/// Default minimum time between samples.
pub const DEFAULT_FRAME_INTERVAL_MS: u32 = 10;

/// A committed progress value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSample {
    /// Progress in `[0, 1]`
    pub progress: f64,
    /// Time of the tick that produced it
    pub timestamp_ms: u64,
}

/// Sampler options.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerConfig {
    pub start: TriggerPosition,
    pub end: TriggerPosition,
    /// Minimum time between samples in milliseconds
    pub frame_interval_ms: u32,
    /// Sampling happens only while enabled
    pub enabled: bool,
    /// Skip sampling on mobile-sized viewports
    pub disable_on_mobile: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            start: TriggerPosition::default_start(),
            end: TriggerPosition::default_end(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            enabled: true,
            disable_on_mobile: false,
        }
    }
}

/// Samples one element's trigger progress.
///
/// Each accepted tick reads the element box and viewport height, computes
/// progress and commits it only if it differs from the previous commit.
/// Ticks are skipped entirely when sampling is disabled, the element is out
/// of view, or there is no rendering surface.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{BoundingBox, GeometrySampler, SamplerConfig, StaticViewport};
///
/// let viewport = StaticViewport::new(1280.0, 1000.0);
/// let mut sampler = GeometrySampler::new(SamplerConfig::default());
/// let bbox = BoundingBox::new(800.0, 1000.0);
///
/// let sample = sampler.sample(0, Some(bbox), &viewport, true).unwrap();
/// assert!((sample.progress - 1.0 / 6.0).abs() < 1e-9);
///
/// // Element did not move: nothing new to report
/// assert!(sampler.sample(20, Some(bbox), &viewport, true).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct GeometrySampler {
    config: SamplerConfig,
    /// Last committed progress
    committed: Option<f64>,
    /// Time of the last accepted tick
    last_tick_ms: Option<u64>,
}

impl GeometrySampler {
    /// Sampler with nothing committed yet.
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            committed: None,
            last_tick_ms: None,
        }
    }

    /// Sampler options.
    #[inline]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Enable or disable sampling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Whether sampling is currently allowed for this viewport.
    pub fn is_active<V: Viewport + ?Sized>(&self, viewport: &V) -> bool {
        self.config.enabled && !(self.config.disable_on_mobile && viewport.is_mobile())
    }

    /// Last committed progress, `None` before the first commit.
    #[inline]
    pub fn last_progress(&self) -> Option<f64> {
        self.committed
    }

    /// Run one sampling tick.
    ///
    /// Returns a sample only when progress changed since the last commit.
    pub fn sample<V: Viewport + ?Sized>(
        &mut self,
        now_ms: u64,
        bbox: Option<BoundingBox>,
        viewport: &V,
        in_view: bool,
    ) -> Option<ProgressSample> {
        if !in_view || !self.is_active(viewport) {
            return None;
        }
        let size = viewport.size()?;
        let bbox = bbox?;

        if let Some(last) = self.last_tick_ms {
            if now_ms.saturating_sub(last) < self.config.frame_interval_ms as u64 {
                return None;
            }
        }
        self.last_tick_ms = Some(now_ms);

        let progress = trigger_progress(&bbox, size.height, self.config.start, self.config.end);
        tracing::trace!(now_ms, progress, "sampled trigger progress");

        if self.committed == Some(progress) {
            return None;
        }
        tracing::debug!(progress, "progress committed");
        self.committed = Some(progress);
        Some(ProgressSample {
            progress,
            timestamp_ms: now_ms,
        })
    }

    /// Forget the committed value and the tick clock.
    pub fn reset(&mut self) {
        self.committed = None;
        self.last_tick_ms = None;
    }
}
