//! Progress mapper: turns committed scroll progress into animation targets.
//!
//! Two policies exist. `Toggle` snaps between the two endpoint dictionaries;
//! `Scrub` interpolates between them. For collections of units (lines, words,
//! letters) each unit gets its own slice of the progress range so that units
//! earlier in the collection reveal first.

use crate::interpolate::interpolate;
use crate::style::StyleDictionary;

/// Default fraction of the progress range a single unit's reveal spans.
pub const DEFAULT_STAGGER_COEFFICIENT: f64 = 0.3;

/// How progress maps onto the endpoint dictionaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MappingMode {
    /// Hard switch between endpoints
    Toggle,
    /// Continuous interpolation
    #[default]
    Scrub,
}

/// When progress is allowed to drive the animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PlayMode {
    /// Every committed progress change re-evaluates
    #[default]
    Always,
    /// Stops re-evaluating after reaching progress 1, until reset
    Once,
    /// Ignores scroll sampling; progress is set by the owner
    Manual,
}

/// How a unit's staggered progress behaves outside its window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum UnitRange {
    /// Saturate at the window edges
    #[default]
    Clamped,
    /// Keep remapping linearly past the edges (overshoot)
    Extrapolate,
}

/// Linear remap from `[in_min, in_max]` to `[out_min, out_max]`, unclamped.
///
/// An empty input range behaves as a step at `in_max`.
pub fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 {
        return if value >= in_max { out_max } else { out_min };
    }
    out_min + (out_max - out_min) * ((value - in_min) / span)
}

/// Linear remap clamped to the output range.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::transform_range;
///
/// assert_eq!(transform_range(0.5, 0.0, 1.0, 1.0, 0.0), 0.5);
/// assert_eq!(transform_range(2.0, 0.0, 1.0, 1.0, 0.0), 0.0);
/// assert_eq!(transform_range(-1.0, 0.0, 1.0, 1.0, 0.0), 1.0);
/// ```
pub fn transform_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let out = remap(value, in_min, in_max, out_min, out_max);
    out.clamp(out_min.min(out_max), out_min.max(out_max))
}

/// Resolved state of one unit in a staggered collection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnitPhase {
    Revealed,
    Hidden,
    /// Weight toward the hidden endpoint (`0` = revealed, `1` = hidden)
    Blend(f64),
}

/// Maps committed progress to element or per-unit targets.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{MappingMode, ProgressMapper, StyleDictionary};
///
/// let from = StyleDictionary::new().with("opacity", 0.0);
/// let to = StyleDictionary::new().with("opacity", 1.0);
///
/// let mut toggle = ProgressMapper::new(MappingMode::Toggle);
/// toggle.commit(0.99);
/// assert_eq!(toggle.element_target(&from, &to), Some(from.clone()));
/// toggle.commit(1.0);
/// assert_eq!(toggle.element_target(&from, &to), Some(to.clone()));
/// ```
#[derive(Clone, Debug)]
pub struct ProgressMapper {
    mode: MappingMode,
    play_mode: PlayMode,
    stagger: f64,
    unit_range: UnitRange,
    /// Last progress accepted by `commit`
    progress: f64,
    /// Set once progress reached 1
    completed: bool,
}

impl ProgressMapper {
    /// Mapper with default stagger, clamped units and `Always` play mode.
    pub fn new(mode: MappingMode) -> Self {
        Self {
            mode,
            play_mode: PlayMode::Always,
            stagger: DEFAULT_STAGGER_COEFFICIENT,
            unit_range: UnitRange::Clamped,
            progress: 0.0,
            completed: false,
        }
    }

    /// Set the play mode.
    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.play_mode = play_mode;
        self
    }

    /// Set the stagger coefficient.
    pub fn with_stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }

    /// Set how unit windows behave past their edges.
    pub fn with_unit_range(mut self, unit_range: UnitRange) -> Self {
        self.unit_range = unit_range;
        self
    }

    /// Mapping policy.
    #[inline]
    pub fn mode(&self) -> MappingMode {
        self.mode
    }

    /// Play mode.
    #[inline]
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    /// Last committed progress.
    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// True once a `Once` mapper has latched its terminal state.
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.play_mode == PlayMode::Once && self.completed
    }

    /// Accept a new progress value.
    ///
    /// Returns false when the mapper is latched and the value must not be
    /// re-evaluated. The play that first reaches progress 1 still runs.
    pub fn commit(&mut self, progress: f64) -> bool {
        if self.is_latched() {
            return false;
        }
        self.progress = progress;
        if progress >= 1.0 {
            if self.play_mode == PlayMode::Once && !self.completed {
                tracing::debug!("play-once mapper latched");
            }
            self.completed = true;
        }
        true
    }

    /// Clear the latch and progress.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.completed = false;
    }

    /// Element-level target for the current progress.
    ///
    /// `None` when `to` is empty (nothing to animate).
    pub fn element_target(
        &self,
        from: &StyleDictionary,
        to: &StyleDictionary,
    ) -> Option<StyleDictionary> {
        if to.is_empty() {
            return None;
        }
        Some(match self.mode {
            MappingMode::Toggle if self.progress >= 1.0 => to.clone(),
            MappingMode::Toggle => from.clone(),
            MappingMode::Scrub => interpolate(from, to, self.progress),
        })
    }

    /// Phase of unit `index` in a collection of `len` units.
    pub fn unit_phase(&self, index: usize, len: usize) -> UnitPhase {
        let threshold = if len == 0 {
            0.0
        } else {
            index as f64 / len as f64
        };
        match self.mode {
            MappingMode::Toggle if self.progress > threshold => UnitPhase::Revealed,
            MappingMode::Toggle => UnitPhase::Hidden,
            MappingMode::Scrub => {
                let lo = threshold - self.stagger;
                let t = match self.unit_range {
                    UnitRange::Clamped => transform_range(self.progress, lo, threshold, 1.0, 0.0),
                    UnitRange::Extrapolate => remap(self.progress, lo, threshold, 1.0, 0.0),
                };
                UnitPhase::Blend(t)
            }
        }
    }

    /// Style of unit `index` given its revealed and hidden endpoints.
    pub fn unit_style(
        &self,
        index: usize,
        len: usize,
        revealed: &StyleDictionary,
        hidden: &StyleDictionary,
    ) -> StyleDictionary {
        match self.unit_phase(index, len) {
            UnitPhase::Revealed => revealed.clone(),
            UnitPhase::Hidden => hidden.clone(),
            UnitPhase::Blend(t) => interpolate(revealed, hidden, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleValue;
    use approx::assert_relative_eq;

    fn endpoints() -> (StyleDictionary, StyleDictionary) {
        (
            StyleDictionary::new().with("opacity", 0.0).with("y", "40px"),
            StyleDictionary::new().with("opacity", 1.0).with("y", "0px"),
        )
    }

    #[test]
    fn test_toggle_has_no_intermediate_values() {
        let (from, to) = endpoints();
        let mut m = ProgressMapper::new(MappingMode::Toggle);
        for p in [0.0, 0.1, 0.5, 0.999] {
            m.commit(p);
            assert_eq!(m.element_target(&from, &to).unwrap(), from);
        }
        m.commit(1.0);
        assert_eq!(m.element_target(&from, &to).unwrap(), to);
    }

    #[test]
    fn test_scrub_interpolates() {
        let (from, to) = endpoints();
        let mut m = ProgressMapper::new(MappingMode::Scrub);
        m.commit(0.25);
        let out = m.element_target(&from, &to).unwrap();
        assert_eq!(out.get("opacity"), Some(&StyleValue::Number(0.25)));
        assert_eq!(out.get("y"), Some(&StyleValue::dimensioned(30.0, "px")));
    }

    #[test]
    fn test_empty_to_means_nothing_to_animate() {
        let m = ProgressMapper::new(MappingMode::Scrub);
        assert_eq!(m.element_target(&StyleDictionary::new(), &StyleDictionary::new()), None);
    }

    #[test]
    fn test_staggered_toggle_thresholds() {
        let mut m = ProgressMapper::new(MappingMode::Toggle);
        m.commit(0.5);
        // thresholds 0, .25, .5, .75
        let phases: Vec<_> = (0..4).map(|i| m.unit_phase(i, 4)).collect();
        assert_eq!(
            phases,
            vec![
                UnitPhase::Revealed,
                UnitPhase::Revealed,
                UnitPhase::Hidden,
                UnitPhase::Hidden
            ]
        );
    }

    #[test]
    fn test_staggered_scrub_window() {
        let mut m = ProgressMapper::new(MappingMode::Scrub).with_stagger(0.25);
        // unit 2 of 4: window [0.25, 0.5] maps to [1, 0]
        m.commit(0.375);
        match m.unit_phase(2, 4) {
            UnitPhase::Blend(t) => assert_relative_eq!(t, 0.5),
            other => panic!("unexpected {other:?}"),
        }
        m.commit(0.0);
        assert_eq!(m.unit_phase(2, 4), UnitPhase::Blend(1.0));
        m.commit(0.9);
        assert_eq!(m.unit_phase(2, 4), UnitPhase::Blend(0.0));
    }

    #[test]
    fn test_extrapolated_range_overshoots() {
        let mut m = ProgressMapper::new(MappingMode::Scrub)
            .with_stagger(0.25)
            .with_unit_range(UnitRange::Extrapolate);
        m.commit(0.75);
        match m.unit_phase(2, 4) {
            UnitPhase::Blend(t) => assert_relative_eq!(t, -1.0),
            other => panic!("unexpected {other:?}"),
        }
        let revealed = StyleDictionary::new().with("opacity", 1.0);
        let hidden = StyleDictionary::new().with("opacity", 0.0);
        let style = m.unit_style(2, 4, &revealed, &hidden);
        assert_eq!(style.get("opacity"), Some(&StyleValue::Number(2.0)));
    }

    #[test]
    fn test_once_latches_until_reset() {
        let mut m = ProgressMapper::new(MappingMode::Toggle).with_play_mode(PlayMode::Once);
        assert!(m.commit(0.4));
        assert!(m.commit(1.0));
        assert!(m.is_latched());
        assert!(!m.commit(0.2));
        assert_eq!(m.progress(), 1.0);

        m.reset();
        assert!(!m.is_latched());
        assert!(m.commit(0.2));
    }

    #[test]
    fn test_always_never_latches() {
        let mut m = ProgressMapper::new(MappingMode::Toggle);
        assert!(m.commit(1.0));
        assert!(m.commit(0.0));
        assert!(!m.is_latched());
    }

    #[test]
    fn test_remap_degenerate_range() {
        assert_eq!(remap(0.5, 0.5, 0.5, 1.0, 0.0), 0.0);
        assert_eq!(remap(0.4, 0.5, 0.5, 1.0, 0.0), 1.0);
    }
}
