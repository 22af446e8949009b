//! Reveal gating and grid staggering.
//!
//! [`RevealGate`] decides whether an element should be shown and emits a
//! command each time that decision flips. [`AnimatedGrid`] packs content into
//! rows and assigns every cell its stagger delay and animation settings.

use std::collections::HashMap;

use crate::layout::{Gap, TextLayout, TextMeasurer};
use crate::spring::SpringConfig;
use crate::style::StyleDictionary;
use crate::text::ContentNode;
use crate::trigger::BoundingBox;

/// Visible fraction of an element at which it counts as in view.
pub const DEFAULT_VIEW_AMOUNT: f64 = 0.3;

/// When a gated element may play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RevealMode {
    /// Follows readiness both ways
    #[default]
    Always,
    /// Stays shown after the first reveal
    Once,
    /// Stays shown while the element top is above the viewport top
    Forward,
}

/// Endpoint a command animates to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealTarget {
    To,
    From,
}

/// Instruction for the renderer's spring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealCommand {
    pub target: RevealTarget,
    pub delay_ms: u64,
    /// Jump without animating
    pub immediate: bool,
}

/// Show/hide decision for one element.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{RevealGate, RevealMode, RevealTarget};
///
/// let mut gate = RevealGate::new(RevealMode::Once).with_delays(120, 0);
/// assert_eq!(gate.update(false, false, None), None);
///
/// let cmd = gate.update(true, false, None).unwrap();
/// assert_eq!((cmd.target, cmd.delay_ms), (RevealTarget::To, 120));
///
/// // once revealed, losing readiness does not hide it
/// assert_eq!(gate.update(false, false, None), None);
/// ```
#[derive(Clone, Debug)]
pub struct RevealGate {
    mode: RevealMode,
    enabled: bool,
    disable_on_mobile: bool,
    delay_in_ms: u64,
    delay_out_ms: u64,
    immediate_out: bool,
    /// Revealed at least once
    animated: bool,
    /// Forward mode: element top reached the viewport top
    scrolled_down: bool,
    active: bool,
}

impl RevealGate {
    /// Enabled gate, inactive until the first ready update.
    pub fn new(mode: RevealMode) -> Self {
        Self {
            mode,
            enabled: true,
            disable_on_mobile: false,
            delay_in_ms: 0,
            delay_out_ms: 0,
            immediate_out: false,
            animated: false,
            scrolled_down: false,
            active: false,
        }
    }

    /// Delays of reveal and hide commands.
    pub fn with_delays(mut self, delay_in_ms: u64, delay_out_ms: u64) -> Self {
        self.delay_in_ms = delay_in_ms;
        self.delay_out_ms = delay_out_ms;
        self
    }

    /// Hide without animating.
    pub fn with_immediate_out(mut self, immediate_out: bool) -> Self {
        self.immediate_out = immediate_out;
        self
    }

    /// Never reveal on mobile viewports.
    pub fn with_disable_on_mobile(mut self, disable: bool) -> Self {
        self.disable_on_mobile = disable;
        self
    }

    /// Enable or disable the gate.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Gate mode.
    #[inline]
    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    /// True while revealed.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Re-evaluate with the current readiness, viewport class and element top.
    ///
    /// Returns a command only when the active state changes. Nothing is
    /// emitted on a mobile viewport when the gate is disabled on mobile.
    pub fn update(
        &mut self,
        ready: bool,
        is_mobile: bool,
        element_top: Option<f64>,
    ) -> Option<RevealCommand> {
        if self.disable_on_mobile && is_mobile {
            return None;
        }
        if self.mode == RevealMode::Forward {
            if let Some(top) = element_top {
                self.scrolled_down = top <= 0.0;
            }
        }

        let active = self.evaluate(ready);
        if active == self.active {
            return None;
        }
        self.active = active;
        tracing::debug!(active, mode = ?self.mode, "reveal gate flipped");

        Some(if active {
            RevealCommand {
                target: RevealTarget::To,
                delay_ms: self.delay_in_ms,
                immediate: false,
            }
        } else {
            RevealCommand {
                target: RevealTarget::From,
                delay_ms: self.delay_out_ms,
                immediate: self.immediate_out,
            }
        })
    }

    fn evaluate(&mut self, ready: bool) -> bool {
        if !self.enabled {
            return false;
        }
        if self.mode == RevealMode::Once && self.animated {
            return true;
        }
        if self.mode == RevealMode::Forward && self.scrolled_down {
            return true;
        }
        if ready {
            self.animated = true;
        }
        ready
    }

    /// Forget the once latch and scroll direction.
    pub fn reset(&mut self) {
        self.animated = false;
        self.scrolled_down = false;
    }
}

/// Fraction of the element's height inside the viewport.
pub fn visible_fraction(bbox: &BoundingBox, viewport_height: f64) -> f64 {
    if !(bbox.height > 0.0) {
        return 0.0;
    }
    let visible = bbox.bottom.min(viewport_height) - bbox.top.max(0.0);
    (visible / bbox.height).clamp(0.0, 1.0)
}

/// In-view tracker with an optional once latch.
#[derive(Clone, Debug)]
pub struct InView {
    pub amount: f64,
    pub once: bool,
    in_view: bool,
}

impl Default for InView {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_AMOUNT, false)
    }
}

impl InView {
    /// Tracker requiring `amount` of the element visible; `once` latches.
    pub fn new(amount: f64, once: bool) -> Self {
        Self {
            amount,
            once,
            in_view: false,
        }
    }

    /// Update from geometry. A latched tracker stays in view.
    pub fn update(&mut self, bbox: &BoundingBox, viewport_height: f64) -> bool {
        if self.once && self.in_view {
            return true;
        }
        let fraction = visible_fraction(bbox, viewport_height);
        self.in_view = fraction > 0.0 && fraction >= self.amount;
        self.in_view
    }

    /// Current in-view state.
    #[inline]
    pub fn get(&self) -> bool {
        self.in_view
    }
}

/// How grid cells are staggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum StaggerKind {
    /// Delay grows with the unit index
    #[default]
    Words,
    /// Delay grows with the row index
    Rows,
}

/// Delay of one cell. A per-cell override wins over the computed delay.
pub fn stagger_delay(
    kind: StaggerKind,
    row: usize,
    element: usize,
    step_ms: u64,
    cell_override: Option<u64>,
) -> u64 {
    cell_override.unwrap_or(match kind {
        StaggerKind::Rows => row as u64 * step_ms,
        StaggerKind::Words => element as u64 * step_ms,
    })
}

/// Endpoints, spring and stagger step of a cell animation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimationSettings {
    pub from: StyleDictionary,
    pub to: StyleDictionary,
    pub spring: SpringConfig,
    pub delay_step_ms: Option<u64>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            from: StyleDictionary::new().with("opacity", 1.0),
            to: StyleDictionary::new().with("opacity", 1.0),
            spring: SpringConfig::default(),
            delay_step_ms: None,
        }
    }
}

impl AnimationSettings {
    /// Settings animating from `from` to `to` with the default spring.
    pub fn new(from: StyleDictionary, to: StyleDictionary) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    /// Delay added per row or unit.
    pub fn with_delay_step(mut self, step_ms: u64) -> Self {
        self.delay_step_ms = Some(step_ms);
        self
    }
}

/// Overrides for cells whose element carries a given id.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CellConfig {
    /// Replaces the wrapper animation; its delay step is used as an
    /// absolute delay
    pub animation: Option<AnimationSettings>,
    pub element_animation: Option<AnimationSettings>,
}

/// One placed cell of an animated grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub index: usize,
    pub row: usize,
    pub delay_ms: u64,
    pub element_id: Option<String>,
    pub animation: AnimationSettings,
    pub element_animation: Option<AnimationSettings>,
}

/// Content packed into rows with per-cell reveal settings.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{
///     AnimatedGrid, AnimationSettings, ContentNode, MonospaceMeasurer, StaggerKind,
///     StyleDictionary,
/// };
///
/// let animation = AnimationSettings::new(
///     StyleDictionary::new().with("opacity", 0.0),
///     StyleDictionary::new().with("opacity", 1.0),
/// )
/// .with_delay_step(40);
///
/// let mut grid = AnimatedGrid::new(&[ContentNode::text("one two three")], 1000.0, StaggerKind::Words, animation);
/// let delays: Vec<_> = grid.cells(&MonospaceMeasurer::default()).iter().map(|c| c.delay_ms).collect();
/// assert_eq!(delays, vec![0, 40, 80]);
/// ```
#[derive(Clone, Debug)]
pub struct AnimatedGrid {
    layout: TextLayout,
    kind: StaggerKind,
    animation: AnimationSettings,
    element_animation: Option<AnimationSettings>,
    cell_configs: HashMap<String, CellConfig>,
    once: bool,
}

impl AnimatedGrid {
    /// Grid over `content` with one animation for every cell.
    pub fn new(
        content: &[ContentNode],
        container_width: f64,
        kind: StaggerKind,
        animation: AnimationSettings,
    ) -> Self {
        Self {
            layout: TextLayout::new(content, container_width),
            kind,
            animation,
            element_animation: None,
            cell_configs: HashMap::new(),
            once: false,
        }
    }

    /// Animation of the element inside each cell.
    pub fn with_element_animation(mut self, animation: AnimationSettings) -> Self {
        self.element_animation = Some(animation);
        self
    }

    /// Override cells whose element id is `id`.
    pub fn with_cell_config(mut self, id: impl Into<String>, config: CellConfig) -> Self {
        self.cell_configs.insert(id.into(), config);
        self
    }

    /// Reveal once and stay revealed.
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Horizontal gap between cells.
    pub fn with_gap(mut self, gap: Gap) -> Self {
        self.layout.set_gap(gap);
        self
    }

    /// Underlying layout.
    #[inline]
    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    /// Underlying layout, for resizes and content changes.
    #[inline]
    pub fn layout_mut(&mut self) -> &mut TextLayout {
        &mut self.layout
    }

    /// Placed cells in row order. Break units are not cells.
    pub fn cells<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) -> Vec<GridCell> {
        let rows = self.layout.rows(measurer).to_vec();
        let units = self.layout.units();
        let step = self.animation.delay_step_ms.unwrap_or(0);

        let mut cells = Vec::new();
        for (row_index, row) in rows.iter().enumerate() {
            for &index in &row.units {
                let Some(unit) = units.get(index) else {
                    continue;
                };
                if unit.is_break() {
                    continue;
                }
                let config = unit
                    .element_id
                    .as_ref()
                    .and_then(|id| self.cell_configs.get(id));
                let cell_animation = config.and_then(|c| c.animation.as_ref());

                cells.push(GridCell {
                    index,
                    row: row_index,
                    delay_ms: stagger_delay(
                        self.kind,
                        row_index,
                        index,
                        step,
                        cell_animation.and_then(|a| a.delay_step_ms),
                    ),
                    element_id: unit.element_id.clone(),
                    animation: cell_animation.unwrap_or(&self.animation).clone(),
                    element_animation: config
                        .and_then(|c| c.element_animation.clone())
                        .or_else(|| self.element_animation.clone()),
                });
            }
        }
        cells
    }

    /// Gate for a cell: delayed reveal, immediate hide.
    pub fn gate(&self, cell: &GridCell) -> RevealGate {
        let mode = if self.once {
            RevealMode::Once
        } else {
            RevealMode::Always
        };
        RevealGate::new(mode)
            .with_delays(cell.delay_ms, 0)
            .with_immediate_out(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceMeasurer;

    #[test]
    fn test_always_follows_readiness() {
        let mut gate = RevealGate::new(RevealMode::Always)
            .with_delays(100, 50)
            .with_immediate_out(true);
        assert_eq!(
            gate.update(true, false, None),
            Some(RevealCommand {
                target: RevealTarget::To,
                delay_ms: 100,
                immediate: false
            })
        );
        assert_eq!(gate.update(true, false, None), None);
        assert_eq!(
            gate.update(false, false, None),
            Some(RevealCommand {
                target: RevealTarget::From,
                delay_ms: 50,
                immediate: true
            })
        );
    }

    #[test]
    fn test_disabled_and_mobile() {
        let mut gate = RevealGate::new(RevealMode::Once).with_disable_on_mobile(true);
        assert_eq!(gate.update(true, true, None), None);
        assert!(!gate.is_active());

        assert!(gate.update(true, false, None).is_some());
        gate.set_enabled(false);
        // disabled hides even a once-latched gate
        assert_eq!(gate.update(true, false, None).map(|c| c.target), Some(RevealTarget::From));
    }

    #[test]
    fn test_forward_mode() {
        let mut gate = RevealGate::new(RevealMode::Forward);
        assert!(gate.update(false, false, Some(200.0)).is_none());
        // scrolled past the element top
        assert_eq!(gate.update(false, false, Some(0.0)).map(|c| c.target), Some(RevealTarget::To));
        assert_eq!(gate.update(false, false, Some(-300.0)), None);
        assert_eq!(gate.update(false, false, Some(10.0)).map(|c| c.target), Some(RevealTarget::From));
    }

    #[test]
    fn test_once_reset() {
        let mut gate = RevealGate::new(RevealMode::Once);
        gate.update(true, false, None);
        assert!(gate.update(false, false, None).is_none());
        gate.reset();
        assert_eq!(gate.update(false, false, None).map(|c| c.target), Some(RevealTarget::From));
    }

    #[test]
    fn test_in_view() {
        let mut view = InView::default();
        assert!(!view.update(&BoundingBox::new(950.0, 1150.0), 1000.0));
        assert!(view.update(&BoundingBox::new(700.0, 900.0), 1000.0));
        assert!(!view.update(&BoundingBox::new(-300.0, -100.0), 1000.0));

        let mut once = InView::new(0.5, true);
        assert!(once.update(&BoundingBox::new(0.0, 100.0), 1000.0));
        assert!(once.update(&BoundingBox::new(-300.0, -100.0), 1000.0));
    }

    #[test]
    fn test_stagger_delay() {
        assert_eq!(stagger_delay(StaggerKind::Rows, 2, 9, 100, None), 200);
        assert_eq!(stagger_delay(StaggerKind::Words, 2, 9, 100, None), 900);
        assert_eq!(stagger_delay(StaggerKind::Words, 2, 9, 100, Some(40)), 40);
    }

    fn grid_content() -> Vec<ContentNode> {
        vec![
            ContentNode::element("h2", vec![ContentNode::text("Big title")]).with_id("title"),
            ContentNode::LineBreak,
            ContentNode::text("aaaa bbbb cccc"),
        ]
    }

    #[test]
    fn test_grid_rows_and_overrides() {
        let animation = AnimationSettings::default().with_delay_step(50);
        let title = AnimationSettings::new(
            StyleDictionary::new().with("x", "-100px"),
            StyleDictionary::new().with("x", "0px"),
        )
        .with_delay_step(7);

        // 10px per character
        let measurer = MonospaceMeasurer {
            font_size: 10.0,
            char_width_ratio: 1.0,
            atomic_width: 10.0,
        };
        let mut grid = AnimatedGrid::new(&grid_content(), 105.0, StaggerKind::Rows, animation)
            .with_gap(Gap::from_px(10.0))
            .with_cell_config(
                "title",
                CellConfig {
                    animation: Some(title.clone()),
                    element_animation: None,
                },
            );

        let cells = grid.cells(&measurer);
        let placed: Vec<_> = cells.iter().map(|c| (c.index, c.row, c.delay_ms)).collect();
        // rows: [Big, title, <br>] [aaaa, bbbb] [cccc]
        assert_eq!(placed, vec![(0, 0, 7), (1, 0, 7), (3, 1, 50), (4, 1, 50), (5, 2, 100)]);
        assert_eq!(cells[0].animation, title);
        assert_eq!(cells[2].animation, AnimationSettings::default().with_delay_step(50));

        let gate = grid.gate(&cells[4]);
        assert_eq!(gate.mode(), RevealMode::Always);
    }
}
