//! Text layout engine: measurement and row packing.
//!
//! Every unit is measured once (the ghost pass), then packed greedily into
//! rows that fit the container width minus a safety margin. The packed rows
//! drive per-row stagger delays; measured line groupings drive per-line
//! text animations.

use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use crate::text::{split_content, ContentNode, UnitKind, WordUnit};

/// Space kept free at the end of every row.
pub const SAFETY_MARGIN: f64 = 15.0;

/// Pixels per `em` when converting gap strings.
pub const ROOT_FONT_SIZE: f64 = 16.0;

/// Gap used when a gap string cannot be parsed.
pub const FALLBACK_GAP_PX: f64 = 8.0;

pub const DEFAULT_HORIZONTAL_GAP: &str = "0.5em";
pub const DEFAULT_VERTICAL_GAP: &str = "0.25em";

/// Maximum top-offset difference for two units to share a line.
pub const LINE_TOLERANCE_PX: f64 = 1.0;

/// Gap between units, in pixels.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::Gap;
///
/// assert_eq!(Gap::parse("0.5em").px(), 8.0);
/// assert_eq!(Gap::parse("12px").px(), 12.0);
/// assert_eq!(Gap::parse("2").px(), 32.0);
/// assert_eq!(Gap::parse("wide").px(), 8.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gap {
    px: f64,
}

impl Gap {
    /// Gap of a fixed pixel size.
    pub fn from_px(px: f64) -> Self {
        Self { px }
    }

    /// Parse a CSS-like gap. `px` values are taken as is; `em`, `rem` and
    /// bare numbers are multiplied by the root font size.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let (number, scale) = if let Some(n) = s.strip_suffix("px") {
            (n, 1.0)
        } else if let Some(n) = s.strip_suffix("rem") {
            (n, ROOT_FONT_SIZE)
        } else if let Some(n) = s.strip_suffix("em") {
            (n, ROOT_FONT_SIZE)
        } else {
            (s, ROOT_FONT_SIZE)
        };

        match number.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self { px: n * scale },
            _ => {
                tracing::debug!(gap = s, "unparseable gap, using fallback");
                Self {
                    px: FALLBACK_GAP_PX,
                }
            }
        }
    }

    /// Gap in pixels.
    #[inline]
    pub fn px(&self) -> f64 {
        self.px
    }
}

impl Default for Gap {
    fn default() -> Self {
        Self::parse(DEFAULT_HORIZONTAL_GAP)
    }
}

/// Measured size of one unit as seen by the packer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitMetrics {
    pub width: f64,
    /// Forced break: closes the current row
    pub is_break: bool,
}

impl UnitMetrics {
    /// Unit of the given width.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            is_break: false,
        }
    }

    /// Forced row break.
    pub fn line_break() -> Self {
        Self {
            width: 0.0,
            is_break: true,
        }
    }
}

/// Packed row of unit indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub units: Vec<usize>,
    /// Sum of unit widths plus inner gaps
    pub width: f64,
}

/// Greedy row packer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowPacker {
    pub gap_px: f64,
    pub safety_margin: f64,
}

impl Default for RowPacker {
    fn default() -> Self {
        Self {
            gap_px: Gap::default().px(),
            safety_margin: SAFETY_MARGIN,
        }
    }
}

impl RowPacker {
    /// Packer with the default safety margin.
    pub fn new(gap_px: f64) -> Self {
        Self {
            gap_px,
            ..Self::default()
        }
    }

    /// Pack units into rows.
    ///
    /// A unit joins the current row when `row_width + width + gap` stays
    /// within `container_width - safety_margin`; the gap counts only when
    /// the row already has members. Oversized units get a row of their own.
    pub fn pack(&self, metrics: &[UnitMetrics], container_width: f64) -> Vec<Row> {
        if !(container_width > 0.0) || metrics.is_empty() {
            return Vec::new();
        }
        let limit = container_width - self.safety_margin;

        let mut rows = Vec::new();
        let mut current = Row {
            units: Vec::new(),
            width: 0.0,
        };

        for (index, unit) in metrics.iter().enumerate() {
            if unit.is_break {
                current.units.push(index);
                rows.push(std::mem::replace(
                    &mut current,
                    Row {
                        units: Vec::new(),
                        width: 0.0,
                    },
                ));
                continue;
            }

            let gap = if current.units.is_empty() {
                0.0
            } else {
                self.gap_px
            };
            if current.width + unit.width + gap > limit {
                let next = Row {
                    units: vec![index],
                    width: unit.width,
                };
                let done = std::mem::replace(&mut current, next);
                if !done.units.is_empty() {
                    rows.push(done);
                }
            } else {
                current.units.push(index);
                current.width += unit.width + gap;
            }
        }
        if !current.units.is_empty() {
            rows.push(current);
        }
        rows
    }
}

/// Pack with the default safety margin.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{pack_rows, UnitMetrics};
///
/// let widths = [100.0, 100.0, 100.0].map(UnitMetrics::new);
/// let rows = pack_rows(&widths, 300.0, 10.0);
/// let indices: Vec<_> = rows.iter().map(|r| r.units.clone()).collect();
/// assert_eq!(indices, vec![vec![0, 1], vec![2]]);
/// ```
pub fn pack_rows(metrics: &[UnitMetrics], container_width: f64, gap_px: f64) -> Vec<Row> {
    RowPacker::new(gap_px).pack(metrics, container_width)
}

/// Ghost measurement of units.
pub trait TextMeasurer {
    /// Natural width of `unit` in pixels.
    fn measure(&self, unit: &WordUnit) -> f64;
}

impl<F: Fn(&WordUnit) -> f64> TextMeasurer for F {
    fn measure(&self, unit: &WordUnit) -> f64 {
        self(unit)
    }
}

/// Headless measurer assuming a monospace font.
#[derive(Clone, Debug)]
pub struct MonospaceMeasurer {
    pub font_size: f64,
    /// Character width as a ratio of font size (typically 0.6 for monospace)
    pub char_width_ratio: f64,
    /// Width of images and childless elements
    pub atomic_width: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            font_size: ROOT_FONT_SIZE,
            char_width_ratio: 0.6,
            atomic_width: ROOT_FONT_SIZE,
        }
    }
}

impl MonospaceMeasurer {
    /// Measurer for a monospace font of `font_size` pixels.
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            atomic_width: font_size,
            ..Self::default()
        }
    }

    /// Width of one column.
    #[inline]
    pub fn char_width(&self) -> f64 {
        self.font_size * self.char_width_ratio
    }

    /// Width of a string, counting wide characters as two columns.
    pub fn text_width(&self, text: &str) -> f64 {
        text.width() as f64 * self.char_width()
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, unit: &WordUnit) -> f64 {
        match &unit.kind {
            UnitKind::Word(word) => self.text_width(word),
            UnitKind::Link { text, .. } => self.text_width(text),
            UnitKind::Image { .. } | UnitKind::Atomic { .. } => self.atomic_width,
            UnitKind::Break => 0.0,
        }
    }
}

/// Units of one visual line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineRef {
    pub line_index: usize,
    pub units: Vec<usize>,
}

/// Mapping from unit index to line index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineMap {
    lines: Vec<LineRef>,
    by_unit: HashMap<usize, usize>,
}

impl LineMap {
    /// Group `(unit_index, top_offset)` pairs, in content order, into lines.
    /// A unit whose top is more than 1 px away from the line's first unit
    /// starts a new line.
    pub fn from_offsets(offsets: &[(usize, f64)]) -> Self {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut line_top: Option<f64> = None;
        for &(unit, top) in offsets {
            match line_top {
                Some(t) if (top - t).abs() <= LINE_TOLERANCE_PX => {
                    if let Some(group) = groups.last_mut() {
                        group.push(unit);
                    }
                }
                _ => {
                    groups.push(vec![unit]);
                    line_top = Some(top);
                }
            }
        }
        Self::from_groups(groups)
    }

    /// One line per packed row.
    pub fn from_rows(rows: &[Row]) -> Self {
        Self::from_groups(rows.iter().map(|r| r.units.clone()).collect())
    }

    fn from_groups(groups: Vec<Vec<usize>>) -> Self {
        let mut by_unit = HashMap::new();
        let lines = groups
            .into_iter()
            .enumerate()
            .map(|(line_index, units)| {
                for &unit in &units {
                    by_unit.insert(unit, line_index);
                }
                LineRef { line_index, units }
            })
            .collect();
        Self { lines, by_unit }
    }

    /// Lines in order.
    #[inline]
    pub fn lines(&self) -> &[LineRef] {
        &self.lines
    }

    /// Number of lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when no line was measured.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line of a unit; unknown units map to line 0.
    pub fn line_of(&self, unit: usize) -> usize {
        self.by_unit.get(&unit).copied().unwrap_or(0)
    }
}

/// Split, measured and packed content with cached results.
///
/// Measurements are kept until the content changes; rows are kept until the
/// content, the container width or the gap changes.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{ContentNode, Gap, MonospaceMeasurer, TextLayout};
///
/// // every letter is 10px wide
/// let measurer = MonospaceMeasurer { font_size: 10.0, char_width_ratio: 1.0, atomic_width: 10.0 };
/// let mut layout = TextLayout::new(&[ContentNode::text("aaaa bbbb cccc")], 115.0);
/// layout.set_gap(Gap::from_px(10.0));
///
/// assert_eq!(layout.rows(&measurer).len(), 2);
/// layout.resize(200.0);
/// assert_eq!(layout.rows(&measurer).len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TextLayout {
    units: Vec<WordUnit>,
    revision: u64,
    container_width: f64,
    gap: Gap,
    safety_margin: f64,
    widths: Option<Vec<f64>>,
    rows: Option<Vec<Row>>,
}

impl TextLayout {
    /// Layout of `content` in a container `container_width` pixels wide.
    pub fn new(content: &[ContentNode], container_width: f64) -> Self {
        Self {
            units: split_content(content),
            revision: 0,
            container_width,
            gap: Gap::default(),
            safety_margin: SAFETY_MARGIN,
            widths: None,
            rows: None,
        }
    }

    /// Replace the default safety margin.
    pub fn with_safety_margin(mut self, margin: f64) -> Self {
        self.set_safety_margin(margin);
        self
    }

    /// Change the safety margin; repacks on next use.
    pub fn set_safety_margin(&mut self, margin: f64) {
        if margin != self.safety_margin {
            self.safety_margin = margin;
            self.rows = None;
        }
    }

    /// Units in content order.
    #[inline]
    pub fn units(&self) -> &[WordUnit] {
        &self.units
    }

    /// Bumped on every content change.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current container width.
    #[inline]
    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    /// Current horizontal gap.
    #[inline]
    pub fn gap(&self) -> Gap {
        self.gap
    }

    /// Replace the content. Re-derives unit indices and drops all caches.
    pub fn set_content(&mut self, content: &[ContentNode]) {
        self.units = split_content(content);
        self.revision += 1;
        self.invalidate_measurements();
        tracing::debug!(
            revision = self.revision,
            units = self.units.len(),
            "layout content replaced"
        );
    }

    /// Change the container width; repacks on next use.
    pub fn resize(&mut self, container_width: f64) {
        if container_width != self.container_width {
            self.container_width = container_width;
            self.rows = None;
        }
    }

    /// Change the gap; repacks on next use.
    pub fn set_gap(&mut self, gap: Gap) {
        if gap != self.gap {
            self.gap = gap;
            self.rows = None;
        }
    }

    /// Forget measured widths (fonts loaded, measurer changed).
    pub fn invalidate_measurements(&mut self) {
        self.widths = None;
        self.rows = None;
    }

    /// Measured widths, one per unit.
    pub fn widths<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) -> &[f64] {
        let units = &self.units;
        self.widths
            .get_or_insert_with(|| units.iter().map(|u| measurer.measure(u)).collect())
    }

    /// Packed rows, re-measured and re-packed only when stale.
    pub fn rows<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) -> &[Row] {
        if self.rows.is_none() {
            let packer = RowPacker {
                gap_px: self.gap.px(),
                safety_margin: self.safety_margin,
            };
            let container_width = self.container_width;
            self.widths(measurer);
            let metrics: Vec<UnitMetrics> = self
                .widths
                .as_deref()
                .unwrap_or_default()
                .iter()
                .zip(&self.units)
                .map(|(&width, unit)| UnitMetrics {
                    width,
                    is_break: unit.is_break(),
                })
                .collect();
            let rows = packer.pack(&metrics, container_width);
            tracing::debug!(rows = rows.len(), container_width, "layout packed");
            self.rows = Some(rows);
        }
        self.rows.as_deref().unwrap_or_default()
    }

    /// Line grouping derived from the packed rows.
    pub fn line_map<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) -> LineMap {
        LineMap::from_rows(self.rows(measurer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(w: &[f64]) -> Vec<UnitMetrics> {
        w.iter().copied().map(UnitMetrics::new).collect()
    }

    fn indices(rows: &[Row]) -> Vec<Vec<usize>> {
        rows.iter().map(|r| r.units.clone()).collect()
    }

    #[test]
    fn test_pack_basic() {
        let rows = pack_rows(&widths(&[100.0, 100.0, 100.0]), 300.0, 10.0);
        assert_eq!(indices(&rows), vec![vec![0, 1], vec![2]]);
        assert_eq!(rows[0].width, 210.0);
    }

    #[test]
    fn test_pack_is_deterministic() {
        let metrics = widths(&[40.0, 75.5, 12.0, 90.0, 33.0, 61.0]);
        let a = pack_rows(&metrics, 200.0, 8.0);
        let b = pack_rows(&metrics, 200.0, 8.0);
        assert_eq!(a, b);
        let flat: Vec<usize> = a.iter().flat_map(|r| r.units.clone()).collect();
        assert_eq!(flat, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_pack_boundaries() {
        // exactly the limit
        let rows = pack_rows(&widths(&[285.0, 10.0]), 300.0, 0.0);
        assert_eq!(indices(&rows), vec![vec![0], vec![1]]);
        // wider than the container, never split
        let rows = pack_rows(&widths(&[10.0, 400.0, 10.0]), 300.0, 0.0);
        assert_eq!(indices(&rows), vec![vec![0], vec![1], vec![2]]);
        // no gap for the first member
        let rows = pack_rows(&widths(&[285.0]), 300.0, 50.0);
        assert_eq!(indices(&rows), vec![vec![0]]);
    }

    #[test]
    fn test_pack_inert_inputs() {
        assert!(pack_rows(&[], 300.0, 10.0).is_empty());
        assert!(pack_rows(&widths(&[10.0]), 0.0, 10.0).is_empty());
        assert!(pack_rows(&widths(&[10.0]), f64::NAN, 10.0).is_empty());
    }

    #[test]
    fn test_break_closes_row() {
        let metrics = vec![
            UnitMetrics::new(10.0),
            UnitMetrics::line_break(),
            UnitMetrics::new(10.0),
            UnitMetrics::new(10.0),
        ];
        let rows = pack_rows(&metrics, 300.0, 5.0);
        assert_eq!(indices(&rows), vec![vec![0, 1], vec![2, 3]]);
        assert_eq!(rows[0].width, 10.0);
    }

    #[test]
    fn test_gap_parse() {
        assert_eq!(Gap::parse("0.25em").px(), 4.0);
        assert_eq!(Gap::parse(" 1rem ").px(), 16.0);
        assert_eq!(Gap::parse("3px").px(), 3.0);
        assert_eq!(Gap::parse("").px(), FALLBACK_GAP_PX);
        assert_eq!(Gap::parse("1e999px").px(), FALLBACK_GAP_PX);
        assert_eq!(Gap::default().px(), 8.0);
    }

    #[test]
    fn test_monospace_measurer() {
        let m = MonospaceMeasurer::new(10.0);
        assert_eq!(m.text_width("abcd"), 24.0);
        // wide characters take two columns
        assert_eq!(m.text_width("日本"), 24.0);
        let units = split_content(&[ContentNode::text("hi"), ContentNode::LineBreak]);
        assert_eq!(m.measure(&units[0]), 12.0);
        assert_eq!(m.measure(&units[1]), 0.0);
    }

    #[test]
    fn test_layout_caches_and_invalidates() {
        use std::cell::Cell;

        let calls = Cell::new(0);
        let measurer = |_: &WordUnit| {
            calls.set(calls.get() + 1);
            50.0
        };
        let mut layout = TextLayout::new(&[ContentNode::text("a b c")], 150.0);
        layout.set_gap(Gap::from_px(10.0));

        assert_eq!(indices(layout.rows(&measurer)), vec![vec![0, 1], vec![2]]);
        assert_eq!(calls.get(), 3);

        // resize re-packs without re-measuring
        layout.resize(400.0);
        assert_eq!(indices(layout.rows(&measurer)), vec![vec![0, 1, 2]]);
        assert_eq!(calls.get(), 3);

        // content change re-measures
        layout.set_content(&[ContentNode::text("a b")]);
        assert_eq!(layout.revision(), 1);
        assert_eq!(indices(layout.rows(&measurer)), vec![vec![0, 1]]);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_line_map_from_offsets() {
        let map = LineMap::from_offsets(&[(0, 0.0), (1, 0.6), (2, 24.0), (3, 24.9), (4, 48.0)]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.line_of(1), 0);
        assert_eq!(map.line_of(3), 1);
        assert_eq!(map.line_of(4), 2);
        assert_eq!(map.line_of(99), 0);
    }

    #[test]
    fn test_line_map_from_rows() {
        let rows = pack_rows(&widths(&[100.0, 100.0, 100.0]), 300.0, 10.0);
        let map = LineMap::from_rows(&rows);
        assert_eq!(map.lines()[1].units, vec![2]);
        assert_eq!(map.line_of(2), 1);
    }
}
