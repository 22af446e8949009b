//! Trigger anchors and the scroll-progress formula.
//!
//! A trigger position names a point on the element and a point on the
//! viewport, written the usual way as `"<element> <viewport>"`
//! (`"top bottom"` means "when the element's top meets the viewport's
//! bottom"). Two positions, `start` and `end`, define where progress 0 and
//! progress 1 occur.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A named point on an element or on the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
}

impl Anchor {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Center => "center",
            Anchor::Bottom => "bottom",
        }
    }
}

impl FromStr for Anchor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Anchor::Top),
            "center" => Ok(Anchor::Center),
            "bottom" => Ok(Anchor::Bottom),
            _ => Err(Error::InvalidAnchor(s.to_string())),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pair of anchors: one on the element, one on the viewport.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{Anchor, TriggerPosition};
///
/// let start: TriggerPosition = "top bottom".parse().unwrap();
/// assert_eq!(start.element, Anchor::Top);
/// assert_eq!(start.viewport, Anchor::Bottom);
/// assert_eq!(start.to_string(), "top bottom");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct TriggerPosition {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl TriggerPosition {
    /// Position from an element anchor and a viewport anchor.
    pub const fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// Default start position: the element's top enters at the viewport bottom.
    pub const fn default_start() -> Self {
        Self::new(Anchor::Top, Anchor::Bottom)
    }

    /// Default end position: the element's bottom leaves at the viewport top.
    pub const fn default_end() -> Self {
        Self::new(Anchor::Bottom, Anchor::Top)
    }
}

impl FromStr for TriggerPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidTriggerPosition(s.to_string()));
        };
        Ok(Self {
            element: element.parse()?,
            viewport: viewport.parse()?,
        })
    }
}

impl TryFrom<String> for TriggerPosition {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TriggerPosition> for String {
    fn from(value: TriggerPosition) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TriggerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// Element bounding box in viewport coordinates (as from `getBoundingClientRect`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Box spanning `top` to `bottom`.
    pub fn new(top: f64, bottom: f64) -> Self {
        Self {
            top,
            bottom,
            height: bottom - top,
        }
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.top.is_finite() && self.bottom.is_finite() && self.height.is_finite()
    }
}

/// The nine scroll offsets an element/viewport anchor pair can resolve to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPoses {
    pub top_top: f64,
    pub center_top: f64,
    pub bottom_top: f64,
    pub top_bottom: f64,
    pub center_bottom: f64,
    pub bottom_bottom: f64,
    pub top_center: f64,
    pub center_center: f64,
    pub bottom_center: f64,
}

impl TriggerPoses {
    /// Offsets of `bbox` for a viewport `viewport_height` pixels tall.
    pub fn compute(bbox: &BoundingBox, viewport_height: f64) -> Self {
        let center = bbox.top + bbox.height / 2.0;
        let half_vh = viewport_height / 2.0;
        Self {
            top_top: bbox.top,
            center_top: center,
            bottom_top: bbox.bottom,
            top_bottom: bbox.top - viewport_height,
            center_bottom: center - viewport_height,
            bottom_bottom: bbox.bottom - viewport_height,
            top_center: bbox.top - half_vh,
            center_center: center - half_vh,
            bottom_center: bbox.bottom - half_vh,
        }
    }

    /// Offset for a trigger position.
    pub fn get(&self, position: TriggerPosition) -> f64 {
        use Anchor::*;
        match (position.element, position.viewport) {
            (Top, Top) => self.top_top,
            (Center, Top) => self.center_top,
            (Bottom, Top) => self.bottom_top,
            (Top, Bottom) => self.top_bottom,
            (Center, Bottom) => self.center_bottom,
            (Bottom, Bottom) => self.bottom_bottom,
            (Top, Center) => self.top_center,
            (Center, Center) => self.center_center,
            (Bottom, Center) => self.bottom_center,
        }
    }
}

/// Compute trigger progress in `[0, 1]`.
///
/// `progress = clamp(1 - (scrollStart + length) / length, 0, 1)` where
/// `length = |scrollStart - scrollEnd|`.
///
/// When `start` and `end` resolve to the same offset (`length == 0`) the
/// result is `1.0` once the element has passed the start anchor
/// (`scrollStart < 0`) and `0.0` before. Non-finite geometry yields `0.0`.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{trigger_progress, BoundingBox, TriggerPosition};
///
/// let bbox = BoundingBox::new(800.0, 1000.0);
/// let p = trigger_progress(
///     &bbox,
///     1000.0,
///     TriggerPosition::default_start(),
///     TriggerPosition::default_end(),
/// );
/// assert!((p - 1.0 / 6.0).abs() < 1e-9);
/// ```
pub fn trigger_progress(
    bbox: &BoundingBox,
    viewport_height: f64,
    start: TriggerPosition,
    end: TriggerPosition,
) -> f64 {
    if !bbox.is_finite() || !viewport_height.is_finite() {
        return 0.0;
    }

    let poses = TriggerPoses::compute(bbox, viewport_height);
    let scroll_start = poses.get(start);
    let scroll_end = poses.get(end);
    let length = (scroll_start - scroll_end).abs();

    if length == 0.0 {
        return if scroll_start < 0.0 { 1.0 } else { 0.0 };
    }

    (1.0 - (scroll_start + length) / length).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pos(s: &str) -> TriggerPosition {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(pos("center center"), TriggerPosition::new(Anchor::Center, Anchor::Center));
        assert_eq!(pos("  Bottom   TOP "), TriggerPosition::default_end());
        assert!(matches!(
            "top".parse::<TriggerPosition>(),
            Err(Error::InvalidTriggerPosition(_))
        ));
        assert!(matches!(
            "top middle".parse::<TriggerPosition>(),
            Err(Error::InvalidAnchor(_))
        ));
        assert!("top bottom center".parse::<TriggerPosition>().is_err());
    }

    #[test]
    fn test_poses() {
        let bbox = BoundingBox::new(100.0, 300.0);
        let poses = TriggerPoses::compute(&bbox, 1000.0);
        assert_eq!(poses.top_top, 100.0);
        assert_eq!(poses.center_top, 200.0);
        assert_eq!(poses.bottom_top, 300.0);
        assert_eq!(poses.top_bottom, -900.0);
        assert_eq!(poses.center_bottom, -800.0);
        assert_eq!(poses.bottom_bottom, -700.0);
        assert_eq!(poses.top_center, -400.0);
        assert_eq!(poses.center_center, -300.0);
        assert_eq!(poses.bottom_center, -200.0);
        assert_eq!(poses.get(pos("center center")), -300.0);
    }

    #[test]
    fn test_progress_scenario() {
        // scrollStart = 800 - 1000 = -200, scrollEnd = 1000, length = 1200
        let bbox = BoundingBox::new(800.0, 1000.0);
        let p = trigger_progress(&bbox, 1000.0, pos("top bottom"), pos("bottom top"));
        assert_relative_eq!(p, 1.0 - 1000.0 / 1200.0, epsilon = 1e-12);
        assert_relative_eq!(p, 0.1667, epsilon = 1e-4);
    }

    #[test]
    fn test_progress_clamped() {
        let start = TriggerPosition::default_start();
        let end = TriggerPosition::default_end();

        // Element still below the viewport
        let below = BoundingBox::new(1500.0, 1700.0);
        assert_eq!(trigger_progress(&below, 1000.0, start, end), 0.0);

        // Element scrolled past the top
        let above = BoundingBox::new(-900.0, -700.0);
        assert_eq!(trigger_progress(&above, 1000.0, start, end), 1.0);
    }

    #[test]
    fn test_degenerate_span() {
        let same = pos("top top");
        let passed = BoundingBox::new(-10.0, 190.0);
        assert_eq!(trigger_progress(&passed, 800.0, same, same), 1.0);

        let waiting = BoundingBox::new(10.0, 210.0);
        assert_eq!(trigger_progress(&waiting, 800.0, same, same), 0.0);

        let at_anchor = BoundingBox::new(0.0, 200.0);
        assert_eq!(trigger_progress(&at_anchor, 800.0, same, same), 0.0);
    }

    #[test]
    fn test_non_finite_geometry() {
        let bbox = BoundingBox::new(f64::NAN, 10.0);
        let p = trigger_progress(
            &bbox,
            800.0,
            TriggerPosition::default_start(),
            TriggerPosition::default_end(),
        );
        assert_eq!(p, 0.0);
    }
}
