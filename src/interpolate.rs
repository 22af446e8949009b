//! Interpolation engine.
//!
//! Linear, unclamped interpolation between two style dictionaries. Units and
//! function wrappers survive interpolation; `t` outside `[0, 1]` extrapolates
//! so that overshooting drivers (springs, extrapolated stagger ranges) keep
//! producing valid values.

use crate::style::{StyleDictionary, StyleValue};

/// Linear interpolation of scalars. `t` is not clamped.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Interpolate a single value pair.
///
/// The `from` side decides the output shape; when it is a plain number the
/// `to` side's unit or function is used instead. A missing `to` acts as `0`.
pub fn interpolate_value(from: &StyleValue, to: Option<&StyleValue>, t: f64) -> StyleValue {
    let end = to.map(StyleValue::number).unwrap_or(0.0);
    let value = lerp(from.number(), end, t);
    match (from, to) {
        (StyleValue::Number(_), Some(to)) => to.with_number(value),
        (from, _) => from.with_number(value),
    }
}

/// Interpolate every key of `from` toward `to`.
///
/// Keys present only in `to` are ignored: the output key set always equals
/// the key set of `from`.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{interpolate, StyleDictionary};
///
/// let from = StyleDictionary::new().with("opacity", 0.0).with("rotate", "0deg");
/// let to = StyleDictionary::new().with("opacity", 1.0).with("rotate", "90deg");
///
/// let mid = interpolate(&from, &to, 0.5);
/// assert_eq!(mid.to_css(), "opacity: 0.5; rotate: 45deg");
/// ```
pub fn interpolate(from: &StyleDictionary, to: &StyleDictionary, t: f64) -> StyleDictionary {
    from.iter()
        .map(|(key, value)| (key, interpolate_value(value, to.get(key), t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_and_affinity() {
        for (a, b) in [(0.0, 1.0), (-3.0, 7.5), (100.0, -100.0)] {
            assert_eq!(lerp(a, b, 0.0), a);
            assert_eq!(lerp(a, b, 1.0), b);
            for t in [0.25, 0.5, 2.0, -1.0] {
                assert_eq!(lerp(a, b, t), a + t * (b - a));
            }
        }
    }

    #[test]
    fn test_unit_round_trip() {
        let from = StyleDictionary::new().with("rotate", "45deg");
        let to = StyleDictionary::new().with("rotate", "90deg");
        assert_eq!(interpolate(&from, &to, 0.0).get("rotate").unwrap().to_string(), "45deg");
        assert_eq!(interpolate(&from, &to, 1.0).get("rotate").unwrap().to_string(), "90deg");
    }

    #[test]
    fn test_wrapped_function() {
        let from = StyleDictionary::new().with("transform", "translateY(100%)");
        let to = StyleDictionary::new().with("transform", "translateY(0%)");
        let out = interpolate(&from, &to, 0.25);
        assert_eq!(
            out.get("transform"),
            Some(&StyleValue::wrapped("translateY", 75.0, "%"))
        );
        assert_eq!(out.get("transform").unwrap().to_string(), "translateY(75%)");
    }

    #[test]
    fn test_unit_from_either_side() {
        let from = StyleDictionary::new().with("x", 0.0);
        let to = StyleDictionary::new().with("x", "200px");
        assert_eq!(interpolate(&from, &to, 0.5).get("x").unwrap().to_string(), "100px");
    }

    #[test]
    fn test_key_set_follows_from() {
        let from = StyleDictionary::new().with("opacity", 1.0).with("y", "20px");
        let to = StyleDictionary::new().with("opacity", 0.0).with("scale", 2.0);
        let out = interpolate(&from, &to, 0.5);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["opacity", "y"]);
        // "y" missing in `to` heads toward 0
        assert_eq!(out.get("y"), Some(&StyleValue::dimensioned(10.0, "px")));
    }

    #[test]
    fn test_extrapolates_beyond_unit_interval() {
        let from = StyleDictionary::new().with("opacity", 0.0);
        let to = StyleDictionary::new().with("opacity", 1.0);
        assert_eq!(interpolate(&from, &to, 1.5).get("opacity"), Some(&StyleValue::Number(1.5)));
        assert_eq!(interpolate(&from, &to, -0.5).get("opacity"), Some(&StyleValue::Number(-0.5)));
    }

    #[test]
    fn test_unparseable_degrades_to_zero() {
        let from = StyleDictionary::new().with("width", "auto");
        let to = StyleDictionary::new().with("width", "100px");
        let out = interpolate(&from, &to, 0.5);
        assert_eq!(out.get("width").unwrap().to_string(), "50px");
    }
}
