//! Style values and style dictionaries.
//!
//! A style value is what an animated property holds: a plain number
//! (`opacity: 0.5`), a number with a unit (`"120px"`, `"45deg"`) or a number
//! wrapped in a single-argument CSS function (`"rotate(45deg)"`,
//! `"translateY(100%)"`). Parsing them once into a tagged union keeps the
//! interpolation engine free of string handling.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single animatable property value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "RawStyleValue", into = "RawStyleValue")
)]
pub enum StyleValue {
    /// Unitless number
    Number(f64),
    /// Number followed by a unit, e.g. `120px`
    Dimensioned { value: f64, unit: String },
    /// Number inside a CSS function, e.g. `rotate(45deg)`
    Wrapped {
        function: String,
        value: f64,
        suffix: String,
    },
}

impl StyleValue {
    /// Number with a unit, e.g. `120px`.
    pub fn dimensioned(value: f64, unit: impl Into<String>) -> Self {
        StyleValue::Dimensioned {
            value,
            unit: unit.into(),
        }
    }

    /// Number inside a CSS function, e.g. `rotate(45deg)`.
    pub fn wrapped(function: impl Into<String>, value: f64, suffix: impl Into<String>) -> Self {
        StyleValue::Wrapped {
            function: function.into(),
            value,
            suffix: suffix.into(),
        }
    }

    /// Parse a CSS-like value.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use scroll_reveal_core::StyleValue;
    ///
    /// assert_eq!(StyleValue::parse("0.5").unwrap(), StyleValue::Number(0.5));
    /// assert_eq!(StyleValue::parse("120px").unwrap(), StyleValue::dimensioned(120.0, "px"));
    /// assert_eq!(
    ///     StyleValue::parse("rotate(-45deg)").unwrap(),
    ///     StyleValue::wrapped("rotate", -45.0, "deg"),
    /// );
    /// assert!(StyleValue::parse("auto").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<f64>() {
            if n.is_finite() {
                return Ok(StyleValue::Number(n));
            }
        }
        parse_wrapped(s)
            .or_else(|| parse_dimensioned(s))
            .ok_or_else(|| Error::InvalidStyleValue(s.to_string()))
    }

    /// Parse a value, degrading anything unrecognised to `Number(0.0)`.
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| {
            tracing::debug!(%err, "style value falls back to 0");
            StyleValue::Number(0.0)
        })
    }

    /// The numeric part.
    #[inline]
    pub fn number(&self) -> f64 {
        match self {
            StyleValue::Number(n) => *n,
            StyleValue::Dimensioned { value, .. } => *value,
            StyleValue::Wrapped { value, .. } => *value,
        }
    }

    /// Same shape (unit, function) with a different number.
    pub fn with_number(&self, n: f64) -> Self {
        match self {
            StyleValue::Number(_) => StyleValue::Number(n),
            StyleValue::Dimensioned { unit, .. } => StyleValue::Dimensioned {
                value: n,
                unit: unit.clone(),
            },
            StyleValue::Wrapped {
                function, suffix, ..
            } => StyleValue::Wrapped {
                function: function.clone(),
                value: n,
                suffix: suffix.clone(),
            },
        }
    }

    /// True for plain numbers (no unit or function).
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, StyleValue::Number(_))
    }
}

/// Length of the leading `[-0-9.]` run.
fn numeric_prefix_len(s: &str) -> usize {
    s.bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'-' || *b == b'.')
        .count()
}

/// Parse a leading number the lenient way (`"1.5.2"` reads as `1.5`).
fn parse_leading_number(run: &str) -> Option<f64> {
    (1..=run.len())
        .rev()
        .find_map(|end| run[..end].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn parse_wrapped(s: &str) -> Option<StyleValue> {
    let open = s.find('(')?;
    let function = &s[..open];
    if function.is_empty() || !function.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let inner = s[open + 1..].strip_suffix(')')?;
    if inner.contains(')') {
        return None;
    }
    let run = numeric_prefix_len(inner);
    if run == 0 {
        return None;
    }
    let value = parse_leading_number(&inner[..run])?;
    Some(StyleValue::wrapped(function, value, &inner[run..]))
}

fn parse_dimensioned(s: &str) -> Option<StyleValue> {
    let run = numeric_prefix_len(s);
    if run == 0 {
        return None;
    }
    let unit = &s[run..];
    if unit.is_empty() || unit.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = parse_leading_number(&s[..run])?;
    Some(StyleValue::dimensioned(value, unit))
}

/// Format a number the way CSS text expects it (`45`, `0.5`, never `-0`).
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n == 0.0 {
        f.write_str("0")
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write_number(f, *n),
            StyleValue::Dimensioned { value, unit } => {
                write_number(f, *value)?;
                f.write_str(unit)
            }
            StyleValue::Wrapped {
                function,
                value,
                suffix,
            } => {
                write!(f, "{}(", function)?;
                write_number(f, *value)?;
                write!(f, "{})", suffix)
            }
        }
    }
}

impl FromStr for StyleValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

/// Lossy: unparseable strings become `0`.
impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::parse_lossy(value)
    }
}

/// Wire form of a style value: a JSON/TOML number or a CSS string.
#[cfg(feature = "serde")]
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum RawStyleValue {
    Number(f64),
    Text(String),
}

#[cfg(feature = "serde")]
impl From<RawStyleValue> for StyleValue {
    fn from(raw: RawStyleValue) -> Self {
        match raw {
            RawStyleValue::Number(n) => StyleValue::Number(n),
            RawStyleValue::Text(s) => StyleValue::parse_lossy(&s),
        }
    }
}

#[cfg(feature = "serde")]
impl From<StyleValue> for RawStyleValue {
    fn from(value: StyleValue) -> Self {
        match value {
            StyleValue::Number(n) => RawStyleValue::Number(n),
            other => RawStyleValue::Text(other.to_string()),
        }
    }
}

/// Property name → value map describing one animation endpoint.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{StyleDictionary, StyleValue};
///
/// let hidden = StyleDictionary::new()
///     .with("opacity", 0.0)
///     .with("transform", "translateY(100%)");
/// assert_eq!(hidden.len(), 2);
/// assert_eq!(hidden.get("opacity"), Some(&StyleValue::Number(0.0)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StyleDictionary(BTreeMap<String, StyleValue>);

impl StyleDictionary {
    /// Empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StyleValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value of a property.
    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.0.get(key)
    }

    /// True when the property is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Property names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no property is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as inline CSS (`opacity: 0.5; transform: rotate(45deg)`).
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<K: Into<String>, V: Into<StyleValue>> FromIterator<(K, V)> for StyleDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = StyleDictionary::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}
