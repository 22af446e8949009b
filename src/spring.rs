//! Spring physics for values driven toward mapper targets.
//!
//! Targets produced by the progress mapper are not applied directly; a
//! damped spring carries the displayed value there. Underdamped presets
//! overshoot, which is why interpolation downstream is never clamped.
//!
//! The spring integrates `a = (-k (x - target) - c v) / m` with fixed 1 ms
//! sub-steps, so results do not depend on how coarsely the caller ticks.

use std::collections::BTreeMap;

use crate::interpolate::lerp;
use crate::style::{StyleDictionary, StyleValue};

/// Longest physics step taken by one call to [`Spring::step`].
pub const MAX_STEP_MS: f64 = 1000.0;

/// Spring parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpringConfig {
    /// Stiffness (k)
    pub tension: f64,
    /// Damping (c)
    pub friction: f64,
    /// Mass (m)
    pub mass: f64,
    /// Distance and speed below which the spring is at rest
    pub precision: f64,
    /// When set, animate linearly over this many milliseconds instead
    pub duration_ms: Option<f64>,
}

impl SpringConfig {
    pub const DEFAULT: Self = Self::preset(170.0, 26.0);
    pub const GENTLE: Self = Self::preset(120.0, 14.0);
    pub const WOBBLY: Self = Self::preset(180.0, 12.0);
    pub const STIFF: Self = Self::preset(210.0, 20.0);
    pub const SLOW: Self = Self::preset(280.0, 60.0);
    pub const MOLASSES: Self = Self::preset(280.0, 120.0);

    const fn preset(tension: f64, friction: f64) -> Self {
        Self {
            tension,
            friction,
            mass: 1.0,
            precision: 0.01,
            duration_ms: None,
        }
    }

    /// Linear timing over a fixed duration.
    pub fn duration(ms: f64) -> Self {
        Self {
            duration_ms: Some(ms),
            ..Self::DEFAULT
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Scalar spring.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{Spring, SpringConfig};
///
/// let mut spring = Spring::new(0.0, SpringConfig::STIFF);
/// spring.set_target(1.0);
/// assert!(!spring.is_resting());
///
/// while !spring.step(16.0) {}
/// assert_eq!(spring.value(), 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f64,
    velocity: f64,
    target: f64,
    /// Value when the current target was set (duration mode)
    origin: f64,
    elapsed_ms: f64,
    resting: bool,
}

impl Spring {
    /// A spring resting at `value`.
    pub fn new(value: f64, config: SpringConfig) -> Self {
        Self {
            config,
            value,
            velocity: 0.0,
            target: value,
            origin: value,
            elapsed_ms: 0.0,
            resting: true,
        }
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Current velocity in units per second.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Value the spring moves toward.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// True when settled on the target.
    #[inline]
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// Change parameters; the current motion continues with them.
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Start moving toward `target`. Re-targeting keeps the current velocity.
    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.origin = self.value;
        self.elapsed_ms = 0.0;
        self.resting = self.value == target && self.velocity == 0.0;
    }

    /// Move to `value` immediately and rest there.
    pub fn jump_to(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.origin = value;
        self.velocity = 0.0;
        self.elapsed_ms = 0.0;
        self.resting = true;
    }

    /// Advance by `dt_ms`. Returns true when the spring is at rest.
    ///
    /// Non-finite or non-positive steps are ignored. Physics steps longer
    /// than [`MAX_STEP_MS`] are shortened to it.
    pub fn step(&mut self, dt_ms: f64) -> bool {
        if self.resting || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return self.resting;
        }

        if let Some(duration) = self.config.duration_ms {
            self.elapsed_ms += dt_ms;
            if duration <= 0.0 || self.elapsed_ms >= duration {
                self.settle();
            } else {
                self.value = lerp(self.origin, self.target, self.elapsed_ms / duration);
            }
            return self.resting;
        }

        let dt_ms = dt_ms.min(MAX_STEP_MS);
        let substeps = dt_ms.ceil().max(1.0) as usize;
        let h = dt_ms / substeps as f64 / 1000.0;
        let mass = if self.config.mass > 0.0 { self.config.mass } else { 1.0 };

        for _ in 0..substeps {
            let force = -self.config.tension * (self.value - self.target);
            let damping = -self.config.friction * self.velocity;
            self.velocity += (force + damping) / mass * h;
            self.value += self.velocity * h;

            if self.velocity.abs() < self.config.precision
                && (self.value - self.target).abs() < self.config.precision
            {
                self.settle();
                break;
            }
        }
        self.resting
    }

    fn settle(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
        self.resting = true;
    }
}

/// A set of springs animating a style dictionary, one per property.
///
/// Units and function wrappers follow the latest target.
#[derive(Clone, Debug)]
pub struct StyleSpring {
    config: SpringConfig,
    springs: BTreeMap<String, (Spring, StyleValue)>,
}

impl StyleSpring {
    /// Springs resting at `initial`.
    pub fn new(initial: &StyleDictionary, config: SpringConfig) -> Self {
        let springs = initial
            .iter()
            .map(|(k, v)| (k.to_string(), (Spring::new(v.number(), config), v.clone())))
            .collect();
        Self { config, springs }
    }

    /// Change parameters of every property.
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
        for (spring, _) in self.springs.values_mut() {
            spring.set_config(config);
        }
    }

    /// Retarget every property. `immediate` jumps without animating.
    ///
    /// Properties not yet known start at their target.
    pub fn set_target(&mut self, target: &StyleDictionary, immediate: bool) {
        for (key, value) in target.iter() {
            match self.springs.get_mut(key) {
                Some((spring, shape)) => {
                    if immediate {
                        spring.jump_to(value.number());
                    } else {
                        spring.set_target(value.number());
                    }
                    *shape = value.clone();
                }
                None => {
                    self.springs.insert(
                        key.to_string(),
                        (Spring::new(value.number(), self.config), value.clone()),
                    );
                }
            }
        }
    }

    /// Advance all springs. Returns true when every spring rests.
    pub fn step(&mut self, dt_ms: f64) -> bool {
        self.springs
            .values_mut()
            .fold(true, |all, (spring, _)| spring.step(dt_ms) && all)
    }

    /// True when every property is settled.
    pub fn is_resting(&self) -> bool {
        self.springs.values().all(|(s, _)| s.is_resting())
    }

    /// Current animated values.
    pub fn current(&self) -> StyleDictionary {
        self.springs
            .iter()
            .map(|(k, (spring, shape))| (k.as_str(), shape.with_number(spring.value())))
            .collect()
    }
}
