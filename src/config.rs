//! Per-instance configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. With the `toml` feature a config can be loaded from a string:
//!
//! ```toml
//! start = "top bottom"
//! end = "center center"
//! mode = "scrub"
//!
//! [from]
//! opacity = 0
//!
//! [to]
//! opacity = 1
//! transform = "translateY(0px)"
//! ```

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layout::{Gap, TextLayout, DEFAULT_HORIZONTAL_GAP, DEFAULT_VERTICAL_GAP, SAFETY_MARGIN};
use crate::mapper::{
    MappingMode, PlayMode, ProgressMapper, UnitRange, DEFAULT_STAGGER_COEFFICIENT,
};
use crate::reveal::{AnimatedGrid, AnimationSettings, CellConfig, StaggerKind};
use crate::sampler::{SamplerConfig, DEFAULT_FRAME_INTERVAL_MS};
use crate::spring::SpringConfig;
use crate::style::StyleDictionary;
use crate::text::ContentNode;
use crate::text_progress::{
    TextProgress, TextTrack, TextTrigger, TrackStyles, DEFAULT_COLUMN_GAP_EM,
};
use crate::trigger::TriggerPosition;
use crate::trigger_animation::SpringTrigger;

/// Default trigger timing: targets are applied within a millisecond.
pub const DEFAULT_TRIGGER_DURATION_MS: f64 = 1.0;

fn check_interval(interval_ms: u32) -> Result<()> {
    if interval_ms == 0 {
        return Err(rejected("frame interval must be positive".to_string()));
    }
    Ok(())
}

fn check_stagger(stagger: f64) -> Result<()> {
    if (0.0..=1.0).contains(&stagger) {
        Ok(())
    } else {
        Err(rejected(format!(
            "stagger coefficient must be within [0, 1], got {stagger}"
        )))
    }
}

fn rejected(reason: String) -> Error {
    tracing::warn!(%reason, "configuration rejected");
    Error::InvalidConfig(reason)
}

/// Options of one scroll-triggered element animation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TriggerConfig {
    pub start: TriggerPosition,
    pub end: TriggerPosition,
    pub frame_interval_ms: u32,
    pub mode: MappingMode,
    pub play_mode: PlayMode,
    pub stagger: f64,
    pub unit_range: UnitRange,
    pub from: StyleDictionary,
    pub to: StyleDictionary,
    pub enabled: bool,
    pub disable_on_mobile: bool,
    pub spring: SpringConfig,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            start: TriggerPosition::default_start(),
            end: TriggerPosition::default_end(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            mode: MappingMode::default(),
            play_mode: PlayMode::default(),
            stagger: DEFAULT_STAGGER_COEFFICIENT,
            unit_range: UnitRange::default(),
            from: StyleDictionary::new(),
            to: StyleDictionary::new(),
            enabled: true,
            disable_on_mobile: false,
            spring: SpringConfig::duration(DEFAULT_TRIGGER_DURATION_MS),
        }
    }
}

impl TriggerConfig {
    /// Parse and validate a TOML config.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check interval and stagger.
    pub fn validate(&self) -> Result<()> {
        check_interval(self.frame_interval_ms)?;
        check_stagger(self.stagger)
    }

    /// Sampler options from the trigger fields.
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            start: self.start,
            end: self.end,
            frame_interval_ms: self.frame_interval_ms,
            enabled: self.enabled,
            disable_on_mobile: self.disable_on_mobile,
        }
    }

    /// Mapper with the configured mode, play mode, stagger and unit range.
    pub fn mapper(&self) -> ProgressMapper {
        ProgressMapper::new(self.mode)
            .with_play_mode(self.play_mode)
            .with_stagger(self.stagger)
            .with_unit_range(self.unit_range)
    }

    /// Validate and build the element animation.
    pub fn build(&self) -> Result<SpringTrigger> {
        self.validate()?;
        Ok(SpringTrigger::new(
            self.sampler_config(),
            self.mode,
            self.from.clone(),
            self.to.clone(),
            self.spring,
        )
        .with_mapper(self.mapper()))
    }
}

/// Options of a staggered text reveal.
///
/// Each track is revealed only when its `in` dictionary is non-empty. The
/// trigger fields configure the sampler of [`TextConfig::build_trigger`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextConfig {
    pub start: TriggerPosition,
    pub end: TriggerPosition,
    pub frame_interval_ms: u32,
    pub enabled: bool,
    pub disable_on_mobile: bool,
    pub mode: MappingMode,
    pub play_mode: PlayMode,
    pub stagger: f64,
    pub unit_range: UnitRange,
    pub column_gap_em: f64,
    pub line_wrap: TrackStyles,
    pub line: TrackStyles,
    pub word_wrap: TrackStyles,
    pub word: TrackStyles,
    pub letter_wrap: TrackStyles,
    pub letter: TrackStyles,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            start: TriggerPosition::default_start(),
            end: TriggerPosition::default_end(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            enabled: true,
            disable_on_mobile: false,
            mode: MappingMode::Toggle,
            play_mode: PlayMode::Always,
            stagger: DEFAULT_STAGGER_COEFFICIENT,
            unit_range: UnitRange::default(),
            column_gap_em: DEFAULT_COLUMN_GAP_EM,
            line_wrap: TrackStyles::default(),
            line: TrackStyles::default(),
            word_wrap: TrackStyles::default(),
            word: TrackStyles::default(),
            letter_wrap: TrackStyles::default(),
            letter: TrackStyles::default(),
        }
    }
}

impl TextConfig {
    /// Parse and validate a TOML config.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check interval, stagger and column gap.
    pub fn validate(&self) -> Result<()> {
        check_interval(self.frame_interval_ms)?;
        check_stagger(self.stagger)?;
        if !self.column_gap_em.is_finite() || self.column_gap_em < 0.0 {
            return Err(rejected(format!(
                "column gap must be a finite non-negative em value, got {}",
                self.column_gap_em
            )));
        }
        Ok(())
    }

    /// Styles configured for `track`.
    pub fn track(&self, track: TextTrack) -> &TrackStyles {
        match track {
            TextTrack::LineWrap => &self.line_wrap,
            TextTrack::Line => &self.line,
            TextTrack::WordWrap => &self.word_wrap,
            TextTrack::Word => &self.word,
            TextTrack::LetterWrap => &self.letter_wrap,
            TextTrack::Letter => &self.letter,
        }
    }

    /// Validate and build a text reveal over `text`.
    pub fn build(&self, text: &str) -> Result<TextProgress> {
        self.validate()?;
        let mapper = ProgressMapper::new(self.mode)
            .with_play_mode(self.play_mode)
            .with_stagger(self.stagger)
            .with_unit_range(self.unit_range);
        let mut progress = TextProgress::new(text, self.mode)
            .with_mapper(mapper)
            .with_column_gap(self.column_gap_em);
        for track in TextTrack::ALL {
            let styles = self.track(track);
            if styles.is_active() {
                progress.set_track(track, styles.clone());
            }
        }
        Ok(progress)
    }

    /// Sampler options from the trigger fields.
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            start: self.start,
            end: self.end,
            frame_interval_ms: self.frame_interval_ms,
            enabled: self.enabled,
            disable_on_mobile: self.disable_on_mobile,
        }
    }

    /// Validate and build a scroll-driven text reveal over `text`.
    pub fn build_trigger(&self, text: &str) -> Result<TextTrigger> {
        Ok(TextTrigger::new(self.sampler_config(), self.build(text)?))
    }
}

/// Options of a row-packed animated grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// CSS length between units on a row
    pub horizontal_gap: String,
    /// CSS length between rows
    pub vertical_gap: String,
    pub safety_margin: f64,
    pub stagger: StaggerKind,
    pub once: bool,
    pub animation: AnimationSettings,
    pub element_animation: Option<AnimationSettings>,
    /// Overrides keyed by element id
    pub cells: HashMap<String, CellConfig>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: DEFAULT_HORIZONTAL_GAP.to_string(),
            vertical_gap: DEFAULT_VERTICAL_GAP.to_string(),
            safety_margin: SAFETY_MARGIN,
            stagger: StaggerKind::default(),
            once: false,
            animation: AnimationSettings::default(),
            element_animation: None,
            cells: HashMap::new(),
        }
    }
}

impl LayoutConfig {
    /// Parse and validate a TOML config.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the safety margin.
    pub fn validate(&self) -> Result<()> {
        if !self.safety_margin.is_finite() || self.safety_margin < 0.0 {
            return Err(rejected(format!(
                "safety margin must be finite and non-negative, got {}",
                self.safety_margin
            )));
        }
        Ok(())
    }

    /// Parsed horizontal gap.
    #[inline]
    pub fn horizontal_gap(&self) -> Gap {
        Gap::parse(&self.horizontal_gap)
    }

    /// Parsed vertical gap.
    #[inline]
    pub fn vertical_gap(&self) -> Gap {
        Gap::parse(&self.vertical_gap)
    }

    /// Validate and build a layout over `content`.
    pub fn layout(&self, content: &[ContentNode], container_width: f64) -> Result<TextLayout> {
        self.validate()?;
        let mut layout =
            TextLayout::new(content, container_width).with_safety_margin(self.safety_margin);
        layout.set_gap(self.horizontal_gap());
        Ok(layout)
    }

    /// Validate and build an animated grid over `content`.
    pub fn grid(&self, content: &[ContentNode], container_width: f64) -> Result<AnimatedGrid> {
        self.validate()?;
        let mut grid =
            AnimatedGrid::new(content, container_width, self.stagger, self.animation.clone())
                .with_gap(self.horizontal_gap())
                .with_once(self.once);
        grid.layout_mut().set_safety_margin(self.safety_margin);
        if let Some(element_animation) = &self.element_animation {
            grid = grid.with_element_animation(element_animation.clone());
        }
        for (id, cell) in &self.cells {
            grid = grid.with_cell_config(id.clone(), cell.clone());
        }
        Ok(grid)
    }
}
