//! # scroll-reveal-core
//!
//! Core scroll-trigger, interpolation and text reveal layout library for
//! scroll-driven UI animation.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Sampling element geometry into scroll progress (trigger positions,
//!   rate-limited sampling tasks, change-only commits)
//! - Mapping progress onto animation targets (toggle or scrub, staggered
//!   per line, word or letter, play-once and manual modes)
//! - Interpolating CSS-like style dictionaries and driving them with springs
//! - Splitting content into units and packing them into rows for staggered
//!   text reveals
//! - Reveal gates, cross-fades and loading skeletons built on the above
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for config and value types
//! - `toml` - Load configs with `from_toml_str` (implies `serde`)
//! - `web` - Enable browser viewport, DOM geometry and canvas measurement
//!
//! ## Example
//!
//! ```rust
//! use scroll_reveal_core::{
//!     BoundingBox, MappingMode, SamplerConfig, SpringConfig, SpringTrigger, StaticViewport,
//!     StyleDictionary,
//! };
//!
//! let viewport = StaticViewport::new(1280.0, 1000.0);
//! let mut trigger = SpringTrigger::new(
//!     SamplerConfig::default(),
//!     MappingMode::Scrub,
//!     StyleDictionary::new().with("opacity", 0.0),
//!     StyleDictionary::new().with("opacity", 1.0),
//!     SpringConfig::duration(100.0),
//! );
//!
//! // Each frame: element geometry in, progress and springs out
//! trigger.frame(0, Some(BoundingBox::new(800.0, 1000.0)), &viewport, true);
//! trigger.advance(100.0);
//! assert!(trigger.progress() > 0.16 && trigger.progress() < 0.17);
//! ```

mod config;
mod crossfade;
mod error;
mod events;
mod interpolate;
mod layout;
mod mapper;
mod reveal;
mod sampler;
mod scheduler;
mod skeleton;
mod spring;
mod style;
mod text;
mod text_progress;
mod trigger;
mod trigger_animation;
mod viewport;
#[cfg(feature = "web")]
pub mod web;

pub use config::{LayoutConfig, TextConfig, TriggerConfig, DEFAULT_TRIGGER_DURATION_MS};
pub use crossfade::{CrossFade, CrossFadeEvent};
pub use error::{Error, Result};
pub use events::{CompletionQueue, DEFAULT_QUEUE_CAPACITY};
pub use interpolate::{interpolate, interpolate_value, lerp};
pub use layout::{
    pack_rows, Gap, LineMap, LineRef, MonospaceMeasurer, Row, RowPacker, TextLayout,
    TextMeasurer, UnitMetrics, DEFAULT_HORIZONTAL_GAP, DEFAULT_VERTICAL_GAP, SAFETY_MARGIN,
};
pub use mapper::{
    remap, transform_range, MappingMode, PlayMode, ProgressMapper, UnitPhase, UnitRange,
    DEFAULT_STAGGER_COEFFICIENT,
};
pub use reveal::{
    stagger_delay, visible_fraction, AnimatedGrid, AnimationSettings, CellConfig, GridCell,
    InView, RevealCommand, RevealGate, RevealMode, RevealTarget, StaggerKind,
};
pub use sampler::{GeometrySampler, ProgressSample, SamplerConfig, DEFAULT_FRAME_INTERVAL_MS};
pub use scheduler::{SamplingTask, TaskState};
pub use skeleton::{SkeletonImage, SkeletonLoader};
pub use spring::{Spring, SpringConfig, StyleSpring, MAX_STEP_MS};
pub use style::{StyleDictionary, StyleValue};
pub use text::{
    split_content, split_letters, split_words, ContentNode, LetterUnit, UnitKind, WordUnit,
};
pub use text_progress::{
    TextFrame, TextProgress, TextTrack, TextTrigger, TrackFrame, TrackStyles,
};
pub use trigger::{trigger_progress, Anchor, BoundingBox, TriggerPosition};
pub use trigger_animation::{ProgressChange, SpringTrigger};
pub use viewport::{ResizeDebouncer, StaticViewport, Viewport, ViewportSize, MOBILE_BREAKPOINT};

#[cfg(feature = "web")]
pub use web::{element_bounding_box, CanvasMeasurer, WindowViewport};
