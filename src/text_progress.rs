//! Scroll-progress text reveal over lines, words and letters.
//!
//! A text is split into words and letters; lines come from a measured
//! [`LineMap`]. Six tracks can be animated independently: each level has the
//! unit itself and a wrapper around it. A track is only driven when its
//! revealed style is non-empty.

use std::collections::BTreeMap;

use crate::layout::LineMap;
use crate::mapper::{MappingMode, PlayMode, ProgressMapper};
use crate::sampler::{GeometrySampler, SamplerConfig};
use crate::scheduler::SamplingTask;
use crate::style::StyleDictionary;
use crate::text::{split_letters, split_words, LetterUnit};
use crate::trigger::BoundingBox;
use crate::viewport::Viewport;

/// Default gap between words, in `em`.
pub const DEFAULT_COLUMN_GAP_EM: f64 = 0.3;

/// Poll interval for manually driven progress.
pub const MANUAL_POLL_INTERVAL_MS: u32 = 10;

/// Animated layer of a text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum TextTrack {
    LineWrap,
    Line,
    WordWrap,
    Word,
    LetterWrap,
    Letter,
}

impl TextTrack {
    pub const ALL: [TextTrack; 6] = [
        TextTrack::LineWrap,
        TextTrack::Line,
        TextTrack::WordWrap,
        TextTrack::Word,
        TextTrack::LetterWrap,
        TextTrack::Letter,
    ];
}

/// Revealed and hidden styles of one track.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackStyles {
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    pub revealed: StyleDictionary,
    #[cfg_attr(feature = "serde", serde(rename = "out"))]
    pub hidden: StyleDictionary,
}

impl TrackStyles {
    /// Track styles from revealed and hidden endpoints.
    pub fn new(revealed: StyleDictionary, hidden: StyleDictionary) -> Self {
        Self { revealed, hidden }
    }

    /// True when the track has something to reveal.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.revealed.is_empty()
    }
}

/// Per-unit styles of one track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackFrame {
    pub track: TextTrack,
    pub styles: Vec<StyleDictionary>,
}

/// Result of one play.
#[derive(Clone, Debug, PartialEq)]
pub struct TextFrame {
    pub progress: f64,
    pub tracks: Vec<TrackFrame>,
}

impl TextFrame {
    /// Styles of `track`, if it was played.
    pub fn track(&self, track: TextTrack) -> Option<&[StyleDictionary]> {
        self.tracks
            .iter()
            .find(|t| t.track == track)
            .map(|t| t.styles.as_slice())
    }
}

/// Staggered text reveal driven by scroll or manual progress.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{MappingMode, StyleDictionary, TextProgress, TextTrack};
///
/// let mut text = TextProgress::new("one two three four", MappingMode::Toggle).with_track(
///     TextTrack::Word,
///     StyleDictionary::new().with("opacity", 1.0),
///     StyleDictionary::new().with("opacity", 0.0),
/// );
///
/// let frame = text.play(0.5).unwrap();
/// let css: Vec<_> = frame.track(TextTrack::Word).unwrap().iter().map(|s| s.to_css()).collect();
/// assert_eq!(css, ["opacity: 1", "opacity: 1", "opacity: 0", "opacity: 0"]);
/// assert!(frame.track(TextTrack::Letter).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct TextProgress {
    words: Vec<String>,
    letters: Vec<LetterUnit>,
    lines: LineMap,
    tracks: BTreeMap<TextTrack, TrackStyles>,
    mapper: ProgressMapper,
    column_gap_em: f64,
    manual_progress: f64,
    manual_task: SamplingTask,
    last_manual: Option<f64>,
}

impl TextProgress {
    /// Text with no tracks, mapped with `mode`.
    pub fn new(text: &str, mode: MappingMode) -> Self {
        let words: Vec<String> = split_words(text).into_iter().map(str::to_string).collect();
        let letters = split_letters(&words);
        Self {
            words,
            letters,
            lines: LineMap::default(),
            tracks: BTreeMap::new(),
            mapper: ProgressMapper::new(mode),
            column_gap_em: DEFAULT_COLUMN_GAP_EM,
            manual_progress: 0.0,
            manual_task: SamplingTask::new(MANUAL_POLL_INTERVAL_MS),
            last_manual: None,
        }
    }

    /// Replace the mapper (play mode, stagger, unit range).
    pub fn with_mapper(mut self, mapper: ProgressMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Set the play mode.
    pub fn with_play_mode(mut self, play_mode: PlayMode) -> Self {
        self.mapper = self.mapper.with_play_mode(play_mode);
        self
    }

    /// Set the stagger coefficient.
    pub fn with_stagger(mut self, stagger: f64) -> Self {
        self.mapper = self.mapper.with_stagger(stagger);
        self
    }

    /// Gap between words, in `em`.
    pub fn with_column_gap(mut self, em: f64) -> Self {
        self.column_gap_em = em;
        self
    }

    /// Animate `track` between `revealed` and `hidden`.
    pub fn with_track(
        mut self,
        track: TextTrack,
        revealed: StyleDictionary,
        hidden: StyleDictionary,
    ) -> Self {
        self.set_track(track, TrackStyles::new(revealed, hidden));
        self
    }

    /// Set or replace a track.
    pub fn set_track(&mut self, track: TextTrack, styles: TrackStyles) {
        self.tracks.insert(track, styles);
    }

    /// Words in order.
    #[inline]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Letters across all words.
    #[inline]
    pub fn letters(&self) -> &[LetterUnit] {
        &self.letters
    }

    /// Measured lines.
    #[inline]
    pub fn lines(&self) -> &LineMap {
        &self.lines
    }

    /// Gap between words, in `em`.
    #[inline]
    pub fn column_gap_em(&self) -> f64 {
        self.column_gap_em
    }

    /// The progress mapper.
    #[inline]
    pub fn mapper(&self) -> &ProgressMapper {
        &self.mapper
    }

    /// Replace the text. Lines must be measured again.
    pub fn set_text(&mut self, text: &str) {
        self.words = split_words(text).into_iter().map(str::to_string).collect();
        self.letters = split_letters(&self.words);
        self.lines = LineMap::default();
        tracing::debug!(words = self.words.len(), "text replaced");
    }

    /// Install measured lines (after layout or resize).
    pub fn set_lines(&mut self, lines: LineMap) {
        self.lines = lines;
    }

    /// Line index of a word; unmeasured words are on line 0.
    #[inline]
    pub fn line_of_word(&self, word_index: usize) -> usize {
        self.lines.line_of(word_index)
    }

    /// Number of units a track animates.
    pub fn track_len(&self, track: TextTrack) -> usize {
        match track {
            TextTrack::LineWrap | TextTrack::Line => self.lines.len(),
            TextTrack::WordWrap | TextTrack::Word => self.words.len(),
            TextTrack::LetterWrap | TextTrack::Letter => self.letters.len(),
        }
    }

    /// Play sampled scroll progress.
    ///
    /// `None` when the text is driven manually, latched after playing once,
    /// or has no active tracks.
    pub fn play(&mut self, progress: f64) -> Option<TextFrame> {
        if self.mapper.play_mode() == PlayMode::Manual {
            return None;
        }
        self.play_at(progress)
    }

    /// Set the progress used in manual mode.
    pub fn set_manual_progress(&mut self, progress: f64) {
        self.manual_progress = progress;
    }

    /// Poll manual progress while visible. Plays only when the value changed
    /// since the last manual play.
    pub fn poll(&mut self, now_ms: u64, in_view: bool) -> Option<TextFrame> {
        if self.mapper.play_mode() != PlayMode::Manual {
            return None;
        }
        self.manual_task.set_visible(in_view, now_ms);
        if !self.manual_task.poll(now_ms) || self.last_manual == Some(self.manual_progress) {
            return None;
        }
        self.last_manual = Some(self.manual_progress);
        self.play_at(self.manual_progress)
    }

    /// Every active track at its hidden style.
    pub fn hidden_frame(&self) -> TextFrame {
        let tracks = self
            .active_tracks()
            .map(|(track, styles)| TrackFrame {
                track,
                styles: vec![styles.hidden.clone(); self.track_len(track)],
            })
            .collect();
        TextFrame {
            progress: 0.0,
            tracks,
        }
    }

    /// Stop manual polling.
    pub fn teardown(&mut self) {
        self.manual_task.cancel();
    }

    fn play_at(&mut self, progress: f64) -> Option<TextFrame> {
        if !self.mapper.commit(progress) {
            return None;
        }
        let tracks: Vec<TrackFrame> = self
            .active_tracks()
            .map(|(track, styles)| {
                let len = self.track_len(track);
                TrackFrame {
                    track,
                    styles: (0..len)
                        .map(|i| self.mapper.unit_style(i, len, &styles.revealed, &styles.hidden))
                        .collect(),
                }
            })
            .collect();
        if tracks.is_empty() {
            return None;
        }
        tracing::trace!(progress, tracks = tracks.len(), "text played");
        Some(TextFrame { progress, tracks })
    }

    fn active_tracks(&self) -> impl Iterator<Item = (TextTrack, &TrackStyles)> {
        self.tracks
            .iter()
            .filter(|(_, styles)| styles.is_active())
            .map(|(track, styles)| (*track, styles))
    }
}

/// A [`TextProgress`] driven by the scroll position of its element.
///
/// Each frame feeds the element box through a geometry sampler and plays
/// every committed progress value. In manual mode the sampler is bypassed
/// and the manually set progress is polled instead.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{
///     BoundingBox, MappingMode, SamplerConfig, StaticViewport, StyleDictionary, TextProgress,
///     TextTrack, TextTrigger,
/// };
///
/// let text = TextProgress::new("one two", MappingMode::Toggle).with_track(
///     TextTrack::Word,
///     StyleDictionary::new().with("opacity", 1.0),
///     StyleDictionary::new().with("opacity", 0.0),
/// );
/// let mut trigger = TextTrigger::new(SamplerConfig::default(), text);
/// let viewport = StaticViewport::new(1280.0, 1000.0);
///
/// let frame = trigger.frame(0, Some(BoundingBox::new(0.0, 200.0)), &viewport, true).unwrap();
/// let css: Vec<_> = frame.track(TextTrack::Word).unwrap().iter().map(|s| s.to_css()).collect();
/// assert_eq!(css, ["opacity: 1", "opacity: 1"]);
/// ```
#[derive(Clone, Debug)]
pub struct TextTrigger {
    sampler: GeometrySampler,
    task: SamplingTask,
    text: TextProgress,
}

impl TextTrigger {
    /// Attach a sampler to `text`.
    pub fn new(sampler: SamplerConfig, text: TextProgress) -> Self {
        Self {
            task: SamplingTask::new(sampler.frame_interval_ms),
            sampler: GeometrySampler::new(sampler),
            text,
        }
    }

    /// The geometry sampler.
    #[inline]
    pub fn sampler(&self) -> &GeometrySampler {
        &self.sampler
    }

    /// The sampling task.
    #[inline]
    pub fn task(&self) -> &SamplingTask {
        &self.task
    }

    /// The driven text.
    #[inline]
    pub fn text(&self) -> &TextProgress {
        &self.text
    }

    /// Mutable access for new text, lines or manual progress.
    #[inline]
    pub fn text_mut(&mut self) -> &mut TextProgress {
        &mut self.text
    }

    /// Enable or disable scroll sampling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.sampler.set_enabled(enabled);
    }

    /// Run one frame. Returns the played frame, if anything was played.
    pub fn frame<V: Viewport + ?Sized>(
        &mut self,
        now_ms: u64,
        bbox: Option<BoundingBox>,
        viewport: &V,
        in_view: bool,
    ) -> Option<TextFrame> {
        if self.text.mapper().play_mode() == PlayMode::Manual {
            return self.text.poll(now_ms, in_view);
        }
        self.task.set_visible(in_view, now_ms);
        if !self.task.poll(now_ms) {
            return None;
        }
        let sample = self.sampler.sample(now_ms, bbox, viewport, in_view)?;
        self.text.play(sample.progress)
    }

    /// Stop sampling and polling.
    pub fn teardown(&mut self) {
        self.task.cancel();
        self.text.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{pack_rows, UnitMetrics};
    use crate::style::StyleValue;

    fn opacity(v: f64) -> StyleDictionary {
        StyleDictionary::new().with("opacity", v)
    }

    #[test]
    fn test_track_lengths() {
        let mut text = TextProgress::new("ab  cde", MappingMode::Toggle);
        assert_eq!(text.track_len(TextTrack::Word), 2);
        assert_eq!(text.track_len(TextTrack::Letter), 5);
        assert_eq!(text.track_len(TextTrack::Line), 0);

        let rows = pack_rows(&[UnitMetrics::new(100.0), UnitMetrics::new(100.0)], 150.0, 8.0);
        text.set_lines(LineMap::from_rows(&rows));
        assert_eq!(text.track_len(TextTrack::LineWrap), 2);
        assert_eq!(text.line_of_word(1), 1);

        text.set_text("x");
        assert_eq!(text.track_len(TextTrack::Line), 0);
        assert_eq!(text.letters().len(), 1);
    }

    #[test]
    fn test_inactive_tracks_skipped() {
        let mut text = TextProgress::new("a b", MappingMode::Toggle)
            .with_track(TextTrack::Word, StyleDictionary::new(), opacity(0.0));
        assert!(text.play(1.0).is_none());

        text.set_track(TextTrack::Letter, TrackStyles::new(opacity(1.0), opacity(0.0)));
        let frame = text.play(1.0).unwrap();
        assert_eq!(frame.tracks.len(), 1);
        assert_eq!(frame.track(TextTrack::Letter).unwrap().len(), 2);
    }

    #[test]
    fn test_scrub_letters() {
        let mut text = TextProgress::new("abcd", MappingMode::Scrub)
            .with_stagger(0.25)
            .with_track(TextTrack::Letter, opacity(1.0), opacity(0.0));
        let frame = text.play(0.375).unwrap();
        let values: Vec<f64> = frame
            .track(TextTrack::Letter)
            .unwrap()
            .iter()
            .map(|s| s.get("opacity").map(StyleValue::number).unwrap_or(f64::NAN))
            .collect();
        // windows end at 0, .25, .5, .75
        assert_eq!(values, vec![1.0, 1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_once_is_sticky() {
        let mut text = TextProgress::new("a b", MappingMode::Toggle)
            .with_play_mode(PlayMode::Once)
            .with_track(TextTrack::Word, opacity(1.0), opacity(0.0));
        assert!(text.play(0.4).is_some());
        assert!(text.play(1.0).is_some());
        assert!(text.play(0.2).is_none());
    }

    #[test]
    fn test_manual_polling() {
        let mut text = TextProgress::new("a b", MappingMode::Toggle)
            .with_play_mode(PlayMode::Manual)
            .with_track(TextTrack::Word, opacity(1.0), opacity(0.0));

        assert!(text.play(1.0).is_none());
        assert!(text.poll(0, false).is_none());

        text.set_manual_progress(0.6);
        let frame = text.poll(0, true).unwrap();
        assert_eq!(frame.progress, 0.6);
        assert_eq!(frame.track(TextTrack::Word).unwrap()[1], opacity(1.0));

        text.set_manual_progress(0.2);
        assert!(text.poll(5, true).is_none());
        assert!(text.poll(10, true).is_some());
        assert!(text.poll(20, true).is_none());

        text.teardown();
        text.set_manual_progress(0.9);
        assert!(text.poll(30, true).is_none());
    }

    #[test]
    fn test_hidden_frame() {
        let text = TextProgress::new("a b c", MappingMode::Scrub)
            .with_track(TextTrack::WordWrap, opacity(1.0), opacity(0.0));
        let frame = text.hidden_frame();
        assert_eq!(frame.track(TextTrack::WordWrap).unwrap(), &[opacity(0.0), opacity(0.0), opacity(0.0)]);
        assert_eq!(text.column_gap_em(), DEFAULT_COLUMN_GAP_EM);
    }

    fn word_opacities(frame: &TextFrame) -> Vec<f64> {
        frame
            .track(TextTrack::Word)
            .unwrap_or_default()
            .iter()
            .map(|s| s.get("opacity").map(StyleValue::number).unwrap_or(f64::NAN))
            .collect()
    }

    #[test]
    fn test_trigger_reveals_words_in_order() {
        let text = TextProgress::new("one two three four", MappingMode::Toggle)
            .with_track(TextTrack::Word, opacity(1.0), opacity(0.0));
        let mut trigger = TextTrigger::new(SamplerConfig::default(), text);
        let vp = crate::viewport::StaticViewport::new(1280.0, 1000.0);

        // element 200px tall; progress = (1000 - top) / 1200
        let mut revealed = Vec::new();
        for (i, top) in [940.0, 640.0, 340.0, 40.0].into_iter().enumerate() {
            let now = i as u64 * 20;
            let frame = trigger
                .frame(now, Some(BoundingBox::new(top, top + 200.0)), &vp, true)
                .unwrap();
            revealed.push(word_opacities(&frame));
        }
        assert_eq!(
            revealed,
            vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![1.0, 1.0, 0.0, 0.0],
                vec![1.0, 1.0, 1.0, 0.0],
                vec![1.0, 1.0, 1.0, 1.0],
            ]
        );

        // same geometry, nothing new
        assert!(trigger
            .frame(100, Some(BoundingBox::new(40.0, 240.0)), &vp, true)
            .is_none());
    }

    #[test]
    fn test_trigger_gating() {
        let text = TextProgress::new("a b", MappingMode::Toggle)
            .with_track(TextTrack::Word, opacity(1.0), opacity(0.0));
        let mut trigger = TextTrigger::new(SamplerConfig::default(), text);
        let vp = crate::viewport::StaticViewport::new(1280.0, 1000.0);
        let bbox = Some(BoundingBox::new(400.0, 600.0));

        assert!(trigger.frame(0, bbox, &vp, false).is_none());
        trigger.set_enabled(false);
        assert!(trigger.frame(10, bbox, &vp, true).is_none());
        trigger.set_enabled(true);
        assert!(trigger.frame(20, bbox, &vp, true).is_some());

        trigger.teardown();
        assert!(trigger
            .frame(40, Some(BoundingBox::new(0.0, 200.0)), &vp, true)
            .is_none());
    }

    #[test]
    fn test_trigger_manual_mode_ignores_geometry() {
        let text = TextProgress::new("a b", MappingMode::Toggle)
            .with_play_mode(PlayMode::Manual)
            .with_track(TextTrack::Word, opacity(1.0), opacity(0.0));
        let mut trigger = TextTrigger::new(SamplerConfig::default(), text);
        let vp = crate::viewport::StaticViewport::new(1280.0, 1000.0);

        trigger.text_mut().set_manual_progress(0.6);
        let frame = trigger
            .frame(0, Some(BoundingBox::new(-900.0, -700.0)), &vp, true)
            .unwrap();
        assert_eq!(frame.progress, 0.6);
        assert_eq!(word_opacities(&frame), vec![1.0, 1.0]);
    }
}
