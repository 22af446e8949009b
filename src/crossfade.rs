//! Cross-fade between successive contents.
//!
//! The displayed content is cached. When new content arrives the cached one
//! fades out, is swapped for the newest content once the fade-out rests, and
//! the result fades back in after a delay. Disabling fades out and leaves
//! the element hidden with the newest content swapped in.

use crate::events::CompletionQueue;
use crate::spring::{SpringConfig, StyleSpring};
use crate::style::StyleDictionary;

/// Progress notifications, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum CrossFadeEvent<C> {
    FadeOutStarted,
    /// The cached content was replaced
    Swapped(C),
    FadeInStarted,
    /// Fade-in finished
    Shown,
    /// Fade-out finished while disabled
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Shown,
    FadeOutPending { start_ms: u64 },
    FadingOut,
    FadeInPending { start_ms: u64 },
    FadingIn,
    Hidden,
    TornDown,
}

/// Content cache with a fade-out / swap / fade-in cycle.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{CrossFade, CrossFadeEvent, SpringConfig};
///
/// let mut fade = CrossFade::new("old").with_spring(SpringConfig::duration(100.0));
/// fade.set_content("new", 0);
/// fade.tick(0);
/// fade.tick(100);
/// assert_eq!(*fade.content(), "new");
///
/// fade.tick(100);
/// fade.tick(200);
/// let events = fade.drain_events();
/// assert_eq!(events.first(), Some(&CrossFadeEvent::FadeOutStarted));
/// assert_eq!(events.last(), Some(&CrossFadeEvent::Shown));
/// ```
#[derive(Clone, Debug)]
pub struct CrossFade<C> {
    from: StyleDictionary,
    to: StyleDictionary,
    config: SpringConfig,
    spring: StyleSpring,
    delay_in_ms: u64,
    delay_out_ms: u64,
    enabled: bool,
    /// Content currently rendered
    shown: C,
    /// Most recent content handed in
    latest: C,
    phase: Phase,
    last_tick_ms: Option<u64>,
    events: CompletionQueue<CrossFadeEvent<C>>,
}

impl<C: Clone + PartialEq> CrossFade<C> {
    /// Shown content with `{opacity: 0}` / `{opacity: 1}` and a gentle spring.
    pub fn new(content: C) -> Self {
        let from = StyleDictionary::new().with("opacity", 0.0);
        let to = StyleDictionary::new().with("opacity", 1.0);
        Self {
            spring: StyleSpring::new(&to, SpringConfig::GENTLE),
            config: SpringConfig::GENTLE,
            from,
            to,
            delay_in_ms: 0,
            delay_out_ms: 0,
            enabled: true,
            shown: content.clone(),
            latest: content,
            phase: Phase::Shown,
            last_tick_ms: None,
            events: CompletionQueue::new(),
        }
    }

    /// Replace the hidden (`from`) and shown (`to`) styles.
    pub fn with_styles(mut self, from: StyleDictionary, to: StyleDictionary) -> Self {
        self.spring = StyleSpring::new(&to, self.config);
        self.from = from;
        self.to = to;
        self
    }

    /// Delay before fading in and before fading out.
    pub fn with_delays(mut self, delay_in_ms: u64, delay_out_ms: u64) -> Self {
        self.delay_in_ms = delay_in_ms;
        self.delay_out_ms = delay_out_ms;
        self
    }

    /// Spring used for both fades.
    pub fn with_spring(mut self, config: SpringConfig) -> Self {
        self.config = config;
        self.spring.set_config(config);
        self
    }

    /// Content currently rendered.
    #[inline]
    pub fn content(&self) -> &C {
        &self.shown
    }

    /// Current animated style.
    pub fn style(&self) -> StyleDictionary {
        self.spring.current()
    }

    /// True while the content is faded out (or waiting to fade in).
    pub fn is_hidden(&self) -> bool {
        matches!(self.phase, Phase::Hidden | Phase::FadeInPending { .. })
    }

    /// True when nothing is pending or animating.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Shown | Phase::Hidden | Phase::TornDown)
    }

    /// Take the queued events, oldest first. Drain once per tick; a full
    /// queue drops its oldest event.
    pub fn drain_events(&mut self) -> Vec<CrossFadeEvent<C>> {
        self.events.drain()
    }

    /// Hand in new content.
    pub fn set_content(&mut self, content: C, now_ms: u64) {
        if self.phase == Phase::TornDown {
            return;
        }
        self.latest = content;
        if !self.enabled {
            return;
        }
        match self.phase {
            Phase::Hidden | Phase::FadeInPending { .. } => self.swap_and_schedule_in(now_ms),
            // the swap at the end of the fade-out picks up the newest content
            Phase::FadeOutPending { .. } | Phase::FadingOut => {}
            Phase::Shown | Phase::FadingIn => {
                if self.latest == self.shown {
                    return;
                }
                self.phase = Phase::FadeOutPending {
                    start_ms: now_ms + self.delay_out_ms,
                };
                self.events.push(CrossFadeEvent::FadeOutStarted);
            }
            Phase::TornDown => {}
        }
    }

    /// Enable or disable. Disabling fades out immediately; enabling a
    /// hidden fade brings the newest content back in.
    pub fn set_enabled(&mut self, enabled: bool, now_ms: u64) {
        if self.phase == Phase::TornDown || enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            if self.phase == Phase::Hidden {
                self.swap_and_schedule_in(now_ms);
            }
        } else {
            self.spring.set_target(&self.from, false);
            self.phase = Phase::FadingOut;
            self.events.push(CrossFadeEvent::FadeOutStarted);
        }
    }

    /// Advance timers and springs to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        let dt = self
            .last_tick_ms
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(0);
        self.last_tick_ms = Some(now_ms);

        match self.phase {
            Phase::TornDown | Phase::Shown | Phase::Hidden => return,
            Phase::FadeOutPending { start_ms } => {
                // an interrupted fade-in keeps moving until the fade-out starts
                self.spring.step(dt as f64);
                if now_ms >= start_ms {
                    self.spring.set_target(&self.from, false);
                    self.phase = Phase::FadingOut;
                }
                return;
            }
            Phase::FadeInPending { start_ms } => {
                if now_ms >= start_ms {
                    self.spring.set_target(&self.to, false);
                    self.phase = Phase::FadingIn;
                    self.events.push(CrossFadeEvent::FadeInStarted);
                }
                return;
            }
            Phase::FadingOut | Phase::FadingIn => {}
        }

        if !self.spring.step(dt as f64) {
            return;
        }
        match self.phase {
            Phase::FadingOut if self.enabled => self.swap_and_schedule_in(now_ms),
            Phase::FadingOut => {
                self.swap();
                self.phase = Phase::Hidden;
                self.events.push(CrossFadeEvent::Hidden);
            }
            Phase::FadingIn => {
                self.phase = Phase::Shown;
                self.events.push(CrossFadeEvent::Shown);
            }
            _ => {}
        }
    }

    /// Cancel pending timers; the fade never changes again.
    pub fn teardown(&mut self) {
        self.phase = Phase::TornDown;
        self.events.clear();
    }

    fn swap(&mut self) {
        self.shown = self.latest.clone();
        self.events.push(CrossFadeEvent::Swapped(self.shown.clone()));
    }

    fn swap_and_schedule_in(&mut self, now_ms: u64) {
        self.swap();
        self.phase = Phase::FadeInPending {
            start_ms: now_ms + self.delay_in_ms,
        };
    }
}
