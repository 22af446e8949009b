//! Loading skeletons.

use crate::crossfade::{CrossFade, CrossFadeEvent};
use crate::reveal::InView;
use crate::spring::SpringConfig;
use crate::style::StyleDictionary;
use crate::trigger::BoundingBox;

/// Delay between an image load and removing its skeleton.
pub const DEFAULT_LOAD_DELAY_MS: u64 = 300;

/// Shimmer placeholder that animates only while visible.
#[derive(Clone, Debug)]
pub struct SkeletonLoader {
    view: InView,
}

impl Default for SkeletonLoader {
    fn default() -> Self {
        Self {
            view: InView::new(0.0, false),
        }
    }
}

impl SkeletonLoader {
    /// Loader that is not yet animating.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update visibility; returns whether the shimmer should run.
    pub fn update(&mut self, bbox: &BoundingBox, viewport_height: f64) -> bool {
        self.view.update(bbox, viewport_height)
    }

    /// True while the shimmer runs.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.view.get()
    }
}

/// Image placeholder shown until the image has loaded.
///
/// The skeleton stays for a short delay after the load event, then leaves
/// through a cross-fade. A new source brings the skeleton back.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{SkeletonImage, SpringConfig};
///
/// let mut image = SkeletonImage::new("/a.png").with_spring(SpringConfig::duration(100.0));
/// image.on_load(0);
/// image.tick(299);
/// assert!(!image.is_loaded());
///
/// image.tick(300);
/// assert!(image.is_loaded());
/// assert!(image.skeleton_visible());
///
/// image.tick(300);
/// image.tick(400);
/// assert!(!image.skeleton_visible());
/// ```
#[derive(Clone, Debug)]
pub struct SkeletonImage {
    src: String,
    delay_ms: u64,
    loaded: bool,
    load_due_ms: Option<u64>,
    loader: SkeletonLoader,
    /// `true` while the skeleton is the displayed content
    fade: CrossFade<bool>,
}

impl SkeletonImage {
    /// Skeleton for an image that has not loaded yet.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            delay_ms: DEFAULT_LOAD_DELAY_MS,
            loaded: false,
            load_due_ms: None,
            loader: SkeletonLoader::new(),
            fade: CrossFade::new(true),
        }
    }

    /// Delay between the load event and removing the skeleton.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Spring of the skeleton fade.
    pub fn with_spring(mut self, config: SpringConfig) -> Self {
        self.fade = self.fade.with_spring(config);
        self
    }

    /// Current image source.
    #[inline]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// True once the current source has loaded and the delay elapsed.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the skeleton is still rendered (possibly fading out).
    #[inline]
    pub fn skeleton_visible(&self) -> bool {
        *self.fade.content()
    }

    /// Shimmer state.
    #[inline]
    pub fn loader(&self) -> &SkeletonLoader {
        &self.loader
    }

    /// Style of the skeleton layer.
    pub fn skeleton_style(&self) -> StyleDictionary {
        self.fade.style()
    }

    /// Switch source. A different source resets the loaded state and drops a
    /// pending load of the previous source.
    pub fn set_src(&mut self, src: impl Into<String>, now_ms: u64) {
        let src = src.into();
        if src == self.src {
            return;
        }
        tracing::debug!(src = %src, "skeleton image source changed");
        self.src = src;
        self.loaded = false;
        self.load_due_ms = None;
        self.fade.set_content(true, now_ms);
    }

    /// The image finished loading.
    pub fn on_load(&mut self, now_ms: u64) {
        self.load_due_ms = Some(now_ms + self.delay_ms);
    }

    /// Forward geometry to the shimmer.
    pub fn update_view(&mut self, bbox: &BoundingBox, viewport_height: f64) -> bool {
        self.loader.update(bbox, viewport_height)
    }

    /// Advance the load delay and the fade to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(due) = self.load_due_ms {
            if now_ms >= due {
                self.load_due_ms = None;
                self.loaded = true;
                self.fade.set_content(false, now_ms);
            }
        }
        self.fade.tick(now_ms);
    }

    /// Take the queued events, oldest first. Drain once per tick; a full
    /// queue drops its oldest event.
    pub fn drain_events(&mut self) -> Vec<CrossFadeEvent<bool>> {
        self.fade.drain_events()
    }

    /// Cancel the pending load and the fade.
    pub fn teardown(&mut self) {
        self.load_due_ms = None;
        self.fade.teardown();
    }
}
