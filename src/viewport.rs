//! Viewport provider capability.
//!
//! Sampling never reaches for a global window: callers hand in something
//! implementing [`Viewport`]. A viewport that reports no size stands for
//! "no rendering surface" (server-side or headless rendering) and makes
//! every consumer short-circuit to its inert default.

/// Viewport width below which "disable on mobile" options take effect.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

/// Default debounce for resize notifications.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 300;

/// Viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    /// Size from width and height.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True below the mobile breakpoint.
    #[inline]
    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_BREAKPOINT
    }
}

/// Source of viewport dimensions.
pub trait Viewport {
    /// Current size, or `None` when there is no rendering surface.
    fn size(&self) -> Option<ViewportSize>;

    /// Whether the viewport counts as mobile. `false` without a surface.
    fn is_mobile(&self) -> bool {
        self.size().map(|s| s.is_mobile()).unwrap_or(false)
    }
}

/// Fixed-size viewport for headless use and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StaticViewport {
    size: Option<ViewportSize>,
}

impl StaticViewport {
    /// Viewport of a fixed size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Some(ViewportSize::new(width, height)),
        }
    }

    /// A viewport with no rendering surface.
    pub fn detached() -> Self {
        Self { size: None }
    }

    /// Change the size.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Some(ViewportSize::new(width, height));
    }
}

impl Viewport for StaticViewport {
    fn size(&self) -> Option<ViewportSize> {
        self.size
    }
}

impl<V: Viewport + ?Sized> Viewport for &V {
    fn size(&self) -> Option<ViewportSize> {
        (**self).size()
    }
}

/// Debounces raw resize events into settled size changes.
///
/// Feed every resize event with [`ResizeDebouncer::notify`] and call
/// [`ResizeDebouncer::poll`] from a timer; the new size is released once no
/// further event arrived for the debounce delay.
///
/// ## Example
///
/// ```rust
/// use scroll_reveal_core::{ResizeDebouncer, ViewportSize};
///
/// let mut debounce = ResizeDebouncer::new(300);
/// debounce.notify(ViewportSize::new(500.0, 800.0), 0);
/// debounce.notify(ViewportSize::new(520.0, 800.0), 100);
/// assert_eq!(debounce.poll(350), None);
/// assert_eq!(debounce.poll(400), Some(ViewportSize::new(520.0, 800.0)));
/// ```
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(ViewportSize, u64)>,
    current: Option<ViewportSize>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE_MS)
    }
}

impl ResizeDebouncer {
    /// Debouncer releasing sizes after `delay_ms` of quiet.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
            current: None,
        }
    }

    /// Record a resize event; restarts the debounce window.
    pub fn notify(&mut self, size: ViewportSize, now_ms: u64) {
        self.pending = Some((size, now_ms));
    }

    /// Release the pending size once the window has elapsed.
    ///
    /// Returns `Some` only when the settled size differs from the last
    /// released one.
    pub fn poll(&mut self, now_ms: u64) -> Option<ViewportSize> {
        let (size, at) = self.pending?;
        if now_ms.saturating_sub(at) < self.delay_ms {
            return None;
        }
        self.pending = None;
        if self.current == Some(size) {
            return None;
        }
        tracing::debug!(width = size.width, height = size.height, "viewport resized");
        self.current = Some(size);
        Some(size)
    }

    /// Last released size.
    #[inline]
    pub fn current(&self) -> Option<ViewportSize> {
        self.current
    }

    /// Drop any pending event (owner unmounted).
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_viewport() {
        let vp = StaticViewport::new(375.0, 700.0);
        assert!(vp.is_mobile());
        assert_eq!(vp.size(), Some(ViewportSize::new(375.0, 700.0)));

        let desktop = StaticViewport::new(1440.0, 900.0);
        assert!(!desktop.is_mobile());

        let detached = StaticViewport::detached();
        assert_eq!(detached.size(), None);
        assert!(!detached.is_mobile());
    }

    #[test]
    fn test_debounce_restarts_window() {
        let mut d = ResizeDebouncer::new(300);
        d.notify(ViewportSize::new(800.0, 600.0), 0);
        d.notify(ViewportSize::new(900.0, 600.0), 250);
        assert_eq!(d.poll(500), None);
        assert_eq!(d.poll(550), Some(ViewportSize::new(900.0, 600.0)));
        assert_eq!(d.poll(900), None);
    }

    #[test]
    fn test_debounce_same_size_is_silent() {
        let mut d = ResizeDebouncer::new(10);
        d.notify(ViewportSize::new(800.0, 600.0), 0);
        assert!(d.poll(20).is_some());
        d.notify(ViewportSize::new(800.0, 600.0), 30);
        assert_eq!(d.poll(50), None);
        assert_eq!(d.current(), Some(ViewportSize::new(800.0, 600.0)));
    }

    #[test]
    fn test_debounce_cancel() {
        let mut d = ResizeDebouncer::default();
        d.notify(ViewportSize::new(800.0, 600.0), 0);
        d.cancel();
        assert_eq!(d.poll(1000), None);
    }
}
