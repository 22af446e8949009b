//! Browser backend: window viewport, DOM geometry, canvas measurement and
//! the timer loop that drives sampling.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, Window};

use crate::error::{Error, Result};
use crate::layout::{LineMap, TextMeasurer, ROOT_FONT_SIZE};
use crate::text::{UnitKind, WordUnit};
use crate::trigger::BoundingBox;
use crate::viewport::{Viewport, ViewportSize, MOBILE_BREAKPOINT};

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| Error::Web("No window available".to_string()))
}

/// The browser window as a [`Viewport`].
///
/// Reports no size when there is no window (workers, server rendering).
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowViewport;

impl Viewport for WindowViewport {
    fn size(&self) -> Option<ViewportSize> {
        let window = web_sys::window()?;
        let width = window.inner_width().ok()?.as_f64()?;
        let height = window.inner_height().ok()?.as_f64()?;
        Some(ViewportSize::new(width, height))
    }

    fn is_mobile(&self) -> bool {
        let query = format!("(max-width: {}px)", MOBILE_BREAKPOINT - 1.0);
        match web_sys::window().and_then(|w| w.match_media(&query).ok().flatten()) {
            Some(list) => list.matches(),
            None => self.size().map(|s| s.is_mobile()).unwrap_or(false),
        }
    }
}

/// Bounding box of `element` relative to the viewport.
pub fn element_bounding_box(element: &Element) -> BoundingBox {
    let rect = element.get_bounding_client_rect();
    BoundingBox::new(rect.top(), rect.bottom())
}

/// Group rendered unit elements into lines by their top offsets.
pub fn measure_lines(elements: &[Element]) -> LineMap {
    let offsets: Vec<(usize, f64)> = elements
        .iter()
        .enumerate()
        .map(|(i, el)| (i, el.get_bounding_client_rect().top()))
        .collect();
    LineMap::from_offsets(&offsets)
}

/// Ghost measurer backed by an offscreen canvas.
///
/// The canvas is never attached to the document, so measuring causes no
/// layout. Images and childless elements have no text to measure and use
/// `atomic_width` instead.
#[derive(Clone, Debug)]
pub struct CanvasMeasurer {
    ctx: CanvasRenderingContext2d,
    atomic_width: f64,
}

impl CanvasMeasurer {
    /// Create a measurer for a CSS font shorthand, e.g. `"16px serif"`.
    pub fn new(font: &str) -> Result<Self> {
        let document = window()?
            .document()
            .ok_or_else(|| Error::Web("No document available".to_string()))?;
        let canvas = document
            .create_element("canvas")
            .map_err(|_| Error::Web("Failed to create canvas element".to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| Error::Web("Failed to cast element to HtmlCanvasElement".to_string()))?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| Error::Web("Failed to get 2d context".to_string()))?
            .ok_or_else(|| Error::Web("No 2d context available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Web("Failed to cast to CanvasRenderingContext2d".to_string()))?;
        ctx.set_font(font);
        Ok(Self {
            ctx,
            atomic_width: ROOT_FONT_SIZE,
        })
    }

    /// Width used for images and childless elements.
    pub fn with_atomic_width(mut self, width: f64) -> Self {
        self.atomic_width = width;
        self
    }

    /// Width of `text` in the configured font. Zero if measuring fails.
    pub fn text_width(&self, text: &str) -> f64 {
        self.ctx
            .measure_text(text)
            .map(|metrics| metrics.width())
            .unwrap_or(0.0)
    }
}

impl TextMeasurer for CanvasMeasurer {
    fn measure(&self, unit: &WordUnit) -> f64 {
        match &unit.kind {
            UnitKind::Image { .. } | UnitKind::Atomic { .. } => self.atomic_width,
            UnitKind::Break => 0.0,
            _ => self.text_width(unit.label()),
        }
    }
}

/// Milliseconds since the epoch, as the browser clock reports them.
#[inline]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Resolve after `ms` milliseconds.
///
/// Resolves immediately when there is no window to schedule on.
pub async fn wait_ms(ms: u32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        let scheduled = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
                .ok()
        });
        if scheduled.is_none() {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

/// Call `tick` with the current time every `interval_ms` until it returns
/// `false`.
///
/// Dropping the returned future stops the loop.
pub async fn run_sampling_loop<F>(interval_ms: u32, mut tick: F)
where
    F: FnMut(u64) -> bool,
{
    tracing::debug!(interval_ms, "sampling loop started");
    while tick(now_ms()) {
        wait_ms(interval_ms).await;
    }
    tracing::debug!("sampling loop stopped");
}
