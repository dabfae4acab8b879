//! User preferences read from the browser.

use kilowhat_core::Environment;
use web_sys::Window;

/// Media query for the reduced motion preference.
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// [`Environment`] backed by the global `window`.
#[derive(Debug, Clone)]
pub struct BrowserEnvironment {
    window: Window,
}

impl BrowserEnvironment {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Environment for BrowserEnvironment {
    fn prefers_reduced_motion(&self) -> bool {
        matches!(self.window.match_media(REDUCED_MOTION_QUERY), Ok(Some(query)) if query.matches())
    }

    /// Heuristic only: an explicit `data-screen-reader-active` flag on
    /// `<html>`, reduced motion, or the `nvda`/`jaws` body classes some
    /// sites set.
    fn screen_reader_hint(&self) -> bool {
        let Some(document) = self.window.document() else {
            return false;
        };
        let flagged = document
            .document_element()
            .is_some_and(|html| html.has_attribute("data-screen-reader-active"));
        let body_class = document.body().is_some_and(|body| {
            let classes = body.class_list();
            classes.contains("nvda") || classes.contains("jaws")
        });

        flagged || self.prefers_reduced_motion() || body_class
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn random(&self) -> f64 {
        js_sys::Math::random()
    }
}
