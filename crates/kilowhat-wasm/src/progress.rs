//! Reading progress bar for article pages.

use std::rc::Rc;

use kilowhat_core::{EventRegistry, ListenerOptions, ProgressSurface, ReadingProgress, ScrollMetrics};
use log::debug;
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{Document, Event, HtmlElement, Window};

use crate::{
    context::BrowserContext,
    dom_events::{DomEvents, handler},
    error::{BindingError, LogFailure},
};

/// Class of the bar element.
pub const BAR_CLASS: &str = "reading-progress-bar";

const BAR_STYLE: &str = "position: fixed; top: 0; left: 0; width: 0%; height: 3px; \
     background: linear-gradient(90deg, rgba(59, 130, 246, 0.9) 0%, rgba(251, 146, 60, 0.9) 33%, \
     rgba(20, 184, 166, 0.9) 66%, rgba(147, 51, 234, 0.9) 100%); \
     z-index: 100; transition: width 0.2s ease-out; box-shadow: 0 2px 10px rgba(59, 130, 246, 0.4);";

/// A fixed bar appended to `<body>`.
pub struct DomProgressBar {
    bar: HtmlElement,
    window: Window,
    document: Document,
}

impl DomProgressBar {
    /// Create the bar and attach it to the page.
    pub fn create(window: Window, document: Document) -> Result<Self, BindingError> {
        let bar = document
            .create_element("div")
            .map_err(BindingError::dom)?
            .dyn_into::<HtmlElement>()
            .map_err(BindingError::dom)?;
        bar.set_class_name(BAR_CLASS);
        bar.style().set_css_text(BAR_STYLE);

        let body = document
            .body()
            .ok_or_else(|| BindingError::Dom("document has no body".into()))?;
        body.append_child(&bar).map_err(BindingError::dom)?;

        Ok(Self { bar, window, document })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.bar
    }
}

impl ProgressSurface for DomProgressBar {
    fn metrics(&self) -> ScrollMetrics {
        let root = self.document.document_element();
        let scroll_top = self
            .window
            .scroll_y()
            .ok()
            .or_else(|| root.as_ref().map(|root| f64::from(root.scroll_top())))
            .unwrap_or(0.0);
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0);
        let document_height = root.map_or(0.0, |root| f64::from(root.scroll_height()));

        ScrollMetrics {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    fn set_progress(&self, percent: f64) {
        self.bar
            .style()
            .set_property("width", &format!("{percent}%"))
            .or_log("set progress width");
    }

    fn remove(&self) {
        self.bar.remove();
    }
}

/// Progress bar tracking how far the reader has scrolled.
#[wasm_bindgen]
pub struct ReadingProgressBar {
    progress: ReadingProgress<DomProgressBar>,
    events: EventRegistry<DomEvents>,
}

#[wasm_bindgen]
impl ReadingProgressBar {
    /// Add a progress bar to the current page.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ReadingProgressBar, JsValue> {
        Ok(Self::mount()?)
    }

    /// Add a progress bar only when the page has an `<article>`.
    #[wasm_bindgen(js_name = autoInit)]
    pub fn auto_init() -> Result<Option<ReadingProgressBar>, JsValue> {
        let context = BrowserContext::new()?;
        let article = context.document.query_selector("article").map_err(BindingError::dom)?;
        if article.is_none() {
            debug!("no article on this page, skipping reading progress");
            return Ok(None);
        }
        Ok(Some(Self::mount()?))
    }

    /// Current progress in percent.
    pub fn progress(&self) -> f64 {
        self.progress.progress()
    }

    /// Recompute immediately.
    pub fn update(&self) {
        self.progress.update();
    }

    /// Detach the listeners and remove the bar.
    pub fn destroy(&self) {
        self.events.cleanup_all();
        self.progress.destroy();
    }
}

impl ReadingProgressBar {
    pub fn mount() -> Result<Self, BindingError> {
        let context = BrowserContext::new()?;
        let surface = DomProgressBar::create(context.window.clone(), context.document.clone())?;
        let scheduler = Rc::clone(&context.platform.scheduler);
        let progress = ReadingProgress::new(surface, scheduler);
        let events = EventRegistry::new(DomEvents);

        let on_scroll = {
            let progress = progress.clone();
            handler(move |_: Event| progress.on_scroll())
        };
        events.register(context.window.clone().into(), "scroll", on_scroll, ListenerOptions::passive());

        let on_resize = {
            let progress = progress.clone();
            handler(move |_: Event| progress.update())
        };
        events.register(context.window.into(), "resize", on_resize, ListenerOptions::default());

        Ok(Self { progress, events })
    }
}
