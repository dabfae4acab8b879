//! Rotating tagline bound to a DOM element.

use js_sys::Function;
use kilowhat_core::{
    DisplaySurface, EventRegistry, ListenerOptions, Typewriter, TypewriterOptions, typewriter::CURSOR,
};
use log::warn;
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{Document, Event, HtmlElement};

use crate::{
    context::{BrowserContext, parse_options},
    dom_events::{DomEvents, handler},
    error::{BindingError, LogFailure},
};

/// Selector used by [`TaglineTypewriter::auto_init`] when none is given.
pub const DEFAULT_SELECTOR: &str = "#tagline-container";

/// Class of the cursor span.
pub const CURSOR_CLASS: &str = "tagline-cursor text-gray-400";

/// Renders `<span>text</span><span class="tagline-cursor">│</span>` into an element.
pub struct DomDisplaySurface {
    element: HtmlElement,
    document: Document,
}

impl DomDisplaySurface {
    pub fn new(element: HtmlElement, document: Document) -> Self {
        Self { element, document }
    }

    fn append_span(&self, text: &str, class: Option<&str>) {
        let span = match self.document.create_element("span") {
            Ok(span) => span,
            Err(err) => {
                warn!("could not create span: {err:?}");
                return;
            }
        };
        if let Some(class) = class {
            span.set_class_name(class);
        }
        span.set_text_content(Some(text));
        if let Err(err) = self.element.append_child(&span) {
            warn!("could not append span: {err:?}");
        }
    }
}

impl DisplaySurface for DomDisplaySurface {
    fn render(&self, text: &str, show_cursor: bool) {
        self.element.set_text_content(None);
        self.append_span(text, None);
        if show_cursor {
            self.append_span(CURSOR, Some(CURSOR_CLASS));
        }
    }

    fn clear(&self) {
        self.element.set_text_content(None);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.element.set_attribute(name, value).or_log("set attribute");
    }

    fn remove_attribute(&self, name: &str) {
        self.element.remove_attribute(name).or_log("remove attribute");
    }
}

/// Typewriter animation cycling through taglines.
///
/// # Example (JavaScript)
///
/// ```javascript
/// import { Typewriter } from 'kilowhat-wasm';
///
/// const tagline = new Typewriter(element, { typeSpeed: 60 });
/// tagline.onPhraseComplete((phrase, index) => console.log(index, phrase));
/// tagline.start();
/// ```
#[wasm_bindgen(js_name = Typewriter)]
pub struct TaglineTypewriter {
    typewriter: Typewriter<DomDisplaySurface>,
    events: EventRegistry<DomEvents>,
}

#[wasm_bindgen(js_class = Typewriter)]
impl TaglineTypewriter {
    /// Bind to `element`. Call `start()` to begin typing.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, options: JsValue) -> Result<TaglineTypewriter, JsValue> {
        let options = parse_options(options)?;
        Ok(Self::mount(element, options)?)
    }

    /// Bind to the element matching `selector` (default `#tagline-container`)
    /// and start typing. Returns `undefined` when nothing matches.
    #[wasm_bindgen(js_name = autoInit)]
    pub fn auto_init(selector: Option<String>, options: JsValue) -> Result<Option<TaglineTypewriter>, JsValue> {
        let selector = selector.unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
        let context = BrowserContext::new()?;
        let element = context
            .document
            .query_selector(&selector)
            .map_err(BindingError::dom)?
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());

        let Some(element) = element else {
            warn!("Typewriter: no element found with selector \"{selector}\"");
            return Ok(None);
        };
        let typewriter = Self::new(element, options)?;
        typewriter.start();
        Ok(Some(typewriter))
    }

    pub fn start(&self) {
        self.typewriter.start();
    }

    pub fn pause(&self) {
        self.typewriter.pause();
    }

    /// Continue after `pause()`, retyping the current phrase.
    pub fn resume(&self) {
        self.typewriter.resume();
    }

    /// Pause, go back to the first phrase and clear the text.
    pub fn stop(&self) {
        self.typewriter.stop();
    }

    /// Stop for good, clear the element and remove its ARIA attributes.
    pub fn destroy(&self) {
        self.typewriter.destroy();
        self.events.cleanup_all();
    }

    /// `{ currentPhrase, currentIndex, isPlaying, isPaused }`.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.typewriter.state()).map_err(|err| BindingError::from(err).into())
    }

    /// `callback(phrase, index)` after each phrase is fully typed.
    #[wasm_bindgen(js_name = onPhraseComplete)]
    pub fn on_phrase_complete(&self, callback: Function) {
        self.typewriter.on_phrase_complete(move |phrase, index| {
            let index = JsValue::from_f64(index as f64);
            if let Err(err) = callback.call2(&JsValue::NULL, &JsValue::from_str(phrase), &index) {
                warn!("onPhraseComplete threw: {err:?}");
            }
        });
    }

    /// `callback()` each time the rotation wraps around.
    #[wasm_bindgen(js_name = onCycleComplete)]
    pub fn on_cycle_complete(&self, callback: Function) {
        self.typewriter.on_cycle_complete(move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                warn!("onCycleComplete threw: {err:?}");
            }
        });
    }
}

impl TaglineTypewriter {
    /// Create the typewriter on `element` and follow page visibility.
    pub fn mount(element: HtmlElement, options: TypewriterOptions) -> Result<Self, BindingError> {
        let context = BrowserContext::new()?;
        let follow_visibility = options.pause_when_hidden;
        let surface = DomDisplaySurface::new(element, context.document.clone());
        let typewriter = Typewriter::new(surface, context.platform, options)?;
        let events = EventRegistry::new(DomEvents);

        if follow_visibility {
            let on_visibility = {
                let typewriter = typewriter.clone();
                let document = context.document.clone();
                handler(move |_: Event| typewriter.set_page_hidden(document.hidden()))
            };
            events.register(
                context.document.into(),
                "visibilitychange",
                on_visibility,
                ListenerOptions::default(),
            );
        }

        Ok(Self { typewriter, events })
    }

    pub fn typewriter(&self) -> &Typewriter<DomDisplaySurface> {
        &self.typewriter
    }
}
