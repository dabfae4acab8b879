//! Touch lightbox bound to overlay markup.
//!
//! Expected markup:
//!
//! ```html
//! <div id="lightbox" class="lightbox" aria-hidden="true">
//!   <div class="lightbox-container">
//!     <button class="lightbox-close" aria-label="Close image">×</button>
//!     <div class="lightbox-loading"></div>
//!     <img class="lightbox-image" alt="">
//!   </div>
//! </div>
//! ```
//!
//! Images opt in with `data-lightbox="true"` and name the enlarged file in
//! `data-full-src`.

use std::rc::Rc;

use kilowhat_core::{
    ClickTarget, EventRegistry, GestureLightbox, ImageSource, LightboxOptions, LightboxView, ListenerOptions,
    TouchPoint, UiError, lightbox::ImageTransform,
};
use log::{debug, warn};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{Document, Element, Event, HtmlElement, HtmlImageElement, KeyboardEvent, TouchEvent};

use crate::{
    context::{BrowserContext, parse_options},
    decoder::BrowserImageDecoder,
    dom_events::{DomEvents, handler},
    error::{BindingError, LogFailure},
    focus_trap::FocusTrap,
};

/// Selector used by [`TouchLightbox::auto_init`] when none is given.
pub const DEFAULT_SELECTOR: &str = "#lightbox";

/// Class on `<body>` while the overlay is shown.
pub const BODY_OPEN_CLASS: &str = "lightbox-open";

fn optional<T: JsCast>(root: &Element, selector: &str) -> Option<T> {
    root.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<T>().ok())
}

fn required<T: JsCast>(root: &Element, selector: &str) -> Result<T, UiError> {
    optional(root, selector).ok_or_else(|| UiError::missing_element(selector))
}

fn set_class(element: &Element, class: &str, on: bool) {
    let classes = element.class_list();
    let result = if on { classes.add_1(class) } else { classes.remove_1(class) };
    result.or_log("update class list");
}

fn clear_style(element: &HtmlElement, property: &str) {
    if let Err(err) = element.style().remove_property(property) {
        warn!("clearing {property} failed: {err:?}");
    }
}

/// [`LightboxView`] over the overlay elements.
pub struct DomLightboxView {
    root: HtmlElement,
    container: HtmlElement,
    image: HtmlImageElement,
    close: Option<HtmlElement>,
    body: Option<HtmlElement>,
    focus: FocusTrap,
}

impl DomLightboxView {
    /// Look up the overlay parts under `root`. The container and image are
    /// required; the close control is optional.
    pub fn from_root(root: HtmlElement, document: &Document) -> Result<Self, UiError> {
        let container = required::<HtmlElement>(&root, ".lightbox-container")?;
        let image = required::<HtmlImageElement>(&root, ".lightbox-image")?;
        let close = optional::<HtmlElement>(&root, ".lightbox-close");

        Ok(Self {
            focus: FocusTrap::new(root.clone().into(), document.clone()),
            body: document.body(),
            root,
            container,
            image,
            close,
        })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn container(&self) -> &HtmlElement {
        &self.container
    }
}

impl LightboxView for DomLightboxView {
    fn set_loading(&self, loading: bool) {
        set_class(&self.root, "loading", loading);
        self.root
            .set_attribute("aria-busy", if loading { "true" } else { "false" })
            .or_log("set aria-busy");
    }

    fn show(&self) {
        clear_style(&self.root, "transition");
        set_class(&self.root, "active", true);
        self.root.set_attribute("aria-hidden", "false").or_log("show overlay");
        if let Some(body) = &self.body {
            set_class(body, BODY_OPEN_CLASS, true);
        }
    }

    fn hide(&self, transition_ms: u32) {
        self.root
            .style()
            .set_property("transition", &format!("opacity {transition_ms}ms ease"))
            .or_log("set transition");
        set_class(&self.root, "active", false);
        self.root.set_attribute("aria-hidden", "true").or_log("hide overlay");
        if let Some(body) = &self.body {
            set_class(body, BODY_OPEN_CLASS, false);
        }
        clear_style(&self.image, "transform");
        clear_style(&self.root, "opacity");
    }

    fn set_image(&self, src: &str, alt: &str) {
        self.image.set_src(src);
        self.image.set_alt(alt);
    }

    fn clear_image(&self) {
        self.image.remove_attribute("src").or_log("clear image");
    }

    fn set_transform(&self, transform: ImageTransform) {
        match transform {
            ImageTransform::None => clear_style(&self.image, "transform"),
            transform => self
                .image
                .style()
                .set_property("transform", &transform.to_string())
                .or_log("set transform"),
        }
    }

    fn set_opacity(&self, opacity: Option<f64>) {
        match opacity {
            Some(opacity) => self
                .root
                .style()
                .set_property("opacity", &opacity.to_string())
                .or_log("set opacity"),
            None => clear_style(&self.root, "opacity"),
        }
    }

    fn trap_focus(&self) {
        self.focus.activate(self.close.as_ref());
    }

    fn release_focus(&self) {
        self.focus.deactivate();
    }
}

/// The enlargeable image described by `element`'s attributes.
pub fn image_source(element: &Element) -> ImageSource {
    ImageSource {
        full_src: element.get_attribute("data-full-src"),
        alt: element.get_attribute("alt"),
    }
}

/// Classify a document click relative to the overlay.
pub fn classify_click(target: &Element, root: &HtmlElement, container: &HtmlElement) -> ClickTarget {
    if target.tag_name() == "IMG" && target.get_attribute("data-lightbox").as_deref() == Some("true") {
        return ClickTarget::SourceImage(image_source(target));
    }
    if matches!(target.closest(".lightbox-close"), Ok(Some(_))) {
        return ClickTarget::CloseControl;
    }
    if target.is_same_node(Some(root.as_ref())) || target.is_same_node(Some(container.as_ref())) {
        return ClickTarget::Backdrop;
    }
    ClickTarget::Other
}

fn touch_points(event: &Event) -> Vec<TouchPoint> {
    let Some(event) = event.dyn_ref::<TouchEvent>() else {
        return Vec::new();
    };
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|touch| TouchPoint::new(f64::from(touch.client_x()), f64::from(touch.client_y())))
        .collect()
}

/// Image lightbox with swipe-to-dismiss and pinch zoom.
///
/// # Example (JavaScript)
///
/// ```javascript
/// import { TouchLightbox } from 'kilowhat-wasm';
///
/// const lightbox = TouchLightbox.autoInit('#lightbox', { swipeThreshold: 0.2 });
/// // later
/// lightbox?.destroy();
/// ```
#[wasm_bindgen]
pub struct TouchLightbox {
    lightbox: GestureLightbox<DomLightboxView>,
    events: EventRegistry<DomEvents>,
}

#[wasm_bindgen]
impl TouchLightbox {
    /// Bind to `element` with an optional options object.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, options: JsValue) -> Result<TouchLightbox, JsValue> {
        let options = parse_options(options)?;
        Ok(Self::mount(element, options)?)
    }

    /// Bind to the first element matching `selector` (default `#lightbox`).
    /// Returns `undefined` when nothing matches.
    #[wasm_bindgen(js_name = autoInit)]
    pub fn auto_init(selector: Option<String>, options: JsValue) -> Result<Option<TouchLightbox>, JsValue> {
        let selector = selector.unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
        let context = BrowserContext::new()?;
        let element = context
            .document
            .query_selector(&selector)
            .map_err(BindingError::dom)?
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());

        match element {
            Some(element) => Self::new(element, options).map(Some),
            None => {
                warn!("TouchLightbox: no element found with selector \"{selector}\"");
                Ok(None)
            }
        }
    }

    /// Enlarge `image`, which needs a `data-full-src` attribute.
    pub fn open(&self, image: &Element) {
        self.lightbox.open(&image_source(image));
    }

    pub fn close(&self) {
        self.lightbox.close();
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.lightbox.is_open()
    }

    /// Current zoom level.
    pub fn scale(&self) -> f64 {
        self.lightbox.scale()
    }

    /// Close immediately and detach every listener. Further calls do nothing.
    pub fn destroy(&self) {
        self.lightbox.destroy();
        self.events.cleanup_all();
    }
}

impl TouchLightbox {
    /// Wire up a lightbox on `root` with already parsed options.
    pub fn mount(root: HtmlElement, options: LightboxOptions) -> Result<Self, BindingError> {
        let context = BrowserContext::new()?;
        let view = DomLightboxView::from_root(root.clone(), &context.document)?;
        let container = view.container().clone();
        let lightbox = GestureLightbox::new(view, Rc::new(BrowserImageDecoder), context.platform, options)?;
        let events = EventRegistry::new(DomEvents);

        let on_click = {
            let lightbox = lightbox.clone();
            let root = root.clone();
            handler(move |event: Event| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                if lightbox.handle_click(classify_click(&target, &root, &container)) {
                    event.prevent_default();
                }
            })
        };
        events.register(context.document.clone().into(), "click", on_click, ListenerOptions::default());

        let on_key = {
            let lightbox = lightbox.clone();
            handler(move |event: Event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                    lightbox.handle_key(&key.key());
                }
            })
        };
        events.register(context.document.clone().into(), "keydown", on_key, ListenerOptions::default());

        let on_touch_start = {
            let lightbox = lightbox.clone();
            handler(move |event: Event| {
                let touches = touch_points(&event);
                if lightbox.touch_start(&touches, js_sys::Date::now()) {
                    event.prevent_default();
                }
            })
        };
        events.register(root.clone().into(), "touchstart", on_touch_start, ListenerOptions::active());

        let on_touch_move = {
            let lightbox = lightbox.clone();
            handler(move |event: Event| {
                if lightbox.touch_move(&touch_points(&event), js_sys::Date::now()) {
                    event.prevent_default();
                }
            })
        };
        events.register(root.clone().into(), "touchmove", on_touch_move, ListenerOptions::active());

        let on_touch_end = {
            let lightbox = lightbox.clone();
            handler(move |_: Event| lightbox.touch_end())
        };
        events.register(root.into(), "touchend", on_touch_end, ListenerOptions::passive());

        debug!("touch lightbox mounted with {} listeners", events.active_listeners());
        Ok(Self { lightbox, events })
    }

    /// The underlying state machine.
    pub fn lightbox(&self) -> &GestureLightbox<DomLightboxView> {
        &self.lightbox
    }
}
