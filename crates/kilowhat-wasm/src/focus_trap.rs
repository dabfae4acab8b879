//! Keyboard focus containment for modal overlays.

use std::cell::RefCell;

use kilowhat_core::{EventRegistry, ListenerHandle, ListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent};

use crate::{
    dom_events::{DomEvents, handler},
    error::LogFailure,
};

/// Elements that can take keyboard focus.
pub const FOCUSABLE_SELECTOR: &str = "a[href], button:not([disabled]), textarea:not([disabled]), \
     input:not([disabled]), select:not([disabled]), [tabindex]:not([tabindex=\"-1\"])";

/// Keeps Tab and Shift+Tab cycling inside one container while active.
pub struct FocusTrap {
    container: Element,
    document: Document,
    events: EventRegistry<DomEvents>,
    previously_focused: RefCell<Option<HtmlElement>>,
    keydown: RefCell<Option<ListenerHandle>>,
}

impl FocusTrap {
    pub fn new(container: Element, document: Document) -> Self {
        Self {
            container,
            document,
            events: EventRegistry::new(DomEvents),
            previously_focused: RefCell::new(None),
            keydown: RefCell::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.keydown.borrow().is_some()
    }

    /// Focusable descendants in document order.
    pub fn focusable(&self) -> Vec<HtmlElement> {
        focusable_in(&self.container)
    }

    /// Remember the focused element, move focus to `initial` (or the first
    /// focusable descendant) and start wrapping Tab.
    ///
    /// A container with nothing focusable is left alone.
    pub fn activate(&self, initial: Option<&HtmlElement>) {
        if self.is_active() {
            return;
        }

        *self.previously_focused.borrow_mut() = self
            .document
            .active_element()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());

        let focusable = self.focusable();
        let Some(target) = initial.cloned().or_else(|| focusable.first().cloned()) else {
            return;
        };
        target.focus().or_log("focus overlay");

        let container = self.container.clone();
        let document = self.document.clone();
        let handle = self.events.register(
            self.document.clone().into(),
            "keydown",
            handler(move |event| wrap_tab(&event, &container, &document)),
            ListenerOptions::default(),
        );
        *self.keydown.borrow_mut() = Some(handle);
    }

    /// Stop wrapping and give focus back to the element that had it.
    pub fn deactivate(&self) {
        let keydown = self.keydown.borrow_mut().take();
        if let Some(keydown) = keydown {
            keydown.unregister();
        }

        let previous = self.previously_focused.borrow_mut().take();
        if let Some(previous) = previous {
            previous.focus().or_log("restore focus");
        }
    }
}

fn focusable_in(container: &Element) -> Vec<HtmlElement> {
    let Ok(nodes) = container.query_selector_all(FOCUSABLE_SELECTOR) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn has_focus(document: &Document, element: &HtmlElement) -> bool {
    document
        .active_element()
        .is_some_and(|active| active.is_same_node(Some(element.as_ref())))
}

fn wrap_tab(event: &Event, container: &Element, document: &Document) {
    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    if key.key() != "Tab" {
        return;
    }

    let focusable = focusable_in(container);
    let (Some(first), Some(last)) = (focusable.first(), focusable.last()) else {
        return;
    };

    let (from, to) = if key.shift_key() { (first, last) } else { (last, first) };
    if has_focus(document, from) {
        event.prevent_default();
        to.focus().or_log("wrap focus");
    }
}
