//! `addEventListener` host for [`EventRegistry`](kilowhat_core::EventRegistry).

use std::rc::Rc;

use js_sys::Function;
use kilowhat_core::{EventHost, ListenerOptions};
use log::warn;
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// A JS-callable listener. Shared so the registry can hand the same function
/// to `removeEventListener`.
pub type DomHandler = Rc<Closure<dyn FnMut(Event)>>;

/// Wrap a Rust closure as a listener.
pub fn handler(callback: impl FnMut(Event) + 'static) -> DomHandler {
    Rc::new(Closure::<dyn FnMut(Event)>::new(callback))
}

fn function(handler: &DomHandler) -> &Function {
    (**handler).as_ref().unchecked_ref()
}

/// Attaches listeners to real DOM event targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomEvents;

impl EventHost for DomEvents {
    type Target = EventTarget;
    type Handler = DomHandler;

    fn attach(&self, target: &EventTarget, event: &str, handler: &DomHandler, options: ListenerOptions) {
        let dom_options = AddEventListenerOptions::new();
        dom_options.set_capture(options.capture);
        dom_options.set_once(options.once);
        if let Some(passive) = options.passive {
            dom_options.set_passive(passive);
        }

        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            function(handler),
            &dom_options,
        ) {
            warn!("addEventListener({event}) failed: {err:?}");
        }
    }

    fn detach(&self, target: &EventTarget, event: &str, handler: &DomHandler, options: ListenerOptions) {
        // Only `capture` takes part in listener identity.
        if let Err(err) =
            target.remove_event_listener_with_callback_and_bool(event, function(handler), options.capture)
        {
            warn!("removeEventListener({event}) failed: {err:?}");
        }
    }
}
