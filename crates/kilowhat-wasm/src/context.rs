//! Browser services shared by one component instance.

use std::rc::Rc;

use kilowhat_core::{Platform, Scheduler};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;
use web_sys::{Document, Window};

use crate::{
    announcer::LiveRegionAnnouncer, environment::BrowserEnvironment, error::BindingError,
    scheduler::BrowserScheduler,
};

/// Window, document and a fresh [`Platform`] for one component.
pub struct BrowserContext {
    pub window: Window,
    pub document: Document,
    pub platform: Platform,
}

impl BrowserContext {
    pub fn new() -> Result<Self, BindingError> {
        let window = web_sys::window().ok_or_else(|| BindingError::Dom("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| BindingError::Dom("window has no document".into()))?;

        let scheduler: Rc<dyn Scheduler> = Rc::new(BrowserScheduler::new());
        let environment = Rc::new(BrowserEnvironment::new(window.clone()));
        let announcer = Rc::new(LiveRegionAnnouncer::new(document.clone(), scheduler.clone()));

        Ok(Self {
            window,
            document,
            platform: Platform::new(scheduler, environment, announcer),
        })
    }
}

/// Read an options object passed from JS. `undefined` and `null` mean defaults.
pub fn parse_options<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, BindingError> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_wasm_bindgen::from_value(value)?)
}
