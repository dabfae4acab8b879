//! Kilowhat WASM Runtime
//!
//! Browser bindings for the blog's interactive components.
//!
//! # Features
//!
//! - **TouchLightbox**: image overlay with swipe-to-dismiss and pinch zoom
//! - **Typewriter**: rotating tagline that types and erases phrases
//! - **ReadingProgressBar**: scroll progress bar on article pages
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { TouchLightbox, Typewriter, ReadingProgressBar } from 'kilowhat-wasm';
//!
//! await init();
//! TouchLightbox.autoInit();
//! Typewriter.autoInit();
//! ReadingProgressBar.autoInit();
//! ```

pub mod announcer;
pub mod context;
pub mod decoder;
pub mod dom_events;
pub mod environment;
pub mod error;
pub mod focus_trap;
pub mod lightbox;
pub mod progress;
pub mod scheduler;
pub mod typewriter;

pub use announcer::LiveRegionAnnouncer;
pub use context::BrowserContext;
pub use decoder::BrowserImageDecoder;
pub use dom_events::{DomEvents, DomHandler};
pub use environment::BrowserEnvironment;
pub use error::BindingError;
pub use focus_trap::FocusTrap;
pub use lightbox::{DomLightboxView, TouchLightbox};
pub use progress::{DomProgressBar, ReadingProgressBar};
pub use scheduler::BrowserScheduler;
pub use typewriter::{DomDisplaySurface, TaglineTypewriter};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// Routes `log` records to the browser console and installs the panic hook.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. after a hot reload) keeps the existing logger.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Get the version of the components library.
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
