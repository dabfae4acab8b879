//! Host services the components consume.
//!
//! The browser crate implements these on top of web-sys; tests use the
//! virtual implementations in `testing` (behind the `testing` feature).

use std::rc::Rc;

use crate::error::Result;

/// Opaque handle for a scheduled timeout or animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Timer and animation-frame scheduling.
///
/// Callbacks never run synchronously inside `set_timeout` or
/// `request_frame`, even for a zero delay.
pub trait Scheduler {
    /// Run `callback` after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timeout. Unknown or already fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);

    /// Run `callback` before the next repaint.
    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending animation frame.
    fn cancel_frame(&self, id: TimerId);
}

/// User preferences and viewport facts.
pub trait Environment {
    /// `(prefers-reduced-motion: reduce)` is active.
    fn prefers_reduced_motion(&self) -> bool;

    /// Best-effort guess that a screen reader is running.
    fn screen_reader_hint(&self) -> bool;

    /// Current viewport height in CSS pixels.
    fn viewport_height(&self) -> f64;

    /// Uniform random number in `[0, 1)`.
    fn random(&self) -> f64;
}

/// Live region priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    /// Value for the `aria-live` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// Sink for assistive technology announcements.
pub trait Announcer {
    fn announce(&self, message: &str, politeness: Politeness);
}

/// Completion callback for [`ImageDecoder::decode`].
pub type DecodeCallback = Box<dyn FnOnce(Result<()>)>;

/// Loads and decodes an image without inserting it into the page.
pub trait ImageDecoder {
    fn decode(&self, url: &str, done: DecodeCallback);
}

/// Bundle of the host services shared by every component.
#[derive(Clone)]
pub struct Platform {
    pub scheduler: Rc<dyn Scheduler>,
    pub environment: Rc<dyn Environment>,
    pub announcer: Rc<dyn Announcer>,
}

impl Platform {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        environment: Rc<dyn Environment>,
        announcer: Rc<dyn Announcer>,
    ) -> Self {
        Self {
            scheduler,
            environment,
            announcer,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
