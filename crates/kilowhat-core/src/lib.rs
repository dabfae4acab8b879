//! Kilowhat Core Library
//!
//! Host-independent state machines for the blog's interactive pieces: the
//! touch image lightbox, the rotating tagline typewriter and the reading
//! progress bar, plus the listener registry they share.
//!
//! Everything here talks to the page through the traits in [`platform`],
//! [`lightbox::LightboxView`], [`typewriter::DisplaySurface`] and
//! [`progress::ProgressSurface`], so the logic runs and is tested natively.

pub mod config;
pub mod error;
pub mod events;
pub mod lightbox;
pub mod motion;
pub mod platform;
pub mod progress;
pub mod shuffle;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timers;
pub mod typewriter;

pub use config::{LightboxOptions, TypewriterOptions};
pub use error::{Result, UiError};
pub use events::{EventHost, EventRegistry, ListenerHandle, ListenerOptions};
pub use lightbox::{ClickTarget, GestureLightbox, ImageSource, LightboxState, LightboxView, TouchPoint};
pub use platform::{Announcer, Environment, ImageDecoder, Platform, Politeness, Scheduler, TimerId};
pub use progress::{ProgressSurface, ReadingProgress, ScrollMetrics};
pub use typewriter::{DisplaySurface, Typewriter, TypewriterState};
