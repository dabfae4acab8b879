//! Kilowhat UI Components
//!
//! Leptos components that render the markup the interactive pieces expect
//! and own their browser instances between mount and cleanup.
//!
//! # Components
//!
//! - [`Lightbox`] - Image overlay with swipe-to-dismiss and pinch zoom
//! - [`LightboxImage`] - Thumbnail that opens in the lightbox
//! - [`Tagline`] - Rotating typewriter tagline
//! - [`ReadingProgress`] - Scroll progress bar for articles
//!
//! # Example
//!
//! ```ignore
//! use leptos::prelude::*;
//! use kilowhat_ui::{Lightbox, LightboxImage, ImageData, ReadingProgress, Tagline};
//!
//! #[component]
//! fn Post() -> impl IntoView {
//!     let image = ImageData::new("/img/cat-small.jpg", "A cat").with_full_src("/img/cat.jpg");
//!
//!     view! {
//!         <Tagline />
//!         <ReadingProgress />
//!         <article>
//!             <LightboxImage image=image />
//!         </article>
//!         <Lightbox />
//!     }
//! }
//! ```

pub mod lightbox;
pub mod progress;
pub mod tagline;

pub use lightbox::{ImageData, Lightbox, LightboxImage};
pub use progress::ReadingProgress;
pub use tagline::{Tagline, tagline_options};
