//! What the lightbox needs from its overlay markup.

use std::{fmt, rc::Rc};

/// Alt text used when the source image has none.
pub const DEFAULT_ALT: &str = "Click to close enlarged image";

/// A clicked image that may be enlarged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSource {
    /// Value of `data-full-src`.
    pub full_src: Option<String>,

    /// Alt text of the source image.
    pub alt: Option<String>,
}

impl ImageSource {
    pub fn new(full_src: impl Into<String>) -> Self {
        Self {
            full_src: Some(full_src.into()),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// The full-resolution URL, if present and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.full_src.as_deref().filter(|src| !src.is_empty())
    }

    /// Alt text for the enlarged image.
    pub fn alt_text(&self) -> &str {
        self.alt
            .as_deref()
            .filter(|alt| !alt.is_empty())
            .unwrap_or(DEFAULT_ALT)
    }
}

/// CSS transform applied to the enlarged image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageTransform {
    /// No transform.
    None,
    /// Swipe-to-dismiss feedback.
    Drag { offset_y: f64, scale: f64 },
    /// Pinch zoom or snap back.
    Scale(f64),
}

impl fmt::Display for ImageTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Drag { offset_y, scale } => write!(f, "translateY({offset_y}px) scale({scale})"),
            Self::Scale(scale) => write!(f, "scale({scale})"),
        }
    }
}

/// Where a click landed, classified by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// An image marked for enlarging.
    SourceImage(ImageSource),
    /// The explicit close control or something inside it.
    CloseControl,
    /// The overlay root or its container, outside the image.
    Backdrop,
    /// Anything else.
    Other,
}

/// Overlay DOM operations.
pub trait LightboxView {
    /// Toggle the loading indicator.
    fn set_loading(&self, loading: bool);

    /// Reveal the overlay: `active` class, `aria-hidden="false"`, body scroll lock.
    fn show(&self);

    /// Start hiding the overlay with an opacity transition of `transition_ms`,
    /// resetting any transform and opacity left by gestures.
    fn hide(&self, transition_ms: u32);

    /// Point the enlarged image at `src`.
    fn set_image(&self, src: &str, alt: &str);

    /// Drop the enlarged image source.
    fn clear_image(&self);

    fn set_transform(&self, transform: ImageTransform);

    /// Overlay opacity; `None` removes the inline value.
    fn set_opacity(&self, opacity: Option<f64>);

    /// Move focus onto the close control and keep it inside the overlay.
    fn trap_focus(&self);

    /// Stop trapping and return focus to where it was before opening.
    fn release_focus(&self);
}

impl<T: LightboxView + ?Sized> LightboxView for Rc<T> {
    fn set_loading(&self, loading: bool) {
        (**self).set_loading(loading)
    }

    fn show(&self) {
        (**self).show()
    }

    fn hide(&self, transition_ms: u32) {
        (**self).hide(transition_ms)
    }

    fn set_image(&self, src: &str, alt: &str) {
        (**self).set_image(src, alt)
    }

    fn clear_image(&self) {
        (**self).clear_image()
    }

    fn set_transform(&self, transform: ImageTransform) {
        (**self).set_transform(transform)
    }

    fn set_opacity(&self, opacity: Option<f64>) {
        (**self).set_opacity(opacity)
    }

    fn trap_focus(&self) {
        (**self).trap_focus()
    }

    fn release_focus(&self) {
        (**self).release_focus()
    }
}
