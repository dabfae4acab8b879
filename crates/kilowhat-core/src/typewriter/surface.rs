//! The element a typewriter writes into.

use std::rc::Rc;

/// Cursor glyph rendered after the typed text.
pub const CURSOR: &str = "│";

/// Attributes a typewriter adds to its surface and removes on destroy.
pub const ARIA_ATTRIBUTES: &[(&str, &str)] = &[
    ("role", "status"),
    ("aria-label", "Rotating tagline"),
    ("aria-live", "polite"),
];

/// Text display with a trailing cursor.
pub trait DisplaySurface {
    /// Replace the content with `text`, followed by the cursor when
    /// `show_cursor` is set.
    fn render(&self, text: &str, show_cursor: bool);

    /// Remove all content, cursor included.
    fn clear(&self);

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Rc<T> {
    fn render(&self, text: &str, show_cursor: bool) {
        (**self).render(text, show_cursor)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        (**self).set_attribute(name, value)
    }

    fn remove_attribute(&self, name: &str) {
        (**self).remove_attribute(name)
    }
}
