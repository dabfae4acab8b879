//! Error types for the Kilowhat components.

use thiserror::Error;

/// Result type alias using `UiError`.
pub type Result<T> = std::result::Result<T, UiError>;

/// Errors raised by the interactive components.
///
/// Only configuration problems are fatal. Image load failures are reported
/// through this type but recovered by the lightbox itself, and operations on
/// torn-down components are silent no-ops rather than errors.
#[derive(Error, Debug)]
pub enum UiError {
    /// Invalid or inconsistent component options.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A structural element the component needs was not found at mount.
    #[error("Configuration error: required element `{selector}` not found")]
    MissingElement { selector: String },

    /// The full-resolution image failed to load or decode.
    #[error("Failed to load image: {url}")]
    ImageLoad { url: String },

    /// Options could not be deserialized.
    #[error("Options parse error: {0}")]
    Options(#[from] serde_json::Error),
}

impl UiError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new missing element error.
    pub fn missing_element(selector: impl Into<String>) -> Self {
        Self::MissingElement {
            selector: selector.into(),
        }
    }

    /// Create a new image load error.
    pub fn image_load(url: impl Into<String>) -> Self {
        Self::ImageLoad { url: url.into() }
    }

    /// Whether the error prevents the component from being constructed.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ImageLoad { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = UiError::config("minZoom exceeds maxZoom");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("minZoom"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_element_error() {
        let err = UiError::missing_element(".lightbox-image");
        assert!(err.to_string().contains(".lightbox-image"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_image_load_error_is_recoverable() {
        let err = UiError::image_load("/images/full/cat.jpg");
        assert!(err.to_string().contains("/images/full/cat.jpg"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_options_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: UiError = json_err.into();
        assert!(err.to_string().contains("Options parse error"));
    }
}
