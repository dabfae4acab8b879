//! Errors surfaced to JavaScript callers.

use kilowhat_core::UiError;
use log::warn;
use wasm_bindgen::prelude::*;

/// Error type for the browser bindings.
#[derive(Debug)]
pub enum BindingError {
    /// Component construction failed.
    Component(UiError),
    /// Options object could not be read.
    Options(String),
    /// A browser API was unavailable or threw.
    Dom(String),
}

impl BindingError {
    /// Wrap a thrown DOM value.
    pub fn dom(err: impl std::fmt::Debug) -> Self {
        Self::Dom(format!("{err:?}"))
    }
}

impl std::fmt::Display for BindingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingError::Component(e) => write!(f, "{e}"),
            BindingError::Options(e) => write!(f, "Options parse error: {e}"),
            BindingError::Dom(e) => write!(f, "DOM error: {e}"),
        }
    }
}

impl From<UiError> for BindingError {
    fn from(err: UiError) -> Self {
        BindingError::Component(err)
    }
}

impl From<serde_wasm_bindgen::Error> for BindingError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        BindingError::Options(err.to_string())
    }
}

impl From<BindingError> for JsValue {
    fn from(err: BindingError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Log and swallow a failed DOM mutation.
pub(crate) trait LogFailure {
    fn or_log(self, action: &str);
}

impl LogFailure for Result<(), JsValue> {
    fn or_log(self, action: &str) {
        if let Err(err) = self {
            warn!("{action} failed: {err:?}");
        }
    }
}
