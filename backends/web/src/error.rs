use core::fmt;

use breeze_core::{DocumentError, Error};

/// Error type produced by the web backend.
#[derive(Debug, Clone)]
pub enum WebError {
    /// The DOM APIs are not accessible (e.g., when executed outside of a browser).
    DomUnavailable,
    /// The requested mounting node cannot be located.
    RootNotFound(String),
    /// Wrapper around JavaScript exceptions.
    Js(String),
    /// A JavaScript caller passed something other than a DOM element as a node.
    InvalidNode(String),
    /// A usage error raised by the element factory or the state store.
    Breeze(Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomUnavailable => write!(f, "DOM is not available"),
            Self::RootNotFound(id) => write!(f, "Failed to find DOM element with id `{id}`"),
            Self::Js(msg) => write!(f, "JavaScript error: {msg}"),
            Self::InvalidNode(kind) => write!(f, "expected a DOM element, got {kind}"),
            Self::Breeze(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for WebError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Breeze(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Error> for WebError {
    fn from(value: Error) -> Self {
        Self::Breeze(value)
    }
}

impl From<DocumentError> for WebError {
    fn from(value: DocumentError) -> Self {
        Self::Breeze(value.into())
    }
}

impl From<wasm_bindgen::JsValue> for WebError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(describe(&value))
    }
}

impl From<WebError> for wasm_bindgen::JsValue {
    fn from(value: WebError) -> Self {
        js_sys::Error::new(&value.to_string()).into()
    }
}

/// Best-effort message for a thrown JavaScript value.
pub(crate) fn describe(value: &wasm_bindgen::JsValue) -> String {
    use wasm_bindgen::JsCast;

    if let Some(text) = value.as_string() {
        text
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        String::from(error.message())
    } else {
        format!("{value:?}")
    }
}
