//! Engine error type
//!
//! JS exceptions are flattened to their message at the boundary; nothing
//! here retains a `JsValue`, so the error is plain data and usable from
//! host-side tests.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("javascript error: {0}")]
    Js(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported execution context")]
    UnsupportedContext,
}

impl From<JsValue> for EngineError {
    fn from(value: JsValue) -> Self {
        EngineError::Js(describe_js(&value))
    }
}

impl From<EngineError> for JsValue {
    fn from(value: EngineError) -> Self {
        JsValue::from_str(&value.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for EngineError {
    fn from(value: serde_wasm_bindgen::Error) -> Self {
        EngineError::Protocol(value.to_string())
    }
}

/// Best-effort human-readable form of a thrown JS value
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_layer() {
        assert_eq!(
            EngineError::Storage("quota exceeded".into()).to_string(),
            "storage error: quota exceeded"
        );
        assert_eq!(
            EngineError::Database("no such table".into()).to_string(),
            "database error: no such table"
        );
    }
}
