//! DOM lookup and event helpers

use duckpond_engine::EngineError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::EventTarget;

pub fn document() -> Result<web_sys::Document, EngineError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(EngineError::UnsupportedContext)
}

/// Typed element lookup by id
pub fn element<T: JsCast>(id: &str) -> Result<T, EngineError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| EngineError::InvalidInput(format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| EngineError::InvalidInput(format!("element #{id} has the wrong type")))
}

/// Attach a leaked listener; handlers live for the page's lifetime
pub fn listen(
    target: &EventTarget,
    event_type: &str,
    callback: impl FnMut() + 'static,
) -> Result<(), EngineError> {
    let closure = Closure::<dyn FnMut()>::new(callback);
    target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
