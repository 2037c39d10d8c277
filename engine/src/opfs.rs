//! Origin-private file system helpers
//!
//! Works from both the window and dedicated-worker contexts; every
//! function resolves the OPFS root on demand, there is no cached handle.

use crate::error::EngineError;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FileSystemDirectoryHandle, FileSystemFileHandle, FileSystemGetFileOptions};

/// OPFS root directory of the current origin
pub async fn root_directory() -> Result<FileSystemDirectoryHandle, EngineError> {
    let global = js_sys::global();
    let storage = if let Some(window) = global.dyn_ref::<web_sys::Window>() {
        window.navigator().storage()
    } else if let Some(scope) = global.dyn_ref::<web_sys::WorkerGlobalScope>() {
        scope.navigator().storage()
    } else {
        return Err(EngineError::UnsupportedContext);
    };
    let handle = JsFuture::from(storage.get_directory()).await?;
    Ok(handle.unchecked_into())
}

/// Handle to a named entry, optionally creating it
pub async fn file_handle(name: &str, create: bool) -> Result<FileSystemFileHandle, EngineError> {
    let root = root_directory().await?;
    let options = FileSystemGetFileOptions::new();
    options.set_create(create);
    let handle = JsFuture::from(root.get_file_handle_with_options(name, &options)).await?;
    Ok(handle.unchecked_into())
}

/// Non-creating existence check
///
/// A `NotFoundError` means the entry is absent; any other failure
/// (permission, I/O) is surfaced instead of being folded into "not
/// found". No side effects either way.
pub async fn entry_exists(name: &str) -> Result<bool, EngineError> {
    let root = root_directory().await?;
    match JsFuture::from(root.get_file_handle(name)).await {
        Ok(_) => Ok(true),
        Err(err) if is_not_found(&err) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Remove a named entry; absent entries are an error, callers that treat
/// removal as best-effort log and move on
pub async fn remove_entry(name: &str) -> Result<(), EngineError> {
    let root = root_directory().await?;
    JsFuture::from(root.remove_entry(name)).await?;
    Ok(())
}

/// Byte size of a named entry
pub async fn file_size(name: &str) -> Result<f64, EngineError> {
    let handle = file_handle(name, false).await?;
    let file: web_sys::File = JsFuture::from(handle.get_file()).await?.unchecked_into();
    Ok(file.size())
}

fn is_not_found(err: &JsValue) -> bool {
    err.dyn_ref::<web_sys::DomException>()
        .map(|e| e.name() == "NotFoundError")
        .unwrap_or(false)
}
