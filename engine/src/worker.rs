//! Dedicated-worker entry point for the file writer
//!
//! The worker shim loads the app's wasm module and calls
//! [`file_worker_main`] once; from then on every posted
//! [`Request<FileCommand>`] is handled off the UI thread and answered
//! with [`Response<FileEvent>`] messages carrying the request's id.

use crate::error::EngineError;
use crate::opfs;
use crate::writer;
use duckpond_types::{FileCommand, FileEvent, Request, Response};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};

/// Install the message handler in the current dedicated worker scope
#[wasm_bindgen(js_name = fileWorkerMain)]
pub fn file_worker_main() -> Result<(), JsValue> {
    crate::init();
    let scope: DedicatedWorkerGlobalScope = js_sys::global().dyn_into()?;
    let handler_scope = scope.clone();
    let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        let scope = handler_scope.clone();
        wasm_bindgen_futures::spawn_local(async move {
            handle_message(scope, event).await;
        });
    });
    scope.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();
    log::info!("file worker ready");
    Ok(())
}

async fn handle_message(scope: DedicatedWorkerGlobalScope, event: MessageEvent) {
    let data = event.data();
    let request: Request<FileCommand> = match serde_wasm_bindgen::from_value(data.clone()) {
        Ok(request) => request,
        Err(err) => {
            // No id to answer to; the caller's oneshot will report a
            // dropped channel if it ever waited on this.
            log::error!("undecodable worker message: {err}");
            return;
        }
    };
    let id = request.id.clone();
    let outcome = match request.payload {
        FileCommand::Save { file_name } => save(&scope, &id, &file_name, &data).await,
        FileCommand::ExistFile { file_name } => exist_file(&scope, &id, &file_name).await,
    };
    if let Err(err) = outcome {
        post_event(&scope, &id, FileEvent::Error { message: err.to_string() });
    }
}

async fn save(
    scope: &DedicatedWorkerGlobalScope,
    id: &str,
    file_name: &str,
    data: &JsValue,
) -> Result<(), EngineError> {
    let file = js_sys::Reflect::get(data, &JsValue::from_str("file"))?
        .dyn_into::<web_sys::File>()
        .map_err(|_| EngineError::Protocol("save request carries no file".into()))?;
    log::info!("saving {file_name} ({} bytes)", file.size());
    let progress_scope = scope.clone();
    let progress_id = id.to_string();
    writer::save_with_sync_access(&file, move |current, total| {
        post_event(
            &progress_scope,
            &progress_id,
            FileEvent::Progress { current, total },
        );
    })
    .await?;
    post_event(scope, id, FileEvent::Completed);
    Ok(())
}

async fn exist_file(
    scope: &DedicatedWorkerGlobalScope,
    id: &str,
    file_name: &str,
) -> Result<(), EngineError> {
    let event = if opfs::entry_exists(file_name).await? {
        FileEvent::Found
    } else {
        FileEvent::NotFound
    };
    post_event(scope, id, event);
    Ok(())
}

fn post_event(scope: &DedicatedWorkerGlobalScope, id: &str, event: FileEvent) {
    let envelope = Response::new(id, event);
    match serde_wasm_bindgen::to_value(&envelope) {
        Ok(value) => {
            if let Err(err) = scope.post_message(&value) {
                log::error!("post_message failed: {:?}", err);
            }
        }
        Err(err) => log::error!("unserializable event: {err}"),
    }
}
