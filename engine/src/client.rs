//! Main-thread client for the file worker
//!
//! Every request gets a correlation id and a oneshot waiter; the single
//! onmessage handler routes events by id, so back-to-back save and
//! existence-check calls cannot clobber each other's waiters.

use crate::error::EngineError;
use duckpond_types::{FileCommand, FileEvent, MessageId, Request, Response};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

/// Per-request progress callback
pub type ProgressFn = Box<dyn FnMut(f64, f64)>;

struct PendingRequest {
    done: Option<oneshot::Sender<FileEvent>>,
    progress: Option<ProgressFn>,
}

type PendingMap = Rc<RefCell<HashMap<MessageId, PendingRequest>>>;

/// Handle to the spawned file worker
pub struct FileWorker {
    worker: web_sys::Worker,
    pending: PendingMap,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
}

impl FileWorker {
    /// Spawn the worker from its module shim script
    pub fn new(script_url: &str) -> Result<Self, EngineError> {
        let options = web_sys::WorkerOptions::new();
        options.set_type(web_sys::WorkerType::Module);
        let worker = web_sys::Worker::new_with_options(script_url, &options)?;
        let pending: PendingMap = Rc::new(RefCell::new(HashMap::new()));
        let routing = Rc::clone(&pending);
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            route_event(&routing, event);
        });
        worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        Ok(FileWorker {
            worker,
            pending,
            _onmessage: onmessage,
        })
    }

    /// Whether a named OPFS entry exists
    pub async fn exists(&self, file_name: &str) -> Result<bool, EngineError> {
        let command = FileCommand::ExistFile {
            file_name: file_name.to_string(),
        };
        match self.request(command, None, None).await? {
            FileEvent::Found => Ok(true),
            FileEvent::NotFound => Ok(false),
            FileEvent::Error { message } => Err(EngineError::Storage(message)),
            other => Err(EngineError::Protocol(format!(
                "unexpected terminal event: {other:?}"
            ))),
        }
    }

    /// Persist a file to OPFS under its own name, chunked, off-thread
    pub async fn save(
        &self,
        file: &web_sys::File,
        progress: Option<ProgressFn>,
    ) -> Result<(), EngineError> {
        let command = FileCommand::Save {
            file_name: file.name(),
        };
        match self.request(command, Some(file), progress).await? {
            FileEvent::Completed => Ok(()),
            FileEvent::Error { message } => Err(EngineError::Storage(message)),
            other => Err(EngineError::Protocol(format!(
                "unexpected terminal event: {other:?}"
            ))),
        }
    }

    async fn request(
        &self,
        command: FileCommand,
        file: Option<&web_sys::File>,
        progress: Option<ProgressFn>,
    ) -> Result<FileEvent, EngineError> {
        let request = Request::new(command);
        let (done, waiter) = oneshot::channel();
        self.pending.borrow_mut().insert(
            request.id.clone(),
            PendingRequest {
                done: Some(done),
                progress,
            },
        );
        let message = match serde_wasm_bindgen::to_value(&request) {
            Ok(message) => message,
            Err(err) => {
                self.pending.borrow_mut().remove(&request.id);
                return Err(err.into());
            }
        };
        if let Some(file) = file {
            // The File rides beside the envelope by structured clone.
            js_sys::Reflect::set(&message, &JsValue::from_str("file"), file.as_ref())?;
        }
        if let Err(err) = self.worker.post_message(&message) {
            self.pending.borrow_mut().remove(&request.id);
            return Err(err.into());
        }
        waiter
            .await
            .map_err(|_| EngineError::Protocol("worker channel dropped".into()))
    }
}

fn route_event(pending: &PendingMap, event: MessageEvent) {
    let envelope: Response<FileEvent> = match serde_wasm_bindgen::from_value(event.data()) {
        Ok(envelope) => envelope,
        Err(err) => {
            log::warn!("undecodable worker event: {err}");
            return;
        }
    };
    let mut map = pending.borrow_mut();
    if envelope.payload.is_terminal() {
        match map.remove(&envelope.id) {
            Some(mut entry) => {
                if let Some(done) = entry.done.take() {
                    let _ = done.send(envelope.payload);
                }
            }
            None => log::warn!("terminal event for unknown request {}", envelope.id),
        }
    } else if let FileEvent::Progress { current, total } = envelope.payload {
        match map.get_mut(&envelope.id) {
            Some(entry) => {
                if let Some(progress) = entry.progress.as_mut() {
                    progress(current, total);
                }
            }
            None => log::warn!("progress for unknown request {}", envelope.id),
        }
    }
}
