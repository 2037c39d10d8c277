//! Database connector
//!
//! Selects an engine bundle for the current browser, starts the engine
//! worker and opens a database file at `opfs://{base}.db` in read-write
//! mode. Failures propagate to the caller, which owns cleanup of any
//! partially created state (terminating the engine, clearing files).

use crate::bindings;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};

/// One selectable runtime payload: module plus worker script
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BundleDescriptor {
    pub main_module: String,
    pub main_worker: String,
}

/// Bundle table handed to the engine's feature detection
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Bundles {
    pub mvp: BundleDescriptor,
    pub eh: BundleDescriptor,
}

const CDN_BASE: &str = "https://cdn.jsdelivr.net/npm/@duckdb/duckdb-wasm/dist";

impl Default for Bundles {
    /// CDN-hosted bundles; embedding pages that vendor the engine pass
    /// their own URLs instead
    fn default() -> Self {
        Bundles {
            mvp: BundleDescriptor {
                main_module: format!("{CDN_BASE}/duckdb-mvp.wasm"),
                main_worker: format!("{CDN_BASE}/duckdb-browser-mvp.worker.js"),
            },
            eh: BundleDescriptor {
                main_module: format!("{CDN_BASE}/duckdb-eh.wasm"),
                main_worker: format!("{CDN_BASE}/duckdb-browser-eh.worker.js"),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenConfig {
    path: String,
    access_mode: u32,
}

/// Live engine handle bound to one persistent database file
pub struct Database {
    raw: bindings::AsyncDuckDb,
}

/// Open connection; must be closed before the database is terminated
pub struct Connection {
    raw: bindings::RawConnection,
}

/// Connect to the database backed by `{base_name}.db` in OPFS
pub async fn connect(base_name: &str, bundles: &Bundles) -> Result<Database, EngineError> {
    let table = serde_wasm_bindgen::to_value(bundles)?;
    let bundle = bindings::select_bundle(&table).await?;
    let main_worker = js_sys::Reflect::get(&bundle, &JsValue::from_str("mainWorker"))?
        .as_string()
        .ok_or_else(|| EngineError::Database("bundle has no worker script".into()))?;
    let worker = web_sys::Worker::new(&main_worker)?;
    let logger = bindings::ConsoleLogger::new(bindings::LOG_LEVEL_ERROR);
    let db = bindings::AsyncDuckDb::new(&logger, &worker);
    let main_module = js_sys::Reflect::get(&bundle, &JsValue::from_str("mainModule"))?;
    let pthread_worker = js_sys::Reflect::get(&bundle, &JsValue::from_str("pthreadWorker"))?;
    db.instantiate(&main_module, &pthread_worker).await?;
    let config = serde_wasm_bindgen::to_value(&OpenConfig {
        path: format!("opfs://{base_name}.db"),
        access_mode: bindings::ACCESS_MODE_READ_WRITE,
    })?;
    db.open(&config).await?;
    Ok(Database { raw: db })
}

impl Database {
    pub async fn connect(&self) -> Result<Connection, EngineError> {
        let conn = self.raw.connect().await?;
        Ok(Connection {
            raw: conn.unchecked_into(),
        })
    }

    /// Register an OPFS entry with the engine's virtual file system;
    /// `None` lets the engine resolve the entry by name itself
    pub async fn register_file_handle(
        &self,
        name: &str,
        handle: Option<&web_sys::FileSystemFileHandle>,
        direct_io: bool,
    ) -> Result<(), EngineError> {
        let js_handle = handle
            .map(|h| JsValue::from(h.clone()))
            .unwrap_or(JsValue::NULL);
        self.raw
            .register_file_handle(
                name,
                &js_handle,
                bindings::DATA_PROTOCOL_BROWSER_FSACCESS,
                direct_io,
            )
            .await?;
        Ok(())
    }

    pub async fn drop_file(&self, name: &str) -> Result<(), EngineError> {
        self.raw.drop_file(name).await?;
        Ok(())
    }

    pub async fn terminate(&self) -> Result<(), EngineError> {
        self.raw.terminate().await?;
        Ok(())
    }
}

impl Connection {
    /// Streaming execution; the reader yields Arrow record batches
    pub async fn send(&self, sql: &str) -> Result<bindings::BatchReader, EngineError> {
        let reader = self.raw.send(sql).await?;
        Ok(reader.unchecked_into())
    }

    pub async fn close(&self) -> Result<(), EngineError> {
        self.raw.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bundles_cover_both_variants() {
        let bundles = Bundles::default();
        assert!(bundles.mvp.main_module.ends_with("duckdb-mvp.wasm"));
        assert!(bundles.eh.main_worker.ends_with("duckdb-browser-eh.worker.js"));
    }

    #[test]
    fn open_config_serializes_camel_case() {
        let config = OpenConfig {
            path: "opfs://world_populations.db".into(),
            access_mode: bindings::ACCESS_MODE_READ_WRITE,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["path"], "opfs://world_populations.db");
        assert_eq!(json["accessMode"], 3);
    }
}
