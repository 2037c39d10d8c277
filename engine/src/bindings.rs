//! Typed imports of the DuckDB-WASM client API and the Arrow batch
//! surface the orchestrator consumes
//!
//! Only the handful of methods the demos call are declared; everything
//! else on those objects stays opaque.

use wasm_bindgen::prelude::*;

/// DuckDB-WASM `LogLevel.ERROR`
pub const LOG_LEVEL_ERROR: u32 = 4;
/// DuckDB-WASM `DuckDBAccessMode.READ_WRITE`
pub const ACCESS_MODE_READ_WRITE: u32 = 3;
/// DuckDB-WASM `DuckDBDataProtocol.BROWSER_FSACCESS`
pub const DATA_PROTOCOL_BROWSER_FSACCESS: u32 = 3;

#[wasm_bindgen(module = "@duckdb/duckdb-wasm")]
extern "C" {
    /// Pick the engine bundle matching the browser's capabilities
    #[wasm_bindgen(js_name = selectBundle, catch)]
    pub async fn select_bundle(bundles: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = ConsoleLogger)]
    pub type ConsoleLogger;

    #[wasm_bindgen(constructor, js_class = "ConsoleLogger")]
    pub fn new(level: u32) -> ConsoleLogger;

    #[wasm_bindgen(js_name = AsyncDuckDB)]
    pub type AsyncDuckDb;

    #[wasm_bindgen(constructor, js_class = "AsyncDuckDB")]
    pub fn new(logger: &ConsoleLogger, worker: &web_sys::Worker) -> AsyncDuckDb;

    #[wasm_bindgen(method, catch)]
    pub async fn instantiate(
        this: &AsyncDuckDb,
        main_module: &JsValue,
        pthread_worker: &JsValue,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub async fn open(this: &AsyncDuckDb, config: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub async fn connect(this: &AsyncDuckDb) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = registerFileHandle)]
    pub async fn register_file_handle(
        this: &AsyncDuckDb,
        name: &str,
        handle: &JsValue,
        protocol: u32,
        direct_io: bool,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = dropFile)]
    pub async fn drop_file(this: &AsyncDuckDb, name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub async fn terminate(this: &AsyncDuckDb) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = AsyncDuckDBConnection)]
    pub type RawConnection;

    /// Streaming execution; resolves to an Arrow async batch reader
    #[wasm_bindgen(method, catch)]
    pub async fn send(this: &RawConnection, sql: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub async fn close(this: &RawConnection) -> Result<JsValue, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    /// Arrow `AsyncRecordBatchStreamReader`; consumed through the async
    /// iterator protocol
    pub type BatchReader;

    #[wasm_bindgen(method, catch)]
    pub async fn next(this: &BatchReader) -> Result<JsValue, JsValue>;

    /// One Arrow record batch
    pub type RecordBatch;

    #[wasm_bindgen(method, getter)]
    pub fn schema(this: &RecordBatch) -> JsValue;

    #[wasm_bindgen(method, getter, js_name = numRows)]
    pub fn num_rows(this: &RecordBatch) -> u32;

    #[wasm_bindgen(method, getter, js_name = numCols)]
    pub fn num_cols(this: &RecordBatch) -> u32;

    /// Row accessor; returns a struct-row object keyed by column name
    #[wasm_bindgen(method)]
    pub fn get(this: &RecordBatch, index: u32) -> JsValue;
}
