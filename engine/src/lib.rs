//! duckpond-engine - DuckDB-WASM and OPFS glue for the demo apps
//!
//! This crate holds everything the two demo UIs share: typed bindings to
//! the DuckDB-WASM client API, the database connector, the SQL
//! orchestrator that turns result batches into HTML tables, OPFS helpers,
//! and the chunked file writer with its worker entry point and
//! main-thread client.

use std::sync::Once;

pub mod bindings;
pub mod client;
pub mod connect;
pub mod convert;
pub mod error;
pub mod opfs;
pub mod sql;
pub mod worker;
pub mod writer;

pub use client::FileWorker;
pub use connect::{connect, Bundles, Connection, Database};
pub use error::EngineError;

static INIT: Once = Once::new();

/// Initialize logging and panic reporting; safe to call more than once
pub fn init() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("duckpond engine initialized");
    });
}
