//! Session state for the population chart app
//!
//! The session exclusively owns the engine handle, the open connection
//! and the live chart, and enforces the teardown order: connection
//! closed, engine terminated, then files removed. The UI holds one
//! session for the lifetime of the page.

use crate::charts::{self, ChartHandle};
use crate::queries;
use duckpond_engine::{connect, opfs, Bundles, Connection, Database, EngineError, FileWorker};
use duckpond_types::ChartSpec;
use web_sys::HtmlCanvasElement;

pub const TABLE: &str = "world_populations";

/// A `.db` file below this size cannot hold the populations table and is
/// treated as corrupt
pub const MIN_DB_BYTES: f64 = 15_000.0;

pub fn csv_file() -> String {
    format!("{TABLE}.csv")
}

pub fn db_file() -> String {
    format!("{TABLE}.db")
}

pub fn wal_file() -> String {
    format!("{TABLE}.db.wal")
}

pub struct Session {
    worker: FileWorker,
    bundles: Bundles,
    database: Option<Database>,
    connection: Option<Connection>,
    chart: Option<ChartHandle>,
    year_list: Vec<String>,
}

impl Session {
    pub fn new(worker: FileWorker) -> Self {
        Session {
            worker,
            bundles: Bundles::default(),
            database: None,
            connection: None,
            chart: None,
            year_list: queries::build_year_list(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Year labels matching the search prefix; empty while disconnected,
    /// like the country query
    pub fn years(&self, search_word: &str) -> Vec<String> {
        if self.connection().is_none() {
            return Vec::new();
        }
        queries::filter_years(&self.year_list, search_word)
    }

    /// Reopen a database persisted by an earlier visit. Returns false
    /// when no usable file exists; a present-but-corrupt file triggers a
    /// full reset first.
    pub async fn try_reopen(&mut self) -> Result<bool, EngineError> {
        if !self.worker.exists(&db_file()).await? {
            return Ok(false);
        }
        match self.open_existing().await {
            Ok(()) => Ok(true),
            Err(err) => {
                log::error!("reopen failed, resetting: {err}");
                self.reset_files().await;
                Ok(false)
            }
        }
    }

    async fn open_existing(&mut self) -> Result<(), EngineError> {
        let size = opfs::file_size(&db_file()).await?;
        if size < MIN_DB_BYTES {
            return Err(EngineError::Storage(format!(
                "database file too small: {size} bytes"
            )));
        }
        let database = connect(TABLE, &self.bundles).await?;
        let connection = database.connect().await?;
        self.database = Some(database);
        self.connection = Some(connection);
        Ok(())
    }

    /// Ingest the CSV (already fetched) and build the populations table:
    /// chunked save to OPFS, CREATE TABLE from the csv, CHECKPOINT,
    /// reopen a clean connection. The transient csv entry is removed in
    /// all cases.
    pub async fn create_database(&mut self, csv: &web_sys::File) -> Result<(), EngineError> {
        self.worker
            .save(
                csv,
                Some(Box::new(|current, total| {
                    log::debug!("csv save: {current} / {total}");
                })),
            )
            .await?;
        let outcome = self.build_table().await;
        if outcome.is_err() {
            self.reset_files().await;
        }
        if let Err(err) = opfs::remove_entry(&csv_file()).await {
            log::warn!("removing {} failed: {err}", csv_file());
        }
        outcome
    }

    async fn build_table(&mut self) -> Result<(), EngineError> {
        let database = connect(TABLE, &self.bundles).await?;
        match Self::load_csv(&database).await {
            Ok(connection) => {
                self.database = Some(database);
                self.connection = Some(connection);
                Ok(())
            }
            Err(err) => {
                if let Err(term_err) = database.terminate().await {
                    log::warn!("terminate after failed create: {term_err}");
                }
                Err(err)
            }
        }
    }

    async fn load_csv(database: &Database) -> Result<Connection, EngineError> {
        database.register_file_handle(&csv_file(), None, false).await?;
        let connection = database.connect().await?;
        connection
            .send(&format!(
                "CREATE TABLE {TABLE} AS SELECT * FROM '{}';",
                csv_file()
            ))
            .await?;
        connection.send("CHECKPOINT;").await?;
        connection.close().await?;
        database.drop_file(&csv_file()).await?;
        database.connect().await
    }

    /// Tear down in order: close the connection, terminate the engine,
    /// destroy the chart, then remove the persisted files. Failures are
    /// logged; the session always ends up disconnected.
    pub async fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(err) = connection.close().await {
                log::error!("close failed: {err}");
            }
        }
        if let Some(database) = self.database.take() {
            if let Err(err) = database.terminate().await {
                log::error!("terminate failed: {err}");
            }
        }
        self.destroy_chart();
        self.reset_files().await;
    }

    /// Remove WAL, database and transient csv; safe when absent
    async fn reset_files(&self) {
        for name in [wal_file(), db_file(), csv_file()] {
            if let Err(err) = opfs::remove_entry(&name).await {
                log::debug!("remove {name}: {err}");
            }
        }
    }

    pub fn destroy_chart(&mut self) {
        if let Some(chart) = self.chart.take() {
            chart.destroy();
        }
    }

    /// List queries degrade to empty output while disconnected
    fn connection(&self) -> Option<&Connection> {
        if self.connection.is_none() {
            log::warn!("db disconnected");
        }
        self.connection.as_ref()
    }

    pub async fn countries(&self, search_word: &str) -> Result<Vec<String>, EngineError> {
        let Some(connection) = self.connection() else {
            return Ok(Vec::new());
        };
        queries::countries(connection, TABLE, search_word).await
    }

    /// Population chart for one country across the full year range
    pub async fn chart_for_country(
        &mut self,
        canvas: &HtmlCanvasElement,
        country: &str,
    ) -> Result<(), EngineError> {
        let Some(connection) = self.connection() else {
            return Ok(());
        };
        let values =
            queries::population_by_country(connection, TABLE, &self.year_list, country).await?;
        let spec = ChartSpec::bar(
            format!("Population of {country}"),
            self.year_list.clone(),
            values,
        );
        self.chart = Some(charts::render(canvas, self.chart.take(), &spec)?);
        Ok(())
    }

    /// Top-30 population chart for one year
    pub async fn chart_for_year(
        &mut self,
        canvas: &HtmlCanvasElement,
        year: &str,
    ) -> Result<(), EngineError> {
        let Some(connection) = self.connection() else {
            return Ok(());
        };
        let pairs = queries::population_by_year(connection, TABLE, year).await?;
        let (labels, values) = pairs.into_iter().unzip();
        let spec = ChartSpec::bar(format!("Population in {year}"), labels, values);
        self.chart = Some(charts::render(canvas, self.chart.take(), &spec)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_derive_from_the_table() {
        assert_eq!(csv_file(), "world_populations.csv");
        assert_eq!(db_file(), "world_populations.db");
        assert_eq!(wal_file(), "world_populations.db.wal");
    }

    #[test]
    fn corruption_threshold_matches_the_contract() {
        assert_eq!(MIN_DB_BYTES, 15_000.0);
    }
}
