//! Create a persistent database from a remote Parquet file

use duckpond_engine::{connect, sql, Bundles, EngineError};

/// `CREATE TABLE {base} AS parquet_scan('{url}')`, checkpoint, and
/// return the row count. Instantiation and open failures propagate; the
/// caller reverts its UI state.
pub async fn create_database(
    url: &str,
    base_name: &str,
    bundles: &Bundles,
) -> Result<i64, EngineError> {
    if url.trim().is_empty() {
        return Err(EngineError::InvalidInput("empty source url".into()));
    }
    let db = connect(base_name, bundles).await?;
    let conn = db.connect().await?;
    conn.send(&format!(
        "CREATE TABLE {base_name} AS SELECT * FROM parquet_scan('{url}');"
    ))
    .await?;
    let table = sql::query_rows(
        &conn,
        &format!("SELECT count(*)::INTEGER AS cnt FROM {base_name};"),
    )
    .await?;
    let count = table
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(|cell| cell.parse().ok())
        .unwrap_or(0);
    // Checkpoint before teardown so the .db file holds everything and
    // the WAL can be discarded.
    conn.send("CHECKPOINT;").await?;
    conn.close().await?;
    db.terminate().await?;
    Ok(count)
}
