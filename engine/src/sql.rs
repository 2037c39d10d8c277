//! SQL orchestrator
//!
//! Executes an ordered statement list against a connector-backed
//! database and renders the last statement's first result batch as an
//! HTML table. Statements that read from or write to a quoted file get
//! that file registered with the engine around their execution.
//!
//! Only the last executed statement's output is retained; the statement
//! list is a DDL/DML chain whose final SELECT is the result.

use crate::bindings::{BatchReader, RecordBatch};
use crate::connect::{self, Bundles, Connection, Database};
use crate::convert;
use crate::error::EngineError;
use crate::opfs;
use duckpond_types::QueryTable;
use js_sys::Reflect;
use regex::Regex;
use wasm_bindgen::{JsCast, JsValue};

/// First quoted file name following `keyword`, tolerating a wrapping
/// function call such as `parquet_scan('...')`
pub fn extract_file_name(sql: &str, keyword: &str) -> Option<String> {
    let pattern = format!(
        r"(?i){}\s+(?:\w+\s*\(\s*)?'([^']+)'",
        regex::escape(keyword)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(sql).map(|caps| caps[1].to_string())
}

/// Strip every semicolon and terminate with exactly one
pub fn normalize_statement(sql: &str) -> String {
    format!("{};", sql.replace(';', ""))
}

/// Escape text for an HTML context; everything coming back from the
/// engine is untrusted here, error messages included
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render a flattened result as an HTML table: one header row from the
/// column names, one body row per result row, cells in column order
pub fn render_html_table(table: &QueryTable) -> String {
    let mut html = String::from(r#"<table border="1" cellpadding="5" cellspacing="0" >"#);
    html.push_str("<tr>");
    for column in &table.columns {
        html.push_str("<th>");
        html.push_str(&escape_html(column));
        html.push_str("</th>");
    }
    html.push_str("</tr>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str("<td>");
            html.push_str(&escape_html(cell));
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

/// Execute statements in list order against `{base_name}.db` and return
/// the last statement's rendered output; on failure the error text
/// (escaped) is the output. The connection is closed and the engine
/// terminated in all cases; cleanup failures are logged, never re-thrown.
pub async fn run_statements(sqls: &[String], base_name: &str, bundles: &Bundles) -> String {
    if sqls.iter().all(|sql| sql.trim().is_empty()) {
        log::warn!("no statements to execute");
        return String::new();
    }
    let db = match connect::connect(base_name, bundles).await {
        Ok(db) => db,
        Err(err) => {
            log::error!("connect failed: {err}");
            return escape_html(&err.to_string());
        }
    };
    let conn = match db.connect().await {
        Ok(conn) => conn,
        Err(err) => {
            log::error!("open connection failed: {err}");
            if let Err(term_err) = db.terminate().await {
                log::error!("terminate failed: {term_err}");
            }
            return escape_html(&err.to_string());
        }
    };

    let outcome = execute_all(&db, &conn, sqls).await;

    if let Err(err) = conn.close().await {
        log::error!("close failed: {err}");
    }
    if let Err(err) = db.terminate().await {
        log::error!("terminate failed: {err}");
    }

    match outcome {
        Ok(html) => html,
        Err(err) => {
            log::error!("statement failed: {err}");
            escape_html(&err.to_string())
        }
    }
}

async fn execute_all(
    db: &Database,
    conn: &Connection,
    sqls: &[String],
) -> Result<String, EngineError> {
    let mut html = String::new();
    for sql in sqls {
        if sql.trim().is_empty() {
            continue;
        }
        html = execute_one(db, conn, &normalize_statement(sql)).await?;
    }
    Ok(html)
}

async fn execute_one(db: &Database, conn: &Connection, sql: &str) -> Result<String, EngineError> {
    // A quoted name after FROM is read; after TO it is written and the
    // entry is created first.
    let registration = match extract_file_name(sql, "FROM") {
        Some(name) => Some((name, false)),
        None => extract_file_name(sql, "TO").map(|name| (name, true)),
    };
    let registered = match &registration {
        Some((name, create)) => {
            let handle = opfs::file_handle(name, *create).await?;
            db.register_file_handle(name, Some(&handle), *create).await?;
            Some(name.clone())
        }
        None => None,
    };

    let sent = conn.send(sql).await;
    if let Some(name) = &registered {
        if let Err(err) = db.drop_file(name).await {
            log::warn!("drop_file {name} failed: {err}");
        }
    }
    let reader = sent?;
    first_batch_html(&reader).await
}

async fn first_batch_html(reader: &BatchReader) -> Result<String, EngineError> {
    match next_batch(reader).await? {
        Some(batch) => Ok(render_html_table(&batch_to_table(&batch)?)),
        None => Ok(String::new()),
    }
}

/// Drain the reader and flatten every batch into one table
pub async fn query_rows(conn: &Connection, sql: &str) -> Result<QueryTable, EngineError> {
    let reader = conn.send(sql).await?;
    let mut table = QueryTable::default();
    while let Some(batch) = next_batch(&reader).await? {
        let mut flat = batch_to_table(&batch)?;
        if table.columns.is_empty() {
            table.columns = flat.columns;
        }
        table.rows.append(&mut flat.rows);
    }
    Ok(table)
}

async fn next_batch(reader: &BatchReader) -> Result<Option<RecordBatch>, EngineError> {
    let item = reader.next().await?;
    let done = Reflect::get(&item, &JsValue::from_str("done"))?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }
    let value = Reflect::get(&item, &JsValue::from_str("value"))?;
    Ok(Some(value.unchecked_into()))
}

fn batch_to_table(batch: &RecordBatch) -> Result<QueryTable, EngineError> {
    let schema = batch.schema();
    let fields: js_sys::Array = Reflect::get(&schema, &JsValue::from_str("fields"))?.unchecked_into();
    let columns: Vec<String> = fields
        .iter()
        .map(|field| {
            Reflect::get(&field, &JsValue::from_str("name"))
                .ok()
                .and_then(|name| name.as_string())
                .unwrap_or_default()
        })
        .collect();
    let mut rows = Vec::with_capacity(batch.num_rows() as usize);
    for index in 0..batch.num_rows() {
        let row = batch.get(index);
        let mut cells = Vec::with_capacity(columns.len());
        for column in &columns {
            let cell = Reflect::get(&row, &JsValue::from_str(column))?;
            cells.push(convert::display_string(&cell));
        }
        rows.push(cells);
    }
    Ok(QueryTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_name_after_from() {
        assert_eq!(
            extract_file_name("SELECT * FROM 'a.csv'", "FROM"),
            Some("a.csv".to_string())
        );
    }

    #[test]
    fn extracts_quoted_name_after_to() {
        assert_eq!(
            extract_file_name("COPY t TO 'out.parquet'", "TO"),
            Some("out.parquet".to_string())
        );
    }

    #[test]
    fn tolerates_wrapping_function_call() {
        assert_eq!(
            extract_file_name(
                "CREATE TABLE t AS SELECT * FROM parquet_scan('data/file.parquet');",
                "FROM"
            ),
            Some("data/file.parquet".to_string())
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert_eq!(
            extract_file_name("select * from 'a.csv'", "FROM"),
            Some("a.csv".to_string())
        );
    }

    #[test]
    fn no_quoted_name_yields_none() {
        assert_eq!(extract_file_name("SELECT * FROM tbl", "FROM"), None);
        assert_eq!(extract_file_name("SELECT 1", "TO"), None);
    }

    #[test]
    fn normalization_collapses_semicolons() {
        assert_eq!(normalize_statement("SELECT 1;;"), "SELECT 1;");
        assert_eq!(normalize_statement("SELECT 1"), "SELECT 1;");
    }

    #[test]
    fn table_renders_header_then_rows_in_order() {
        let table = QueryTable {
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into(), "2".into()]],
        };
        assert_eq!(
            render_html_table(&table),
            r#"<table border="1" cellpadding="5" cellspacing="0" ><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>"#
        );
    }

    #[test]
    fn cells_and_headers_are_escaped() {
        let table = QueryTable {
            columns: vec!["<script>".into()],
            rows: vec![vec!["a & 'b' < \"c\"".into()]],
        };
        let html = render_html_table(&table);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &amp; &#39;b&#39; &lt; &quot;c&quot;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_table_renders_header_row_only() {
        let table = QueryTable {
            columns: vec!["cnt".into()],
            rows: vec![],
        };
        assert_eq!(
            render_html_table(&table),
            r#"<table border="1" cellpadding="5" cellspacing="0" ><tr><th>cnt</th></tr></table>"#
        );
    }
}
