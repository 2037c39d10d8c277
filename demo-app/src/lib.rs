//! Parquet demo app
//!
//! Wires the page's buttons to the engine: create a persistent database
//! from a remote Parquet URL, run ad-hoc SQL with HTML-table output,
//! upload files into OPFS (picker or drag-and-drop) and download the
//! database file. The page calls `startDemoApp()` after wasm init.

use duckpond_engine::{sql, writer, Bundles, EngineError};
use wasm_bindgen::prelude::*;
use web_sys::{
    DragEvent, HtmlButtonElement, HtmlDivElement, HtmlInputElement, HtmlLabelElement,
    HtmlTextAreaElement,
};

mod create;
mod dom;
mod download;

#[wasm_bindgen(start)]
pub fn start() {
    duckpond_engine::init();
}

/// Split a SQL input box into individual statements
pub fn split_statements(input: &str) -> Vec<String> {
    input.split(';').map(str::to_string).collect()
}

#[wasm_bindgen(js_name = startDemoApp)]
pub fn start_demo_app() -> Result<(), JsValue> {
    wire_ui().map_err(JsValue::from)
}

fn wire_ui() -> Result<(), EngineError> {
    let save_button: HtmlButtonElement = dom::element("save_button")?;
    let download_button: HtmlButtonElement = dom::element("download_button")?;
    let sql_button: HtmlButtonElement = dom::element("sql_button")?;
    let local_upload_button: HtmlButtonElement = dom::element("local_upload_button")?;
    let s3url_textarea: HtmlTextAreaElement = dom::element("s3url_textarea")?;
    let db_file_name_input: HtmlInputElement = dom::element("db_file_name_input")?;
    let sql_input: HtmlInputElement = dom::element("sql_input")?;
    let count_label: HtmlLabelElement = dom::element("count_label")?;
    let output_div: HtmlDivElement = dom::element("output")?;

    download_button.set_disabled(true);

    wire_sql_button(&sql_button, &sql_input, &db_file_name_input, &output_div)?;
    wire_save_button(
        &save_button,
        &download_button,
        &s3url_textarea,
        &db_file_name_input,
        &count_label,
    )?;
    wire_download_button(&download_button, &db_file_name_input)?;
    wire_upload_button(&local_upload_button)?;
    wire_dropzone()?;
    Ok(())
}

fn wire_sql_button(
    button: &HtmlButtonElement,
    sql_input: &HtmlInputElement,
    name_input: &HtmlInputElement,
    output: &HtmlDivElement,
) -> Result<(), EngineError> {
    let sql_input = sql_input.clone();
    let name_input = name_input.clone();
    let output = output.clone();
    dom::listen(button, "click", move || {
        let sqls = split_statements(&sql_input.value());
        let base_name = name_input.value();
        let output = output.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let html = sql::run_statements(&sqls, &base_name, &Bundles::default()).await;
            output.set_inner_html(&html);
        });
    })
}

fn wire_save_button(
    button: &HtmlButtonElement,
    download_button: &HtmlButtonElement,
    url_input: &HtmlTextAreaElement,
    name_input: &HtmlInputElement,
    count_label: &HtmlLabelElement,
) -> Result<(), EngineError> {
    let save = button.clone();
    let download = download_button.clone();
    let url_input = url_input.clone();
    let name_input = name_input.clone();
    let count_label = count_label.clone();
    dom::listen(button, "click", move || {
        let save = save.clone();
        let download = download.clone();
        let count_label = count_label.clone();
        let url = url_input.value();
        let base_name = name_input.value();
        wasm_bindgen_futures::spawn_local(async move {
            save.set_disabled(true);
            save.set_text_content(Some("Create DB File ..."));
            match create::create_database(&url, &base_name, &Bundles::default()).await {
                Ok(count) => {
                    count_label.set_text_content(Some(&format!("{count} rows")));
                    download.set_disabled(false);
                }
                Err(err) => log::error!("create database failed: {err}"),
            }
            save.set_disabled(false);
            save.set_text_content(Some("Create DB File"));
        });
    })
}

fn wire_download_button(
    button: &HtmlButtonElement,
    name_input: &HtmlInputElement,
) -> Result<(), EngineError> {
    let name_input = name_input.clone();
    dom::listen(button, "click", move || {
        let base_name = name_input.value();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = download::download_database(&base_name).await {
                log::error!("download failed: {err}");
            }
        });
    })
}

fn wire_upload_button(button: &HtmlButtonElement) -> Result<(), EngineError> {
    dom::listen(button, "click", move || {
        let picker: HtmlInputElement = match dom::element("db_file_input") {
            Ok(element) => element,
            Err(err) => {
                log::error!("{err}");
                return;
            }
        };
        let Some(files) = picker.files() else {
            return;
        };
        save_file_list(files);
    })
}

fn wire_dropzone() -> Result<(), EngineError> {
    let dropzone: HtmlDivElement = dom::element("dropzone")?;

    let over_target = dropzone.clone();
    dom::listen_event::<DragEvent>(&dropzone, "dragover", move |event| {
        event.prevent_default();
        let classes = over_target.class_list();
        if !classes.contains("dragover") {
            classes.add_1("dragover").ok();
        }
    })?;

    let leave_target = dropzone.clone();
    dom::listen(&dropzone, "dragleave", move || {
        leave_target.class_list().remove_1("dragover").ok();
    })?;

    let drop_target = dropzone.clone();
    dom::listen_event::<DragEvent>(&dropzone, "drop", move |event| {
        event.prevent_default();
        drop_target.class_list().remove_1("dragover").ok();
        let Some(transfer) = event.data_transfer() else {
            return;
        };
        let Some(files) = transfer.files() else {
            return;
        };
        save_file_list(files);
    })?;
    Ok(())
}

/// Persist every file of a picker/drop selection to OPFS sequentially
fn save_file_list(files: web_sys::FileList) {
    wasm_bindgen_futures::spawn_local(async move {
        for index in 0..files.length() {
            let Some(file) = files.get(index) else {
                continue;
            };
            let name = file.name();
            let outcome = writer::save_with_writable_stream(&file, |current, total| {
                log::info!("{name}: {current} / {total}");
            })
            .await;
            if let Err(err) = outcome {
                log::error!("saving {} failed: {err}", file.name());
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_split_on_semicolons() {
        assert_eq!(
            split_statements("CREATE TABLE t (a INT); SELECT * FROM t"),
            vec!["CREATE TABLE t (a INT)", " SELECT * FROM t"]
        );
    }

    #[test]
    fn empty_input_yields_one_blank_statement() {
        // run_statements skips blanks, so this is harmless downstream
        assert_eq!(split_statements(""), vec![""]);
    }
}
