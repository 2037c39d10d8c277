//! Download the persisted database file through a blob URL

use crate::dom;
use duckpond_engine::{opfs, EngineError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub async fn download_database(base_name: &str) -> Result<(), EngineError> {
    let file_name = format!("{base_name}.db");
    let handle = opfs::file_handle(&file_name, false).await?;
    let file: web_sys::File = JsFuture::from(handle.get_file()).await?.unchecked_into();
    let url = web_sys::Url::create_object_url_with_blob(&file)?;
    let anchor: web_sys::HtmlAnchorElement = dom::document()?
        .create_element("a")?
        .unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(&file_name);
    anchor.click();
    web_sys::Url::revoke_object_url(&url)?;
    Ok(())
}
