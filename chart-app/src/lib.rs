//! Population chart app
//!
//! Two-pane UI over a persistent `world_populations` database: a
//! searchable country/year list on the right, a bar chart on the left.
//! The page embeds this crate, spawns the file worker shim and calls
//! [`start_chart_app`] with the shim's URL.

mod charts;
mod dom;
mod queries;
mod session;

use duckpond_engine::{EngineError, FileWorker};
use session::Session;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlButtonElement, HtmlCanvasElement, HtmlInputElement};

#[wasm_bindgen(start)]
pub fn start() {
    duckpond_engine::init();
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ListMode {
    Country,
    Year,
}

struct App {
    session: Session,
    mode: ListMode,
}

type Shared = Rc<RefCell<App>>;

/// Entry point called by the embedding page once the module is loaded
#[wasm_bindgen(js_name = startChartApp)]
pub async fn start_chart_app(worker_url: String) -> Result<(), JsValue> {
    run(&worker_url).await.map_err(JsValue::from)
}

async fn run(worker_url: &str) -> Result<(), EngineError> {
    let window = web_sys::window().ok_or(EngineError::UnsupportedContext)?;
    log::warn!("isSecureContext: {}", window.is_secure_context());

    let worker = FileWorker::new(worker_url)?;
    let app: Shared = Rc::new(RefCell::new(App {
        session: Session::new(worker),
        mode: ListMode::Country,
    }));

    let data_button = dom::element::<HtmlButtonElement>("data-title")?;
    {
        // No listeners are wired yet, so the borrow can span the awaits.
        let mut state = app.borrow_mut();
        if state.session.try_reopen().await? {
            data_button.set_text_content(Some("Disconnect"));
            refresh_list(&app, &mut state).await?;
        } else {
            log::warn!("waiting for connect");
            data_button.set_text_content(Some("Connect"));
        }
    }

    let connect = Rc::clone(&app);
    dom::listen(&data_button, "click", move || {
        spawn_local(toggle_connection(Rc::clone(&connect)));
    })?;

    let search_input = dom::element::<HtmlInputElement>("search_word")?;
    let search = Rc::clone(&app);
    dom::listen(&search_input, "input", move || {
        let app = Rc::clone(&search);
        spawn_local(async move {
            report(switch_mode(app, None).await);
        });
    })?;

    for (id, mode) in [
        ("toggle-country", ListMode::Country),
        ("toggle-year", ListMode::Year),
    ] {
        let toggle = dom::element::<web_sys::Element>(id)?;
        let app = Rc::clone(&app);
        dom::listen(&toggle, "click", move || {
            let app = Rc::clone(&app);
            spawn_local(async move {
                report(switch_mode(app, Some(mode)).await);
            });
        })?;
    }

    Ok(())
}

fn report(result: Result<(), EngineError>) {
    if let Err(err) = result {
        log::error!("{err}");
    }
}

/// Connect builds (or reopens) the database from the bundled CSV;
/// disconnect tears everything down and clears the persisted files
async fn toggle_connection(app: Shared) {
    let result = async {
        let Ok(mut state) = app.try_borrow_mut() else {
            log::warn!("session busy, ignoring click");
            return Ok(());
        };
        let button = dom::element::<HtmlButtonElement>("data-title")?;
        if state.session.is_connected() {
            state.session.disconnect().await;
            button.set_text_content(Some("Connect"));
        } else {
            let csv = fetch_csv().await?;
            state.session.create_database(&csv).await?;
            button.set_text_content(Some("Disconnect"));
        }
        state.mode = ListMode::Country;
        refresh_list(&app, &mut state).await
    }
    .await;
    report(result);
}

/// Download the CSV sitting next to the page itself
async fn fetch_csv() -> Result<web_sys::File, EngineError> {
    let window = web_sys::window().ok_or(EngineError::UnsupportedContext)?;
    let location = window.location();
    let path = location.pathname()?;
    let directory = match path.rfind('/') {
        Some(index) => &path[..index],
        None => "",
    };
    let url = format!("{}{directory}/{}", location.origin()?, session::csv_file());
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(&url))
        .await?
        .unchecked_into();
    if !response.ok() {
        return Err(EngineError::Storage(format!(
            "csv download failed with status {}",
            response.status()
        )));
    }
    let blob = JsFuture::from(response.blob()?).await?;
    let parts = js_sys::Array::of1(&blob);
    Ok(web_sys::File::new_with_blob_sequence(
        &parts,
        &session::csv_file(),
    )?)
}

/// Switch the list pane; `None` keeps the current mode (search input)
async fn switch_mode(app: Shared, mode: Option<ListMode>) -> Result<(), EngineError> {
    let Ok(mut state) = app.try_borrow_mut() else {
        log::warn!("session busy, ignoring list update");
        return Ok(());
    };
    if let Some(mode) = mode {
        dom::element::<HtmlInputElement>("search_word")?.set_value("");
        state.mode = mode;
    }
    refresh_list(&app, &mut state).await
}

async fn refresh_list(app: &Shared, state: &mut App) -> Result<(), EngineError> {
    let search = dom::element::<HtmlInputElement>("search_word")?.value();
    let title = dom::element::<web_sys::Element>("right-pane-title")?;
    let country_toggle = dom::element::<web_sys::Element>("toggle-country")?;
    let year_toggle = dom::element::<web_sys::Element>("toggle-year")?;
    let items = match state.mode {
        ListMode::Country => {
            title.set_text_content(Some("Select a Country:"));
            country_toggle.class_list().add_1("selected")?;
            year_toggle.class_list().remove_1("selected")?;
            state.session.countries(&search).await?
        }
        ListMode::Year => {
            title.set_text_content(Some("Select a Year:"));
            country_toggle.class_list().remove_1("selected")?;
            year_toggle.class_list().add_1("selected")?;
            // Most recent years first.
            let mut years = state.session.years(&search);
            years.reverse();
            years
        }
    };
    render_items(app, &items, state.mode)
}

/// Rebuild the list; each entry re-renders the chart when clicked
fn render_items(app: &Shared, items: &[String], mode: ListMode) -> Result<(), EngineError> {
    let list = dom::element::<web_sys::HtmlUListElement>("list-data")?;
    list.set_inner_html("");
    let document = dom::document()?;
    for item in items {
        let entry = document.create_element("li")?;
        entry.set_text_content(Some(item));
        let app = Rc::clone(app);
        let label = item.clone();
        dom::listen(&entry, "click", move || {
            spawn_local(show_chart(Rc::clone(&app), mode, label.clone()));
        })?;
        list.append_child(&entry)?;
    }
    Ok(())
}

async fn show_chart(app: Shared, mode: ListMode, label: String) {
    let result = async {
        let Ok(mut state) = app.try_borrow_mut() else {
            log::warn!("session busy, ignoring chart request");
            return Ok(());
        };
        dom::element::<web_sys::Element>("chart-title")?
            .set_text_content(Some(&format!("Population Chart of {label}")));
        let canvas = dom::element::<HtmlCanvasElement>("populationChart")?;
        match mode {
            ListMode::Country => state.session.chart_for_country(&canvas, &label).await,
            ListMode::Year => state.session.chart_for_year(&canvas, &label).await,
        }
    }
    .await;
    report(result);
}
