//! Chart.js bindings
//!
//! Imported from `chart.js/auto` so the controllers register themselves;
//! only construction and destruction are exposed.

use duckpond_engine::EngineError;
use duckpond_types::ChartSpec;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

#[wasm_bindgen(module = "chart.js/auto")]
extern "C" {
    #[wasm_bindgen(js_name = Chart)]
    type JsChart;

    #[wasm_bindgen(constructor, js_class = "Chart")]
    fn new(canvas: &HtmlCanvasElement, config: &JsValue) -> JsChart;

    #[wasm_bindgen(method)]
    fn destroy(this: &JsChart);
}

/// Owned chart instance; destroyed when replaced
pub struct ChartHandle {
    raw: JsChart,
}

impl ChartHandle {
    pub fn destroy(self) {
        self.raw.destroy();
    }
}

/// Render a chart on the canvas, destroying the previous instance first
/// so only one chart is ever live
pub fn render(
    canvas: &HtmlCanvasElement,
    previous: Option<ChartHandle>,
    spec: &ChartSpec,
) -> Result<ChartHandle, EngineError> {
    if let Some(previous) = previous {
        previous.destroy();
    }
    let config = serde_wasm_bindgen::to_value(spec)
        .map_err(|err| EngineError::Protocol(err.to_string()))?;
    Ok(ChartHandle {
        raw: JsChart::new(canvas, &config),
    })
}
