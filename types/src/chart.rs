//! Chart configuration for the population charts
//!
//! The shapes mirror the Chart.js config object and serialize camelCase
//! so a serialized spec can be handed to the Chart constructor as is.

use serde::{Deserialize, Serialize};
use tsify::Tsify;

/// A complete chart configuration
#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ChartSpec {
    /// Chart.js chart type, e.g. "bar"
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Labels plus data series
#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A single data series
#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: String,
    pub border_color: String,
    pub border_width: f64,
}

#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ChartOptions {
    pub scales: Scales,
}

#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Scales {
    pub y: AxisOptions,
}

#[derive(Tsify, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub begin_at_zero: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            scales: Scales {
                y: AxisOptions { begin_at_zero: true },
            },
        }
    }
}

impl ChartSpec {
    /// Bar chart with the demo's teal styling, one dataset
    pub fn bar(label: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        ChartSpec {
            chart_type: "bar".into(),
            data: ChartData {
                labels,
                datasets: vec![Dataset {
                    label: label.into(),
                    data: values,
                    background_color: "rgba(75, 192, 192, 0.2)".into(),
                    border_color: "rgba(75, 192, 192, 1)".into(),
                    border_width: 1.0,
                }],
            },
            options: ChartOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_spec_serializes_to_chart_js_shape() {
        let spec = ChartSpec::bar(
            "Population of Japan",
            vec!["1960".into(), "1961".into()],
            vec![9.0, 10.0],
        );
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["data"]["labels"][0], "1960");
        assert_eq!(json["data"]["datasets"][0]["borderWidth"], 1.0);
        assert_eq!(
            json["data"]["datasets"][0]["backgroundColor"],
            "rgba(75, 192, 192, 0.2)"
        );
        assert_eq!(json["options"]["scales"]["y"]["beginAtZero"], true);
    }
}
