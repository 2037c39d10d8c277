//! JS value display helpers

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Global `String()` coercion; handles bigints, numbers, null and
    /// undefined the way a JS template literal would
    #[wasm_bindgen(js_name = String)]
    fn coerce_string(value: &JsValue) -> String;
}

/// Render a cell value the way the page would display it
pub fn display_string(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    coerce_string(value)
}

/// Strip the `n` suffix JS bigints carry when stringified
pub fn clean_bigint(text: &str) -> &str {
    text.strip_suffix('n').unwrap_or(text)
}

/// Numeric coercion of a stringified cell, bigint suffix stripped;
/// unparseable cells become 0
pub fn cell_to_number(text: &str) -> f64 {
    clean_bigint(text).trim().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigint_suffix_is_stripped() {
        assert_eq!(clean_bigint("125502000n"), "125502000");
        assert_eq!(clean_bigint("125502000"), "125502000");
    }

    #[test]
    fn only_the_trailing_marker_goes() {
        // a lone suffix, never interior characters
        assert_eq!(clean_bigint("1n2n3n"), "1n2n3");
        assert_eq!(clean_bigint("n"), "");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(cell_to_number("125502000n"), 125502000.0);
        assert_eq!(cell_to_number(" 42 "), 42.0);
        assert_eq!(cell_to_number("not a number"), 0.0);
    }
}
