//! WASM bindings for amount conversion

use crate::units::{format_units, parse_units};
use crate::wasm::try_into_js_value::TryIntoJsValue;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct UnitsNamespace;

#[wasm_bindgen]
impl UnitsNamespace {
    /// Decimal display amount to raw units, returned as a BigInt
    #[wasm_bindgen(js_name = parseUnits)]
    pub fn parse_units(amount: &str, decimals: u32) -> Result<JsValue, JsValue> {
        let raw = parse_units(amount, decimals)?;
        Ok(raw.try_to_js_value()?)
    }

    /// Raw units (BigInt) to a display amount without trailing zeros
    #[wasm_bindgen(js_name = formatUnits)]
    pub fn format_units(value: js_sys::BigInt, decimals: u32) -> Result<String, JsValue> {
        let value = String::from(
            value
                .to_string(10)
                .map_err(|_| JsValue::from_str("Invalid amount value"))?,
        );
        let raw: u128 = value
            .parse()
            .map_err(|_| JsValue::from_str("Amount must be a non-negative integer that fits in u128"))?;
        Ok(format_units(raw, decimals))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_format_bigint() {
        let value = js_sys::BigInt::from(15_000_000_000u64);
        assert_eq!(UnitsNamespace::format_units(value, 10).unwrap(), "1.5");
    }

    #[wasm_bindgen_test]
    fn test_parse_returns_bigint() {
        assert!(UnitsNamespace::parse_units("1.5", 10).unwrap().is_bigint());
        assert!(UnitsNamespace::parse_units("abc", 10).is_err());
    }
}
