//! WASM bindings for SS58 addresses

use crate::address::{decode_address, decode_ss58, encode_ss58, validate_address};
use crate::codec::{from_hex, to_hex};
use crate::js_obj;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct AddressNamespace;

#[wasm_bindgen]
impl AddressNamespace {
    /// Encode a 32-byte public key (hex) with the given network prefix
    #[wasm_bindgen(js_name = encodeSs58)]
    pub fn encode_ss58(public_key: &str, prefix: u16) -> Result<String, JsValue> {
        let bytes = from_hex(public_key)?;
        Ok(encode_ss58(&bytes, prefix)?)
    }

    /// Decode an SS58 address into `{ publicKey, prefix }`
    #[wasm_bindgen(js_name = decodeSs58)]
    pub fn decode_ss58(address: &str) -> Result<JsValue, JsValue> {
        let (account_id, prefix) = decode_ss58(address)?;
        Ok(js_obj! {
            "publicKey" => to_hex(&account_id),
            "prefix" => prefix,
        }?)
    }

    /// Re-encode an SS58 or hex account id under `prefix`
    #[wasm_bindgen(js_name = normalizeAddress)]
    pub fn normalize_address(address: &str, prefix: u16) -> Result<String, JsValue> {
        let account_id = decode_address(address, None)?;
        Ok(encode_ss58(&account_id, prefix)?)
    }

    #[wasm_bindgen(js_name = validateAddress)]
    pub fn validate_address(address: &str, expected_prefix: Option<u16>) -> bool {
        validate_address(address, expected_prefix)
    }
}
