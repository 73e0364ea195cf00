//! WASM bindings for metadata-driven call decoding and extrinsic serialization
//!
//! `WasmRegistry` holds decoded runtime metadata so hosts decode it once per
//! spec version. `ExtrinsicNamespace` works on the camelCase `EncodedTransaction`
//! objects produced by the vault.

use crate::codec::{from_hex, to_hex};
use crate::extrinsic::{payload_to_sign, serialize_signed, signed_extensions, signing_payload, tx_id};
use crate::registry::ChainRegistry;
use crate::types::EncodedTransaction;
use crate::wasm::try_into_js_value::{from_js, to_js, TryIntoJsValue};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmRegistry {
    inner: ChainRegistry,
}

#[wasm_bindgen]
impl WasmRegistry {
    /// Decode `state_getMetadata` output for one runtime spec
    #[wasm_bindgen(constructor)]
    pub fn new(metadata_hex: &str, spec_name: &str, spec_version: u32) -> Result<WasmRegistry, JsValue> {
        let inner = ChainRegistry::from_metadata_hex(metadata_hex, spec_name, spec_version)?;
        Ok(WasmRegistry { inner })
    }

    #[wasm_bindgen(getter, js_name = specName)]
    pub fn spec_name(&self) -> String {
        self.inner.spec_name().to_string()
    }

    #[wasm_bindgen(getter, js_name = specVersion)]
    pub fn spec_version(&self) -> u32 {
        self.inner.spec_version()
    }

    /// Whether the runtime exposes `pallet.call` (snake case names)
    #[wasm_bindgen(js_name = hasCall)]
    pub fn has_call(&self, pallet: &str, call: &str) -> bool {
        self.inner.has_call(pallet, call)
    }

    /// Signed extension identifiers, in runtime order
    #[wasm_bindgen(js_name = signedExtensions)]
    pub fn signed_extensions(&self) -> Result<JsValue, JsValue> {
        Ok(signed_extensions(&self.inner).try_to_js_value()?)
    }

    /// Decode hex call data into `{ pallet, method, palletIndex, callIndex, args }`
    ///
    /// Account arguments are rendered as SS58 with `address_prefix`.
    #[wasm_bindgen(js_name = decodeCall)]
    pub fn decode_call(&self, method: &str, address_prefix: u16) -> Result<JsValue, JsValue> {
        let call = self.inner.decode_call_hex(method, address_prefix)?;
        to_js(&call)
    }
}

impl WasmRegistry {
    pub fn inner(&self) -> &ChainRegistry {
        &self.inner
    }
}

#[wasm_bindgen]
pub struct ExtrinsicNamespace;

#[wasm_bindgen]
impl ExtrinsicNamespace {
    /// Raw signing payload (hex), as sent to hardware devices
    #[wasm_bindgen(js_name = signingPayload)]
    pub fn signing_payload(encoded_tx: JsValue, registry: &WasmRegistry) -> Result<String, JsValue> {
        let tx: EncodedTransaction = from_js(encoded_tx, "encoded transaction")?;
        let payload = signing_payload(&tx, registry.inner())?;
        Ok(to_hex(&payload))
    }

    /// Bytes a key signs: the payload, hashed when longer than 256 bytes
    #[wasm_bindgen(js_name = payloadToSign)]
    pub fn payload_to_sign(payload: &[u8]) -> Vec<u8> {
        payload_to_sign(payload.to_vec())
    }

    /// Serialize a signed extrinsic to hex
    ///
    /// # Arguments
    /// * `encoded_tx` - Unsigned transaction object
    /// * `signature` - Hex MultiSignature (type byte followed by the signature)
    #[wasm_bindgen(js_name = serializeSigned)]
    pub fn serialize_signed(
        encoded_tx: JsValue,
        registry: &WasmRegistry,
        signature: &str,
    ) -> Result<String, JsValue> {
        let tx: EncodedTransaction = from_js(encoded_tx, "encoded transaction")?;
        let signature = from_hex(signature)?;
        let signed = serialize_signed(&tx, registry.inner(), &signature)?;
        Ok(to_hex(&signed))
    }

    /// Blake2-256 id of a hex signed extrinsic
    #[wasm_bindgen(js_name = txId)]
    pub fn tx_id(raw_tx: &str) -> Result<String, JsValue> {
        let bytes = from_hex(raw_tx)?;
        Ok(tx_id(&bytes))
    }
}
