//! WASM bindings
//!
//! Thin `#[wasm_bindgen]` wrappers over the stateless core helpers. The vault
//! itself depends on host collaborators and is driven from Rust.

pub mod address;
pub mod extrinsic;
pub mod try_into_js_value;
pub mod units;

pub use address::AddressNamespace;
pub use extrinsic::{ExtrinsicNamespace, WasmRegistry};
pub use try_into_js_value::{JsConversionError, TryIntoJsValue};
pub use units::UnitsNamespace;
