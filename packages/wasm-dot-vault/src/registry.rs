//! Metadata-backed call registry
//!
//! A [`ChainRegistry`] wraps the runtime metadata of one spec version and is
//! used for both directions: encoding dynamic call payloads and decoding call
//! data back into named JSON arguments.

use crate::address::encode_ss58;
use crate::codec::{from_hex, to_hex};
use crate::error::{VaultError, VaultResult};
use parity_scale_codec::Decode;
use scale_info::{PortableRegistry, TypeDef, TypeDefPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use subxt_core::{
    ext::scale_value::{self, Composite, Primitive, ValueDef, Variant},
    metadata::Metadata,
    tx::payload::{DynamicPayload, Payload},
};

/// Registry scoped to one runtime spec version
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    metadata: Metadata,
    spec_name: String,
    spec_version: u32,
}

/// Call data decoded against metadata
///
/// Pallet and method names are lower camel case ("balances",
/// "transferKeepAlive"), argument names likewise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedCall {
    pub pallet: String,
    pub method: String,
    pub pallet_index: u8,
    pub call_index: u8,
    pub args: Json,
}

impl DecodedCall {
    pub fn is(&self, pallet: &str, method: &str) -> bool {
        self.pallet == pallet && self.method == method
    }

    pub fn arg(&self, name: &str) -> Option<&Json> {
        self.args.get(name)
    }

    /// Numeric argument (rendered as a decimal string)
    pub fn arg_u128(&self, name: &str) -> Option<u128> {
        match self.arg(name)? {
            Json::String(s) => s.parse().ok(),
            Json::Number(n) => n.as_u64().map(u128::from),
            _ => None,
        }
    }

    /// Address held by a `MultiAddress` argument (`{"id": ss58}`) or a plain string
    pub fn arg_address(&self, name: &str) -> Option<String> {
        match self.arg(name)? {
            Json::String(s) => Some(s.clone()),
            Json::Object(map) => map.get("id").and_then(Json::as_str).map(str::to_string),
            _ => None,
        }
    }
}

impl ChainRegistry {
    /// Build from SCALE encoded `RuntimeMetadataPrefixed` bytes
    pub fn from_metadata_bytes(bytes: &[u8], spec_name: &str, spec_version: u32) -> VaultResult<Self> {
        let metadata = Metadata::decode(&mut &bytes[..])
            .map_err(|e| VaultError::Metadata(format!("Failed to decode metadata: {}", e)))?;
        Ok(Self {
            metadata,
            spec_name: spec_name.to_string(),
            spec_version,
        })
    }

    /// Build from the hex blob returned by `state_getMetadata`
    pub fn from_metadata_hex(hex: &str, spec_name: &str, spec_version: u32) -> VaultResult<Self> {
        let bytes = from_hex(hex)?;
        Self::from_metadata_bytes(&bytes, spec_name, spec_version)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn spec_name(&self) -> &str {
        &self.spec_name
    }

    pub fn spec_version(&self) -> u32 {
        self.spec_version
    }

    /// Whether the runtime exposes `pallet.call` (metadata names, e.g. "Balances", "transfer_all")
    pub fn has_call(&self, pallet: &str, call: &str) -> bool {
        self.metadata
            .pallet_by_name(pallet)
            .and_then(|p| p.call_variant_by_name(call))
            .is_some()
    }

    /// Encode a dynamic payload to call data bytes
    pub fn encode_call(&self, payload: &DynamicPayload) -> VaultResult<Vec<u8>> {
        payload
            .encode_call_data(&self.metadata)
            .map_err(|e| VaultError::InvalidInput(format!("Failed to encode call: {}", e)))
    }

    /// Read a `u128` pallet constant
    pub fn constant_u128(&self, pallet: &str, name: &str) -> VaultResult<u128> {
        let constant = self
            .metadata
            .pallet_by_name(pallet)
            .and_then(|p| p.constant_by_name(name))
            .ok_or_else(|| VaultError::Metadata(format!("Constant {}.{} not found", pallet, name)))?;
        Ok(u128::decode(&mut constant.value())?)
    }

    /// Decode call data, rendering account ids with `address_prefix`
    pub fn decode_call(&self, call_data: &[u8], address_prefix: u16) -> VaultResult<DecodedCall> {
        if call_data.len() < 2 {
            return Err(VaultError::InvalidTransaction("Call data too short".to_string()));
        }
        let (pallet_index, call_index) = (call_data[0], call_data[1]);

        let pallet = self.metadata.pallet_by_index(pallet_index).ok_or_else(|| {
            VaultError::Metadata(format!("Unknown pallet index {}", pallet_index))
        })?;
        let variant = pallet.call_variant_by_index(call_index).ok_or_else(|| {
            VaultError::Metadata(format!(
                "Unknown call index {} in pallet {}",
                call_index,
                pallet.name()
            ))
        })?;

        let types = self.metadata.types();
        let mut cursor = &call_data[2..];
        let mut args = Map::new();
        for (position, field) in variant.fields.iter().enumerate() {
            let value = scale_value::scale::decode_as_type(&mut cursor, field.ty.id, types)
                .map_err(|e| VaultError::ScaleDecode(e.to_string()))?;
            let name = field
                .name
                .as_deref()
                .map(snake_to_camel)
                .unwrap_or_else(|| position.to_string());
            args.insert(name, value_to_json(&value, types, address_prefix));
        }
        if !cursor.is_empty() {
            return Err(VaultError::InvalidTransaction(format!(
                "{} trailing bytes after call arguments",
                cursor.len()
            )));
        }

        Ok(DecodedCall {
            pallet: lower_first(pallet.name()),
            method: snake_to_camel(&variant.name),
            pallet_index,
            call_index,
            args: Json::Object(args),
        })
    }

    /// Decode `0x` prefixed call data
    pub fn decode_call_hex(&self, method: &str, address_prefix: u16) -> VaultResult<DecodedCall> {
        self.decode_call(&from_hex(method)?, address_prefix)
    }
}

/// "transfer_keep_alive" -> "transferKeepAlive"
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' {
            upper = i > 0;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// "transferKeepAlive" -> "transfer_keep_alive"
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

type TypedValue = scale_value::Value<u32>;

fn value_to_json(value: &TypedValue, types: &PortableRegistry, prefix: u16) -> Json {
    if let Some(ty) = types.resolve(value.context) {
        if ty.path.segments.last().map(String::as_str) == Some("AccountId32") {
            let bytes = collect_bytes(value);
            if let Ok(address) = encode_ss58(&bytes, prefix) {
                return Json::String(address);
            }
        }
        if is_byte_container(&ty.type_def, types) {
            return Json::String(to_hex(&collect_bytes(value)));
        }
    }

    match &value.value {
        ValueDef::Composite(composite) => composite_to_json(composite, types, prefix),
        ValueDef::Variant(variant) => variant_to_json(variant, types, prefix),
        ValueDef::Primitive(primitive) => primitive_to_json(primitive),
        ValueDef::BitSequence(bits) => Json::String(format!("{:?}", bits)),
    }
}

fn composite_to_json(composite: &Composite<u32>, types: &PortableRegistry, prefix: u16) -> Json {
    match composite {
        Composite::Named(fields) => Json::Object(
            fields
                .iter()
                .map(|(name, v)| (snake_to_camel(name), value_to_json(v, types, prefix)))
                .collect(),
        ),
        // Newtype wrappers render as their inner value
        Composite::Unnamed(values) if values.len() == 1 => value_to_json(&values[0], types, prefix),
        Composite::Unnamed(values) => Json::Array(
            values
                .iter()
                .map(|v| value_to_json(v, types, prefix))
                .collect(),
        ),
    }
}

fn variant_to_json(variant: &Variant<u32>, types: &PortableRegistry, prefix: u16) -> Json {
    let inner = match &variant.values {
        Composite::Named(fields) if fields.is_empty() => None,
        Composite::Unnamed(values) if values.is_empty() => None,
        values => Some(composite_to_json(values, types, prefix)),
    };
    match (variant.name.as_str(), inner) {
        ("None", None) => Json::Null,
        ("Some", Some(inner)) => inner,
        (name, None) => Json::String(name.to_string()),
        (name, Some(inner)) => {
            let mut map = Map::new();
            map.insert(lower_first(name), inner);
            Json::Object(map)
        }
    }
}

fn primitive_to_json(primitive: &Primitive) -> Json {
    match primitive {
        Primitive::Bool(b) => Json::Bool(*b),
        Primitive::Char(c) => Json::String(c.to_string()),
        Primitive::String(s) => Json::String(s.clone()),
        // Balances exceed f64 precision, numbers always travel as strings
        Primitive::U128(n) => Json::String(n.to_string()),
        Primitive::I128(n) => Json::String(n.to_string()),
        Primitive::U256(bytes) | Primitive::I256(bytes) => Json::String(to_hex(bytes)),
    }
}

fn is_byte_container(type_def: &TypeDef<scale_info::form::PortableForm>, types: &PortableRegistry) -> bool {
    let element = match type_def {
        TypeDef::Sequence(seq) => seq.type_param.id,
        TypeDef::Array(array) => array.type_param.id,
        _ => return false,
    };
    matches!(
        types.resolve(element).map(|ty| &ty.type_def),
        Some(TypeDef::Primitive(TypeDefPrimitive::U8))
    )
}

fn collect_bytes(value: &TypedValue) -> Vec<u8> {
    fn walk(value: &TypedValue, out: &mut Vec<u8>) {
        match &value.value {
            ValueDef::Primitive(Primitive::U128(n)) => out.push(*n as u8),
            ValueDef::Composite(Composite::Unnamed(values)) => {
                values.iter().for_each(|v| walk(v, out));
            }
            ValueDef::Composite(Composite::Named(fields)) => {
                fields.iter().for_each(|(_, v)| walk(v, out));
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(value, &mut out);
    out
}
