//! Decoding and encoding of API records.
//!
//! Records declare their fields and expected types through `serde` derives; the
//! [`Codable`] trait adds the decode/encode entry points client crates use on top
//! of JSON payloads. Beyond the type coercion `serde` performs, no validation is
//! applied.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// A record that can be decoded from and encoded to its JSON representation.
///
/// Implemented for every type that is both [`Serialize`] and
/// [`DeserializeOwned`].
pub trait Codable: Serialize + DeserializeOwned {
    /// Decode a single record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if a declared field is missing or has the
    /// wrong type.
    fn decode(data: Value) -> Result<Self> {
        serde_json::from_value(data).map_err(|e| {
            debug!(
                record = std::any::type_name::<Self>(),
                error = %e,
                "failed to decode record"
            );
            Error::from(e)
        })
    }

    /// Decode a single record from raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if the text is not JSON or does not match
    /// the record.
    fn decode_str(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        Self::decode(value)
    }

    /// Decode a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if `data` is not an array or any element
    /// fails to decode.
    fn decode_many(data: Value) -> Result<Vec<Self>> {
        match data {
            Value::Array(items) => items.into_iter().map(Self::decode).collect(),
            other => Err(Error::DecodeError(format!(
                "expected an array of records, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Decode a record that may be absent. JSON `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if a present value fails to decode.
    fn optionally_decode(data: Option<Value>) -> Result<Option<Self>> {
        match data {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::decode(value).map(Some),
        }
    }

    /// Encode the record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodeError`] if serialization fails.
    fn encode(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::EncodeError(e.to_string()))
    }
}

impl<T> Codable for T where T: Serialize + DeserializeOwned {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
