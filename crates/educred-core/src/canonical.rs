//! # Canonical Serialization: JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in metadata digest computation.
//!
//! ## Invariant
//!
//! The inner field is private. All bytes come from RFC 8785 (JSON
//! Canonicalization Scheme) serialization via `serde_jcs`: object keys
//! sorted, compact separators, ECMAScript number formatting, UTF-8 text
//! emitted as-is.
//!
//! Two constructors differ only in how they treat floats:
//!
//! - [`CanonicalBytes::from_document()`] accepts any JSON document. This is
//!   the form the metadata store hashes, and the form retrieval re-checks.
//! - [`CanonicalBytes::new()`] and [`CanonicalBytes::from_value()`] reject
//!   floats. They feed the certificate binding hash, whose inputs are
//!   strings and integers by construction.
//!
//! Two documents that are equal as JSON values always produce the same
//! bytes, and so the same content identifier. A float with no fractional
//! part (`2.0`) is written as the integer `2`, so it reads back as an
//! integer.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - Object keys are sorted; separators are compact.
/// - Numbers use the RFC 8785 shortest round-trip form.
/// - The bytes are valid UTF-8 JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float. Returns `CanonicalizationError::SerializationFailed` if
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Construct canonical bytes from an already-parsed JSON value.
    ///
    /// Used on the retrieval path, where stored bytes are parsed back and
    /// re-canonicalized to verify their digest.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let coerced = coerce_json_value(value)?;
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Canonicalize an arbitrary JSON document, floats included.
    pub fn from_document(document: &Value) -> Result<Self, CanonicalizationError> {
        Ok(Self(serialize_canonical(document)?))
    }

    /// Access the canonical bytes for digest computation or storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the owned byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively apply the coercion rules.
///
/// `null`, `bool`, `string` and integers pass through; floats are rejected;
/// objects and arrays are recursed.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}
