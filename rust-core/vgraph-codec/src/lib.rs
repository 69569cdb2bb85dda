// SPDX-License-Identifier: MIT OR Apache-2.0
//! Atomic value type and JSON codec.
//!
//! Every key and value that crosses the storage boundary is an [`Value`],
//! a small tagged sum that rides on JSON for its wire form. Plain JSON
//! cannot distinguish an ordered sequence from a tuple, so [`encode`] tags
//! both: an ordinary sequence becomes `["list", e1, e2, ...]` and a tuple
//! becomes `["tuple", e1, e2, ...]`. [`decode`] reverses this exactly.
//!
//! Mapping keys are not restricted to text — [`Value::Map`] stores
//! `(Value, Value)` pairs in insertion order and encodes each key the same
//! way it encodes a value, then uses the resulting JSON text as the
//! surrounding JSON object's string key.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding a previously-encoded value.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The text did not parse as JSON at all.
    #[error("malformed JSON: {0}")]
    Malformed(String),

    /// A JSON array was seen without the `"list"`/`"tuple"` discriminator
    /// as its first element.
    #[error("array is missing a list/tuple discriminator: {0}")]
    MissingDiscriminator(String),

    /// The first element of a tagged array was neither `"list"` nor
    /// `"tuple"`.
    #[error("unknown sequence discriminator {0:?}")]
    UnknownDiscriminator(String),

    /// A mapping key's JSON text did not itself decode to a valid `Value`.
    #[error("malformed map key: {0}")]
    MalformedKey(String),
}

/// Any value the codec can round-trip.
///
/// `List` and `Tuple` hold the same shape (an ordered sequence of `Value`)
/// but are distinct variants so that the distinction survives encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Convenience constructor for a text value.
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    /// True if this value is usable as a storage-layer key: null, a
    /// scalar, or a tuple. Mappings and plain lists are not valid keys at
    /// the storage layer, though the codec itself will encode them.
    pub fn is_valid_key(&self) -> bool {
        match self {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_) => {
                true
            }
            Value::Tuple(items) => items.iter().all(Value::is_valid_key),
            Value::List(_) | Value::Map(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(self))
    }
}

/// Encode a [`Value`] to its canonical JSON text form.
pub fn encode(value: &Value) -> String {
    serde_json::to_string(&to_json(value)).expect("Value -> JSON never fails")
}

/// Decode a previously-[`encode`]d value back into a [`Value`].
///
/// This is the exact inverse of `encode`: list-vs-tuple survives at every
/// nesting depth.
pub fn decode(text: &str) -> Result<Value, EncodingError> {
    let raw: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EncodingError::Malformed(e.to_string()))?;
    from_json(raw)
}

fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as J;
    match value {
        Value::Null => J::Null,
        Value::Bool(b) => J::Bool(*b),
        Value::Int(i) => J::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(J::Number)
            .unwrap_or(J::Null),
        Value::Text(s) => J::String(s.clone()),
        Value::List(items) => tagged_array("list", items),
        Value::Tuple(items) => tagged_array("tuple", items),
        Value::Map(entries) => {
            let mut obj = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                let key_text = serde_json::to_string(&to_json(k)).expect("key encodes");
                obj.insert(key_text, to_json(v));
            }
            J::Object(obj)
        }
    }
}

fn tagged_array(tag: &str, items: &[Value]) -> serde_json::Value {
    let mut arr = Vec::with_capacity(items.len() + 1);
    arr.push(serde_json::Value::String(tag.to_string()));
    arr.extend(items.iter().map(to_json));
    serde_json::Value::Array(arr)
}

fn from_json(raw: serde_json::Value) -> Result<Value, EncodingError> {
    use serde_json::Value as J;
    match raw {
        J::Null => Ok(Value::Null),
        J::Bool(b) => Ok(Value::Bool(b)),
        J::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(EncodingError::Malformed(format!("unrepresentable number {n}")))
            }
        }
        J::String(s) => Ok(Value::Text(s)),
        J::Array(items) => decode_array(items),
        J::Object(obj) => {
            let mut entries = Vec::with_capacity(obj.len());
            for (key_text, v) in obj {
                let key_raw: serde_json::Value = serde_json::from_str(&key_text)
                    .map_err(|e| EncodingError::MalformedKey(format!("{key_text}: {e}")))?;
                let key = from_json(key_raw)?;
                entries.push((key, from_json(v)?));
            }
            Ok(Value::Map(entries))
        }
    }
}

fn decode_array(mut items: Vec<serde_json::Value>) -> Result<Value, EncodingError> {
    if items.is_empty() {
        return Err(EncodingError::MissingDiscriminator("[]".to_string()));
    }
    let rest = items.split_off(1);
    let tag = match items.into_iter().next() {
        Some(serde_json::Value::String(s)) => s,
        other => {
            return Err(EncodingError::MissingDiscriminator(format!("{other:?}")));
        }
    };
    let elems = rest
        .into_iter()
        .map(from_json)
        .collect::<Result<Vec<_>, _>>()?;
    match tag.as_str() {
        "list" => Ok(Value::List(elems)),
        "tuple" => Ok(Value::Tuple(elems)),
        other => Err(EncodingError::UnknownDiscriminator(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: Value) {
        let encoded = encode(&v);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(v, decoded, "round trip mismatch for {encoded}");
    }

    #[test]
    fn scalars_roundtrip() {
        roundtrip(Value::Null);
        roundtrip(Value::Bool(true));
        roundtrip(Value::Int(-42));
        roundtrip(Value::Float(3.5));
        roundtrip(Value::Text("hello".into()));
    }

    #[test]
    fn list_and_tuple_are_distinguished() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let tuple = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        assert_ne!(encode(&list), encode(&tuple));
        roundtrip(list);
        roundtrip(tuple);
    }

    #[test]
    fn nested_tuple_in_list_roundtrips() {
        let v = Value::List(vec![
            Value::Tuple(vec![Value::Int(1), Value::Text("a".into())]),
            Value::Tuple(vec![Value::Int(2), Value::Text("b".into())]),
        ]);
        roundtrip(v);
    }

    #[test]
    fn map_with_tuple_key_roundtrips() {
        let key = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        let v = Value::Map(vec![(key, Value::Text("edge".into()))]);
        roundtrip(v);
    }

    #[test]
    fn map_with_scalar_key_roundtrips() {
        let v = Value::Map(vec![
            (Value::Int(7), Value::Text("seven".into())),
            (Value::Null, Value::Bool(false)),
        ]);
        roundtrip(v);
    }

    #[test]
    fn array_without_discriminator_is_an_error() {
        assert!(decode("[1,2,3]").is_err());
    }

    #[test]
    fn unknown_discriminator_is_an_error() {
        assert!(decode(r#"["set",1,2]"#).is_err());
    }

    #[test]
    fn is_valid_key_rejects_lists_and_maps() {
        assert!(Value::Int(1).is_valid_key());
        assert!(Value::Tuple(vec![Value::Int(1)]).is_valid_key());
        assert!(!Value::List(vec![Value::Int(1)]).is_valid_key());
        assert!(!Value::Map(vec![]).is_valid_key());
    }
}
