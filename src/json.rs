// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! JSON representation
//!
//! Documents convert losslessly *to* JSON objects; bytes render as a base64
//! string. The reverse direction is partial: JSON `null` has no counterpart in
//! the document model (absence is expressed by leaving the key out), so
//! conversion from JSON rejects nulls rather than invent a sentinel.

use crate::{Document, FieldValue};
use serde_json::Value;
use std::fmt;

/// Converts a [`FieldValue`] to a [`serde_json::Value`].
impl From<FieldValue> for Value {
    fn from(val: FieldValue) -> Self {
        match val {
            FieldValue::Bool(v) => v.into(),
            FieldValue::I64(v) => v.into(),
            FieldValue::U64(v) => v.into(),
            FieldValue::Double(v) => v.into(),
            FieldValue::String(v) => v.into(),
            FieldValue::Bytes(v) => {
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD, v).into()
            }
            FieldValue::Array(v) => Value::Array(v.into_iter().map(Into::into).collect()),
            FieldValue::Map(v) => v.into(),
        }
    }
}

/// Converts a [`Document`] to a [`serde_json::Value`] object.
impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        let obj = doc.into_iter().map(|(k, v)| (k, v.into())).collect();
        Value::Object(obj)
    }
}

/// A JSON value that cannot be represented in the document model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromJsonError {
    /// JSON `null` encountered; the document model expresses "no value" as an
    /// absent key, never as a present sentinel.
    Null,
    /// The top-level JSON value was not an object.
    NotAnObject,
}

impl fmt::Display for FromJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromJsonError::Null => write!(f, "JSON null has no document representation"),
            FromJsonError::NotAnObject => write!(f, "a document must be a JSON object"),
        }
    }
}

impl std::error::Error for FromJsonError {}

impl TryFrom<Value> for FieldValue {
    type Error = FromJsonError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Err(FromJsonError::Null),
            Value::Bool(v) => Ok(FieldValue::Bool(v)),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(FieldValue::I64(v))
                } else if let Some(v) = n.as_u64() {
                    Ok(FieldValue::U64(v))
                } else {
                    // Not i64 and not u64: must carry a fractional part.
                    Ok(FieldValue::Double(n.as_f64().expect("finite JSON number")))
                }
            }
            Value::String(v) => Ok(FieldValue::String(v)),
            Value::Array(v) => Ok(FieldValue::Array(
                v.into_iter()
                    .map(FieldValue::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            Value::Object(_) => Ok(FieldValue::Map(Document::try_from(value)?)),
        }
    }
}

impl TryFrom<Value> for Document {
    type Error = FromJsonError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(obj) = value else {
            return Err(FromJsonError::NotAnObject);
        };
        obj.into_iter()
            .map(|(k, v)| Ok((k, FieldValue::try_from(v)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use serde_json::json;

    #[test]
    fn document_renders_as_an_object() {
        let doc = document! {
            "text" => "hello",
            "likes" => 7,
            "tags" => vec![FieldValue::from("sky")],
        };
        assert_eq!(
            Value::from(doc),
            json!({ "text": "hello", "likes": 7, "tags": ["sky"] })
        );
    }

    #[test]
    fn bytes_render_as_base64() {
        let doc = document! { "cid" => b"\x00\x01".to_vec() };
        assert_eq!(Value::from(doc), json!({ "cid": "AAE=" }));
    }

    #[test]
    fn object_roundtrips() {
        let value = json!({ "text": "hi", "likes": -2, "nested": { "deep": true } });
        let doc = Document::try_from(value.clone()).unwrap();
        assert_eq!(Value::from(doc), value);
    }

    #[test]
    fn null_and_non_objects_are_rejected() {
        assert_eq!(
            Document::try_from(json!({ "likes": null })),
            Err(FromJsonError::Null)
        );
        assert_eq!(Document::try_from(json!([1, 2])), Err(FromJsonError::NotAnObject));
        assert_eq!(FieldValue::try_from(json!(null)), Err(FromJsonError::Null));
    }
}
