// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The document data model: owned field values and the field mapping itself.
//!
//! A [`Document`] is a flat-by-default mapping from field names to
//! [`FieldValue`]s. Values can nest (arrays and maps), but the merge rule in
//! [`crate::rule`] only ever looks at top-level fields.
//!
//! There is deliberately no `Null` variant: a field that carries no value is a
//! field that is *absent*. Conflating "missing" with a present sentinel is how
//! counters end up subtly wrong, so absence is always expressed through
//! [`Document::get`] returning `None`.

use crate::{DocRandomState, create_map};
use std::collections::HashMap;

/// An owned value held by a single document field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum FieldValue {
    Bool(bool),
    I64(i64),
    U64(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<FieldValue>),
    Map(Document),
}

impl FieldValue {
    /// Returns the integer view of this value, if it has one.
    ///
    /// `U64` values larger than `i64::MAX` have no integer view.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::I64(v) => Some(*v),
            FieldValue::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the string slice held by this value, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the nested document held by this value, if it is a map.
    pub fn as_map(&self) -> Option<&Document> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Gives a short name to describe the kind of value held.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::I64(_) => "i64",
            FieldValue::U64(_) => "u64",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
        }
    }
}

macro_rules! impl_from {
    ($t:ty => $variant:ident) => {
        impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::$variant(v.into())
            }
        }
    };
}
impl_from!(bool => Bool);
impl_from!(i64 => I64);
impl_from!(u64 => U64);
impl_from!(f64 => Double);
impl_from!(String => String);
impl_from!(&str => String);
impl_from!(Vec<u8> => Bytes);
impl_from!(Vec<FieldValue> => Array);
impl_from!(Document => Map);
// i32 because it's the "default" inference integer type
impl_from!(i32 => I64);

macro_rules! impl_partial_eq_int {
    ({$($t:ty),+}) => {
        $(impl PartialEq<$t> for FieldValue {
            fn eq(&self, other: &$t) -> bool {
                self.as_i64() == i64::try_from(*other).ok()
            }
        })+
    };
}
impl_partial_eq_int!({i8, i16, i32, i64, u8, u16, u32, u64});

impl PartialEq<str> for FieldValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<bool> for FieldValue {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, FieldValue::Bool(v) if v == other)
    }
}

impl PartialEq<f64> for FieldValue {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, FieldValue::Double(v) if v == other)
    }
}

/// A single stored record: a mapping from field name to [`FieldValue`].
///
/// Keyed externally by the host store; the key never appears inside the
/// document itself. The mapping is unordered.
///
/// ```rust
/// use likedelta::{Document, FieldValue};
///
/// let mut doc = Document::new();
/// doc.insert("text", "hello sky");
/// doc.insert("likes", 7);
///
/// assert_eq!(doc.get("likes"), Some(&FieldValue::I64(7)));
/// assert_eq!(doc.take("likes"), Some(FieldValue::I64(7)));
/// assert_eq!(doc.take("likes"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    fields: HashMap<String, FieldValue, DocRandomState>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            fields: create_map(),
        }
    }

    /// Returns the value of the given field, or `None` if it is absent.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns whether the given field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes the given field and returns its value, or `None` if it was
    /// absent.
    ///
    /// This is the explicit pop-if-present operation the update path is built
    /// on: the caller learns in one step both whether the field existed and
    /// what it held, and the field is guaranteed gone afterwards.
    pub fn take(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the document has no fields at all.
    ///
    /// Note that an empty document is still a document; it is not a deletion
    /// marker (see [`crate::MergeOutcome`]).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the fields in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(String, FieldValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.fields.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
