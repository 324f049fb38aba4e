// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The transient per-write side channel.
//!
//! A write request may attach operation instructions to its proposed document
//! under the [`CONTEXT_FIELD`] key. The context is control metadata, not
//! content: it exists for the duration of one rule invocation, is stripped
//! from the document as the very first step, and is never persisted.
//!
//! Exactly one instruction is recognized: [`ADDLIKES_FIELD`], a signed integer
//! delta to apply to the document's `likes` counter. Anything else riding in
//! the context object is dropped along with it.

use crate::{Document, FieldValue};
use std::fmt;

/// The document field under which a write request's context travels.
pub const CONTEXT_FIELD: &str = "context";

/// The one context key this crate recognizes: the signed like-count delta.
pub const ADDLIKES_FIELD: &str = "addlikes";

/// The payload of a like-delta write: `{ addlikes: <integer> }`.
///
/// A `Context` only ever exists on its way into a single rule invocation. The
/// producer side builds one (directly, or via
/// [`LikeAccumulator`](crate::LikeAccumulator)) and installs it on the
/// proposed document with [`Context::attach`]; the rule consumes it with
/// [`Document::take_context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub struct Context {
    /// The signed delta to apply to `likes`.
    pub addlikes: i64,
}

impl Context {
    /// Creates a context carrying the given delta.
    pub fn new(addlikes: i64) -> Self {
        Self { addlikes }
    }

    /// Installs this context on a proposed document, producing the shape the
    /// host hands to the merge rule.
    ///
    /// Any context already present on `doc` is replaced.
    pub fn attach(self, mut doc: Document) -> Document {
        doc.insert(CONTEXT_FIELD, FieldValue::Map(self.into()));
        doc
    }

    /// Strictly parses a context payload, for hosts that validate untrusted
    /// writes before they reach the update path.
    ///
    /// The merge rule itself never calls this: it is total and coerces instead
    /// (see [`Document::take_context`]).
    pub fn from_field(value: FieldValue) -> Result<Self, MalformedContext> {
        let mut map = match value {
            FieldValue::Map(map) => map,
            other => return Err(MalformedContext::NotAMap(other.type_name())),
        };
        let addlikes = match map.take(ADDLIKES_FIELD) {
            None => 0,
            Some(v) => v
                .as_i64()
                .ok_or(MalformedContext::NonIntegerDelta(v.type_name()))?,
        };
        Ok(Self { addlikes })
    }
}

impl From<Context> for Document {
    fn from(context: Context) -> Self {
        let mut doc = Document::new();
        doc.insert(ADDLIKES_FIELD, context.addlikes);
        doc
    }
}

impl Document {
    /// Extracts and removes the context from this document.
    ///
    /// This is a destructive read: whatever the outcome, the document no
    /// longer carries a [`CONTEXT_FIELD`] afterwards, and subsequent logic
    /// never sees it again. Returns `None` when no context was attached,
    /// marking the write as an ordinary document write.
    ///
    /// The extraction is lenient, keeping the merge rule total: a context that
    /// is not a map, or whose `addlikes` is missing or not an integer, yields
    /// a delta of 0. It still counts as a like-delta write. Unrecognized
    /// context keys are dropped with the context object.
    pub fn take_context(&mut self) -> Option<Context> {
        let context = self.take(CONTEXT_FIELD)?;
        let addlikes = match context {
            FieldValue::Map(mut map) => map
                .take(ADDLIKES_FIELD)
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
            _ => 0,
        };
        Some(Context { addlikes })
    }
}

/// A context payload that violates the producer-side contract.
///
/// Only ever produced by [`Context::from_field`]; the update path itself does
/// not raise errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedContext {
    /// The `context` field held something other than a mapping.
    NotAMap(&'static str),
    /// `addlikes` was present but had no integer view.
    NonIntegerDelta(&'static str),
}

impl fmt::Display for MalformedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedContext::NotAMap(found) => {
                write!(f, "context must be a mapping, found {found}")
            }
            MalformedContext::NonIntegerDelta(found) => {
                write!(f, "addlikes must be an integer, found {found}")
            }
        }
    }
}

impl std::error::Error for MalformedContext {}
