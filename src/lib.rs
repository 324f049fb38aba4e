// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # likedelta: A Like-Delta Merge Rule for Document Stores
//!
//! This crate implements the mutation rule a document store runs on its update
//! path when an incoming write carries a **like-count delta** instead of (or in
//! addition to) a full document body. The rule decides, per write, whether the
//! store should persist a mutated document or drop the document entirely.
//!
//! The write protocol is deliberately small. A *proposed document* is an
//! ordinary field mapping ([`Document`]) that may carry one transient
//! side-channel field, `context`, holding the operation payload
//! (`{ addlikes: <integer> }`, see [`Context`]). The rule consumes the context
//! and produces a [`MergeOutcome`]:
//!
//! - **No context**: the write is an ordinary document write. It passes through
//!   untouched.
//! - **Context, but no `text` field**: the document does not genuinely exist
//!   yet. A bare like-delta can never create a document, so the outcome is
//!   [`MergeOutcome::Delete`] and the store must not materialize anything at
//!   that key.
//! - **Context and `text`**: `likes` (defaulting to 0 when absent) is adjusted
//!   by `addlikes` and the document is persisted.
//!
//! In every case the `context` field is stripped before anything else happens;
//! it is control metadata and never reaches storage.
//!
//! ## Example
//!
//! ```rust
//! use likedelta::{Context, FieldValue, LikeDeltaRule, MergeOutcome, MergeRule, document};
//!
//! // A stored post with 7 likes, about to receive a -2 delta.
//! let stored = document! { "text" => "hello sky", "likes" => 7 };
//! let proposed = Context::new(-2).attach(stored);
//!
//! let MergeOutcome::Persist(doc) = LikeDeltaRule.apply(proposed) else {
//!     panic!("existing post must survive a delta");
//! };
//! assert_eq!(doc.get("likes"), Some(&FieldValue::I64(5)));
//! assert!(!doc.contains("context"));
//!
//! // A delta aimed at a post that was never written: tombstone, not creation.
//! let orphan = Context::new(5).attach(document! {});
//! assert!(LikeDeltaRule.apply(orphan).is_delete());
//! ```
//!
//! ## Deletion is a tagged outcome, not an empty document
//!
//! Some stores signal "delete this key" by writing an empty body. That
//! representation conflates a legitimately empty document with a tombstone, so
//! this crate keeps the two apart: [`MergeOutcome::Delete`] is its own variant
//! and an empty [`Document`] is just a document with no fields.
//!
//! ## Scope of this Crate
//!
//! The rule is a pure, synchronous, total function: no I/O, no internal state,
//! and no operation that can fail on shape-correct input. Everything around it
//! belongs to the host store:
//!
//! - **Invocation**: the host calls the rule exactly once per write attempt,
//!   with the request's context merged in under the `context` field (see
//!   [`Context::attach`]).
//! - **Persistence**: on [`MergeOutcome::Persist`] the host stores the returned
//!   document; on [`MergeOutcome::Delete`] it deletes (or refrains from
//!   creating) the key.
//! - **Concurrency**: the rule assumes the host hands it a single, already
//!   serialized view of the prior document state. Making the read-modify-write
//!   atomic across writers is the host's job.
//! - **Validation**: the rule assumes shape-correct input. Hosts that accept
//!   untrusted payloads can reject malformed contexts up front with
//!   [`Context::from_field`].
//!
//! Producers that observe many individual like events can coalesce them with a
//! [`LikeAccumulator`] before issuing writes, so that a burst of likes on one
//! document becomes a single delta.
//!
//! ## Features
//!
//! - `json`: Conversions between the document model and `serde_json::Value`.
//!   Enabled by default.
//! - `serde`: `serde` support for [`Document`], [`FieldValue`], and
//!   [`Context`].
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for the document model,
//!   useful for property-based testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

use ahash::RandomState;
use std::{
    hash::BuildHasher,
    sync::atomic::{AtomicBool, Ordering},
};

// Use a constant seed for hashing so tests can observe reproducible iteration.
pub(crate) const DETERMINISTIC_HASHER: RandomState = RandomState::with_seeds(48, 1516, 23, 42);

pub mod accumulator;
pub use accumulator::{DeltaBatch, LikeAccumulator};
pub mod context;
pub use context::{Context, MalformedContext};
pub mod document;
pub use document::{Document, FieldValue};
#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::FromJsonError;
/// Macros usable for tests and initialization
pub mod macros;
pub mod rule;
pub use rule::{LikeDeltaRule, MergeOutcome, MergeRule};
#[cfg(any(test, feature = "arbitrary"))]
pub mod test_util;

static ENABLE_DETERMINISM: AtomicBool = AtomicBool::new(false);

/// Makes all data structures behave deterministically.
///
/// This should only be enabled for testing, as it increases the odds of DoS
/// scenarios.
#[doc(hidden)]
pub fn enable_determinism() {
    ENABLE_DETERMINISM.store(true, Ordering::Release);
}

/// Checks if determinism is enabled.
///
/// Should be used internally and for testing.
#[doc(hidden)]
pub fn determinism_enabled() -> bool {
    ENABLE_DETERMINISM.load(Ordering::Acquire)
}

/// Create a random state for a hashmap.
/// If `enable_determinism` has been used, this will return a deterministic
/// decidedly non-random RandomState, useful in tests.
#[inline]
fn make_random_state() -> RandomState {
    if determinism_enabled() {
        DETERMINISTIC_HASHER
    } else {
        RandomState::new()
    }
}

fn create_map<K, V>() -> std::collections::HashMap<K, V, DocRandomState> {
    std::collections::HashMap::with_hasher(DocRandomState::default())
}

fn create_set<T>() -> std::collections::HashSet<T, DocRandomState> {
    std::collections::HashSet::with_hasher(DocRandomState::default())
}

/// This is a small wrapper around the standard RandomState.
/// This allows us to easily switch to a non-random RandomState for use in tests.
#[derive(Clone)]
pub struct DocRandomState {
    inner: RandomState,
}

// Implement default, falling back on regular ahash::RandomState except
// when 'enable_determinism' has been called, in which case a static
// only-for-test RandomState is used.
impl Default for DocRandomState {
    #[inline]
    fn default() -> Self {
        Self {
            inner: make_random_state(),
        }
    }
}

// We implement BuildHasher for DocRandomState, but all we do is delegate to
// the wrapped 'inner' RandomState.
//
// Since DocRandomState implements default, the user doesn't have to do anything
// more than specialize their hashmap using DocRandomState instead of RandomState.
impl BuildHasher for DocRandomState {
    type Hasher = <RandomState as BuildHasher>::Hasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        self.inner.build_hasher()
    }
}
