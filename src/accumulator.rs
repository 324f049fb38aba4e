// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Producer-side coalescing of individual like events.
//!
//! A firehose of like events tends to hit the same documents over and over. A
//! [`LikeAccumulator`] nets those events out before any write is issued: each
//! pending document sits in the bucket of its current net delta, and a burst
//! of events against one document ends up as a single like-delta write. A
//! document whose net returns to zero drops out entirely and produces no
//! write at all.
//!
//! Draining yields one [`DeltaBatch`] per distinct net delta, carrying the
//! affected document keys and the ready-made [`Context`] payload. How batches
//! are delivered (and how writes are serialized per key) is the transport's
//! and host's business.

use crate::{Context, DocRandomState, create_set};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashSet};

/// Coalesces per-document like events into net deltas.
///
/// ```rust
/// use likedelta::LikeAccumulator;
///
/// let mut acc = LikeAccumulator::default();
/// acc.increase("3l3pte3p2e325");
/// acc.increase("3l3pte3p2e325");
/// acc.decrease("3l3pte3p2e325");
///
/// let batches = acc.drain();
/// assert_eq!(batches.len(), 1);
/// assert_eq!(batches[0].context.addlikes, 1);
/// ```
#[derive(Debug, Default)]
pub struct LikeAccumulator {
    // Net delta -> keys currently at that net. A key lives in at most one
    // bucket; net zero means not tracked at all.
    buckets: BTreeMap<i64, HashSet<String, DocRandomState>>,
}

impl LikeAccumulator {
    /// Records one like on the given document.
    pub fn increase(&mut self, key: impl Into<String>) {
        self.record(key, 1);
    }

    /// Records one unlike on the given document.
    pub fn decrease(&mut self, key: impl Into<String>) {
        self.record(key, -1);
    }

    /// Adjusts the pending net delta for the given document by `delta`.
    pub fn record(&mut self, key: impl Into<String>, delta: i64) {
        let key = key.into();
        let net = match self.take_key(&key) {
            Some(current) => current.saturating_add(delta),
            None => delta,
        };
        if net != 0 {
            self.buckets
                .entry(net)
                .or_insert_with(create_set)
                .insert(key);
        }
    }

    // Removes `key` from whichever bucket holds it, returning that bucket's
    // delta. Empty buckets are dropped so they don't batch as no-ops later.
    fn take_key(&mut self, key: &str) -> Option<i64> {
        let net = self
            .buckets
            .iter()
            .find_map(|(&net, keys)| keys.contains(key).then_some(net))?;
        let keys = self.buckets.get_mut(&net).expect("bucket was just found");
        keys.remove(key);
        if keys.is_empty() {
            self.buckets.remove(&net);
        }
        Some(net)
    }

    /// Returns the number of documents with a nonzero pending delta.
    pub fn pending(&self) -> usize {
        self.buckets.values().map(HashSet::len).sum()
    }

    /// Returns whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Empties the accumulator, yielding one batch per distinct net delta in
    /// ascending delta order.
    pub fn drain(&mut self) -> Vec<DeltaBatch> {
        std::mem::take(&mut self.buckets)
            .into_iter()
            .map(|(net, keys)| DeltaBatch {
                keys: keys.into_iter().collect(),
                context: Context::new(net),
            })
            .collect()
    }
}

/// A group of documents sharing one pending net delta.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub struct DeltaBatch {
    /// The keys of the affected documents, in arbitrary order.
    pub keys: SmallVec<[String; 4]>,
    /// The context payload to attach to each document's proposed write.
    pub context: Context,
}
