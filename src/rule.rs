// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The like-delta merge rule and its outcome type.
//!
//! This is the rule a host document store runs once per write attempt, after
//! merging the request's context into the target document state. It is a pure,
//! synchronous, total function: for every shape-correct document it yields an
//! outcome, and it never raises an error.
//!
//! The decision table is small:
//!
//! | context | `text` | outcome |
//! |---------|--------|---------|
//! | absent  | any    | persist unchanged |
//! | present | absent | delete (a bare delta never creates a document) |
//! | present | present| persist with `likes ← (likes or 0) + addlikes` |
//!
//! The `context` field itself never survives into the output.

use crate::{Document, FieldValue};

/// The field whose presence decides whether a document genuinely exists.
pub const TEXT_FIELD: &str = "text";

/// The counter field adjusted by like-delta writes.
pub const LIKES_FIELD: &str = "likes";

/// What the host store must do with the write after the rule has run.
///
/// Deletion is a tagged variant rather than a designated "empty" document
/// value, so a legitimately empty document and a tombstone can never be
/// confused for one another.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Persist this document as the new state at the write's key.
    Persist(Document),
    /// Delete the document at the write's key, or refrain from creating it.
    Delete,
}

impl MergeOutcome {
    /// Returns whether this outcome instructs the host to delete.
    pub fn is_delete(&self) -> bool {
        matches!(self, MergeOutcome::Delete)
    }

    /// Returns the document to persist, if any.
    pub fn document(&self) -> Option<&Document> {
        match self {
            MergeOutcome::Persist(doc) => Some(doc),
            MergeOutcome::Delete => None,
        }
    }

    /// Consumes the outcome, returning the document to persist, if any.
    pub fn into_document(self) -> Option<Document> {
        match self {
            MergeOutcome::Persist(doc) => Some(doc),
            MergeOutcome::Delete => None,
        }
    }
}

/// A per-write mutation rule on a document store's update path.
///
/// This is the seam the host calls through. The host contract has three parts:
/// the rule is invoked exactly once per write attempt; the input is the
/// target's current (or default-empty) state with the request context merged
/// in under `context`; and the returned [`MergeOutcome`] is binding. Ordering
/// of concurrent writes to one key is the host's responsibility, not the
/// rule's.
pub trait MergeRule {
    /// Runs the rule against one proposed document.
    fn apply(&self, doc: Document) -> MergeOutcome;
}

/// The one rule this crate defines: `addlikes` layered onto an
/// optional-context update mechanism.
///
/// See the [module docs](self) for the decision table and
/// [`Document::take_context`] for how the context is consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LikeDeltaRule;

impl MergeRule for LikeDeltaRule {
    fn apply(&self, mut doc: Document) -> MergeOutcome {
        // Strip the context first, unconditionally. Everything below this
        // point operates on a document that could be persisted as-is.
        let Some(context) = doc.take_context() else {
            // Ordinary write, no like-delta semantics.
            return MergeOutcome::Persist(doc);
        };

        if !doc.contains(TEXT_FIELD) {
            // The document never genuinely existed: the only legitimate prior
            // operations on it were like-deltas, and those cannot create a
            // document. Tombstone instead of materializing a counter-only doc.
            return MergeOutcome::Delete;
        }

        let likes = doc
            .get(LIKES_FIELD)
            .and_then(FieldValue::as_i64)
            .unwrap_or(0);
        // Totals are not clamped at zero; saturate only at the i64 edges so
        // the rule stays total.
        doc.insert(LIKES_FIELD, likes.saturating_add(context.addlikes));
        MergeOutcome::Persist(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Context, context::CONTEXT_FIELD, document};

    #[test]
    fn no_context_passes_through() {
        let doc = document! { "text" => "post", "likes" => 7, "lang" => "en" };
        assert_eq!(
            LikeDeltaRule.apply(doc.clone()),
            MergeOutcome::Persist(doc)
        );
    }

    #[test]
    fn empty_context_without_text_deletes() {
        let doc = document! { "context" => document! {} };
        assert_eq!(LikeDeltaRule.apply(doc), MergeOutcome::Delete);
    }

    #[test]
    fn delta_without_text_deletes_regardless_of_amount() {
        for delta in [5, -5, 0, i64::MAX] {
            let doc = Context::new(delta).attach(document! { "likes" => 3 });
            assert_eq!(LikeDeltaRule.apply(doc), MergeOutcome::Delete);
        }
    }

    #[test]
    fn first_delta_initializes_likes_from_zero() {
        let doc = Context::new(3).attach(document! { "text" => "post" });
        let doc = LikeDeltaRule.apply(doc).into_document().unwrap();
        assert_eq!(doc.get("likes"), Some(&FieldValue::I64(3)));
        assert!(!doc.contains(CONTEXT_FIELD));
    }

    #[test]
    fn negative_delta_decrements() {
        let doc = Context::new(-2).attach(document! { "text" => "post", "likes" => 7 });
        let doc = LikeDeltaRule.apply(doc).into_document().unwrap();
        assert_eq!(doc.get("likes"), Some(&FieldValue::I64(5)));
    }

    #[test]
    fn negative_totals_are_not_clamped() {
        let doc = Context::new(-4).attach(document! { "text" => "post" });
        let doc = LikeDeltaRule.apply(doc).into_document().unwrap();
        assert_eq!(doc.get("likes"), Some(&FieldValue::I64(-4)));
    }

    #[test]
    fn untouched_fields_survive() {
        let doc = Context::new(1).attach(
            document! { "text" => "post", "lang" => "en", "tags" => vec![FieldValue::from("sky")] },
        );
        let doc = LikeDeltaRule.apply(doc).into_document().unwrap();
        assert_eq!(doc.get("lang"), Some(&FieldValue::String("en".into())));
        assert!(doc.contains("tags"));
        assert_eq!(doc.get("likes"), Some(&FieldValue::I64(1)));
    }

    #[test]
    fn u64_likes_get_an_integer_view() {
        let mut base = document! { "text" => "post" };
        base.insert("likes", 7u64);
        let doc = LikeDeltaRule.apply(Context::new(-2).attach(base));
        let doc = doc.into_document().unwrap();
        assert_eq!(doc.get("likes"), Some(&FieldValue::I64(5)));
    }

    #[test]
    fn totals_saturate_at_the_edges() {
        let doc = Context::new(i64::MAX).attach(document! { "text" => "post", "likes" => 2 });
        let doc = LikeDeltaRule.apply(doc).into_document().unwrap();
        assert_eq!(doc.get("likes"), Some(&FieldValue::I64(i64::MAX)));
    }

    // Strips any attached context so a document can serve as the "ordinary
    // write" case.
    fn without_context(mut doc: Document) -> Document {
        doc.take(CONTEXT_FIELD);
        doc
    }

    #[quickcheck]
    fn prop_no_context_is_identity(doc: Document) -> bool {
        let doc = without_context(doc);
        LikeDeltaRule.apply(doc.clone()) == MergeOutcome::Persist(doc)
    }

    #[quickcheck]
    fn prop_context_never_survives(doc: Document, delta: i64) -> bool {
        match LikeDeltaRule.apply(Context::new(delta).attach(doc)) {
            MergeOutcome::Persist(doc) => !doc.contains(CONTEXT_FIELD),
            MergeOutcome::Delete => true,
        }
    }

    #[quickcheck]
    fn prop_rule_is_idempotent_on_its_own_output(doc: Document) -> bool {
        match LikeDeltaRule.apply(doc) {
            MergeOutcome::Persist(out) => {
                LikeDeltaRule.apply(out.clone()) == MergeOutcome::Persist(out)
            }
            MergeOutcome::Delete => true,
        }
    }

    #[quickcheck]
    fn prop_bare_delta_never_creates(doc: Document, delta: i64) -> bool {
        let mut doc = doc;
        doc.take(TEXT_FIELD);
        LikeDeltaRule.apply(Context::new(delta).attach(doc)).is_delete()
    }

    #[quickcheck]
    fn prop_delta_adds_exactly(likes: i32, delta: i32) -> bool {
        let doc = Context::new(i64::from(delta))
            .attach(document! { "text" => "post", "likes" => i64::from(likes) });
        match LikeDeltaRule.apply(doc) {
            MergeOutcome::Persist(doc) => {
                doc.get(LIKES_FIELD) == Some(&FieldValue::I64(i64::from(likes) + i64::from(delta)))
            }
            MergeOutcome::Delete => false,
        }
    }

    #[quickcheck]
    fn prop_only_likes_is_touched(doc: Document, delta: i64) -> bool {
        let mut base = without_context(doc);
        base.insert(TEXT_FIELD, "post");
        let out = LikeDeltaRule.apply(Context::new(delta).attach(base.clone()));
        let Some(out) = out.into_document() else {
            return false;
        };
        base.take(LIKES_FIELD);
        let mut out = out;
        out.take(LIKES_FIELD);
        out == base
    }
}
