// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! End-to-end flow: a stream of like events is netted out by the accumulator,
//! turned into context payloads, and driven through the merge rule the way a
//! host store would.

use likedelta::{Document, LikeAccumulator, LikeDeltaRule, MergeOutcome, MergeRule, document};
use std::collections::HashMap;

fn flush(acc: &mut LikeAccumulator, docs: &mut HashMap<String, Document>) {
    for batch in acc.drain() {
        for key in &batch.keys {
            let current = docs.get(key).cloned().unwrap_or_default();
            match LikeDeltaRule.apply(batch.context.attach(current)) {
                MergeOutcome::Persist(doc) => {
                    docs.insert(key.clone(), doc);
                }
                MergeOutcome::Delete => {
                    docs.remove(key);
                }
            }
        }
    }
}

#[test]
fn a_burst_of_likes_becomes_one_delta_per_document() {
    let mut docs = HashMap::new();
    docs.insert("a".to_owned(), document! { "text" => "post a" });
    docs.insert("b".to_owned(), document! { "text" => "post b", "likes" => 10 });

    let mut acc = LikeAccumulator::default();
    for _ in 0..3 {
        acc.increase("a");
    }
    acc.increase("b");
    acc.decrease("b");
    acc.decrease("b");

    flush(&mut acc, &mut docs);

    assert_eq!(docs["a"].get("likes").unwrap().as_i64(), Some(3));
    assert_eq!(docs["b"].get("likes").unwrap().as_i64(), Some(9));
}

#[test]
fn likes_against_unknown_posts_never_materialize_documents() {
    let mut docs = HashMap::new();
    let mut acc = LikeAccumulator::default();
    acc.increase("ghost");
    acc.increase("ghost");
    flush(&mut acc, &mut docs);
    assert!(docs.is_empty());
}

#[test]
fn cancelled_events_produce_no_write_at_all() {
    let mut docs = HashMap::new();
    docs.insert("a".to_owned(), document! { "text" => "post a" });

    let mut acc = LikeAccumulator::default();
    acc.increase("a");
    acc.decrease("a");
    flush(&mut acc, &mut docs);

    // Not even a likes=0 field appears: no write means no mutation.
    assert!(!docs["a"].contains("likes"));
}

#[test]
fn repeated_flushes_are_independent() {
    let mut docs = HashMap::new();
    docs.insert("a".to_owned(), document! { "text" => "post a" });

    let mut acc = LikeAccumulator::default();
    acc.increase("a");
    flush(&mut acc, &mut docs);
    acc.increase("a");
    flush(&mut acc, &mut docs);

    assert_eq!(docs["a"].get("likes"), Some(&likedelta::FieldValue::I64(2)));
}
