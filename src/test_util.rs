// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! `quickcheck::Arbitrary` impls for the document model.
//!
//! Generated documents are shallow: nested arrays and maps hold only leaf
//! values, which is all the merge rule can observe anyway (it never descends
//! past the top level). Field names are drawn from a small pool so that the
//! interesting ones (`text`, `likes`, `context`) actually come up.

use crate::{Context, Document, FieldValue};
use quickcheck::{Arbitrary, Gen};

const FIELD_POOL: &[&str] = &[
    "text", "likes", "context", "lang", "tags", "link", "createdAtTimestamp",
];

fn leaf(g: &mut Gen) -> FieldValue {
    match g.choose(&[0u8, 1, 2, 3, 4, 5]).copied().unwrap_or(0) {
        0 => FieldValue::Bool(bool::arbitrary(g)),
        1 => FieldValue::I64(i64::arbitrary(g)),
        2 => FieldValue::U64(u64::arbitrary(g)),
        3 => {
            // NaN would make a document unequal to itself.
            let v = f64::arbitrary(g);
            FieldValue::Double(if v.is_nan() { 0.0 } else { v })
        }
        4 => FieldValue::String(String::arbitrary(g)),
        _ => FieldValue::Bytes(Vec::arbitrary(g)),
    }
}

impl Arbitrary for FieldValue {
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0u8, 0, 0, 0, 0, 0, 1, 2]).copied().unwrap_or(0) {
            1 => FieldValue::Array((0..g.size() % 4).map(|_| leaf(g)).collect()),
            2 => {
                let mut doc = Document::new();
                for _ in 0..g.size() % 4 {
                    doc.insert(String::arbitrary(g), leaf(g));
                }
                FieldValue::Map(doc)
            }
            _ => leaf(g),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            FieldValue::I64(v) => Box::new(v.shrink().map(FieldValue::I64)),
            FieldValue::U64(v) => Box::new(v.shrink().map(FieldValue::U64)),
            FieldValue::String(v) => Box::new(v.shrink().map(FieldValue::String)),
            FieldValue::Bytes(v) => Box::new(v.shrink().map(FieldValue::Bytes)),
            FieldValue::Array(v) => Box::new(v.shrink().map(FieldValue::Array)),
            _ => quickcheck::empty_shrinker(),
        }
    }
}

impl Arbitrary for Document {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut doc = Document::new();
        for _ in 0..g.size() % 8 {
            let field = g.choose(FIELD_POOL).copied().unwrap_or("text");
            doc.insert(field, FieldValue::arbitrary(g));
        }
        doc
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let fields: Vec<(String, FieldValue)> = self.clone().into_iter().collect();
        Box::new(fields.shrink().map(|fields| fields.into_iter().collect()))
    }
}

impl Arbitrary for Context {
    fn arbitrary(g: &mut Gen) -> Self {
        Context::new(i64::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.addlikes.shrink().map(Context::new))
    }
}
