// (c) Copyright 2025 Helsing GmbH. All rights reserved.
/// Convenience macro for creating a [`Document`](crate::Document).
///
/// Values can be anything convertible into a
/// [`FieldValue`](crate::FieldValue), including another `document!` for nested
/// maps:
///
/// ```rust
/// use likedelta::document;
///
/// let doc = document! {
///     "text" => "hello sky",
///     "likes" => 7,
///     "context" => document! { "addlikes" => 1 },
/// };
/// assert_eq!(doc.len(), 3);
/// ```
#[macro_export]
macro_rules! document {
    () => {
        $crate::Document::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut doc = $crate::Document::new();
        $( doc.insert($field, $value); )+
        doc
    }};
}
