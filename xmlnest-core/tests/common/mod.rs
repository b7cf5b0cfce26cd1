//! Shared helpers for xmlnest integration tests
//!
//! Tree constructors for expected values, plus proptest generators.

#![allow(dead_code)]

mod generators;

pub use generators::{arbitrary_events, doc, Doc};

use xmlnest_core::{Attributes, Object, TreeNode, TreeValue};

pub fn leaf(text: &str) -> TreeValue {
    TreeValue::Leaf(text.to_string())
}

pub fn attrs(pairs: &[(&str, &str)]) -> TreeValue {
    TreeValue::AttrMap(attr_map(pairs))
}

pub fn attr_map(pairs: &[(&str, &str)]) -> Attributes {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Object from entries; a repeated key becomes a sequence.
pub fn object(entries: Vec<(&str, TreeValue)>) -> TreeValue {
    let mut obj = Object::new();
    for (key, value) in entries {
        obj.insert(key, value);
    }
    TreeValue::Object(obj)
}

/// Built documents are an object holding only the root.
pub fn document(root: &str, value: TreeValue) -> TreeValue {
    object(vec![(root, value)])
}

/// The value under the single root key.
pub fn root(tree: &TreeValue) -> &TreeValue {
    let obj = tree.as_object().expect("document is an object");
    assert_eq!(obj.len(), 1, "document has exactly one root");
    let (_, node) = obj.iter().next().unwrap();
    match node {
        TreeNode::Value(value) => value,
        TreeNode::Sequence(_) => panic!("root collapsed into a sequence"),
    }
}
