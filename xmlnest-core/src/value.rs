//! Tree value types produced by the builder.
//!
//! A built document is loosely shaped: a key may hold text, an attribute
//! map, a nested object, or - once a sibling tag repeats - a sequence of
//! those. The shape is explicit here so every consumer has to match on it.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::event::Attributes;

/// A single element's value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TreeValue {
    /// Scalar text content.
    Leaf(String),
    /// Element with attributes and no element children.
    AttrMap(Attributes),
    /// Element with named child elements.
    Object(Object),
}

/// What an [`Object`] stores under one tag name.
///
/// `Sequence` holds values, not nodes, so sequences never nest directly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TreeNode {
    /// The tag occurred once under its parent.
    Value(TreeValue),
    /// The tag occurred more than once, in document order.
    Sequence(Vec<TreeValue>),
}

/// Named children of an element, in first-occurrence order.
///
/// Character data found between children is kept positionally in
/// `text`, outside the keyed entries.
///
/// When the element also had attributes they occupy the leading entries,
/// and `attributes` counts them. Equality ignores that count: an
/// attribute and a child element with the same text compare equal.
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: IndexMap<String, TreeNode>,
    text: Vec<String>,
    attributes: usize,
}

// ============================================================================
// TreeValue
// ============================================================================

impl TreeValue {
    /// Get text if this is a leaf.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TreeValue::Leaf(s) => Some(s),
            _ => None,
        }
    }

    /// Get the attribute map if this is an attribute-only element.
    #[inline]
    pub fn as_attrs(&self) -> Option<&Attributes> {
        match self {
            TreeValue::AttrMap(attrs) => Some(attrs),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            TreeValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a child element by tag name.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.as_object()?.get(key)
    }

    /// Look up a string field by name.
    ///
    /// Works on both attribute maps and objects, because an element's
    /// attributes land in an `AttrMap` or an `Object` depending on whether
    /// it also has children. For objects only a single leaf matches.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            TreeValue::Leaf(_) => None,
            TreeValue::AttrMap(attrs) => attrs.get(key).map(String::as_str),
            TreeValue::Object(obj) => obj.get(key)?.single()?.as_text(),
        }
    }

    /// Follow a `/`-separated path of tag names.
    ///
    /// A numeric segment indexes into the node reached so far; a
    /// non-numeric segment on a sequence looks into its first item. An
    /// empty path returns `self`.
    ///
    /// ```
    /// use xmlnest_core::{build, ParseEvent};
    ///
    /// let events = [
    ///     ParseEvent::open("result"),
    ///     ParseEvent::complete("imei").with_value("111"),
    ///     ParseEvent::complete("imei").with_value("222"),
    ///     ParseEvent::close("result"),
    /// ];
    /// let tree = build(&events).unwrap();
    /// let second = tree.pointer("/result/imei/1").unwrap();
    /// assert_eq!(second.as_text(), Some("222"));
    /// ```
    pub fn pointer(&self, path: &str) -> Option<&TreeValue> {
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        let mut current = self;

        while let Some(segment) = segments.next() {
            let node = current.get(segment)?;
            current = match segments.peek().and_then(|s| s.parse::<usize>().ok()) {
                Some(index) => {
                    segments.next();
                    node.items().get(index)?
                }
                None => node.items().first()?,
            };
        }

        Some(current)
    }

    /// Concatenate all text under this value, in tree order.
    ///
    /// Attribute values are not text and are skipped.
    pub fn all_text(&self) -> String {
        let mut result = String::new();
        self.collect_text(&mut result);
        result
    }

    fn collect_text(&self, buf: &mut String) {
        match self {
            TreeValue::Leaf(s) => buf.push_str(s),
            TreeValue::AttrMap(_) => {}
            TreeValue::Object(obj) => {
                for fragment in &obj.text {
                    buf.push_str(fragment);
                }
                for (_, value) in obj.elements() {
                    value.collect_text(buf);
                }
            }
        }
    }
}

impl From<String> for TreeValue {
    fn from(text: String) -> Self {
        TreeValue::Leaf(text)
    }
}

impl From<&str> for TreeValue {
    fn from(text: &str) -> Self {
        TreeValue::Leaf(text.to_owned())
    }
}

impl From<Attributes> for TreeValue {
    fn from(attrs: Attributes) -> Self {
        TreeValue::AttrMap(attrs)
    }
}

impl From<Object> for TreeValue {
    fn from(obj: Object) -> Self {
        TreeValue::Object(obj)
    }
}

// ============================================================================
// TreeNode
// ============================================================================

impl TreeNode {
    /// All values under this key: one for a single occurrence, every
    /// occurrence for a sequence.
    #[inline]
    pub fn items(&self) -> &[TreeValue] {
        match self {
            TreeNode::Value(value) => std::slice::from_ref(value),
            TreeNode::Sequence(items) => items,
        }
    }

    /// The value if the tag occurred exactly once.
    #[inline]
    pub fn single(&self) -> Option<&TreeValue> {
        match self {
            TreeNode::Value(value) => Some(value),
            TreeNode::Sequence(_) => None,
        }
    }

    #[inline]
    pub fn is_sequence(&self) -> bool {
        matches!(self, TreeNode::Sequence(_))
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Always false for built trees; a sequence holds at least two items.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Add another occurrence, promoting a single value to a sequence.
    pub(crate) fn push(&mut self, value: TreeValue) {
        match self {
            TreeNode::Sequence(items) => items.push(value),
            TreeNode::Value(_) => {
                let TreeNode::Value(prior) = std::mem::replace(self, TreeNode::Sequence(Vec::new()))
                else {
                    unreachable!()
                };
                *self = TreeNode::Sequence(vec![prior, value]);
            }
        }
    }
}

impl From<TreeValue> for TreeNode {
    fn from(value: TreeValue) -> Self {
        TreeNode::Value(value)
    }
}

// ============================================================================
// Object
// ============================================================================

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a child under `name`, applying sequence promotion.
    ///
    /// The first occurrence is stored bare. A second occurrence converts the
    /// entry in place into a sequence of both, and later occurrences append.
    pub fn insert(&mut self, name: impl Into<String>, value: TreeValue) {
        match self.entries.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(TreeNode::Value(value));
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(value),
        }
    }

    /// Record an attribute of the element as a leading leaf entry.
    ///
    /// Must be called before any child is inserted.
    pub(crate) fn insert_attribute(&mut self, name: impl Into<String>, value: String) {
        debug_assert_eq!(self.attributes, self.entries.len());
        self.insert(name, TreeValue::Leaf(value));
        self.attributes = self.entries.len();
    }

    pub(crate) fn push_text(&mut self, fragment: String) {
        self.text.push(fragment);
    }

    /// Collapse a childless scope into its joined text.
    pub(crate) fn into_text(self) -> String {
        self.text.concat()
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate child element values, skipping values that came from
    /// attributes.
    ///
    /// Repeated tags yield every occurrence, in document order per key.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &TreeValue)> {
        self.entries.iter().enumerate().flat_map(move |(index, (key, node))| {
            let skip = usize::from(index < self.attributes);
            node.items()[skip..].iter().map(move |value| (key.as_str(), value))
        })
    }

    /// Names of the leading entries that came from attributes.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().take(self.attributes).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Character data fragments found between children, in order.
    pub fn text(&self) -> &[String] {
        &self.text
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.text == other.text
    }
}

impl Eq for Object {}

#[cfg(feature = "serde")]
impl serde::Serialize for Object {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let text_entry = usize::from(!self.text.is_empty());
        let mut map = serializer.serialize_map(Some(self.entries.len() + text_entry))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        if !self.text.is_empty() {
            map.serialize_entry("#text", &self.text)?;
        }
        map.end()
    }
}

// ============================================================================
// Tests
// ============================================================================
