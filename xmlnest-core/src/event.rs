//! Parse events - the flat input consumed by the tree builder.
//!
//! This is the `xml_parse_into_struct` event model: a tokenizer walks the
//! document once and emits one event per structural step, each tagged with
//! the element name and nesting level. Structure is represented by
//! `Open`/`Close` pairs; elements with no element children collapse into a
//! single `Complete` event.
//!
//! For `<a x="1">lead<b>in</b>tail</a>`:
//! ```text
//! Open     { tag: "a", attributes: {x: "1"}, value: "lead", level: 1 }
//! Complete { tag: "b", value: "in", level: 2 }
//! CData    { tag: "a", value: "tail", level: 1 }
//! Close    { tag: "a", level: 1 }
//! ```

use indexmap::IndexMap;

/// Ordered attribute mapping, in document order.
pub type Attributes = IndexMap<String, String>;

/// The structural role of a parse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Element start with a matching `Close` later in the stream.
    Open,
    /// Element end.
    Close,
    /// Self-contained element: text-only, attribute-only, or empty.
    Complete,
    /// Character data between child elements.
    CData,
}

impl EventKind {
    /// Lowercase name, as `xml_parse_into_struct` spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Open => "open",
            EventKind::Close => "close",
            EventKind::Complete => "complete",
            EventKind::CData => "cdata",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flat token emitted while scanning XML text.
///
/// For `CData` events `tag` names the enclosing element; the builder
/// ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEvent {
    pub kind: EventKind,
    pub tag: String,
    pub value: Option<String>,
    pub attributes: Option<Attributes>,
    /// 1-based nesting depth reported by the tokenizer.
    pub level: usize,
}

impl ParseEvent {
    fn new(kind: EventKind, tag: impl Into<String>) -> Self {
        ParseEvent {
            kind,
            tag: tag.into(),
            value: None,
            attributes: None,
            level: 0,
        }
    }

    pub fn open(tag: impl Into<String>) -> Self {
        Self::new(EventKind::Open, tag)
    }

    pub fn close(tag: impl Into<String>) -> Self {
        Self::new(EventKind::Close, tag)
    }

    pub fn complete(tag: impl Into<String>) -> Self {
        Self::new(EventKind::Complete, tag)
    }

    /// Character data with no enclosing tag recorded.
    pub fn cdata(value: impl Into<String>) -> Self {
        Self::new(EventKind::CData, "").with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Append one attribute, creating the mapping on first use.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn at_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Attributes, treating an empty mapping the same as none.
    #[inline]
    pub fn attrs(&self) -> Option<&Attributes> {
        self.attributes.as_ref().filter(|attrs| !attrs.is_empty())
    }
}
