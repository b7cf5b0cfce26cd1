//! Nested tree construction from flat parse events.
//!
//! The builder walks the event slice once by recursive descent. All
//! recursive calls share one [`Cursor`] by `&mut`, so when a nested
//! element's call returns, its caller resumes right after the matching
//! `Close`.
//!
//! # Example
//!
//! ```
//! use xmlnest_core::{build, ParseEvent};
//!
//! let events = [
//!     ParseEvent::open("Brand").with_attr("Name", "Apple"),
//!     ParseEvent::complete("Mobile").with_attr("Name", "iPhone"),
//!     ParseEvent::complete("Mobile").with_attr("Name", "iPad"),
//!     ParseEvent::close("Brand"),
//! ];
//! let tree = build(&events).unwrap();
//!
//! let brand = tree.pointer("/Brand").unwrap();
//! assert_eq!(brand.attr("Name"), Some("Apple"));
//! assert_eq!(brand.get("Mobile").unwrap().len(), 2);
//! ```

use crate::error::{MalformedStreamError, StreamErrorReason};
use crate::event::{Attributes, EventKind, ParseEvent};
use crate::value::{Object, TreeValue};

// ============================================================================
// Options
// ============================================================================

/// Nesting ceiling used by [`BuildOptions::default`].
///
/// The descent recurses once per level, so an unbounded depth lets a
/// hostile document exhaust the stack.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs for [`EventTreeBuilder`].
///
/// ```
/// use xmlnest_core::BuildOptions;
///
/// let options = BuildOptions {
///     max_depth: Some(32),
///     ..BuildOptions::default()
/// };
/// assert!(options.trim_text);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Trim text values and drop whitespace-only character data.
    pub trim_text: bool,
    /// Reject streams with more events than this.
    pub max_events: Option<usize>,
    /// Reject elements nested deeper than this (the root is depth 1).
    /// `None` removes the ceiling; only do that for trusted input.
    pub max_depth: Option<usize>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            trim_text: true,
            max_events: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl BuildOptions {
    pub fn trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }

    pub fn max_events(mut self, limit: usize) -> Self {
        self.max_events = Some(limit);
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// Position in the event slice, shared by every level of the descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the event currently under the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }
}

// ============================================================================
// EventTreeBuilder
// ============================================================================

/// Builds one [`TreeValue`] from a well-nested event stream.
///
/// Holds no per-build state, so one builder can serve any number of
/// streams, concurrently if needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTreeBuilder {
    options: BuildOptions,
}

/// Build a tree with default options.
pub fn build(events: &[ParseEvent]) -> Result<TreeValue, MalformedStreamError> {
    EventTreeBuilder::new().build(events)
}

impl EventTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        EventTreeBuilder { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the document tree.
    ///
    /// The result is an `Object` with a single entry: the root tag mapped
    /// to its value. Character data around the root is ignored. Nothing is
    /// returned on failure.
    pub fn build(&self, events: &[ParseEvent]) -> Result<TreeValue, MalformedStreamError> {
        let mut cursor = Cursor::new();
        let root = self.build_with_cursor(events, &mut cursor)?;
        debug_assert!(cursor.position() + 1 >= events.len());
        Ok(root)
    }

    /// Build the document tree, leaving `cursor` on the last event read.
    ///
    /// On success the cursor rests on the final event of the stream.
    pub fn build_with_cursor(
        &self,
        events: &[ParseEvent],
        cursor: &mut Cursor,
    ) -> Result<TreeValue, MalformedStreamError> {
        if let Some(limit) = self.options.max_events {
            if events.len() > limit {
                return Err(MalformedStreamError::new(StreamErrorReason::EventLimit, limit));
            }
        }

        while events.get(cursor.pos).is_some_and(|e| e.kind == EventKind::CData) {
            cursor.advance();
        }
        let Some(root) = events.get(cursor.pos) else {
            return Err(MalformedStreamError::new(
                StreamErrorReason::EmptyStream,
                cursor.pos,
            ));
        };

        let value = match root.kind {
            EventKind::Open => self.build_children(events, cursor, 1)?,
            EventKind::Complete => self.complete_value(root),
            EventKind::Close => {
                return Err(
                    MalformedStreamError::new(StreamErrorReason::UnmatchedClose, cursor.pos)
                        .with_tag(&root.tag),
                );
            }
            EventKind::CData => unreachable!("leading character data skipped above"),
        };

        // Only character data may follow the root.
        while cursor.pos + 1 < events.len() {
            cursor.advance();
            let event = &events[cursor.pos];
            let reason = match event.kind {
                EventKind::CData => continue,
                EventKind::Close => StreamErrorReason::UnmatchedClose,
                EventKind::Open | EventKind::Complete => StreamErrorReason::MultipleRoots,
            };
            return Err(MalformedStreamError::new(reason, cursor.pos).with_tag(&event.tag));
        }

        let mut document = Object::new();
        document.insert(root.tag.as_str(), value);
        Ok(TreeValue::Object(document))
    }

    /// Build the element whose `Open` event is under the cursor.
    ///
    /// Returns with the cursor on the matching `Close`.
    fn build_children(
        &self,
        events: &[ParseEvent],
        cursor: &mut Cursor,
        depth: usize,
    ) -> Result<TreeValue, MalformedStreamError> {
        let open_pos = cursor.pos;
        let open = &events[open_pos];
        self.check_depth(depth, open_pos, open)?;

        let mut scope = Scope::seed(open, self.text(open.value.as_deref()));

        loop {
            cursor.advance();
            let Some(event) = events.get(cursor.pos) else {
                return Err(MalformedStreamError::new(StreamErrorReason::UnmatchedOpen, open_pos)
                    .with_tag(&open.tag));
            };

            match event.kind {
                EventKind::CData => {
                    if let Some(text) = self.text(event.value.as_deref()) {
                        scope.object.push_text(text);
                    }
                }
                EventKind::Complete => {
                    self.check_depth(depth + 1, cursor.pos, event)?;
                    scope.attach(&event.tag, self.complete_value(event));
                }
                EventKind::Open => {
                    let child = self.build_children(events, cursor, depth + 1)?;
                    scope.attach(&event.tag, child);
                }
                EventKind::Close => {
                    if event.tag != open.tag {
                        return Err(MalformedStreamError::new(
                            StreamErrorReason::UnmatchedClose,
                            cursor.pos,
                        )
                        .with_tag(&event.tag));
                    }
                    return Ok(scope.finish());
                }
            }
        }
    }

    /// Value of a self-contained element: attributes win over text.
    fn complete_value(&self, event: &ParseEvent) -> TreeValue {
        match event.attrs() {
            Some(attrs) => TreeValue::AttrMap(attrs.clone()),
            None => TreeValue::Leaf(self.text(event.value.as_deref()).unwrap_or_default()),
        }
    }

    /// Normalize a text value; `None` means nothing worth keeping.
    fn text(&self, value: Option<&str>) -> Option<String> {
        let value = value?;
        let value = if self.options.trim_text { value.trim() } else { value };
        if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        }
    }

    fn check_depth(
        &self,
        depth: usize,
        position: usize,
        event: &ParseEvent,
    ) -> Result<(), MalformedStreamError> {
        match self.options.max_depth {
            Some(limit) if depth > limit => Err(MalformedStreamError::new(
                StreamErrorReason::DepthLimit,
                position,
            )
            .with_tag(&event.tag)),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Scope (one element under construction)
// ============================================================================

struct Scope {
    object: Object,
    attributes: Option<Attributes>,
    children: usize,
}

impl Scope {
    /// Start a scope from its `Open` event.
    ///
    /// Attributes become the first entries and leading text the first
    /// text fragment. Whether either survives is decided in `finish`.
    fn seed(open: &ParseEvent, text: Option<String>) -> Self {
        let mut object = Object::new();
        let attributes = open.attrs().cloned();
        if let Some(attrs) = &attributes {
            for (name, value) in attrs {
                object.insert_attribute(name.as_str(), value.clone());
            }
        }
        if let Some(text) = text {
            object.push_text(text);
        }
        Scope {
            object,
            attributes,
            children: 0,
        }
    }

    fn attach(&mut self, name: &str, value: TreeValue) {
        self.children += 1;
        self.object.insert(name, value);
    }

    /// Collapse to the richest representation the element needs.
    fn finish(self) -> TreeValue {
        if self.children > 0 {
            return TreeValue::Object(self.object);
        }
        match self.attributes {
            Some(attrs) => TreeValue::AttrMap(attrs),
            None => TreeValue::Leaf(self.object.into_text()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
