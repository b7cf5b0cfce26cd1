//! XML text in and out.
//!
//! [`events_from_str`] drives quick-xml and regroups its events into the
//! flat `open`/`complete`/`cdata`/`close` stream the builder consumes:
//! an element with no element children becomes one `Complete` event, and
//! text found before the first child rides on the `Open` event.
//!
//! [`to_xml`] writes a tree back out. Attribute maps become attributes;
//! everything stored in an object becomes a child element.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use unicode_xid::UnicodeXID;

use crate::error::MalformedStreamError;
use crate::event::{Attributes, EventKind, ParseEvent};
use crate::tree::{BuildOptions, EventTreeBuilder};
use crate::value::{TreeNode, TreeValue};

pub(crate) type Result<T> = std::result::Result<T, XmlError>;

// ============================================================================
// Errors
// ============================================================================

/// Error from reading or writing XML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The tokenizer rejected the input.
    Syntax { message: String, position: u64 },
    /// Tokenized fine but the element structure did not build.
    Malformed(MalformedStreamError),
    /// A tree key or attribute name is not a valid XML name.
    InvalidName(String),
    /// The tree has no element to use as the document root.
    NoRoot,
}

impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XmlError::Syntax { message, position } => {
                write!(f, "XML syntax error at byte {}: {}", position, message)
            }
            XmlError::Malformed(err) => write!(f, "{}", err),
            XmlError::InvalidName(name) => write!(f, "invalid XML name {:?}", name),
            XmlError::NoRoot => f.write_str("tree has no root element"),
        }
    }
}

impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XmlError::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MalformedStreamError> for XmlError {
    fn from(err: MalformedStreamError) -> Self {
        XmlError::Malformed(err)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Tokenize XML text into parse events.
///
/// ```
/// use xmlnest_core::{events_from_str, EventKind};
///
/// let events = events_from_str("<a><b>1</b></a>").unwrap();
/// let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
/// assert_eq!(kinds, [EventKind::Open, EventKind::Complete, EventKind::Close]);
/// ```
pub fn events_from_str(input: &str) -> Result<Vec<ParseEvent>> {
    let input = repair_declaration(input);
    let events = EventCollector::new(&input).collect_all()?;
    log::trace!("events_from_str: {} events from {} bytes", events.len(), input.len());
    Ok(events)
}

/// Tokenize and build with default options.
pub fn parse_str(input: &str) -> Result<TreeValue> {
    parse_str_with(input, BuildOptions::default())
}

/// Tokenize and build.
pub fn parse_str_with(input: &str, options: BuildOptions) -> Result<TreeValue> {
    let events = events_from_str(input)?;
    Ok(EventTreeBuilder::with_options(options).build(&events)?)
}

/// Fix the `<?phpxml` declaration some vendor endpoints send instead of
/// `<?xml`.
pub fn repair_declaration(input: &str) -> Cow<'_, str> {
    match input.strip_prefix("<?phpxml") {
        Some(rest) => {
            log::warn!("repairing malformed '<?phpxml' declaration");
            Cow::Owned(format!("<?xml{}", rest))
        }
        None => Cow::Borrowed(input),
    }
}

// ============================================================================
// Event Collector
// ============================================================================

/// Regroups quick-xml events into flat parse events.
struct EventCollector<'input> {
    reader: Reader<&'input [u8]>,
    events: Vec<ParseEvent>,
    /// Start tag not yet known to have element children.
    pending: Option<ParseEvent>,
    /// Names of currently open elements.
    open: Vec<String>,
}

impl<'input> EventCollector<'input> {
    fn new(input: &'input str) -> Self {
        Self {
            reader: Reader::from_str(input),
            events: Vec::new(),
            pending: None,
            open: Vec::new(),
        }
    }

    fn collect_all(mut self) -> Result<Vec<ParseEvent>> {
        loop {
            let event = self.reader.read_event().map_err(|e| self.syntax(e))?;
            match event {
                Event::Start(e) => {
                    self.flush_pending();
                    let name = element_name(&e);
                    let attributes = self.collect_attributes(&e)?;
                    self.pending = Some(ParseEvent {
                        kind: EventKind::Open,
                        tag: name.clone(),
                        value: None,
                        attributes,
                        level: self.open.len() + 1,
                    });
                    self.open.push(name);
                }
                Event::Empty(e) => {
                    self.flush_pending();
                    let attributes = self.collect_attributes(&e)?;
                    self.events.push(ParseEvent {
                        kind: EventKind::Complete,
                        tag: element_name(&e),
                        value: None,
                        attributes,
                        level: self.open.len() + 1,
                    });
                }
                Event::End(e) => {
                    let level = self.open.len();
                    self.open.pop();
                    match self.pending.take() {
                        Some(mut start) => {
                            start.kind = EventKind::Complete;
                            self.events.push(start);
                        }
                        None => {
                            let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                            self.events.push(ParseEvent::close(name).at_level(level));
                        }
                    }
                }
                Event::Text(e) => {
                    let content = e.unescape().map_err(|err| self.syntax(err))?;
                    self.push_text(&content);
                }
                Event::CData(e) => {
                    let content = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    self.push_text(&content);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes
                _ => {}
            }
        }
        self.flush_pending();
        Ok(self.events)
    }

    fn flush_pending(&mut self) {
        if let Some(start) = self.pending.take() {
            self.events.push(start);
        }
    }

    fn push_text(&mut self, content: &str) {
        if content.is_empty() {
            return;
        }
        if let Some(start) = self.pending.as_mut() {
            start.value.get_or_insert_with(String::new).push_str(content);
            return;
        }
        let tag = self.open.last().cloned().unwrap_or_default();
        self.events.push(ParseEvent {
            kind: EventKind::CData,
            tag,
            value: Some(content.to_owned()),
            attributes: None,
            level: self.open.len(),
        });
    }

    fn collect_attributes(&self, start: &BytesStart<'_>) -> Result<Option<Attributes>> {
        let mut attrs = Attributes::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.syntax(e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| self.syntax(e))?;
            attrs.insert(key, value.into_owned());
        }
        Ok(if attrs.is_empty() { None } else { Some(attrs) })
    }

    fn syntax(&self, err: impl std::fmt::Display) -> XmlError {
        XmlError::Syntax {
            message: err.to_string(),
            position: self.reader.buffer_position() as u64,
        }
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

// ============================================================================
// Serializer
// ============================================================================

/// Write a tree as XML text.
///
/// Each key of the top-level object becomes a root element, so a built
/// document writes back as a single-rooted document. Object text
/// fragments are written before the children.
pub fn to_xml(tree: &TreeValue) -> Result<String> {
    let TreeValue::Object(document) = tree else {
        return Err(XmlError::NoRoot);
    };
    if document.is_empty() {
        return Err(XmlError::NoRoot);
    }

    let mut out = String::new();
    for (name, node) in document.iter() {
        write_node(&mut out, name, node)?;
    }
    Ok(out)
}

fn write_node(out: &mut String, name: &str, node: &TreeNode) -> Result<()> {
    for value in node.items() {
        write_value(out, name, value)?;
    }
    Ok(())
}

fn write_value(out: &mut String, name: &str, value: &TreeValue) -> Result<()> {
    check_name(name)?;
    match value {
        TreeValue::Leaf(text) if text.is_empty() => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        TreeValue::Leaf(text) => {
            open_tag(out, name);
            out.push_str(&escape(text.as_str()));
            close_tag(out, name);
        }
        TreeValue::AttrMap(attrs) => {
            out.push('<');
            out.push_str(name);
            for (key, val) in attrs {
                check_name(key)?;
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape(val.as_str()));
                out.push('"');
            }
            out.push_str("/>");
        }
        TreeValue::Object(obj) => {
            open_tag(out, name);
            for fragment in obj.text() {
                out.push_str(&escape(fragment.as_str()));
            }
            for (child, node) in obj.iter() {
                write_node(out, child, node)?;
            }
            close_tag(out, name);
        }
    }
    Ok(())
}

fn open_tag(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// XML `Name` production, approximated with Unicode identifier classes.
fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first == '_' || first == ':' || first.is_xid_start())
                && chars.all(|c| c.is_xid_continue() || matches!(c, '-' | '.' | ':'))
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(XmlError::InvalidName(name.to_owned()))
    }
}

// ============================================================================
// Tests
// ============================================================================
