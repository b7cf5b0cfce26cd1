//! proptest generators for well-formed documents and arbitrary event streams

use proptest::prelude::*;
use xmlnest_core::{Attributes, EventKind, ParseEvent};

const ELEMENTS: &[&str] = &["item", "imei", "status", "order"];
const ATTRS: &[&str] = &["id", "name", "price"];

/// A small well-formed document, renderable as XML text or as events.
#[derive(Debug, Clone)]
pub enum Doc {
    /// `<name>text</name>`
    Text(String, String),
    /// `<name k="v"/>`, or `<name/>` with no attributes
    Empty(String, Attributes),
    /// `<name k="v">children</name>`, at least one child
    Parent(String, Attributes, Vec<Doc>),
}

impl Doc {
    pub fn name(&self) -> &str {
        match self {
            Doc::Text(name, _) | Doc::Empty(name, _) | Doc::Parent(name, _, _) => name,
        }
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        match self {
            Doc::Text(name, text) => out.push_str(&format!("<{name}>{text}</{name}>")),
            Doc::Empty(name, attrs) => {
                out.push_str(&format!("<{name}{}/>", render_attrs(attrs)));
            }
            Doc::Parent(name, attrs, children) => {
                out.push_str(&format!("<{name}{}>", render_attrs(attrs)));
                for child in children {
                    child.write(out);
                }
                out.push_str(&format!("</{name}>"));
            }
        }
    }

    /// Events as a tokenizer would emit them.
    pub fn events(&self) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        self.push_events(&mut events, 1);
        events
    }

    fn push_events(&self, events: &mut Vec<ParseEvent>, level: usize) {
        match self {
            Doc::Text(name, text) => {
                events.push(ParseEvent::complete(name.as_str()).with_value(text.as_str()).at_level(level));
            }
            Doc::Empty(name, attrs) => {
                let mut ev = ParseEvent::complete(name.as_str()).at_level(level);
                ev.attributes = Some(attrs.clone()).filter(|a| !a.is_empty());
                events.push(ev);
            }
            Doc::Parent(name, attrs, children) => {
                let mut ev = ParseEvent::open(name.as_str()).at_level(level);
                ev.attributes = Some(attrs.clone()).filter(|a| !a.is_empty());
                events.push(ev);
                for child in children {
                    child.push_events(events, level + 1);
                }
                events.push(ParseEvent::close(name.as_str()).at_level(level));
            }
        }
    }
}

fn render_attrs(attrs: &Attributes) -> String {
    attrs.iter().map(|(k, v)| format!(" {k}=\"{v}\"")).collect()
}

fn element_name() -> impl Strategy<Value = String> {
    prop::sample::select(ELEMENTS).prop_map(str::to_string)
}

fn attributes() -> impl Strategy<Value = Attributes> {
    prop::collection::vec((prop::sample::select(ATTRS), "[a-z0-9]{1,6}"), 0..3)
        .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Documents up to four levels deep.
pub fn doc() -> impl Strategy<Value = Doc> {
    let leaf = prop_oneof![
        (element_name(), "[a-z0-9]{1,8}").prop_map(|(n, t)| Doc::Text(n, t)),
        (element_name(), attributes()).prop_map(|(n, a)| Doc::Empty(n, a)),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        (element_name(), attributes(), prop::collection::vec(inner, 1..5))
            .prop_map(|(n, a, c)| Doc::Parent(n, a, c))
    })
}

/// Event streams with no guarantee of nesting.
pub fn arbitrary_events() -> impl Strategy<Value = Vec<ParseEvent>> {
    let kind = prop::sample::select(vec![
        EventKind::Open,
        EventKind::Close,
        EventKind::Complete,
        EventKind::CData,
    ]);
    let tag = prop::sample::select(vec!["item", "imei"]);
    let event = (kind, tag, prop::option::of("[a-z ]{0,4}"))
        .prop_map(|(kind, tag, value)| ParseEvent {
            kind,
            tag: tag.to_string(),
            value,
            attributes: None,
            level: 0,
        });
    prop::collection::vec(event, 0..40)
}
