//! xmlnest Core
//!
//! Builds nested, order-preserving trees from flat XML parse events, the
//! shape vendor API clients expect when they index responses by tag name.
//!
//! # Architecture
//!
//! - **event.rs** - ParseEvent, the flat tokenizer output
//! - **tree.rs** - EventTreeBuilder, recursive descent over a shared cursor
//! - **value.rs** - TreeValue/TreeNode output types and lookups
//! - **error.rs** - MalformedStreamError
//! - **xml.rs** - quick-xml tokenizer adapter and serializer (`xml` feature)
//! - **response.rs** - vendor response checks (`xml` feature)

pub mod error;
pub mod event;
pub mod tree;
pub mod value;

#[cfg(feature = "xml")]
pub mod response;
#[cfg(feature = "xml")]
pub mod xml;

pub use error::{MalformedStreamError, StreamErrorReason};
pub use event::{Attributes, EventKind, ParseEvent};
pub use tree::{build, BuildOptions, Cursor, EventTreeBuilder, DEFAULT_MAX_DEPTH};
pub use value::{Object, TreeNode, TreeValue};

#[cfg(feature = "xml")]
pub use response::{find_error, parse_response, ResponseError};
#[cfg(feature = "xml")]
pub use xml::{events_from_str, parse_str, parse_str_with, to_xml, XmlError};
