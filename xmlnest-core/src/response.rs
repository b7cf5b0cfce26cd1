//! Vendor API response handling.
//!
//! The unlocking-service API reports failures in-band: the HTTP request
//! succeeds and the document carries an `<error>` element somewhere
//! inside it. Callers want those surfaced as errors, not as trees.

use crate::value::TreeValue;
use crate::xml::{self, XmlError};

/// Tag the vendor uses for in-band failures.
const ERROR_TAG: &str = "error";

/// Error from [`parse_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The body was not usable XML.
    Xml(XmlError),
    /// The API answered with an error element.
    Api(String),
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseError::Xml(err) => write!(f, "failed to parse API response: {}", err),
            ResponseError::Api(message) => write!(f, "API error: {}", message),
        }
    }
}

impl std::error::Error for ResponseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResponseError::Xml(err) => Some(err),
            ResponseError::Api(_) => None,
        }
    }
}

impl From<XmlError> for ResponseError {
    fn from(err: XmlError) -> Self {
        ResponseError::Xml(err)
    }
}

/// Parse a response body, failing if the vendor reported an error.
///
/// ```
/// use xmlnest_core::{parse_response, ResponseError};
///
/// let err = parse_response("<result><error>Invalid IMEI</error></result>").unwrap_err();
/// assert_eq!(err, ResponseError::Api("Invalid IMEI".to_string()));
/// ```
pub fn parse_response(body: &str) -> Result<TreeValue, ResponseError> {
    let tree = xml::parse_str(body)?;
    if let Some(message) = find_error(&tree) {
        log::debug!("API returned error: {}", message);
        return Err(ResponseError::Api(message.to_owned()));
    }
    Ok(tree)
}

/// Find the first `error` element with text, searching depth-first in
/// document order.
///
/// Empty error elements do not count, and neither do `error` attributes.
/// When several errors were reported only the first is returned.
pub fn find_error(tree: &TreeValue) -> Option<&str> {
    let TreeValue::Object(obj) = tree else {
        return None;
    };
    for (key, value) in obj.elements() {
        if key == ERROR_TAG {
            if let Some(text) = value.as_text().filter(|t| !t.is_empty()) {
                return Some(text);
            }
        }
        if let Some(found) = find_error(value) {
            return Some(found);
        }
    }
    None
}
