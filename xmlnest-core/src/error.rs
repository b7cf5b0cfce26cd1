//! Failure signals raised while building a tree.

/// Why an event stream could not be built into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamErrorReason {
    /// No element events at all.
    EmptyStream = 0,
    /// `Close` with no open element, or closing a different tag.
    UnmatchedClose,
    /// Stream ended while an element was still open.
    UnmatchedOpen,
    /// A second element follows the closed document root.
    MultipleRoots,
    /// Stream is longer than `BuildOptions::max_events`.
    EventLimit,
    /// Nesting is deeper than `BuildOptions::max_depth`.
    DepthLimit,
}

impl StreamErrorReason {
    /// Get a human-readable message for this reason.
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptyStream => "empty event stream",
            Self::UnmatchedClose => "close event without matching open",
            Self::UnmatchedOpen => "open event never closed",
            Self::MultipleRoots => "more than one root element",
            Self::EventLimit => "event limit exceeded",
            Self::DepthLimit => "depth limit exceeded",
        }
    }
}

/// Error returned when an event stream is not well nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedStreamError {
    pub reason: StreamErrorReason,
    /// Index of the event where the problem was detected.
    pub position: usize,
    /// Tag involved, when there is one.
    pub tag: Option<String>,
}

impl MalformedStreamError {
    pub(crate) fn new(reason: StreamErrorReason, position: usize) -> Self {
        MalformedStreamError {
            reason,
            position,
            tag: None,
        }
    }

    pub(crate) fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_owned());
        self
    }
}

impl std::fmt::Display for MalformedStreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at event {}", self.reason.message(), self.position)?;
        if let Some(tag) = &self.tag {
            write!(f, " (<{}>)", tag)?;
        }
        Ok(())
    }
}

impl std::error::Error for MalformedStreamError {}
