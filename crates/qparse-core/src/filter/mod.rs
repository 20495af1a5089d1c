//! Parser strategies that turn a raw filter expression into a [`FilterGroup`].
//!
//! Every grammar implements [`QueryParser`]: a cheap [`QueryParser::can_parse`]
//! routing gate plus a full [`QueryParser::parse`]. The registry asks each
//! active grammar in turn and hands the input to the first one that claims it.

mod format1;
mod simple;

use crate::domain::FilterGroup;
use thiserror::Error;

pub use format1::Format1Parser;
pub use simple::SimpleParser;

pub const INVALID_QUERY_FORMAT: &str = "Invalid query format";
pub const INVALID_FILTER_FORMAT: &str = "Invalid query filter format";

pub trait QueryParser: Send + Sync {
    /// Unique lowercase name used for activation.
    fn name(&self) -> &'static str;

    fn can_parse(&self, input: &str) -> bool;

    fn parse(&self, input: &str) -> Result<FilterGroup, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// No recognizable wrapper around the expression.
    BadFormat,
    /// Wrapper present, payload has the wrong shape.
    BadFilterFormat,
    /// Payload is not valid JSON; the message is the decoder's own.
    MalformedPayload,
}

impl ParseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::BadFormat => "bad_format",
            ParseErrorKind::BadFilterFormat => "bad_filter_format",
            ParseErrorKind::MalformedPayload => "malformed_payload",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    kind: ParseErrorKind,
    message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_format() -> Self {
        Self::new(ParseErrorKind::BadFormat, INVALID_QUERY_FORMAT)
    }

    pub fn bad_filter_format() -> Self {
        Self::new(ParseErrorKind::BadFilterFormat, INVALID_FILTER_FORMAT)
    }

    pub fn malformed_payload(source: &serde_json::Error) -> Self {
        Self::new(ParseErrorKind::MalformedPayload, source.to_string())
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
