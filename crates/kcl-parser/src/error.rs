//! Parser failure. The parser raises exactly one of these and aborts --
//! there is no error recovery or accumulation at this layer (spec §7,
//! §9 "exception-for-control-flow").

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// Index into the token array the parser had reached when it failed.
    /// The Document Store recovers a `Range` from this (spec §4.H).
    pub token_index: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, token_index: usize) -> Self {
        Self { message: message.into(), token_index }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (position {})", self.message, self.token_index)
    }
}

impl std::error::Error for ParseError {}
