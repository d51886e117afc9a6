//! Type-checker failure. Like the parser, the checker raises exactly one
//! error and stops -- there is no accumulation of multiple diagnostics at
//! this layer (spec §7, §9 "exception-for-control-flow"). Locating the
//! offending token from the message text is the Semantic Services layer's
//! job (spec §4.I), not this crate's.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub message: String,
}

impl TypeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TypeError {}
