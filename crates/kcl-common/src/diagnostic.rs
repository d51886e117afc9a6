//! Shared diagnostic shape surfaced by the parser, type checker, and
//! Document Store alike (spec §7 error taxonomy).

use serde::Serialize;

use crate::position::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
    /// `"lexer"`, `"parser"`, `"typecheck"`, or `"deprecated"`.
    pub source: &'static str,
    pub code: Option<&'static str>,
}

impl Diagnostic {
    pub fn error(range: Range, source: &'static str, message: impl Into<String>) -> Self {
        Self { range, severity: Severity::Error, message: message.into(), source, code: None }
    }

    pub fn warning(
        range: Range,
        source: &'static str,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self { range, severity: Severity::Warning, message: message.into(), source, code: Some(code) }
    }
}
