//! `textDocument/publishDiagnostics` (spec §4.I).
//!
//! A successful parse is re-checked; a thrown [`kcl_typeck::TypeError`]
//! carries only a message, so locating the offending identifier is this
//! layer's job, via a ladder of regexes over the message text. A parse
//! failure's diagnostic is already range-carrying (`kcl-docstore` mapped
//! it via the token-index recovery ladder), so it's passed through as-is.

use kcl_common::{Diagnostic, Keyword, Range, Token, TokenKind};
use kcl_docstore::{Document, ParseOutcome};
use kcl_ast::{Program, Visitor, walk_program};
use regex::Regex;
use std::sync::OnceLock;

static UNKNOWN_OPERATION: OnceLock<Regex> = OnceLock::new();
static UNKNOWN_VARIABLE: OnceLock<Regex> = OnceLock::new();
static UNDEFINED: OnceLock<Regex> = OnceLock::new();
static QUOTED: OnceLock<Regex> = OnceLock::new();
static MISSING_ARGUMENT: OnceLock<Regex> = OnceLock::new();

fn re(cell: &OnceLock<Regex>, pattern: &str) -> Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap()).clone()
}

struct FirstCallTo<'a> {
    name: &'a str,
    found: Option<Range>,
}

impl<'a> Visitor for FirstCallTo<'a> {
    fn enter_expr(&mut self, expr: &kcl_ast::Expr) -> bool {
        if self.found.is_some() {
            return false;
        }
        if let kcl_ast::ExprKind::Call { callee, .. } = &expr.kind {
            if let kcl_ast::ExprKind::Var(name) = &callee.kind {
                if name == self.name {
                    self.found = Some(callee.range);
                    return false;
                }
            }
        }
        true
    }
}

fn first_call_callee_range(program: &Program, name: &str) -> Option<Range> {
    let mut finder = FirstCallTo { name, found: None };
    walk_program(program, &mut finder);
    finder.found
}

/// Last token whose identifier text matches `name` exactly.
fn last_identifier_occurrence(tokens: &[Token], name: &str) -> Option<Range> {
    tokens
        .iter()
        .rev()
        .find(|t| matches!(&t.kind, TokenKind::Identifier(n) if n == name))
        .map(|t| t.range)
}

/// Last identifier token whose text appears (case-insensitively) as a word
/// in `message`. Used only once the named patterns all miss.
fn fallback_word_match(tokens: &[Token], message: &str) -> Option<Range> {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric() && c != '_').collect();
    tokens
        .iter()
        .rev()
        .find_map(|t| match &t.kind {
            TokenKind::Identifier(n) if words.contains(&n.to_lowercase().as_str()) => Some(t.range),
            _ => None,
        })
}

fn locate_error_range(program: Option<&Program>, tokens: &[Token], message: &str) -> Range {
    let missing_argument = re(&MISSING_ARGUMENT, r"Missing argument '(\w+)' for operation '(\w+)'");
    if let Some(caps) = missing_argument.captures(message) {
        let operation = &caps[2];
        if let Some(program) = program {
            if let Some(range) = first_call_callee_range(program, operation) {
                return range;
            }
        }
    }

    let named_patterns = [
        re(&UNKNOWN_OPERATION, r"Unknown operation: (\w+)"),
        re(&UNKNOWN_VARIABLE, r"Unknown variable: (\w+)"),
        re(&UNDEFINED, r"Undefined: (\w+)"),
        re(&QUOTED, r"'(\w+)'"),
    ];
    for pattern in &named_patterns {
        if let Some(caps) = pattern.captures(message) {
            if let Some(range) = last_identifier_occurrence(tokens, &caps[1]) {
                return range;
            }
        }
    }

    fallback_word_match(tokens, message).unwrap_or(Range::new(0, 1))
}

/// Every diagnostic for `doc`: the parse diagnostic (if parsing failed) or
/// a type-check diagnostic (if checking threw), plus a deprecation warning
/// on every `let` keyword token.
pub fn diagnostics(doc: &Document) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    match &doc.outcome {
        ParseOutcome::Err(diag) => out.push(diag.clone()),
        ParseOutcome::Ok(program) => {
            if let Err(err) = kcl_typeck::check_program(program) {
                let range = locate_error_range(Some(program), &doc.tokens, &err.message);
                out.push(Diagnostic::error(range, "typecheck", err.message.clone()));
            }
        }
    }

    for token in &doc.tokens {
        if matches!(token.kind, TokenKind::Keyword(Keyword::Let)) {
            out.push(Diagnostic::warning(
                token.range,
                "deprecated",
                "deprecated-let-keyword",
                "'let' is deprecated",
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    #[test]
    fn successful_parse_with_no_type_errors_has_only_let_warnings() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let x = 1\n".to_string(), 1);
        let diags = diagnostics(&doc);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].source, "deprecated");
    }

    #[test]
    fn unknown_operation_locates_the_callee_token() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "nonsense(1, 2)\n".to_string(), 1);
        let diags = diagnostics(&doc);
        let typecheck = diags.iter().find(|d| d.source == "typecheck").unwrap();
        assert_eq!(typecheck.range, Range::new(0, 8));
    }

    #[test]
    fn missing_argument_locates_the_call_site() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "box(width = 1, depth = 2)\n".to_string(), 1);
        let diags = diagnostics(&doc);
        let typecheck = diags.iter().find(|d| d.source == "typecheck").unwrap();
        assert_eq!(typecheck.range, Range::new(0, 3));
    }

    #[test]
    fn parse_failure_is_passed_through_unchanged() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let = 1\n".to_string(), 1);
        let diags = diagnostics(&doc);
        assert!(diags.iter().any(|d| d.source == "parser"));
    }
}
