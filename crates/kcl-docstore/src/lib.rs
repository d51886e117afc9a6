//! Per-URI document cache (spec §4.H).
//!
//! Each entry owns everything derived from one version of a document's
//! text: the token stream, an AST-or-diagnostic parse outcome, and a line
//! index for position conversion. `update` short-circuits re-parsing when
//! the incoming text hashes identically to what's already cached, handing
//! back the same `Arc` rather than a freshly built copy.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use kcl_ast::Program;
use kcl_common::{Diagnostic, LineIndex, Range, Token};
use kcl_parser::ParseError;

/// Parse succeeded with an AST, or failed with a single diagnostic --
/// spec's "AST (on success) or diagnostics (on failure)".
#[derive(Debug)]
pub enum ParseOutcome {
    Ok(Program),
    Err(Diagnostic),
}

impl ParseOutcome {
    pub fn program(&self) -> Option<&Program> {
        match self {
            ParseOutcome::Ok(program) => Some(program),
            ParseOutcome::Err(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ParseOutcome::Ok(_) => None,
            ParseOutcome::Err(diagnostic) => Some(diagnostic),
        }
    }
}

#[derive(Debug)]
pub struct Document {
    pub uri: String,
    pub text: String,
    pub version: i32,
    pub hash: u64,
    pub line_index: LineIndex,
    pub tokens: Vec<Token>,
    pub outcome: ParseOutcome,
}

/// Cheap, non-cryptographic content hash used purely for the store's
/// unchanged-text short-circuit, not for anything security-sensitive.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn last_non_eof_token(tokens: &[Token]) -> Option<&Token> {
    tokens.iter().rev().find(|t| !t.is_eof())
}

/// Map a `ParseError`'s token index back to a range, per spec's three-step
/// recovery ladder. `ParseError` already carries the index as a typed
/// field rather than embedded in message text, so there is no "extract
/// `position N` via regex" step here -- that's the same information,
/// just not round-tripped through a string first.
fn recover_diagnostic(err: &ParseError, tokens: &[Token]) -> Diagnostic {
    let range = if let Some(token) = tokens.get(err.token_index) {
        token.range
    } else if let Some(last) = last_non_eof_token(tokens) {
        Range::point(last.range.end)
    } else {
        Range::new(0, 1)
    };
    Diagnostic::error(range, "parser", err.message.clone())
}

fn parse_document(uri: &str, text: String, version: i32, hash: u64) -> Document {
    let lex_output = kcl_lexer::lex(&text);
    let tokens = lex_output.tokens;
    let line_index = LineIndex::new(&text);

    let outcome = match kcl_parser::parse(&text) {
        Ok(program) => ParseOutcome::Ok(program),
        Err(err) => ParseOutcome::Err(recover_diagnostic(&err, &tokens)),
    };

    Document { uri: uri.to_string(), text, version, hash, line_index, tokens, outcome }
}

/// URI-keyed cache of parsed documents. Accessed only from the owning
/// loop thread (LSP dispatch or the CLI's single-shot run), so there is
/// no internal locking -- any concurrency-safe wrapping happens at the
/// call site, not in this type.
#[derive(Default)]
pub struct DocumentStore {
    documents: FxHashMap<String, Arc<Document>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self { documents: FxHashMap::default() }
    }

    /// `textDocument/didOpen`. Always (re)parses.
    pub fn open(&mut self, uri: impl Into<String>, text: String, version: i32) -> Arc<Document> {
        let uri = uri.into();
        let hash = fnv1a(text.as_bytes());
        let doc = Arc::new(parse_document(&uri, text, version, hash));
        self.documents.insert(uri, doc.clone());
        doc
    }

    /// `textDocument/didChange`. Short-circuits when `text` hashes the
    /// same as the cached entry, returning that entry's `Arc` untouched.
    pub fn update(&mut self, uri: &str, text: String, version: i32) -> Arc<Document> {
        let hash = fnv1a(text.as_bytes());
        if let Some(existing) = self.documents.get(uri) {
            if existing.hash == hash {
                return existing.clone();
            }
        }
        let doc = Arc::new(parse_document(uri, text, version, hash));
        self.documents.insert(uri.to_string(), doc.clone());
        doc
    }

    /// `textDocument/didClose`. Evicts the entry.
    pub fn close(&mut self, uri: &str) -> Option<Arc<Document>> {
        self.documents.remove(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&Arc<Document>> {
        self.documents.get(uri)
    }
}
