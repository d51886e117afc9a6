//! Semantic services consumed by the LSP server (spec §4.I): one pure
//! function per request, each taking a [`kcl_docstore::Document`] (plus a
//! cursor position or similar where relevant) and returning `tower_lsp`
//! value types directly. None of this crate owns any state -- caching
//! lives one layer down in `kcl-docstore`.

pub mod code_actions;
pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod folding;
pub mod hover;
pub mod inlay_hints;
pub mod rename;
pub mod semantic_tokens;
pub mod signature_help;
pub mod symbols;

use kcl_common::{Position, Range, Token};
use kcl_docstore::Document;

/// Convert our byte-offset [`Range`] to an LSP line/character range via
/// the document's line index. Exposed so `kcl-lsp` can convert
/// diagnostics this crate doesn't itself produce LSP shapes for.
pub fn lsp_range(doc: &Document, range: Range) -> tower_lsp::lsp_types::Range {
    let pr = doc.line_index.range_to_position_range(range);
    tower_lsp::lsp_types::Range {
        start: lsp_position(pr.start),
        end: lsp_position(pr.end),
    }
}

pub fn lsp_position(pos: Position) -> tower_lsp::lsp_types::Position {
    tower_lsp::lsp_types::Position { line: pos.line, character: pos.character }
}

/// LSP position -> byte offset into `doc`'s text.
pub(crate) fn offset_of(doc: &Document, position: tower_lsp::lsp_types::Position) -> u32 {
    doc.line_index.position_to_offset(Position::new(position.line, position.character))
}

/// The token whose range contains `offset`, inclusive at both ends so a
/// cursor sitting right after an identifier still resolves to it.
pub(crate) fn token_at_offset(tokens: &[Token], offset: u32) -> Option<&Token> {
    tokens.iter().find(|t| !t.is_eof() && t.range.contains_offset(offset))
}

pub(crate) fn identifier_text(token: &Token) -> Option<&str> {
    match &token.kind {
        kcl_common::TokenKind::Identifier(name) => Some(name.as_str()),
        _ => None,
    }
}
