//! `textDocument/definition` (spec §4.I). Document-local only: the first
//! `let`/`fn` token pair whose name matches the identifier under the
//! cursor, scanning the token stream in order.

use tower_lsp::lsp_types::{Location, Position, Url};

use kcl_common::{Keyword, Token, TokenKind};
use kcl_docstore::Document;

fn find_definition_token<'a>(tokens: &'a [Token], name: &str) -> Option<&'a Token> {
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        let is_def_keyword =
            matches!(token.kind, TokenKind::Keyword(Keyword::Let) | TokenKind::Keyword(Keyword::Fn));
        if !is_def_keyword {
            continue;
        }
        if let Some(next) = iter.peek() {
            if matches!(&next.kind, TokenKind::Identifier(n) if n == name) {
                return Some(next);
            }
        }
    }
    None
}

pub fn definition(doc: &Document, position: Position, uri: Url) -> Option<Location> {
    let offset = crate::offset_of(doc, position);
    let token = crate::token_at_offset(&doc.tokens, offset)?;
    let name = crate::identifier_text(token)?;
    let target = find_definition_token(&doc.tokens, name)?;
    Some(Location { uri, range: crate::lsp_range(doc, target.range) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    fn url() -> Url {
        Url::parse("file:///a.kcl").unwrap()
    }

    #[test]
    fn resolves_a_variable_reference_to_its_let_binding() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let x = 1\nlet y = x\n".to_string(), 1);
        let use_offset = doc.text.rfind('x').unwrap() as u32;
        let position = doc.line_index.offset_to_position(use_offset);
        let loc = definition(&doc, tower_lsp::lsp_types::Position::new(position.line, position.character), url())
            .unwrap();
        let def_offset = doc.line_index.position_to_offset(kcl_common::Position::new(
            loc.range.start.line,
            loc.range.start.character,
        ));
        assert_eq!(def_offset, 4);
    }

    #[test]
    fn unknown_identifier_has_no_definition() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "mystery\n".to_string(), 1);
        let result = definition(&doc, Position::new(0, 0), url());
        assert!(result.is_none());
    }
}
