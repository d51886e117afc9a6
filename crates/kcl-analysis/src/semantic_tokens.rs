//! `textDocument/semanticTokens/full` (spec §4.I): one delta-encoded
//! 5-tuple per lexer token, re-classifying plain identifiers against the
//! stdlib registry, constant tables, and the document's own top-level
//! declarations.

use tower_lsp::lsp_types::{SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokens};

use kcl_ast::{Program, StmtKind};
use kcl_common::{Position, Token, TokenKind};
use kcl_docstore::Document;

pub const TOKEN_TYPES: &[SemanticTokenType] = &[
    SemanticTokenType::KEYWORD,
    SemanticTokenType::NUMBER,
    SemanticTokenType::STRING,
    SemanticTokenType::OPERATOR,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::FUNCTION,
];

pub const TOKEN_MODIFIERS: &[SemanticTokenModifier] = &[
    SemanticTokenModifier::READONLY,
    SemanticTokenModifier::DEFAULT_LIBRARY,
    SemanticTokenModifier::DECLARATION,
];

const TYPE_KEYWORD: u32 = 0;
const TYPE_NUMBER: u32 = 1;
const TYPE_STRING: u32 = 2;
const TYPE_OPERATOR: u32 = 3;
const TYPE_VARIABLE: u32 = 4;
const TYPE_FUNCTION: u32 = 5;

const MOD_READONLY: u32 = 1 << 0;
const MOD_DEFAULT_LIBRARY: u32 = 1 << 1;
const MOD_DECLARATION: u32 = 1 << 2;

fn top_level_declared_names(program: &Program) -> Vec<&str> {
    program
        .statements
        .iter()
        .filter_map(|stmt| {
            let kind = match &stmt.kind {
                StmtKind::Export(inner) => &inner.kind,
                other => other,
            };
            match kind {
                StmtKind::Let { name, .. } => Some(name.as_str()),
                StmtKind::FnDef { name, .. } => Some(name.as_str()),
                _ => None,
            }
        })
        .collect()
}

fn classify_identifier(name: &str, declared: &[&str]) -> (u32, u32) {
    if kcl_stdlib::registry().contains_key(name) {
        return (TYPE_FUNCTION, MOD_DEFAULT_LIBRARY);
    }
    if kcl_stdlib::is_plane_constant(name)
        || kcl_stdlib::is_math_constant(name)
        || kcl_stdlib::is_unit_symbol(name)
        || kcl_stdlib::is_tag_sentinel(name)
    {
        return (TYPE_VARIABLE, MOD_READONLY | MOD_DEFAULT_LIBRARY);
    }
    if declared.contains(&name) {
        return (TYPE_VARIABLE, MOD_DECLARATION);
    }
    (TYPE_VARIABLE, 0)
}

fn classify(token: &Token, declared: &[&str]) -> Option<(u32, u32)> {
    match &token.kind {
        TokenKind::Keyword(_) => Some((TYPE_KEYWORD, 0)),
        TokenKind::Number(..) => Some((TYPE_NUMBER, 0)),
        TokenKind::String(_) => Some((TYPE_STRING, 0)),
        TokenKind::Op(_) | TokenKind::Symbol(_) | TokenKind::Pipe | TokenKind::DoubleColon => {
            Some((TYPE_OPERATOR, 0))
        }
        TokenKind::Identifier(name) => Some(classify_identifier(name, declared)),
        TokenKind::Eof => None,
    }
}

pub fn semantic_tokens(doc: &Document) -> SemanticTokens {
    let declared = doc.outcome.program().map(top_level_declared_names).unwrap_or_default();

    let mut data = Vec::new();
    let mut prev = Position::new(0, 0);

    for token in &doc.tokens {
        let Some((token_type, token_modifiers)) = classify(token, &declared) else { continue };
        let start = doc.line_index.offset_to_position(token.range.start);

        let delta_line = start.line - prev.line;
        let delta_start = if delta_line == 0 { start.character - prev.character } else { start.character };

        data.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.range.len(),
            token_type,
            token_modifiers_bitset: token_modifiers,
        });

        prev = start;
    }

    SemanticTokens { result_id: None, data }
}
