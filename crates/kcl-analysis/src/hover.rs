//! `textDocument/hover` (spec §4.I).

use tower_lsp::lsp_types::{Hover, HoverContents, MarkedString, Position};

use kcl_ast::{Program, StmtKind};
use kcl_common::{Keyword, Token, TokenKind};
use kcl_docstore::Document;
use kcl_stdlib::Signature;

fn local_definition(program: &Program, name: &str) -> Option<String> {
    for stmt in &program.statements {
        let kind = match &stmt.kind {
            StmtKind::Export(inner) => &inner.kind,
            other => other,
        };
        match kind {
            StmtKind::Let { name: n, .. } if n == name => return Some(format!("let {n}")),
            StmtKind::FnDef { name: n, params, .. } if n == name => {
                let params = params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ");
                return Some(format!("fn {n}({params})"));
            }
            _ => {}
        }
    }
    None
}

fn stdlib_signature_text(name: &str, sig: &Signature) -> String {
    if sig.variadic {
        return format!("fn {name}(...) -> {:?}", sig.return_kind);
    }
    let params = sig
        .params
        .iter()
        .map(|p| if p.optional { format!("{}?: {:?}", p.name, p.kind) } else { format!("{}: {:?}", p.name, p.kind) })
        .collect::<Vec<_>>()
        .join(", ");
    format!("fn {name}({params}) -> {:?}", sig.return_kind)
}

fn classify_identifier(program: Option<&Program>, name: &str) -> String {
    let registry = kcl_stdlib::registry();
    if let Some(sig) = registry.get(name) {
        return stdlib_signature_text(name, sig);
    }
    if kcl_stdlib::is_plane_constant(name) {
        return format!("plane {name}");
    }
    if kcl_stdlib::is_math_constant(name) {
        return format!("constant {name}");
    }
    if kcl_stdlib::is_unit_symbol(name) {
        return format!("unit {name}");
    }
    if kcl_stdlib::is_tag_sentinel(name) {
        return format!("tag {name}");
    }
    if let Some(program) = program {
        if let Some(text) = local_definition(program, name) {
            return text;
        }
    }
    name.to_string()
}

fn hover_text(token: &Token, program: Option<&Program>) -> String {
    match &token.kind {
        TokenKind::Number(value, Some(unit)) => format!("{value}{unit}"),
        TokenKind::Number(value, None) => format!("{value}"),
        TokenKind::String(text) => format!("\"{text}\""),
        TokenKind::Keyword(kw) => keyword_text(*kw),
        TokenKind::Identifier(name) => classify_identifier(program, name),
        other => other_token_text(other),
    }
}

fn keyword_text(kw: Keyword) -> String {
    format!("keyword {}", kw.as_str())
}

fn other_token_text(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Symbol(c) => c.to_string(),
        TokenKind::Op(op) => op.as_str().to_string(),
        TokenKind::Pipe => "|>".to_string(),
        TokenKind::DoubleColon => "::".to_string(),
        _ => String::new(),
    }
}

pub fn hover(doc: &Document, position: Position) -> Option<Hover> {
    let offset = crate::offset_of(doc, position);
    let token = crate::token_at_offset(&doc.tokens, offset)?;
    let text = hover_text(token, doc.outcome.program());
    Some(Hover {
        contents: HoverContents::Scalar(MarkedString::String(text)),
        range: Some(crate::lsp_range(doc, token.range)),
    })
}
