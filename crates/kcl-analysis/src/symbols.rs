//! `textDocument/documentSymbol` (spec §4.I): an outline built straight
//! from the AST, not the token stream. `Export` recurses into the
//! statement it wraps rather than appearing as its own entry.

use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

use kcl_ast::{Program, Stmt, StmtKind};
use kcl_docstore::Document;

#[allow(deprecated)]
fn symbol(name: &str, detail: Option<String>, kind: SymbolKind, doc: &Document, range: kcl_common::Range) -> DocumentSymbol {
    let lsp_range = crate::lsp_range(doc, range);
    DocumentSymbol {
        name: name.to_string(),
        detail,
        kind,
        tags: None,
        deprecated: None,
        range: lsp_range,
        selection_range: lsp_range,
        children: None,
    }
}

fn symbol_for(stmt: &Stmt, doc: &Document) -> Option<DocumentSymbol> {
    match &stmt.kind {
        StmtKind::Let { name, .. } => Some(symbol(name, None, SymbolKind::VARIABLE, doc, stmt.range)),
        StmtKind::FnDef { name, params, .. } => {
            let detail = format!("fn({})", params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", "));
            Some(symbol(name, Some(detail), SymbolKind::FUNCTION, doc, stmt.range))
        }
        StmtKind::Export(inner) => symbol_for(inner, doc),
        _ => None,
    }
}

pub fn document_symbols(doc: &Document) -> Vec<DocumentSymbol> {
    let Some(program) = doc.outcome.program() else {
        return Vec::new();
    };
    symbols_of(program, doc)
}

fn symbols_of(program: &Program, doc: &Document) -> Vec<DocumentSymbol> {
    program.statements.iter().filter_map(|stmt| symbol_for(stmt, doc)).collect()
}
