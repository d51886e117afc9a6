//! `textDocument/completion` (spec §4.I): stdlib operations, constants,
//! keywords, and -- on a successful parse -- the document's own
//! top-level `let`/`fn` names.

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use kcl_ast::{Program, StmtKind};
use kcl_docstore::Document;

const KEYWORDS: &[&str] = &["let", "fn", "return", "if", "else", "import", "export"];

fn constant_item(name: &str) -> CompletionItem {
    CompletionItem {
        label: name.to_string(),
        kind: Some(CompletionItemKind::CONSTANT),
        detail: Some("constant".to_string()),
        ..Default::default()
    }
}

fn program_defined_names(program: &Program) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for stmt in &program.statements {
        let kind = match &stmt.kind {
            StmtKind::Export(inner) => &inner.kind,
            other => other,
        };
        match kind {
            StmtKind::Let { name, .. } => items.push(CompletionItem {
                label: name.clone(),
                kind: Some(CompletionItemKind::VARIABLE),
                ..Default::default()
            }),
            StmtKind::FnDef { name, .. } => items.push(CompletionItem {
                label: name.clone(),
                kind: Some(CompletionItemKind::FUNCTION),
                ..Default::default()
            }),
            _ => {}
        }
    }
    items
}

/// All completions visible in `doc`, unfiltered by typed prefix -- the LSP
/// client performs prefix filtering itself once the list is returned.
pub fn completions(doc: &Document) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    for name in kcl_stdlib::registry().keys() {
        items.push(CompletionItem {
            label: name.to_string(),
            kind: Some(CompletionItemKind::FUNCTION),
            ..Default::default()
        });
    }

    for &plane in kcl_stdlib::PLANES {
        items.push(constant_item(plane));
    }
    for &(name, _) in kcl_stdlib::MATH_CONSTANTS {
        items.push(constant_item(name));
    }
    for &unit in kcl_stdlib::UNIT_SYMBOLS {
        items.push(constant_item(unit));
    }

    for &kw in KEYWORDS {
        items.push(CompletionItem {
            label: kw.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..Default::default()
        });
    }

    if let Some(program) = doc.outcome.program() {
        items.extend(program_defined_names(program));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    #[test]
    fn completions_include_stdlib_operations() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "".to_string(), 1);
        let items = completions(&doc);
        assert!(items.iter().any(|i| i.label == "box"));
        assert!(items.iter().any(|i| i.label == "PI"));
        assert!(items.iter().any(|i| i.label == "let"));
    }

    #[test]
    fn completions_include_document_defined_names_only_on_successful_parse() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let radius = 2\nfn area() { return radius }\n".to_string(), 1);
        let items = completions(&doc);
        assert!(items.iter().any(|i| i.label == "radius" && i.kind == Some(CompletionItemKind::VARIABLE)));
        assert!(items.iter().any(|i| i.label == "area" && i.kind == Some(CompletionItemKind::FUNCTION)));
    }

    #[test]
    fn broken_document_still_returns_the_static_tiers() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let = ".to_string(), 1);
        let items = completions(&doc);
        assert!(items.iter().any(|i| i.label == "box"));
    }
}
