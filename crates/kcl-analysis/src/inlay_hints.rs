//! `textDocument/inlayHint` (spec §4.I): an ordinal label (`$0`, `$1`, ...)
//! at the start of every positional call argument. Named arguments
//! (`width = 1`) already read fine without a hint and are skipped.

use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel};

use kcl_ast::{Arg, ArgKey, Expr, ExprKind, Visitor, walk_program};
use kcl_docstore::Document;

struct PositionalArgCollector {
    hints: Vec<(kcl_common::Range, usize)>,
}

impl Visitor for PositionalArgCollector {
    fn enter_expr(&mut self, expr: &Expr) -> bool {
        if let ExprKind::Call { args, .. } = &expr.kind {
            for arg in args {
                if let Arg { key: ArgKey::Positional(index), value } = arg {
                    self.hints.push((value.range, *index));
                }
            }
        }
        true
    }
}

pub fn inlay_hints(doc: &Document) -> Vec<InlayHint> {
    let Some(program) = doc.outcome.program() else {
        return Vec::new();
    };

    let mut collector = PositionalArgCollector { hints: Vec::new() };
    walk_program(program, &mut collector);

    collector
        .hints
        .into_iter()
        .map(|(range, index)| InlayHint {
            position: crate::lsp_position(doc.line_index.offset_to_position(range.start)),
            label: InlayHintLabel::String(format!("${index}:")),
            kind: Some(InlayHintKind::PARAMETER),
            text_edits: None,
            tooltip: None,
            padding_left: None,
            padding_right: Some(true),
            data: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    #[test]
    fn positional_arguments_get_ordinal_hints() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "cylinder(1, 2)\n".to_string(), 1);
        let hints = inlay_hints(&doc);
        assert_eq!(hints.len(), 2);
        assert!(matches!(&hints[0].label, InlayHintLabel::String(s) if s == "$0:"));
        assert!(matches!(&hints[1].label, InlayHintLabel::String(s) if s == "$1:"));
    }

    #[test]
    fn named_arguments_get_no_hint() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "box(width = 1, height = 2, depth = 3)\n".to_string(), 1);
        let hints = inlay_hints(&doc);
        assert!(hints.is_empty());
    }

    #[test]
    fn parse_failure_yields_no_hints() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let = 1\n".to_string(), 1);
        assert!(inlay_hints(&doc).is_empty());
    }
}
