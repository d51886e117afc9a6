//! `textDocument/prepareRename` and `textDocument/rename` (spec §4.I).
//! Scope-blind: every identifier token spelled like the target is
//! replaced, document-wide.

use std::collections::HashMap;

use tower_lsp::lsp_types::{PrepareRenameResponse, Position, TextEdit, Url, WorkspaceEdit};

use kcl_docstore::Document;

pub fn prepare_rename(doc: &Document, position: Position) -> Option<PrepareRenameResponse> {
    let offset = crate::offset_of(doc, position);
    let token = crate::token_at_offset(&doc.tokens, offset)?;
    let name = crate::identifier_text(token)?;
    Some(PrepareRenameResponse::RangeWithPlaceholder {
        range: crate::lsp_range(doc, token.range),
        placeholder: name.to_string(),
    })
}

pub fn rename(doc: &Document, position: Position, new_name: &str, uri: Url) -> Option<WorkspaceEdit> {
    let offset = crate::offset_of(doc, position);
    let token = crate::token_at_offset(&doc.tokens, offset)?;
    let name = crate::identifier_text(token)?;

    let edits: Vec<TextEdit> = doc
        .tokens
        .iter()
        .filter(|t| matches!(crate::identifier_text(t), Some(n) if n == name))
        .map(|t| TextEdit { range: crate::lsp_range(doc, t.range), new_text: new_name.to_string() })
        .collect();

    let mut changes = HashMap::new();
    changes.insert(uri, edits);
    Some(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    fn url() -> Url {
        Url::parse("file:///a.kcl").unwrap()
    }

    #[test]
    fn prepare_rename_returns_the_identifiers_own_range_and_text() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let radius = 1\n".to_string(), 1);
        let response = prepare_rename(&doc, Position::new(0, 5)).unwrap();
        match response {
            PrepareRenameResponse::RangeWithPlaceholder { placeholder, .. } => {
                assert_eq!(placeholder, "radius");
            }
            _ => panic!("expected RangeWithPlaceholder"),
        }
    }

    #[test]
    fn rename_replaces_every_occurrence_document_wide() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let radius = 1\nlet area = radius\n".to_string(), 1);
        let edit = rename(&doc, Position::new(0, 5), "r", url()).unwrap();
        let edits = edit.changes.unwrap().remove(&url()).unwrap();
        assert_eq!(edits.len(), 2);
        assert!(edits.iter().all(|e| e.new_text == "r"));
    }

    #[test]
    fn rename_on_non_identifier_fails() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let x = 1\n".to_string(), 1);
        assert!(rename(&doc, Position::new(0, 8), "y", url()).is_none());
    }
}
