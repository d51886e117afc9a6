//! `textDocument/codeAction` (spec §4.I). Every fix is a fixed,
//! source-specific text edit -- there's no general-purpose patch engine
//! here, just a lookup table from diagnostic shape to edit.

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, TextEdit, Url, WorkspaceEdit,
};

use kcl_common::{Diagnostic, Range};
use kcl_docstore::Document;

fn edit_action(doc: &Document, title: &str, uri: &Url, range: Range, new_text: impl Into<String>) -> CodeActionOrCommand {
    let mut changes = HashMap::new();
    changes.insert(
        uri.clone(),
        vec![TextEdit { range: crate::lsp_range(doc, range), new_text: new_text.into() }],
    );
    CodeActionOrCommand::CodeAction(CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: None,
        edit: Some(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None }),
        command: None,
        is_preferred: Some(true),
        disabled: None,
        data: None,
    })
}

fn unknown_function_name(message: &str) -> Option<&str> {
    message.strip_prefix("Unknown operation: ")
}

fn quick_fix_for(doc: &Document, uri: &Url, diagnostic: &Diagnostic) -> Option<CodeActionOrCommand> {
    match diagnostic.source {
        "deprecated" => {
            let delete_range = Range::new(diagnostic.range.start, diagnostic.range.start + 4);
            Some(edit_action(doc, "Remove deprecated 'let'", uri, delete_range, ""))
        }
        "parser" if diagnostic.message.contains("Expected '}'") => {
            let insertion = Range::point(diagnostic.range.end);
            Some(edit_action(doc, "Insert missing '}'", uri, insertion, "}"))
        }
        "typecheck" => {
            let name = unknown_function_name(&diagnostic.message)?;
            let stub = format!("fn {name}() {{\n    \n}}\n\n");
            Some(edit_action(doc, &format!("Stub out fn {name}"), uri, Range::point(0), stub))
        }
        _ => None,
    }
}

fn source_action(title: &str) -> CodeActionOrCommand {
    CodeActionOrCommand::CodeAction(CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::SOURCE),
        diagnostics: None,
        edit: None,
        command: None,
        is_preferred: None,
        disabled: None,
        data: None,
    })
}

fn add_let_action(doc: &Document, uri: &Url) -> CodeActionOrCommand {
    let mut changes = HashMap::new();
    changes.insert(
        uri.clone(),
        vec![TextEdit {
            range: crate::lsp_range(doc, Range::point(0)),
            new_text: "let value = 0\n".to_string(),
        }],
    );
    CodeActionOrCommand::CodeAction(CodeAction {
        title: "Add let".to_string(),
        kind: Some(CodeActionKind::SOURCE),
        diagnostics: None,
        edit: Some(WorkspaceEdit { changes: Some(changes), document_changes: None, change_annotations: None }),
        command: None,
        is_preferred: None,
        disabled: None,
        data: None,
    })
}

pub fn code_actions(doc: &Document, uri: Url, diagnostics: &[Diagnostic]) -> Vec<CodeActionOrCommand> {
    let mut actions: Vec<CodeActionOrCommand> =
        diagnostics.iter().filter_map(|d| quick_fix_for(doc, &uri, d)).collect();

    actions.push(source_action("Organize imports"));
    actions.push(add_let_action(doc, &uri));

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    fn url() -> Url {
        Url::parse("file:///a.kcl").unwrap()
    }

    #[test]
    fn deprecated_let_offers_a_delete_fix() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let x = 1\n".to_string(), 1);
        let diags = crate::diagnostics::diagnostics(&doc);
        let actions = code_actions(&doc, url(), &diags);
        let fix = actions.iter().find_map(|a| match a {
            CodeActionOrCommand::CodeAction(action) if action.title == "Remove deprecated 'let'" => Some(action),
            _ => None,
        });
        assert!(fix.is_some());
    }

    #[test]
    fn unknown_function_offers_a_stub_fix() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "mystery(1)\n".to_string(), 1);
        let diags = crate::diagnostics::diagnostics(&doc);
        assert!(diags.iter().any(|d| d.message == "Unknown operation: mystery"));
        let actions = code_actions(&doc, url(), &diags);
        assert!(actions.iter().any(|a| matches!(a, CodeActionOrCommand::CodeAction(action) if action.title.contains("mystery"))));
    }

    #[test]
    fn source_actions_are_always_present() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let x = 1\n".to_string(), 1);
        let actions = code_actions(&doc, url(), &[]);
        assert!(actions.iter().any(|a| matches!(a, CodeActionOrCommand::CodeAction(action) if action.title == "Organize imports")));
        assert!(actions.iter().any(|a| matches!(a, CodeActionOrCommand::CodeAction(action) if action.title == "Add let")));
    }
}
