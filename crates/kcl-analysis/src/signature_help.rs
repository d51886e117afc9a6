//! `textDocument/signatureHelp` (spec §4.I). Finds the innermost unmatched
//! `(` before the cursor by walking the token stream with a bracket stack,
//! counts top-level commas since that `(` for the active-parameter index,
//! and looks up the preceding identifier in the stdlib registry.

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    ParameterInformation, ParameterLabel, Position, SignatureHelp, SignatureInformation,
};

use kcl_common::TokenKind;
use kcl_docstore::Document;

fn matching_open(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        '}' => '{',
        _ => unreachable!(),
    }
}

/// `(stack of unmatched opens as token indices, comma count per paren)`.
fn scan_brackets(doc: &Document, offset: u32) -> (Vec<(char, usize)>, HashMap<usize, u32>) {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut comma_counts: HashMap<usize, u32> = HashMap::new();

    for (i, token) in doc.tokens.iter().enumerate() {
        if token.range.start >= offset {
            break;
        }
        let TokenKind::Symbol(c) = token.kind else { continue };
        match c {
            '(' | '[' | '{' => stack.push((c, i)),
            ')' | ']' | '}' => {
                if matches!(stack.last(), Some((open, _)) if *open == matching_open(c)) {
                    stack.pop();
                }
            }
            ',' => {
                if let Some(&('(', paren_idx)) = stack.last() {
                    *comma_counts.entry(paren_idx).or_insert(0) += 1;
                }
            }
            _ => {}
        }
    }

    (stack, comma_counts)
}

pub fn signature_help(doc: &Document, position: Position) -> Option<SignatureHelp> {
    let offset = crate::offset_of(doc, position);
    let (stack, comma_counts) = scan_brackets(doc, offset);
    let &(open, paren_idx) = stack.last()?;
    if open != '(' {
        return None;
    }

    let callee_token = doc.tokens.get(paren_idx.checked_sub(1)?)?;
    let name = crate::identifier_text(callee_token)?;
    let registry = kcl_stdlib::registry();
    let sig = registry.get(name)?;

    let parameters: Vec<ParameterInformation> = sig
        .params
        .iter()
        .map(|p| ParameterInformation {
            label: ParameterLabel::Simple(format!("{}: {:?}", p.name, p.kind)),
            documentation: None,
        })
        .collect();
    let label = format!(
        "{name}({}) -> {:?}",
        parameters
            .iter()
            .map(|p| match &p.label {
                ParameterLabel::Simple(s) => s.clone(),
                ParameterLabel::LabelOffsets(_) => String::new(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        sig.return_kind
    );

    let active_parameter = *comma_counts.get(&paren_idx).unwrap_or(&0);

    Some(SignatureHelp {
        signatures: vec![SignatureInformation {
            label,
            documentation: None,
            parameters: Some(parameters),
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: Some(active_parameter),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_docstore::DocumentStore;

    #[test]
    fn signature_help_right_after_open_paren_has_active_parameter_zero() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "sphere(1)\n".to_string(), 1);
        let help = signature_help(&doc, Position::new(0, 7)).unwrap();
        assert_eq!(help.active_parameter, Some(0));
        assert_eq!(help.signatures[0].parameters.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn signature_help_after_comma_advances_active_parameter() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "cylinder(1, 2)\n".to_string(), 1);
        let help = signature_help(&doc, Position::new(0, 13)).unwrap();
        assert_eq!(help.active_parameter, Some(1));
    }

    #[test]
    fn commas_inside_nested_arrays_do_not_advance_the_active_parameter() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "fuse([1, 2], 3)\n".to_string(), 1);
        let help = signature_help(&doc, Position::new(0, 14));
        assert!(help.is_some());
        assert_eq!(help.unwrap().active_parameter, Some(1));
    }

    #[test]
    fn no_open_call_returns_none() {
        let mut store = DocumentStore::new();
        let doc = store.open("file:///a.kcl", "let x = 1\n".to_string(), 1);
        assert!(signature_help(&doc, Position::new(0, 5)).is_none());
    }
}
