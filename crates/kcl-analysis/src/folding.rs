//! `textDocument/foldingRange` (spec §4.I): brace-pair folds from the raw
//! token stream plus one fold over each run of consecutive top-level
//! `import` statements.

use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind};

use kcl_ast::StmtKind;
use kcl_common::TokenKind;
use kcl_docstore::Document;

fn brace_pairs(doc: &Document) -> Vec<FoldingRange> {
    let mut stack = Vec::new();
    let mut ranges = Vec::new();

    for token in &doc.tokens {
        match token.kind {
            TokenKind::Symbol('{') => stack.push(token.range.start),
            TokenKind::Symbol('}') => {
                if let Some(open_offset) = stack.pop() {
                    let start = doc.line_index.offset_to_position(open_offset);
                    let end = doc.line_index.offset_to_position(token.range.start);
                    if start.line < end.line {
                        ranges.push(FoldingRange {
                            start_line: start.line,
                            start_character: Some(start.character),
                            end_line: end.line,
                            end_character: Some(end.character),
                            kind: Some(FoldingRangeKind::Region),
                            collapsed_text: None,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    ranges
}

fn import_runs(doc: &Document) -> Vec<FoldingRange> {
    let Some(program) = doc.outcome.program() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let mut run_start: Option<kcl_common::Range> = None;
    let mut run_end: Option<kcl_common::Range> = None;

    for stmt in &program.statements {
        if matches!(stmt.kind, StmtKind::Import { .. }) {
            if run_start.is_none() {
                run_start = Some(stmt.range);
            }
            run_end = Some(stmt.range);
        } else if let (Some(start), Some(end)) = (run_start.take(), run_end.take()) {
            push_import_fold(doc, start, end, &mut ranges);
        }
    }
    if let (Some(start), Some(end)) = (run_start, run_end) {
        push_import_fold(doc, start, end, &mut ranges);
    }

    ranges
}

fn push_import_fold(doc: &Document, start: kcl_common::Range, end: kcl_common::Range, out: &mut Vec<FoldingRange>) {
    let start_pos = doc.line_index.offset_to_position(start.start);
    let end_pos = doc.line_index.offset_to_position(end.end);
    if start_pos.line < end_pos.line {
        out.push(FoldingRange {
            start_line: start_pos.line,
            start_character: None,
            end_line: end_pos.line,
            end_character: None,
            kind: Some(FoldingRangeKind::Imports),
            collapsed_text: None,
        });
    }
}

pub fn folding_ranges(doc: &Document) -> Vec<FoldingRange> {
    let mut ranges = brace_pairs(doc);
    ranges.extend(import_runs(doc));
    ranges
}
