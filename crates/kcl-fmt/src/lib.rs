//! Deterministic AST+trivia formatter (spec §4.J).
//!
//! A direct recursive printer over the plain AST rather than a generic
//! group/break document engine: every construct has its own fixed
//! line-length threshold (40 or 60 chars) instead of one uniform line-fit
//! policy, so an intermediate IR buys nothing here.

mod expr;
mod stmt;
mod ty;

use kcl_ast::{Program, Stmt, StmtKind};
use kcl_common::TriviaItem;

pub(crate) fn indent(level: usize) -> String {
    "  ".repeat(level)
}

/// Comments pass through verbatim; a run of blank lines is capped at 2 when
/// re-emitted, whatever the original count was.
pub(crate) fn emit_trivia(out: &mut String, items: &[TriviaItem], level: usize) {
    for item in items {
        match item {
            TriviaItem::Comment { text, is_block, .. } => {
                out.push_str(&indent(level));
                if *is_block {
                    out.push_str("/*");
                    out.push_str(text);
                    out.push_str("*/\n");
                } else {
                    out.push_str("//");
                    out.push_str(text);
                    out.push('\n');
                }
            }
            TriviaItem::BlankRun { count, .. } => {
                for _ in 0..(*count).min(2) {
                    out.push('\n');
                }
            }
        }
    }
}

pub(crate) fn trailing_comment(item: &Option<TriviaItem>) -> String {
    match item {
        Some(TriviaItem::Comment { text, is_block: true, .. }) => format!("  /*{text}*/"),
        Some(TriviaItem::Comment { text, is_block: false, .. }) => format!("  //{text}"),
        _ => String::new(),
    }
}

fn is_import_stmt(stmt: &Stmt) -> bool {
    matches!(stmt.kind, StmtKind::Import { .. } | StmtKind::ExportImport { .. })
}

fn is_fn_def(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::FnDef { .. } => true,
        StmtKind::Export(inner) => matches!(inner.kind, StmtKind::FnDef { .. }),
        _ => false,
    }
}

/// Render a whole program: leading trivia, each statement prefaced by its
/// own leading trivia and followed by its trailing comment (if any), with
/// a blank line inserted before/after every `FnDef` and at every
/// import/non-import boundary, trailing trivia, exactly one final newline.
pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    emit_trivia(&mut out, &program.leading_trivia, 0);

    let mut prev_was_fn_def = false;
    let mut prev_was_import = false;
    for (i, stmt) in program.statements.iter().enumerate() {
        let this_is_fn_def = is_fn_def(stmt);
        let this_is_import = is_import_stmt(stmt);

        if i > 0 {
            let blank_needed =
                this_is_fn_def || prev_was_fn_def || (prev_was_import != this_is_import);
            if blank_needed && !out.ends_with("\n\n") {
                out.push('\n');
            }
        }

        emit_trivia(&mut out, &stmt.trivia.leading, 0);
        out.push_str(&stmt::format_stmt(stmt, 0));
        out.push_str(&trailing_comment(&stmt.trivia.trailing));
        out.push('\n');

        prev_was_fn_def = this_is_fn_def;
        prev_was_import = this_is_import;
    }

    emit_trivia(&mut out, &program.trailing_trivia, 0);

    while out.ends_with("\n\n") {
        out.pop();
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_source(src: &str) -> String {
        let program = kcl_parser::parse(src).expect("should parse");
        format_program(&program)
    }

    #[test]
    fn file_ends_with_exactly_one_newline() {
        let out = format_source("let x = 1");
        assert!(out.ends_with('\n'));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn let_and_assign_render_plainly() {
        assert_eq!(format_source("let x = 1"), "let x = 1\n");
        assert_eq!(format_source("x = 1"), "x = 1\n");
    }

    #[test]
    fn short_fn_def_collapses_to_single_line() {
        let out = format_source("fn add(a, b) { return a + b }");
        assert_eq!(out, "fn add(a, b) { return a + b }\n");
    }

    #[test]
    fn long_return_expression_forces_multiline_fn_def() {
        let out = format_source(
            "fn longName(a, b) { return a + b + a + b + a + b + a + b + a + b + a + b }",
        );
        assert!(out.contains("fn longName(a, b) {\n"));
        assert!(out.trim_end().ends_with('}'));
    }

    #[test]
    fn fn_def_gets_blank_lines_before_and_after() {
        let out = format_source("let a = 1\nfn f() { return 1 }\nlet b = 2");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["let a = 1", "", "fn f() { return 1 }", "", "let b = 2"]);
    }

    #[test]
    fn call_with_short_args_is_single_line() {
        assert_eq!(
            format_source("box(width = 1, height = 2, depth = 3)"),
            "box(width = 1, height = 2, depth = 3)\n"
        );
    }

    #[test]
    fn call_with_long_args_breaks_one_per_line() {
        let out =
            format_source("fuse(firstShapeName, secondShapeName, thirdShapeName, fourthShapeName)");
        assert!(out.contains("fuse(\n"));
        assert!(out.contains("  firstShapeName,\n"));
    }

    #[test]
    fn short_array_is_single_line() {
        assert_eq!(format_source("let a = [1, 2, 3]"), "let a = [1, 2, 3]\n");
    }

    #[test]
    fn long_array_breaks_one_per_line() {
        let out = format_source("let a = [1111111, 2222222, 3333333, 4444444, 5555555]");
        assert!(out.contains("[\n"));
        assert!(out.contains("  1111111,\n"));
    }

    #[test]
    fn precedence_parens_round_trip() {
        let out = format_source("let a = (1 + 2) * 3");
        assert_eq!(out, "let a = (1 + 2) * 3\n");
        assert_eq!(format_source(out.trim_end()), out);
    }

    #[test]
    fn unparenthesized_precedence_stays_unparenthesized() {
        let out = format_source("let a = 1 + 2 * 3");
        assert_eq!(out, "let a = 1 + 2 * 3\n");
    }

    #[test]
    fn right_associative_pow_parenthesizes_left_operand_only_when_needed() {
        assert_eq!(format_source("let a = 2 ^ 2 ^ 3"), "let a = 2 ^ 2 ^ 3\n");
        assert_eq!(format_source("let a = (2 ^ 2) ^ 3"), "let a = (2 ^ 2) ^ 3\n");
    }

    #[test]
    fn pipe_has_no_line_breaking() {
        let out = format_source("let s = XY |> startSketchOn() |> startProfile(at = [0, 0])");
        assert_eq!(out, "let s = XY |> startSketchOn() |> startProfile(at = [0, 0])\n");
    }

    #[test]
    fn if_expression_uses_inline_form() {
        let out = format_source("let a = if x { 1 } else { 2 }");
        assert_eq!(out, "let a = if x { 1 } else { 2 }\n");
    }

    #[test]
    fn import_runs_are_blank_separated_from_following_statements() {
        let out = format_source("import \"a.kcl\"\nimport \"b.kcl\"\nlet x = 1");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["import \"a.kcl\"", "import \"b.kcl\"", "", "let x = 1"]);
    }

    #[test]
    fn formatting_is_idempotent_on_a_whole_program() {
        let src =
            "import \"a.kcl\"\n\nfn add(a, b) { return a + b }\n\nlet total = add(a = 1, b = 2)\n";
        let once = format_source(src);
        let twice = format_source(&once);
        assert_eq!(once, twice);
    }
}
