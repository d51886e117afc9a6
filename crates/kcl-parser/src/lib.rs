//! Recursive-descent parser for the kcl modeling language.
//!
//! Lexes, parses into the plain [`kcl_ast`] tree, attaches trivia to the
//! statements it surrounds, then runs the settings pass. Parsing is a
//! single fallible pass: the first grammar violation raises a [`ParseError`]
//! and parsing stops, there is no error recovery or diagnostic
//! accumulation at this layer.

pub mod error;
mod parser;
mod settings;
mod trivia;

pub use error::ParseError;

use kcl_ast::Program;
use kcl_common::LineIndex;

/// Parse `source` into a `Program`. Returns the first grammar error
/// encountered; there is no partial result on failure.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let lex_output = kcl_lexer::lex(source);
    let mut p = parser::Parser::new(lex_output.tokens);
    let mut program = p.parse_program()?;

    let line_index = LineIndex::new(source);
    trivia::attach_trivia(&mut program, lex_output.trivia, &line_index);
    settings::apply_settings(&mut program);

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_ast::{BinOp, ExprKind, StmtKind};
    use kcl_common::Unit;

    fn single_expr(source: &str) -> ExprKind {
        let program = parse(source).expect("should parse");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0].kind {
            StmtKind::ExprStmt(e) => e.kind.clone(),
            other => panic!("expected ExprStmt, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let kind = single_expr("1 + 2 * 3");
        match kind {
            ExprKind::BinaryOp(BinOp::Add, left, right) => {
                assert!(matches!(left.kind, ExprKind::Number(v, None) if v == 1.0));
                assert!(matches!(right.kind, ExprKind::BinaryOp(BinOp::Mul, ..)));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn addition_is_left_associative() {
        // (1 + 2) - 3
        let kind = single_expr("1 + 2 - 3");
        match kind {
            ExprKind::BinaryOp(BinOp::Sub, left, right) => {
                assert!(matches!(left.kind, ExprKind::BinaryOp(BinOp::Add, ..)));
                assert!(matches!(right.kind, ExprKind::Number(v, None) if v == 3.0));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn exponent_is_right_associative() {
        // 2 ^ (3 ^ 2)
        let kind = single_expr("2 ^ 3 ^ 2");
        match kind {
            ExprKind::BinaryOp(BinOp::Pow, left, right) => {
                assert!(matches!(left.kind, ExprKind::Number(v, None) if v == 2.0));
                assert!(matches!(right.kind, ExprKind::BinaryOp(BinOp::Pow, ..)));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn pipe_passes_left_operand_as_first_call_argument_via_substitution() {
        let kind = single_expr("10mm |> box(%)");
        match kind {
            ExprKind::Pipe(left, right) => {
                assert!(matches!(left.kind, ExprKind::Number(v, Some(Unit::Mm)) if v == 10.0));
                match right.kind {
                    ExprKind::Call { args, .. } => {
                        assert_eq!(args.len(), 1);
                        assert!(matches!(args[0].value.kind, ExprKind::PipeSubstitution));
                    }
                    other => panic!("expected call on pipe rhs, got {other:?}"),
                }
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn trailing_comma_in_array_is_accepted() {
        let kind = single_expr("[1, 2, 3,]");
        match kind {
            ExprKind::Array(items) => assert_eq!(items.len(), 3),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn trailing_comma_in_call_args_is_accepted() {
        let kind = single_expr("box(width = 1, height = 2,)");
        match kind {
            ExprKind::Call { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn array_followed_by_dotdot_becomes_inclusive_range() {
        let kind = single_expr("[1..5]");
        match kind {
            ExprKind::Range { inclusive, .. } => assert!(inclusive),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn array_followed_by_dotdotlt_becomes_exclusive_range() {
        let kind = single_expr("[1..<5]");
        match kind {
            ExprKind::Range { inclusive, .. } => assert!(!inclusive),
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn positional_call_args_assign_ascending_slots() {
        let kind = single_expr("fuse(a, b)");
        match kind {
            ExprKind::Call { args, .. } => {
                assert!(matches!(args[0].key, kcl_ast::ArgKey::Positional(0)));
                assert!(matches!(args[1].key, kcl_ast::ArgKey::Positional(1)));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn all_named_call_requires_every_arg_named() {
        let kind = single_expr("box(width = 1, height = 2)");
        match kind {
            ExprKind::Call { args, .. } => {
                assert!(matches!(&args[0].key, kcl_ast::ArgKey::Named(k) if k == "width"));
                assert!(matches!(&args[1].key, kcl_ast::ArgKey::Named(k) if k == "height"));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn fn_def_extracts_trailing_return_into_return_expr() {
        let program = parse("fn add(@a, @b) { return a + b }").unwrap();
        match &program.statements[0].kind {
            StmtKind::FnDef { body, return_expr, .. } => {
                assert!(body.is_empty());
                assert!(return_expr.is_some());
            }
            other => panic!("expected FnDef, got {other:?}"),
        }
    }

    #[test]
    fn import_as_identifies_contextual_keyword_not_reserved_word() {
        let program = parse(r#"import "foo.kcl" as foo"#).unwrap();
        match &program.statements[0].kind {
            StmtKind::Import { path, alias, .. } => {
                assert_eq!(path, "foo.kcl");
                assert_eq!(alias.as_deref(), Some("foo"));
            }
            other => panic!("expected Import, got {other:?}"),
        }
    }

    #[test]
    fn named_import_from_path() {
        let program = parse(r#"import box, cyl as cylinder from "shapes.kcl""#).unwrap();
        match &program.statements[0].kind {
            StmtKind::Import { items: Some(items), .. } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].alias.as_deref(), Some("cylinder"));
            }
            other => panic!("expected Import with items, got {other:?}"),
        }
    }

    #[test]
    fn export_wraps_fn_def() {
        let program = parse("export fn add(@a, @b) { return a + b }").unwrap();
        assert!(matches!(&program.statements[0].kind, StmtKind::Export(inner) if matches!(inner.kind, StmtKind::FnDef { .. })));
    }

    #[test]
    fn settings_annotation_is_collected_and_not_a_regular_statement() {
        let program = parse("@settings(defaultLengthUnit = mm)\nlet x = 1").unwrap();
        assert_eq!(program.settings.default_length_unit, Some(Unit::Mm));
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn if_else_if_else_chain() {
        let kind = single_expr("if a { 1 } else if b { 2 } else { 3 }");
        match kind {
            ExprKind::If { else_if_branches, else_branch, .. } => {
                assert_eq!(else_if_branches.len(), 1);
                assert!(else_branch.is_some());
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn malformed_input_raises_single_parse_error() {
        let err = parse("let x = ").unwrap_err();
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn leading_and_trailing_trivia_attach_to_program() {
        let program = parse("// header\n\nlet x = 1\n\n// footer").unwrap();
        assert_eq!(program.leading_trivia.len(), 1);
        assert_eq!(program.trailing_trivia.len(), 1);
    }
}
