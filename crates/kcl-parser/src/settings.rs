//! Collects top-level `@settings(...)` (and `@no_std`) annotations into
//! `Program.settings` (spec §4.D). This is a read-only scan: it does not
//! rewrite unitless number literals elsewhere in the tree to carry the
//! default unit. The type checker consults `Program.settings` directly when
//! it encounters a bare number, rather than the AST being mutated to carry
//! an inferred unit on every literal.

use kcl_ast::{ExprKind, Program, StmtKind};
use kcl_common::Unit;

pub fn apply_settings(program: &mut Program) {
    for stmt in &program.statements {
        let StmtKind::Annotation { name, args } = &stmt.kind else { continue };
        match name.as_str() {
            "settings" => {
                for (key, value) in args {
                    match key.as_str() {
                        "defaultLengthUnit" => {
                            program.settings.default_length_unit = unit_value(value);
                        }
                        "defaultAngleUnit" => {
                            program.settings.default_angle_unit = unit_value(value);
                        }
                        "kclVersion" => {
                            if let ExprKind::String(s) = &value.kind {
                                program.settings.kcl_version = Some(s.clone());
                            }
                        }
                        _ => {}
                    }
                }
            }
            "no_std" => program.settings.no_std = true,
            _ => {}
        }
    }
}

fn unit_value(expr: &kcl_ast::Expr) -> Option<Unit> {
    match &expr.kind {
        ExprKind::Var(name) => Unit::from_str(name),
        ExprKind::String(s) => Unit::from_str(s),
        _ => None,
    }
}
