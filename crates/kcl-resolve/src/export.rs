//! Collecting a module's public surface: every top-level `export fn` and
//! `export let`, by name.

use kcl_ast::{Program, Stmt, StmtKind, Visitor, walk_program};
use kcl_common::Range;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Function,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSymbol {
    pub kind: ExportKind,
    pub range: Range,
}

#[derive(Default)]
struct ExportCollector {
    exports: FxHashMap<String, ExportedSymbol>,
}

impl Visitor for ExportCollector {
    fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
        if let StmtKind::Export(inner) = &stmt.kind {
            match &inner.kind {
                StmtKind::FnDef { name, .. } => {
                    self.exports
                        .insert(name.clone(), ExportedSymbol { kind: ExportKind::Function, range: inner.range });
                }
                StmtKind::Let { name, .. } => {
                    self.exports
                        .insert(name.clone(), ExportedSymbol { kind: ExportKind::Variable, range: inner.range });
                }
                _ => {}
            }
        }
        true
    }
}

/// Collect every `export fn`/`export let` in `program`, keyed by name.
pub fn extract_exports(program: &Program) -> FxHashMap<String, ExportedSymbol> {
    let mut collector = ExportCollector::default();
    walk_program(program, &mut collector);
    collector.exports
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_ast::{Expr, ExprKind, Param, TypeAnnotation};

    fn program(statements: Vec<Stmt>) -> Program {
        Program { statements, ..Default::default() }
    }

    fn num(v: f64) -> Expr {
        Expr::new(ExprKind::Number(v, None), Range::new(0, 1))
    }

    #[test]
    fn collects_exported_function_and_variable() {
        let fn_def = Stmt::new(
            StmtKind::FnDef {
                name: "area".to_string(),
                params: Vec::<Param>::new(),
                body: Vec::new(),
                return_expr: Some(num(1.0)),
                return_type: None::<TypeAnnotation>,
            },
            Range::new(0, 10),
        );
        let let_stmt = Stmt::new(
            StmtKind::Let { name: "pi".to_string(), expr: num(3.0) },
            Range::new(10, 20),
        );
        let program = program(vec![
            Stmt::new(StmtKind::Export(Box::new(fn_def)), Range::new(0, 10)),
            Stmt::new(StmtKind::Export(Box::new(let_stmt)), Range::new(10, 20)),
        ]);

        let exports = extract_exports(&program);
        assert_eq!(exports.len(), 2);
        assert_eq!(exports["area"].kind, ExportKind::Function);
        assert_eq!(exports["pi"].kind, ExportKind::Variable);
    }

    #[test]
    fn non_exported_statements_are_ignored() {
        let program = program(vec![Stmt::new(
            StmtKind::Let { name: "x".to_string(), expr: num(1.0) },
            Range::new(0, 5),
        )]);
        assert!(extract_exports(&program).is_empty());
    }
}
