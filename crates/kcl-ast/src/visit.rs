//! Traversal utilities over `Program` (spec §4.L).
//!
//! A single callback set drives the whole walk; returning `false` from an
//! `enter_*` callback aborts traversal early. Leaf expressions (`Number`,
//! `Bool`, `String`, `Nil`, `Var`, `PipeSubstitution`, `TagDeclarator`) have
//! no children and are visited without recursing further.

use crate::expr::{Block, Expr, ExprKind};
use crate::stmt::{Program, Stmt, StmtKind};

pub trait Visitor {
    fn enter_program(&mut self, _program: &Program) -> bool {
        true
    }
    fn exit_program(&mut self, _program: &Program) {}
    fn enter_stmt(&mut self, _stmt: &Stmt) -> bool {
        true
    }
    fn exit_stmt(&mut self, _stmt: &Stmt) {}
    fn enter_expr(&mut self, _expr: &Expr) -> bool {
        true
    }
    fn exit_expr(&mut self, _expr: &Expr) {}
}

/// Walk `program`. Returns `false` if traversal was aborted early.
pub fn walk_program(program: &Program, visitor: &mut dyn Visitor) -> bool {
    if !visitor.enter_program(program) {
        return false;
    }
    let mut completed = true;
    for stmt in &program.statements {
        if !walk_stmt(stmt, visitor) {
            completed = false;
            break;
        }
    }
    visitor.exit_program(program);
    completed
}

fn walk_block(block: &Block, visitor: &mut dyn Visitor) -> bool {
    for stmt in block {
        if !walk_stmt(stmt, visitor) {
            return false;
        }
    }
    true
}

fn walk_stmt(stmt: &Stmt, visitor: &mut dyn Visitor) -> bool {
    if !visitor.enter_stmt(stmt) {
        return false;
    }
    let ok = match &stmt.kind {
        StmtKind::Let { expr, .. } => walk_expr(expr, visitor),
        StmtKind::Assign { expr, .. } => walk_expr(expr, visitor),
        StmtKind::FnDef { params, body, return_expr, .. } => {
            params
                .iter()
                .filter_map(|p| p.default_value.as_ref())
                .all(|e| walk_expr(e, visitor))
                && walk_block(body, visitor)
                && return_expr.as_ref().map_or(true, |e| walk_expr(e, visitor))
        }
        StmtKind::Return(expr) => expr.as_ref().map_or(true, |e| walk_expr(e, visitor)),
        StmtKind::ExprStmt(expr) => walk_expr(expr, visitor),
        StmtKind::Annotation { args, .. } => args.iter().all(|(_, e)| walk_expr(e, visitor)),
        StmtKind::Import { .. } => true,
        StmtKind::Export(inner) => walk_stmt(inner, visitor),
        StmtKind::ExportImport { .. } => true,
    };
    visitor.exit_stmt(stmt);
    ok
}

fn walk_expr(expr: &Expr, visitor: &mut dyn Visitor) -> bool {
    if !visitor.enter_expr(expr) {
        return false;
    }
    let ok = match &expr.kind {
        ExprKind::Number(..)
        | ExprKind::Bool(_)
        | ExprKind::String(_)
        | ExprKind::Nil
        | ExprKind::Var(_)
        | ExprKind::PipeSubstitution
        | ExprKind::TagDeclarator(_) => true,
        ExprKind::Array(elements) => elements.iter().all(|e| walk_expr(e, visitor)),
        ExprKind::Object(fields) => fields.iter().all(|(_, e)| walk_expr(e, visitor)),
        ExprKind::Call { callee, args } => {
            walk_expr(callee, visitor) && args.iter().all(|a| walk_expr(&a.value, visitor))
        }
        ExprKind::Pipe(left, right) => walk_expr(left, visitor) && walk_expr(right, visitor),
        ExprKind::UnaryMinus(e) | ExprKind::UnaryNot(e) => walk_expr(e, visitor),
        ExprKind::BinaryOp(_, left, right) => walk_expr(left, visitor) && walk_expr(right, visitor),
        ExprKind::Index(arr, idx) => walk_expr(arr, visitor) && walk_expr(idx, visitor),
        ExprKind::Range { start, end, .. } => walk_expr(start, visitor) && walk_expr(end, visitor),
        ExprKind::MemberAccess(obj, _) => walk_expr(obj, visitor),
        ExprKind::If { condition, then_branch, else_if_branches, else_branch } => {
            walk_expr(condition, visitor)
                && walk_block(then_branch, visitor)
                && else_if_branches.iter().all(|(cond, body)| {
                    walk_expr(cond, visitor) && walk_block(body, visitor)
                })
                && else_branch.as_ref().map_or(true, |body| walk_block(body, visitor))
        }
        ExprKind::AnonymousFn { params, body, return_expr } => {
            params
                .iter()
                .filter_map(|p| p.default_value.as_ref())
                .all(|e| walk_expr(e, visitor))
                && walk_block(body, visitor)
                && return_expr.as_ref().map_or(true, |e| walk_expr(e, visitor))
        }
        ExprKind::TypeAscription(inner, _) => walk_expr(inner, visitor),
    };
    visitor.exit_expr(expr);
    ok
}

/// A finder built on [`Visitor`]: collects every expression matching a
/// predicate, then stops early once the caller-supplied limit is reached.
pub struct ExprFinder<'a> {
    pub predicate: Box<dyn Fn(&Expr) -> bool + 'a>,
    pub found: Vec<Expr>,
    pub limit: Option<usize>,
}

impl<'a> ExprFinder<'a> {
    pub fn new(predicate: impl Fn(&Expr) -> bool + 'a) -> Self {
        Self { predicate: Box::new(predicate), found: Vec::new(), limit: None }
    }
}

impl<'a> Visitor for ExprFinder<'a> {
    fn enter_expr(&mut self, expr: &Expr) -> bool {
        if (self.predicate)(expr) {
            self.found.push(expr.clone());
        }
        self.limit.map_or(true, |limit| self.found.len() < limit)
    }
}

/// Count every node visited (statements + expressions).
#[derive(Default)]
pub struct NodeCounter {
    pub stmt_count: usize,
    pub expr_count: usize,
}

impl Visitor for NodeCounter {
    fn enter_stmt(&mut self, _stmt: &Stmt) -> bool {
        self.stmt_count += 1;
        true
    }
    fn enter_expr(&mut self, _expr: &Expr) -> bool {
        self.expr_count += 1;
        true
    }
}
