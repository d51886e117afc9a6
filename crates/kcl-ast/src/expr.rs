//! The expression grammar (spec data model §3, Expr).
//!
//! Tagged sum type, not a class hierarchy: every expression carries its own
//! `Range` and `ExprKind` discriminator, and every consumer (type checker,
//! formatter, visitor) matches exhaustively on `ExprKind` rather than
//! dispatching through a trait.

use kcl_common::{Range, Unit};

use crate::TypeAnnotation;
use crate::stmt::{Param, Stmt};

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: Range,
}

impl Expr {
    pub fn new(kind: ExprKind, range: Range) -> Self {
        Self { kind, range }
    }
}

/// A single call argument, keyed either by parameter name or by its
/// positional slot `$n` (spec invariant 3).
#[derive(Debug, Clone, PartialEq)]
pub enum ArgKey {
    Named(String),
    Positional(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub key: ArgKey,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

/// A `{ ... }`/`fn(...) { ... }` body: an ordered statement list. Its Kind
/// (for the type checker) is the Kind of its trailing `ExprStmt`, or `Void`
/// if the block has none.
pub type Block = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(f64, Option<Unit>),
    String(String),
    Bool(bool),
    Nil,
    Var(String),
    Array(Vec<Expr>),
    /// Ordered `key = value` field map.
    Object(Vec<(String, Expr)>),
    Call { callee: Box<Expr>, args: Vec<Arg> },
    Pipe(Box<Expr>, Box<Expr>),
    PipeSubstitution,
    TagDeclarator(String),
    UnaryMinus(Box<Expr>),
    UnaryNot(Box<Expr>),
    BinaryOp(BinOp, Box<Expr>, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    Range { start: Box<Expr>, end: Box<Expr>, inclusive: bool },
    MemberAccess(Box<Expr>, String),
    If {
        condition: Box<Expr>,
        then_branch: Block,
        else_if_branches: Vec<(Expr, Block)>,
        else_branch: Option<Block>,
    },
    AnonymousFn { params: Vec<Param>, body: Block, return_expr: Option<Box<Expr>> },
    TypeAscription(Box<Expr>, TypeAnnotation),
}
