//! AST and trivia model for the kcl language, plus traversal utilities.
//!
//! Every node is a plain tagged enum rather than a class hierarchy: there
//! are no parent pointers, no cycles, and no polymorphic dispatch. Visitors
//! pass context explicitly and match exhaustively on the node kind.

pub mod expr;
pub mod stmt;
pub mod visit;

pub use expr::{Arg, ArgKey, BinOp, Block, Expr, ExprKind};
pub use stmt::{ImportItem, Param, Program, Settings, Stmt, StmtKind, Trivia, TypeAnnotation};
pub use visit::{ExprFinder, NodeCounter, Visitor, walk_program};
