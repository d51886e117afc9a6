//! Statements, parameters, type annotations, and the `Program` root (spec
//! data model §3).

use kcl_common::{Range, TriviaItem, Unit};

use crate::expr::{Block, Expr};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    Primitive(String),
    Number(Option<Unit>),
    Array { element: Box<TypeAnnotation>, length: Option<usize> },
    Object(Vec<(String, TypeAnnotation)>),
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub unlabeled: bool,
    pub optional: bool,
    pub type_annotation: Option<TypeAnnotation>,
    pub default_value: Option<Expr>,
}

/// Trivia attached to a statement: comments/blanks preceding it, and a
/// same-line trailing comment, if any (spec invariant 6).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trivia {
    pub leading: Vec<TriviaItem>,
    pub trailing: Option<TriviaItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: Range,
    pub trivia: Trivia,
}

impl Stmt {
    pub fn new(kind: StmtKind, range: Range) -> Self {
        Self { kind, range, trivia: Trivia::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Let { name: String, expr: Expr },
    Assign { name: String, expr: Expr },
    FnDef {
        name: String,
        params: Vec<Param>,
        body: Block,
        return_expr: Option<Expr>,
        return_type: Option<TypeAnnotation>,
    },
    Return(Option<Expr>),
    ExprStmt(Expr),
    /// `@name(args)` or bare `@name`.
    Annotation { name: String, args: Vec<(String, Expr)> },
    Import { path: String, items: Option<Vec<ImportItem>>, alias: Option<String> },
    Export(Box<Stmt>),
    ExportImport { item: String, path: String },
}

/// Settings collected from top-level `@settings(...)` annotations (spec
/// §4.D). This is the language's only configuration surface -- there is no
/// external config file format for the core to parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub default_length_unit: Option<Unit>,
    pub default_angle_unit: Option<Unit>,
    pub kcl_version: Option<String>,
    pub no_std: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub leading_trivia: Vec<TriviaItem>,
    pub trailing_trivia: Vec<TriviaItem>,
    pub settings: Settings,
}
