//! Two-pass nominal-kind type checker (spec §4.F).
//!
//! Pass one registers every top-level function (`FnDef`, and `FnDef`
//! wrapped in `Export`) by name; pass two walks statements in source order
//! with a lexically-scoped environment, checking every expression down to
//! a [`Kind`]. There is no unification, no inference beyond this coarse
//! category system, and no cross-module resolution -- imports are
//! recognised syntactically only and never followed.

pub mod error;

use rustc_hash::FxHashMap;

use kcl_ast::{Arg, ArgKey, BinOp, Block, Expr, ExprKind, Param, Program, Stmt, StmtKind};
pub use kcl_stdlib::Kind;
use kcl_stdlib::Signature;

pub use error::TypeError;

type PResult<T> = Result<T, TypeError>;
type Env = FxHashMap<String, Kind>;

/// An owned stand-in for `kcl_stdlib::ParamSig` used for user-defined
/// functions, whose parameter names only live as long as the AST.
#[derive(Debug, Clone)]
struct ParamView {
    name: String,
    kind: Kind,
    optional: bool,
    unlabeled: bool,
}

/// A registered user function: parameters (always bound as `Kind::Scalar`
/// in the checking pass) and a placeholder return kind, per spec's
/// "`returnKind := Scalar placeholder`".
struct UserFn {
    params: Vec<ParamView>,
}

struct Checker {
    stdlib: FxHashMap<&'static str, Signature>,
    functions: FxHashMap<String, UserFn>,
}

/// Type-check `program`. Returns the first error encountered; there is no
/// partial result or diagnostic accumulation at this layer.
pub fn check_program(program: &Program) -> PResult<()> {
    let mut checker = Checker { stdlib: kcl_stdlib::registry(), functions: FxHashMap::default() };
    checker.register_functions(program);

    let mut env = Env::default();
    for stmt in &program.statements {
        checker.check_stmt(stmt, &mut env)?;
    }
    Ok(())
}

fn fn_def_of(stmt: &Stmt) -> Option<(&str, &[Param])> {
    match &stmt.kind {
        StmtKind::FnDef { name, params, .. } => Some((name, params)),
        StmtKind::Export(inner) => fn_def_of(inner),
        _ => None,
    }
}

fn param_views(params: &[Param]) -> Vec<ParamView> {
    params
        .iter()
        .map(|p| ParamView { name: p.name.clone(), kind: Kind::Scalar, optional: p.optional, unlabeled: p.unlabeled })
        .collect()
}

impl Checker {
    fn register_functions(&mut self, program: &Program) {
        for stmt in &program.statements {
            if let Some((name, params)) = fn_def_of(stmt) {
                self.functions.insert(name.to_string(), UserFn { params: param_views(params) });
            }
        }
    }

    fn check_stmt(&self, stmt: &Stmt, env: &mut Env) -> PResult<()> {
        match &stmt.kind {
            StmtKind::Let { name, expr } => {
                let kind = self.check_expr(expr, env)?;
                env.insert(name.clone(), kind);
                Ok(())
            }
            StmtKind::Assign { name, expr } => {
                let kind = self.check_expr(expr, env)?;
                env.insert(name.clone(), kind);
                Ok(())
            }
            StmtKind::FnDef { params, body, return_expr, .. } => {
                let mut inner = env.clone();
                for p in params {
                    inner.insert(p.name.clone(), Kind::Scalar);
                    if let Some(default) = &p.default_value {
                        self.check_expr(default, env)?;
                    }
                }
                self.check_block(body, &mut inner)?;
                if let Some(ret) = return_expr {
                    self.check_expr(ret, &mut inner)?;
                }
                Ok(())
            }
            StmtKind::Return(expr) => {
                if let Some(e) = expr {
                    self.check_expr(e, env)?;
                }
                Ok(())
            }
            StmtKind::ExprStmt(expr) => self.check_expr(expr, env).map(|_| ()),
            StmtKind::Annotation { args, .. } => {
                for (_, value) in args {
                    self.check_expr(value, env)?;
                }
                Ok(())
            }
            StmtKind::Import { .. } | StmtKind::ExportImport { .. } => Ok(()),
            StmtKind::Export(inner) => self.check_stmt(inner, env),
        }
    }

    fn check_block(&self, block: &Block, env: &mut Env) -> PResult<Kind> {
        let mut last = Kind::Void;
        for stmt in block {
            self.check_stmt(stmt, env)?;
            if let StmtKind::ExprStmt(expr) = &stmt.kind {
                last = self.check_expr(expr, env)?;
            }
        }
        Ok(last)
    }

    fn check_expr(&self, expr: &Expr, env: &Env) -> PResult<Kind> {
        match &expr.kind {
            ExprKind::Number(..) => Ok(Kind::Scalar),
            ExprKind::Bool(_) => Ok(Kind::Scalar),
            ExprKind::String(_) => Ok(Kind::Scalar),
            ExprKind::Nil => Ok(Kind::Void),
            ExprKind::PipeSubstitution => Ok(Kind::Scalar),
            ExprKind::TagDeclarator(_) => Ok(Kind::Tag),

            ExprKind::Var(name) => self.resolve_var(name, env),

            ExprKind::Array(elements) => {
                let mut all_scalar = true;
                for e in elements {
                    if self.check_expr(e, env)? != Kind::Scalar {
                        all_scalar = false;
                    }
                }
                Ok(if all_scalar { Kind::Point } else { Kind::Object })
            }

            ExprKind::Object(fields) => {
                for (_, value) in fields {
                    self.check_expr(value, env)?;
                }
                Ok(Kind::Object)
            }

            ExprKind::UnaryMinus(inner) | ExprKind::UnaryNot(inner) => {
                let k = self.check_expr(inner, env)?;
                if k != Kind::Scalar {
                    return Err(TypeError::new("Unary operator requires a Scalar operand"));
                }
                Ok(Kind::Scalar)
            }

            ExprKind::BinaryOp(op, left, right) => self.check_binary_op(*op, left, right, env),

            ExprKind::Index(array, index) => {
                let array_kind = self.check_expr(array, env)?;
                let index_kind = self.check_expr(index, env)?;
                if array_kind != Kind::Point || index_kind != Kind::Scalar {
                    return Err(TypeError::new("Index requires a Point array and a Scalar index"));
                }
                Ok(Kind::Scalar)
            }

            ExprKind::Range { start, end, .. } => {
                let sk = self.check_expr(start, env)?;
                let ek = self.check_expr(end, env)?;
                if sk != Kind::Scalar || ek != Kind::Scalar {
                    return Err(TypeError::new("Range endpoints must be Scalar"));
                }
                Ok(Kind::Point)
            }

            ExprKind::MemberAccess(object, _) => {
                let object_kind = self.check_expr(object, env)?;
                if object_kind != Kind::Object {
                    return Err(TypeError::new("Member access requires an Object"));
                }
                Ok(Kind::Scalar)
            }

            ExprKind::If { condition, then_branch, else_if_branches, else_branch } => {
                let cond_kind = self.check_expr(condition, env)?;
                if cond_kind != Kind::Scalar {
                    return Err(TypeError::new("if condition must be Scalar"));
                }
                let mut then_env = env.clone();
                let result = self.check_block(then_branch, &mut then_env)?;
                for (cond, body) in else_if_branches {
                    self.check_expr(cond, env)?;
                    let mut branch_env = env.clone();
                    self.check_block(body, &mut branch_env)?;
                }
                if let Some(body) = else_branch {
                    let mut branch_env = env.clone();
                    self.check_block(body, &mut branch_env)?;
                }
                Ok(result)
            }

            ExprKind::AnonymousFn { params, body, return_expr } => {
                let mut inner = env.clone();
                for p in params {
                    inner.insert(p.name.clone(), Kind::Scalar);
                }
                self.check_block(body, &mut inner)?;
                if let Some(ret) = return_expr {
                    self.check_expr(ret, &mut inner)?;
                }
                Ok(Kind::Scalar)
            }

            ExprKind::TypeAscription(inner, _) => self.check_expr(inner, env),

            ExprKind::Call { callee, args } => {
                let name = callee_name(callee)?;
                self.check_call(&name, args, env)
            }

            ExprKind::Pipe(left, right) => self.check_pipe(left, right, env),
        }
    }

    fn resolve_var(&self, name: &str, env: &Env) -> PResult<Kind> {
        if kcl_stdlib::is_plane_constant(name) {
            return Ok(Kind::Plane);
        }
        if kcl_stdlib::is_math_constant(name) || kcl_stdlib::is_unit_symbol(name) {
            return Ok(Kind::Scalar);
        }
        if kcl_stdlib::is_tag_sentinel(name) {
            return Ok(Kind::Tag);
        }
        if let Some(kind) = env.get(name) {
            return Ok(*kind);
        }
        Err(TypeError::new(format!("Unknown variable: {name}")))
    }

    fn check_binary_op(&self, op: BinOp, left: &Expr, right: &Expr, env: &Env) -> PResult<Kind> {
        let lk = self.check_expr(left, env)?;
        let rk = self.check_expr(right, env)?;
        if lk != Kind::Scalar || rk != Kind::Scalar {
            return Err(TypeError::new("Operands must be Scalar"));
        }

        let is_additive = matches!(op, BinOp::Add | BinOp::Sub);
        let is_comparison = matches!(op, BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq);
        if is_additive || is_comparison {
            if let (ExprKind::Number(_, Some(lu)), ExprKind::Number(_, Some(ru))) = (&left.kind, &right.kind) {
                if lu.category() != ru.category() {
                    let verb = if is_additive { "add/subtract" } else { "compare" };
                    return Err(TypeError::new(format!("Cannot {verb} values with incompatible units")));
                }
            }
        }
        Ok(Kind::Scalar)
    }

    fn check_call(&self, name: &str, args: &[Arg], env: &Env) -> PResult<Kind> {
        if name == "fuse" {
            return self.check_fuse(args, env);
        }
        if let Some(user) = self.functions.get(name) {
            self.check_args(name, &user.params, args, env)?;
            return Ok(Kind::Scalar);
        }
        if let Some(sig) = self.stdlib.get(name) {
            self.check_args(name, &stdlib_params(sig), args, env)?;
            return Ok(sig.return_kind);
        }
        Err(TypeError::new(format!("Unknown operation: {name}")))
    }

    fn check_fuse(&self, args: &[Arg], env: &Env) -> PResult<Kind> {
        if args.len() < 2 {
            return Err(TypeError::new("fuse requires at least 2 arguments"));
        }
        for arg in args {
            let kind = self.check_expr(&arg.value, env)?;
            if kind != Kind::Shape {
                return Err(TypeError::new("fuse requires at least 2 arguments"));
            }
        }
        Ok(Kind::Shape)
    }

    /// Check `args` against `params`: every provided key must name a known
    /// parameter, every non-optional parameter must be provided, and every
    /// provided argument's kind must match its parameter's kind.
    fn check_args(&self, name: &str, params: &[ParamView], args: &[Arg], env: &Env) -> PResult<()> {
        let mut provided: FxHashMap<String, Kind> = FxHashMap::default();
        for arg in args {
            let kind = self.check_expr(&arg.value, env)?;
            let pname = match &arg.key {
                ArgKey::Named(n) => n.clone(),
                ArgKey::Positional(i) => match params.get(*i) {
                    Some(p) => p.name.clone(),
                    None => return Err(TypeError::new(format!("Unknown operation: {name}"))),
                },
            };
            if !params.iter().any(|p| p.name == pname) {
                return Err(TypeError::new(format!("Unknown operation: {name}")));
            }
            provided.insert(pname, kind);
        }
        for p in params {
            if !p.optional && !provided.contains_key(&p.name) {
                if params.iter().all(|p| p.unlabeled) {
                    let required = params.iter().filter(|p| !p.optional).count();
                    return Err(TypeError::new(format!("{name} requires at least {required} arguments")));
                }
                return Err(TypeError::new(format!("Missing argument '{}' for operation '{}'", p.name, name)));
            }
        }
        for p in params {
            if let Some(kind) = provided.get(&p.name) {
                if *kind != p.kind {
                    return Err(TypeError::new(format!(
                        "Argument '{}' of '{}' has the wrong kind",
                        p.name, name
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_pipe(&self, left: &Expr, right: &Expr, env: &Env) -> PResult<Kind> {
        let lk = self.check_expr(left, env)?;
        match &right.kind {
            ExprKind::Call { callee, args } => {
                let name = callee_name(callee)?;
                if name == "fuse" {
                    if lk != Kind::Shape {
                        return Err(TypeError::new("fuse requires at least 2 arguments"));
                    }
                    let mut all = vec![Arg { key: ArgKey::Positional(0), value: left.clone() }];
                    all.extend(args.iter().cloned());
                    return self.check_fuse(&all, env);
                }
                let params = self.lookup_params(&name)?;
                if let Some(first) = params.first() {
                    if first.kind != lk {
                        return Err(TypeError::new(format!(
                            "Pipe value does not match the first parameter of '{name}'"
                        )));
                    }
                }
                let rest = if params.is_empty() { &[][..] } else { &params[1..] };
                self.check_args(&name, rest, args, env)?;
                self.return_kind(&name)
            }
            _ => self.check_expr(right, env),
        }
    }

    fn lookup_params(&self, name: &str) -> PResult<Vec<ParamView>> {
        if let Some(user) = self.functions.get(name) {
            return Ok(user.params.clone());
        }
        if let Some(sig) = self.stdlib.get(name) {
            return Ok(stdlib_params(sig));
        }
        Err(TypeError::new(format!("Unknown operation: {name}")))
    }

    fn return_kind(&self, name: &str) -> PResult<Kind> {
        if self.functions.contains_key(name) {
            return Ok(Kind::Scalar);
        }
        if let Some(sig) = self.stdlib.get(name) {
            return Ok(sig.return_kind);
        }
        Err(TypeError::new(format!("Unknown operation: {name}")))
    }
}

fn stdlib_params(sig: &Signature) -> Vec<ParamView> {
    sig.params
        .iter()
        .map(|p| ParamView { name: p.name.to_string(), kind: p.kind, optional: p.optional, unlabeled: false })
        .collect()
}

fn callee_name(callee: &Expr) -> PResult<String> {
    match &callee.kind {
        ExprKind::Var(name) => Ok(name.clone()),
        _ => Err(TypeError::new("Unknown operation: <non-identifier callee>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> PResult<()> {
        let program = kcl_parser::parse(source).expect("fixture should parse");
        check_program(&program)
    }

    #[test]
    fn well_formed_box_call_has_no_error() {
        assert!(check("box(width=10mm, height=20mm, depth=30mm)").is_ok());
    }

    #[test]
    fn missing_argument_is_reported() {
        let err = check("box(width=10mm)").unwrap_err();
        assert!(err.message.contains("Missing argument"));
    }

    #[test]
    fn unknown_operation_is_reported() {
        let err = check("unknownOp()").unwrap_err();
        assert!(err.message.contains("Unknown operation"));
    }

    #[test]
    fn incompatible_units_are_reported() {
        let err = check("10mm + 45deg").unwrap_err();
        assert!(err.message.contains("incompatible units"));
    }

    #[test]
    fn fuse_requires_at_least_two_args() {
        let err = check("let a = box(width=1,height=1,depth=1)\nfuse(a)").unwrap_err();
        assert!(err.message.contains("fuse requires at least 2 arguments"));
    }

    #[test]
    fn fuse_with_two_shapes_is_ok() {
        assert!(check(
            "let a = box(width=1,height=1,depth=1)\nlet b = box(width=1,height=1,depth=1)\nfuse(a, b)"
        )
        .is_ok());
    }

    #[test]
    fn unknown_variable_is_reported() {
        let err = check("let x = y").unwrap_err();
        assert!(err.message.contains("Unknown variable"));
    }

    #[test]
    fn user_function_call_checks_arity() {
        let err = check("fn add(@a, @b) { return a + b }\nadd(1)").unwrap_err();
        assert!(err.message.contains("requires at least 2 arguments"));
    }

    #[test]
    fn labeled_user_function_call_reports_the_missing_parameter_by_name() {
        let err = check("fn add(a, b) { return a + b }\nadd(a = 1)").unwrap_err();
        assert!(err.message.contains("Missing argument 'b'"));
    }

    #[test]
    fn pipe_into_call_checks_first_param_kind_and_returns_signature_kind() {
        assert!(check("XY |> startSketchOn()").is_ok());
    }

    #[test]
    fn pipe_threads_sketch_kind_through_two_stages() {
        assert!(check("XY |> startSketchOn() |> startProfile(at = [0, 0])").is_ok());
    }
}
