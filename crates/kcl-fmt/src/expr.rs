//! Expression printing, precedence-aware.
//!
//! The parser's atom rule for `(expr)` discards the parenthesis (it
//! returns the inner `ExprKind` directly -- see `parse_atom`), so the tree
//! shape alone encodes what the source grouped. Printing has to run the
//! same precedence table in reverse and re-insert parentheses wherever a
//! lower-precedence child sits in a higher-precedence slot, or the output
//! would silently change meaning.

use kcl_ast::{Arg, ArgKey, BinOp, Expr, ExprKind};

use crate::indent;
use crate::stmt::{format_block_inline, format_fn_like};
use crate::ty::format_type;

const PIPE_PREC: u8 = 1;
const UNARY_PREC: u8 = 9;
const ATOM_PREC: u8 = 10;
const ARRAY_OBJECT_MAX: usize = 40;
const CALL_MAX: usize = 60;

fn prec(op: BinOp) -> u8 {
    use BinOp::*;
    match op {
        Or => 2,
        And => 3,
        Eq | NotEq => 4,
        Lt | Gt | LtEq | GtEq => 5,
        Add | Sub => 6,
        Mul | Div | Mod => 7,
        Pow => 8,
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    use BinOp::*;
    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Pow => "^",
        Eq => "==",
        NotEq => "!=",
        Lt => "<",
        Gt => ">",
        LtEq => "<=",
        GtEq => ">=",
        And => "&",
        Or => "|",
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Pipe(..) => PIPE_PREC,
        ExprKind::BinaryOp(op, ..) => prec(*op),
        ExprKind::UnaryMinus(_) | ExprKind::UnaryNot(_) => UNARY_PREC,
        _ => ATOM_PREC,
    }
}

fn fits(s: &str, max: usize) -> bool {
    !s.contains('\n') && s.chars().count() < max
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Render `expr` as a top-level expression (no enclosing precedence
/// constraint).
pub(crate) fn format_expr(expr: &Expr, level: usize) -> String {
    format_expr_p(expr, 0, level)
}

/// Render `expr` as it appears nested inside a context that requires at
/// least `min_prec`; wraps in parens when `expr`'s own precedence is lower.
pub(crate) fn format_expr_p(expr: &Expr, min_prec: u8, level: usize) -> String {
    let rendered = format_expr_inner(expr, level);
    if expr_prec(expr) < min_prec { format!("({rendered})") } else { rendered }
}

fn format_expr_inner(expr: &Expr, level: usize) -> String {
    match &expr.kind {
        ExprKind::Number(v, unit) => match unit {
            Some(u) => format!("{v}{u}"),
            None => format!("{v}"),
        },
        ExprKind::String(s) => format!("\"{}\"", escape_string(s)),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Nil => "nil".to_string(),
        ExprKind::Var(name) => name.clone(),
        ExprKind::Array(elements) => format_array(elements, level),
        ExprKind::Object(fields) => format_object(fields, level),
        ExprKind::Call { callee, args } => format_call(callee, args, level),
        ExprKind::Pipe(left, right) => {
            format!(
                "{} |> {}",
                format_expr_p(left, PIPE_PREC, level),
                format_expr_p(right, PIPE_PREC + 1, level)
            )
        }
        ExprKind::PipeSubstitution => "%".to_string(),
        ExprKind::TagDeclarator(name) => format!("${name}"),
        ExprKind::UnaryMinus(operand) => format!("-{}", format_expr_p(operand, UNARY_PREC, level)),
        ExprKind::UnaryNot(operand) => format!("!{}", format_expr_p(operand, UNARY_PREC, level)),
        ExprKind::BinaryOp(op, left, right) => {
            let p = prec(*op);
            let (lp, rp) = if *op == BinOp::Pow { (p + 1, p) } else { (p, p + 1) };
            format!(
                "{} {} {}",
                format_expr_p(left, lp, level),
                op_symbol(*op),
                format_expr_p(right, rp, level)
            )
        }
        ExprKind::Index(base, index) => {
            format!("{}[{}]", format_expr_p(base, ATOM_PREC, level), format_expr(index, level))
        }
        ExprKind::Range { start, end, inclusive } => {
            let sep = if *inclusive { ".." } else { "..<" };
            format!("[{}{sep}{}]", format_expr(start, level), format_expr(end, level))
        }
        ExprKind::MemberAccess(base, name) => {
            format!("{}.{name}", format_expr_p(base, ATOM_PREC, level))
        }
        ExprKind::If { condition, then_branch, else_if_branches, else_branch } => {
            format_if(condition, then_branch, else_if_branches, else_branch, level)
        }
        ExprKind::AnonymousFn { params, body, return_expr } => {
            format_fn_like("fn", params, body, return_expr.as_deref(), None, level)
        }
        ExprKind::TypeAscription(inner, ty) => {
            format!("{}: {}", format_expr_p(inner, ATOM_PREC, level), format_type(ty))
        }
    }
}

fn format_array(elements: &[Expr], level: usize) -> String {
    if elements.is_empty() {
        return "[]".to_string();
    }
    let items: Vec<String> = elements.iter().map(|e| format_expr(e, level + 1)).collect();
    let one_line = format!("[{}]", items.join(", "));
    if fits(&one_line, ARRAY_OBJECT_MAX) {
        return one_line;
    }
    let mut out = String::from("[\n");
    let inner = indent(level + 1);
    for item in &items {
        out.push_str(&inner);
        out.push_str(item);
        out.push_str(",\n");
    }
    out.push_str(&indent(level));
    out.push(']');
    out
}

fn format_object(fields: &[(String, Expr)], level: usize) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }
    let items: Vec<String> =
        fields.iter().map(|(key, value)| format!("{key} = {}", format_expr(value, level + 1))).collect();
    let one_line = format!("{{{}}}", items.join(", "));
    if fits(&one_line, ARRAY_OBJECT_MAX) {
        return one_line;
    }
    let mut out = String::from("{\n");
    let inner = indent(level + 1);
    for item in &items {
        out.push_str(&inner);
        out.push_str(item);
        out.push_str(",\n");
    }
    out.push_str(&indent(level));
    out.push('}');
    out
}

fn format_arg(arg: &Arg, level: usize) -> String {
    match &arg.key {
        ArgKey::Positional(_) => format_expr(&arg.value, level),
        ArgKey::Named(name) => format!("{name} = {}", format_expr(&arg.value, level)),
    }
}

fn format_call(callee: &Expr, args: &[Arg], level: usize) -> String {
    let callee_str = format_expr_p(callee, ATOM_PREC, level);
    if args.is_empty() {
        return format!("{callee_str}()");
    }
    let items: Vec<String> = args.iter().map(|a| format_arg(a, level + 1)).collect();
    let one_line = format!("{callee_str}({})", items.join(", "));
    if fits(&one_line, CALL_MAX) {
        return one_line;
    }
    let mut out = format!("{callee_str}(\n");
    let inner = indent(level + 1);
    for item in &items {
        out.push_str(&inner);
        out.push_str(item);
        out.push_str(",\n");
    }
    out.push_str(&indent(level));
    out.push(')');
    out
}

fn format_if(
    condition: &Expr,
    then_branch: &[kcl_ast::Stmt],
    else_if_branches: &[(Expr, Vec<kcl_ast::Stmt>)],
    else_branch: &Option<Vec<kcl_ast::Stmt>>,
    level: usize,
) -> String {
    let mut out = format!(
        "if {} {}",
        format_expr_p(condition, 0, level),
        format_block_inline(then_branch, level)
    );
    for (cond, body) in else_if_branches {
        out.push_str(&format!(
            " else if {} {}",
            format_expr_p(cond, 0, level),
            format_block_inline(body, level)
        ));
    }
    if let Some(body) = else_branch {
        out.push_str(&format!(" else {}", format_block_inline(body, level)));
    }
    out
}
