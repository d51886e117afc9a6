//! Statement printing: `Let`/`Assign`/`FnDef`/`Return`/`Annotation`/import
//! and export forms, plus the shared function-literal printer used by both
//! `FnDef` and `AnonymousFn`.

use kcl_ast::{Expr, ImportItem, Param, Stmt, StmtKind, TypeAnnotation};

use crate::expr::format_expr;
use crate::ty::format_type;
use crate::{emit_trivia, indent, trailing_comment};

pub(crate) fn format_stmt(stmt: &Stmt, level: usize) -> String {
    match &stmt.kind {
        StmtKind::Let { name, expr } => format!("let {name} = {}", format_expr(expr, level)),
        StmtKind::Assign { name, expr } => format!("{name} = {}", format_expr(expr, level)),
        StmtKind::FnDef { name, params, body, return_expr, return_type } => format_fn_like(
            &format!("fn {name}"),
            params,
            body,
            return_expr.as_ref(),
            return_type.as_ref(),
            level,
        ),
        StmtKind::Return(Some(expr)) => format!("return {}", format_expr(expr, level)),
        StmtKind::Return(None) => "return".to_string(),
        StmtKind::ExprStmt(expr) => format_expr(expr, level),
        StmtKind::Annotation { name, args } => format_annotation(name, args, level),
        StmtKind::Import { path, items, alias } => format_import(path, items, alias),
        StmtKind::Export(inner) => format!("export {}", format_stmt(inner, level)),
        StmtKind::ExportImport { item, path } => format!("export import {item} from \"{path}\""),
    }
}

fn format_param(param: &Param, level: usize) -> String {
    let mut out = String::new();
    if param.unlabeled {
        out.push('@');
    }
    out.push_str(&param.name);
    if param.optional {
        out.push('?');
    }
    if let Some(ty) = &param.type_annotation {
        out.push_str(": ");
        out.push_str(&format_type(ty));
    }
    if let Some(default) = &param.default_value {
        out.push_str(" = ");
        out.push_str(&format_expr(default, level));
    }
    out
}

fn format_params(params: &[Param], level: usize) -> String {
    params.iter().map(|p| format_param(p, level)).collect::<Vec<_>>().join(", ")
}

fn format_annotation(name: &str, args: &[(String, Expr)], level: usize) -> String {
    if args.is_empty() {
        return format!("@{name}");
    }
    let items: Vec<String> =
        args.iter().map(|(key, value)| format!("{key} = {}", format_expr(value, level))).collect();
    format!("@{name}({})", items.join(", "))
}

fn format_import(path: &str, items: &Option<Vec<ImportItem>>, alias: &Option<String>) -> String {
    match items {
        None => {
            let mut out = format!("import \"{path}\"");
            if let Some(alias) = alias {
                out.push_str(&format!(" as {alias}"));
            }
            out
        }
        Some(items) => {
            let names: Vec<String> = items
                .iter()
                .map(|item| match &item.alias {
                    Some(alias) => format!("{} as {alias}", item.name),
                    None => item.name.clone(),
                })
                .collect();
            format!("import {} from \"{path}\"", names.join(", "))
        }
    }
}

/// Render a `{ ... }` block with its statements joined inline by `; `, for
/// the `if` expression's single-line form. An empty block prints as `{}`.
pub(crate) fn format_block_inline(stmts: &[Stmt], level: usize) -> String {
    if stmts.is_empty() {
        return "{}".to_string();
    }
    let parts: Vec<String> = stmts.iter().map(|stmt| format_stmt(stmt, level)).collect();
    format!("{{ {} }}", parts.join("; "))
}

/// Shared printer for `fn NAME(...)` (`FnDef`) and bare `fn(...)`
/// (`AnonymousFn`): single-line `{ return EXPR }` when the body holds
/// nothing but a short, one-line return expression, otherwise a multi-line
/// block with 2-space indent. Mirrors the parser's `extract_trailing_return`,
/// which pulls a trailing bare `return` out of the body for exactly this
/// printer to collapse back onto one line.
pub(crate) fn format_fn_like(
    head: &str,
    params: &[Param],
    body: &[Stmt],
    return_expr: Option<&Expr>,
    return_type: Option<&TypeAnnotation>,
    level: usize,
) -> String {
    let params_str = format_params(params, level);
    let ret_str = return_type.map(|ty| format!(": {}", format_type(ty))).unwrap_or_default();

    if body.is_empty() {
        match return_expr {
            Some(ret) => {
                let expr_str = format_expr(ret, level);
                if !expr_str.contains('\n') && expr_str.chars().count() < 40 {
                    return format!("{head}({params_str}){ret_str} {{ return {expr_str} }}");
                }
            }
            None => return format!("{head}({params_str}){ret_str} {{}}"),
        }
    }

    let mut out = format!("{head}({params_str}){ret_str} {{\n");
    let body_level = level + 1;
    for stmt in body {
        emit_trivia(&mut out, &stmt.trivia.leading, body_level);
        out.push_str(&indent(body_level));
        out.push_str(&format_stmt(stmt, body_level));
        out.push_str(&trailing_comment(&stmt.trivia.trailing));
        out.push('\n');
    }
    if let Some(ret) = return_expr {
        out.push_str(&indent(body_level));
        out.push_str("return ");
        out.push_str(&format_expr(ret, body_level));
        out.push('\n');
    }
    out.push_str(&indent(level));
    out.push('}');
    out
}
