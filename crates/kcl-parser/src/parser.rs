//! Recursive-descent, precedence-climbing parser (spec §4.D).
//!
//! Precedence ladder, weakest to tightest: pipe -> logical-or -> logical-and
//! -> equality -> comparison -> additive -> multiplicative -> exponent
//! (right-assoc) -> unary -> postfix -> atom. Each level is its own method
//! rather than a generic table, matching the closed, small grammar.

use kcl_ast::{Arg, ArgKey, BinOp, Block, Expr, ExprKind, ImportItem, Param, Program, Settings, Stmt, StmtKind, TypeAnnotation};
use kcl_common::{Keyword, Op, Range, Token, TokenKind, Unit};

use crate::error::ParseError;

type PResult<T> = Result<T, ParseError>;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_stmt()?);
        }
        Ok(Program { statements, leading_trivia: Vec::new(), trailing_trivia: Vec::new(), settings: Settings::default() })
    }

    // ── token cursor helpers ────────────────────────────────────────

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn is_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.current().clone();
        if !self.is_eof() {
            self.pos += 1;
        }
        t
    }

    fn prev_end(&self) -> u32 {
        self.tokens[self.pos.saturating_sub(1)].range.end
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.pos)
    }

    fn is_symbol(&self, c: char) -> bool {
        matches!(self.kind(), TokenKind::Symbol(x) if *x == c)
    }

    fn is_keyword(&self, k: Keyword) -> bool {
        matches!(self.kind(), TokenKind::Keyword(x) if *x == k)
    }

    fn is_op(&self, op: Op) -> bool {
        matches!(self.kind(), TokenKind::Op(x) if *x == op)
    }

    fn is_ident(&self) -> bool {
        matches!(self.kind(), TokenKind::Identifier(_))
    }

    fn is_ident_text(&self, text: &str) -> bool {
        matches!(self.kind(), TokenKind::Identifier(s) if s == text)
    }

    fn peek_ahead_is_symbol(&self, n: usize, c: char) -> bool {
        self.tokens.get(self.pos + n).is_some_and(|t| matches!(&t.kind, TokenKind::Symbol(x) if *x == c))
    }

    fn expect_symbol(&mut self, c: char) -> PResult<Token> {
        if self.is_symbol(c) {
            Ok(self.advance())
        } else {
            Err(self.err(format!("Expected '{c}'")))
        }
    }

    fn expect_identifier(&mut self) -> PResult<(String, Range)> {
        if let TokenKind::Identifier(s) = self.kind().clone() {
            let range = self.current().range;
            self.advance();
            Ok((s, range))
        } else {
            Err(self.err("Expected identifier"))
        }
    }

    // ── statements ──────────────────────────────────────────────────

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let stmt = self.parse_stmt_inner()?;
        if self.is_symbol(';') {
            self.advance();
        }
        Ok(stmt)
    }

    fn parse_stmt_inner(&mut self) -> PResult<Stmt> {
        let start = self.current().range.start;

        if self.is_symbol('@') {
            return self.parse_annotation(start);
        }

        if self.is_ident() {
            let text = self.ident_text_unchecked();
            match text.as_str() {
                "import" => return self.parse_import(start),
                "export" => return self.parse_export(start),
                _ => {}
            }
            if self.peek_ahead_is_symbol(1, '=') {
                let (name, _) = self.expect_identifier()?;
                self.expect_symbol('=')?;
                let expr = self.parse_expr()?;
                let end = expr.range.end;
                return Ok(Stmt::new(StmtKind::Assign { name, expr }, Range::new(start, end)));
            }
        }

        if self.is_keyword(Keyword::Let) {
            self.advance();
            let (name, _) = self.expect_identifier()?;
            self.expect_symbol('=')?;
            let expr = self.parse_expr()?;
            let end = expr.range.end;
            return Ok(Stmt::new(StmtKind::Let { name, expr }, Range::new(start, end)));
        }

        if self.is_keyword(Keyword::Fn) {
            return self.parse_fn_def_stmt(start);
        }

        if self.is_keyword(Keyword::Return) {
            self.advance();
            if self.is_symbol('}') || self.is_symbol(';') || self.is_eof() {
                return Ok(Stmt::new(StmtKind::Return(None), Range::new(start, self.prev_end())));
            }
            let expr = self.parse_expr()?;
            let end = expr.range.end;
            return Ok(Stmt::new(StmtKind::Return(Some(expr)), Range::new(start, end)));
        }

        let expr = self.parse_expr()?;
        let end = expr.range.end;
        Ok(Stmt::new(StmtKind::ExprStmt(expr), Range::new(start, end)))
    }

    fn ident_text_unchecked(&self) -> String {
        match self.kind() {
            TokenKind::Identifier(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn parse_block(&mut self) -> PResult<Block> {
        self.expect_symbol('{')?;
        let mut stmts = Vec::new();
        while !self.is_symbol('}') {
            if self.is_eof() {
                return Err(self.err("Expected '}'"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect_symbol('}')?;
        Ok(stmts)
    }

    fn parse_fn_def_stmt(&mut self, start: u32) -> PResult<Stmt> {
        self.advance(); // 'fn'
        if !self.is_ident() {
            let anon = self.parse_anonymous_fn_after_fn(start)?;
            let end = anon.range.end;
            return Ok(Stmt::new(StmtKind::ExprStmt(anon), Range::new(start, end)));
        }
        let (name, _) = self.expect_identifier()?;
        let params = self.parse_params()?;
        let return_type = if self.is_symbol(':') {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut body = self.parse_block()?;
        let return_expr = extract_trailing_return(&mut body);
        let end = self.prev_end();
        Ok(Stmt::new(StmtKind::FnDef { name, params, body, return_expr, return_type }, Range::new(start, end)))
    }

    fn parse_anonymous_fn_after_fn(&mut self, start: u32) -> PResult<Expr> {
        let params = self.parse_params()?;
        let mut body = self.parse_block()?;
        let return_expr = extract_trailing_return(&mut body).map(Box::new);
        let end = self.prev_end();
        Ok(Expr::new(ExprKind::AnonymousFn { params, body, return_expr }, Range::new(start, end)))
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect_symbol('(')?;
        let mut params = Vec::new();
        while !self.is_symbol(')') {
            let unlabeled = if self.is_symbol('@') {
                self.advance();
                true
            } else {
                false
            };
            let (name, _) = self.expect_identifier()?;
            let optional = if self.is_symbol('?') {
                self.advance();
                true
            } else {
                false
            };
            let type_annotation = if self.is_symbol(':') {
                self.advance();
                Some(self.parse_type()?)
            } else {
                None
            };
            let default_value = if self.is_symbol('=') {
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param { name, unlabeled, optional, type_annotation, default_value });
            if self.is_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_symbol(')')?;
        Ok(params)
    }

    fn parse_type(&mut self) -> PResult<TypeAnnotation> {
        if self.is_symbol('[') {
            self.advance();
            let element = Box::new(self.parse_type()?);
            let length = if let TokenKind::Number(n, None) = self.kind().clone() {
                self.advance();
                Some(n as usize)
            } else {
                None
            };
            self.expect_symbol(']')?;
            return Ok(TypeAnnotation::Array { element, length });
        }
        if self.is_symbol('{') {
            self.advance();
            let mut fields = Vec::new();
            while !self.is_symbol('}') {
                let (name, _) = self.expect_identifier()?;
                self.expect_symbol(':')?;
                let ty = self.parse_type()?;
                fields.push((name, ty));
                if self.is_symbol(',') {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect_symbol('}')?;
            return Ok(TypeAnnotation::Object(fields));
        }
        let (name, _) = self.expect_identifier()?;
        match name.as_str() {
            "number" => {
                if self.is_symbol('(') {
                    self.advance();
                    let unit = if let TokenKind::Identifier(u) = self.kind().clone() {
                        self.advance();
                        Unit::from_str(&u)
                    } else {
                        None
                    };
                    self.expect_symbol(')')?;
                    Ok(TypeAnnotation::Number(unit))
                } else {
                    Ok(TypeAnnotation::Number(None))
                }
            }
            "string" | "bool" => Ok(TypeAnnotation::Primitive(name)),
            _ => Ok(TypeAnnotation::Named(name)),
        }
    }

    fn parse_annotation(&mut self, start: u32) -> PResult<Stmt> {
        self.expect_symbol('@')?;
        let (name, _) = self.expect_identifier()?;
        let args = if self.is_symbol('(') {
            self.advance();
            let mut args = Vec::new();
            while !self.is_symbol(')') {
                let (key, _) = self.expect_identifier()?;
                self.expect_symbol('=')?;
                let value = self.parse_expr()?;
                args.push((key, value));
                if self.is_symbol(',') {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect_symbol(')')?;
            args
        } else {
            Vec::new()
        };
        let end = self.prev_end();
        Ok(Stmt::new(StmtKind::Annotation { name, args }, Range::new(start, end)))
    }

    fn parse_import(&mut self, start: u32) -> PResult<Stmt> {
        self.advance(); // 'import'
        if let TokenKind::String(path) = self.kind().clone() {
            self.advance();
            let alias = if self.is_ident_text("as") {
                self.advance();
                Some(self.expect_identifier()?.0)
            } else {
                None
            };
            let end = self.prev_end();
            return Ok(Stmt::new(StmtKind::Import { path, items: None, alias }, Range::new(start, end)));
        }

        let mut items = Vec::new();
        loop {
            let (name, _) = self.expect_identifier()?;
            let alias = if self.is_ident_text("as") {
                self.advance();
                Some(self.expect_identifier()?.0)
            } else {
                None
            };
            items.push(ImportItem { name, alias });
            if self.is_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        if !self.is_ident_text("from") {
            return Err(self.err("Expected 'from'"));
        }
        self.advance();
        let path = if let TokenKind::String(p) = self.kind().clone() {
            self.advance();
            p
        } else {
            return Err(self.err("Expected string path"));
        };
        let end = self.prev_end();
        Ok(Stmt::new(StmtKind::Import { path, items: Some(items), alias: None }, Range::new(start, end)))
    }

    fn parse_export(&mut self, start: u32) -> PResult<Stmt> {
        self.advance(); // 'export'
        if self.is_ident_text("import") {
            self.advance();
            let (item, _) = self.expect_identifier()?;
            if !self.is_ident_text("from") {
                return Err(self.err("Expected 'from'"));
            }
            self.advance();
            let path = if let TokenKind::String(p) = self.kind().clone() {
                self.advance();
                p
            } else {
                return Err(self.err("Expected string path"));
            };
            let end = self.prev_end();
            return Ok(Stmt::new(StmtKind::ExportImport { item, path }, Range::new(start, end)));
        }

        let inner = self.parse_stmt_inner()?;
        match &inner.kind {
            StmtKind::FnDef { .. } | StmtKind::Let { .. } | StmtKind::Assign { .. } => {}
            _ => return Err(self.err("export must wrap a function, let, or assignment")),
        }
        let end = inner.range.end;
        Ok(Stmt::new(StmtKind::Export(Box::new(inner)), Range::new(start, end)))
    }

    // ── expressions ─────────────────────────────────────────────────

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_pipe()
    }

    fn parse_pipe(&mut self) -> PResult<Expr> {
        let mut left = self.parse_or()?;
        while matches!(self.kind(), TokenKind::Pipe) {
            self.advance();
            let right = self.parse_or()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::Pipe(Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while self.is_symbol('|') {
            self.advance();
            let right = self.parse_and()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::BinaryOp(BinOp::Or, Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.is_symbol('&') {
            self.advance();
            let right = self.parse_equality()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::BinaryOp(BinOp::And, Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = if self.is_op(Op::EqEq) {
                BinOp::Eq
            } else if self.is_op(Op::NotEq) {
                BinOp::NotEq
            } else {
                break;
            };
            self.advance();
            let right = self.parse_comparison()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::BinaryOp(op, Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.is_symbol('<') {
                BinOp::Lt
            } else if self.is_symbol('>') {
                BinOp::Gt
            } else if self.is_op(Op::LtEq) {
                BinOp::LtEq
            } else if self.is_op(Op::GtEq) {
                BinOp::GtEq
            } else {
                break;
            };
            self.advance();
            let right = self.parse_additive()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::BinaryOp(op, Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.is_symbol('+') {
                BinOp::Add
            } else if self.is_symbol('-') {
                BinOp::Sub
            } else {
                break;
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::BinaryOp(op, Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = if self.is_symbol('*') {
                BinOp::Mul
            } else if self.is_symbol('/') {
                BinOp::Div
            } else if self.is_symbol('%') {
                BinOp::Mod
            } else {
                break;
            };
            self.advance();
            let right = self.parse_exponent()?;
            let range = left.range.merge(right.range);
            left = Expr::new(ExprKind::BinaryOp(op, Box::new(left), Box::new(right)), range);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> PResult<Expr> {
        let left = self.parse_unary()?;
        if self.is_symbol('^') {
            self.advance();
            let right = self.parse_exponent()?; // right-associative
            let range = left.range.merge(right.range);
            return Ok(Expr::new(ExprKind::BinaryOp(BinOp::Pow, Box::new(left), Box::new(right)), range));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.is_symbol('!') {
            let start = self.current().range.start;
            self.advance();
            let operand = self.parse_unary()?;
            let range = Range::new(start, operand.range.end);
            return Ok(Expr::new(ExprKind::UnaryNot(Box::new(operand)), range));
        }
        if self.is_symbol('-') {
            let start = self.current().range.start;
            self.advance();
            let operand = self.parse_unary()?;
            let range = Range::new(start, operand.range.end);
            return Ok(Expr::new(ExprKind::UnaryMinus(Box::new(operand)), range));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            if self.is_symbol('.') {
                self.advance();
                let (name, name_range) = self.expect_identifier()?;
                let range = Range::new(expr.range.start, name_range.end);
                expr = Expr::new(ExprKind::MemberAccess(Box::new(expr), name), range);
            } else if self.is_symbol('[') {
                self.advance();
                let index = self.parse_expr()?;
                let end_tok = self.expect_symbol(']')?;
                let range = Range::new(expr.range.start, end_tok.range.end);
                expr = Expr::new(ExprKind::Index(Box::new(expr), Box::new(index)), range);
            } else if self.is_symbol(':') {
                self.advance();
                let ty = self.parse_type()?;
                let range = Range::new(expr.range.start, self.prev_end());
                expr = Expr::new(ExprKind::TypeAscription(Box::new(expr), ty), range);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let start = self.current().range.start;
        match self.kind().clone() {
            TokenKind::Number(v, u) => {
                self.advance();
                Ok(Expr::new(ExprKind::Number(v, u), Range::new(start, self.prev_end())))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::new(ExprKind::String(s), Range::new(start, self.prev_end())))
            }
            TokenKind::Symbol('(') => {
                self.advance();
                let inner = self.parse_expr()?;
                let end_tok = self.expect_symbol(')')?;
                Ok(Expr::new(inner.kind, Range::new(start, end_tok.range.end)))
            }
            TokenKind::Symbol('%') => {
                self.advance();
                Ok(Expr::new(ExprKind::PipeSubstitution, Range::new(start, self.prev_end())))
            }
            TokenKind::Symbol('$') => {
                self.advance();
                let (name, name_range) = self.expect_identifier()?;
                Ok(Expr::new(ExprKind::TagDeclarator(name), Range::new(start, name_range.end)))
            }
            TokenKind::Symbol('{') => self.parse_object(start),
            TokenKind::Symbol('[') => self.parse_array_or_range(start),
            TokenKind::Keyword(Keyword::If) => self.parse_if(start),
            TokenKind::Keyword(Keyword::Fn) => {
                self.advance();
                self.parse_anonymous_fn_after_fn(start)
            }
            TokenKind::Identifier(name) => self.parse_ident_or_call(start, name),
            _ => Err(self.err("Unexpected token")),
        }
    }

    fn parse_ident_or_call(&mut self, start: u32, name: String) -> PResult<Expr> {
        self.advance();
        let mut full_name = name;
        if matches!(self.kind(), TokenKind::DoubleColon) {
            self.advance();
            let (member, _) = self.expect_identifier()?;
            full_name = format!("{full_name}::{member}");
        }
        let base_end = self.prev_end();
        let base_expr = match full_name.as_str() {
            "true" => Expr::new(ExprKind::Bool(true), Range::new(start, base_end)),
            "false" => Expr::new(ExprKind::Bool(false), Range::new(start, base_end)),
            "nil" => Expr::new(ExprKind::Nil, Range::new(start, base_end)),
            _ => Expr::new(ExprKind::Var(full_name), Range::new(start, base_end)),
        };
        if self.is_symbol('(') {
            let args = self.parse_call_args()?;
            let range = Range::new(start, self.prev_end());
            Ok(Expr::new(ExprKind::Call { callee: Box::new(base_expr), args }, range))
        } else {
            Ok(base_expr)
        }
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Arg>> {
        self.expect_symbol('(')?;
        let mut args = Vec::new();
        if self.is_symbol(')') {
            self.advance();
            return Ok(args);
        }
        let all_named = self.is_ident() && self.peek_ahead_is_symbol(1, '=');
        let mut positional_index = 0usize;
        loop {
            if self.is_symbol(')') {
                break;
            }
            let named = all_named || (self.is_ident() && self.peek_ahead_is_symbol(1, '='));
            if named {
                let (key, _) = self.expect_identifier()?;
                self.expect_symbol('=')?;
                let value = self.parse_expr()?;
                args.push(Arg { key: ArgKey::Named(key), value });
            } else {
                let value = self.parse_expr()?;
                args.push(Arg { key: ArgKey::Positional(positional_index), value });
                positional_index += 1;
            }
            if self.is_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_symbol(')')?;
        Ok(args)
    }

    fn parse_object(&mut self, start: u32) -> PResult<Expr> {
        self.advance(); // '{'
        let mut fields = Vec::new();
        while !self.is_symbol('}') {
            let key = self.parse_object_key()?;
            self.expect_symbol('=')?;
            let value = self.parse_expr()?;
            fields.push((key, value));
            if self.is_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        let end_tok = self.expect_symbol('}')?;
        Ok(Expr::new(ExprKind::Object(fields), Range::new(start, end_tok.range.end)))
    }

    fn parse_object_key(&mut self) -> PResult<String> {
        match self.kind().clone() {
            TokenKind::Identifier(s) => {
                self.advance();
                Ok(s)
            }
            TokenKind::Keyword(k) => {
                self.advance();
                Ok(k.as_str().to_string())
            }
            _ => Err(self.err("Expected object key")),
        }
    }

    fn parse_array_or_range(&mut self, start: u32) -> PResult<Expr> {
        self.advance(); // '['
        if self.is_symbol(']') {
            let end_tok = self.advance();
            return Ok(Expr::new(ExprKind::Array(Vec::new()), Range::new(start, end_tok.range.end)));
        }
        let first = self.parse_expr()?;
        if self.is_op(Op::DotDot) || self.is_op(Op::DotDotLt) {
            let inclusive = self.is_op(Op::DotDot);
            self.advance();
            let end_expr = self.parse_expr()?;
            let end_tok = self.expect_symbol(']')?;
            return Ok(Expr::new(
                ExprKind::Range { start: Box::new(first), end: Box::new(end_expr), inclusive },
                Range::new(start, end_tok.range.end),
            ));
        }
        let mut elements = vec![first];
        while self.is_symbol(',') {
            self.advance();
            if self.is_symbol(']') {
                break;
            }
            elements.push(self.parse_expr()?);
        }
        let end_tok = self.expect_symbol(']')?;
        Ok(Expr::new(ExprKind::Array(elements), Range::new(start, end_tok.range.end)))
    }

    fn parse_if(&mut self, start: u32) -> PResult<Expr> {
        self.advance(); // 'if'
        let condition = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        let mut else_if_branches = Vec::new();
        let mut else_branch = None;
        while self.is_keyword(Keyword::Else) {
            self.advance();
            if self.is_keyword(Keyword::If) {
                self.advance();
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                else_if_branches.push((cond, body));
            } else {
                else_branch = Some(self.parse_block()?);
                break;
            }
        }
        let end = self.prev_end();
        Ok(Expr::new(
            ExprKind::If { condition: Box::new(condition), then_branch, else_if_branches, else_branch },
            Range::new(start, end),
        ))
    }
}

/// If the block's last statement is a bare `return`, pull its expression out
/// as the function's implicit return value rather than leaving it in the
/// body (mirrors the formatter's single-line `{ return EXPR }` collapse).
fn extract_trailing_return(body: &mut Block) -> Option<Expr> {
    if let Some(last) = body.last() {
        if let StmtKind::Return(inner) = &last.kind {
            let inner = inner.clone();
            body.pop();
            return inner;
        }
    }
    None
}
