//! Tokenizer for the kcl modeling language.
//!
//! Single-pass, cursor-tracking scanner. Implements `Iterator<Item = Token>`
//! so callers can consume tokens lazily, and records comments/blank-line
//! runs as trivia alongside the token stream rather than folding them into
//! it -- trivia is assigned to statements later, by the parser.

mod cursor;

use cursor::Cursor;
use kcl_common::token::{Keyword, Op};
use kcl_common::unit::Unit;
use kcl_common::{Token, TokenKind, TriviaItem};

/// The kcl lexer. Wraps a [`Cursor`] and implements `Iterator<Item = Token>`.
/// Trivia observed while skipping to the next token accumulates in
/// `self.trivia`; drain it with [`Lexer::take_trivia`].
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
    trivia: Vec<TriviaItem>,
}

/// Tokens plus the trivia observed between them, as produced by [`lex`].
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub trivia: Vec<TriviaItem>,
}

/// Tokenize `source`, also collecting comments and blank-line runs.
pub fn lex(source: &str) -> LexOutput {
    let mut lexer = Lexer::new(source);
    let tokens: Vec<Token> = (&mut lexer).collect();
    LexOutput { tokens, trivia: lexer.trivia }
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut cursor = Cursor::new(source);
        // Shebang at offset 0 is silently consumed, not trivia.
        if cursor.peek() == Some('#') && cursor.peek_next() == Some('!') {
            cursor.eat_while(|c| c != '\n');
            if cursor.peek() == Some('\n') {
                cursor.advance();
            }
        }
        Self { cursor, emitted_eof: false, trivia: Vec::new() }
    }

    /// Convenience: tokenize without keeping trivia.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn skip_trivia(&mut self) {
        loop {
            let before = self.cursor.pos();

            self.cursor.eat_while(|c| c.is_whitespace() && c != '\n');

            // Blank-line run: consecutive newlines collapse into one item.
            let blank_start = self.cursor.pos();
            let mut newlines = 0u32;
            while self.cursor.peek() == Some('\n')
                || (self.cursor.peek() == Some('\r') && self.cursor.peek_next() == Some('\n'))
            {
                if self.cursor.peek() == Some('\r') {
                    self.cursor.advance();
                }
                self.cursor.advance();
                newlines += 1;
            }
            if newlines > 1 {
                self.trivia.push(TriviaItem::BlankRun {
                    count: newlines - 1,
                    range: kcl_common::Range::new(blank_start, self.cursor.pos()),
                });
            }

            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('/') {
                let start = self.cursor.pos();
                self.cursor.advance();
                self.cursor.advance();
                self.cursor.eat_while(|c| c != '\n');
                let text = self.cursor.slice(start + 2, self.cursor.pos()).to_string();
                self.trivia.push(TriviaItem::Comment {
                    text,
                    is_block: false,
                    range: kcl_common::Range::new(start, self.cursor.pos()),
                });
                continue;
            }

            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('*') {
                let start = self.cursor.pos();
                self.cursor.advance();
                self.cursor.advance();
                let mut text_end = self.cursor.pos();
                loop {
                    if self.cursor.is_eof() {
                        // Unterminated block comment: consume to EOF, no error.
                        text_end = self.cursor.pos();
                        break;
                    }
                    if self.cursor.peek() == Some('*') && self.cursor.peek_next() == Some('/') {
                        text_end = self.cursor.pos();
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
                let text = self.cursor.slice(start + 2, text_end).to_string();
                self.trivia.push(TriviaItem::Comment {
                    text,
                    is_block: true,
                    range: kcl_common::Range::new(start, self.cursor.pos()),
                });
                continue;
            }

            if self.cursor.pos() == before {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            '"' | '\'' => self.lex_string(c, start),
            '0'..='9' => self.lex_number(start),
            c if is_ident_start(c) => self.lex_ident_or_keyword(start),
            '|' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    Token::new(TokenKind::Pipe, start, self.cursor.pos())
                } else {
                    Token::new(TokenKind::Symbol('|'), start, self.cursor.pos())
                }
            }
            ':' => {
                self.cursor.advance();
                if self.cursor.peek() == Some(':') {
                    self.cursor.advance();
                    Token::new(TokenKind::DoubleColon, start, self.cursor.pos())
                } else {
                    Token::new(TokenKind::Symbol(':'), start, self.cursor.pos())
                }
            }
            '.' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('.') {
                    self.cursor.advance();
                    if self.cursor.peek() == Some('<') {
                        self.cursor.advance();
                        Token::new(TokenKind::Op(Op::DotDotLt), start, self.cursor.pos())
                    } else {
                        Token::new(TokenKind::Op(Op::DotDot), start, self.cursor.pos())
                    }
                } else {
                    Token::new(TokenKind::Symbol('.'), start, self.cursor.pos())
                }
            }
            '=' => self.lex_two_char_or_symbol('=', '=', Op::EqEq, start),
            '!' => self.lex_two_char_or_symbol('!', '=', Op::NotEq, start),
            '<' => self.lex_two_char_or_symbol('<', '=', Op::LtEq, start),
            '>' => self.lex_two_char_or_symbol('>', '=', Op::GtEq, start),
            other => {
                self.cursor.advance();
                Token::new(TokenKind::Symbol(other), start, self.cursor.pos())
            }
        }
    }

    fn lex_two_char_or_symbol(
        &mut self,
        first: char,
        second: char,
        op: Op,
        start: u32,
    ) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(second) {
            self.cursor.advance();
            Token::new(TokenKind::Op(op), start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Symbol(first), start, self.cursor.pos())
        }
    }

    fn lex_ident_or_keyword(&mut self, start: u32) -> Token {
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = match Keyword::from_str(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(text.to_string()),
        };
        Token::new(kind, start, self.cursor.pos())
    }

    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        let digits_end = self.cursor.pos();
        let value: f64 = self.cursor.slice(start, digits_end).parse().unwrap_or(0.0);

        // Longest-match unit suffix: the full alphabetic run right after the
        // number must name a known unit, or the number has no unit at all --
        // this is what stops `42mmx` or `10inches` from eating a partial
        // unit and leaving garbage behind.
        let mut suffix = String::new();
        let mut lookahead = 0usize;
        while let Some(c) = self.cursor.peek_nth(lookahead) {
            if c.is_alphabetic() || c == '_' || c == '?' {
                suffix.push(c);
                lookahead += 1;
            } else {
                break;
            }
        }

        if let Some(unit) = Unit::from_str(&suffix) {
            for _ in 0..lookahead {
                self.cursor.advance();
            }
            Token::new(TokenKind::Number(value, Some(unit)), start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Number(value, None), start, digits_end)
        }
    }

    fn lex_string(&mut self, delim: char, start: u32) -> Token {
        self.cursor.advance(); // opening delimiter
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None => break, // unterminated: silently absorbed to EOF
                Some(c) if c == delim => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('\'') => value.push('\''),
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => break,
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::String(value), start, self.cursor.pos())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let tok = self.next_token();
        if tok.is_eof() {
            self.emitted_eof = true;
        }
        Some(tok)
    }
}
