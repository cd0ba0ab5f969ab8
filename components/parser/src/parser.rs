//! Recursive descent parser
//!
//! One token of lookahead is pulled from a [`TokenSource`]. Binary operators
//! are parsed by precedence climbing. Syntax errors are recorded and parsing
//! resumes at the next token that can start a statement; once more than
//! [`MAX_ERRORS`] distinct-line errors pile up the parse stops early.

use crate::ast::*;
use crate::error::ErrorList;
use crate::literal;
use crate::scanner::{ScanMode, Scanner, TokenSource};
use crate::token::{Token, LOWEST_PREC};
use core_types::{Pos, SourceFile};
use std::io::Write;
use std::sync::Arc;

/// Maximum number of diagnostics kept before the parse is abandoned
pub const MAX_ERRORS: usize = 10;

/// Times error recovery may stop at the same position before skipping past it
const MAX_SYNC_REPEATS: usize = 10;

/// Deepest nesting of statements, expressions and unary operators accepted
/// before the rest of the construct is skipped
pub const MAX_NESTING_DEPTH: usize = 128;

/// Marker for an abandoned parse; the diagnostics explain why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Abort;

type PResult<T> = Result<T, Abort>;

fn is_stmt_start(token: Token) -> bool {
    matches!(
        token,
        Token::Break | Token::Continue | Token::For | Token::If | Token::Return | Token::Export
    )
}

/// Result of parsing the init clause of a `for` header
enum ForHeader {
    Simple(Stmt),
    In {
        key: Ident,
        value: Ident,
        iterable: Expr,
    },
}

/// Script parser
///
/// # Examples
///
/// ```
/// use core_types::SourceFileSet;
/// use parser::Parser;
///
/// let src = "a := 1 + 2 * 3";
/// let mut set = SourceFileSet::new();
/// let file = set.add_file("main", None, src.len()).unwrap();
///
/// let ast = Parser::new(file, src.as_bytes()).parse_file().unwrap();
/// assert_eq!(ast.to_string(), "a := (1 + (2 * 3))");
/// ```
pub struct Parser<'a, S: TokenSource = Scanner<'a>> {
    file: Arc<SourceFile>,
    source: S,
    errors: ErrorList,
    token: Token,
    token_lit: String,
    pos: Pos,
    /// Current semicolon was inserted at a line end
    implicit: bool,
    /// < 0 inside a control clause, >= 0 inside an expression
    expr_level: i32,
    sync_pos: Pos,
    sync_count: usize,
    depth: usize,
    trace: Option<Box<dyn Write + 'a>>,
    indent: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `src` using the default [`Scanner`].
    ///
    /// # Panics
    ///
    /// Panics if the length of `src` differs from the size of `file`.
    pub fn new(file: Arc<SourceFile>, src: &'a [u8]) -> Self {
        let scanner = Scanner::new(Arc::clone(&file), src, ScanMode::default());
        Self::with_source(file, scanner)
    }
}

impl<'a, S: TokenSource> Parser<'a, S> {
    /// Creates a parser pulling tokens from `source`, whose positions must
    /// belong to `file`.
    pub fn with_source(file: Arc<SourceFile>, source: S) -> Self {
        Self {
            file,
            source,
            errors: ErrorList::new(),
            token: Token::Illegal,
            token_lit: String::new(),
            pos: Pos::NO_POS,
            implicit: false,
            expr_level: 0,
            sync_pos: Pos::NO_POS,
            sync_count: 0,
            depth: 0,
            trace: None,
            indent: 0,
        }
    }

    /// Writes a trace of every grammar rule and consumed token to `out`
    pub fn with_trace(mut self, out: impl Write + 'a) -> Self {
        self.trace = Some(Box::new(out));
        self
    }

    /// Parses the whole input.
    ///
    /// # Errors
    ///
    /// Returns every diagnostic, sorted by position, if any was recorded.
    pub fn parse_file(self) -> Result<File, ErrorList> {
        let (file, errors) = self.parse_file_recovering();
        errors.into_result().map(|()| file)
    }

    /// Parses the whole input and returns the tree built so far together with
    /// the sorted diagnostics. Parts that failed to parse are represented by
    /// bad expression and bad statement nodes.
    pub fn parse_file_recovering(mut self) -> (File, ErrorList) {
        let mut stmts = Vec::new();
        let outcome = self.traced("File", |p| {
            p.next()?;
            p.parse_top_level(&mut stmts)
        });
        if outcome.is_err() {
            log::debug!(
                "parse of {:?} stopped after {} errors",
                self.file.name(),
                self.errors.len()
            );
        }

        self.errors.sort();
        let file = File {
            input_file: self.file,
            stmts,
        };
        (file, self.errors)
    }

    // -- token handling ------------------------------------------------------

    fn next(&mut self) -> PResult<()> {
        if self.trace.is_some() && self.pos.is_valid() {
            let s = self.token.as_str();
            let msg = if self.token.is_literal() {
                format!("{} {}", s, self.token_lit)
            } else if self.token.is_operator() || self.token.is_keyword() {
                format!("\"{}\"", s)
            } else {
                s.to_string()
            };
            self.print_trace(&msg);
        }

        let lexeme = self.source.scan();
        self.token = lexeme.token;
        self.token_lit = lexeme.literal;
        self.pos = lexeme.pos;
        self.implicit = lexeme.implicit;

        for (pos, msg) in self.source.take_errors() {
            self.error(pos, msg)?;
        }
        Ok(())
    }

    fn error(&mut self, pos: Pos, msg: impl Into<String>) -> PResult<()> {
        let file_pos = self.file.position(pos);
        if self.errors.repeats_last_line(&file_pos) {
            return Ok(());
        }
        if self.errors.len() >= MAX_ERRORS {
            return Err(Abort);
        }
        self.errors.add(file_pos, msg);
        Ok(())
    }

    fn error_expected(&mut self, pos: Pos, what: &str) -> PResult<()> {
        let mut msg = format!("expected {}", what);
        if pos == self.pos {
            // say what was found instead
            if self.token == Token::Semicolon && self.implicit {
                msg.push_str(", found newline");
            } else if self.token.is_literal() {
                msg.push_str(", found ");
                msg.push_str(&self.token_lit);
            } else {
                msg.push_str(&format!(", found '{}'", self.token));
            }
        }
        self.error(pos, msg)
    }

    fn expect(&mut self, token: Token) -> PResult<Pos> {
        let pos = self.pos;
        if self.token != token {
            self.error_expected(pos, &format!("'{}'", token))?;
        }
        self.next()?;
        Ok(pos)
    }

    fn expect_semi(&mut self) -> PResult<()> {
        match self.token {
            // optional before a closing ')' or '}'
            Token::RParen | Token::RBrace => Ok(()),
            Token::Comma => {
                self.error_expected(self.pos, "';'")?;
                self.next()
            }
            Token::Semicolon => self.next(),
            _ => {
                self.error_expected(self.pos, "';'")?;
                self.advance()
            }
        }
    }

    /// Consumes a list separator. Returns `false` when the list ends, which
    /// includes a trailing comma right before `closing`.
    fn expect_comma(&mut self, closing: Token) -> PResult<bool> {
        if self.token == Token::Comma {
            self.next()?;
            return Ok(self.token != closing);
        }
        if self.token == Token::Semicolon && self.implicit {
            self.next()?;
        }
        Ok(false)
    }

    /// Skips to the next token that can start a statement.
    fn advance(&mut self) -> PResult<()> {
        while self.token != Token::Eof {
            if is_stmt_start(self.token) {
                if self.pos == self.sync_pos && self.sync_count < MAX_SYNC_REPEATS {
                    self.sync_count += 1;
                    return Ok(());
                }
                if self.pos > self.sync_pos {
                    self.sync_pos = self.pos;
                    self.sync_count = 0;
                    return Ok(());
                }
            }
            self.next()?;
        }
        Ok(())
    }

    fn bad_expr(from: Pos, to: Pos) -> Expr {
        Expr::Bad(BadExpr { from, to })
    }

    fn bad_stmt(from: Pos, to: Pos) -> Stmt {
        Stmt::Bad(BadStmt { from, to })
    }

    /// Runs `f` one nesting level deeper. At [`MAX_NESTING_DEPTH`] the input
    /// is skipped to the next statement and `bad` covers what was skipped.
    fn nested<T>(
        &mut self,
        what: &str,
        bad: fn(Pos, Pos) -> T,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            let pos = self.pos;
            self.error(pos, format!("{} nested too deeply", what))?;
            self.advance()?;
            return Ok(bad(pos, self.pos));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // -- tracing -------------------------------------------------------------

    fn print_trace(&mut self, msg: &str) {
        const DOTS: &str = ". . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . . ";

        let Some(out) = self.trace.as_mut() else {
            return;
        };
        let file_pos = self.file.position(self.pos);
        let mut line = format!(
            "{:5}: {:5}:{:3}: ",
            self.pos.0, file_pos.line, file_pos.column
        );
        let mut i = 2 * self.indent;
        while i > DOTS.len() {
            line.push_str(DOTS);
            i -= DOTS.len();
        }
        line.push_str(&DOTS[..i]);
        line.push_str(msg);
        // a failing trace sink must not affect the parse
        let _ = writeln!(out, "{}", line);
    }

    fn traced<T>(&mut self, rule: &str, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.trace.is_none() {
            return f(self);
        }
        self.print_trace(&format!("{} (", rule));
        self.indent += 1;
        let result = f(self);
        self.indent -= 1;
        self.print_trace(")");
        result
    }

    // -- statements ----------------------------------------------------------

    fn parse_top_level(&mut self, stmts: &mut Vec<Stmt>) -> PResult<()> {
        self.traced("StatementList", |p| {
            while p.token != Token::Eof {
                if p.token == Token::RBrace {
                    // stray '}' with no block to close
                    let pos = p.pos;
                    p.error_expected(pos, "statement")?;
                    p.next()?;
                    stmts.push(Stmt::Bad(BadStmt { from: pos, to: p.pos }));
                    continue;
                }
                let stmt = p.parse_stmt()?;
                stmts.push(stmt);
            }
            Ok(())
        })
    }

    fn parse_stmt_list(&mut self) -> PResult<Vec<Stmt>> {
        self.traced("StatementList", |p| {
            let mut list = Vec::new();
            while p.token != Token::RBrace && p.token != Token::Eof {
                list.push(p.parse_stmt()?);
            }
            Ok(list)
        })
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        self.nested("statement", Self::bad_stmt, |p| p.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> PResult<Stmt> {
        self.traced("Statement", |p| match p.token {
            Token::Func
            | Token::Error
            | Token::Immutable
            | Token::Ident
            | Token::Int
            | Token::Float
            | Token::Char
            | Token::String
            | Token::True
            | Token::False
            | Token::Undefined
            | Token::Import
            | Token::LParen
            | Token::LBrace
            | Token::LBrack
            | Token::Add
            | Token::Sub
            | Token::Mul
            | Token::And
            | Token::Xor
            | Token::Not => {
                let stmt = p.parse_simple_stmt()?;
                p.expect_semi()?;
                Ok(stmt)
            }
            Token::Return => p.parse_return_stmt(),
            Token::Export => p.parse_export_stmt(),
            Token::If => p.parse_if_stmt(),
            Token::For => p.parse_for_stmt(),
            Token::Break | Token::Continue => p.parse_branch_stmt(p.token),
            Token::Semicolon => {
                let stmt = Stmt::Empty(EmptyStmt {
                    semicolon: p.pos,
                    implicit: p.implicit,
                });
                p.next()?;
                Ok(stmt)
            }
            _ => {
                let pos = p.pos;
                p.error_expected(pos, "statement")?;
                p.advance()?;
                Ok(Stmt::Bad(BadStmt { from: pos, to: p.pos }))
            }
        })
    }

    fn parse_simple_stmt(&mut self) -> PResult<Stmt> {
        self.traced("SimpleStmt", |p| {
            let x = p.parse_expr_list()?;
            p.finish_simple_stmt(x)
        })
    }

    /// Completes a simple statement whose leading expression list is `x`.
    fn finish_simple_stmt(&mut self, x: Vec<Expr>) -> PResult<Stmt> {
        if matches!(self.token, Token::Assign | Token::Define) {
            let (token_pos, token) = (self.pos, self.token);
            self.next()?;
            let rhs = self.parse_expr_list()?;
            return Ok(Stmt::Assign(AssignStmt {
                lhs: x,
                rhs,
                token,
                token_pos,
            }));
        }

        if x.len() > 1 {
            // continue with the first expression
            self.error_expected(x[0].pos(), "1 expression")?;
        }
        let pos = self.pos;
        let first = x
            .into_iter()
            .next()
            .unwrap_or_else(|| Self::bad_expr(pos, pos));

        match self.token {
            Token::AddAssign
            | Token::SubAssign
            | Token::MulAssign
            | Token::QuoAssign
            | Token::RemAssign
            | Token::AndAssign
            | Token::OrAssign
            | Token::XorAssign
            | Token::ShlAssign
            | Token::ShrAssign
            | Token::AndNotAssign => {
                let (token_pos, token) = (self.pos, self.token);
                self.next()?;
                let rhs = self.parse_expr()?;
                Ok(Stmt::Assign(AssignStmt {
                    lhs: vec![first],
                    rhs: vec![rhs],
                    token,
                    token_pos,
                }))
            }
            Token::Inc | Token::Dec => {
                let stmt = Stmt::IncDec(IncDecStmt {
                    expr: first,
                    token: self.token,
                    token_pos: self.pos,
                });
                self.next()?;
                Ok(stmt)
            }
            _ => Ok(Stmt::Expr(ExprStmt { expr: first })),
        }
    }

    fn parse_for_header(&mut self) -> PResult<ForHeader> {
        self.traced("SimpleStmt", |p| {
            let x = p.parse_expr_list()?;
            if p.token != Token::In {
                return Ok(ForHeader::Simple(p.finish_simple_stmt(x)?));
            }
            p.next()?;
            let iterable = p.parse_expr()?;

            if x.len() > 2 {
                p.error(x[2].pos(), "expected at most 2 loop variables")?;
            }
            let mut names = x.into_iter().take(2);
            let (key, value) = match (names.next(), names.next()) {
                (Some(value), None) => {
                    let value = p.loop_var(value)?;
                    (Ident::new("_", value.name_pos), value)
                }
                (Some(key), Some(value)) => (p.loop_var(key)?, p.loop_var(value)?),
                _ => {
                    let pos = iterable.pos();
                    (Ident::new("_", pos), Ident::new("_", pos))
                }
            };
            Ok(ForHeader::In {
                key,
                value,
                iterable,
            })
        })
    }

    fn loop_var(&mut self, expr: Expr) -> PResult<Ident> {
        match expr {
            Expr::Ident(ident) => Ok(ident),
            other => {
                let pos = other.pos();
                self.error_expected(pos, "identifier")?;
                Ok(Ident::new("_", pos))
            }
        }
    }

    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        self.traced("ForStmt", |p| {
            let for_pos = p.expect(Token::For)?;

            // for {}
            if p.token == Token::LBrace {
                let body = p.parse_block_stmt()?;
                p.expect_semi()?;
                return Ok(Stmt::For(ForStmt {
                    for_pos,
                    init: None,
                    cond: None,
                    post: None,
                    body,
                }));
            }

            let prev_level = p.expr_level;
            p.expr_level = -1;

            let mut s1 = None;
            if p.token != Token::Semicolon {
                match p.parse_for_header()? {
                    ForHeader::In {
                        key,
                        value,
                        iterable,
                    } => {
                        p.expr_level = prev_level;
                        let body = p.parse_block_stmt()?;
                        p.expect_semi()?;
                        return Ok(Stmt::ForIn(ForInStmt {
                            for_pos,
                            key,
                            value,
                            iterable,
                            body,
                        }));
                    }
                    ForHeader::Simple(stmt) => s1 = Some(stmt),
                }
            }

            // for init; cond; post {}  or  for cond {}
            let (init, cond, post) = if p.token == Token::Semicolon {
                p.next()?;
                let cond = if p.token != Token::Semicolon {
                    Some(p.parse_simple_stmt()?)
                } else {
                    None
                };
                p.expect(Token::Semicolon)?;
                let post = if p.token != Token::LBrace {
                    Some(p.parse_simple_stmt()?)
                } else {
                    None
                };
                (s1, cond, post)
            } else {
                (None, s1, None)
            };

            p.expr_level = prev_level;
            let body = p.parse_block_stmt()?;
            p.expect_semi()?;
            let cond = match cond {
                Some(stmt) => Some(p.make_expr(stmt, "condition expression")?),
                None => None,
            };
            Ok(Stmt::For(ForStmt {
                for_pos,
                init: init.map(Box::new),
                cond,
                post: post.map(Box::new),
                body,
            }))
        })
    }

    fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        self.traced("IfStmt", |p| {
            let if_pos = p.expect(Token::If)?;
            let (init, cond) = p.parse_if_header()?;
            let body = p.parse_block_stmt()?;

            let else_stmt = if p.token == Token::Else {
                p.next()?;
                match p.token {
                    Token::If => Some(p.parse_if_stmt()?),
                    Token::LBrace => {
                        let block = p.parse_block_stmt()?;
                        p.expect_semi()?;
                        Some(Stmt::Block(block))
                    }
                    _ => {
                        let pos = p.pos;
                        p.error_expected(pos, "if or {")?;
                        Some(Stmt::Bad(BadStmt { from: pos, to: pos }))
                    }
                }
            } else {
                p.expect_semi()?;
                None
            };

            Ok(Stmt::If(IfStmt {
                if_pos,
                init: init.map(Box::new),
                cond,
                body,
                else_stmt: else_stmt.map(Box::new),
            }))
        })
    }

    fn parse_if_header(&mut self) -> PResult<(Option<Stmt>, Expr)> {
        if self.token == Token::LBrace {
            let pos = self.pos;
            self.error(pos, "missing condition in if statement")?;
            return Ok((None, Self::bad_expr(pos, pos)));
        }

        let outer = self.expr_level;
        self.expr_level = -1;

        if self.token == Token::Semicolon {
            let pos = self.pos;
            self.error(pos, "missing init in if statement")?;
            self.expr_level = outer;
            return Ok((None, Self::bad_expr(pos, pos)));
        }

        let mut init = Some(self.parse_simple_stmt()?);
        let cond_stmt = match self.token {
            Token::LBrace => init.take(),
            Token::Semicolon => {
                self.next()?;
                Some(self.parse_simple_stmt()?)
            }
            _ => {
                let pos = self.pos;
                self.error(pos, "missing condition in if statement")?;
                None
            }
        };

        let cond = match cond_stmt {
            Some(stmt) => self.make_expr(stmt, "boolean expression")?,
            None => Self::bad_expr(self.pos, self.pos),
        };
        self.expr_level = outer;
        Ok((init, cond))
    }

    /// Unwraps an expression statement used where an expression is required.
    fn make_expr(&mut self, stmt: Stmt, want: &str) -> PResult<Expr> {
        match stmt {
            Stmt::Expr(s) => Ok(s.expr),
            other => {
                let found = match other {
                    Stmt::Assign(_) => "assignment",
                    _ => "simple statement",
                };
                let from = other.pos();
                self.error(from, format!("expected {}, found {}", want, found))?;
                Ok(Self::bad_expr(from, self.file.safe_pos(other.end())))
            }
        }
    }

    fn parse_block_stmt(&mut self) -> PResult<BlockStmt> {
        self.traced("BlockStmt", |p| p.parse_braced_stmts())
    }

    fn parse_body(&mut self) -> PResult<BlockStmt> {
        self.traced("Body", |p| p.parse_braced_stmts())
    }

    fn parse_braced_stmts(&mut self) -> PResult<BlockStmt> {
        let lbrace = self.expect(Token::LBrace)?;
        let stmts = self.parse_stmt_list()?;
        let rbrace = self.expect(Token::RBrace)?;
        Ok(BlockStmt {
            stmts,
            lbrace,
            rbrace,
        })
    }

    fn parse_return_stmt(&mut self) -> PResult<Stmt> {
        self.traced("ReturnStmt", |p| {
            let return_pos = p.expect(Token::Return)?;
            let result = if p.token != Token::Semicolon && p.token != Token::RBrace {
                Some(p.parse_expr()?)
            } else {
                None
            };
            p.expect_semi()?;
            Ok(Stmt::Return(ReturnStmt { return_pos, result }))
        })
    }

    fn parse_export_stmt(&mut self) -> PResult<Stmt> {
        self.traced("ExportStmt", |p| {
            let export_pos = p.expect(Token::Export)?;
            let result = p.parse_expr()?;
            p.expect_semi()?;
            Ok(Stmt::Export(ExportStmt { export_pos, result }))
        })
    }

    fn parse_branch_stmt(&mut self, token: Token) -> PResult<Stmt> {
        self.traced("BranchStmt", |p| {
            let token_pos = p.expect(token)?;
            let label = if p.token == Token::Ident {
                Some(p.parse_ident()?)
            } else {
                None
            };
            p.expect_semi()?;
            Ok(Stmt::Branch(BranchStmt {
                token,
                token_pos,
                label,
            }))
        })
    }

    // -- expressions ---------------------------------------------------------

    fn parse_expr_list(&mut self) -> PResult<Vec<Expr>> {
        self.traced("ExpressionList", |p| {
            let mut list = vec![p.parse_expr()?];
            while p.token == Token::Comma {
                p.next()?;
                list.push(p.parse_expr()?);
            }
            Ok(list)
        })
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.nested("expression", Self::bad_expr, |p| {
            p.traced("Expression", |p| {
                let expr = p.parse_binary_expr(LOWEST_PREC + 1)?;
                if p.token == Token::Question {
                    return p.parse_cond_expr(expr);
                }
                Ok(expr)
            })
        })
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        self.traced("BinaryExpression", |p| {
            let mut x = p.parse_unary_expr()?;
            loop {
                let (token, prec) = (p.token, p.token.precedence());
                if prec < min_prec {
                    return Ok(x);
                }
                let token_pos = p.expect(token)?;
                let y = p.parse_binary_expr(prec + 1)?;
                x = Expr::Binary(BinaryExpr {
                    lhs: Box::new(x),
                    rhs: Box::new(y),
                    token,
                    token_pos,
                });
            }
        })
    }

    fn parse_cond_expr(&mut self, cond: Expr) -> PResult<Expr> {
        let question_pos = self.expect(Token::Question)?;
        let true_expr = self.parse_expr()?;
        let colon_pos = self.expect(Token::Colon)?;
        let false_expr = self.parse_expr()?;
        Ok(Expr::Cond(CondExpr {
            cond: Box::new(cond),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
            question_pos,
            colon_pos,
        }))
    }

    fn parse_unary_expr(&mut self) -> PResult<Expr> {
        self.traced("UnaryExpression", |p| match p.token {
            Token::Add | Token::Sub | Token::Not | Token::Xor => {
                let (token_pos, token) = (p.pos, p.token);
                p.next()?;
                let expr = p.nested("expression", Self::bad_expr, |p| p.parse_unary_expr())?;
                Ok(Expr::Unary(UnaryExpr {
                    expr: Box::new(expr),
                    token,
                    token_pos,
                }))
            }
            _ => p.parse_primary_expr(),
        })
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        self.traced("PrimaryExpression", |p| {
            let mut x = p.parse_operand()?;
            loop {
                match p.token {
                    Token::Period => {
                        p.next()?;
                        if p.token != Token::Ident {
                            let pos = p.pos;
                            p.error_expected(pos, "selector")?;
                            p.advance()?;
                            return Ok(Self::bad_expr(pos, p.pos));
                        }
                        x = p.parse_selector(x)?;
                    }
                    Token::LBrack => x = p.parse_index_or_slice(x)?,
                    Token::LParen => x = p.parse_call(x)?,
                    _ => return Ok(x),
                }
            }
        })
    }

    fn parse_call(&mut self, func: Expr) -> PResult<Expr> {
        self.traced("Call", |p| {
            let lparen = p.expect(Token::LParen)?;
            p.expr_level += 1;

            let mut args = Vec::new();
            let mut ellipsis = None;
            while p.token != Token::RParen && p.token != Token::Eof && ellipsis.is_none() {
                args.push(p.parse_expr()?);
                if p.token == Token::Ellipsis {
                    ellipsis = Some(p.pos);
                    p.next()?;
                }
                if !p.expect_comma(Token::RParen)? {
                    break;
                }
            }

            p.expr_level -= 1;
            let rparen = p.expect(Token::RParen)?;
            Ok(Expr::Call(CallExpr {
                func: Box::new(func),
                lparen,
                args,
                ellipsis,
                rparen,
            }))
        })
    }

    fn parse_index_or_slice(&mut self, expr: Expr) -> PResult<Expr> {
        self.traced("IndexOrSlice", |p| {
            let lbrack = p.expect(Token::LBrack)?;
            p.expr_level += 1;

            let mut low = None;
            if p.token != Token::Colon {
                low = Some(p.parse_expr()?);
            }
            let mut is_slice = false;
            let mut high = None;
            if p.token == Token::Colon {
                is_slice = true;
                p.next()?;
                if p.token != Token::RBrack && p.token != Token::Eof {
                    high = Some(p.parse_expr()?);
                }
            }

            p.expr_level -= 1;
            let rbrack = p.expect(Token::RBrack)?;

            if is_slice {
                return Ok(Expr::Slice(SliceExpr {
                    expr: Box::new(expr),
                    lbrack,
                    low: low.map(Box::new),
                    high: high.map(Box::new),
                    rbrack,
                }));
            }
            let index = low.unwrap_or_else(|| Self::bad_expr(rbrack, rbrack));
            Ok(Expr::Index(IndexExpr {
                expr: Box::new(expr),
                lbrack,
                index: Box::new(index),
                rbrack,
            }))
        })
    }

    fn parse_selector(&mut self, expr: Expr) -> PResult<Expr> {
        self.traced("Selector", |p| {
            let sel = p.parse_ident()?;
            Ok(Expr::Selector(SelectorExpr {
                expr: Box::new(expr),
                sel: StringLit {
                    value: sel.name.clone(),
                    literal: sel.name,
                    value_pos: sel.name_pos,
                },
            }))
        })
    }

    fn parse_operand(&mut self) -> PResult<Expr> {
        self.traced("Operand", |p| match p.token {
            Token::Ident => Ok(Expr::Ident(p.parse_ident()?)),
            Token::Int => p.parse_basic_lit(literal::parse_int, |value, literal, value_pos| {
                Expr::IntLit(IntLit {
                    value,
                    literal,
                    value_pos,
                })
            }),
            Token::Float => p.parse_basic_lit(literal::parse_float, |value, literal, value_pos| {
                Expr::FloatLit(FloatLit {
                    value,
                    literal,
                    value_pos,
                })
            }),
            Token::Char => p.parse_basic_lit(literal::unquote_char, |value, literal, value_pos| {
                Expr::CharLit(CharLit {
                    value,
                    literal,
                    value_pos,
                })
            }),
            Token::String => {
                p.parse_basic_lit(literal::unquote_string, |value, literal, value_pos| {
                    Expr::StringLit(StringLit {
                        value,
                        literal,
                        value_pos,
                    })
                })
            }
            Token::True | Token::False => {
                let expr = Expr::BoolLit(BoolLit {
                    value: p.token == Token::True,
                    literal: p.token_lit.clone(),
                    value_pos: p.pos,
                });
                p.next()?;
                Ok(expr)
            }
            Token::Undefined => {
                let expr = Expr::UndefinedLit(UndefinedLit { token_pos: p.pos });
                p.next()?;
                Ok(expr)
            }
            Token::Import => p.parse_import_expr(),
            Token::LParen => {
                let lparen = p.pos;
                p.next()?;
                p.expr_level += 1;
                let expr = p.parse_expr()?;
                p.expr_level -= 1;
                let rparen = p.expect(Token::RParen)?;
                Ok(Expr::Paren(ParenExpr {
                    expr: Box::new(expr),
                    lparen,
                    rparen,
                }))
            }
            Token::LBrack => p.parse_array_lit(),
            // a '{' in a control clause opens the body, not a map
            Token::LBrace if p.expr_level >= 0 => p.parse_map_lit(),
            Token::Func => p.parse_func_lit(),
            Token::Error => p.parse_error_expr(),
            Token::Immutable => p.parse_immutable_expr(),
            _ => {
                let pos = p.pos;
                p.error_expected(pos, "operand")?;
                p.advance()?;
                Ok(Self::bad_expr(pos, p.pos))
            }
        })
    }

    /// Decodes the current literal token with `decode`. Decoding failures are
    /// recorded and yield a bad expression covering the token.
    fn parse_basic_lit<T, E: std::fmt::Display>(
        &mut self,
        decode: impl FnOnce(&str) -> Result<T, E>,
        build: impl FnOnce(T, String, Pos) -> Expr,
    ) -> PResult<Expr> {
        let pos = self.pos;
        let expr = match decode(&self.token_lit) {
            Ok(value) => build(value, self.token_lit.clone(), pos),
            Err(err) => {
                self.error(pos, err.to_string())?;
                Self::bad_expr(pos, pos + self.token_lit.len())
            }
        };
        self.next()?;
        Ok(expr)
    }

    fn parse_import_expr(&mut self) -> PResult<Expr> {
        let token_pos = self.expect(Token::Import)?;
        self.expect(Token::LParen)?;
        if self.token != Token::String {
            self.error_expected(self.pos, "module name")?;
            self.advance()?;
            return Ok(Self::bad_expr(token_pos, self.pos));
        }

        let module_name = match literal::unquote_string(&self.token_lit) {
            Ok(name) => name,
            Err(err) => {
                self.error(self.pos, err.to_string())?;
                String::new()
            }
        };
        self.next()?;
        let rparen = self.expect(Token::RParen)?;
        Ok(Expr::Import(ImportExpr {
            module_name,
            token_pos,
            rparen,
        }))
    }

    fn parse_func_lit(&mut self) -> PResult<Expr> {
        self.traced("FuncLit", |p| {
            let ty = p.parse_func_type()?;
            if p.token != Token::LBrace {
                return Ok(Expr::FuncType(ty));
            }
            p.expr_level += 1;
            let body = p.parse_body()?;
            p.expr_level -= 1;
            Ok(Expr::FuncLit(FuncLit { ty, body }))
        })
    }

    fn parse_func_type(&mut self) -> PResult<FuncType> {
        self.traced("FuncType", |p| {
            let func_pos = p.expect(Token::Func)?;
            let params = p.parse_ident_list()?;
            Ok(FuncType { func_pos, params })
        })
    }

    fn parse_ident(&mut self) -> PResult<Ident> {
        let pos = self.pos;
        if self.token == Token::Ident {
            let name = self.token_lit.clone();
            self.next()?;
            return Ok(Ident::new(name, pos));
        }
        self.expect(Token::Ident)?;
        Ok(Ident::new("_", pos))
    }

    fn parse_ident_list(&mut self) -> PResult<IdentList> {
        self.traced("IdentList", |p| {
            let lparen = p.expect(Token::LParen)?;
            let mut list = Vec::new();
            let mut varargs = false;
            if p.token != Token::RParen {
                if p.token == Token::Ellipsis {
                    varargs = true;
                    p.next()?;
                }
                list.push(p.parse_ident()?);
                while !varargs && p.token == Token::Comma {
                    p.next()?;
                    if p.token == Token::Ellipsis {
                        varargs = true;
                        p.next()?;
                    }
                    list.push(p.parse_ident()?);
                }
            }
            let rparen = p.expect(Token::RParen)?;
            Ok(IdentList {
                lparen,
                varargs,
                list,
                rparen,
            })
        })
    }

    fn parse_array_lit(&mut self) -> PResult<Expr> {
        self.traced("ArrayLit", |p| {
            let lbrack = p.expect(Token::LBrack)?;
            p.expr_level += 1;

            let mut elements = Vec::new();
            while p.token != Token::RBrack && p.token != Token::Eof {
                elements.push(p.parse_expr()?);
                if !p.expect_comma(Token::RBrack)? {
                    break;
                }
            }

            p.expr_level -= 1;
            let rbrack = p.expect(Token::RBrack)?;
            Ok(Expr::ArrayLit(ArrayLit {
                elements,
                lbrack,
                rbrack,
            }))
        })
    }

    fn parse_map_lit(&mut self) -> PResult<Expr> {
        self.traced("MapLit", |p| {
            let lbrace = p.expect(Token::LBrace)?;
            p.expr_level += 1;

            let mut elements = Vec::new();
            while p.token != Token::RBrace && p.token != Token::Eof {
                elements.push(p.parse_map_element_lit()?);
                if !p.expect_comma(Token::RBrace)? {
                    break;
                }
            }

            p.expr_level -= 1;
            let rbrace = p.expect(Token::RBrace)?;
            Ok(Expr::MapLit(MapLit {
                lbrace,
                elements,
                rbrace,
            }))
        })
    }

    fn parse_map_element_lit(&mut self) -> PResult<MapElementLit> {
        self.traced("MapElementLit", |p| {
            let key_pos = p.pos;
            let key = match p.token {
                Token::Ident => p.token_lit.clone(),
                Token::String => match literal::unquote_string(&p.token_lit) {
                    Ok(key) => key,
                    Err(err) => {
                        p.error(key_pos, err.to_string())?;
                        "_".to_string()
                    }
                },
                _ => {
                    p.error_expected(key_pos, "map key")?;
                    "_".to_string()
                }
            };
            p.next()?;
            let colon = p.expect(Token::Colon)?;
            let value = p.parse_expr()?;
            Ok(MapElementLit {
                key,
                key_pos,
                colon,
                value,
            })
        })
    }

    fn parse_error_expr(&mut self) -> PResult<Expr> {
        let error_pos = self.expect(Token::Error)?;
        let lparen = self.expect(Token::LParen)?;
        let expr = self.parse_expr()?;
        let rparen = self.expect(Token::RParen)?;
        Ok(Expr::Error(ErrorExpr {
            expr: Box::new(expr),
            error_pos,
            lparen,
            rparen,
        }))
    }

    fn parse_immutable_expr(&mut self) -> PResult<Expr> {
        let immutable_pos = self.expect(Token::Immutable)?;
        let lparen = self.expect(Token::LParen)?;
        let expr = self.parse_expr()?;
        let rparen = self.expect(Token::RParen)?;
        Ok(Expr::Immutable(ImmutableExpr {
            expr: Box::new(expr),
            immutable_pos,
            lparen,
            rparen,
        }))
    }
}
