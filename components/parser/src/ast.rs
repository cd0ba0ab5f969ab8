//! Abstract Syntax Tree node definitions
//!
//! Expressions and statements are closed enums over one struct per node kind.
//! Every node reports its start position ([`Node::pos`]), the position one
//! past its last byte ([`Node::end`]) and renders itself through `Display`.
//! Rendered output re-parses to a tree that renders identically.

use crate::literal;
use crate::token::Token;
use core_types::{Pos, SourceFile};
use std::fmt;
use std::sync::Arc;

/// Capabilities shared by all AST nodes
pub trait Node: fmt::Display {
    /// Position of the first byte of the node
    fn pos(&self) -> Pos;
    /// Position one past the last byte of the node
    fn end(&self) -> Pos;
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier
    Ident(Ident),
    /// Integer literal
    IntLit(IntLit),
    /// Floating point literal
    FloatLit(FloatLit),
    /// Character literal
    CharLit(CharLit),
    /// String literal
    StringLit(StringLit),
    /// `true` or `false`
    BoolLit(BoolLit),
    /// `undefined`
    UndefinedLit(UndefinedLit),
    /// `[a, b]`
    ArrayLit(ArrayLit),
    /// `{k: v}`
    MapLit(MapLit),
    /// Prefix operator
    Unary(UnaryExpr),
    /// Binary operator
    Binary(BinaryExpr),
    /// `c ? t : f`
    Cond(CondExpr),
    /// Function literal
    FuncLit(FuncLit),
    /// Function signature without a body
    FuncType(FuncType),
    /// Call
    Call(CallExpr),
    /// `x[i]`
    Index(IndexExpr),
    /// `x[lo:hi]`
    Slice(SliceExpr),
    /// `x.name`
    Selector(SelectorExpr),
    /// Parenthesized expression
    Paren(ParenExpr),
    /// `import("name")`
    Import(ImportExpr),
    /// `error(x)`
    Error(ErrorExpr),
    /// `immutable(x)`
    Immutable(ImmutableExpr),
    /// Placeholder for an expression that failed to parse
    Bad(BadExpr),
}

impl Node for Expr {
    fn pos(&self) -> Pos {
        match self {
            Expr::Ident(e) => e.pos(),
            Expr::IntLit(e) => e.pos(),
            Expr::FloatLit(e) => e.pos(),
            Expr::CharLit(e) => e.pos(),
            Expr::StringLit(e) => e.pos(),
            Expr::BoolLit(e) => e.pos(),
            Expr::UndefinedLit(e) => e.pos(),
            Expr::ArrayLit(e) => e.pos(),
            Expr::MapLit(e) => e.pos(),
            Expr::Unary(e) => e.pos(),
            Expr::Binary(e) => e.pos(),
            Expr::Cond(e) => e.pos(),
            Expr::FuncLit(e) => e.pos(),
            Expr::FuncType(e) => e.pos(),
            Expr::Call(e) => e.pos(),
            Expr::Index(e) => e.pos(),
            Expr::Slice(e) => e.pos(),
            Expr::Selector(e) => e.pos(),
            Expr::Paren(e) => e.pos(),
            Expr::Import(e) => e.pos(),
            Expr::Error(e) => e.pos(),
            Expr::Immutable(e) => e.pos(),
            Expr::Bad(e) => e.pos(),
        }
    }

    fn end(&self) -> Pos {
        match self {
            Expr::Ident(e) => e.end(),
            Expr::IntLit(e) => e.end(),
            Expr::FloatLit(e) => e.end(),
            Expr::CharLit(e) => e.end(),
            Expr::StringLit(e) => e.end(),
            Expr::BoolLit(e) => e.end(),
            Expr::UndefinedLit(e) => e.end(),
            Expr::ArrayLit(e) => e.end(),
            Expr::MapLit(e) => e.end(),
            Expr::Unary(e) => e.end(),
            Expr::Binary(e) => e.end(),
            Expr::Cond(e) => e.end(),
            Expr::FuncLit(e) => e.end(),
            Expr::FuncType(e) => e.end(),
            Expr::Call(e) => e.end(),
            Expr::Index(e) => e.end(),
            Expr::Slice(e) => e.end(),
            Expr::Selector(e) => e.end(),
            Expr::Paren(e) => e.end(),
            Expr::Import(e) => e.end(),
            Expr::Error(e) => e.end(),
            Expr::Immutable(e) => e.end(),
            Expr::Bad(e) => e.end(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(e) => fmt::Display::fmt(e, f),
            Expr::IntLit(e) => fmt::Display::fmt(e, f),
            Expr::FloatLit(e) => fmt::Display::fmt(e, f),
            Expr::CharLit(e) => fmt::Display::fmt(e, f),
            Expr::StringLit(e) => fmt::Display::fmt(e, f),
            Expr::BoolLit(e) => fmt::Display::fmt(e, f),
            Expr::UndefinedLit(e) => fmt::Display::fmt(e, f),
            Expr::ArrayLit(e) => fmt::Display::fmt(e, f),
            Expr::MapLit(e) => fmt::Display::fmt(e, f),
            Expr::Unary(e) => fmt::Display::fmt(e, f),
            Expr::Binary(e) => fmt::Display::fmt(e, f),
            Expr::Cond(e) => fmt::Display::fmt(e, f),
            Expr::FuncLit(e) => fmt::Display::fmt(e, f),
            Expr::FuncType(e) => fmt::Display::fmt(e, f),
            Expr::Call(e) => fmt::Display::fmt(e, f),
            Expr::Index(e) => fmt::Display::fmt(e, f),
            Expr::Slice(e) => fmt::Display::fmt(e, f),
            Expr::Selector(e) => fmt::Display::fmt(e, f),
            Expr::Paren(e) => fmt::Display::fmt(e, f),
            Expr::Import(e) => fmt::Display::fmt(e, f),
            Expr::Error(e) => fmt::Display::fmt(e, f),
            Expr::Immutable(e) => fmt::Display::fmt(e, f),
            Expr::Bad(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Expr {
    /// Whether this is the error-recovery placeholder
    pub fn is_bad(&self) -> bool {
        matches!(self, Expr::Bad(_))
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Name
    pub name: String,
    /// Position of the name
    pub name_pos: Pos,
}

impl Ident {
    /// Creates an identifier at `name_pos`
    pub fn new(name: impl Into<String>, name_pos: Pos) -> Self {
        Self {
            name: name.into(),
            name_pos,
        }
    }
}

impl Node for Ident {
    fn pos(&self) -> Pos {
        self.name_pos
    }
    fn end(&self) -> Pos {
        self.name_pos + self.name.len()
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

macro_rules! basic_lit {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            /// Decoded value
            pub value: $ty,
            /// Source text
            pub literal: String,
            /// Position of the literal
            pub value_pos: Pos,
        }

        impl Node for $name {
            fn pos(&self) -> Pos {
                self.value_pos
            }
            fn end(&self) -> Pos {
                self.value_pos + self.literal.len()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.literal)
            }
        }
    };
}

basic_lit!(
    /// Integer literal
    IntLit,
    i64
);
basic_lit!(
    /// Floating point literal
    FloatLit,
    f64
);
basic_lit!(
    /// Character literal
    CharLit,
    char
);
basic_lit!(
    /// String literal; `literal` keeps the quotes
    StringLit,
    String
);
basic_lit!(
    /// Boolean literal
    BoolLit,
    bool
);

/// `undefined`
#[derive(Debug, Clone, PartialEq)]
pub struct UndefinedLit {
    /// Position of the keyword
    pub token_pos: Pos,
}

impl Node for UndefinedLit {
    fn pos(&self) -> Pos {
        self.token_pos
    }
    fn end(&self) -> Pos {
        self.token_pos + Token::Undefined.as_str().len()
    }
}

impl fmt::Display for UndefinedLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("undefined")
    }
}

/// Array literal
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    /// Elements in source order
    pub elements: Vec<Expr>,
    /// Position of `[`
    pub lbrack: Pos,
    /// Position of `]`
    pub rbrack: Pos,
}

impl Node for ArrayLit {
    fn pos(&self) -> Pos {
        self.lbrack
    }
    fn end(&self) -> Pos {
        self.rbrack + 1
    }
}

impl fmt::Display for ArrayLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.elements))
    }
}

/// One `key: value` entry of a map literal
#[derive(Debug, Clone, PartialEq)]
pub struct MapElementLit {
    /// Decoded key
    pub key: String,
    /// Position of the key
    pub key_pos: Pos,
    /// Position of `:`
    pub colon: Pos,
    /// Value
    pub value: Expr,
}

impl Node for MapElementLit {
    fn pos(&self) -> Pos {
        self.key_pos
    }
    fn end(&self) -> Pos {
        self.value.end()
    }
}

impl fmt::Display for MapElementLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_bare_key(&self.key) {
            write!(f, "{}: {}", self.key, self.value)
        } else {
            write!(f, "{}: {}", literal::quote(&self.key), self.value)
        }
    }
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_ok = chars
        .next()
        .map_or(false, |c| c == '_' || c.is_alphabetic());
    starts_ok
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !Token::lookup(key).is_keyword()
}

/// Map literal; element order is preserved
#[derive(Debug, Clone, PartialEq)]
pub struct MapLit {
    /// Position of `{`
    pub lbrace: Pos,
    /// Elements in source order
    pub elements: Vec<MapElementLit>,
    /// Position of `}`
    pub rbrace: Pos,
}

impl Node for MapLit {
    fn pos(&self) -> Pos {
        self.lbrace
    }
    fn end(&self) -> Pos {
        self.rbrace + 1
    }
}

impl fmt::Display for MapLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", join(&self.elements))
    }
}

/// Prefix operator expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    /// Operand
    pub expr: Box<Expr>,
    /// Operator (`+ - ! ^`)
    pub token: Token,
    /// Position of the operator
    pub token_pos: Pos,
}

impl Node for UnaryExpr {
    fn pos(&self) -> Pos {
        self.token_pos
    }
    fn end(&self) -> Pos {
        self.expr.end()
    }
}

impl fmt::Display for UnaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.token, self.expr)
    }
}

/// Binary operator expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// Left operand
    pub lhs: Box<Expr>,
    /// Right operand
    pub rhs: Box<Expr>,
    /// Operator
    pub token: Token,
    /// Position of the operator
    pub token_pos: Pos,
}

impl Node for BinaryExpr {
    fn pos(&self) -> Pos {
        self.lhs.pos()
    }
    fn end(&self) -> Pos {
        self.rhs.end()
    }
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.lhs, self.token, self.rhs)
    }
}

/// Ternary conditional
#[derive(Debug, Clone, PartialEq)]
pub struct CondExpr {
    /// Condition
    pub cond: Box<Expr>,
    /// Value when the condition holds
    pub true_expr: Box<Expr>,
    /// Value otherwise
    pub false_expr: Box<Expr>,
    /// Position of `?`
    pub question_pos: Pos,
    /// Position of `:`
    pub colon_pos: Pos,
}

impl Node for CondExpr {
    fn pos(&self) -> Pos {
        self.cond.pos()
    }
    fn end(&self) -> Pos {
        self.false_expr.end()
    }
}

impl fmt::Display for CondExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} ? {} : {})",
            self.cond, self.true_expr, self.false_expr
        )
    }
}

/// Parameter list; the last parameter may be variadic
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentList {
    /// Position of `(`, `NO_POS` when absent
    pub lparen: Pos,
    /// Whether the last identifier collects remaining arguments
    pub varargs: bool,
    /// Parameters
    pub list: Vec<Ident>,
    /// Position of `)`, `NO_POS` when absent
    pub rparen: Pos,
}

impl IdentList {
    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the list has no identifiers
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Node for IdentList {
    fn pos(&self) -> Pos {
        if self.lparen.is_valid() {
            return self.lparen;
        }
        self.list.first().map_or(Pos::NO_POS, Node::pos)
    }
    fn end(&self) -> Pos {
        if self.rparen.is_valid() {
            return self.rparen + 1;
        }
        self.list.last().map_or(Pos::NO_POS, Node::end)
    }
}

impl fmt::Display for IdentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.list.len().saturating_sub(1);
        let params: Vec<String> = self
            .list
            .iter()
            .enumerate()
            .map(|(i, ident)| {
                if self.varargs && i == last {
                    format!("...{}", ident)
                } else {
                    ident.to_string()
                }
            })
            .collect();
        write!(f, "({})", params.join(", "))
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    /// Position of `func`
    pub func_pos: Pos,
    /// Parameters
    pub params: IdentList,
}

impl Node for FuncType {
    fn pos(&self) -> Pos {
        self.func_pos
    }
    fn end(&self) -> Pos {
        self.params.end()
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func{}", self.params)
    }
}

/// Function literal
#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    /// Signature
    pub ty: FuncType,
    /// Body
    pub body: BlockStmt,
}

impl Node for FuncLit {
    fn pos(&self) -> Pos {
        self.ty.pos()
    }
    fn end(&self) -> Pos {
        self.body.end()
    }
}

impl fmt::Display for FuncLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func{} {}", self.ty.params, self.body)
    }
}

/// Call expression
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Callee
    pub func: Box<Expr>,
    /// Position of `(`
    pub lparen: Pos,
    /// Arguments
    pub args: Vec<Expr>,
    /// Position of `...` when the last argument is spread
    pub ellipsis: Option<Pos>,
    /// Position of `)`
    pub rparen: Pos,
}

impl Node for CallExpr {
    fn pos(&self) -> Pos {
        self.func.pos()
    }
    fn end(&self) -> Pos {
        self.rparen + 1
    }
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spread = if self.ellipsis.is_some() { "..." } else { "" };
        write!(f, "{}({}{})", self.func, join(&self.args), spread)
    }
}

/// Index expression
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    /// Indexed value
    pub expr: Box<Expr>,
    /// Position of `[`
    pub lbrack: Pos,
    /// Index
    pub index: Box<Expr>,
    /// Position of `]`
    pub rbrack: Pos,
}

impl Node for IndexExpr {
    fn pos(&self) -> Pos {
        self.expr.pos()
    }
    fn end(&self) -> Pos {
        self.rbrack + 1
    }
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.expr, self.index)
    }
}

/// Slice expression; either bound may be omitted
#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    /// Sliced value
    pub expr: Box<Expr>,
    /// Position of `[`
    pub lbrack: Pos,
    /// Lower bound
    pub low: Option<Box<Expr>>,
    /// Upper bound
    pub high: Option<Box<Expr>>,
    /// Position of `]`
    pub rbrack: Pos,
}

impl Node for SliceExpr {
    fn pos(&self) -> Pos {
        self.expr.pos()
    }
    fn end(&self) -> Pos {
        self.rbrack + 1
    }
}

impl fmt::Display for SliceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.expr)?;
        if let Some(low) = &self.low {
            write!(f, "{}", low)?;
        }
        f.write_str(":")?;
        if let Some(high) = &self.high {
            write!(f, "{}", high)?;
        }
        f.write_str("]")
    }
}

/// Field access `x.name`, indexing by a constant string
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    /// Accessed value
    pub expr: Box<Expr>,
    /// Field name
    pub sel: StringLit,
}

impl Node for SelectorExpr {
    fn pos(&self) -> Pos {
        self.expr.pos()
    }
    fn end(&self) -> Pos {
        self.sel.end()
    }
}

impl fmt::Display for SelectorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.expr, self.sel)
    }
}

/// Parenthesized expression
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    /// Inner expression
    pub expr: Box<Expr>,
    /// Position of `(`
    pub lparen: Pos,
    /// Position of `)`
    pub rparen: Pos,
}

impl Node for ParenExpr {
    fn pos(&self) -> Pos {
        self.lparen
    }
    fn end(&self) -> Pos {
        self.rparen + 1
    }
}

impl fmt::Display for ParenExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr.as_ref() {
            // these already print their own parentheses
            Expr::Unary(_) | Expr::Binary(_) | Expr::Cond(_) => fmt::Display::fmt(&self.expr, f),
            expr => write!(f, "({})", expr),
        }
    }
}

/// `import("name")`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportExpr {
    /// Module name
    pub module_name: String,
    /// Position of `import`
    pub token_pos: Pos,
    /// Position of `)`
    pub rparen: Pos,
}

impl Node for ImportExpr {
    fn pos(&self) -> Pos {
        self.token_pos
    }
    fn end(&self) -> Pos {
        self.rparen + 1
    }
}

impl fmt::Display for ImportExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import({})", literal::quote(&self.module_name))
    }
}

/// `error(x)`: wraps a value into an error value
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorExpr {
    /// Wrapped expression
    pub expr: Box<Expr>,
    /// Position of `error`
    pub error_pos: Pos,
    /// Position of `(`
    pub lparen: Pos,
    /// Position of `)`
    pub rparen: Pos,
}

impl Node for ErrorExpr {
    fn pos(&self) -> Pos {
        self.error_pos
    }
    fn end(&self) -> Pos {
        self.rparen + 1
    }
}

impl fmt::Display for ErrorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error({})", self.expr)
    }
}

/// `immutable(x)`: marks a value as read-only
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableExpr {
    /// Wrapped expression
    pub expr: Box<Expr>,
    /// Position of `immutable`
    pub immutable_pos: Pos,
    /// Position of `(`
    pub lparen: Pos,
    /// Position of `)`
    pub rparen: Pos,
}

impl Node for ImmutableExpr {
    fn pos(&self) -> Pos {
        self.immutable_pos
    }
    fn end(&self) -> Pos {
        self.rparen + 1
    }
}

impl fmt::Display for ImmutableExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "immutable({})", self.expr)
    }
}

/// Placeholder for source that could not be parsed as an expression
#[derive(Debug, Clone, PartialEq)]
pub struct BadExpr {
    /// Start of the skipped range
    pub from: Pos,
    /// End of the skipped range
    pub to: Pos,
}

impl Node for BadExpr {
    fn pos(&self) -> Pos {
        self.from
    }
    fn end(&self) -> Pos {
        self.to
    }
}

impl fmt::Display for BadExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<bad expression>")
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression evaluated for its effect
    Expr(ExprStmt),
    /// Assignment, definition or compound assignment
    Assign(AssignStmt),
    /// `x++` / `x--`
    IncDec(IncDecStmt),
    /// `if`
    If(IfStmt),
    /// C-style or condition-only `for`
    For(ForStmt),
    /// `for k, v in x`
    ForIn(ForInStmt),
    /// `return`
    Return(ReturnStmt),
    /// `export`
    Export(ExportStmt),
    /// `break` / `continue`
    Branch(BranchStmt),
    /// `{ ... }`
    Block(BlockStmt),
    /// Empty statement
    Empty(EmptyStmt),
    /// Placeholder for a statement that failed to parse
    Bad(BadStmt),
}

impl Node for Stmt {
    fn pos(&self) -> Pos {
        match self {
            Stmt::Expr(s) => s.pos(),
            Stmt::Assign(s) => s.pos(),
            Stmt::IncDec(s) => s.pos(),
            Stmt::If(s) => s.pos(),
            Stmt::For(s) => s.pos(),
            Stmt::ForIn(s) => s.pos(),
            Stmt::Return(s) => s.pos(),
            Stmt::Export(s) => s.pos(),
            Stmt::Branch(s) => s.pos(),
            Stmt::Block(s) => s.pos(),
            Stmt::Empty(s) => s.pos(),
            Stmt::Bad(s) => s.pos(),
        }
    }

    fn end(&self) -> Pos {
        match self {
            Stmt::Expr(s) => s.end(),
            Stmt::Assign(s) => s.end(),
            Stmt::IncDec(s) => s.end(),
            Stmt::If(s) => s.end(),
            Stmt::For(s) => s.end(),
            Stmt::ForIn(s) => s.end(),
            Stmt::Return(s) => s.end(),
            Stmt::Export(s) => s.end(),
            Stmt::Branch(s) => s.end(),
            Stmt::Block(s) => s.end(),
            Stmt::Empty(s) => s.end(),
            Stmt::Bad(s) => s.end(),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(s) => fmt::Display::fmt(s, f),
            Stmt::Assign(s) => fmt::Display::fmt(s, f),
            Stmt::IncDec(s) => fmt::Display::fmt(s, f),
            Stmt::If(s) => fmt::Display::fmt(s, f),
            Stmt::For(s) => fmt::Display::fmt(s, f),
            Stmt::ForIn(s) => fmt::Display::fmt(s, f),
            Stmt::Return(s) => fmt::Display::fmt(s, f),
            Stmt::Export(s) => fmt::Display::fmt(s, f),
            Stmt::Branch(s) => fmt::Display::fmt(s, f),
            Stmt::Block(s) => fmt::Display::fmt(s, f),
            Stmt::Empty(s) => fmt::Display::fmt(s, f),
            Stmt::Bad(s) => fmt::Display::fmt(s, f),
        }
    }
}

/// Writes a statement sequence so that it re-parses to the same sequence.
///
/// Non-empty statements are separated by `"; "`. An empty statement owns its
/// `;`, so no extra separator follows the statement before it.
fn write_stmts(f: &mut fmt::Formatter<'_>, stmts: &[Stmt]) -> fmt::Result {
    for (i, stmt) in stmts.iter().enumerate() {
        if i > 0 {
            match stmts[i - 1] {
                Stmt::Empty(_) => f.write_str(" ")?,
                _ => f.write_str("; ")?,
            }
        }
        write!(f, "{}", stmt)?;
    }
    Ok(())
}

/// Expression statement
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    /// Expression
    pub expr: Expr,
}

impl Node for ExprStmt {
    fn pos(&self) -> Pos {
        self.expr.pos()
    }
    fn end(&self) -> Pos {
        self.expr.end()
    }
}

impl fmt::Display for ExprStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

/// Assignment: `=`, `:=` or a compound operator such as `+=`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// Targets
    pub lhs: Vec<Expr>,
    /// Values
    pub rhs: Vec<Expr>,
    /// Assignment operator
    pub token: Token,
    /// Position of the operator
    pub token_pos: Pos,
}

impl Node for AssignStmt {
    fn pos(&self) -> Pos {
        self.lhs.first().map_or(self.token_pos, Node::pos)
    }
    fn end(&self) -> Pos {
        self.rhs
            .last()
            .map_or(self.token_pos + self.token.as_str().len(), Node::end)
    }
}

impl fmt::Display for AssignStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            join(&self.lhs),
            self.token,
            join(&self.rhs)
        )
    }
}

/// `x++` or `x--`
#[derive(Debug, Clone, PartialEq)]
pub struct IncDecStmt {
    /// Operand
    pub expr: Expr,
    /// [`Token::Inc`] or [`Token::Dec`]
    pub token: Token,
    /// Position of the operator
    pub token_pos: Pos,
}

impl Node for IncDecStmt {
    fn pos(&self) -> Pos {
        self.expr.pos()
    }
    fn end(&self) -> Pos {
        self.token_pos + 2
    }
}

impl fmt::Display for IncDecStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.expr, self.token)
    }
}

/// `if [init;] cond { ... } [else ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// Position of `if`
    pub if_pos: Pos,
    /// Statement scoped to the condition
    pub init: Option<Box<Stmt>>,
    /// Condition
    pub cond: Expr,
    /// Body
    pub body: BlockStmt,
    /// Else branch: a block or a nested `if`
    pub else_stmt: Option<Box<Stmt>>,
}

impl Node for IfStmt {
    fn pos(&self) -> Pos {
        self.if_pos
    }
    fn end(&self) -> Pos {
        match &self.else_stmt {
            Some(else_stmt) => else_stmt.end(),
            None => self.body.end(),
        }
    }
}

impl fmt::Display for IfStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("if ")?;
        if let Some(init) = &self.init {
            write!(f, "{}; ", init)?;
        }
        write!(f, "{} {}", self.cond, self.body)?;
        if let Some(else_stmt) = &self.else_stmt {
            write!(f, " else {}", else_stmt)?;
        }
        Ok(())
    }
}

/// `for [init]; [cond]; [post] { ... }`, `for cond { ... }` or `for { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// Position of `for`
    pub for_pos: Pos,
    /// Init statement
    pub init: Option<Box<Stmt>>,
    /// Loop condition
    pub cond: Option<Expr>,
    /// Post statement
    pub post: Option<Box<Stmt>>,
    /// Body
    pub body: BlockStmt,
}

impl Node for ForStmt {
    fn pos(&self) -> Pos {
        self.for_pos
    }
    fn end(&self) -> Pos {
        self.body.end()
    }
}

impl fmt::Display for ForStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cond = self.cond.as_ref().map(ToString::to_string);
        if self.init.is_none() && self.post.is_none() {
            return match cond {
                Some(cond) => write!(f, "for {} {}", cond, self.body),
                None => write!(f, "for {}", self.body),
            };
        }
        let init = self.init.as_ref().map(ToString::to_string);
        let mut header = format!(
            "for {}; {};",
            init.unwrap_or_default(),
            cond.unwrap_or_default()
        );
        if let Some(post) = &self.post {
            header.push(' ');
            header.push_str(&post.to_string());
        }
        write!(f, "{} {}", header, self.body)
    }
}

/// `for key, value in iterable { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    /// Position of `for`
    pub for_pos: Pos,
    /// Key variable, `_` when only a value is bound
    pub key: Ident,
    /// Value variable
    pub value: Ident,
    /// Iterated expression
    pub iterable: Expr,
    /// Body
    pub body: BlockStmt,
}

impl Node for ForInStmt {
    fn pos(&self) -> Pos {
        self.for_pos
    }
    fn end(&self) -> Pos {
        self.body.end()
    }
}

impl fmt::Display for ForInStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "for {}, {} in {} {}",
            self.key, self.value, self.iterable, self.body
        )
    }
}

/// `return [expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    /// Position of `return`
    pub return_pos: Pos,
    /// Returned value
    pub result: Option<Expr>,
}

impl Node for ReturnStmt {
    fn pos(&self) -> Pos {
        self.return_pos
    }
    fn end(&self) -> Pos {
        match &self.result {
            Some(result) => result.end(),
            None => self.return_pos + Token::Return.as_str().len(),
        }
    }
}

impl fmt::Display for ReturnStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Some(result) => write!(f, "return {}", result),
            None => f.write_str("return"),
        }
    }
}

/// `export expr`: the module's public value
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStmt {
    /// Position of `export`
    pub export_pos: Pos,
    /// Exported value
    pub result: Expr,
}

impl Node for ExportStmt {
    fn pos(&self) -> Pos {
        self.export_pos
    }
    fn end(&self) -> Pos {
        self.result.end()
    }
}

impl fmt::Display for ExportStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export {}", self.result)
    }
}

/// `break` or `continue`, optionally labelled
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    /// [`Token::Break`] or [`Token::Continue`]
    pub token: Token,
    /// Position of the keyword
    pub token_pos: Pos,
    /// Label
    pub label: Option<Ident>,
}

impl Node for BranchStmt {
    fn pos(&self) -> Pos {
        self.token_pos
    }
    fn end(&self) -> Pos {
        match &self.label {
            Some(label) => label.end(),
            None => self.token_pos + self.token.as_str().len(),
        }
    }
}

impl fmt::Display for BranchStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} {}", self.token, label),
            None => fmt::Display::fmt(&self.token, f),
        }
    }
}

/// `{ ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// Statements
    pub stmts: Vec<Stmt>,
    /// Position of `{`
    pub lbrace: Pos,
    /// Position of `}`
    pub rbrace: Pos,
}

impl Node for BlockStmt {
    fn pos(&self) -> Pos {
        self.lbrace
    }
    fn end(&self) -> Pos {
        self.rbrace + 1
    }
}

impl fmt::Display for BlockStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        write_stmts(f, &self.stmts)?;
        f.write_str("}")
    }
}

/// Empty statement: an explicit `;` or one implied by the end of a line or a `}`
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    /// Position of the semicolon
    pub semicolon: Pos,
    /// Whether the semicolon was inserted rather than written
    pub implicit: bool,
}

impl Node for EmptyStmt {
    fn pos(&self) -> Pos {
        self.semicolon
    }
    fn end(&self) -> Pos {
        if self.implicit {
            self.semicolon
        } else {
            self.semicolon + 1
        }
    }
}

impl fmt::Display for EmptyStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(";")
    }
}

/// Placeholder for source that could not be parsed as a statement
#[derive(Debug, Clone, PartialEq)]
pub struct BadStmt {
    /// Start of the skipped range
    pub from: Pos,
    /// End of the skipped range
    pub to: Pos,
}

impl Node for BadStmt {
    fn pos(&self) -> Pos {
        self.from
    }
    fn end(&self) -> Pos {
        self.to
    }
}

impl fmt::Display for BadStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<bad statement>")
    }
}

/// Root of a parsed source file
#[derive(Debug, Clone)]
pub struct File {
    /// File the statements were parsed from
    pub input_file: Arc<SourceFile>,
    /// Top-level statements
    pub stmts: Vec<Stmt>,
}

impl Node for File {
    fn pos(&self) -> Pos {
        Pos(self.input_file.base())
    }
    fn end(&self) -> Pos {
        match self.stmts.last() {
            Some(last) => last.end(),
            None => Pos(self.input_file.base() + self.input_file.size()),
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmts(f, &self.stmts)
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Callbacks for a depth-first traversal.
///
/// The default methods keep walking; an override that wants to descend calls
/// [`walk_expr`] or [`walk_stmt`] itself.
///
/// Every identifier reaches [`Visitor::visit_ident`]: identifier expressions,
/// function parameters and `for-in` loop variables. Selector field names and
/// map keys are string keys, not identifiers, and are not visited.
pub trait Visitor {
    /// Called for every expression
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    /// Called for every statement
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    /// Called for every identifier
    fn visit_ident(&mut self, _ident: &Ident) {}
}

/// Visits the direct children of `expr` in source order
pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Ident(e) => v.visit_ident(e),
        Expr::IntLit(_)
        | Expr::FloatLit(_)
        | Expr::CharLit(_)
        | Expr::StringLit(_)
        | Expr::BoolLit(_)
        | Expr::UndefinedLit(_)
        | Expr::Import(_)
        | Expr::Bad(_) => {}
        Expr::FuncType(e) => e.params.list.iter().for_each(|p| v.visit_ident(p)),
        Expr::ArrayLit(e) => e.elements.iter().for_each(|el| v.visit_expr(el)),
        Expr::MapLit(e) => e.elements.iter().for_each(|el| v.visit_expr(&el.value)),
        Expr::Unary(e) => v.visit_expr(&e.expr),
        Expr::Binary(e) => {
            v.visit_expr(&e.lhs);
            v.visit_expr(&e.rhs);
        }
        Expr::Cond(e) => {
            v.visit_expr(&e.cond);
            v.visit_expr(&e.true_expr);
            v.visit_expr(&e.false_expr);
        }
        Expr::FuncLit(e) => {
            e.ty.params.list.iter().for_each(|p| v.visit_ident(p));
            e.body.stmts.iter().for_each(|s| v.visit_stmt(s));
        }
        Expr::Call(e) => {
            v.visit_expr(&e.func);
            e.args.iter().for_each(|a| v.visit_expr(a));
        }
        Expr::Index(e) => {
            v.visit_expr(&e.expr);
            v.visit_expr(&e.index);
        }
        Expr::Slice(e) => {
            v.visit_expr(&e.expr);
            if let Some(low) = &e.low {
                v.visit_expr(low);
            }
            if let Some(high) = &e.high {
                v.visit_expr(high);
            }
        }
        Expr::Selector(e) => v.visit_expr(&e.expr),
        Expr::Paren(e) => v.visit_expr(&e.expr),
        Expr::Error(e) => v.visit_expr(&e.expr),
        Expr::Immutable(e) => v.visit_expr(&e.expr),
    }
}

/// Visits the direct children of `stmt` in source order
pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Expr(s) => v.visit_expr(&s.expr),
        Stmt::Assign(s) => {
            s.lhs.iter().for_each(|e| v.visit_expr(e));
            s.rhs.iter().for_each(|e| v.visit_expr(e));
        }
        Stmt::IncDec(s) => v.visit_expr(&s.expr),
        Stmt::If(s) => {
            if let Some(init) = &s.init {
                v.visit_stmt(init);
            }
            v.visit_expr(&s.cond);
            s.body.stmts.iter().for_each(|st| v.visit_stmt(st));
            if let Some(else_stmt) = &s.else_stmt {
                v.visit_stmt(else_stmt);
            }
        }
        Stmt::For(s) => {
            if let Some(init) = &s.init {
                v.visit_stmt(init);
            }
            if let Some(cond) = &s.cond {
                v.visit_expr(cond);
            }
            if let Some(post) = &s.post {
                v.visit_stmt(post);
            }
            s.body.stmts.iter().for_each(|st| v.visit_stmt(st));
        }
        Stmt::ForIn(s) => {
            v.visit_ident(&s.key);
            v.visit_ident(&s.value);
            v.visit_expr(&s.iterable);
            s.body.stmts.iter().for_each(|st| v.visit_stmt(st));
        }
        Stmt::Return(s) => {
            if let Some(result) = &s.result {
                v.visit_expr(result);
            }
        }
        Stmt::Export(s) => v.visit_expr(&s.result),
        Stmt::Block(s) => s.stmts.iter().for_each(|st| v.visit_stmt(st)),
        Stmt::Branch(_) | Stmt::Empty(_) | Stmt::Bad(_) => {}
    }
}
