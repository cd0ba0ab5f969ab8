//! Token kinds, their spelling and binary-operator precedence

use std::fmt;

/// Precedence returned for tokens that are not binary operators
pub const LOWEST_PREC: u8 = 0;

/// Token kinds produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Unrecognised input
    Illegal,
    /// End of input
    Eof,
    /// Comment (only when comments are scanned)
    Comment,

    // Literals
    /// Identifier
    Ident,
    /// Integer literal
    Int,
    /// Floating point literal
    Float,
    /// Character literal
    Char,
    /// String literal (interpreted or raw)
    String,

    // Operators
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Quo,
    /// %
    Rem,
    /// &
    And,
    /// |
    Or,
    /// ^
    Xor,
    /// <<
    Shl,
    /// >>
    Shr,
    /// &^
    AndNot,
    /// +=
    AddAssign,
    /// -=
    SubAssign,
    /// *=
    MulAssign,
    /// /=
    QuoAssign,
    /// %=
    RemAssign,
    /// &=
    AndAssign,
    /// |=
    OrAssign,
    /// ^=
    XorAssign,
    /// <<=
    ShlAssign,
    /// >>=
    ShrAssign,
    /// &^=
    AndNotAssign,
    /// &&
    LAnd,
    /// ||
    LOr,
    /// ++
    Inc,
    /// --
    Dec,
    /// ==
    Equal,
    /// <
    Less,
    /// >
    Greater,
    /// =
    Assign,
    /// !
    Not,
    /// !=
    NotEqual,
    /// <=
    LessEq,
    /// >=
    GreaterEq,
    /// :=
    Define,
    /// ...
    Ellipsis,
    /// (
    LParen,
    /// [
    LBrack,
    /// {
    LBrace,
    /// ,
    Comma,
    /// .
    Period,
    /// )
    RParen,
    /// ]
    RBrack,
    /// }
    RBrace,
    /// ; or a soft end-of-line separator
    Semicolon,
    /// :
    Colon,
    /// ?
    Question,

    // Keywords
    /// break
    Break,
    /// continue
    Continue,
    /// else
    Else,
    /// for
    For,
    /// func
    Func,
    /// error
    Error,
    /// immutable
    Immutable,
    /// if
    If,
    /// return
    Return,
    /// export
    Export,
    /// true
    True,
    /// false
    False,
    /// in
    In,
    /// undefined
    Undefined,
    /// import
    Import,
}

const KEYWORDS: [Token; 15] = [
    Token::Break,
    Token::Continue,
    Token::Else,
    Token::For,
    Token::Func,
    Token::Error,
    Token::Immutable,
    Token::If,
    Token::Return,
    Token::Export,
    Token::True,
    Token::False,
    Token::In,
    Token::Undefined,
    Token::Import,
];

impl Token {
    /// Spelling of the token; literal kinds return their class name.
    pub fn as_str(self) -> &'static str {
        match self {
            Token::Illegal => "ILLEGAL",
            Token::Eof => "EOF",
            Token::Comment => "COMMENT",
            Token::Ident => "IDENT",
            Token::Int => "INT",
            Token::Float => "FLOAT",
            Token::Char => "CHAR",
            Token::String => "STRING",
            Token::Add => "+",
            Token::Sub => "-",
            Token::Mul => "*",
            Token::Quo => "/",
            Token::Rem => "%",
            Token::And => "&",
            Token::Or => "|",
            Token::Xor => "^",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::AndNot => "&^",
            Token::AddAssign => "+=",
            Token::SubAssign => "-=",
            Token::MulAssign => "*=",
            Token::QuoAssign => "/=",
            Token::RemAssign => "%=",
            Token::AndAssign => "&=",
            Token::OrAssign => "|=",
            Token::XorAssign => "^=",
            Token::ShlAssign => "<<=",
            Token::ShrAssign => ">>=",
            Token::AndNotAssign => "&^=",
            Token::LAnd => "&&",
            Token::LOr => "||",
            Token::Inc => "++",
            Token::Dec => "--",
            Token::Equal => "==",
            Token::Less => "<",
            Token::Greater => ">",
            Token::Assign => "=",
            Token::Not => "!",
            Token::NotEqual => "!=",
            Token::LessEq => "<=",
            Token::GreaterEq => ">=",
            Token::Define => ":=",
            Token::Ellipsis => "...",
            Token::LParen => "(",
            Token::LBrack => "[",
            Token::LBrace => "{",
            Token::Comma => ",",
            Token::Period => ".",
            Token::RParen => ")",
            Token::RBrack => "]",
            Token::RBrace => "}",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Question => "?",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Else => "else",
            Token::For => "for",
            Token::Func => "func",
            Token::Error => "error",
            Token::Immutable => "immutable",
            Token::If => "if",
            Token::Return => "return",
            Token::Export => "export",
            Token::True => "true",
            Token::False => "false",
            Token::In => "in",
            Token::Undefined => "undefined",
            Token::Import => "import",
        }
    }

    /// Binary-operator precedence, [`LOWEST_PREC`] for everything else.
    pub fn precedence(self) -> u8 {
        match self {
            Token::LOr => 1,
            Token::LAnd => 2,
            Token::Equal
            | Token::NotEqual
            | Token::Less
            | Token::LessEq
            | Token::Greater
            | Token::GreaterEq => 3,
            Token::Add | Token::Sub | Token::Or | Token::Xor => 4,
            Token::Mul
            | Token::Quo
            | Token::Rem
            | Token::Shl
            | Token::Shr
            | Token::And
            | Token::AndNot => 5,
            _ => LOWEST_PREC,
        }
    }

    /// Identifiers and basic literals
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Token::Ident | Token::Int | Token::Float | Token::Char | Token::String
        )
    }

    /// Operators and delimiters
    pub fn is_operator(self) -> bool {
        (Token::Add as u8..=Token::Question as u8).contains(&(self as u8))
    }

    /// Reserved words
    pub fn is_keyword(self) -> bool {
        (Token::Break as u8..=Token::Import as u8).contains(&(self as u8))
    }

    /// Maps an identifier to its keyword token, or [`Token::Ident`].
    pub fn lookup(ident: &str) -> Token {
        KEYWORDS
            .iter()
            .copied()
            .find(|kw| kw.as_str() == ident)
            .unwrap_or(Token::Ident)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
