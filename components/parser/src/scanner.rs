//! Scanner - turns source bytes into a stream of lexemes
//!
//! The parser only depends on the [`TokenSource`] contract; [`Scanner`] is the
//! default implementation. Besides splitting the input into tokens it
//! registers line starts in the [`SourceFile`] it scans and inserts a soft
//! semicolon at the end of any line whose last token could end a statement.

use crate::token::Token;
use core_types::{Pos, SourceFile};
use std::sync::Arc;

const BOM: char = '\u{FEFF}';

/// A token together with its source text and position
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// Token kind
    pub token: Token,
    /// Source text for literals and comments, `";"` or `"\n"` for semicolons
    pub literal: String,
    /// Position of the first byte
    pub pos: Pos,
    /// Set on semicolons the scanner inserted at an end of line
    pub implicit: bool,
}

impl Lexeme {
    fn new(token: Token, literal: String, pos: Pos) -> Self {
        Self {
            token,
            literal,
            pos,
            implicit: false,
        }
    }

    fn soft_semicolon(pos: Pos) -> Self {
        Self {
            token: Token::Semicolon,
            literal: "\n".to_string(),
            pos,
            implicit: true,
        }
    }
}

/// Source of tokens consumed by the parser.
///
/// Each call to [`scan`](TokenSource::scan) returns the next lexeme and moves
/// past it; once input is exhausted every call returns [`Token::Eof`].
pub trait TokenSource {
    /// Returns the next lexeme
    fn scan(&mut self) -> Lexeme;

    /// Drains lexical errors reported since the last call
    fn take_errors(&mut self) -> Vec<(Pos, String)> {
        Vec::new()
    }
}

/// Scanner options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMode {
    /// Return comments as [`Token::Comment`] instead of skipping them
    pub scan_comments: bool,
    /// Insert soft semicolons at line ends
    pub insert_semis: bool,
}

impl Default for ScanMode {
    fn default() -> Self {
        Self {
            scan_comments: false,
            insert_semis: true,
        }
    }
}

/// Default lexer for script source text
pub struct Scanner<'a> {
    file: Arc<SourceFile>,
    src: &'a [u8],
    /// current character, `None` at end of input
    ch: Option<char>,
    offset: usize,
    read_offset: usize,
    insert_semi: bool,
    errors: Vec<(Pos, String)>,
    error_count: usize,
    mode: ScanMode,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `src`, which must be the content of `file`.
    ///
    /// # Panics
    ///
    /// Panics if the length of `src` differs from the file size.
    pub fn new(file: Arc<SourceFile>, src: &'a [u8], mode: ScanMode) -> Self {
        assert_eq!(
            file.size(),
            src.len(),
            "file size ({}) does not match src len ({})",
            file.size(),
            src.len()
        );

        let mut scanner = Self {
            file,
            src,
            ch: Some(' '),
            offset: 0,
            read_offset: 0,
            insert_semi: false,
            errors: Vec::new(),
            error_count: 0,
            mode,
        };
        scanner.next();
        if scanner.ch == Some(BOM) {
            scanner.next();
        }
        scanner
    }

    /// Total number of lexical errors reported
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    fn next(&mut self) {
        if self.read_offset < self.src.len() {
            self.offset = self.read_offset;
            if self.ch == Some('\n') {
                self.file.add_line(self.offset);
            }
            let b = self.src[self.read_offset];
            let (ch, width) = if b == 0 {
                self.error(self.offset, "illegal character NUL");
                ('\0', 1)
            } else if b.is_ascii() {
                (char::from(b), 1)
            } else {
                match decode_rune(&self.src[self.read_offset..]) {
                    Some((ch, width)) => {
                        if ch == BOM && self.offset > 0 {
                            self.error(self.offset, "illegal byte order mark");
                        }
                        (ch, width)
                    }
                    None => {
                        self.error(self.offset, "illegal UTF-8 encoding");
                        (char::REPLACEMENT_CHARACTER, 1)
                    }
                }
            };
            self.read_offset += width;
            self.ch = Some(ch);
        } else {
            self.offset = self.src.len();
            if self.ch == Some('\n') {
                self.file.add_line(self.offset);
            }
            self.ch = None;
        }
    }

    fn peek(&self) -> u8 {
        self.src.get(self.read_offset).copied().unwrap_or(0)
    }

    fn error(&mut self, offset: usize, msg: impl Into<String>) {
        self.errors.push((self.file.file_set_pos(offset), msg.into()));
        self.error_count += 1;
    }

    fn text(&self, from: usize) -> String {
        String::from_utf8_lossy(&self.src[from..self.offset]).into_owned()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.ch {
            let skip = match ch {
                ' ' | '\t' | '\r' => true,
                '\n' => !self.insert_semi,
                _ => false,
            };
            if !skip {
                break;
            }
            self.next();
        }
    }

    fn scan_token(&mut self) -> Option<Lexeme> {
        self.skip_whitespace();

        let pos = self.file.file_set_pos(self.offset);
        let mut insert_semi = false;
        let mut literal = String::new();

        let token = match self.ch {
            Some(ch) if is_letter(ch) => {
                literal = self.scan_identifier();
                let token = Token::lookup(&literal);
                insert_semi = matches!(
                    token,
                    Token::Ident
                        | Token::Break
                        | Token::Continue
                        | Token::Return
                        | Token::Export
                        | Token::True
                        | Token::False
                        | Token::Undefined
                );
                token
            }
            Some(ch) if ch.is_ascii_digit() => {
                insert_semi = true;
                let (token, lit) = self.scan_number(false);
                literal = lit;
                token
            }
            current => {
                // always make progress
                self.next();
                match current {
                    None => {
                        if self.insert_semi {
                            self.insert_semi = false;
                            return Some(Lexeme::soft_semicolon(pos));
                        }
                        Token::Eof
                    }
                    Some('\n') => {
                        // only reachable while a semicolon is pending
                        self.insert_semi = false;
                        return Some(Lexeme::soft_semicolon(pos));
                    }
                    Some('"') => {
                        insert_semi = true;
                        literal = self.scan_string();
                        Token::String
                    }
                    Some('\'') => {
                        insert_semi = true;
                        literal = self.scan_rune();
                        Token::Char
                    }
                    Some('`') => {
                        insert_semi = true;
                        literal = self.scan_raw_string();
                        Token::String
                    }
                    Some(':') => self.switch2(Token::Colon, Token::Define),
                    Some('.') => {
                        if self.ch.map_or(false, |c| c.is_ascii_digit()) {
                            insert_semi = true;
                            let (token, lit) = self.scan_number(true);
                            literal = lit;
                            token
                        } else if self.ch == Some('.') && self.peek() == b'.' {
                            self.next();
                            self.next();
                            Token::Ellipsis
                        } else {
                            Token::Period
                        }
                    }
                    Some(',') => Token::Comma,
                    Some('?') => Token::Question,
                    Some(';') => {
                        literal = ";".to_string();
                        Token::Semicolon
                    }
                    Some('(') => Token::LParen,
                    Some(')') => {
                        insert_semi = true;
                        Token::RParen
                    }
                    Some('[') => Token::LBrack,
                    Some(']') => {
                        insert_semi = true;
                        Token::RBrack
                    }
                    Some('{') => Token::LBrace,
                    Some('}') => {
                        insert_semi = true;
                        Token::RBrace
                    }
                    Some('+') => {
                        let token = self.switch3(Token::Add, Token::AddAssign, '+', Token::Inc);
                        insert_semi = token == Token::Inc;
                        token
                    }
                    Some('-') => {
                        let token = self.switch3(Token::Sub, Token::SubAssign, '-', Token::Dec);
                        insert_semi = token == Token::Dec;
                        token
                    }
                    Some('*') => self.switch2(Token::Mul, Token::MulAssign),
                    Some('/') => {
                        if self.ch == Some('/') || self.ch == Some('*') {
                            if self.insert_semi && self.find_line_end() {
                                // rewind to the comment; it is scanned on the next call
                                self.ch = Some('/');
                                self.offset = self.file.offset(pos);
                                self.read_offset = self.offset + 1;
                                self.insert_semi = false;
                                return Some(Lexeme::soft_semicolon(pos));
                            }
                            let comment = self.scan_comment();
                            if !self.mode.scan_comments {
                                self.insert_semi = false;
                                return None;
                            }
                            literal = comment;
                            Token::Comment
                        } else {
                            self.switch2(Token::Quo, Token::QuoAssign)
                        }
                    }
                    Some('%') => self.switch2(Token::Rem, Token::RemAssign),
                    Some('^') => self.switch2(Token::Xor, Token::XorAssign),
                    Some('<') => self.switch4(Token::Less, Token::LessEq, '<', Token::Shl, Token::ShlAssign),
                    Some('>') => self.switch4(
                        Token::Greater,
                        Token::GreaterEq,
                        '>',
                        Token::Shr,
                        Token::ShrAssign,
                    ),
                    Some('=') => self.switch2(Token::Assign, Token::Equal),
                    Some('!') => self.switch2(Token::Not, Token::NotEqual),
                    Some('&') => {
                        if self.ch == Some('^') {
                            self.next();
                            self.switch2(Token::AndNot, Token::AndNotAssign)
                        } else {
                            self.switch3(Token::And, Token::AndAssign, '&', Token::LAnd)
                        }
                    }
                    Some('|') => self.switch3(Token::Or, Token::OrAssign, '|', Token::LOr),
                    Some(ch) => {
                        // misplaced BOMs were already reported by next()
                        if ch != BOM {
                            let offset = self.file.offset(pos);
                            self.error(
                                offset,
                                format!("illegal character U+{:04X} '{}'", ch as u32, ch),
                            );
                        }
                        insert_semi = self.insert_semi;
                        literal = ch.to_string();
                        Token::Illegal
                    }
                }
            }
        };

        if self.mode.insert_semis {
            self.insert_semi = insert_semi;
        }
        Some(Lexeme::new(token, literal, pos))
    }

    fn scan_comment(&mut self) -> String {
        // initial '/' already consumed; ch is '/' or '*'
        let offs = self.offset - 1;
        let mut num_cr = 0;

        if self.ch == Some('/') {
            // the final '\n' is not part of the comment
            self.next();
            while let Some(ch) = self.ch {
                if ch == '\n' {
                    break;
                }
                if ch == '\r' {
                    num_cr += 1;
                }
                self.next();
            }
        } else {
            self.next();
            let mut terminated = false;
            while let Some(ch) = self.ch {
                if ch == '\r' {
                    num_cr += 1;
                }
                self.next();
                if ch == '*' && self.ch == Some('/') {
                    self.next();
                    terminated = true;
                    break;
                }
            }
            if !terminated {
                self.error(offs, "comment not terminated");
            }
        }

        let mut lit = self.src[offs..self.offset].to_vec();
        if num_cr > 0 && lit.len() >= 2 && lit[1] == b'/' && lit.last() == Some(&b'\r') {
            lit.pop();
            num_cr -= 1;
        }
        if num_cr > 0 {
            let is_block = lit.get(1) == Some(&b'*');
            lit = strip_cr(&lit, is_block);
        }
        String::from_utf8_lossy(&lit).into_owned()
    }

    /// Reports whether the comment(s) starting at the current '/' run to the
    /// end of the line. Scanner state is restored before returning.
    fn find_line_end(&mut self) -> bool {
        let offs = self.offset - 1;
        let found = self.find_line_end_from_here();

        self.ch = Some('/');
        self.offset = offs;
        self.read_offset = offs + 1;
        self.next();
        found
    }

    fn find_line_end_from_here(&mut self) -> bool {
        while self.ch == Some('/') || self.ch == Some('*') {
            if self.ch == Some('/') {
                // line comments always contain a newline
                return true;
            }
            self.next();
            while let Some(ch) = self.ch {
                if ch == '\n' {
                    return true;
                }
                self.next();
                if ch == '*' && self.ch == Some('/') {
                    self.next();
                    break;
                }
            }
            self.skip_whitespace();
            match self.ch {
                None | Some('\n') => return true,
                Some('/') => self.next(),
                Some(_) => return false,
            }
        }
        false
    }

    fn scan_identifier(&mut self) -> String {
        let offs = self.offset;
        while self.ch.map_or(false, |c| is_letter(c) || is_digit(c)) {
            self.next();
        }
        self.text(offs)
    }

    fn scan_mantissa(&mut self, base: u32) {
        while self.ch.map_or(false, |c| digit_val(c) < base) {
            self.next();
        }
    }

    fn scan_number(&mut self, seen_decimal_point: bool) -> (Token, String) {
        let mut offs = self.offset;
        let mut token = Token::Int;

        if seen_decimal_point {
            offs -= 1;
            token = Token::Float;
            self.scan_mantissa(10);
            self.scan_exponent(offs, &mut token);
            return (token, self.text(offs));
        }

        if self.ch == Some('0') {
            self.next();
            if matches!(self.ch, Some('x') | Some('X')) {
                self.next();
                self.scan_mantissa(16);
                if self.offset - offs <= 2 {
                    self.error(offs, "illegal hexadecimal number");
                }
                return (token, self.text(offs));
            }

            // octal int or float
            let mut seen_decimal_digit = false;
            self.scan_mantissa(8);
            if matches!(self.ch, Some('8') | Some('9')) {
                seen_decimal_digit = true;
                self.scan_mantissa(10);
            }
            if !matches!(self.ch, Some('.') | Some('e') | Some('E')) {
                if seen_decimal_digit {
                    self.error(offs, "illegal octal number");
                }
                return (token, self.text(offs));
            }
        } else {
            self.scan_mantissa(10);
        }

        if self.ch == Some('.') {
            token = Token::Float;
            self.next();
            self.scan_mantissa(10);
        }
        self.scan_exponent(offs, &mut token);
        (token, self.text(offs))
    }

    fn scan_exponent(&mut self, offs: usize, token: &mut Token) {
        if matches!(self.ch, Some('e') | Some('E')) {
            *token = Token::Float;
            self.next();
            if matches!(self.ch, Some('-') | Some('+')) {
                self.next();
            }
            if self.ch.map_or(false, |c| digit_val(c) < 10) {
                self.scan_mantissa(10);
            } else {
                self.error(offs, "illegal floating-point exponent");
            }
        }
    }

    fn scan_escape(&mut self, quote: char) -> bool {
        let offs = self.offset;

        let (mut n, base, max): (u32, u32, u32) = match self.ch {
            Some(c) if matches!(c, 'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\') || c == quote => {
                self.next();
                return true;
            }
            Some('0'..='7') => (3, 8, 255),
            Some('x') => {
                self.next();
                (2, 16, 255)
            }
            Some('u') => {
                self.next();
                (4, 16, char::MAX as u32)
            }
            Some('U') => {
                self.next();
                (8, 16, char::MAX as u32)
            }
            Some(_) => {
                self.error(offs, "unknown escape sequence");
                return false;
            }
            None => {
                self.error(offs, "escape sequence not terminated");
                return false;
            }
        };

        let mut x: u32 = 0;
        while n > 0 {
            let d = self.ch.map_or(16, digit_val);
            if d >= base {
                let msg = match self.ch {
                    Some(c) => format!(
                        "illegal character U+{:04X} '{}' in escape sequence",
                        c as u32, c
                    ),
                    None => "escape sequence not terminated".to_string(),
                };
                self.error(self.offset, msg);
                return false;
            }
            x = x.wrapping_mul(base).wrapping_add(d);
            self.next();
            n -= 1;
        }

        if x > max || (0xD800..0xE000).contains(&x) {
            self.error(offs, "escape sequence is invalid Unicode code point");
            return false;
        }
        true
    }

    fn scan_rune(&mut self) -> String {
        // opening quote already consumed
        let offs = self.offset - 1;
        let mut valid = true;
        let mut n = 0;

        loop {
            let ch = match self.ch {
                None | Some('\n') => {
                    if valid {
                        self.error(offs, "rune literal not terminated");
                        valid = false;
                    }
                    break;
                }
                Some(ch) => ch,
            };
            self.next();
            if ch == '\'' {
                break;
            }
            n += 1;
            if ch == '\\' && !self.scan_escape('\'') {
                valid = false;
            }
        }

        if valid && n != 1 {
            self.error(offs, "illegal rune literal");
        }
        self.text(offs)
    }

    fn scan_string(&mut self) -> String {
        // opening quote already consumed
        let offs = self.offset - 1;

        loop {
            let ch = match self.ch {
                None | Some('\n') => {
                    self.error(offs, "string literal not terminated");
                    break;
                }
                Some(ch) => ch,
            };
            self.next();
            if ch == '"' {
                break;
            }
            if ch == '\\' {
                self.scan_escape('"');
            }
        }
        self.text(offs)
    }

    fn scan_raw_string(&mut self) -> String {
        // opening backtick already consumed
        let offs = self.offset - 1;
        let mut has_cr = false;

        loop {
            let ch = match self.ch {
                None => {
                    self.error(offs, "raw string literal not terminated");
                    break;
                }
                Some(ch) => ch,
            };
            self.next();
            if ch == '`' {
                break;
            }
            if ch == '\r' {
                has_cr = true;
            }
        }

        let lit = &self.src[offs..self.offset];
        if has_cr {
            String::from_utf8_lossy(&strip_cr(lit, false)).into_owned()
        } else {
            String::from_utf8_lossy(lit).into_owned()
        }
    }

    fn switch2(&mut self, tok0: Token, tok1: Token) -> Token {
        if self.ch == Some('=') {
            self.next();
            return tok1;
        }
        tok0
    }

    fn switch3(&mut self, tok0: Token, tok1: Token, ch2: char, tok2: Token) -> Token {
        if self.ch == Some('=') {
            self.next();
            return tok1;
        }
        if self.ch == Some(ch2) {
            self.next();
            return tok2;
        }
        tok0
    }

    fn switch4(&mut self, tok0: Token, tok1: Token, ch2: char, tok2: Token, tok3: Token) -> Token {
        if self.ch == Some('=') {
            self.next();
            return tok1;
        }
        if self.ch == Some(ch2) {
            self.next();
            if self.ch == Some('=') {
                self.next();
                return tok3;
            }
            return tok2;
        }
        tok0
    }
}

impl TokenSource for Scanner<'_> {
    fn scan(&mut self) -> Lexeme {
        loop {
            // `None` means a comment was skipped
            if let Some(lexeme) = self.scan_token() {
                return lexeme;
            }
        }
    }

    fn take_errors(&mut self) -> Vec<(Pos, String)> {
        std::mem::take(&mut self.errors)
    }
}

/// Removes carriage returns. Inside a block comment a `\r` sitting between
/// `*` and `/` is kept so the comment does not close early.
pub fn strip_cr(b: &[u8], comment: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(b.len());
    for (j, &ch) in b.iter().enumerate() {
        let keep = ch != b'\r'
            || (comment
                && out.len() > 2
                && out.last() == Some(&b'*')
                && b.get(j + 1) == Some(&b'/'));
        if keep {
            out.push(ch);
        }
    }
    out
}

fn decode_rune(bytes: &[u8]) -> Option<(char, usize)> {
    let width = match bytes.first()? {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    let s = std::str::from_utf8(bytes.get(..width)?).ok()?;
    s.chars().next().map(|c| (c, width))
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || (!ch.is_ascii() && ch.is_alphabetic())
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit() || (!ch.is_ascii() && ch.is_numeric())
}

fn digit_val(ch: char) -> u32 {
    ch.to_digit(16).unwrap_or(16)
}
