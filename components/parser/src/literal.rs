//! Decoding of literal token text into values

use thiserror::Error;

/// Failure to decode a literal token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// Integer text that is malformed or does not fit in an `i64`
    #[error("invalid integer literal")]
    Int,
    /// Float text that cannot be parsed
    #[error("invalid float literal")]
    Float,
    /// Char literal that is not exactly one code point
    #[error("illegal char literal")]
    Char,
    /// String literal with a bad escape or missing quotes
    #[error("illegal string literal")]
    String,
}

/// Decodes an integer literal: decimal, `0x` hexadecimal or leading-zero octal.
///
/// ```
/// use parser::literal::parse_int;
///
/// assert_eq!(parse_int("42"), Ok(42));
/// assert_eq!(parse_int("0x1f"), Ok(31));
/// assert_eq!(parse_int("017"), Ok(15));
/// ```
pub fn parse_int(lit: &str) -> Result<i64, LiteralError> {
    let (digits, radix) = if let Some(hex) = lit
        .strip_prefix("0x")
        .or_else(|| lit.strip_prefix("0X"))
    {
        (hex, 16)
    } else if lit.len() > 1 && lit.starts_with('0') {
        (&lit[1..], 8)
    } else {
        (lit, 10)
    };
    if digits.is_empty() || digits.starts_with(|c: char| c == '+' || c == '-') {
        return Err(LiteralError::Int);
    }
    i64::from_str_radix(digits, radix).map_err(|_| LiteralError::Int)
}

/// Decodes a floating point literal
pub fn parse_float(lit: &str) -> Result<f64, LiteralError> {
    lit.parse::<f64>().map_err(|_| LiteralError::Float)
}

/// Decodes a single-quoted char literal such as `'a'` or `'\n'`.
pub fn unquote_char(lit: &str) -> Result<char, LiteralError> {
    let inner = lit
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or(LiteralError::Char)?;
    let bytes = unescape(inner, b'\'').map_err(|_| LiteralError::Char)?;
    let s = String::from_utf8(bytes).map_err(|_| LiteralError::Char)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LiteralError::Char),
    }
}

/// Decodes an interpreted (`"..."`) or raw (`` `...` ``) string literal.
///
/// Byte escapes that do not form valid UTF-8 are replaced with U+FFFD.
pub fn unquote_string(lit: &str) -> Result<String, LiteralError> {
    if let Some(raw) = lit.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return Ok(raw.to_string());
    }
    let inner = lit
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or(LiteralError::String)?;
    if !inner.contains('\\') {
        return Ok(inner.to_string());
    }
    let bytes = unescape(inner, b'"').map_err(|_| LiteralError::String)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Quotes `s` as an interpreted string literal that [`unquote_string`] reads back.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if c.is_control() => {
                if (c as u32) < 0x10000 {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                } else {
                    out.push_str(&format!("\\U{:08x}", c as u32));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quotes `c` as a char literal that [`unquote_char`] reads back.
pub fn quote_char(c: char) -> String {
    match c {
        '\'' => "'\\''".to_string(),
        '"' => "'\"'".to_string(),
        c => {
            let s = quote(&c.to_string());
            format!("'{}'", &s[1..s.len() - 1])
        }
    }
}

struct EscapeError;

fn unescape(s: &str, quote: u8) -> Result<Vec<u8>, EscapeError> {
    let src = s.as_bytes();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        if b == quote {
            return Err(EscapeError);
        }
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let esc = *src.get(i + 1).ok_or(EscapeError)?;
        i += 2;
        let simple = match esc {
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b'f' => Some(0x0c),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            b'v' => Some(0x0b),
            b'\\' => Some(b'\\'),
            c if c == quote => Some(c),
            _ => None,
        };
        if let Some(byte) = simple {
            out.push(byte);
            continue;
        }
        match esc {
            b'0'..=b'7' => {
                let digits = src.get(i - 1..i + 2).ok_or(EscapeError)?;
                let v = read_digits(digits, 8)?;
                out.push(u8::try_from(v).map_err(|_| EscapeError)?);
                i += 2;
            }
            b'x' => {
                let digits = src.get(i..i + 2).ok_or(EscapeError)?;
                out.push(read_digits(digits, 16)? as u8);
                i += 2;
            }
            b'u' | b'U' => {
                let n = if esc == b'u' { 4 } else { 8 };
                let digits = src.get(i..i + n).ok_or(EscapeError)?;
                let c = char::from_u32(read_digits(digits, 16)?).ok_or(EscapeError)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                i += n;
            }
            _ => return Err(EscapeError),
        }
    }
    Ok(out)
}

fn read_digits(digits: &[u8], radix: u32) -> Result<u32, EscapeError> {
    digits.iter().try_fold(0u32, |acc, &d| {
        let v = char::from(d).to_digit(radix).ok_or(EscapeError)?;
        Ok(acc * radix + v)
    })
}
