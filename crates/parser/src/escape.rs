//! Go string and rune literal escapes.

use std::fmt::Write as _;
use std::str::Chars;

use crate::error::LexErrorKind;

/// Validates the escape following a backslash already consumed from `chars`.
/// `quote` is the delimiter of the enclosing literal.
pub(crate) fn check_escape(chars: &mut Chars<'_>, quote: char) -> Result<(), LexErrorKind> {
    decode_escape(chars, quote).map(|_| ())
}

enum Escaped {
    Char(char),
    Byte(u8),
}

fn decode_escape(chars: &mut Chars<'_>, quote: char) -> Result<Escaped, LexErrorKind> {
    let c = chars.next().ok_or(LexErrorKind::InvalidEscape)?;
    let simple = match c {
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{b}'),
        '\\' => Some('\\'),
        c if c == quote => Some(c),
        _ => None,
    };
    if let Some(s) = simple {
        return Ok(Escaped::Char(s));
    }
    let (digits, radix, first) = match c {
        '0'..='7' => (2, 8, c.to_digit(8)),
        'x' => (2, 16, None),
        'u' => (4, 16, None),
        'U' => (8, 16, None),
        _ => return Err(LexErrorKind::InvalidEscape),
    };
    let mut value = first.unwrap_or(0);
    for _ in 0..digits {
        let d = chars
            .next()
            .and_then(|d| d.to_digit(radix))
            .ok_or(LexErrorKind::InvalidEscape)?;
        value = value * radix + d;
    }
    match c {
        '0'..='7' | 'x' => u8::try_from(value)
            .map(Escaped::Byte)
            .map_err(|_| LexErrorKind::InvalidEscape),
        _ => char::from_u32(value)
            .map(Escaped::Char)
            .ok_or(LexErrorKind::InvalidEscape),
    }
}

/// Interprets a string, raw string or rune literal as it appears in source.
///
/// Byte escapes that do not form valid UTF-8 are replaced with U+FFFD.
pub fn unquote(lit: &str) -> Option<String> {
    let quote = lit.chars().next()?;
    if lit.len() < 2 || !lit.ends_with(quote) {
        return None;
    }
    let body = &lit[1..lit.len() - 1];
    match quote {
        '`' => Some(body.chars().filter(|&c| c != '\r').collect()),
        '"' | '\'' => {
            let mut bytes = Vec::with_capacity(body.len());
            let mut chars = body.chars();
            let mut count = 0usize;
            while let Some(c) = chars.next() {
                count += 1;
                match c {
                    '\\' => match decode_escape(&mut chars, quote).ok()? {
                        Escaped::Char(e) => push_char(&mut bytes, e),
                        Escaped::Byte(b) => bytes.push(b),
                    },
                    '\n' => return None,
                    c if c == quote => return None,
                    c => push_char(&mut bytes, c),
                }
            }
            if quote == '\'' && count != 1 {
                return None;
            }
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => None,
    }
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut tmp = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
}

/// Produces a double-quoted Go literal for `s`.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_forms() {
        assert_eq!(unquote(r#""a\tb""#).as_deref(), Some("a\tb"));
        assert_eq!(unquote(r#""é\x41\101""#).as_deref(), Some("éAA"));
        assert_eq!(unquote("`a\r\\n`").as_deref(), Some("a\\n"));
        assert_eq!(unquote(r"'\''").as_deref(), Some("'"));
        assert_eq!(unquote("'ab'"), None);
        assert_eq!(unquote(r#""\'""#), None);
        assert_eq!(unquote(r#""\400""#), None);
        assert_eq!(unquote(r#""\uD800""#), None);
        assert_eq!(unquote(r#""open"#), None);
    }

    #[test]
    fn quote_then_unquote() {
        for s in ["", "plain", "tab\there", "quote\"back\\slash", "\u{1}\u{7f}é\n"] {
            assert_eq!(unquote(&quote(s)).as_deref(), Some(s), "{s:?}");
        }
    }
}
