//! Go scanner: a `logos` DFA for raw tokens, wrapped by a state machine that
//! performs automatic semicolon insertion.
//!
//! The source is decoded once through [`RuneReader`] into a `String`; raw
//! tokens are then recognized one at a time from the current offset. Offsets
//! into that decoded text are mapped back to file positions, which differ only
//! where a BOM was dropped or an invalid byte was replaced.

use std::io::Read;

use logos::{Lexer as LogosLexer, Logos};
use memchr::memchr;
use tracing::trace;

use crate::error::{ErrorList, LexErrorKind};
use crate::escape::check_escape;
use crate::reader::{Rune, RuneReader};
use crate::source::{File, Pos, Position};
use crate::token::Token;

// =============================================================================
// 1. Raw token DFA
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r]+")]
enum RawTok {
    #[token("\n")]
    Newline,

    #[token("\u{FEFF}")]
    Bom,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")]
    Ident,

    #[regex(r"[0-9]", lex_number)]
    #[regex(r"\.[0-9]", lex_number)]
    Number,

    #[token("\"", lex_string)]
    String,

    #[token("`", lex_raw_string)]
    RawString,

    #[token("'", lex_rune)]
    Char,

    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("&&")]
    #[token("||")]
    #[token("<-")]
    #[token("++")]
    #[token("--")]
    #[token("==")]
    #[token("<")]
    #[token(">")]
    #[token("=")]
    #[token("!")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token(":=")]
    #[token("...")]
    #[token("(")]
    #[token("[")]
    #[token("{")]
    #[token(",")]
    #[token(".")]
    #[token(")")]
    #[token("]")]
    #[token("}")]
    #[token(";")]
    #[token(":")]
    #[token("~")]
    Operator,

    #[regex(r".", priority = 0)]
    Illegal,
}

fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;
    while let Some(star) = memchr(b'*', &rem[search_start..]) {
        let at = search_start + star;
        if rem.get(at + 1) == Some(&b'/') {
            lex.bump(at + 2);
            return Ok(());
        }
        search_start = at + 1;
    }
    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

/// Greedy number body after the first digit (or `.digit`); validated later by
/// [`classify_number`].
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) {
    let head = lex.slice().as_bytes();
    let rem = lex.remainder().as_bytes();
    let hex = head == b"0" && rem.first().is_some_and(|&c| c | 0x20 == b'x');
    let mut prev = head[head.len() - 1];
    let mut n = 0;
    while let Some(&c) = rem.get(n) {
        let take = match c {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' => true,
            b'.' => rem.get(n + 1) != Some(&b'.'),
            b'+' | b'-' => {
                let p = prev | 0x20;
                if hex { p == b'p' } else { p == b'e' }
            }
            _ => false,
        };
        if !take {
            break;
        }
        prev = c;
        n += 1;
    }
    lex.bump(n);
}

fn lex_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let (len, result) = scan_quoted(lex.remainder(), '"');
    lex.bump(len);
    result.map(|_| ())
}

fn lex_raw_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    match memchr(b'`', rem) {
        Some(at) => {
            lex.bump(at + 1);
            Ok(())
        }
        None => {
            lex.bump(rem.len());
            Err(LexErrorKind::UnterminatedString)
        }
    }
}

fn lex_rune(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let (len, result) = scan_quoted(lex.remainder(), '\'');
    lex.bump(len);
    match result {
        Ok(1) => Ok(()),
        Ok(_) => Err(LexErrorKind::InvalidRune),
        Err(LexErrorKind::UnterminatedString) => Err(LexErrorKind::UnterminatedRune),
        Err(kind) => Err(kind),
    }
}

/// Scans the body of a quoted literal up to and including the closing
/// `quote`. Returns the bytes consumed and the number of characters in the
/// body; a newline or end of input ends the literal unterminated.
fn scan_quoted(rem: &str, quote: char) -> (usize, Result<usize, LexErrorKind>) {
    let mut chars = rem.chars();
    let mut count = 0usize;
    let mut bad_escape = false;
    loop {
        let at = rem.len() - chars.as_str().len();
        match chars.next() {
            None => return (rem.len(), Err(LexErrorKind::UnterminatedString)),
            Some('\n') => return (at, Err(LexErrorKind::UnterminatedString)),
            Some(c) if c == quote => {
                let result = if bad_escape {
                    Err(LexErrorKind::InvalidEscape)
                } else {
                    Ok(count)
                };
                return (at + 1, result);
            }
            Some('\\') => {
                count += 1;
                let mut probe = chars.clone();
                if check_escape(&mut probe, quote).is_ok() {
                    chars = probe;
                } else {
                    bad_escape = true;
                    // Skip the escaped character, never the line end.
                    if chars.clone().next().is_some_and(|c| c != '\n') {
                        chars.next();
                    }
                }
            }
            Some(_) => count += 1,
        }
    }
}

// =============================================================================
// 2. Number literal validation
// =============================================================================

/// Validates a complete number literal (without any `i` suffix).
pub(crate) fn classify_number(lit: &str) -> Result<Token, LexErrorKind> {
    const BAD: LexErrorKind = LexErrorKind::InvalidNumber;
    let b = lit.as_bytes();
    let (base, prefixed) = match b {
        [b'0', p, ..] if p | 0x20 == b'x' => (16, true),
        [b'0', p, ..] if p | 0x20 == b'o' => (8, true),
        [b'0', p, ..] if p | 0x20 == b'b' => (2, true),
        _ => (10, false),
    };
    let body = if prefixed { &b[2..] } else { b };

    let exp_at = body.iter().position(|&c| {
        let l = c | 0x20;
        if base == 16 {
            l == b'p'
        } else {
            l == b'e' || l == b'p'
        }
    });
    let (mantissa, exponent) = match exp_at {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    if let Some(at) = exp_at {
        let marker = body[at] | 0x20;
        let ok = match base {
            16 => marker == b'p',
            10 => marker == b'e',
            _ => false,
        };
        if !ok {
            return Err(BAD);
        }
    }

    let (int_part, frac_part) = match mantissa.iter().position(|&c| c == b'.') {
        Some(i) => (&mantissa[..i], Some(&mantissa[i + 1..])),
        None => (mantissa, None),
    };
    let is_float = frac_part.is_some() || exponent.is_some();
    if is_float && (base == 2 || base == 8) {
        return Err(BAD);
    }
    if base == 16 && frac_part.is_some() && exponent.is_none() {
        return Err(BAD);
    }

    let digit_ok = |c: u8| -> bool {
        match base {
            2 => matches!(c, b'0' | b'1'),
            8 => matches!(c, b'0'..=b'7'),
            10 => c.is_ascii_digit(),
            _ => c.is_ascii_hexdigit(),
        }
    };
    check_digits(int_part, digit_ok, prefixed)?;
    if let Some(frac) = frac_part {
        if frac.contains(&b'.') {
            return Err(BAD);
        }
        check_digits(frac, digit_ok, false)?;
    }
    let has_digits = int_part.iter().chain(frac_part.unwrap_or(&[])).any(|c| *c != b'_');
    if !has_digits {
        return Err(BAD);
    }

    // Legacy octal: `0755`, but `09.5` is a valid float.
    if !prefixed && !is_float && int_part.len() > 1 && int_part[0] == b'0' {
        check_digits(&int_part[1..], |c| matches!(c, b'0'..=b'7'), true)?;
    }

    if let Some(exp) = exponent {
        let digits = match exp {
            [b'+' | b'-', rest @ ..] => rest,
            rest => rest,
        };
        if digits.is_empty() {
            return Err(BAD);
        }
        check_digits(digits, |c| c.is_ascii_digit(), false)?;
    }

    Ok(if is_float { Token::Float } else { Token::Int })
}

/// Every byte is a digit or a `_` placed between digits. With
/// `leading_sep`, a `_` may also open the run (right after a base prefix).
fn check_digits(digits: &[u8], ok: impl Fn(u8) -> bool, leading_sep: bool) -> Result<(), LexErrorKind> {
    let mut prev_digit = leading_sep;
    for (i, &c) in digits.iter().enumerate() {
        if c == b'_' {
            let next_digit = digits.get(i + 1).is_some_and(|&n| ok(n));
            if !prev_digit || !next_digit {
                return Err(LexErrorKind::InvalidNumber);
            }
            prev_digit = false;
        } else if ok(c) {
            prev_digit = true;
        } else {
            return Err(LexErrorKind::InvalidNumber);
        }
    }
    Ok(())
}

// =============================================================================
// 3. Decoded-text offsets back to file offsets
// =============================================================================

#[derive(Debug, Default)]
struct OffsetMap {
    /// `(text offset, file offset)` anchors, ascending.
    anchors: Vec<(usize, usize)>,
}

impl OffsetMap {
    fn to_file(&self, text_off: usize) -> usize {
        let idx = self.anchors.partition_point(|&(t, _)| t <= text_off);
        match idx.checked_sub(1).map(|i| self.anchors[i]) {
            Some((t, f)) => f + (text_off - t),
            None => text_off,
        }
    }

    fn anchor(&mut self, text_off: usize, file_off: usize) {
        if self.to_file(text_off) != file_off {
            self.anchors.push((text_off, file_off));
        }
    }
}

// =============================================================================
// 4. Scanner: semicolon insertion state machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Normal,
    /// A multi-line comment was seen where a newline would insert a
    /// semicolon; emit the SEMICOLON before the comment.
    InsertSemi,
    /// The comment is cached and returned by the next `scan`.
    Cached,
}

#[derive(Debug, Default)]
struct Item {
    tok: Token,
    lit: String,
    pos: Pos,
    end: Pos,
}

#[derive(Debug, Default)]
pub struct Scanner {
    reader: RuneReader,
    text: String,
    offsets: OffsetMap,
    /// Text offsets of U+FFFD runes that replaced invalid bytes.
    replaced: Vec<usize>,
    cursor: usize,
    status: Status,
    pending: Item,
    last: Token,
    pos: Pos,
    end: Pos,
}

impl Scanner {
    pub fn new(file: File, src: impl Read) -> Self {
        let mut s = Self::default();
        s.init(file, src);
        s
    }

    pub fn init(&mut self, file: File, src: impl Read) {
        self.reader.init(file, src);
        self.decode();
    }

    /// Decodes the bound file into `text` and resets the token state.
    fn decode(&mut self) {
        self.text.clear();
        self.offsets = OffsetMap::default();
        self.replaced.clear();
        self.cursor = 0;
        self.status = Status::Normal;
        self.pending = Item::default();
        self.last = Token::Illegal;
        self.pos = Pos::NONE;
        self.end = Pos::NONE;

        let _bof = self.reader.next();
        match self.reader.next() {
            Rune::Char(Rune::BOM) => {}
            other => self.reader.unread(other),
        }
        loop {
            match self.reader.next() {
                Rune::Char(c) => {
                    self.offsets.anchor(self.text.len(), self.reader.offset());
                    self.text.push(c);
                }
                Rune::Invalid => {
                    self.offsets.anchor(self.text.len(), self.reader.offset());
                    self.replaced.push(self.text.len());
                    self.text.push(Rune::PLACEHOLDER);
                    self.offsets.anchor(self.text.len(), self.reader.end_offset());
                }
                Rune::Bof => {}
                Rune::Eof | Rune::TooManyErrors => break,
            }
        }
        trace!(
            file = self.reader.file().name(),
            chars = self.text.len(),
            "scanner initialized"
        );
    }

    /// Sets the lexical error budget. The bound file is decoded again under
    /// the new budget and scanning restarts at its first token.
    pub fn set_max_errors(&mut self, n: usize) {
        self.reader.set_max_errors(n);
        self.reader.rewind();
        self.decode();
    }

    pub fn file(&self) -> &File {
        self.reader.file()
    }

    pub fn position(&self, pos: Pos) -> Position {
        self.reader.file().position(pos)
    }

    pub fn errors(&self) -> &ErrorList {
        self.reader.errors()
    }

    pub fn clear_errors(&mut self) {
        self.reader.clear_errors();
    }

    pub fn error(&mut self, pos: Pos, msg: impl Into<String>) {
        self.reader.error_msg(pos, msg);
    }

    pub(crate) fn report(&mut self, err: crate::error::Error) {
        self.reader.report(err);
    }

    pub(crate) fn into_parts(mut self) -> (File, ErrorList) {
        let errors = self.reader.take_errors();
        (self.reader.into_file(), errors)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Start and end of the token last returned by [`scan`](Self::scan).
    pub fn pos_end(&self) -> (Pos, Pos) {
        (self.pos, self.end)
    }

    fn file_pos(&self, text_off: usize) -> Pos {
        self.reader.file().pos(self.offsets.to_file(text_off))
    }

    fn lex_error(&mut self, text_off: usize, kind: LexErrorKind) {
        let pos = self.file_pos(text_off);
        self.reader.error(pos, kind);
    }

    fn need_insert_semi(&self) -> bool {
        self.status == Status::Normal && self.last.ends_statement()
    }

    /// Next raw token: `(result, start, end)` in text offsets, `None` at EOF.
    fn next_raw(&mut self) -> Option<(Result<RawTok, LexErrorKind>, usize, usize)> {
        let rest = &self.text[self.cursor..];
        let mut lex = RawTok::lexer(rest);
        let raw = lex.next()?;
        let span = lex.span();
        let start = self.cursor + span.start;
        let end = self.cursor + span.end;
        self.cursor = end;
        Some((raw, start, end))
    }

    /// Returns the next token and its literal text. Operators and keywords
    /// have an empty literal.
    pub fn scan(&mut self) -> (Token, String) {
        if self.status == Status::Cached {
            self.status = Status::Normal;
            let item = std::mem::take(&mut self.pending);
            self.pos = item.pos;
            self.end = item.end;
            return (item.tok, item.lit);
        }

        let (tok, lit, start, end) = loop {
            let Some((raw, start, end)) = self.next_raw() else {
                let eof = self.file_pos(self.text.len());
                self.pos = eof;
                self.end = eof;
                return (Token::Eof, String::new());
            };
            let slice = &self.text[start..end];
            let mut err = None;
            let tok = match raw {
                Ok(RawTok::Newline) => {
                    if self.need_insert_semi() {
                        self.last = Token::Semicolon;
                        self.pos = self.file_pos(start);
                        self.end = self.pos;
                        return (Token::Semicolon, String::new());
                    }
                    continue;
                }
                Ok(RawTok::Bom) => {
                    err = Some(LexErrorKind::InvalidBom);
                    Token::Illegal
                }
                Ok(RawTok::LineComment) => Token::Comment,
                Ok(RawTok::BlockComment) => {
                    if self.need_insert_semi() {
                        if let Some(nl) = memchr(b'\n', slice.as_bytes()) {
                            self.status = Status::InsertSemi;
                            self.pos = self.file_pos(start + nl);
                        }
                    }
                    Token::Comment
                }
                Ok(RawTok::Ident) => Token::lookup(slice),
                Ok(RawTok::Number) => number_token(slice).unwrap_or_else(|kind| {
                    err = Some(kind);
                    Token::Illegal
                }),
                Ok(RawTok::String | RawTok::RawString) => Token::String,
                Ok(RawTok::Char) => Token::Char,
                Ok(RawTok::Operator) => Token::lookup_operator(slice).unwrap_or(Token::Illegal),
                Ok(RawTok::Illegal) => {
                    if self.replaced.binary_search(&start).is_err() {
                        err = Some(LexErrorKind::InvalidCharacter);
                    }
                    Token::Illegal
                }
                Err(kind) => {
                    err = Some(kind);
                    recovered_token(kind, slice)
                }
            };
            let lit = if tok.is_operator() || tok.is_keyword() {
                String::new()
            } else {
                slice.to_owned()
            };
            if let Some(kind) = err {
                self.lex_error(start, kind);
            }
            break (tok, lit, start, end);
        };

        let pos = self.file_pos(start);
        let end = self.file_pos(end);
        if self.status == Status::InsertSemi {
            self.status = Status::Cached;
            self.pending = Item { tok, lit, pos, end };
            self.last = Token::Semicolon;
            self.end = self.pos;
            return (Token::Semicolon, String::new());
        }
        if tok != Token::Comment {
            self.last = tok;
        }
        self.pos = pos;
        self.end = end;
        (tok, lit)
    }
}

/// Kind of a number literal, honoring the imaginary `i` suffix.
fn number_token(slice: &str) -> Result<Token, LexErrorKind> {
    let (digits, imag) = match slice.strip_suffix('i') {
        Some(d) => (d, true),
        None => (slice, false),
    };
    match classify_number(digits) {
        Ok(_) if imag => Ok(Token::Imag),
        Ok(tok) => Ok(tok),
        // `0789i` stays valid for backwards compatibility.
        Err(_) if imag && digits.bytes().all(|c| c.is_ascii_digit() || c == b'_') => Ok(Token::Imag),
        Err(kind) => Err(kind),
    }
}

/// Token kind reported for a malformed raw token, so the parser still sees a
/// literal where one was written.
fn recovered_token(kind: LexErrorKind, slice: &str) -> Token {
    match (kind, slice.as_bytes().first()) {
        (LexErrorKind::UnterminatedComment, _) => Token::Comment,
        (_, Some(b'"' | b'`')) => Token::String,
        (_, Some(b'\'')) => Token::Char,
        _ => Token::Illegal,
    }
}
