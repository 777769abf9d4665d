//! UTF-8 rune reader over a byte stream.
//!
//! The reader yields `Bof` once, then one rune per call, then `Eof` forever.
//! Invalid encodings are replaced by a single placeholder rune and reported;
//! once the error budget is spent the reader records a final "too many
//! errors" diagnostic, stops decoding and returns the `TooManyErrors`
//! sentinel.

use std::io::Read;

use tracing::trace;

use crate::error::{DiagKind, Error, ErrorList, LexErrorKind};
use crate::source::{File, Pos};

pub const DEFAULT_MAX_ERRORS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rune {
    Bof,
    Char(char),
    /// Undecodable bytes, stands for U+FFFD.
    Invalid,
    TooManyErrors,
    Eof,
}

impl Rune {
    pub const BOM: char = '\u{FEFF}';
    pub const PLACEHOLDER: char = char::REPLACEMENT_CHARACTER;

    pub fn as_char(self) -> Option<char> {
        match self {
            Rune::Char(c) => Some(c),
            Rune::Invalid => Some(Self::PLACEHOLDER),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Saved {
    rune: Rune,
    offset: usize,
    end: usize,
}

#[derive(Debug)]
pub struct RuneReader {
    file: File,
    buf: Vec<u8>,
    cursor: usize,
    offset: usize,
    end: usize,
    started: bool,
    stopped: bool,
    pushback: Option<Saved>,
    errors: ErrorList,
    /// Length of `errors` when the current file was bound.
    errors_at_init: usize,
    max_errors: usize,
}

impl Default for RuneReader {
    fn default() -> Self {
        Self {
            file: File::new("", 0),
            buf: Vec::new(),
            cursor: 0,
            offset: 0,
            end: 0,
            started: false,
            stopped: false,
            pushback: None,
            errors: ErrorList::new(),
            errors_at_init: 0,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

impl RuneReader {
    pub fn new(file: File, src: impl Read) -> Self {
        let mut r = Self::default();
        r.init(file, src);
        r
    }

    /// Binds a new file and byte stream. Errors already accumulated are kept.
    pub fn init(&mut self, file: File, mut src: impl Read) {
        self.file = file;
        self.buf.clear();
        self.cursor = 0;
        self.offset = 0;
        self.end = 0;
        self.started = false;
        self.stopped = false;
        self.pushback = None;
        if let Err(err) = src.read_to_end(&mut self.buf) {
            let pos = self.file.pos(self.buf.len());
            let msg = format!("read error: {err}");
            self.errors
                .push(Error::new(DiagKind::Lex, &self.file, pos, msg));
        }
        self.file.set_size(self.buf.len());
        self.errors_at_init = self.errors.len();
        trace!(file = self.file.name(), bytes = self.buf.len(), "rune reader bound");
    }

    /// Restarts decoding from the first byte of the current file. Errors
    /// recorded since the file was bound are discarded.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.offset = 0;
        self.end = 0;
        self.started = false;
        self.stopped = false;
        self.pushback = None;
        self.errors.truncate(self.errors_at_init);
        self.file.reset_lines();
    }

    /// Error budget before `TooManyErrors`; `0` means unlimited.
    pub fn set_max_errors(&mut self, n: usize) {
        self.max_errors = n;
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub(crate) fn into_file(self) -> File {
        self.file
    }

    /// Start of the current rune, relative to the file.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// End of the current rune, relative to the file.
    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn errors(&self) -> &ErrorList {
        &self.errors
    }

    pub(crate) fn take_errors(&mut self) -> ErrorList {
        std::mem::take(&mut self.errors)
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Records a lexical error unless the budget is already spent.
    pub fn error(&mut self, pos: Pos, kind: LexErrorKind) {
        self.error_msg(pos, kind.to_string());
    }

    pub fn error_msg(&mut self, pos: Pos, msg: impl Into<String>) {
        let err = Error::new(DiagKind::Lex, &self.file, pos, msg);
        self.report(err);
    }

    /// Appends an already built diagnostic, charging it to the error budget.
    pub fn report(&mut self, err: Error) {
        if self.stopped {
            return;
        }
        let pos = err.pos;
        self.errors.push(err);
        if self.max_errors > 0 && self.errors.len() >= self.max_errors {
            self.stopped = true;
            trace!(count = self.errors.len(), "error budget exhausted");
            let msg = LexErrorKind::TooManyErrors.to_string();
            self.errors.push(Error::new(DiagKind::Lex, &self.file, pos, msg));
        }
    }

    /// Pushes `rune` back; the next call to [`next`](Self::next) returns it
    /// again with its original offsets.
    pub fn unread(&mut self, rune: Rune) {
        self.pushback = Some(Saved {
            rune,
            offset: self.offset,
            end: self.end,
        });
    }

    pub fn next(&mut self) -> Rune {
        if let Some(saved) = self.pushback.take() {
            self.offset = saved.offset;
            self.end = saved.end;
            return saved.rune;
        }
        if !self.started {
            self.started = true;
            return Rune::Bof;
        }
        if self.stopped {
            self.offset = self.cursor;
            self.end = self.cursor;
            return Rune::TooManyErrors;
        }
        let rest = &self.buf[self.cursor..];
        if rest.is_empty() {
            self.offset = self.buf.len();
            self.end = self.buf.len();
            return Rune::Eof;
        }
        self.offset = self.cursor;
        match decode_one(rest) {
            Some((c, width)) => {
                self.cursor += width;
                self.end = self.cursor;
                if c == '\n' {
                    let start = self.file.base() + self.cursor;
                    self.file.add_line(start);
                }
                Rune::Char(c)
            }
            None => {
                self.cursor += 1;
                self.end = self.cursor;
                let pos = self.file.pos(self.offset);
                self.error(pos, LexErrorKind::InvalidUtf8);
                Rune::Invalid
            }
        }
    }
}

/// Decodes the first scalar of `bytes`, rejecting overlongs and surrogates.
fn decode_one(bytes: &[u8]) -> Option<(char, usize)> {
    let b0 = *bytes.first()?;
    if b0 < 0x80 {
        return Some((b0 as char, 1));
    }
    let width = match b0 {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    let chunk = bytes.get(..width)?;
    let c = std::str::from_utf8(chunk).ok()?.chars().next()?;
    Some((c, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_bad_sequences() {
        assert_eq!(decode_one("é".as_bytes()), Some(('é', 2)));
        assert_eq!(decode_one(&[0xC0, 0x80]), None);
        assert_eq!(decode_one(&[0xED, 0xA0, 0x80]), None);
        assert_eq!(decode_one(&[0xE2, 0x82]), None);
        assert_eq!(decode_one(&[]), None);
    }
}
