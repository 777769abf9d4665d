use std::fmt;
use std::ops::Deref;

use thiserror::Error;

use crate::source::{File, Pos, Position};
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagKind {
    Lex,
    Syntax,
    /// Reported after parsing, by name and type resolution.
    Resolve,
}

/// One diagnostic, anchored at a position inside a [`File`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{position}: {msg}")]
pub struct Error {
    pub kind: DiagKind,
    pub pos: Pos,
    pub position: Position,
    pub msg: String,
}

impl Error {
    pub fn new(kind: DiagKind, file: &File, pos: Pos, msg: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            position: file.position(pos),
            msg: msg.into(),
        }
    }
}

/// Append-only diagnostics shared by the reader, the scanner and the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<Error>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: Error) {
        self.0.push(err);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn into_vec(self) -> Vec<Error> {
        self.0
    }
}

impl Deref for ErrorList {
    type Target = [Error];

    fn deref(&self) -> &[Error] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid character")]
    InvalidCharacter,
    #[error("invalid UTF-8 encoding")]
    InvalidUtf8,
    #[error("invalid BOM in the middle of the file")]
    InvalidBom,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("string literal not terminated")]
    UnterminatedString,
    #[error("rune literal not terminated")]
    UnterminatedRune,
    #[error("invalid rune literal")]
    InvalidRune,
    #[error("comment not terminated")]
    UnterminatedComment,
    #[error("too many errors")]
    TooManyErrors,
}

impl Default for LexErrorKind {
    #[inline]
    fn default() -> Self {
        LexErrorKind::InvalidCharacter
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("expecting '{0}'")]
    Expecting(Token),
    #[error("expecting identifier")]
    ExpectingIdent,
    #[error("expecting declaration")]
    ExpectingDecl,
    #[error("expecting expression")]
    ExpectingExpr,
    #[error("expecting statement")]
    ExpectingStmt,
    #[error("expecting type")]
    ExpectingType,
    #[error("expecting string literal")]
    ExpectingString,
    #[error("missing condition")]
    MissingCondition,
    #[error("unexpected '{0}'")]
    Unexpected(Token),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AstError {
    #[error("child index {index} out of range for node with {len} children")]
    IndexOutOfRange { index: usize, len: usize },
}
