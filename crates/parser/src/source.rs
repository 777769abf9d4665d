//! Byte positions and their line/column form.
//!
//! A [`Pos`] is an absolute byte offset: the owning [`File`]'s `base` plus the
//! offset inside that file. Several files can share one position space by
//! giving each a distinct base.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(u32);

impl Pos {
    /// No position.
    pub const NONE: Pos = Pos(u32::MAX);

    #[inline]
    pub const fn new(offset: usize) -> Self {
        if offset >= u32::MAX as usize {
            Pos(u32::MAX - 1)
        } else {
            Pos(offset as u32)
        }
    }

    #[inline]
    pub const fn offset(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    #[inline]
    pub const fn add(self, n: usize) -> Pos {
        if !self.is_valid() {
            return self;
        }
        Pos::new(self.0 as usize + n)
    }
}

impl Default for Pos {
    fn default() -> Self {
        Pos::NONE
    }
}

/// Human-readable form of a [`Pos`]. `line == 0` marks an invalid position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub filename: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.filename.is_empty(), self.is_valid()) {
            (false, true) => write!(f, "{}:{}:{}", self.filename, self.line, self.column),
            (true, true) => write!(f, "{}:{}", self.line, self.column),
            (false, false) => f.write_str(&self.filename),
            (true, false) => f.write_str("-"),
        }
    }
}

/// Line table of one source file.
///
/// `lines[0]` is always `base`; later entries are the absolute offsets of the
/// first byte of each following line, strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    size: Option<usize>,
    lines: Vec<usize>,
}

impl File {
    pub fn new(name: impl Into<String>, base: usize) -> Self {
        Self {
            name: name.into(),
            size: None,
            lines: vec![base],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> usize {
        self.lines[0]
    }

    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = Some(size);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Absolute offset of the first byte of `line` (1-based).
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.lines.get(i)).copied()
    }

    /// Records that a new line starts at absolute `offset`. Ignored unless it
    /// lies past the last recorded line start.
    pub fn add_line(&mut self, offset: usize) {
        let last = self.lines[self.lines.len() - 1];
        if offset > last {
            self.lines.push(offset);
        }
    }

    /// Forgets every line start after the first.
    pub(crate) fn reset_lines(&mut self) {
        self.lines.truncate(1);
    }

    pub fn pos(&self, offset: usize) -> Pos {
        Pos::new(self.base() + offset)
    }

    pub fn position(&self, pos: Pos) -> Position {
        let mut out = Position {
            filename: self.name.clone(),
            ..Position::default()
        };
        if !pos.is_valid() {
            return out;
        }
        let off = pos.offset();
        out.offset = off;
        let base = self.base();
        if off < base || self.size.is_some_and(|size| off - base > size) {
            return out;
        }
        let idx = self.lines.partition_point(|&start| start <= off) - 1;
        out.line = idx + 1;
        out.column = off - self.lines[idx] + 1;
        out
    }
}
