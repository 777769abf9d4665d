//! Hand-written recursive-descent parser.
//!
//! The parser keeps one token of lookahead (`curr`) plus a one-atom unread
//! slot, and builds nodes bottom-up into an [`Ast`]. It never stops on an
//! error: missing tokens become Bad nodes, unexpected ones are skipped, and
//! every problem is reported to the shared error list.
//!
//! Grammar productions live in the submodules: `decl` (top level), `stmt`,
//! `expr` and `typ`.

mod decl;
mod expr;
mod stmt;
mod typ;

use std::io::Read;

use bitflags::bitflags;
use smallvec::SmallVec;
use tracing::debug;

use crate::ast::{Ast, Atom, Child, NodeId};
use crate::error::{DiagKind, Error, ErrorList, SyntaxErrorKind};
use crate::scanner::Scanner;
use crate::source::{File, Pos, Position};
use crate::token::Token;

bitflags! {
    /// What [`Parser::parse`] accepts and keeps.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u32 {
        /// Return import declarations; without it they are parsed and dropped.
        const IMPORTS = 1 << 0;
        /// Parse top-level declarations and statements.
        const DECLS = 1 << 1;
        /// Attach comments to the nodes that follow them.
        const COMMENTS = 1 << 2;
        const ALL = Self::IMPORTS.bits() | Self::DECLS.bits() | Self::COMMENTS.bits();
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::IMPORTS | Mode::DECLS
    }
}

pub(crate) type Children = SmallVec<[Child; 8]>;

#[derive(Debug, Default)]
pub struct Parser {
    scanner: Scanner,
    ast: Ast,
    mode: Mode,
    curr: Atom,
    unread0: Option<Atom>,
    /// Whether `T{` starts a composite literal here; false in statement
    /// headers so that `if x == T {` opens the block.
    composite_ok: bool,
    /// Tokens consumed so far; loops compare it to guarantee progress.
    consumed: u64,
}

impl Parser {
    pub fn new(file: File, src: impl Read, mode: Mode) -> Self {
        let mut p = Self::default();
        p.init(file, src, mode);
        p
    }

    pub fn from_source(src: &str, mode: Mode) -> Self {
        Self::new(File::new("", 0), src.as_bytes(), mode)
    }

    pub fn init(&mut self, file: File, src: impl Read, mode: Mode) {
        self.scanner.init(file, src);
        self.mode = mode;
        self.restart();
    }

    fn restart(&mut self) {
        self.ast = Ast::new();
        self.curr = Atom::default();
        self.unread0 = None;
        self.composite_ok = true;
        self.consumed = 0;
        self.next();
    }

    pub fn init_str(&mut self, src: &str, mode: Mode) {
        self.init(File::new("", 0), src.as_bytes(), mode);
    }

    /// Sets the lexical error budget and restarts parsing from the
    /// beginning of the input; `0` means unlimited.
    pub fn set_max_errors(&mut self, n: usize) {
        self.scanner.set_max_errors(n);
        self.restart();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The lookahead token.
    pub fn curr_token(&self) -> Token {
        self.curr.tok
    }

    pub fn skip_token(&mut self) {
        self.next();
    }

    pub fn errors(&self) -> &ErrorList {
        self.scanner.errors()
    }

    pub fn clear_errors(&mut self) {
        self.scanner.clear_errors();
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn file(&self) -> &File {
        self.scanner.file()
    }

    pub fn position(&self, pos: Pos) -> Position {
        self.scanner.position(pos)
    }

    pub fn into_parts(self) -> (Ast, File, ErrorList) {
        let (file, errors) = self.scanner.into_parts();
        (self.ast, file, errors)
    }

    /// Parses the next top-level item.
    ///
    /// Returns `None` for an empty statement or a skipped import, and an
    /// `EOF` atom at the end of input. Without `DECLS` only the package
    /// clause and imports are parsed; anything else ends the input.
    pub fn parse(&mut self) -> Option<NodeId> {
        if self.tok() == Token::Semicolon {
            self.next();
        }
        match self.tok() {
            Token::Eof => Some(self.make_eof()),
            Token::Package => Some(self.parse_package()),
            Token::Import if self.mode.contains(Mode::IMPORTS) => Some(self.parse_import()),
            Token::Import if self.mode.contains(Mode::DECLS) => {
                self.parse_import();
                None
            }
            Token::Import => Some(self.make_eof()),
            Token::Semicolon => None,
            _ if !self.mode.contains(Mode::DECLS) => Some(self.make_eof()),
            tok if is_leave(tok) => {
                let pos = self.pos();
                let atom = self.parse_atom(tok);
                let err = self.error(pos, SyntaxErrorKind::ExpectingDecl);
                let outer = Atom::new(tok, pos, self.ast.end(atom), "");
                Some(self.ast.bad(outer, Some(atom), err))
            }
            tok if is_decl(tok) => Some(self.parse_top_level_decl()),
            _ => self.parse_stmt(),
        }
    }

    /// Parses the whole input into `L(FILE, decls)`.
    pub fn parse_file(&mut self) -> NodeId {
        let atom = Atom::new(Token::File, self.curr.pos, self.curr.pos, "");
        let mut decls = Vec::new();
        loop {
            let before = self.consumed;
            match self.parse() {
                Some(n) if self.ast.op(n) == Token::Eof => break,
                Some(n) => {
                    if !is_top_level(&self.ast, n) {
                        self.error(self.ast.pos(n), SyntaxErrorKind::ExpectingDecl);
                    }
                    decls.push(Some(n));
                }
                None => {}
            }
            if self.consumed == before {
                decls.push(Some(self.parse_bad(SyntaxErrorKind::ExpectingDecl)));
            }
        }
        self.ast.list(atom, decls)
    }

    /// Parses one expression (for expression-only callers).
    pub fn parse_expression(&mut self) -> NodeId {
        self.parse_expr()
    }

    // -------------------------------------------------------------------------
    // Token plumbing
    // -------------------------------------------------------------------------

    #[inline]
    pub(crate) fn tok(&self) -> Token {
        self.curr.tok
    }

    #[inline]
    pub(crate) fn pos(&self) -> Pos {
        self.curr.pos
    }

    /// Advances to the next significant token, collecting the comments in
    /// between when `COMMENTS` is set.
    pub(crate) fn next(&mut self) -> Token {
        self.consumed += 1;
        if let Some(atom) = self.unread0.take() {
            self.curr = atom;
            return self.curr.tok;
        }
        self.curr.comments.clear();
        loop {
            let (tok, lit) = self.scanner.scan();
            if tok == Token::Comment {
                if self.mode.contains(Mode::COMMENTS) {
                    self.curr.comments.push(lit);
                }
                continue;
            }
            let (pos, end) = self.scanner.pos_end();
            self.curr.tok = tok;
            self.curr.lit = lit;
            self.curr.pos = pos;
            self.curr.end = end;
            return tok;
        }
    }

    /// Makes `atom` current again; the token it displaced comes next.
    pub(crate) fn unread(&mut self, atom: Atom) {
        let displaced = std::mem::replace(&mut self.curr, atom);
        self.unread0 = Some(displaced);
    }

    pub(crate) fn error(&mut self, pos: Pos, kind: SyntaxErrorKind) -> Error {
        let err = Error::new(DiagKind::Syntax, self.scanner.file(), pos, kind.to_string());
        let same_line = self
            .errors()
            .last()
            .is_some_and(|last| last.position.line == err.position.line);
        if !same_line {
            debug!(%err, "syntax error");
            self.scanner.report(err.clone());
        }
        err
    }

    /// Consumes `tok` or reports it missing.
    pub(crate) fn expect(&mut self, tok: Token) -> bool {
        if self.tok() == tok {
            self.next();
            true
        } else {
            self.error(self.pos(), SyntaxErrorKind::Expecting(tok));
            false
        }
    }

    pub(crate) fn with_composite<T>(&mut self, ok: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.composite_ok, ok);
        let out = f(self);
        self.composite_ok = saved;
        out
    }

    // -------------------------------------------------------------------------
    // Recovery
    // -------------------------------------------------------------------------

    /// Consumes the opening `tok`, or records a Bad child in its place.
    pub(crate) fn enter(&mut self, list: &mut Children, tok: Token) {
        if self.tok() == tok {
            self.next();
        } else {
            list.push(Some(self.make_bad(SyntaxErrorKind::Expecting(tok))));
        }
    }

    /// Skips to the closing `tok`, turning every skipped token into a Bad
    /// child, then consumes it.
    pub(crate) fn leave(&mut self, list: &mut Children, tok: Token) {
        while self.tok() != tok {
            if self.tok() == Token::Eof {
                list.push(Some(self.make_bad(SyntaxErrorKind::Expecting(tok))));
                return;
            }
            list.push(Some(self.parse_bad(SyntaxErrorKind::Expecting(tok))));
        }
        self.next();
    }

    /// Like [`leave`](Self::leave) for a node without a list: the node is
    /// wrapped in Bad once if anything had to be skipped.
    pub(crate) fn leave_node(&mut self, node: NodeId, tok: Token) -> NodeId {
        let mut node = node;
        let mut wrapped = false;
        while self.tok() != tok {
            if !wrapped {
                wrapped = true;
                node = self.make_bad_node(node, SyntaxErrorKind::Expecting(tok));
            }
            if self.tok() == Token::Eof {
                return node;
            }
            self.next();
        }
        self.next();
        node
    }

    // -------------------------------------------------------------------------
    // Node construction
    // -------------------------------------------------------------------------

    /// Snapshot of the current token tagged `tok`. Pending comments move to
    /// the snapshot, so they attach to at most one node.
    pub(crate) fn make_atom(&mut self, tok: Token) -> Atom {
        let lit = if tok == self.curr.tok {
            self.curr.lit.clone()
        } else {
            String::new()
        };
        Atom {
            tok,
            pos: self.curr.pos,
            end: self.curr.end,
            lit,
            comments: std::mem::take(&mut self.curr.comments),
        }
    }

    pub(crate) fn make_unary(&mut self, atom: Atom, x: Child) -> NodeId {
        self.ast.unary(atom, x)
    }

    pub(crate) fn make_binary(&mut self, atom: Atom, x: Child, y: Child) -> NodeId {
        self.ast.binary(atom, x, y)
    }

    pub(crate) fn make_list(&mut self, atom: Atom, children: impl IntoIterator<Item = Child>) -> NodeId {
        self.ast.list(atom, children)
    }

    pub(crate) fn make_eof(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Eof);
        self.ast.atom(atom)
    }

    /// Bad node at the current token, which is left unconsumed.
    pub(crate) fn make_bad(&mut self, kind: SyntaxErrorKind) -> NodeId {
        let err = self.error(self.pos(), kind);
        let atom = self.make_atom(self.tok());
        self.ast.bad(atom, None, err)
    }

    pub(crate) fn make_bad_node(&mut self, node: NodeId, kind: SyntaxErrorKind) -> NodeId {
        let err = self.error(self.pos(), kind);
        let n = self.ast.node(node);
        let atom = Atom::new(n.op(), n.atom.pos, n.atom.end, "");
        self.ast.bad(atom, Some(node), err)
    }

    /// Bad node for the current token, which is consumed.
    pub(crate) fn parse_bad(&mut self, kind: SyntaxErrorKind) -> NodeId {
        let bad = self.make_bad(kind);
        self.next();
        bad
    }

    pub(crate) fn parse_atom(&mut self, tok: Token) -> NodeId {
        let atom = self.make_atom(tok);
        self.next();
        self.ast.atom(atom)
    }

    pub(crate) fn parse_ident(&mut self) -> NodeId {
        if self.tok() == Token::Ident {
            self.parse_atom(Token::Ident)
        } else {
            self.make_bad(SyntaxErrorKind::ExpectingIdent)
        }
    }
}

pub fn is_decl(tok: Token) -> bool {
    matches!(
        tok,
        Token::Const | Token::Func | Token::Import | Token::Type | Token::Var
    )
}

/// Closing delimiters.
pub fn is_leave(tok: Token) -> bool {
    matches!(tok, Token::RParen | Token::RBrack | Token::RBrace)
}

fn is_top_level(ast: &Ast, n: NodeId) -> bool {
    ast.node(n).is_bad()
        || matches!(
            ast.op(n),
            Token::Package | Token::Import | Token::Const | Token::Var | Token::Type | Token::Func
        )
}
