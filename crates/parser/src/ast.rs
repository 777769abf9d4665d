//! # Generic syntax tree
//!
//! Every construct is one of five node shapes, tagged with a [`Token`]:
//!
//! - **Atom**: a leaf (identifier, literal, keyword like `fallthrough`)
//! - **Unary**: one child (`-x`, `*T`, `chan T`)
//! - **Binary**: two children (`a + b`, `map[K]V`, assignment)
//! - **List**: an ordered child sequence (calls, blocks, declarations)
//! - **Bad**: wraps a node that failed to parse, with the error that caused it
//!
//! Absent optional parts (an `if` without init, a slice without `max`) are
//! `None` children, rendered as `nil`.
//!
//! ## Architecture
//!
//! - **Nodes** live in one arena (`Ast::nodes`) and are addressed by [`NodeId`]
//! - **Lists** store their children in a shared buffer (`Ast::extras`) through
//!   a [`ListRef`], so no node owns a `Vec`
//! - **Annotations** produced by later phases go in a [`NodeMap`] side table

use std::fmt;

use crate::error::{AstError, Error};
use crate::source::Pos;
use crate::token::Token;

// =============================================================================
// Handles
// =============================================================================

/// Index of a node inside its [`Ast`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

/// A child slot; `None` marks an absent optional part.
pub type Child = Option<NodeId>;

/// Contiguous run of children in `Ast::extras`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListRef {
    start: u32,
    len: u32,
}

impl ListRef {
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A token occurrence: kind, extent, literal text and the comments that
/// preceded it in the source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Atom {
    pub tok: Token,
    pub pos: Pos,
    pub end: Pos,
    pub lit: String,
    pub comments: Vec<String>,
}

impl Atom {
    pub fn new(tok: Token, pos: Pos, end: Pos, lit: impl Into<String>) -> Self {
        Self {
            tok,
            pos,
            end,
            lit: lit.into(),
            comments: Vec::new(),
        }
    }

    /// Literal text, or the token spelling when there is none.
    pub fn text(&self) -> &str {
        if self.lit.is_empty() {
            self.tok.as_str()
        } else {
            &self.lit
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Atom,
    Unary(Child),
    Binary([Child; 2]),
    List(ListRef),
    Bad { node: Child, error: Box<Error> },
}

/// One arena slot: the node's own atom plus its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub atom: Atom,
    pub kind: NodeKind,
}

impl Node {
    #[inline]
    pub fn op(&self) -> Token {
        self.atom.tok
    }

    #[inline]
    pub fn is_bad(&self) -> bool {
        matches!(self.kind, NodeKind::Bad { .. })
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.kind {
            NodeKind::Bad { error, .. } => Some(error),
            _ => None,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    extras: Vec<Child>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, atom: Atom, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { atom, kind });
        id
    }

    pub fn atom(&mut self, atom: Atom) -> NodeId {
        self.alloc(atom, NodeKind::Atom)
    }

    pub fn unary(&mut self, atom: Atom, x: Child) -> NodeId {
        self.alloc(atom, NodeKind::Unary(x))
    }

    pub fn binary(&mut self, atom: Atom, x: Child, y: Child) -> NodeId {
        self.alloc(atom, NodeKind::Binary([x, y]))
    }

    pub fn list(&mut self, atom: Atom, children: impl IntoIterator<Item = Child>) -> NodeId {
        let start = self.extras.len();
        self.extras.extend(children);
        let list = ListRef {
            start: start as u32,
            len: (self.extras.len() - start) as u32,
        };
        self.alloc(atom, NodeKind::List(list))
    }

    /// Wraps `node` (if any) in a Bad node whose op is the wrapped op, or the
    /// atom's token when nothing is wrapped.
    pub fn bad(&mut self, atom: Atom, node: Child, error: Error) -> NodeId {
        self.alloc(
            atom,
            NodeKind::Bad {
                node,
                error: Box::new(error),
            },
        )
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.to_usize()]
    }

    pub fn op(&self, id: NodeId) -> Token {
        self.node(id).op()
    }

    pub fn lit(&self, id: NodeId) -> &str {
        &self.node(id).atom.lit
    }

    pub fn pos(&self, id: NodeId) -> Pos {
        self.node(id).atom.pos
    }

    /// End of the last present child, or the node's own end when it has
    /// none.
    pub fn end(&self, id: NodeId) -> Pos {
        match self.children(id).iter().rev().flatten().next() {
            Some(&last) => self.end(last),
            None => self.node(id).atom.end,
        }
    }

    pub fn children(&self, id: NodeId) -> &[Child] {
        match &self.node(id).kind {
            NodeKind::Atom => &[],
            NodeKind::Unary(x) => std::slice::from_ref(x),
            NodeKind::Binary(pair) => pair,
            NodeKind::Bad { node, .. } => std::slice::from_ref(node),
            NodeKind::List(list) => &self.extras[list.range()],
        }
    }

    pub fn len(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn at(&self, id: NodeId, index: usize) -> Result<Child, AstError> {
        let children = self.children(id);
        children
            .get(index)
            .copied()
            .ok_or(AstError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(id, &mut out);
        out
    }

    /// Writes the s-expression form of `id`: atoms as their text, other
    /// nodes as `(op child…)`, absent children as `nil`.
    pub fn write_to(&self, id: NodeId, out: &mut impl fmt::Write) -> fmt::Result {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Atom => out.write_str(node.atom.text()),
            NodeKind::Bad { node: inner, .. } => {
                out.write_str("(BAD")?;
                if let Some(inner) = inner {
                    out.write_char(' ')?;
                    self.write_to(*inner, out)?;
                }
                out.write_char(')')
            }
            _ => {
                write!(out, "({}", node.atom.tok)?;
                for child in self.children(id) {
                    out.write_char(' ')?;
                    match child {
                        Some(c) => self.write_to(*c, out)?,
                        None => out.write_str("nil")?,
                    }
                }
                out.write_char(')')
            }
        }
    }
}

// =============================================================================
// Side tables
// =============================================================================

/// Dense map from [`NodeId`] to annotations produced after parsing.
#[derive(Debug, Clone)]
pub struct NodeMap<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for NodeMap<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> NodeMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, value: T) -> Option<T> {
        let i = id.to_usize();
        if i >= self.slots.len() {
            self.slots.resize_with(i + 1, || None);
        }
        self.slots[i].replace(value)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.to_usize()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.to_usize()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (NodeId(i as u32), v)))
    }
}
