use crate::ast::{Ast, NodeId};
use crate::token::Token;

/// Pre-order visitor over present nodes. Overriding `visit_node` without
/// calling [`walk_children`] prunes the subtree.
pub trait Visitor<'ast> {
    #[inline(always)]
    fn visit_node(&mut self, a: &'ast Ast, id: NodeId) {
        walk_children(self, a, id);
    }
}

#[inline]
pub fn walk_children<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, a: &'ast Ast, id: NodeId) {
    for &child in a.children(id).iter().flatten() {
        v.visit_node(a, child);
    }
}

impl Ast {
    pub fn walk<'ast, V: Visitor<'ast> + ?Sized>(&'ast self, root: NodeId, v: &mut V) {
        v.visit_node(self, root);
    }
}

struct OpCollector {
    op: Token,
    found: Vec<NodeId>,
}

impl Visitor<'_> for OpCollector {
    fn visit_node(&mut self, a: &Ast, id: NodeId) {
        if a.op(id) == self.op {
            self.found.push(id);
        }
        walk_children(self, a, id);
    }
}

/// Every node under `root` (inclusive) tagged `op`, in source order.
pub fn find_all(a: &Ast, root: NodeId, op: Token) -> Vec<NodeId> {
    let mut c = OpCollector {
        op,
        found: Vec::new(),
    };
    a.walk(root, &mut c);
    c.found
}

/// Bad nodes under `root`.
pub fn find_bad(a: &Ast, root: NodeId) -> Vec<NodeId> {
    struct Bad(Vec<NodeId>);
    impl Visitor<'_> for Bad {
        fn visit_node(&mut self, a: &Ast, id: NodeId) {
            if a.node(id).is_bad() {
                self.0.push(id);
            }
            walk_children(self, a, id);
        }
    }
    let mut v = Bad(Vec::new());
    a.walk(root, &mut v);
    v.0
}
