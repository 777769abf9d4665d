use smallvec::SmallVec;

use crate::ast::{Ast, Atom, Child, NodeId};
use crate::token::Token;

/// One comma-separated entry of a parameter list, before grouping.
///
/// A lone identifier (`name` set, `typ` empty) is ambiguous: in `(a, b int)`
/// it is a name, in `(int, string)` it is a type.
#[derive(Clone, Debug)]
pub(crate) struct ParamDecl {
    pub name: Option<NodeId>,
    pub typ: Option<NodeId>,
}

/// Groups entries into `FIELD` nodes. Pending lone identifiers attach as
/// names to the next typed entry when the list names any parameter;
/// otherwise each lone identifier is a type of its own.
pub(crate) fn resolve_param_list(ast: &mut Ast, params: Vec<ParamDecl>) -> Vec<Child> {
    let named = params.iter().any(|p| p.name.is_some() && p.typ.is_some());
    let mut out = Vec::with_capacity(params.len());
    let mut pending: SmallVec<[NodeId; 4]> = SmallVec::new();

    for param in params {
        match (param.name, param.typ) {
            (Some(name), None) if named => pending.push(name),
            (Some(name), None) => out.push(Some(make_field(ast, &[], name, None))),
            (name, Some(typ)) => {
                pending.extend(name);
                out.push(Some(make_field(ast, &pending, typ, None)));
                pending.clear();
            }
            (None, None) => {}
        }
    }
    // Names never followed by a type: keep them as types.
    for name in pending {
        out.push(Some(make_field(ast, &[], name, None)));
    }
    out
}

/// `L(FIELD, [L(NAMES)·, type, tag·])`.
pub(crate) fn make_field(ast: &mut Ast, names: &[NodeId], typ: NodeId, tag: Child) -> NodeId {
    let names = match names.first() {
        Some(&first) => {
            let atom = Atom::new(Token::Names, ast.pos(first), ast.pos(first), "");
            Some(ast.list(atom, names.iter().copied().map(Some)))
        }
        None => None,
    };
    let pos = names.map_or_else(|| ast.pos(typ), |n| ast.pos(n));
    let atom = Atom::new(Token::Field, pos, pos, "");
    ast.list(atom, [names, Some(typ), tag])
}
