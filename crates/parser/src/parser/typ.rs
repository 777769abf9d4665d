use super::{Children, Parser};
use crate::ast::{Atom, NodeId};
use crate::error::SyntaxErrorKind;
use crate::parser_support::{make_field, resolve_param_list, ParamDecl};
use crate::token::Token;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> NodeId {
        if let Some(t) = self.try_type() {
            return t;
        }
        match self.tok() {
            Token::RParen
            | Token::RBrack
            | Token::RBrace
            | Token::Semicolon
            | Token::Comma
            | Token::Eof => self.make_bad(SyntaxErrorKind::ExpectingType),
            _ => self.parse_bad(SyntaxErrorKind::ExpectingType),
        }
    }

    pub(crate) fn try_type(&mut self) -> Option<NodeId> {
        let t = match self.tok() {
            Token::Ident => self.parse_type_name(),
            Token::LBrack => self.parse_array_or_slice_type(),
            Token::Struct => self.parse_struct_type(),
            Token::Mul => {
                let atom = self.make_atom(Token::Mul);
                self.next();
                let elem = self.parse_type();
                self.make_unary(atom, Some(elem))
            }
            Token::Func => self.parse_func_type(),
            Token::Interface => self.parse_interface_type(),
            Token::Map => self.parse_map_type(),
            Token::Chan => self.parse_chan_type(),
            Token::Arrow => {
                let atom = self.make_atom(Token::Arrow);
                self.next();
                self.parse_recv_chan_type(atom)
            }
            Token::LParen => {
                self.next();
                let t = self.parse_type();
                self.leave_node(t, Token::RParen)
            }
            _ => return None,
        };
        Some(t)
    }

    /// `T`, `pkg.T`, optionally instantiated: `T[A]`, `T[A, B]`.
    fn parse_type_name(&mut self) -> NodeId {
        let mut name = self.parse_ident();
        if self.tok() == Token::Period {
            let mut atom = self.make_atom(Token::Period);
            atom.pos = self.ast.pos(name);
            self.next();
            let sel = self.parse_ident();
            name = self.make_binary(atom, Some(name), Some(sel));
        }
        if self.tok() == Token::LBrack {
            let mut atom = self.make_atom(Token::Index);
            atom.pos = self.ast.pos(name);
            self.next();
            let mut args = Children::new();
            while !matches!(self.tok(), Token::RBrack | Token::Eof) {
                args.push(Some(self.parse_type()));
                if self.tok() != Token::Comma {
                    break;
                }
                self.next();
            }
            let arg = match args.as_slice() {
                [] => Some(self.make_bad(SyntaxErrorKind::ExpectingType)),
                [only] => *only,
                _ => {
                    let list_atom = Atom::new(Token::Exprs, atom.pos, atom.pos, "");
                    Some(self.make_list(list_atom, args))
                }
            };
            let inst = self.make_binary(atom, Some(name), arg);
            name = self.leave_node(inst, Token::RBrack);
        }
        name
    }

    /// `[N]T`, `[...]T` or `[]T`; the current token is `[`.
    fn parse_array_or_slice_type(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Array);
        self.next();
        let len = match self.tok() {
            Token::RBrack => None,
            Token::Ellipsis => Some(self.parse_atom(Token::Ellipsis)),
            _ => Some(self.with_composite(true, |p| p.parse_expr())),
        };
        self.array_tail(atom, len)
    }

    /// Rest of an array type after its length: `] elem`.
    pub(crate) fn array_tail(&mut self, atom: Atom, len: Option<NodeId>) -> NodeId {
        self.expect(Token::RBrack);
        let elem = self.parse_type();
        self.make_binary(atom, len, Some(elem))
    }

    fn parse_map_type(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Map);
        self.next();
        self.expect(Token::LBrack);
        let key = self.parse_type();
        self.expect(Token::RBrack);
        let value = self.parse_type();
        self.make_binary(atom, Some(key), Some(value))
    }

    /// `chan T` or `chan<- T`; the current token is `chan`.
    fn parse_chan_type(&mut self) -> NodeId {
        let mut atom = self.make_atom(Token::BothDir);
        self.next();
        if self.tok() == Token::Arrow {
            atom.tok = Token::SendDir;
            self.next();
        }
        let elem = self.parse_type();
        self.make_unary(atom, Some(elem))
    }

    /// `<-chan T`; `arrow` is the already consumed `<-`.
    pub(crate) fn parse_recv_chan_type(&mut self, arrow: Atom) -> NodeId {
        let mut atom = arrow;
        atom.tok = Token::RecvDir;
        self.expect(Token::Chan);
        let elem = self.parse_type();
        self.make_unary(atom, Some(elem))
    }

    /// `B(FUNC, L(PARAMS), L(RESULTS))`; the current token is `func`.
    pub(crate) fn parse_func_type(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Func);
        self.next();
        self.parse_signature(atom)
    }

    pub(crate) fn parse_signature(&mut self, atom: Atom) -> NodeId {
        let params = self.parse_params(Token::LParen, Token::RParen, Token::Params, false);
        let results = self.parse_results();
        self.make_binary(atom, Some(params), Some(results))
    }

    fn parse_results(&mut self) -> NodeId {
        if self.tok() == Token::LParen {
            return self.parse_params(Token::LParen, Token::RParen, Token::Results, false);
        }
        let atom = Atom::new(Token::Results, self.pos(), self.pos(), "");
        let fields = match self.try_type() {
            Some(t) => vec![Some(make_field(&mut self.ast, &[], t, None))],
            None => Vec::new(),
        };
        self.make_list(atom, fields)
    }

    /// Parameter (or type parameter) list between `open` and `close`, as
    /// `L(tag, fields)`.
    pub(crate) fn parse_params(&mut self, open: Token, close: Token, tag: Token, type_params: bool) -> NodeId {
        let atom = self.make_atom(tag);
        let mut bad = Children::new();
        self.enter(&mut bad, open);
        self.parse_params_body(atom, bad, close, type_params)
    }

    /// Entries up to and including `close`; the opening token is consumed.
    pub(crate) fn parse_params_body(&mut self, atom: Atom, mut bad: Children, close: Token, type_params: bool) -> NodeId {
        let mut entries = Vec::new();
        self.with_composite(true, |p| {
            while !matches!(p.tok(), Token::Eof) && p.tok() != close {
                let before = p.consumed;
                entries.push(p.parse_param_entry(close, type_params));
                if p.tok() == Token::Comma {
                    p.next();
                } else if p.consumed == before {
                    bad.push(Some(p.parse_bad(SyntaxErrorKind::Expecting(close))));
                } else {
                    break;
                }
            }
        });
        self.leave(&mut bad, close);
        let mut fields = resolve_param_list(&mut self.ast, entries);
        fields.extend(bad);
        self.make_list(atom, fields)
    }

    fn parse_param_entry(&mut self, close: Token, type_params: bool) -> ParamDecl {
        if self.tok() != Token::Ident {
            return ParamDecl {
                name: None,
                typ: Some(self.parse_param_type(type_params)),
            };
        }
        let ident = self.make_atom(Token::Ident);
        self.next();
        match self.tok() {
            Token::Comma => {
                let name = self.ast.atom(ident);
                ParamDecl { name: Some(name), typ: None }
            }
            tok if tok == close => {
                let name = self.ast.atom(ident);
                ParamDecl { name: Some(name), typ: None }
            }
            Token::Period => {
                // Qualified type without a name: re-read it as a type.
                self.unread(ident);
                ParamDecl {
                    name: None,
                    typ: Some(self.parse_param_type(type_params)),
                }
            }
            Token::LBrack => self.parse_bracketed_param(ident),
            _ => {
                let name = self.ast.atom(ident);
                ParamDecl {
                    name: Some(name),
                    typ: Some(self.parse_param_type(type_params)),
                }
            }
        }
    }

    /// `ident [` in a parameter list: a named array or slice parameter
    /// (`a []T`, `a [N]T`) or an unnamed instantiated type (`List[T]`).
    fn parse_bracketed_param(&mut self, ident: Atom) -> ParamDecl {
        let lbrack = self.make_atom(Token::Array);
        self.next();
        if matches!(self.tok(), Token::RBrack | Token::Ellipsis) {
            let len = (self.tok() == Token::Ellipsis).then(|| self.parse_atom(Token::Ellipsis));
            let name = self.ast.atom(ident);
            return ParamDecl {
                name: Some(name),
                typ: Some(self.array_tail(lbrack, len)),
            };
        }
        let mut args = Children::new();
        self.with_composite(true, |p| {
            args.push(Some(p.parse_type_or_expr()));
            while p.tok() == Token::Comma {
                p.next();
                if p.tok() == Token::RBrack {
                    break;
                }
                args.push(Some(p.parse_type()));
            }
        });
        self.expect(Token::RBrack);
        let name = self.ast.atom(ident);
        if args.len() == 1 && starts_type(self.tok()) {
            let elem = self.parse_type();
            let typ = self.make_binary(lbrack, args[0], Some(elem));
            return ParamDecl {
                name: Some(name),
                typ: Some(typ),
            };
        }
        let mut atom = lbrack;
        atom.tok = Token::Index;
        atom.pos = self.ast.pos(name);
        let arg = match args.as_slice() {
            [only] => *only,
            _ => {
                let list_atom = Atom::new(Token::Exprs, atom.pos, atom.pos, "");
                Some(self.make_list(list_atom, args))
            }
        };
        let typ = self.make_binary(atom, Some(name), arg);
        ParamDecl {
            name: None,
            typ: Some(typ),
        }
    }

    /// A parameter type: `...T` for variadics, a union for constraints.
    fn parse_param_type(&mut self, type_params: bool) -> NodeId {
        if self.tok() == Token::Ellipsis {
            let atom = self.make_atom(Token::Ellipsis);
            self.next();
            let elem = self.parse_type();
            return self.make_unary(atom, Some(elem));
        }
        if type_params {
            self.parse_union()
        } else {
            self.parse_type()
        }
    }

    /// `~A | B | ...` as left-nested `B(OR)` nodes.
    pub(crate) fn parse_union(&mut self) -> NodeId {
        let mut x = self.parse_type_term();
        while self.tok() == Token::Or {
            let mut atom = self.make_atom(Token::Or);
            atom.pos = self.ast.pos(x);
            self.next();
            let y = self.parse_type_term();
            x = self.make_binary(atom, Some(x), Some(y));
        }
        x
    }

    fn parse_type_term(&mut self) -> NodeId {
        if self.tok() == Token::Tilde {
            let atom = self.make_atom(Token::Tilde);
            self.next();
            let t = self.parse_type();
            return self.make_unary(atom, Some(t));
        }
        self.parse_type()
    }

    fn parse_struct_type(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Struct);
        self.next();
        let mut fields = Children::new();
        self.enter(&mut fields, Token::LBrace);
        while !matches!(self.tok(), Token::RBrace | Token::Eof) {
            let before = self.consumed;
            fields.push(Some(self.parse_struct_field()));
            self.field_end(&mut fields, before);
        }
        self.leave(&mut fields, Token::RBrace);
        self.make_list(atom, fields)
    }

    /// After a field or method: `;` or `}`, otherwise skip to either.
    fn field_end(&mut self, list: &mut Children, before: u64) {
        match self.tok() {
            Token::Semicolon => {
                self.next();
            }
            Token::RBrace | Token::Eof => {}
            _ => {
                if self.consumed != before {
                    self.error(self.pos(), SyntaxErrorKind::Expecting(Token::Semicolon));
                }
                while !matches!(self.tok(), Token::Semicolon | Token::RBrace | Token::Eof) {
                    list.push(Some(self.parse_bad(SyntaxErrorKind::Expecting(Token::Semicolon))));
                }
                if self.tok() == Token::Semicolon {
                    self.next();
                }
            }
        }
    }

    fn parse_struct_field(&mut self) -> NodeId {
        let mut names = Vec::new();
        let typ = match self.tok() {
            Token::Ident => {
                let first = self.make_atom(Token::Ident);
                self.next();
                match self.tok() {
                    // Embedded `T`, `pkg.T` or `T[A]`.
                    Token::Semicolon | Token::RBrace | Token::String | Token::Period => {
                        self.unread(first);
                        self.parse_type_name()
                    }
                    Token::LBrack => {
                        // `a [N]T`; embedded instantiations are not accepted.
                        names.push(self.ast.atom(first));
                        self.parse_type()
                    }
                    _ => {
                        names.push(self.ast.atom(first));
                        while self.tok() == Token::Comma {
                            self.next();
                            names.push(self.parse_ident());
                        }
                        self.parse_type()
                    }
                }
            }
            Token::Mul => {
                let atom = self.make_atom(Token::Mul);
                self.next();
                let t = self.parse_type_name();
                self.make_unary(atom, Some(t))
            }
            _ => self.parse_type(),
        };
        let tag = (self.tok() == Token::String).then(|| self.parse_atom(Token::String));
        make_field(&mut self.ast, &names, typ, tag)
    }

    fn parse_interface_type(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Interface);
        self.next();
        let mut elems = Children::new();
        self.enter(&mut elems, Token::LBrace);
        while !matches!(self.tok(), Token::RBrace | Token::Eof) {
            let before = self.consumed;
            let elem = self.parse_interface_elem();
            elems.push(Some(elem));
            self.field_end(&mut elems, before);
        }
        self.leave(&mut elems, Token::RBrace);
        self.make_list(atom, elems)
    }

    /// Method `M(params) results`, or an embedded type/union.
    fn parse_interface_elem(&mut self) -> NodeId {
        if self.tok() == Token::Ident {
            let ident = self.make_atom(Token::Ident);
            self.next();
            if self.tok() == Token::LParen {
                let name = self.ast.atom(ident);
                let sig_atom = Atom::new(Token::Func, self.ast.pos(name), self.ast.pos(name), "");
                let sig = self.parse_signature(sig_atom);
                return make_field(&mut self.ast, &[name], sig, None);
            }
            self.unread(ident);
        }
        let t = self.parse_union();
        make_field(&mut self.ast, &[], t, None)
    }
}

/// Tokens that can begin a type.
pub(crate) fn starts_type(tok: Token) -> bool {
    matches!(
        tok,
        Token::Ident
            | Token::LBrack
            | Token::Struct
            | Token::Mul
            | Token::Func
            | Token::Interface
            | Token::Map
            | Token::Chan
            | Token::Arrow
            | Token::LParen
    )
}
