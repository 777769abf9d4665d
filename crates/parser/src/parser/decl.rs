use super::{Children, Parser};
use crate::ast::{Atom, NodeId};
use crate::error::SyntaxErrorKind;
use crate::token::Token;

impl Parser {
    /// `U(PACKAGE, name)`.
    pub(crate) fn parse_package(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Package);
        self.next();
        let name = self.parse_ident();
        self.make_unary(atom, Some(name))
    }

    pub(crate) fn parse_import(&mut self) -> NodeId {
        self.parse_gen_decl(Token::Import, Self::parse_import_spec)
    }

    /// `const`, `var`, `type` or `func` declaration at the top level.
    pub fn parse_top_level_decl(&mut self) -> NodeId {
        match self.tok() {
            Token::Const => self.parse_gen_decl(Token::Const, Self::parse_value_spec),
            Token::Var => self.parse_gen_decl(Token::Var, Self::parse_value_spec),
            Token::Type => self.parse_gen_decl(Token::Type, Self::parse_type_spec),
            Token::Func => self.parse_func_decl(),
            Token::Import => self.parse_import(),
            _ => self.parse_bad(SyntaxErrorKind::ExpectingDecl),
        }
    }

    /// `L(tok, specs)` for a single spec or a parenthesized group.
    pub(crate) fn parse_gen_decl(&mut self, tok: Token, spec: fn(&mut Self) -> NodeId) -> NodeId {
        let atom = self.make_atom(tok);
        self.next();
        let mut specs = Children::new();
        if self.tok() != Token::LParen {
            specs.push(Some(spec(self)));
            return self.make_list(atom, specs);
        }
        self.next();
        while !matches!(self.tok(), Token::RParen | Token::Eof) {
            let before = self.consumed;
            specs.push(Some(spec(self)));
            match self.tok() {
                Token::Semicolon => {
                    self.next();
                }
                Token::RParen | Token::Eof => {}
                _ => {
                    if self.consumed != before {
                        self.error(self.pos(), SyntaxErrorKind::Expecting(Token::Semicolon));
                    }
                    while !matches!(self.tok(), Token::Semicolon | Token::RParen | Token::Eof) {
                        specs.push(Some(self.parse_bad(SyntaxErrorKind::Expecting(Token::RParen))));
                    }
                    if self.tok() == Token::Semicolon {
                        self.next();
                    }
                }
            }
        }
        self.leave(&mut specs, Token::RParen);
        self.make_list(atom, specs)
    }

    /// `B(IMPORT_SPEC, alias·, path)`.
    fn parse_import_spec(&mut self) -> NodeId {
        let atom = self.make_atom(Token::ImportSpec);
        let alias = match self.tok() {
            Token::Ident => Some(self.parse_ident()),
            Token::Period => Some(self.parse_atom(Token::Period)),
            _ => None,
        };
        let path = if self.tok() == Token::String {
            self.parse_atom(Token::String)
        } else {
            self.make_bad(SyntaxErrorKind::ExpectingString)
        };
        self.make_binary(atom, alias, Some(path))
    }

    /// `L(VALUE_SPEC, [L(NAMES), type·, L(EXPRS)·])`.
    fn parse_value_spec(&mut self) -> NodeId {
        let atom = self.make_atom(Token::ValueSpec);
        let names = self.parse_name_list();
        let typ = match self.tok() {
            Token::Assign | Token::Semicolon | Token::RParen | Token::Eof => None,
            _ => Some(self.parse_type()),
        };
        let values = (self.tok() == Token::Assign).then(|| {
            self.next();
            self.parse_expr_list()
        });
        self.make_list(atom, [Some(names), typ, values])
    }

    fn parse_name_list(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Names);
        let mut names = Children::new();
        names.push(Some(self.parse_ident()));
        while self.tok() == Token::Comma {
            self.next();
            names.push(Some(self.parse_ident()));
        }
        self.make_list(atom, names)
    }

    /// `B(TYPE, name, type)`, `B(ASSIGN, name, type)` for aliases; a generic
    /// name is `B(GENERIC, name, L(PARAMS))`.
    fn parse_type_spec(&mut self) -> NodeId {
        let mut atom = self.make_atom(Token::Type);
        let mut name = self.parse_ident();
        if self.tok() == Token::LBrack {
            match self.parse_type_params_or_array(name) {
                TypeSpecHead::Generic(generic) => name = generic,
                TypeSpecHead::Array(array) => return self.make_binary(atom, Some(name), Some(array)),
            }
        }
        if self.tok() == Token::Assign {
            atom.tok = Token::Assign;
            self.next();
        }
        let typ = self.parse_type();
        self.make_binary(atom, Some(name), Some(typ))
    }

    /// After `type T` the current token is `[`: either type parameters
    /// (`type T[P any] ...`) or an array type (`type T [N]E`).
    fn parse_type_params_or_array(&mut self, name: NodeId) -> TypeSpecHead {
        let mut lbrack = self.make_atom(Token::Array);
        self.next();
        if self.tok() == Token::Ident {
            let ident = self.make_atom(Token::Ident);
            self.next();
            let is_array = self.tok() == Token::RBrack;
            self.unread(ident);
            if !is_array {
                lbrack.tok = Token::Params;
                let params = self.parse_params_body(lbrack, Children::new(), Token::RBrack, true);
                let pos = self.ast.pos(name);
                let atom = Atom::new(Token::Generic, pos, pos, "");
                return TypeSpecHead::Generic(self.make_binary(atom, Some(name), Some(params)));
            }
        }
        let len = match self.tok() {
            Token::RBrack => None,
            Token::Ellipsis => Some(self.parse_atom(Token::Ellipsis)),
            _ => Some(self.with_composite(true, |p| p.parse_expr())),
        };
        TypeSpecHead::Array(self.array_tail(lbrack, len))
    }

    /// `L(FUNC, [L(PARAMS) recv·, name, B(FUNC, params, results), L(BLOCK)·])`.
    fn parse_func_decl(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Func);
        self.next();
        let recv = (self.tok() == Token::LParen)
            .then(|| self.parse_params(Token::LParen, Token::RParen, Token::Params, false));
        let mut name = self.parse_ident();
        let name_pos = self.ast.pos(name);
        if self.tok() == Token::LBrack {
            let params = self.parse_params(Token::LBrack, Token::RBrack, Token::Params, true);
            let generic = Atom::new(Token::Generic, name_pos, name_pos, "");
            name = self.make_binary(generic, Some(name), Some(params));
        }
        let sig = self.parse_signature(Atom::new(Token::Func, name_pos, name_pos, ""));
        let body = (self.tok() == Token::LBrace).then(|| self.with_composite(true, |p| p.parse_block()));
        self.make_list(atom, [recv, Some(name), Some(sig), body])
    }
}

enum TypeSpecHead {
    Generic(NodeId),
    Array(NodeId),
}
