use super::{Children, Parser};
use crate::ast::{Child, NodeId};
use crate::error::SyntaxErrorKind;
use crate::token::{Token, LOWEST_PREC};

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> NodeId {
        self.parse_binary_expr(LOWEST_PREC + 1)
    }

    /// Comma-separated expressions, at least one.
    pub(crate) fn parse_expr_items(&mut self) -> Children {
        let mut items = Children::new();
        items.push(Some(self.parse_expr()));
        while self.tok() == Token::Comma {
            self.next();
            items.push(Some(self.parse_expr()));
        }
        items
    }

    /// A single expression stays as is; several become `L(EXPRS)`.
    pub(crate) fn wrap_exprs(&mut self, items: Children) -> NodeId {
        match items.as_slice() {
            [Some(only)] => *only,
            _ => {
                let atom = self.exprs_atom(&items);
                self.make_list(atom, items)
            }
        }
    }

    /// `L(EXPRS)` even for one element.
    pub(crate) fn parse_expr_list(&mut self) -> NodeId {
        let items = self.parse_expr_items();
        let atom = self.exprs_atom(&items);
        self.make_list(atom, items)
    }

    fn exprs_atom(&mut self, items: &[Child]) -> crate::ast::Atom {
        let mut atom = self.make_atom(Token::Exprs);
        if let Some(Some(first)) = items.first() {
            atom.pos = self.ast.pos(*first);
        }
        atom
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> NodeId {
        let mut x = self.parse_unary_expr();
        loop {
            let op = self.tok();
            let prec = op.precedence();
            if prec < min_prec {
                return x;
            }
            let atom = self.make_atom(op);
            self.next();
            let y = self.parse_binary_expr(prec + 1);
            x = self.make_binary(atom, Some(x), Some(y));
        }
    }

    pub(crate) fn parse_unary_expr(&mut self) -> NodeId {
        match self.tok() {
            op @ (Token::Add
            | Token::Sub
            | Token::Not
            | Token::Xor
            | Token::And
            | Token::Tilde
            | Token::Mul) => {
                let atom = self.make_atom(op);
                self.next();
                let x = self.parse_unary_expr();
                self.make_unary(atom, Some(x))
            }
            Token::Arrow => {
                let atom = self.make_atom(Token::Arrow);
                self.next();
                if self.tok() == Token::Chan {
                    // `<-chan T` in expression position, e.g. a conversion.
                    let typ = self.parse_recv_chan_type(atom);
                    return self.parse_primary_suffixes(typ);
                }
                let x = self.parse_unary_expr();
                self.make_unary(atom, Some(x))
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_primary_expr(&mut self) -> NodeId {
        let x = self.parse_operand();
        self.parse_primary_suffixes(x)
    }

    fn parse_primary_suffixes(&mut self, mut x: NodeId) -> NodeId {
        loop {
            x = match self.tok() {
                Token::Period => self.parse_selector_or_assert(x),
                Token::LBrack => self.parse_index_or_slice(x),
                Token::LParen => self.parse_call(x),
                Token::LBrace if self.is_literal_type(x) => self.parse_composite_lit(Some(x)),
                _ => return x,
            };
        }
    }

    /// Whether `x {` continues `x` as a composite literal.
    fn is_literal_type(&self, x: NodeId) -> bool {
        match self.ast.op(x) {
            Token::Array | Token::Struct | Token::Map => true,
            Token::Ident | Token::Period | Token::Index => {
                self.composite_ok && !self.ast.node(x).is_bad()
            }
            _ => false,
        }
    }

    fn parse_operand(&mut self) -> NodeId {
        match self.tok() {
            Token::Ident => self.parse_ident(),
            lit @ (Token::Int
            | Token::Float
            | Token::Imag
            | Token::Char
            | Token::String) => self.parse_atom(lit),
            Token::LParen => {
                let atom = self.make_atom(Token::LParen);
                self.next();
                let x = self.with_composite(true, |p| p.parse_expr());
                let paren = self.make_unary(atom, Some(x));
                self.leave_node(paren, Token::RParen)
            }
            Token::Func => self.parse_func_type_or_lit(),
            Token::LBrack
            | Token::Struct
            | Token::Map
            | Token::Chan
            | Token::Interface => self.parse_type(),
            Token::RParen
            | Token::RBrack
            | Token::RBrace
            | Token::Semicolon
            | Token::Comma
            | Token::Colon
            | Token::Eof => self.make_bad(SyntaxErrorKind::ExpectingExpr),
            _ => self.parse_bad(SyntaxErrorKind::ExpectingExpr),
        }
    }

    /// `func(...) ...` as a type, or `B(LAMBDA, functype, block)` when a body
    /// follows.
    fn parse_func_type_or_lit(&mut self) -> NodeId {
        let lambda = self.make_atom(Token::Lambda);
        let sig = self.parse_func_type();
        if self.tok() != Token::LBrace {
            return sig;
        }
        let body = self.with_composite(true, |p| p.parse_block());
        self.make_binary(lambda, Some(sig), Some(body))
    }

    fn parse_selector_or_assert(&mut self, x: NodeId) -> NodeId {
        let mut atom = self.make_atom(Token::Period);
        atom.pos = self.ast.pos(x);
        self.next();
        match self.tok() {
            Token::Ident => {
                let sel = self.parse_ident();
                self.make_binary(atom, Some(x), Some(sel))
            }
            Token::LParen => {
                self.next();
                atom.tok = Token::TypeAssert;
                let typ = if self.tok() == Token::Type {
                    self.parse_atom(Token::Type)
                } else {
                    self.parse_type()
                };
                let assert = self.make_binary(atom, Some(x), Some(typ));
                self.leave_node(assert, Token::RParen)
            }
            _ => {
                let bad = self.make_bad(SyntaxErrorKind::ExpectingIdent);
                self.make_binary(atom, Some(x), Some(bad))
            }
        }
    }

    fn parse_index_or_slice(&mut self, x: NodeId) -> NodeId {
        let mut atom = self.make_atom(Token::Index);
        atom.pos = self.ast.pos(x);
        self.next();
        let node = self.with_composite(true, |p| {
            let mut parts: [Child; 3] = [None; 3];
            let mut colons = 0;
            if p.tok() != Token::Colon {
                parts[0] = Some(p.parse_type_or_expr());
            }
            while p.tok() == Token::Colon && colons < 2 {
                colons += 1;
                p.next();
                if !matches!(p.tok(), Token::Colon | Token::RBrack | Token::Eof) {
                    parts[colons] = Some(p.parse_expr());
                }
            }
            if colons > 0 {
                atom.tok = Token::Slice;
                if colons == 2 && (parts[1].is_none() || parts[2].is_none()) {
                    p.error(p.pos(), SyntaxErrorKind::ExpectingExpr);
                }
                return p.make_list(atom, [Some(x), parts[0], parts[1], parts[2]]);
            }
            let index = match parts[0] {
                None => Some(p.make_bad(SyntaxErrorKind::ExpectingExpr)),
                Some(first) if p.tok() == Token::Comma => {
                    // Instantiation with several type arguments.
                    let mut args = Children::new();
                    args.push(Some(first));
                    while p.tok() == Token::Comma {
                        p.next();
                        if p.tok() == Token::RBrack {
                            break;
                        }
                        args.push(Some(p.parse_type_or_expr()));
                    }
                    let list_atom = p.exprs_atom(&args);
                    Some(p.make_list(list_atom, args))
                }
                first => first,
            };
            p.make_binary(atom, Some(x), index)
        });
        self.leave_node(node, Token::RBrack)
    }

    /// Types are expressions here already, except where a type can only
    /// start with a token the operand grammar rejects.
    pub(crate) fn parse_type_or_expr(&mut self) -> NodeId {
        self.parse_expr()
    }

    fn parse_call(&mut self, f: NodeId) -> NodeId {
        let mut atom = self.make_atom(Token::Call);
        atom.pos = self.ast.pos(f);
        self.next();
        let mut args = Children::new();
        args.push(Some(f));
        self.with_composite(true, |p| {
            while !matches!(p.tok(), Token::RParen | Token::Eof) {
                let mut arg = p.parse_type_or_expr();
                if p.tok() == Token::Ellipsis {
                    let spread = p.make_atom(Token::Ellipsis);
                    p.next();
                    arg = p.make_unary(spread, Some(arg));
                }
                args.push(Some(arg));
                if p.tok() != Token::Comma {
                    break;
                }
                p.next();
            }
        });
        self.leave(&mut args, Token::RParen);
        self.make_list(atom, args)
    }

    /// `B(COMPOSITE_LIT, type·, L(EXPRS, elems))`; the current token is `{`.
    pub(crate) fn parse_composite_lit(&mut self, typ: Child) -> NodeId {
        let mut atom = self.make_atom(Token::CompositeLit);
        if let Some(t) = typ {
            atom.pos = self.ast.pos(t);
        }
        let elems_atom = self.make_atom(Token::Exprs);
        let mut elems = Children::new();
        self.enter(&mut elems, Token::LBrace);
        self.with_composite(true, |p| {
            while !matches!(p.tok(), Token::RBrace | Token::Eof) {
                let before = p.consumed;
                elems.push(Some(p.parse_element()));
                if p.tok() == Token::Comma {
                    p.next();
                } else if p.consumed == before {
                    elems.push(Some(p.parse_bad(SyntaxErrorKind::Expecting(Token::RBrace))));
                } else {
                    break;
                }
            }
        });
        self.leave(&mut elems, Token::RBrace);
        let list = self.make_list(elems_atom, elems);
        self.make_binary(atom, typ, Some(list))
    }

    fn parse_element(&mut self) -> NodeId {
        let key = self.parse_element_value();
        if self.tok() != Token::Colon {
            return key;
        }
        let mut atom = self.make_atom(Token::KeyValue);
        atom.pos = self.ast.pos(key);
        self.next();
        let value = self.parse_element_value();
        self.make_binary(atom, Some(key), Some(value))
    }

    fn parse_element_value(&mut self) -> NodeId {
        if self.tok() == Token::LBrace {
            self.parse_composite_lit(None)
        } else {
            self.parse_expr()
        }
    }
}
