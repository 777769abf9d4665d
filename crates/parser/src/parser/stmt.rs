use super::{Children, Parser};
use crate::ast::{Ast, Atom, Child, NodeId};
use crate::error::SyntaxErrorKind;
use crate::token::Token;

/// Result of a simple statement in a `for` header, where `k, v := range x`
/// is legal.
enum Simple {
    Stmt(NodeId),
    Range { assign: Child, x: NodeId },
}

impl Parser {
    /// Parses one statement. An empty statement yields `None` without
    /// consuming the separator.
    pub(crate) fn parse_stmt(&mut self) -> Option<NodeId> {
        let stmt = match self.tok() {
            Token::Semicolon | Token::RBrace | Token::Eof => return None,
            Token::Const | Token::Var | Token::Type => self.parse_top_level_decl(),
            Token::LBrace => self.parse_block(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::Switch => self.parse_switch(),
            Token::Select => self.parse_select(),
            Token::Return => self.parse_return(),
            tok @ (Token::Break | Token::Continue | Token::Goto) => {
                let atom = self.make_atom(tok);
                self.next();
                let label = (self.tok() == Token::Ident).then(|| self.parse_ident());
                self.make_unary(atom, label)
            }
            Token::Fallthrough => self.parse_atom(Token::Fallthrough),
            tok @ (Token::Go | Token::Defer) => {
                let atom = self.make_atom(tok);
                self.next();
                let call = self.parse_expr();
                self.make_unary(atom, Some(call))
            }
            Token::Ident => {
                let ident = self.make_atom(Token::Ident);
                self.next();
                if self.tok() == Token::Colon {
                    return Some(self.parse_labeled(ident));
                }
                self.unread(ident);
                self.parse_simple_stmt()
            }
            tok if starts_expr(tok) => self.parse_simple_stmt(),
            _ => self.parse_bad(SyntaxErrorKind::ExpectingStmt),
        };
        Some(stmt)
    }

    /// `L(BLOCK, stmts)`; the current token should be `{`.
    pub(crate) fn parse_block(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Block);
        let mut stmts = Children::new();
        self.enter(&mut stmts, Token::LBrace);
        self.with_composite(true, |p| p.parse_stmt_list(&mut stmts));
        self.leave(&mut stmts, Token::RBrace);
        self.make_list(atom, stmts)
    }

    /// Statements up to `}`, `case`, `default` or EOF.
    fn parse_stmt_list(&mut self, stmts: &mut Children) {
        while !matches!(
            self.tok(),
            Token::RBrace | Token::Case | Token::Default | Token::Eof
        ) {
            let before = self.consumed;
            if let Some(s) = self.parse_stmt() {
                stmts.push(Some(s));
            }
            match self.tok() {
                Token::Semicolon => {
                    self.next();
                }
                Token::RBrace | Token::Case | Token::Default | Token::Eof => {}
                _ if self.consumed == before => {
                    stmts.push(Some(self.parse_bad(SyntaxErrorKind::ExpectingStmt)));
                }
                _ => {
                    self.error(self.pos(), SyntaxErrorKind::Expecting(Token::Semicolon));
                }
            }
        }
    }

    /// `B(LABEL, name, stmt·)`; the current token is the `:` after `ident`.
    fn parse_labeled(&mut self, ident: Atom) -> NodeId {
        let mut atom = self.make_atom(Token::Label);
        atom.pos = ident.pos;
        let name = self.ast.atom(ident);
        self.next();
        let stmt = self.parse_stmt();
        self.make_binary(atom, Some(name), stmt)
    }

    fn parse_simple_stmt(&mut self) -> NodeId {
        match self.parse_simple(false) {
            Simple::Stmt(s) => s,
            // Unreachable with `range_ok == false`.
            Simple::Range { x, .. } => x,
        }
    }

    /// Expression, send, inc/dec, assignment or short variable declaration.
    fn parse_simple(&mut self, range_ok: bool) -> Simple {
        let lhs = self.parse_expr_items();
        let tok = self.tok();
        match tok {
            Token::Define | Token::Assign if range_ok => {
                let atom = self.make_atom(tok);
                self.next();
                if self.tok() == Token::Range {
                    self.next();
                    let x = self.parse_expr();
                    if lhs.len() > 2 {
                        self.error(atom.pos, SyntaxErrorKind::Unexpected(Token::Comma));
                    }
                    let value = lhs.get(1).copied().flatten();
                    let assign = self.make_binary(atom, lhs[0], value);
                    return Simple::Range {
                        assign: Some(assign),
                        x,
                    };
                }
                Simple::Stmt(self.finish_assign(atom, lhs))
            }
            _ if tok.is_assign_op() => {
                let atom = self.make_atom(tok);
                self.next();
                Simple::Stmt(self.finish_assign(atom, lhs))
            }
            Token::Arrow => {
                let mut atom = self.make_atom(Token::Arrow);
                let ch = self.wrap_exprs(lhs);
                atom.pos = self.ast.pos(ch);
                self.next();
                let v = self.parse_expr();
                Simple::Stmt(self.make_binary(atom, Some(ch), Some(v)))
            }
            Token::Inc | Token::Dec => {
                let atom = self.make_atom(tok);
                self.next();
                let x = self.wrap_exprs(lhs);
                Simple::Stmt(self.make_unary(atom, Some(x)))
            }
            _ => Simple::Stmt(self.wrap_exprs(lhs)),
        }
    }

    /// `B(tok, lhs, rhs)`; the operator is already consumed.
    fn finish_assign(&mut self, mut atom: Atom, lhs: Children) -> NodeId {
        let x = self.wrap_exprs(lhs);
        atom.pos = self.ast.pos(x);
        let rhs = self.parse_expr_items();
        let y = self.wrap_exprs(rhs);
        self.make_binary(atom, Some(x), Some(y))
    }

    /// `L(IF, [init·, cond, L(BLOCK), else·])`.
    fn parse_if(&mut self) -> NodeId {
        let atom = self.make_atom(Token::If);
        self.next();
        let (init, cond) = self.with_composite(false, |p| {
            if p.tok() == Token::LBrace {
                return (None, p.make_bad(SyntaxErrorKind::MissingCondition));
            }
            let mut init = None;
            let mut cond = None;
            if p.tok() != Token::Semicolon {
                cond = Some(p.parse_simple_stmt());
            }
            if p.tok() == Token::Semicolon {
                p.next();
                init = cond.take();
                if p.tok() != Token::LBrace {
                    cond = Some(p.parse_expr());
                }
            }
            let cond = match cond {
                Some(c) => c,
                None => p.make_bad(SyntaxErrorKind::MissingCondition),
            };
            (init, cond)
        });
        let body = self.parse_block();
        let els = (self.tok() == Token::Else).then(|| {
            self.next();
            match self.tok() {
                Token::If => self.parse_if(),
                Token::LBrace => self.parse_block(),
                _ => self.make_bad(SyntaxErrorKind::Expecting(Token::If)),
            }
        });
        self.make_list(atom, [init, Some(cond), Some(body), els])
    }

    /// `L(FOR, [init·, cond·, post·, L(BLOCK)])` or
    /// `L(RANGE, [assign·, x, L(BLOCK)])`.
    fn parse_for(&mut self) -> NodeId {
        let mut atom = self.make_atom(Token::For);
        self.next();
        let header = self.with_composite(false, |p| -> Result<[Child; 3], (Child, NodeId)> {
            match p.tok() {
                Token::LBrace => return Ok([None; 3]),
                Token::Range => {
                    p.next();
                    return Err((None, p.parse_expr()));
                }
                _ => {}
            }
            let first = if p.tok() == Token::Semicolon {
                None
            } else {
                match p.parse_simple(true) {
                    Simple::Range { assign, x } => return Err((assign, x)),
                    Simple::Stmt(s) => Some(s),
                }
            };
            if p.tok() != Token::Semicolon {
                return Ok([None, first, None]);
            }
            p.next();
            let cond = (p.tok() != Token::Semicolon).then(|| p.parse_expr());
            p.expect(Token::Semicolon);
            let post = (p.tok() != Token::LBrace).then(|| p.parse_simple_stmt());
            Ok([first, cond, post])
        });
        let body = self.parse_block();
        match header {
            Ok([init, cond, post]) => self.make_list(atom, [init, cond, post, Some(body)]),
            Err((assign, x)) => {
                atom.tok = Token::Range;
                self.make_list(atom, [assign, Some(x), Some(body)])
            }
        }
    }

    /// `L(SWITCH|TYPESWITCH, [init·, tag·, L(BLOCK, clauses)])`.
    fn parse_switch(&mut self) -> NodeId {
        let mut atom = self.make_atom(Token::Switch);
        self.next();
        let (init, tag) = self.with_composite(false, |p| {
            if p.tok() == Token::LBrace {
                return (None, None);
            }
            let mut tag = (p.tok() != Token::Semicolon).then(|| p.parse_simple_stmt());
            let mut init = None;
            if p.tok() == Token::Semicolon {
                p.next();
                init = tag.take();
                if p.tok() != Token::LBrace {
                    tag = Some(p.parse_simple_stmt());
                }
            }
            (init, tag)
        });
        if tag.is_some_and(|t| is_type_switch_guard(&self.ast, t)) {
            atom.tok = Token::TypeSwitch;
        }
        let clauses = self.parse_clause_block(|p| p.parse_expr_list());
        self.make_list(atom, [init, tag, Some(clauses)])
    }

    /// `U(SELECT, L(BLOCK, clauses))`.
    fn parse_select(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Select);
        self.next();
        let clauses = self.parse_clause_block(|p| p.parse_simple_stmt());
        self.make_unary(atom, Some(clauses))
    }

    /// `{ case ...: ... default: ... }` as `L(BLOCK)` of
    /// `B(CASE, head, L(BLOCK))` / `B(DEFAULT, ·, L(BLOCK))`.
    fn parse_clause_block(&mut self, head: fn(&mut Self) -> NodeId) -> NodeId {
        let atom = self.make_atom(Token::Block);
        let mut clauses = Children::new();
        self.enter(&mut clauses, Token::LBrace);
        self.with_composite(true, |p| {
            while !matches!(p.tok(), Token::RBrace | Token::Eof) {
                match p.tok() {
                    tok @ (Token::Case | Token::Default) => {
                        let clause_atom = p.make_atom(tok);
                        p.next();
                        let x = (tok == Token::Case).then(|| head(p));
                        let body_atom = p.make_atom(Token::Block);
                        p.expect(Token::Colon);
                        let mut stmts = Children::new();
                        p.parse_stmt_list(&mut stmts);
                        let body = p.make_list(body_atom, stmts);
                        clauses.push(Some(p.make_binary(clause_atom, x, Some(body))));
                    }
                    _ => clauses.push(Some(p.parse_bad(SyntaxErrorKind::Expecting(Token::Case)))),
                }
            }
        });
        self.leave(&mut clauses, Token::RBrace);
        self.make_list(atom, clauses)
    }

    /// `L(RETURN, results)`.
    fn parse_return(&mut self) -> NodeId {
        let atom = self.make_atom(Token::Return);
        self.next();
        let results = if matches!(self.tok(), Token::Semicolon | Token::RBrace | Token::Eof) {
            Children::new()
        } else {
            self.parse_expr_items()
        };
        self.make_list(atom, results)
    }
}

/// `x.(type)` or `v := x.(type)`.
fn is_type_switch_guard(ast: &Ast, n: NodeId) -> bool {
    let is_assert = |n: Child| {
        n.is_some_and(|n| {
            ast.op(n) == Token::TypeAssert
                && ast.children(n).get(1).copied().flatten().is_some_and(|t| ast.op(t) == Token::Type)
        })
    };
    match ast.op(n) {
        Token::TypeAssert => is_assert(Some(n)),
        Token::Define => is_assert(ast.children(n).get(1).copied().flatten()),
        _ => false,
    }
}

fn starts_expr(tok: Token) -> bool {
    tok.is_literal()
        || matches!(
            tok,
            Token::Add
                | Token::Sub
                | Token::Not
                | Token::Xor
                | Token::And
                | Token::Mul
                | Token::Tilde
                | Token::Arrow
                | Token::LParen
                | Token::LBrack
                | Token::Func
                | Token::Struct
                | Token::Map
                | Token::Chan
                | Token::Interface
        )
}
