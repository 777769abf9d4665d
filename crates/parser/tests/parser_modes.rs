// crates/parser/tests/parser_modes.rs
use gofront_parser::{Mode, Parser, Token};

const SRC: &str = "// Package p does things.\n\
                   package p\n\
                   \n\
                   import \"fmt\"\n\
                   \n\
                   // x counts.\n\
                   /* really */\n\
                   var x int\n\
                   \n\
                   func f() { fmt.Println(x) }\n";

#[test]
fn default_mode() {
    assert_eq!(Mode::default(), Mode::IMPORTS | Mode::DECLS);
    assert!(Mode::ALL.contains(Mode::COMMENTS));
}

#[test]
fn imports_can_be_dropped() {
    let mut p = Parser::from_source(SRC, Mode::DECLS);
    let file = p.parse_file();
    assert!(p.errors().is_empty(), "{}", p.errors());
    let ops: Vec<Token> = p.ast().children(file).iter().flatten().map(|&d| p.ast().op(d)).collect();
    assert_eq!(ops, [Token::Package, Token::Var, Token::Func]);
}

#[test]
fn imports_only_stops_at_the_first_declaration() {
    let mut p = Parser::from_source("package p\nimport \"fmt\"\nvar x int\n", Mode::IMPORTS);
    assert_eq!(p.mode(), Mode::IMPORTS);
    let mut ops = Vec::new();
    for _ in 0..4 {
        ops.push(p.parse().map(|n| p.ast().op(n)));
    }
    assert_eq!(
        ops,
        [Some(Token::Package), Some(Token::Import), Some(Token::Eof), Some(Token::Eof)]
    );

    let mut p = Parser::from_source(SRC, Mode::IMPORTS);
    let file = p.parse_file();
    assert!(p.errors().is_empty(), "{}", p.errors());
    assert_eq!(p.ast().render(file), "(FILE (package p) (import (IMPORT_SPEC nil \"fmt\")))");
}

#[test]
fn empty_mode_reads_only_the_package_clause() {
    let mut p = Parser::from_source(SRC, Mode::empty());
    let file = p.parse_file();
    assert!(p.errors().is_empty(), "{}", p.errors());
    assert_eq!(p.ast().render(file), "(FILE (package p))");
}

#[test]
fn skipped_imports_read_as_empty_items() {
    let mut p = Parser::from_source("package p\nimport \"fmt\"\nvar x int\n", Mode::DECLS);
    assert_eq!(p.parse().map(|n| p.ast().op(n)), Some(Token::Package));
    assert_eq!(p.parse(), None);
    assert_eq!(p.parse().map(|n| p.ast().op(n)), Some(Token::Var));
}

#[test]
fn parse_returns_items_one_by_one() {
    let mut p = Parser::from_source("package p\n;\nvar x int\n", Mode::default());
    let mut ops = Vec::new();
    loop {
        match p.parse() {
            Some(n) if p.ast().op(n) == Token::Eof => break,
            Some(n) => ops.push(p.ast().op(n)),
            None => ops.push(Token::Semicolon),
        }
    }
    assert_eq!(ops, [Token::Package, Token::Semicolon, Token::Var]);
}

#[test]
fn comments_attach_to_the_next_node() {
    let mut p = Parser::from_source(SRC, Mode::ALL);
    let file = p.parse_file();
    assert!(p.errors().is_empty(), "{}", p.errors());
    let ast = p.ast();
    let decls: Vec<_> = ast.children(file).iter().flatten().copied().collect();

    assert_eq!(ast.node(decls[0]).atom.comments, ["// Package p does things."]);
    assert!(ast.node(decls[1]).atom.comments.is_empty());
    assert_eq!(ast.node(decls[2]).atom.comments, ["// x counts.", "/* really */"]);
    assert!(ast.node(decls[3]).atom.comments.is_empty());
}

#[test]
fn comments_are_dropped_without_the_flag() {
    let mut p = Parser::from_source(SRC, Mode::default());
    let file = p.parse_file();
    let ast = p.ast();
    let any = ast
        .children(file)
        .iter()
        .flatten()
        .any(|&d| !ast.node(d).atom.comments.is_empty());
    assert!(!any);
}

#[test]
fn lookahead_is_exposed() {
    let mut p = Parser::from_source("package p", Mode::default());
    assert_eq!(p.curr_token(), Token::Package);
    p.skip_token();
    assert_eq!(p.curr_token(), Token::Ident);
    p.skip_token();
    assert_eq!(p.curr_token(), Token::Eof);
}

#[test]
fn into_parts_hands_back_everything() {
    let mut p = Parser::new(gofront_parser::File::new("m.go", 0), "package m\nvar = 1\n".as_bytes(), Mode::default());
    let file = p.parse_file();
    let (ast, f, errors) = p.into_parts();
    assert_eq!(ast.op(file), Token::File);
    assert_eq!(f.name(), "m.go");
    assert_eq!(f.line_count(), 3);
    assert_eq!(errors.to_string(), "m.go:2:5: expecting identifier");
}
