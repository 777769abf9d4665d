// crates/parser/tests/parser_stmts.rs
use gofront_parser::{Mode, Parser, Token};
use pretty_assertions::assert_eq;

/// Parses `src` as a single top-level statement.
fn stmt(src: &str) -> String {
    let mut p = Parser::from_source(src, Mode::default());
    let Some(s) = p.parse() else {
        panic!("{src}: empty statement");
    };
    assert!(p.errors().is_empty(), "{src}: {}", p.errors());
    p.ast().render(s)
}

#[rustfmt::skip]
const SIMPLE: &[(&str, &str)] = &[
    ("x := 1", "(:= x 1)"),
    ("a, b = b, a", "(= (EXPRS a b) (EXPRS b a))"),
    ("x += 2", "(+= x 2)"),
    ("x <<= n", "(<<= x n)"),
    ("x++", "(++ x)"),
    ("p.n--", "(-- (. p n))"),
    ("ch <- v", "(<- ch v)"),
    ("f(x)", "(CALL f x)"),
    ("go f()", "(go (CALL f))"),
    ("defer mu.Unlock()", "(defer (CALL (. mu Unlock)))"),
    ("return", "(return)"),
    ("return a, b", "(return a b)"),
    ("break", "(break nil)"),
    ("continue L", "(continue L)"),
    ("goto done", "(goto done)"),
    ("fallthrough", "fallthrough"),
    ("L: x++", "(LABEL L (++ x))"),
    ("{ x; y }", "(BLOCK x y)"),
    ("var x, y int = 1, 2", "(var (VALUE_SPEC (NAMES x y) int (EXPRS 1 2)))"),
    ("const c = 1", "(const (VALUE_SPEC (NAMES c) nil (EXPRS 1)))"),
];

#[test]
fn simple_statements() {
    for (src, want) in SIMPLE {
        assert_eq!(stmt(src), *want, "{src}");
    }
}

#[test]
fn if_statements() {
    assert_eq!(stmt("if x {}"), "(if nil x (BLOCK) nil)");
    assert_eq!(stmt("if x == T {}"), "(if nil (== x T) (BLOCK) nil)");
    assert_eq!(
        stmt("if v := f(); v > 0 { return } else if v < 0 {} else {}"),
        "(if (:= v (CALL f)) (> v 0) (BLOCK (return)) (if nil (< v 0) (BLOCK) (BLOCK)))"
    );
    // Composite literals are allowed inside parentheses in a header.
    assert_eq!(
        stmt("if x == (T{}) {}"),
        "(if nil (== x (( (COMPOSITE_LIT T (EXPRS)))) (BLOCK) nil)"
    );
}

#[test]
fn for_statements() {
    assert_eq!(stmt("for {}"), "(for nil nil nil (BLOCK))");
    assert_eq!(stmt("for x < 10 {}"), "(for nil (< x 10) nil (BLOCK))");
    assert_eq!(
        stmt("for i := 0; i < n; i++ { f(i) }"),
        "(for (:= i 0) (< i n) (++ i) (BLOCK (CALL f i)))"
    );
    assert_eq!(stmt("for ;; {}"), "(for nil nil nil (BLOCK))");
    assert_eq!(
        stmt("for _, v := range []int{1, 2} {}"),
        "(range (:= _ v) (COMPOSITE_LIT (ARRAY nil int) (EXPRS 1 2)) (BLOCK))"
    );
}

#[test]
fn range_forms() {
    assert_eq!(stmt("for k, v := range m {}"), "(range (:= k v) m (BLOCK))");
    assert_eq!(stmt("for i := range 10 {}"), "(range (:= i nil) 10 (BLOCK))");
    assert_eq!(stmt("for k = range m {}"), "(range (= k nil) m (BLOCK))");
    assert_eq!(stmt("for range ch {}"), "(range nil ch (BLOCK))");
}

#[test]
fn switch_statements() {
    assert_eq!(
        stmt("switch x { case 1, 2: f(); default: }"),
        "(switch nil x (BLOCK (case (EXPRS 1 2) (BLOCK (CALL f))) (default nil (BLOCK))))"
    );
    assert_eq!(stmt("switch {}"), "(switch nil nil (BLOCK))");
    assert_eq!(
        stmt("switch x := f(); x {}"),
        "(switch (:= x (CALL f)) x (BLOCK))"
    );
    assert_eq!(
        stmt("switch v := x.(type) { case int, string: }"),
        "(TYPESWITCH nil (:= v (TYPE_ASSERT x type)) (BLOCK (case (EXPRS int string) (BLOCK))))"
    );
    assert_eq!(
        stmt("switch x.(type) {}"),
        "(TYPESWITCH nil (TYPE_ASSERT x type) (BLOCK))"
    );
}

#[test]
fn select_statement() {
    assert_eq!(
        stmt("select { case v := <-ch: use(v); case ch <- 1: default: }"),
        "(select (BLOCK (case (:= v (<- ch)) (BLOCK (CALL use v))) (case (<- ch 1) (BLOCK)) (default nil (BLOCK))))"
    );
}

#[test]
fn statements_inside_a_function() {
    let src = "package p\n\
               func f() {\n\
               \tx := 1\n\
               \tif x > 0 {\n\
               \t\tx--\n\
               \t}\n\
               \treturn\n\
               }\n";
    let mut p = Parser::from_source(src, Mode::default());
    let file = p.parse_file();
    assert!(p.errors().is_empty(), "{}", p.errors());
    let ast = p.ast();
    let func = ast.children(file)[1].unwrap();
    assert_eq!(ast.op(func), Token::Func);
    let body = ast.children(func)[3].unwrap();
    assert_eq!(
        ast.render(body),
        "(BLOCK (:= x 1) (if nil (> x 0) (BLOCK (-- x)) nil) (return))"
    );
}

#[test]
fn empty_statements_are_skipped() {
    let mut p = Parser::from_source("package p\nfunc f() { ;; x++; ; }\n", Mode::default());
    let file = p.parse_file();
    assert!(p.errors().is_empty(), "{}", p.errors());
    let func = p.ast().children(file)[1].unwrap();
    let body = p.ast().children(func)[3].unwrap();
    assert_eq!(p.ast().render(body), "(BLOCK (++ x))");
}
