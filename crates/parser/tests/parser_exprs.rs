// crates/parser/tests/parser_exprs.rs
use gofront_parser::{Mode, Parser};
use pretty_assertions::assert_eq;

fn expr(src: &str) -> String {
    let mut p = Parser::from_source(src, Mode::default());
    let x = p.parse_expression();
    assert!(p.errors().is_empty(), "{src}: {}", p.errors());
    p.ast().render(x)
}

const EXPRS: &[(&str, &str)] = &[
    ("x", "x"),
    ("42", "42"),
    ("'a'", "'a'"),
    ("`raw`", "`raw`"),
    ("a + b * c", "(+ a (* b c))"),
    ("a * b + c", "(+ (* a b) c)"),
    ("a - b - c", "(- (- a b) c)"),
    ("1 << 2 + 3", "(+ (<< 1 2) 3)"),
    ("a || b && c == d", "(|| a (&& b (== c d)))"),
    ("x &^ y | z", "(| (&^ x y) z)"),
    ("(a + b) * c", "(* (( (+ a b)) c)"),
    ("-x.y", "(- (. x y))"),
    ("!*p", "(! (* p))"),
    ("<-ch", "(<- ch)"),
    ("&T{}", "(& (COMPOSITE_LIT T (EXPRS)))"),
    ("f()", "(CALL f)"),
    ("f(a, b...)", "(CALL f a (... b))"),
    ("f(a)(b)", "(CALL (CALL f a) b)"),
    ("x.y.z", "(. (. x y) z)"),
    ("x[i]", "(INDEX x i)"),
    ("m[K, V]", "(INDEX m (EXPRS K V))"),
    ("x[i:j]", "(SLICE x i j nil)"),
    ("x[:]", "(SLICE x nil nil nil)"),
    ("x[:j]", "(SLICE x nil j nil)"),
    ("x[i:j:k]", "(SLICE x i j k)"),
    ("x.(T)", "(TYPE_ASSERT x T)"),
    ("x.(*pkg.T)", "(TYPE_ASSERT x (* (. pkg T)))"),
    ("T{1, 2}", "(COMPOSITE_LIT T (EXPRS 1 2))"),
    ("T{}", "(COMPOSITE_LIT T (EXPRS))"),
    ("[]int{1}", "(COMPOSITE_LIT (ARRAY nil int) (EXPRS 1))"),
    ("[2]int{1, 2,}", "(COMPOSITE_LIT (ARRAY 2 int) (EXPRS 1 2))"),
    (
        "map[string]int{\"a\": 1}",
        "(COMPOSITE_LIT (map string int) (EXPRS (KEY_VALUE \"a\" 1)))",
    ),
    (
        "[...]T{{1}, {2}}",
        "(COMPOSITE_LIT (ARRAY ... T) (EXPRS (COMPOSITE_LIT nil (EXPRS 1)) (COMPOSITE_LIT nil (EXPRS 2))))",
    ),
    ("struct{}{}", "(COMPOSITE_LIT (struct) (EXPRS))"),
    (
        "pkg.Type[int]{}",
        "(COMPOSITE_LIT (INDEX (. pkg Type) int) (EXPRS))",
    ),
    (
        "func(x int) int { return x }",
        "(LAMBDA (func (PARAMS (FIELD (NAMES x) int nil)) (RESULTS (FIELD nil int nil))) (BLOCK (return x)))",
    ),
    ("func()", "(func (PARAMS) (RESULTS))"),
    ("<-chan int(nil)", "(CALL (RECV_DIR int) nil)"),
    ("chan<- int", "(SEND_DIR int)"),
    ("chan int", "(BOTH_DIR int)"),
    ("[]chan<- int(nil)", "(CALL (ARRAY nil (SEND_DIR int)) nil)"),
];

#[test]
fn expressions_render() {
    for (src, want) in EXPRS {
        assert_eq!(expr(src), *want, "{src}");
    }
}

#[test]
fn node_positions_cover_the_source() {
    let src = "f(a) + b[1]";
    let mut p = Parser::from_source(src, Mode::default());
    let x = p.parse_expression();
    let ast = p.ast();
    assert_eq!(ast.pos(x).offset(), 5);
    let [Some(call), Some(index)] = ast.children(x) else {
        panic!("binary children: {:?}", ast.children(x));
    };
    assert_eq!(ast.pos(*call).offset(), 0);
    assert_eq!(ast.pos(*index).offset(), 7);
    assert_eq!(ast.lit(ast.children(*index)[1].unwrap()), "1");
}

#[test]
fn children_are_addressable() {
    let mut p = Parser::from_source("x[i:j]", Mode::default());
    let x = p.parse_expression();
    let ast = p.ast();
    assert_eq!(ast.len(x), 4);
    assert!(ast.at(x, 3).unwrap().is_none());
    assert!(ast.at(x, 4).is_err());
}
