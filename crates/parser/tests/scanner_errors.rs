// crates/parser/tests/scanner_errors.rs
//
// Error rows after go/scanner's TestScanErrors: the first token and the
// first diagnostic for each malformed input.

use gofront_parser::{DiagKind, File, Pos, Scanner, Token};

fn scan(input: &[u8]) -> (Vec<(Token, String)>, Scanner) {
    let mut sc = Scanner::new(File::new("", 0), input);
    let mut toks = Vec::new();
    loop {
        let (tok, lit) = sc.scan();
        if tok == Token::Eof {
            return (toks, sc);
        }
        toks.push((tok, lit));
    }
}

struct Row {
    src: &'static str,
    tok: Token,
    /// Offset of the first error.
    pos: usize,
    err: &'static str,
}

#[rustfmt::skip]
const ERRORS: &[Row] = &[
    Row { src: "\u{0007}", tok: Token::Illegal, pos: 0, err: "invalid character" },
    Row { src: "#", tok: Token::Illegal, pos: 0, err: "invalid character" },
    Row { src: "x …", tok: Token::Ident, pos: 2, err: "invalid character" },
    Row { src: "package\u{000B} p", tok: Token::Package, pos: 7, err: "invalid character" },
    Row { src: "package\u{000C} p", tok: Token::Package, pos: 7, err: "invalid character" },
    Row { src: "x\u{FEFF}", tok: Token::Ident, pos: 1, err: "invalid BOM in the middle of the file" },

    Row { src: "''", tok: Token::Char, pos: 0, err: "invalid rune literal" },
    Row { src: "'12'", tok: Token::Char, pos: 0, err: "invalid rune literal" },
    Row { src: r"'\0'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\07'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\8'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\x0g'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\u000'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\U0000000'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\Uffffffff'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: r"'\uD800'", tok: Token::Char, pos: 0, err: "invalid escape sequence" },
    Row { src: "'", tok: Token::Char, pos: 0, err: "rune literal not terminated" },
    Row { src: r"'\", tok: Token::Char, pos: 0, err: "rune literal not terminated" },
    Row { src: "'\n", tok: Token::Char, pos: 0, err: "rune literal not terminated" },

    Row { src: "\"abc", tok: Token::String, pos: 0, err: "string literal not terminated" },
    Row { src: "\"abc\n", tok: Token::String, pos: 0, err: "string literal not terminated" },
    Row { src: r#""\q""#, tok: Token::String, pos: 0, err: "invalid escape sequence" },
    Row { src: r#""\'""#, tok: Token::String, pos: 0, err: "invalid escape sequence" },
    Row { src: "`", tok: Token::String, pos: 0, err: "string literal not terminated" },
    Row { src: "x `abc\ndef", tok: Token::Ident, pos: 2, err: "string literal not terminated" },

    Row { src: "/*", tok: Token::Comment, pos: 0, err: "comment not terminated" },
    Row { src: "/**", tok: Token::Comment, pos: 0, err: "comment not terminated" },
    Row { src: "x /* a\n", tok: Token::Ident, pos: 2, err: "comment not terminated" },

    Row { src: "078", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "0x", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "0b12", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "0o8", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "1__2", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "1_", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "1e", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "1e+", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "0x1.8", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "0b1.0", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "1p3", tok: Token::Illegal, pos: 0, err: "invalid number literal" },
    Row { src: "a = 0x_", tok: Token::Ident, pos: 4, err: "invalid number literal" },
];

#[test]
fn error_rows() {
    for row in ERRORS {
        let (toks, sc) = scan(row.src.as_bytes());
        let src = row.src.escape_debug();
        assert_eq!(toks.first().map(|t| t.0), Some(row.tok), "src=<<{src}>> toks={toks:?}");
        let Some(first) = sc.errors().first() else {
            panic!("src=<<{src}>>: no error reported");
        };
        assert_eq!(first.kind, DiagKind::Lex);
        assert_eq!(first.msg, row.err, "src=<<{src}>>");
        assert_eq!(first.pos.offset(), row.pos, "src=<<{src}>>");
    }
}

#[test]
fn malformed_literals_keep_their_text() {
    let (toks, _) = scan(b"\"abc\nx");
    assert_eq!(toks[0], (Token::String, "\"abc".to_string()));
    // The newline still ends the statement.
    assert_eq!(toks[1].0, Token::Semicolon);
    assert_eq!(toks[2], (Token::Ident, "x".to_string()));

    let (toks, _) = scan(b"0b12");
    assert_eq!(toks, [(Token::Illegal, "0b12".to_string())]);

    let (toks, _) = scan(b"#");
    assert_eq!(toks, [(Token::Illegal, "#".to_string())]);
}

#[test]
fn two_periods_are_not_an_error() {
    let (toks, sc) = scan(b"..");
    assert!(sc.errors().is_empty());
    assert_eq!(toks.len(), 2);
    assert!(toks.iter().all(|t| t.0 == Token::Period));
}

#[test]
fn invalid_utf8_is_reported_once() {
    let (toks, sc) = scan(b"x\xffy");
    assert_eq!(sc.errors().len(), 1, "{:?}", sc.errors());
    let err = &sc.errors()[0];
    assert_eq!(err.msg, "invalid UTF-8 encoding");
    assert_eq!(err.pos.offset(), 1);
    assert_eq!(toks.len(), 3);
    assert_eq!(toks[1].0, Token::Illegal);
    assert_eq!(toks[2], (Token::Ident, "y".to_string()));
}

#[test]
fn offsets_after_invalid_bytes_are_file_offsets() {
    // The replacement char is 3 bytes in the decoded text but 1 in the file.
    let (_, sc) = scan(b"\xff #");
    let offsets: Vec<usize> = sc.errors().iter().map(|e| e.pos.offset()).collect();
    assert_eq!(offsets, [0, 2]);
}

#[test]
fn error_budget_stops_reporting() {
    let src = "# ".repeat(20);
    let (toks, sc) = scan(src.as_bytes());
    assert_eq!(toks.len(), 20);
    assert_eq!(sc.errors().len(), 11);
    assert_eq!(sc.errors()[10].msg, "too many errors");
    assert_eq!(sc.errors()[10].pos, sc.errors()[9].pos);

    let mut sc = Scanner::default();
    sc.set_max_errors(0);
    sc.init(File::new("", 0), src.as_bytes());
    while sc.scan().0 != Token::Eof {}
    assert_eq!(sc.errors().len(), 20);
}

#[test]
fn invalid_bytes_over_budget_stop_decoding() {
    let (toks, sc) = scan(&[0xff; 30]);
    assert_eq!(sc.errors().len(), 11);
    assert_eq!(sc.errors().last().map(|e| e.msg.as_str()), Some("too many errors"));
    assert!(toks.len() <= 10, "{toks:?}");
    assert!(toks.iter().all(|t| t.0 == Token::Illegal));
}

#[test]
fn raising_the_budget_after_init_decodes_again() {
    let mut src = b"x ".to_vec();
    src.extend([0xff; 12]);
    src.extend(b"\ny\n");
    let mut sc = Scanner::new(File::new("", 0), &src[..]);
    sc.set_max_errors(0);
    let mut idents = Vec::new();
    loop {
        let (tok, lit) = sc.scan();
        match tok {
            Token::Eof => break,
            Token::Ident => idents.push(lit),
            _ => {}
        }
    }
    assert_eq!(idents, ["x", "y"]);
    assert_eq!(sc.errors().len(), 12);
    assert!(sc.errors().iter().all(|e| e.msg == "invalid UTF-8 encoding"));
}

#[test]
fn diagnostics_carry_positions() {
    let mut sc = Scanner::new(File::new("a.go", 0), "x\n  #".as_bytes());
    while sc.scan().0 != Token::Eof {}
    assert_eq!(sc.errors()[0].to_string(), "a.go:2:3: invalid character");

    sc.error(Pos::new(0), "custom");
    assert_eq!(sc.errors().len(), 2);
    assert_eq!(sc.errors()[1].to_string(), "a.go:1:1: custom");

    sc.clear_errors();
    assert!(sc.errors().is_empty());
}
