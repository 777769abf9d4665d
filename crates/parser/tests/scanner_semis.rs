// crates/parser/tests/scanner_semis.rs
use gofront_parser::{File, Scanner, Token};

fn scan_all(input: &str) -> Vec<(Token, usize)> {
    let mut sc = Scanner::new(File::new("", 0), input.as_bytes());
    let mut out = Vec::new();
    loop {
        let (tok, _) = sc.scan();
        if tok == Token::Eof {
            return out;
        }
        out.push((tok, sc.pos_end().0.offset()));
    }
}

fn names(input: &str) -> String {
    scan_all(input)
        .iter()
        .map(|(t, _)| t.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Offsets of the semicolons that were inserted (no `;` in the source).
fn injected_semis(input: &str) -> Vec<usize> {
    scan_all(input)
        .into_iter()
        .filter(|&(t, pos)| t == Token::Semicolon && input.as_bytes().get(pos) != Some(&b';'))
        .map(|(_, pos)| pos)
        .collect()
}

struct SemiCase {
    input: &'static str,
    want: &'static str,
}

#[rustfmt::skip]
const SEMICOLON_TESTS: &[SemiCase] = &[
    SemiCase { input: "", want: "" },
    SemiCase { input: "\u{FEFF};", want: ";" }, // leading BOM is dropped
    SemiCase { input: ";", want: ";" },

    SemiCase { input: "foo\n", want: "IDENT ;" },
    SemiCase { input: "123\n", want: "INT ;" },
    SemiCase { input: "1.2\n", want: "FLOAT ;" },
    SemiCase { input: "1i\n", want: "IMAG ;" },
    SemiCase { input: "'x'\n", want: "CHAR ;" },
    SemiCase { input: "\"x\"\n", want: "STRING ;" },
    SemiCase { input: "`x`\n", want: "STRING ;" },

    SemiCase { input: "+\n", want: "+" },
    SemiCase { input: "-\n", want: "-" },
    SemiCase { input: "*\n", want: "*" },
    SemiCase { input: "/\n", want: "/" },
    SemiCase { input: "%\n", want: "%" },

    SemiCase { input: "&\n", want: "&" },
    SemiCase { input: "|\n", want: "|" },
    SemiCase { input: "^\n", want: "^" },
    SemiCase { input: "<<\n", want: "<<" },
    SemiCase { input: ">>\n", want: ">>" },
    SemiCase { input: "&^\n", want: "&^" },

    SemiCase { input: "+=\n", want: "+=" },
    SemiCase { input: "-=\n", want: "-=" },
    SemiCase { input: "*=\n", want: "*=" },
    SemiCase { input: "/=\n", want: "/=" },
    SemiCase { input: "%=\n", want: "%=" },

    SemiCase { input: "&=\n", want: "&=" },
    SemiCase { input: "|=\n", want: "|=" },
    SemiCase { input: "^=\n", want: "^=" },
    SemiCase { input: "<<=\n", want: "<<=" },
    SemiCase { input: ">>=\n", want: ">>=" },
    SemiCase { input: "&^=\n", want: "&^=" },

    SemiCase { input: "&&\n", want: "&&" },
    SemiCase { input: "||\n", want: "||" },
    SemiCase { input: "<-\n", want: "<-" },
    SemiCase { input: "++\n", want: "++ ;" },
    SemiCase { input: "--\n", want: "-- ;" },

    SemiCase { input: "==\n", want: "==" },
    SemiCase { input: "<\n", want: "<" },
    SemiCase { input: ">\n", want: ">" },
    SemiCase { input: "=\n", want: "=" },
    SemiCase { input: "!\n", want: "!" },

    SemiCase { input: "!=\n", want: "!=" },
    SemiCase { input: "<=\n", want: "<=" },
    SemiCase { input: ">=\n", want: ">=" },
    SemiCase { input: ":=\n", want: ":=" },
    SemiCase { input: "...\n", want: "..." },

    SemiCase { input: "(\n", want: "(" },
    SemiCase { input: "[\n", want: "[" },
    SemiCase { input: "{\n", want: "{" },
    SemiCase { input: ",\n", want: "," },
    SemiCase { input: ".\n", want: "." },

    SemiCase { input: ")\n", want: ") ;" },
    SemiCase { input: "]\n", want: "] ;" },
    SemiCase { input: "}\n", want: "} ;" },
    SemiCase { input: ";\n", want: ";" },
    SemiCase { input: ":\n", want: ":" },
    SemiCase { input: "~\n", want: "~" },

    SemiCase { input: "break\n", want: "break ;" },
    SemiCase { input: "case\n", want: "case" },
    SemiCase { input: "chan\n", want: "chan" },
    SemiCase { input: "const\n", want: "const" },
    SemiCase { input: "continue\n", want: "continue ;" },

    SemiCase { input: "default\n", want: "default" },
    SemiCase { input: "defer\n", want: "defer" },
    SemiCase { input: "else\n", want: "else" },
    SemiCase { input: "fallthrough\n", want: "fallthrough ;" },
    SemiCase { input: "for\n", want: "for" },

    SemiCase { input: "func\n", want: "func" },
    SemiCase { input: "go\n", want: "go" },
    SemiCase { input: "goto\n", want: "goto" },
    SemiCase { input: "if\n", want: "if" },
    SemiCase { input: "import\n", want: "import" },

    SemiCase { input: "interface\n", want: "interface" },
    SemiCase { input: "map\n", want: "map" },
    SemiCase { input: "package\n", want: "package" },
    SemiCase { input: "range\n", want: "range" },
    SemiCase { input: "return\n", want: "return ;" },

    SemiCase { input: "select\n", want: "select" },
    SemiCase { input: "struct\n", want: "struct" },
    SemiCase { input: "switch\n", want: "switch" },
    SemiCase { input: "type\n", want: "type" },
    SemiCase { input: "var\n", want: "var" },

    SemiCase { input: "foo//comment\n", want: "IDENT COMMENT ;" },
    SemiCase { input: "foo/*comment*/\n", want: "IDENT COMMENT ;" },
    SemiCase { input: "foo/*comment*/    \n", want: "IDENT COMMENT ;" },
    SemiCase { input: "foo    // comment\n", want: "IDENT COMMENT ;" },
    SemiCase { input: "foo    /*comment*/\n", want: "IDENT COMMENT ;" },

    // A comment spanning lines acts as a newline; the semicolon comes first.
    SemiCase { input: "foo/*\n*/\n", want: "IDENT ; COMMENT" },
    SemiCase { input: "foo    /*\n*/\n", want: "IDENT ; COMMENT" },
    SemiCase { input: "foo/*\n*/bar\n", want: "IDENT ; COMMENT IDENT ;" },
    SemiCase { input: "if/*\n*/x\n", want: "if COMMENT IDENT ;" },

    SemiCase { input: "x\n\n\ny\n", want: "IDENT ; IDENT ;" },
    SemiCase {
        input: "package main\n\nfunc main() {\n\tif {\n\t\treturn /* */ }\n}\n",
        want: "package IDENT ; func IDENT ( ) { if { return COMMENT } ; } ;",
    },
];

#[test]
fn semicolons_table() {
    for t in SEMICOLON_TESTS {
        let got = names(t.input);
        assert_eq!(got, t.want, "input=<<{}>>", t.input.escape_debug());
    }
}

#[test]
fn no_semicolon_at_eof() {
    assert_eq!(names("package main"), "package IDENT");
    assert_eq!(names("foo//comment"), "IDENT COMMENT");
    assert_eq!(names("x++"), "IDENT ++");
    assert_eq!(names("foo/*\n*/"), "IDENT ; COMMENT");
}

#[test]
fn semicolon_sits_on_the_newline() {
    assert_eq!(injected_semis("x\ny"), vec![1]);
    assert_eq!(injected_semis("x\ny\n"), vec![1, 3]);
    assert_eq!(injected_semis("x  \ny"), vec![3]);
}

#[test]
fn semicolon_before_crlf() {
    assert_eq!(injected_semis("x\r\ny\r\n"), vec![2, 5]);
}

#[test]
fn multiline_comment_semicolon_sits_on_its_newline() {
    assert_eq!(injected_semis("x/*\n*/y"), vec![3]);
    assert_eq!(injected_semis("x /* a\nb\nc */ y"), vec![6]);
}

#[test]
fn line_comment_does_not_hide_the_last_token() {
    assert_eq!(injected_semis("x//c\ny"), vec![4]);
    assert_eq!(injected_semis("x // c\r\ny"), vec![7]);
}

#[test]
fn after_keywords_and_closers() {
    assert_eq!(injected_semis("break\nx"), vec![5]);
    assert_eq!(injected_semis("continue\nx"), vec![8]);
    assert_eq!(injected_semis("fallthrough\nx"), vec![11]);
    assert_eq!(injected_semis("return\nx"), vec![6]);
    assert_eq!(injected_semis("f()\ng[0]\n{}\n"), vec![3, 8, 11]);
}

#[test]
fn many_semis_mixed() {
    let src = r#"
package p
func f() {
    x := 1
    x++
    if x > 0 {
        return
    } else {
        x--
    }
}
"#;
    // p, 1, x++, return, x--, and the two closing braces.
    assert_eq!(injected_semis(src).len(), 7);
}

#[test]
fn comment_newline_equivalence() {
    let a = injected_semis("x/*\n*/y");
    let b = injected_semis("x\ny");
    assert_eq!(a.len(), b.len());
}
