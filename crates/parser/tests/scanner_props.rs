// crates/parser/tests/scanner_props.rs
use gofront_parser::{File, Scanner, Token};
use proptest::prelude::*;

fn tokens(src: &[u8]) -> Vec<(Token, String, usize, usize)> {
    let mut sc = Scanner::new(File::new("", 0), src);
    let mut out = Vec::new();
    // Every scan consumes input or emits a semicolon, so this bound is loose.
    for _ in 0..src.len() * 4 + 64 {
        let (tok, lit) = sc.scan();
        if tok == Token::Eof {
            return out;
        }
        let (pos, end) = sc.pos_end();
        out.push((tok, lit, pos.offset(), end.offset()));
    }
    panic!("scanner did not reach EOF for {:?}", String::from_utf8_lossy(src));
}

/// Go-flavored input: mostly tokens, with the odd stray byte.
fn go_ish() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("x".to_string()),
        Just("func".to_string()),
        Just("return".to_string()),
        Just("0x1p-2".to_string()),
        Just("1_0".to_string()),
        Just(".5".to_string()),
        Just("\"s\\n\"".to_string()),
        Just("`raw`".to_string()),
        Just("'c'".to_string()),
        Just("/* c\n */".to_string()),
        Just("// c".to_string()),
        Just("\n".to_string()),
        Just("\r\n".to_string()),
        Just(" ".to_string()),
        Just("...".to_string()),
        Just("&^=".to_string()),
        Just("<-".to_string()),
        Just("}".to_string()),
        Just(")".to_string()),
        Just("++".to_string()),
        Just("\"".to_string()),
        Just("'".to_string()),
        Just("/*".to_string()),
        Just("#".to_string()),
        "[a-z0-9_.]{1,4}",
    ];
    prop::collection::vec(piece, 0..40).prop_map(|v| v.concat())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn never_panics_and_progresses(s in ".*") {
        let mut last_real_end = 0usize;
        for (tok, _, start, end) in tokens(s.as_bytes()) {
            prop_assert!(start <= end, "start>end: ({start},{end}) tok={tok:?} input={s:?}");
            prop_assert!(end <= s.len(), "end out of bounds: {end} tok={tok:?} input={s:?}");

            let injected_semi = tok == Token::Semicolon && start == end;
            prop_assert!(
                start >= last_real_end,
                "moved backwards: start={start} < {last_real_end} tok={tok:?} input={s:?}"
            );
            if !injected_semi {
                last_real_end = end;
            }
        }
    }

    #[test]
    fn arbitrary_bytes_terminate(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let toks = tokens(&bytes);
        for (_, _, start, end) in toks {
            prop_assert!(start <= end && end <= bytes.len());
        }
    }

    #[test]
    fn go_ish_input_is_deterministic(s in go_ish()) {
        let first = tokens(s.as_bytes());
        let second = tokens(s.as_bytes());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn literal_text_is_the_source_slice(s in go_ish()) {
        for (tok, lit, start, end) in tokens(s.as_bytes()) {
            if tok.is_literal() || tok == Token::Comment {
                prop_assert_eq!(&s[start..end], lit.as_str(), "tok={:?} input={:?}", tok, s);
            }
        }
    }

    #[test]
    fn no_semicolon_without_a_line_end(s in "[a-z0-9 ()+]{0,40}") {
        for (tok, _, _, _) in tokens(s.as_bytes()) {
            prop_assert_ne!(tok, Token::Semicolon, "input={:?}", s);
        }
    }
}
