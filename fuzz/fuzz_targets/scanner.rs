// fuzz_targets/scanner.rs
#![no_main]

use gofront_parser::{File, Scanner, Token};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Raw bytes: invalid UTF-8 goes through the reader's replacement path.
    let mut sc = Scanner::new(File::new("", 0), data);

    let mut last_real_end = 0usize;
    let mut steps = 0usize;
    let max_steps = data.len().saturating_mul(4) + 64;

    loop {
        let (tok, _) = sc.scan();
        if tok == Token::Eof {
            break;
        }
        let (pos, end) = sc.pos_end();
        let (start, end) = (pos.offset(), end.offset());
        assert!(start <= end);
        assert!(end <= data.len());

        let injected = tok == Token::Semicolon && start == end;
        assert!(start >= last_real_end);
        if !injected {
            last_real_end = end;
        }

        steps += 1;
        assert!(steps <= max_steps);
    }
});
