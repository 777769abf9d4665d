// fuzz_targets/parser.rs
#![no_main]

use gofront_parser::walk::find_bad;
use gofront_parser::{File, Mode, Parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut p = Parser::default();
    p.set_max_errors(0);
    p.init(File::new("", 0), data, Mode::ALL);
    let root = p.parse_file();

    // Every Bad node was reported, so a clean parse has none.
    if p.errors().is_empty() {
        assert!(find_bad(p.ast(), root).is_empty());
    }
    let _ = p.ast().render(root);
});
