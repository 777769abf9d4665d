use gofront::{parse_named, Resolver, TypeTable};
use walkdir::WalkDir;

/// Parses every `.go` file under `GOFRONT_CORPUS` (e.g. `$GOROOT/src`) and
/// resolves its declarations. Parse diagnostics fail the test; resolver
/// diagnostics are expected, contract failures are not.
#[test]
fn parses_go_corpus_if_configured() {
    let Some(root) = std::env::var_os("GOFRONT_CORPUS") else {
        eprintln!("GOFRONT_CORPUS not set; skipping corpus test");
        return;
    };

    let root = root.to_string_lossy().to_string();
    let table = TypeTable::default();
    let mut total = 0usize;
    let mut diagnostics = 0usize;

    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        // testdata holds deliberately broken sources.
        if path.to_string_lossy().contains("testdata") {
            continue;
        }

        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => continue,
        };
        total += 1;

        let name = path.to_string_lossy();
        let parsed = match parse_named(&name, &src) {
            Ok(parsed) => parsed,
            Err(f) => {
                eprintln!("FAILED: {}", path.display());
                for d in f.diags.iter().take(8) {
                    eprintln!("  {d}");
                }
                panic!("Go corpus parse failed after {total} files");
            }
        };

        let mut resolver = Resolver::new(&table);
        if let Err(err) = resolver.resolve(&parsed) {
            panic!("{}: {err}", path.display());
        }
        diagnostics += resolver.errors().len();
    }

    eprintln!("Parsed {total} Go files ({diagnostics} resolver diagnostics).");
}
