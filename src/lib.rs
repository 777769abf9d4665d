//! Go-like language front-end.
//!
//! - [`gofront_parser`] scans with automatic semicolon insertion and parses
//!   into a generic AST.
//! - [`gofront_types`] interns structural types and answers identity,
//!   assignability, convertibility and interface questions.
//! - [`resolver`] binds top-level declarations to [`resolver::Object`]s and
//!   resolves type expressions through a [`TypeTable`].

pub mod error;
pub mod resolver;

// Re-exports for convenience
pub use gofront_parser as syntax;
pub use gofront_parser::{Ast, ErrorList, File, Mode, NodeId, Parser, Token};
pub use gofront_types as types;
pub use gofront_types::{Type, TypeTable};

pub use error::{ParseFailure, ResolveError};
pub use resolver::{ConstValue, ObjClass, Object, Resolver};

/// A parsed source file: the tree, its position table and the `FILE` root.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub ast: Ast,
    pub file: File,
    pub root: NodeId,
}

impl ParsedFile {
    /// Top-level nodes under the `FILE` root.
    pub fn decls(&self) -> Vec<NodeId> {
        self.ast.children(self.root).iter().flatten().copied().collect()
    }

    pub fn render(&self) -> String {
        self.ast.render(self.root)
    }
}

/// Parse a Go source file with the default mode.
///
/// Returns the tree, or a `ParseFailure` carrying the partial tree and the
/// collected diagnostics.
pub fn parse_source(input: &str) -> Result<ParsedFile, ParseFailure> {
    parse_named("", input)
}

/// Like [`parse_source`], with a file name for diagnostic positions.
pub fn parse_named(name: &str, input: &str) -> Result<ParsedFile, ParseFailure> {
    let mut parser = Parser::new(File::new(name, 0), input.as_bytes(), Mode::default());
    let root = parser.parse_file();
    let (ast, file, diags) = parser.into_parts();
    let parsed = ParsedFile { ast, file, root };
    if diags.is_empty() {
        Ok(parsed)
    } else {
        Err(ParseFailure {
            partial: parsed,
            diags,
        })
    }
}

/// One line per token: position, token and the quoted literal when there
/// is one.
pub fn token_listing(name: &str, input: &str) -> (String, ErrorList) {
    let mut scanner = syntax::Scanner::new(File::new(name, 0), input.as_bytes());
    let mut out = String::new();
    loop {
        let (tok, lit) = scanner.scan();
        if tok == Token::Eof {
            break;
        }
        let (pos, _) = scanner.pos_end();
        let position = scanner.position(pos);
        out.push_str(&format!("{position}\t{tok}"));
        if !lit.is_empty() {
            out.push('\t');
            out.push_str(&syntax::escape::quote(&lit));
        }
        out.push('\n');
    }
    (out, scanner.errors().clone())
}

#[cfg(test)]
mod tests {
    use super::parse_source;

    #[test]
    fn smoke_parse_package() {
        let src = "package p\n\nfunc main() {}\n";
        let out = parse_source(src);
        assert!(out.is_ok(), "{out:?}");
    }

    #[test]
    fn failure_keeps_partial_tree() {
        let Err(failure) = parse_source("package p\nfunc f( {\n") else {
            panic!("expected diagnostics");
        };
        assert!(!failure.diags.is_empty());
        assert!(failure.partial.render().starts_with("(FILE (package p)"));
    }
}
