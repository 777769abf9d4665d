//! Go-like front-end: rune reader, scanner and recursive-descent parser.
//!
//! - The scanner recognizes raw tokens with Logos and implements Go
//!   automatic semicolon insertion on top.
//! - The parser builds a generic [`ast::Ast`] of Atom/Unary/Binary/List/Bad
//!   nodes and never stops on a syntax error.

pub mod ast;
pub mod error;
pub mod escape;
pub mod parser;
mod parser_support;
pub mod reader;
pub mod scanner;
pub mod source;
pub mod token;
pub mod walk;

// Re-exports for convenience
pub use ast::{Ast, Atom, Child, Node, NodeId, NodeKind, NodeMap};
pub use error::{AstError, DiagKind, Error, ErrorList, LexErrorKind, SyntaxErrorKind};
pub use parser::{Mode, Parser};
pub use reader::{Rune, RuneReader};
pub use scanner::Scanner;
pub use source::{File, Pos, Position};
pub use token::Token;
