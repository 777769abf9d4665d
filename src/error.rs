use gofront_parser::{Error, ErrorList};
use gofront_types::TypeError;
use thiserror::Error;

use crate::ParsedFile;

/// Lexical or syntax diagnostics for a file that still produced a tree.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub partial: ParsedFile,
    pub diags: ErrorList,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Malformed or unsupported source. Recorded; the remaining
    /// declarations are still resolved.
    #[error(transparent)]
    Diagnostic(Box<Error>),
    /// A type constructor rejected its arguments, which the resolver should
    /// have ruled out. Aborts the compilation unit.
    #[error("type construction failed: {0}")]
    Contract(#[from] TypeError),
}

impl ResolveError {
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, ResolveError::Diagnostic(_))
    }

    /// The recorded diagnostic, if this is one.
    pub fn diagnostic(&self) -> Option<&Error> {
        match self {
            ResolveError::Diagnostic(err) => Some(err),
            ResolveError::Contract(_) => None,
        }
    }
}
