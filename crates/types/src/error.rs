use thiserror::Error;

/// A violated constructor contract. These describe caller bugs, not
/// malformed source code, so they are returned once and never accumulated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("array length {len} exceeds the maximum {max} for this element type")]
    ArrayTooLarge { len: u64, max: u64 },
    #[error("embedded interface {0} is incomplete, it has no underlying type")]
    IncompleteEmbedded(String),
    #[error("invalid embedded interface {0}, its underlying type must be an interface")]
    NotAnInterface(String),
    #[error("found duplicate method {0} with conflicting types")]
    DuplicateMethod(String),
    #[error("invalid type {typ} for method {name}, expecting a func type")]
    InvalidMethodType { name: String, typ: String },
    #[error("too many methods: {0}")]
    TooManyMethods(usize),
    #[error("variadic func type must end with a slice parameter")]
    InvalidVariadic,
    #[error("{0} is not a named type")]
    NotNamed(String),
    #[error("underlying type of {0} is already set")]
    UnderlyingAlreadySet(String),
    #[error("type {0} is incomplete, it has no underlying type")]
    IncompleteUnderlying(String),
    #[error("unknown target architecture {0:?}")]
    UnknownArch(String),
}
