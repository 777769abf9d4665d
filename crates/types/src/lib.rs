//! Structural type system for the Go-like front-end.
//!
//! Types are created through a [`TypeTable`], which interns structurally
//! identical shapes into one shared [`Type`] instance, so identity is plain
//! handle equality. Each type carries a [`Complete`] descriptor (size,
//! alignment, structural hash, flags, kind) that is filled in lazily once the
//! component types are known.

mod arch;
mod error;
mod flags;
mod hash;
mod kind;
mod layout;
mod relation;
mod render;
mod table;
mod types;

pub use arch::TargetArch;
pub use error::TypeError;
pub use flags::TypeFlags;
pub use hash::TypeHash;
pub use kind::Kind;
pub use relation::{assignable_to, convertible_to, identical, implements, method_set};
pub use render::type_string;
pub use table::{TypeTable, MAX_METHODS};
pub use types::{ChanDir, Complete, Method, Type, UNKNOWN_ALIGN, UNKNOWN_SIZE};
