//! Type rendering.
//!
//! The short form is memoized in each type at construction and uses the last
//! segment of package paths; the full form recurses into components and
//! spells package paths out.

use std::fmt::{self, Write};

use crate::types::{ChanDir, Method, Type, Variant};

/// `t` in short (`full == false`) or fully qualified form.
pub fn type_string(t: &Type, full: bool) -> String {
    if !full {
        return t.0.str.clone();
    }
    t.string()
}

impl Type {
    /// Fully qualified rendering.
    pub fn string(&self) -> String {
        let mut out = String::new();
        let _ = self.write_to(&mut out, true);
        out
    }

    /// Memoized short rendering.
    pub fn short_str(&self) -> &str {
        &self.0.str
    }

    pub fn write_to(&self, out: &mut impl Write, full: bool) -> fmt::Result {
        if !full {
            return out.write_str(&self.0.str);
        }
        write_variant(out, &self.0.variant, true)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, true)
    }
}

pub(crate) fn write_variant(out: &mut impl Write, v: &Variant, full: bool) -> fmt::Result {
    match v {
        Variant::Basic(kind) => out.write_str(kind.name()),
        Variant::Array { elem, len } => {
            write!(out, "[{len}]")?;
            elem.write_to(out, full)
        }
        Variant::Slice { elem } => {
            out.write_str("[]")?;
            elem.write_to(out, full)
        }
        Variant::Ptr { elem } => {
            out.write_char('*')?;
            elem.write_to(out, full)
        }
        Variant::Chan { elem, dir } => {
            out.write_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            })?;
            let nested_recv = *dir != ChanDir::Recv && elem.chan_dir() == Some(ChanDir::Recv) && !elem.is_named();
            if nested_recv {
                out.write_char('(')?;
                elem.write_to(out, full)?;
                out.write_char(')')
            } else {
                elem.write_to(out, full)
            }
        }
        Variant::Map { key, elem } => {
            out.write_str("map[")?;
            key.write_to(out, full)?;
            out.write_char(']')?;
            elem.write_to(out, full)
        }
        Variant::Func {
            params,
            results,
            variadic,
        } => {
            out.write_str("func")?;
            write_signature(out, params, results, *variadic, full)
        }
        Variant::Interface { methods, .. } => write_interface(out, methods, full),
        Variant::Builtin { .. } => out.write_str("func(...)"),
        Variant::Named(named) => {
            let pkg = if full {
                named.pkg_path.as_str()
            } else {
                named.pkg_path.rsplit('/').next().unwrap_or_default()
            };
            if !pkg.is_empty() {
                out.write_str(pkg)?;
                out.write_char('.')?;
            }
            out.write_str(&named.name)
        }
    }
}

/// `(A, B) R` or `(A) (R1, R2)`; a variadic last parameter `[]T` is shown as
/// `...T`.
fn write_signature(
    out: &mut impl Write,
    params: &[Type],
    results: &[Type],
    variadic: bool,
    full: bool,
) -> fmt::Result {
    out.write_char('(')?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        match p.elem() {
            Some(elem) if variadic && i + 1 == params.len() => {
                out.write_str("...")?;
                elem.write_to(out, full)?;
            }
            _ => p.write_to(out, full)?,
        }
    }
    out.write_char(')')?;
    match results {
        [] => Ok(()),
        [only] => {
            out.write_char(' ')?;
            only.write_to(out, full)
        }
        _ => {
            out.write_str(" (")?;
            for (i, r) in results.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                r.write_to(out, full)?;
            }
            out.write_char(')')
        }
    }
}

fn write_interface(out: &mut impl Write, methods: &[Method], full: bool) -> fmt::Result {
    out.write_str("interface {")?;
    for (i, m) in methods.iter().enumerate() {
        out.write_str(if i == 0 { " " } else { "; " })?;
        write_method(out, m, full)?;
    }
    out.write_str(if methods.is_empty() { "}" } else { " }" })
}

fn write_method(out: &mut impl Write, m: &Method, full: bool) -> fmt::Result {
    if full && !m.pkg_path.is_empty() {
        out.write_str(&m.pkg_path)?;
        out.write_char('.')?;
    }
    out.write_str(&m.name)?;
    match m.typ.variant() {
        Variant::Func {
            params,
            results,
            variadic,
        } => write_signature(out, params, results, *variadic, full),
        _ => m.typ.write_to(out, full),
    }
}
