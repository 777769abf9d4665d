//! Relations between types: identity, assignability, convertibility and
//! interface satisfaction.

use crate::kind::Kind;
use crate::types::{ChanDir, Method, Type, Variant};

/// Canonical types are identical exactly when they are the same instance.
#[inline]
pub fn identical(a: &Type, b: &Type) -> bool {
    a == b
}

/// Whether a value of type `src` can be assigned to a variable of type `dst`.
///
/// Checked in order, stopping at the first rule that holds:
/// 1. identical types;
/// 2. (false) when either type is invalid or has no underlying type yet;
/// 3. untyped `src` compatible with the category of `dst`;
/// 4. identical underlying types, at least one of the two unnamed;
/// 5. bidirectional channel `src` with the element type of channel `dst`,
///    at least one of the two unnamed;
/// 6. interface `dst` implemented by `src`.
pub fn assignable_to(src: &Type, dst: &Type) -> bool {
    if src == dst {
        return true;
    }
    let (k1, k2) = (src.kind(), dst.kind());
    let (Some(u1), Some(u2)) = (src.underlying(), dst.underlying()) else {
        return false;
    };
    if k1 == Kind::Invalid || k2 == Kind::Invalid {
        return false;
    }
    if k1.is_untyped() && untyped_assignable_to(k1, k2) {
        return true;
    }
    let one_unnamed = !src.is_named() || !dst.is_named();
    if u1 == u2 && one_unnamed {
        return true;
    }
    if k1 == Kind::Chan
        && k2 == Kind::Chan
        && src.chan_dir() == Some(ChanDir::Both)
        && src.elem() == dst.elem()
        && one_unnamed
    {
        return true;
    }
    k2 == Kind::Interface && implements(src, dst)
}

fn untyped_assignable_to(src: Kind, dst: Kind) -> bool {
    match src {
        Kind::UntypedBool => dst.category() == Kind::Bool,
        // Whether the constant value is representable is the caller's check.
        Kind::UntypedInt | Kind::UntypedRune | Kind::UntypedFloat => {
            matches!(dst.category(), Kind::Int | Kind::Float64)
        }
        Kind::UntypedComplex => dst.category() == Kind::Complex128,
        Kind::UntypedString => dst.category() == Kind::String,
        Kind::UntypedNil => dst.is_nillable(),
        _ => false,
    }
}

/// Whether a value of type `src` can be converted to type `dst`.
pub fn convertible_to(src: &Type, dst: &Type) -> bool {
    if assignable_to(src, dst) {
        return true;
    }
    let (Some(u1), Some(u2)) = (src.underlying(), dst.underlying()) else {
        return false;
    };
    // There are no struct types, so field tags never matter here.
    if u1 == u2 {
        return true;
    }
    let (k1, k2) = (src.kind(), dst.kind());
    if k1 == Kind::Ptr && k2 == Kind::Ptr && !src.is_named() && !dst.is_named() {
        let e1 = src.elem().and_then(|e| e.underlying());
        let e2 = dst.elem().and_then(|e| e.underlying());
        if e1.is_some() && e1 == e2 {
            return true;
        }
    }
    let (c1, c2) = (k1.category(), k2.category());
    if matches!(c1, Kind::Int | Kind::Float64) && matches!(c2, Kind::Int | Kind::Float64) {
        return true;
    }
    if c1 == Kind::Complex128 && c2 == Kind::Complex128 {
        return true;
    }
    if k2 == Kind::String && (c1 == Kind::Int || is_bytes_or_runes(src)) {
        return true;
    }
    k1 == Kind::String && is_bytes_or_runes(dst)
}

/// Slice whose element's underlying type is `byte` or `rune`.
fn is_bytes_or_runes(t: &Type) -> bool {
    t.kind() == Kind::Slice
        && t
            .elem()
            .is_some_and(|e| matches!(e.kind(), Kind::Uint8 | Kind::Int32))
}

/// Whether `src` implements the interface `dst`: every method of `dst` is
/// in the method set of `src` with the same name, package path and
/// (canonical) signature.
///
/// Method sets: an interface has its methods; a named type has its declared
/// methods; a pointer to a named type has the methods declared on the named
/// type.
pub fn implements(src: &Type, dst: &Type) -> bool {
    let Some(iface) = dst.underlying() else {
        return false;
    };
    let Variant::Interface { methods, .. } = iface.variant() else {
        return false;
    };
    let set = method_set(src);
    methods
        .iter()
        .all(|want| set.iter().any(|have| have.same_name(want) && have.typ == want.typ))
}

pub fn method_set(t: &Type) -> Vec<Method> {
    match t.variant() {
        Variant::Interface { .. } | Variant::Named(_) => t.methods(),
        Variant::Ptr { elem } if matches!(elem.variant(), Variant::Named(_)) && elem.kind() != Kind::Interface => {
            elem.methods()
        }
        _ => Vec::new(),
    }
}
