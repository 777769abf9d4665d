//! Descriptor computation for each type family.

use crate::arch::TargetArch;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::hash::TypeHash;
use crate::kind::Kind;
use crate::types::{Complete, Method, Type, Variant, UNKNOWN_SIZE};

/// Descriptor of `v` from the current descriptors of its components.
pub(crate) fn compute(v: &Variant, arch: TargetArch) -> Result<Complete, TypeError> {
    let ptr = arch.ptr_size();
    let l = match v {
        Variant::Basic(kind) => basic(*kind, arch),
        Variant::Array { elem, len } => array(elem, *len, arch)?,
        Variant::Slice { elem } => {
            let hash = elem.common().hash.u8(b'[');
            reference(Kind::Slice, 3 * ptr, ptr, hash, TypeFlags::NOT_COMPARABLE)
        }
        Variant::Ptr { elem } => {
            let hash = elem.common().hash.u8(b'*');
            reference(Kind::Ptr, ptr, ptr, hash, TypeFlags::COMPARABLE)
        }
        Variant::Chan { elem, dir } => {
            let hash = elem.common().hash.u8(b'c').u8(*dir as u8);
            reference(Kind::Chan, ptr, ptr, hash, TypeFlags::COMPARABLE)
        }
        Variant::Map { key, elem } => {
            let hash = TypeHash::init()
                .u8(b'm')
                .mix(key.common().hash)
                .mix(elem.common().hash);
            reference(Kind::Map, ptr, ptr, hash, TypeFlags::NOT_COMPARABLE)
        }
        Variant::Func {
            params,
            results,
            variadic,
        } => {
            let hash = func_hash(params, results, *variadic);
            let mut flags = TypeFlags::NOT_COMPARABLE;
            if *variadic {
                flags |= TypeFlags::VARIADIC;
            }
            reference(Kind::Func, ptr, ptr, hash, flags)
        }
        Variant::Interface { methods, .. } => {
            let hash = interface_hash(methods);
            reference(Kind::Interface, 2 * ptr, ptr, hash, TypeFlags::COMPARABLE)
        }
        Variant::Builtin {
            name,
            nin,
            nout,
            variadic,
        } => {
            let hash = TypeHash::init()
                .string(name)
                .u32(*nin)
                .u32(*nout)
                .bool(*variadic);
            let mut l = reference(Kind::Invalid, ptr, ptr, hash, TypeFlags::NOT_COMPARABLE);
            if *variadic {
                l.flags |= TypeFlags::VARIADIC;
            }
            l
        }
        Variant::Named(_) => Complete::INCOMPLETE,
    };
    Ok(l)
}

/// Pointer-shaped types: size does not depend on the element, only the hash
/// does, so they are complete as soon as the hash is known.
fn reference(kind: Kind, size: u64, align: u64, hash: TypeHash, mut flags: TypeFlags) -> Complete {
    if !hash.is_unknown() {
        flags |= TypeFlags::COMPLETE;
    }
    Complete {
        size,
        align: align as u16,
        hash,
        flags,
        kind,
    }
}

fn basic(kind: Kind, arch: TargetArch) -> Complete {
    let ptr = arch.ptr_size();
    let (size, align) = match kind {
        Kind::Invalid => return Complete::INCOMPLETE,
        Kind::Bool | Kind::Int8 | Kind::Uint8 => (1, 1),
        Kind::Int16 | Kind::Uint16 => (2, 2),
        Kind::Int32 | Kind::Uint32 | Kind::Float32 => (4, 4),
        Kind::Int64 | Kind::Uint64 | Kind::Float64 => (8, ptr.min(8)),
        Kind::Int | Kind::Uint | Kind::Uintptr | Kind::UnsafePointer => (ptr, ptr),
        Kind::Complex64 => (8, 4),
        Kind::Complex128 => (16, ptr.min(8)),
        Kind::String => (2 * ptr, ptr),
        // Untyped constants have no storage.
        _ => (0, 1),
    };
    let mut flags = TypeFlags::COMPLETE | TypeFlags::COMPARABLE;
    if kind == Kind::UntypedNil {
        flags = TypeFlags::COMPLETE | TypeFlags::NOT_COMPARABLE;
    }
    Complete {
        size,
        align: align as u16,
        hash: TypeHash::init().string(kind.name()),
        flags,
        kind,
    }
}

fn array(elem: &Type, len: u64, arch: TargetArch) -> Result<Complete, TypeError> {
    let max = arch.max_size();
    if len > max {
        return Err(TypeError::ArrayTooLarge { len, max });
    }
    let e = elem.common();
    let size = if e.size == UNKNOWN_SIZE {
        UNKNOWN_SIZE
    } else if e.size != 0 && len > max / e.size {
        return Err(TypeError::ArrayTooLarge {
            len,
            max: max / e.size,
        });
    } else {
        len * e.size
    };
    let mut flags = e.flags & (TypeFlags::COMPLETE | TypeFlags::COMPARABLE | TypeFlags::NOT_COMPARABLE);
    if len == 0 || e.size == 0 {
        flags |= TypeFlags::NEED_PADDING;
    }
    Ok(Complete {
        size,
        align: e.align,
        hash: e.hash.u8(b']').u64(len),
        flags,
        kind: Kind::Array,
    })
}

fn func_hash(params: &[Type], results: &[Type], variadic: bool) -> TypeHash {
    let mut h = TypeHash::init()
        .string("func")
        .u32(params.len() as u32)
        .u32(results.len() as u32)
        .bool(variadic);
    for t in params.iter().chain(results) {
        h = h.mix(t.common().hash);
    }
    h
}

fn interface_hash(methods: &[Method]) -> TypeHash {
    let mut h = TypeHash::init().string("interface").u64(methods.len() as u64);
    for m in methods {
        h = h.string(&m.pkg_path).string(&m.name).mix(m.typ.common().hash);
        if h.is_unknown() {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_sizes_depend_on_arch() {
        assert_eq!(basic(Kind::Int, TargetArch::Amd64).size, 8);
        assert_eq!(basic(Kind::Int, TargetArch::Arm).size, 4);
        assert_eq!(basic(Kind::Int64, TargetArch::I386).align, 4);
        assert_eq!(basic(Kind::String, TargetArch::Arm64).size, 16);
        assert!(basic(Kind::Float64, TargetArch::Amd64).is_complete());
        assert!(!basic(Kind::Invalid, TargetArch::Amd64).is_complete());
    }
}
