//! Shared type handles.
//!
//! A [`Type`] is an `Arc` around immutable shape data plus a descriptor
//! ([`Complete`]) that starts out possibly incomplete and is filled in lazily
//! by [`Type::complete`]. Handles compare and hash by identity: the
//! [`TypeTable`](crate::TypeTable) guarantees that structurally identical
//! types share one instance.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::arch::TargetArch;
use crate::error::TypeError;
use crate::flags::TypeFlags;
use crate::hash::TypeHash;
use crate::kind::Kind;
use crate::layout;

pub const UNKNOWN_SIZE: u64 = u64::MAX;
pub const UNKNOWN_ALIGN: u16 = u16::MAX;

/// Size, alignment, hash, flags and kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complete {
    pub size: u64,
    pub align: u16,
    pub hash: TypeHash,
    pub flags: TypeFlags,
    pub kind: Kind,
}

impl Complete {
    pub const INCOMPLETE: Complete = Complete {
        size: UNKNOWN_SIZE,
        align: UNKNOWN_ALIGN,
        hash: TypeHash::UNKNOWN,
        flags: TypeFlags::empty(),
        kind: Kind::Invalid,
    };

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.flags.contains(TypeFlags::COMPLETE)
    }

    #[inline]
    pub fn is_comparable(&self) -> bool {
        self.flags.contains(TypeFlags::COMPARABLE)
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Recv = 1,
    Send = 2,
    Both = 3,
}

/// Interface or named-type method. Exported methods have an empty
/// `pkg_path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    pub name: String,
    pub pkg_path: String,
    /// Signature without receiver; always a func type.
    pub typ: Type,
}

impl Method {
    pub fn new(name: impl Into<String>, pkg_path: impl Into<String>, typ: Type) -> Self {
        Self {
            name: name.into(),
            pkg_path: pkg_path.into(),
            typ,
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.pkg_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.pkg_path, self.name)
        }
    }

    pub(crate) fn same_name(&self, other: &Method) -> bool {
        self.name == other.name && self.pkg_path == other.pkg_path
    }
}

#[derive(Debug)]
pub(crate) struct Named {
    pub(crate) pkg_path: String,
    pub(crate) name: String,
    pub(crate) underlying: RwLock<Option<Type>>,
    pub(crate) methods: RwLock<Vec<Method>>,
}

#[derive(Debug)]
pub(crate) enum Variant {
    Basic(Kind),
    Array { elem: Type, len: u64 },
    Slice { elem: Type },
    Ptr { elem: Type },
    Chan { elem: Type, dir: ChanDir },
    Map { key: Type, elem: Type },
    Func {
        params: Box<[Type]>,
        results: Box<[Type]>,
        variadic: bool,
    },
    /// Canonical by method set alone: how the methods were spelled
    /// (declared or embedded) is not part of the type.
    Interface {
        methods: Box<[Method]>,
    },
    Builtin {
        name: String,
        nin: u32,
        nout: u32,
        variadic: bool,
    },
    Named(Named),
}

impl Variant {
    /// Kind fixed by the shape alone; `Invalid` for named types.
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Variant::Basic(k) => *k,
            Variant::Array { .. } => Kind::Array,
            Variant::Slice { .. } => Kind::Slice,
            Variant::Ptr { .. } => Kind::Ptr,
            Variant::Chan { .. } => Kind::Chan,
            Variant::Map { .. } => Kind::Map,
            Variant::Func { .. } => Kind::Func,
            Variant::Interface { .. } => Kind::Interface,
            Variant::Builtin { .. } | Variant::Named(_) => Kind::Invalid,
        }
    }

    /// Component types that completion must visit first.
    fn components(&self) -> SmallVec<[Type; 2]> {
        match self {
            Variant::Array { elem, .. }
            | Variant::Slice { elem }
            | Variant::Ptr { elem }
            | Variant::Chan { elem, .. } => smallvec![elem.clone()],
            Variant::Map { key, elem } => smallvec![key.clone(), elem.clone()],
            Variant::Func { params, results, .. } => params.iter().chain(results.iter()).cloned().collect(),
            Variant::Interface { methods } => methods.iter().map(|m| m.typ.clone()).collect(),
            Variant::Basic(_) | Variant::Builtin { .. } | Variant::Named(_) => SmallVec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TypeData {
    pub(crate) variant: Variant,
    pub(crate) arch: TargetArch,
    /// Short display form, computed once at construction.
    pub(crate) str: String,
    pub(crate) layout: RwLock<Complete>,
    completing: AtomicBool,
}

/// Shared, identity-compared type handle.
#[derive(Clone)]
pub struct Type(pub(crate) Arc<TypeData>);

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.0.str).finish()
    }
}

impl Type {
    pub(crate) fn alloc(variant: Variant, arch: TargetArch, layout: Complete) -> Self {
        let mut str = String::new();
        // Writing into a String cannot fail.
        let _ = crate::render::write_variant(&mut str, &variant, false);
        trace!(ty = %str, kind = %layout.kind, "new type");
        Type(Arc::new(TypeData {
            variant,
            arch,
            str,
            layout: RwLock::new(layout),
            completing: AtomicBool::new(false),
        }))
    }

    pub(crate) fn variant(&self) -> &Variant {
        &self.0.variant
    }

    /// Descriptor after an attempt at completion.
    pub fn common(&self) -> Complete {
        self.complete();
        *self.0.layout.read()
    }

    pub fn kind(&self) -> Kind {
        match &self.0.variant {
            Variant::Named(_) => self.0.layout.read().kind,
            v => v.kind(),
        }
    }

    pub fn size(&self) -> u64 {
        self.common().size
    }

    pub fn align(&self) -> u16 {
        self.common().align
    }

    pub fn hash_value(&self) -> TypeHash {
        self.common().hash
    }

    pub fn flags(&self) -> TypeFlags {
        self.common().flags
    }

    pub fn is_complete(&self) -> bool {
        self.common().is_complete()
    }

    pub fn arch(&self) -> TargetArch {
        self.0.arch
    }

    /// Whether the type has a name: predeclared basic types and types made
    /// by [`TypeTable::new_named`](crate::TypeTable::new_named).
    pub fn is_named(&self) -> bool {
        match &self.0.variant {
            Variant::Basic(k) => *k != Kind::Invalid && !k.is_untyped(),
            Variant::Named(_) => true,
            _ => false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.0.variant {
            Variant::Named(n) => Some(&n.name),
            Variant::Basic(k) if self.is_named() => Some(k.name()),
            _ => None,
        }
    }

    pub fn pkg_path(&self) -> Option<&str> {
        match &self.0.variant {
            Variant::Named(n) => Some(&n.pkg_path),
            _ => None,
        }
    }

    /// The type itself for unnamed and basic types; the bound underlying type
    /// for named ones, `None` until [`set_underlying`](Self::set_underlying).
    pub fn underlying(&self) -> Option<Type> {
        match &self.0.variant {
            Variant::Named(n) => n.underlying.read().clone(),
            _ => Some(self.clone()),
        }
    }

    /// Element type of arrays, slices, pointers, channels and maps.
    pub fn elem(&self) -> Option<Type> {
        match self.underlying()?.variant() {
            Variant::Array { elem, .. }
            | Variant::Slice { elem }
            | Variant::Ptr { elem }
            | Variant::Chan { elem, .. }
            | Variant::Map { elem, .. } => Some(elem.clone()),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<Type> {
        match self.underlying()?.variant() {
            Variant::Map { key, .. } => Some(key.clone()),
            _ => None,
        }
    }

    /// Array length.
    pub fn len(&self) -> Option<u64> {
        match self.underlying()?.variant() {
            Variant::Array { len, .. } => Some(*len),
            _ => None,
        }
    }

    pub fn chan_dir(&self) -> Option<ChanDir> {
        match self.underlying()?.variant() {
            Variant::Chan { dir, .. } => Some(*dir),
            _ => None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        match self.underlying().as_ref().map(Type::variant) {
            Some(Variant::Func { variadic, .. } | Variant::Builtin { variadic, .. }) => *variadic,
            _ => false,
        }
    }

    pub fn num_in(&self) -> usize {
        match self.underlying().as_ref().map(Type::variant) {
            Some(Variant::Func { params, .. }) => params.len(),
            Some(Variant::Builtin { nin, .. }) => *nin as usize,
            _ => 0,
        }
    }

    pub fn num_out(&self) -> usize {
        match self.underlying().as_ref().map(Type::variant) {
            Some(Variant::Func { results, .. }) => results.len(),
            Some(Variant::Builtin { nout, .. }) => *nout as usize,
            _ => 0,
        }
    }

    /// `i`-th parameter type; builtins have none.
    pub fn param(&self, i: usize) -> Option<Type> {
        match self.underlying()?.variant() {
            Variant::Func { params, .. } => params.get(i).cloned(),
            _ => None,
        }
    }

    pub fn result(&self, i: usize) -> Option<Type> {
        match self.underlying()?.variant() {
            Variant::Func { results, .. } => results.get(i).cloned(),
            _ => None,
        }
    }

    /// Methods of an interface (embedded ones included, sorted), or the
    /// declared methods of a named type.
    pub fn methods(&self) -> Vec<Method> {
        match &self.0.variant {
            Variant::Interface { methods, .. } => methods.to_vec(),
            Variant::Named(n) => match n.underlying.read().as_ref().map(Type::variant) {
                Some(Variant::Interface { methods, .. }) => methods.to_vec(),
                _ => n.methods.read().clone(),
            },
            _ => Vec::new(),
        }
    }

    pub fn num_method(&self) -> usize {
        self.methods().len()
    }

    pub fn method(&self, i: usize) -> Option<Method> {
        self.methods().into_iter().nth(i)
    }

    /// Binds the underlying type of a named type. `t` may itself be named;
    /// its underlying type is used.
    pub fn set_underlying(&self, t: &Type) -> Result<(), TypeError> {
        let Variant::Named(named) = &self.0.variant else {
            return Err(TypeError::NotNamed(self.string()));
        };
        let u = t
            .underlying()
            .ok_or_else(|| TypeError::IncompleteUnderlying(t.string()))?;
        {
            let mut slot = named.underlying.write();
            if slot.is_some() {
                return Err(TypeError::UnderlyingAlreadySet(self.string()));
            }
            *slot = Some(u.clone());
        }
        let mut layout = self.0.layout.write();
        layout.kind = u.variant().kind();
        layout.hash = TypeHash::init().string(&named.pkg_path).string(&named.name);
        trace!(ty = %self.0.str, underlying = %u.0.str, "underlying type set");
        Ok(())
    }

    /// Declares a method on a named type. Declaring the same name twice with
    /// a different signature is an error; an identical redeclaration is a
    /// no-op.
    pub fn add_method(&self, method: Method) -> Result<(), TypeError> {
        let Variant::Named(named) = &self.0.variant else {
            return Err(TypeError::NotNamed(self.string()));
        };
        if method.typ.variant().kind() != Kind::Func {
            return Err(TypeError::InvalidMethodType {
                name: method.name,
                typ: method.typ.string(),
            });
        }
        let mut methods = named.methods.write();
        if let Some(old) = methods.iter().find(|m| m.same_name(&method)) {
            if old.typ == method.typ {
                return Ok(());
            }
            return Err(TypeError::DuplicateMethod(method.qualified_name()));
        }
        methods.push(method);
        methods.sort_by(|a, b| (&a.pkg_path, &a.name).cmp(&(&b.pkg_path, &b.name)));
        Ok(())
    }

    /// Computes size, alignment, hash and flags once every component is
    /// known. Idempotent; a type that cannot be completed yet (a named type
    /// without underlying type, or one that contains itself by value) stays
    /// incomplete and is retried on the next query.
    pub fn complete(&self) {
        if self.0.layout.read().is_complete() {
            return;
        }
        if self.0.completing.swap(true, Ordering::Acquire) {
            // Cycle through a named type; the outer call finishes the job.
            return;
        }
        let computed = match &self.0.variant {
            Variant::Named(named) => {
                let underlying = named.underlying.read().clone();
                underlying.map(|u| {
                    u.complete();
                    let own = *self.0.layout.read();
                    let under = *u.0.layout.read();
                    Complete {
                        hash: own.hash,
                        ..under
                    }
                })
            }
            v => {
                for c in v.components() {
                    c.complete();
                }
                match layout::compute(v, self.0.arch) {
                    Ok(l) => Some(l),
                    Err(err) => {
                        trace!(ty = %self.0.str, %err, "completion failed");
                        None
                    }
                }
            }
        };
        if let Some(l) = computed {
            *self.0.layout.write() = l;
            if l.is_complete() {
                trace!(ty = %self.0.str, size = l.size, "type completed");
            }
        }
        self.0.completing.store(false, Ordering::Release);
    }
}
