//! Canonicalization tables.
//!
//! Each constructor family has its own map from structural key to the
//! canonical handle, behind its own mutex. A lookup hit returns the existing
//! instance; a miss computes the descriptor, allocates, inserts and returns.
//! Named types are the exception: every [`TypeTable::new_named`] call makes a
//! distinct type.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::arch::TargetArch;
use crate::error::TypeError;
use crate::kind::Kind;
use crate::layout;
use crate::types::{ChanDir, Complete, Method, Named, Type, Variant};

/// Interfaces with more methods than this are rejected.
pub const MAX_METHODS: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FuncKey {
    params: Box<[Type]>,
    results: Box<[Type]>,
    variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BuiltinKey {
    name: String,
    nin: u32,
    nout: u32,
    variadic: bool,
}

/// Per-compilation-unit type context: the predeclared basic types plus one
/// canonicalization map per type constructor.
#[derive(Debug)]
pub struct TypeTable {
    arch: TargetArch,
    basics: Box<[Type]>,
    arrays: Mutex<FxHashMap<(Type, u64), Type>>,
    slices: Mutex<FxHashMap<Type, Type>>,
    pointers: Mutex<FxHashMap<Type, Type>>,
    chans: Mutex<FxHashMap<(Type, ChanDir), Type>>,
    maps: Mutex<FxHashMap<(Type, Type), Type>>,
    funcs: Mutex<FxHashMap<FuncKey, Type>>,
    /// Keyed by the sorted, deduplicated method list, so the key length
    /// buckets interfaces by method count.
    interfaces: Mutex<FxHashMap<Box<[Method]>, Type>>,
    builtins: Mutex<FxHashMap<BuiltinKey, Type>>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new(TargetArch::default())
    }
}

impl TypeTable {
    pub fn new(arch: TargetArch) -> Self {
        let invalid = Self::basic_type(Kind::Invalid, arch);
        let mut basics = vec![invalid; Kind::COUNT];
        for kind in Kind::BASIC {
            basics[kind as usize] = Self::basic_type(kind, arch);
        }
        debug!(%arch, "type table created");
        Self {
            arch,
            basics: basics.into(),
            arrays: Mutex::default(),
            slices: Mutex::default(),
            pointers: Mutex::default(),
            chans: Mutex::default(),
            maps: Mutex::default(),
            funcs: Mutex::default(),
            interfaces: Mutex::default(),
            builtins: Mutex::default(),
        }
    }

    fn basic_type(kind: Kind, arch: TargetArch) -> Type {
        let v = Variant::Basic(kind);
        // Basic descriptors have no components and cannot fail.
        let l = layout::compute(&v, arch).unwrap_or(Complete::INCOMPLETE);
        Type::alloc(v, arch, l)
    }

    fn alloc(&self, v: Variant) -> Result<Type, TypeError> {
        let l = layout::compute(&v, self.arch)?;
        Ok(Type::alloc(v, self.arch, l))
    }

    pub fn arch(&self) -> TargetArch {
        self.arch
    }

    /// Predeclared type of a basic kind; the invalid type for any other kind.
    pub fn basic(&self, kind: Kind) -> Type {
        self.basics[kind as usize].clone()
    }

    pub fn invalid(&self) -> Type {
        self.basic(Kind::Invalid)
    }

    /// `[len]elem`. Fails when the array could not fit in memory on the
    /// target architecture.
    pub fn new_array(&self, elem: &Type, len: u64) -> Result<Type, TypeError> {
        let key = (elem.clone(), len);
        let mut map = self.arrays.lock();
        if let Some(t) = map.get(&key) {
            return Ok(t.clone());
        }
        let t = self.alloc(Variant::Array {
            elem: elem.clone(),
            len,
        })?;
        map.insert(key, t.clone());
        Ok(t)
    }

    pub fn new_slice(&self, elem: &Type) -> Type {
        let mut map = self.slices.lock();
        map.entry(elem.clone())
            .or_insert_with(|| self.alloc_infallible(Variant::Slice { elem: elem.clone() }))
            .clone()
    }

    pub fn new_pointer(&self, elem: &Type) -> Type {
        let mut map = self.pointers.lock();
        map.entry(elem.clone())
            .or_insert_with(|| self.alloc_infallible(Variant::Ptr { elem: elem.clone() }))
            .clone()
    }

    pub fn new_chan(&self, elem: &Type, dir: ChanDir) -> Type {
        let mut map = self.chans.lock();
        map.entry((elem.clone(), dir))
            .or_insert_with(|| {
                self.alloc_infallible(Variant::Chan {
                    elem: elem.clone(),
                    dir,
                })
            })
            .clone()
    }

    pub fn new_map(&self, key: &Type, elem: &Type) -> Type {
        let mut map = self.maps.lock();
        map.entry((key.clone(), elem.clone()))
            .or_insert_with(|| {
                self.alloc_infallible(Variant::Map {
                    key: key.clone(),
                    elem: elem.clone(),
                })
            })
            .clone()
    }

    /// `func(params) results`. A variadic signature must end with a slice
    /// parameter, whose element type is the `...T` type.
    pub fn new_func(&self, params: &[Type], results: &[Type], variadic: bool) -> Result<Type, TypeError> {
        if variadic && params.last().map(|p| p.kind()) != Some(Kind::Slice) {
            return Err(TypeError::InvalidVariadic);
        }
        let key = FuncKey {
            params: params.into(),
            results: results.into(),
            variadic,
        };
        let mut map = self.funcs.lock();
        if let Some(t) = map.get(&key) {
            return Ok(t.clone());
        }
        let t = self.alloc(Variant::Func {
            params: key.params.clone(),
            results: key.results.clone(),
            variadic,
        })?;
        map.insert(key, t.clone());
        Ok(t)
    }

    /// Interface with the union of `methods` and the methods of every
    /// embedded interface, sorted by (package path, name). Two methods with
    /// the same name collapse when their types are identical and are an
    /// error otherwise.
    pub fn new_interface(&self, embedded: &[Type], methods: &[Method]) -> Result<Type, TypeError> {
        let all = interface_methods(embedded, methods)?;
        let mut map = self.interfaces.lock();
        if let Some(t) = map.get(all.as_slice()) {
            return Ok(t.clone());
        }
        let key: Box<[Method]> = all.into();
        let t = self.alloc(Variant::Interface { methods: key.clone() })?;
        map.insert(key, t.clone());
        Ok(t)
    }

    /// Type of a builtin function such as `len` or `append`. It has kind
    /// `Invalid` and renders as `func(...)`: it can only be called, never
    /// used as a component of other types.
    pub fn new_builtin(&self, name: &str, nin: u32, nout: u32, variadic: bool) -> Type {
        let key = BuiltinKey {
            name: name.to_string(),
            nin,
            nout,
            variadic,
        };
        let mut map = self.builtins.lock();
        map.entry(key)
            .or_insert_with(|| {
                self.alloc_infallible(Variant::Builtin {
                    name: name.to_string(),
                    nin,
                    nout,
                    variadic,
                })
            })
            .clone()
    }

    /// A new named type without underlying type; bind it later with
    /// [`Type::set_underlying`]. Never canonicalized.
    pub fn new_named(&self, pkg_path: &str, name: &str) -> Type {
        Type::alloc(
            Variant::Named(Named {
                pkg_path: pkg_path.to_string(),
                name: name.to_string(),
                underlying: Default::default(),
                methods: Default::default(),
            }),
            self.arch,
            Complete::INCOMPLETE,
        )
    }

    /// Only array and func descriptors can fail, and those have their own
    /// constructors.
    fn alloc_infallible(&self, v: Variant) -> Type {
        let l = layout::compute(&v, self.arch).unwrap_or(Complete::INCOMPLETE);
        Type::alloc(v, self.arch, l)
    }
}

fn interface_methods(embedded: &[Type], direct: &[Method]) -> Result<Vec<Method>, TypeError> {
    let mut out = direct.to_vec();
    for t in embedded {
        let u = t
            .underlying()
            .ok_or_else(|| TypeError::IncompleteEmbedded(t.string()))?;
        match u.variant() {
            Variant::Interface { methods, .. } => out.extend(methods.iter().cloned()),
            _ => return Err(TypeError::NotAnInterface(t.string())),
        }
    }
    for m in &out {
        if m.typ.variant().kind() != Kind::Func {
            return Err(TypeError::InvalidMethodType {
                name: m.name.clone(),
                typ: m.typ.string(),
            });
        }
    }
    out.sort_by(|a, b| (&a.pkg_path, &a.name).cmp(&(&b.pkg_path, &b.name)));
    let mut deduped: Vec<Method> = Vec::with_capacity(out.len());
    for m in out {
        match deduped.last() {
            Some(prev) if prev.same_name(&m) => {
                if prev.typ != m.typ {
                    return Err(TypeError::DuplicateMethod(m.qualified_name()));
                }
            }
            _ => deduped.push(m),
        }
    }
    if deduped.len() > MAX_METHODS {
        return Err(TypeError::TooManyMethods(deduped.len()));
    }
    Ok(deduped)
}
