use std::fmt;

/// Kind discriminant of a type. Named types report the kind of their
/// underlying type.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Kind {
    #[default]
    Invalid,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    Array,
    Chan,
    Func,
    Interface,
    Map,
    Ptr,
    Slice,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl Kind {
    pub const COUNT: usize = Kind::UntypedNil as usize + 1;

    /// Kinds with a predeclared type of their own.
    pub const BASIC: [Kind; 25] = [
        Kind::Bool,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Uintptr,
        Kind::Float32,
        Kind::Float64,
        Kind::Complex64,
        Kind::Complex128,
        Kind::String,
        Kind::UnsafePointer,
        Kind::UntypedBool,
        Kind::UntypedInt,
        Kind::UntypedRune,
        Kind::UntypedFloat,
        Kind::UntypedComplex,
        Kind::UntypedString,
        Kind::UntypedNil,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kind::Invalid => "invalid type",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Uintptr => "uintptr",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::Complex64 => "complex64",
            Kind::Complex128 => "complex128",
            Kind::String => "string",
            Kind::UnsafePointer => "unsafe.Pointer",
            Kind::Array => "array",
            Kind::Chan => "chan",
            Kind::Func => "func",
            Kind::Interface => "interface",
            Kind::Map => "map",
            Kind::Ptr => "ptr",
            Kind::Slice => "slice",
            Kind::UntypedBool => "untyped bool",
            Kind::UntypedInt => "untyped int",
            Kind::UntypedRune => "untyped rune",
            Kind::UntypedFloat => "untyped float",
            Kind::UntypedComplex => "untyped complex",
            Kind::UntypedString => "untyped string",
            Kind::UntypedNil => "untyped nil",
        }
    }

    /// Collapses a kind into its broad category: every integer kind is
    /// `Int`, floats are `Float64`, complexes are `Complex128`. Untyped
    /// kinds map to the category of their default type.
    pub fn category(self) -> Kind {
        match self {
            Kind::Int
            | Kind::Int8
            | Kind::Int16
            | Kind::Int32
            | Kind::Int64
            | Kind::Uint
            | Kind::Uint8
            | Kind::Uint16
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Uintptr
            | Kind::UntypedInt
            | Kind::UntypedRune => Kind::Int,
            Kind::Float32 | Kind::Float64 | Kind::UntypedFloat => Kind::Float64,
            Kind::Complex64 | Kind::Complex128 | Kind::UntypedComplex => Kind::Complex128,
            Kind::UntypedBool => Kind::Bool,
            Kind::UntypedString => Kind::String,
            k => k,
        }
    }

    #[inline]
    pub fn is_untyped(self) -> bool {
        (Kind::UntypedBool..=Kind::UntypedNil).contains(&self)
    }

    #[inline]
    pub fn is_basic(self) -> bool {
        (Kind::Bool..=Kind::UnsafePointer).contains(&self) || self.is_untyped()
    }

    /// Kinds whose values can be `nil`.
    pub fn is_nillable(self) -> bool {
        matches!(
            self,
            Kind::Chan
                | Kind::Func
                | Kind::Interface
                | Kind::Map
                | Kind::Ptr
                | Kind::Slice
                | Kind::UnsafePointer
                | Kind::UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        self.category() == Kind::Int
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
