use bitflags::bitflags;

bitflags! {
    /// Properties cached in a type's descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u16 {
        /// Values can be compared with `==`.
        const COMPARABLE = 1 << 2;
        const NOT_COMPARABLE = 1 << 3;
        /// Size, alignment and hash are all known.
        const COMPLETE = 1 << 4;
        /// The type is, or ends with, a zero-size array.
        const NEED_PADDING = 1 << 5;
        /// Func type whose last parameter is `...T`.
        const VARIADIC = 1 << 6;
    }
}
