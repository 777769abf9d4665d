//! Structural type hash.
//!
//! A hash is a pure function of a type's shape and its elements' hashes.
//! [`TypeHash::UNKNOWN`] is absorbing: mixing anything into it, or mixing it
//! into anything, yields `UNKNOWN` again, so an incomplete element keeps every
//! type built on it unhashed until completion.

use std::fmt;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeHash(u64);

impl TypeHash {
    pub const UNKNOWN: TypeHash = TypeHash(0);

    #[inline]
    pub fn init() -> Self {
        TypeHash(FNV_OFFSET)
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    fn bytes(self, bytes: &[u8]) -> Self {
        if self.is_unknown() {
            return self;
        }
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(FNV_PRIME);
        }
        // Zero is reserved for UNKNOWN.
        TypeHash(if h == 0 { 1 } else { h })
    }

    pub fn u8(self, n: u8) -> Self {
        self.bytes(&[n])
    }

    pub fn u32(self, n: u32) -> Self {
        self.bytes(&n.to_le_bytes())
    }

    pub fn u64(self, n: u64) -> Self {
        self.bytes(&n.to_le_bytes())
    }

    pub fn bool(self, b: bool) -> Self {
        self.u8(u8::from(b))
    }

    /// Length-prefixed, so `("ab", "c")` and `("a", "bc")` differ.
    pub fn string(self, s: &str) -> Self {
        self.u64(s.len() as u64).bytes(s.as_bytes())
    }

    pub fn mix(self, other: TypeHash) -> Self {
        if other.is_unknown() {
            return TypeHash::UNKNOWN;
        }
        self.u64(other.0)
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            f.write_str("TypeHash(unknown)")
        } else {
            write!(f, "TypeHash({:#018x})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_absorbs() {
        let h = TypeHash::init().string("int");
        assert!(!h.is_unknown());
        assert!(h.mix(TypeHash::UNKNOWN).is_unknown());
        assert!(TypeHash::UNKNOWN.u64(7).is_unknown());
    }

    #[test]
    fn strings_are_length_prefixed() {
        let a = TypeHash::init().string("ab").string("c");
        let b = TypeHash::init().string("a").string("bc");
        assert_ne!(a, b);
    }
}
