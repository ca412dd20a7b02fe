//! Deterministic hash-based symbol identity.
//!
//! [`SymbolHash`] identifies module functions and native types by name. Hashes
//! are computed with XXHash64 and a per-domain mixing constant, so a function
//! and a type that share a name never collide.
//!
//! # Examples
//!
//! ```
//! use jetson_utils_core::SymbolHash;
//!
//! let a = SymbolHash::from_function("cudaMalloc");
//! let b = SymbolHash::from_function("cudaMalloc");
//! assert_eq!(a, b);
//! assert_ne!(a, SymbolHash::from_type("cudaMalloc"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Domain marker for native type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for module function hashes
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for type method hashes
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;
}

/// A deterministic 64-bit hash identifying a function, type, or method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolHash(pub u64);

impl SymbolHash {
    /// Hash of a module-level function name.
    #[inline]
    pub fn from_function(name: &str) -> Self {
        SymbolHash(hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a native type name.
    #[inline]
    pub fn from_type(name: &str) -> Self {
        SymbolHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a method on a native type.
    ///
    /// The owning type participates, so `cudaImage.copy` and `cudaMemory.copy`
    /// are distinct.
    #[inline]
    pub fn from_method(owner: SymbolHash, name: &str) -> Self {
        let name = xxh64(name.as_bytes(), 0);
        SymbolHash(hash_constants::METHOD ^ owner.0.rotate_left(17) ^ name)
    }
}

impl fmt::Debug for SymbolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolHash({:#018x})", self.0)
    }
}

impl fmt::Display for SymbolHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(
            SymbolHash::from_function("cudaMemcpy"),
            SymbolHash::from_function("cudaMemcpy")
        );
    }

    #[test]
    fn domains_do_not_collide() {
        let name = "cudaImage";
        assert_ne!(SymbolHash::from_function(name), SymbolHash::from_type(name));
    }

    #[test]
    fn method_depends_on_owner() {
        let memory = SymbolHash::from_type("cudaMemory");
        let image = SymbolHash::from_type("cudaImage");
        assert_ne!(
            SymbolHash::from_method(memory, "size"),
            SymbolHash::from_method(image, "size")
        );
    }
}
