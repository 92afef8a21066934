// Numeric types and operations.
//
// - biguint: Arbitrary-precision unsigned integer over u64 words
// - modular: Overflow-safe modular arithmetic over fixed-width integers
// - sqrt: Integer square root
// - random: RNG wrappers and rejection sampling
// - bitop: Bit rotation utilities
// - bytes: Byte/bit packing for serialization boundaries

pub mod biguint;
pub mod bitop;
pub mod bytes;
pub mod modular;
pub mod random;
pub mod sqrt;

// Re-export the primary types and capabilities at the crate level.
pub use biguint::{BigUint, FromFloatError, ParseBigUintError};
pub use modular::ModularOps;
pub use sqrt::Sqrt;
