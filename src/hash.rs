//! FNV-1a hashing for command identities.
//!
//! Every command name maps to a 64-bit FNV-1a [`Digest`]. Unlike command
//! ordinals, digests depend only on the name, so they stay valid across builds
//! that compile in a different set of extensions.
//!
//! The generic form is parameterized by storage width, offset basis, prime and
//! significant-bit count. Wider storage can reproduce a narrower hash: once the
//! result is masked to `MAX_DIGITS` bits, `u64` and `u32` storage agree for the
//! 32-bit constants, and so on.

/// A 64-bit FNV-1a hash of a command name.
pub type Digest = u64;

/// 64-bit FNV-1a offset basis.
pub const OFFSET_BASIS_64: u64 = 0xcbf29ce484222325;

/// 64-bit FNV-1a prime.
pub const PRIME_64: u64 = 0x100000001b3;

/// 32-bit FNV-1a offset basis.
pub const OFFSET_BASIS_32: u32 = 0x811c9dc5;

/// 32-bit FNV-1a prime.
pub const PRIME_32: u32 = 0x01000193;

macro_rules! basic_fnv1a {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        ///
        /// Consumes bytes up to the end of the slice or the first NUL byte,
        /// whichever comes first. When `MAX_DIGITS` is narrower than the storage
        /// type, the result is masked to its low `MAX_DIGITS` bits.
        pub const fn $name<const OFFSET: $ty, const PRIME: $ty, const MAX_DIGITS: u32>(
            bytes: &[u8],
        ) -> $ty {
            const {
                assert!(
                    MAX_DIGITS <= <$ty>::BITS,
                    "MAX_DIGITS cannot exceed the width of the storage type"
                );
                assert!(MAX_DIGITS > 0, "MAX_DIGITS must be non-zero");
            }
            let mut hash = OFFSET;
            let mut i = 0;
            while i < bytes.len() && bytes[i] != 0 {
                hash ^= bytes[i] as $ty;
                hash = hash.wrapping_mul(PRIME);
                i += 1;
            }
            // Drop digits beyond MAX_DIGITS so wider storage compares equal.
            hash & (<$ty>::MAX >> (<$ty>::BITS - MAX_DIGITS))
        }
    };
}

basic_fnv1a!(
    /// FNV-1a with `u32` storage.
    basic_fnv1a_u32,
    u32
);
basic_fnv1a!(
    /// FNV-1a with `u64` storage.
    basic_fnv1a_u64,
    u64
);
basic_fnv1a!(
    /// FNV-1a with `u128` storage.
    basic_fnv1a_u128,
    u128
);

/// FNV-1a 64-bit hash, the canonical command identity.
#[inline]
pub const fn fnv1a_64(bytes: &[u8]) -> Digest {
    basic_fnv1a_u64::<OFFSET_BASIS_64, PRIME_64, 64>(bytes)
}

/// FNV-1a 32-bit hash.
#[inline]
pub const fn fnv1a_32(bytes: &[u8]) -> u32 {
    basic_fnv1a_u32::<OFFSET_BASIS_32, PRIME_32, 32>(bytes)
}
