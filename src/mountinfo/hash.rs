//! Fast string hashing used to pre-filter equality checks in catalog lookups.
//!
//! The hash is never trusted on its own: a matching hash is always confirmed with an exact
//! comparison of the underlying strings.

use xxhash_rust::xxh32::xxh32;

const SEED: u32 = 0;

/// Returns the 32-bit xxHash of `bytes`.
#[inline]
pub fn fast_hash(bytes: &[u8]) -> u32 {
    xxh32(bytes, SEED)
}
