//! Deterministic seed derivation.
//!
//! Not cryptographic. Used so every run in a series gets its own RNG stream
//! while the whole series stays reproducible from one base seed.

/// Stable hash of `(seed, x)`.
///
/// SplitMix64 over the mixed input; cheap and stable across platforms.
#[must_use]
pub fn stable_hash64_u64(seed: u64, x: u64) -> u64 {
    splitmix64(seed ^ splitmix64(x))
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
