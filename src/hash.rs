//! Two-stage hashing of input values.
//!
//! Every value is first hashed with `wyhash` (fixed seed, so results are stable
//! across runs and processes) and the result is passed through the SplitMix64
//! finalizer, which gives full avalanche over all 64 output bits.
//!
//! Changing the seed changes every register position, and with it every estimate
//! produced for a fixed input. The pinned values in the tests below guard that.
//!
//! The top `p` bits of the mixed hash select the register, the remaining
//! `64 - p` bits form the residual whose leading 1-bit position is the rank.

/// Seed of the base string hash, must never equal wyhash's first prime or all values collide
const BASE_SEED: u64 = 0x517c_c1b7_2722_0a95;
/// SplitMix64 increment (golden ratio)
const SPLITMIX_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
/// SplitMix64 first multiplier
const SPLITMIX_MUL_1: u64 = 0xbf58_476d_1ce4_e5b9;
/// SplitMix64 second multiplier
const SPLITMIX_MUL_2: u64 = 0x94d0_49bb_1331_11eb;

/// Hash string value
#[inline]
pub fn hash_str(value: &str) -> u64 {
    hash_bytes(value.as_bytes())
}

/// Hash raw bytes
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    splitmix64(wyhash::wyhash(bytes, BASE_SEED))
}

/// SplitMix64 finalizer.
#[inline]
pub fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(SPLITMIX_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX_MUL_1);
    z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX_MUL_2);
    z ^ (z >> 31)
}

/// Split hash into register index and rank.
///
/// Rank is the 1-indexed position of the first 1-bit of the residual
/// `64 - precision` bits, and is `64 - precision + 1` when the residual is all zeros.
#[inline]
pub fn split_hash(hash: u64, precision: u8) -> (usize, u8) {
    let residual_bits = 64 - u32::from(precision);
    let idx = (hash >> residual_bits) as usize;
    let residual = hash << precision;
    let rank = residual.leading_zeros().min(residual_bits) + 1;
    (idx, rank as u8)
}

/// Maximum rank a register can hold for given precision
#[inline]
pub fn max_rank(precision: u8) -> u8 {
    64 - precision + 1
}
