//! ## Register array
//! Fixed array of `M = 2^P` registers, one byte per register.
//!
//! Each register stores the maximum rank observed for hashes routed into it.
//! Registers start at zero and only ever grow, so updates commute and
//! re-applying the same hash is a no-op. Two arrays of the same precision
//! merge by taking the per-register maximum.

use std::fmt::{Debug, Formatter};
use std::mem::{size_of, size_of_val};

use crate::error::{Error, Result};
use crate::hash::{max_rank, split_hash};

/// Smallest supported precision
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision
pub const MAX_PRECISION: u8 = 18;

#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    precision: u8,
    data: Box<[u8]>,
}

impl Registers {
    /// Create zeroed register array with `2^precision` registers
    pub fn new(precision: u8) -> Result<Self> {
        validate_precision(precision)?;
        Ok(Self::zeroed(precision))
    }

    /// Create zeroed register array assuming `precision` is already validated
    #[inline]
    pub(crate) fn zeroed(precision: u8) -> Self {
        Self {
            precision,
            data: vec![0u8; 1 << precision].into_boxed_slice(),
        }
    }

    /// Restore register array from raw register values
    pub fn from_vec(precision: u8, data: Vec<u8>) -> Result<Self> {
        validate_precision(precision)?;
        let expected = 1usize << precision;
        if data.len() != expected {
            return Err(Error::InvalidRegisters {
                expected,
                found: data.len(),
            });
        }
        let max = max_rank(precision);
        if let Some((index, &rank)) = data.iter().enumerate().find(|&(_, &r)| r > max) {
            return Err(Error::InvalidRank { index, rank, max });
        }
        Ok(Self {
            precision,
            data: data.into_boxed_slice(),
        })
    }

    /// Return precision
    #[inline]
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Return number of registers
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Register arrays always hold at least `2^MIN_PRECISION` registers
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return `idx` register
    #[inline]
    pub fn get(&self, idx: usize) -> Option<u8> {
        self.data.get(idx).copied()
    }

    /// Return raw register values
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Route hash to its register and raise the register to the hash rank
    #[inline]
    pub fn update(&mut self, hash: u64) {
        let (idx, rank) = split_hash(hash, self.precision);
        self.update_rank(idx, rank);
    }

    /// Raise `idx` register to `rank` if it is currently lower.
    ///
    /// Callers pass `idx < 2^p` and `rank <= max_rank(p)`, as produced by [`split_hash`].
    #[inline]
    pub(crate) fn update_rank(&mut self, idx: usize, rank: u8) {
        let register = &mut self.data[idx];
        if rank > *register {
            *register = rank;
        }
    }

    /// Merge registers of `rhs` via per-register maximum
    pub fn merge(&mut self, rhs: &Registers) -> Result<()> {
        if self.precision != rhs.precision {
            return Err(Error::PrecisionMismatch {
                expected: self.precision,
                found: rhs.precision,
            });
        }
        for (lhs, &rhs) in self.data.iter_mut().zip(rhs.data.iter()) {
            *lhs = (*lhs).max(rhs);
        }
        Ok(())
    }

    /// Number of registers still set to zero
    #[inline]
    pub fn zeros(&self) -> usize {
        self.data.iter().filter(|&&r| r == 0).count()
    }

    /// Sum of `2^-register` over all registers
    #[inline]
    pub fn harmonic_sum(&self) -> f64 {
        self.data.iter().map(|&r| (-f64::from(r)).exp2()).sum()
    }

    /// Reset all registers to zero
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Return memory size of register array
    #[inline]
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(&*self.data)
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ precision: {}, zeros: {}, size: {} }}",
            self.precision,
            self.zeros(),
            self.size_of()
        )
    }
}

/// Check that precision is in `[MIN_PRECISION..=MAX_PRECISION]` range
#[inline]
pub(crate) fn validate_precision(precision: u8) -> Result<()> {
    if (MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        Ok(())
    } else {
        Err(Error::InvalidPrecision {
            precision,
            min: MIN_PRECISION,
            max: MAX_PRECISION,
        })
    }
}
