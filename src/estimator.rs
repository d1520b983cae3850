//! Cardinality estimator allows to estimate number of distinct string values
//! in a stream or dataset and is configured with two parameters:
//! - `precision`: number of hash bits used for register indices, in [4..18] range.
//!   The estimator keeps `M = 2^precision` one-byte registers.
//! - `policy`: how registers are turned into an estimate, see [`EstimationPolicy`].
//!
//! # Data-structure design rationale
//!
//! ## Memory footprint
//! Register array takes exactly `M` bytes regardless of the number of inserted values:
//! - P = 10: 1 KiB
//! - P = 12: 4 KiB
//! - P = 16: 64 KiB
//!
//! ## Accuracy
//! Expected relative error is `1.04 / sqrt(M)`:
//!   P = 10: 3.25%
//!   P = 12: 1.62%
//!   P = 14: 0.81%
//!   P = 16: 0.41%
//!
//! ## Mergeability
//! Register updates are commutative and idempotent, so input can be partitioned,
//! counted by independent estimators and merged via per-register maximum.
//! The result is identical to counting the whole input with a single estimator.

use std::fmt::{Debug, Formatter};
use std::mem::size_of;
use std::thread;

use tracing::debug;

use crate::error::Result;
use crate::hash::{hash_bytes, hash_str};
use crate::policy::{EstimationPolicy, EstimationPolicyTrait};
use crate::registers::{Registers, MAX_PRECISION, MIN_PRECISION};

/// Precision used by `Default` implementation
pub const DEFAULT_PRECISION: u8 = 12;

#[derive(Clone, PartialEq)]
pub struct CardinalityEstimator {
    /// Register array exclusively owned by this estimator
    registers: Registers,
    /// Policy applied on `estimate`
    policy: EstimationPolicy,
}

impl CardinalityEstimator {
    /// Creates new instance of `CardinalityEstimator`
    pub fn new(precision: u8, policy: EstimationPolicy) -> Result<Self> {
        let registers = Registers::new(precision)?;
        debug!(precision, %policy, "created cardinality estimator");
        Ok(Self { registers, policy })
    }

    /// Creates new instance with default corrected policy
    pub fn with_precision(precision: u8) -> Result<Self> {
        Self::new(precision, EstimationPolicy::default())
    }

    /// Creates new instance from previously built registers
    pub fn from_registers(registers: Registers, policy: EstimationPolicy) -> Self {
        Self { registers, policy }
    }

    /// Insert string value into `CardinalityEstimator`
    #[inline]
    pub fn insert(&mut self, item: &str) {
        self.insert_hash(hash_str(item));
    }

    /// Insert raw bytes into `CardinalityEstimator`
    #[inline]
    pub fn insert_bytes(&mut self, item: &[u8]) {
        self.insert_hash(hash_bytes(item));
    }

    /// Insert hash into `CardinalityEstimator`.
    ///
    /// The hash must come from [`crate::hash`] so that it is distributed the same way
    /// as hashes of all other inserted values.
    #[inline]
    pub fn insert_hash(&mut self, hash: u64) {
        self.registers.update(hash);
    }

    /// Return cardinality estimate using configured policy
    #[inline]
    pub fn estimate(&self) -> f64 {
        self.policy.estimate(&self.registers)
    }

    /// Return cardinality estimate using given policy
    #[inline]
    pub fn estimate_with(&self, policy: &EstimationPolicy) -> f64 {
        policy.estimate(&self.registers)
    }

    /// Merge cardinality estimators
    pub fn merge(&mut self, rhs: &Self) -> Result<()> {
        self.registers.merge(&rhs.registers)?;
        debug!(precision = self.precision(), "merged cardinality estimators");
        Ok(())
    }

    /// Return precision
    #[inline]
    pub fn precision(&self) -> u8 {
        self.registers.precision()
    }

    /// Return number of registers
    #[inline]
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Return estimation policy
    #[inline]
    pub fn policy(&self) -> EstimationPolicy {
        self.policy
    }

    /// Return register array
    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Expected relative standard error `1.04 / sqrt(M)`
    #[inline]
    pub fn standard_error(&self) -> f64 {
        error_for_precision(self.precision())
    }

    /// Reset all registers
    pub fn clear(&mut self) {
        self.registers.clear();
    }

    /// Return memory size of `CardinalityEstimator`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() - size_of::<Registers>() + self.registers.size_of()
    }
}

impl Default for CardinalityEstimator {
    fn default() -> Self {
        Self {
            registers: Registers::zeroed(DEFAULT_PRECISION),
            policy: EstimationPolicy::default(),
        }
    }
}

impl<S: AsRef<str>> Extend<S> for CardinalityEstimator {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for CardinalityEstimator {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut estimator = Self::default();
        estimator.extend(iter);
        estimator
    }
}

impl Debug for CardinalityEstimator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ policy: {}, estimate: {:.0}, size: {} }}",
            self.policy,
            self.estimate(),
            self.size_of()
        )
    }
}

/// Count each partition with its own estimator on a scoped thread and merge the results.
pub fn estimate_partitioned<S: AsRef<str> + Sync>(
    partitions: &[&[S]],
    precision: u8,
    policy: EstimationPolicy,
) -> Result<CardinalityEstimator> {
    let mut merged = CardinalityEstimator::new(precision, policy)?;
    let partials: Vec<CardinalityEstimator> = thread::scope(|scope| {
        let handles: Vec<_> = partitions
            .iter()
            .map(|partition| {
                scope.spawn(move || {
                    let mut estimator = CardinalityEstimator {
                        registers: Registers::zeroed(precision),
                        policy,
                    };
                    estimator.extend(partition.iter());
                    estimator
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(estimator) => estimator,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });
    for partial in &partials {
        merged.merge(partial)?;
    }
    Ok(merged)
}

/// Compute the smallest supported precision whose expected error is at most `target_error`.
///
/// Returns `None` if `target_error` is not a positive number, or if reaching it
/// would take more than [`MAX_PRECISION`] bits. Targets looser than the error of
/// [`MIN_PRECISION`] yield `MIN_PRECISION`.
pub fn precision_for_error(target_error: f64) -> Option<u8> {
    if target_error.is_nan() || target_error <= 0.0 {
        return None;
    }
    let bits = (1.04 / target_error).powi(2).log2().ceil();
    if bits > f64::from(MAX_PRECISION) {
        return None;
    }
    Some(bits.max(f64::from(MIN_PRECISION)) as u8)
}

/// Expected relative standard error `1.04 / sqrt(2^precision)` for given precision
pub fn error_for_precision(precision: u8) -> f64 {
    1.04 / f64::from(precision).exp2().sqrt()
}
