//! Estimation policies turning a register array into a cardinality estimate.
//!
//! Two policies share the same harmonic-mean estimate
//! `E = alpha * m^2 / sum(2^-register)`:
//! - [`RawPolicy`] always returns `E` as is.
//! - [`CorrectedPolicy`] switches to linear counting for small cardinalities
//!   (`E <= 2.5 * m` with empty registers left) and corrects hash space
//!   saturation for large ones (`E > space / 30`).
//!
//! The large range correction was designed for 32-bit hashes, while hashes
//! used here are 64 bits wide. [`CorrectionDomain`] selects which hash space
//! the correction assumes; `Hash32` keeps the legacy behavior and is the default.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use enum_dispatch::enum_dispatch;

use crate::error::Error;
use crate::registers::Registers;

/// Size of 32-bit hash space
const HASH32_SPACE: f64 = 4_294_967_296.0;
/// Size of 64-bit hash space
const HASH64_SPACE: f64 = 18_446_744_073_709_551_616.0;

/// Estimation policies selectable at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[enum_dispatch]
pub enum EstimationPolicy {
    Raw(RawPolicy),
    Corrected(CorrectedPolicy),
}

/// Policy trait which must be implemented by all estimation policies.
#[enum_dispatch(EstimationPolicy)]
pub trait EstimationPolicyTrait {
    /// Compute cardinality estimate from registers
    fn estimate(&self, registers: &Registers) -> f64;
}

impl EstimationPolicy {
    /// Raw harmonic-mean estimate without range corrections
    pub fn raw() -> Self {
        RawPolicy.into()
    }

    /// Estimate with small and large range corrections
    pub fn corrected(domain: CorrectionDomain) -> Self {
        CorrectedPolicy { domain }.into()
    }
}

impl Default for EstimationPolicy {
    fn default() -> Self {
        Self::corrected(CorrectionDomain::default())
    }
}

impl Display for EstimationPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationPolicy::Raw(_) => f.write_str("raw"),
            EstimationPolicy::Corrected(CorrectedPolicy {
                domain: CorrectionDomain::Hash32,
            }) => f.write_str("corrected"),
            EstimationPolicy::Corrected(CorrectedPolicy {
                domain: CorrectionDomain::Hash64,
            }) => f.write_str("corrected64"),
        }
    }
}

impl FromStr for EstimationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::raw()),
            "corrected" | "corrected32" => Ok(Self::corrected(CorrectionDomain::Hash32)),
            "corrected64" => Ok(Self::corrected(CorrectionDomain::Hash64)),
            _ => Err(Error::UnknownName {
                kind: "estimation policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Always returns the raw harmonic-mean estimate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawPolicy;

impl EstimationPolicyTrait for RawPolicy {
    #[inline]
    fn estimate(&self, registers: &Registers) -> f64 {
        raw_estimate(registers)
    }
}

/// Raw estimate with small range (linear counting) and large range corrections
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorrectedPolicy {
    pub domain: CorrectionDomain,
}

impl EstimationPolicyTrait for CorrectedPolicy {
    fn estimate(&self, registers: &Registers) -> f64 {
        let m = registers.len() as f64;
        let estimate = raw_estimate(registers);

        if estimate <= 2.5 * m {
            match registers.zeros() {
                0 => estimate,
                zeros => linear_counting(registers.len(), zeros),
            }
        } else if estimate > self.domain.threshold() {
            self.domain.correct(estimate)
        } else {
            estimate
        }
    }
}

/// Hash space assumed by the large range correction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorrectionDomain {
    /// `2^32` hash space, as in the original HyperLogLog paper
    #[default]
    Hash32,
    /// `2^64` hash space, matching the width of the hashes actually used
    Hash64,
}

impl CorrectionDomain {
    /// Size of the hash space
    #[inline]
    pub fn space(&self) -> f64 {
        match self {
            CorrectionDomain::Hash32 => HASH32_SPACE,
            CorrectionDomain::Hash64 => HASH64_SPACE,
        }
    }

    /// Estimate above which large range correction applies
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.space() / 30.0
    }

    /// Correct hash space saturation: `-space * ln(1 - E / space)`.
    ///
    /// The logarithm is undefined once `E` reaches the hash space size,
    /// in which case the estimate is returned unchanged.
    #[inline]
    pub fn correct(&self, estimate: f64) -> f64 {
        let space = self.space();
        let ratio = estimate / space;
        if ratio >= 1.0 {
            return estimate;
        }
        -space * (-ratio).ln_1p()
    }
}

impl FromStr for CorrectionDomain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "32" | "hash32" => Ok(CorrectionDomain::Hash32),
            "64" | "hash64" => Ok(CorrectionDomain::Hash64),
            _ => Err(Error::UnknownName {
                kind: "correction domain",
                value: s.to_string(),
            }),
        }
    }
}

/// Harmonic-mean estimate `alpha * m^2 / sum(2^-register)`
#[inline]
pub fn raw_estimate(registers: &Registers) -> f64 {
    let m = registers.len() as f64;
    // every register contributes at least 2^-61, the guard only protects against underflow
    let sum = registers.harmonic_sum().max(f64::MIN_POSITIVE);
    alpha(registers.len()) * m * m / sum
}

/// Linear counting estimate `m * ln(m / zeros)`
#[inline]
pub fn linear_counting(m: usize, zeros: usize) -> f64 {
    let m = m as f64;
    m * (m / zeros as f64).ln()
}

/// Parameter for bias correction
#[inline]
pub fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    fn registers(precision: u8, values: &[(u8, usize)]) -> Registers {
        let data: Vec<u8> = values
            .iter()
            .flat_map(|&(rank, n)| std::iter::repeat(rank).take(n))
            .collect();
        Registers::from_vec(precision, data).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= expected.abs() * 1e-9,
            "actual = {actual}, expected = {expected}"
        );
    }

    #[test_case(16 => 0.673)]
    #[test_case(32 => 0.697)]
    #[test_case(64 => 0.709)]
    #[test_case(1024 => 0.7213 / (1.0 + 1.079 / 1024.0))]
    #[test_case(65536 => 0.7213 / (1.0 + 1.079 / 65536.0))]
    fn test_alpha(m: usize) -> f64 {
        alpha(m)
    }

    #[test_case(4)]
    #[test_case(10)]
    #[test_case(16)]
    fn test_empty_registers(precision: u8) {
        let registers = Registers::new(precision).unwrap();
        let m = registers.len();
        assert_close(EstimationPolicy::raw().estimate(&registers), alpha(m) * m as f64);
        assert_eq!(EstimationPolicy::default().estimate(&registers), 0.0);
        assert_eq!(
            EstimationPolicy::corrected(CorrectionDomain::Hash64).estimate(&registers),
            0.0
        );
    }

    #[test]
    fn test_small_range_uses_linear_counting() {
        let registers = registers(4, &[(1, 8), (0, 8)]);
        assert_close(
            EstimationPolicy::raw().estimate(&registers),
            0.673 * 256.0 / 12.0,
        );
        assert_close(
            EstimationPolicy::default().estimate(&registers),
            16.0 * 2f64.ln(),
        );
    }

    #[test]
    fn test_small_range_without_zero_registers() {
        let registers = registers(4, &[(1, 16)]);
        let raw = EstimationPolicy::raw().estimate(&registers);
        assert_close(raw, 0.673 * 256.0 / 8.0);
        assert_eq!(EstimationPolicy::default().estimate(&registers), raw);
    }

    #[test]
    fn test_intermediate_range_is_uncorrected() {
        let registers = registers(4, &[(3, 16)]);
        let raw = EstimationPolicy::raw().estimate(&registers);
        assert_close(raw, 0.673 * 16.0 * 8.0);
        assert_eq!(EstimationPolicy::default().estimate(&registers), raw);
    }

    #[test]
    fn test_large_range_correction_depends_on_domain() {
        // raw estimate ~1.8e8 is above 2^32 / 30 but far below 2^64 / 30
        let registers = registers(4, &[(24, 16)]);
        let raw = EstimationPolicy::raw().estimate(&registers);
        assert_close(raw, 0.673 * 16.0 * 16_777_216.0);

        let legacy = EstimationPolicy::corrected(CorrectionDomain::Hash32).estimate(&registers);
        assert_close(legacy, -HASH32_SPACE * (1.0 - raw / HASH32_SPACE).ln());
        assert!(legacy > raw);

        let wide = EstimationPolicy::corrected(CorrectionDomain::Hash64).estimate(&registers);
        assert_eq!(wide, raw);
    }

    #[test]
    fn test_large_range_correction_in_hash64_domain() {
        // raw estimate ~3.1e18 is above 2^64 / 30 and still below 2^64
        let registers = registers(4, &[(58, 16)]);
        let raw = EstimationPolicy::raw().estimate(&registers);
        assert_close(raw, 0.673 * 16.0 * 2f64.powi(58));
        assert!(raw > HASH64_SPACE / 30.0 && raw < HASH64_SPACE);

        let wide = EstimationPolicy::corrected(CorrectionDomain::Hash64).estimate(&registers);
        assert_close(wide, -HASH64_SPACE * (1.0 - raw / HASH64_SPACE).ln());
        assert!(wide > raw);

        // far beyond 2^32 the legacy domain can't correct and keeps the raw estimate
        let legacy = EstimationPolicy::corrected(CorrectionDomain::Hash32).estimate(&registers);
        assert_eq!(legacy, raw);
    }

    #[test]
    fn test_saturated_registers_fall_back_to_raw() {
        let registers = registers(4, &[(61, 16)]);
        let raw = EstimationPolicy::raw().estimate(&registers);
        assert!(raw > HASH32_SPACE);
        assert!(raw > HASH64_SPACE);
        for domain in [CorrectionDomain::Hash32, CorrectionDomain::Hash64] {
            let estimate = EstimationPolicy::corrected(domain).estimate(&registers);
            assert!(estimate.is_finite());
            assert_eq!(estimate, raw);
        }
    }

    #[test_case("raw" => EstimationPolicy::raw())]
    #[test_case("corrected" => EstimationPolicy::corrected(CorrectionDomain::Hash32))]
    #[test_case("Corrected32" => EstimationPolicy::corrected(CorrectionDomain::Hash32))]
    #[test_case("corrected64" => EstimationPolicy::corrected(CorrectionDomain::Hash64))]
    fn test_policy_from_str(s: &str) -> EstimationPolicy {
        s.parse().unwrap()
    }

    #[test_case(EstimationPolicy::raw())]
    #[test_case(EstimationPolicy::corrected(CorrectionDomain::Hash32))]
    #[test_case(EstimationPolicy::corrected(CorrectionDomain::Hash64))]
    fn test_policy_display_parses_back(policy: EstimationPolicy) {
        assert_eq!(policy.to_string().parse::<EstimationPolicy>().unwrap(), policy);
    }

    #[test]
    fn test_unknown_names() {
        assert!(matches!(
            "loglog".parse::<EstimationPolicy>(),
            Err(Error::UnknownName { kind: "estimation policy", .. })
        ));
        assert!(matches!(
            "128".parse::<CorrectionDomain>(),
            Err(Error::UnknownName { kind: "correction domain", .. })
        ));
        assert_eq!("64".parse::<CorrectionDomain>().unwrap(), CorrectionDomain::Hash64);
    }
}
