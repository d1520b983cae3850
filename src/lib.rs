//! `hll-distinct` estimates the number of distinct string values in a stream using HyperLogLog,
//! and ships an exact counter to measure how far the estimate is from the truth.
//!
//! Values are hashed with `wyhash` followed by a SplitMix64 finalizer, routed to one of `2^p`
//! one-byte registers, and turned into an estimate by either the raw or the range-corrected policy.
pub mod error;
pub mod estimator;
pub mod exact;
pub mod hash;
pub mod policy;
pub mod registers;
pub mod report;
#[cfg(feature = "with_serde")]
mod serde;

pub use error::{Error, Result};
pub use estimator::CardinalityEstimator;
pub use exact::ExactCounter;
pub use policy::{CorrectionDomain, EstimationPolicy, EstimationPolicyTrait};
pub use registers::Registers;
