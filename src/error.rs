use thiserror::Error;

/// Errors produced while configuring, restoring or merging estimators.
#[derive(Debug, Error)]
pub enum Error {
    /// Precision outside of the supported `[4, 18]` range, never clamped.
    ///
    /// Precisions 1..=3 and 19..=32 would be representable but are rejected as well:
    /// below 4 the bias constants are undefined, above 18 the register array exceeds 256 KiB.
    #[error("invalid precision {precision}: must be in [{min}..={max}]")]
    InvalidPrecision { precision: u8, min: u8, max: u8 },
    /// Estimators built with different precision can't be merged.
    #[error("precision mismatch: expected {expected}, found {found}")]
    PrecisionMismatch { expected: u8, found: u8 },
    /// Restored register array doesn't have `2^p` registers.
    #[error("invalid register array length: expected {expected}, found {found}")]
    InvalidRegisters { expected: usize, found: usize },
    /// Restored register holds a rank no hash could produce.
    #[error("invalid rank {rank} at register {index}: must be <= {max}")]
    InvalidRank { index: usize, rank: u8, max: u8 },
    /// Unknown estimation policy or correction domain name.
    #[error("unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },
    /// Failure reading the input stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
