//! Maglev load balancer error types.

use thiserror::Error;

/// Errors that can occur when configuring or rebuilding the Maglev table.
#[derive(Debug, Error)]
pub enum MaglevError {
    /// Table size must be positive.
    #[error("table size must be positive, got {0}")]
    TableSizeZero(u64),

    /// Table size must be prime for the permutation to cover every slot.
    #[error("table size {0} is not prime")]
    TableSizeNotPrime(u64),

    /// Table size exceeds the supported maximum.
    #[error("table size {size} exceeds maximum {max}")]
    TableSizeTooLarge {
        /// Requested size.
        size: u64,
        /// Largest supported size.
        max: u64,
    },

    /// A rebuild was requested with no hosts.
    #[error("host weight vector is empty")]
    NoHosts,

    /// The maximum normalized weight handed down by weight normalization
    /// must be positive and finite.
    #[error("invalid max normalized weight {0}")]
    InvalidMaxWeight(f64),
}

/// Result type for Maglev operations.
pub type MaglevResult<T> = Result<T, MaglevError>;
