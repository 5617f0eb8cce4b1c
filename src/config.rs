//! Maglev load balancer configuration types.

use crate::error::{MaglevError, MaglevResult};
use serde::{Deserialize, Serialize};

/// Recommended table size from section 5.3 of the Maglev paper.
pub const DEFAULT_TABLE_SIZE: u64 = 65537;

/// Largest accepted table size.
pub const MAX_TABLE_SIZE: u64 = 5_000_011;

/// Configuration for the Maglev load balancer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaglevConfig {
    /// Number of slots in the lookup table. Must be prime; larger tables
    /// reduce the per-host share error at the cost of memory and build time.
    pub table_size: u64,

    /// Hash hosts by hostname instead of resolved address. Keeps slot
    /// assignment stable across address families and re-resolution.
    pub use_hostname_for_hashing: bool,

    /// Bounded-load factor in percent (e.g. 125 caps any host at 1.25x the
    /// average load). Zero disables the bounded-load wrapper.
    pub hash_balance_factor: u32,
}

impl Default for MaglevConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            use_hostname_for_hashing: false,
            hash_balance_factor: 0,
        }
    }
}

impl MaglevConfig {
    /// Validate the configuration.
    ///
    /// The builder assumes a valid table size, so this must be called before
    /// the config reaches a [`crate::balancer::MaglevBalancer`].
    pub fn validate(&self) -> MaglevResult<()> {
        if self.table_size == 0 {
            return Err(MaglevError::TableSizeZero(self.table_size));
        }
        if self.table_size > MAX_TABLE_SIZE {
            return Err(MaglevError::TableSizeTooLarge {
                size: self.table_size,
                max: MAX_TABLE_SIZE,
            });
        }
        if !is_prime(self.table_size) {
            return Err(MaglevError::TableSizeNotPrime(self.table_size));
        }
        Ok(())
    }
}

/// Trial-division primality check. Table sizes are bounded by
/// [`MAX_TABLE_SIZE`], so this runs in at most ~2200 iterations.
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
