//! Permutation hashing for table construction.
//!
//! Each host gets a deterministic `(offset, skip)` pair derived from two
//! independent xxHash64 values over its hash key. Because the table size is
//! prime, every `skip` in `[1, table_size - 1]` is coprime with it and the
//! probe sequence `offset + n * skip (mod table_size)` visits every slot
//! exactly once before repeating.

use xxhash_rust::xxh64::xxh64;

/// Per-host probe sequence parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    offset: u64,
    skip: u64,
    table_size: u64,
}

impl Permutation {
    /// Derive the probe parameters for a host key.
    ///
    /// `table_size` must be at least 2 and prime; config validation enforces
    /// this before any build starts.
    #[must_use]
    pub fn new(key: &str, table_size: u64) -> Self {
        Self {
            offset: xxh64(key.as_bytes(), 0) % table_size,
            skip: xxh64(key.as_bytes(), 1) % (table_size - 1) + 1,
            table_size,
        }
    }

    /// Candidate slot for the given probe index.
    ///
    /// `offset` and `skip` are both below the table size, which is capped at
    /// ~5M, so the product stays far away from u64 overflow.
    #[inline]
    #[must_use]
    pub fn slot(&self, next: u64) -> u64 {
        (self.offset + (next % self.table_size) * self.skip) % self.table_size
    }

    /// Starting slot of the sequence.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Stride of the sequence, always in `[1, table_size - 1]`.
    #[must_use]
    pub fn skip(&self) -> u64 {
        self.skip
    }
}
