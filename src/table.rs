//! Maglev lookup table representations.
//!
//! Two storage strategies share one lookup contract:
//!
//! - [`DirectTable`] keeps one host reference per slot. Simple, but at the
//!   default table size it costs `65537 * sizeof(Arc)` per generation.
//! - [`CompactTable`] keeps one reference per distinct host plus a bit-packed
//!   index per slot, shrinking the table to `ceil(log2(hosts))` bits per slot.
//!
//! Both are decoded from the same [`builder`](crate::builder) assignment, so
//! for identical inputs they return identical hosts for every
//! `(hash, attempt)` pair.

use crate::bit_array::BitArray;
use crate::builder::{self, TableAssignment};
use crate::host::{Host, NormalizedHostWeightVector};
use crate::selector::HashingSelector;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Most hosts a compact table can index.
pub const MAX_COMPACT_HOSTS: usize = (1 << 32) - 1;

/// An immutable Maglev lookup table.
///
/// The storage representation is picked once at build time; lookup semantics
/// are identical across representations.
pub struct MaglevTable {
    storage: TableStorage,
    max_entries_per_host: u64,
    min_entries_per_host: u64,
}

/// Closed set of storage strategies, each carrying its own data.
enum TableStorage {
    Direct(DirectTable),
    Compact(CompactTable),
}

impl MaglevTable {
    /// Build a table from normalized host weights.
    ///
    /// Prefers the compact representation whenever packed indices take less
    /// memory than per-slot references, which holds for any host count it can
    /// index. The caller guarantees a non-empty vector and a validated
    /// (prime) `table_size`.
    #[must_use]
    pub fn build(
        host_weights: &NormalizedHostWeightVector,
        max_normalized_weight: f64,
        table_size: u64,
        use_hostname_for_hashing: bool,
    ) -> Self {
        if host_weights.is_empty() {
            // Membership should reject this upstream; an empty table answers
            // every lookup with None rather than looping on an unfillable fill.
            warn!("building maglev table with no hosts");
            return Self {
                storage: TableStorage::Direct(DirectTable { table: Vec::new() }),
                max_entries_per_host: 0,
                min_entries_per_host: 0,
            };
        }

        let assignment = builder::build_assignment(
            host_weights,
            max_normalized_weight,
            table_size,
            use_hostname_for_hashing,
        );

        let storage = if host_weights.len() <= MAX_COMPACT_HOSTS {
            TableStorage::Compact(CompactTable::from_assignment(&assignment))
        } else {
            TableStorage::Direct(DirectTable::from_assignment(&assignment))
        };

        let table = Self {
            storage,
            max_entries_per_host: assignment.max_count(),
            min_entries_per_host: assignment.min_count(),
        };

        debug!(
            table_size,
            hosts = host_weights.len(),
            representation = table.representation(),
            max_entries_per_host = table.max_entries_per_host,
            min_entries_per_host = table.min_entries_per_host,
            "built maglev table"
        );
        table.log_table(use_hostname_for_hashing);
        table
    }

    /// Slots in the table.
    #[must_use]
    pub fn table_size(&self) -> u64 {
        match &self.storage {
            TableStorage::Direct(t) => t.table.len() as u64,
            TableStorage::Compact(t) => t.table.len() as u64,
        }
    }

    /// Highest per-host slot count.
    #[must_use]
    pub fn max_entries_per_host(&self) -> u64 {
        self.max_entries_per_host
    }

    /// Lowest per-host slot count.
    #[must_use]
    pub fn min_entries_per_host(&self) -> u64 {
        self.min_entries_per_host
    }

    /// Name of the storage representation, for logs and tests.
    #[must_use]
    pub fn representation(&self) -> &'static str {
        match &self.storage {
            TableStorage::Direct(_) => "direct",
            TableStorage::Compact(_) => "compact",
        }
    }

    /// Dump every slot at trace level. Useful when diffing slot churn across
    /// rebuilds; skipped entirely unless trace logging is enabled.
    fn log_table(&self, use_hostname_for_hashing: bool) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        for slot in 0..self.table_size() {
            if let Some(host) = self.choose_host(slot, 0) {
                trace!(slot, key = host.hash_key(use_hostname_for_hashing), "maglev slot");
            }
        }
    }
}

impl HashingSelector for MaglevTable {
    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>> {
        match &self.storage {
            TableStorage::Direct(t) => t.choose_host(hash, attempt),
            TableStorage::Compact(t) => t.choose_host(hash, attempt),
        }
    }
}

/// Table storing a host reference in every slot.
struct DirectTable {
    table: Vec<Arc<Host>>,
}

impl DirectTable {
    fn from_assignment(assignment: &TableAssignment) -> Self {
        let table = assignment
            .slot_hosts
            .iter()
            .map(|&i| Arc::clone(&assignment.hosts[i as usize]))
            .collect();
        Self { table }
    }

    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>> {
        if self.table.is_empty() {
            return None;
        }
        let slot = (hash.wrapping_add(u64::from(attempt)) % self.table.len() as u64) as usize;
        Some(Arc::clone(&self.table[slot]))
    }
}

/// Table storing bit-packed indices into a deduplicated host list.
struct CompactTable {
    table: BitArray,
    host_table: Vec<Arc<Host>>,
}

impl CompactTable {
    fn from_assignment(assignment: &TableAssignment) -> Self {
        let host_table: Vec<Arc<Host>> = assignment.hosts.clone();
        let mut table = BitArray::new(
            BitArray::width_for(host_table.len()),
            assignment.slot_hosts.len(),
        );
        for (slot, &host_index) in assignment.slot_hosts.iter().enumerate() {
            table.set(slot, host_index);
        }
        Self { table, host_table }
    }

    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>> {
        if self.table.is_empty() {
            return None;
        }
        let slot = (hash.wrapping_add(u64::from(attempt)) % self.table.len() as u64) as usize;
        let host_index = self.table.get(slot) as usize;
        Some(Arc::clone(&self.host_table[host_index]))
    }
}
