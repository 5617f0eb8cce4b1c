//! Weighted Maglev table fill.
//!
//! Implements the table population algorithm from section 3.4 of the Maglev
//! paper, extended with per-host weights: hosts accrue credit proportional to
//! their normalized weight each round and claim one slot per whole credit, so
//! a host ends up owning close to `weight * table_size` slots.

use crate::hashing::Permutation;
use crate::host::{Host, NormalizedHostWeightVector};
use std::sync::Arc;

/// Sentinel for an unclaimed slot during the fill.
const EMPTY: u32 = u32::MAX;

/// Per-host construction state. Exists only while the table is being built.
struct TableBuildEntry {
    host: Arc<Host>,
    permutation: Permutation,
    /// `weight / max_normalized_weight`; the heaviest host gets 1.0 and
    /// claims a slot on essentially every round.
    target_weight: f64,
    /// Accrued claim credit.
    credit: f64,
    /// Probe cursor into the permutation sequence.
    next: u64,
    /// Slots claimed so far.
    count: u64,
}

impl TableBuildEntry {
    /// Next candidate slot, advancing the probe cursor.
    fn next_slot(&mut self) -> u64 {
        let slot = self.permutation.slot(self.next);
        self.next += 1;
        slot
    }
}

/// The slot assignment both table representations are decoded from.
///
/// Sharing one assignment is what makes the direct and compact
/// representations behaviorally equivalent: they are two encodings of this
/// structure, not two runs of the algorithm.
pub(crate) struct TableAssignment {
    /// Slot -> index into `hosts`.
    pub slot_hosts: Vec<u32>,
    /// Distinct hosts in input order.
    pub hosts: Vec<Arc<Host>>,
    /// Slots claimed per host, in input order.
    pub counts: Vec<u64>,
}

impl TableAssignment {
    /// Highest per-host slot count.
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Lowest per-host slot count.
    pub fn min_count(&self) -> u64 {
        self.counts.iter().copied().min().unwrap_or(0)
    }
}

/// Fill a `table_size`-slot table from the normalized host weights.
///
/// The caller guarantees a non-empty host vector, a prime `table_size`, and
/// weights in `(0, 1]` with `max_normalized_weight` equal to the largest.
/// Rounds walk the hosts in input order, which is the deterministic tie-break
/// between hosts whose credit crosses 1.0 in the same round.
///
/// # Panics
///
/// Panics if any derived target weight is non-positive or non-finite. That
/// only happens when upstream weight normalization is broken, and a table
/// that cannot fill is an unrecoverable logic defect, not a runtime error.
pub(crate) fn build_assignment(
    host_weights: &NormalizedHostWeightVector,
    max_normalized_weight: f64,
    table_size: u64,
    use_hostname_for_hashing: bool,
) -> TableAssignment {
    debug_assert!(!host_weights.is_empty());
    debug_assert!(host_weights.len() < EMPTY as usize);

    let mut entries: Vec<TableBuildEntry> = host_weights
        .iter()
        .map(|(host, weight)| {
            let target_weight = weight / max_normalized_weight;
            assert!(
                target_weight > 0.0 && target_weight.is_finite(),
                "invalid target weight {target_weight} for host {host}; \
                 weight normalization produced unusable input"
            );
            TableBuildEntry {
                host: Arc::clone(host),
                permutation: Permutation::new(
                    host.hash_key(use_hostname_for_hashing),
                    table_size,
                ),
                target_weight,
                credit: 0.0,
                next: 0,
                count: 0,
            }
        })
        .collect();

    let mut slot_hosts = vec![EMPTY; table_size as usize];
    let mut filled = 0u64;

    while filled < table_size {
        for (i, entry) in entries.iter_mut().enumerate() {
            if filled == table_size {
                break;
            }
            entry.credit += entry.target_weight;
            if entry.credit < 1.0 {
                continue;
            }
            entry.credit -= 1.0;

            // The permutation covers every slot once per cycle, so as long as
            // an empty slot exists this probe terminates.
            let mut slot = entry.next_slot();
            while slot_hosts[slot as usize] != EMPTY {
                slot = entry.next_slot();
            }
            slot_hosts[slot as usize] = i as u32;
            entry.count += 1;
            filled += 1;
        }
    }

    let (hosts, counts) = entries.into_iter().map(|e| (e.host, e.count)).unzip();
    TableAssignment {
        slot_hosts,
        hosts,
        counts,
    }
}
