//! Host selection seam.

use crate::host::{Host, NormalizedHostWeightVector};
use std::sync::Arc;

/// Read path shared by every table generation and by wrappers layered on top
/// of one.
///
/// Implementations are immutable once built and are read lock-free from any
/// number of request threads. `attempt = 0` is the hash-stable choice; the
/// caller bumps `attempt` to walk to alternate hash-derived slots when the
/// chosen host is unusable. Attempts at or beyond the table size wrap past a
/// full table cycle and simply revisit earlier slots; callers are expected to
/// bound their retries well below that.
pub trait HashingSelector: Send + Sync {
    /// Pick a host for `hash`, returning `None` only when no table has been
    /// built.
    fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>>;
}

/// Factory for an externally-provided bounded-load wrapper.
///
/// When the configured `hash_balance_factor` is non-zero, the balancer hands
/// the freshly built table, the weight vector it was built from, and the
/// factor to this hook and publishes whatever selector comes back. The
/// wrapper caps any single host's share of in-flight load relative to the
/// average and walks `attempt` forward on overflow; its implementation lives
/// outside this crate.
pub type BoundedLoadWrapper = Arc<
    dyn Fn(Arc<dyn HashingSelector>, &NormalizedHostWeightVector, u32) -> Arc<dyn HashingSelector>
        + Send
        + Sync,
>;
