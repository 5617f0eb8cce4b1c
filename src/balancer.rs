//! Maglev load balancer orchestrator.
//!
//! Owns the published table generation: membership updates trigger a
//! synchronous rebuild on the control-plane thread, the finished table is
//! swapped in atomically, and request threads keep reading the previous
//! generation until the swap lands. Readers never observe a partially built
//! table.

use crate::config::MaglevConfig;
use crate::error::{MaglevError, MaglevResult};
use crate::host::{Host, NormalizedHostWeightVector};
use crate::selector::{BoundedLoadWrapper, HashingSelector};
use crate::table::MaglevTable;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Skew gauges over the current table generation.
///
/// `max` and `min` entries per host are recomputed on every rebuild; a wide
/// gap between them means the weight vector or the table size is producing a
/// lopsided table.
#[derive(Debug, Default)]
pub struct MaglevStats {
    max_entries_per_host: AtomicU64,
    min_entries_per_host: AtomicU64,
}

impl MaglevStats {
    /// Highest per-host slot count in the current table.
    #[must_use]
    pub fn max_entries_per_host(&self) -> u64 {
        self.max_entries_per_host.load(Ordering::Relaxed)
    }

    /// Lowest per-host slot count in the current table.
    #[must_use]
    pub fn min_entries_per_host(&self) -> u64 {
        self.min_entries_per_host.load(Ordering::Relaxed)
    }

    fn record(&self, max: u64, min: u64) {
        self.max_entries_per_host.store(max, Ordering::Relaxed);
        self.min_entries_per_host.store(min, Ordering::Relaxed);
    }
}

/// Maglev load balancer.
///
/// Thread model: [`MaglevBalancer::update`] runs on a single control-plane
/// thread; [`MaglevBalancer::choose_host`] runs concurrently on any number of
/// request threads and is lock-free.
pub struct MaglevBalancer {
    config: MaglevConfig,
    stats: Arc<MaglevStats>,
    // Double Arc because the swap slot needs a sized pointee; the outer layer
    // is the published generation, the inner one the selector trait object.
    selector: ArcSwapOption<Arc<dyn HashingSelector>>,
    bounded_load_wrapper: Option<BoundedLoadWrapper>,
}

impl MaglevBalancer {
    /// Create a balancer with a validated configuration.
    pub fn new(config: MaglevConfig) -> MaglevResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: Arc::new(MaglevStats::default()),
            selector: ArcSwapOption::const_empty(),
            bounded_load_wrapper: None,
        })
    }

    /// Install the external bounded-load wrapper.
    ///
    /// Applied on subsequent rebuilds when `hash_balance_factor` is non-zero;
    /// without a wrapper the factor is ignored.
    #[must_use]
    pub fn with_bounded_load_wrapper(mut self, wrapper: BoundedLoadWrapper) -> Self {
        self.bounded_load_wrapper = Some(wrapper);
        self
    }

    /// Balancer configuration.
    #[must_use]
    pub fn config(&self) -> &MaglevConfig {
        &self.config
    }

    /// Skew gauges for the current table.
    #[must_use]
    pub fn stats(&self) -> &Arc<MaglevStats> {
        &self.stats
    }

    /// Rebuild the table for a new membership or weight set and publish it.
    ///
    /// `max_normalized_weight` comes from the same upstream normalization
    /// pass that produced `host_weights` and must equal the largest weight in
    /// the vector. An empty vector is a membership-layer contract violation
    /// and leaves the previously published table untouched.
    pub fn update(
        &self,
        host_weights: &NormalizedHostWeightVector,
        max_normalized_weight: f64,
    ) -> MaglevResult<()> {
        if host_weights.is_empty() {
            return Err(MaglevError::NoHosts);
        }
        if !(max_normalized_weight > 0.0 && max_normalized_weight.is_finite()) {
            return Err(MaglevError::InvalidMaxWeight(max_normalized_weight));
        }

        let table = MaglevTable::build(
            host_weights,
            max_normalized_weight,
            self.config.table_size,
            self.config.use_hostname_for_hashing,
        );
        self.publish(table, host_weights);
        Ok(())
    }

    fn publish(&self, table: MaglevTable, host_weights: &NormalizedHostWeightVector) {
        self.stats.record(
            table.max_entries_per_host(),
            table.min_entries_per_host(),
        );

        let mut selector: Arc<dyn HashingSelector> = Arc::new(table);
        if self.config.hash_balance_factor != 0 {
            if let Some(wrapper) = &self.bounded_load_wrapper {
                selector = wrapper(selector, host_weights, self.config.hash_balance_factor);
            }
        }

        self.selector.store(Some(Arc::new(selector)));
        info!(
            hosts = host_weights.len(),
            table_size = self.config.table_size,
            max_entries_per_host = self.stats.max_entries_per_host(),
            min_entries_per_host = self.stats.min_entries_per_host(),
            "published maglev table"
        );
    }

    /// Pick a host for a request hash.
    ///
    /// Lock-free; returns `None` only before the first successful
    /// [`update`](Self::update). The returned reference keeps its table
    /// generation alive even if a rebuild publishes a newer one mid-request.
    #[must_use]
    pub fn choose_host(&self, hash: u64, attempt: u32) -> Option<Arc<Host>> {
        let guard = self.selector.load();
        guard.as_ref()?.choose_host(hash, attempt)
    }

    /// Current published selector, if any. Lets callers pin one generation
    /// across a batch of lookups.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn HashingSelector>> {
        self.selector.load_full().map(|published| Arc::clone(&*published))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TABLE_SIZE;
    use std::sync::atomic::AtomicU32;

    fn hosts(weights: &[f64]) -> NormalizedHostWeightVector {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let host = Host::new(
                    format!("10.0.0.{}:8080", i + 1).parse().unwrap(),
                    format!("backend-{i}"),
                );
                (Arc::new(host), w)
            })
            .collect()
    }

    fn small_balancer() -> MaglevBalancer {
        MaglevBalancer::new(MaglevConfig {
            table_size: 1009,
            ..MaglevConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_validates_config() {
        let result = MaglevBalancer::new(MaglevConfig {
            table_size: 100,
            ..MaglevConfig::default()
        });
        assert!(matches!(result, Err(MaglevError::TableSizeNotPrime(100))));
    }

    #[test]
    fn test_choose_host_before_first_update() {
        let balancer = small_balancer();
        assert!(balancer.choose_host(42, 0).is_none());
        assert!(balancer.current().is_none());
    }

    #[test]
    fn test_update_and_choose() {
        let balancer = small_balancer();
        balancer.update(&hosts(&[1.0, 1.0, 1.0]), 1.0).unwrap();

        let host = balancer.choose_host(42, 0).unwrap();
        assert_eq!(balancer.choose_host(42, 0).unwrap().address(), host.address());
    }

    #[test]
    fn test_empty_update_keeps_previous_table() {
        let balancer = small_balancer();
        balancer.update(&hosts(&[1.0]), 1.0).unwrap();
        let before = balancer.choose_host(7, 0).unwrap();

        let result = balancer.update(&Vec::new(), 1.0);
        assert!(matches!(result, Err(MaglevError::NoHosts)));

        let after = balancer.choose_host(7, 0).unwrap();
        assert_eq!(before.address(), after.address());
    }

    #[test]
    fn test_invalid_max_weight_rejected() {
        let balancer = small_balancer();
        assert!(matches!(
            balancer.update(&hosts(&[1.0]), 0.0),
            Err(MaglevError::InvalidMaxWeight(_))
        ));
        assert!(matches!(
            balancer.update(&hosts(&[1.0]), f64::NAN),
            Err(MaglevError::InvalidMaxWeight(_))
        ));
    }

    #[test]
    fn test_stats_gauges() {
        let balancer = small_balancer();
        balancer.update(&hosts(&[0.5, 0.25, 0.25]), 0.5).unwrap();

        let stats = balancer.stats();
        // Host 0 owns about half the 1009 slots, hosts 1 and 2 a quarter each.
        assert!(stats.max_entries_per_host() > 450);
        assert!(stats.min_entries_per_host() > 200);
        assert!(stats.min_entries_per_host() <= stats.max_entries_per_host());
        assert!(stats.max_entries_per_host() <= 1009);
    }

    #[test]
    fn test_readers_keep_old_generation_alive() {
        let balancer = small_balancer();
        balancer.update(&hosts(&[1.0, 1.0]), 1.0).unwrap();
        let pinned = balancer.current().unwrap();
        let before = pinned.choose_host(11, 0).unwrap();

        // Rebuild with different membership; the pinned generation must keep
        // answering identically.
        balancer.update(&hosts(&[1.0]), 1.0).unwrap();
        let after = pinned.choose_host(11, 0).unwrap();
        assert_eq!(before.address(), after.address());
    }

    #[test]
    fn test_bounded_load_wrapper_applied() {
        let calls = Arc::new(AtomicU32::new(0));
        let observed_factor = Arc::new(AtomicU32::new(0));

        let wrapper: BoundedLoadWrapper = {
            let calls = Arc::clone(&calls);
            let observed_factor = Arc::clone(&observed_factor);
            Arc::new(move |inner, _weights, factor| {
                calls.fetch_add(1, Ordering::Relaxed);
                observed_factor.store(factor, Ordering::Relaxed);
                inner
            })
        };

        let balancer = MaglevBalancer::new(MaglevConfig {
            table_size: 1009,
            hash_balance_factor: 125,
            ..MaglevConfig::default()
        })
        .unwrap()
        .with_bounded_load_wrapper(wrapper);

        balancer.update(&hosts(&[1.0, 1.0]), 1.0).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(observed_factor.load(Ordering::Relaxed), 125);
    }

    #[test]
    fn test_wrapper_skipped_when_factor_zero() {
        let calls = Arc::new(AtomicU32::new(0));
        let wrapper: BoundedLoadWrapper = {
            let calls = Arc::clone(&calls);
            Arc::new(move |inner, _, _| {
                calls.fetch_add(1, Ordering::Relaxed);
                inner
            })
        };

        let balancer = small_balancer().with_bounded_load_wrapper(wrapper);
        balancer.update(&hosts(&[1.0]), 1.0).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_default_table_size_config() {
        let balancer = MaglevBalancer::new(MaglevConfig::default()).unwrap();
        assert_eq!(balancer.config().table_size, DEFAULT_TABLE_SIZE);
    }
}
