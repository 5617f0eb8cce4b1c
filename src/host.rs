//! Host identity and weight vector types.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// A backend host the table can balance to.
///
/// The table never owns a host outright: cluster membership creates hosts and
/// every table generation holds reference-counted handles, so a host outlives
/// whichever holder drops it last.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    address: SocketAddr,
    hostname: String,
    // Cached `address.to_string()` so hashing does not format per rebuild.
    address_str: String,
}

impl Host {
    /// Create a host from its address and hostname.
    #[must_use]
    pub fn new(address: SocketAddr, hostname: impl Into<String>) -> Self {
        Self {
            address,
            hostname: hostname.into(),
            address_str: address.to_string(),
        }
    }

    /// Get the host address.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Get the hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Key the permutation hashes are derived from. Hashing by hostname keeps
    /// slot assignment stable when a host re-resolves to a new address.
    #[must_use]
    pub fn hash_key(&self, use_hostname: bool) -> &str {
        if use_hostname {
            &self.hostname
        } else {
            &self.address_str
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hostname.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "{} ({})", self.hostname, self.address)
        }
    }
}

/// Ordered host/weight pairs produced by upstream weight normalization.
///
/// Weights are in `(0, 1]` and need not sum to 1. The order is significant:
/// the builder uses it as the deterministic tie-break between hosts competing
/// for slots in the same round.
pub type NormalizedHostWeightVector = Vec<(Arc<Host>, f64)>;
