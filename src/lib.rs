//! # Maglev LB
//!
//! A weighted Maglev consistent-hashing load-balancer table for edge routing,
//! implementing the table construction from section 3.4 of the Maglev paper
//! with a fixed prime table size (default 65537, the size recommended in
//! section 5.3).
//!
//! ## Features
//!
//! - **Weighted fill**: hosts claim slots in proportion to their normalized
//!   weight, with the input order as the deterministic tie-break
//! - **Two storage representations**: a direct per-slot reference table and a
//!   bit-packed compact table, behaviorally equivalent by construction
//! - **Minimal churn**: membership changes reassign close to the theoretical
//!   minimum number of slots
//! - **Lock-free reads**: request threads resolve hosts against an immutable
//!   table generation published by atomic swap
//!
//! ## Usage
//!
//! ```
//! use maglev_lb::{Host, MaglevBalancer, MaglevConfig};
//! use std::sync::Arc;
//!
//! let balancer = MaglevBalancer::new(MaglevConfig::default()).unwrap();
//!
//! let hosts = vec![
//!     (Arc::new(Host::new("10.0.0.1:8080".parse().unwrap(), "a")), 1.0),
//!     (Arc::new(Host::new("10.0.0.2:8080".parse().unwrap(), "b")), 1.0),
//! ];
//! balancer.update(&hosts, 1.0).unwrap();
//!
//! let host = balancer.choose_host(0xDEAD_BEEF, 0).unwrap();
//! # let _ = host;
//! ```
//!
//! Membership tracking, health checking, weight normalization, and the
//! bounded-load wrapper implementation live outside this crate; the balancer
//! consumes their outputs at its interface.

pub mod balancer;
pub mod bit_array;
mod builder;
pub mod config;
pub mod error;
pub mod hashing;
pub mod host;
pub mod selector;
pub mod table;

pub use balancer::{MaglevBalancer, MaglevStats};
pub use bit_array::BitArray;
pub use config::{MaglevConfig, DEFAULT_TABLE_SIZE, MAX_TABLE_SIZE};
pub use error::{MaglevError, MaglevResult};
pub use host::{Host, NormalizedHostWeightVector};
pub use selector::{BoundedLoadWrapper, HashingSelector};
pub use table::{MaglevTable, MAX_COMPACT_HOSTS};
