//! Client-side query layer
//!
//! Keyed, type-erased caching over any async loader: request deduplication,
//! freshness windows, retry with backoff, prefix invalidation, and
//! inactivity-based eviction. See [`QueryClient`] for the entry point.

use std::time::Duration;

pub mod client;
pub mod entry;
pub mod key;
pub mod retry;

pub use client::{FetchOptions, QueryClient, QueryConfig, QueryEvent, QuerySubscription};
pub use entry::QueryStatus;
pub use key::{keys, QueryKey, Segment};
pub use retry::RetryPolicy;

/// Freshness windows per data shape.
///
/// Lists churn as records are created and updated, so they go stale
/// quickly. Reference data (ports, routes) barely moves.
pub struct Freshness;

impl Freshness {
    /// Collection queries.
    pub const LIST: Duration = Duration::from_secs(2 * 60);
    /// Single-resource queries.
    pub const DETAIL: Duration = Duration::from_secs(5 * 60);
    /// Ports, routes, carriers.
    pub const REFERENCE: Duration = Duration::from_secs(60 * 60);
    /// Backend health probes.
    pub const HEALTH: Duration = Duration::from_secs(30);
    /// Inactivity window before an unwatched entry is evicted.
    pub const RETAIN: Duration = Duration::from_secs(10 * 60);
}
