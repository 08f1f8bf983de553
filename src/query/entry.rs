//! Cache entry bookkeeping
//!
//! One [`CacheEntry`] per query key. The entry owns the type-erased cached
//! value plus everything the client needs to decide between serving the
//! cache, joining an in-flight load, or starting a new one.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::error::ApiError;

/// Outcome of a load, shared by every caller that joined it.
pub(crate) type SharedLoad =
    Shared<BoxFuture<'static, std::result::Result<Arc<dyn Any + Send + Sync>, ApiError>>>;

/// Lifecycle state of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// A load is running and no earlier result exists.
    Pending,
    /// The last load succeeded.
    Success,
    /// The last load failed after retries were exhausted.
    Error,
}

pub(crate) struct CacheEntry {
    /// Last successful result, type-erased. Present even while a refetch
    /// is in flight, so readers keep seeing the old value until the new
    /// one lands.
    pub data: Option<Arc<dyn Any + Send + Sync>>,
    pub fetched_at: Option<Instant>,
    pub status: QueryStatus,
    pub error: Option<ApiError>,
    /// Set by invalidation; cleared when a load succeeds.
    pub stale: bool,
    pub retain_for: Duration,
    /// Live subscription handles pointing at this key.
    pub subscribers: usize,
    /// Bumped on every subscribe. An eviction timer only fires if the
    /// epoch it captured is still current, so resubscribing cancels it.
    pub epoch: u64,
    pub in_flight: Option<SharedLoad>,
}

impl CacheEntry {
    pub(crate) fn new(retain_for: Duration) -> Self {
        Self {
            data: None,
            fetched_at: None,
            status: QueryStatus::Pending,
            error: None,
            stale: false,
            retain_for,
            subscribers: 0,
            epoch: 0,
            in_flight: None,
        }
    }

    /// Whether the cached value may be served without a refetch.
    pub(crate) fn is_fresh(&self, fresh_for: Duration, now: Instant) -> bool {
        if self.stale || self.status != QueryStatus::Success {
            return false;
        }
        match self.fetched_at {
            Some(fetched_at) => now.duration_since(fetched_at) < fresh_for,
            None => false,
        }
    }
}
