//! In-memory caching for computed reports and fetched periods.
//!
//! [`MemoCache`] memoizes synchronous computations under a
//! [`Fingerprint`] key. [`AsyncCache`] coalesces concurrent asynchronous
//! loads of the same key and can serve stale values while refreshing.
//! Both age entries against a [`Clock`] and evict the oldest half of their
//! entries when full.

mod async_cache;
mod clock;
mod fingerprint;
mod memo;
mod store;

pub use async_cache::{AsyncCache, Fetched};
pub use clock::{Clock, ManualClock, SystemClock};
pub use fingerprint::Fingerprint;
pub use memo::MemoCache;
pub use store::CacheStats;
