//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and oldest-first eviction,
//! deterministic key construction and the per-domain store registry.

mod entry;
mod insertion;
mod key;
mod registry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use insertion::InsertionOrder;
pub use key::{create_cache_key, CacheKey};
pub use registry::{CacheRegistry, RegistryStats, SharedStore};
pub use stats::CacheStats;
pub use store::CacheStore;
