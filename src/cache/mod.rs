//! Time-boxed response caching.
//!
//! A keyed in-memory store used by the resilience controller to avoid
//! redundant network calls within a TTL window. Expiry is lazy: entries
//! are checked and evicted on read, never swept in the background.

pub mod store;

pub use store::ResponseCache;
