//! Response caching for read endpoints.
//!
//! A single process-local layer: GET responses are buffered and kept in a
//! bounded LRU map with a per-entry expiry deadline. Expiry is lazy, so
//! an entry past its deadline is simply treated as a miss and dropped on
//! the next read.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `sortera.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 3600
//! response_limit = 200
//! ```

mod config;
mod keys;
mod lock;
mod middleware;
mod store;

pub use config::CacheConfig;
pub use keys::{ResponseKey, hash_query, hash_value};
pub use middleware::{CacheState, response_cache_layer};
pub use store::{CachedResponse, ResponseStore};
