//! # koi-cache
//!
//! Result cache in front of every backend call. Query types map statically
//! to one of four categories; each cached category is an independent moka
//! cache with its own TTL and capacity.

pub mod category;
pub mod key;
pub mod result_cache;

pub use category::{CacheCategory, QueryType};
pub use key::cache_key;
pub use result_cache::{CacheEntry, ResultCache};
