//! Read-through memory cache with tag invalidation.

mod key;
mod store;

pub use key::list_key;
pub use store::{CacheStats, TagCache};
