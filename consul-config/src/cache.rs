//! Memoized candidate key lists

use std::sync::Arc;

use moka::sync::Cache;

use crate::context::HostContext;
use crate::keys::possible_keys;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    key: String,
    context: Option<HostContext>,
}

/// Bounded cache of [`possible_keys`] results keyed by logical key and context.
#[derive(Clone)]
pub struct CandidateKeyCache {
    cache: Cache<CacheKey, Arc<[String]>>,
    max_capacity: u64,
}

impl CandidateKeyCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_entries).build();

        Self {
            cache,
            max_capacity: max_entries,
        }
    }

    pub fn get(&self, key: &str, context: Option<&HostContext>) -> Arc<[String]> {
        let cache_key = CacheKey {
            key: key.to_string(),
            context: context.cloned(),
        };
        self.cache
            .get_with(cache_key, || possible_keys(key, context).into())
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }
}

impl std::fmt::Debug for CandidateKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateKeyCache")
            .field("max_capacity", &self.max_capacity)
            .finish_non_exhaustive()
    }
}
