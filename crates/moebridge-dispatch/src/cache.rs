//! Time-bounded caches in front of the lookup stores.

use crate::settings::CacheSettings;
use moebridge_core::{BlockTitleLookup, InstructorLookup, LookupError};
use moka::sync::Cache;
use std::time::Duration;

const MAX_ENTRIES: u64 = 10_000;
const MAX_TIME_TO_LIVE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// In-memory cache whose entries expire a fixed time after insertion.
///
/// Keys are namespaced as `<prefix>_<key>` so several caches can share one
/// key space in logs and diagnostics.
pub struct TtlCache<V> {
    prefix: String,
    cache: Cache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    pub fn new(prefix: impl Into<String>, time_to_live: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(time_to_live.min(MAX_TIME_TO_LIVE))
            .build();

        Self {
            prefix: prefix.into(),
            cache,
        }
    }

    pub fn key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.cache.get(&self.key(key))
    }

    pub fn insert(&self, key: &str, value: V) {
        self.cache.insert(self.key(key), value);
    }
}

/// Caches block titles, including misses.
pub struct CachedBlockTitles<L> {
    inner: L,
    cache: TtlCache<Option<String>>,
}

impl<L: BlockTitleLookup> CachedBlockTitles<L> {
    pub fn new(inner: L, settings: &CacheSettings) -> Self {
        Self {
            inner,
            cache: TtlCache::new(settings.block_prefix.clone(), settings.expiration),
        }
    }
}

impl<L: BlockTitleLookup> BlockTitleLookup for CachedBlockTitles<L> {
    fn block_title(&self, course_id: &str, block_id: &str) -> Result<Option<String>, LookupError> {
        // Usage keys are globally unique, the course is not part of the key.
        if let Some(title) = self.cache.get(block_id) {
            return Ok(title);
        }
        let title = self.inner.block_title(course_id, block_id)?;
        self.cache.insert(block_id, title.clone());
        Ok(title)
    }
}

/// Caches resolved instructor ids. Misses are looked up again.
pub struct CachedInstructors<L> {
    inner: L,
    cache: TtlCache<String>,
}

impl<L: InstructorLookup> CachedInstructors<L> {
    pub fn new(inner: L, settings: &CacheSettings) -> Self {
        Self {
            inner,
            cache: TtlCache::new(settings.instructor_prefix.clone(), settings.expiration),
        }
    }
}

impl<L: InstructorLookup> InstructorLookup for CachedInstructors<L> {
    fn instructor_id(&self, course_id: &str) -> Result<Option<String>, LookupError> {
        if let Some(id) = self.cache.get(course_id) {
            return Ok(Some(id));
        }
        let id = self.inner.instructor_id(course_id)?;
        if let Some(id) = &id {
            self.cache.insert(course_id, id.clone());
        }
        Ok(id)
    }
}
