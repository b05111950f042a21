//! Render memoization keyed by route identity

use area_core::equality::cache_key;
use area_core::route::RouteIdentity;
use area_state::config::RouterConfig;
use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache of rendered output keyed by [`cache_key`]
///
/// Keys are a render-skip heuristic; two different routes may collide.
pub struct RenderCache<V> {
    cache: LruCache<String, V>,
    hits: u64,
    misses: u64,
}

impl<V> RenderCache<V> {
    /// Create a cache holding at most `capacity` renders
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache sized by the router configuration
    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.render_cache_capacity)
    }

    /// Cached render for `route`, rendering and storing it on a miss
    pub fn get_or_render<R, F>(&mut self, route: &R, render: F) -> &V
    where
        R: RouteIdentity + ?Sized,
        F: FnOnce() -> V,
    {
        let key = cache_key(route);
        if self.cache.contains(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            tracing::trace!(key = %key, "Render cache miss");
        }
        self.cache.get_or_insert(key, render)
    }

    /// Cached render for `route`, if any
    pub fn get<R: RouteIdentity + ?Sized>(&mut self, route: &R) -> Option<&V> {
        self.cache.get(&cache_key(route))
    }

    /// Drop every render cached for `area`
    pub fn invalidate_area(&mut self, area: &str) -> usize {
        let prefix = format!("{}:", area);
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &keys {
            self.cache.pop(key);
        }
        keys.len()
    }

    /// Number of cached renders
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Hit and miss counts
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
