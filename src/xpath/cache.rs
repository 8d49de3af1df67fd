//! Compiled Path Cache
//!
//! Parsed paths kept in an LRU keyed by expression text and shared as
//! `Arc<Path>`, so repeated expressions skip the parser. Parse failures are
//! not cached.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::trace;

use super::eval::evaluate;
use super::parser::{self, Path};
use crate::dom::{DocumentStore, NodeId};
use crate::error::XPathError;

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    paths: LruCache<String, Arc<Path>>,
    hits: u64,
    misses: u64,
}

/// Thread-safe LRU of parsed paths
pub struct QueryCache {
    inner: Mutex<Inner>,
}

impl QueryCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Cache holding at most `capacity` paths (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        QueryCache {
            inner: Mutex::new(Inner {
                paths: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Parsed form of `expr`, parsing and caching it on a miss
    pub fn compile(&self, expr: &str) -> Result<Arc<Path>, XPathError> {
        {
            let mut inner = self.lock();
            if let Some(path) = inner.paths.get(expr).cloned() {
                inner.hits += 1;
                return Ok(path);
            }
            inner.misses += 1;
        }

        // Parse outside the lock
        let path = Arc::new(parser::parse(expr)?);
        trace!(expr, "caching parsed path");
        self.lock().paths.put(expr.to_string(), Arc::clone(&path));
        Ok(path)
    }

    /// `query` through the cache
    pub fn query(
        &self,
        store: &DocumentStore,
        context: NodeId,
        expr: &str,
    ) -> Result<Vec<NodeId>, XPathError> {
        let path = self.compile(expr)?;
        Ok(evaluate(store, context, &path))
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.paths.len(),
        }
    }

    pub fn clear(&self) {
        self.lock().paths.clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
