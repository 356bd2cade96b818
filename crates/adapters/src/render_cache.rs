//! In-memory render cache with tag invalidation.

use activity_finder_ports::{BoxFuture, CacheTagInvalidatorPort, RenderCachePort};
use activity_finder_shared::{RequestContext, Result};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Box<str>,
    tags: BTreeSet<Box<str>>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<Box<str>, CacheEntry>,
    clears: usize,
    invalidated: Vec<Box<str>>,
}

/// Rendered-output cache keyed by string, with tags per entry.
///
/// Implements both the full clear and the tag invalidation port, and keeps
/// counters the host can inspect.
#[derive(Debug, Default)]
pub struct InMemoryRenderCache {
    state: tokio::sync::Mutex<CacheState>,
}

impl InMemoryRenderCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a rendered value with its tags.
    pub async fn put<I, T>(&self, key: &str, value: &str, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Box<str>>,
    {
        let entry = CacheEntry {
            value: value.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        };
        self.state.lock().await.entries.insert(key.into(), entry);
    }

    /// Cached value for `key`.
    pub async fn get(&self, key: &str) -> Option<Box<str>> {
        self.state
            .lock()
            .await
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// True when nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of full clears performed.
    pub async fn clear_count(&self) -> usize {
        self.state.lock().await.clears
    }

    /// Tags invalidated so far, in call order.
    pub async fn invalidated_tags(&self) -> Vec<Box<str>> {
        self.state.lock().await.invalidated.clone()
    }
}

impl RenderCachePort for InMemoryRenderCache {
    fn clear_all(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.entries.clear();
            state.clears += 1;
            drop(state);
            Ok(())
        })
    }
}

impl CacheTagInvalidatorPort for InMemoryRenderCache {
    fn invalidate_tags(
        &self,
        _ctx: &RequestContext,
        tags: Vec<Box<str>>,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state
                .entries
                .retain(|_, entry| !tags.iter().any(|tag| entry.tags.contains(tag)));
            state.invalidated.extend(tags);
            drop(state);
            Ok(())
        })
    }
}
