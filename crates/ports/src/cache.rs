//! Cache invalidation boundary contracts.

use crate::BoxFuture;
use activity_finder_shared::{RequestContext, Result};

/// Host render cache.
pub trait RenderCachePort: Send + Sync {
    /// Drop every cached render.
    fn clear_all(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<()>>;
}

/// Host cache-tag invalidation.
pub trait CacheTagInvalidatorPort: Send + Sync {
    /// Invalidate every cache entry carrying one of `tags`.
    fn invalidate_tags(
        &self,
        ctx: &RequestContext,
        tags: Vec<Box<str>>,
    ) -> BoxFuture<'_, Result<()>>;
}
