//! Registry and catalog boundary contracts.

use crate::BoxFuture;
use activity_finder_domain::{LocationTypeOption, SearchIndexOption};
use activity_finder_shared::{RequestContext, Result};

/// Answers whether an optional capability (module) is present right now.
pub trait CapabilityRegistryPort: Send + Sync {
    /// True when the named capability is enabled.
    fn has_capability(&self, name: &str) -> bool;
}

/// Catalog of location content types.
pub trait LocationTypeCatalogPort: Send + Sync {
    /// List the content types a search may include.
    fn location_types(&self, ctx: &RequestContext)
    -> BoxFuture<'_, Result<Vec<LocationTypeOption>>>;
}

/// Catalog of search indexes of the local-index backend.
pub trait SearchIndexCatalogPort: Send + Sync {
    /// List the available indexes.
    fn indexes(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<SearchIndexOption>>>;
}
