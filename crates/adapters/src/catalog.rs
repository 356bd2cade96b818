//! Static capability registry and catalogs.
//!
//! Hosts that resolve capabilities and catalogs elsewhere implement the
//! ports directly; these adapters cover fixed deployments and tests.

use activity_finder_ports::{
    BoxFuture, CapabilityRegistryPort, IndexId, LocationTypeCatalogPort, LocationTypeId,
    LocationTypeOption, SearchIndexCatalogPort, SearchIndexOption,
};
use activity_finder_shared::{ErrorEnvelope, RequestContext, Result};
use std::collections::BTreeSet;
use std::sync::RwLock;

/// Capability registry backed by a mutable set of names.
///
/// Lookups read the current set, so toggling a capability takes effect on
/// the next call.
#[derive(Debug, Default)]
pub struct StaticCapabilityRegistry {
    names: RwLock<BTreeSet<Box<str>>>,
}

impl StaticCapabilityRegistry {
    /// Registry with the given capabilities enabled.
    pub fn new<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Box<str>>,
    {
        Self {
            names: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Enable or disable a capability.
    pub fn set_enabled(&self, name: &str, enabled: bool) {
        if let Ok(mut names) = self.names.write() {
            if enabled {
                names.insert(name.into());
            } else {
                names.remove(name);
            }
        }
    }
}

impl CapabilityRegistryPort for StaticCapabilityRegistry {
    fn has_capability(&self, name: &str) -> bool {
        self.names.read().is_ok_and(|names| names.contains(name))
    }
}

/// Fixed list of location types.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationTypeCatalog {
    options: Vec<LocationTypeOption>,
}

impl StaticLocationTypeCatalog {
    /// Catalog of the given options.
    #[must_use]
    pub const fn new(options: Vec<LocationTypeOption>) -> Self {
        Self { options }
    }

    /// Build a catalog from `(id, label)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let options = pairs
            .iter()
            .map(|(id, label)| {
                LocationTypeId::parse(id)
                    .map(|id| LocationTypeOption {
                        id,
                        label: (*label).into(),
                    })
                    .map_err(ErrorEnvelope::from)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(options))
    }

    /// Branch, camp, and facility.
    pub fn standard() -> Result<Self> {
        Self::from_pairs(&[
            ("branch", "Branch"),
            ("camp", "Camp"),
            ("facility", "Facility"),
        ])
    }
}

impl LocationTypeCatalogPort for StaticLocationTypeCatalog {
    fn location_types(
        &self,
        _ctx: &RequestContext,
    ) -> BoxFuture<'_, Result<Vec<LocationTypeOption>>> {
        let options = self.options.clone();
        Box::pin(async move { Ok(options) })
    }
}

/// Fixed list of search indexes.
#[derive(Debug, Clone, Default)]
pub struct StaticSearchIndexCatalog {
    options: Vec<SearchIndexOption>,
}

impl StaticSearchIndexCatalog {
    /// Catalog of the given options.
    #[must_use]
    pub const fn new(options: Vec<SearchIndexOption>) -> Self {
        Self { options }
    }

    /// Build a catalog from `(id, label)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let options = pairs
            .iter()
            .map(|(id, label)| {
                IndexId::parse(id)
                    .map(|id| SearchIndexOption {
                        id,
                        label: (*label).into(),
                    })
                    .map_err(ErrorEnvelope::from)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(options))
    }
}

impl SearchIndexCatalogPort for StaticSearchIndexCatalog {
    fn indexes(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<SearchIndexOption>>> {
        let options = self.options.clone();
        Box::pin(async move { Ok(options) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_toggle_between_calls() {
        let registry = StaticCapabilityRegistry::new(["search_api"]);
        assert!(registry.has_capability("search_api"));
        assert!(!registry.has_capability("openy_daxko2"));

        registry.set_enabled("search_api", false);
        registry.set_enabled("openy_daxko2", true);
        assert!(!registry.has_capability("search_api"));
        assert!(registry.has_capability("openy_daxko2"));
    }

    #[tokio::test]
    async fn standard_location_types_keep_order() -> Result<()> {
        let catalog = StaticLocationTypeCatalog::standard()?;
        let ctx = RequestContext::new_request();
        let ids: Vec<String> = catalog
            .location_types(&ctx)
            .await?
            .iter()
            .map(|option| option.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["branch", "camp", "facility"]);
        Ok(())
    }

    #[test]
    fn invalid_index_ids_are_rejected() {
        assert!(StaticSearchIndexCatalog::from_pairs(&[("", "Empty")]).is_err());
    }
}
