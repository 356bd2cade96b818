//! # activity-finder-domain
//!
//! Domain model of the Activity Finder settings.
//!
//! - **Primitives** - `BackendId`, `IndexId`, `LocationTypeId`, `BootstrapVersion`, `CollapseGroupState`
//! - **Backends** - backend options gated by capabilities
//! - **Catalog** - location type and search index choices
//! - **Settings** - `FinderSettings` and its flat stored record
//! - **Text blocks** - newline edit blocks and the lenient mapping parsers
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use activity_finder_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod backend;
pub mod catalog;
pub mod primitives;
pub mod settings;
pub mod text_blocks;

pub use backend::{
    BackendOption, LIVE_API_BACKEND, LIVE_API_CAPABILITY, LOCAL_INDEX_BACKEND,
    SEARCH_INDEX_CAPABILITY, available_backends,
};
pub use catalog::{LocationTypeOption, SearchIndexOption};
pub use primitives::{
    BackendId, BootstrapVersion, CollapseGroupState, IndexId, LocationTypeId, PrimitiveError,
};
pub use settings::{
    COLLAPSE_GROUP_KEYS, CollapseGroups, DEFAULT_LOCATION_TYPES, FinderSettings,
    HB_MODAL_TEXT_COUNT, SettingKey, SettingsRecord, SettingsRecordError,
    default_location_types,
};
pub use text_blocks::{
    AgeOption, DurationOption, WeekOption, join_lines, parse_age_options,
    parse_duration_options, parse_week_options, split_lines,
};

/// Cache tag attached to everything rendered from Activity Finder data.
pub const ACTIVITY_FINDER_CACHE_TAG: &str = "activity_finder_data";

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_version_matches_shared() {
        assert_eq!(domain_crate_version(), shared_crate_version());
    }
}
