//! # activity-finder-app
//!
//! Application use cases for the Activity Finder settings.
//! This crate depends on `ports`, `domain`, `config`, and `shared`.

pub mod results_proxy;
pub mod settings_editor;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use results_proxy::{
    FacetsAndLocations, FacetsLookup, ResultsProxyDeps, fetch_facets_and_locations, results_url,
};
pub use settings_editor::{
    CacheInvalidation, SettingsEditorDeps, SubmissionOutcome, apply_submission,
    load_editable_view,
};
