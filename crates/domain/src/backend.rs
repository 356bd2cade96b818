//! Backend options and the capabilities that enable them.

use crate::BackendId;
use serde::Serialize;

/// Backend id of the local search-index implementation.
pub const LOCAL_INDEX_BACKEND: &str = "openy_activity_finder.solr_backend";
/// Backend id of the live external API implementation.
pub const LIVE_API_BACKEND: &str = "openy_daxko2.openy_activity_finder_backend";

/// Capability that provides local search indexes.
pub const SEARCH_INDEX_CAPABILITY: &str = "search_api";
/// Capability that provides the live API integration.
pub const LIVE_API_CAPABILITY: &str = "openy_daxko2";

const LOCAL_INDEX_LABEL: &str = "Solr Backend (local db)";
const LIVE_API_LABEL: &str = "Daxko 2 (live API calls)";

/// A selectable backend with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendOption {
    /// Backend identifier stored in settings.
    pub id: BackendId,
    /// Display label.
    pub label: Box<str>,
}

impl BackendOption {
    fn known(id: &'static str, label: &'static str) -> Self {
        Self {
            id: BackendId::from_static(id),
            label: label.into(),
        }
    }
}

/// Compute the backends offered given the capabilities present right now.
///
/// Order is stable: local index first, then live API.
pub fn available_backends(has_capability: impl Fn(&str) -> bool) -> Vec<BackendOption> {
    let mut options = Vec::with_capacity(2);
    if has_capability(SEARCH_INDEX_CAPABILITY) {
        options.push(BackendOption::known(LOCAL_INDEX_BACKEND, LOCAL_INDEX_LABEL));
    }
    if has_capability(LIVE_API_CAPABILITY) {
        options.push(BackendOption::known(LIVE_API_BACKEND, LIVE_API_LABEL));
    }
    options
}
