//! # activity-finder-adapters
//!
//! Adapter implementations for ports (config stores, render cache, catalogs,
//! results endpoint, logging).
//! This crate depends on `ports` and `shared`.

pub mod catalog;
pub mod config_store;
pub mod log_sink;
pub mod logger;
pub mod render_cache;
pub mod results_http;

pub use catalog::{StaticCapabilityRegistry, StaticLocationTypeCatalog, StaticSearchIndexCatalog};
pub use config_store::{InMemoryConfigStore, JsonFileConfigStore};
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use render_cache::InMemoryRenderCache;
pub use results_http::ReqwestResultsEndpoint;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_finder_ports::ports_crate_version;
    use activity_finder_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("activity-finder-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app_config_or_infra() {
        let forbidden = [
            "activity-finder-app",
            "activity-finder-config",
            "activity-finder-infra",
        ];
        let deps = workspace_deps();
        assert!(deps.iter().all(|dep| !forbidden.contains(&dep.as_str())));
        assert!(deps.iter().any(|dep| dep == "activity-finder-ports"));
    }

    #[test]
    fn adapters_can_use_ports_and_shared() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
