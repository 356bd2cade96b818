//! # activity-finder-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, `ports`, and `shared`.

/// Effective config rendering.
pub mod config_check;
/// Environment validation helpers.
pub mod env_check;
/// Runtime composition.
pub mod runtime;

pub use config_check::load_effective_config_json;
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use runtime::{
    ActivityFinderRuntime, PlatformServices, RuntimeOverrides, build_runtime, build_runtime_with,
};

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
