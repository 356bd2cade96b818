//! # activity-finder-ports
//!
//! Port traits for the activity-finder hexagonal architecture.
//!
//! This crate defines the interfaces between the use cases and the host
//! platform. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod cache;
pub mod catalog;
pub mod config_store;
pub mod logger;
pub mod results;

pub use cache::*;
pub use catalog::*;
pub use config_store::*;
pub use logger::*;
pub use results::*;

// Re-export domain types used in port signatures, so adapter crates can
// implement ports without directly depending on `activity-finder-domain`.
pub use activity_finder_domain::{
    IndexId, LocationTypeId, LocationTypeOption, SearchIndexOption, SettingsRecord,
};
