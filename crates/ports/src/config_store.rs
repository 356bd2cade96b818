//! Configuration store boundary contract.

use crate::BoxFuture;
use activity_finder_domain::SettingsRecord;
use activity_finder_shared::{RequestContext, Result};

/// Boundary contract for the host's configuration storage.
///
/// A record is read and written as one unit under a namespace.
pub trait ConfigStorePort: Send + Sync {
    /// Read the record stored under `namespace`; `None` when nothing was saved yet.
    fn read(
        &self,
        ctx: &RequestContext,
        namespace: Box<str>,
    ) -> BoxFuture<'_, Result<Option<SettingsRecord>>>;

    /// Merge `staged` into the record under `namespace` and save it as one unit.
    ///
    /// Staged keys overwrite stored ones; stored keys absent from `staged` are
    /// kept. Failures are reported as `settings:persistence_failed`.
    fn commit(
        &self,
        ctx: &RequestContext,
        namespace: Box<str>,
        staged: SettingsRecord,
    ) -> BoxFuture<'_, Result<()>>;
}
