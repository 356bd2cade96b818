//! Results endpoint boundary contract.

use crate::BoxFuture;
use activity_finder_shared::{RequestContext, Result};

/// Fetches the raw body of the internal results endpoint.
pub trait ResultsEndpointPort: Send + Sync {
    /// Issue one GET to `url`.
    ///
    /// `Ok(None)` means the request succeeded without a body. Transport
    /// failures and non-2xx statuses are errors.
    fn get(&self, ctx: &RequestContext, url: Box<str>) -> BoxFuture<'_, Result<Option<Vec<u8>>>>;
}
