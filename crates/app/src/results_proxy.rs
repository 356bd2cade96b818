//! Fetch facets and grouped locations from the internal results endpoint.
//!
//! Failures never propagate: they are logged and reported as
//! [`FacetsLookup::Unavailable`].

use activity_finder_ports::{LogFields, LoggerPort, ResultsEndpointPort};
use activity_finder_shared::{ErrorEnvelope, RequestContext, redact_url_credentials};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Dependencies required by the results proxy.
#[derive(Clone)]
pub struct ResultsProxyDeps {
    /// Results endpoint client.
    pub endpoint: Arc<dyn ResultsEndpointPort>,
    /// Route joined to the base URL (e.g. `/af/get-data`).
    pub route: Box<str>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// The two fields copied from the results payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetsAndLocations {
    /// `facets` value, `null` when missing.
    pub facets: Value,
    /// `groupedLocations` value, `null` when missing.
    pub grouped_locations: Value,
}

/// Outcome of a results lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetsLookup {
    /// The endpoint returned a decodable payload.
    Available(FacetsAndLocations),
    /// The endpoint could not be used.
    Unavailable,
}

impl FacetsLookup {
    /// Borrow the payload when available.
    #[must_use]
    pub const fn available(&self) -> Option<&FacetsAndLocations> {
        match self {
            Self::Available(payload) => Some(payload),
            Self::Unavailable => None,
        }
    }

    /// True when the lookup failed.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Resolve the endpoint URL from a base URL and an absolute route.
pub fn results_url(base_url: &str, route: &str) -> Result<Url, url::ParseError> {
    Url::parse(base_url)?.join(route)
}

/// Fetch the results payload and keep `facets` and `groupedLocations`.
pub async fn fetch_facets_and_locations(
    ctx: &RequestContext,
    deps: &ResultsProxyDeps,
    base_url: &str,
) -> FacetsLookup {
    let started_at = Instant::now();

    let url = match results_url(base_url, &deps.route) {
        Ok(url) => url,
        Err(error) => {
            log_unavailable(
                deps,
                ctx,
                base_url,
                "invalid_base_url",
                &error.to_string(),
                None,
            );
            return FacetsLookup::Unavailable;
        },
    };

    let body = match deps.endpoint.get(ctx, url.as_str().into()).await {
        Ok(body) => body,
        Err(error) => {
            log_unavailable(
                deps,
                ctx,
                url.as_str(),
                "transport",
                &error.message,
                Some(&error),
            );
            return FacetsLookup::Unavailable;
        },
    };

    let Some(body) = body.filter(|bytes| !bytes.iter().all(u8::is_ascii_whitespace)) else {
        log_unavailable(deps, ctx, url.as_str(), "empty_body", "empty response body", None);
        return FacetsLookup::Unavailable;
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            log_unavailable(
                deps,
                ctx,
                url.as_str(),
                "invalid_json",
                &error.to_string(),
                None,
            );
            return FacetsLookup::Unavailable;
        },
    };

    let lookup = FacetsLookup::Available(extract_fields(&payload));

    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = log_fields_base(ctx, url.as_str());
        fields.insert("durationMs".into(), Value::from(duration_ms(started_at)));
        fields.insert("bodyBytes".into(), Value::from(body.len()));
        logger.info(
            "results.fetch.completed",
            "Results payload fetched",
            Some(fields),
        );
    }

    lookup
}

fn extract_fields(payload: &Value) -> FacetsAndLocations {
    let field = |name: &str| payload.get(name).cloned().unwrap_or(Value::Null);
    FacetsAndLocations {
        facets: field("facets"),
        grouped_locations: field("groupedLocations"),
    }
}

fn log_unavailable(
    deps: &ResultsProxyDeps,
    ctx: &RequestContext,
    url: &str,
    reason: &str,
    detail: &str,
    error: Option<&ErrorEnvelope>,
) {
    let Some(logger) = deps.logger.as_ref() else {
        return;
    };
    let mut fields = log_fields_base(ctx, url);
    fields.insert("reason".into(), Value::from(reason));
    fields.insert("detail".into(), Value::from(detail));
    match error {
        Some(error) => logger.failure(
            "results.fetch.unavailable",
            "Results endpoint unavailable",
            Some(fields),
            error,
        ),
        None => logger.error(
            "results.fetch.unavailable",
            "Results endpoint unavailable",
            Some(fields),
        ),
    }
}

fn log_fields_base(ctx: &RequestContext, url: &str) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert("url".into(), Value::String(redact_url_credentials(url)));
    fields.insert(
        "correlationId".into(),
        Value::String(ctx.correlation_id().as_str().to_owned()),
    );
    fields
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}
