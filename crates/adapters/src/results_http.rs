//! Reqwest client for the internal results endpoint.

use activity_finder_ports::{BoxFuture, ResultsEndpointPort};
use activity_finder_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

/// Results endpoint adapter issuing plain GET requests.
///
/// No retry and no timeout beyond the client defaults.
#[derive(Debug, Clone)]
pub struct ReqwestResultsEndpoint {
    client: reqwest::Client,
}

impl ReqwestResultsEndpoint {
    /// Build an adapter with its own client.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::new("results", "client_init_failed"),
                    format!("failed to build results client: {error}"),
                    ErrorClass::NonRetriable,
                )
            })?;
        Ok(Self { client })
    }

    /// Reuse a client configured by the host.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| map_reqwest_error(&error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_error(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| map_reqwest_error(&error))?;
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(body.to_vec()))
    }
}

impl ResultsEndpointPort for ReqwestResultsEndpoint {
    fn get(&self, _ctx: &RequestContext, url: Box<str>) -> BoxFuture<'_, Result<Option<Vec<u8>>>> {
        Box::pin(async move { self.fetch(&url).await })
    }
}

fn map_reqwest_error(error: &reqwest::Error) -> ErrorEnvelope {
    if error.is_timeout() {
        return ErrorEnvelope::unexpected(
            ErrorCode::TIMEOUT,
            "results request timed out",
            ErrorClass::Retriable,
        );
    }
    let class = if error.is_connect() {
        ErrorClass::Retriable
    } else {
        ErrorClass::NonRetriable
    };
    ErrorEnvelope::unexpected(
        ErrorCode::new("results", "request_failed"),
        format!("results request failed: {error}"),
        class,
    )
}

fn map_http_error(status: StatusCode) -> ErrorEnvelope {
    let class = if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ErrorClass::Retriable
    } else {
        ErrorClass::NonRetriable
    };
    ErrorEnvelope::unexpected(
        ErrorCode::new("results", "http_error"),
        format!("results endpoint returned {status}"),
        class,
    )
    .with_metadata("status", status.as_u16().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retriable() {
        let error = map_http_error(StatusCode::BAD_GATEWAY);
        assert!(error.has_code("results", "http_error"));
        assert!(error.class.is_retriable());
        assert_eq!(
            error.metadata.get("status").map(String::as_str),
            Some("502")
        );
    }

    #[test]
    fn not_found_is_not_retriable() {
        let error = map_http_error(StatusCode::NOT_FOUND);
        assert!(!error.class.is_retriable());
    }
}
