//! Error envelope shared by every layer.
//!
//! Codes are static `namespace:code` pairs (`settings:validation_failed`,
//! `results:http_error`, ...). Serialized envelopes render the code as that
//! single string so hosts can match on it directly.

use serde::Serialize;
use std::collections::BTreeMap;
use std::{fmt, io};

/// Metadata attached to errors for diagnostics (`field.<key>`, `status`, `path`).
pub type ErrorMetadata = BTreeMap<String, String>;

/// Where a failure comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Rejected input (submission, config, ids).
    Expected,
    /// Stored data that no longer matches the settings schema.
    Invariant,
    /// Store, cache, or transport failures.
    Unexpected,
}

impl ErrorKind {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        }
    }
}

/// Whether the host may retry the failed call.
///
/// Nothing in this workspace retries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Safe to retry.
    Retriable,
    /// Retrying will fail the same way.
    NonRetriable,
}

impl ErrorClass {
    /// Returns true when the error is considered retriable.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Retriable)
    }

    /// Classify a filesystem or socket failure.
    #[must_use]
    pub const fn for_io(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe => Self::Retriable,
            _ => Self::NonRetriable,
        }
    }
}

/// Stable `namespace:code` identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct ErrorCode {
    namespace: &'static str,
    code: &'static str,
}

impl ErrorCode {
    /// Malformed caller input outside a settings submission.
    pub const INVALID_INPUT: Self = Self::new("core", "invalid_input");
    /// A call did not finish in time.
    pub const TIMEOUT: Self = Self::new("core", "timeout");
    /// A failure with no better classification.
    pub const INTERNAL: Self = Self::new("core", "internal");
    /// Raw I/O failure not mapped by an adapter.
    pub const IO: Self = Self::new("core", "io");

    /// Build a code from its namespace and identifier.
    #[must_use]
    pub const fn new(namespace: &'static str, code: &'static str) -> Self {
        Self { namespace, code }
    }

    /// Namespace portion (`settings`, `results`, `config`, ...).
    #[must_use]
    pub const fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Identifier within the namespace.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.to_string()
    }
}

/// Structured error returned by every fallible operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Origin category.
    pub kind: ErrorKind,
    /// Retry classification.
    pub class: ErrorClass,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message, safe to show to an administrator.
    pub message: String,
    /// Diagnostic metadata.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn build(kind: ErrorKind, class: ErrorClass, code: ErrorCode, message: String) -> Self {
        Self {
            kind,
            class,
            code,
            message,
            metadata: ErrorMetadata::new(),
        }
    }

    /// Rejected input; never retriable.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Expected, ErrorClass::NonRetriable, code, message.into())
    }

    /// Stored data violates the schema; never retriable.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Invariant, ErrorClass::NonRetriable, code, message.into())
    }

    /// Collaborator failure with an explicit retry class.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self::build(ErrorKind::Unexpected, class, code, message.into())
    }

    /// Returns true when the error has the given namespace and code.
    #[must_use]
    pub fn has_code(&self, namespace: &str, code: &str) -> bool {
        self.code.namespace() == namespace && self.code.code() == code
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "[{}] {}: {}",
            self.kind.as_str(),
            self.code,
            self.message
        )
    }
}

impl std::error::Error for ErrorEnvelope {}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        let kind = error.kind();
        Self::unexpected(ErrorCode::IO, error.to_string(), ErrorClass::for_io(kind))
            .with_metadata("io_kind", kind.to_string())
    }
}
