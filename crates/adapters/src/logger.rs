//! JSON-lines logger for settings and results events.
//!
//! Each event becomes one line:
//!
//! ```text
//! {"ts":1718000000000,"level":"info","component":"settings","event":"settings.submission.persisted",
//!  "correlationId":"req_1a","message":"Settings persisted","fields":{"namespace":"..."}}
//! ```
//!
//! `component` is the event name up to its first dot. A string `correlationId`
//! field is lifted to the top level so lines of one request can be grouped.

use crate::log_sink::LogSink;
use activity_finder_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use activity_finder_shared::{ErrorEnvelope, REDACTED, is_secret_key};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const CORRELATION_FIELD: &str = "correlationId";

/// Logger writing one JSON line per event to a [`LogSink`].
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Logger at `info` level.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            min_level: LogLevel::Info,
        }
    }

    /// Drop events below `level`.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogLine<'a> {
    ts: u64,
    level: &'static str,
    component: &'a str,
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    message: &'a str,
    #[serde(skip_serializing_if = "LogFields::is_empty")]
    fields: LogFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorEnvelope>,
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }

        let mut fields = event.fields.unwrap_or_default();
        let correlation_id = match fields.remove(CORRELATION_FIELD) {
            Some(Value::String(id)) => Some(id),
            Some(other) => {
                fields.insert(CORRELATION_FIELD.into(), other);
                None
            },
            None => None,
        };
        for (key, value) in &mut fields {
            scrub(key, value);
        }

        let error = event.error.map(redact_error);
        let line = LogLine {
            ts: now_epoch_ms(),
            level: event.level.as_str(),
            component: component_of(&event.event),
            event: &event.event,
            correlation_id,
            message: &event.message,
            fields,
            error: error.as_ref(),
        };

        if let Ok(mut encoded) = serde_json::to_string(&line) {
            encoded.push('\n');
            self.sink.write_line(&encoded);
        }
    }
}

fn component_of(event: &str) -> &str {
    event.split_once('.').map_or(event, |(component, _)| component)
}

fn scrub(key: &str, value: &mut Value) {
    if is_secret_key(key) {
        *value = Value::String(REDACTED.to_string());
        return;
    }
    match value {
        Value::Object(map) => {
            for (nested_key, nested) in map.iter_mut() {
                scrub(nested_key, nested);
            }
        },
        Value::Array(items) => {
            for item in items {
                scrub("", item);
            }
        },
        _ => {},
    }
}

fn redact_error(mut error: ErrorEnvelope) -> ErrorEnvelope {
    for (key, value) in &mut error.metadata {
        if is_secret_key(key) {
            *value = REDACTED.to_string();
        }
    }
    error
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use activity_finder_shared::{ErrorClass, ErrorCode};
    use serde_json::json;

    fn parse_single(sink: &MemoryLogSink) -> Result<Value, Box<dyn std::error::Error>> {
        let lines = sink.take();
        let [line] = lines.as_slice() else {
            return Err(format!("expected one line, got {}", lines.len()).into());
        };
        Ok(serde_json::from_str(line.trim())?)
    }

    #[test]
    fn line_carries_component_and_correlation_id() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::new());
        let logger = JsonLogger::new(sink.clone());

        let mut fields = LogFields::new();
        fields.insert(CORRELATION_FIELD.into(), json!("req_7f"));
        fields.insert("namespace".into(), json!("openy_activity_finder.settings"));
        logger.info(
            "settings.submission.persisted",
            "Settings persisted",
            Some(fields),
        );

        let payload = parse_single(&sink)?;
        assert_eq!(payload.get("component"), Some(&json!("settings")));
        assert_eq!(payload.get("correlationId"), Some(&json!("req_7f")));
        assert_eq!(payload.get("level"), Some(&json!("info")));
        assert_eq!(
            payload.get("fields"),
            Some(&json!({ "namespace": "openy_activity_finder.settings" }))
        );
        assert!(payload.get("error").is_none());
        Ok(())
    }

    #[test]
    fn failure_embeds_envelope_and_redacts_secrets() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemoryLogSink::new());
        let logger = JsonLogger::new(sink.clone());

        let error = ErrorEnvelope::unexpected(
            ErrorCode::new("results", "http_error"),
            "results endpoint returned 503 Service Unavailable",
            ErrorClass::Retriable,
        )
        .with_metadata("status", "503")
        .with_metadata("authToken", "abc"); // pragma: allowlist secret

        let mut fields = LogFields::new();
        fields.insert("reason".into(), json!("transport"));
        fields.insert(
            "headers".into(),
            json!([{ "apiKey": "should-hide", "accept": "application/json" }]), // pragma: allowlist secret
        );
        logger.failure(
            "results.fetch.unavailable",
            "Results endpoint unavailable",
            Some(fields),
            &error,
        );

        let payload = parse_single(&sink)?;
        assert_eq!(payload.get("component"), Some(&json!("results")));
        assert_eq!(payload.get("level"), Some(&json!("error")));
        assert_eq!(
            payload.pointer("/error/code"),
            Some(&json!("results:http_error"))
        );
        assert_eq!(payload.pointer("/error/class"), Some(&json!("retriable")));
        assert_eq!(payload.pointer("/error/metadata/status"), Some(&json!("503")));
        assert_eq!(
            payload.pointer("/error/metadata/authToken"),
            Some(&json!(REDACTED))
        );
        assert_eq!(
            payload.pointer("/fields/headers/0/apiKey"),
            Some(&json!(REDACTED))
        );
        assert_eq!(
            payload.pointer("/fields/headers/0/accept"),
            Some(&json!("application/json"))
        );
        Ok(())
    }

    #[test]
    fn events_below_min_level_are_dropped() {
        let sink = Arc::new(MemoryLogSink::new());
        let logger = JsonLogger::new(sink.clone()).with_min_level(LogLevel::Warn);

        logger.debug("settings.view.loaded", "Settings view loaded", None);
        logger.info("results.fetch.completed", "Results payload fetched", None);
        logger.warn("settings.submission.rejected", "Settings submission rejected", None);

        let lines = sink.take();
        assert_eq!(lines.len(), 1);
        assert!(lines.iter().all(|line| line.contains("settings.submission.rejected")));
    }

    #[test]
    fn event_without_dot_is_its_own_component() {
        assert_eq!(component_of("startup"), "startup");
        assert_eq!(component_of("settings.cache.invalidated"), "settings");
    }
}
