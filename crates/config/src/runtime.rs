//! Runtime configuration of the settings service.

use activity_finder_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current runtime config version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;
/// Default config namespace holding the settings record.
pub const DEFAULT_SETTINGS_NAMESPACE: &str = "openy_activity_finder.settings";
/// Default route of the internal results endpoint.
pub const DEFAULT_RESULTS_ROUTE: &str = "/af/get-data";

const MAX_NAMESPACE_LEN: usize = 250;

/// Minimum log level accepted by the runtime config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelSetting {
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warn and above.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevelSetting {
    /// Parse a level name (case-insensitive).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Root runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FinderRuntimeConfig {
    /// Config version.
    pub version: u32,
    /// Settings storage.
    pub settings: SettingsConfig,
    /// Results endpoint.
    pub results: ResultsConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl Default for FinderRuntimeConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            settings: SettingsConfig::default(),
            results: ResultsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Settings storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SettingsConfig {
    /// Namespace of the settings record in the config store.
    pub namespace: Box<str>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_SETTINGS_NAMESPACE.into(),
        }
    }
}

/// Results endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ResultsConfig {
    /// Route joined to the request's base URL.
    pub route: Box<str>,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            route: DEFAULT_RESULTS_ROUTE.into(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Minimum level written.
    pub level: LogLevelSetting,
}

/// Runtime config validated and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRuntimeConfig(FinderRuntimeConfig);

impl ValidatedRuntimeConfig {
    /// Borrow the validated config.
    #[must_use]
    pub const fn config(&self) -> &FinderRuntimeConfig {
        &self.0
    }

    /// Unwrap the validated config.
    #[must_use]
    pub fn into_inner(self) -> FinderRuntimeConfig {
        self.0
    }
}

impl std::ops::Deref for ValidatedRuntimeConfig {
    type Target = FinderRuntimeConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Runtime config schema errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeConfigError {
    /// The config version is not supported.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A required string is empty after trimming.
    EmptyValue {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
    },
    /// A string exceeds its length limit.
    TooLong {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file.
        field: &'static str,
        /// Length found.
        len: usize,
        /// Maximum length.
        max: usize,
    },
    /// The results route is not an absolute path.
    InvalidRoute {
        /// Route provided.
        route: String,
    },
}

impl RuntimeConfigError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_value"),
            Self::TooLong { .. } => ErrorCode::new("config", "value_too_long"),
            Self::InvalidRoute { .. } => ErrorCode::new("config", "invalid_route"),
        }
    }
}

impl fmt::Display for RuntimeConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::EmptyValue { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
            Self::TooLong {
                section,
                field,
                len,
                max,
            } => write!(
                formatter,
                "{section}.{field} is too long ({len} chars, max {max})"
            ),
            Self::InvalidRoute { route } => {
                write!(formatter, "results.route must start with '/': {route}")
            },
        }
    }
}

impl std::error::Error for RuntimeConfigError {}

impl From<RuntimeConfigError> for ErrorEnvelope {
    fn from(error: RuntimeConfigError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            RuntimeConfigError::UnsupportedVersion { found, supported } => {
                envelope = envelope
                    .with_metadata("found", found.to_string())
                    .with_metadata("supported", supported.to_string());
            },
            RuntimeConfigError::EmptyValue { section, field } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field);
            },
            RuntimeConfigError::TooLong {
                section,
                field,
                len,
                max,
            } => {
                envelope = envelope
                    .with_metadata("section", section)
                    .with_metadata("field", field)
                    .with_metadata("len", len.to_string())
                    .with_metadata("max", max.to_string());
            },
            RuntimeConfigError::InvalidRoute { route } => {
                envelope = envelope
                    .with_metadata("section", "results")
                    .with_metadata("field", "route")
                    .with_metadata("route", route);
            },
        }

        envelope
    }
}

impl FinderRuntimeConfig {
    /// Validate and normalize (trim strings).
    pub fn validate_and_normalize(mut self) -> Result<ValidatedRuntimeConfig, RuntimeConfigError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(RuntimeConfigError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        let namespace = self.settings.namespace.trim();
        if namespace.is_empty() {
            return Err(RuntimeConfigError::EmptyValue {
                section: "settings",
                field: "namespace",
            });
        }
        if namespace.len() > MAX_NAMESPACE_LEN {
            return Err(RuntimeConfigError::TooLong {
                section: "settings",
                field: "namespace",
                len: namespace.len(),
                max: MAX_NAMESPACE_LEN,
            });
        }
        self.settings.namespace = namespace.into();

        let route = self.results.route.trim();
        if route.is_empty() {
            return Err(RuntimeConfigError::EmptyValue {
                section: "results",
                field: "route",
            });
        }
        if !route.starts_with('/') || route.starts_with("//") {
            return Err(RuntimeConfigError::InvalidRoute {
                route: route.to_string(),
            });
        }
        self.results.route = route.into();

        Ok(ValidatedRuntimeConfig(self))
    }
}

/// Parse a runtime config from JSON, applying validation.
pub fn parse_runtime_config_json(input: &str) -> Result<ValidatedRuntimeConfig, ErrorEnvelope> {
    let config: FinderRuntimeConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a runtime config from TOML, applying validation.
pub fn parse_runtime_config_toml(input: &str) -> Result<ValidatedRuntimeConfig, ErrorEnvelope> {
    let config: FinderRuntimeConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}
