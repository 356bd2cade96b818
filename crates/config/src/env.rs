//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a present but empty or malformed value fails with
//! the variable name in the error metadata.

use crate::runtime::{FinderRuntimeConfig, LogLevelSetting, ValidatedRuntimeConfig};
use activity_finder_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: settings namespace override.
pub const ENV_SETTINGS_NAMESPACE: &str = "AF_SETTINGS_NAMESPACE";
/// Env var: results route override.
pub const ENV_RESULTS_ROUTE: &str = "AF_RESULTS_ROUTE";
/// Env var: minimum log level.
pub const ENV_LOG_LEVEL: &str = "AF_LOG_LEVEL";

const ENV_VARS: [&str; 3] = [ENV_SETTINGS_NAMESPACE, ENV_RESULTS_ROUTE, ENV_LOG_LEVEL];

/// Typed env-derived overrides for `FinderRuntimeConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinderEnv {
    /// Override for `settings.namespace`.
    pub settings_namespace: Option<Box<str>>,
    /// Override for `results.route`.
    pub results_route: Option<Box<str>>,
    /// Override for `logging.level`.
    pub log_level: Option<LogLevelSetting>,
}

impl FinderEnv {
    /// Parse overrides from an explicit variable map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        let log_level = match read_trimmed(map, ENV_LOG_LEVEL)? {
            None => None,
            Some(raw) => Some(LogLevelSetting::parse(&raw).ok_or(EnvParseError::InvalidEnum {
                var: ENV_LOG_LEVEL,
                value: raw.to_string(),
            })?),
        };

        Ok(Self {
            settings_namespace: read_trimmed(map, ENV_SETTINGS_NAMESPACE)?,
            results_route: read_trimmed(map, ENV_RESULTS_ROUTE)?,
            log_level,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map = ENV_VARS
            .iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| ((*name).to_string(), value))
            })
            .collect();
        Self::from_map(&map)
    }

    /// True when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.settings_namespace.is_none() && self.results_route.is_none() && self.log_level.is_none()
    }
}

fn read_trimmed(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    match map.get(var) {
        None => Ok(None),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(EnvParseError::EmptyValue { var })
            } else {
                Ok(Some(trimmed.into()))
            }
        },
    }
}

/// Env parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => {
                envelope = envelope.with_metadata("env_var", var);
            },
            EnvParseError::InvalidEnum { var, value } => {
                envelope = envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", value);
            },
        }

        envelope
    }
}

/// Apply env overrides on top of `config`, then validate the result.
pub fn apply_env_overrides(
    mut config: FinderRuntimeConfig,
    env: &FinderEnv,
) -> Result<ValidatedRuntimeConfig, ErrorEnvelope> {
    if let Some(namespace) = &env.settings_namespace {
        config.settings.namespace = namespace.clone();
    }
    if let Some(route) = &env.results_route {
        config.results.route = route.clone();
    }
    if let Some(level) = env.log_level {
        config.logging.level = level;
    }

    config.validate_and_normalize().map_err(Into::into)
}
