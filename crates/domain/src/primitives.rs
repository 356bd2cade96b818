//! Domain primitives with validated constructors.

use activity_finder_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `BackendId` is empty after trimming.
    InvalidBackendId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `IndexId` is empty after trimming.
    InvalidIndexId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `LocationTypeId` is empty after trimming.
    InvalidLocationTypeId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// Bootstrap grid version is not one of the supported versions.
    UnsupportedBootstrapVersion {
        /// Version provided.
        value: i64,
    },
    /// Collapse-group state is not one of the known states.
    UnknownCollapseGroupState {
        /// Raw (trimmed) value.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidBackendId { .. } => ErrorCode::new("domain", "invalid_backend_id"),
            Self::InvalidIndexId { .. } => ErrorCode::new("domain", "invalid_index_id"),
            Self::InvalidLocationTypeId { .. } => {
                ErrorCode::new("domain", "invalid_location_type_id")
            },
            Self::UnsupportedBootstrapVersion { .. } => {
                ErrorCode::new("domain", "unsupported_bootstrap_version")
            },
            Self::UnknownCollapseGroupState { .. } => {
                ErrorCode::new("domain", "unknown_collapse_group_state")
            },
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBackendId { .. } => formatter.write_str("BackendId must be non-empty"),
            Self::InvalidIndexId { .. } => formatter.write_str("IndexId must be non-empty"),
            Self::InvalidLocationTypeId { .. } => {
                formatter.write_str("LocationTypeId must be non-empty")
            },
            Self::UnsupportedBootstrapVersion { value } => {
                write!(formatter, "Bootstrap version {value} is not supported (3 or 4)")
            },
            Self::UnknownCollapseGroupState { input } => write!(
                formatter,
                "collapse group state `{input}` must be one of disabled, enabled_collapsed, enabled_expanded"
            ),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let mut envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            PrimitiveError::InvalidBackendId { input_length }
            | PrimitiveError::InvalidIndexId { input_length }
            | PrimitiveError::InvalidLocationTypeId { input_length } => {
                envelope = envelope.with_metadata("input_length", input_length.to_string());
            },
            PrimitiveError::UnsupportedBootstrapVersion { value } => {
                envelope = envelope.with_metadata("value", value.to_string());
            },
            PrimitiveError::UnknownCollapseGroupState { input } => {
                envelope = envelope.with_metadata("input", input);
            },
        }

        envelope
    }
}

fn parse_non_empty(input: &str) -> Option<Box<str>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned().into_boxed_str())
    }
}

/// Identifier of a search backend implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BackendId(Box<str>);

impl BackendId {
    /// Parse a backend id from input (trimmed, non-empty).
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let input = input.as_ref();
        parse_non_empty(input)
            .map(Self)
            .ok_or(PrimitiveError::InvalidBackendId {
                input_length: input.len(),
            })
    }

    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.into())
    }

    /// Borrow as `&str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this id selects the local-index backend.
    #[must_use]
    pub fn is_local_index(&self) -> bool {
        self.as_str() == crate::LOCAL_INDEX_BACKEND
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifier of a search index on the local-index backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IndexId(Box<str>);

impl IndexId {
    /// Parse an index id from input (trimmed, non-empty).
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let input = input.as_ref();
        parse_non_empty(input)
            .map(Self)
            .ok_or(PrimitiveError::InvalidIndexId {
                input_length: input.len(),
            })
    }

    /// Borrow as `&str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Content-type identifier of a location kind (branch, camp, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocationTypeId(Box<str>);

impl LocationTypeId {
    /// Parse a location type id from input (trimmed, non-empty).
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let input = input.as_ref();
        parse_non_empty(input)
            .map(Self)
            .ok_or(PrimitiveError::InvalidLocationTypeId {
                input_length: input.len(),
            })
    }

    /// Borrow as `&str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationTypeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Bootstrap grid version used by the front-end templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum BootstrapVersion {
    /// Bootstrap 3 grid.
    #[default]
    V3,
    /// Bootstrap 4 grid.
    V4,
}

impl BootstrapVersion {
    /// Supported versions, in display order.
    pub const ALL: [Self; 2] = [Self::V3, Self::V4];

    /// Numeric version.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }
}

impl TryFrom<i64> for BootstrapVersion {
    type Error = PrimitiveError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            _ => Err(PrimitiveError::UnsupportedBootstrapVersion { value }),
        }
    }
}

impl From<BootstrapVersion> for i64 {
    fn from(value: BootstrapVersion) -> Self {
        value.as_i64()
    }
}

/// Default display state of a filter group on the program search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseGroupState {
    /// The group is not collapsible.
    #[default]
    Disabled,
    /// Collapsible, collapsed initially.
    EnabledCollapsed,
    /// Collapsible, expanded initially.
    EnabledExpanded,
}

impl CollapseGroupState {
    /// All states, in display order.
    pub const ALL: [Self; 3] = [Self::Disabled, Self::EnabledCollapsed, Self::EnabledExpanded];

    /// Parse a stored/submitted state. Surrounding whitespace is ignored.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let trimmed = input.as_ref().trim();
        match trimmed {
            "disabled" => Ok(Self::Disabled),
            "enabled_collapsed" => Ok(Self::EnabledCollapsed),
            "enabled_expanded" => Ok(Self::EnabledExpanded),
            other => Err(PrimitiveError::UnknownCollapseGroupState {
                input: other.to_string(),
            }),
        }
    }

    /// Stored identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::EnabledCollapsed => "enabled_collapsed",
            Self::EnabledExpanded => "enabled_expanded",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::EnabledCollapsed => "Enabled - Collapsed",
            Self::EnabledExpanded => "Enabled - Expanded",
        }
    }
}

impl fmt::Display for CollapseGroupState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_id_requires_non_empty_input() {
        let error = BackendId::parse("   ").err();
        assert!(matches!(
            error,
            Some(PrimitiveError::InvalidBackendId { input_length: 3 })
        ));
    }

    #[test]
    fn ids_are_only_built_through_parse_and_serialize_as_strings() -> Result<(), PrimitiveError> {
        let id = LocationTypeId::parse("  camp ")?;
        assert_eq!(serde_json::to_value(&id).ok(), Some(serde_json::json!("camp")));
        assert!(LocationTypeId::parse("").is_err());
        assert!(IndexId::parse("\t").is_err());
        Ok(())
    }

    #[test]
    fn backend_id_detects_local_index() -> Result<(), PrimitiveError> {
        assert!(BackendId::parse(crate::LOCAL_INDEX_BACKEND)?.is_local_index());
        assert!(!BackendId::parse(crate::LIVE_API_BACKEND)?.is_local_index());
        Ok(())
    }

    #[test]
    fn bootstrap_version_accepts_three_and_four() {
        assert_eq!(BootstrapVersion::try_from(3), Ok(BootstrapVersion::V3));
        assert_eq!(BootstrapVersion::try_from(4), Ok(BootstrapVersion::V4));
        assert_eq!(
            BootstrapVersion::try_from(5),
            Err(PrimitiveError::UnsupportedBootstrapVersion { value: 5 })
        );
    }

    #[test]
    fn collapse_group_state_round_trips_identifiers() -> Result<(), PrimitiveError> {
        for state in CollapseGroupState::ALL {
            assert_eq!(CollapseGroupState::parse(state.as_str())?, state);
        }
        assert!(CollapseGroupState::parse("collapsed").is_err());
        Ok(())
    }
}
