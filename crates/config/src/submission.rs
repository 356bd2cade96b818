//! Settings submission DTO and validation.
//!
//! A submission is a boundary input from the settings form. Validation runs
//! against the backends and catalogs offered at submit time and collects
//! every failing field before giving up.

use crate::schema::field_spec;
use activity_finder_domain::{
    BackendId, BackendOption, BootstrapVersion, CollapseGroupState, COLLAPSE_GROUP_KEYS,
    FinderSettings, HB_MODAL_TEXT_COUNT, IndexId, LocationTypeId, LocationTypeOption,
    SearchIndexOption, SettingKey, default_location_types, split_lines,
};
use activity_finder_shared::{ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bootstrap version as submitted: forms post strings, API callers numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum BootstrapVersionInput {
    /// Numeric value.
    Number(i64),
    /// Text value (e.g. `"4"`).
    Text(String),
}

/// Raw settings submission (boundary DTO).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SettingsSubmission {
    /// Selected backend id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    /// Search index id (local-index backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Bootstrap grid version; 3 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs_version: Option<BootstrapVersionInput>,
    /// Ages mapping text.
    #[serde(default)]
    pub ages: String,
    /// Weeks mapping text.
    #[serde(default)]
    pub weeks: String,
    /// Durations mapping text.
    #[serde(default)]
    pub durations: String,
    /// Allowed query arguments, one per line.
    #[serde(default)]
    pub allowed_query_arguments: String,
    /// Checked location types; the default set when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_types: Option<Vec<String>>,
    /// Excluded program subcategory id.
    #[serde(default)]
    pub exclude: String,
    /// Hide the search box.
    #[serde(default)]
    pub disable_search_box: bool,
    /// Disable spots available.
    #[serde(default)]
    pub disable_spots_available: bool,
    /// Modal title.
    #[serde(default)]
    pub hb_modal_text0: String,
    /// Modal text line 1.
    #[serde(default)]
    pub hb_modal_text1: String,
    /// Modal text line 2.
    #[serde(default)]
    pub hb_modal_text2: String,
    /// Modal text line 3.
    #[serde(default)]
    pub hb_modal_text3: String,
    /// Close button text.
    #[serde(default)]
    pub hb_modal_text4: String,
    /// Start over button text.
    #[serde(default)]
    pub hb_modal_text5: String,
    /// Schedule group collapse state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_collapse_group: Option<String>,
    /// Activity group collapse state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_collapse_group: Option<String>,
    /// Location group collapse state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations_collapse_group: Option<String>,
    /// Additional filters group collapse state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_collapse_group: Option<String>,
    /// Disable the program search log.
    #[serde(default)]
    pub disable_program_search_log: bool,
    /// Disable the cache debug log.
    #[serde(default)]
    pub disable_cache_debug_log: bool,
}

impl SettingsSubmission {
    fn collapse_group(&self, key: SettingKey) -> Option<&str> {
        match key {
            SettingKey::ScheduleCollapseGroup => self.schedule_collapse_group.as_deref(),
            SettingKey::CategoryCollapseGroup => self.category_collapse_group.as_deref(),
            SettingKey::LocationsCollapseGroup => self.locations_collapse_group.as_deref(),
            SettingKey::AdditionalCollapseGroup => self.additional_collapse_group.as_deref(),
            _ => None,
        }
    }

    fn hb_modal_texts(&self) -> [String; HB_MODAL_TEXT_COUNT] {
        [
            self.hb_modal_text0.clone(),
            self.hb_modal_text1.clone(),
            self.hb_modal_text2.clone(),
            self.hb_modal_text3.clone(),
            self.hb_modal_text4.clone(),
            self.hb_modal_text5.clone(),
        ]
    }
}

/// Choices offered at submit time.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionChoices<'a> {
    /// Backends offered right now.
    pub backends: &'a [BackendOption],
    /// Index catalog; `None` without the indexing capability.
    pub indexes: Option<&'a [SearchIndexOption]>,
    /// Location type catalog.
    pub location_types: &'a [LocationTypeOption],
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Offending key.
    pub field: SettingKey,
    /// Message shown next to the field.
    pub message: String,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionValidationError {
    /// Per-field errors.
    pub errors: Vec<FieldError>,
}

impl SubmissionValidationError {
    /// Keys of the failing fields.
    #[must_use]
    pub fn fields(&self) -> Vec<SettingKey> {
        self.errors.iter().map(|error| error.field).collect()
    }

    /// True when `key` failed.
    #[must_use]
    pub fn has_field(&self, key: SettingKey) -> bool {
        self.errors.iter().any(|error| error.field == key)
    }
}

impl fmt::Display for SubmissionValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.iter().map(|error| error.field.as_str()).collect();
        write!(
            formatter,
            "settings submission is invalid: {}",
            fields.join(", ")
        )
    }
}

impl std::error::Error for SubmissionValidationError {}

impl From<SubmissionValidationError> for ErrorEnvelope {
    fn from(error: SubmissionValidationError) -> Self {
        let fields: Vec<&str> = error.errors.iter().map(|item| item.field.as_str()).collect();
        let mut envelope = Self::expected(
            ErrorCode::new("settings", "validation_failed"),
            error.to_string(),
        )
        .with_metadata("fields", fields.join(","));

        for item in error.errors {
            envelope = envelope.with_metadata(format!("field.{}", item.field), item.message);
        }

        envelope
    }
}

#[derive(Default)]
struct ErrorCollector {
    errors: Vec<FieldError>,
}

impl ErrorCollector {
    fn reject(&mut self, field: SettingKey, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn required(&mut self, field: SettingKey) {
        let title = field_spec(field).map_or(field.as_str(), |spec| spec.title);
        self.reject(field, format!("{title} field is required."));
    }

    fn finish<T>(mut self, value: T) -> Result<T, SubmissionValidationError> {
        if self.errors.is_empty() {
            return Ok(value);
        }
        let position =
            |key: SettingKey| SettingKey::ALL.iter().position(|candidate| *candidate == key);
        self.errors.sort_by_key(|error| position(error.field));
        Err(SubmissionValidationError {
            errors: self.errors,
        })
    }
}

/// Validate a submission and normalize it into the settings to persist.
pub fn validate_submission(
    submission: &SettingsSubmission,
    choices: SubmissionChoices<'_>,
) -> Result<FinderSettings, SubmissionValidationError> {
    let mut errors = ErrorCollector::default();

    let backend = match non_blank(submission.backend.as_deref()) {
        None => {
            errors.required(SettingKey::Backend);
            None
        },
        Some(raw) => {
            let offered = choices
                .backends
                .iter()
                .find(|option| option.id.as_str() == raw);
            if offered.is_none() {
                errors.reject(
                    SettingKey::Backend,
                    "The selected backend is not available.",
                );
            }
            offered.map(|option| option.id.clone())
        },
    };

    let index = non_blank(submission.index.as_deref()).and_then(|raw| IndexId::parse(raw).ok());
    if backend.as_ref().is_some_and(BackendId::is_local_index) {
        match (&index, choices.indexes) {
            (None, _) => errors.required(SettingKey::Index),
            (Some(id), Some(catalog)) if !catalog.iter().any(|option| &option.id == id) => {
                errors.reject(SettingKey::Index, "The selected index is not available.");
            },
            _ => {},
        }
    }

    let bs_version = match &submission.bs_version {
        None => BootstrapVersion::default(),
        Some(input) => parse_bootstrap_version(input).unwrap_or_else(|| {
            errors.reject(SettingKey::BsVersion, "Bootstrap version must be 3 or 4.");
            BootstrapVersion::default()
        }),
    };

    let location_types = match &submission.location_types {
        None => default_location_types(),
        Some(entries) => {
            let ids = dedup_location_types(entries);
            let unknown: Vec<&str> = ids
                .iter()
                .filter(|id| !choices.location_types.iter().any(|option| &option.id == *id))
                .map(LocationTypeId::as_str)
                .collect();
            if !unknown.is_empty() {
                errors.reject(
                    SettingKey::LocationTypes,
                    format!("Unknown location types: {}.", unknown.join(", ")),
                );
            }
            ids
        },
    };

    let mut settings = FinderSettings {
        backend,
        index,
        bs_version,
        ages: submission.ages.clone(),
        weeks: submission.weeks.clone(),
        durations: submission.durations.clone(),
        allowed_query_arguments: split_lines(&submission.allowed_query_arguments),
        location_types,
        exclude: submission.exclude.clone(),
        disable_search_box: submission.disable_search_box,
        disable_spots_available: submission.disable_spots_available,
        hb_modal_texts: submission.hb_modal_texts(),
        disable_program_search_log: submission.disable_program_search_log,
        disable_cache_debug_log: submission.disable_cache_debug_log,
        ..FinderSettings::default()
    };

    for key in COLLAPSE_GROUP_KEYS {
        let Some(raw) = non_blank(submission.collapse_group(key)) else {
            continue;
        };
        match CollapseGroupState::parse(raw) {
            Ok(state) => settings.collapse_groups.set(key, state),
            Err(error) => errors.reject(key, error.to_string()),
        }
    }

    errors.finish(settings)
}

/// Parse a submission from JSON.
pub fn parse_submission_json(input: &str) -> Result<SettingsSubmission, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid settings submission JSON: {error}"),
        )
        .with_metadata("request_kind", "settingsSubmission")
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_bootstrap_version(input: &BootstrapVersionInput) -> Option<BootstrapVersion> {
    let value = match input {
        BootstrapVersionInput::Number(value) => *value,
        BootstrapVersionInput::Text(text) => text.trim().parse().ok()?,
    };
    BootstrapVersion::try_from(value).ok()
}

fn dedup_location_types(entries: &[String]) -> Vec<LocationTypeId> {
    let mut ids: Vec<LocationTypeId> = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Ok(id) = LocationTypeId::parse(entry)
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}
