//! The persisted Activity Finder settings record.
//!
//! The store keeps a flat, string-keyed map. `FinderSettings` is the typed view
//! of that map; conversion substitutes defaults for absent or `null` keys and
//! rejects values whose JSON type no longer matches the schema.

use crate::{BackendId, BootstrapVersion, CollapseGroupState, IndexId, LocationTypeId};
use activity_finder_shared::{ErrorCode, ErrorEnvelope};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Flat stored representation of the settings (one logical record).
pub type SettingsRecord = BTreeMap<String, Value>;

/// Location types offered by default when nothing was stored yet.
pub const DEFAULT_LOCATION_TYPES: [&str; 3] = ["branch", "camp", "facility"];

/// Number of free-text labels of the home-branch "no results" modal.
pub const HB_MODAL_TEXT_COUNT: usize = 6;

/// Every key of the settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs, reason = "variant names mirror the stored keys")]
pub enum SettingKey {
    Backend,
    Index,
    BsVersion,
    Ages,
    Weeks,
    Durations,
    AllowedQueryArguments,
    LocationTypes,
    Exclude,
    DisableSearchBox,
    DisableSpotsAvailable,
    HbModalText0,
    HbModalText1,
    HbModalText2,
    HbModalText3,
    HbModalText4,
    HbModalText5,
    ScheduleCollapseGroup,
    CategoryCollapseGroup,
    LocationsCollapseGroup,
    AdditionalCollapseGroup,
    DisableProgramSearchLog,
    DisableCacheDebugLog,
}

impl SettingKey {
    /// All keys in form order.
    pub const ALL: [Self; 23] = [
        Self::Backend,
        Self::Index,
        Self::BsVersion,
        Self::Ages,
        Self::AllowedQueryArguments,
        Self::LocationTypes,
        Self::Weeks,
        Self::Durations,
        Self::Exclude,
        Self::DisableSearchBox,
        Self::DisableSpotsAvailable,
        Self::HbModalText0,
        Self::HbModalText1,
        Self::HbModalText2,
        Self::HbModalText3,
        Self::HbModalText4,
        Self::HbModalText5,
        Self::ScheduleCollapseGroup,
        Self::CategoryCollapseGroup,
        Self::LocationsCollapseGroup,
        Self::AdditionalCollapseGroup,
        Self::DisableProgramSearchLog,
        Self::DisableCacheDebugLog,
    ];

    /// Modal text keys by position.
    pub const HB_MODAL_TEXTS: [Self; HB_MODAL_TEXT_COUNT] = [
        Self::HbModalText0,
        Self::HbModalText1,
        Self::HbModalText2,
        Self::HbModalText3,
        Self::HbModalText4,
        Self::HbModalText5,
    ];

    /// Stored key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Index => "index",
            Self::BsVersion => "bs_version",
            Self::Ages => "ages",
            Self::Weeks => "weeks",
            Self::Durations => "durations",
            Self::AllowedQueryArguments => "allowed_query_arguments",
            Self::LocationTypes => "location_types",
            Self::Exclude => "exclude",
            Self::DisableSearchBox => "disable_search_box",
            Self::DisableSpotsAvailable => "disable_spots_available",
            Self::HbModalText0 => "hb_modal_text0",
            Self::HbModalText1 => "hb_modal_text1",
            Self::HbModalText2 => "hb_modal_text2",
            Self::HbModalText3 => "hb_modal_text3",
            Self::HbModalText4 => "hb_modal_text4",
            Self::HbModalText5 => "hb_modal_text5",
            Self::ScheduleCollapseGroup => "schedule_collapse_group",
            Self::CategoryCollapseGroup => "category_collapse_group",
            Self::LocationsCollapseGroup => "locations_collapse_group",
            Self::AdditionalCollapseGroup => "additional_collapse_group",
            Self::DisableProgramSearchLog => "disable_program_search_log",
            Self::DisableCacheDebugLog => "disable_cache_debug_log",
        }
    }

    /// Look up a key by its stored name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Collapse state of each filter group on the program search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CollapseGroups {
    /// Schedule preferences group.
    pub schedule: CollapseGroupState,
    /// Activity preferences group.
    pub category: CollapseGroupState,
    /// Location preferences group.
    pub locations: CollapseGroupState,
    /// Additional filters group.
    pub additional: CollapseGroupState,
}

impl CollapseGroups {
    /// State for a collapse-group key; `None` for other keys.
    #[must_use]
    pub const fn get(&self, key: SettingKey) -> Option<CollapseGroupState> {
        match key {
            SettingKey::ScheduleCollapseGroup => Some(self.schedule),
            SettingKey::CategoryCollapseGroup => Some(self.category),
            SettingKey::LocationsCollapseGroup => Some(self.locations),
            SettingKey::AdditionalCollapseGroup => Some(self.additional),
            _ => None,
        }
    }

    /// Set the state for a collapse-group key. Other keys are ignored.
    pub const fn set(&mut self, key: SettingKey, state: CollapseGroupState) {
        match key {
            SettingKey::ScheduleCollapseGroup => self.schedule = state,
            SettingKey::CategoryCollapseGroup => self.category = state,
            SettingKey::LocationsCollapseGroup => self.locations = state,
            SettingKey::AdditionalCollapseGroup => self.additional = state,
            _ => {},
        }
    }
}

/// Typed view of the Activity Finder settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinderSettings {
    /// Selected backend; absent until the first save.
    pub backend: Option<BackendId>,
    /// Search index (local-index backend only).
    pub index: Option<IndexId>,
    /// Bootstrap grid version.
    pub bs_version: BootstrapVersion,
    /// Ages mapping, one `"<months>,<label>"` per line (stored verbatim).
    pub ages: String,
    /// Weeks mapping, `"<date>,<label>"` pairs per line (stored verbatim).
    pub weeks: String,
    /// Durations mapping, one `"<days>|<label>"` per line (stored verbatim).
    pub durations: String,
    /// Query arguments allowed on search URLs. Never contains blank entries.
    pub allowed_query_arguments: Vec<String>,
    /// Location content types used by the search (set, first-seen order).
    pub location_types: Vec<LocationTypeId>,
    /// Program subcategory id excluded from results.
    pub exclude: String,
    /// Hide the search text box.
    pub disable_search_box: bool,
    /// Hide the spots-available feature.
    pub disable_spots_available: bool,
    /// Home-branch "no results" modal labels.
    pub hb_modal_texts: [String; HB_MODAL_TEXT_COUNT],
    /// Filter group collapse states.
    pub collapse_groups: CollapseGroups,
    /// Disable the program search log.
    pub disable_program_search_log: bool,
    /// Disable the cache debug log.
    pub disable_cache_debug_log: bool,
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self {
            backend: None,
            index: None,
            bs_version: BootstrapVersion::default(),
            ages: String::new(),
            weeks: String::new(),
            durations: String::new(),
            allowed_query_arguments: Vec::new(),
            location_types: default_location_types(),
            exclude: String::new(),
            disable_search_box: false,
            disable_spots_available: false,
            hb_modal_texts: Default::default(),
            collapse_groups: CollapseGroups::default(),
            disable_program_search_log: false,
            disable_cache_debug_log: false,
        }
    }
}

/// The default location type set.
#[must_use]
pub fn default_location_types() -> Vec<LocationTypeId> {
    DEFAULT_LOCATION_TYPES
        .iter()
        .filter_map(|id| LocationTypeId::parse(id).ok())
        .collect()
}

/// Stored record no longer matches the settings schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecordError {
    /// Offending key.
    pub key: SettingKey,
    /// Expected JSON shape.
    pub expected: &'static str,
}

impl fmt::Display for SettingsRecordError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "stored setting `{}` must be {}",
            self.key, self.expected
        )
    }
}

impl std::error::Error for SettingsRecordError {}

impl From<SettingsRecordError> for ErrorEnvelope {
    fn from(error: SettingsRecordError) -> Self {
        Self::invariant(
            ErrorCode::new("settings", "stored_record_invalid"),
            error.to_string(),
        )
        .with_metadata("key", error.key.as_str())
        .with_metadata("expected", error.expected)
    }
}

impl FinderSettings {
    /// Build the typed settings from a stored record.
    ///
    /// Absent and `null` keys take their defaults. Empty strings read as
    /// absent for `backend`, `index`, and the collapse groups.
    pub fn from_record(record: &SettingsRecord) -> Result<Self, SettingsRecordError> {
        let reader = RecordReader { record };
        let defaults = Self::default();

        let backend = reader
            .optional_string(SettingKey::Backend)?
            .and_then(|value| BackendId::parse(value).ok());
        let index = reader
            .optional_string(SettingKey::Index)?
            .and_then(|value| IndexId::parse(value).ok());
        let bs_version = match reader.value(SettingKey::BsVersion) {
            None => defaults.bs_version,
            Some(value) => read_bootstrap_version(value)
                .ok_or(reader.mismatch(SettingKey::BsVersion, "3 or 4"))?,
        };
        let location_types = match reader.value(SettingKey::LocationTypes) {
            None => defaults.location_types,
            Some(value) => read_location_types(value)
                .ok_or(reader.mismatch(SettingKey::LocationTypes, "a list or checkbox map of strings"))?,
        };
        let allowed_query_arguments = match reader.value(SettingKey::AllowedQueryArguments) {
            None => Vec::new(),
            Some(value) => read_string_list(value)
                .ok_or(reader.mismatch(SettingKey::AllowedQueryArguments, "a list of strings"))?
                .into_iter()
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect(),
        };

        let mut hb_modal_texts: [String; HB_MODAL_TEXT_COUNT] = Default::default();
        for (slot, key) in hb_modal_texts.iter_mut().zip(SettingKey::HB_MODAL_TEXTS) {
            *slot = reader.string(key)?;
        }

        let mut collapse_groups = CollapseGroups::default();
        for key in COLLAPSE_GROUP_KEYS {
            if let Some(raw) = reader.optional_string(key)? {
                let state = CollapseGroupState::parse(&raw)
                    .map_err(|_| reader.mismatch(key, "a collapse group state"))?;
                collapse_groups.set(key, state);
            }
        }

        Ok(Self {
            backend,
            index,
            bs_version,
            ages: reader.string(SettingKey::Ages)?,
            weeks: reader.string(SettingKey::Weeks)?,
            durations: reader.string(SettingKey::Durations)?,
            allowed_query_arguments,
            location_types,
            exclude: reader.string(SettingKey::Exclude)?,
            disable_search_box: reader.flag(SettingKey::DisableSearchBox)?,
            disable_spots_available: reader.flag(SettingKey::DisableSpotsAvailable)?,
            hb_modal_texts,
            collapse_groups,
            disable_program_search_log: reader.flag(SettingKey::DisableProgramSearchLog)?,
            disable_cache_debug_log: reader.flag(SettingKey::DisableCacheDebugLog)?,
        })
    }

    /// Stage every key into a flat record ready to be committed.
    #[must_use]
    pub fn to_record(&self) -> SettingsRecord {
        let mut record = SettingsRecord::new();
        let mut put = |key: SettingKey, value: Value| {
            record.insert(key.as_str().to_string(), value);
        };

        put(
            SettingKey::Backend,
            self.backend
                .as_ref()
                .map_or(Value::Null, |id| Value::from(id.as_str())),
        );
        put(
            SettingKey::Index,
            self.index
                .as_ref()
                .map_or(Value::Null, |id| Value::from(id.as_str())),
        );
        put(SettingKey::BsVersion, Value::from(self.bs_version.as_i64()));
        put(SettingKey::Ages, Value::from(self.ages.as_str()));
        put(SettingKey::Weeks, Value::from(self.weeks.as_str()));
        put(SettingKey::Durations, Value::from(self.durations.as_str()));
        put(
            SettingKey::AllowedQueryArguments,
            Value::Array(
                self.allowed_query_arguments
                    .iter()
                    .map(|entry| Value::from(entry.as_str()))
                    .collect(),
            ),
        );
        put(
            SettingKey::LocationTypes,
            Value::Array(
                self.location_types
                    .iter()
                    .map(|id| Value::from(id.as_str()))
                    .collect(),
            ),
        );
        put(SettingKey::Exclude, Value::from(self.exclude.as_str()));
        put(
            SettingKey::DisableSearchBox,
            Value::Bool(self.disable_search_box),
        );
        put(
            SettingKey::DisableSpotsAvailable,
            Value::Bool(self.disable_spots_available),
        );
        for (key, text) in SettingKey::HB_MODAL_TEXTS.iter().zip(&self.hb_modal_texts) {
            put(*key, Value::from(text.as_str()));
        }
        for key in COLLAPSE_GROUP_KEYS {
            let state = self.collapse_groups.get(key).unwrap_or_default();
            put(key, Value::from(state.as_str()));
        }
        put(
            SettingKey::DisableProgramSearchLog,
            Value::Bool(self.disable_program_search_log),
        );
        put(
            SettingKey::DisableCacheDebugLog,
            Value::Bool(self.disable_cache_debug_log),
        );

        record
    }

    /// The modal label stored under a modal text key.
    #[must_use]
    pub fn hb_modal_text(&self, key: SettingKey) -> Option<&str> {
        SettingKey::HB_MODAL_TEXTS
            .iter()
            .position(|candidate| *candidate == key)
            .and_then(|position| self.hb_modal_texts.get(position))
            .map(String::as_str)
    }
}

/// Collapse-group keys in form order.
pub const COLLAPSE_GROUP_KEYS: [SettingKey; 4] = [
    SettingKey::ScheduleCollapseGroup,
    SettingKey::CategoryCollapseGroup,
    SettingKey::LocationsCollapseGroup,
    SettingKey::AdditionalCollapseGroup,
];

struct RecordReader<'a> {
    record: &'a SettingsRecord,
}

impl RecordReader<'_> {
    fn value(&self, key: SettingKey) -> Option<&Value> {
        self.record
            .get(key.as_str())
            .filter(|value| !value.is_null())
    }

    const fn mismatch(&self, key: SettingKey, expected: &'static str) -> SettingsRecordError {
        SettingsRecordError { key, expected }
    }

    fn string(&self, key: SettingKey) -> Result<String, SettingsRecordError> {
        match self.value(key) {
            None => Ok(String::new()),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(_) => Err(self.mismatch(key, "a string")),
        }
    }

    fn optional_string(&self, key: SettingKey) -> Result<Option<String>, SettingsRecordError> {
        let text = self.string(key)?;
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn flag(&self, key: SettingKey) -> Result<bool, SettingsRecordError> {
        match self.value(key) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            // Checkbox values are sometimes stored as 0/1.
            Some(Value::Number(number)) => match number.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.mismatch(key, "a boolean")),
            },
            Some(_) => Err(self.mismatch(key, "a boolean")),
        }
    }
}

fn read_bootstrap_version(value: &Value) -> Option<BootstrapVersion> {
    let number = match value {
        Value::Number(number) => number.as_i64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    BootstrapVersion::try_from(number).ok()
}

fn read_string_list(value: &Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Checkbox maps store `id => id` for checked entries and `0`/`false` otherwise.
fn checked_keys(value: &Value) -> Option<Vec<String>> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(
        map.iter()
            .filter(|(key, checked)| {
                checked
                    .as_str()
                    .is_some_and(|checked| !checked.is_empty() && checked == key.as_str())
            })
            .map(|(key, _)| key.clone())
            .collect(),
    )
}

fn read_location_types(value: &Value) -> Option<Vec<LocationTypeId>> {
    let entries = read_string_list(value).or_else(|| checked_keys(value))?;
    let mut ids: Vec<LocationTypeId> = Vec::new();
    for entry in entries {
        let Ok(id) = LocationTypeId::parse(&entry) else {
            continue;
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Some(ids)
}
