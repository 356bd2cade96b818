//! Editable view of the current settings.

use crate::schema::{FIELD_SPECS, FieldGroup, FieldSpec, Requirement, WidgetKind};
use activity_finder_domain::{
    BackendOption, BootstrapVersion, CollapseGroupState, FinderSettings, LocationTypeOption,
    SearchIndexOption, SettingKey, join_lines,
};
use serde::Serialize;

/// One selectable value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Submitted value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl Choice {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Value shown in a field widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value selected.
    Absent,
    /// Text (textfield, textarea, select, radios).
    Text(String),
    /// Numeric select value.
    Number(i64),
    /// Checkbox state.
    Flag(bool),
    /// Checked entries of a checkbox list.
    List(Vec<String>),
}

impl FieldValue {
    /// Borrow the text, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A field of the editable view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    /// Stored key.
    pub key: SettingKey,
    /// Edit widget.
    pub kind: WidgetKind,
    /// Form section.
    pub group: FieldGroup,
    /// Field title.
    pub title: &'static str,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    /// Requirement rule.
    pub requirement: Requirement,
    /// Current value.
    pub value: FieldValue,
    /// Value used when nothing is stored.
    pub default: FieldValue,
    /// Allowed values, for choice widgets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

/// Ordered list of editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    /// Fields in form order.
    pub fields: Vec<FieldDefinition>,
}

impl FieldSet {
    /// Find a field by key.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// True when the view shows a field for `key`.
    #[must_use]
    pub fn contains(&self, key: SettingKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the set has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Build the editable view of `current`.
///
/// `indexes` is `None` when the indexing capability is absent; the `index`
/// field is then left out entirely.
#[must_use]
pub fn build_field_set(
    current: &FinderSettings,
    backends: &[BackendOption],
    indexes: Option<&[SearchIndexOption]>,
    location_types: &[LocationTypeOption],
) -> FieldSet {
    let defaults = FinderSettings::default();
    let fields = FIELD_SPECS
        .iter()
        .filter(|spec| spec.key != SettingKey::Index || indexes.is_some())
        .map(|spec| FieldDefinition {
            key: spec.key,
            kind: spec.kind,
            group: spec.group,
            title: spec.title,
            description: spec.description,
            requirement: spec.requirement,
            value: field_value(current, spec.key),
            default: field_value(&defaults, spec.key),
            choices: choices_for(spec, backends, indexes, location_types),
        })
        .collect();

    FieldSet { fields }
}

fn field_value(settings: &FinderSettings, key: SettingKey) -> FieldValue {
    let text = |value: &str| FieldValue::Text(value.to_string());
    match key {
        SettingKey::Backend => settings
            .backend
            .as_ref()
            .map_or(FieldValue::Absent, |id| text(id.as_str())),
        SettingKey::Index => settings
            .index
            .as_ref()
            .map_or(FieldValue::Absent, |id| text(id.as_str())),
        SettingKey::BsVersion => FieldValue::Number(settings.bs_version.as_i64()),
        SettingKey::Ages => text(&settings.ages),
        SettingKey::Weeks => text(&settings.weeks),
        SettingKey::Durations => text(&settings.durations),
        SettingKey::AllowedQueryArguments => {
            FieldValue::Text(join_lines(&settings.allowed_query_arguments))
        },
        SettingKey::LocationTypes => FieldValue::List(
            settings
                .location_types
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        ),
        SettingKey::Exclude => text(&settings.exclude),
        SettingKey::DisableSearchBox => FieldValue::Flag(settings.disable_search_box),
        SettingKey::DisableSpotsAvailable => FieldValue::Flag(settings.disable_spots_available),
        SettingKey::HbModalText0
        | SettingKey::HbModalText1
        | SettingKey::HbModalText2
        | SettingKey::HbModalText3
        | SettingKey::HbModalText4
        | SettingKey::HbModalText5 => text(settings.hb_modal_text(key).unwrap_or_default()),
        SettingKey::ScheduleCollapseGroup
        | SettingKey::CategoryCollapseGroup
        | SettingKey::LocationsCollapseGroup
        | SettingKey::AdditionalCollapseGroup => {
            text(settings.collapse_groups.get(key).unwrap_or_default().as_str())
        },
        SettingKey::DisableProgramSearchLog => {
            FieldValue::Flag(settings.disable_program_search_log)
        },
        SettingKey::DisableCacheDebugLog => FieldValue::Flag(settings.disable_cache_debug_log),
    }
}

fn choices_for(
    spec: &FieldSpec,
    backends: &[BackendOption],
    indexes: Option<&[SearchIndexOption]>,
    location_types: &[LocationTypeOption],
) -> Option<Vec<Choice>> {
    match spec.key {
        SettingKey::Backend => Some(
            backends
                .iter()
                .map(|option| Choice::new(option.id.as_str(), option.label.as_ref()))
                .collect(),
        ),
        SettingKey::Index => indexes.map(|indexes| {
            indexes
                .iter()
                .map(|option| Choice::new(option.id.as_str(), option.label.as_ref()))
                .collect()
        }),
        SettingKey::BsVersion => Some(
            BootstrapVersion::ALL
                .iter()
                .map(|version| {
                    let value = version.as_i64().to_string();
                    Choice::new(value.clone(), value)
                })
                .collect(),
        ),
        SettingKey::LocationTypes => Some(
            location_types
                .iter()
                .map(|option| Choice::new(option.id.as_str(), option.label.as_ref()))
                .collect(),
        ),
        _ if spec.kind == WidgetKind::Radios => Some(
            CollapseGroupState::ALL
                .iter()
                .map(|state| Choice::new(state.as_str(), state.label()))
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_finder_domain::{
        IndexId, LIVE_API_BACKEND, LocationTypeId, PrimitiveError, available_backends,
        default_location_types,
    };

    fn location_catalog() -> Result<Vec<LocationTypeOption>, PrimitiveError> {
        Ok(vec![
            LocationTypeOption {
                id: LocationTypeId::parse("branch")?,
                label: "Branch".into(),
            },
            LocationTypeOption {
                id: LocationTypeId::parse("camp")?,
                label: "Camp".into(),
            },
        ])
    }

    #[test]
    fn index_field_hidden_without_catalog() -> Result<(), PrimitiveError> {
        let backends = available_backends(|name| name == "openy_daxko2");
        let view = build_field_set(
            &FinderSettings::default(),
            &backends,
            None,
            &location_catalog()?,
        );
        assert!(!view.contains(SettingKey::Index));
        assert_eq!(view.len(), SettingKey::ALL.len() - 1);

        let backend = view.get(SettingKey::Backend);
        let values: Vec<&str> = backend
            .and_then(|field| field.choices.as_ref())
            .map(|choices| choices.iter().map(|choice| choice.value.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(values, vec![LIVE_API_BACKEND]);
        Ok(())
    }

    #[test]
    fn index_field_lists_catalog_entries() -> Result<(), PrimitiveError> {
        let indexes = vec![SearchIndexOption {
            id: IndexId::parse("activities")?,
            label: "Activities".into(),
        }];
        let view = build_field_set(
            &FinderSettings::default(),
            &available_backends(|_| true),
            Some(&indexes),
            &location_catalog()?,
        );
        let index = view.get(SettingKey::Index);
        assert_eq!(index.map(|field| &field.value), Some(&FieldValue::Absent));
        assert_eq!(
            index.and_then(|field| field.choices.as_ref()).map(Vec::len),
            Some(1)
        );
        Ok(())
    }

    #[test]
    fn allowed_arguments_shown_as_newline_text() -> Result<(), PrimitiveError> {
        let settings = FinderSettings {
            allowed_query_arguments: vec!["locations".into(), "ages".into()],
            ..FinderSettings::default()
        };
        let view = build_field_set(&settings, &[], None, &location_catalog()?);
        let value = view
            .get(SettingKey::AllowedQueryArguments)
            .and_then(|field| field.value.as_text());
        assert_eq!(value, Some("locations\nages"));
        Ok(())
    }

    #[test]
    fn defaults_are_reported_per_field() -> Result<(), PrimitiveError> {
        let view = build_field_set(&FinderSettings::default(), &[], None, &location_catalog()?);
        assert_eq!(
            view.get(SettingKey::BsVersion).map(|field| &field.default),
            Some(&FieldValue::Number(3))
        );
        assert_eq!(
            view.get(SettingKey::LocationTypes)
                .map(|field| &field.default),
            Some(&FieldValue::List(
                default_location_types()
                    .iter()
                    .map(|id| id.as_str().to_string())
                    .collect()
            ))
        );
        let collapse = view.get(SettingKey::CategoryCollapseGroup);
        assert_eq!(
            collapse.and_then(|field| field.default.as_text()),
            Some("disabled")
        );
        assert_eq!(
            collapse
                .and_then(|field| field.choices.as_ref())
                .map(Vec::len),
            Some(3)
        );
        Ok(())
    }
}
