//! Field schema of the Activity Finder settings form.
//!
//! One entry per stored key, in form order. The table is static; the
//! runtime parts of a field (current value, choices) are added by
//! [`crate::view::build_field_set`].

use activity_finder_domain::{LOCAL_INDEX_BACKEND, SettingKey};
use serde::Serialize;

/// Widget used to edit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// Single-choice dropdown.
    Select,
    /// Multi-line text.
    Textarea,
    /// Single-line text.
    Textfield,
    /// Boolean checkbox.
    Checkbox,
    /// Multi-choice checkbox list.
    Checkboxes,
    /// Single-choice radio buttons.
    Radios,
}

/// Form section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// Top-level fields.
    General,
    /// HomeBranch "no results" modal content.
    HomeBranchModal,
    /// Schedule preferences collapse settings.
    ScheduleCollapse,
    /// Activity preferences collapse settings.
    CategoryCollapse,
    /// Location preferences collapse settings.
    LocationsCollapse,
    /// Additional filters collapse settings.
    AdditionalCollapse,
    /// Logging settings.
    Logging,
}

impl FieldGroup {
    /// Section title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::General => "Activity Finder",
            Self::HomeBranchModal => "HomeBranch - No results modal content.",
            Self::ScheduleCollapse => "Schedule preferences",
            Self::CategoryCollapse => "Activity preferences",
            Self::LocationsCollapse => "Location preferences",
            Self::AdditionalCollapse => "Additional filters preferences",
            Self::Logging => "Logging settings",
        }
    }
}

/// When a field must carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// Always required.
    Always,
    /// Never required.
    Optional,
    /// Required while `backend` holds the given id.
    WhenBackend {
        /// Backend id that makes the field required.
        backend: &'static str,
    },
}

impl Requirement {
    /// Whether the field is required for the given backend selection.
    #[must_use]
    pub fn is_required_for(self, backend: Option<&str>) -> bool {
        match self {
            Self::Always => true,
            Self::Optional => false,
            Self::WhenBackend { backend: expected } => backend == Some(expected),
        }
    }
}

/// Static description of one settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
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
}

const fn field(
    key: SettingKey,
    kind: WidgetKind,
    group: FieldGroup,
    title: &'static str,
    description: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        key,
        kind,
        group,
        title,
        description,
        requirement: Requirement::Optional,
    }
}

const COLLAPSE_TITLE: &str = "Settings for whole group.";
const COLLAPSE_DESCRIPTION: Option<&str> =
    Some("Check this if you want default state for whole this group is \"Collapsed\"");

/// The settings form, in display order.
pub const FIELD_SPECS: [FieldSpec; 23] = [
    FieldSpec {
        requirement: Requirement::Always,
        ..field(
            SettingKey::Backend,
            WidgetKind::Select,
            FieldGroup::General,
            "Backend for Activity Finder",
            Some("Search API backend for Activity Finder"),
        )
    },
    FieldSpec {
        requirement: Requirement::WhenBackend {
            backend: LOCAL_INDEX_BACKEND,
        },
        ..field(
            SettingKey::Index,
            WidgetKind::Select,
            FieldGroup::General,
            "Search API index",
            Some("Search API Index to use for SOLR backend."),
        )
    },
    field(
        SettingKey::BsVersion,
        WidgetKind::Select,
        FieldGroup::General,
        "Bootstrap version",
        Some("Determine which Bootstrap grid version to use."),
    ),
    field(
        SettingKey::Ages,
        WidgetKind::Textarea,
        FieldGroup::General,
        "Ages",
        Some(
            "Ages mapping. One per line. \"<number of months>,<age display label>\". Example: \"660,55+\"",
        ),
    ),
    field(
        SettingKey::AllowedQueryArguments,
        WidgetKind::Textarea,
        FieldGroup::General,
        "Allowed Query Arguments",
        Some("Query arguments. One per line."),
    ),
    field(
        SettingKey::LocationTypes,
        WidgetKind::Checkboxes,
        FieldGroup::General,
        "Allowed location types",
        Some(
            "Select which location content types should be used in Activity Finder. This will limit ALL Activity Finder blocks on the site. To limit by specific locations, use the \"Exclude Locations\" field on each block.",
        ),
    ),
    field(
        SettingKey::Weeks,
        WidgetKind::Textarea,
        FieldGroup::General,
        "Weeks",
        Some(
            "Weeks mapping. One per line. Example: \"8-6-2020,Week 1: June 8,8-24-2020,Week 11: August 24\"",
        ),
    ),
    field(
        SettingKey::Durations,
        WidgetKind::Textarea,
        FieldGroup::General,
        "Durations",
        Some(
            "Durations mapping. Enter one value per line, in the format {duration_in_days}|label.",
        ),
    ),
    field(
        SettingKey::Exclude,
        WidgetKind::Textfield,
        FieldGroup::General,
        "Exclude category -- so we do not display Group Exercises",
        Some(
            "Provide ID of the Program Subcategory to exclude. You do not need to provide this if you use Daxko. Needed only for Solr backend.",
        ),
    ),
    field(
        SettingKey::DisableSearchBox,
        WidgetKind::Checkbox,
        FieldGroup::General,
        "Disable Search Box",
        Some(
            "When checked hides search text box (both for Activity Finder and Results page).",
        ),
    ),
    field(
        SettingKey::DisableSpotsAvailable,
        WidgetKind::Checkbox,
        FieldGroup::General,
        "Disable Spots Available",
        Some("When checked disables Spots Available feature on Results page."),
    ),
    field(
        SettingKey::HbModalText0,
        WidgetKind::Textfield,
        FieldGroup::HomeBranchModal,
        "Title",
        None,
    ),
    field(
        SettingKey::HbModalText1,
        WidgetKind::Textfield,
        FieldGroup::HomeBranchModal,
        "Text line 1",
        None,
    ),
    field(
        SettingKey::HbModalText2,
        WidgetKind::Textfield,
        FieldGroup::HomeBranchModal,
        "Text line 2",
        None,
    ),
    field(
        SettingKey::HbModalText3,
        WidgetKind::Textfield,
        FieldGroup::HomeBranchModal,
        "Text line 3",
        None,
    ),
    field(
        SettingKey::HbModalText4,
        WidgetKind::Textfield,
        FieldGroup::HomeBranchModal,
        "Close modal button text",
        None,
    ),
    field(
        SettingKey::HbModalText5,
        WidgetKind::Textfield,
        FieldGroup::HomeBranchModal,
        "Start over button text",
        None,
    ),
    field(
        SettingKey::ScheduleCollapseGroup,
        WidgetKind::Radios,
        FieldGroup::ScheduleCollapse,
        COLLAPSE_TITLE,
        COLLAPSE_DESCRIPTION,
    ),
    field(
        SettingKey::CategoryCollapseGroup,
        WidgetKind::Radios,
        FieldGroup::CategoryCollapse,
        COLLAPSE_TITLE,
        COLLAPSE_DESCRIPTION,
    ),
    field(
        SettingKey::LocationsCollapseGroup,
        WidgetKind::Radios,
        FieldGroup::LocationsCollapse,
        COLLAPSE_TITLE,
        COLLAPSE_DESCRIPTION,
    ),
    field(
        SettingKey::AdditionalCollapseGroup,
        WidgetKind::Radios,
        FieldGroup::AdditionalCollapse,
        COLLAPSE_TITLE,
        COLLAPSE_DESCRIPTION,
    ),
    field(
        SettingKey::DisableProgramSearchLog,
        WidgetKind::Checkbox,
        FieldGroup::Logging,
        "Disable program search log.",
        None,
    ),
    field(
        SettingKey::DisableCacheDebugLog,
        WidgetKind::Checkbox,
        FieldGroup::Logging,
        "Disable cache debug log.",
        None,
    ),
];

/// Look up the schema entry of a key.
#[must_use]
pub fn field_spec(key: SettingKey) -> Option<&'static FieldSpec> {
    FIELD_SPECS.iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_key_once() {
        for key in SettingKey::ALL {
            let count = FIELD_SPECS.iter().filter(|spec| spec.key == key).count();
            assert_eq!(count, 1, "{key} appears {count} times");
        }
    }

    #[test]
    fn table_follows_form_order() {
        let keys: Vec<SettingKey> = FIELD_SPECS.iter().map(|spec| spec.key).collect();
        assert_eq!(keys, SettingKey::ALL.to_vec());
    }

    #[test]
    fn index_is_required_only_for_local_backend() -> Result<(), String> {
        let spec = field_spec(SettingKey::Index).ok_or("index missing")?;
        assert!(spec.requirement.is_required_for(Some(LOCAL_INDEX_BACKEND)));
        assert!(!spec.requirement.is_required_for(Some("other")));
        assert!(!spec.requirement.is_required_for(None));

        let backend = field_spec(SettingKey::Backend).ok_or("backend missing")?;
        assert_eq!(backend.requirement, Requirement::Always);
        Ok(())
    }
}
