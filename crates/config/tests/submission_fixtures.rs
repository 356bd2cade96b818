//! Integration tests for submission parsing, validation, and the editable view.

use activity_finder_config::{
    FieldValue, SubmissionChoices, build_field_set, parse_submission_json, validate_submission,
};
use activity_finder_domain::{
    BootstrapVersion, CollapseGroupState, FinderSettings, IndexId, LocationTypeId,
    LocationTypeOption, SearchIndexOption, SettingKey, available_backends, parse_age_options,
    parse_week_options,
};
use std::error::Error;
use std::path::Path;

fn read_fixture(name: &str) -> Result<String, Box<dyn Error>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    Ok(std::fs::read_to_string(path)?)
}

fn location_catalog() -> Result<Vec<LocationTypeOption>, Box<dyn Error>> {
    ["branch", "camp", "facility"]
        .into_iter()
        .map(|id| {
            Ok(LocationTypeOption {
                id: LocationTypeId::parse(id)?,
                label: id.to_uppercase().into(),
            })
        })
        .collect()
}

#[test]
fn local_index_fixture_persists_normalized_record() -> Result<(), Box<dyn Error>> {
    let submission = parse_submission_json(&read_fixture("submission.local-index.json")?)?;
    let backends = available_backends(|_| true);
    let indexes = vec![SearchIndexOption {
        id: IndexId::parse("activities")?,
        label: "Activities".into(),
    }];
    let location_types = location_catalog()?;

    let settings = validate_submission(
        &submission,
        SubmissionChoices {
            backends: &backends,
            indexes: Some(&indexes),
            location_types: &location_types,
        },
    )?;

    assert_eq!(settings.index.as_ref().map(IndexId::as_str), Some("activities"));
    assert_eq!(settings.bs_version, BootstrapVersion::V4);
    assert_eq!(
        settings.allowed_query_arguments,
        vec!["locations", "ages", "days"]
    );
    assert_eq!(settings.location_types.len(), 2);
    assert!(settings.disable_search_box);
    assert!(!settings.disable_spots_available);
    assert_eq!(
        settings.collapse_groups.schedule,
        CollapseGroupState::EnabledExpanded
    );
    assert_eq!(settings.hb_modal_text(SettingKey::HbModalText5), Some("Start over"));
    assert_eq!(parse_age_options(&settings.ages).len(), 2);
    assert_eq!(parse_week_options(&settings.weeks).len(), 2);

    let record = settings.to_record();
    assert_eq!(FinderSettings::from_record(&record)?, settings);
    Ok(())
}

#[test]
fn view_of_saved_settings_shows_saved_values() -> Result<(), Box<dyn Error>> {
    let submission = parse_submission_json(&read_fixture("submission.local-index.json")?)?;
    let backends = available_backends(|_| true);
    let indexes = vec![SearchIndexOption {
        id: IndexId::parse("activities")?,
        label: "Activities".into(),
    }];
    let location_types = location_catalog()?;
    let choices = SubmissionChoices {
        backends: &backends,
        indexes: Some(&indexes),
        location_types: &location_types,
    };
    let settings = validate_submission(&submission, choices)?;

    let view = build_field_set(&settings, &backends, Some(&indexes), &location_types);
    assert_eq!(
        view.get(SettingKey::Index).map(|field| &field.value),
        Some(&FieldValue::Text("activities".into()))
    );
    assert_eq!(
        view.get(SettingKey::AllowedQueryArguments)
            .and_then(|field| field.value.as_text()),
        Some("locations\nages\ndays")
    );
    assert_eq!(
        view.get(SettingKey::DisableSearchBox).map(|field| &field.value),
        Some(&FieldValue::Flag(true))
    );
    Ok(())
}
