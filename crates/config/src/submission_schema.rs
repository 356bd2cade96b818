//! JSON Schema export for the submission DTO.

use crate::SettingsSubmission;
use schemars::{Schema, schema_for};

/// JSON Schema for `SettingsSubmission`.
#[must_use]
pub fn settings_submission_schema() -> Schema {
    schema_for!(SettingsSubmission)
}
