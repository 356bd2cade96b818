//! # activity-finder-config
//!
//! Settings form schema, editable view, submission validation, and the
//! runtime configuration of the service.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Runtime config loading helpers (env + file).
pub mod load;
/// Runtime configuration schema.
pub mod runtime;
/// Settings field table.
pub mod schema;
/// Submission DTO and validation.
pub mod submission;
/// JSON Schema export for the submission DTO.
pub mod submission_schema;
/// Editable view builder.
pub mod view;

pub use env::{
    ENV_LOG_LEVEL, ENV_RESULTS_ROUTE, ENV_SETTINGS_NAMESPACE, EnvParseError, FinderEnv,
    apply_env_overrides,
};
pub use load::{
    load_runtime_config_from_path, load_runtime_config_std_env, to_pretty_json, to_pretty_toml,
};
pub use runtime::{
    CURRENT_CONFIG_VERSION, DEFAULT_RESULTS_ROUTE, DEFAULT_SETTINGS_NAMESPACE, FinderRuntimeConfig,
    LogLevelSetting, LoggingConfig, ResultsConfig, RuntimeConfigError, SettingsConfig,
    ValidatedRuntimeConfig, parse_runtime_config_json, parse_runtime_config_toml,
};
pub use schema::{FIELD_SPECS, FieldGroup, FieldSpec, Requirement, WidgetKind, field_spec};
pub use submission::{
    BootstrapVersionInput, FieldError, SettingsSubmission, SubmissionChoices,
    SubmissionValidationError, parse_submission_json, validate_submission,
};
pub use submission_schema::settings_submission_schema;
pub use view::{
    Choice, FieldDefinition, FieldSet, FieldValue, build_field_set,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
