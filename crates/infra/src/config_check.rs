//! Effective runtime config rendering.

use crate::InfraResult;
use activity_finder_config::{FinderEnv, load_runtime_config_from_path, to_pretty_json};
use activity_finder_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<String> {
    let env = FinderEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    let config = load_runtime_config_from_path(config_path, &env)?;
    to_pretty_json(&config)
}
