//! Runtime composition: wires platform ports and adapters into use cases.

use crate::InfraResult;
use activity_finder_adapters::{JsonLogger, LogSink, ReqwestResultsEndpoint, StderrLogSink};
use activity_finder_app::{
    FacetsLookup, ResultsProxyDeps, SettingsEditorDeps, SubmissionOutcome, apply_submission,
    fetch_facets_and_locations, load_editable_view,
};
use activity_finder_config::{
    FieldSet, LogLevelSetting, ValidatedRuntimeConfig, parse_submission_json,
};
use activity_finder_ports::{
    CacheTagInvalidatorPort, CapabilityRegistryPort, ConfigStorePort, LocationTypeCatalogPort,
    LogLevel, LoggerPort, RenderCachePort, ResultsEndpointPort, SearchIndexCatalogPort,
};
use activity_finder_shared::RequestContext;
use std::sync::Arc;

/// Ports supplied by the host platform.
#[derive(Clone)]
pub struct PlatformServices {
    /// Config store holding the settings record.
    pub store: Arc<dyn ConfigStorePort>,
    /// Render cache.
    pub render_cache: Arc<dyn RenderCachePort>,
    /// Cache tag invalidator.
    pub cache_tags: Arc<dyn CacheTagInvalidatorPort>,
    /// Capability registry.
    pub capabilities: Arc<dyn CapabilityRegistryPort>,
    /// Location type catalog.
    pub location_types: Arc<dyn LocationTypeCatalogPort>,
    /// Search index catalog.
    pub indexes: Arc<dyn SearchIndexCatalogPort>,
}

/// Adapters the runtime builds itself unless the host overrides them.
#[derive(Clone, Default)]
pub struct RuntimeOverrides {
    /// Results endpoint (defaults to [`ReqwestResultsEndpoint`]).
    pub results_endpoint: Option<Arc<dyn ResultsEndpointPort>>,
    /// Log sink (defaults to stderr).
    pub log_sink: Option<Arc<dyn LogSink>>,
}

/// Wired use cases for one deployment.
#[derive(Clone)]
pub struct ActivityFinderRuntime {
    config: ValidatedRuntimeConfig,
    editor: SettingsEditorDeps,
    proxy: ResultsProxyDeps,
}

/// Build the runtime with default adapters.
pub fn build_runtime(
    config: ValidatedRuntimeConfig,
    platform: PlatformServices,
) -> InfraResult<ActivityFinderRuntime> {
    build_runtime_with(config, platform, RuntimeOverrides::default())
}

/// Build the runtime, letting the host replace the built-in adapters.
pub fn build_runtime_with(
    config: ValidatedRuntimeConfig,
    platform: PlatformServices,
    overrides: RuntimeOverrides,
) -> InfraResult<ActivityFinderRuntime> {
    let sink: Arc<dyn LogSink> = match overrides.log_sink {
        Some(sink) => sink,
        None => Arc::new(StderrLogSink),
    };
    let logger: Arc<dyn LoggerPort> =
        Arc::new(JsonLogger::new(sink).with_min_level(log_level(config.logging.level)));

    let endpoint: Arc<dyn ResultsEndpointPort> = match overrides.results_endpoint {
        Some(endpoint) => endpoint,
        None => Arc::new(ReqwestResultsEndpoint::new()?),
    };

    let editor = SettingsEditorDeps {
        store: platform.store,
        render_cache: platform.render_cache,
        cache_tags: platform.cache_tags,
        capabilities: platform.capabilities,
        location_types: platform.location_types,
        indexes: platform.indexes,
        namespace: config.settings.namespace.clone(),
        logger: Some(Arc::clone(&logger)),
    };
    let proxy = ResultsProxyDeps {
        endpoint,
        route: config.results.route.clone(),
        logger: Some(logger),
    };

    Ok(ActivityFinderRuntime {
        config,
        editor,
        proxy,
    })
}

impl ActivityFinderRuntime {
    /// Effective runtime config.
    pub const fn config(&self) -> &ValidatedRuntimeConfig {
        &self.config
    }

    /// Build the editable settings view.
    pub async fn load_editable_view(&self, ctx: &RequestContext) -> InfraResult<FieldSet> {
        load_editable_view(ctx, &self.editor).await
    }

    /// Parse a JSON submission, then validate, persist, and invalidate caches.
    pub async fn apply_submission_json(
        &self,
        ctx: &RequestContext,
        input: &str,
    ) -> InfraResult<SubmissionOutcome> {
        let submission = parse_submission_json(input)?;
        apply_submission(ctx, &self.editor, &submission).await
    }

    /// Fetch facets and grouped locations relative to `base_url`.
    pub async fn fetch_facets_and_locations(
        &self,
        ctx: &RequestContext,
        base_url: &str,
    ) -> FacetsLookup {
        fetch_facets_and_locations(ctx, &self.proxy, base_url).await
    }
}

const fn log_level(setting: LogLevelSetting) -> LogLevel {
    match setting {
        LogLevelSetting::Debug => LogLevel::Debug,
        LogLevelSetting::Info => LogLevel::Info,
        LogLevelSetting::Warn => LogLevel::Warn,
        LogLevelSetting::Error => LogLevel::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_map_one_to_one() {
        assert_eq!(log_level(LogLevelSetting::Debug), LogLevel::Debug);
        assert_eq!(log_level(LogLevelSetting::Info), LogLevel::Info);
        assert_eq!(log_level(LogLevelSetting::Warn), LogLevel::Warn);
        assert_eq!(log_level(LogLevelSetting::Error), LogLevel::Error);
    }
}
