//! Read and write the Activity Finder settings.
//!
//! The read path builds the editable view from the stored record and the
//! choices offered right now. The write path validates a submission,
//! commits it as one record, then invalidates the render caches.

use activity_finder_config::{
    FieldSet, SettingsSubmission, SubmissionChoices, build_field_set, validate_submission,
};
use activity_finder_domain::{
    ACTIVITY_FINDER_CACHE_TAG, BackendOption, FinderSettings, LocationTypeOption,
    SEARCH_INDEX_CAPABILITY, SearchIndexOption, SettingsRecord, available_backends,
};
use activity_finder_ports::{
    CacheTagInvalidatorPort, CapabilityRegistryPort, ConfigStorePort, LocationTypeCatalogPort,
    LogFields, LoggerPort, RenderCachePort, SearchIndexCatalogPort,
};
use activity_finder_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Dependencies required by the settings editor.
#[derive(Clone)]
pub struct SettingsEditorDeps {
    /// Config store holding the settings record.
    pub store: Arc<dyn ConfigStorePort>,
    /// Render cache cleared after a save.
    pub render_cache: Arc<dyn RenderCachePort>,
    /// Cache tag invalidator used after a save.
    pub cache_tags: Arc<dyn CacheTagInvalidatorPort>,
    /// Capability registry (evaluated on every call).
    pub capabilities: Arc<dyn CapabilityRegistryPort>,
    /// Location type catalog.
    pub location_types: Arc<dyn LocationTypeCatalogPort>,
    /// Search index catalog; queried only with the indexing capability.
    pub indexes: Arc<dyn SearchIndexCatalogPort>,
    /// Namespace of the settings record.
    pub namespace: Box<str>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// A cache invalidation performed after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "tag", rename_all = "snake_case")]
pub enum CacheInvalidation {
    /// The whole render cache was cleared.
    ClearAll,
    /// Entries carrying the tag were invalidated.
    Tag(Box<str>),
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Record committed to the store.
    pub record: SettingsRecord,
    /// Typed view of the committed record.
    pub settings: FinderSettings,
    /// Invalidations performed, in order.
    pub invalidations: Vec<CacheInvalidation>,
}

struct OfferedChoices {
    backends: Vec<BackendOption>,
    indexes: Option<Vec<SearchIndexOption>>,
    location_types: Vec<LocationTypeOption>,
}

impl OfferedChoices {
    fn as_submission_choices(&self) -> SubmissionChoices<'_> {
        SubmissionChoices {
            backends: &self.backends,
            indexes: self.indexes.as_deref(),
            location_types: &self.location_types,
        }
    }
}

async fn offered_choices(
    ctx: &RequestContext,
    deps: &SettingsEditorDeps,
) -> Result<OfferedChoices> {
    let backends = available_backends(|name| deps.capabilities.has_capability(name));
    let indexes = if deps.capabilities.has_capability(SEARCH_INDEX_CAPABILITY) {
        Some(deps.indexes.indexes(ctx).await?)
    } else {
        None
    };
    let location_types = deps.location_types.location_types(ctx).await?;

    Ok(OfferedChoices {
        backends,
        indexes,
        location_types,
    })
}

async fn read_settings(ctx: &RequestContext, deps: &SettingsEditorDeps) -> Result<FinderSettings> {
    let record = deps
        .store
        .read(ctx, deps.namespace.clone())
        .await?
        .unwrap_or_default();
    FinderSettings::from_record(&record).map_err(ErrorEnvelope::from)
}

/// Build the editable view of the stored settings.
pub async fn load_editable_view(
    ctx: &RequestContext,
    deps: &SettingsEditorDeps,
) -> Result<FieldSet> {
    let settings = read_settings(ctx, deps).await?;
    let choices = offered_choices(ctx, deps).await?;
    let view = build_field_set(
        &settings,
        &choices.backends,
        choices.indexes.as_deref(),
        &choices.location_types,
    );

    if let Some(logger) = deps.logger.as_ref() {
        logger.debug(
            "settings.view.loaded",
            "Settings view loaded",
            Some(log_fields_view(deps, &choices, view.len())),
        );
    }

    Ok(view)
}

/// Validate, persist, and invalidate caches.
///
/// Nothing is written when validation fails, and nothing is invalidated
/// when the commit fails.
pub async fn apply_submission(
    ctx: &RequestContext,
    deps: &SettingsEditorDeps,
    submission: &SettingsSubmission,
) -> Result<SubmissionOutcome> {
    let started_at = Instant::now();
    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "settings.submission.start",
            "Settings submission started",
            Some(log_fields_start(deps, ctx)),
        );
    }

    let choices = offered_choices(ctx, deps).await?;
    let settings = match validate_submission(submission, choices.as_submission_choices()) {
        Ok(settings) => settings,
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                let fields: Vec<Value> = error
                    .fields()
                    .iter()
                    .map(|key| Value::from(key.as_str()))
                    .collect();
                let mut log_fields = log_fields_start(deps, ctx);
                log_fields.insert("fields".into(), Value::Array(fields));
                logger.warn(
                    "settings.submission.rejected",
                    "Settings submission rejected",
                    Some(log_fields),
                );
            }
            return Err(error.into());
        },
    };

    let record = settings.to_record();
    if let Err(error) = deps
        .store
        .commit(ctx, deps.namespace.clone(), record.clone())
        .await
    {
        let error = as_persistence_error(error);
        log_failure(deps, ctx, "commit", started_at, &error);
        return Err(error);
    }
    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "settings.submission.persisted",
            "Settings persisted",
            Some(log_fields_completed(deps, ctx, started_at)),
        );
    }

    let invalidations = invalidate_caches(ctx, deps, started_at).await?;

    Ok(SubmissionOutcome {
        record,
        settings,
        invalidations,
    })
}

async fn invalidate_caches(
    ctx: &RequestContext,
    deps: &SettingsEditorDeps,
    started_at: Instant,
) -> Result<Vec<CacheInvalidation>> {
    // Both invalidations are attempted once the record is committed.
    let cleared = deps.render_cache.clear_all(ctx).await;
    if let Err(error) = &cleared {
        log_failure(deps, ctx, "clear_all", started_at, error);
    }

    let tag: Box<str> = ACTIVITY_FINDER_CACHE_TAG.into();
    let tagged = deps.cache_tags.invalidate_tags(ctx, vec![tag.clone()]).await;
    if let Err(error) = &tagged {
        log_failure(deps, ctx, "invalidate_tags", started_at, error);
    }

    cleared?;
    tagged?;

    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = log_fields_completed(deps, ctx, started_at);
        fields.insert("tag".into(), Value::from(ACTIVITY_FINDER_CACHE_TAG));
        logger.info("settings.cache.invalidated", "Caches invalidated", Some(fields));
    }

    Ok(vec![CacheInvalidation::ClearAll, CacheInvalidation::Tag(tag)])
}

fn as_persistence_error(error: ErrorEnvelope) -> ErrorEnvelope {
    if error.has_code("settings", "persistence_failed") {
        return error;
    }
    let mut wrapped = ErrorEnvelope::unexpected(
        ErrorCode::new("settings", "persistence_failed"),
        format!("failed to persist settings: {}", error.message),
        error.class,
    )
    .with_metadata("cause", error.code.to_string());
    for (key, value) in error.metadata {
        wrapped = wrapped.with_metadata(key, value);
    }
    wrapped
}

fn log_failure(
    deps: &SettingsEditorDeps,
    ctx: &RequestContext,
    stage: &str,
    started_at: Instant,
    error: &ErrorEnvelope,
) {
    if let Some(logger) = deps.logger.as_ref() {
        let mut fields = log_fields_completed(deps, ctx, started_at);
        fields.insert("stage".into(), Value::from(stage));
        logger.failure(
            "settings.submission.failed",
            "Settings submission failed",
            Some(fields),
            error,
        );
    }
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn log_fields_start(deps: &SettingsEditorDeps, ctx: &RequestContext) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "namespace".into(),
        Value::String(deps.namespace.to_string()),
    );
    fields.insert(
        "correlationId".into(),
        Value::String(ctx.correlation_id().as_str().to_owned()),
    );
    fields
}

fn log_fields_completed(
    deps: &SettingsEditorDeps,
    ctx: &RequestContext,
    started_at: Instant,
) -> LogFields {
    let mut fields = log_fields_start(deps, ctx);
    fields.insert("durationMs".into(), Value::from(duration_ms(started_at)));
    fields
}

fn log_fields_view(
    deps: &SettingsEditorDeps,
    choices: &OfferedChoices,
    field_count: usize,
) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "namespace".into(),
        Value::String(deps.namespace.to_string()),
    );
    fields.insert("fieldCount".into(), Value::from(field_count));
    fields.insert("backendCount".into(), Value::from(choices.backends.len()));
    fields.insert(
        "indexCatalog".into(),
        Value::Bool(choices.indexes.is_some()),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_finder_domain::{
        IndexId, LIVE_API_BACKEND, LIVE_API_CAPABILITY, LOCAL_INDEX_BACKEND, LocationTypeId,
        SettingKey,
    };
    use activity_finder_ports::{BoxFuture, LogEvent};
    use activity_finder_shared::ErrorClass;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        commits: AtomicUsize,
        clears: AtomicUsize,
        tag_calls: AtomicUsize,
        index_queries: AtomicUsize,
        tags: Mutex<Vec<Box<str>>>,
        stored: Mutex<Option<SettingsRecord>>,
        fail_commit: bool,
        fail_clear: bool,
    }

    struct FakeStore(Arc<Probe>);

    impl ConfigStorePort for FakeStore {
        fn read(
            &self,
            _ctx: &RequestContext,
            _namespace: Box<str>,
        ) -> BoxFuture<'_, Result<Option<SettingsRecord>>> {
            let stored = self.0.stored.lock().ok().and_then(|guard| guard.clone());
            Box::pin(async move { Ok(stored) })
        }

        fn commit(
            &self,
            _ctx: &RequestContext,
            _namespace: Box<str>,
            staged: SettingsRecord,
        ) -> BoxFuture<'_, Result<()>> {
            let probe = Arc::clone(&self.0);
            Box::pin(async move {
                probe.commits.fetch_add(1, Ordering::SeqCst);
                if probe.fail_commit {
                    return Err(ErrorEnvelope::from(std::io::Error::other("disk full")));
                }
                if let Ok(mut guard) = probe.stored.lock() {
                    *guard = Some(staged);
                }
                Ok(())
            })
        }
    }

    struct FakeCaches(Arc<Probe>);

    impl RenderCachePort for FakeCaches {
        fn clear_all(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<()>> {
            let probe = Arc::clone(&self.0);
            Box::pin(async move {
                probe.clears.fetch_add(1, Ordering::SeqCst);
                if probe.fail_clear {
                    return Err(ErrorEnvelope::unexpected(
                        ErrorCode::new("cache", "clear_failed"),
                        "cache backend offline",
                        ErrorClass::Retriable,
                    ));
                }
                Ok(())
            })
        }
    }

    impl CacheTagInvalidatorPort for FakeCaches {
        fn invalidate_tags(
            &self,
            _ctx: &RequestContext,
            tags: Vec<Box<str>>,
        ) -> BoxFuture<'_, Result<()>> {
            let probe = Arc::clone(&self.0);
            Box::pin(async move {
                probe.tag_calls.fetch_add(1, Ordering::SeqCst);
                if let Ok(mut guard) = probe.tags.lock() {
                    guard.extend(tags);
                }
                Ok(())
            })
        }
    }

    struct FakeRegistry(Vec<&'static str>);

    impl CapabilityRegistryPort for FakeRegistry {
        fn has_capability(&self, name: &str) -> bool {
            self.0.contains(&name)
        }
    }

    struct FakeCatalogs(Arc<Probe>);

    impl LocationTypeCatalogPort for FakeCatalogs {
        fn location_types(
            &self,
            _ctx: &RequestContext,
        ) -> BoxFuture<'_, Result<Vec<LocationTypeOption>>> {
            let options: Result<Vec<LocationTypeOption>> = ["branch", "camp", "facility"]
                .into_iter()
                .map(|id| -> Result<LocationTypeOption> {
                    Ok(LocationTypeOption {
                        id: LocationTypeId::parse(id)?,
                        label: id.into(),
                    })
                })
                .collect();
            Box::pin(async move { options })
        }
    }

    impl SearchIndexCatalogPort for FakeCatalogs {
        fn indexes(&self, _ctx: &RequestContext) -> BoxFuture<'_, Result<Vec<SearchIndexOption>>> {
            self.0.index_queries.fetch_add(1, Ordering::SeqCst);
            let options: Result<Vec<SearchIndexOption>> = IndexId::parse("activities")
                .map(|id| {
                    vec![SearchIndexOption {
                        id,
                        label: "Activities".into(),
                    }]
                })
                .map_err(ErrorEnvelope::from);
            Box::pin(async move { options })
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<LogEvent>>,
    }

    impl RecordingLogger {
        fn names(&self) -> Vec<String> {
            self.events
                .lock()
                .map(|events| events.iter().map(|event| event.event.to_string()).collect())
                .unwrap_or_default()
        }
    }

    impl LoggerPort for RecordingLogger {
        fn log(&self, event: LogEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }

    fn deps_with(
        probe: &Arc<Probe>,
        capabilities: Vec<&'static str>,
        logger: Option<Arc<dyn LoggerPort>>,
    ) -> SettingsEditorDeps {
        let caches = Arc::new(FakeCaches(Arc::clone(probe)));
        let catalogs = Arc::new(FakeCatalogs(Arc::clone(probe)));
        SettingsEditorDeps {
            store: Arc::new(FakeStore(Arc::clone(probe))),
            render_cache: caches.clone(),
            cache_tags: caches,
            capabilities: Arc::new(FakeRegistry(capabilities)),
            location_types: catalogs.clone(),
            indexes: catalogs,
            namespace: "openy_activity_finder.settings".into(),
            logger,
        }
    }

    fn submission(backend: &str, index: Option<&str>) -> SettingsSubmission {
        SettingsSubmission {
            backend: Some(backend.to_string()),
            index: index.map(str::to_string),
            allowed_query_arguments: "locations\n\nages".into(),
            ..SettingsSubmission::default()
        }
    }

    #[tokio::test]
    async fn successful_apply_invalidates_caches_once() -> Result<()> {
        let probe = Arc::new(Probe::default());
        let logger = Arc::new(RecordingLogger::default());
        let deps = deps_with(
            &probe,
            vec![SEARCH_INDEX_CAPABILITY, LIVE_API_CAPABILITY],
            Some(logger.clone()),
        );
        let ctx = RequestContext::new_request();

        let outcome = apply_submission(&ctx, &deps, &submission(LIVE_API_BACKEND, None)).await?;

        assert_eq!(probe.commits.load(Ordering::SeqCst), 1);
        assert_eq!(probe.clears.load(Ordering::SeqCst), 1);
        assert_eq!(probe.tag_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            probe.tags.lock().map(|tags| tags.clone()).unwrap_or_default(),
            vec![Box::<str>::from(ACTIVITY_FINDER_CACHE_TAG)]
        );
        assert_eq!(
            outcome.invalidations,
            vec![
                CacheInvalidation::ClearAll,
                CacheInvalidation::Tag(ACTIVITY_FINDER_CACHE_TAG.into()),
            ]
        );
        assert_eq!(
            outcome.record.get("allowed_query_arguments"),
            Some(&serde_json::json!(["locations", "ages"]))
        );
        assert_eq!(
            logger.names(),
            vec![
                "settings.submission.start",
                "settings.submission.persisted",
                "settings.cache.invalidated",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn local_backend_without_index_writes_nothing() -> Result<()> {
        let probe = Arc::new(Probe::default());
        let deps = deps_with(&probe, vec![SEARCH_INDEX_CAPABILITY], None);
        let ctx = RequestContext::new_request();

        let result = apply_submission(&ctx, &deps, &submission(LOCAL_INDEX_BACKEND, None)).await;
        let error = result.err();
        assert!(
            error
                .as_ref()
                .is_some_and(|error| error.has_code("settings", "validation_failed"))
        );
        assert!(
            error
                .as_ref()
                .is_some_and(|error| error.metadata.contains_key("field.index"))
        );
        assert_eq!(probe.commits.load(Ordering::SeqCst), 0);
        assert_eq!(probe.clears.load(Ordering::SeqCst), 0);
        assert_eq!(probe.tag_calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn commit_failure_skips_invalidation() -> Result<()> {
        let probe = Arc::new(Probe {
            fail_commit: true,
            ..Probe::default()
        });
        let logger = Arc::new(RecordingLogger::default());
        let deps = deps_with(&probe, vec![LIVE_API_CAPABILITY], Some(logger.clone()));
        let ctx = RequestContext::new_request();

        let result = apply_submission(&ctx, &deps, &submission(LIVE_API_BACKEND, None)).await;
        assert!(result.is_err_and(|error| error.has_code("settings", "persistence_failed")));
        assert_eq!(probe.commits.load(Ordering::SeqCst), 1);
        assert_eq!(probe.clears.load(Ordering::SeqCst), 0);
        assert_eq!(probe.tag_calls.load(Ordering::SeqCst), 0);
        assert!(
            logger
                .names()
                .contains(&"settings.submission.failed".to_string())
        );
        let logged_error = logger
            .events
            .lock()
            .ok()
            .and_then(|events| events.iter().find_map(|event| event.error.clone()));
        assert!(logged_error.is_some_and(|error| {
            error.has_code("settings", "persistence_failed")
                && error.metadata.get("cause").map(String::as_str) == Some("core:io")
        }));
        Ok(())
    }

    #[tokio::test]
    async fn clear_failure_still_invalidates_tag() -> Result<()> {
        let probe = Arc::new(Probe {
            fail_clear: true,
            ..Probe::default()
        });
        let deps = deps_with(&probe, vec![LIVE_API_CAPABILITY], None);
        let ctx = RequestContext::new_request();

        let result = apply_submission(&ctx, &deps, &submission(LIVE_API_BACKEND, None)).await;
        assert!(result.is_err_and(|error| error.has_code("cache", "clear_failed")));
        assert_eq!(probe.commits.load(Ordering::SeqCst), 1);
        assert_eq!(probe.clears.load(Ordering::SeqCst), 1);
        assert_eq!(probe.tag_calls.load(Ordering::SeqCst), 1);
        let tags = probe.tags.lock().map(|guard| guard.clone()).unwrap_or_default();
        assert_eq!(tags, vec![Box::<str>::from(ACTIVITY_FINDER_CACHE_TAG)]);
        Ok(())
    }

    #[tokio::test]
    async fn view_without_indexing_never_queries_index_catalog() -> Result<()> {
        let probe = Arc::new(Probe::default());
        let deps = deps_with(&probe, vec![LIVE_API_CAPABILITY], None);
        let ctx = RequestContext::new_request();

        let view = load_editable_view(&ctx, &deps).await?;
        assert!(!view.contains(SettingKey::Index));
        assert_eq!(probe.index_queries.load(Ordering::SeqCst), 0);
        let backend_choices = view
            .get(SettingKey::Backend)
            .and_then(|field| field.choices.as_ref())
            .map(Vec::len);
        assert_eq!(backend_choices, Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn saved_settings_show_up_in_next_view() -> Result<()> {
        let probe = Arc::new(Probe::default());
        let deps = deps_with(&probe, vec![SEARCH_INDEX_CAPABILITY], None);
        let ctx = RequestContext::new_request();

        apply_submission(
            &ctx,
            &deps,
            &submission(LOCAL_INDEX_BACKEND, Some("activities")),
        )
        .await?;
        let view = load_editable_view(&ctx, &deps).await?;

        let index = view
            .get(SettingKey::Index)
            .and_then(|field| field.value.as_text());
        assert_eq!(index, Some("activities"));
        assert_eq!(probe.index_queries.load(Ordering::SeqCst), 2);
        Ok(())
    }
}
