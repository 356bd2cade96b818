//! Config store adapters.
//!
//! Both stores merge the staged keys into the existing record in one step,
//! leaving keys outside the staged set untouched.

use activity_finder_ports::{BoxFuture, ConfigStorePort, SettingsRecord};
use activity_finder_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory config store keyed by namespace.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    records: tokio::sync::RwLock<BTreeMap<Box<str>, SettingsRecord>>,
    commits: AtomicUsize,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one record.
    #[must_use]
    pub fn with_record(namespace: impl Into<Box<str>>, record: SettingsRecord) -> Self {
        let mut records = BTreeMap::new();
        records.insert(namespace.into(), record);
        Self {
            records: tokio::sync::RwLock::new(records),
            commits: AtomicUsize::new(0),
        }
    }

    /// Number of commits applied so far.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Snapshot of a stored record.
    pub async fn snapshot(&self, namespace: &str) -> Option<SettingsRecord> {
        self.records.read().await.get(namespace).cloned()
    }
}

impl ConfigStorePort for InMemoryConfigStore {
    fn read(
        &self,
        _ctx: &RequestContext,
        namespace: Box<str>,
    ) -> BoxFuture<'_, Result<Option<SettingsRecord>>> {
        Box::pin(async move { Ok(self.records.read().await.get(&namespace).cloned()) })
    }

    fn commit(
        &self,
        _ctx: &RequestContext,
        namespace: Box<str>,
        staged: SettingsRecord,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut records = self.records.write().await;
            records.entry(namespace).or_default().extend(staged);
            drop(records);
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Config store writing one pretty JSON file per namespace.
///
/// Commits write a sibling temp file and rename it over the record, so a
/// reader sees either the old or the new record.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    root: PathBuf,
}

impl JsonFileConfigStore {
    /// Store records under `root` (created on first commit).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `namespace`.
    pub fn record_path(&self, namespace: &str) -> Result<PathBuf> {
        let valid = !namespace.is_empty()
            && !namespace.starts_with('.')
            && namespace
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));
        if !valid {
            return Err(ErrorEnvelope::expected(
                ErrorCode::INVALID_INPUT,
                "config namespace must be a plain file name",
            )
            .with_metadata("namespace", namespace.to_string()));
        }
        Ok(self.root.join(format!("{namespace}.json")))
    }

    async fn load(&self, path: &Path) -> Result<Option<SettingsRecord>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_failure("read", path, error)),
        };

        let value: Value = serde_json::from_slice(&bytes).map_err(|error| {
            ErrorEnvelope::invariant(
                ErrorCode::new("settings", "stored_record_invalid"),
                format!("stored settings are not valid JSON: {error}"),
            )
            .with_metadata("path", path.display().to_string())
        })?;
        match value {
            Value::Object(map) => Ok(Some(map.into_iter().collect())),
            _ => Err(ErrorEnvelope::invariant(
                ErrorCode::new("settings", "stored_record_invalid"),
                "stored settings must be a JSON object",
            )
            .with_metadata("path", path.display().to_string())),
        }
    }

    async fn write_atomically(&self, path: &Path, record: &SettingsRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|error| io_failure("create_dir", &self.root, error))?;

        let mut encoded = serde_json::to_vec_pretty(record).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::new("settings", "persistence_failed"),
                format!("failed to encode settings: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        encoded.push(b'\n');

        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, &encoded)
            .await
            .map_err(|error| io_failure("write", &temp, error))?;
        if let Err(error) = tokio::fs::rename(&temp, path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(io_failure("rename", path, error));
        }
        Ok(())
    }
}

impl ConfigStorePort for JsonFileConfigStore {
    fn read(
        &self,
        _ctx: &RequestContext,
        namespace: Box<str>,
    ) -> BoxFuture<'_, Result<Option<SettingsRecord>>> {
        Box::pin(async move {
            let path = self.record_path(&namespace)?;
            self.load(&path).await
        })
    }

    fn commit(
        &self,
        _ctx: &RequestContext,
        namespace: Box<str>,
        staged: SettingsRecord,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let path = self.record_path(&namespace)?;
            let mut record = match self.load(&path).await {
                Ok(existing) => existing.unwrap_or_default(),
                Err(error) if error.has_code("settings", "stored_record_invalid") => {
                    SettingsRecord::new()
                },
                Err(error) => return Err(error),
            };
            record.extend(staged);
            self.write_atomically(&path, &record).await
        })
    }
}

fn io_failure(operation: &'static str, path: &Path, error: std::io::Error) -> ErrorEnvelope {
    let kind = error.kind();
    ErrorEnvelope::unexpected(
        ErrorCode::new("settings", "persistence_failed"),
        format!("settings {operation} failed: {error}"),
        ErrorClass::for_io(kind),
    )
    .with_metadata("operation", operation)
    .with_metadata("path", path.display().to_string())
    .with_metadata("io_kind", kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> SettingsRecord {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[tokio::test]
    async fn memory_commit_merges_staged_keys() -> Result<()> {
        let store = InMemoryConfigStore::with_record(
            "af.settings",
            record(&[("legacy", json!(true)), ("ages", json!("old"))]),
        );
        let ctx = RequestContext::new_request();

        store
            .commit(&ctx, "af.settings".into(), record(&[("ages", json!("new"))]))
            .await?;

        let stored = store.read(&ctx, "af.settings".into()).await?;
        assert_eq!(
            stored,
            Some(record(&[("ages", json!("new")), ("legacy", json!(true))]))
        );
        assert_eq!(store.commit_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn memory_read_of_unknown_namespace_is_none() -> Result<()> {
        let store = InMemoryConfigStore::new();
        let ctx = RequestContext::new_request();
        assert_eq!(store.read(&ctx, "missing".into()).await?, None);
        Ok(())
    }

    #[test]
    fn file_store_rejects_path_like_namespaces() {
        let store = JsonFileConfigStore::new("/tmp/af");
        for namespace in ["../etc", "a/b", "", ".hidden"] {
            let error = store.record_path(namespace).err();
            assert!(error.is_some_and(|error| error.has_code("core", "invalid_input")));
        }
    }

    #[test]
    fn io_failures_map_to_persistence_error() {
        let error = io_failure(
            "write",
            Path::new("/readonly/af.json"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(error.has_code("settings", "persistence_failed"));
        assert_eq!(
            error.metadata.get("operation").map(String::as_str),
            Some("write")
        );
        assert_eq!(
            error.metadata.get("io_kind").map(String::as_str),
            Some("permission denied")
        );
        assert!(!error.class.is_retriable());
    }
}
