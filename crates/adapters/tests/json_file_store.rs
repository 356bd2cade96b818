//! Integration tests for the JSON file config store.

use activity_finder_adapters::JsonFileConfigStore;
use activity_finder_ports::{ConfigStorePort, SettingsRecord};
use activity_finder_shared::{ErrorEnvelope, RequestContext, Result};
use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const NAMESPACE: &str = "openy_activity_finder.settings";

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn staged(pairs: &[(&str, serde_json::Value)]) -> SettingsRecord {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

#[tokio::test]
async fn commit_then_read_round_trips_through_disk() -> Result<()> {
    let root = temp_dir("af-store-commit");
    let store = JsonFileConfigStore::new(&root);
    let ctx = RequestContext::new_request();

    assert_eq!(store.read(&ctx, NAMESPACE.into()).await?, None);

    store
        .commit(
            &ctx,
            NAMESPACE.into(),
            staged(&[("bs_version", json!(4)), ("exclude", json!("12"))]),
        )
        .await?;
    store
        .commit(&ctx, NAMESPACE.into(), staged(&[("exclude", json!(""))]))
        .await?;

    let record = store.read(&ctx, NAMESPACE.into()).await?;
    assert_eq!(
        record,
        Some(staged(&[("bs_version", json!(4)), ("exclude", json!(""))]))
    );

    let path = store.record_path(NAMESPACE)?;
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    tokio::fs::remove_dir_all(&root)
        .await
        .map_err(ErrorEnvelope::from)?;
    Ok(())
}

#[tokio::test]
async fn corrupt_record_is_reported_on_read() -> Result<()> {
    let root = temp_dir("af-store-corrupt");
    tokio::fs::create_dir_all(&root)
        .await
        .map_err(ErrorEnvelope::from)?;
    let store = JsonFileConfigStore::new(&root);
    tokio::fs::write(store.record_path(NAMESPACE)?, "[1, 2]")
        .await
        .map_err(ErrorEnvelope::from)?;
    let ctx = RequestContext::new_request();

    let error = store.read(&ctx, NAMESPACE.into()).await.err();
    assert!(error.is_some_and(|error| error.has_code("settings", "stored_record_invalid")));

    tokio::fs::remove_dir_all(&root)
        .await
        .map_err(ErrorEnvelope::from)?;
    Ok(())
}

#[tokio::test]
async fn unwritable_root_is_persistence_failure() -> Result<()> {
    let root = temp_dir("af-store-blocked");
    tokio::fs::write(&root, "not a directory")
        .await
        .map_err(ErrorEnvelope::from)?;
    let store = JsonFileConfigStore::new(&root);
    let ctx = RequestContext::new_request();

    let error = store
        .commit(&ctx, NAMESPACE.into(), staged(&[("ages", json!(""))]))
        .await
        .err();
    assert!(error.is_some_and(|error| error.has_code("settings", "persistence_failed")));

    tokio::fs::remove_file(&root)
        .await
        .map_err(ErrorEnvelope::from)?;
    Ok(())
}
