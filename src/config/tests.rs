//! Configuration cache and snapshot tests

use super::*;
use crate::error::{Error, Result};
use crate::paths::PartitionPolicy;
use async_trait::async_trait;
use std::sync::Arc;

fn reference_tables() -> ConfigSnapshot {
    ConfigSnapshot {
        streams: vec![StreamConfig {
            stream_id: Some("s1".into()),
            ..StreamConfig::default()
        }],
        file_store_types: vec![
            FileStoreType {
                file_store_type_id: 1,
                file_store_type_name: "Local".into(),
            },
            FileStoreType {
                file_store_type_id: 2,
                file_store_type_name: "AWS".into(),
            },
            FileStoreType {
                file_store_type_id: 3,
                file_store_type_name: "GCP".into(),
            },
        ],
        partition_times: vec![PartitionTime {
            partition_time_id: 2,
            partition_time_name: "Daily".into(),
        }],
        compression_types: vec![CompressionType {
            compression_type_id: 1,
            compression_type_name: "Snappy".into(),
        }],
    }
}

/// Store whose loads always fail, for replace-on-success checks
struct FailingStore;

#[async_trait]
impl ConfigStore for FailingStore {
    async fn load_all(&self) -> Result<ConfigSnapshot> {
        Err(Error::config("store unavailable"))
    }
}

/// Store that serves one snapshot, then fails
struct FlakyStore {
    inner: MemoryConfigStore,
}

#[async_trait]
impl ConfigStore for FlakyStore {
    async fn load_all(&self) -> Result<ConfigSnapshot> {
        if self.inner.load_count() > 0 {
            return Err(Error::config("store went away"));
        }
        self.inner.load_all().await
    }
}

#[test]
fn test_snapshot_accessors() {
    let snapshot = reference_tables();

    assert_eq!(snapshot.store_backend(1), Some(StoreBackend::Local));
    assert_eq!(snapshot.store_backend(2), Some(StoreBackend::Aws));
    assert_eq!(snapshot.store_backend(3), Some(StoreBackend::Gcp));
    assert_eq!(snapshot.store_backend(9), None);

    assert_eq!(snapshot.partition_policy(2), Some(PartitionPolicy::Daily));
    assert_eq!(snapshot.partition_policy(9), None);

    assert_eq!(snapshot.compression_name(1), Some("Snappy"));
    assert_eq!(snapshot.compression_name(9), None);
}

#[test]
fn test_stream_config_accessors() {
    let config = StreamConfig {
        region: Some("  us-east-1  ".into()),
        aws_access_key_id: Some(" AKIA ".into()),
        ..StreamConfig::default()
    };

    assert_eq!(config.region(), "us-east-1");
    assert_eq!(config.aws_access_key_id(), "AKIA");
    assert_eq!(config.stream_id(), "");
    assert_eq!(config.file_store_type_id(), 0);
}

#[tokio::test]
async fn test_reload_swaps_snapshot() {
    let store = Arc::new(MemoryConfigStore::new(reference_tables()));
    let cache = ConfigCache::load(Arc::clone(&store) as Arc<dyn ConfigStore>)
        .await
        .unwrap();
    assert_eq!(cache.snapshot().await.streams.len(), 1);

    let mut updated = reference_tables();
    updated.streams.push(StreamConfig {
        stream_id: Some("s2".into()),
        ..StreamConfig::default()
    });
    store.set(updated);

    cache.reload().await.unwrap();
    assert_eq!(cache.snapshot().await.streams.len(), 2);
}

#[tokio::test]
async fn test_initial_load_failure_propagates() {
    let result = ConfigCache::load(Arc::new(FailingStore)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_failed_reload_retains_previous_snapshot() {
    let store = FlakyStore {
        inner: MemoryConfigStore::new(reference_tables()),
    };
    let cache = ConfigCache::load(Arc::new(store)).await.unwrap();

    let before = cache.snapshot().await;
    assert!(cache.reload().await.is_err());

    let after = cache.snapshot().await;
    assert_eq!(after.streams.len(), before.streams.len());
    assert_eq!(after.streams[0].stream_id(), "s1");
}
