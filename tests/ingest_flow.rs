//! End-to-end dispatch tests against the local backend

use async_trait::async_trait;
use chrono::Utc;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rtdl_ingester::catalog::CatalogRegistry;
use rtdl_ingester::config::{
    CompressionType, ConfigCache, ConfigSnapshot, ConfigStore, FileStoreType, MemoryConfigStore,
    PartitionTime, StoreBackend, StreamConfig,
};
use rtdl_ingester::dispatch::Dispatcher;
use rtdl_ingester::error::Result;
use rtdl_ingester::settings::{DbSettings, DremioSettings, Settings};
use rtdl_ingester::types::IncomingMessage;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Registry that records reconcile calls instead of talking to a server
#[derive(Default)]
struct RecordingCatalog {
    calls: Mutex<Vec<(String, StoreBackend, String, String)>>,
}

impl RecordingCatalog {
    fn calls(&self) -> Vec<(String, StoreBackend, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogRegistry for RecordingCatalog {
    async fn reconcile(
        &self,
        message_type: &str,
        backend: StoreBackend,
        location: &str,
        config: &StreamConfig,
    ) -> Result<()> {
        self.calls.lock().unwrap().push((
            message_type.to_string(),
            backend,
            location.to_string(),
            config.stream_id().to_string(),
        ));
        Ok(())
    }
}

fn snapshot() -> ConfigSnapshot {
    ConfigSnapshot {
        streams: vec![
            StreamConfig {
                stream_id: Some("s1".into()),
                file_store_type_id: Some(1),
                folder_name: Some("f".into()),
                partition_time_id: Some(2),
                compression_type_id: Some(0),
                ..StreamConfig::default()
            },
            StreamConfig {
                stream_id: Some("s-aws".into()),
                file_store_type_id: Some(2),
                region: Some(String::new()),
                bucket_name: Some("bucket".into()),
                partition_time_id: Some(2),
                ..StreamConfig::default()
            },
        ],
        file_store_types: vec![
            FileStoreType {
                file_store_type_id: 1,
                file_store_type_name: "Local".into(),
            },
            FileStoreType {
                file_store_type_id: 2,
                file_store_type_name: "AWS".into(),
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

fn settings(local_root: PathBuf) -> Settings {
    Settings {
        db: DbSettings {
            host: "localhost".into(),
            port: 5433,
            user: "rtdl".into(),
            password: "rtdl".into(),
            dbname: "rtdl_db".into(),
        },
        dremio: DremioSettings {
            host: "localhost".into(),
            port: "9047".into(),
            username: "rtdl".into(),
            password: "rtdl1234".into(),
        },
        dremio_mount_path: "/mnt/datastore".into(),
        local_fs_mount_path: "/mnt/host".into(),
        local_root,
    }
}

struct Harness {
    dispatcher: Dispatcher,
    store: Arc<MemoryConfigStore>,
    catalog: Arc<RecordingCatalog>,
    root: PathBuf,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("datastore");

    let store = Arc::new(MemoryConfigStore::new(snapshot()));
    let cache = ConfigCache::load(Arc::clone(&store) as Arc<dyn ConfigStore>)
        .await
        .unwrap();
    let catalog = Arc::new(RecordingCatalog::default());

    let dispatcher = Dispatcher::new(
        Arc::new(cache),
        Arc::clone(&catalog) as Arc<dyn CatalogRegistry>,
        Arc::new(settings(root.clone())),
    );

    Harness {
        dispatcher,
        store,
        catalog,
        root,
        _dir: dir,
    }
}

fn message(value: serde_json::Value) -> IncomingMessage {
    serde_json::from_value(value).unwrap()
}

fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if !root.exists() {
        return found;
    }
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                found.push(path);
            }
        }
    }
    found
}

#[tokio::test]
async fn test_minimal_local_write() {
    let h = harness().await;

    let egress = h
        .dispatcher
        .handle(&message(json!({
            "stream_id": "s1",
            "message_type": "m",
            "payload": { "a": 1, "b": "x" },
        })))
        .await
        .unwrap();

    // acknowledgement carries the payload back
    assert_eq!(egress.len(), 1);
    assert_eq!(egress[0].topic, "egress");
    assert_eq!(egress[0].key, "message");
    let ack: serde_json::Value = serde_json::from_slice(&egress[0].value).unwrap();
    assert_eq!(ack, json!({ "a": 1, "b": "x" }));

    // exactly one file under datastore/f/m/<today>/
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let files = files_under(&h.root);
    assert_eq!(files.len(), 1);
    let relative = files[0].strip_prefix(&h.root).unwrap().to_str().unwrap();
    let re = regex::Regex::new(&format!(r"^f/m/{today}/\d{{8}}_\d{{9,}}\.parquet$")).unwrap();
    assert!(re.is_match(relative), "got: {relative}");

    // the file holds one row with a=1 and b="x"
    let blob = bytes::Bytes::from(std::fs::read(&files[0]).unwrap());
    let mut reader = ParquetRecordBatchReaderBuilder::try_new(blob)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.next().unwrap().unwrap();
    assert_eq!(batch.num_rows(), 1);
    use arrow::array::{Int64Array, StringArray};
    let a = batch
        .column_by_name("a")
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(a.value(0), 1);
    let b = batch
        .column_by_name("b")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(b.value(0), "x");

    // catalog saw the stream and message type once
    let calls = h.catalog.calls();
    assert_eq!(calls.len(), 1);
    let (message_type, backend, location, stream_id) = &calls[0];
    assert_eq!(message_type, "m");
    assert_eq!(*backend, StoreBackend::Local);
    assert_eq!(stream_id, "s1");
    assert!(location.starts_with("/mnt/host/"), "got: {location}");
    assert!(location.ends_with(&format!("f/m/{today}")), "got: {location}");
}

#[tokio::test]
async fn test_control_message_reloads_without_egress() {
    let h = harness().await;
    assert_eq!(h.store.load_count(), 1);

    let egress = h
        .dispatcher
        .handle(&message(json!({ "message_type": "rtdl_205", "payload": {} })))
        .await
        .unwrap();

    assert!(egress.is_empty());
    assert_eq!(h.store.load_count(), 2);
    assert!(files_under(&h.root).is_empty());
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn test_missing_region_still_acknowledges() {
    let h = harness().await;

    let egress = h
        .dispatcher
        .handle(&message(json!({
            "stream_id": "s-aws",
            "message_type": "m",
            "payload": { "a": 1 },
        })))
        .await
        .unwrap();

    // write fails on the empty region, the acknowledgement still flows
    assert_eq!(egress.len(), 1);
    assert!(files_under(&h.root).is_empty());
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn test_unmatched_stream_still_acknowledges() {
    let h = harness().await;

    let egress = h
        .dispatcher
        .handle(&message(json!({ "stream_id": "unknown", "payload": { "a": 1 } })))
        .await
        .unwrap();

    assert_eq!(egress.len(), 1);
    assert!(files_under(&h.root).is_empty());
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn test_writes_for_distinct_streams_do_not_collide() {
    let h = harness().await;

    for _ in 0..3 {
        h.dispatcher
            .handle(&message(json!({
                "stream_id": "s1",
                "message_type": "m",
                "payload": { "a": 1 },
            })))
            .await
            .unwrap();
    }

    let files = files_under(&h.root);
    assert_eq!(files.len(), 3, "every write lands in its own file");
}
