//! Object store sinks
//!
//! Backend-agnostic write of a Parquet blob to one of the three supported
//! stores. Blobs are put directly from memory; no temporary local files.

use crate::config::{StoreBackend, StreamConfig};
use crate::error::{Error, Result};
use crate::settings::Settings;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hard deadline on a single GCS object upload
const GCS_UPLOAD_TIMEOUT_SECS: u64 = 50;

/// Destination-specific write of a finished Parquet blob
///
/// `put` returns the location the catalog registers: the mounted directory
/// path for the local backend, the bucket name for the cloud backends.
#[derive(Debug, Clone)]
pub enum ObjectSink {
    Local { root: PathBuf, mount_path: String },
    S3,
    Gcs,
}

impl ObjectSink {
    /// Sink for a stream's configured backend
    pub fn new(backend: StoreBackend, settings: &Settings) -> Self {
        match backend {
            StoreBackend::Local => Self::Local {
                root: settings.local_root.clone(),
                mount_path: settings.local_fs_mount_path.clone(),
            },
            StoreBackend::Aws => Self::S3,
            StoreBackend::Gcp => Self::Gcs,
        }
    }

    /// Write the blob under `key`, creating whatever hierarchy is needed
    pub async fn put(&self, key: &str, blob: Bytes, config: &StreamConfig) -> Result<String> {
        match self {
            Self::Local { root, mount_path } => put_local(root, mount_path, key, blob).await,
            Self::S3 => put_s3(key, blob, config).await,
            Self::Gcs => put_gcs(key, blob, config).await,
        }
    }
}

async fn put_local(root: &Path, mount_path: &str, key: &str, blob: Bytes) -> Result<String> {
    let parent = key.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    std::fs::create_dir_all(root.join(parent))
        .map_err(|e| Error::storage(format!("failed to create output directory: {e}")))?;

    let store = LocalFileSystem::new_with_prefix(root)
        .map_err(|e| Error::storage(format!("failed to open local store: {e}")))?;
    store
        .put(&ObjectPath::from(key), blob.into())
        .await
        .map_err(|e| Error::storage(format!("failed to write {key}: {e}")))?;

    Ok(format!("{}/{}/{}", mount_path, root.display(), parent))
}

async fn put_s3(key: &str, blob: Bytes, config: &StreamConfig) -> Result<String> {
    let region = config.region();
    if region.is_empty() {
        return Err(Error::config("AWS Region cannot be null or empty"));
    }
    let bucket = config.bucket_name();
    if bucket.is_empty() {
        return Err(Error::config("S3 bucket name cannot be null or empty"));
    }

    let store = AmazonS3Builder::new()
        .with_region(region)
        .with_bucket_name(bucket)
        .with_access_key_id(config.aws_access_key_id())
        .with_secret_access_key(config.aws_secret_access_key())
        .build()
        .map_err(|e| Error::config(format!("failed to create S3 client: {e}")))?;

    store
        .put(&ObjectPath::from(key), blob.into())
        .await
        .map_err(|e| Error::storage(format!("failed to upload {key} to S3: {e}")))?;

    tracing::info!("Finished uploading file to S3");
    Ok(bucket.to_string())
}

async fn put_gcs(key: &str, blob: Bytes, config: &StreamConfig) -> Result<String> {
    let bucket = config.bucket_name();
    if bucket.is_empty() {
        return Err(Error::config("GCS bucket name cannot be null or empty"));
    }
    if config.gcp_json_credentials().is_empty() {
        return Err(Error::config(
            "GCP JSON credentials cannot be null or empty",
        ));
    }

    let store = GoogleCloudStorageBuilder::new()
        .with_bucket_name(bucket)
        .with_service_account_key(config.gcp_json_credentials_escaped())
        .build()
        .map_err(|e| Error::config(format!("failed to create GCS client: {e}")))?;

    let object_path = ObjectPath::from(key);
    let upload = store.put(&object_path, blob.into());
    match tokio::time::timeout(Duration::from_secs(GCS_UPLOAD_TIMEOUT_SECS), upload).await {
        Err(_) => return Err(Error::timeout("GCS upload", GCS_UPLOAD_TIMEOUT_SECS)),
        Ok(result) => {
            result.map_err(|e| Error::storage(format!("failed to upload {key} to GCS: {e}")))?;
        }
    }

    tracing::info!("Finished uploading file to GCS");
    Ok(bucket.to_string())
}
