//! Stream configuration module
//!
//! Holds the per-stream destination policies and the small reference tables
//! they point into, loaded from the external configuration store and cached
//! in memory as an immutable snapshot.

mod cache;
mod store;

pub use cache::ConfigCache;
pub use store::{ConfigStore, MemoryConfigStore, PgConfigStore};

use crate::paths::PartitionPolicy;

/// Object store backend a stream writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Local,
    Aws,
    Gcp,
}

impl StoreBackend {
    /// Resolve a backend from its reference-table name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Local" => Some(Self::Local),
            "AWS" => Some(Self::Aws),
            "GCP" => Some(Self::Gcp),
            _ => None,
        }
    }
}

/// A stream's destination policy, as stored in the `streams` table
///
/// Text and numeric columns are nullable in the store; accessor methods give
/// the empty-string / zero view the rest of the pipeline works with.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct StreamConfig {
    pub stream_id: Option<String>,
    pub stream_alt_id: Option<String>,
    pub active: Option<bool>,
    pub message_type: Option<String>,
    pub file_store_type_id: Option<i64>,
    pub region: Option<String>,
    pub bucket_name: Option<String>,
    pub folder_name: Option<String>,
    pub partition_time_id: Option<i64>,
    pub compression_type_id: Option<i64>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub gcp_json_credentials: Option<String>,
}

impl StreamConfig {
    pub fn stream_id(&self) -> &str {
        self.stream_id.as_deref().unwrap_or("")
    }

    pub fn stream_alt_id(&self) -> &str {
        self.stream_alt_id.as_deref().unwrap_or("")
    }

    pub fn message_type(&self) -> &str {
        self.message_type.as_deref().unwrap_or("")
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or("").trim()
    }

    pub fn bucket_name(&self) -> &str {
        self.bucket_name.as_deref().unwrap_or("")
    }

    pub fn folder_name(&self) -> &str {
        self.folder_name.as_deref().unwrap_or("")
    }

    pub fn aws_access_key_id(&self) -> &str {
        self.aws_access_key_id.as_deref().unwrap_or("").trim()
    }

    pub fn aws_secret_access_key(&self) -> &str {
        self.aws_secret_access_key.as_deref().unwrap_or("").trim()
    }

    pub fn gcp_json_credentials(&self) -> &str {
        self.gcp_json_credentials.as_deref().unwrap_or("")
    }

    /// Service-account JSON with literal newlines escaped (`\n` becomes `\\n`)
    ///
    /// Stored credentials carry real newlines inside the `private_key`
    /// value; they must be escaped before the document is parsed or
    /// forwarded.
    pub fn gcp_json_credentials_escaped(&self) -> String {
        self.gcp_json_credentials().replace('\n', "\\n")
    }

    pub fn file_store_type_id(&self) -> i64 {
        self.file_store_type_id.unwrap_or(0)
    }

    pub fn partition_time_id(&self) -> i64 {
        self.partition_time_id.unwrap_or(0)
    }

    pub fn compression_type_id(&self) -> i64 {
        self.compression_type_id.unwrap_or(0)
    }
}

/// Row of the `file_store_types` reference table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileStoreType {
    pub file_store_type_id: i64,
    pub file_store_type_name: String,
}

/// Row of the `partition_times` reference table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PartitionTime {
    pub partition_time_id: i64,
    pub partition_time_name: String,
}

/// Row of the `compression_types` reference table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompressionType {
    pub compression_type_id: i64,
    pub compression_type_name: String,
}

/// One consistent view of all four configuration tables
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    pub streams: Vec<StreamConfig>,
    pub file_store_types: Vec<FileStoreType>,
    pub partition_times: Vec<PartitionTime>,
    pub compression_types: Vec<CompressionType>,
}

impl ConfigSnapshot {
    /// Resolve a stream's file-store type id to a backend
    pub fn store_backend(&self, file_store_type_id: i64) -> Option<StoreBackend> {
        self.file_store_types
            .iter()
            .find(|t| t.file_store_type_id == file_store_type_id)
            .and_then(|t| StoreBackend::from_name(&t.file_store_type_name))
    }

    /// Resolve a stream's partition time id to a policy
    pub fn partition_policy(&self, partition_time_id: i64) -> Option<PartitionPolicy> {
        self.partition_times
            .iter()
            .find(|t| t.partition_time_id == partition_time_id)
            .and_then(|t| PartitionPolicy::from_name(&t.partition_time_name))
    }

    /// Name of a compression type, for logging
    pub fn compression_name(&self, compression_type_id: i64) -> Option<&str> {
        self.compression_types
            .iter()
            .find(|t| t.compression_type_id == compression_type_id)
            .map(|t| t.compression_type_name.as_str())
    }
}

#[cfg(test)]
mod tests;
