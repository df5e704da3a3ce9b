//! Configuration store implementations

use super::{CompressionType, ConfigSnapshot, FileStoreType, PartitionTime, StreamConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Source of stream configurations and reference tables
///
/// A load returns all four tables as one consistent snapshot; partial reads
/// never escape this trait.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_all(&self) -> Result<ConfigSnapshot>;
}

/// Config store backed by the rtdl PostgreSQL database
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    /// Open a connection pool against the configuration database
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await
            .map_err(|e| Error::config(format!("failed to open a DB connection: {e}")))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn load_all(&self) -> Result<ConfigSnapshot> {
        let streams = sqlx::query_as::<_, StreamConfig>("SELECT * FROM streams")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::config(format!("failed to query streams: {e}")))?;

        let file_store_types = sqlx::query_as::<_, FileStoreType>("SELECT * FROM file_store_types")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::config(format!("failed to query file_store_types: {e}")))?;

        let partition_times = sqlx::query_as::<_, PartitionTime>("SELECT * FROM partition_times")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::config(format!("failed to query partition_times: {e}")))?;

        let compression_types =
            sqlx::query_as::<_, CompressionType>("SELECT * FROM compression_types")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| Error::config(format!("failed to query compression_types: {e}")))?;

        Ok(ConfigSnapshot {
            streams,
            file_store_types,
            partition_times,
            compression_types,
        })
    }
}

/// In-memory config store, for development setups and tests
pub struct MemoryConfigStore {
    snapshot: RwLock<ConfigSnapshot>,
    loads: AtomicU64,
}

impl MemoryConfigStore {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            loads: AtomicU64::new(0),
        }
    }

    /// Replace the snapshot served by subsequent loads
    pub fn set(&self, snapshot: ConfigSnapshot) {
        *self.snapshot.write().expect("snapshot lock poisoned") = snapshot;
    }

    /// Number of loads served so far
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load_all(&self) -> Result<ConfigSnapshot> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.snapshot.read().expect("snapshot lock poisoned").clone())
    }
}
