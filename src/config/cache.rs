//! In-memory snapshot cache with replace-on-success reloads

use super::{ConfigSnapshot, ConfigStore};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache of the current configuration snapshot
///
/// The snapshot is swapped atomically: a reader holds a consistent view for
/// as long as it keeps the `Arc`, and a failed reload leaves the previous
/// snapshot in place.
pub struct ConfigCache {
    store: Arc<dyn ConfigStore>,
    snapshot: RwLock<Arc<ConfigSnapshot>>,
}

impl ConfigCache {
    /// Perform the initial load; failure here is a startup failure
    pub async fn load(store: Arc<dyn ConfigStore>) -> Result<Self> {
        let snapshot = store.load_all().await?;
        tracing::info!(
            "No. of config records retrieved: {}",
            snapshot.streams.len()
        );
        Ok(Self {
            store,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Reload all four tables, replacing the snapshot only on success
    pub async fn reload(&self) -> Result<()> {
        let fresh = self.store.load_all().await?;
        tracing::info!("No. of config records retrieved: {}", fresh.streams.len());
        *self.snapshot.write().await = Arc::new(fresh);
        Ok(())
    }

    /// The current snapshot
    pub async fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }
}
