//! Per-message dispatch: control handling and the write pipeline

use crate::catalog::CatalogRegistry;
use crate::config::ConfigCache;
use crate::error::{Error, Result};
use crate::output;
use crate::paths::PathPlanner;
use crate::route;
use crate::schema;
use crate::settings::Settings;
use crate::sink::ObjectSink;
use crate::types::{EgressRecord, IncomingMessage};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

/// Entry point for every ingress message
///
/// Control messages refresh the configuration cache. Data messages run the
/// write pipeline and always produce the acknowledgement record, write
/// failure or not; the host's redelivery policy is driven by the control
/// path only.
pub struct Dispatcher {
    cache: Arc<ConfigCache>,
    catalog: Arc<dyn CatalogRegistry>,
    planner: PathPlanner,
    settings: Arc<Settings>,
}

impl Dispatcher {
    pub fn new(
        cache: Arc<ConfigCache>,
        catalog: Arc<dyn CatalogRegistry>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            cache,
            catalog,
            planner: PathPlanner::new(),
            settings,
        }
    }

    /// Handle one ingress message, returning the egress records to publish
    pub async fn handle(&self, message: &IncomingMessage) -> Result<Vec<EgressRecord>> {
        if message.is_control() {
            if let Err(e) = self.cache.reload().await {
                tracing::error!("failed to refresh configuration cache: {e}");
                return Err(e);
            }
            return Ok(Vec::new());
        }

        if let Err(e) = self.write(message).await {
            tracing::error!("error writing Parquet: {e}");
        }

        let value = serde_json::to_vec(&message.payload)
            .map_err(|e| Error::encode(format!("failed to serialize payload: {e}")))?;
        tracing::info!("egress message written");
        Ok(vec![EgressRecord::acknowledgement(Bytes::from(value))])
    }

    /// Route the message and drive infer, encode, put, reconcile
    async fn write(&self, message: &IncomingMessage) -> Result<()> {
        let snapshot = self.cache.snapshot().await;

        let Some(config) = route::match_config(&snapshot, message) else {
            // unknown streams are dropped, not failed
            return Ok(());
        };
        let message_type = route::effective_message_type(message, config);

        let Some(backend) = snapshot.store_backend(config.file_store_type_id()) else {
            tracing::warn!(
                "stream {} has no recognized file store type, skipping write",
                config.stream_id()
            );
            return Ok(());
        };
        let policy = snapshot
            .partition_policy(config.partition_time_id())
            .ok_or_else(|| {
                Error::config(format!(
                    "stream {} has no recognized partition time",
                    config.stream_id()
                ))
            })?;

        let descriptor = schema::infer(&message.payload, &message_type)?;
        let blob = output::encode(&descriptor, &message.payload, config.compression_type_id())?;

        let key = self
            .planner
            .object_key(&message_type, config.folder_name(), policy, Utc::now());
        tracing::info!(
            "writing {key} ({} compression)",
            snapshot
                .compression_name(config.compression_type_id())
                .unwrap_or("no")
        );

        let sink = ObjectSink::new(backend, &self.settings);
        let location = sink.put(&key, blob, config).await?;

        self.catalog
            .reconcile(&message_type, backend, &location, config)
            .await
    }
}
