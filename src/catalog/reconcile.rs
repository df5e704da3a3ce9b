//! Idempotent source and dataset registration

use super::client::DremioClient;
use crate::config::{StoreBackend, StreamConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Registration of a written file's stream and message type with the query
/// engine
#[async_trait]
pub trait CatalogRegistry: Send + Sync {
    /// Converge on exactly one source per stream and one dataset per
    /// message type under it
    async fn reconcile(
        &self,
        message_type: &str,
        backend: StoreBackend,
        location: &str,
        config: &StreamConfig,
    ) -> Result<()>;
}

/// Registry backed by a Dremio server
pub struct DremioCatalog {
    client: DremioClient,
    mount_path: String,
}

impl DremioCatalog {
    pub fn new(client: DremioClient, mount_path: impl Into<String>) -> Self {
        Self {
            client,
            mount_path: mount_path.into(),
        }
    }
}

#[async_trait]
impl CatalogRegistry for DremioCatalog {
    async fn reconcile(
        &self,
        message_type: &str,
        backend: StoreBackend,
        location: &str,
        config: &StreamConfig,
    ) -> Result<()> {
        let source_name = config.stream_id();

        let response = self.client.get("source").await?;
        let sources = response
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::catalog("unexpected Dremio response during source retrieval")
            })?;

        let source_id = sources.iter().find_map(|source| {
            if source.get("name").and_then(Value::as_str) == Some(source_name) {
                source.get("id").and_then(Value::as_str).map(str::to_string)
            } else {
                None
            }
        });

        let mut dataset_exists = false;
        if let Some(id) = &source_id {
            let catalog = self.client.get(&format!("catalog/{id}")).await?;
            let children = catalog
                .get("children")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    Error::catalog("unexpected Dremio response during dataset retrieval")
                })?;

            dataset_exists = children.iter().any(|child| {
                let name = child
                    .get("path")
                    .and_then(Value::as_array)
                    .and_then(|path| path.get(1))
                    .and_then(Value::as_str);
                let kind = child.get("type").and_then(Value::as_str);
                name == Some(message_type) && kind == Some("DATASET")
            });
        } else {
            tracing::info!("Source does not exist for stream {source_name}, creating");
            let body = source_definition(source_name, backend, location, config, &self.mount_path)?;
            self.client.post("source", body).await?;
        }

        if !dataset_exists {
            let (encoded_id, body) = dataset_definition(source_name, message_type);
            self.client.post(&format!("catalog/{encoded_id}"), body).await?;
        }

        Ok(())
    }
}

/// The source creation body for a backend
pub(super) fn source_definition(
    source_name: &str,
    backend: StoreBackend,
    location: &str,
    config: &StreamConfig,
    mount_path: &str,
) -> Result<Value> {
    match backend {
        StoreBackend::Local => Ok(json!({
            "name": source_name,
            "type": "NAS",
            "config": {
                "path": format!("file:///{}/{}", mount_path, config.folder_name()),
            },
        })),
        StoreBackend::Aws => Ok(json!({
            "name": source_name,
            "type": "S3",
            "config": {
                "accessKey": config.aws_access_key_id(),
                "accessSecret": config.aws_secret_access_key(),
                "rootPath": root_path(location, config.folder_name()),
            },
        })),
        StoreBackend::Gcp => {
            let creds: Value = serde_json::from_str(&config.gcp_json_credentials_escaped())
                .map_err(|e| {
                    Error::catalog(format!(
                        "error reading GCP credentials from configuration record: {e}"
                    ))
                })?;
            Ok(json!({
                "name": source_name,
                "type": "GCS",
                "config": {
                    "projectId": cred_field(&creds, "project_id")?,
                    "authMode": "SERVICE_ACCOUNT_KEYS",
                    "clientEmail": cred_field(&creds, "client_email")?,
                    "clientId": cred_field(&creds, "client_id")?,
                    "privateKeyId": cred_field(&creds, "private_key_id")?,
                    "privateKey": cred_field(&creds, "private_key")?,
                    "rootPath": root_path(location, config.folder_name()),
                },
            }))
        }
    }
}

/// A required string field of the service-account document
fn cred_field<'a>(creds: &'a Value, name: &str) -> Result<&'a str> {
    creds
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::catalog(format!("GCP credentials are missing {name}")))
}

/// The dataset creation body and its URL-encoded catalog id
pub(super) fn dataset_definition(source_name: &str, message_type: &str) -> (String, Value) {
    let encoded_id = format!("dremio%3A%2F{source_name}%2F{message_type}");
    let body = json!({
        "id": encoded_id,
        "entityType": "dataset",
        "path": [source_name, message_type],
        "format": { "type": "Parquet" },
        "type": "PHYSICAL_DATASET",
    });
    (encoded_id, body)
}

/// Bucket-rooted path of a cloud source: `/<bucket>/[<folder>/]`
fn root_path(location: &str, folder_name: &str) -> String {
    if folder_name.is_empty() {
        format!("/{location}/")
    } else {
        format!("/{location}/{folder_name}/")
    }
}
