//! Thin client for the Dremio HTTP API

use crate::error::{Error, Result};
use crate::settings::DremioSettings;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::RwLock;

/// Bound on every Dremio call
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the Dremio server
///
/// Login goes through the v2 API and yields a token that is cached
/// process-wide and sent on every v3 call; a 401 triggers one
/// re-authentication. A 409 response to a create is reported as success,
/// since it means the entity already exists.
pub struct DremioClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl DremioClient {
    /// Build a client against the configured Dremio server
    pub fn new(settings: &DremioSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::catalog(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: settings.base_url(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            token: RwLock::new(None),
        })
    }

    /// Authenticate and cache the bearer token
    pub async fn login(&self) -> Result<()> {
        let url = format!("{}/apiv2/login", self.base_url);
        let body = json!({ "userName": self.username, "password": self.password });

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json; charset=UTF-8")
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("login", &e))?;

        if !response.status().is_success() {
            return Err(Error::catalog(format!(
                "Dremio login failed with status {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::catalog(format!("malformed Dremio login response: {e}")))?;
        let token = payload
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::catalog("Dremio login response carries no token"))?;

        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    /// GET an `/api/v3/` endpoint
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::GET, endpoint, None).await
    }

    /// POST to an `/api/v3/` endpoint
    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    async fn request(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Value> {
        let mut response = self.send(method.clone(), endpoint, body.as_ref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.login().await?;
            response = self.send(method, endpoint, body.as_ref()).await?;
        }

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() || status == StatusCode::CONFLICT {
            Ok(payload)
        } else {
            Err(Error::catalog(format!(
                "Dremio returned {status} for {endpoint}: {payload}"
            )))
        }
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let cached = self.token.read().await.clone();
        let token = match cached {
            Some(token) => token,
            None => {
                self.login().await?;
                self.token
                    .read()
                    .await
                    .clone()
                    .ok_or_else(|| Error::catalog("Dremio token missing after login"))?
            }
        };

        let url = format!("{}/api/v3/{}", self.base_url, endpoint);
        let mut request = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("authorization", token);
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| send_error(endpoint, &e))
    }
}

fn send_error(endpoint: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(format!("Dremio {endpoint}"), REQUEST_TIMEOUT_SECS)
    } else {
        Error::catalog(format!("error communicating with Dremio server: {err}"))
    }
}
