//! HTTP surface for the host runtime
//!
//! The host dispatches each message with a POST to `/statefun`; the response
//! carries the egress records the host publishes on our behalf.

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::types::IncomingMessage;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn app(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/statefun", post(ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

/// Serve the app until the process is stopped
pub async fn serve(dispatcher: Arc<Dispatcher>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::fatal(format!("failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app(dispatcher))
        .await
        .map_err(|e| Error::fatal(format!("server error: {e}")))
}

/// Dispatch one ingress message
async fn ingest(
    State(dispatcher): State<Arc<Dispatcher>>,
    Json(message): Json<IncomingMessage>,
) -> impl IntoResponse {
    match dispatcher.handle(&message).await {
        Ok(egress) => {
            let records: Vec<Value> = egress
                .iter()
                .map(|record| {
                    let value: Value =
                        serde_json::from_slice(&record.value).unwrap_or(Value::Null);
                    json!({
                        "topic": record.topic,
                        "key": record.key,
                        "value": value,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "egress": records }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
