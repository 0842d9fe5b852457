//! REST API server for the live meeting store.
//!
//! Provides HTTP endpoints for:
//! - The live meeting (title, notes, analysis, questions, chunks, views)
//! - Meeting history (list, show, edit, delete)

pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

use crate::config::ApiConfig;
use crate::meeting::MeetingContext;

/// Shared state for all routes.
#[derive(Clone)]
pub struct ApiState {
    pub context: Arc<MeetingContext>,
}

pub struct ApiServer {
    host: String,
    port: u16,
    state: ApiState,
}

impl ApiServer {
    pub fn new(context: Arc<MeetingContext>, config: &ApiConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            state: ApiState { context },
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.state).layer(ServiceBuilder::new());

        let listener = tokio::net::TcpListener::bind(&format!("{}:{}", self.host, self.port)).await?;

        info!("API server listening on http://{}:{}", self.host, self.port);
        info!("Endpoints:");
        info!("  GET    /active                - Live meeting record");
        info!("  PUT    /active/title|notes|analysis|questions");
        info!("  POST   /active/chunks         - Ingest a transcript chunk");
        info!("  GET    /active/segments       - Display segments");
        info!("  POST   /active/archive        - End the live meeting");
        info!("  GET    /meetings              - List meetings");
        info!("  GET    /meetings/:id          - Get a meeting");
        info!("  PATCH  /meetings/:id          - Edit an archived meeting");
        info!("  DELETE /meetings?start_time=  - Delete a meeting");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// All routes with state applied.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/version", get(version))
        .merge(routes::active::router())
        .merge(routes::meetings::router())
        .with_state(state)
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "livemeeting",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "livemeeting"
    }))
}
