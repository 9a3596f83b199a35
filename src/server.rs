use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::StoreError;
use crate::models::{ApplicationRecord, MessageBody, NewApplication, StatusUpdate};
use crate::store::ApplicationStore;

/// Shared handle to the store. The lock is held for a whole operation, so
/// requests are applied one after another.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ApplicationStore>>,
}

impl AppState {
    pub fn new(store: ApplicationStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            StoreError::NotFound(id) => {
                tracing::debug!(id = %id, "Application not found");
                message(StatusCode::NOT_FOUND, "Application not found")
            }
        }
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(MessageBody {
            message: text.to_string(),
        }),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/api/applications/{id}",
            put(update_application_status).delete(delete_application),
        )
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

async fn list_applications(State(state): State<AppState>) -> Json<Vec<ApplicationRecord>> {
    let store = state.store.lock().await;
    Json(store.list())
}

#[tracing::instrument(skip_all)]
async fn create_application(
    State(state): State<AppState>,
    Json(body): Json<NewApplication>,
) -> (StatusCode, Json<ApplicationRecord>) {
    let mut store = state.store.lock().await;
    let record = store.create(body);
    tracing::info!(id = %record.id, company = %record.company, total = store.len(), "Application created");
    (StatusCode::CREATED, Json(record))
}

#[tracing::instrument(skip_all, fields(id = %id))]
async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<ApplicationRecord>, ApiError> {
    let mut store = state.store.lock().await;
    let record = store.update_status(&id, body.status)?;
    tracing::info!(status = %record.status, "Application status updated");
    Ok(Json(record))
}

#[tracing::instrument(skip_all, fields(id = %id))]
async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let mut store = state.store.lock().await;
    store.delete(&id)?;
    tracing::info!(total = store.len(), "Application deleted");
    Ok(message(StatusCode::OK, "Application deleted successfully"))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, store: ApplicationStore) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve_on(listener, store, shutdown_signal()).await
}

/// Serve on an already bound listener; returns once `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    store: ApplicationStore,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, records = store.len(), "Backend server running on http://{}", addr);

    let router = create_router(AppState::new(store));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
