//! HTTP routes.

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use heroledger_domain::{ActorId, WorldId, WorldSettings};
use heroledger_shared::{ExportDocument, LogEntryData, ServerMessage};

use super::websocket::WsState;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<WsState>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/worlds/{id}/settings",
            get(get_world_settings).put(update_world_settings),
        )
        .route("/api/worlds/{id}/log", get(get_log).delete(clear_log))
        .route("/api/worlds/{id}/log/{actor_id}", delete(clear_actor_log))
        .route("/api/worlds/{id}/export", get(export_log))
}

async fn health() -> &'static str {
    "OK"
}

async fn get_world_settings(
    State(state): State<Arc<WsState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorldSettings>, ApiError> {
    let settings = state
        .app
        .use_cases
        .settings
        .get(WorldId::from_uuid(id))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(settings))
}

async fn update_world_settings(
    State(state): State<Arc<WsState>>,
    Path(id): Path<Uuid>,
    Json(settings): Json<WorldSettings>,
) -> Result<Json<WorldSettings>, ApiError> {
    let world_id = WorldId::from_uuid(id);
    let updated = state
        .app
        .use_cases
        .settings
        .update(world_id, settings)
        .await
        .map_err(|e| match e {
            crate::use_cases::SettingsError::Domain(d) => ApiError::BadRequest(d.to_string()),
            crate::use_cases::SettingsError::Repo(r) => ApiError::Internal(r.to_string()),
        })?;

    state
        .connections
        .broadcast_to_world(
            world_id,
            ServerMessage::SettingsChanged {
                settings: updated.clone(),
            },
        )
        .await;

    Ok(Json(updated))
}

async fn get_log(
    State(state): State<Arc<WsState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LogEntryData>>, ApiError> {
    let entries = state
        .app
        .use_cases
        .log
        .get_log(WorldId::from_uuid(id))
        .await?;
    Ok(Json(entries))
}

async fn clear_log(
    State(state): State<Arc<WsState>>,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    state.app.use_cases.log.clear(WorldId::from_uuid(id)).await?;
    Ok(())
}

async fn clear_actor_log(
    State(state): State<Arc<WsState>>,
    Path((id, actor_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ApiError> {
    state
        .app
        .use_cases
        .log
        .clear_actor(WorldId::from_uuid(id), ActorId::from_uuid(actor_id))
        .await?;
    Ok(())
}

async fn export_log(
    State(state): State<Arc<WsState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportDocument>, ApiError> {
    let export = state
        .app
        .use_cases
        .export
        .export(WorldId::from_uuid(id))
        .await?;
    Ok(Json(export))
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::BadRequest(msg) => {
                (axum::http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Internal(_) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
            )
                .into_response(),
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
