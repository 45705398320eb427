//! WebSocket handling for client connections.
//!
//! Handles the WebSocket protocol between the engine and connected tables:
//! GM adjustments, two-phase spends, and the sequenced `PointsChanged`
//! broadcast that keeps every client's ledger view in sync.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use heroledger_domain::{ActorId, DomainError, ReservationId, SpendAction, WorldId};
use heroledger_shared::{ClientMessage, ClientRole, ServerMessage};

use crate::app::App;
use crate::use_cases::{ActingUser, AdjustKind, LedgerUpdate, PointsError};

use super::connections::{ConnectionInfo, ConnectionManager};

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    state.connections.register(connection_id, tx.clone()).await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Forward messages from the channel to the WebSocket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &state, connection_id).await {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send response, channel full or closed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let _ = tx.try_send(ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {}", e),
                    });
                }
            },
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.connections.unregister(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client message to the appropriate handler.
async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    connection_id: Uuid,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Heartbeat => Some(ServerMessage::Pong),

        ClientMessage::JoinWorld {
            world_id,
            role,
            user_name,
            actor_id,
        } => handle_join_world(state, connection_id, world_id, role, user_name, actor_id).await,

        ClientMessage::LeaveWorld => {
            state.connections.leave_world(connection_id).await;
            None
        }

        ClientMessage::RegisterActor {
            actor_id,
            name,
            level,
            npc,
        } => handle_register_actor(state, connection_id, actor_id, &name, level, npc).await,

        ClientMessage::AwardPoints {
            actor_id,
            amount,
            expected_version,
        } => {
            handle_adjust(
                state,
                connection_id,
                actor_id,
                AdjustKind::Award { amount },
                expected_version,
            )
            .await
        }
        ClientMessage::SubtractPoint {
            actor_id,
            expected_version,
        } => {
            handle_adjust(
                state,
                connection_id,
                actor_id,
                AdjustKind::Subtract,
                expected_version,
            )
            .await
        }
        ClientMessage::ResetPoints {
            actor_id,
            expected_version,
        } => {
            handle_adjust(
                state,
                connection_id,
                actor_id,
                AdjustKind::Reset,
                expected_version,
            )
            .await
        }
        ClientMessage::SetPointsZero {
            actor_id,
            expected_version,
        } => {
            handle_adjust(
                state,
                connection_id,
                actor_id,
                AdjustKind::SetZero,
                expected_version,
            )
            .await
        }

        ClientMessage::AwardSessionPoints => {
            handle_session_award(state, connection_id).await
        }

        ClientMessage::ReserveSpend {
            actor_id,
            action,
            amount,
        } => handle_reserve_spend(state, connection_id, actor_id, action, amount).await,
        ClientMessage::ConfirmSpend { reservation_id } => {
            handle_confirm_spend(state, connection_id, reservation_id).await
        }
        ClientMessage::CancelSpend { reservation_id } => {
            handle_cancel_spend(state, connection_id, reservation_id).await
        }

        ClientMessage::LevelChanged { actor_id, level } => {
            handle_level_changed(state, connection_id, actor_id, level).await
        }

        ClientMessage::EnableNpc {
            actor_id,
            name,
            level,
            points,
        } => handle_enable_npc(state, connection_id, actor_id, &name, level, points).await,
        ClientMessage::DisableNpc { actor_id } => {
            handle_disable_npc(state, connection_id, actor_id).await
        }

        ClientMessage::RequestSummary => handle_request_summary(state, connection_id).await,
        ClientMessage::RequestLog { actor_id } => {
            handle_request_log(state, connection_id, actor_id).await
        }

        ClientMessage::Unknown => Some(error_msg("UNSUPPORTED", "Unknown message type")),
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_join_world(
    state: &WsState,
    connection_id: Uuid,
    world_id: Uuid,
    role: ClientRole,
    user_name: String,
    actor_id: Option<Uuid>,
) -> Option<ServerMessage> {
    let world = WorldId::from_uuid(world_id);
    let info = match state
        .connections
        .join_world(
            connection_id,
            world,
            role,
            user_name,
            actor_id.map(ActorId::from_uuid),
        )
        .await
    {
        Ok(info) => info,
        Err(e) => return Some(error_msg("JOIN_FAILED", e.to_string())),
    };

    let settings = match state.app.use_cases.settings.get(world).await {
        Ok(settings) => settings,
        Err(e) => return Some(error_msg("INTERNAL", e.to_string())),
    };

    // First GM connect starts the session: auto-award if configured.
    if info.is_gm() && settings.auto_award && state.app.mark_session_awarded(world) {
        let user = acting_user(&info);
        match state
            .app
            .use_cases
            .session
            .execute(world, &settings, &user)
            .await
        {
            Ok(updates) => {
                for update in &updates {
                    state
                        .connections
                        .broadcast_to_world(world, points_changed(update))
                        .await;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Auto session award failed"),
        }
    }

    Some(ServerMessage::Joined {
        world_id,
        role,
        settings,
    })
}

async fn handle_register_actor(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Uuid,
    name: &str,
    level: u32,
    npc: bool,
) -> Option<ServerMessage> {
    let (info, world) = match require_gm(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let user = acting_user(&info);

    match state
        .app
        .use_cases
        .initialize
        .execute(ActorId::from_uuid(actor_id), world, name, level, npc, &user)
        .await
    {
        Ok(update) => {
            state
                .connections
                .broadcast_to_world(world, points_changed(&update))
                .await;
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_adjust(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Uuid,
    kind: AdjustKind,
    expected_version: u64,
) -> Option<ServerMessage> {
    let (info, world) = match require_gm(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let user = acting_user(&info);

    match state
        .app
        .use_cases
        .adjust
        .execute(ActorId::from_uuid(actor_id), kind, expected_version, &user)
        .await
    {
        Ok(update) => {
            state
                .connections
                .broadcast_to_world(world, points_changed(&update))
                .await;
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_session_award(state: &WsState, connection_id: Uuid) -> Option<ServerMessage> {
    let (info, world) = match require_gm(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let user = acting_user(&info);

    let settings = match state.app.use_cases.settings.get(world).await {
        Ok(settings) => settings,
        Err(e) => return Some(error_msg("INTERNAL", e.to_string())),
    };

    match state
        .app
        .use_cases
        .session
        .execute(world, &settings, &user)
        .await
    {
        Ok(updates) => {
            for update in &updates {
                state
                    .connections
                    .broadcast_to_world(world, points_changed(update))
                    .await;
            }
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_reserve_spend(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Uuid,
    action: SpendAction,
    amount: u32,
) -> Option<ServerMessage> {
    let (info, world) = match require_joined(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let actor = ActorId::from_uuid(actor_id);

    if !info.controls(actor) {
        return Some(error_msg("NOT_PERMITTED", "You do not control this actor"));
    }

    if action == SpendAction::Heal {
        let settings = match state.app.use_cases.settings.get(world).await {
            Ok(settings) => settings,
            Err(e) => return Some(error_msg("INTERNAL", e.to_string())),
        };
        if !settings.enable_heal_button {
            return Some(error_msg("HEAL_DISABLED", "Healing is disabled in this world"));
        }
    }

    let user = acting_user(&info);
    match state
        .app
        .use_cases
        .spend
        .reserve(world, actor, action, amount, &user)
    {
        Ok(outcome) => Some(ServerMessage::SpendReserved {
            reservation_id: outcome.reservation.id.to_uuid(),
            actor_id,
            action,
            amount,
            points_after: outcome.points_after,
        }),
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_confirm_spend(
    state: &WsState,
    connection_id: Uuid,
    reservation_id: Uuid,
) -> Option<ServerMessage> {
    let (_info, world) = match require_joined(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };

    match state
        .app
        .use_cases
        .spend
        .confirm(ReservationId::from_uuid(reservation_id))
        .await
    {
        Ok(update) => {
            state
                .connections
                .broadcast_to_world(world, points_changed(&update))
                .await;
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_cancel_spend(
    state: &WsState,
    connection_id: Uuid,
    reservation_id: Uuid,
) -> Option<ServerMessage> {
    let (_info, world) = match require_joined(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };

    match state
        .app
        .use_cases
        .spend
        .cancel(ReservationId::from_uuid(reservation_id))
    {
        Ok(hold) => {
            state
                .connections
                .broadcast_to_world(
                    world,
                    ServerMessage::SpendCancelled {
                        reservation_id,
                        actor_id: hold.actor_id.to_uuid(),
                    },
                )
                .await;
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_level_changed(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Uuid,
    level: u32,
) -> Option<ServerMessage> {
    let (info, world) = match require_gm(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let user = acting_user(&info);

    match state
        .app
        .use_cases
        .level_up
        .execute(ActorId::from_uuid(actor_id), level, &user)
        .await
    {
        Ok(Some(update)) => {
            state
                .connections
                .broadcast_to_world(world, points_changed(&update))
                .await;
            None
        }
        Ok(None) => None,
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_enable_npc(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Uuid,
    name: &str,
    level: u32,
    points: u32,
) -> Option<ServerMessage> {
    let (info, world) = match require_gm(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let user = acting_user(&info);

    match state
        .app
        .use_cases
        .npc
        .enable(world, ActorId::from_uuid(actor_id), name, level, points, &user)
        .await
    {
        Ok(update) => {
            state
                .connections
                .broadcast_to_world(world, points_changed(&update))
                .await;
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_disable_npc(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Uuid,
) -> Option<ServerMessage> {
    let (info, world) = match require_gm(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let user = acting_user(&info);

    match state
        .app
        .use_cases
        .npc
        .disable(ActorId::from_uuid(actor_id), &user)
        .await
    {
        Ok(update) => {
            state
                .connections
                .broadcast_to_world(world, points_changed(&update))
                .await;
            None
        }
        Err(e) => Some(map_points_error(&e)),
    }
}

async fn handle_request_summary(state: &WsState, connection_id: Uuid) -> Option<ServerMessage> {
    let (_info, world) = match require_joined(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    match state.app.use_cases.log.get_summary(world).await {
        Ok(actors) => Some(ServerMessage::Summary { actors }),
        Err(e) => Some(error_msg("INTERNAL", e.to_string())),
    }
}

async fn handle_request_log(
    state: &WsState,
    connection_id: Uuid,
    actor_id: Option<Uuid>,
) -> Option<ServerMessage> {
    let (_info, world) = match require_joined(state, connection_id).await {
        Ok(joined) => joined,
        Err(e) => return Some(e),
    };
    let result = match actor_id {
        Some(actor_id) => {
            state
                .app
                .use_cases
                .log
                .get_actor_log(world, ActorId::from_uuid(actor_id))
                .await
        }
        None => state.app.use_cases.log.get_log(world).await,
    };
    match result {
        Ok(entries) => Some(ServerMessage::LogEntries { entries }),
        Err(e) => Some(error_msg("INTERNAL", e.to_string())),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Connection must have joined a world; returns its info and world.
async fn require_joined(
    state: &WsState,
    connection_id: Uuid,
) -> Result<(ConnectionInfo, WorldId), ServerMessage> {
    let info = state
        .connections
        .get(connection_id)
        .await
        .ok_or_else(|| error_msg("NOT_JOINED", "Connection not registered"))?;
    let world = info
        .world_id
        .ok_or_else(|| error_msg("NOT_JOINED", "Join a world first"))?;
    Ok((info, world))
}

/// Connection must have joined a world as GM.
async fn require_gm(
    state: &WsState,
    connection_id: Uuid,
) -> Result<(ConnectionInfo, WorldId), ServerMessage> {
    let (info, world) = require_joined(state, connection_id).await?;
    if !info.is_gm() {
        tracing::warn!(connection_id = %connection_id, "Rejected non-GM admin operation");
        return Err(error_msg("NOT_PERMITTED", "GM role required"));
    }
    Ok((info, world))
}

fn acting_user(info: &ConnectionInfo) -> ActingUser {
    ActingUser {
        id: info.user_id,
        name: if info.user_name.is_empty() {
            "Unknown".to_string()
        } else {
            info.user_name.clone()
        },
    }
}

/// Build the broadcast for an accepted ledger change.
fn points_changed(update: &LedgerUpdate) -> ServerMessage {
    ServerMessage::PointsChanged {
        actor_id: update.reserve.actor_id.to_uuid(),
        actor_name: update.reserve.name.clone(),
        seq: update.event.seq,
        points: update.reserve.pool.points(),
        max: update.reserve.pool.max(),
        delta: update.event.points_spent,
        action: update.event.action,
    }
}

fn error_msg(code: &str, message: impl Into<String>) -> ServerMessage {
    ServerMessage::Error {
        code: code.to_string(),
        message: message.into(),
    }
}

fn map_points_error(e: &PointsError) -> ServerMessage {
    let code = match e {
        PointsError::ReservationNotFound => "RESERVATION_NOT_FOUND",
        PointsError::Domain(DomainError::Conflict { .. }) => "CONFLICT",
        PointsError::Domain(DomainError::InsufficientPoints { .. }) => "INSUFFICIENT_POINTS",
        PointsError::Domain(DomainError::NotFound { .. }) => "NOT_FOUND",
        PointsError::Domain(DomainError::NpcNotEnabled(_)) => "NPC_NOT_ENABLED",
        PointsError::Domain(_) => "VALIDATION",
        PointsError::Repo(_) => "INTERNAL",
    };
    error_msg(code, e.to_string())
}
