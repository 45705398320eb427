//! Connection management for WebSocket clients.
//!
//! Tracks connected clients and their world associations.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use heroledger_domain::{ActorId, UserId, WorldId};
use heroledger_shared::{ClientRole, ServerMessage};

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    pub user_id: UserId,
    pub user_name: String,
    /// The world this connection has joined, if any
    pub world_id: Option<WorldId>,
    pub role: ClientRole,
    /// The actor a player controls (players only)
    pub actor_id: Option<ActorId>,
}

impl ConnectionInfo {
    pub fn is_gm(&self) -> bool {
        matches!(self.role, ClientRole::Gm)
    }

    /// Whether this connection may spend for the given actor.
    pub fn controls(&self, actor_id: ActorId) -> bool {
        self.is_gm() || self.actor_id == Some(actor_id)
    }
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Connection not registered")]
    NotRegistered,
}

/// Manages all active WebSocket connections.
#[derive(Default)]
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection.
    pub async fn register(&self, connection_id: Uuid, sender: mpsc::Sender<ServerMessage>) {
        let info = ConnectionInfo {
            connection_id,
            user_id: UserId::new(),
            user_name: String::new(),
            world_id: None,
            role: ClientRole::Spectator,
            actor_id: None,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections
            .get(&connection_id)
            .map(|(info, _)| info.clone())
    }

    /// Join a world with a role.
    pub async fn join_world(
        &self,
        connection_id: Uuid,
        world_id: WorldId,
        role: ClientRole,
        user_name: String,
        actor_id: Option<ActorId>,
    ) -> Result<ConnectionInfo, ConnectionError> {
        let mut connections = self.connections.write().await;
        let (info, _) = connections
            .get_mut(&connection_id)
            .ok_or(ConnectionError::NotRegistered)?;
        info.world_id = Some(world_id);
        info.role = role;
        info.user_name = user_name;
        info.actor_id = actor_id;
        tracing::info!(
            connection_id = %connection_id,
            world_id = %world_id,
            ?role,
            "Connection joined world"
        );
        Ok(info.clone())
    }

    /// Leave the current world.
    pub async fn leave_world(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if let Some((info, _)) = connections.get_mut(&connection_id) {
            info.world_id = None;
            info.role = ClientRole::Spectator;
            info.actor_id = None;
        }
    }

    /// Broadcast a message to every connection in a world.
    pub async fn broadcast_to_world(&self, world_id: WorldId, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.world_id == Some(world_id) {
                if let Err(e) = sender.try_send(message.clone()) {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        error = %e,
                        "Failed to broadcast message"
                    );
                }
            }
        }
    }
}
