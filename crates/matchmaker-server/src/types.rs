//! Shared types for the matchmaker server.
//!
//! This module defines:
//! - `EngineRequest`: operations flowing from connections to the engine task
//! - channel aliases between connections and the engine task
//! - `MatchmakerHandle`: the cloneable front door connections use

use matchmaker_core::{MatchmakerSnapshot, PlayerRequest, ServerSession, SessionId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

/// One engine operation.
///
/// Requests are applied strictly in the order they arrive.
#[derive(Debug)]
pub enum EngineRequest {
    RegisterServer(ServerSession),
    UnregisterServer(SessionId),
    DisconnectServer(SessionId),
    /// Replies with the player count once the player is on the roster.
    ConnectPlayer(SessionId, oneshot::Sender<usize>),
    DisconnectedPlayer(SessionId),
    RequestMatch(PlayerRequest),
    Snapshot(oneshot::Sender<MatchmakerSnapshot>),
}

/// Channel from connections → engine task.
pub type EngineTx = mpsc::UnboundedSender<EngineRequest>;
pub type EngineRx = mpsc::UnboundedReceiver<EngineRequest>;

/// Cheap-to-clone handle onto the engine task.
///
/// Mutations are queued for the engine and return immediately; only the
/// query-style calls wait for the engine's reply.
#[derive(Debug, Clone)]
pub struct MatchmakerHandle {
    engine_tx: EngineTx,
    player_count: watch::Receiver<usize>,
}

impl MatchmakerHandle {
    pub fn new(engine_tx: EngineTx, player_count: watch::Receiver<usize>) -> Self {
        MatchmakerHandle {
            engine_tx,
            player_count,
        }
    }

    pub fn register_server(&self, server: ServerSession) {
        self.submit(EngineRequest::RegisterServer(server));
    }

    pub fn unregister_server(&self, id: SessionId) {
        self.submit(EngineRequest::UnregisterServer(id));
    }

    pub fn disconnect_server(&self, id: SessionId) {
        self.submit(EngineRequest::DisconnectServer(id));
    }

    /// Put a player on the roster and return the resulting player count.
    pub async fn connect_player(&self, id: SessionId) -> usize {
        let (tx, rx) = oneshot::channel();
        self.submit(EngineRequest::ConnectPlayer(id, tx));
        match rx.await {
            Ok(count) => count,
            Err(_) => self.player_count(),
        }
    }

    pub fn disconnected_player(&self, id: SessionId) {
        self.submit(EngineRequest::DisconnectedPlayer(id));
    }

    pub fn request_match(&self, request: PlayerRequest) {
        self.submit(EngineRequest::RequestMatch(request));
    }

    /// Latest player count published by the engine.
    pub fn player_count(&self) -> usize {
        *self.player_count.borrow()
    }

    /// Ask the engine for a snapshot. `None` if the engine has stopped.
    pub async fn snapshot(&self) -> Option<MatchmakerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.submit(EngineRequest::Snapshot(tx));
        rx.await.ok()
    }

    fn submit(&self, req: EngineRequest) {
        if self.engine_tx.send(req).is_err() {
            warn!("engine channel closed; request dropped");
        }
    }
}
