//! Read-only views of matchmaker state.
//!
//! Owned copies, so they can leave the engine (e.g. for the status page)
//! without holding on to any engine state.

use serde::Serialize;

use crate::ids::{SessionId, TicketId};
use crate::server::ServerSession;

/// Summary of one server in the available pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSummary {
    pub session_id: SessionId,
    pub ticket_id: TicketId,
    pub address: String,
    pub port: u16,
    pub capacity: u32,
    /// Number of players currently assigned.
    pub players: usize,
}

impl From<&ServerSession> for ServerSummary {
    fn from(server: &ServerSession) -> Self {
        ServerSummary {
            session_id: server.session_id,
            ticket_id: server.ticket_id,
            address: server.address.clone(),
            port: server.port,
            capacity: server.capacity,
            players: server.players().len(),
        }
    }
}

/// Point-in-time view of the whole matchmaker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MatchmakerSnapshot {
    pub player_count: usize,
    pub pending_requests: usize,
    /// Available servers in pool (FIFO) order.
    pub servers: Vec<ServerSummary>,
}

impl MatchmakerSnapshot {
    /// Returns `true` if no server is accepting players.
    pub fn has_no_servers(&self) -> bool {
        self.servers.is_empty()
    }
}
