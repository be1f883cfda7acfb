//! Game server record.
//!
//! A `ServerSession` is what a game server advertises on registration:
//! where to reach it, how many players it takes, and the players the
//! engine has assigned to it so far (in match order).

use tracing::debug;

use crate::allocation::{AllocatedServer, ServerNotifyTx};
use crate::ids::{SessionId, TicketId};
use crate::player::PlayerRequest;

#[derive(Debug, Clone)]
pub struct ServerSession {
    /// Connection identity; stable across re-registrations.
    pub session_id: SessionId,

    /// Issued on each successful registration.
    pub ticket_id: TicketId,

    pub address: String,
    pub port: u16,

    /// Maximum number of assigned players. Always `> 0`.
    pub capacity: u32,

    /// Assigned players, oldest match first.
    players: Vec<PlayerRequest>,

    /// Receives `ticket_id` once, when the server fills.
    allocations: ServerNotifyTx,
}

impl ServerSession {
    pub fn new(
        session_id: SessionId,
        ticket_id: TicketId,
        address: impl Into<String>,
        port: u16,
        capacity: u32,
        allocations: ServerNotifyTx,
    ) -> Self {
        ServerSession {
            session_id,
            ticket_id,
            address: address.into(),
            port,
            capacity,
            players: Vec::new(),
            allocations,
        }
    }

    pub fn players(&self) -> &[PlayerRequest] {
        &self.players
    }

    /// True once the assigned-player list has reached capacity.
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity as usize
    }

    /// The value every assigned player receives.
    pub fn allocated_server(&self) -> AllocatedServer {
        AllocatedServer {
            ticket_id: self.ticket_id,
            address: self.address.clone(),
            port: self.port,
        }
    }

    pub(crate) fn assign(&mut self, request: PlayerRequest) {
        debug_assert!(!self.is_full(), "assigning to a full server");
        self.players.push(request);
    }

    pub(crate) fn take_players(&mut self) -> Vec<PlayerRequest> {
        std::mem::take(&mut self.players)
    }

    pub(crate) fn set_players(&mut self, players: Vec<PlayerRequest>) {
        self.players = players;
    }

    /// Drop a player from the assigned list. Returns whether it was there.
    pub(crate) fn remove_player(&mut self, id: SessionId) -> bool {
        match self.players.iter().position(|p| p.session_id == id) {
            Some(idx) => {
                self.players.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Re-send the current allocation to every assigned player.
    pub(crate) fn notify_players(&self) {
        let allocated = self.allocated_server();
        for player in &self.players {
            player.notify(allocated.clone());
        }
    }

    /// Tell the owning game server it has been filled.
    pub(crate) fn notify_filled(&self) {
        if self.allocations.send(self.ticket_id).is_err() {
            debug!(server = %self.session_id, "server notification dropped: receiver closed");
        }
    }
}
