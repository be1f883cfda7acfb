//! Message kinds exchanged on the two endpoints.
//!
//! Every frame is a JSON object with a `message_type` string:
//!
//! ```text
//! /server   server → broker : ping | register | unregister
//!           broker → server : server-registered | server-allocated | ping
//! /client   player → broker : ping | request-match
//!           broker → player : status | server-found | ping
//! ```
//!
//! The decode logic lives in `json_codec`.

use matchmaker_core::{AllocatedServer, TicketId};
use serde::{Deserialize, Serialize};

pub const PING: &str = "ping";
pub const REGISTER: &str = "register";
pub const UNREGISTER: &str = "unregister";
pub const REQUEST_MATCH: &str = "request-match";

/// First-pass view of any inbound frame: only the discriminator.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub message_type: String,
}

/// Payload of a `register` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterServer {
    /// Address players should connect to.
    pub address: String,
    pub port: u16,
    /// Number of players the server takes; must be `> 0`.
    pub capacity: u32,
}

impl RegisterServer {
    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.capacity == 0 {
            return Err("capacity");
        }
        if self.address.trim().is_empty() {
            return Err("address");
        }
        Ok(())
    }
}

/// Game server → broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "message_type", rename_all = "kebab-case")]
pub enum ServerInbound {
    Ping,
    Register(RegisterServer),
    Unregister,
}

/// Broker → game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "kebab-case")]
pub enum ServerOutbound {
    /// Reply to `register`.
    ServerRegistered { ticket_id: TicketId },

    /// The server just reached capacity.
    ServerAllocated { ticket_id: TicketId },

    /// Keep-alive.
    Ping,
}

/// Player → broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "message_type", rename_all = "kebab-case")]
pub enum PlayerInbound {
    Ping,
    RequestMatch,
}

/// Broker → player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "kebab-case")]
pub enum PlayerOutbound {
    /// Current number of connected players.
    Status { player_count: usize },

    /// The player has been placed on a server.
    ServerFound {
        ticket_id: TicketId,
        address: String,
        port: u16,
    },

    /// Keep-alive.
    Ping,
}

impl From<AllocatedServer> for PlayerOutbound {
    fn from(allocated: AllocatedServer) -> Self {
        PlayerOutbound::ServerFound {
            ticket_id: allocated.ticket_id,
            address: allocated.address,
            port: allocated.port,
        }
    }
}
