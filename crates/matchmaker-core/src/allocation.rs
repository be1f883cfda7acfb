//! Allocation results and the notification handles that carry them.
//!
//! The engine pushes results to connections through unbounded tokio
//! channels. Sending on an unbounded channel never waits, so a slow or
//! stalled connection can never hold up a matching pass.
//!
//! Note: turning these into wire messages is the job of the
//! `matchmaker-protocol` crate; this module is purely logical.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ids::TicketId;

/// Where a matched player should connect.
///
/// Produced once per successful match and delivered to every player
/// assigned to the server at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedServer {
    pub ticket_id: TicketId,
    pub address: String,
    pub port: u16,
}

/// Player-side handle: receives an [`AllocatedServer`] on every match
/// into the player's server.
pub type PlayerNotifyTx = mpsc::UnboundedSender<AllocatedServer>;
pub type PlayerNotifyRx = mpsc::UnboundedReceiver<AllocatedServer>;

/// Server-side handle: receives the server's own ticket once its
/// capacity is filled.
pub type ServerNotifyTx = mpsc::UnboundedSender<TicketId>;
pub type ServerNotifyRx = mpsc::UnboundedReceiver<TicketId>;

/// Convenience constructor for a player notification channel.
pub fn player_channel() -> (PlayerNotifyTx, PlayerNotifyRx) {
    mpsc::unbounded_channel()
}

/// Convenience constructor for a server notification channel.
pub fn server_channel() -> (ServerNotifyTx, ServerNotifyRx) {
    mpsc::unbounded_channel()
}
