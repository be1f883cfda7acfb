//! A pending match request.

use tracing::debug;

use crate::allocation::{AllocatedServer, PlayerNotifyTx};
use crate::ids::SessionId;

/// One player's standing request to be placed on any server with room.
///
/// Queued in the engine until a matching pass pairs it with a server; from
/// then on it lives in that server's assigned-player list.
#[derive(Debug, Clone)]
pub struct PlayerRequest {
    pub session_id: SessionId,

    /// Where allocation results for this player are delivered.
    notify: PlayerNotifyTx,
}

impl PlayerRequest {
    pub fn new(session_id: SessionId, notify: PlayerNotifyTx) -> Self {
        PlayerRequest { session_id, notify }
    }

    /// Deliver an allocation to the owning connection.
    ///
    /// Never blocks. If the connection already went away the result is
    /// dropped.
    pub fn notify(&self, allocated: AllocatedServer) {
        if self.notify.send(allocated).is_err() {
            debug!(player = %self.session_id, "player notification dropped: receiver closed");
        }
    }
}
