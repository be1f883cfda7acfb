//! matchmaker-core
//!
//! Pure matchmaking logic:
//! - identifiers (session / ticket)
//! - server records and pending player requests
//! - allocation results and their notification handles
//! - the matchmaker with its FIFO matching pass

pub mod ids;
pub mod allocation;
pub mod player;
pub mod server;
pub mod snapshot;
pub mod matchmaker;

pub use ids::{SessionId, TicketId};

pub use allocation::{
    player_channel,
    server_channel,
    AllocatedServer,
    PlayerNotifyRx,
    PlayerNotifyTx,
    ServerNotifyRx,
    ServerNotifyTx,
};

pub use player::PlayerRequest;
pub use server::ServerSession;
pub use snapshot::{MatchmakerSnapshot, ServerSummary};
pub use matchmaker::Matchmaker;
