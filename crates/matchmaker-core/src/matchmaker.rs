//! The matchmaker: single authority over the server pool, the pending
//! match requests and the connected-player roster.
//!
//! - Available servers are kept in registration order (FIFO).
//! - Pending requests are kept in arrival order (FIFO).
//! - A matching pass pairs the head request with the head server, one
//!   request at a time, until either queue runs dry.
//!
//! All operations take `&mut self`; whoever owns the `Matchmaker` owns the
//! right to mutate it, so every state transition is serialized by
//! construction. The server crate keeps it inside a single engine task.
//! Nothing here performs I/O, and notification sends never block.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use crate::ids::SessionId;
use crate::player::PlayerRequest;
use crate::server::ServerSession;
use crate::snapshot::{MatchmakerSnapshot, ServerSummary};

#[derive(Debug, Default)]
pub struct Matchmaker {
    /// Servers with open capacity, oldest registration first.
    available_servers: VecDeque<ServerSession>,

    /// Requests waiting for a server, oldest first.
    pending_requests: VecDeque<PlayerRequest>,

    /// Every connected player session, whether or not it asked for a match.
    ///
    /// The player count is the size of this set.
    active_players: HashSet<SessionId>,
}

impl Matchmaker {
    /// Create a new, empty matchmaker.
    pub fn new() -> Self {
        Matchmaker::default()
    }

    // -------------------------------------------------------------------------
    // Servers
    // -------------------------------------------------------------------------

    /// Add a server to the pool.
    ///
    /// A server that is already in the pool (same session id) is replaced
    /// in place and keeps its assigned players, so a re-registration does
    /// not lose in-progress assignments or its queue position.
    pub fn register_server(&mut self, mut server: ServerSession) {
        info!(
            server = %server.session_id,
            ticket = %server.ticket_id,
            address = %server.address,
            port = server.port,
            capacity = server.capacity,
            "server available"
        );

        match self.server_index(server.session_id) {
            Some(idx) => {
                let players = self.available_servers[idx].take_players();
                server.set_players(players);
                self.available_servers[idx] = server;
            }
            None => self.available_servers.push_back(server),
        }
    }

    /// Remove a server from the pool. No-op if it is not there.
    pub fn unregister_server(&mut self, id: SessionId) {
        info!(server = %id, "server unavailable");
        self.remove_server(id);
    }

    /// Same effect as [`unregister_server`](Self::unregister_server), for
    /// when the server's connection closes.
    pub fn disconnect_server(&mut self, id: SessionId) {
        info!(server = %id, "server disconnected");
        self.remove_server(id);
    }

    fn remove_server(&mut self, id: SessionId) -> Option<ServerSession> {
        let idx = self.server_index(id)?;
        self.available_servers.remove(idx)
    }

    fn server_index(&self, id: SessionId) -> Option<usize> {
        self.available_servers
            .iter()
            .position(|s| s.session_id == id)
    }

    // -------------------------------------------------------------------------
    // Players
    // -------------------------------------------------------------------------

    /// Record a newly connected player session. Idempotent.
    pub fn connect_player(&mut self, id: SessionId) {
        if self.active_players.insert(id) {
            info!(player = %id, count = self.player_count(), "player connected");
        } else {
            debug!(player = %id, "player already connected");
        }
    }

    /// Forget a player session.
    ///
    /// Removes the player from the roster, from the assigned-player list
    /// of every available server and from the pending requests. A server's
    /// capacity is unchanged, so it now needs one more match to fill.
    pub fn disconnected_player(&mut self, id: SessionId) {
        let was_active = self.active_players.remove(&id);

        for server in self.available_servers.iter_mut() {
            if server.remove_player(id) {
                debug!(player = %id, server = %server.session_id, "pruned player from server");
            }
        }

        let before = self.pending_requests.len();
        self.pending_requests.retain(|r| r.session_id != id);
        let dropped = before - self.pending_requests.len();

        info!(
            player = %id,
            was_active,
            dropped_requests = dropped,
            count = self.player_count(),
            "player disconnected"
        );
    }

    /// Queue a match request behind every earlier one.
    pub fn request_match(&mut self, request: PlayerRequest) {
        debug!(player = %request.session_id, "match requested");
        self.pending_requests.push_back(request);
    }

    /// Number of connected players.
    pub fn player_count(&self) -> usize {
        self.active_players.len()
    }

    // -------------------------------------------------------------------------
    // Matching
    // -------------------------------------------------------------------------

    /// Run one matching pass and return how many requests were matched.
    ///
    /// Semantics:
    /// - The head request goes to the head server.
    /// - After each assignment every player on that server (not only the
    ///   new one) is sent the server's allocation.
    /// - When the server reaches capacity its own handle receives the
    ///   ticket and it leaves the pool.
    /// - Repeats until there are no servers or no requests left.
    pub fn run_matching_pass(&mut self) -> usize {
        let mut matched = 0;

        while !self.pending_requests.is_empty() {
            let Some(server) = self.available_servers.front_mut() else {
                break;
            };

            // A re-registration with a smaller capacity can leave a server
            // already full before it receives anyone new.
            if server.is_full() {
                info!(server = %server.session_id, "server filled");
                server.notify_filled();
                self.available_servers.pop_front();
                continue;
            }

            let Some(request) = self.pending_requests.pop_front() else {
                break;
            };

            info!(player = %request.session_id, server = %server.session_id, "matching player to server");
            server.assign(request);
            server.notify_players();
            matched += 1;

            if server.is_full() {
                info!(server = %server.session_id, "server filled");
                server.notify_filled();
                self.available_servers.pop_front();
            }
        }

        matched
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Available servers in pool order.
    pub fn available_servers(&self) -> impl Iterator<Item = &ServerSession> {
        self.available_servers.iter()
    }

    /// Look up an available server by session id.
    pub fn server(&self, id: SessionId) -> Option<&ServerSession> {
        self.available_servers.iter().find(|s| s.session_id == id)
    }

    pub fn num_pending_requests(&self) -> usize {
        self.pending_requests.len()
    }

    pub fn is_player_active(&self, id: SessionId) -> bool {
        self.active_players.contains(&id)
    }

    /// Owned copy of the current state, for status reporting.
    pub fn snapshot(&self) -> MatchmakerSnapshot {
        MatchmakerSnapshot {
            player_count: self.player_count(),
            pending_requests: self.pending_requests.len(),
            servers: self.available_servers.iter().map(ServerSummary::from).collect(),
        }
    }
}
