//! Central engine loop.
//!
//! This task owns the `Matchmaker` instance. It is the only place engine
//! state is touched, so every operation, including the matching pass,
//! is serialized by the loop itself.
//!
//! Wake sources:
//! - `EngineRequest`s from connections, applied in arrival order.
//! - the match timer, which runs one matching pass per tick.
//! - the shutdown signal.
//!
//! After each roster change the player count is published on a `watch`
//! channel so connections can read it without a round trip.

use std::time::Duration;

use matchmaker_core::Matchmaker;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::types::{EngineRequest, EngineRx, MatchmakerHandle};

/// Create the engine channels and a handle onto them.
///
/// The returned `EngineRx` and `watch::Sender` go to [`run_engine_loop`].
pub fn channel() -> (MatchmakerHandle, EngineRx, watch::Sender<usize>) {
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let (count_tx, count_rx) = watch::channel(0usize);
    (MatchmakerHandle::new(engine_tx, count_rx), engine_rx, count_tx)
}

/// Run the central engine loop until shutdown or until every handle is gone.
pub async fn run_engine_loop(
    mut engine_rx: EngineRx,
    player_count_tx: watch::Sender<usize>,
    match_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    if *shutdown.borrow() {
        return;
    }

    let mut matchmaker = Matchmaker::new();

    let mut ticker = interval(match_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            req = engine_rx.recv() => {
                let Some(req) = req else { break };
                apply(&mut matchmaker, req, &player_count_tx);
            }

            _ = ticker.tick() => {
                let matched = matchmaker.run_matching_pass();
                if matched > 0 {
                    debug!(matched, pending = matchmaker.num_pending_requests(), "matching pass");
                }
            }
        }
    }

    info!("Engine loop shutting down");
}

/// Apply a single request to the engine.
fn apply(matchmaker: &mut Matchmaker, req: EngineRequest, player_count_tx: &watch::Sender<usize>) {
    match req {
        EngineRequest::RegisterServer(server) => matchmaker.register_server(server),
        EngineRequest::UnregisterServer(id) => matchmaker.unregister_server(id),
        EngineRequest::DisconnectServer(id) => matchmaker.disconnect_server(id),
        EngineRequest::ConnectPlayer(id, reply) => {
            matchmaker.connect_player(id);
            let count = matchmaker.player_count();
            player_count_tx.send_replace(count);
            let _ = reply.send(count);
        }
        EngineRequest::DisconnectedPlayer(id) => {
            matchmaker.disconnected_player(id);
            player_count_tx.send_replace(matchmaker.player_count());
        }
        EngineRequest::RequestMatch(request) => matchmaker.request_match(request),
        EngineRequest::Snapshot(reply) => {
            // Requester may have given up; nothing to do then.
            let _ = reply.send(matchmaker.snapshot());
        }
    }
}
