//! Player connection loop.
//!
//! On connect the player joins the roster and is sent a `status` frame.
//! After that the loop reacts to:
//! - `request-match` frames, queuing a match request for this session
//! - allocations from the engine, forwarded as `server-found`
//! - the status timer (`status` with the current player count)
//! - the keep-alive timer (`ping`)
//!
//! Write failures are logged and the loop carries on; only a closed or
//! failed read ends the session.

use futures_util::StreamExt;
use matchmaker_core::{player_channel, PlayerNotifyTx, PlayerRequest, SessionId};
use matchmaker_protocol::{decode_player_message, PlayerInbound, PlayerOutbound, ProtocolError};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{periodic, send_json, Timers, WsSink, WsStream};
use crate::types::MatchmakerHandle;

/// Run the dispatch loop for one player connection.
pub async fn run(
    session_id: SessionId,
    ws: WsStream,
    matchmaker: MatchmakerHandle,
    timers: Timers,
) -> anyhow::Result<()> {
    let (mut sink, mut stream) = ws.split();
    let (notify_tx, mut notify_rx) = player_channel();

    let player_count = matchmaker.connect_player(session_id).await;
    send_or_log(&mut sink, session_id, &PlayerOutbound::Status { player_count }, "status").await;

    let mut status = periodic(timers.status);
    let mut keepalive = periodic(timers.keepalive);

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(session_id, text.as_str(), &matchmaker, &notify_tx);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(player = %session_id, error = %e, "player read failed");
                        break;
                    }
                }
            }

            Some(allocated) = notify_rx.recv() => {
                info!(player = %session_id, ticket = %allocated.ticket_id, "server found");
                send_or_log(&mut sink, session_id, &PlayerOutbound::from(allocated), "server found").await;
            }

            _ = status.tick() => {
                let player_count = matchmaker.player_count();
                send_or_log(&mut sink, session_id, &PlayerOutbound::Status { player_count }, "status").await;
            }

            _ = keepalive.tick() => {
                send_or_log(&mut sink, session_id, &PlayerOutbound::Ping, "ping").await;
            }
        }
    }

    matchmaker.disconnected_player(session_id);
    Ok(())
}

fn handle_text(
    session_id: SessionId,
    text: &str,
    matchmaker: &MatchmakerHandle,
    notify_tx: &PlayerNotifyTx,
) {
    match decode_player_message(text) {
        Ok(PlayerInbound::Ping) => {}
        Ok(PlayerInbound::RequestMatch) => {
            matchmaker.request_match(PlayerRequest::new(session_id, notify_tx.clone()));
        }
        Err(ProtocolError::UnknownMessageType(t)) => {
            warn!(player = %session_id, message_type = %t, "unknown player message type");
        }
        Err(e) => {
            warn!(player = %session_id, error = %e, "invalid player message");
        }
    }
}

async fn send_or_log(sink: &mut WsSink, session_id: SessionId, msg: &PlayerOutbound, what: &str) {
    if let Err(e) = send_json(sink, msg).await {
        warn!(player = %session_id, error = %e, "error writing client {} message", what);
    }
}
