//! Game server connection loop.
//!
//! Inbound:
//! - `ping`       → ignored
//! - `register`   → register with the engine, reply `server-registered`
//! - `unregister` → leave the pool
//!
//! Outbound, unsolicited:
//! - `server-allocated` when the engine reports the server filled
//! - `ping` every keep-alive period
//!
//! Any failed write ends the connection. However the loop ends, the
//! server is removed from the pool.

use anyhow::Context;
use futures_util::StreamExt;
use matchmaker_core::{server_channel, ServerNotifyTx, ServerSession, SessionId, TicketId};
use matchmaker_protocol::{decode_server_message, ProtocolError, ServerInbound, ServerOutbound};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::{periodic, send_json, Timers, WsSink, WsStream};
use crate::types::MatchmakerHandle;

/// Run the dispatch loop for one game server connection.
pub async fn run(
    session_id: SessionId,
    ws: WsStream,
    matchmaker: MatchmakerHandle,
    timers: Timers,
) -> anyhow::Result<()> {
    let (mut sink, mut stream) = ws.split();
    let (allocations_tx, mut allocations_rx) = server_channel();
    let mut keepalive = periodic(timers.keepalive);

    let result = loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_text(
                            session_id,
                            text.as_str(),
                            &mut sink,
                            &matchmaker,
                            &allocations_tx,
                        )
                        .await
                        {
                            warn!(server = %session_id, error = %e, "error handling server message, closing connection");
                            break Err(e);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(server = %session_id, error = %e, "server read failed");
                        break Ok(());
                    }
                }
            }

            Some(ticket_id) = allocations_rx.recv() => {
                if let Err(e) = send_json(&mut sink, &ServerOutbound::ServerAllocated { ticket_id }).await {
                    warn!(server = %session_id, error = %e, "error writing server allocated message, closing connection");
                    break Err(e);
                }
                info!(server = %session_id, ticket = %ticket_id, "server allocated");
            }

            _ = keepalive.tick() => {
                if let Err(e) = send_json(&mut sink, &ServerOutbound::Ping).await {
                    warn!(server = %session_id, error = %e, "error writing server ping message, closing connection");
                    break Err(e);
                }
            }
        }
    };

    matchmaker.disconnect_server(session_id);
    result
}

/// Handle one inbound text frame. Bad frames are logged and skipped; an
/// error here ends the connection.
async fn handle_text(
    session_id: SessionId,
    text: &str,
    sink: &mut WsSink,
    matchmaker: &MatchmakerHandle,
    allocations_tx: &ServerNotifyTx,
) -> anyhow::Result<()> {
    let msg = match decode_server_message(text) {
        Ok(msg) => msg,
        Err(ProtocolError::UnknownMessageType(t)) => {
            warn!(server = %session_id, message_type = %t, "unknown server message type");
            return Ok(());
        }
        Err(e) => {
            warn!(server = %session_id, error = %e, "invalid server message");
            return Ok(());
        }
    };

    match msg {
        ServerInbound::Ping => {}
        ServerInbound::Register(register) => {
            let ticket_id = TicketId::new();
            matchmaker.register_server(ServerSession::new(
                session_id,
                ticket_id,
                register.address,
                register.port,
                register.capacity,
                allocations_tx.clone(),
            ));
            send_json(sink, &ServerOutbound::ServerRegistered { ticket_id })
                .await
                .context("writing server-registered")?;
        }
        ServerInbound::Unregister => matchmaker.unregister_server(session_id),
    }

    Ok(())
}
