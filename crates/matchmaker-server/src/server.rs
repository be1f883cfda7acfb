//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Spawns the single engine task that owns the `Matchmaker`.
//! - Accepts connections, answering `GET /stats` directly and upgrading
//!   everything else to WebSocket.
//! - Picks the role from the upgrade path (`/server` or `/client`) and
//!   spawns that role's connection loop with a fresh `SessionId`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use matchmaker_core::SessionId;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tokio::time::timeout;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connection::{self, Role, Timers, WsStream};
use crate::engine_task;
use crate::stats;
use crate::types::MatchmakerHandle;

/// Run the server with the given configuration until a shutdown signal.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Listening on {}", addr);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal");
        shutdown_tx.send_replace(true);
    });

    serve(listener, config, shutdown_rx).await
}

/// Serve connections on an already-bound listener until `shutdown` flips.
pub async fn serve(
    listener: TcpListener,
    config: Config,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let (matchmaker, engine_rx, count_tx) = engine_task::channel();
    let engine = tokio::spawn(engine_task::run_engine_loop(
        engine_rx,
        count_tx,
        config.match_interval,
        shutdown.clone(),
    ));

    let timers = Timers::from(&config);
    let slots = Arc::new(Semaphore::new(config.max_connections));

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };

                let Ok(permit) = slots.clone().try_acquire_owned() else {
                    warn!(
                        "Rejecting connection from {}: max_connections ({}) reached",
                        peer_addr, config.max_connections
                    );
                    // Just drop the stream; the peer sees the connection closed.
                    continue;
                };

                let matchmaker = matchmaker.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = handle_connection(stream, peer_addr, matchmaker, timers).await {
                        warn!(peer = %peer_addr, error = %e, "connection ended with error");
                    }
                });
            }
        }
    }

    info!("Listener shutting down");
    engine.await.context("engine task panicked")?;
    Ok(())
}

/// Outcome of the opening exchange on a fresh connection.
enum Accepted {
    Stats(TcpStream),
    Upgraded {
        ws: WsStream,
        role: Role,
        region: Option<String>,
    },
}

async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    matchmaker: MatchmakerHandle,
    timers: Timers,
) -> anyhow::Result<()> {
    // A peer that never finishes its request line must not keep its slot.
    let accepted = timeout(timers.handshake, accept(stream))
        .await
        .with_context(|| format!("no complete handshake within {:?}", timers.handshake))??;

    let (ws, role, region) = match accepted {
        Accepted::Stats(stream) => {
            debug!(peer = %peer_addr, "stats request");
            return stats::serve(stream, &matchmaker).await;
        }
        Accepted::Upgraded { ws, role, region } => (ws, role, region),
    };

    let session_id = SessionId::new();
    info!(
        session = %session_id,
        peer = %peer_addr,
        region = region.as_deref().unwrap_or("-"),
        ?role,
        "new connection"
    );

    let result = match role {
        Role::Server => connection::server::run(session_id, ws, matchmaker, timers).await,
        Role::Player => connection::player::run(session_id, ws, matchmaker, timers).await,
    };
    info!(session = %session_id, ?role, "disconnected");
    result
}

/// Answer `GET /stats` or upgrade to WebSocket, picking the role by path.
async fn accept(stream: TcpStream) -> anyhow::Result<Accepted> {
    if stats::is_stats_request(&stream).await? {
        return Ok(Accepted::Stats(stream));
    }

    let mut role = None;
    let mut region = None;
    let ws = accept_hdr_async(stream, |req: &Request, resp: Response| {
        region = req
            .headers()
            .get("fly-region")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        match Role::from_path(req.uri().path()) {
            Some(r) => {
                role = Some(r);
                Ok(resp)
            }
            None => Err(not_found()),
        }
    })
    .await
    .context("websocket handshake failed")?;

    let Some(role) = role else {
        anyhow::bail!("handshake completed without a role");
    };
    Ok(Accepted::Upgraded { ws, role, region })
}

fn not_found() -> ErrorResponse {
    let mut resp = ErrorResponse::new(Some("unknown endpoint; use /server or /client".to_string()));
    *resp.status_mut() = StatusCode::NOT_FOUND;
    resp
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
