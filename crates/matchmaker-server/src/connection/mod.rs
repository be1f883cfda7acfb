//! Per-connection state machines.
//!
//! Each accepted WebSocket runs one dispatch loop ([`server`] or
//! [`player`]) selecting over its wake sources: inbound frames, the
//! engine's allocation handle, and interval timers. The loop owns the
//! write half, so writes to a given connection are never interleaved.

pub mod player;
pub mod server;

use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::config::Config;

pub type WsStream = WebSocketStream<TcpStream>;
pub type WsSink = SplitSink<WsStream, Message>;

/// Which endpoint a connection came in on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Game server advertising capacity.
    Server,
    /// Player asking for a match.
    Player,
}

impl Role {
    /// Map a request path to a role.
    pub fn from_path(path: &str) -> Option<Role> {
        match path.trim_end_matches('/') {
            "/server" => Some(Role::Server),
            "/client" => Some(Role::Player),
            _ => None,
        }
    }
}

/// Timer periods shared by every connection.
#[derive(Debug, Clone, Copy)]
pub struct Timers {
    pub keepalive: Duration,
    pub status: Duration,
    /// Budget for sniffing the request line and finishing the upgrade.
    pub handshake: Duration,
}

impl From<&Config> for Timers {
    fn from(config: &Config) -> Self {
        Timers {
            keepalive: config.keepalive_interval,
            status: config.status_interval,
            handshake: config.handshake_timeout,
        }
    }
}

/// Interval whose first tick is one full period from now.
pub(crate) fn periodic(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Encode `msg` and write it as one text frame.
pub(crate) async fn send_json<T: Serialize>(sink: &mut WsSink, msg: &T) -> anyhow::Result<()> {
    let text = matchmaker_protocol::encode(msg)?;
    sink.send(Message::text(text)).await?;
    Ok(())
}
