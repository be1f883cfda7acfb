//! Example: join the matchmaking queue as a player.
//!
//! Usage:
//!
//! ```bash
//! # Run the broker
//! MATCHMAKER_PORT=9000 cargo run -p matchmaker-server
//!
//! # In another terminal
//! MATCHMAKER_URL=ws://127.0.0.1:9000/client cargo run -p matchmaker-server --example player_client
//! ```
//!
//! It will:
//! - connect to the player endpoint
//! - send a `request-match`
//! - print every frame until a `server-found` arrives.

use std::env;

use futures_util::{SinkExt, StreamExt};
use matchmaker_protocol::{encode, PlayerInbound, PlayerOutbound};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = env::var("MATCHMAKER_URL").unwrap_or_else(|_| "ws://127.0.0.1:80/client".to_string());

    println!("Connecting to {}...", url);
    let (mut ws, _) = connect_async(url.as_str()).await?;
    println!("Connected. Requesting a match.");

    ws.send(Message::text(encode(&PlayerInbound::RequestMatch)?)).await?;

    while let Some(frame) = ws.next().await {
        let Message::Text(text) = frame? else {
            continue;
        };

        match serde_json::from_str::<PlayerOutbound>(text.as_str()) {
            Ok(PlayerOutbound::Status { player_count }) => {
                println!("<< {} player(s) online", player_count);
            }
            Ok(PlayerOutbound::Ping) => {}
            Ok(PlayerOutbound::ServerFound {
                ticket_id,
                address,
                port,
            }) => {
                println!("<< server found: {}:{} (ticket {})", address, port, ticket_id);
                break;
            }
            Err(e) => eprintln!("Could not decode frame {:?}: {}", text.as_str(), e),
        }
    }

    ws.close(None).await.ok();
    Ok(())
}
