//! Read-only status page served at `GET /stats`.
//!
//! Shares the WebSocket listener: the request line is peeked before the
//! upgrade, and plain `GET /stats` requests are answered here with a
//! single HTML response.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::Context;
use matchmaker_core::MatchmakerSnapshot;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::types::MatchmakerHandle;

const STATS_REQUEST_PREFIX: &[u8] = b"GET /stats";

/// Pause between peeks while the request line is still arriving.
const PEEK_RETRY: Duration = Duration::from_millis(5);

/// Peek at the request line without consuming it.
///
/// Keeps peeking while the bytes seen so far are a strict prefix of
/// `GET /stats`, so a request line split across segments is still
/// recognised. The caller bounds the wait.
pub async fn is_stats_request(stream: &TcpStream) -> std::io::Result<bool> {
    let mut buf = [0u8; STATS_REQUEST_PREFIX.len()];
    loop {
        let n = stream.peek(&mut buf).await?;
        if n == 0 || buf[..n] != STATS_REQUEST_PREFIX[..n] {
            return Ok(false);
        }
        if n == STATS_REQUEST_PREFIX.len() {
            return Ok(true);
        }
        // peek returns at once while data is buffered; don't spin on it.
        tokio::time::sleep(PEEK_RETRY).await;
    }
}

/// Answer one stats request and close the connection.
pub async fn serve(mut stream: TcpStream, matchmaker: &MatchmakerHandle) -> anyhow::Result<()> {
    // Drain the request head; its contents do not matter.
    let mut head = [0u8; 4096];
    let _ = stream.read(&mut head).await.context("reading stats request")?;

    let snapshot = matchmaker.snapshot().await.unwrap_or_default();
    let body = render(&snapshot);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );

    stream.write_all(response.as_bytes()).await.context("writing stats response")?;
    stream.shutdown().await.ok();
    Ok(())
}

/// Render the status page.
pub fn render(snapshot: &MatchmakerSnapshot) -> String {
    let mut rows = String::new();
    if snapshot.has_no_servers() {
        rows.push_str("<tr><td colspan=\"4\">No servers available!</td></tr>\n");
    }
    for server in &snapshot.servers {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}:{}</td><td>{}</td><td>{}</td></tr>",
            server.session_id,
            escape_html(&server.address),
            server.port,
            server.capacity,
            server.players
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Matchmaker</title></head>
<body>
<main>
<h3>Matchmaker</h3>
<p>{players} player(s) connected, {pending} waiting for a match</p>
<table>
<thead><tr><th>ID</th><th>Address</th><th>Capacity</th><th>Players</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</main>
</body>
</html>
"#,
        players = snapshot.player_count,
        pending = snapshot.pending_requests,
        rows = rows
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
