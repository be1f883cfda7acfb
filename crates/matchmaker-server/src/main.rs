//! Matchmaker broker binary.

use matchmaker_server::config::Config;
use matchmaker_server::{logging, server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let config = Config::from_env()?;

    info!(
        "Starting matchmaker on {}:{} (max_connections = {}, match_interval = {:?})",
        config.bind_addr,
        config.port,
        config.max_connections,
        config.match_interval
    );

    server::run(config).await
}
