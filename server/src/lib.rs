// Relay server: rooms, lobby countdown, and verbatim forwarding of
// gameplay messages. The server never simulates; clients are authoritative
// for their own entities.

pub mod config;
pub mod net;
pub mod rooms;

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::rooms::RoomRegistry;

/// Accept loop over an already-bound listener. Used directly by tests so
/// they can bind an ephemeral port first.
pub async fn run(listener: TcpListener) -> io::Result<()> {
    let registry = Arc::new(RoomRegistry::new());
    info!(addr = %listener.local_addr()?, "relay listening");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let registry = Arc::clone(&registry);
                tokio::spawn(net::handle_connection(registry, stream, peer));
            }
            // Transient accept errors (fd pressure, aborted handshakes)
            // should not take the server down.
            Err(e) => error!(error = %e, "accept failed"),
        }
    }
}

/// Binds from environment configuration and runs the accept loop.
pub async fn run_with_config() -> io::Result<()> {
    let addr = format!("{}:{}", config::host(), config::port());
    let listener = TcpListener::bind(&addr).await?;
    run(listener).await
}
