//! calcd: a dual-transport binary arithmetic server
//!
//! Listens on a Unix-domain socket and a TCP port at the same time. A
//! client sends one fixed 20-byte request (two 32-bit operands and an
//! operator), receives one 20-byte reply, and the connection is closed.
//! A single readiness-multiplexing loop serves requests one at a time;
//! SIGINT shuts the loop down cleanly and removes the socket path.

mod calc;
mod codec;
mod config;
mod handler;
mod listener;
mod server;
mod shutdown;

use clap::Parser;
use config::Config;
use server::Server;
use signal_hook::consts::SIGINT;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        socket = %config.socket.display(),
        port = config.port,
        "Starting calcd"
    );

    let local = listener::bind_local(&config.socket)?;
    let tcp = listener::bind_tcp(config.port)?;

    // The pipe receiver is registered with the poll before the signal is
    // installed, so a signal arriving at any point after this is never
    // lost.
    let (trigger, shutdown) = shutdown::channel()?;
    let mut server = Server::new(local, tcp, shutdown)?;
    trigger.install(SIGINT)?;

    info!(port = server.tcp_addr()?.port(), "Listening on both endpoints");
    server.run()?;

    server.cleanup(&config.socket)?;
    info!("Server terminated");
    Ok(())
}
