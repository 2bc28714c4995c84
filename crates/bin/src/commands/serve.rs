//! Serve command - runs the TLS authorization server.

use std::time::Duration;

use tokio::signal::unix::{SignalKind, signal};
use userd::server::{Server, ServerConfig};

use super::{CommandResult, open_directory};
use crate::cli::ServeArgs;

/// Run the server until SIGINT or SIGTERM.
pub async fn run(location: &str, args: &ServeArgs) -> CommandResult {
    let directory = open_directory(location)?;
    let cert_dir = args
        .cert_dir
        .clone()
        .unwrap_or_else(|| directory.store().location().root().to_path_buf());

    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        cert_dir,
        request_timeout: Duration::from_secs(args.request_timeout),
    };
    let server = Server::bind(&config, directory).await?;
    println!("userd authorization server listening on {}", server.local_addr()?);
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    server
        .run_until(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down"),
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}
