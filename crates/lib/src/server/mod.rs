//! TLS protocol server
//!
//! Exposes [`Directory::authorize`] to remote callers. Each accepted
//! connection carries exactly one request and one response:
//!
//! 1. TLS handshake
//! 2. a single read of at most [`MAX_REQUEST_BYTES`] holding a JSON [`Command`]
//! 3. the decision, computed on the blocking pool
//! 4. a single write of the JSON [`Response`], then TLS shutdown
//!
//! The handshake and the read are each bounded by
//! [`ServerConfig::request_timeout`].

use std::{future::Future, net::SocketAddr, path::PathBuf, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

mod client;
pub mod errors;
mod tls;

pub use client::Client;
pub use errors::ServerError;

use crate::{
    Result,
    auth::Directory,
    constants::{DEFAULT_PORT, MAX_REQUEST_BYTES, REQUEST_TIMEOUT_SECS},
    protocol::{Command, Response, handle_command},
};

/// Where to listen and where to find `server.crt` / `server.key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cert_dir: PathBuf,
    /// Limit on the TLS handshake, and separately on reading the request.
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Listen on all interfaces at the default port.
    pub fn new(cert_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cert_dir: cert_dir.into(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A bound protocol server.
pub struct Server {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    directory: Directory,
    request_timeout: Duration,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.listener.local_addr().ok())
            .field("directory", &self.directory)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Load the TLS identity and bind the listening socket.
    ///
    /// Fails if the certificate or key cannot be loaded, or the address cannot
    /// be bound.
    pub async fn bind(config: &ServerConfig, directory: Directory) -> Result<Self> {
        let acceptor = tls::acceptor(&config.cert_dir)?;
        let addr = config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!(addr = %listener.local_addr()?, "protocol server listening");
        Ok(Self {
            listener,
            acceptor,
            directory,
            request_timeout: config.request_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve connections forever.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve connections until `shutdown` resolves.
    ///
    /// Connections already accepted run to completion on their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("protocol server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let acceptor = self.acceptor.clone();
                        let directory = self.directory.clone();
                        let limit = self.request_timeout;
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(acceptor, directory, stream, peer, limit).await {
                                warn!(%peer, "connection failed: {e}");
                            }
                        });
                    }
                    Err(e) => warn!("failed to accept connection: {e}"),
                },
            }
        }
    }
}

async fn serve_connection(
    acceptor: TlsAcceptor,
    directory: Directory,
    stream: TcpStream,
    peer: SocketAddr,
    limit: Duration,
) -> Result<()> {
    let timed_out = |_: tokio::time::error::Elapsed| ServerError::Timeout {
        peer: peer.to_string(),
    };
    let mut tls = tokio::time::timeout(limit, acceptor.accept(stream))
        .await
        .map_err(timed_out)?
        .map_err(|source| ServerError::Connection {
            peer: peer.to_string(),
            source,
        })?;

    let mut buf = vec![0u8; MAX_REQUEST_BYTES];
    let read = tokio::time::timeout(limit, tls.read(&mut buf))
        .await
        .map_err(timed_out)??;
    let command = Command::decode(&buf[..read]);
    debug!(%peer, ?command, "received command");

    let response = tokio::task::spawn_blocking(move || handle_command(&directory, &command))
        .await
        .unwrap_or_else(|e| Response::system_error(format!("request handler failed: {e}")));

    tls.write_all(&response.encode()?).await?;
    tls.shutdown().await?;
    Ok(())
}
