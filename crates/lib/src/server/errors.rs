//! Transport error types for the protocol server and client.

use thiserror::Error as ThisError;

use crate::Error;

/// Errors raised while setting up TLS, binding, or exchanging messages.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum ServerError {
    /// Certificate, key or TLS configuration could not be loaded.
    #[error("TLS setup failed: {reason}")]
    Tls { reason: String },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connecting, or the TLS handshake with a peer, failed.
    #[error("Connection with {peer} failed: {source}")]
    Connection {
        peer: String,
        #[source]
        source: std::io::Error,
    },

    /// The peer did not complete the handshake or send its request in time.
    #[error("Connection with {peer} timed out")]
    Timeout { peer: String },

    #[error("Invalid TLS server name: {name}")]
    InvalidServerName { name: String },
}

impl ServerError {
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            ServerError::Bind { .. }
                | ServerError::Connection { .. }
                | ServerError::Timeout { .. }
        )
    }

    pub fn is_tls_error(&self) -> bool {
        matches!(
            self,
            ServerError::Tls { .. } | ServerError::InvalidServerName { .. }
        )
    }
}

impl From<ServerError> for Error {
    fn from(err: ServerError) -> Self {
        Error::Server(err)
    }
}
