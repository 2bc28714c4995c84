use std::path::Path;

use rustls::pki_types::ServerName;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};
use tokio_rustls::TlsConnector;

use super::{ServerError, tls};
use crate::{
    Result,
    protocol::{Command, Response},
};

/// One-shot client for the protocol server.
#[derive(Clone)]
pub struct Client {
    addr: String,
    server_name: ServerName<'static>,
    connector: TlsConnector,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("addr", &self.addr)
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// A client for the server at `addr` whose certificate is issued for
    /// `server_name` and chains to the PEM certificate(s) in `ca_cert`.
    pub fn new(addr: impl Into<String>, server_name: &str, ca_cert: &Path) -> Result<Self> {
        let server_name = ServerName::try_from(server_name.to_string()).map_err(|_| {
            ServerError::InvalidServerName {
                name: server_name.to_string(),
            }
        })?;
        Ok(Self {
            addr: addr.into(),
            server_name,
            connector: tls::connector(ca_cert)?,
        })
    }

    /// Send `command` on a fresh connection and wait for the response.
    pub async fn send(&self, command: &Command) -> Result<Response> {
        self.send_raw(&command.encode()?).await
    }

    /// Send an already encoded request.
    pub async fn send_raw(&self, request: &[u8]) -> Result<Response> {
        let connection_error = |source: std::io::Error| ServerError::Connection {
            peer: self.addr.clone(),
            source,
        };
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(connection_error)?;
        let mut tls = self
            .connector
            .connect(self.server_name.clone(), stream)
            .await
            .map_err(connection_error)?;

        tls.write_all(request).await?;
        tls.flush().await?;

        let mut reply = Vec::new();
        tls.read_to_end(&mut reply).await?;
        Response::decode(&reply)
    }
}
