use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::{sync::oneshot, task::JoinHandle};
use userd::{
    Directory,
    constants::{REQUEST_TIMEOUT_SECS, SERVER_CERT_FILE, SERVER_KEY_FILE},
    server::{Client, Server, ServerConfig},
};

/// Write a self-signed certificate for `localhost` into `dir`.
pub fn write_certificate(dir: &Path) -> PathBuf {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .expect("Failed to generate certificate");
    let cert_path = dir.join(SERVER_CERT_FILE);
    std::fs::write(&cert_path, cert.pem()).expect("Failed to write certificate");
    std::fs::write(dir.join(SERVER_KEY_FILE), key_pair.serialize_pem())
        .expect("Failed to write key");
    cert_path
}

/// A running server and a client that trusts it.
pub struct TestServer {
    pub addr: String,
    pub client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<userd::Result<()>>>,
    _certs: tempfile::TempDir,
}

impl TestServer {
    pub async fn start(directory: Directory) -> Self {
        Self::start_with_timeout(directory, Duration::from_secs(REQUEST_TIMEOUT_SECS)).await
    }

    pub async fn start_with_timeout(directory: Directory, request_timeout: Duration) -> Self {
        let certs = tempfile::tempdir().expect("Failed to create cert dir");
        let cert_path = write_certificate(certs.path());

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout,
            ..ServerConfig::new(certs.path())
        };
        let server = Server::bind(&config, directory)
            .await
            .expect("Failed to bind server");
        let addr = server.local_addr().expect("Server has no address");

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = signal.await;
        }));

        let client = Client::new(addr.to_string(), "localhost", &cert_path)
            .expect("Failed to create client");
        Self {
            addr: addr.to_string(),
            client,
            shutdown: Some(shutdown),
            handle: Some(handle),
            _certs: certs,
        }
    }

    /// Stop accepting and wait for the accept loop to return.
    pub async fn stop(mut self) -> userd::Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("Server task panicked"),
            None => Ok(()),
        }
    }
}
