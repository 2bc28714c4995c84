//! PEM loading and rustls configuration.

use std::{path::Path, sync::Arc};

use rustls::{
    RootCertStore,
    crypto::CryptoProvider,
    pki_types::{
        CertificateDer, PrivateKeyDer,
        pem::{self, PemObject},
    },
};
use tokio_rustls::{TlsAcceptor, TlsConnector};

use super::ServerError;
use crate::constants::{SERVER_CERT_FILE, SERVER_KEY_FILE};

fn tls_error(reason: impl std::fmt::Display) -> ServerError {
    ServerError::Tls {
        reason: reason.to_string(),
    }
}

fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

fn pem_error(what: &str, path: &Path, err: pem::Error) -> ServerError {
    match err {
        pem::Error::Io(e) => tls_error(format!("cannot read {}: {e}", path.display())),
        pem::Error::NoItemsFound => tls_error(format!("no {what} in {}", path.display())),
        other => tls_error(format!("invalid {what} in {}: {other}", path.display())),
    }
}

pub(crate) fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let certs = CertificateDer::pem_file_iter(path)
        .and_then(|iter| iter.collect::<Result<Vec<_>, _>>())
        .map_err(|e| pem_error("certificate", path, e))?;
    if certs.is_empty() {
        return Err(pem_error("certificate", path, pem::Error::NoItemsFound));
    }
    Ok(certs)
}

pub(crate) fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    PrivateKeyDer::from_pem_file(path).map_err(|e| pem_error("private key", path, e))
}

/// Acceptor presenting `server.crt` / `server.key` from `cert_dir`.
pub(crate) fn acceptor(cert_dir: &Path) -> Result<TlsAcceptor, ServerError> {
    let certs = load_certs(&cert_dir.join(SERVER_CERT_FILE))?;
    let key = load_key(&cert_dir.join(SERVER_KEY_FILE))?;
    let config = rustls::ServerConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()
        .map_err(tls_error)?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(tls_error)?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}

/// Connector trusting only the certificates in `ca_cert`.
pub(crate) fn connector(ca_cert: &Path) -> Result<TlsConnector, ServerError> {
    let mut roots = RootCertStore::empty();
    for cert in load_certs(ca_cert)? {
        roots.add(cert).map_err(tls_error)?;
    }
    let config = rustls::ClientConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()
        .map_err(tls_error)?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}
