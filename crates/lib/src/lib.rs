//!
//! userd: identity and access control backed by append-only record files.
//!
//! ## Core Concepts
//!
//! * **Records (`types`)**: users, roles and time-bounded grants. Each kind
//!   lives in its own CSV file under a storage root; records are only ever
//!   appended, and the latest version of a user wins on reload.
//! * **Store (`store::Store`)**: materializes the record files into in-memory
//!   tables, reloads them before each operation and appends under advisory
//!   file locks so several processes can share one root.
//! * **Directory (`auth::Directory`)**: the operations: create roles, users
//!   and grants, authenticate, authorize access to a resource and change
//!   passwords.
//! * **Credentials (`credential::Credential`)**: a per-user random secret and
//!   salt with an HMAC-SHA256 password hash, compared in constant time.
//! * **Protocol and server (`protocol`, `server`)**: a JSON request/response
//!   exchange over TLS that exposes authorization to remote callers.

pub mod auth;
pub mod clock;
pub mod constants;
pub mod credential;
pub mod protocol;
pub mod server;
pub mod store;
pub mod types;

pub use auth::Directory;
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use types::{Grant, Role, Subject, User};

/// Result type used throughout the userd library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the userd library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured authentication errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured network errors from the server module
    #[error(transparent)]
    Server(server::ServerError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::Store(_) => "store",
            Error::Server(_) => "server",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a user, role or grant was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_already_exists(),
            _ => false,
        }
    }

    /// Check if this error means the credentials were not accepted.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            Error::Server(server_err) => server_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error comes from a malformed record file.
    pub fn is_parse_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_parse_error(),
            _ => false,
        }
    }
}
