//! Constants used throughout the userd library.
//!
//! This module provides central definitions for file names, reserved values and
//! protocol limits shared by the store, the engine and the server.

/// Record file holding one line per user version.
pub const USER_FILE: &str = "user.conf";

/// Record file holding one line per role.
pub const ROLE_FILE: &str = "role.conf";

/// Record file holding one line per resource grant.
pub const GRANT_FILE: &str = "filepermission.conf";

/// The only storage protocol understood by [`crate::store::Location`].
pub const FILE_PROTOCOL: &str = "file";

/// Separator between protocol and path in a location string.
pub const PROTOCOL_SEPARATOR: &str = "://";

/// Location used when none is configured.
pub const DEFAULT_LOCATION: &str = "file:///etc/userd";

/// Subject value of a grant that applies to every user holding its role.
pub const ROLE_WIDE_SUBJECT: &str = "";

/// Name of the role created by first-run setup.
pub const ADMIN_ROLE: &str = "admin";

/// Random secret key material per user, in bytes.
pub const SECRET_LENGTH: usize = 8;

/// Random salt per user, in bytes (before base64 encoding).
pub const SALT_LENGTH: usize = 8;

/// Largest request the protocol server reads from a connection.
pub const MAX_REQUEST_BYTES: usize = 1024;

/// Seconds a client gets to finish the TLS handshake, and again to send its
/// request, before the server drops the connection.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default port of the protocol server.
pub const DEFAULT_PORT: u16 = 9669;

/// Certificate file expected in the server's certificate directory.
pub const SERVER_CERT_FILE: &str = "server.crt";

/// Private key file expected in the server's certificate directory.
pub const SERVER_KEY_FILE: &str = "server.key";
