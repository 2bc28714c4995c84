//! Storage locations of the form `file://<path>`.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use super::{RecordKind, StoreError};
use crate::constants::{FILE_PROTOCOL, PROTOCOL_SEPARATOR};

/// Transport used to reach the record files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Local filesystem.
    File,
}

/// A resolved storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    root: PathBuf,
    protocol: Protocol,
}

impl Location {
    /// Parse `file://<path>`; `file:///etc/userd` resolves to `/etc/userd`.
    pub fn parse(location: &str) -> Result<Self, StoreError> {
        let invalid = |reason: &str| StoreError::InvalidLocation {
            location: location.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = location.split(PROTOCOL_SEPARATOR).collect();
        let [protocol, path] = parts.as_slice() else {
            return Err(invalid("expected <protocol>://<path>"));
        };
        let protocol = match *protocol {
            FILE_PROTOCOL => Protocol::File,
            _ => return Err(invalid("unknown protocol")),
        };
        if path.is_empty() {
            return Err(invalid("empty path"));
        }

        Ok(Self {
            root: PathBuf::from(*path),
            protocol,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Path of the record file holding `kind`.
    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Create the root directory if it does not exist yet.
    pub(crate) fn ensure_root(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })
    }
}

impl FromStr for Location {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Protocol::File => write!(
                f,
                "{FILE_PROTOCOL}{PROTOCOL_SEPARATOR}{}",
                self.root.display()
            ),
        }
    }
}
