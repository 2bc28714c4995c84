//! Record store
//!
//! Users, roles and grants live in three append-only CSV files under a storage
//! root and are materialized into in-memory tables. The files may be shared by
//! several processes, so the tables are rebuilt from disk by [`Store::refresh`]
//! before every operation, and appends to an existing file take an exclusive
//! advisory lock.

use std::{
    collections::HashMap,
    fs::{File, OpenOptions},
    io::{ErrorKind, Write},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard},
};

use tracing::debug;

pub mod errors;
pub mod location;
pub mod lock;
pub mod records;

pub use errors::StoreError;
pub use location::{Location, Protocol};
pub use lock::ScopedLock;
pub use records::{Record, RecordKind};

use crate::{
    Result,
    types::{Grant, Role, Subject, User},
};

/// Grants by subject, then by resource, in the order they were appended.
type GrantTable = HashMap<String, HashMap<String, Vec<Grant>>>;

#[derive(Debug, Default)]
struct Tables {
    /// Latest user version by email.
    users: HashMap<String, User>,
    /// Roles by role_id.
    roles: HashMap<String, Role>,
    grants: GrantTable,
}

impl Tables {
    fn insert(&mut self, record: Record) {
        match record {
            Record::User(user) => {
                self.users.insert(user.email.clone(), user);
            }
            Record::Role(role) => {
                self.roles.insert(role.role_id.clone(), role);
            }
            Record::Grant(grant) => {
                self.grants
                    .entry(grant.subject.as_stored().to_string())
                    .or_default()
                    .entry(grant.resource.clone())
                    .or_default()
                    .push(grant);
            }
        }
    }
}

/// Shared record tables backed by the files at one [`Location`].
#[derive(Debug)]
pub struct Store {
    location: Location,
    tables: RwLock<Tables>,
    writer: Mutex<()>,
}

impl Store {
    /// Resolve `location`, create its root if needed, and load every record.
    pub fn open(location: &str) -> Result<Self> {
        Self::at(Location::parse(location)?)
    }

    /// Open a store at an already parsed location.
    pub fn at(location: Location) -> Result<Self> {
        location.ensure_root()?;
        let store = Self {
            location,
            tables: RwLock::new(Tables::default()),
            writer: Mutex::new(()),
        };
        store.refresh()?;
        Ok(store)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Rebuild the tables from the record files.
    ///
    /// A missing file loads as an empty table. The current tables are left
    /// untouched if any file fails to load.
    ///
    /// Files are read under the table write lock, so a published snapshot is
    /// never replaced by an older one.
    pub fn refresh(&self) -> Result<()> {
        let mut current = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut tables = Tables::default();
        for kind in RecordKind::LOAD_ORDER {
            self.load(kind, &mut tables)?;
        }
        debug!(
            root = %self.location.root().display(),
            users = tables.users.len(),
            roles = tables.roles.len(),
            subjects = tables.grants.len(),
            "refreshed record tables"
        );
        *current = tables;
        Ok(())
    }

    fn load(&self, kind: RecordKind, tables: &mut Tables) -> Result<()> {
        let path = self.location.path_for(kind);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "record file absent, starting empty");
                return Ok(());
            }
            Err(source) => return Err(StoreError::Io { path, source }.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1);
            let decoded = match kind {
                RecordKind::User => records::decode_user(&row).map(Record::User),
                RecordKind::Role => records::decode_role(&row).map(Record::Role),
                RecordKind::Grant => {
                    records::decode_grant(&row, &tables.roles).map(Record::Grant)
                }
            };
            let record = decoded.map_err(|reason| StoreError::Parse {
                path: path.clone(),
                line,
                reason,
            })?;
            tables.insert(record);
        }
        Ok(())
    }

    /// Take the in-process writer slot.
    ///
    /// Callers hold the returned writer across refresh, uniqueness checks and
    /// the append, so check-then-write sequences in one process never
    /// interleave. Other processes are excluded per append by file locks.
    pub fn begin_write(&self) -> StoreWriter<'_> {
        StoreWriter {
            store: self,
            _guard: self.writer.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest version of the user with `email`.
    pub fn user(&self, email: &str) -> Option<User> {
        self.read().users.get(email).cloned()
    }

    pub fn user_by_id(&self, user_id: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|u| u.user_id == user_id)
            .cloned()
    }

    pub fn user_count(&self) -> usize {
        self.read().users.len()
    }

    pub fn role(&self, role_id: &str) -> Option<Role> {
        self.read().roles.get(role_id).cloned()
    }

    pub fn role_by_name(&self, name: &str) -> Option<Role> {
        self.read()
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned()
    }

    /// All roles, sorted by name.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.read().roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    /// Grants for `resource` filed under `subject`, or `None` if there are none.
    pub fn grants(&self, subject: &Subject, resource: &str) -> Option<Vec<Grant>> {
        self.read()
            .grants
            .get(subject.as_stored())
            .and_then(|by_resource| by_resource.get(resource))
            .cloned()
    }
}

/// Exclusive in-process write access to a [`Store`].
#[derive(Debug)]
pub struct StoreWriter<'a> {
    store: &'a Store,
    _guard: MutexGuard<'a, ()>,
}

impl StoreWriter<'_> {
    /// Append `record` to its file and make it visible in the tables.
    ///
    /// The encoded line is written with a single `write_all`, so a failed
    /// append never leaves a partial line behind.
    pub fn append(&self, record: Record) -> Result<()> {
        let path = self.store.location.path_for(record.kind());
        let line = record.encode_line().map_err(|source| StoreError::Csv {
            path: path.clone(),
            source,
        })?;

        // A refresh must not run between the file write and the insert.
        let mut tables = self
            .store
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        append_line(&path, &line)?;
        debug!(path = %path.display(), kind = ?record.kind(), "appended record");
        tables.insert(record);
        Ok(())
    }
}

fn append_line(path: &Path, line: &[u8]) -> std::result::Result<(), StoreError> {
    let io_error = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    // The first writer of a file bootstraps it without a lock.
    let existed = path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;
    let _lock = if existed {
        Some(ScopedLock::try_acquire(&file, path)?)
    } else {
        None
    };

    let mut writer = &file;
    writer.write_all(line).map_err(io_error)?;
    writer.flush().map_err(io_error)
}
