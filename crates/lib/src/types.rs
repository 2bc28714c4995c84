//! Users, roles and grants.

use chrono::{DateTime, Utc};

use crate::{constants::ROLE_WIDE_SUBJECT, credential::Credential};

/// A named group of users. Role names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Role {
    pub role_id: String,
    pub name: String,
}

impl Role {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            role_id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }

    /// True for the placeholder attached to grants whose role is unknown.
    pub fn is_unknown(&self) -> bool {
        self.role_id.is_empty()
    }
}

/// A principal, identified by email, holding exactly one role.
///
/// Several versions of a user may be stored; the most recently appended one
/// is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub role_id: String,
    pub(crate) credential: Credential,
}

impl User {
    /// The stored credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

/// Who a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Any user holding the grant's role.
    RoleWide,
    /// One specific user, by user_id.
    User(String),
}

impl Subject {
    /// The value written to the subject column.
    pub fn as_stored(&self) -> &str {
        match self {
            Subject::RoleWide => ROLE_WIDE_SUBJECT,
            Subject::User(user_id) => user_id,
        }
    }

    /// Parse the subject column; the empty string is role-wide.
    pub fn from_stored(value: &str) -> Self {
        if value == ROLE_WIDE_SUBJECT {
            Subject::RoleWide
        } else {
            Subject::User(value.to_string())
        }
    }
}

/// Time-bounded permission for a subject holding `role` to access `resource`.
///
/// `resource` is a path or URL, e.g. `file:/etc/userd/user.conf` or
/// `https://example.org/userd/user.conf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub resource: String,
    pub subject: Subject,
    pub role: Role,
    pub granted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Grant {
    /// Whether the grant requires the role with `role_id`.
    pub fn matches_role(&self, role_id: &str) -> bool {
        self.role.role_id == role_id
    }

    /// Whether the grant expires strictly after `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
