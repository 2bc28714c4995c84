//! The user directory: account management, authentication and authorization
//! over a shared [`Store`].

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};

use super::{
    errors::AuthError,
    policy::{self, Decision, GrantMatching, RoleRequirement},
};
use crate::{
    Result,
    clock::{Clock, SystemClock},
    credential::Credential,
    store::{Record, Store},
    types::{Grant, Role, Subject, User},
};

#[derive(Debug)]
struct DirectoryInternal {
    store: Store,
    clock: Arc<dyn Clock>,
}

/// Identity and access-control operations over one storage location.
///
/// Every operation first reloads the record files, so changes made by other
/// processes sharing the location are observed. Mutating operations are
/// serialized within the process and append a single record each.
///
/// Directory is a cheap-to-clone handle; clones share the same tables.
///
/// ## Example
///
/// ```
/// # fn main() -> userd::Result<()> {
/// # let dir = tempfile::tempdir().unwrap();
/// # let location = format!("file://{}", dir.path().display());
/// let directory = userd::Directory::open(&location)?;
///
/// let admin = directory.create_role("admin")?;
/// directory.create_user("root@example.org", "s3cret", "first admin", &admin.role_id)?;
///
/// let user = directory.authenticate("root@example.org", "s3cret")?;
/// assert_eq!(user.role_id, admin.role_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Directory {
    inner: Arc<DirectoryInternal>,
    matching: GrantMatching,
}

impl Directory {
    /// Open the directory at `location` (e.g. `file:///etc/userd`).
    pub fn open(location: &str) -> Result<Self> {
        Ok(Self::from_store(Store::open(location)?, Arc::new(SystemClock)))
    }

    /// Open the directory with a custom clock.
    ///
    /// Only available with the `testing` feature or in test builds.
    #[cfg(any(test, feature = "testing"))]
    pub fn open_with_clock(location: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self::from_store(Store::open(location)?, clock))
    }

    /// Wrap an already opened store.
    pub fn from_store(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(DirectoryInternal { store, clock }),
            matching: GrantMatching::default(),
        }
    }

    /// Use `matching` when evaluating grants in [`Directory::authorize`].
    pub fn with_grant_matching(mut self, matching: GrantMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn grant_matching(&self) -> GrantMatching {
        self.matching
    }

    fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Create a role with a unique `name`.
    pub fn create_role(&self, name: &str) -> Result<Role> {
        let store = self.store();
        let writer = store.begin_write();
        store.refresh()?;

        if store.role_by_name(name).is_some() {
            return Err(AuthError::RoleAlreadyExists {
                name: name.to_string(),
            }
            .into());
        }

        let role = Role::new(name);
        writer.append(Record::Role(role.clone()))?;
        info!(role = %role.name, role_id = %role.role_id, "created role");
        Ok(role)
    }

    /// Create a user holding the existing role `role_id`.
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        description: &str,
        role_id: &str,
    ) -> Result<User> {
        let store = self.store();
        let writer = store.begin_write();
        store.refresh()?;

        if store.role(role_id).is_none() {
            return Err(AuthError::RoleNotFound {
                role: role_id.to_string(),
            }
            .into());
        }
        if store.user(email).is_some() {
            return Err(AuthError::UserAlreadyExists {
                email: email.to_string(),
            }
            .into());
        }

        let user = User {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            description: description.to_string(),
            created_at: self.now(),
            role_id: role_id.to_string(),
            credential: Credential::issue(password)?,
        };
        writer.append(Record::User(user.clone()))?;
        info!(email = %user.email, user_id = %user.user_id, "created user");
        Ok(user)
    }

    /// Grant holders of `role_id` access to `resource` until `expires_at`.
    ///
    /// A [`Subject::User`] grant applies to that user only; the user must exist.
    pub fn create_grant(
        &self,
        resource: &str,
        subject: Subject,
        role_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Grant> {
        let store = self.store();
        let writer = store.begin_write();
        store.refresh()?;

        let role = store.role(role_id).ok_or_else(|| AuthError::RoleNotFound {
            role: role_id.to_string(),
        })?;
        if let Subject::User(user_id) = &subject
            && store.user_by_id(user_id).is_none()
        {
            return Err(AuthError::UserNotFound {
                user: user_id.clone(),
            }
            .into());
        }

        let grant = Grant {
            resource: resource.to_string(),
            subject,
            role,
            granted_at: self.now(),
            expires_at: expires_at.trunc_subsecs(0),
        };
        writer.append(Record::Grant(grant.clone()))?;
        info!(
            resource = %grant.resource,
            subject = ?grant.subject,
            role = %grant.role.name,
            expires_at = %grant.expires_at,
            "created grant"
        );
        Ok(grant)
    }

    /// Check `password` against the latest version of the user with `email`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        self.store().refresh()?;
        self.verify_loaded(email, password)
    }

    /// Authenticate, then require the user's role to satisfy `requirement`.
    pub fn authenticate_for_role(
        &self,
        email: &str,
        password: &str,
        requirement: &RoleRequirement,
    ) -> Result<User> {
        let user = self.authenticate(email, password)?;
        let role = self.store().role(&user.role_id);
        if !requirement.is_met_by(role.as_ref()) {
            let reason = match requirement {
                RoleRequirement::Named(name) => format!("role {name} required"),
                RoleRequirement::Disregard => String::new(),
            };
            warn!(email, %reason, "role requirement not met");
            return Err(AuthError::RoleMismatch {
                email: email.to_string(),
                reason,
            }
            .into());
        }
        Ok(user)
    }

    /// Authenticate, then decide access to `resource`.
    ///
    /// Grants filed under the user's id are consulted; only when the user has
    /// none for `resource` are role-wide grants used.
    pub fn authorize(&self, email: &str, password: &str, resource: &str) -> Result<()> {
        let user = self.authenticate(email, password)?;
        let store = self.store();

        let grants = store
            .grants(&Subject::User(user.user_id.clone()), resource)
            .or_else(|| store.grants(&Subject::RoleWide, resource))
            .ok_or_else(|| AuthError::PermissionNotFound {
                resource: resource.to_string(),
            })?;

        match policy::evaluate(&grants, &user.role_id, self.now(), self.matching) {
            Decision::Allow => {
                debug!(email, resource, "access granted");
                Ok(())
            }
            Decision::RoleMismatch => Err(AuthError::RoleMismatch {
                email: email.to_string(),
                reason: format!("no grant for {resource} requires the user's role"),
            }
            .into()),
            Decision::Expired => Err(AuthError::PermissionExpired {
                resource: resource.to_string(),
            }
            .into()),
        }
    }

    /// Replace the user's password, keeping its secret and salt.
    ///
    /// `new_password` and `confirmation` must match before anything is read.
    pub fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
        confirmation: &str,
    ) -> Result<User> {
        if new_password != confirmation {
            return Err(AuthError::PasswordMismatch.into());
        }

        let store = self.store();
        let writer = store.begin_write();
        store.refresh()?;

        let user = self.verify_loaded(email, old_password)?;
        let credential = user.credential.rehash(new_password)?;
        let updated = User { credential, ..user };
        writer.append(Record::User(updated.clone()))?;
        info!(email, "changed password");
        Ok(updated)
    }

    /// All roles, sorted by name.
    pub fn list_roles(&self) -> Result<Vec<Role>> {
        self.store().refresh()?;
        Ok(self.store().roles())
    }

    /// The role_id of the role called `name`.
    pub fn resolve_role_id(&self, name: &str) -> Result<String> {
        self.store().refresh()?;
        self.store()
            .role_by_name(name)
            .map(|role| role.role_id)
            .ok_or_else(|| {
                AuthError::RoleNotFound {
                    role: name.to_string(),
                }
                .into()
            })
    }

    /// Latest version of the user with `email`.
    pub fn find_user(&self, email: &str) -> Result<User> {
        self.store().refresh()?;
        self.store().user(email).ok_or_else(|| {
            AuthError::UserNotFound {
                user: email.to_string(),
            }
            .into()
        })
    }

    /// Whether any user has been created yet.
    pub fn has_users(&self) -> Result<bool> {
        self.store().refresh()?;
        Ok(self.store().user_count() > 0)
    }

    fn verify_loaded(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .store()
            .user(email)
            .ok_or_else(|| AuthError::UserNotFound {
                user: email.to_string(),
            })?;
        if !user.credential.verify(password) {
            warn!(email, "rejected credentials");
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user)
    }
}
