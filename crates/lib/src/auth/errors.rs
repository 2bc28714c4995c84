//! Authentication and authorization error types.
//!
//! This module defines structured error types for credential checks, role
//! checks and grant decisions, so callers can branch on the failure instead of
//! matching message strings.

use thiserror::Error as ThisError;

use crate::Error;

/// Errors that can occur during authentication and authorization.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// No user with this email (or user_id) exists.
    #[error("User not found: {user}")]
    UserNotFound {
        /// The email or user_id that was looked up
        user: String,
    },

    /// No role with this name (or role_id) exists.
    #[error("Role not found: {role}")]
    RoleNotFound {
        /// The role name or role_id that was looked up
        role: String,
    },

    /// No grant exists for the resource, neither for the user nor role-wide.
    #[error("No permission found for resource {resource}")]
    PermissionNotFound { resource: String },

    /// A user with this email already exists.
    #[error("User already exists: {email}")]
    UserAlreadyExists { email: String },

    /// A role with this name already exists.
    #[error("Role already exists: {name}")]
    RoleAlreadyExists { name: String },

    /// The password does not match the stored credential.
    #[error("Password does not match")]
    InvalidCredentials,

    /// The user is authenticated but holds the wrong role.
    #[error("Role mismatch for {email}: {reason}")]
    RoleMismatch { email: String, reason: String },

    /// Every grant for the user's role has expired.
    #[error("Permission for resource {resource} has expired")]
    PermissionExpired { resource: String },

    /// New password and its confirmation differ.
    #[error("New password and confirmation do not match")]
    PasswordMismatch,

    /// The operating system could not supply random bytes.
    #[error("Failed to gather randomness: {reason}")]
    Entropy { reason: String },

    /// The stored secret was rejected as an HMAC key.
    #[error("Invalid credential key: {reason}")]
    InvalidKey { reason: String },
}

impl AuthError {
    /// Check if this error indicates a user, role or grant was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AuthError::UserNotFound { .. }
                | AuthError::RoleNotFound { .. }
                | AuthError::PermissionNotFound { .. }
        )
    }

    /// Check if this error indicates a uniqueness violation.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            AuthError::UserAlreadyExists { .. } | AuthError::RoleAlreadyExists { .. }
        )
    }

    /// Check if this error means the credentials were not accepted.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            AuthError::UserNotFound { .. } | AuthError::InvalidCredentials
        )
    }

    /// Check if this error means an authenticated user was refused access.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            AuthError::RoleMismatch { .. }
                | AuthError::PermissionNotFound { .. }
                | AuthError::PermissionExpired { .. }
        )
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
