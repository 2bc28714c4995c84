//! Authentication and authorization for userd
//!
//! This module provides the [`Directory`] of users, roles and grants, the
//! error taxonomy for credential and access decisions, and the grant
//! evaluation rules.

pub mod directory;
pub mod errors;
pub mod policy;

pub use directory::Directory;
pub use errors::AuthError;
pub use policy::{Decision, GrantMatching, RoleRequirement};
