//! Grant evaluation rules.

use chrono::{DateTime, Utc};

use crate::types::{Grant, Role};

/// How the role check and the expiry check combine across a grant set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrantMatching {
    /// One grant must both require the user's role and still be live.
    #[default]
    SingleGrant,
    /// Some grant must require the user's role and some grant, not
    /// necessarily the same one, must still be live. Matches the decisions of
    /// older userd deployments.
    Decoupled,
}

/// Outcome of evaluating a grant set for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No grant requires the user's role.
    RoleMismatch,
    /// Grants require the user's role but none is live.
    Expired,
}

/// Decide access for a user holding `role_id` at `now`.
///
/// The role check is reported before the expiry check.
pub fn evaluate(
    grants: &[Grant],
    role_id: &str,
    now: DateTime<Utc>,
    matching: GrantMatching,
) -> Decision {
    if !grants.iter().any(|g| g.matches_role(role_id)) {
        return Decision::RoleMismatch;
    }
    let live = match matching {
        GrantMatching::SingleGrant => grants
            .iter()
            .any(|g| g.matches_role(role_id) && g.is_live_at(now)),
        GrantMatching::Decoupled => grants.iter().any(|g| g.is_live_at(now)),
    };
    if live {
        Decision::Allow
    } else {
        Decision::Expired
    }
}

/// Role an operation requires of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// No role requirement; always met.
    Disregard,
    /// The user's role must carry this name.
    Named(String),
}

impl RoleRequirement {
    pub fn named(name: impl Into<String>) -> Self {
        RoleRequirement::Named(name.into())
    }

    /// Whether a user holding `role` (if it resolves) meets the requirement.
    pub fn is_met_by(&self, role: Option<&Role>) -> bool {
        match self {
            RoleRequirement::Disregard => true,
            RoleRequirement::Named(name) => role.is_some_and(|r| &r.name == name),
        }
    }
}
