use userd::{Directory, Subject};

use super::{CommandResult, open_as_admin};
use crate::cli::AssignFpArgs;

pub fn assign(location: &str, args: &AssignFpArgs) -> CommandResult {
    let directory = open_as_admin(location, &args.admin)?;
    let (subject, role_id) = resolve_target(&directory, args)?;
    let grant = directory.create_grant(&args.resource, subject, &role_id, args.expiration)?;

    let holder = match &grant.subject {
        Subject::RoleWide => format!("role {}", grant.role.name),
        Subject::User(_) => format!(
            "{} (role {})",
            args.email.as_deref().unwrap_or_default(),
            grant.role.name
        ),
    };
    println!(
        "Granted {holder} access to {} until {}",
        grant.resource, grant.expires_at
    );
    Ok(())
}

/// A user grant defaults to the user's own role; a role-wide grant needs one.
fn resolve_target(directory: &Directory, args: &AssignFpArgs) -> CommandResult<(Subject, String)> {
    match &args.email {
        Some(email) => {
            let user = directory.find_user(email)?;
            let role_id = match &args.role {
                Some(name) => directory.resolve_role_id(name)?,
                None => user.role_id.clone(),
            };
            Ok((Subject::User(user.user_id), role_id))
        }
        None => {
            let name = args
                .role
                .as_deref()
                .ok_or("--role is required when no --email is given")?;
            Ok((Subject::RoleWide, directory.resolve_role_id(name)?))
        }
    }
}
