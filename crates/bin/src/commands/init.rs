//! First-run setup: the admin role and the first admin user.

use userd::{auth::AuthError, constants::ADMIN_ROLE};

use super::{CommandResult, open_directory, password_or_prompt};
use crate::cli::InitArgs;

pub fn run(location: &str, args: &InitArgs) -> CommandResult {
    let directory = open_directory(location)?;
    if directory.has_users()? {
        return Err(format!(
            "{} already has users; refusing to initialize",
            directory.store().location()
        )
        .into());
    }

    let password = match &args.password {
        Some(password) => password.clone(),
        None => {
            let password = password_or_prompt(None, "Admin password: ")?;
            let confirmation = password_or_prompt(None, "Confirm password: ")?;
            if password != confirmation {
                return Err(AuthError::PasswordMismatch.into());
            }
            password
        }
    };

    let role_id = match directory.resolve_role_id(ADMIN_ROLE) {
        Ok(role_id) => role_id,
        Err(e) if e.is_not_found() => directory.create_role(ADMIN_ROLE)?.role_id,
        Err(e) => return Err(e.into()),
    };
    let user = directory.create_user(&args.email, &password, &args.description, &role_id)?;
    println!("Created admin user {} ({})", user.email, user.user_id);
    Ok(())
}
