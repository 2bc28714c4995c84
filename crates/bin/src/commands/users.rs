use super::{CommandResult, open_as_admin, open_directory, password_or_prompt};
use crate::cli::{ChangePasswordArgs, CreateUserArgs};

pub fn create(location: &str, args: &CreateUserArgs) -> CommandResult {
    let directory = open_as_admin(location, &args.admin)?;
    let role_id = directory.resolve_role_id(&args.role)?;
    let password = password_or_prompt(args.password.as_deref(), "Password for new user: ")?;
    let user = directory.create_user(&args.email, &password, &args.description, &role_id)?;
    println!("Created user {} ({})", user.email, user.user_id);
    Ok(())
}

pub fn change_password(location: &str, args: &ChangePasswordArgs) -> CommandResult {
    let directory = open_directory(location)?;
    let password = password_or_prompt(args.password.as_deref(), "Current password: ")?;
    let new_password = password_or_prompt(args.new_password.as_deref(), "New password: ")?;
    let confirmation =
        password_or_prompt(args.confirm_password.as_deref(), "Confirm new password: ")?;
    directory.change_password(&args.email, &password, &new_password, &confirmation)?;
    println!("Password changed for {}", args.email);
    Ok(())
}
