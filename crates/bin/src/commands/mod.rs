//! Subcommand implementations.

pub mod access;
pub mod check;
pub mod grants;
pub mod init;
pub mod roles;
pub mod serve;
pub mod users;

use userd::{
    Directory,
    auth::RoleRequirement,
    constants::{ADMIN_ROLE, FILE_PROTOCOL, PROTOCOL_SEPARATOR},
};

use crate::cli::AdminArgs;

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Treat a location without a protocol as a file path.
pub fn normalize_location(location: &str) -> String {
    if location.contains(PROTOCOL_SEPARATOR) {
        location.to_string()
    } else {
        format!("{FILE_PROTOCOL}{PROTOCOL_SEPARATOR}{location}")
    }
}

pub fn open_directory(location: &str) -> userd::Result<Directory> {
    Directory::open(&normalize_location(location))
}

/// Open the directory and require the caller to hold the admin role.
pub fn open_as_admin(location: &str, admin: &AdminArgs) -> CommandResult<Directory> {
    let directory = open_directory(location)?;
    let password = password_or_prompt(admin.admin_password.as_deref(), "Admin password: ")?;
    directory.authenticate_for_role(
        &admin.admin_email,
        &password,
        &RoleRequirement::named(ADMIN_ROLE),
    )?;
    Ok(directory)
}

pub fn password_or_prompt(password: Option<&str>, prompt: &str) -> std::io::Result<String> {
    match password {
        Some(password) => Ok(password.to_string()),
        None => rpassword::prompt_password(prompt),
    }
}
