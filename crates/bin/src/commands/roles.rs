use super::{CommandResult, open_as_admin};
use crate::{
    cli::{CreateRoleArgs, ListRolesArgs},
    output::{OutputFormat, print_roles},
};

pub fn create(location: &str, args: &CreateRoleArgs, format: OutputFormat) -> CommandResult {
    let directory = open_as_admin(location, &args.admin)?;
    let role = directory.create_role(&args.name)?;
    match format {
        OutputFormat::Human => println!("Created role {} ({})", role.name, role.role_id),
        OutputFormat::Json => print_roles(&[role], format)?,
    }
    Ok(())
}

pub fn list(location: &str, args: &ListRolesArgs, format: OutputFormat) -> CommandResult {
    let directory = open_as_admin(location, &args.admin)?;
    print_roles(&directory.list_roles()?, format)?;
    Ok(())
}
