use userd::protocol::Response;

use super::{CommandResult, open_directory, password_or_prompt};
use crate::{cli::IsAuthorizedArgs, output::OutputFormat};

pub fn is_authorized(location: &str, args: &IsAuthorizedArgs, format: OutputFormat) -> CommandResult {
    let directory = open_directory(location)?;
    let password = password_or_prompt(args.password.as_deref(), "Password: ")?;
    let result = directory.authorize(&args.email, &password, &args.resource);

    match (&result, format) {
        (Ok(()), OutputFormat::Human) => println!("Success"),
        (Ok(()), OutputFormat::Json) => {
            println!("{}", String::from_utf8_lossy(&Response::success().encode()?))
        }
        (Err(e), OutputFormat::Json) => println!(
            "{}",
            String::from_utf8_lossy(&Response::system_error(e.to_string()).encode()?)
        ),
        (Err(_), OutputFormat::Human) => {}
    }
    result.map_err(Into::into)
}
