//! Remote authorization check against a running server.

use userd::{protocol::Command, server::Client};

use super::{CommandResult, password_or_prompt};
use crate::{cli::CheckArgs, output::OutputFormat};

pub async fn run(args: &CheckArgs, format: OutputFormat) -> CommandResult {
    let password = password_or_prompt(args.password.as_deref(), "Password: ")?;
    let client = Client::new(args.addr.clone(), &args.server_name, &args.ca_cert)?;
    let response = client
        .send(&Command::is_authorized(&args.email, password, &args.resource))
        .await?;

    match format {
        OutputFormat::Human => println!("{:?}: {}", response.code, response.message),
        OutputFormat::Json => println!("{}", String::from_utf8_lossy(&response.encode()?)),
    }
    if response.is_success() {
        Ok(())
    } else {
        Err(response.message.into())
    }
}
