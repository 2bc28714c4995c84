use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let serving = matches!(cli.command, Commands::Serve(_));
    let default_level = if cli.verbose || serving {
        "userd=info"
    } else {
        "userd=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> commands::CommandResult {
    let location = cli.location.as_str();
    let format = OutputFormat::from_flag(cli.json);

    match &cli.command {
        Commands::Init(args) => commands::init::run(location, args),
        Commands::CreateRole(args) => commands::roles::create(location, args, format),
        Commands::CreateUser(args) => commands::users::create(location, args),
        Commands::ListRoles(args) => commands::roles::list(location, args, format),
        Commands::AssignFp(args) => commands::grants::assign(location, args),
        Commands::IsAuthorized(args) => commands::access::is_authorized(location, args, format),
        Commands::ChangePassword(args) => commands::users::change_password(location, args),
        Commands::Serve(args) => commands::serve::run(location, args).await,
        Commands::Check(args) => commands::check::run(args, format).await,
    }
}
