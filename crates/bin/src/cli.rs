//! CLI argument definitions for the userd binary.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use userd::constants::{DEFAULT_LOCATION, DEFAULT_PORT, REQUEST_TIMEOUT_SECS};

/// userd: users, roles and time-bounded resource grants
#[derive(Parser, Debug)]
#[command(name = "userd")]
#[command(about = "userd: identity and access control backed by record files")]
#[command(version)]
pub struct Cli {
    /// Storage location, e.g. file:///etc/userd (a bare path is treated as file://)
    #[arg(short = 'L', long, global = true, default_value = DEFAULT_LOCATION, env = "USERD_LOCATION")]
    pub location: String,

    /// Log informational events
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the admin role and the first admin user
    Init(InitArgs),
    /// Create a role
    CreateRole(CreateRoleArgs),
    /// Create a user holding an existing role
    CreateUser(CreateUserArgs),
    /// List all roles
    ListRoles(ListRolesArgs),
    /// Grant access to a resource until the end of a given day (UTC)
    AssignFp(AssignFpArgs),
    /// Check whether a user may access a resource
    IsAuthorized(IsAuthorizedArgs),
    /// Change a user's password
    ChangePassword(ChangePasswordArgs),
    /// Run the TLS authorization server
    Serve(ServeArgs),
    /// Ask a running authorization server whether a user may access a resource
    Check(CheckArgs),
}

/// Credentials of a user holding the admin role.
#[derive(clap::Args, Debug)]
pub struct AdminArgs {
    #[arg(long, env = "USERD_ADMIN_EMAIL")]
    pub admin_email: String,

    /// Prompted for when omitted
    #[arg(long, env = "USERD_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Email of the first admin user
    #[arg(long, env = "USERD_ADMIN_EMAIL")]
    pub email: String,

    /// Prompted for (twice) when omitted
    #[arg(long, env = "USERD_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, default_value = "administrator")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct CreateRoleArgs {
    #[command(flatten)]
    pub admin: AdminArgs,

    #[arg(long)]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct CreateUserArgs {
    #[command(flatten)]
    pub admin: AdminArgs,

    #[arg(long)]
    pub email: String,

    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Name of the role the user holds
    #[arg(long)]
    pub role: String,
}

#[derive(clap::Args, Debug)]
pub struct ListRolesArgs {
    #[command(flatten)]
    pub admin: AdminArgs,
}

#[derive(clap::Args, Debug)]
pub struct AssignFpArgs {
    #[command(flatten)]
    pub admin: AdminArgs,

    /// Path or URL of the resource
    #[arg(long)]
    pub resource: String,

    /// Restrict the grant to this user; the role defaults to the user's role
    #[arg(long)]
    pub email: Option<String>,

    /// Name of the role the grant requires; needed for role-wide grants
    #[arg(long)]
    pub role: Option<String>,

    /// Last day of access, YYYY-MM-DD; the grant expires at 23:59:59 UTC
    #[arg(long, value_parser = parse_expiration)]
    pub expiration: DateTime<Utc>,
}

#[derive(clap::Args, Debug)]
pub struct IsAuthorizedArgs {
    #[arg(long)]
    pub email: String,

    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub resource: String,
}

#[derive(clap::Args, Debug)]
pub struct ChangePasswordArgs {
    #[arg(long)]
    pub email: String,

    /// Current password; prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,

    /// Prompted for when omitted
    #[arg(long)]
    pub new_password: Option<String>,

    /// Prompted for when omitted
    #[arg(long)]
    pub confirm_password: Option<String>,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "USERD_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "USERD_HOST")]
    pub host: String,

    /// Directory holding server.crt and server.key; defaults to the storage root
    #[arg(long, env = "USERD_CERT_DIR")]
    pub cert_dir: Option<PathBuf>,

    /// Seconds allowed for the TLS handshake and for reading a request
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS, env = "USERD_REQUEST_TIMEOUT")]
    pub request_timeout: u64,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Server address, host:port
    #[arg(long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
    pub addr: String,

    /// Name the server certificate is issued for
    #[arg(long, default_value = "localhost")]
    pub server_name: String,

    /// PEM certificate(s) to trust for the server
    #[arg(long)]
    pub ca_cert: PathBuf,

    #[arg(long)]
    pub email: String,

    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub resource: String,
}

/// Parse `YYYY-MM-DD` into the last second of that day, UTC.
pub fn parse_expiration(value: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))?;
    date.and_hms_opt(23, 59, 59)
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("no end of day for {value}"))
}
