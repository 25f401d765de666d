use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};
use time::Date;

/// Command-line arguments for the RUDRA binary.
#[derive(Debug, Parser)]
#[command(name = "rudra", version, about = "RUDRA network management admin console")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RUDRA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the admin console HTTP server.
    Serve(Box<ServeArgs>),
    /// Write the filtered audit trail to a CSV file.
    #[command(name = "export-audit")]
    ExportAudit(ExportAuditArgs),
    /// Read a password from stdin and print its hash.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),
}

/// Password hashing algorithm used for new hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PasswordScheme {
    #[default]
    Bcrypt,
    Argon2,
}

impl PasswordScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bcrypt => "bcrypt",
            Self::Argon2 => "argon2",
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct GraphQlOverride {
    /// Override the GraphQL endpoint URL.
    #[arg(long = "graphql-endpoint", value_name = "URL")]
    pub graphql_endpoint: Option<String>,

    /// Override the GraphQL request timeout.
    #[arg(long = "graphql-timeout-seconds", value_name = "SECONDS")]
    pub graphql_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub graphql: GraphQlOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Mark session cookies `Secure`.
    #[arg(
        long = "auth-secure-cookies",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub auth_secure_cookies: Option<bool>,

    /// Override the IANA time zone used to display timestamps.
    #[arg(long = "display-timezone", value_name = "ZONE")]
    pub display_timezone: Option<String>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct ExportAuditArgs {
    #[command(flatten)]
    pub graphql: GraphQlOverride,

    /// Override the IANA time zone used for date bounds and timestamps.
    #[arg(long = "display-timezone", value_name = "ZONE")]
    pub display_timezone: Option<String>,

    /// Keep only events of this category.
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Keep only events of this type.
    #[arg(long, value_name = "ACTION")]
    pub action: Option<String>,

    /// Case-insensitive match against the acting user.
    #[arg(long, value_name = "TEXT")]
    pub user: Option<String>,

    /// First day to include (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub start: Option<Date>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub end: Option<Date>,

    /// Destination file; defaults to `audit_trail_<date>.csv`.
    #[arg(long, short = 'o', value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct HashPasswordArgs {
    /// Algorithm to hash with; defaults to `auth.password_scheme`.
    #[arg(long, value_enum, value_name = "SCHEME")]
    pub scheme: Option<PasswordScheme>,
}

fn parse_date_arg(raw: &str) -> Result<Date, String> {
    rudra_api_types::parse_calendar_date(raw)
}
