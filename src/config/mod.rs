//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, str::FromStr, time::Duration};

use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::paging::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS};

mod cli;

pub use cli::*;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "rudra";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:8080/v1/graphql";
const DEFAULT_GRAPHQL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
const DEFAULT_BRAND_TITLE: &str = "Future Konnect";

/// Variables understood by existing deployments of the console.
const HASURA_ENDPOINT_VAR: &str = "HASURA_ENDPOINT";
const HASURA_ADMIN_SECRET_VAR: &str = "HASURA_ADMIN_SECRET";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub graphql: GraphQlSettings,
    pub auth: AuthSettings,
    pub audit: AuditSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Clone)]
pub struct GraphQlSettings {
    pub endpoint: Url,
    pub admin_secret: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for GraphQlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub password_scheme: PasswordScheme,
    pub bcrypt_cost: u32,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub rows_per_page: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub timezone: Tz,
    pub brand_title: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("RUDRA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_hasura_env(|name| std::env::var(name).ok());

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::ExportAudit(args)) => {
            raw.apply_graphql_override(&args.graphql);
            if let Some(zone) = args.display_timezone.as_ref() {
                raw.display.timezone = Some(zone.clone());
            }
        }
        Some(Command::HashPassword(_)) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    graphql: RawGraphQlSettings,
    auth: RawAuthSettings,
    audit: RawAuditSettings,
    display: RawDisplaySettings,
}

impl RawSettings {
    /// `HASURA_*` variables fill in only what the layered sources left unset.
    fn apply_hasura_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.graphql.endpoint.is_none() {
            self.graphql.endpoint = lookup(HASURA_ENDPOINT_VAR);
        }
        if self.graphql.admin_secret.is_none() {
            self.graphql.admin_secret = lookup(HASURA_ADMIN_SECRET_VAR);
        }
    }

    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(secure) = overrides.auth_secure_cookies {
            self.auth.secure_cookies = Some(secure);
        }
        if let Some(zone) = overrides.display_timezone.as_ref() {
            self.display.timezone = Some(zone.clone());
        }

        self.apply_graphql_override(&overrides.graphql);
    }

    fn apply_graphql_override(&mut self, overrides: &GraphQlOverride) {
        if let Some(endpoint) = overrides.graphql_endpoint.as_ref() {
            self.graphql.endpoint = Some(endpoint.clone());
        }
        if let Some(seconds) = overrides.graphql_timeout_seconds {
            self.graphql.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            graphql,
            auth,
            audit,
            display,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            graphql: build_graphql_settings(graphql)?,
            auth: build_auth_settings(auth)?,
            audit: build_audit_settings(audit)?,
            display: build_display_settings(display)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_graphql_settings(graphql: RawGraphQlSettings) -> Result<GraphQlSettings, LoadError> {
    let raw_endpoint = non_empty(graphql.endpoint)
        .unwrap_or_else(|| DEFAULT_GRAPHQL_ENDPOINT.to_string());
    let endpoint = Url::parse(&raw_endpoint)
        .map_err(|err| LoadError::invalid("graphql.endpoint", format!("invalid URL: {err}")))?;
    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "graphql.endpoint",
            "scheme must be http or https",
        ));
    }

    let timeout_secs = graphql
        .timeout_seconds
        .unwrap_or(DEFAULT_GRAPHQL_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "graphql.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(GraphQlSettings {
        endpoint,
        admin_secret: non_empty(graphql.admin_secret),
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let password_scheme = match auth.password_scheme.as_deref().map(str::trim) {
        None | Some("") => PasswordScheme::default(),
        Some(value) => <PasswordScheme as ValueEnum>::from_str(value, true).map_err(|_| {
            LoadError::invalid(
                "auth.password_scheme",
                format!("unknown scheme `{value}` (expected bcrypt or argon2)"),
            )
        })?,
    };

    let bcrypt_cost = auth.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST);
    if !(4..=31).contains(&bcrypt_cost) {
        return Err(LoadError::invalid(
            "auth.bcrypt_cost",
            "must be between 4 and 31",
        ));
    }

    Ok(AuthSettings {
        password_scheme,
        bcrypt_cost,
        secure_cookies: auth.secure_cookies.unwrap_or(false),
    })
}

fn build_audit_settings(audit: RawAuditSettings) -> Result<AuditSettings, LoadError> {
    let rows_per_page = match audit.rows_per_page {
        None => DEFAULT_ROWS_PER_PAGE,
        Some(value) if ROWS_PER_PAGE_OPTIONS.contains(&value) => NonZeroU32::new(value)
            .ok_or_else(|| LoadError::invalid("audit.rows_per_page", "must be non-zero"))?,
        Some(value) => {
            return Err(LoadError::invalid(
                "audit.rows_per_page",
                format!("{value} is not one of {ROWS_PER_PAGE_OPTIONS:?}"),
            ));
        }
    };

    Ok(AuditSettings { rows_per_page })
}

fn build_display_settings(display: RawDisplaySettings) -> Result<DisplaySettings, LoadError> {
    let zone = non_empty(display.timezone).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    let timezone = zone.parse::<Tz>().map_err(|err| {
        LoadError::invalid("display.timezone", format!("unknown zone `{zone}`: {err}"))
    })?;

    let brand_title =
        non_empty(display.brand_title).unwrap_or_else(|| DEFAULT_BRAND_TITLE.to_string());

    Ok(DisplaySettings {
        timezone,
        brand_title,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGraphQlSettings {
    endpoint: Option<String>,
    admin_secret: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    password_scheme: Option<String>,
    bcrypt_cost: Option<u32>,
    secure_cookies: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuditSettings {
    rows_per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDisplaySettings {
    timezone: Option<String>,
    brand_title: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
