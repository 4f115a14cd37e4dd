use crate::cli::{ConnectionArgs, LimitArgs, ListTablesArgs, ServeArgs, ShowTableArgs};
use crate::error::DbviewError;
use directories::ProjectDirs;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub row_limit: Option<usize>,
    pub query_timeout_secs: u64,
    pub bind: SocketAddr,
    pub verbose: bool,
    pub show_secrets: bool,
}

/// SQL Server connection target.
#[derive(Debug)]
pub struct ConnectionConfig {
    pub server: String,
    pub database: Option<String>,
    pub auth: SqlServerAuth,
    pub trust_server_certificate: bool,
}

/// Authentication method for SQL Server.
#[derive(Debug)]
pub enum SqlServerAuth {
    WindowsIntegrated,
    SqlLogin {
        username: String,
        password: SecretString,
    },
}

// --- TOML config file structs ---

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    defaults: TomlDefaults,
    #[serde(default)]
    profiles: HashMap<String, TomlProfile>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDefaults {
    row_limit: Option<usize>,
    timeout: Option<u64>,
    verbose: Option<bool>,
    bind: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct TomlProfile {
    server: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    password_env: Option<String>,
    windows_auth: Option<bool>,
    trust_server_certificate: Option<bool>,
}

struct ResolvedConfigPath {
    path: PathBuf,
    /// true if given via --config or DBVIEW_CONFIG
    explicit: bool,
}

/// Resolve the config file path: --config flag > env var > platform default.
fn resolve_config_path(cli_config: Option<&PathBuf>) -> Option<ResolvedConfigPath> {
    if let Some(path) = cli_config {
        return Some(ResolvedConfigPath { path: path.clone(), explicit: true });
    }
    if let Some(path) = env_non_empty("DBVIEW_CONFIG") {
        return Some(ResolvedConfigPath { path: PathBuf::from(path), explicit: true });
    }
    ProjectDirs::from("", "", "dbview").map(|dirs| ResolvedConfigPath {
        path: dirs.config_dir().join("config.toml"),
        explicit: false,
    })
}

fn load_toml_config(resolved: Option<&ResolvedConfigPath>) -> Result<TomlConfig, DbviewError> {
    let Some(resolved) = resolved else {
        return Ok(TomlConfig::default());
    };

    if !resolved.path.exists() {
        if resolved.explicit {
            return Err(DbviewError::Config {
                message: format!("config file not found: {}", resolved.path.display()),
            });
        }
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&resolved.path).map_err(|e| DbviewError::Config {
        message: format!("cannot read config file {}: {}", resolved.path.display(), e),
    })?;

    toml::from_str(&content).map_err(|e| DbviewError::Config {
        message: format!("invalid config file {}: {}", resolved.path.display(), e),
    })
}

/// Some(value) when the string is non-empty.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Read an env var, treating empty as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Resolve a password from direct value, env indirection, or env var.
fn resolve_secret(
    direct: Option<&str>,
    env_key: Option<&str>,
    fallback_env: &str,
) -> Option<SecretString> {
    if let Some(val) = non_empty(direct) {
        return Some(SecretString::from(val.to_string()));
    }
    if let Some(key) = env_key
        && let Some(val) = env_non_empty(key)
    {
        return Some(SecretString::from(val));
    }
    env_non_empty(fallback_env).map(SecretString::from)
}

fn select_profile(toml_config: &TomlConfig, name: Option<&String>) -> Result<TomlProfile, DbviewError> {
    let Some(name) = name else {
        return Ok(TomlProfile::default());
    };
    toml_config
        .profiles
        .get(name)
        .cloned()
        .ok_or_else(|| DbviewError::Config {
            message: format!("profile '{}' not found in config file", name),
        })
}

fn resolve_connection(
    args: &ConnectionArgs,
    profile: &TomlProfile,
) -> Result<ConnectionConfig, DbviewError> {
    let server = non_empty(args.server.as_deref())
        .or(non_empty(profile.server.as_deref()))
        .ok_or_else(|| DbviewError::Config {
            message: "no server specified — use --server or configure a profile".to_string(),
        })?
        .to_string();

    let database = non_empty(args.database.as_deref())
        .or(non_empty(profile.database.as_deref()))
        .map(|s| s.to_string());

    let windows_auth = args.windows_auth || profile.windows_auth.unwrap_or(false);

    let auth = if windows_auth {
        SqlServerAuth::WindowsIntegrated
    } else {
        let username = non_empty(args.username.as_deref())
            .or(non_empty(profile.username.as_deref()))
            .ok_or_else(|| DbviewError::Config {
                message: "no username specified for SQL Server SQL Auth".to_string(),
            })?
            .to_string();

        let password = resolve_secret(
            args.password.as_deref(),
            profile.password_env.as_deref(),
            "DBVIEW_PASSWORD",
        )
        .or_else(|| {
            non_empty(profile.password.as_deref()).map(|p| SecretString::from(p.to_string()))
        })
        .ok_or_else(|| DbviewError::Config {
            message: "no password specified for SQL Server SQL Auth".to_string(),
        })?;

        SqlServerAuth::SqlLogin { username, password }
    };

    let trust_server_certificate =
        args.trust_server_certificate || profile.trust_server_certificate.unwrap_or(false);

    Ok(ConnectionConfig {
        server,
        database,
        auth,
        trust_server_certificate,
    })
}

fn resolve_bind(cli_bind: Option<SocketAddr>, defaults: &TomlDefaults) -> Result<SocketAddr, DbviewError> {
    if let Some(bind) = cli_bind {
        return Ok(bind);
    }
    let raw = non_empty(defaults.bind.as_deref()).unwrap_or(DEFAULT_BIND);
    raw.parse().map_err(|e| DbviewError::Config {
        message: format!("invalid bind address '{}': {}", raw, e),
    })
}

fn resolve_row_limit(limits: Option<&LimitArgs>, defaults: &TomlDefaults) -> Option<usize> {
    match limits {
        Some(l) if l.no_limit => None,
        Some(l) => l.limit.or(defaults.row_limit),
        None => defaults.row_limit,
    }
}

fn load(
    connection: &ConnectionArgs,
    limits: Option<&LimitArgs>,
    bind: Option<SocketAddr>,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, DbviewError> {
    let resolved_path = resolve_config_path(config_path);
    let toml_config = load_toml_config(resolved_path.as_ref())?;
    let profile = select_profile(&toml_config, connection.profile.as_ref())?;
    let defaults = &toml_config.defaults;

    Ok(AppConfig {
        connection: resolve_connection(connection, &profile)?,
        row_limit: resolve_row_limit(limits, defaults),
        query_timeout_secs: connection
            .timeout
            .unwrap_or_else(|| defaults.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        bind: resolve_bind(bind, defaults)?,
        verbose: verbose || defaults.verbose.unwrap_or(false),
        show_secrets,
    })
}

/// Build AppConfig for the serve subcommand.
pub fn load_from_serve_args(
    args: &ServeArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, DbviewError> {
    load(
        &args.connection,
        Some(&args.limits),
        args.bind,
        verbose,
        show_secrets,
        config_path,
    )
}

/// Build AppConfig for list-tables. Row limits do not apply to the catalog query.
pub fn load_from_list_tables_args(
    args: &ListTablesArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, DbviewError> {
    let mut config = load(&args.connection, None, None, verbose, show_secrets, config_path)?;
    config.row_limit = None;
    Ok(config)
}

/// Build AppConfig for show-table.
pub fn load_from_show_table_args(
    args: &ShowTableArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<AppConfig, DbviewError> {
    load(
        &args.connection,
        Some(&args.limits),
        None,
        verbose,
        show_secrets,
        config_path,
    )
}
