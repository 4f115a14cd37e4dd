use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dbview", about = "Browse SQL Server tables as HTML")]
pub struct Cli {
    /// Path to config file
    #[arg(short = 'c', long, global = true, env = "DBVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit debug diagnostics to stderr
    #[arg(short = 'v', long, global = true, env = "DBVIEW_VERBOSE")]
    pub verbose: bool,

    /// Disable credential masking in logs
    #[arg(long, global = true, env = "DBVIEW_SHOW_SECRETS")]
    pub show_secrets: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the table browser over HTTP
    Serve(ServeArgs),

    /// Print the table names of the connected database
    #[command(name = "list-tables")]
    ListTables(ListTablesArgs),

    /// Render one table as an HTML page
    #[command(name = "show-table")]
    ShowTable(ShowTableArgs),
}

/// Where and how to connect to SQL Server.
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// SQL Server hostname
    #[arg(short = 's', long, env = "DBVIEW_SERVER")]
    pub server: Option<String>,

    /// Database name
    #[arg(short = 'd', long, env = "DBVIEW_DATABASE")]
    pub database: Option<String>,

    /// SQL Auth username
    #[arg(short = 'u', long, env = "DBVIEW_USERNAME")]
    pub username: Option<String>,

    /// SQL Auth password (DBVIEW_PASSWORD is read after a profile's password_env)
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Use Windows Integrated Auth
    #[arg(short = 'w', long, env = "DBVIEW_WINDOWS_AUTH")]
    pub windows_auth: bool,

    /// Trust SQL Server certificate (for self-signed/dev instances)
    #[arg(long, env = "DBVIEW_TRUST_SERVER_CERT")]
    pub trust_server_certificate: bool,

    /// Query timeout in seconds (default: 60)
    #[arg(short = 't', long, env = "DBVIEW_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Config file profile name
    #[arg(short = 'P', long, env = "DBVIEW_PROFILE")]
    pub profile: Option<String>,
}

/// Row cap shared by the commands that fetch table contents.
#[derive(Args, Debug, Default, Clone)]
pub struct LimitArgs {
    /// Max rows to show per table (default: all)
    #[arg(short = 'l', long, env = "DBVIEW_ROW_LIMIT")]
    pub limit: Option<usize>,

    /// Ignore any configured row limit
    #[arg(long, conflicts_with = "limit")]
    pub no_limit: bool,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub limits: LimitArgs,

    /// Address to listen on (default: 127.0.0.1:5000)
    #[arg(short = 'b', long, env = "DBVIEW_BIND")]
    pub bind: Option<SocketAddr>,
}

#[derive(Args, Debug, Default)]
pub struct ListTablesArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print a JSON array instead of one name per line
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct ShowTableArgs {
    /// Table to render
    pub table: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub limits: LimitArgs,

    /// Write the page to a file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}
