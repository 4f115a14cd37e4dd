use clap::Parser;
use dbview::backend::Backend;
use dbview::backend::sqlserver::SqlServerBackend;
use dbview::cli::{self, Cli, Command};
use dbview::config::{self, AppConfig};
use dbview::error::DbviewError;
use dbview::{logging, output, server, views};
use std::process;

#[tokio::main]
async fn main() {
    // Load .env file (optional, ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(ref args) => {
            serve(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::ListTables(ref args) => {
            list_tables(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::ShowTable(ref args) => {
            show_table(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
    };

    if let Err(err) = result {
        output::print_error(&err);
        process::exit(1);
    }
}

async fn serve(
    args: &cli::ServeArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), DbviewError> {
    let app_config = config::load_from_serve_args(args, verbose, show_secrets, config_path)?;
    let bind = app_config.bind;
    let row_limit = app_config.row_limit;
    let backend = connect(app_config);

    server::serve(backend, bind, row_limit).await
}

async fn list_tables(
    args: &cli::ListTablesArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), DbviewError> {
    let app_config = config::load_from_list_tables_args(args, verbose, show_secrets, config_path)?;
    let backend = connect(app_config);

    let tables = backend.list_tables().await?;
    tracing::debug!(count = tables.len(), "listed tables");
    output::print_result(&output::format_table_list(&tables, args.json)?);

    Ok(())
}

async fn show_table(
    args: &cli::ShowTableArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&std::path::PathBuf>,
) -> Result<(), DbviewError> {
    let app_config = config::load_from_show_table_args(args, verbose, show_secrets, config_path)?;
    let row_limit = app_config.row_limit;
    let backend = connect(app_config);

    let result = backend.fetch_table(&args.table, row_limit).await?;
    let page = views::table_view(&args.table, &result, row_limit).into_string();

    match args.output {
        Some(ref path) => {
            tracing::debug!(path = %path.display(), "writing page");
            output::write_file(&page, path)?;
            output::print_summary(result.rows.len(), path, result.truncated);
        }
        None => output::print_result(&page),
    }

    if result.truncated
        && let Some(limit) = row_limit
    {
        tracing::warn!("showing the first {} rows; use --no-limit to show all rows", limit);
    }

    Ok(())
}

// --- Helpers ---

fn connect(app_config: AppConfig) -> SqlServerBackend {
    logging::init(app_config.verbose);
    let backend = SqlServerBackend::new(app_config.connection, app_config.query_timeout_secs)
        .with_show_secrets(app_config.show_secrets);
    tracing::debug!(connection = %backend.describe(), "using sqlserver backend");
    backend
}
