//! HTTP front end: the table picker at `/` and table contents at `/data`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::backend::Backend;
use crate::error::DbviewError;
use crate::views;

struct AppState<B> {
    backend: B,
    row_limit: Option<usize>,
}

/// Fields posted by the picker form, or passed as `/data?table=...`.
#[derive(Debug, Deserialize)]
struct TableSelection {
    table: Option<String>,
}

/// Build the application router over any backend.
pub fn router<B: Backend>(backend: B, row_limit: Option<usize>) -> Router {
    let state = Arc::new(AppState { backend, row_limit });

    Router::new()
        .route("/", get(index::<B>))
        .route("/data", get(show_table_query::<B>).post(show_table_form::<B>))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Listen on `bind` until Ctrl-C or SIGTERM.
pub async fn serve<B: Backend>(
    backend: B,
    bind: SocketAddr,
    row_limit: Option<usize>,
) -> Result<(), DbviewError> {
    let app = router(backend, row_limit);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| DbviewError::Config {
            message: format!("failed to bind {}: {}", bind, e),
        })?;

    tracing::info!(address = %bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index<B: Backend>(State(state): State<Arc<AppState<B>>>) -> Response {
    match state.backend.list_tables().await {
        Ok(tables) => {
            tracing::debug!(count = tables.len(), "listed tables");
            Html(views::table_picker(&tables).into_string()).into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn show_table_form<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    Form(selection): Form<TableSelection>,
) -> Response {
    show_table(&state, selection).await
}

async fn show_table_query<B: Backend>(
    State(state): State<Arc<AppState<B>>>,
    Query(selection): Query<TableSelection>,
) -> Response {
    show_table(&state, selection).await
}

async fn show_table<B: Backend>(state: &AppState<B>, selection: TableSelection) -> Response {
    let Some(table) = selection.table.filter(|t| !t.trim().is_empty()) else {
        return error_response(DbviewError::Request {
            message: format!("no table selected (missing '{}' field)", views::TABLE_FIELD),
        });
    };

    match state.backend.fetch_table(&table, state.row_limit).await {
        Ok(result) => {
            tracing::info!(
                table = %table,
                rows = result.rows.len(),
                truncated = result.truncated,
                "rendering table"
            );
            Html(views::table_view(&table, &result, state.row_limit).into_string()).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: DbviewError) -> Response {
    let status = err.status();
    if status == StatusCode::BAD_REQUEST {
        tracing::warn!(error = %err, "bad request");
    } else {
        tracing::error!(error = %err, "request failed");
    }
    let body = views::error_page(status, &err.to_string()).into_string();
    (status, Html(body)).into_response()
}
