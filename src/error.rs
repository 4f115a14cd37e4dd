use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbviewError {
    #[error("config: {message}")]
    Config { message: String },

    #[error("connection: {message}")]
    Connection { message: String },

    #[error("query: {message}")]
    Query { message: String },

    #[error("request: {message}")]
    Request { message: String },

    #[error("format: {message}")]
    Format { message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl DbviewError {
    /// HTTP status reported when this error ends a web request.
    pub fn status(&self) -> StatusCode {
        match self {
            DbviewError::Request { .. } => StatusCode::BAD_REQUEST,
            DbviewError::Connection { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
