use crate::backend::{self, Backend, CellValue, ColumnMeta, QueryResult};
use crate::config::{ConnectionConfig, SqlServerAuth};
use crate::error::DbviewError;
use crate::logging::Timer;
use crate::masking;
use odbc_api::buffers::{BufferDesc, ColumnarAnyBuffer};
use odbc_api::{ColumnDescription, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use secrecy::ExposeSecret;

const DRIVER: &str = "{ODBC Driver 18 for SQL Server}";
const LOGIN_TIMEOUT_SECS: u32 = 30;
const BATCH_SIZE: usize = 500;
/// Widest value kept per cell, in bytes. Longer values are cut off by the driver.
const MAX_CELL_LEN: usize = 4000;

pub struct SqlServerBackend {
    connection: ConnectionConfig,
    query_timeout_secs: u64,
    show_secrets: bool,
}

impl SqlServerBackend {
    pub fn new(connection: ConnectionConfig, query_timeout_secs: u64) -> Self {
        Self {
            connection,
            query_timeout_secs,
            show_secrets: false,
        }
    }

    /// Leave the password visible in logs and error messages.
    pub fn with_show_secrets(mut self, show_secrets: bool) -> Self {
        self.show_secrets = show_secrets;
        self
    }

    /// ODBC connection string. The password is escaped for the driver.
    pub fn connection_string(&self) -> String {
        self.render_connection_string(|password| {
            odbc_api::escape_attribute_value(password).to_string()
        })
    }

    /// Connection string suitable for logs.
    pub fn describe(&self) -> String {
        match &self.connection.auth {
            SqlServerAuth::SqlLogin { password, .. } => {
                let shown = masking::format_secret(password, self.show_secrets);
                self.render_connection_string(|_| shown.clone())
            }
            SqlServerAuth::WindowsIntegrated => self.connection_string(),
        }
    }

    fn render_connection_string(&self, password: impl Fn(&str) -> String) -> String {
        let conn = &self.connection;
        let mut parts = vec![format!("Driver={}", DRIVER), format!("Server={}", conn.server)];

        if let Some(ref db) = conn.database {
            parts.push(format!("Database={}", db));
        }

        match &conn.auth {
            SqlServerAuth::WindowsIntegrated => {
                parts.push("Trusted_Connection=yes".to_string());
            }
            SqlServerAuth::SqlLogin { username, password: secret } => {
                parts.push(format!("UID={}", username));
                parts.push(format!("PWD={}", password(secret.expose_secret())));
            }
        }

        if conn.trust_server_certificate {
            parts.push("TrustServerCertificate=yes".to_string());
        }

        parts.join(";") + ";"
    }

    async fn query(&self, sql: String, limit: Option<usize>) -> Result<QueryResult, DbviewError> {
        let conn_str = self.connection_string();
        let timeout_secs = self.query_timeout_secs;
        let timer = Timer::start();
        tracing::debug!(sql = %sql, "executing query");

        // odbc-api Environment and connection are not Send, so we run in spawn_blocking
        let result = tokio::task::spawn_blocking(move || run_query(&conn_str, &sql, limit, timeout_secs))
            .await
            .map_err(|e| DbviewError::Query {
                message: format!("task join error: {}", e),
            })?
            .map_err(|e| self.scrub(e))?;

        tracing::debug!(
            elapsed_ms = timer.elapsed_ms() as u64,
            rows = result.rows.len(),
            truncated = result.truncated,
            "query complete"
        );
        Ok(result)
    }

    /// Driver diagnostics can echo connection attributes; keep the password out of them.
    fn scrub(&self, err: DbviewError) -> DbviewError {
        let SqlServerAuth::SqlLogin { password, .. } = &self.connection.auth else {
            return err;
        };
        match err {
            DbviewError::Connection { message } => DbviewError::Connection {
                message: masking::redact(&message, password, self.show_secrets),
            },
            DbviewError::Query { message } => DbviewError::Query {
                message: masking::redact(&message, password, self.show_secrets),
            },
            other => other,
        }
    }
}

impl Backend for SqlServerBackend {
    async fn list_tables(&self) -> Result<Vec<String>, DbviewError> {
        let result = self.query(backend::LIST_TABLES_SQL.to_string(), None).await?;
        Ok(backend::table_names(result))
    }

    async fn fetch_table(&self, table: &str, limit: Option<usize>) -> Result<QueryResult, DbviewError> {
        self.query(backend::select_all_sql(table), limit).await
    }
}

fn run_query(
    conn_str: &str,
    sql: &str,
    limit: Option<usize>,
    timeout_secs: u64,
) -> Result<QueryResult, DbviewError> {
    let env = Environment::new().map_err(|e| DbviewError::Connection {
        message: format!("ODBC environment error: {}", e),
    })?;

    let conn = env
        .connect_with_connection_string(
            conn_str,
            ConnectionOptions {
                login_timeout_sec: Some(LOGIN_TIMEOUT_SECS),
                ..Default::default()
            },
        )
        .map_err(|e| DbviewError::Connection {
            message: format!("connection failed: {}", e),
        })?;

    let cursor = conn
        .execute(sql, (), Some(timeout_secs as usize))
        .map_err(|e| DbviewError::Query {
            message: format!("query execution failed: {}", e),
        })?;

    let Some(mut cursor) = cursor else {
        return Ok(QueryResult::default());
    };

    let num_cols = cursor.num_result_cols().map_err(|e| DbviewError::Query {
        message: format!("failed to get column count: {}", e),
    })? as usize;

    let mut columns = Vec::with_capacity(num_cols);
    let mut buffer_descs = Vec::with_capacity(num_cols);

    for i in 1..=num_cols as u16 {
        let mut col_desc = ColumnDescription::default();
        cursor
            .describe_col(i, &mut col_desc)
            .map_err(|e| DbviewError::Query {
                message: format!("failed to describe column {}: {}", i, e),
            })?;

        let name = col_desc.name_to_string().map_err(|e| DbviewError::Query {
            message: format!("failed to decode column name {}: {}", i, e),
        })?;

        columns.push(ColumnMeta {
            name,
            type_name: format!("{:?}", col_desc.data_type),
        });

        // Every cell is rendered as text, so the driver converts each column.
        buffer_descs.push(BufferDesc::Text { max_str_len: MAX_CELL_LEN });
    }

    if num_cols == 0 {
        return Ok(QueryResult {
            columns,
            rows: vec![],
            truncated: false,
        });
    }

    let buffer = ColumnarAnyBuffer::try_from_descs(BATCH_SIZE, buffer_descs)
        .map_err(|e| DbviewError::Query {
            message: format!("failed to create buffer: {}", e),
        })?;

    let mut row_set_cursor = cursor.bind_buffer(buffer).map_err(|e| DbviewError::Query {
        message: format!("failed to bind buffer: {}", e),
    })?;

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    let mut truncated = false;

    while let Some(batch) = row_set_cursor.fetch().map_err(|e| DbviewError::Query {
        message: format!("fetch error: {}", e),
    })? {
        let batch_rows = (0..batch.num_rows()).map(|row_idx| {
            (0..num_cols)
                .map(|col_idx| {
                    batch
                        .column(col_idx)
                        .as_text_view()
                        .and_then(|view| view.get(row_idx))
                        .map(|bytes| CellValue::Text(String::from_utf8_lossy(bytes).into_owned()))
                        .unwrap_or(CellValue::Null)
                })
                .collect()
        });

        if backend::append_capped(&mut rows, batch_rows, limit) {
            truncated = true;
            break;
        }
    }

    Ok(QueryResult {
        columns,
        rows,
        truncated,
    })
}
