use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use dbview::backend::{Backend, CellValue, ColumnMeta, QueryResult};
use dbview::error::DbviewError;
use dbview::server::router;
use http_body_util::BodyExt;
use std::collections::BTreeMap;
use tower::ServiceExt;

/// In-memory backend: a fixed set of tables, each with one text column.
#[derive(Default)]
struct MemoryBackend {
    tables: BTreeMap<String, Vec<&'static str>>,
    fail_with: Option<fn() -> DbviewError>,
}

impl MemoryBackend {
    fn with_table(mut self, name: &str, values: Vec<&'static str>) -> Self {
        self.tables.insert(name.to_string(), values);
        self
    }
}

impl Backend for MemoryBackend {
    async fn list_tables(&self) -> Result<Vec<String>, DbviewError> {
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        Ok(self.tables.keys().cloned().collect())
    }

    async fn fetch_table(&self, table: &str, limit: Option<usize>) -> Result<QueryResult, DbviewError> {
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        let values = self.tables.get(table).ok_or_else(|| DbviewError::Query {
            message: format!("Invalid object name '{}'", table),
        })?;
        let cap = limit.unwrap_or(usize::MAX);
        Ok(QueryResult {
            columns: vec![ColumnMeta {
                name: "value".to_string(),
                type_name: "Varchar".to_string(),
            }],
            rows: values
                .iter()
                .take(cap)
                .map(|v| vec![CellValue::Text(v.to_string())])
                .collect(),
            truncated: values.len() > cap,
        })
    }
}

fn taxi_backend() -> MemoryBackend {
    MemoryBackend::default()
        .with_table("Customer", vec!["Ada", "Grace", "Linus"])
        .with_table("User", vec!["admin"])
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/data")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn index_renders_table_dropdown() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "Got: {}", content_type);
    let html = body_string(response).await;
    assert!(html.contains(r#"<option value="Customer">Customer</option>"#), "Got: {}", html);
    assert!(html.contains(r#"<option value="User">User</option>"#), "Got: {}", html);
}

#[tokio::test]
async fn post_data_renders_selected_table() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(post_form("table=Customer")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<h1>Customer</h1>"));
    assert!(html.contains("<th>value</th>"));
    assert!(html.contains("<td>Ada</td>"));
    assert!(html.contains("<td>Linus</td>"));
}

#[tokio::test]
async fn reserved_table_name_is_passed_through() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(post_form("table=User")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("<td>admin</td>"));
}

#[tokio::test]
async fn get_data_with_query_string() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(get("/data?table=Customer")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("<td>Grace</td>"));
}

#[tokio::test]
async fn row_limit_reaches_backend_and_page() {
    let app = router(taxi_backend(), Some(2));
    let response = app.oneshot(post_form("table=Customer")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("<td>Grace</td>"));
    assert!(!html.contains("<td>Linus</td>"));
    assert!(html.contains("Showing the first 2 rows."), "Got: {}", html);
}

#[tokio::test]
async fn missing_table_field_is_bad_request() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(post_form("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("no table selected"), "Got: {}", html);
}

#[tokio::test]
async fn blank_table_field_is_bad_request() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(get("/data?table=%20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_table_is_server_error() {
    let app = router(taxi_backend(), None);
    let response = app.oneshot(post_form("table=Nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_string(response).await;
    assert!(html.contains("Invalid object name"), "Got: {}", html);
}

#[tokio::test]
async fn connection_failure_is_bad_gateway() {
    let backend = MemoryBackend {
        fail_with: Some(|| DbviewError::Connection {
            message: "login timeout expired".to_string(),
        }),
        ..Default::default()
    };
    let app = router(backend, None);
    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response).await.contains("connection: login timeout expired"));
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = router(MemoryBackend::default(), None);
    let response = app.oneshot(get("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}
