use axum::http::StatusCode;
use dbview::backend::{CellValue, ColumnMeta, QueryResult};
use dbview::views::{error_page, table_picker, table_view, TABLE_FIELD};

fn column(name: &str) -> ColumnMeta {
    ColumnMeta {
        name: name.to_string(),
        type_name: "Varchar".to_string(),
    }
}

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn customers() -> QueryResult {
    QueryResult {
        columns: vec![column("CustomerID"), column("Name"), column("Phone")],
        rows: vec![
            vec![text("1"), text("Ada"), text("555-0100")],
            vec![text("2"), text("Grace"), CellValue::Null],
        ],
        truncated: false,
    }
}

#[test]
fn picker_lists_every_table_as_option() {
    let tables = vec!["Customer".to_string(), "Driver".to_string(), "User".to_string()];
    let html = table_picker(&tables).into_string();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"<form method="post" action="/data">"#), "Got: {}", html);
    assert!(html.contains(&format!(r#"name="{}""#, TABLE_FIELD)), "Got: {}", html);
    for name in &tables {
        assert!(
            html.contains(&format!(r#"<option value="{0}">{0}</option>"#, name)),
            "missing option for {}: {}",
            name,
            html
        );
    }
}

#[test]
fn picker_keeps_catalog_order() {
    let tables = vec!["Zone".to_string(), "Address".to_string()];
    let html = table_picker(&tables).into_string();
    let zone = html.find(">Zone<").unwrap();
    let address = html.find(">Address<").unwrap();
    assert!(zone < address);
}

#[test]
fn picker_without_tables_shows_notice() {
    let html = table_picker(&[]).into_string();
    assert!(html.contains("No tables found."));
    assert!(!html.contains("<select"));
}

#[test]
fn picker_escapes_table_names() {
    let tables = vec!["<script>".to_string()];
    let html = table_picker(&tables).into_string();
    assert!(!html.contains("<script>"), "Got: {}", html);
    assert!(html.contains("&lt;script&gt;"), "Got: {}", html);
}

#[test]
fn table_view_headers_follow_column_order() {
    let html = table_view("Customer", &customers(), None).into_string();
    assert!(
        html.contains("<thead><tr><th>CustomerID</th><th>Name</th><th>Phone</th></tr></thead>"),
        "Got: {}",
        html
    );
}

#[test]
fn table_view_renders_one_row_per_record() {
    let html = table_view("Customer", &customers(), None).into_string();
    assert!(html.contains("<h1>Customer</h1>"));
    assert!(html.contains("<tr><td>1</td><td>Ada</td><td>555-0100</td></tr>"), "Got: {}", html);
    assert!(
        html.contains(r#"<tr><td>2</td><td>Grace</td><td class="null"></td></tr>"#),
        "Got: {}",
        html
    );
    assert!(html.contains("2 rows"));
    assert!(html.contains(r#"<a href="/">"#));
}

#[test]
fn table_view_single_row_summary() {
    let mut result = customers();
    result.rows.truncate(1);
    let html = table_view("Customer", &result, None).into_string();
    assert!(html.contains("1 row<"), "Got: {}", html);
}

#[test]
fn table_view_empty_table_keeps_headers() {
    let result = QueryResult {
        columns: vec![column("TripID"), column("Fare")],
        rows: vec![],
        truncated: false,
    };
    let html = table_view("Trip", &result, None).into_string();
    assert!(html.contains("<th>TripID</th><th>Fare</th>"), "Got: {}", html);
    assert!(html.contains("<tbody></tbody>"), "Got: {}", html);
    assert!(html.contains("0 rows"));
}

#[test]
fn table_view_without_columns() {
    let html = table_view("Nothing", &QueryResult::default(), None).into_string();
    assert!(html.contains("The query returned no columns."));
    assert!(!html.contains("<table>"));
}

#[test]
fn table_view_truncation_notice() {
    let mut result = customers();
    result.truncated = true;
    let html = table_view("Customer", &result, Some(2)).into_string();
    assert!(html.contains("Showing the first 2 rows."), "Got: {}", html);

    let html = table_view("Customer", &customers(), Some(2)).into_string();
    assert!(!html.contains("Showing the first"));
}

#[test]
fn table_view_escapes_cells() {
    let result = QueryResult {
        columns: vec![column("a&b")],
        rows: vec![vec![text("<b>bold</b>")]],
        truncated: false,
    };
    let html = table_view("T", &result, None).into_string();
    assert!(html.contains("<th>a&amp;b</th>"), "Got: {}", html);
    assert!(html.contains("<td>&lt;b&gt;bold&lt;/b&gt;</td>"), "Got: {}", html);
}

#[test]
fn error_page_shows_status_and_message() {
    let html = error_page(StatusCode::BAD_REQUEST, "request: no table selected").into_string();
    assert!(html.contains("400 Bad Request"), "Got: {}", html);
    assert!(html.contains("request: no table selected"));
}

#[test]
fn table_view_truncated_without_limit() {
    let mut result = customers();
    result.truncated = true;
    let html = table_view("Customer", &result, None).into_string();
    assert!(html.contains("Results were truncated."), "Got: {}", html);
    assert!(!html.contains("Showing the first"));
}
