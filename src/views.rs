//! HTML pages for the table browser.

use crate::backend::{CellValue, QueryResult};
use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

/// Form field carrying the picked table name.
pub const TABLE_FIELD: &str = "table";

const STYLE: &str = r#"
body {
    font-family: system-ui, -apple-system, sans-serif;
    margin: 2rem;
    color: #222;
}

table {
    border-collapse: collapse;
}

th, td {
    border: 1px solid #ccc;
    padding: 0.25rem 0.5rem;
    text-align: left;
}

th {
    background: #f0f0f0;
}

td.null {
    background: #fafafa;
}

.notice {
    color: #8a5300;
}

.error {
    color: #b00020;
}
"#;

fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - dbview" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

/// Landing page: a dropdown of every table, submitting to `/data`.
pub fn table_picker(tables: &[String]) -> Markup {
    page(
        "Tables",
        html! {
            h1 { "Tables" }
            @if tables.is_empty() {
                p.notice { "No tables found." }
            } @else {
                form method="post" action="/data" {
                    label for=(TABLE_FIELD) { "Table " }
                    select id=(TABLE_FIELD) name=(TABLE_FIELD) {
                        @for name in tables {
                            option value=(name) { (name) }
                        }
                    }
                    " "
                    button type="submit" { "Show" }
                }
            }
        },
    )
}

/// The rows of `table`, one `<th>` per column name and one `<td>` per cell.
pub fn table_view(table: &str, result: &QueryResult, limit: Option<usize>) -> Markup {
    page(
        table,
        html! {
            p { a href="/" { "Back to tables" } }
            h1 { (table) }
            p { (row_summary(result)) }
            @if result.truncated {
                @if let Some(limit) = limit {
                    p.notice { "Showing the first " (limit) " rows." }
                } @else {
                    p.notice { "Results were truncated." }
                }
            }
            @if result.columns.is_empty() {
                p.notice { "The query returned no columns." }
            } @else {
                table {
                    thead {
                        tr {
                            @for name in result.column_names() {
                                th { (name) }
                            }
                        }
                    }
                    tbody {
                        @for row in &result.rows {
                            tr {
                                @for cell in row {
                                    @match cell {
                                        CellValue::Text(text) => {
                                            td { (text) }
                                        }
                                        CellValue::Null => {
                                            td.null {}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn row_summary(result: &QueryResult) -> String {
    match result.rows.len() {
        1 => "1 row".to_string(),
        n => format!("{} rows", n),
    }
}

/// Page shown when a request fails.
pub fn error_page(status: StatusCode, message: &str) -> Markup {
    let title = status.canonical_reason().unwrap_or("Error");
    page(
        title,
        html! {
            h1 { (status.as_u16()) " " (title) }
            p.error { (message) }
            p { a href="/" { "Back to tables" } }
        },
    )
}
