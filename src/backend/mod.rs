pub mod sqlserver;

use crate::error::DbviewError;

/// Catalog query used to populate the table picker.
pub const LIST_TABLES_SQL: &str = "SELECT name FROM sys.tables ORDER BY name";

/// Metadata for a single result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

/// A single cell value from a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Null,
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Null => None,
        }
    }
}

/// Rows fetched from a table, in column order.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<CellValue>>,
    pub truncated: bool,
}

impl QueryResult {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Trait for database backends.
pub trait Backend: Send + Sync + 'static {
    /// Names of the user tables in the connected database.
    fn list_tables(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, DbviewError>> + Send;

    /// Every column and row of `table`, capped at `limit` rows when set.
    fn fetch_table(
        &self,
        table: &str,
        limit: Option<usize>,
    ) -> impl std::future::Future<Output = Result<QueryResult, DbviewError>> + Send;
}

/// Bracket-quote a T-SQL identifier so reserved words like `User` resolve
/// as table names. A closing bracket inside the name is doubled.
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// The unparameterized `SELECT *` issued for a picked table.
pub fn select_all_sql(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}

/// Append one fetched batch to `rows`, stopping at `limit`.
///
/// Returns true once a row beyond the limit is seen, so a table with exactly
/// `limit` rows is not reported as truncated.
pub fn append_capped<I>(rows: &mut Vec<Vec<CellValue>>, batch: I, limit: Option<usize>) -> bool
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    for row in batch {
        if let Some(lim) = limit
            && rows.len() >= lim
        {
            return true;
        }
        rows.push(row);
    }
    false
}

/// Collapse a single-column catalog result into table names.
pub fn table_names(result: QueryResult) -> Vec<String> {
    result
        .rows
        .into_iter()
        .filter_map(|row| match row.into_iter().next() {
            Some(CellValue::Text(name)) => {
                let name = name.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            _ => None,
        })
        .collect()
}
