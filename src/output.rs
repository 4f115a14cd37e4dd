use crate::error::DbviewError;
use std::path::Path;

/// Print a rendered page to stdout.
pub fn print_result(page: &str) {
    print!("{}", page);
}

/// Print error to stderr in the contract format: error: <category>: <message>
pub fn print_error(err: &DbviewError) {
    eprintln!("error: {}", err);
}

/// Table names as printed by list-tables: one per line, or a JSON array.
pub fn format_table_list(tables: &[String], json: bool) -> Result<String, DbviewError> {
    if json {
        let mut out = serde_json::to_string(tables).map_err(|e| DbviewError::Format {
            message: e.to_string(),
        })?;
        out.push('\n');
        return Ok(out);
    }
    Ok(tables.iter().map(|t| format!("{}\n", t)).collect())
}

/// Summary object reported after writing a page to a file.
pub fn summary_json(rows: usize, path: &Path, truncated: bool) -> serde_json::Value {
    serde_json::json!({
        "rows_written": rows,
        "file": path.display().to_string(),
        "truncated": truncated,
    })
}

/// Print the file output summary to stdout as one JSON line.
pub fn print_summary(rows: usize, path: &Path, truncated: bool) {
    println!("{}", summary_json(rows, path, truncated));
}

/// Write a rendered page to a file. The parent directory must already exist.
pub fn write_file(page: &str, path: &Path) -> Result<(), DbviewError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(DbviewError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("parent directory does not exist: {}", parent.display()),
        )));
    }
    std::fs::write(path, page)?;
    Ok(())
}
