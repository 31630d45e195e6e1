use anyhow::{Context, Result};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use std::path::Path;

mod format;
pub mod setup;

pub use format::render_table;

/// Result previews are capped so an uncontrolled translated query cannot
/// flood the terminal. Rows beyond the cap are dropped silently.
const ROW_PREVIEW_LIMIT: usize = 10;

/// Single-owner SQLite connection, opened once at session start and reused
/// for every turn.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Ok(Self { conn })
    }

    /// Catalog snapshot: every table name, in catalog order. Called once per
    /// session; a failure here is fatal to startup.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .context("Failed to query table catalog")?;
        let tables = stmt
            .query_map([], |row| row.get(0))
            .context("Failed to read table catalog")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("Failed to read table catalog")?;
        Ok(tables)
    }

    /// Runs arbitrary SQL and renders the outcome for display. Execution
    /// errors are part of the answer, never propagated: one bad statement
    /// fails its own turn only.
    pub fn execute(&self, sql: &str) -> String {
        match self.run_query(sql) {
            Ok((_, rows)) if rows.is_empty() => "No results found.".to_string(),
            Ok((headers, rows)) => render_table(&headers, &rows),
            Err(e) => format!("Error executing SQL: {e}"),
        }
    }

    fn run_query(&self, sql: &str) -> rusqlite::Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut stmt = self.conn.prepare(sql)?;
        let headers: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut data = Vec::new();
        while let Some(row) = rows.next()? {
            if data.len() == ROW_PREVIEW_LIMIT {
                break;
            }
            let mut cells = Vec::with_capacity(headers.len());
            for i in 0..headers.len() {
                cells.push(render_value(row.get_ref(i)?));
            }
            data.push(cells);
        }

        Ok((headers, data))
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} byte blob>", b.len()),
    }
}
