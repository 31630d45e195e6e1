//! One-time setup utilities: a seeded sample schema for first runs and a
//! CSV-folder ingester. Neither is part of the interactive loop.

use super::Database;
use anyhow::{Context, Result};
use rusqlite::params_from_iter;
use std::path::Path;
use tracing::{info, warn};

/// Seeds the sample schema when the catalog is empty, so a fresh or
/// half-created database file still has tables to answer about. A database
/// that already has any table is left alone.
pub fn ensure_seeded(db: &Database) -> Result<()> {
    if db.list_tables()?.is_empty() {
        bootstrap(db)?;
    }
    Ok(())
}

/// Creates the sample `users` table and seeds it on first run. Idempotent:
/// an already-populated table is left alone.
pub fn bootstrap(db: &Database) -> Result<()> {
    db.conn
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT,
                age INTEGER,
                city TEXT
            )",
        )
        .context("Failed to create sample schema")?;

    let count: i64 = db
        .conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .context("Failed to inspect sample schema")?;
    if count > 0 {
        return Ok(());
    }

    let seed = [
        ("Alice", 25, "New York"),
        ("Bob", 30, "Los Angeles"),
        ("Charlie", 22, "Chicago"),
    ];
    for (name, age, city) in seed {
        db.conn
            .execute(
                "INSERT INTO users (name, age, city) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, age, city],
            )
            .context("Failed to seed sample data")?;
    }

    info!("Seeded sample users table");
    Ok(())
}

/// Loads every `*.csv` file in `dir` as a table named after the file stem
/// (lowercased, spaces to underscores), replacing any existing table of that
/// name. All columns are TEXT. A file that fails to parse is skipped with a
/// warning; the rest still load.
pub fn load_csv_dir(db: &Database, dir: &Path) -> Result<usize> {
    let mut loaded = 0;
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }

        let table = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.replace(' ', "_").to_lowercase(),
            None => continue,
        };

        match load_csv_file(db, &path, &table) {
            Ok(rows) => {
                info!("Loaded {} -> table '{}' ({} rows)", path.display(), table, rows);
                loaded += 1;
            }
            Err(e) => warn!("Skipped {}: {}", path.display(), e),
        }
    }

    Ok(loaded)
}

fn load_csv_file(db: &Database, path: &Path, table: &str) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim().replace(' ', "_").to_lowercase())
        .collect();
    if columns.is_empty() {
        anyhow::bail!("CSV has no header row");
    }

    let column_defs = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");

    db.conn
        .execute_batch(&format!(
            "DROP TABLE IF EXISTS {t}; CREATE TABLE {t} ({column_defs})",
            t = quote_ident(table)
        ))
        .context("Failed to create table")?;

    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut insert = db
        .conn
        .prepare(&format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_ident(table)
        ))
        .context("Failed to prepare insert")?;

    let mut rows = 0;
    for record in reader.records() {
        let record = record.context("Failed to parse CSV record")?;
        insert
            .execute(params_from_iter(record.iter()))
            .context("Failed to insert CSV record")?;
        rows += 1;
    }

    Ok(rows)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
