//! SQLite execution — one scoped connection per statement.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::{ChatError, Result};

/// Handle to the configured SQLite file. Holds no open connection; every
/// operation opens one, runs a single statement and drops it on return.
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Execute one SQL statement, returning column names and all rows
    /// eagerly. Any driver failure — syntax, missing object, type — comes
    /// back as a single [`ChatError::Execution`] carrying the driver text.
    pub fn execute(&self, sql: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        self.run(sql).map_err(|e| ChatError::Execution(e.to_string()))
    }

    fn run(&self, sql: &str) -> rusqlite::Result<(Vec<String>, Vec<Vec<String>>)> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = Vec::new();
        let mut raw = stmt.query([])?;
        while let Some(row) = raw.next()? {
            let mut vals = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                vals.push(format_value(row.get::<_, rusqlite::types::Value>(i)?));
            }
            rows.push(vals);
        }
        Ok((columns, rows))
    }
}

fn format_value(value: rusqlite::types::Value) -> String {
    use rusqlite::types::Value;
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Real(f) => format!("{:.2}", f),
        Value::Text(s) => s,
        Value::Blob(_) => "[BLOB]".to_string(),
    }
}
