//! Schema digest — a bounded textual summary of the database structure,
//! built once at startup and used to ground SQL generation.

use rusqlite::Connection;
use tracing::debug;

use crate::db::Database;
use crate::error::Result;

/// Hard ceiling on digest length, in characters. The cut is raw — it may
/// land mid-table.
pub const MAX_DIGEST_CHARS: usize = 4000;

/// Build the digest: one DDL fragment per user table, a trailing note naming
/// the active database, truncated to [`MAX_DIGEST_CHARS`].
///
/// A table whose metadata cannot be fetched is skipped; one broken table
/// never aborts digest construction.
pub fn build_digest(db: &Database, database_name: &str) -> Result<String> {
    let conn = db.connect()?;
    let tables = table_names(&conn)?;

    let mut digest = collect_fragments(&tables, |table| table_fragment(&conn, table));
    digest.push_str(&digest_note(database_name));
    Ok(truncate_chars(digest, MAX_DIGEST_CHARS))
}

/// Accumulate fragments table by table. The fetch boundary is per item:
/// an `Err` drops that table and the fold continues.
fn collect_fragments<F>(tables: &[String], mut fetch: F) -> String
where
    F: FnMut(&str) -> Result<String>,
{
    let mut out = String::new();
    for table in tables {
        match fetch(table) {
            Ok(fragment) => out.push_str(&fragment),
            Err(e) => debug!("Skipping table '{}' in schema digest: {}", table, e),
        }
    }
    out
}

fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

fn table_fragment(conn: &Connection, table: &str) -> Result<String> {
    let ddl: String = conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(format!("\n{}:\n{}\n", table, ddl))
}

fn digest_note(database_name: &str) -> String {
    format!(
        "\nNOTE: The current database is named '{}'. Use this name when a \
         question requires catalog lookups such as pragma_database_list or \
         sqlite_master.\n",
        database_name
    )
}

fn truncate_chars(s: String, max: usize) -> String {
    if s.chars().count() <= max {
        s
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    fn fixture() -> (tempfile::TempDir, Database) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("digest.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, user_name TEXT);
             CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, amount REAL);",
        )
        .unwrap();
        (dir, Database::new(path))
    }

    #[test]
    fn digest_contains_tables_and_note() {
        let (_dir, db) = fixture();
        let digest = build_digest(&db, "main").unwrap();
        assert!(digest.contains("users:"));
        assert!(digest.contains("orders:"));
        assert!(digest.contains("CREATE TABLE users"));
        assert!(digest.contains("named 'main'"));
    }

    #[test]
    fn digest_never_exceeds_bound() {
        let tables: Vec<String> = (0..100).map(|i| format!("t{}", i)).collect();
        let out = collect_fragments(&tables, |t| Ok(format!("\n{}:\n{}\n", t, "x".repeat(200))));
        let digest = truncate_chars(out + &digest_note("main"), MAX_DIGEST_CHARS);
        assert!(digest.chars().count() <= MAX_DIGEST_CHARS);
    }

    #[test]
    fn one_broken_table_is_skipped_not_fatal() {
        let tables = vec!["a".to_string(), "broken".to_string(), "c".to_string()];
        let out = collect_fragments(&tables, |t| {
            if t == "broken" {
                Err(ChatError::Execution("metadata fetch failed".into()))
            } else {
                Ok(format!("\n{}:\nCREATE TABLE {} (id);\n", t, t))
            }
        });
        assert!(out.contains("a:"));
        assert!(out.contains("c:"));
        assert!(!out.contains("broken"));
    }

    #[test]
    fn truncation_is_a_hard_cut() {
        let s = "abcdef".to_string();
        assert_eq!(truncate_chars(s.clone(), 10), "abcdef");
        assert_eq!(truncate_chars(s, 3), "abc");
    }
}
