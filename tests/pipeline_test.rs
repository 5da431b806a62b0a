//! End-to-end pipeline scenarios with a stubbed completion service and a
//! real on-disk SQLite database.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;

use tablechat::chart::ChartData;
use tablechat::db::Database;
use tablechat::digest;
use tablechat::error::{ChatError, Result};
use tablechat::llm::ChatCompletion;
use tablechat::pipeline::Pipeline;

/// Canned completion service: `complete` returns `sql`, `complete_json`
/// returns `json`, and every call is counted.
struct StubLlm {
    sql: String,
    json: String,
    calls: AtomicUsize,
}

impl StubLlm {
    fn new(sql: &str, json: &str) -> Arc<Self> {
        Arc::new(Self {
            sql: sql.to_string(),
            json: json.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for StubLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.sql.clone())
    }

    async fn complete_json(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.json.clone())
    }
}

/// Completion service that always fails.
struct DownLlm;

#[async_trait]
impl ChatCompletion for DownLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(ChatError::Completion("connection refused".into()))
    }
}

fn users_db(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("app.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, user_name TEXT NOT NULL);
         INSERT INTO users (user_name) VALUES ('Alice'), ('Bob'), ('Carol'), ('Dan'), ('Eve');",
    )
    .unwrap();
    path
}

fn pipeline_over(db_path: &PathBuf, client: Arc<dyn ChatCompletion>) -> Pipeline {
    let db = Database::new(db_path);
    let schema = digest::build_digest(&db, "main").unwrap();
    Pipeline::new(client, db, schema, "SQLite".into())
}

#[tokio::test]
async fn greeting_short_circuits_llm_and_database() {
    let dir = tempfile::TempDir::new().unwrap();
    let untouched = dir.path().join("never_created.db");
    let stub = StubLlm::new("SELECT 1;", "{}");

    // Hand-built digest: the database file must stay untouched to prove the
    // greeting path opens no connection.
    let mut pipeline = Pipeline::new(
        stub.clone(),
        Database::new(&untouched),
        String::new(),
        "SQLite".into(),
    );

    for input in ["hello", "  Hi ", "HEY", "help", "who are you", "What can you do"] {
        let reply = pipeline.respond(input).await;
        assert!(reply.contains("Database Assistant"), "input: {input}");
        assert!(!reply.contains("```sql"));
    }

    assert_eq!(stub.calls(), 0);
    assert!(!untouched.exists());
}

#[tokio::test]
async fn data_question_returns_sql_block_and_humanized_answer() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let stub = StubLlm::new("SELECT COUNT(*) AS total FROM users;", "{}");
    let mut pipeline = pipeline_over(&db_path, stub.clone());

    let reply = pipeline.respond("how many users are there").await;

    assert!(reply.contains("```sql\nSELECT COUNT(*) AS total FROM users;\n```"));
    assert!(reply.contains("**Answer:**"));
    assert!(reply.contains("Total: 5"));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn failing_sql_surfaces_error_section_without_answer() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let stub = StubLlm::new("SELECT * FROM missing_table;", "{}");
    let mut pipeline = pipeline_over(&db_path, stub);

    let reply = pipeline.respond("list the widgets").await;

    assert!(reply.contains("```sql\nSELECT * FROM missing_table;\n```"));
    assert!(reply.contains("**Error:**"));
    assert!(reply.contains("missing_table"));
    assert!(!reply.contains("**Answer:**"));
}

#[tokio::test]
async fn empty_result_answers_with_no_data_sentinel() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let stub = StubLlm::new("SELECT user_name FROM users WHERE id > 100;", "{}");
    let mut pipeline = pipeline_over(&db_path, stub);

    let reply = pipeline.respond("any users past one hundred?").await;
    assert!(reply.contains("**Answer:**\n\nNo data found."));
}

#[tokio::test]
async fn synthesis_failure_becomes_generic_assistant_message() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let mut pipeline = pipeline_over(&db_path, Arc::new(DownLlm));

    let reply = pipeline.respond("how many users are there").await;
    assert!(reply.contains("couldn't generate a SQL query"));
    assert!(!reply.contains("```sql"));
}

#[tokio::test]
async fn chart_extraction_reads_last_answer() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let stub = StubLlm::new(
        "SELECT user_name, COUNT(*) AS n FROM users GROUP BY user_name;",
        r#"{"x_labels": ["Alice", "Bob"], "y_values": [3, 2]}"#,
    );
    let mut pipeline = pipeline_over(&db_path, stub);

    // Chart before any turn: nothing to extract from.
    assert!(pipeline.chart().await.unwrap().is_none());

    pipeline.respond("users by name").await;
    let data = pipeline.chart().await.unwrap().expect("chart data");
    assert_eq!(
        data,
        ChartData {
            x_labels: vec!["Alice".into(), "Bob".into()],
            y_values: vec![3.0, 2.0],
        }
    );
}

#[tokio::test]
async fn chart_distinguishes_empty_from_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);

    let empty = StubLlm::new("SELECT 1;", r#"{"x_labels": [], "y_values": []}"#);
    let mut pipeline = pipeline_over(&db_path, empty);
    pipeline.respond("anything numeric?").await;
    let data = pipeline.chart().await.unwrap().expect("chart data");
    assert!(data.is_empty());

    let garbled = StubLlm::new("SELECT 1;", "sorry, I can't help with that");
    let mut pipeline = pipeline_over(&db_path, garbled);
    pipeline.respond("anything numeric?").await;
    let err = pipeline.chart().await.unwrap_err();
    assert!(matches!(err, ChatError::Extraction(_)));
}

#[tokio::test]
async fn document_renders_last_answer_only() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let stub = StubLlm::new("SELECT COUNT(*) AS total FROM users;", "{}");
    let mut pipeline = pipeline_over(&db_path, stub);

    assert!(pipeline.document().is_none());

    pipeline.respond("how many users are there").await;
    let bytes = pipeline.document().expect("pdf bytes");
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn last_answer_is_overwritten_each_turn() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = users_db(&dir);
    let stub = StubLlm::new("SELECT COUNT(*) AS total FROM users;", "{}");
    let mut pipeline = pipeline_over(&db_path, stub);

    pipeline.respond("how many users are there").await;
    let first = pipeline.session().last_answer().unwrap().to_string();

    pipeline.respond("hello").await;
    let second = pipeline.session().last_answer().unwrap();
    assert_ne!(first, second);
    assert!(second.contains("Database Assistant"));
    assert_eq!(pipeline.session().turns().len(), 4);
}
