//! The request-to-response pipeline: greeting gate → SQL synthesis →
//! execution → humanized answer, plus chart and document post-processing
//! over the last answer.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chart::{self, ChartData};
use crate::db::Database;
use crate::error::{ChatError, Result};
use crate::humanize;
use crate::intent::{self, Intent, GREETING_REPLY};
use crate::llm::ChatCompletion;
use crate::pdf;
use crate::session::SessionContext;

/// Reply when the completion service fails during SQL synthesis. The
/// underlying error is logged, not shown.
const SYNTHESIS_FAILURE_REPLY: &str =
    "Sorry — I couldn't generate a SQL query for that right now. Please try again.";

/// Drives one chat session over one database. One turn is in flight at a
/// time; every turn runs synthesis, execution and rendering sequentially.
pub struct Pipeline {
    client: Arc<dyn ChatCompletion>,
    db: Database,
    digest: String,
    dialect: String,
    session: SessionContext,
}

impl Pipeline {
    /// `digest` is built once by the caller (see [`crate::digest`]) and is
    /// immutable for the pipeline's lifetime.
    pub fn new(client: Arc<dyn ChatCompletion>, db: Database, digest: String, dialect: String) -> Self {
        Self {
            client,
            db,
            digest,
            dialect,
            session: SessionContext::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Handle one user turn. Never fails: every pipeline error is converted
    /// into a displayable assistant message at this boundary.
    pub async fn respond(&mut self, input: &str) -> String {
        self.session.push_user(input);

        let reply = match intent::classify(input) {
            Intent::Greeting => GREETING_REPLY.to_string(),
            Intent::DataQuestion => self.answer_data_question(input).await,
        };

        self.session.push_assistant(&reply);
        reply
    }

    async fn answer_data_question(&self, question: &str) -> String {
        info!("Text-to-SQL: {}", question);

        let prompt = build_sql_prompt(question, &self.digest, &self.dialect);
        // The completion text is the SQL — no fence stripping, no validation.
        // Malformed output surfaces as an execution failure below.
        let sql = match self.client.complete(&prompt).await {
            Ok(sql) => sql,
            Err(e) => {
                warn!("SQL synthesis failed: {}", e);
                return SYNTHESIS_FAILURE_REPLY.to_string();
            }
        };
        info!("Generated SQL: {}", sql);

        match self.db.execute(&sql) {
            Ok((columns, rows)) => {
                let records = humanize::records_from(&columns, &rows);
                let readable = humanize::humanize(&records);
                format_answer(&sql, &readable)
            }
            Err(e) => {
                let detail = match e {
                    ChatError::Execution(msg) => msg,
                    other => other.to_string(),
                };
                warn!("SQL execution failed: {}", detail);
                format_execution_error(&sql, &detail)
            }
        }
    }

    /// Extract chart data from the last answer. `Ok(None)` means there is no
    /// answer to chart yet; an empty [`ChartData`] means the answer held no
    /// chartable pairs; an `Err` is an extraction failure.
    pub async fn chart(&self) -> Result<Option<ChartData>> {
        let Some(answer) = self.session.last_answer() else {
            return Ok(None);
        };
        chart::extract_chart(self.client.as_ref(), answer)
            .await
            .map(Some)
    }

    /// Render the last answer as a PDF. `None` when there is no answer yet
    /// or when rendering fails internally.
    pub fn document(&self) -> Option<Vec<u8>> {
        self.session.last_answer().and_then(pdf::render_document)
    }
}

fn build_sql_prompt(question: &str, digest: &str, dialect: &str) -> String {
    format!(
        "You are a helpful SQL expert.\n\
         Given the following user request:\n\
         \"\"\"{question}\"\"\"\n\n\
         And these {dialect} tables and columns:\n\
         {digest}\n\n\
         Write a syntactically correct {dialect} query that answers the request.\n\
         ONLY return the SQL code. No explanation."
    )
}

fn format_answer(sql: &str, readable: &str) -> String {
    format!("**SQL Query:**\n```sql\n{sql}\n```\n\n**Answer:**\n\n{readable}")
}

fn format_execution_error(sql: &str, error: &str) -> String {
    format!("**SQL Query:**\n```sql\n{sql}\n```\n\n**Error:** {error}")
}
