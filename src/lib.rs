//! tablechat — a conversational interface over a SQLite database.
//!
//! Natural-language questions are turned into SQL by a chat-completion
//! service, executed, and answered as readable text; the last answer can be
//! re-processed into chart data or exported as a PDF.

pub mod chart;
pub mod config;
pub mod db;
pub mod digest;
pub mod error;
pub mod humanize;
pub mod intent;
pub mod llm;
pub mod pdf;
pub mod pipeline;
pub mod repl;
pub mod session;

pub use error::{ChatError, Result};
pub use pipeline::Pipeline;
