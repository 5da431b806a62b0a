use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tablechat::config::{self, AppConfig};
use tablechat::db::Database;
use tablechat::digest;
use tablechat::llm::LlmClient;
use tablechat::pipeline::Pipeline;
use tablechat::repl;

#[derive(Parser)]
#[command(name = "tablechat", version)]
#[command(about = "Chat with a relational database — questions in, SQL answers out")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session
    Chat,

    /// Ask a single question (non-interactive)
    Ask { question: String },

    /// Print the schema digest used to ground SQL generation
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tablechat=info,warn")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        config::default_config()
    });

    match cli.command {
        Command::Chat => {
            let mut pipeline = build_pipeline(&cfg)?;
            repl::run(&mut pipeline).await;
        }

        Command::Ask { question } => {
            let mut pipeline = build_pipeline(&cfg)?;
            println!("{}", pipeline.respond(&question).await);
        }

        Command::Schema => {
            let db = Database::new(&cfg.database.path);
            let digest = digest::build_digest(&db, &cfg.database.name)?;
            println!("{}", digest);
        }
    }
    Ok(())
}

fn build_pipeline(cfg: &AppConfig) -> Result<Pipeline> {
    let db = Database::new(&cfg.database.path);
    // One-time blocking step: the digest is built at startup and never
    // refreshed for the session's lifetime.
    let digest = digest::build_digest(&db, &cfg.database.name)?;
    let client = Arc::new(LlmClient::from_config(&cfg.llm));
    Ok(Pipeline::new(client, db, digest, cfg.database.dialect.clone()))
}
