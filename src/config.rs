use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: String,
    /// Logical database name, embedded into the schema digest so generated
    /// catalog queries filter on the right database. SQLite calls the
    /// primary attached database "main".
    pub name: String,
    /// Dialect named in the SQL synthesis prompt.
    pub dialect: String,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "tablechat.db".into(),
            name: "main".into(),
            dialect: "SQLite".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// API key — prefer env OPENAI_API_KEY
    pub api_key: Option<String>,
    /// Any OpenAI-compatible base URL (e.g. "http://localhost:11434/v1")
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature; 0.0 keeps SQL generation deterministic
    pub temperature: f32,
    /// Wire-level streaming flag; responses are consumed whole either way
    pub stream: bool,
    /// Completion token cap per call
    pub max_tokens: u32,
}
impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.0,
            stream: false,
            max_tokens: 512,
        }
    }
}

pub fn load_config() -> Result<AppConfig> {
    // Also check OPENAI_API_KEY as well as TABLECHAT__LLM__API_KEY
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("tablechat").required(false))
        .add_source(config::Environment::with_prefix("TABLECHAT").separator("__"))
        .build()?;
    let mut app: AppConfig = cfg.try_deserialize()?;

    // Convenience: OPENAI_API_KEY env var (without TABLECHAT__ prefix)
    if app.llm.api_key.is_none() {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            app.llm.api_key = Some(key);
        }
    }

    Ok(app)
}

pub fn default_config() -> AppConfig {
    AppConfig::default()
}
