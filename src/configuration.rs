use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub embedding: EmbeddingSettings,
    pub completion: CompletionSettings,
    pub rag: RagSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Origins allowed to call the API cross-origin. A `*` entry allows any.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    // Determines if we demand the connection to be encrypted or not
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // Try an encrypted connection, fallback to unencrypted if it fails
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        let mut options = self.without_db().database(&self.database_name);
        // Lowers sqlx logs from INFO to TRACE level.
        options.log_statements(tracing::log::LevelFilter::Trace);
        options
    }
}

/// Which implementation of the embedding provider the app is wired with.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Hugging Face inference API, over HTTP.
    Hosted,
    /// Sentence-embeddings model running inside this process.
    /// Only available when compiled with the `local-embeddings` feature.
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub api_base_url: String,
    /// Required when `backend` is `hosted`. Checked at startup, not per request.
    pub api_token: Option<Secret<String>>,
    pub model_name: String,
    /// Dimensionality contract shared with the `vector` column of `guide_content`.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub dimension: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
}

impl EmbeddingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionSettings {
    /// OpenAI-compatible chat completions API root, e.g. `https://api.groq.com/openai/v1`.
    pub api_base_url: String,
    /// Required at startup. Checked in `Application::build`, not per request.
    pub api_key: Option<Secret<String>>,
    pub model_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub top_p: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_completion_tokens: u32,
    /// Smaller cap for the follow-up questions call.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub suggestion_max_completion_tokens: u32,
    pub reasoning_effort: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
}

impl CompletionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RagSettings {
    /// Minimum cosine similarity for a knowledge-base item to be retrieved.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub match_threshold: f64,
    /// Number of sources given to the language model.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub match_count: u16,
    /// Result cap for the semantic search endpoint.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub search_result_limit: u16,
    /// How many of the latest stored turns are replayed to the language model.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub history_window: usize,
    /// Per-source character budget when composing the context prompt.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub context_chars_per_source: usize,
}

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` should contain shared settings for all environments.
/// A specific env file should be created for each environment: `local.yaml` and `production.yaml`
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `local.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator
/// For ex: `APP_APPLICATION__PORT=5001 would set `Settings.application.port`
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detects the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Adds in settings from environment variables (with a prefix of APP and '__' as separator)
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
