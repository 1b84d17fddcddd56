use config::builder::DefaultState;
use config::ConfigBuilder;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment validation failed: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Environment validation failed: CLAUDE_API_KEY: Claude API key is required")]
    MissingApiKey,
    #[error("Environment validation failed: PUBLIC_APP_URL: invalid url '{0}'")]
    InvalidPublicUrl(String),
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Development,
    Production,
    Test,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnthropicConfig {
    pub api_base: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Outbound call budget. `max_retries` is the total number of attempts per turn.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub mode: DeploymentMode,
    pub server: ServerConfig,
    pub anthropic: AnthropicConfig,
    pub model: ModelConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    /// Loads `.env`, the optional config file at `path`, prefixed overrides and
    /// the well-known flat variables, in that order of precedence.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(path, None, |key| std::env::var(key).ok())
    }

    /// `prefixed` replaces the process environment as the `CHAT_RELAY__*` source
    /// when given; `lookup` resolves the flat variables.
    fn load_from(
        path: &str,
        prefixed: Option<config::Map<String, String>>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CHAT_RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(prefixed),
            );

        let settings = apply_env(builder, lookup)?.build()?;
        Self::from_settings(settings)
    }

    /// Builder pre-populated with the fixed deployment constants.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = config::Config::builder()
            .set_default("mode", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("anthropic.api_base", DEFAULT_API_BASE)?
            .set_default("anthropic.api_key", "")?
            .set_default("model.model", DEFAULT_MODEL)?
            .set_default("model.max_tokens", i64::from(DEFAULT_MAX_TOKENS))?
            .set_default("model.temperature", DEFAULT_TEMPERATURE)?
            .set_default("api.timeout_ms", DEFAULT_TIMEOUT_MS as i64)?
            .set_default("api.max_retries", i64::from(DEFAULT_MAX_RETRIES))?;
        Ok(builder)
    }

    pub fn from_settings(settings: config::Config) -> Result<Self, ConfigError> {
        let mut app_config: AppConfig = settings.try_deserialize()?;

        app_config.anthropic.api_key = app_config.anthropic.api_key.trim().to_string();
        if app_config.anthropic.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        // An empty variable counts as unset.
        if app_config.server.public_url.as_deref().is_some_and(str::is_empty) {
            app_config.server.public_url = None;
        }
        if let Some(url) = &app_config.server.public_url {
            if Url::parse(url).is_err() {
                return Err(ConfigError::InvalidPublicUrl(url.clone()));
            }
        }

        Ok(app_config)
    }

    pub fn is_development(&self) -> bool {
        self.mode == DeploymentMode::Development
    }

    pub fn is_production(&self) -> bool {
        self.mode == DeploymentMode::Production
    }

    pub fn is_test(&self) -> bool {
        self.mode == DeploymentMode::Test
    }
}

/// Overlays the flat variables. `NODE_ENV` and `NEXT_PUBLIC_APP_URL` are read
/// when the shorter names are unset.
fn apply_env(
    builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mode = lookup("APP_ENV").or_else(|| lookup("NODE_ENV"));
    let public_url = lookup("PUBLIC_APP_URL").or_else(|| lookup("NEXT_PUBLIC_APP_URL"));

    Ok(builder
        .set_override_option("anthropic.api_key", lookup("CLAUDE_API_KEY"))?
        .set_override_option("mode", mode)?
        .set_override_option("server.public_url", public_url)?
        .set_override_option("server.port", lookup("PORT"))?)
}
