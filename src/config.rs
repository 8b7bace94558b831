use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    /// Document store holding months and sign-ups. Stored-month matching is off without it.
    #[serde(default)]
    pub appwrite: Option<AppwriteSettings>,
    #[serde(default)]
    pub collection: CollectionSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_months_collection")]
    pub months: String,
    #[serde(default = "default_participants_collection")]
    pub participants: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            months: default_months_collection(),
            participants: default_participants_collection(),
        }
    }
}

fn default_months_collection() -> String { "mesa_months".to_string() }
fn default_participants_collection() -> String { "mesa_participants".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_capacity")]
    pub default_capacity: u32,
    /// Fixed shuffle seed for reproducing a run. Leave unset in production.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
            shuffle_seed: None,
        }
    }
}

fn default_capacity() -> u32 { crate::models::DEFAULT_HOST_CAPACITY }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl LoggingSettings {
    /// Apply `LOG_LEVEL` and `LOG_FORMAT` on top of the file settings
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok())
    }

    pub fn with_overrides(mut self, level: Option<String>, format: Option<String>) -> Self {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        if let Some(format) = format.filter(|f| !f.trim().is_empty()) {
            self.format = format;
        }
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MESA_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MESA__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MESA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MESA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings straight from TOML text, without environment overrides
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
