//! Configuration management for the FAQ bot.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - Config file (`faqbot.yaml` in the working directory, or `FAQBOT_CONFIG`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Default cap on the lexical index vocabulary.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// How the messaging webhook turns a query into a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Best match's stored answer, unmodified
    Raw,
    /// Best match rewritten with conversational templates
    Natural,
    /// Natural answer plus the runner-up as additional info
    #[default]
    Contextual,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerMode::Raw => "raw",
            AnswerMode::Natural => "natural",
            AnswerMode::Contextual => "contextual",
        }
    }
}

impl FromStr for AnswerMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(AnswerMode::Raw),
            "natural" => Ok(AnswerMode::Natural),
            "contextual" => Ok(AnswerMode::Contextual),
            other => Err(AppError::Config(format!(
                "Unknown answer mode: {}. Supported: raw, natural, contextual",
                other
            ))),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the FAQ JSON documents
    pub data_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Address the HTTP server binds to
    pub bind: String,

    /// Maximum vocabulary size of the lexical index
    pub max_features: usize,

    /// Optional YAML file overriding the built-in response catalog
    pub catalog_file: Option<PathBuf>,

    /// Reply style used by the messaging webhook
    pub answer_mode: AnswerMode,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    data: Option<DataConfig>,
    server: Option<ServerConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataConfig {
    dir: Option<String>,
    max_features: Option<usize>,
    catalog: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerConfig {
    bind: Option<String>,
    answer_mode: Option<AnswerMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            config_file: None,
            bind: "0.0.0.0:8000".to_string(),
            max_features: DEFAULT_MAX_FEATURES,
            catalog_file: None,
            answer_mode: AnswerMode::default(),
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `FAQBOT_CONFIG`: Path to config file
    /// - `FAQBOT_DATA_DIR`: Directory of FAQ JSON files
    /// - `FAQBOT_BIND`: Server bind address
    /// - `FAQBOT_MAX_FEATURES`: Index vocabulary cap
    /// - `FAQBOT_CATALOG`: Response catalog YAML
    /// - `FAQBOT_ANSWER_MODE`: raw, natural or contextual
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use faqbot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Data dir: {:?}", config.data_dir);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("FAQBOT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("faqbot.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(dir) = std::env::var("FAQBOT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(bind) = std::env::var("FAQBOT_BIND") {
            config.bind = bind;
        }

        if let Ok(max) = std::env::var("FAQBOT_MAX_FEATURES") {
            config.max_features = max.parse().map_err(|e| {
                AppError::Config(format!("Invalid FAQBOT_MAX_FEATURES '{}': {}", max, e))
            })?;
        }

        if let Ok(catalog) = std::env::var("FAQBOT_CATALOG") {
            config.catalog_file = Some(PathBuf::from(catalog));
        }

        if let Ok(mode) = std::env::var("FAQBOT_ANSWER_MODE") {
            config.answer_mode = mode.parse()?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(data) = config_file.data {
            if let Some(dir) = data.dir {
                result.data_dir = PathBuf::from(dir);
            }
            if let Some(max) = data.max_features {
                result.max_features = max;
            }
            if let Some(catalog) = data.catalog {
                result.catalog_file = Some(PathBuf::from(catalog));
            }
        }

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                result.bind = bind;
            }
            if let Some(mode) = server.answer_mode {
                result.answer_mode = mode;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        catalog_file: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(catalog_file) = catalog_file {
            self.catalog_file = Some(catalog_file);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Parse the configured bind address.
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address '{}': {}", self.bind, e)))
    }

    /// Validate the configuration before startup.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_features == 0 {
            return Err(AppError::Config(
                "max_features must be at least 1".to_string(),
            ));
        }

        self.socket_addr()?;

        if let Some(ref catalog) = self.catalog_file {
            if !catalog.exists() {
                return Err(AppError::Config(format!(
                    "Response catalog not found: {:?}",
                    catalog
                )));
            }
        }

        Ok(())
    }
}
