use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

mod logging;

pub use logging::setup_logging;

pub type AppConfig = CleanConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/clean-service.yaml";
pub const ENV_PREFIX: &str = "CLEAN_SERVICE_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CleanConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scratch: ScratchConfig,
    #[serde(default)]
    #[validate(nested)]
    pub transform: TransformConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request body cap for uploads; unlimited when unset.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScratchConfig {
    /// Parent of the per-request scratch directories; platform temp dir when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformBackend {
    #[default]
    Native,
    Process,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransformConfig {
    #[serde(default)]
    pub backend: TransformBackend,
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1))]
    pub timeout_ms: u64,
    #[serde(default = "default_max_diagnostic_bytes")]
    #[validate(range(min = 1))]
    pub max_diagnostic_bytes: usize,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            backend: TransformBackend::default(),
            program: default_program(),
            args: default_args(),
            working_dir: None,
            timeout_ms: default_timeout_ms(),
            max_diagnostic_bytes: default_max_diagnostic_bytes(),
        }
    }
}

impl CleanConfig {
    /// Defaults, then the YAML file at `path` if it exists, then
    /// `CLEAN_SERVICE_*` environment variables (`__` separates nesting).
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(CleanConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.transform.backend == TransformBackend::Process
            && self.transform.program.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "transform.program must be set when transform.backend is `process`".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config_from(path: &Path) -> Result<CleanConfig, ConfigError> {
    let config: CleanConfig = CleanConfig::figment(path).extract()?;
    config.check()?;
    Ok(config)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["scripts/clean.py".to_string()]
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_max_diagnostic_bytes() -> usize {
    8 * 1024
}
