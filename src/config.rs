use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::text_processing::ChunkConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub chunking: ChunkConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_size_mb: u64,
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl AppConfig {
    /// Layer `<base>`, then `<base dir>/<RUN_ENV>`, then `DOCCHAT__*` env vars.
    pub fn load_from(base: &str) -> Result<Self, ConfigError> {
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());
        let env_file = match std::path::Path::new(base).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                dir.join(&environment).to_string_lossy().into_owned()
            }
            _ => environment,
        };

        let config: Self = Config::builder()
            .add_source(File::with_name(base))
            .add_source(File::with_name(&env_file).required(false))
            .add_source(Environment::with_prefix("DOCCHAT").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.chunking
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;

        url::Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::Message(format!("Invalid api.base_url: {e}")))?;

        Ok(())
    }
}
